//! Structural elements module

mod fixed_end;
mod frame;
mod material;
mod member;
mod node;
mod section;
mod support;

pub use fixed_end::{fer_distributed, fer_member_load, fer_moment, fer_point, fer_uniform};
pub use frame::{FrameElement, DEFAULT_NUM_POINTS};
pub use material::Material;
pub use member::{Member, MemberReleases};
pub use node::Node;
pub use section::Section;
pub use support::Support;
