//! Controller frame sources
//!
//! Sources deliver [`TaggedFrame`]s to the mapping engine. Hardware drivers
//! live outside this crate; recorded sessions can be replayed directly.

mod frame;
mod replay;
mod source;

pub use frame::{Button, ControllerId, MotionFrame, TaggedFrame};
pub use replay::{Recording, ReplaySource};
pub use source::FrameSource;
