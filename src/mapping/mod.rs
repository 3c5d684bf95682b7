//! Gesture mapping components
//!
//! Turns continuous motion readings into discrete musical decisions:
//! dead zones, joystick quantization, impact detection, pitch bend and
//! note bookkeeping. The engine composes these per frame.

mod bend;
mod conditioner;
mod impact;
mod notes;
mod quantize;

pub use bend::{bend_offset, PitchBendShaper, BEND_CENTER};
pub use conditioner::{filter_magnitude, filter_roll, wrap_degrees, SignalConditioner};
pub use impact::{Hit, ImpactDetector};
pub use notes::{NoteLifecycleManager, NoteModifier, Strike};
pub use quantize::{bucket_for_angle, canonical_bucket, Scale, ScaleQuantizer, ScaleTable, BUCKET_DEGREES};
