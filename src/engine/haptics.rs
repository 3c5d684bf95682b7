//! Haptic feedback requests

use crate::sources::ControllerId;
use tracing::debug;

/// Accepts rumble commands for a controller
///
/// Calls are fire-and-forget: the engine never waits on them or learns
/// whether the motor actually turned. The engine turns rumble on for the
/// frame that struck a note and off on the next frame without a hit.
pub trait Haptics: Send {
    fn set_rumble(&mut self, controller: ControllerId, on: bool);
}

/// Discards every request
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHaptics;

impl Haptics for NullHaptics {
    fn set_rumble(&mut self, _controller: ControllerId, _on: bool) {}
}

/// Logs requests, for running without hardware
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHaptics;

impl Haptics for TracingHaptics {
    fn set_rumble(&mut self, controller: ControllerId, on: bool) {
        debug!(%controller, on, "rumble");
    }
}
