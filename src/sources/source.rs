//! Frame source trait

use super::TaggedFrame;
use tokio::sync::broadcast;

/// Trait for anything that produces controller frames
pub trait FrameSource: Send + Sync {
    /// Get the name of this source
    fn name(&self) -> &str;

    /// Start producing frames
    fn start(&mut self) -> anyhow::Result<()>;

    /// Stop producing frames
    fn stop(&mut self);

    /// Check if the source is running
    fn is_running(&self) -> bool;

    /// Subscribe to frames from this source
    fn subscribe(&self) -> broadcast::Receiver<TaggedFrame>;
}
