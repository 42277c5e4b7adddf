//! Upload progress delivery.
//!
//! The orchestrator produces a finite, ordered sequence of [`UploadProgress`]
//! values. Delivery is fire-and-forget: a dropped receiver or a panicking
//! callback never affects the upload.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use storage_core::{UploadProgress, UploadStage};
use tokio::sync::mpsc;

pub const PREPARING_PERCENT: u8 = 10;
pub const SIGNING_PERCENT: u8 = 20;
pub const SIGNED_BUMP_PERCENT: u8 = 20;
pub const UPLOADING_PERCENT: u8 = 60;
pub const FINALIZING_PERCENT: u8 = 90;
pub const COMPLETED_PERCENT: u8 = 100;

type Callback = Arc<dyn Fn(UploadProgress) + Send + Sync>;

enum Target {
    Disabled,
    Channel(mpsc::UnboundedSender<UploadProgress>),
    Callback(Callback),
}

/// Destination for progress updates.
///
/// Also remembers the last value emitted, so later stages can build on it.
pub struct ProgressSink {
    target: Target,
    last: Mutex<UploadProgress>,
}

/// Create a sink and the receiver that observes it.
pub fn progress_channel() -> (ProgressSink, mpsc::UnboundedReceiver<UploadProgress>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSink::new(Target::Channel(tx)), rx)
}

impl ProgressSink {
    fn new(target: Target) -> Self {
        Self {
            target,
            last: Mutex::new(UploadProgress::idle()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Target::Disabled)
    }

    pub fn from_fn<F>(callback: F) -> Self
    where
        F: Fn(UploadProgress) + Send + Sync + 'static,
    {
        Self::new(Target::Callback(Arc::new(callback)))
    }

    /// Last value emitted (idle before the first update).
    pub fn current(&self) -> UploadProgress {
        *self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn emit(&self, stage: UploadStage, percent: u8) {
        let progress = UploadProgress::new(stage, percent);
        *self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = progress;

        tracing::trace!("Upload progress: {:?} {}%", progress.stage, progress.percent);

        match &self.target {
            Target::Disabled => {}
            Target::Channel(tx) => {
                // Receiver gone; the caller stopped listening.
                let _ = tx.send(progress);
            }
            Target::Callback(callback) => {
                if catch_unwind(AssertUnwindSafe(|| callback(progress))).is_err() {
                    tracing::warn!("Progress callback panicked; continuing upload");
                }
            }
        }
    }

    /// Back to idle after a failure.
    pub fn reset(&self) {
        self.emit(UploadStage::Idle, 0);
    }
}

impl Default for ProgressSink {
    fn default() -> Self {
        Self::disabled()
    }
}

impl std::fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let target = match self.target {
            Target::Disabled => "disabled",
            Target::Channel(_) => "channel",
            Target::Callback(_) => "callback",
        };
        f.debug_struct("ProgressSink")
            .field("target", &target)
            .field("last", &self.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_receives_in_order() {
        let (sink, mut rx) = progress_channel();
        sink.emit(UploadStage::Preparing, PREPARING_PERCENT);
        sink.emit(UploadStage::Uploading, UPLOADING_PERCENT);

        assert_eq!(rx.try_recv().unwrap().stage, UploadStage::Preparing);
        assert_eq!(rx.try_recv().unwrap().percent, UPLOADING_PERCENT);
        assert!(rx.try_recv().is_err());
        assert_eq!(sink.current().stage, UploadStage::Uploading);
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (sink, rx) = progress_channel();
        drop(rx);
        sink.emit(UploadStage::Completed, COMPLETED_PERCENT);
        assert_eq!(sink.current().percent, 100);
    }

    #[test]
    fn test_panicking_callback_is_contained() {
        let sink = ProgressSink::from_fn(|_| panic!("ui went away"));
        sink.emit(UploadStage::Signing, SIGNING_PERCENT);
        sink.reset();
        assert_eq!(sink.current(), UploadProgress::idle());
    }
}
