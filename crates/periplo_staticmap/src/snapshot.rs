use thiserror::Error;

use crate::builder::MapImage;

/// Lifecycle of the host's interactive map widget. The handle is
/// initialized once on first use and never re-initialized; dependents must
/// treat "not yet loaded" and "failed to load" as ordinary states.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SnapshotState {
    NotLoaded,
    Ready,
    Failed,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("no interactive map is ready to capture")]
    NotReady,

    #[error("snapshot capture failed: {0}")]
    Capture(String),

    #[error("snapshot capture did not finish in time")]
    TimedOut,
}

/// Client-side rasterization of an already-rendered map, when the hosting
/// UI has one on screen.
pub trait SnapshotSource: Send + Sync {
    fn state(&self) -> SnapshotState;

    fn capture(&self) -> impl Future<Output = Result<MapImage, SnapshotError>> + Send;
}

/// The common case for headless callers: no widget, tier always skipped.
pub struct NoSnapshot;

impl SnapshotSource for NoSnapshot {
    fn state(&self) -> SnapshotState {
        SnapshotState::NotLoaded
    }

    async fn capture(&self) -> Result<MapImage, SnapshotError> {
        Err(SnapshotError::NotReady)
    }
}
