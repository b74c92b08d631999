//! Handles for background sync work.

use crate::error::{SyncError, SyncResult};
use tokio::task::JoinHandle;

/// Handle to a background sync task.
///
/// The storage contract returns immediately and never surfaces remote
/// errors, but the outcome of the remote half is still an explicit value:
/// callers may await it, or drop the handle to let the task run detached.
#[derive(Debug)]
#[must_use = "dropping the handle detaches the task; call `join` to observe its outcome"]
pub struct SyncTask<T> {
    handle: JoinHandle<T>,
}

impl<T> SyncTask<T> {
    pub(crate) fn new(handle: JoinHandle<T>) -> Self {
        Self { handle }
    }

    /// Waits for the task and returns its output.
    ///
    /// Returns `None` if the task panicked or was aborted.
    pub async fn join(self) -> Option<T> {
        self.handle.await.ok()
    }

    /// Waits for the task, reporting a panic or cancellation as an error.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::TaskFailed`] if the task did not run to completion.
    pub async fn try_join(self) -> SyncResult<T> {
        self.handle
            .await
            .map_err(|e| SyncError::TaskFailed(e.to_string()))
    }

    /// Returns true if the task has completed.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Lets the task run to completion without tracking it.
    pub fn detach(self) {}
}
