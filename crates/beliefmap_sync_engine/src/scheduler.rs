//! Background retry loop for the pending-write queue.

use crate::error::{SyncError, SyncResult};
use crate::queue::PendingQueue;
use crate::task::SyncTask;
use crate::transport::{bounded, RemoteState};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// The current state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No polling loop is running.
    Idle,
    /// The polling loop is running and retries the queue on every tick.
    Polling,
}

/// Connectivity summary shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Connected and nothing is waiting to be sent.
    Online,
    /// Connected, but some writes have not been acknowledged yet.
    Pending,
    /// The client is marked offline.
    Offline,
}

impl SyncStatus {
    /// Returns a short lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Online => "online",
            SyncStatus::Pending => "pending",
            SyncStatus::Offline => "offline",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queued write that could not be delivered during a drain pass.
#[derive(Debug)]
pub struct DrainFailure {
    /// Key of the queued write.
    pub name: String,
    /// Why the send failed.
    pub error: SyncError,
}

/// Result of one drain pass over the pending-write queue.
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Number of queued items a send was attempted for.
    pub attempted: usize,
    /// Number of items the server acknowledged.
    pub synced: usize,
    /// Queue length after the pass.
    pub remaining: usize,
    /// Items left in the queue because their send failed.
    pub failures: Vec<DrainFailure>,
}

impl DrainReport {
    /// Returns true if every attempted send succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
struct LoopState {
    state: SchedulerState,
    handle: Option<JoinHandle<()>>,
}

struct Inner {
    queue: PendingQueue,
    remote: Arc<dyn RemoteState>,
    request_timeout: Duration,
    poll_interval: Duration,
    online: AtomicBool,
    loop_state: Mutex<LoopState>,
    drain_lock: tokio::sync::Mutex<()>,
    runtime: Handle,
}

/// Retries queued writes on connectivity changes and on a fixed cadence.
///
/// The scheduler has two states. It moves from [`SchedulerState::Idle`] to
/// [`SchedulerState::Polling`] when connectivity is restored or when
/// [`start`](Self::start) finds a non-empty queue. While polling, every tick
/// either drains the queue or, if the queue is empty, stops the loop and
/// returns to idle. There is no backoff.
///
/// At most one polling loop runs at a time and drain passes never overlap.
#[derive(Clone)]
pub struct SyncScheduler {
    inner: Arc<Inner>,
}

impl SyncScheduler {
    /// Creates an idle scheduler that assumes the client is online.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoRuntime`] when called outside a Tokio runtime.
    pub fn new(
        queue: PendingQueue,
        remote: Arc<dyn RemoteState>,
        request_timeout: Duration,
        poll_interval: Duration,
    ) -> SyncResult<Self> {
        let runtime = Handle::try_current().map_err(|_| SyncError::NoRuntime)?;
        Ok(Self {
            inner: Arc::new(Inner {
                queue,
                remote,
                request_timeout,
                poll_interval,
                online: AtomicBool::new(true),
                loop_state: Mutex::new(LoopState {
                    state: SchedulerState::Idle,
                    handle: None,
                }),
                drain_lock: tokio::sync::Mutex::new(()),
                runtime,
            }),
        })
    }

    /// Starts polling if writes are pending from a previous session.
    ///
    /// Calling this again while a loop is running has no effect.
    pub fn start(&self) -> SchedulerState {
        if self.inner.queue.has_pending() {
            Inner::ensure_polling(&self.inner);
        }
        self.state()
    }

    /// Handles a connectivity-restored event.
    ///
    /// Runs one drain pass immediately, then makes sure the polling loop is active.
    pub fn notify_online(&self) -> SyncTask<DrainReport> {
        self.inner.online.store(true, Ordering::SeqCst);
        info!("connectivity restored");

        let inner = Arc::clone(&self.inner);
        let task = self.inner.runtime.spawn(async move {
            let report = inner.drain().await;
            Inner::ensure_polling(&inner);
            report
        });
        SyncTask::new(task)
    }

    /// Handles a connectivity-lost event.
    ///
    /// Only the status changes; a running polling loop keeps its cadence.
    pub fn notify_offline(&self) {
        self.inner.online.store(false, Ordering::SeqCst);
        info!("connectivity lost");
    }

    /// Returns true if the client is marked online.
    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst)
    }

    /// Runs one drain pass regardless of connectivity.
    pub async fn drain_once(&self) -> DrainReport {
        self.inner.drain().await
    }

    /// Runs one drain pass on demand.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotConnected`] when the client is marked offline.
    pub async fn sync_now(&self) -> SyncResult<DrainReport> {
        if !self.is_online() {
            return Err(SyncError::NotConnected);
        }
        Ok(self.inner.drain().await)
    }

    /// Returns the scheduler state.
    pub fn state(&self) -> SchedulerState {
        self.inner.loop_state.lock().state
    }

    /// Returns the user-facing status. Offline takes priority over pending.
    pub fn status(&self) -> SyncStatus {
        if !self.is_online() {
            SyncStatus::Offline
        } else if self.inner.queue.has_pending() {
            SyncStatus::Pending
        } else {
            SyncStatus::Online
        }
    }

    /// Stops the polling loop. The queue is left untouched.
    pub fn shutdown(&self) {
        let mut loop_state = self.inner.loop_state.lock();
        if let Some(handle) = loop_state.handle.take() {
            handle.abort();
        }
        loop_state.state = SchedulerState::Idle;
        debug!("scheduler shut down");
    }
}

impl Inner {
    /// Spawns the polling loop unless one is already running.
    fn ensure_polling(this: &Arc<Self>) -> bool {
        let mut loop_state = this.loop_state.lock();
        let running = loop_state
            .handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished());
        if loop_state.state == SchedulerState::Polling && running {
            return false;
        }

        let inner = Arc::clone(this);
        loop_state.handle = Some(this.runtime.spawn(async move { inner.poll().await }));
        loop_state.state = SchedulerState::Polling;
        debug!(interval = ?this.poll_interval, "polling started");
        true
    }

    async fn poll(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if self.go_idle_if_empty() {
                debug!("queue empty, polling stopped");
                return;
            }

            let report = self.drain().await;
            debug!(
                synced = report.synced,
                remaining = report.remaining,
                "poll tick drained queue"
            );
        }
    }

    fn go_idle_if_empty(&self) -> bool {
        let mut loop_state = self.loop_state.lock();
        if self.queue.has_pending() {
            return false;
        }
        loop_state.state = SchedulerState::Idle;
        // Dropping our own handle detaches this task, which is about to return
        loop_state.handle = None;
        true
    }

    async fn drain(&self) -> DrainReport {
        let _guard = self.drain_lock.lock().await;

        let items = self.queue.drain();
        let mut report = DrainReport {
            attempted: items.len(),
            ..DrainReport::default()
        };

        for item in items {
            match bounded(self.request_timeout, self.remote.send(&item.name, &item.value)).await {
                Ok(_) => {
                    self.queue.dequeue_sent(&item.name, &item.value);
                    report.synced += 1;
                }
                Err(error) => {
                    warn!(name = %item.name, error = %error, "retry failed, keeping queued write");
                    report.failures.push(DrainFailure {
                        name: item.name,
                        error,
                    });
                }
            }
        }

        report.remaining = self.queue.len();
        report
    }
}

impl std::fmt::Debug for SyncScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncScheduler")
            .field("state", &self.state())
            .field("online", &self.is_online())
            .field("poll_interval", &self.inner.poll_interval)
            .finish_non_exhaustive()
    }
}
