//! Bounded pool of browser sessions.
//!
//! Browser processes are expensive to start and capped by host memory, so a
//! fixed-size pool is launched up front and sessions are lent out one search
//! at a time. A session is `idle` (queued here), `leased` (held by exactly
//! one caller), or `broken` (being torn down and replaced after a failure);
//! a broken session re-enters the idle queue only as a freshly launched
//! replacement.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify, Semaphore};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::browser::BrowserSession;
use crate::{Result, SearchError};

/// How many times a recycle retries launching a replacement process.
const RELAUNCH_ATTEMPTS: usize = 3;
const RELAUNCH_BACKOFF: Duration = Duration::from_millis(500);

/// Starts and stops the browser processes backing pooled sessions.
///
/// The pool only ever touches sessions through this seam, which keeps the
/// lifecycle logic testable without Chromium.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Launches a fresh browser session.
    async fn launch(&self) -> Result<BrowserSession>;

    /// Terminates the session's browser process.
    async fn teardown(&self, session: BrowserSession) -> Result<()>;
}

/// Sizing and timing for the pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of concurrently live browser sessions.
    pub size: usize,
    /// How long an acquirer waits for an idle session.
    pub acquire_timeout: Duration,
    /// How long shutdown waits for in-flight leases.
    pub drain_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: 4,
            acquire_timeout: Duration::from_secs(10),
            drain_timeout: Duration::from_secs(30),
        }
    }
}

/// A bounded pool of browser sessions with acquire/release semantics.
pub struct BrowserPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    config: PoolConfig,
    launcher: Arc<dyn SessionLauncher>,
    idle: Mutex<VecDeque<BrowserSession>>,
    /// Permit count mirrors the idle queue length; acquirers queue FIFO.
    slots: Semaphore,
    leased: AtomicUsize,
    closed: AtomicBool,
    drained: Notify,
}

impl BrowserPool {
    /// Launches `config.size` sessions and opens the pool for business.
    ///
    /// Fails if any launch fails; partially launched sessions are torn down
    /// before the error propagates.
    pub async fn start(config: PoolConfig, launcher: Arc<dyn SessionLauncher>) -> Result<Self> {
        if config.size == 0 {
            return Err(SearchError::InvalidInput(
                "pool size must be at least 1".to_string(),
            ));
        }

        let mut sessions = VecDeque::with_capacity(config.size);
        for _ in 0..config.size {
            match launcher.launch().await {
                Ok(session) => sessions.push_back(session),
                Err(e) => {
                    warn!("pool startup aborted: {}", e);
                    while let Some(session) = sessions.pop_front() {
                        let _ = launcher.teardown(session).await;
                    }
                    return Err(e);
                }
            }
        }

        info!(size = config.size, "browser pool started");
        let size = config.size;
        Ok(Self {
            inner: Arc::new(PoolInner {
                config,
                launcher,
                idle: Mutex::new(sessions),
                slots: Semaphore::new(size),
                leased: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
                drained: Notify::new(),
            }),
        })
    }

    /// Waits for an idle session, bounded by the configured acquire timeout.
    ///
    /// Waiting callers are queued fairly and do not block pool bookkeeping.
    /// Fails with [`SearchError::PoolExhausted`] when the timeout elapses and
    /// [`SearchError::PoolClosed`] once shutdown has begun.
    pub async fn acquire(&self) -> Result<SessionLease> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(SearchError::PoolClosed);
        }

        let permit = match timeout(self.inner.config.acquire_timeout, self.inner.slots.acquire())
            .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(SearchError::PoolClosed),
            Err(_) => return Err(SearchError::PoolExhausted),
        };
        // The permit is re-added when the session comes back via reclaim.
        permit.forget();

        let session = self
            .inner
            .idle
            .lock()
            .await
            .pop_front()
            .expect("semaphore permit guarantees an idle session");
        self.inner.leased.fetch_add(1, Ordering::AcqRel);
        debug!(session = session.id(), "session leased");

        Ok(SessionLease {
            session: Some(session),
            inner: Arc::clone(&self.inner),
        })
    }

    /// Idle sessions currently available for acquisition.
    pub fn available(&self) -> usize {
        self.inner.slots.available_permits()
    }

    /// Sessions currently out on lease.
    pub fn leased(&self) -> usize {
        self.inner.leased.load(Ordering::Acquire)
    }

    /// Stops lending sessions, waits (bounded) for in-flight leases, then
    /// terminates every remaining browser process.
    pub async fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("browser pool shutting down");
        // Wake queued acquirers immediately instead of letting them ride out
        // their timeout.
        self.inner.slots.close();

        let drain = async {
            loop {
                let notified = self.inner.drained.notified();
                tokio::pin!(notified);
                if self.inner.leased.load(Ordering::Acquire) == 0 {
                    break;
                }
                notified.await;
            }
        };
        if timeout(self.inner.config.drain_timeout, drain).await.is_err() {
            warn!(
                leased = self.inner.leased.load(Ordering::Acquire),
                "drain timeout elapsed with sessions still leased"
            );
        }

        let mut idle = self.inner.idle.lock().await;
        while let Some(session) = idle.pop_front() {
            let id = session.id();
            if let Err(e) = self.inner.launcher.teardown(session).await {
                warn!(session = id, "teardown during shutdown failed: {}", e);
            }
        }
        info!("browser pool shut down");
    }
}

impl PoolInner {
    /// Returns a session to the pool at the end of one search.
    ///
    /// Healthy sessions go straight back to the idle queue. Unhealthy ones
    /// are marked broken and replaced in the background so one crashed
    /// process cannot poison the rest of the pool.
    async fn reclaim(self: &Arc<Self>, session: BrowserSession, healthy: bool) {
        if healthy {
            debug!(session = session.id(), "session released healthy");
            self.idle.lock().await.push_back(session);
            self.slots.add_permits(1);
        } else {
            self.spawn_recycle(session);
        }
        self.finish_lease();
    }

    fn finish_lease(&self) {
        if self.leased.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.drained.notify_waiters();
        }
    }

    /// Tears down a broken session and launches its replacement. The slot's
    /// permit stays withheld for the whole recycle, so a broken session is
    /// never observable by an acquirer.
    fn spawn_recycle(self: &Arc<Self>, session: BrowserSession) {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let broken_id = session.id();
            debug!(session = broken_id, "recycling broken session");
            if let Err(e) = inner.launcher.teardown(session).await {
                warn!(session = broken_id, "teardown of broken session failed: {}", e);
            }
            if inner.closed.load(Ordering::Acquire) {
                return;
            }
            for attempt in 1..=RELAUNCH_ATTEMPTS {
                match inner.launcher.launch().await {
                    Ok(fresh) => {
                        // Shutdown may have drained the idle queue while the
                        // replacement was launching.
                        if inner.closed.load(Ordering::Acquire) {
                            let _ = inner.launcher.teardown(fresh).await;
                            return;
                        }
                        let fresh_id = fresh.id();
                        inner.idle.lock().await.push_back(fresh);
                        inner.slots.add_permits(1);
                        debug!(
                            broken = broken_id,
                            replacement = fresh_id,
                            "session recycled"
                        );
                        return;
                    }
                    Err(e) => {
                        warn!(attempt, "replacement launch failed: {}", e);
                        tokio::time::sleep(RELAUNCH_BACKOFF).await;
                    }
                }
            }
            error!("could not replace broken session; pool capacity reduced by one");
        });
    }
}

/// Exclusive access to one session for the scope of one search.
///
/// Call [`SessionLease::release`] on every completion path. A lease dropped
/// without an explicit release (cancellation, panic, early return) recycles
/// its session conservatively, so the pool never leaks a leased slot.
pub struct SessionLease {
    session: Option<BrowserSession>,
    inner: Arc<PoolInner>,
}

impl SessionLease {
    /// The leased session.
    pub fn session(&self) -> &BrowserSession {
        self.session
            .as_ref()
            .expect("lease accessed after release")
    }

    /// Hands the session back. `healthy: false` marks it broken and triggers
    /// an asynchronous recycle.
    pub async fn release(mut self, healthy: bool) {
        if let Some(session) = self.session.take() {
            self.inner.reclaim(session, healthy).await;
        }
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            // Cancelled or panicked mid-search; the page state is unknown.
            warn!(
                session = session.id(),
                "lease dropped without release; recycling session"
            );
            self.inner.spawn_recycle(session);
            self.inner.finish_lease();
        }
    }
}
