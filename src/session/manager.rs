//! Session manager
//!
//! Scoped acquisition and guaranteed release of one browser session per
//! request. This is the resource-safety core of the service: a leaked or
//! double-closed engine process is a correctness bug, so release is
//! idempotent, tolerates faulted sessions, and runs on every exit path.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::traits::{EngineDriver, EngineInstance, EngineKind, PageHandle};
use crate::{Error, Result};

/// One live browser session, scoped to exactly one request
pub struct Session {
    id: String,
    engine: EngineKind,
    instance: Box<dyn EngineInstance>,
    created_at: DateTime<Utc>,
    released: AtomicBool,
}

impl Session {
    /// Session ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Engine kind backing this session
    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    /// The session's page handle
    pub fn page(&self) -> Arc<dyn PageHandle> {
        self.instance.page()
    }

    /// Creation time
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // The engine process itself is reaped by kill_on_drop; this only
        // flags the contract violation.
        if !self.released.load(Ordering::SeqCst) {
            warn!("Session {} dropped without release", self.id);
        }
    }
}

/// Session manager
///
/// Owns the engine driver and hands out one session per request.
pub struct SessionManager {
    driver: Arc<dyn EngineDriver>,
}

impl SessionManager {
    /// Create a new session manager over a driver
    pub fn new(driver: Arc<dyn EngineDriver>) -> Self {
        Self { driver }
    }

    /// Acquire a session: one isolated headless engine plus one page
    ///
    /// Fails with `EngineUnavailable` when the requested engine cannot be
    /// started. No session exists until this returns Ok.
    pub async fn acquire(&self, kind: EngineKind) -> Result<Session> {
        let instance = self.driver.start(kind).await.map_err(|e| match e {
            Error::EngineUnavailable(_) => e,
            other => Error::engine_unavailable(other.to_string()),
        })?;

        let session = Session {
            id: Uuid::new_v4().to_string(),
            engine: kind,
            instance,
            created_at: Utc::now(),
            released: AtomicBool::new(false),
        };

        debug!("Session {} acquired ({})", session.id, kind);
        Ok(session)
    }

    /// Release a session
    ///
    /// Idempotent: releasing twice is a no-op. A shutdown failure is logged
    /// and swallowed; the request's result is already determined by the
    /// time release runs.
    pub async fn release(&self, session: &Session) {
        if session.released.swap(true, Ordering::SeqCst) {
            debug!("Session {} already released", session.id);
            return;
        }

        if let Err(e) = session.instance.shutdown().await {
            warn!("Session {} release failed: {}", session.id, e);
        } else {
            debug!("Session {} released", session.id);
        }
    }

    /// Run one request body against a fresh session
    ///
    /// Construct-on-entry, release-on-every-exit: the session is released
    /// whether the body succeeds or fails, and the body's result is returned
    /// untouched.
    pub async fn scoped<T, F, Fut>(&self, kind: EngineKind, body: F) -> Result<T>
    where
        F: FnOnce(Arc<dyn PageHandle>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let session = self.acquire(kind).await?;
        let result = body(session.page()).await;
        self.release(&session).await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::mock::{MockDriver, MockPage};

    #[tokio::test]
    async fn test_acquire_and_release() {
        let driver = Arc::new(MockDriver::new());
        let counters = driver.counters();
        let manager = SessionManager::new(driver);

        let session = manager.acquire(EngineKind::Chromium).await.unwrap();
        assert!(!session.id().is_empty());
        assert_eq!(session.engine(), EngineKind::Chromium);
        assert_eq!(counters.started(), 1);
        assert_eq!(counters.stopped(), 0);

        manager.release(&session).await;
        assert_eq!(counters.stopped(), 1);
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let driver = Arc::new(MockDriver::new());
        let counters = driver.counters();
        let manager = SessionManager::new(driver);

        let session = manager.acquire(EngineKind::Chromium).await.unwrap();
        manager.release(&session).await;
        manager.release(&session).await;
        manager.release(&session).await;

        assert_eq!(counters.started(), 1);
        assert_eq!(counters.stopped(), 1);
    }

    #[tokio::test]
    async fn test_scoped_releases_on_success() {
        let driver = Arc::new(MockDriver::new());
        let counters = driver.counters();
        let manager = SessionManager::new(driver);

        let result = manager
            .scoped(EngineKind::Firefox, |_page| async { Ok(42) })
            .await
            .unwrap();

        assert_eq!(result, 42);
        assert_eq!(counters.started(), 1);
        assert_eq!(counters.stopped(), 1);
    }

    #[tokio::test]
    async fn test_scoped_releases_on_failure() {
        let driver = Arc::new(MockDriver::new());
        let counters = driver.counters();
        let manager = SessionManager::new(driver);

        let result: Result<()> = manager
            .scoped(EngineKind::Chromium, |_page| async {
                Err(Error::internal("body fault"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(counters.started(), 1);
        assert_eq!(counters.stopped(), 1);
    }

    #[tokio::test]
    async fn test_failed_start_creates_no_session() {
        let driver = Arc::new(MockDriver::new());
        driver.fail_next_start("engine offline");
        let counters = driver.counters();
        let manager = SessionManager::new(driver);

        let result = manager.acquire(EngineKind::Chromium).await;
        assert!(matches!(result, Err(Error::EngineUnavailable(_))));
        assert_eq!(counters.started(), 0);
        assert_eq!(counters.stopped(), 0);
    }

    #[tokio::test]
    async fn test_release_tolerates_faulted_shutdown() {
        let driver = Arc::new(MockDriver::new());
        driver.fail_shutdown();
        let counters = driver.counters();
        let manager = SessionManager::new(driver);

        let session = manager.acquire(EngineKind::Chromium).await.unwrap();
        // Must not propagate the shutdown fault
        manager.release(&session).await;
        assert_eq!(counters.started(), 1);
    }

    #[tokio::test]
    async fn test_sessions_are_not_shared() {
        let page = Arc::new(MockPage::new());
        let driver = Arc::new(MockDriver::with_page(page));
        let counters = driver.counters();
        let manager = SessionManager::new(driver);

        let first = manager.acquire(EngineKind::Chromium).await.unwrap();
        let second = manager.acquire(EngineKind::Chromium).await.unwrap();

        assert_ne!(first.id(), second.id());
        assert_eq!(counters.started(), 2);

        manager.release(&first).await;
        manager.release(&second).await;
        assert_eq!(counters.stopped(), 2);
    }
}
