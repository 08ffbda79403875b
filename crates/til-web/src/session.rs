//! Per-visitor page state, keyed by a session cookie.

use std::sync::Arc;
use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use til_store::FactStore;

use crate::state::FeedController;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "til_session";

/// Sessions idle for longer than this are dropped when a new one opens.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

struct Session {
    feed: Arc<FeedController>,
    last_seen: Instant,
}

/// One [`FeedController`] per visitor, all sharing the same store.
pub struct Sessions {
    store: Arc<dyn FactStore>,
    sessions: DashMap<Uuid, Session>,
    idle_timeout: Duration,
}

impl Sessions {
    pub fn new(store: Arc<dyn FactStore>) -> Self {
        Self::with_idle_timeout(store, SESSION_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(store: Arc<dyn FactStore>, idle_timeout: Duration) -> Self {
        Self {
            store,
            sessions: DashMap::new(),
            idle_timeout,
        }
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Find the visitor's feed. A missing, malformed or expired cookie opens
    /// a new session and the returned jar sets its cookie.
    pub fn resolve(&self, jar: CookieJar) -> (CookieJar, Arc<FeedController>) {
        let now = Instant::now();

        let known = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());
        if let Some(id) = known {
            if let Some(mut session) = self.sessions.get_mut(&id) {
                session.last_seen = now;
                return (jar, Arc::clone(&session.feed));
            }
        }

        self.prune(now);

        let id = Uuid::new_v4();
        let feed = Arc::new(FeedController::new(Arc::clone(&self.store)));
        self.sessions.insert(
            id,
            Session {
                feed: Arc::clone(&feed),
                last_seen: now,
            },
        );
        debug!(session = %id, open = self.sessions.len(), "opened session");

        let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
        (jar.add(cookie), feed)
    }

    fn prune(&self, now: Instant) {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| now.duration_since(session.last_seen) < self.idle_timeout);
        let dropped = before.saturating_sub(self.sessions.len());
        if dropped > 0 {
            debug!(dropped, "dropped idle sessions");
        }
    }
}
