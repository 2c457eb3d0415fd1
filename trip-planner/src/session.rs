use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::pipeline::RunState;

pub const SESSION_COOKIE: &str = "trip_session";

struct SessionEntry {
    state: Arc<Mutex<RunState>>,
    last_seen: Instant,
}

/// Run state per browser session. The per-session mutex is held for a whole
/// run, so a session has at most one run in flight.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Looks up the session named by the cookie value, starting a new one when
    /// it is missing, malformed or expired.
    pub async fn get_or_create(&self, cookie: Option<&str>) -> (Uuid, Arc<Mutex<RunState>>) {
        let mut sessions = self.inner.write().await;
        let now = Instant::now();
        let ttl = self.ttl;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) <= ttl);
        if sessions.len() != before {
            debug!(evicted = before - sessions.len(), "expired sessions evicted");
        }

        if let Some(id) = cookie.and_then(|raw| Uuid::parse_str(raw).ok()) {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = now;
                return (id, entry.state.clone());
            }
        }

        let id = Uuid::new_v4();
        let state = Arc::new(Mutex::new(RunState::default()));
        sessions.insert(
            id,
            SessionEntry {
                state: state.clone(),
                last_seen: now,
            },
        );
        (id, state)
    }

    /// Existing session only; never creates one.
    pub async fn get(&self, cookie: Option<&str>) -> Option<Arc<Mutex<RunState>>> {
        let id = Uuid::parse_str(cookie?).ok()?;
        let sessions = self.inner.read().await;
        let entry = sessions.get(&id)?;
        if entry.last_seen.elapsed() > self.ttl {
            return None;
        }
        Some(entry.state.clone())
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

pub fn session_cookie(id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}
