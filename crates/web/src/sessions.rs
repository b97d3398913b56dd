//! Per-client lookup sessions, keyed by a cookie.
//!
//! Each browser gets its own [`LookupSession`], so one visitor's submission
//! never replaces or cancels what another visitor is looking at.

use axum::http::{header, HeaderMap};
use enslookup_core::{EnsBackend, LookupSession};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "enslookup_session";
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

struct Entry {
    session: LookupSession,
    last_seen: Instant,
}

pub struct SessionStore {
    backend: Arc<dyn EnsBackend>,
    idle_timeout: Duration,
    sessions: Mutex<HashMap<String, Entry>>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn EnsBackend>, idle_timeout: Duration) -> Self {
        Self {
            backend,
            idle_timeout,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// The live session stored under `id`, refreshing its idle timer.
    pub fn get(&self, id: &str) -> Option<LookupSession> {
        let mut sessions = self.sessions.lock();
        let entry = sessions.get_mut(id)?;
        if entry.last_seen.elapsed() > self.idle_timeout {
            sessions.remove(id);
            debug!(session = id, "lookup session expired");
            return None;
        }
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    /// The session for `id`, or a new one under a freshly issued id when
    /// `id` is absent, unknown or expired. The flag is `true` for new ids.
    pub fn get_or_create(&self, id: Option<&str>) -> (String, LookupSession, bool) {
        if let Some(id) = id {
            if let Some(session) = self.get(id) {
                return (id.to_string(), session, false);
            }
        }

        let id = Uuid::new_v4().to_string();
        let session = LookupSession::new(self.backend.clone());
        let mut sessions = self.sessions.lock();
        let idle_timeout = self.idle_timeout;
        sessions.retain(|_, entry| entry.last_seen.elapsed() <= idle_timeout);
        sessions.insert(
            id.clone(),
            Entry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        debug!(session = %id, live = sessions.len(), "lookup session created");
        (id, session, true)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The session id carried in the request's `Cookie` headers.
pub fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
}

/// `Set-Cookie` value binding the client to session `id`.
pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}
