//! Per-browser session context.
//!
//! A context is created on the first visit, replaced wholesale when the user
//! switches project, and dropped on logout or after sitting idle longer than
//! the store's TTL. It carries the project scope for API calls, the session's
//! wizard, and pending flash messages.

use chrono::{DateTime, Duration, Utc};
use hex::encode as hex_encode;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::SESSION_TTL_HOURS;
use crate::models::ProjectScope;
use crate::wizard::WizardController;

#[derive(Debug, Clone)]
pub struct SessionContext {
    pub id: String,
    pub scope: ProjectScope,
    /// Last time a handler touched the session.
    pub last_seen: DateTime<Utc>,
    pub wizard: WizardController,
    flash: Vec<String>,
}

impl SessionContext {
    fn new(id: String, scope: ProjectScope, max_submit_attempts: u32) -> Self {
        Self {
            id,
            scope,
            last_seen: Utc::now(),
            wizard: WizardController::new(max_submit_attempts),
            flash: Vec::new(),
        }
    }

    pub fn flash(&mut self, msg: impl Into<String>) {
        self.flash.push(msg.into());
    }

    pub fn take_flash(&mut self) -> Vec<String> {
        std::mem::take(&mut self.flash)
    }

    fn expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_seen > ttl
    }
}

pub fn random_session_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex_encode(bytes)
}

/// In-memory session map shared by all handlers.
/// Idle sessions are evicted once they outlive `ttl`.
#[derive(Clone, Debug)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, SessionContext>>>,
    max_submit_attempts: u32,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(max_submit_attempts: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            max_submit_attempts,
            ttl: Duration::hours(SESSION_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionContext>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a session scoped to `project_id` and return its id.
    pub fn create(&self, project_id: &str) -> String {
        let id = random_session_id();
        let ctx = SessionContext::new(id.clone(), ProjectScope::new(project_id), self.max_submit_attempts);
        let mut sessions = self.lock();
        purge(&mut sessions, Utc::now(), self.ttl);
        sessions.insert(id.clone(), ctx);
        tracing::info!(session = %short(&id), project = %project_id, live = sessions.len(), "Session created");
        id
    }

    /// Whether `id` names a live session. An expired one is dropped here.
    pub fn contains(&self, id: &str) -> bool {
        let mut sessions = self.lock();
        match sessions.get(id) {
            Some(ctx) if ctx.expired(Utc::now(), self.ttl) => {
                sessions.remove(id);
                tracing::info!(session = %short(id), "Session expired");
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Run `f` against the session while holding the store lock, marking it
    /// as seen. Expired sessions are treated as missing.
    /// Never call this across an `.await`.
    pub fn with<R>(&self, id: &str, f: impl FnOnce(&mut SessionContext) -> R) -> Option<R> {
        let now = Utc::now();
        let mut sessions = self.lock();
        let ctx = sessions.get_mut(id)?;
        if ctx.expired(now, self.ttl) {
            sessions.remove(id);
            tracing::info!(session = %short(id), "Session expired");
            return None;
        }
        ctx.last_seen = now;
        Some(f(ctx))
    }

    /// Drop every session idle for longer than the TTL as of `now`.
    /// Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        purge(&mut self.lock(), now, self.ttl)
    }

    /// Replace the session's context with a fresh one for another project.
    /// The wizard and any cached catalog are discarded.
    pub fn switch_project(&self, id: &str, project_id: &str) -> bool {
        let mut sessions = self.lock();
        match sessions.get_mut(id) {
            Some(ctx) => {
                let mut fresh = SessionContext::new(id.to_string(), ProjectScope::new(project_id), self.max_submit_attempts);
                fresh.flash = std::mem::take(&mut ctx.flash);
                *ctx = fresh;
                tracing::info!(session = %short(id), project = %project_id, "Project switched");
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: &str) -> bool {
        let removed = self.lock().remove(id).is_some();
        if removed {
            tracing::info!(session = %short(id), "Session cleared");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn purge(sessions: &mut HashMap<String, SessionContext>, now: DateTime<Utc>, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, ctx| !ctx.expired(now, ttl));
    let removed = before - sessions.len();
    if removed > 0 {
        tracing::info!(removed, "Expired sessions purged");
    }
    removed
}

fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
