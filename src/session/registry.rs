// src/session/registry.rs
// =============================================================================
// Process-wide table of in-flight crawls.
//
// The crawl registers a session before it starts and removes it when it ends.
// Cancel and progress requests arrive on other tasks (another HTTP request,
// a Ctrl+C handler) and look sessions up by *caller*, not by exact id, since
// the caller never sees the id it was given.
//
// The map lives behind a mutex. Every method takes the lock, does its work
// on plain data and releases it before returning; nothing awaits while
// holding it.
// =============================================================================

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::state::{CallerId, Session, SessionId, SessionSnapshot};

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Inserts a fresh session (not cancelled, 0%) and returns it.
    ///
    /// Registering an id that is already live replaces the old entry.
    pub fn register(&self, id: SessionId) -> Arc<Session> {
        let session = Arc::new(Session::new(id.clone()));
        debug!(session = %id, "session registered");
        self.sessions.lock().insert(id, Arc::clone(&session));
        session
    }

    /// Like `register`, but the returned guard unregisters on drop.
    pub fn register_guarded(self: &Arc<Self>, id: SessionId) -> SessionGuard {
        let session = self.register(id);
        SessionGuard {
            registry: Arc::clone(self),
            session,
        }
    }

    /// Cancels every live session of `caller`.
    ///
    /// Returns how many sessions were newly cancelled; sessions that were
    /// already cancelled are left alone, so calling this twice is harmless.
    pub fn mark_cancelled(&self, caller: &CallerId) -> usize {
        let sessions = self.sessions.lock();
        let cancelled = sessions
            .values()
            .filter(|session| session.id().caller() == caller)
            .filter(|session| session.cancel())
            .count();
        if cancelled > 0 {
            info!(%caller, cancelled, "cancellation requested");
        }
        cancelled
    }

    /// Progress of the most recently started live session of `caller`.
    pub fn progress(&self, caller: &CallerId) -> Option<SessionSnapshot> {
        let sessions = self.sessions.lock();
        sessions
            .values()
            .filter(|session| session.id().caller() == caller)
            .max_by_key(|session| session.id().started_at())
            .map(|session| session.snapshot())
    }

    /// Removes a session. Returns false if it was already gone.
    pub fn unregister(&self, id: &SessionId) -> bool {
        let removed = self.sessions.lock().remove(id).is_some();
        if removed {
            debug!(session = %id, "session unregistered");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A registered session that removes itself from the registry when dropped.
///
/// Dropping happens on every way out of an analysis: success, error,
/// cancellation, a panic, or the analysis future itself being dropped.
#[derive(Debug)]
pub struct SessionGuard {
    registry: Arc<SessionRegistry>,
    session: Arc<Session>,
}

impl SessionGuard {
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.unregister(self.session.id());
    }
}
