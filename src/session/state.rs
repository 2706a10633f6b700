// src/session/state.rs
// =============================================================================
// The bookkeeping record for one in-flight crawl.
//
// Two independent paths touch a session while the crawl runs:
// - the crawl task writes the progress fields and reads the cancel flag
// - cancel requests write the cancel flag, progress requests read progress
//
// The cancel flag is an AtomicBool so the crawl can poll it cheaply between
// every entry. Progress fields change together, so they share one small mutex
// that is only held for a copy or an assignment, never across an .await.
// =============================================================================

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Opaque identity of whoever started an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CallerId(String);

impl CallerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one session: the caller plus the instant it started.
///
/// Two sessions started by the same caller in the same millisecond get the
/// same id. The registry does not guard against that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId {
    caller: CallerId,
    started_at: DateTime<Utc>,
}

impl SessionId {
    pub fn new(caller: CallerId, started_at: DateTime<Utc>) -> Self {
        Self { caller, started_at }
    }

    /// A session id for `caller` starting now.
    pub fn start(caller: CallerId) -> Self {
        Self::new(caller, Utc::now())
    }

    pub fn caller(&self) -> &CallerId {
        &self.caller
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.caller, self.started_at.timestamp_millis())
    }
}

/// Copy of a session's progress fields at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub progress_percent: u8,
    pub current_depth: usize,
    pub current_path: String,
    pub cancelled: bool,
}

#[derive(Debug, Default)]
struct Progress {
    percent: u8,
    depth: usize,
    path: String,
}

/// One in-flight crawl. Shared as `Arc<Session>` between the registry and the
/// crawl; the crawl uses it as its cancellation token and progress sink.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    cancelled: AtomicBool,
    progress: Mutex<Progress>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            cancelled: AtomicBool::new(false),
            progress: Mutex::new(Progress::default()),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Sets the cancel flag. Returns true only for the call that flipped it.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::SeqCst)
    }

    /// Records the last visited directory.
    ///
    /// The percentage never goes down: the crawl reports on its way back up
    /// the tree too, and a polling client must not see it move backwards.
    pub fn record_progress(&self, depth: usize, max_depth: usize, path: &str) {
        let estimate = depth_progress(depth, max_depth);
        let mut progress = self.progress.lock();
        progress.percent = progress.percent.max(estimate);
        progress.depth = depth;
        progress.path.clear();
        progress.path.push_str(path);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let progress = self.progress.lock();
        SessionSnapshot {
            session_id: self.id.to_string(),
            progress_percent: progress.percent,
            current_depth: progress.depth,
            current_path: progress.path.clone(),
            cancelled: self.is_cancelled(),
        }
    }
}

/// `min(100, round(100 * depth / max_depth))`.
///
/// A crude estimate: the size of the remaining subtree is unknown until it
/// has been walked, so depth is the only monotonic signal available.
pub fn depth_progress(depth: usize, max_depth: usize) -> u8 {
    if max_depth == 0 {
        return 100;
    }
    let percent = (100.0 * depth as f64 / max_depth as f64).round();
    percent.min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session() -> Session {
        let started = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        Session::new(SessionId::new(CallerId::new("alice"), started))
    }

    #[test]
    fn test_session_id_display_uses_caller_and_millis() {
        assert_eq!(session().id().to_string(), "alice-1700000000000");
    }

    #[test]
    fn test_depth_progress_formula() {
        assert_eq!(depth_progress(0, 4), 0);
        assert_eq!(depth_progress(1, 3), 33);
        assert_eq!(depth_progress(2, 3), 67);
        assert_eq!(depth_progress(3, 3), 100);
        assert_eq!(depth_progress(7, 3), 100);
        assert_eq!(depth_progress(1, 0), 100);
    }

    #[test]
    fn test_cancel_flips_once() {
        let session = session();
        assert!(!session.is_cancelled());
        assert!(session.cancel());
        assert!(!session.cancel());
        assert!(session.is_cancelled());
    }

    #[test]
    fn test_progress_percent_never_decreases() {
        let session = session();
        session.record_progress(2, 4, "a/b");
        assert_eq!(session.snapshot().progress_percent, 50);

        // Unwinding back to the root keeps the high-water mark
        session.record_progress(0, 4, "");
        let snapshot = session.snapshot();
        assert_eq!(snapshot.progress_percent, 50);
        assert_eq!(snapshot.current_depth, 0);
        assert_eq!(snapshot.current_path, "");

        session.record_progress(4, 4, "a/b/c/d");
        assert_eq!(session.snapshot().progress_percent, 100);
    }
}
