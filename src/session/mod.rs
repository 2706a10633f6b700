// src/session/mod.rs
// =============================================================================
// Session bookkeeping shared by the crawl and by out-of-band
// cancel / progress requests.
// =============================================================================

mod registry;
mod state;

pub use registry::{SessionGuard, SessionRegistry};
pub use state::{depth_progress, CallerId, Session, SessionId, SessionSnapshot};
