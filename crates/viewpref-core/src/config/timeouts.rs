//! Default timeout values
//!
//! All of these can be overridden through [`EngineConfig`](super::EngineConfig).

use std::time::Duration;

/// Upper bound on a single preference store lookup or save (2 seconds)
pub const STORE_CALL_MS: u64 = 2_000;

/// How long "remember current mode" waits for the host to report an active view (5 seconds)
pub const READINESS_MS: u64 = 5_000;

/// Grace period given to outstanding saves when a session ends (2 seconds)
pub const SESSION_FLUSH_MS: u64 = 2_000;

/// Get the store call timeout as Duration
pub fn store_call_timeout() -> Duration {
    Duration::from_millis(STORE_CALL_MS)
}

/// Get the readiness timeout as Duration
pub fn readiness_timeout() -> Duration {
    Duration::from_millis(READINESS_MS)
}

/// Get the session flush timeout as Duration
pub fn session_flush_timeout() -> Duration {
    Duration::from_millis(SESSION_FLUSH_MS)
}
