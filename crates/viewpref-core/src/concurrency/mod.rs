//! Concurrency primitives for overlapping navigation events
//!
//! - [`ReentrancyGuard`]: at most one resolve-or-save cycle per preference key;
//!   later duplicates are dropped, not queued.
//! - [`NavigationTracker`]: keep-only-the-latest discipline across
//!   navigations; starting a navigation cancels the previous one.
//! - [`HostReadiness`]: a signal the host raises once its active view is
//!   known, awaited instead of polling.

pub mod guard;
pub mod readiness;
pub mod tracker;

pub use guard::{InFlight, ReentrancyGuard};
pub use readiness::{ActiveView, HostReadiness};
pub use tracker::{NavigationTicket, NavigationTracker};
