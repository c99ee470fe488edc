//! OSRM routing for the detour engine.
//!
//! [`RouteProvider`] asks every configured mirror, demoting those that just
//! failed, and falls back to deterministic synthetic geometry when none of
//! them answers.

pub mod backoff;
pub mod client;
pub mod provider;

#[cfg(test)]
mod test_support;

pub use client::{MirrorAttempt, MirrorStatus, OsrmClient, OsrmConfig, DEFAULT_MIRRORS};
pub use detour_core::ProviderError;
pub use provider::RouteProvider;
