//! Detour CLI - command line tools for the detour routing service.
//!
//! Binaries:
//! - plan_route: register blockages and request an avoidance route

pub mod client;
pub mod input;

pub use client::{DetourClient, PlanSummary};
pub use input::{parse_blockage, parse_endpoint, Endpoint};
