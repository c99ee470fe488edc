//! Shared library surface for the detour server, its binaries and tests.

pub mod api;
pub mod cache;
pub mod config;
pub mod geocode;
pub mod route_planner;
pub mod state;
