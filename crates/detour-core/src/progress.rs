//! Progress notifications emitted while a plan is computed.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvoidanceStage {
    DirectRoute,
    ConflictCheck,
    NaturalAlternatives,
    NetworkBuild,
    Explore,
    Evaluate,
    Fallback,
    Complete,
}

impl fmt::Display for AvoidanceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AvoidanceStage::DirectRoute => "direct_route",
            AvoidanceStage::ConflictCheck => "conflict_check",
            AvoidanceStage::NaturalAlternatives => "natural_alternatives",
            AvoidanceStage::NetworkBuild => "network_build",
            AvoidanceStage::Explore => "explore",
            AvoidanceStage::Evaluate => "evaluate",
            AvoidanceStage::Fallback => "fallback",
            AvoidanceStage::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Receives stage transitions and per-candidate details.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, stage: AvoidanceStage, detail: &str);
}

/// Observer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&self, _stage: AvoidanceStage, _detail: &str) {}
}
