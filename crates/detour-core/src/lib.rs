pub mod conflict;
pub mod explorer;
pub mod models;
pub mod network;
pub mod progress;
pub mod provider;
pub mod rules;
pub mod scoring;
pub mod spatial;
pub mod synthetic;

pub use conflict::ConflictDetector;
pub use explorer::PathExplorer;
pub use models::{
    Blockage, ConflictPoint, ConflictReport, CreateBlockageRequest, Location, PathCombination,
    PathPoint, RouteOutcome, RouteResult, RoutedPath, ValidationError, WaypointCandidate,
    WaypointOrigin,
};
pub use network::WaypointNetworkBuilder;
pub use progress::{AvoidanceStage, NoopObserver, ProgressObserver};
pub use provider::{control_points, ProviderError, RouteResponse, RouteSource};
pub use rules::AvoidanceRules;
pub use scoring::{score_route, RouteScore};
pub use spatial::{distance_km, distance_m, haversine_distance};
pub use synthetic::{synthesize_route, OfflineRouter, SYNTHETIC_SERVICE_NAME};
