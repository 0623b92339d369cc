pub mod association;
pub mod model;
pub mod throttle;
pub mod runner;
pub mod event;

pub use association::{associate, Association};
pub use model::build_graph;
pub use throttle::{Equalizer, KeepThrottle, ThrottlePolicy};
pub use runner::{run_with, BurnSimulator, RunState};
pub use event::{BurnPhase, BurnReport, EventKind, SimEvent};

use tracing::debug;

use crate::config::SimSettings;
use crate::vehicle::VehicleSnapshot;

/// Delta-V magnitude obtainable from the vehicle's remaining propellant.
pub fn delta_v(vehicle: &VehicleSnapshot, settings: &SimSettings) -> f64 {
    analyze(vehicle, settings).magnitude()
}

/// Full run with the default throttle policy, keeping the per-phase report.
pub fn analyze(vehicle: &VehicleSnapshot, settings: &SimSettings) -> BurnReport {
    analyze_with(vehicle, settings, Equalizer::new())
}

/// Full run with a caller-supplied throttle policy.
pub fn analyze_with<P: ThrottlePolicy>(
    vehicle: &VehicleSnapshot,
    settings: &SimSettings,
    policy: P,
) -> BurnReport {
    let assoc = associate(vehicle, settings);
    let graph = build_graph(vehicle, &assoc, settings);
    debug!(
        vehicle = %vehicle.name,
        units = graph.unit_count(),
        pools = graph.pool_count(),
        policy = policy.name(),
        "simulation graph built"
    );
    run_with(vehicle.mass, graph, policy)
}
