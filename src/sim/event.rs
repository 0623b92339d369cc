use nalgebra::Vector2;

use crate::model::{PoolId, UnitId};

// ---------------------------------------------------------------------------
// Phase records
// ---------------------------------------------------------------------------

/// Outcome of one burn phase (from one pool exhaustion to the next).
#[derive(Debug, Clone, PartialEq)]
pub struct BurnPhase {
    pub index: usize,
    pub start_time: f64,         // s since the start of the burn
    pub duration: f64,           // s
    pub global_isp: f64,
    pub global_consumption: f64, // mass/s
    pub global_thrust: f64,
    pub direction: Vector2<f64>, // thrust-weighted, |d| <= 1
    pub mass_before: f64,
    pub mass_after: f64,
    pub delta_v: f64,            // scalar, before direction weighting
    pub active_units: usize,
    pub active_pools: usize,
}

impl BurnPhase {
    /// Contribution of this phase to the accumulated delta-V vector.
    pub fn delta_v_vector(&self) -> Vector2<f64> {
        self.direction * self.delta_v
    }

    pub fn propellant_used(&self) -> f64 {
        self.mass_before - self.mass_after
    }
}

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    ThrottleEqualized,
    PoolExhausted { pool: PoolId },
    UnitOrphaned { unit: UnitId },
    /// No unit draws propellant any more, or the vehicle would lose more
    /// mass than it has.
    Stalled,
    WatchdogTripped { budget: usize },
}

/// A discrete event raised during the run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimEvent {
    pub phase: usize,
    pub time: f64,
    pub kind: EventKind,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Everything a run produced besides the final number.
#[derive(Debug, Clone, PartialEq)]
pub struct BurnReport {
    pub phases: Vec<BurnPhase>,
    pub events: Vec<SimEvent>,
    pub delta_v: Vector2<f64>,
    pub initial_mass: f64,
    pub final_mass: f64,
}

impl Default for BurnReport {
    fn default() -> Self {
        Self {
            phases: vec![],
            events: vec![],
            delta_v: Vector2::zeros(),
            initial_mass: 0.0,
            final_mass: 0.0,
        }
    }
}

impl BurnReport {
    /// Magnitude of the accumulated delta-V vector.
    pub fn magnitude(&self) -> f64 {
        self.delta_v.norm()
    }

    pub fn burn_time(&self) -> f64 {
        self.phases.iter().map(|p| p.duration).sum()
    }

    pub fn propellant_used(&self) -> f64 {
        self.initial_mass - self.final_mass
    }

    /// Sum of scalar phase delta-Vs, ignoring direction losses.
    pub fn scalar_delta_v(&self) -> f64 {
        self.phases.iter().map(|p| p.delta_v).sum()
    }

    pub fn truncated(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e.kind, EventKind::WatchdogTripped { .. }))
    }

    pub fn stalled(&self) -> bool {
        self.events.iter().any(|e| e.kind == EventKind::Stalled)
    }
}
