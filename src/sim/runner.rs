use nalgebra::Vector2;
use tracing::{debug, trace, warn};

use crate::model::SimGraph;
use crate::physics::rocket::{tsiolkovsky, weighted_direction, WATCHDOG_MARGIN};

use super::event::{BurnPhase, BurnReport, EventKind, SimEvent};
use super::throttle::{Equalizer, ThrottlePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Done,
}

// ---------------------------------------------------------------------------
// Burn simulator
// ---------------------------------------------------------------------------

/// Burns a pool/unit graph phase by phase until no unit is left.
///
/// Each phase lasts until the first pool runs dry. Its delta-V is added as a
/// vector along the thrust-weighted direction of the units firing, so
/// phases pushing different ways partly cancel.
pub struct BurnSimulator<P: ThrottlePolicy = Equalizer> {
    graph: SimGraph,
    policy: P,
    mass: f64,
    time: f64,
    budget: usize,
    state: RunState,
    report: BurnReport,
}

impl BurnSimulator<Equalizer> {
    pub fn new(vehicle_mass: f64, graph: SimGraph) -> Self {
        Self::with_policy(vehicle_mass, graph, Equalizer::new())
    }

    /// Run to completion with the default policy and return the delta-V
    /// magnitude.
    pub fn run(vehicle_mass: f64, graph: SimGraph) -> f64 {
        Self::new(vehicle_mass, graph).finish().magnitude()
    }

    /// Same as `run`, keeping the per-phase report.
    pub fn run_with_report(vehicle_mass: f64, graph: SimGraph) -> (f64, BurnReport) {
        let report = Self::new(vehicle_mass, graph).finish();
        (report.magnitude(), report)
    }
}

impl<P: ThrottlePolicy> BurnSimulator<P> {
    pub fn with_policy(vehicle_mass: f64, graph: SimGraph, mut policy: P) -> Self {
        policy.reset();
        let budget = graph.units_added() + WATCHDOG_MARGIN;
        let state = if graph.has_units() { RunState::Running } else { RunState::Done };
        Self {
            graph,
            policy,
            mass: vehicle_mass,
            time: 0.0,
            budget,
            state,
            report: BurnReport {
                initial_mass: vehicle_mass,
                final_mass: vehicle_mass,
                ..Default::default()
            },
        }
    }

    /// Override the phase budget (defaults to the number of units the graph
    /// was built with + 10).
    pub fn with_budget(mut self, phases: usize) -> Self {
        self.budget = phases;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn graph(&self) -> &SimGraph {
        &self.graph
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Accumulated delta-V vector so far.
    pub fn delta_v(&self) -> Vector2<f64> {
        self.report.delta_v
    }

    pub fn report(&self) -> &BurnReport {
        &self.report
    }

    /// Step until done and hand back the report.
    pub fn finish(mut self) -> BurnReport {
        while self.step() == RunState::Running {}
        self.report
    }

    fn event(&mut self, kind: EventKind) {
        self.report.events.push(SimEvent {
            phase: self.report.phases.len(),
            time: self.time,
            kind,
        });
    }

    fn stop(&mut self) -> RunState {
        self.state = RunState::Done;
        self.report.final_mass = self.mass;
        RunState::Done
    }

    /// Advance by one phase.
    pub fn step(&mut self) -> RunState {
        if self.state == RunState::Done {
            return RunState::Done;
        }
        if !self.graph.has_units() {
            return self.stop();
        }
        if self.report.phases.len() >= self.budget {
            warn!(budget = self.budget, units = self.graph.unit_count(), "phase budget exhausted, truncating");
            self.event(EventKind::WatchdogTripped { budget: self.budget });
            return self.stop();
        }

        if self.policy.apply(&mut self.graph) {
            self.event(EventKind::ThrottleEqualized);
        }

        self.graph.refresh_units();
        self.graph.refresh_pools();
        let duration = self.graph.next_exhaustion();

        let (consumption, thrust) = self
            .graph
            .units()
            .fold((0.0, 0.0), |(c, t), (_, u)| (c + u.consumption_rate, t + u.effective_thrust()));
        if consumption <= 0.0 || !duration.is_finite() {
            trace!(consumption, duration, "nothing left burning");
            self.event(EventKind::Stalled);
            return self.stop();
        }

        let isp = thrust / consumption;
        let direction = weighted_direction(
            self.graph.units().map(|(_, u)| (u.direction, u.effective_thrust())),
        );

        let new_mass = self.mass - consumption * duration;
        if new_mass <= 0.0 {
            warn!(mass = self.mass, new_mass, "propellant exceeds vehicle mass");
            self.event(EventKind::Stalled);
            return self.stop();
        }
        let dv = tsiolkovsky(isp, self.mass, new_mass);

        let phase = BurnPhase {
            index: self.report.phases.len(),
            start_time: self.time,
            duration,
            global_isp: isp,
            global_consumption: consumption,
            global_thrust: thrust,
            direction,
            mass_before: self.mass,
            mass_after: new_mass,
            delta_v: dv,
            active_units: self.graph.unit_count(),
            active_pools: self.graph.pool_count(),
        };
        trace!(
            phase = phase.index,
            duration,
            isp,
            consumption,
            dv,
            alignment = direction.norm(),
            "phase burnt"
        );
        self.report.delta_v += phase.delta_v_vector();
        self.report.phases.push(phase);

        self.mass = new_mass;
        self.time += duration;
        self.graph.advance(duration);

        let pruned = self.graph.prune();
        for pool in pruned.pools {
            self.event(EventKind::PoolExhausted { pool });
        }
        for (unit, label) in pruned.units.into_iter().zip(pruned.labels) {
            debug!(%unit, %label, time = self.time, "unit out of propellant");
            self.event(EventKind::UnitOrphaned { unit });
        }

        self.report.final_mass = self.mass;
        if self.graph.has_units() {
            RunState::Running
        } else {
            self.stop()
        }
    }
}

/// Run with a caller-supplied throttle policy.
pub fn run_with<P: ThrottlePolicy>(vehicle_mass: f64, graph: SimGraph, policy: P) -> BurnReport {
    BurnSimulator::with_policy(vehicle_mass, graph, policy).finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
