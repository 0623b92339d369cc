//! Lightweight simulation entities: resource pools and propulsion units
//! linked by identifier sets rather than references.

pub mod graph;

use std::collections::BTreeSet;
use std::fmt;

use nalgebra::Vector2;

use crate::physics::rocket::{mass_flow, EMPTY_POOL_TIME};

pub use graph::{Pruned, SimGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(pub usize);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Resource pool
// ---------------------------------------------------------------------------

/// Where a simulated pool came from in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolOrigin {
    /// A pool reached through local flows (index into the snapshot pools).
    Local(usize),
    /// Mass of a global pool not already covered by local pools.
    GlobalResidual(usize),
    /// Exclusive tank of a booster (index into the snapshot boosters).
    Booster(usize),
}

#[derive(Debug, Clone)]
pub struct ResourcePool {
    pub origin: PoolOrigin,
    pub initial_mass: f64,
    pub remaining_mass: f64,
    pub units: BTreeSet<UnitId>,
    // per phase
    pub consumption_rate: f64,
    pub time_to_empty: f64,
}

impl ResourcePool {
    pub fn new(origin: PoolOrigin, mass: f64) -> Self {
        let mass = mass.max(0.0);
        Self {
            origin,
            initial_mass: mass,
            remaining_mass: mass,
            units: BTreeSet::new(),
            consumption_rate: 0.0,
            time_to_empty: if mass > 0.0 { f64::INFINITY } else { 0.0 },
        }
    }

    /// Fraction of `unit`'s draw that lands on this pool.
    ///
    /// A unit drains all its pools in proportion to their contents, so a pool
    /// holding less than the unit's total only sees its share.
    pub fn share_of(&self, unit: &PropulsionUnit) -> f64 {
        if 0.0 < self.remaining_mass && self.remaining_mass < unit.total_associated_mass {
            self.remaining_mass / unit.total_associated_mass
        } else {
            1.0
        }
    }

    /// Burn for `dt` seconds at the current rate.
    pub fn advance(&mut self, dt: f64) {
        self.remaining_mass = (self.remaining_mass - self.consumption_rate * dt).max(0.0);
        self.time_to_empty = (self.time_to_empty - dt).max(0.0);
    }

    pub fn is_empty(&self) -> bool {
        self.time_to_empty < EMPTY_POOL_TIME
    }
}

// ---------------------------------------------------------------------------
// Propulsion unit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Continuously throttled engine (index into the snapshot engines).
    Engine(usize),
    /// On/off booster (index into the snapshot boosters).
    Booster(usize),
}

#[derive(Debug, Clone)]
pub struct PropulsionUnit {
    pub kind: UnitKind,
    pub label: String,
    pub max_thrust: f64,
    pub isp: f64,
    pub throttle: f64,
    pub direction: Vector2<f64>, // unit length
    pub pools: BTreeSet<PoolId>,
    // per phase
    pub total_associated_mass: f64,
    pub consumption_rate: f64,
}

impl PropulsionUnit {
    pub fn new(
        kind: UnitKind,
        label: impl Into<String>,
        max_thrust: f64,
        isp: f64,
        throttle: f64,
        direction: Vector2<f64>,
    ) -> Self {
        Self {
            kind,
            label: label.into(),
            max_thrust,
            isp,
            throttle,
            direction,
            pools: BTreeSet::new(),
            total_associated_mass: 0.0,
            consumption_rate: mass_flow(max_thrust, throttle, isp),
        }
    }

    pub fn is_booster(&self) -> bool {
        matches!(self.kind, UnitKind::Booster(_))
    }

    /// Thrust actually produced at the current throttle.
    pub fn effective_thrust(&self) -> f64 {
        self.max_thrust * self.throttle
    }

    pub fn refresh_consumption(&mut self) {
        self.consumption_rate = mass_flow(self.max_thrust, self.throttle, self.isp);
    }
}
