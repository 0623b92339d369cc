use std::path::Path;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Resource pools
// ---------------------------------------------------------------------------

/// Substance held by a pool. Pools match each other by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceType {
    pub name: String,
    pub mass_per_unit: f64, // 0 for non-propellant resources (e.g. electricity)
}

impl ResourceType {
    pub fn new(name: impl Into<String>, mass_per_unit: f64) -> Self {
        Self { name: name.into(), mass_per_unit }
    }

    pub fn is_propellant(&self) -> bool {
        self.mass_per_unit != 0.0
    }
}

/// A cluster of connected tanks as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub resource: ResourceType,
    pub mass: f64, // remaining propellant mass
}

// ---------------------------------------------------------------------------
// Engines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowScope {
    /// Only the listed, directly connected pools.
    Local,
    /// Any pool on the vehicle holding the same resource.
    Global,
}

/// One propellant feed of an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub scope: FlowScope,
    pub sources: Vec<usize>, // indices into `VehicleSnapshot::pools`
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    #[serde(default)]
    pub name: String,
    pub engine_on: bool,
    pub thrust: f64,                 // rated thrust
    pub isp: f64,
    pub throttle: f64,               // 0..=1
    pub thrust_normal: Vector2<f64>, // vehicle frame, not necessarily unit length
    #[serde(default)]
    pub flows: Vec<Flow>,
}

// ---------------------------------------------------------------------------
// Boosters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoosterState {
    Unprimed,
    Primed,
    Firing,
    Spent,
}

impl BoosterState {
    /// Primed and firing boosters take part in the estimate.
    pub fn is_active(self) -> bool {
        matches!(self, BoosterState::Primed | BoosterState::Firing)
    }

    pub fn is_firing(self) -> bool {
        self == BoosterState::Firing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoosterSnapshot {
    #[serde(default)]
    pub name: String,
    pub state: BoosterState,
    pub wet_mass: f64,
    pub dry_mass_fraction: f64,      // 0..=1, before the difficulty multiplier
    pub fuel_fraction: f64,          // 0..=1 of the propellant still unburnt
    pub thrust_vector: Vector2<f64>, // magnitude is the thrust
    pub isp: f64,
}

impl BoosterSnapshot {
    /// Propellant left in the booster casing.
    pub fn propellant_mass(&self, dry_mass_multiplier: f64) -> f64 {
        let wet_share = 1.0 - self.dry_mass_fraction * dry_mass_multiplier;
        (self.wet_mass * wet_share * self.fuel_fraction).max(0.0)
    }
}

// ---------------------------------------------------------------------------
// Whole vehicle
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

/// Read-only picture of a vehicle at the instant of the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    #[serde(default)]
    pub name: String,
    pub mass: f64, // total vehicle mass, propellant included
    #[serde(default = "default_true")]
    pub has_control: bool,
    #[serde(default)]
    pub infinite_fuel: bool,
    #[serde(default)]
    pub pools: Vec<PoolSnapshot>,
    #[serde(default)]
    pub engines: Vec<EngineSnapshot>,
    #[serde(default)]
    pub boosters: Vec<BoosterSnapshot>,
}

/// Errors raised while loading or checking a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid {what}: {reason}")]
    Invalid { what: String, reason: &'static str },
}

fn invalid(what: impl Into<String>, reason: &'static str) -> SnapshotError {
    SnapshotError::Invalid { what: what.into(), reason }
}

fn check_fraction(value: f64, what: impl FnOnce() -> String) -> Result<(), SnapshotError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(what(), "must lie within [0, 1]"))
    }
}

impl VehicleSnapshot {
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let snapshot: VehicleSnapshot = serde_json::from_str(text)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total propellant reported by pools of propellant type.
    pub fn pooled_propellant(&self) -> f64 {
        self.pools
            .iter()
            .filter(|p| p.resource.is_propellant())
            .map(|p| p.mass)
            .sum()
    }

    /// Reject values the simulation cannot make sense of.
    ///
    /// Dangling flow sources are tolerated here; the association step skips
    /// them.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(invalid("vehicle mass", "must be finite and positive"));
        }

        for (i, pool) in self.pools.iter().enumerate() {
            if !(pool.mass.is_finite() && pool.mass >= 0.0) {
                return Err(invalid(format!("pool {i} mass"), "must be finite and non-negative"));
            }
            if !(pool.resource.mass_per_unit.is_finite() && pool.resource.mass_per_unit >= 0.0) {
                return Err(invalid(format!("pool {i} mass_per_unit"), "must be finite and non-negative"));
            }
        }

        for (i, engine) in self.engines.iter().enumerate() {
            if !(engine.thrust.is_finite() && engine.thrust >= 0.0) {
                return Err(invalid(format!("engine {i} thrust"), "must be finite and non-negative"));
            }
            if !(engine.isp.is_finite() && engine.isp > 0.0) {
                return Err(invalid(format!("engine {i} isp"), "must be finite and positive"));
            }
            check_fraction(engine.throttle, || format!("engine {i} throttle"))?;
            if !(engine.thrust_normal.x.is_finite() && engine.thrust_normal.y.is_finite()) {
                return Err(invalid(format!("engine {i} thrust_normal"), "must be finite"));
            }
        }

        for (i, booster) in self.boosters.iter().enumerate() {
            if !(booster.wet_mass.is_finite() && booster.wet_mass >= 0.0) {
                return Err(invalid(format!("booster {i} wet_mass"), "must be finite and non-negative"));
            }
            if !(booster.isp.is_finite() && booster.isp > 0.0) {
                return Err(invalid(format!("booster {i} isp"), "must be finite and positive"));
            }
            check_fraction(booster.dry_mass_fraction, || format!("booster {i} dry_mass_fraction"))?;
            check_fraction(booster.fuel_fraction, || format!("booster {i} fuel_fraction"))?;
            if !(booster.thrust_vector.x.is_finite() && booster.thrust_vector.y.is_finite()) {
                return Err(invalid(format!("booster {i} thrust_vector"), "must be finite"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANDER: &str = r#"{
        "name": "Lander",
        "mass": 12.5,
        "pools": [
            { "resource": { "name": "liquid_fuel", "mass_per_unit": 1.0 }, "mass": 4.0 },
            { "resource": { "name": "electricity", "mass_per_unit": 0.0 }, "mass": 0.0 }
        ],
        "engines": [{
            "engine_on": true,
            "thrust": 60.0,
            "isp": 280.0,
            "throttle": 1.0,
            "thrust_normal": [0.0, 1.0],
            "flows": [{ "scope": "local", "sources": [0] }]
        }],
        "boosters": [{
            "state": "primed",
            "wet_mass": 2.0,
            "dry_mass_fraction": 0.2,
            "fuel_fraction": 1.0,
            "thrust_vector": [0.0, 30.0],
            "isp": 200.0
        }]
    }"#;

    #[test]
    fn parses_lander() {
        let v = VehicleSnapshot::from_json(LANDER).unwrap();
        assert!(v.has_control);
        assert!(!v.infinite_fuel);
        assert_eq!(v.engines[0].flows[0].scope, FlowScope::Local);
        assert_eq!(v.boosters[0].state, BoosterState::Primed);
        assert_eq!(v.engines[0].thrust_normal, Vector2::new(0.0, 1.0));
        assert!((v.pooled_propellant() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn json_round_trip_keeps_snapshot() {
        let v = VehicleSnapshot::from_json(LANDER).unwrap();
        let again = VehicleSnapshot::from_json(&v.to_json().unwrap()).unwrap();
        assert_eq!(v, again);
    }

    #[test]
    fn rejects_throttle_above_one() {
        let text = LANDER.replace(r#""throttle": 1.0"#, r#""throttle": 1.5"#);
        let err = VehicleSnapshot::from_json(&text).unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid { .. }));
        assert!(err.to_string().contains("engine 0 throttle"));
    }

    #[test]
    fn rejects_zero_vehicle_mass() {
        let text = LANDER.replace(r#""mass": 12.5"#, r#""mass": 0.0"#);
        assert!(VehicleSnapshot::from_json(&text).is_err());
    }

    #[test]
    fn booster_state_collapses_to_active() {
        assert!(BoosterState::Primed.is_active());
        assert!(BoosterState::Firing.is_active());
        assert!(!BoosterState::Unprimed.is_active());
        assert!(!BoosterState::Spent.is_active());
        assert!(BoosterState::Firing.is_firing());
        assert!(!BoosterState::Primed.is_firing());
    }

    #[test]
    fn booster_propellant_applies_dry_multiplier() {
        let b = BoosterSnapshot {
            name: String::new(),
            state: BoosterState::Firing,
            wet_mass: 10.0,
            dry_mass_fraction: 0.25,
            fuel_fraction: 0.5,
            thrust_vector: Vector2::new(0.0, 100.0),
            isp: 200.0,
        };
        assert!((b.propellant_mass(1.0) - 3.75).abs() < 1e-12);
        assert!((b.propellant_mass(2.0) - 2.5).abs() < 1e-12);
        assert_eq!(b.propellant_mass(5.0), 0.0);
    }
}
