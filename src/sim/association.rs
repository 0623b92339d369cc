use std::collections::BTreeMap;

use nalgebra::Vector2;
use tracing::{debug, warn};

use crate::config::SimSettings;
use crate::physics::rocket::split_normal;
use crate::vehicle::{EngineSnapshot, FlowScope, VehicleSnapshot};

// ---------------------------------------------------------------------------
// Pool → engine association tables
// ---------------------------------------------------------------------------

/// Which active engines feed from which snapshot pools, per scoping rule,
/// plus the boosters that take part in the estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Association {
    pub local: BTreeMap<usize, Vec<usize>>,  // pool index → engine indices
    pub global: BTreeMap<usize, Vec<usize>>, // pool index → engine indices
    pub boosters: Vec<usize>,
}

impl Association {
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.global.is_empty() && self.boosters.is_empty()
    }

    /// Every engine index referenced by either table, without duplicates.
    pub fn engines(&self) -> Vec<usize> {
        let mut engines: Vec<usize> = self
            .local
            .values()
            .chain(self.global.values())
            .flatten()
            .copied()
            .collect();
        engines.sort_unstable();
        engines.dedup();
        engines
    }
}

/// Unit direction and thrust of an engine, or `None` if its thrust normal is
/// degenerate.
pub fn engine_thrust(engine: &EngineSnapshot, unrestricted: bool) -> Option<(Vector2<f64>, f64)> {
    let (direction, stretch) = split_normal(&engine.thrust_normal, unrestricted)?;
    Some((direction, engine.thrust * stretch))
}

fn is_engine_active(engine: &EngineSnapshot, unrestricted: bool) -> bool {
    engine.engine_on
        && engine_thrust(engine, unrestricted).is_some_and(|(_, thrust)| thrust > 0.0)
}

/// Build the association tables from a snapshot.
pub fn associate(vehicle: &VehicleSnapshot, settings: &SimSettings) -> Association {
    let mut assoc = Association::default();

    for (engine_idx, engine) in vehicle.engines.iter().enumerate() {
        if !is_engine_active(engine, settings.unrestricted_thrust) {
            debug!(engine = engine_idx, name = %engine.name, "engine skipped: off or no thrust");
            continue;
        }

        for flow in &engine.flows {
            let table = match flow.scope {
                FlowScope::Local => &mut assoc.local,
                FlowScope::Global => &mut assoc.global,
            };
            for &pool_idx in &flow.sources {
                let Some(pool) = vehicle.pools.get(pool_idx) else {
                    warn!(engine = engine_idx, pool = pool_idx, "flow source out of range");
                    continue;
                };
                if !pool.resource.is_propellant() {
                    continue;
                }
                let engines = table.entry(pool_idx).or_default();
                if !engines.contains(&engine_idx) {
                    engines.push(engine_idx);
                }
            }
        }
    }

    for (booster_idx, booster) in vehicle.boosters.iter().enumerate() {
        if booster.state.is_active() {
            assoc.boosters.push(booster_idx);
        } else {
            debug!(booster = booster_idx, state = ?booster.state, "booster skipped");
        }
    }

    assoc
}
