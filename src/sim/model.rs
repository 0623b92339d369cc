use std::collections::BTreeMap;

use tracing::debug;

use crate::config::SimSettings;
use crate::model::{PoolOrigin, PropulsionUnit, ResourcePool, SimGraph, UnitId, UnitKind};
use crate::vehicle::VehicleSnapshot;

use super::association::{engine_thrust, Association};

fn same_resource(vehicle: &VehicleSnapshot, a: usize, b: usize) -> bool {
    match (vehicle.pools.get(a), vehicle.pools.get(b)) {
        (Some(a), Some(b)) => a.resource.name == b.resource.name,
        _ => false,
    }
}

fn pool_mass(vehicle: &VehicleSnapshot, idx: usize) -> f64 {
    vehicle.pools.get(idx).map_or(0.0, |p| p.mass)
}

// ---------------------------------------------------------------------------
// Association → simulation graph
// ---------------------------------------------------------------------------

/// Build the pool/unit graph for one run.
///
/// Local pools come first and also feed global engines of the same
/// resource. Each global pool then only contributes the mass that no local
/// pool of that resource already holds, so nothing is counted twice.
/// Boosters get an exclusive tank each.
pub fn build_graph(
    vehicle: &VehicleSnapshot,
    assoc: &Association,
    settings: &SimSettings,
) -> SimGraph {
    let mut graph = SimGraph::new();

    // --- Engines ---
    let mut engine_units: BTreeMap<usize, UnitId> = BTreeMap::new();
    for engine_idx in assoc.engines() {
        let Some(engine) = vehicle.engines.get(engine_idx) else {
            continue;
        };
        let Some((direction, thrust)) = engine_thrust(engine, settings.unrestricted_thrust) else {
            continue;
        };
        let unit = PropulsionUnit::new(
            UnitKind::Engine(engine_idx),
            engine.name.clone(),
            thrust,
            engine.isp * settings.isp_multiplier,
            engine.throttle,
            direction,
        );
        engine_units.insert(engine_idx, graph.add_unit(unit));
    }

    let connect_all = |graph: &mut SimGraph, engines: &[usize], pool| {
        for engine_idx in engines {
            if let Some(&unit) = engine_units.get(engine_idx) {
                graph.connect(unit, pool);
            }
        }
    };

    // --- Local pools ---
    for (&pool_idx, engines) in &assoc.local {
        let pool = graph.add_pool(ResourcePool::new(
            PoolOrigin::Local(pool_idx),
            pool_mass(vehicle, pool_idx),
        ));
        connect_all(&mut graph, engines, pool);

        for (&global_idx, global_engines) in &assoc.global {
            if same_resource(vehicle, global_idx, pool_idx) {
                connect_all(&mut graph, global_engines, pool);
            }
        }
    }

    // --- Global residuals ---
    for (&global_idx, global_engines) in &assoc.global {
        let covered: f64 = assoc
            .local
            .keys()
            .filter(|&&local_idx| same_resource(vehicle, global_idx, local_idx))
            .map(|&local_idx| pool_mass(vehicle, local_idx))
            .sum();
        let residual = pool_mass(vehicle, global_idx) - covered;
        if residual <= 0.0 {
            debug!(pool = global_idx, covered, "global pool fully reachable through local pools");
            continue;
        }
        let pool = graph.add_pool(ResourcePool::new(PoolOrigin::GlobalResidual(global_idx), residual));
        connect_all(&mut graph, global_engines, pool);
    }

    // --- Boosters ---
    for &booster_idx in &assoc.boosters {
        let Some(booster) = vehicle.boosters.get(booster_idx) else {
            continue;
        };
        let Some(direction) = booster.thrust_vector.try_normalize(f64::EPSILON) else {
            debug!(booster = booster_idx, "booster skipped: no thrust");
            continue;
        };
        let throttle = if booster.state.is_firing() { 1.0 } else { 0.0 };
        let unit = graph.add_unit(PropulsionUnit::new(
            UnitKind::Booster(booster_idx),
            booster.name.clone(),
            booster.thrust_vector.norm(),
            booster.isp * settings.isp_multiplier,
            throttle,
            direction,
        ));
        let pool = graph.add_pool(ResourcePool::new(
            PoolOrigin::Booster(booster_idx),
            booster.propellant_mass(settings.dry_mass_multiplier),
        ));
        graph.connect(unit, pool);
    }

    // Units wired to nothing, and pools with nothing in them, never burn.
    let pruned = graph.prune();
    if !pruned.is_empty() {
        debug!(pools = ?pruned.pools, units = ?pruned.units, "dropped inert entities");
    }

    graph.refresh_units();
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::association::associate;
    use crate::vehicle::{BoosterBuilder, BoosterState, EngineBuilder, ResourceType, VehicleBuilder};

    fn build(vehicle: &VehicleSnapshot, settings: &SimSettings) -> SimGraph {
        build_graph(vehicle, &associate(vehicle, settings), settings)
    }

    fn xenon() -> ResourceType {
        ResourceType::new("xenon", 1.0)
    }

    fn residual_of(g: &SimGraph) -> Option<f64> {
        g.pools()
            .find(|(_, p)| matches!(p.origin, PoolOrigin::GlobalResidual(_)))
            .map(|(_, p)| p.remaining_mass)
    }

    fn global_vehicle(local_mass: f64, global_mass: f64) -> VehicleSnapshot {
        VehicleBuilder::new("T")
            .mass(100.0)
            .pool(xenon(), local_mass)
            .pool(xenon(), global_mass)
            .engine(EngineBuilder::new("local").local(&[0]).build())
            .engine(EngineBuilder::new("ion").global(&[1]).build())
            .build()
    }

    #[test]
    fn residual_holds_unreached_mass() {
        let g = build(&global_vehicle(3.0, 10.0), &SimSettings::default());
        assert_eq!(residual_of(&g), Some(7.0));
        assert_eq!(g.pool_count(), 2);
    }

    #[test]
    fn no_residual_when_locals_cover_global() {
        let g = build(&global_vehicle(10.0, 10.0), &SimSettings::default());
        assert_eq!(residual_of(&g), None);
        let g = build(&global_vehicle(12.0, 10.0), &SimSettings::default());
        assert_eq!(residual_of(&g), None);
    }

    #[test]
    fn global_engine_also_drains_matching_local_pool() {
        let g = build(&global_vehicle(3.0, 10.0), &SimSettings::default());
        let (_, local) = g
            .pools()
            .find(|(_, p)| p.origin == PoolOrigin::Local(0))
            .unwrap();
        assert_eq!(local.units.len(), 2);
        let (_, ion) = g.units().find(|(_, u)| u.kind == UnitKind::Engine(1)).unwrap();
        assert_eq!(ion.pools.len(), 2);
        assert!((ion.total_associated_mass - 10.0).abs() < 1e-12);
    }

    #[test]
    fn global_engine_ignores_other_resources() {
        let v = VehicleBuilder::new("T")
            .mass(100.0)
            .pool(ResourceType::new("fuel", 1.0), 5.0)
            .pool(xenon(), 2.0)
            .engine(EngineBuilder::new("chem").local(&[0]).build())
            .engine(EngineBuilder::new("ion").global(&[1]).build())
            .build();
        let g = build(&v, &SimSettings::default());
        let (_, fuel) = g.pools().find(|(_, p)| p.origin == PoolOrigin::Local(0)).unwrap();
        assert_eq!(fuel.units.len(), 1);
        assert_eq!(residual_of(&g), Some(2.0));
    }

    #[test]
    fn booster_gets_exclusive_tank() {
        let v = VehicleBuilder::new("T")
            .mass(100.0)
            .booster(
                BoosterBuilder::new("B")
                    .state(BoosterState::Firing)
                    .wet_mass(10.0)
                    .dry_mass_fraction(0.2)
                    .fuel_fraction(0.5)
                    .thrust_vector(0.0, 400.0)
                    .isp(200.0)
                    .build(),
            )
            .build();
        let settings = SimSettings { dry_mass_multiplier: 1.5, isp_multiplier: 0.5, ..Default::default() };
        let g = build(&v, &settings);
        assert_eq!(g.pool_count(), 1);
        let (_, unit) = g.units().next().unwrap();
        assert!(unit.is_booster());
        assert_eq!(unit.throttle, 1.0);
        assert!((unit.max_thrust - 400.0).abs() < 1e-9);
        assert!((unit.isp - 100.0).abs() < 1e-12);
        let (_, pool) = g.pools().next().unwrap();
        // 10 * (1 - 0.2 * 1.5) * 0.5
        assert!((pool.remaining_mass - 3.5).abs() < 1e-12);
        assert_eq!(pool.units.len(), 1);
    }

    #[test]
    fn primed_booster_idles() {
        let v = VehicleBuilder::new("T")
            .mass(100.0)
            .booster(BoosterBuilder::new("B").state(BoosterState::Primed).build())
            .build();
        let g = build(&v, &SimSettings::default());
        let (_, unit) = g.units().next().unwrap();
        assert_eq!(unit.throttle, 0.0);
    }

    #[test]
    fn isp_multiplier_applies_to_engines() {
        let v = VehicleBuilder::new("T")
            .mass(100.0)
            .pool(xenon(), 1.0)
            .engine(EngineBuilder::new("E").isp(300.0).local(&[0]).build())
            .build();
        let settings = SimSettings { isp_multiplier: 2.0, ..Default::default() };
        let g = build(&v, &settings);
        let (_, unit) = g.units().next().unwrap();
        assert!((unit.isp - 600.0).abs() < 1e-12);
    }

    #[test]
    fn engine_without_reachable_mass_is_dropped() {
        let v = VehicleBuilder::new("T")
            .mass(100.0)
            .pool(xenon(), 0.0)
            .engine(EngineBuilder::new("ion").global(&[0]).build())
            .build();
        let g = build(&v, &SimSettings::default());
        assert!(!g.has_units());
        assert_eq!(g.pool_count(), 0);
    }
}
