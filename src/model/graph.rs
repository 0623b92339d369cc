use std::collections::BTreeMap;

use super::{PoolId, PropulsionUnit, ResourcePool, UnitId};

/// Bipartite pool/unit graph owned by one simulation run.
#[derive(Debug, Clone, Default)]
pub struct SimGraph {
    pools: BTreeMap<PoolId, ResourcePool>,
    units: BTreeMap<UnitId, PropulsionUnit>,
    next_pool: usize,
    next_unit: usize,
}

/// What a prune pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pruned {
    pub pools: Vec<PoolId>,
    pub units: Vec<UnitId>,
    pub labels: Vec<String>, // one per entry in `units`
}

impl Pruned {
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty() && self.units.is_empty()
    }
}

impl SimGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pool(&mut self, pool: ResourcePool) -> PoolId {
        let id = PoolId(self.next_pool);
        self.next_pool += 1;
        self.pools.insert(id, pool);
        id
    }

    pub fn add_unit(&mut self, unit: PropulsionUnit) -> UnitId {
        let id = UnitId(self.next_unit);
        self.next_unit += 1;
        self.units.insert(id, unit);
        id
    }

    /// Link a unit and a pool in both directions. Unknown ids are ignored.
    pub fn connect(&mut self, unit: UnitId, pool: PoolId) {
        if let (Some(u), Some(p)) = (self.units.get_mut(&unit), self.pools.get_mut(&pool)) {
            u.pools.insert(pool);
            p.units.insert(unit);
        }
    }

    pub fn pool(&self, id: PoolId) -> Option<&ResourcePool> {
        self.pools.get(&id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&PropulsionUnit> {
        self.units.get(&id)
    }

    pub fn pools(&self) -> impl Iterator<Item = (PoolId, &ResourcePool)> {
        self.pools.iter().map(|(id, p)| (*id, p))
    }

    pub fn units(&self) -> impl Iterator<Item = (UnitId, &PropulsionUnit)> {
        self.units.iter().map(|(id, u)| (*id, u))
    }

    pub fn units_mut(&mut self) -> impl Iterator<Item = &mut PropulsionUnit> {
        self.units.values_mut()
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Units ever added, including ones pruned since.
    pub fn units_added(&self) -> usize {
        self.next_unit
    }

    pub fn has_units(&self) -> bool {
        !self.units.is_empty()
    }

    // -----------------------------------------------------------------------
    // Per-phase bookkeeping
    // -----------------------------------------------------------------------

    /// Sum each unit's reachable mass and refresh its mass flow.
    /// Must run before `refresh_pools`.
    pub fn refresh_units(&mut self) {
        let pools = &self.pools;
        for unit in self.units.values_mut() {
            unit.total_associated_mass = unit
                .pools
                .iter()
                .filter_map(|id| pools.get(id))
                .map(|p| p.remaining_mass)
                .sum();
            unit.refresh_consumption();
        }
    }

    /// Refresh each pool's draw and time to empty from its units.
    pub fn refresh_pools(&mut self) {
        let units = &self.units;
        for pool in self.pools.values_mut() {
            let rate: f64 = pool
                .units
                .iter()
                .filter_map(|id| units.get(id))
                .map(|u| u.consumption_rate * pool.share_of(u))
                .sum();
            pool.consumption_rate = rate;
            pool.time_to_empty = if rate > 0.0 {
                pool.remaining_mass / rate
            } else if pool.remaining_mass > 0.0 {
                f64::INFINITY
            } else {
                0.0
            };
        }
    }

    /// Shortest time until some pool runs dry.
    pub fn next_exhaustion(&self) -> f64 {
        self.pools
            .values()
            .map(|p| p.time_to_empty)
            .fold(f64::INFINITY, f64::min)
    }

    /// Drain every pool for `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        for pool in self.pools.values_mut() {
            pool.advance(dt);
        }
    }

    /// Drop empty pools, then the units they leave without any pool.
    /// Both directions of every link are cleaned.
    pub fn prune(&mut self) -> Pruned {
        let empty: Vec<PoolId> = self
            .pools
            .iter()
            .filter(|(_, p)| p.is_empty())
            .map(|(id, _)| *id)
            .collect();
        for id in &empty {
            self.pools.remove(id);
            for unit in self.units.values_mut() {
                unit.pools.remove(id);
            }
        }

        let orphaned: Vec<UnitId> = self
            .units
            .iter()
            .filter(|(_, u)| u.pools.is_empty())
            .map(|(id, _)| *id)
            .collect();
        let mut labels = Vec::with_capacity(orphaned.len());
        for id in &orphaned {
            if let Some(unit) = self.units.remove(id) {
                labels.push(unit.label);
            }
            for pool in self.pools.values_mut() {
                pool.units.remove(id);
            }
        }

        Pruned { pools: empty, units: orphaned, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PoolOrigin, UnitKind};
    use nalgebra::Vector2;

    fn engine(thrust: f64) -> PropulsionUnit {
        PropulsionUnit::new(UnitKind::Engine(0), "E", thrust, 300.0, 1.0, Vector2::new(0.0, 1.0))
    }

    fn two_engines_one_pool() -> (SimGraph, PoolId) {
        let mut g = SimGraph::new();
        let p = g.add_pool(ResourcePool::new(PoolOrigin::Local(0), 60.0));
        let a = g.add_unit(engine(900.0));
        let b = g.add_unit(engine(900.0));
        g.connect(a, p);
        g.connect(b, p);
        (g, p)
    }

    #[test]
    fn shared_pool_sums_both_draws() {
        let (mut g, p) = two_engines_one_pool();
        g.refresh_units();
        g.refresh_pools();
        let pool = g.pool(p).unwrap();
        for (_, u) in g.units() {
            assert_eq!(u.total_associated_mass, pool.remaining_mass);
            assert_eq!(pool.share_of(u), 1.0);
        }
        assert!((pool.consumption_rate - 6.0).abs() < 1e-12);
        assert!((g.next_exhaustion() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn unit_splits_draw_across_pools() {
        let mut g = SimGraph::new();
        let big = g.add_pool(ResourcePool::new(PoolOrigin::Local(0), 30.0));
        let small = g.add_pool(ResourcePool::new(PoolOrigin::Local(1), 10.0));
        let u = g.add_unit(engine(1200.0)); // 4 mass/s
        g.connect(u, big);
        g.connect(u, small);
        g.refresh_units();
        g.refresh_pools();
        assert!((g.pool(big).unwrap().consumption_rate - 3.0).abs() < 1e-12);
        assert!((g.pool(small).unwrap().consumption_rate - 1.0).abs() < 1e-12);
        // both run dry together
        assert!((g.pool(big).unwrap().time_to_empty - 10.0).abs() < 1e-12);
        assert!((g.pool(small).unwrap().time_to_empty - 10.0).abs() < 1e-12);
    }

    #[test]
    fn prune_is_mutual() {
        let (mut g, p) = two_engines_one_pool();
        let spare = g.add_pool(ResourcePool::new(PoolOrigin::Local(1), 5.0));
        let c = g.add_unit(engine(100.0));
        g.connect(c, spare);
        g.refresh_units();
        g.refresh_pools();
        g.advance(10.0);

        let pruned = g.prune();
        assert_eq!(pruned.pools, vec![p]);
        assert_eq!(pruned.units.len(), 2);
        assert_eq!(pruned.labels, vec!["E".to_string(), "E".to_string()]);
        assert_eq!(g.unit_count(), 1);
        assert_eq!(g.pool_count(), 1);
        for (_, u) in g.units() {
            assert!(!u.pools.contains(&p));
        }
        for (_, pool) in g.pools() {
            for id in &pruned.units {
                assert!(!pool.units.contains(id));
            }
        }
    }

    #[test]
    fn prune_on_clean_graph_is_noop() {
        let (mut g, _) = two_engines_one_pool();
        g.refresh_units();
        g.refresh_pools();
        let before: Vec<_> = g.pools().map(|(id, p)| (id, p.remaining_mass, p.units.clone())).collect();
        assert!(g.prune().is_empty());
        assert!(g.prune().is_empty());
        assert_eq!(g.units_added(), 2);
        let after: Vec<_> = g.pools().map(|(id, p)| (id, p.remaining_mass, p.units.clone())).collect();
        assert_eq!(before, after);
        assert_eq!(g.unit_count(), 2);
    }

    #[test]
    fn idle_pool_never_empties() {
        let mut g = SimGraph::new();
        let p = g.add_pool(ResourcePool::new(PoolOrigin::Booster(0), 4.0));
        let mut idle = engine(100.0);
        idle.throttle = 0.0;
        let u = g.add_unit(idle);
        g.connect(u, p);
        g.refresh_units();
        g.refresh_pools();
        assert!(g.next_exhaustion().is_infinite());
        assert!(g.prune().is_empty());
    }
}
