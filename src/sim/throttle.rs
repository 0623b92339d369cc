use tracing::debug;

use crate::model::SimGraph;
use crate::physics::rocket::THROTTLE_TOLERANCE;

/// Decides, at the start of each phase, what throttle the engines run at.
///
/// Implement this to plug a different throttle schedule into the burn
/// simulator. Boosters must be left alone: their throttle is fixed by
/// whether they were firing when the snapshot was taken.
pub trait ThrottlePolicy {
    /// Adjust engine throttles in place. Returns `true` when the policy
    /// changed something this phase.
    fn apply(&mut self, graph: &mut SimGraph) -> bool;

    /// Forget any state carried between phases.
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

// ---------------------------------------------------------------------------
// Equalizer: snap agreeing units to full throttle, once
// ---------------------------------------------------------------------------

/// Once every unit sits at (nearly) the same throttle, assume the pilot
/// would fly the burn at full throttle and lock that in for the rest of the
/// run. Genuinely mixed settings are kept until the units that disagree
/// have burnt out.
///
/// Boosters count towards the spread but are never snapped: a lit booster
/// next to an idle engine keeps the engine idle.
#[derive(Debug, Clone)]
pub struct Equalizer {
    pub tolerance: f64,
    locked: bool,
}

impl Equalizer {
    pub fn new() -> Self {
        Self { tolerance: THROTTLE_TOLERANCE, locked: false }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Default for Equalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ThrottlePolicy for Equalizer {
    fn apply(&mut self, graph: &mut SimGraph) -> bool {
        if self.locked {
            return false;
        }

        let (min, max) = graph
            .units()
            .map(|(_, u)| u.throttle)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| (lo.min(t), hi.max(t)));
        if min > max {
            // no units left
            return false;
        }
        if max - min >= self.tolerance {
            return false;
        }

        let mut snapped = 0;
        for unit in graph.units_mut().filter(|u| !u.is_booster()) {
            unit.throttle = 1.0;
            snapped += 1;
        }
        self.locked = true;
        debug!(from = min, engines = snapped, "throttles equalized to full");
        snapped > 0
    }

    fn reset(&mut self) {
        self.locked = false;
    }

    fn name(&self) -> &str {
        "equalizer"
    }
}

// ---------------------------------------------------------------------------
// KeepThrottle: fly the snapshot throttles as they are
// ---------------------------------------------------------------------------

/// Leaves every throttle untouched. Useful to estimate the burn exactly as
/// currently set.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepThrottle;

impl ThrottlePolicy for KeepThrottle {
    fn apply(&mut self, _graph: &mut SimGraph) -> bool {
        false
    }

    fn name(&self) -> &str {
        "keep"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PoolOrigin, PropulsionUnit, ResourcePool, UnitKind};
    use nalgebra::Vector2;

    fn graph(throttles: &[f64], booster_throttle: Option<f64>) -> SimGraph {
        let mut g = SimGraph::new();
        let p = g.add_pool(ResourcePool::new(PoolOrigin::Local(0), 10.0));
        for (i, &t) in throttles.iter().enumerate() {
            let u = g.add_unit(PropulsionUnit::new(
                UnitKind::Engine(i),
                "E",
                100.0,
                300.0,
                t,
                Vector2::new(0.0, 1.0),
            ));
            g.connect(u, p);
        }
        if let Some(t) = booster_throttle {
            let bp = g.add_pool(ResourcePool::new(PoolOrigin::Booster(0), 1.0));
            let b = g.add_unit(PropulsionUnit::new(
                UnitKind::Booster(0),
                "B",
                100.0,
                200.0,
                t,
                Vector2::new(0.0, 1.0),
            ));
            g.connect(b, bp);
        }
        g
    }

    fn throttles(g: &SimGraph) -> Vec<f64> {
        g.units().map(|(_, u)| u.throttle).collect()
    }

    #[test]
    fn idle_engines_snap_to_full() {
        let mut g = graph(&[0.0, 0.0], None);
        let mut eq = Equalizer::new();
        assert!(eq.apply(&mut g));
        assert!(eq.is_locked());
        assert_eq!(throttles(&g), vec![1.0, 1.0]);
    }

    #[test]
    fn mixed_throttles_are_kept() {
        let mut g = graph(&[0.3, 0.31], None);
        let mut eq = Equalizer::new();
        assert!(!eq.apply(&mut g));
        assert!(!eq.is_locked());
        assert_eq!(throttles(&g), vec![0.3, 0.31]);
    }

    #[test]
    fn near_equal_throttles_snap() {
        let mut g = graph(&[0.5, 0.50005], None);
        assert!(Equalizer::new().apply(&mut g));
        assert_eq!(throttles(&g), vec![1.0, 1.0]);
    }

    #[test]
    fn idle_booster_is_never_snapped() {
        let mut g = graph(&[0.0], Some(0.0));
        let mut eq = Equalizer::new();
        assert!(eq.apply(&mut g));
        assert_eq!(throttles(&g), vec![1.0, 0.0]);
    }

    #[test]
    fn lit_booster_blocks_equalization() {
        let mut g = graph(&[0.2], Some(1.0));
        let mut eq = Equalizer::new();
        assert!(!eq.apply(&mut g));
        assert!(!eq.is_locked());
        assert_eq!(throttles(&g), vec![0.2, 1.0]);
    }

    #[test]
    fn idle_booster_blocks_full_engines() {
        let mut g = graph(&[1.0, 1.0], Some(0.0));
        assert!(!Equalizer::new().apply(&mut g));
        assert_eq!(throttles(&g), vec![1.0, 1.0, 0.0]);
    }

    #[test]
    fn agreeing_engines_and_lit_booster_snap() {
        let mut g = graph(&[1.0, 1.0], Some(1.0));
        let mut eq = Equalizer::new();
        assert!(eq.apply(&mut g));
        assert!(eq.is_locked());
        assert_eq!(throttles(&g), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn lock_is_one_shot() {
        let mut g = graph(&[0.6, 0.6], None);
        let mut eq = Equalizer::new();
        assert!(eq.apply(&mut g));
        for unit in g.units_mut() {
            unit.throttle = 0.1;
        }
        assert!(!eq.apply(&mut g));
        assert_eq!(throttles(&g), vec![0.1, 0.1]);
        eq.reset();
        assert!(!eq.is_locked());
    }

    #[test]
    fn lone_booster_locks_without_change() {
        let mut g = graph(&[], Some(0.0));
        let mut eq = Equalizer::new();
        assert!(!eq.apply(&mut g));
        assert!(eq.is_locked());
        assert_eq!(throttles(&g), vec![0.0]);
    }

    #[test]
    fn empty_graph_leaves_policy_unlocked() {
        let mut g = SimGraph::new();
        let mut eq = Equalizer::new();
        assert!(!eq.apply(&mut g));
        assert!(!eq.is_locked());
    }

    #[test]
    fn keep_throttle_changes_nothing() {
        let mut g = graph(&[0.0, 0.0], None);
        assert!(!KeepThrottle.apply(&mut g));
        assert_eq!(throttles(&g), vec![0.0, 0.0]);
    }
}
