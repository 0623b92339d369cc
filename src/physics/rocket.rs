use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Gravity constant used by the host simulation when integrating the rocket
/// equation. Mass flow is `thrust / isp` there, so Isp carries its own units
/// and this factor only shows up in the final step.
pub const G0: f64 = 9.8;

/// A pool with less than this much burn time left (s) counts as empty.
pub const EMPTY_POOL_TIME: f64 = 0.001;

/// Throttle spread under which all engines are treated as agreeing.
pub const THROTTLE_TOLERANCE: f64 = 0.0001;

/// Extra phases allowed on top of the initial unit count.
pub const WATCHDOG_MARGIN: usize = 10;

// ---------------------------------------------------------------------------
// Rocket equation
// ---------------------------------------------------------------------------

/// Mass flow of a unit: `throttle * thrust / isp`.
#[inline]
pub fn mass_flow(max_thrust: f64, throttle: f64, isp: f64) -> f64 {
    throttle * max_thrust / isp
}

/// Scalar delta-V of burning from `m_before` down to `m_after` at `isp`.
pub fn tsiolkovsky(isp: f64, m_before: f64, m_after: f64) -> f64 {
    G0 * isp * (m_before / m_after).ln()
}

/// Thrust-weighted average of unit directions.
///
/// Each item is `(direction, effective_thrust)`. The magnitude of the result
/// is 1 only when every contributor points the same way; opposing thrust
/// cancels out. Returns zero when there is no thrust at all.
pub fn weighted_direction<I>(contributions: I) -> Vector2<f64>
where
    I: IntoIterator<Item = (Vector2<f64>, f64)>,
{
    let mut sum = Vector2::<f64>::zeros();
    let mut total = 0.0;
    for (direction, thrust) in contributions {
        sum += direction * thrust;
        total += thrust;
    }
    if total > 0.0 {
        sum / total
    } else {
        Vector2::zeros()
    }
}

/// Split a raw thrust normal into a unit direction and a thrust stretch.
///
/// In unrestricted mode the stretch is the length of the raw normal,
/// otherwise it is 1. Returns `None` for a degenerate (zero) normal.
pub fn split_normal(raw: &Vector2<f64>, unrestricted: bool) -> Option<(Vector2<f64>, f64)> {
    let direction = raw.try_normalize(f64::EPSILON)?;
    let stretch = if unrestricted { raw.norm() } else { 1.0 };
    Some((direction, stretch))
}
