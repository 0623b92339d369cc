//! Display-side readout: the marker shown instead of a number when there is
//! nothing to compute, and velocity formatting.

use std::fmt;

use crate::config::SimSettings;
use crate::sim;
use crate::vehicle::VehicleSnapshot;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Readout {
    /// No vehicle under control.
    NotApplicable,
    /// Propellant is unlimited.
    Infinite,
    /// Delta-V in m/s.
    Value(f64),
}

impl Readout {
    /// The marker to show instead of a number, if any.
    pub fn marker(vehicle: Option<&VehicleSnapshot>) -> Option<Self> {
        match vehicle {
            None => Some(Readout::NotApplicable),
            Some(v) if !v.has_control => Some(Readout::NotApplicable),
            Some(v) if v.infinite_fuel => Some(Readout::Infinite),
            Some(_) => None,
        }
    }

    /// Compute the readout for whatever vehicle the player currently has.
    pub fn for_vehicle(vehicle: Option<&VehicleSnapshot>, settings: &SimSettings) -> Self {
        match (Self::marker(vehicle), vehicle) {
            (Some(marker), _) => marker,
            (None, Some(v)) => Readout::Value(sim::delta_v(v, settings)),
            (None, None) => Readout::NotApplicable,
        }
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readout::NotApplicable => f.write_str("-"),
            Readout::Infinite => f.write_str("∞"),
            Readout::Value(v) => f.write_str(&velocity_string(*v)),
        }
    }
}

/// `m/s` below 10 km/s, `km/s` above.
pub fn velocity_string(v: f64) -> String {
    if v.abs() < 10_000.0 {
        format!("{v:.1} m/s")
    } else {
        format!("{:.2} km/s", v / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::presets;

    #[test]
    fn markers() {
        let settings = SimSettings::default();
        assert_eq!(Readout::for_vehicle(None, &settings).to_string(), "-");

        let mut v = presets::single_engine();
        v.has_control = false;
        assert_eq!(Readout::for_vehicle(Some(&v), &settings), Readout::NotApplicable);

        v.has_control = true;
        v.infinite_fuel = true;
        assert_eq!(Readout::for_vehicle(Some(&v), &settings).to_string(), "∞");

        v.infinite_fuel = false;
        assert_eq!(Readout::marker(Some(&v)), None);
    }

    #[test]
    fn value_formatting() {
        let v = presets::single_engine();
        let r = Readout::for_vehicle(Some(&v), &SimSettings::default());
        assert_eq!(r.to_string(), "150.8 m/s");
        assert_eq!(velocity_string(12_346.0), "12.35 km/s");
    }
}
