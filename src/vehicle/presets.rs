use super::builder::{BoosterBuilder, EngineBuilder, VehicleBuilder};
use super::snapshot::{BoosterState, ResourceType, VehicleSnapshot};

fn liquid_fuel() -> ResourceType {
    ResourceType::new("liquid_fuel", 1.0)
}

fn xenon() -> ResourceType {
    ResourceType::new("xenon", 1.0)
}

fn electricity() -> ResourceType {
    ResourceType::new("electricity", 0.0)
}

/// One engine on one tank.
pub fn single_engine() -> VehicleSnapshot {
    VehicleBuilder::new("Single Engine")
        .mass(1000.0)
        .pool(liquid_fuel(), 50.0)
        .engine(
            EngineBuilder::new("Main")
                .thrust(1000.0)
                .isp(300.0)
                .local(&[0])
                .build(),
        )
        .build()
}

/// Chemical kick motor plus an ion drive that pulls xenon from anywhere.
pub fn ion_probe() -> VehicleSnapshot {
    VehicleBuilder::new("Ion Probe")
        .dry_mass(3.0)
        .pool(liquid_fuel(), 2.0)
        .pool(xenon(), 0.4)      // tank wired to the attitude thruster
        .pool(xenon(), 1.0)      // vehicle-wide xenon
        .pool(electricity(), 50.0)
        .engine(
            EngineBuilder::new("Kick Motor")
                .thrust(40.0)
                .isp(300.0)
                .local(&[0])
                .build(),
        )
        .engine(
            EngineBuilder::new("Attitude Thruster")
                .thrust(0.5)
                .isp(800.0)
                .thrust_normal(1.0, 0.0)
                .local(&[1, 3])
                .build(),
        )
        .engine(
            EngineBuilder::new("Ion Drive")
                .thrust(2.0)
                .isp(4200.0)
                .global(&[2])
                .build(),
        )
        .build()
}

/// Lander with a descent engine, one lit booster and one held in reserve.
pub fn booster_lander() -> VehicleSnapshot {
    VehicleBuilder::new("Booster Lander")
        .dry_mass(6.0)
        .pool(liquid_fuel(), 4.0)
        .engine(
            EngineBuilder::new("Descent Engine")
                .thrust(60.0)
                .isp(280.0)
                .throttle(0.5)
                .local(&[0])
                .build(),
        )
        .booster(
            BoosterBuilder::new("Side Booster")
                .state(BoosterState::Firing)
                .wet_mass(3.0)
                .dry_mass_fraction(0.2)
                .thrust_vector(0.0, 120.0)
                .isp(210.0)
                .build(),
        )
        .booster(
            BoosterBuilder::new("Reserve Booster")
                .state(BoosterState::Primed)
                .wet_mass(3.0)
                .dry_mass_fraction(0.2)
                .thrust_vector(0.0, 120.0)
                .isp(210.0)
                .build(),
        )
        .build()
}

/// Look up a preset by its command-line name.
pub fn by_name(name: &str) -> Option<VehicleSnapshot> {
    match name {
        "single" | "single-engine" => Some(single_engine()),
        "ion" | "ion-probe" => Some(ion_probe()),
        "lander" | "booster-lander" => Some(booster_lander()),
        _ => None,
    }
}

pub const NAMES: &[&str] = &["single-engine", "ion-probe", "booster-lander"];
