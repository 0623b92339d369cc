use nalgebra::Vector2;

use super::snapshot::{
    BoosterSnapshot, BoosterState, EngineSnapshot, Flow, FlowScope, PoolSnapshot, ResourceType,
    VehicleSnapshot,
};

// ---------------------------------------------------------------------------
// Engine builder
// ---------------------------------------------------------------------------

pub struct EngineBuilder {
    name: String,
    engine_on: bool,
    thrust: f64,
    isp: f64,
    throttle: f64,
    thrust_normal: Vector2<f64>,
    flows: Vec<Flow>,
}

impl EngineBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            engine_on: true,
            thrust: 100.0,
            isp: 240.0,
            throttle: 1.0,
            thrust_normal: Vector2::new(0.0, 1.0),
            flows: vec![],
        }
    }

    pub fn engine_on(mut self, v: bool) -> Self { self.engine_on = v; self }
    pub fn thrust(mut self, v: f64) -> Self { self.thrust = v; self }
    pub fn isp(mut self, v: f64) -> Self { self.isp = v; self }
    pub fn throttle(mut self, v: f64) -> Self { self.throttle = v; self }
    pub fn thrust_normal(mut self, x: f64, y: f64) -> Self { self.thrust_normal = Vector2::new(x, y); self }

    /// Feed from the listed, directly connected pools.
    pub fn local(mut self, sources: &[usize]) -> Self {
        self.flows.push(Flow { scope: FlowScope::Local, sources: sources.to_vec() });
        self
    }

    /// Feed from the vehicle-wide pool(s) of a resource.
    pub fn global(mut self, sources: &[usize]) -> Self {
        self.flows.push(Flow { scope: FlowScope::Global, sources: sources.to_vec() });
        self
    }

    pub fn build(self) -> EngineSnapshot {
        EngineSnapshot {
            name: self.name,
            engine_on: self.engine_on,
            thrust: self.thrust,
            isp: self.isp,
            throttle: self.throttle,
            thrust_normal: self.thrust_normal,
            flows: self.flows,
        }
    }
}

// ---------------------------------------------------------------------------
// Booster builder
// ---------------------------------------------------------------------------

pub struct BoosterBuilder {
    name: String,
    state: BoosterState,
    wet_mass: f64,
    dry_mass_fraction: f64,
    fuel_fraction: f64,
    thrust_vector: Vector2<f64>,
    isp: f64,
}

impl BoosterBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: BoosterState::Primed,
            wet_mass: 1.0,
            dry_mass_fraction: 0.2,
            fuel_fraction: 1.0,
            thrust_vector: Vector2::new(0.0, 50.0),
            isp: 200.0,
        }
    }

    pub fn state(mut self, v: BoosterState) -> Self { self.state = v; self }
    pub fn wet_mass(mut self, v: f64) -> Self { self.wet_mass = v; self }
    pub fn dry_mass_fraction(mut self, v: f64) -> Self { self.dry_mass_fraction = v; self }
    pub fn fuel_fraction(mut self, v: f64) -> Self { self.fuel_fraction = v; self }
    pub fn thrust_vector(mut self, x: f64, y: f64) -> Self { self.thrust_vector = Vector2::new(x, y); self }
    pub fn isp(mut self, v: f64) -> Self { self.isp = v; self }

    pub fn build(self) -> BoosterSnapshot {
        BoosterSnapshot {
            name: self.name,
            state: self.state,
            wet_mass: self.wet_mass,
            dry_mass_fraction: self.dry_mass_fraction,
            fuel_fraction: self.fuel_fraction,
            thrust_vector: self.thrust_vector,
            isp: self.isp,
        }
    }
}

// ---------------------------------------------------------------------------
// Vehicle builder
// ---------------------------------------------------------------------------

/// Assembles a `VehicleSnapshot`. Pools are referenced by the order in which
/// they are added.
pub struct VehicleBuilder {
    name: String,
    dry_mass: f64,
    mass: Option<f64>,
    pools: Vec<PoolSnapshot>,
    engines: Vec<EngineSnapshot>,
    boosters: Vec<BoosterSnapshot>,
}

impl VehicleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dry_mass: 0.0,
            mass: None,
            pools: vec![],
            engines: vec![],
            boosters: vec![],
        }
    }

    /// Structure mass; the total is derived from it unless `mass` is set.
    pub fn dry_mass(mut self, v: f64) -> Self { self.dry_mass = v; self }

    /// Explicit total vehicle mass.
    pub fn mass(mut self, v: f64) -> Self { self.mass = Some(v); self }

    pub fn pool(mut self, resource: ResourceType, mass: f64) -> Self {
        self.pools.push(PoolSnapshot { resource, mass });
        self
    }

    pub fn engine(mut self, engine: EngineSnapshot) -> Self {
        self.engines.push(engine);
        self
    }

    pub fn booster(mut self, booster: BoosterSnapshot) -> Self {
        self.boosters.push(booster);
        self
    }

    pub fn build(self) -> VehicleSnapshot {
        let mass = self.mass.unwrap_or_else(|| {
            let pooled: f64 = self
                .pools
                .iter()
                .filter(|p| p.resource.is_propellant())
                .map(|p| p.mass)
                .sum();
            let boosters: f64 = self.boosters.iter().map(|b| b.wet_mass).sum();
            self.dry_mass + pooled + boosters
        });
        VehicleSnapshot {
            name: self.name,
            mass,
            has_control: true,
            infinite_fuel: false,
            pools: self.pools,
            engines: self.engines,
            boosters: self.boosters,
        }
    }
}
