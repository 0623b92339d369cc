pub mod snapshot;
pub mod builder;
pub mod presets;

pub use snapshot::{
    BoosterSnapshot, BoosterState, EngineSnapshot, Flow, FlowScope, PoolSnapshot, ResourceType,
    SnapshotError, VehicleSnapshot,
};
pub use builder::{BoosterBuilder, EngineBuilder, VehicleBuilder};
