//! Game data primitives shared by the property system and rule evaluation.
//!
//! This crate owns the identifiers and the read-only data queries that the
//! rest of the server consumes: id newtypes, numeric curves, the prototype
//! hierarchy, and mission and inventory vocabulary. Loading these from the
//! data files happens elsewhere; here they are only registered and queried.

mod curve;
mod directory;
mod ids;
mod inventory;
mod mission;

pub use curve::{Curve, CurveTable};
pub use directory::PrototypeDirectory;
pub use ids::{AssetId, BlueprintId, CurveId, DbGuid, EntityId, PrototypeId, RegionId};
pub use inventory::InventoryConvenienceLabel;
pub use mission::{MissionPrototype, MissionState};
