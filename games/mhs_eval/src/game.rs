//! Host-side collaborators of the interpreter.
//!
//! The interpreter never owns game state. Static data (property schemas,
//! curves, the prototype hierarchy, global properties) arrives as a
//! [`GameData`] bundle; live entity state is reached through the [`Game`]
//! trait bound to each [`EvalContextData`](crate::EvalContextData).

use mhs_gamedata::{
    CurveTable, DbGuid, EntityId, InventoryConvenienceLabel, MissionState, PrototypeDirectory,
    PrototypeId, RegionId,
};
use mhs_properties::{PropertyCollectionRef, PropertyInfoTable};

/// Broad class of a live entity.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EntityKind {
    Player,
    Avatar,
    /// Entity placed in the world (items, agents, props).
    WorldEntity,
    /// Entity with no world presence.
    Entity,
}

impl EntityKind {
    /// Avatars are world entities too.
    pub fn is_world_entity(self) -> bool {
        matches!(self, EntityKind::Avatar | EntityKind::WorldEntity)
    }
}

/// Read access to live entity state.
///
/// Every lookup returns `None` when the entity (or relation) does not
/// exist; the interpreter turns that into an `Error` value or a default,
/// depending on the operator.
pub trait Game {
    /// Resolve a durable database guid to a live entity.
    fn entity_by_db_guid(&self, guid: DbGuid) -> Option<EntityId>;

    fn entity_kind(&self, entity: EntityId) -> Option<EntityKind>;

    /// Prototype the entity was created from.
    fn entity_prototype(&self, entity: EntityId) -> Option<PrototypeId>;

    fn entity_properties(&self, entity: EntityId) -> Option<PropertyCollectionRef>;

    /// Direct owner of the entity (an avatar's player, an item's holder).
    fn owner(&self, entity: EntityId) -> Option<EntityId>;

    /// Avatar currently in play for `player`.
    fn primary_avatar(&self, player: EntityId) -> Option<EntityId>;

    /// Region the entity is in. Players report the region they are loaded into.
    fn region_of(&self, entity: EntityId) -> Option<RegionId>;

    /// Difficulty tier prototype of a region, `INVALID` when none is set.
    fn region_difficulty_tier(&self, region: RegionId) -> PrototypeId;

    /// State of `mission` in `player`'s mission manager, `None` when the
    /// player has no instance of it.
    fn mission_state(&self, player: EntityId, mission: PrototypeId) -> Option<MissionState>;

    /// Contents of one of `owner`'s inventories.
    fn inventory(&self, owner: EntityId, label: InventoryConvenienceLabel) -> Option<&[EntityId]>;
}

/// Static data shared by every evaluation.
#[derive(Debug, Default)]
pub struct GameData {
    pub property_info: PropertyInfoTable,
    pub curves: CurveTable,
    pub prototypes: PrototypeDirectory,
    /// Process-wide global properties, exposed read-only as `Globals`.
    pub globals: Option<PropertyCollectionRef>,
}

impl GameData {
    /// Data with the built-in property schemas registered.
    pub fn new() -> Self {
        GameData {
            property_info: PropertyInfoTable::with_builtins(),
            ..Self::default()
        }
    }
}
