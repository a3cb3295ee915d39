//! In-memory [`Game`] for tests and tooling: players, avatars, inventories,
//! regions and mission state held in plain maps.

use rustc_hash::FxHashMap;

use mhs_gamedata::{
    DbGuid, EntityId, InventoryConvenienceLabel, MissionState, PrototypeId, RegionId,
};
use mhs_properties::PropertyCollectionRef;

use crate::{EntityKind, Game};

struct EntityRecord {
    kind: EntityKind,
    prototype: PrototypeId,
    properties: PropertyCollectionRef,
    owner: Option<EntityId>,
    region: Option<RegionId>,
    primary_avatar: Option<EntityId>,
    inventories: FxHashMap<InventoryConvenienceLabel, Vec<EntityId>>,
}

impl EntityRecord {
    fn new(kind: EntityKind, prototype: PrototypeId) -> Self {
        EntityRecord {
            kind,
            prototype,
            properties: PropertyCollectionRef::new(),
            owner: None,
            region: None,
            primary_avatar: None,
            inventories: FxHashMap::default(),
        }
    }
}

/// In-memory [`Game`] for tests and simple host tooling.
///
/// Holds players, their avatars, world entities, inventories, regions with
/// difficulty tiers, and per-player mission states. Entity ids are handed
/// out sequentially from 1.
pub struct ReferenceGame {
    entities: FxHashMap<EntityId, EntityRecord>,
    guids: FxHashMap<DbGuid, EntityId>,
    region_tiers: FxHashMap<RegionId, PrototypeId>,
    missions: FxHashMap<(EntityId, PrototypeId), MissionState>,
    next_entity_id: u64,
}

impl Default for ReferenceGame {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceGame {
    pub fn new() -> Self {
        ReferenceGame {
            entities: FxHashMap::default(),
            guids: FxHashMap::default(),
            region_tiers: FxHashMap::default(),
            missions: FxHashMap::default(),
            next_entity_id: 1,
        }
    }

    fn spawn(&mut self, kind: EntityKind, prototype: PrototypeId) -> EntityId {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        self.entities.insert(id, EntityRecord::new(kind, prototype));
        id
    }

    pub fn create_player(&mut self, prototype: PrototypeId) -> EntityId {
        self.spawn(EntityKind::Player, prototype)
    }

    /// Create an avatar owned by `player`. A player's first avatar becomes
    /// its primary avatar.
    pub fn create_avatar(&mut self, player: EntityId, prototype: PrototypeId) -> EntityId {
        let avatar = self.spawn(EntityKind::Avatar, prototype);
        if let Some(record) = self.entities.get_mut(&avatar) {
            record.owner = Some(player);
        }
        if let Some(record) = self.entities.get_mut(&player) {
            record.primary_avatar.get_or_insert(avatar);
        }
        avatar
    }

    pub fn set_primary_avatar(&mut self, player: EntityId, avatar: EntityId) {
        if let Some(record) = self.entities.get_mut(&player) {
            record.primary_avatar = Some(avatar);
        }
    }

    pub fn create_world_entity(&mut self, prototype: PrototypeId) -> EntityId {
        self.spawn(EntityKind::WorldEntity, prototype)
    }

    /// Create an entity with no world presence.
    pub fn create_entity(&mut self, prototype: PrototypeId) -> EntityId {
        self.spawn(EntityKind::Entity, prototype)
    }

    /// Register a region and its difficulty tier.
    pub fn add_region(&mut self, region: RegionId, difficulty_tier: PrototypeId) {
        self.region_tiers.insert(region, difficulty_tier);
    }

    /// Place an entity (or load a player) into `region`.
    pub fn enter_region(&mut self, entity: EntityId, region: RegionId) {
        if let Some(record) = self.entities.get_mut(&entity) {
            record.region = Some(region);
        }
    }

    /// Put `item` into one of `owner`'s inventories and make `owner` its owner.
    pub fn add_to_inventory(
        &mut self,
        owner: EntityId,
        label: InventoryConvenienceLabel,
        item: EntityId,
    ) {
        if let Some(record) = self.entities.get_mut(&owner) {
            record.inventories.entry(label).or_default().push(item);
        }
        if let Some(record) = self.entities.get_mut(&item) {
            record.owner = Some(owner);
        }
    }

    pub fn set_db_guid(&mut self, entity: EntityId, guid: DbGuid) {
        self.guids.insert(guid, entity);
    }

    pub fn set_mission_state(&mut self, player: EntityId, mission: PrototypeId, state: MissionState) {
        self.missions.insert((player, mission), state);
    }

    /// Property collection of `entity`.
    pub fn properties(&self, entity: EntityId) -> Option<PropertyCollectionRef> {
        self.entities.get(&entity).map(|record| record.properties.clone())
    }
}

impl Game for ReferenceGame {
    fn entity_by_db_guid(&self, guid: DbGuid) -> Option<EntityId> {
        self.guids
            .get(&guid)
            .copied()
            .filter(|entity| self.entities.contains_key(entity))
    }

    fn entity_kind(&self, entity: EntityId) -> Option<EntityKind> {
        self.entities.get(&entity).map(|record| record.kind)
    }

    fn entity_prototype(&self, entity: EntityId) -> Option<PrototypeId> {
        self.entities.get(&entity).map(|record| record.prototype)
    }

    fn entity_properties(&self, entity: EntityId) -> Option<PropertyCollectionRef> {
        self.properties(entity)
    }

    fn owner(&self, entity: EntityId) -> Option<EntityId> {
        self.entities.get(&entity)?.owner
    }

    fn primary_avatar(&self, player: EntityId) -> Option<EntityId> {
        self.entities.get(&player)?.primary_avatar
    }

    fn region_of(&self, entity: EntityId) -> Option<RegionId> {
        self.entities.get(&entity)?.region
    }

    fn region_difficulty_tier(&self, region: RegionId) -> PrototypeId {
        self.region_tiers
            .get(&region)
            .copied()
            .unwrap_or(PrototypeId::INVALID)
    }

    fn mission_state(&self, player: EntityId, mission: PrototypeId) -> Option<MissionState> {
        self.missions.get(&(player, mission)).copied()
    }

    fn inventory(&self, owner: EntityId, label: InventoryConvenienceLabel) -> Option<&[EntityId]> {
        self.entities
            .get(&owner)?
            .inventories
            .get(&label)
            .map(Vec::as_slice)
    }
}
