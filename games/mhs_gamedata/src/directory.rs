//! Read-only queries over loaded prototype data.
//!
//! [`PrototypeDirectory`] answers the hierarchy questions rule evaluation
//! asks of the data layer: which blueprint a prototype was built from,
//! whether that blueprint derives from another, how difficulty tiers are
//! ordered, and which mission prototypes exist. It is filled once while
//! game data loads and only read afterwards.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{BlueprintId, MissionPrototype, PrototypeId};

/// Prototype hierarchy, difficulty tiers, and mission registry.
#[derive(Clone, Debug, Default)]
pub struct PrototypeDirectory {
    /// Blueprint each prototype was instantiated from.
    blueprints: FxHashMap<PrototypeId, BlueprintId>,
    /// Direct parents of each blueprint.
    blueprint_parents: FxHashMap<BlueprintId, Vec<BlueprintId>>,
    /// Default (abstract) prototype of each blueprint.
    default_prototypes: FxHashMap<BlueprintId, PrototypeId>,
    default_prototype_set: FxHashSet<PrototypeId>,
    /// Difficulty tier prototype -> position in the tier ordering.
    difficulty_tiers: FxHashMap<PrototypeId, u32>,
    missions: FxHashMap<PrototypeId, MissionPrototype>,
}

impl PrototypeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blueprint with its direct parents.
    pub fn add_blueprint(&mut self, blueprint: BlueprintId, parents: &[BlueprintId]) {
        self.blueprint_parents
            .insert(blueprint, parents.to_vec());
    }

    /// Register the default prototype of `blueprint`.
    pub fn set_default_prototype(&mut self, blueprint: BlueprintId, prototype: PrototypeId) {
        if let Some(old) = self.default_prototypes.insert(blueprint, prototype) {
            self.default_prototype_set.remove(&old);
        }
        self.default_prototype_set.insert(prototype);
        self.blueprints.insert(prototype, blueprint);
    }

    /// Register a concrete prototype instantiated from `blueprint`.
    pub fn add_prototype(&mut self, prototype: PrototypeId, blueprint: BlueprintId) {
        self.blueprints.insert(prototype, blueprint);
    }

    /// Whether `prototype` is the default prototype of its blueprint.
    pub fn is_default_prototype(&self, prototype: PrototypeId) -> bool {
        self.default_prototype_set.contains(&prototype)
    }

    /// Blueprint `prototype` was built from.
    pub fn blueprint_of(&self, prototype: PrototypeId) -> Option<BlueprintId> {
        self.blueprints.get(&prototype).copied()
    }

    /// Whether `blueprint` is `ancestor` or derives from it.
    pub fn blueprint_is_a(&self, blueprint: BlueprintId, ancestor: BlueprintId) -> bool {
        let mut pending = vec![blueprint];
        let mut seen = FxHashSet::default();
        while let Some(current) = pending.pop() {
            if current == ancestor {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(parents) = self.blueprint_parents.get(&current) {
                pending.extend(parents.iter().copied());
            }
        }
        false
    }

    /// Whether `prototype` was built from `blueprint` or one of its descendants.
    pub fn is_child_of_blueprint(&self, prototype: PrototypeId, blueprint: BlueprintId) -> bool {
        self.blueprint_of(prototype)
            .is_some_and(|own| self.blueprint_is_a(own, blueprint))
    }

    /// Register a difficulty tier at position `order` (lower is easier).
    pub fn add_difficulty_tier(&mut self, tier: PrototypeId, order: u32) {
        self.difficulty_tiers.insert(tier, order);
    }

    /// Whether `tier` lies in `[min, max]` by tier ordering.
    ///
    /// An invalid or unregistered bound is open on that side. An
    /// unregistered `tier` is never in range.
    pub fn difficulty_tier_in_range(
        &self,
        tier: PrototypeId,
        min: PrototypeId,
        max: PrototypeId,
    ) -> bool {
        let Some(&order) = self.difficulty_tiers.get(&tier) else {
            return false;
        };
        let above_min = self
            .difficulty_tiers
            .get(&min)
            .is_none_or(|&lo| order >= lo);
        let below_max = self
            .difficulty_tiers
            .get(&max)
            .is_none_or(|&hi| order <= hi);
        above_min && below_max
    }

    /// Register a mission prototype.
    pub fn add_mission(&mut self, mission: MissionPrototype) {
        self.missions.insert(mission.id, mission);
    }

    /// Look up a mission prototype.
    pub fn mission(&self, id: PrototypeId) -> Option<&MissionPrototype> {
        self.missions.get(&id)
    }
}
