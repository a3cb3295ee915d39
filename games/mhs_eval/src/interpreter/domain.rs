//! Game predicates: difficulty tiers, missions and inventories.
//!
//! These read live entity state through the [`Game`] bound to the context
//! and static data from [`GameData::prototypes`](crate::GameData).

use mhs_gamedata::{EntityId, InventoryConvenienceLabel, MissionState, PrototypeId};
use mhs_properties::{PropertyEnum, PropertyId};

use super::Interpreter;
use crate::errors::{self, invalid_context_object, missing_field, no_game_bound, unknown_mission};
use crate::{Access, EntityKind, EvalContext, EvalContextData, EvalError, EvalResult, EvalVar, Game};

/// Ownership chains deeper than this are treated as having no player.
const MAX_OWNER_DEPTH: usize = 8;

pub(super) fn export_error() -> EvalResult {
    tracing::warn!("rule data failed to export correctly");
    Err(errors::export_error())
}

fn bound_game<'g>(ctx: &EvalContextData<'g>) -> Result<&'g dyn Game, EvalError> {
    ctx.game().ok_or_else(no_game_bound)
}

fn entity_from_var(var: &EvalVar, game: &dyn Game) -> Option<EntityId> {
    match *var {
        EvalVar::EntityPtr(entity) => entity,
        EvalVar::EntityGuid(guid) => game.entity_by_db_guid(guid),
        _ => None,
    }
}

/// `entity` itself if it is a player, else the first player up its
/// ownership chain.
fn owning_player(game: &dyn Game, entity: EntityId) -> Option<EntityId> {
    let mut current = entity;
    for _ in 0..MAX_OWNER_DEPTH {
        if game.entity_kind(current)? == EntityKind::Player {
            return Some(current);
        }
        current = game.owner(current)?;
    }
    None
}

/// `entity` if it is a player, or the player owning an avatar. Nothing
/// else has mission state.
fn player_or_avatar_owner(game: &dyn Game, entity: EntityId) -> Option<EntityId> {
    match game.entity_kind(entity)? {
        EntityKind::Player => Some(entity),
        EntityKind::Avatar => game
            .owner(entity)
            .filter(|&owner| game.entity_kind(owner) == Some(EntityKind::Player)),
        _ => None,
    }
}

impl Interpreter<'_> {
    /// Entity referenced by `context`.
    fn context_entity(
        &self,
        context: EvalContext,
        ctx: &EvalContextData<'_>,
        game: &dyn Game,
    ) -> Result<EntityId, EvalError> {
        let var = ctx.get_var(context, self.data.globals.as_ref(), Access::Read)?;
        entity_from_var(&var, game).ok_or_else(|| {
            invalid_context_object(format!("{context} does not reference a live entity, got {}", var.kind()))
        })
    }

    /// Whether the difficulty tier of the context lies in `[min, max]`.
    ///
    /// Entities use the tier of the region they are in; property
    /// collections use their `DifficultyTier` property. No tier at all
    /// counts as in range.
    pub(super) fn eval_difficulty_tier_range(
        &self,
        context: EvalContext,
        min: PrototypeId,
        max: PrototypeId,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        let var = ctx.get_var(context, self.data.globals.as_ref(), Access::Read)?;
        let tier = match var {
            EvalVar::EntityPtr(_) | EvalVar::EntityGuid(_) => {
                let game = bound_game(ctx)?;
                let entity = entity_from_var(&var, game)
                    .ok_or_else(|| invalid_context_object(format!("{context} does not reference a live entity")))?;
                game.region_of(entity)
                    .map_or(PrototypeId::INVALID, |region| game.region_difficulty_tier(region))
            }
            EvalVar::PropertyCollectionPtr(Some(ref collection)) => collection
                .borrow()
                .get_prototype(PropertyId::new(PropertyEnum::DIFFICULTY_TIER)),
            ref other => {
                return Err(invalid_context_object(format!(
                    "expected an entity or a property collection, got {}",
                    other.kind()
                )))
            }
        };

        if !tier.is_valid() {
            return Ok(EvalVar::Bool(true));
        }
        Ok(EvalVar::Bool(
            self.data.prototypes.difficulty_tier_in_range(tier, min, max),
        ))
    }

    pub(super) fn eval_mission_is_active(
        &self,
        context: EvalContext,
        mission: PrototypeId,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        let game = bound_game(ctx)?;
        let entity = self.context_entity(context, ctx, game)?;
        let player = player_or_avatar_owner(game, entity)
            .ok_or_else(|| invalid_context_object("context is not a player"))?;

        let proto = self
            .data
            .prototypes
            .mission(mission)
            .ok_or_else(|| unknown_mission(mission))?;
        if !proto.is_enabled() {
            return Ok(EvalVar::Bool(false));
        }

        let state = game.mission_state(player, mission);
        Ok(EvalVar::Bool(state == Some(MissionState::Active)))
    }

    /// Completion of `mission` for the context's player.
    ///
    /// Missions saved per avatar require an avatar context. The primary
    /// avatar's progress lives in the player's mission manager; any other
    /// avatar keeps it in its `AvatarMissionState` property.
    pub(super) fn eval_mission_is_complete(
        &self,
        context: EvalContext,
        mission: PrototypeId,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        let game = bound_game(ctx)?;
        let entity = self.context_entity(context, ctx, game)?;
        let player = owning_player(game, entity)
            .ok_or_else(|| invalid_context_object("context is not a player"))?;

        let proto = self
            .data
            .prototypes
            .mission(mission)
            .ok_or_else(|| unknown_mission(mission))?;
        if !proto.is_enabled() {
            return Ok(EvalVar::Bool(false));
        }

        if proto.save_state_per_avatar {
            if game.entity_kind(entity) != Some(EntityKind::Avatar) {
                return Err(invalid_context_object(
                    "mission state is per-avatar but context is not an avatar",
                ));
            }
            if game.primary_avatar(player) != Some(entity) {
                return Ok(EvalVar::Bool(self.avatar_mission_complete(game, entity, mission)));
            }
        }

        let state = game.mission_state(player, mission);
        Ok(EvalVar::Bool(state == Some(MissionState::Completed)))
    }

    fn avatar_mission_complete(&self, game: &dyn Game, avatar: EntityId, mission: PrototypeId) -> bool {
        let Some(properties) = game.entity_properties(avatar) else {
            return false;
        };
        let Some(param) = self
            .data
            .property_info
            .lookup(PropertyEnum::AVATAR_MISSION_STATE)
            .and_then(|info| info.param_from_prototype(0, mission))
        else {
            return false;
        };
        let id = PropertyId::with_param(PropertyEnum::AVATAR_MISSION_STATE, param);
        let state = properties.borrow().get_integer(id);
        state == MissionState::Completed.to_raw()
    }

    /// Whether the context entity holds a matching entity in one of its
    /// inventories.
    ///
    /// An invalid `entity` filter matches anything. A default prototype
    /// filter also matches every prototype built from its blueprint.
    pub(super) fn eval_has_entity_in_inventory(
        &self,
        context: EvalContext,
        entity: PrototypeId,
        inventory: InventoryConvenienceLabel,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        let game = bound_game(ctx)?;
        let owner = self.context_entity(context, ctx, game)?;
        if !inventory.is_set() {
            return Err(missing_field("Inventory"));
        }

        let directory = &self.data.prototypes;
        let parent = if entity.is_valid() && directory.is_default_prototype(entity) {
            directory.blueprint_of(entity)
        } else {
            None
        };

        let Some(contents) = game.inventory(owner, inventory) else {
            return Ok(EvalVar::Bool(false));
        };

        let found = contents
            .iter()
            .filter(|&&id| game.entity_kind(id).is_some_and(EntityKind::is_world_entity))
            .filter_map(|&id| game.entity_prototype(id))
            .any(|proto| {
                !entity.is_valid()
                    || proto == entity
                    || parent.is_some_and(|blueprint| directory.is_child_of_blueprint(proto, blueprint))
            });
        Ok(EvalVar::Bool(found))
    }
}
