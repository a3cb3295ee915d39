//! Runtime values of the rule interpreter.
//!
//! Every node evaluates to an [`EvalVar`]. Reference kinds hold shared
//! handles to data owned elsewhere (entity state, condition lists, global
//! tables); a value never outlives the evaluation that produced it in any
//! meaningful way, since the context it was read from is dropped with the
//! call.
//!
//! # Extraction
//!
//! The `try_get_*` methods implement the coercion table:
//! - `i32`/`i64` accept `Int` and `Float` (truncating toward zero)
//! - `f32` accepts `Int` and `Float`
//! - `bool` accepts `Bool`, `Int > 0`, `Float > 0.0`, and `Undefined` as `false`
//! - reference kinds accept only their exact kind, except property
//!   collections which can also be reached through an entity or a db guid

use std::fmt;
use std::rc::Rc;

use mhs_gamedata::{AssetId, DbGuid, EntityId, PrototypeId};
use mhs_properties::{PropertyCollectionRef, PropertyId};

use crate::{ConditionCollection, Game};

/// Tagged runtime value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EvalVar {
    /// Universal failure value. Uninitialized slots hold it too.
    #[default]
    Error,
    /// Valid "no value" result, produced by assignments.
    Undefined,
    Int(i64),
    Float(f32),
    Bool(bool),
    AssetRef(AssetId),
    ProtoRef(PrototypeId),
    PropertyId(PropertyId),
    EntityId(EntityId),
    EntityPtr(Option<EntityId>),
    EntityGuid(DbGuid),
    PropertyCollectionPtr(Option<PropertyCollectionRef>),
    ConditionCollectionPtr(Option<Rc<ConditionCollection>>),
    ProtoRefListPtr(Option<Rc<Vec<PrototypeId>>>),
    ProtoRefVectorPtr(Option<Rc<[PrototypeId]>>),
}

/// Kind tag of an [`EvalVar`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EvalVarKind {
    Error,
    Undefined,
    Int,
    Float,
    Bool,
    AssetRef,
    ProtoRef,
    PropertyId,
    EntityId,
    EntityPtr,
    EntityGuid,
    PropertyCollectionPtr,
    ConditionCollectionPtr,
    ProtoRefListPtr,
    ProtoRefVectorPtr,
}

impl fmt::Display for EvalVarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl EvalVar {
    pub fn kind(&self) -> EvalVarKind {
        match self {
            EvalVar::Error => EvalVarKind::Error,
            EvalVar::Undefined => EvalVarKind::Undefined,
            EvalVar::Int(_) => EvalVarKind::Int,
            EvalVar::Float(_) => EvalVarKind::Float,
            EvalVar::Bool(_) => EvalVarKind::Bool,
            EvalVar::AssetRef(_) => EvalVarKind::AssetRef,
            EvalVar::ProtoRef(_) => EvalVarKind::ProtoRef,
            EvalVar::PropertyId(_) => EvalVarKind::PropertyId,
            EvalVar::EntityId(_) => EvalVarKind::EntityId,
            EvalVar::EntityPtr(_) => EvalVarKind::EntityPtr,
            EvalVar::EntityGuid(_) => EvalVarKind::EntityGuid,
            EvalVar::PropertyCollectionPtr(_) => EvalVarKind::PropertyCollectionPtr,
            EvalVar::ConditionCollectionPtr(_) => EvalVarKind::ConditionCollectionPtr,
            EvalVar::ProtoRefListPtr(_) => EvalVarKind::ProtoRefListPtr,
            EvalVar::ProtoRefVectorPtr(_) => EvalVarKind::ProtoRefVectorPtr,
        }
    }

    /// `true` for `Int` and `Float`.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, EvalVar::Int(_) | EvalVar::Float(_))
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, EvalVar::Error)
    }

    /// `true` for a reference kind holding no target.
    pub fn is_null_ref(&self) -> bool {
        matches!(
            self,
            EvalVar::EntityPtr(None)
                | EvalVar::PropertyCollectionPtr(None)
                | EvalVar::ConditionCollectionPtr(None)
                | EvalVar::ProtoRefListPtr(None)
                | EvalVar::ProtoRefVectorPtr(None)
        )
    }

    pub fn try_get_i32(&self) -> Option<i32> {
        match *self {
            EvalVar::Int(v) => Some(v as i32),
            EvalVar::Float(v) => Some(v as i32),
            _ => None,
        }
    }

    pub fn try_get_i64(&self) -> Option<i64> {
        match *self {
            EvalVar::Int(v) => Some(v),
            EvalVar::Float(v) => Some(v as i64),
            _ => None,
        }
    }

    pub fn try_get_f32(&self) -> Option<f32> {
        match *self {
            EvalVar::Int(v) => Some(v as f32),
            EvalVar::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn try_get_bool(&self) -> Option<bool> {
        match *self {
            EvalVar::Int(v) => Some(v > 0),
            EvalVar::Float(v) => Some(v > 0.0),
            EvalVar::Bool(v) => Some(v),
            // Default-initialized payload.
            EvalVar::Undefined => Some(false),
            _ => None,
        }
    }

    pub fn try_get_entity_id(&self) -> Option<EntityId> {
        match *self {
            EvalVar::EntityId(id) => Some(id),
            _ => None,
        }
    }

    pub fn try_get_proto_ref(&self) -> Option<PrototypeId> {
        match *self {
            EvalVar::ProtoRef(id) => Some(id),
            _ => None,
        }
    }

    pub fn try_get_asset_ref(&self) -> Option<AssetId> {
        match *self {
            EvalVar::AssetRef(id) => Some(id),
            _ => None,
        }
    }

    pub fn try_get_property_id(&self) -> Option<PropertyId> {
        match *self {
            EvalVar::PropertyId(id) => Some(id),
            _ => None,
        }
    }

    /// Entity behind an `EntityPtr`.
    pub fn try_get_entity(&self) -> Option<EntityId> {
        match *self {
            EvalVar::EntityPtr(entity) => entity,
            _ => None,
        }
    }

    pub fn try_get_condition_collection(&self) -> Option<&Rc<ConditionCollection>> {
        match self {
            EvalVar::ConditionCollectionPtr(conditions) => conditions.as_ref(),
            _ => None,
        }
    }

    pub fn try_get_proto_ref_list(&self) -> Option<&[PrototypeId]> {
        match self {
            EvalVar::ProtoRefListPtr(Some(list)) => Some(list.as_slice()),
            _ => None,
        }
    }

    pub fn try_get_proto_ref_vector(&self) -> Option<&[PrototypeId]> {
        match self {
            EvalVar::ProtoRefVectorPtr(Some(vector)) => Some(vector),
            _ => None,
        }
    }

    /// Property collection referenced by this value.
    ///
    /// `EntityPtr` and `EntityGuid` resolve through `game` to the entity's
    /// properties. A failed lookup is `None`.
    pub fn try_get_property_collection(
        &self,
        game: Option<&dyn Game>,
    ) -> Option<PropertyCollectionRef> {
        match self {
            EvalVar::PropertyCollectionPtr(collection) => collection.clone(),
            EvalVar::EntityPtr(Some(entity)) => game?.entity_properties(*entity),
            EvalVar::EntityGuid(guid) => {
                let game = game?;
                let entity = game.entity_by_db_guid(*guid)?;
                game.entity_properties(entity)
            }
            _ => None,
        }
    }
}

impl From<i64> for EvalVar {
    fn from(v: i64) -> Self {
        EvalVar::Int(v)
    }
}

impl From<i32> for EvalVar {
    fn from(v: i32) -> Self {
        EvalVar::Int(i64::from(v))
    }
}

impl From<f32> for EvalVar {
    fn from(v: f32) -> Self {
        EvalVar::Float(v)
    }
}

impl From<bool> for EvalVar {
    fn from(v: bool) -> Self {
        EvalVar::Bool(v)
    }
}

impl From<PrototypeId> for EvalVar {
    fn from(v: PrototypeId) -> Self {
        EvalVar::ProtoRef(v)
    }
}

impl From<AssetId> for EvalVar {
    fn from(v: AssetId) -> Self {
        EvalVar::AssetRef(v)
    }
}

impl From<PropertyCollectionRef> for EvalVar {
    fn from(v: PropertyCollectionRef) -> Self {
        EvalVar::PropertyCollectionPtr(Some(v))
    }
}
