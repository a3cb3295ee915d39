//! Evaluation context: the activation record of one rule evaluation.
//!
//! An [`EvalContextData`] holds a fixed array of named slots, each with a
//! read-only flag chosen by the caller, plus the two scratch stack
//! collections that give scopes and loops their nesting. Every handler
//! obtains its operands through [`EvalContextData::get_var`], which applies
//! the read-only and null checks in one place.

use std::fmt;
use std::rc::Rc;

use mhs_gamedata::{EntityId, PrototypeId};
use mhs_properties::PropertyCollectionRef;

use crate::errors::{globals_unavailable, invalid_context, null_context, read_only_context};
use crate::{ConditionCollection, EvalError, EvalResult, EvalVar, Game};

/// Named binding point resolved at evaluation time.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvalContext {
    #[default]
    Default,
    Entity,
    Other,
    EntityBehaviorBlackboard,
    Condition,
    ConditionKeywords,
    Var1,
    Var2,
    Var3,
    Var4,
    Var5,
    CallerStack,
    LocalStack,
    Globals,
}

impl EvalContext {
    /// Number of slot contexts stored in [`EvalContextData`].
    pub const MAX_VARS: usize = 11;

    const SLOTS: [EvalContext; Self::MAX_VARS] = [
        EvalContext::Default,
        EvalContext::Entity,
        EvalContext::Other,
        EvalContext::EntityBehaviorBlackboard,
        EvalContext::Condition,
        EvalContext::ConditionKeywords,
        EvalContext::Var1,
        EvalContext::Var2,
        EvalContext::Var3,
        EvalContext::Var4,
        EvalContext::Var5,
    ];

    /// Array index of a slot context, `None` for the stacks and globals.
    pub fn slot_index(self) -> Option<usize> {
        match self {
            EvalContext::CallerStack | EvalContext::LocalStack | EvalContext::Globals => None,
            slot => Some(slot as usize),
        }
    }

    /// `true` for `Var1..=Var5`.
    pub fn is_var_slot(self) -> bool {
        matches!(
            self,
            EvalContext::Var1
                | EvalContext::Var2
                | EvalContext::Var3
                | EvalContext::Var4
                | EvalContext::Var5
        )
    }
}

/// Raw context ids as stored in game data. `11` is the slot count
/// sentinel and names no context.
impl TryFrom<u32> for EvalContext {
    type Error = u32;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            0..=10 => Ok(Self::SLOTS[raw as usize]),
            12 => Ok(EvalContext::CallerStack),
            13 => Ok(EvalContext::LocalStack),
            14 => Ok(EvalContext::Globals),
            _ => Err(raw),
        }
    }
}

impl fmt::Display for EvalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How a handler intends to use a resolved context value.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Access {
    /// Read, rejecting null references.
    Read,
    /// Mutate the referenced data; the slot must not be read-only.
    Write,
    /// Read without the null check, to test null-ness itself.
    Inspect,
}

/// One slot value and its read-only flag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContextVar {
    pub var: EvalVar,
    pub read_only: bool,
}

/// Activation record passed through one evaluation.
pub struct EvalContextData<'g> {
    vars: [ContextVar; EvalContext::MAX_VARS],
    pub(crate) caller_stack: Option<PropertyCollectionRef>,
    pub(crate) local_stack: Option<PropertyCollectionRef>,
    game: Option<&'g dyn Game>,
}

impl Default for EvalContextData<'_> {
    fn default() -> Self {
        EvalContextData {
            vars: std::array::from_fn(|_| ContextVar::default()),
            caller_stack: None,
            local_stack: None,
            game: None,
        }
    }
}

impl<'g> EvalContextData<'g> {
    /// Context with every slot uninitialized and no game bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context bound to `game` for entity lookups.
    pub fn with_game(game: &'g dyn Game) -> Self {
        EvalContextData {
            game: Some(game),
            ..Self::default()
        }
    }

    pub fn game(&self) -> Option<&'g dyn Game> {
        self.game
    }

    pub fn set_game(&mut self, game: &'g dyn Game) {
        self.game = Some(game);
    }

    // Slot setters

    pub fn set_var(&mut self, context: EvalContext, var: EvalVar) -> Result<(), EvalError> {
        self.store(context, var, false)
    }

    pub fn set_read_only_var(&mut self, context: EvalContext, var: EvalVar) -> Result<(), EvalError> {
        self.store(context, var, true)
    }

    pub fn set_property_collection(
        &mut self,
        context: EvalContext,
        collection: Option<PropertyCollectionRef>,
    ) -> Result<(), EvalError> {
        self.set_var(context, EvalVar::PropertyCollectionPtr(collection))
    }

    pub fn set_read_only_property_collection(
        &mut self,
        context: EvalContext,
        collection: Option<PropertyCollectionRef>,
    ) -> Result<(), EvalError> {
        self.set_read_only_var(context, EvalVar::PropertyCollectionPtr(collection))
    }

    pub fn set_entity(&mut self, context: EvalContext, entity: Option<EntityId>) -> Result<(), EvalError> {
        self.set_var(context, EvalVar::EntityPtr(entity))
    }

    pub fn set_read_only_entity(
        &mut self,
        context: EvalContext,
        entity: Option<EntityId>,
    ) -> Result<(), EvalError> {
        self.set_read_only_var(context, EvalVar::EntityPtr(entity))
    }

    pub fn set_condition_collection(
        &mut self,
        context: EvalContext,
        conditions: Option<Rc<ConditionCollection>>,
    ) -> Result<(), EvalError> {
        self.set_var(context, EvalVar::ConditionCollectionPtr(conditions))
    }

    pub fn set_read_only_proto_ref_list(
        &mut self,
        context: EvalContext,
        list: Option<Rc<Vec<PrototypeId>>>,
    ) -> Result<(), EvalError> {
        self.set_read_only_var(context, EvalVar::ProtoRefListPtr(list))
    }

    pub fn set_read_only_proto_ref_vector(
        &mut self,
        context: EvalContext,
        vector: Option<Rc<[PrototypeId]>>,
    ) -> Result<(), EvalError> {
        self.set_read_only_var(context, EvalVar::ProtoRefVectorPtr(vector))
    }

    fn store(&mut self, context: EvalContext, var: EvalVar, read_only: bool) -> Result<(), EvalError> {
        let index = context.slot_index().ok_or_else(|| invalid_context(context))?;
        self.vars[index] = ContextVar { var, read_only };
        Ok(())
    }

    /// Overwrite a well-known slot. Non-slot contexts are ignored.
    pub(crate) fn store_slot(&mut self, context: EvalContext, var: EvalVar, read_only: bool) {
        if let Some(slot) = context.slot_index().and_then(|i| self.vars.get_mut(i)) {
            *slot = ContextVar { var, read_only };
        }
    }

    /// Stored slot, `None` for the stacks and globals.
    pub fn var(&self, context: EvalContext) -> Option<&ContextVar> {
        self.vars.get(context.slot_index()?)
    }

    // Stack collections

    pub fn local_stack(&self) -> Option<&PropertyCollectionRef> {
        self.local_stack.as_ref()
    }

    pub fn caller_stack(&self) -> Option<&PropertyCollectionRef> {
        self.caller_stack.as_ref()
    }

    pub fn set_local_stack(&mut self, collection: Option<PropertyCollectionRef>) {
        self.local_stack = collection;
    }

    pub fn set_caller_stack(&mut self, collection: Option<PropertyCollectionRef>) {
        self.caller_stack = collection;
    }

    /// Resolve `context` to a value.
    ///
    /// Slots yield their stored value, including an uninitialized `Error`.
    /// The stacks are always writable; `Globals` is read-only and fails when
    /// `globals` is unset. Unless `access` is [`Access::Inspect`], a null
    /// reference is an error.
    pub fn get_var(
        &self,
        context: EvalContext,
        globals: Option<&PropertyCollectionRef>,
        access: Access,
    ) -> EvalResult {
        let (var, read_only) = match context {
            EvalContext::CallerStack => (EvalVar::PropertyCollectionPtr(self.caller_stack.clone()), false),
            EvalContext::LocalStack => (EvalVar::PropertyCollectionPtr(self.local_stack.clone()), false),
            EvalContext::Globals => {
                let globals = globals.ok_or_else(globals_unavailable)?;
                (EvalVar::PropertyCollectionPtr(Some(globals.clone())), true)
            }
            slot => {
                let stored = self.var(slot).ok_or_else(|| invalid_context(slot))?;
                (stored.var.clone(), stored.read_only)
            }
        };

        if access == Access::Write && read_only {
            return Err(read_only_context(context));
        }
        if access != Access::Inspect && var.is_null_ref() {
            return Err(null_context(context));
        }
        Ok(var)
    }
}

impl fmt::Debug for EvalContextData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalContextData")
            .field("vars", &self.vars)
            .field("caller_stack", &self.caller_stack)
            .field("local_stack", &self.local_stack)
            .field("has_game", &self.game.is_some())
            .finish()
    }
}
