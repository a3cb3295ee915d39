//! Tree-walking interpreter for rule expressions.
//!
//! # Architecture
//!
//! [`Interpreter::run`] is the boundary: it always returns an [`EvalVar`],
//! turning any failure into `EvalVar::Error`. Internally every node
//! evaluates to an [`EvalResult`] and failures travel with `?`. The first
//! node to fail logs a warning and tags the error with its operator and
//! expression string; enclosing nodes pass it through untouched.
//!
//! Handlers are grouped by operator family:
//!
//! - `load` - literals, context slot loads, curves, null tests
//! - `arithmetic` - `Add`, `Sub`, `Mult`, `Div`, `Modulus`, `Max`, `Min`, `Exponent`
//! - `logic` - `And`, `Or`, `Not`, `Equals`, `GreaterThan`, `LessThan`
//! - `control` - `IfElse`, `Scope`, `For`, `ForEach*`
//! - `properties` - property reads and writes through the schema table
//! - `domain` - mission, difficulty and inventory predicates
//! - `unsupported` - reserved operators
//!
//! Scopes and loops swap the caller and local stack collections through the
//! RAII [`frame::StackFrame`] guard.

mod arithmetic;
mod builder;
mod control;
mod domain;
mod frame;
mod load;
mod logic;
mod properties;
mod unsupported;

pub use builder::InterpreterBuilder;

use mhs_gamedata::PrototypeId;

use crate::errors::missing_field;
use crate::stack::ensure_sufficient_stack;
use crate::{
    EvalConfig, EvalContextData, EvalError, EvalNode, EvalPrototype, EvalResult, EvalVar, GameData,
};

/// Rule interpreter over one set of static game data.
///
/// Holds no per-evaluation state; all of that lives in the
/// [`EvalContextData`] passed to each call.
#[derive(Debug)]
pub struct Interpreter<'a> {
    data: &'a GameData,
    config: EvalConfig,
}

impl<'a> Interpreter<'a> {
    /// Interpreter with the default configuration.
    pub fn new(data: &'a GameData) -> Self {
        Interpreter {
            data,
            config: EvalConfig::default(),
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn data(&self) -> &'a GameData {
        self.data
    }

    /// Evaluate `node`. Any failure yields `EvalVar::Error`.
    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(op = node.map(|n| n.op().as_str()))
    )]
    pub fn run(&self, node: Option<&EvalPrototype>, ctx: &mut EvalContextData<'_>) -> EvalVar {
        match self.try_run(node, ctx) {
            Ok(value) => {
                tracing::trace!(kind = %value.kind(), "eval finished");
                value
            }
            Err(_) => EvalVar::Error,
        }
    }

    /// Evaluate `node`, keeping the structured error.
    pub fn try_run(&self, node: Option<&EvalPrototype>, ctx: &mut EvalContextData<'_>) -> EvalResult {
        let Some(node) = node else {
            tracing::warn!("eval called with a null expression");
            return Err(missing_field("Eval"));
        };
        self.eval(node, ctx)
    }

    // Typed entry points

    pub fn run_int(&self, node: Option<&EvalPrototype>, ctx: &mut EvalContextData<'_>) -> i32 {
        self.try_run_int(node, ctx).unwrap_or_default()
    }

    pub fn try_run_int(&self, node: Option<&EvalPrototype>, ctx: &mut EvalContextData<'_>) -> Option<i32> {
        self.run_typed(node, ctx, EvalVar::try_get_i32)
    }

    pub fn run_long(&self, node: Option<&EvalPrototype>, ctx: &mut EvalContextData<'_>) -> i64 {
        self.try_run_long(node, ctx).unwrap_or_default()
    }

    pub fn try_run_long(&self, node: Option<&EvalPrototype>, ctx: &mut EvalContextData<'_>) -> Option<i64> {
        self.run_typed(node, ctx, EvalVar::try_get_i64)
    }

    pub fn run_float(&self, node: Option<&EvalPrototype>, ctx: &mut EvalContextData<'_>) -> f32 {
        self.try_run_float(node, ctx).unwrap_or_default()
    }

    pub fn try_run_float(&self, node: Option<&EvalPrototype>, ctx: &mut EvalContextData<'_>) -> Option<f32> {
        self.run_typed(node, ctx, EvalVar::try_get_f32)
    }

    pub fn run_bool(&self, node: Option<&EvalPrototype>, ctx: &mut EvalContextData<'_>) -> bool {
        self.try_run_bool(node, ctx).unwrap_or_default()
    }

    pub fn try_run_bool(&self, node: Option<&EvalPrototype>, ctx: &mut EvalContextData<'_>) -> Option<bool> {
        self.run_typed(node, ctx, EvalVar::try_get_bool)
    }

    pub fn run_prototype_id(
        &self,
        node: Option<&EvalPrototype>,
        ctx: &mut EvalContextData<'_>,
    ) -> PrototypeId {
        self.try_run_prototype_id(node, ctx).unwrap_or_default()
    }

    pub fn try_run_prototype_id(
        &self,
        node: Option<&EvalPrototype>,
        ctx: &mut EvalContextData<'_>,
    ) -> Option<PrototypeId> {
        self.run_typed(node, ctx, EvalVar::try_get_proto_ref)
    }

    fn run_typed<T>(
        &self,
        node: Option<&EvalPrototype>,
        ctx: &mut EvalContextData<'_>,
        extract: impl FnOnce(&EvalVar) -> Option<T>,
    ) -> Option<T> {
        let value = self.run(node, ctx);
        let typed = extract(&value);
        if typed.is_none() {
            tracing::warn!(
                kind = %value.kind(),
                op = ?node.map(EvalPrototype::op),
                node = ?node.map(ToString::to_string),
                "Invalid return type"
            );
        }
        typed
    }

    // Recursion

    /// Evaluate one node, tagging a fresh failure with this node.
    pub(crate) fn eval(&self, node: &EvalPrototype, ctx: &mut EvalContextData<'_>) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_node(node, ctx)).map_err(|err| annotate(err, node))
    }

    /// Evaluate a required child, failing with `MissingField` when absent.
    pub(crate) fn eval_required(
        &self,
        node: &EvalNode,
        field: &'static str,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        let node = node.as_deref().ok_or_else(|| missing_field(field))?;
        self.eval(node, ctx)
    }

    fn eval_node(&self, node: &EvalPrototype, ctx: &mut EvalContextData<'_>) -> EvalResult {
        use EvalPrototype as P;

        match node {
            // Literals and context loads
            P::LoadInt(v) => Ok(EvalVar::Int(*v)),
            P::LoadFloat(v) => Ok(EvalVar::Float(*v)),
            P::LoadBool(v) => Ok(EvalVar::Bool(*v)),
            P::LoadAssetRef(v) => Ok(EvalVar::AssetRef(*v)),
            P::LoadProtoRef(v) => Ok(EvalVar::ProtoRef(*v)),
            P::LoadContextInt { context } => load::context_int(ctx, *context),
            P::LoadContextProtoRef { context } => load::context_proto_ref(ctx, *context),
            P::LoadCurve { curve, index } => self.eval_load_curve(*curve, index, ctx),
            P::IsContextDataNull { context } => load::is_context_data_null(ctx, *context, self.data),

            // Arithmetic
            P::Add(args) => self.eval_arithmetic(arithmetic::ArithOp::Add, args, ctx),
            P::Sub(args) => self.eval_arithmetic(arithmetic::ArithOp::Sub, args, ctx),
            P::Mult(args) => self.eval_arithmetic(arithmetic::ArithOp::Mult, args, ctx),
            P::Div(args) => self.eval_arithmetic(arithmetic::ArithOp::Div, args, ctx),
            P::Modulus(args) => self.eval_arithmetic(arithmetic::ArithOp::Modulus, args, ctx),
            P::Max(args) => self.eval_arithmetic(arithmetic::ArithOp::Max, args, ctx),
            P::Min(args) => self.eval_arithmetic(arithmetic::ArithOp::Min, args, ctx),
            P::Exponent { base, exponent } => self.eval_exponent(base, exponent, ctx),

            // Comparison and logic
            P::Equals { args, epsilon } => self.eval_equals(args, *epsilon, ctx),
            P::GreaterThan(args) => self.eval_compare(logic::CompareOp::GreaterThan, args, ctx),
            P::LessThan(args) => self.eval_compare(logic::CompareOp::LessThan, args, ctx),
            P::And(args) => self.eval_and(args, ctx),
            P::Or(args) => self.eval_or(args, ctx),
            P::Not(arg) => self.eval_not(arg, ctx),

            // Control flow
            P::IfElse {
                conditional,
                eval_if,
                eval_else,
            } => self.eval_if_else(conditional, eval_if, eval_else, ctx),
            P::Scope(body) => self.eval_scope(body, ctx),
            P::For(def) => self.eval_for(def, ctx),
            P::ForEachConditionInContext(def) => self.eval_for_each_condition(def, ctx),
            P::ForEachProtoRefInContextRefList(def) => self.eval_for_each_proto_ref(def, ctx),

            // Properties
            P::AssignProp {
                context,
                prop,
                eval,
            } => self.eval_assign_prop(*context, *prop, eval, ctx),
            P::AssignPropEvalParams {
                context,
                prop,
                params,
                eval,
            } => self.eval_assign_prop_eval_params(*context, *prop, params, eval, ctx),
            P::HasProp { context, prop } => self.eval_has_prop(*context, *prop, ctx),
            P::LoadProp { context, prop } => self.eval_load_prop(*context, *prop, ctx),
            P::LoadPropContextParams {
                context,
                prop,
                prop_context_params,
            } => self.eval_load_prop_context_params(*context, *prop, *prop_context_params, ctx),
            P::LoadPropEvalParams {
                context,
                prop,
                params,
            } => self.eval_load_prop_eval_params(*context, *prop, params, ctx),

            // Game predicates
            P::DifficultyTierRange { context, min, max } => {
                self.eval_difficulty_tier_range(*context, *min, *max, ctx)
            }
            P::MissionIsActive { context, mission } => {
                self.eval_mission_is_active(*context, *mission, ctx)
            }
            P::MissionIsComplete { context, mission } => {
                self.eval_mission_is_complete(*context, *mission, ctx)
            }
            P::HasEntityInInventory {
                context,
                entity,
                inventory,
            } => self.eval_has_entity_in_inventory(*context, *entity, *inventory, ctx),
            P::IsDynamicCombatLevelEnabled => Ok(EvalVar::Bool(true)),
            P::ExportError => domain::export_error(),

            // Reserved
            P::SwapProp { .. }
            | P::RandomFloat { .. }
            | P::RandomInt { .. }
            | P::LoadEntityToContextVar { .. }
            | P::LoadConditionCollectionToContext { .. }
            | P::EntityHasKeyword { .. }
            | P::EntityHasTalent { .. }
            | P::GetCombatLevel { .. }
            | P::GetPowerRank { .. }
            | P::CalcPowerRank { .. }
            | P::IsInParty { .. }
            | P::GetDamageReductionPct { .. }
            | P::GetDistanceToEntity { .. } => self.not_yet_supported(node),
        }
    }
}

/// Log a failure at the node that raised it and tag it with that node.
/// Errors already tagged by a deeper node pass through unchanged.
fn annotate(err: EvalError, node: &EvalPrototype) -> EvalError {
    if err.op.is_some() {
        return err;
    }
    let op = node.op();
    let expr = node.to_string();
    tracing::warn!(%op, node = %expr, "{}", err.message);
    err.with_op(op).with_node(expr)
}

#[cfg(test)]
mod tests;
