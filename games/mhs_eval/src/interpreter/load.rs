//! Context slot loads, curve lookups and the null test.

use mhs_gamedata::{CurveId, PrototypeId};

use super::Interpreter;
use crate::errors::{invalid_context, missing_field, type_mismatch, unknown_curve};
use crate::{Access, EvalContext, EvalContextData, EvalError, EvalNode, EvalResult, EvalVar, GameData};

/// Stored slot for `context`. The stacks and `Globals` are not slots.
fn slot<'c>(ctx: &'c EvalContextData<'_>, context: EvalContext) -> Result<&'c EvalVar, EvalError> {
    ctx.var(context)
        .map(|stored| &stored.var)
        .ok_or_else(|| invalid_context(context))
}

/// Numeric slot value truncated to `Int`.
pub(super) fn context_int(ctx: &EvalContextData<'_>, context: EvalContext) -> EvalResult {
    let var = slot(ctx, context)?;
    var.try_get_i64()
        .map(EvalVar::Int)
        .ok_or_else(|| type_mismatch("Context", "Int or Float", var.kind()))
}

/// Slot value as `ProtoRef`; any other kind reads as the invalid prototype.
pub(super) fn context_proto_ref(ctx: &EvalContextData<'_>, context: EvalContext) -> EvalResult {
    let var = slot(ctx, context)?;
    Ok(EvalVar::ProtoRef(
        var.try_get_proto_ref().unwrap_or(PrototypeId::INVALID),
    ))
}

/// `true` when `context` holds a null reference, or is an unset `VarN` slot.
pub(super) fn is_context_data_null(
    ctx: &EvalContextData<'_>,
    context: EvalContext,
    data: &GameData,
) -> EvalResult {
    let var = ctx.get_var(context, data.globals.as_ref(), Access::Inspect)?;
    match var {
        EvalVar::PropertyCollectionPtr(_)
        | EvalVar::ConditionCollectionPtr(_)
        | EvalVar::ProtoRefListPtr(_)
        | EvalVar::ProtoRefVectorPtr(_)
        | EvalVar::EntityPtr(_) => Ok(EvalVar::Bool(var.is_null_ref())),
        EvalVar::Error if context.is_var_slot() => Ok(EvalVar::Bool(true)),
        other => Err(type_mismatch("Context", "a reference", other.kind())),
    }
}

impl Interpreter<'_> {
    /// Curve value at an evaluated index. Out-of-range indices are clamped.
    pub(super) fn eval_load_curve(
        &self,
        curve_id: CurveId,
        index: &EvalNode,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        if !curve_id.is_valid() {
            return Err(unknown_curve(curve_id));
        }
        let index_node = index.as_deref().ok_or_else(|| missing_field("Index"))?;
        let curve = self
            .data
            .curves
            .get(curve_id)
            .ok_or_else(|| unknown_curve(curve_id))?;

        let index = match self.eval(index_node, ctx)? {
            EvalVar::Int(v) => v as i32,
            EvalVar::Float(v) => v as i32,
            other => return Err(type_mismatch("Index", "Int or Float", other.kind())),
        };

        let index = if curve.index_in_range(index) {
            index
        } else {
            tracing::warn!(
                index,
                curve = self.data.curves.name(curve_id),
                "curve index out of range, clamping to bounds and still running"
            );
            index.clamp(curve.min_position(), curve.max_position())
        };

        curve
            .get_at(index)
            .map(EvalVar::Float)
            .ok_or_else(|| unknown_curve(curve_id))
    }
}
