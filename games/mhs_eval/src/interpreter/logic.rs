//! Boolean and comparison operators.

use super::arithmetic::Num;
use super::Interpreter;
use crate::errors::{missing_field, type_mismatch};
use crate::{BinaryArgs, EvalContextData, EvalNode, EvalResult, EvalVar};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(super) enum CompareOp {
    GreaterThan,
    LessThan,
}

/// `|a - b| <= epsilon`.
#[inline]
fn epsilon_test(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() <= epsilon
}

fn expect_bool(var: &EvalVar, operand: &'static str) -> Result<bool, crate::EvalError> {
    match *var {
        EvalVar::Bool(b) => Ok(b),
        ref other => Err(type_mismatch(operand, "Bool", other.kind())),
    }
}

impl Interpreter<'_> {
    /// Short-circuit `And`. Both operands must be `Bool`; numbers do not coerce.
    pub(super) fn eval_and(&self, args: &BinaryArgs, ctx: &mut EvalContextData<'_>) -> EvalResult {
        let arg2 = args.arg2.as_deref().ok_or_else(|| missing_field("Arg2"))?;
        let a = self.eval_required(&args.arg1, "Arg1", ctx)?;
        if !expect_bool(&a, "Arg1")? {
            return Ok(EvalVar::Bool(false));
        }
        let b = self.eval(arg2, ctx)?;
        Ok(EvalVar::Bool(expect_bool(&b, "Arg2")?))
    }

    /// Short-circuit `Or`.
    pub(super) fn eval_or(&self, args: &BinaryArgs, ctx: &mut EvalContextData<'_>) -> EvalResult {
        let arg2 = args.arg2.as_deref().ok_or_else(|| missing_field("Arg2"))?;
        let a = self.eval_required(&args.arg1, "Arg1", ctx)?;
        if expect_bool(&a, "Arg1")? {
            return Ok(EvalVar::Bool(true));
        }
        let b = self.eval(arg2, ctx)?;
        Ok(EvalVar::Bool(expect_bool(&b, "Arg2")?))
    }

    pub(super) fn eval_not(&self, arg: &EvalNode, ctx: &mut EvalContextData<'_>) -> EvalResult {
        let a = self.eval_required(arg, "Arg", ctx)?;
        Ok(EvalVar::Bool(!expect_bool(&a, "Arg")?))
    }

    /// Equality with an epsilon for any float comparison. Int/Int compares
    /// exactly; `ProtoRef`, `AssetRef` and `Bool` compare exactly against
    /// their own kind.
    pub(super) fn eval_equals(
        &self,
        args: &BinaryArgs,
        epsilon: f32,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        let a = self.eval_required(&args.arg1, "Arg1", ctx)?;
        let b = self.eval_required(&args.arg2, "Arg2", ctx)?;
        let equal = match (&a, &b) {
            (EvalVar::Int(x), EvalVar::Int(y)) => x == y,
            (EvalVar::Int(_) | EvalVar::Float(_), EvalVar::Int(_) | EvalVar::Float(_)) => {
                let (x, y) = (Num::from_var(&a, "Arg1")?, Num::from_var(&b, "Arg2")?);
                epsilon_test(x.as_f32(), y.as_f32(), epsilon)
            }
            (EvalVar::ProtoRef(x), EvalVar::ProtoRef(y)) => x == y,
            (EvalVar::AssetRef(x), EvalVar::AssetRef(y)) => x == y,
            (EvalVar::Bool(x), EvalVar::Bool(y)) => x == y,
            _ => return Err(type_mismatch("Arg2", kind_name(&a), b.kind())),
        };
        Ok(EvalVar::Bool(equal))
    }

    /// `GreaterThan` and `LessThan`. Mixed operands widen to float; no epsilon.
    pub(super) fn eval_compare(
        &self,
        op: CompareOp,
        args: &BinaryArgs,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        let a = self.eval_required(&args.arg1, "Arg1", ctx)?;
        let a = Num::from_var(&a, "Arg1")?;
        let b = self.eval_required(&args.arg2, "Arg2", ctx)?;
        let b = Num::from_var(&b, "Arg2")?;
        let result = match (a, b) {
            (Num::Int(x), Num::Int(y)) => match op {
                CompareOp::GreaterThan => x > y,
                CompareOp::LessThan => x < y,
            },
            (a, b) => match op {
                CompareOp::GreaterThan => a.as_f32() > b.as_f32(),
                CompareOp::LessThan => a.as_f32() < b.as_f32(),
            },
        };
        Ok(EvalVar::Bool(result))
    }
}

/// Kind that would have matched `Arg1` in `Equals`.
fn kind_name(var: &EvalVar) -> &'static str {
    match var {
        EvalVar::Int(_) | EvalVar::Float(_) => "Int or Float",
        EvalVar::ProtoRef(_) => "ProtoRef",
        EvalVar::AssetRef(_) => "AssetRef",
        EvalVar::Bool(_) => "Bool",
        _ => "a comparable kind",
    }
}
