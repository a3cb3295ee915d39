//! Numeric operators.
//!
//! Both operands must be `Int` or `Float`. Two ints stay integral (with
//! wrapping at 64 bits) except for `Div`, which always produces a float.
//! Any float operand makes the whole operation float. Division and modulus
//! by zero fail rather than producing infinities.

use super::Interpreter;
use crate::errors::{division_by_zero, modulo_by_zero, type_mismatch};
use crate::{BinaryArgs, EvalContextData, EvalError, EvalNode, EvalResult, EvalVar};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(super) enum ArithOp {
    Add,
    Sub,
    Mult,
    Div,
    Modulus,
    Max,
    Min,
}

/// Numeric operand.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(super) enum Num {
    Int(i64),
    Float(f32),
}

impl Num {
    pub(super) fn from_var(var: &EvalVar, operand: &'static str) -> Result<Num, EvalError> {
        match *var {
            EvalVar::Int(v) => Ok(Num::Int(v)),
            EvalVar::Float(v) => Ok(Num::Float(v)),
            ref other => Err(type_mismatch(operand, "Int or Float", other.kind())),
        }
    }

    #[inline]
    pub(super) fn as_f32(self) -> f32 {
        match self {
            Num::Int(v) => v as f32,
            Num::Float(v) => v,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Num::Int(v) => v == 0,
            Num::Float(v) => v == 0.0,
        }
    }
}

/// Euclidean modulus: the result is never negative, whatever the signs of
/// the operands.
pub(super) fn int_modulus(a: i64, b: i64) -> i64 {
    a.wrapping_rem_euclid(b)
}

pub(super) fn float_modulus(a: f32, b: f32) -> f32 {
    a.rem_euclid(b)
}

pub(super) fn apply(op: ArithOp, a: Num, b: Num) -> EvalResult {
    match op {
        ArithOp::Div if b.is_zero() => return Err(division_by_zero()),
        ArithOp::Modulus if b.is_zero() => return Err(modulo_by_zero()),
        _ => {}
    }

    let value = match (op, a, b) {
        (ArithOp::Add, Num::Int(x), Num::Int(y)) => EvalVar::Int(x.wrapping_add(y)),
        (ArithOp::Sub, Num::Int(x), Num::Int(y)) => EvalVar::Int(x.wrapping_sub(y)),
        (ArithOp::Mult, Num::Int(x), Num::Int(y)) => EvalVar::Int(x.wrapping_mul(y)),
        (ArithOp::Modulus, Num::Int(x), Num::Int(y)) => EvalVar::Int(int_modulus(x, y)),
        (ArithOp::Max, Num::Int(x), Num::Int(y)) => EvalVar::Int(x.max(y)),
        (ArithOp::Min, Num::Int(x), Num::Int(y)) => EvalVar::Int(x.min(y)),
        (op, a, b) => {
            let (x, y) = (a.as_f32(), b.as_f32());
            EvalVar::Float(match op {
                ArithOp::Add => x + y,
                ArithOp::Sub => x - y,
                ArithOp::Mult => x * y,
                ArithOp::Div => x / y,
                ArithOp::Modulus => float_modulus(x, y),
                ArithOp::Max => x.max(y),
                ArithOp::Min => x.min(y),
            })
        }
    };
    Ok(value)
}

impl Interpreter<'_> {
    pub(super) fn eval_arithmetic(
        &self,
        op: ArithOp,
        args: &BinaryArgs,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        let a = self.eval_required(&args.arg1, "Arg1", ctx)?;
        let a = Num::from_var(&a, "Arg1")?;
        let b = self.eval_required(&args.arg2, "Arg2", ctx)?;
        let b = Num::from_var(&b, "Arg2")?;
        apply(op, a, b)
    }

    /// `base` raised to `exponent`, always in floating point.
    pub(super) fn eval_exponent(
        &self,
        base: &EvalNode,
        exponent: &EvalNode,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        let b = self.eval_required(base, "BaseArg", ctx)?;
        let b = Num::from_var(&b, "BaseArg")?;
        let e = self.eval_required(exponent, "ExpArg", ctx)?;
        let e = Num::from_var(&e, "ExpArg")?;
        Ok(EvalVar::Float(b.as_f32().powf(e.as_f32())))
    }
}
