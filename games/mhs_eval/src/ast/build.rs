//! Terse constructors for rule trees.
//!
//! Game data arrives already built; these helpers are for tests, tools and
//! hosts that assemble small rules in code.
//!
//! ```
//! use mhs_eval::ast::build::{add, int, float};
//!
//! let rule = add(int(2), float(0.5));
//! assert_eq!(rule.to_string(), "Add(2, 0.5f)");
//! ```

use mhs_gamedata::{AssetId, CurveId, InventoryConvenienceLabel, PrototypeId};
use mhs_properties::PropertyId;

use super::{
    BinaryArgs, EvalNode, EvalParams, EvalPrototype, ForEachConditionLoop, ForEachProtoRefLoop,
    ForLoop,
};
use crate::EvalContext;

/// Wrap a node as a present child.
#[inline]
pub fn node(expr: EvalPrototype) -> EvalNode {
    Some(Box::new(expr))
}

fn args(a: EvalPrototype, b: EvalPrototype) -> BinaryArgs {
    BinaryArgs {
        arg1: node(a),
        arg2: node(b),
    }
}

// Literals and context loads

pub fn int(v: i64) -> EvalPrototype {
    EvalPrototype::LoadInt(v)
}

pub fn float(v: f32) -> EvalPrototype {
    EvalPrototype::LoadFloat(v)
}

pub fn boolean(v: bool) -> EvalPrototype {
    EvalPrototype::LoadBool(v)
}

pub fn proto(id: PrototypeId) -> EvalPrototype {
    EvalPrototype::LoadProtoRef(id)
}

pub fn asset(id: AssetId) -> EvalPrototype {
    EvalPrototype::LoadAssetRef(id)
}

pub fn context_int(context: EvalContext) -> EvalPrototype {
    EvalPrototype::LoadContextInt { context }
}

pub fn context_proto(context: EvalContext) -> EvalPrototype {
    EvalPrototype::LoadContextProtoRef { context }
}

pub fn curve(curve: CurveId, index: EvalPrototype) -> EvalPrototype {
    EvalPrototype::LoadCurve {
        curve,
        index: node(index),
    }
}

pub fn is_null(context: EvalContext) -> EvalPrototype {
    EvalPrototype::IsContextDataNull { context }
}

// Arithmetic

pub fn add(a: EvalPrototype, b: EvalPrototype) -> EvalPrototype {
    EvalPrototype::Add(args(a, b))
}

pub fn sub(a: EvalPrototype, b: EvalPrototype) -> EvalPrototype {
    EvalPrototype::Sub(args(a, b))
}

pub fn mult(a: EvalPrototype, b: EvalPrototype) -> EvalPrototype {
    EvalPrototype::Mult(args(a, b))
}

pub fn div(a: EvalPrototype, b: EvalPrototype) -> EvalPrototype {
    EvalPrototype::Div(args(a, b))
}

pub fn modulus(a: EvalPrototype, b: EvalPrototype) -> EvalPrototype {
    EvalPrototype::Modulus(args(a, b))
}

pub fn max(a: EvalPrototype, b: EvalPrototype) -> EvalPrototype {
    EvalPrototype::Max(args(a, b))
}

pub fn min(a: EvalPrototype, b: EvalPrototype) -> EvalPrototype {
    EvalPrototype::Min(args(a, b))
}

pub fn exponent(base: EvalPrototype, exp: EvalPrototype) -> EvalPrototype {
    EvalPrototype::Exponent {
        base: node(base),
        exponent: node(exp),
    }
}

// Comparison and logic

pub fn equals(a: EvalPrototype, b: EvalPrototype, epsilon: f32) -> EvalPrototype {
    EvalPrototype::Equals {
        args: args(a, b),
        epsilon,
    }
}

pub fn greater_than(a: EvalPrototype, b: EvalPrototype) -> EvalPrototype {
    EvalPrototype::GreaterThan(args(a, b))
}

pub fn less_than(a: EvalPrototype, b: EvalPrototype) -> EvalPrototype {
    EvalPrototype::LessThan(args(a, b))
}

pub fn and(a: EvalPrototype, b: EvalPrototype) -> EvalPrototype {
    EvalPrototype::And(args(a, b))
}

pub fn or(a: EvalPrototype, b: EvalPrototype) -> EvalPrototype {
    EvalPrototype::Or(args(a, b))
}

pub fn not(a: EvalPrototype) -> EvalPrototype {
    EvalPrototype::Not(node(a))
}

// Control flow

pub fn if_else(
    conditional: EvalPrototype,
    eval_if: EvalPrototype,
    eval_else: Option<EvalPrototype>,
) -> EvalPrototype {
    EvalPrototype::IfElse {
        conditional: node(conditional),
        eval_if: node(eval_if),
        eval_else: eval_else.and_then(node),
    }
}

pub fn scope(body: Vec<EvalPrototype>) -> EvalPrototype {
    EvalPrototype::Scope(body)
}

pub fn for_loop(def: ForLoop) -> EvalPrototype {
    EvalPrototype::For(Box::new(def))
}

pub fn for_each_condition(def: ForEachConditionLoop) -> EvalPrototype {
    EvalPrototype::ForEachConditionInContext(Box::new(def))
}

pub fn for_each_proto_ref(def: ForEachProtoRefLoop) -> EvalPrototype {
    EvalPrototype::ForEachProtoRefInContextRefList(Box::new(def))
}

// Properties

pub fn assign_prop(context: EvalContext, prop: PropertyId, value: EvalPrototype) -> EvalPrototype {
    EvalPrototype::AssignProp {
        context,
        prop,
        eval: node(value),
    }
}

pub fn assign_prop_params(
    context: EvalContext,
    prop: PrototypeId,
    params: EvalParams,
    value: EvalPrototype,
) -> EvalPrototype {
    EvalPrototype::AssignPropEvalParams {
        context,
        prop,
        params,
        eval: node(value),
    }
}

pub fn has_prop(context: EvalContext, prop: PropertyId) -> EvalPrototype {
    EvalPrototype::HasProp { context, prop }
}

pub fn load_prop(context: EvalContext, prop: PropertyId) -> EvalPrototype {
    EvalPrototype::LoadProp { context, prop }
}

pub fn load_prop_params(context: EvalContext, prop: PrototypeId, params: EvalParams) -> EvalPrototype {
    EvalPrototype::LoadPropEvalParams {
        context,
        prop,
        params,
    }
}

/// Param list from up to four expressions, in order.
pub fn params(exprs: impl IntoIterator<Item = EvalPrototype>) -> EvalParams {
    let mut out: EvalParams = Default::default();
    for (slot, expr) in out.iter_mut().zip(exprs) {
        *slot = node(expr);
    }
    out
}

// Game predicates

pub fn difficulty_tier_range(context: EvalContext, min: PrototypeId, max: PrototypeId) -> EvalPrototype {
    EvalPrototype::DifficultyTierRange { context, min, max }
}

pub fn mission_is_active(context: EvalContext, mission: PrototypeId) -> EvalPrototype {
    EvalPrototype::MissionIsActive { context, mission }
}

pub fn mission_is_complete(context: EvalContext, mission: PrototypeId) -> EvalPrototype {
    EvalPrototype::MissionIsComplete { context, mission }
}

pub fn has_entity_in_inventory(
    context: EvalContext,
    entity: PrototypeId,
    inventory: InventoryConvenienceLabel,
) -> EvalPrototype {
    EvalPrototype::HasEntityInInventory {
        context,
        entity,
        inventory,
    }
}
