#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use std::rc::Rc;

use super::*;
use crate::ast::build::*;
use crate::errors::EvalErrorKind;
use crate::{
    BinaryArgs, Condition, ConditionCollection, EvalContext, EvalOp, EvalVarKind, ForEachConditionLoop,
    ForEachProtoRefLoop, ForLoop, ReferenceGame, UnsupportedOpPolicy,
};
use mhs_gamedata::{
    BlueprintId, Curve, CurveId, DbGuid, InventoryConvenienceLabel, MissionPrototype, MissionState,
    RegionId,
};
use mhs_properties::{
    PropertyCollectionRef, PropertyDataType, PropertyEnum, PropertyId, PropertyInfo, PropertyParam,
    PropertyParamInfo, PropertyValue, TimeSpan,
};
use pretty_assertions::assert_eq;

const A: PrototypeId = PrototypeId::new(1001);
const B: PrototypeId = PrototypeId::new(1002);
const C: PrototypeId = PrototypeId::new(1003);

const TEST_INT: PropertyEnum = PropertyEnum::new(10);
const TEST_REAL: PropertyEnum = PropertyEnum::new(11);
const TEST_TIME: PropertyEnum = PropertyEnum::new(12);
const TEST_DEFAULTED: PropertyEnum = PropertyEnum::new(13);
const KEYED_INT: PropertyEnum = PropertyEnum::new(14);
const LEVEL_INT: PropertyEnum = PropertyEnum::new(15);
const KEYED_INT_PROTO: PrototypeId = PrototypeId::new(5014);
const LEVEL_INT_PROTO: PrototypeId = PrototypeId::new(5015);

fn id(property: PropertyEnum) -> PropertyId {
    PropertyId::new(property)
}

fn test_data() -> GameData {
    let mut data = GameData::new();
    let infos = [
        PropertyInfo::new(TEST_INT, "TestInt", PropertyDataType::Integer),
        PropertyInfo::new(TEST_REAL, "TestReal", PropertyDataType::Real),
        PropertyInfo::new(TEST_TIME, "TestTime", PropertyDataType::Time),
        PropertyInfo::new(TEST_DEFAULTED, "TestDefaulted", PropertyDataType::Integer).with_default(42_i64),
        PropertyInfo::new(KEYED_INT, "KeyedInt", PropertyDataType::Integer)
            .with_param(PropertyParamInfo::prototype([A, B]))
            .with_prototype(KEYED_INT_PROTO),
        PropertyInfo::new(LEVEL_INT, "LevelInt", PropertyDataType::Integer)
            .with_param(PropertyParamInfo::integer())
            .with_prototype(LEVEL_INT_PROTO),
    ];
    for info in infos {
        data.property_info.register(info).unwrap();
    }
    data
}

fn eval_with(data: &GameData, ctx: &mut EvalContextData<'_>, expr: &EvalPrototype) -> EvalResult {
    Interpreter::new(data).try_run(Some(expr), ctx)
}

fn run_expr(expr: &EvalPrototype) -> EvalResult {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    eval_with(&data, &mut ctx, expr)
}

fn error_kind(result: EvalResult) -> EvalErrorKind {
    result.unwrap_err().kind
}

fn bind_collection(ctx: &mut EvalContextData<'_>, context: EvalContext) -> PropertyCollectionRef {
    let collection = PropertyCollectionRef::new();
    ctx.set_property_collection(context, Some(collection.clone())).unwrap();
    collection
}

/// `CallerStack[TestInt] += 1`
fn bump_caller_counter() -> EvalPrototype {
    assign_prop(
        EvalContext::CallerStack,
        id(TEST_INT),
        add(load_prop(EvalContext::CallerStack, id(TEST_INT)), int(1)),
    )
}

// Arithmetic

#[test]
fn test_int_arithmetic_stays_integral() {
    assert_eq!(run_expr(&add(int(2), int(3))), Ok(EvalVar::Int(5)));
    assert_eq!(run_expr(&sub(int(2), int(3))), Ok(EvalVar::Int(-1)));
    assert_eq!(run_expr(&mult(int(4), int(3))), Ok(EvalVar::Int(12)));
    assert_eq!(run_expr(&max(int(4), int(9))), Ok(EvalVar::Int(9)));
    assert_eq!(run_expr(&min(int(3), int(-1))), Ok(EvalVar::Int(-1)));
}

#[test]
fn test_mixed_arithmetic_widens_to_float() {
    assert_eq!(run_expr(&add(int(2), float(0.5))), Ok(EvalVar::Float(2.5)));
    assert_eq!(run_expr(&max(int(3), float(4.5))), Ok(EvalVar::Float(4.5)));
    assert_eq!(run_expr(&mult(float(1.5), int(2))), Ok(EvalVar::Float(3.0)));
}

#[test]
fn test_int_division_produces_float() {
    assert_eq!(run_expr(&div(int(5), int(2))), Ok(EvalVar::Float(2.5)));
    assert_eq!(run_expr(&div(int(6), int(3))), Ok(EvalVar::Float(2.0)));
}

#[test]
fn test_division_by_zero_fails() {
    assert_eq!(error_kind(run_expr(&div(int(1), int(0)))), EvalErrorKind::DivisionByZero);
    assert_eq!(error_kind(run_expr(&div(float(1.0), float(0.0)))), EvalErrorKind::DivisionByZero);
}

#[test]
fn test_modulus_is_never_negative() {
    assert_eq!(run_expr(&modulus(int(7), int(3))), Ok(EvalVar::Int(1)));
    assert_eq!(run_expr(&modulus(int(-7), int(3))), Ok(EvalVar::Int(2)));
    assert_eq!(run_expr(&modulus(int(7), int(-3))), Ok(EvalVar::Int(1)));
    assert_eq!(run_expr(&modulus(int(-7), int(-3))), Ok(EvalVar::Int(2)));
    assert_eq!(run_expr(&modulus(int(i64::MIN), int(-1))), Ok(EvalVar::Int(0)));
    assert_eq!(run_expr(&modulus(float(-7.0), float(3.0))), Ok(EvalVar::Float(2.0)));
    assert_eq!(run_expr(&modulus(float(7.0), float(-3.0))), Ok(EvalVar::Float(1.0)));
    assert_eq!(run_expr(&modulus(int(-7), float(-3.0))), Ok(EvalVar::Float(2.0)));
    assert_eq!(error_kind(run_expr(&modulus(int(7), int(0)))), EvalErrorKind::ModuloByZero);
}

#[test]
fn test_int_overflow_wraps() {
    assert_eq!(run_expr(&mult(int(i64::MAX), int(2))), Ok(EvalVar::Int(-2)));
    assert_eq!(run_expr(&add(int(i64::MAX), int(1))), Ok(EvalVar::Int(i64::MIN)));
}

#[test]
fn test_exponent_is_float() {
    assert_eq!(run_expr(&exponent(int(2), int(10))), Ok(EvalVar::Float(1024.0)));
    assert_eq!(run_expr(&exponent(float(9.0), float(0.5))), Ok(EvalVar::Float(3.0)));
}

#[test]
fn test_arithmetic_rejects_non_numbers() {
    assert_eq!(
        error_kind(run_expr(&add(boolean(true), int(1)))),
        EvalErrorKind::TypeMismatch {
            operand: "Arg1",
            expected: "Int or Float",
            got: EvalVarKind::Bool,
        }
    );
    assert_eq!(
        error_kind(run_expr(&exponent(int(2), proto(A)))),
        EvalErrorKind::TypeMismatch {
            operand: "ExpArg",
            expected: "Int or Float",
            got: EvalVarKind::ProtoRef,
        }
    );
}

#[test]
fn test_missing_operand() {
    let expr = EvalPrototype::Add(BinaryArgs {
        arg1: node(int(1)),
        arg2: None,
    });
    assert_eq!(error_kind(run_expr(&expr)), EvalErrorKind::MissingField { field: "Arg2" });
}

// Comparison and logic

#[test]
fn test_equals_uses_epsilon_for_floats() {
    assert_eq!(run_expr(&equals(float(1.000_000_1), int(1), 0.001)), Ok(EvalVar::Bool(true)));
    assert_eq!(run_expr(&equals(float(1.5), int(1), 0.0)), Ok(EvalVar::Bool(false)));
    assert_eq!(run_expr(&equals(float(1.5), float(1.0), 0.5)), Ok(EvalVar::Bool(true)));
    assert_eq!(run_expr(&equals(int(3), int(3), 0.0)), Ok(EvalVar::Bool(true)));
}

#[test]
fn test_equals_on_references() {
    assert_eq!(run_expr(&equals(proto(A), proto(A), 0.0)), Ok(EvalVar::Bool(true)));
    assert_eq!(run_expr(&equals(proto(A), proto(B), 0.0)), Ok(EvalVar::Bool(false)));
    assert_eq!(run_expr(&equals(boolean(true), boolean(true), 0.0)), Ok(EvalVar::Bool(true)));
}

#[test]
fn test_equals_rejects_mismatched_kinds() {
    assert_eq!(
        error_kind(run_expr(&equals(proto(A), int(1), 0.0))),
        EvalErrorKind::TypeMismatch {
            operand: "Arg2",
            expected: "ProtoRef",
            got: EvalVarKind::Int,
        }
    );
}

#[test]
fn test_ordering_comparisons() {
    assert_eq!(run_expr(&greater_than(float(2.5), int(2))), Ok(EvalVar::Bool(true)));
    assert_eq!(run_expr(&greater_than(int(2), int(2))), Ok(EvalVar::Bool(false)));
    assert_eq!(run_expr(&less_than(int(1), int(2))), Ok(EvalVar::Bool(true)));
    assert_eq!(run_expr(&less_than(int(3), float(2.5))), Ok(EvalVar::Bool(false)));
}

#[test]
fn test_and_or_short_circuit() {
    let failing = div(int(1), int(0));
    assert_eq!(run_expr(&and(boolean(false), failing.clone())), Ok(EvalVar::Bool(false)));
    assert_eq!(run_expr(&or(boolean(true), failing.clone())), Ok(EvalVar::Bool(true)));
    assert_eq!(error_kind(run_expr(&and(boolean(true), failing))), EvalErrorKind::DivisionByZero);
    assert_eq!(run_expr(&or(boolean(false), boolean(true))), Ok(EvalVar::Bool(true)));
    assert_eq!(run_expr(&not(boolean(false))), Ok(EvalVar::Bool(true)));
}

#[test]
fn test_logic_requires_bool_operands() {
    assert_eq!(
        error_kind(run_expr(&and(int(1), boolean(true)))),
        EvalErrorKind::TypeMismatch {
            operand: "Arg1",
            expected: "Bool",
            got: EvalVarKind::Int,
        }
    );
    assert_eq!(
        error_kind(run_expr(&not(float(1.0)))),
        EvalErrorKind::TypeMismatch {
            operand: "Arg",
            expected: "Bool",
            got: EvalVarKind::Float,
        }
    );
}

#[test]
fn test_or_requires_second_operand_even_when_first_is_true() {
    let expr = EvalPrototype::Or(BinaryArgs {
        arg1: node(boolean(true)),
        arg2: None,
    });
    assert_eq!(error_kind(run_expr(&expr)), EvalErrorKind::MissingField { field: "Arg2" });
}

// IfElse

#[test]
fn test_if_else_branches() {
    assert_eq!(run_expr(&if_else(boolean(true), int(1), Some(int(2)))), Ok(EvalVar::Int(1)));
    assert_eq!(run_expr(&if_else(int(0), int(1), Some(int(2)))), Ok(EvalVar::Int(2)));
    assert_eq!(run_expr(&if_else(float(0.5), int(1), Some(int(2)))), Ok(EvalVar::Int(1)));
}

#[test]
fn test_if_without_else_is_undefined() {
    assert_eq!(run_expr(&if_else(boolean(false), int(1), None)), Ok(EvalVar::Undefined));
}

#[test]
fn test_if_else_rejects_reference_conditions() {
    assert_eq!(
        error_kind(run_expr(&if_else(proto(A), int(1), None))),
        EvalErrorKind::TypeMismatch {
            operand: "Conditional",
            expected: "Bool, Int or Float",
            got: EvalVarKind::ProtoRef,
        }
    );
}

// Scope

#[test]
fn test_scope_returns_last_child() {
    assert_eq!(run_expr(&scope(vec![int(1), int(2)])), Ok(EvalVar::Int(2)));
    assert_eq!(error_kind(run_expr(&scope(vec![]))), EvalErrorKind::MissingField { field: "Scope" });
}

#[test]
fn test_scope_locals_do_not_leak() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let outer = PropertyCollectionRef::new();
    ctx.set_local_stack(Some(outer.clone()));

    let expr = scope(vec![
        assign_prop(EvalContext::LocalStack, id(TEST_INT), int(5)),
        load_prop(EvalContext::LocalStack, id(TEST_INT)),
    ]);
    assert_eq!(eval_with(&data, &mut ctx, &expr), Ok(EvalVar::Int(5)));

    assert!(!outer.borrow().has_property(id(TEST_INT)));
    assert!(ctx.local_stack().unwrap().ptr_eq(&outer));
    assert!(ctx.caller_stack().is_none());
}

#[test]
fn test_scope_sees_enclosing_locals_as_caller_stack() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let outer = PropertyCollectionRef::new();
    outer.borrow_mut().set(id(TEST_INT), 7_i64);
    ctx.set_local_stack(Some(outer));

    let expr = scope(vec![load_prop(EvalContext::CallerStack, id(TEST_INT))]);
    assert_eq!(eval_with(&data, &mut ctx, &expr), Ok(EvalVar::Int(7)));

    let nested = scope(vec![
        assign_prop(EvalContext::LocalStack, id(TEST_INT), int(1)),
        scope(vec![load_prop(EvalContext::CallerStack, id(TEST_INT))]),
    ]);
    assert_eq!(eval_with(&data, &mut ctx, &nested), Ok(EvalVar::Int(1)));
}

#[test]
fn test_scope_failure_restores_stacks() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let outer = PropertyCollectionRef::new();
    ctx.set_local_stack(Some(outer.clone()));

    let expr = scope(vec![div(int(1), int(0)), modulus(int(1), int(0)), int(3)]);
    assert_eq!(error_kind(eval_with(&data, &mut ctx, &expr)), EvalErrorKind::DivisionByZero);
    assert!(ctx.local_stack().unwrap().ptr_eq(&outer));
    assert!(ctx.caller_stack().is_none());
}

#[test]
fn test_scope_runs_children_after_a_failure() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let outer = PropertyCollectionRef::new();
    ctx.set_local_stack(Some(outer.clone()));

    let expr = scope(vec![div(int(1), int(0)), bump_caller_counter()]);
    assert!(eval_with(&data, &mut ctx, &expr).is_err());
    assert_eq!(outer.borrow().get_integer(id(TEST_INT)), 1);
}

// For

fn counting_loop(limit: i64) -> ForLoop {
    let i = id(TEST_REAL);
    ForLoop {
        pre_loop: node(assign_prop(EvalContext::CallerStack, id(TEST_INT), int(0))),
        loop_var_init: node(assign_prop(EvalContext::LocalStack, i, int(0))),
        loop_condition: node(less_than(load_prop(EvalContext::LocalStack, i), int(limit))),
        loop_advance: node(assign_prop(
            EvalContext::LocalStack,
            i,
            add(load_prop(EvalContext::LocalStack, i), int(1)),
        )),
        scope_loop_body: vec![assign_prop(
            EvalContext::CallerStack,
            id(TEST_INT),
            add(
                load_prop(EvalContext::CallerStack, id(TEST_INT)),
                load_prop(EvalContext::LocalStack, i),
            ),
        )],
        post_loop: node(load_prop(EvalContext::LocalStack, i)),
    }
}

#[test]
fn test_for_loop_accumulates() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let outer = PropertyCollectionRef::new();
    ctx.set_local_stack(Some(outer.clone()));

    let expr = for_loop(counting_loop(4));
    assert_eq!(eval_with(&data, &mut ctx, &expr), Ok(EvalVar::Float(4.0)));
    // 0 + 1 + 2 + 3
    assert_eq!(outer.borrow().get_integer(id(TEST_INT)), 6);
    assert!(ctx.local_stack().unwrap().ptr_eq(&outer));
}

#[test]
fn test_for_loop_with_zero_iterations() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let outer = PropertyCollectionRef::new();
    ctx.set_local_stack(Some(outer.clone()));

    let expr = for_loop(counting_loop(0));
    assert_eq!(eval_with(&data, &mut ctx, &expr), Ok(EvalVar::Float(0.0)));
    assert_eq!(outer.borrow().get(id(TEST_INT)), Some(PropertyValue::Integer(0)));

    let mut no_post_loop = counting_loop(0);
    no_post_loop.post_loop = None;
    assert_eq!(eval_with(&data, &mut ctx, &for_loop(no_post_loop)), Ok(EvalVar::Bool(false)));
}

#[test]
fn test_for_loop_non_bool_condition_ends_loop() {
    let def = ForLoop {
        loop_var_init: node(int(0)),
        loop_condition: node(int(7)),
        loop_advance: node(int(0)),
        scope_loop_body: vec![int(0)],
        post_loop: node(div(int(1), int(0))),
        ..ForLoop::default()
    };
    assert_eq!(run_expr(&for_loop(def)), Ok(EvalVar::Int(7)));
}

#[test]
fn test_for_loop_requires_its_parts() {
    let def = ForLoop {
        loop_var_init: node(int(0)),
        loop_condition: node(boolean(false)),
        scope_loop_body: vec![int(0)],
        ..ForLoop::default()
    };
    assert_eq!(
        error_kind(run_expr(&for_loop(def))),
        EvalErrorKind::MissingField { field: "LoopAdvance" }
    );
}

#[test]
fn test_loop_iteration_cap() {
    let data = test_data();
    let interpreter = InterpreterBuilder::new(&data).max_loop_iterations(3).build();
    let mut ctx = EvalContextData::new();

    let endless = for_loop(ForLoop {
        loop_var_init: node(int(0)),
        loop_condition: node(boolean(true)),
        loop_advance: node(int(0)),
        scope_loop_body: vec![int(0)],
        ..ForLoop::default()
    });
    assert_eq!(
        error_kind(interpreter.try_run(Some(&endless), &mut ctx)),
        EvalErrorKind::LoopLimitExceeded { limit: 3 }
    );
    assert!(ctx.local_stack().is_none());
}

// ForEachProtoRefInContextRefList

fn proto_ref_loop(body: Vec<EvalPrototype>) -> ForEachProtoRefLoop {
    ForEachProtoRefLoop {
        proto_ref_list_context: EvalContext::Var1,
        scope_loop_body: body,
        ..ForEachProtoRefLoop::default()
    }
}

fn loop_var() -> PropertyId {
    PropertyId::new(PropertyEnum::EVAL_LOOP_VAR_PROTO_REF)
}

#[test]
fn test_for_each_proto_ref_exposes_loop_var() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let outer = PropertyCollectionRef::new();
    ctx.set_local_stack(Some(outer.clone()));
    ctx.set_read_only_proto_ref_list(EvalContext::Var1, Some(Rc::new(vec![A, B, C])))
        .unwrap();

    let expr = for_each_proto_ref(proto_ref_loop(vec![
        bump_caller_counter(),
        load_prop(EvalContext::LocalStack, loop_var()),
    ]));
    assert_eq!(eval_with(&data, &mut ctx, &expr), Ok(EvalVar::ProtoRef(C)));
    assert_eq!(outer.borrow().get_integer(id(TEST_INT)), 3);
}

#[test]
fn test_for_each_proto_ref_over_vector() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let vector: Rc<[PrototypeId]> = Rc::from(vec![A, B]);
    ctx.set_read_only_proto_ref_vector(EvalContext::Var1, Some(vector)).unwrap();

    let expr = for_each_proto_ref(proto_ref_loop(vec![load_prop(EvalContext::LocalStack, loop_var())]));
    assert_eq!(eval_with(&data, &mut ctx, &expr), Ok(EvalVar::ProtoRef(B)));
}

#[test]
fn test_nested_scope_reads_loop_var_from_caller_stack() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    ctx.set_read_only_proto_ref_list(EvalContext::Var1, Some(Rc::new(vec![A, B])))
        .unwrap();

    let expr = for_each_proto_ref(proto_ref_loop(vec![scope(vec![load_prop(
        EvalContext::CallerStack,
        loop_var(),
    )])]));
    assert_eq!(eval_with(&data, &mut ctx, &expr), Ok(EvalVar::ProtoRef(B)));
}

#[test]
fn test_for_each_proto_ref_over_empty_list() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    ctx.set_read_only_proto_ref_list(EvalContext::Var1, Some(Rc::new(Vec::new())))
        .unwrap();

    let bare = for_each_proto_ref(proto_ref_loop(vec![int(1)]));
    assert_eq!(eval_with(&data, &mut ctx, &bare), Ok(EvalVar::Undefined));

    let mut def = proto_ref_loop(vec![int(1)]);
    def.post_loop = node(int(5));
    assert_eq!(eval_with(&data, &mut ctx, &for_each_proto_ref(def)), Ok(EvalVar::Int(5)));
}

#[test]
fn test_for_each_proto_ref_gate_stops_loop() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let outer = PropertyCollectionRef::new();
    ctx.set_local_stack(Some(outer.clone()));
    ctx.set_read_only_proto_ref_list(EvalContext::Var1, Some(Rc::new(vec![A, B, C])))
        .unwrap();

    let mut def = proto_ref_loop(vec![bump_caller_counter()]);
    def.loop_condition = node(less_than(load_prop(EvalContext::CallerStack, id(TEST_INT)), int(2)));
    assert_eq!(eval_with(&data, &mut ctx, &for_each_proto_ref(def)), Ok(EvalVar::Bool(false)));
    assert_eq!(outer.borrow().get_integer(id(TEST_INT)), 2);
}

#[test]
fn test_for_each_proto_ref_rejects_other_kinds() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    ctx.set_var(EvalContext::Var1, EvalVar::Int(3)).unwrap();
    let expr = for_each_proto_ref(proto_ref_loop(vec![int(1)]));
    assert_eq!(
        error_kind(eval_with(&data, &mut ctx, &expr)),
        EvalErrorKind::TypeMismatch {
            operand: "ProtoRefListContext",
            expected: "ProtoRefListPtr or ProtoRefVectorPtr",
            got: EvalVarKind::Int,
        }
    );

    ctx.set_read_only_proto_ref_list(EvalContext::Var1, None).unwrap();
    assert_eq!(
        error_kind(eval_with(&data, &mut ctx, &expr)),
        EvalErrorKind::NullContext {
            context: EvalContext::Var1
        }
    );
}

// ForEachConditionInContext

fn conditions(values: &[i64]) -> Rc<ConditionCollection> {
    let collection = values
        .iter()
        .map(|&value| {
            let properties = PropertyCollectionRef::new();
            properties.borrow_mut().set(id(TEST_INT), value);
            Condition::new(properties, vec![A])
        })
        .collect();
    Rc::new(collection)
}

fn condition_loop(body: Vec<EvalPrototype>) -> ForEachConditionLoop {
    ForEachConditionLoop {
        condition_collection_context: EvalContext::Var1,
        scope_loop_body: body,
        ..ForEachConditionLoop::default()
    }
}

fn sum_condition_values() -> EvalPrototype {
    assign_prop(
        EvalContext::CallerStack,
        id(TEST_INT),
        add(
            load_prop(EvalContext::CallerStack, id(TEST_INT)),
            load_prop(EvalContext::Condition, id(TEST_INT)),
        ),
    )
}

#[test]
fn test_for_each_condition_binds_each_condition() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let outer = PropertyCollectionRef::new();
    ctx.set_local_stack(Some(outer.clone()));
    ctx.set_condition_collection(EvalContext::Var1, Some(conditions(&[1, 2, 3])))
        .unwrap();

    let expr = for_each_condition(condition_loop(vec![
        sum_condition_values(),
        is_null(EvalContext::ConditionKeywords),
    ]));
    assert_eq!(eval_with(&data, &mut ctx, &expr), Ok(EvalVar::Bool(false)));
    assert_eq!(outer.borrow().get_integer(id(TEST_INT)), 6);

    assert!(ctx.var(EvalContext::Condition).unwrap().var.is_null_ref());
    assert!(ctx.var(EvalContext::ConditionKeywords).unwrap().var.is_null_ref());
}

#[test]
fn test_for_each_condition_clears_slots_on_failure() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    ctx.set_condition_collection(EvalContext::Var1, Some(conditions(&[1])))
        .unwrap();

    let expr = for_each_condition(condition_loop(vec![div(int(1), int(0))]));
    assert_eq!(error_kind(eval_with(&data, &mut ctx, &expr)), EvalErrorKind::DivisionByZero);
    assert!(ctx.var(EvalContext::Condition).unwrap().var.is_null_ref());
}

#[test]
fn test_condition_keywords_are_read_only() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    ctx.set_condition_collection(EvalContext::Var1, Some(conditions(&[1])))
        .unwrap();

    let expr = for_each_condition(condition_loop(vec![assign_prop(
        EvalContext::ConditionKeywords,
        id(TEST_INT),
        int(1),
    )]));
    assert_eq!(
        error_kind(eval_with(&data, &mut ctx, &expr)),
        EvalErrorKind::ReadOnlyContext {
            context: EvalContext::ConditionKeywords
        }
    );
}

#[test]
fn test_for_each_condition_post_scope_gate() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let outer = PropertyCollectionRef::new();
    ctx.set_local_stack(Some(outer.clone()));
    ctx.set_condition_collection(EvalContext::Var1, Some(conditions(&[1, 2, 3])))
        .unwrap();

    let mut def = condition_loop(vec![sum_condition_values()]);
    def.loop_condition_post_scope = node(boolean(false));
    assert_eq!(eval_with(&data, &mut ctx, &for_each_condition(def)), Ok(EvalVar::Bool(false)));
    assert_eq!(outer.borrow().get_integer(id(TEST_INT)), 1);
}

#[test]
fn test_for_each_condition_rejects_other_kinds() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    bind_collection(&mut ctx, EvalContext::Var1);
    let expr = for_each_condition(condition_loop(vec![int(1)]));
    assert_eq!(
        error_kind(eval_with(&data, &mut ctx, &expr)),
        EvalErrorKind::TypeMismatch {
            operand: "ConditionCollectionContext",
            expected: "ConditionCollectionPtr",
            got: EvalVarKind::PropertyCollectionPtr,
        }
    );
}

// Properties

#[test]
fn test_assign_converts_to_declared_type() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let collection = bind_collection(&mut ctx, EvalContext::Var1);

    let expr = assign_prop(EvalContext::Var1, id(TEST_INT), float(3.9));
    assert_eq!(eval_with(&data, &mut ctx, &expr), Ok(EvalVar::Undefined));
    assert_eq!(collection.borrow().get(id(TEST_INT)), Some(PropertyValue::Integer(3)));

    let expr = assign_prop(EvalContext::Var1, id(TEST_REAL), int(2));
    eval_with(&data, &mut ctx, &expr).unwrap();
    assert_eq!(collection.borrow().get(id(TEST_REAL)), Some(PropertyValue::Real(2.0)));
}

#[test]
fn test_assign_time_in_milliseconds() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let collection = bind_collection(&mut ctx, EvalContext::Var1);

    eval_with(&data, &mut ctx, &assign_prop(EvalContext::Var1, id(TEST_TIME), int(1500))).unwrap();
    assert_eq!(
        collection.borrow().get(id(TEST_TIME)),
        Some(PropertyValue::Time(TimeSpan::from_millis(1500)))
    );
    assert_eq!(
        eval_with(&data, &mut ctx, &load_prop(EvalContext::Var1, id(TEST_TIME))),
        Ok(EvalVar::Int(1500))
    );
}

#[test]
fn test_assign_rejects_undefined_without_writing() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let collection = bind_collection(&mut ctx, EvalContext::Var1);

    let expr = assign_prop(EvalContext::Var1, id(TEST_INT), if_else(boolean(false), int(1), None));
    assert_eq!(
        error_kind(eval_with(&data, &mut ctx, &expr)),
        EvalErrorKind::TypeMismatch {
            operand: "Eval",
            expected: "a storable value",
            got: EvalVarKind::Undefined,
        }
    );
    assert!(!collection.borrow().has_property(id(TEST_INT)));
}

#[test]
fn test_failed_conversion_leaves_collection_unchanged() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let collection = bind_collection(&mut ctx, EvalContext::Var1);

    let expr = assign_prop(EvalContext::Var1, id(TEST_INT), proto(A));
    assert_eq!(
        error_kind(eval_with(&data, &mut ctx, &expr)),
        EvalErrorKind::PropertyConversion {
            property: "TestInt".to_string(),
            target: PropertyDataType::Integer,
            got: EvalVarKind::ProtoRef,
        }
    );
    assert!(collection.borrow().is_empty());
}

#[test]
fn test_assign_to_read_only_slot() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    ctx.set_read_only_property_collection(EvalContext::Var1, Some(PropertyCollectionRef::new()))
        .unwrap();

    let expr = assign_prop(EvalContext::Var1, id(TEST_INT), int(1));
    assert_eq!(
        error_kind(eval_with(&data, &mut ctx, &expr)),
        EvalErrorKind::ReadOnlyContext {
            context: EvalContext::Var1
        }
    );
    // Reads are still allowed.
    assert_eq!(
        eval_with(&data, &mut ctx, &load_prop(EvalContext::Var1, id(TEST_INT))),
        Ok(EvalVar::Int(0))
    );
}

#[test]
fn test_property_lookup_failures() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    bind_collection(&mut ctx, EvalContext::Var1);

    let unknown = load_prop(EvalContext::Var1, id(PropertyEnum::new(99)));
    assert!(matches!(
        error_kind(eval_with(&data, &mut ctx, &unknown)),
        EvalErrorKind::UnknownProperty { .. }
    ));

    let invalid = load_prop(EvalContext::Var1, PropertyId::INVALID);
    assert_eq!(
        error_kind(eval_with(&data, &mut ctx, &invalid)),
        EvalErrorKind::MissingField { field: "Prop" }
    );

    let unknown_proto = load_prop_params(EvalContext::Var1, PrototypeId::new(999), params([]));
    assert!(matches!(
        error_kind(eval_with(&data, &mut ctx, &unknown_proto)),
        EvalErrorKind::UnknownProperty { .. }
    ));
}

#[test]
fn test_has_prop_falls_through_to_parent() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let parent = PropertyCollectionRef::new();
    parent.borrow_mut().set(id(TEST_INT), 1_i64);
    let child = bind_collection(&mut ctx, EvalContext::Var1);
    child.attach_to_parent(&parent).unwrap();

    assert_eq!(
        eval_with(&data, &mut ctx, &has_prop(EvalContext::Var1, id(TEST_INT))),
        Ok(EvalVar::Bool(true))
    );
    assert_eq!(
        eval_with(&data, &mut ctx, &has_prop(EvalContext::Var1, id(TEST_REAL))),
        Ok(EvalVar::Bool(false))
    );
    assert_eq!(
        eval_with(&data, &mut ctx, &load_prop(EvalContext::Var1, id(TEST_INT))),
        Ok(EvalVar::Int(1))
    );
}

#[test]
fn test_load_absent_property_yields_default() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    bind_collection(&mut ctx, EvalContext::Var1);
    assert_eq!(
        eval_with(&data, &mut ctx, &load_prop(EvalContext::Var1, id(TEST_DEFAULTED))),
        Ok(EvalVar::Int(42))
    );
}

#[test]
fn test_globals_are_read_only() {
    let mut data = test_data();
    let mut ctx = EvalContextData::new();
    let load = load_prop(EvalContext::Globals, id(TEST_INT));
    assert_eq!(error_kind(eval_with(&data, &mut ctx, &load)), EvalErrorKind::GlobalsUnavailable);

    let globals = PropertyCollectionRef::new();
    globals.borrow_mut().set(id(TEST_INT), 11_i64);
    data.globals = Some(globals);

    assert_eq!(eval_with(&data, &mut ctx, &load), Ok(EvalVar::Int(11)));
    assert_eq!(
        error_kind(eval_with(
            &data,
            &mut ctx,
            &assign_prop(EvalContext::Globals, id(TEST_INT), int(1))
        )),
        EvalErrorKind::ReadOnlyContext {
            context: EvalContext::Globals
        }
    );
}

#[test]
fn test_entity_context_resolves_through_game() {
    let data = test_data();
    let mut game = ReferenceGame::new();
    let player = game.create_player(A);
    game.properties(player).unwrap().borrow_mut().set(id(TEST_INT), 4_i64);

    let load = load_prop(EvalContext::Entity, id(TEST_INT));

    let mut unbound = EvalContextData::new();
    unbound.set_entity(EvalContext::Entity, Some(player)).unwrap();
    assert_eq!(
        error_kind(eval_with(&data, &mut unbound, &load)),
        EvalErrorKind::TypeMismatch {
            operand: "Context",
            expected: "a property collection",
            got: EvalVarKind::EntityPtr,
        }
    );

    let mut ctx = EvalContextData::with_game(&game);
    ctx.set_entity(EvalContext::Entity, Some(player)).unwrap();
    assert_eq!(eval_with(&data, &mut ctx, &load), Ok(EvalVar::Int(4)));
}

#[test]
fn test_eval_params_select_the_property_id() {
    let data = test_data();
    let info = data.property_info.lookup(KEYED_INT).unwrap();
    let keyed_b = PropertyId::with_param(KEYED_INT, info.param_from_prototype(0, B).unwrap());

    let mut ctx = EvalContextData::new();
    let collection = bind_collection(&mut ctx, EvalContext::Var1);

    let assign = assign_prop_params(EvalContext::Var1, KEYED_INT_PROTO, params([proto(B)]), int(8));
    eval_with(&data, &mut ctx, &assign).unwrap();
    assert_eq!(collection.borrow().get(keyed_b), Some(PropertyValue::Integer(8)));

    let load_b = load_prop_params(EvalContext::Var1, KEYED_INT_PROTO, params([proto(B)]));
    assert_eq!(eval_with(&data, &mut ctx, &load_b), Ok(EvalVar::Int(8)));
    let load_a = load_prop_params(EvalContext::Var1, KEYED_INT_PROTO, params([proto(A)]));
    assert_eq!(eval_with(&data, &mut ctx, &load_a), Ok(EvalVar::Int(0)));
}

#[test]
fn test_unencodable_param_keeps_default() {
    let data = test_data();
    let info = data.property_info.lookup(KEYED_INT).unwrap();
    let default_id = PropertyId::with_params(KEYED_INT, info.default_params());

    let mut ctx = EvalContextData::new();
    let collection = bind_collection(&mut ctx, EvalContext::Var1);
    collection.borrow_mut().set(default_id, 5_i64);

    // C is outside the param's domain; a failing expression is tolerated too.
    for param in [proto(C), div(int(1), int(0))] {
        let load = load_prop_params(EvalContext::Var1, KEYED_INT_PROTO, params([param]));
        assert_eq!(eval_with(&data, &mut ctx, &load), Ok(EvalVar::Int(5)));
    }
}

#[test]
fn test_integer_params() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let collection = bind_collection(&mut ctx, EvalContext::Var1);

    let assign = assign_prop_params(EvalContext::Var1, LEVEL_INT_PROTO, params([int(3)]), int(30));
    eval_with(&data, &mut ctx, &assign).unwrap();

    let level_3 = PropertyId::with_param(LEVEL_INT, PropertyParam::new(3).unwrap());
    assert_eq!(collection.borrow().get(level_3), Some(PropertyValue::Integer(30)));
}

#[test]
fn test_context_params() {
    let data = test_data();
    let info = data.property_info.lookup(KEYED_INT).unwrap();
    let keyed_b = PropertyId::with_param(KEYED_INT, info.param_from_prototype(0, B).unwrap());

    let mut ctx = EvalContextData::new();
    let collection = bind_collection(&mut ctx, EvalContext::Var1);
    collection.borrow_mut().set(keyed_b, 12_i64);
    ctx.set_var(EvalContext::Var2, EvalVar::ProtoRef(B)).unwrap();

    let load = EvalPrototype::LoadPropContextParams {
        context: EvalContext::Var1,
        prop: KEYED_INT_PROTO,
        prop_context_params: EvalContext::Var2,
    };
    assert_eq!(eval_with(&data, &mut ctx, &load), Ok(EvalVar::Int(12)));

    ctx.set_var(EvalContext::Var2, EvalVar::Bool(true)).unwrap();
    assert!(matches!(
        error_kind(eval_with(&data, &mut ctx, &load)),
        EvalErrorKind::TypeMismatch {
            operand: "PropContextParams",
            ..
        }
    ));
}

// Context loads

#[test]
fn test_context_int_truncates() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    ctx.set_var(EvalContext::Var1, EvalVar::Float(3.7)).unwrap();
    assert_eq!(
        eval_with(&data, &mut ctx, &context_int(EvalContext::Var1)),
        Ok(EvalVar::Int(3))
    );

    ctx.set_var(EvalContext::Var1, EvalVar::Bool(true)).unwrap();
    assert!(matches!(
        error_kind(eval_with(&data, &mut ctx, &context_int(EvalContext::Var1))),
        EvalErrorKind::TypeMismatch { .. }
    ));
    assert_eq!(
        error_kind(eval_with(&data, &mut ctx, &context_int(EvalContext::LocalStack))),
        EvalErrorKind::InvalidContext {
            context: EvalContext::LocalStack
        }
    );
}

#[test]
fn test_context_proto_ref_defaults_to_invalid() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    ctx.set_var(EvalContext::Var1, EvalVar::ProtoRef(A)).unwrap();
    ctx.set_var(EvalContext::Var2, EvalVar::Int(1)).unwrap();
    assert_eq!(
        eval_with(&data, &mut ctx, &context_proto(EvalContext::Var1)),
        Ok(EvalVar::ProtoRef(A))
    );
    assert_eq!(
        eval_with(&data, &mut ctx, &context_proto(EvalContext::Var2)),
        Ok(EvalVar::ProtoRef(PrototypeId::INVALID))
    );
}

#[test]
fn test_is_context_data_null() {
    let data = test_data();
    let mut ctx = EvalContextData::new();
    let null = |ctx: &mut EvalContextData<'_>, context| eval_with(&data, ctx, &is_null(context));

    // Unset VarN slot.
    assert_eq!(null(&mut ctx, EvalContext::Var3), Ok(EvalVar::Bool(true)));
    // No local stack installed.
    assert_eq!(null(&mut ctx, EvalContext::LocalStack), Ok(EvalVar::Bool(true)));

    ctx.set_entity(EvalContext::Var1, None).unwrap();
    assert_eq!(null(&mut ctx, EvalContext::Var1), Ok(EvalVar::Bool(true)));
    bind_collection(&mut ctx, EvalContext::Var1);
    assert_eq!(null(&mut ctx, EvalContext::Var1), Ok(EvalVar::Bool(false)));

    ctx.set_var(EvalContext::Var2, EvalVar::Int(1)).unwrap();
    assert!(matches!(
        error_kind(null(&mut ctx, EvalContext::Var2)),
        EvalErrorKind::TypeMismatch { .. }
    ));
    // Unset named slots are not null references.
    assert!(null(&mut ctx, EvalContext::Entity).is_err());
}

// Curves

fn curve_data() -> (GameData, CurveId) {
    let mut data = test_data();
    let curve_id = CurveId::new(1);
    data.curves
        .insert(curve_id, "LevelCurve", Curve::new(1, vec![10.0, 20.0, 30.0]).unwrap());
    (data, curve_id)
}

#[test]
fn test_curve_lookup() {
    let (data, curve_id) = curve_data();
    let mut ctx = EvalContextData::new();
    let at = |ctx: &mut EvalContextData<'_>, index| eval_with(&data, ctx, &curve(curve_id, index));

    assert_eq!(at(&mut ctx, int(2)), Ok(EvalVar::Float(20.0)));
    assert_eq!(at(&mut ctx, float(2.9)), Ok(EvalVar::Float(20.0)));
}

#[test]
fn test_curve_index_is_clamped() {
    let (data, curve_id) = curve_data();
    let mut ctx = EvalContextData::new();
    assert_eq!(eval_with(&data, &mut ctx, &curve(curve_id, int(99))), Ok(EvalVar::Float(30.0)));
    assert_eq!(eval_with(&data, &mut ctx, &curve(curve_id, int(-5))), Ok(EvalVar::Float(10.0)));
}

#[test]
fn test_curve_failures() {
    let (data, curve_id) = curve_data();
    let mut ctx = EvalContextData::new();

    for missing in [CurveId::new(5), CurveId::INVALID] {
        assert_eq!(
            error_kind(eval_with(&data, &mut ctx, &curve(missing, int(1)))),
            EvalErrorKind::UnknownCurve { curve: missing }
        );
    }

    let no_index = EvalPrototype::LoadCurve { curve: curve_id, index: None };
    assert_eq!(
        error_kind(eval_with(&data, &mut ctx, &no_index)),
        EvalErrorKind::MissingField { field: "Index" }
    );
    assert!(matches!(
        error_kind(eval_with(&data, &mut ctx, &curve(curve_id, boolean(true)))),
        EvalErrorKind::TypeMismatch { operand: "Index", .. }
    ));
}

// Game predicates

const NORMAL: PrototypeId = PrototypeId::new(2001);
const HEROIC: PrototypeId = PrototypeId::new(2002);
const COSMIC: PrototypeId = PrototypeId::new(2003);
const REGION: RegionId = RegionId::new(3001);
const MISSION: PrototypeId = PrototypeId::new(4001);

fn tier_data() -> GameData {
    let mut data = test_data();
    data.prototypes.add_difficulty_tier(NORMAL, 1);
    data.prototypes.add_difficulty_tier(HEROIC, 2);
    data.prototypes.add_difficulty_tier(COSMIC, 3);
    data
}

#[test]
fn test_difficulty_tier_of_entity_region() {
    let data = tier_data();
    let mut game = ReferenceGame::new();
    game.add_region(REGION, HEROIC);
    let player = game.create_player(A);
    let wanderer = game.create_player(A);
    game.enter_region(player, REGION);

    let mut ctx = EvalContextData::with_game(&game);
    ctx.set_entity(EvalContext::Entity, Some(player)).unwrap();
    ctx.set_entity(EvalContext::Other, Some(wanderer)).unwrap();

    let in_range = difficulty_tier_range(EvalContext::Entity, NORMAL, HEROIC);
    assert_eq!(eval_with(&data, &mut ctx, &in_range), Ok(EvalVar::Bool(true)));
    let too_easy = difficulty_tier_range(EvalContext::Entity, COSMIC, COSMIC);
    assert_eq!(eval_with(&data, &mut ctx, &too_easy), Ok(EvalVar::Bool(false)));
    // No region means no tier, which is always in range.
    let no_region = difficulty_tier_range(EvalContext::Other, COSMIC, COSMIC);
    assert_eq!(eval_with(&data, &mut ctx, &no_region), Ok(EvalVar::Bool(true)));
}

#[test]
fn test_difficulty_tier_by_guid() {
    let data = tier_data();
    let mut game = ReferenceGame::new();
    game.add_region(REGION, COSMIC);
    let player = game.create_player(A);
    game.enter_region(player, REGION);
    game.set_db_guid(player, DbGuid::new(77));

    let mut ctx = EvalContextData::with_game(&game);
    ctx.set_var(EvalContext::Entity, EvalVar::EntityGuid(DbGuid::new(77))).unwrap();
    ctx.set_var(EvalContext::Other, EvalVar::EntityGuid(DbGuid::new(78))).unwrap();

    let expr = difficulty_tier_range(EvalContext::Entity, HEROIC, PrototypeId::INVALID);
    assert_eq!(eval_with(&data, &mut ctx, &expr), Ok(EvalVar::Bool(true)));

    let unknown = difficulty_tier_range(EvalContext::Other, HEROIC, COSMIC);
    assert!(matches!(
        error_kind(eval_with(&data, &mut ctx, &unknown)),
        EvalErrorKind::InvalidContextObject { .. }
    ));
}

#[test]
fn test_difficulty_tier_of_property_collection() {
    let data = tier_data();
    let mut ctx = EvalContextData::new();
    let collection = bind_collection(&mut ctx, EvalContext::Var1);
    collection
        .borrow_mut()
        .set(PropertyId::new(PropertyEnum::DIFFICULTY_TIER), COSMIC);

    let expr = difficulty_tier_range(EvalContext::Var1, NORMAL, HEROIC);
    assert_eq!(eval_with(&data, &mut ctx, &expr), Ok(EvalVar::Bool(false)));

    ctx.set_var(EvalContext::Var2, EvalVar::Int(1)).unwrap();
    let bad = difficulty_tier_range(EvalContext::Var2, NORMAL, HEROIC);
    assert!(matches!(
        error_kind(eval_with(&data, &mut ctx, &bad)),
        EvalErrorKind::InvalidContextObject { .. }
    ));
}

#[test]
fn test_predicates_need_a_game() {
    let data = tier_data();
    let mut ctx = EvalContextData::new();
    ctx.set_entity(EvalContext::Entity, Some(mhs_gamedata::EntityId::new(1)))
        .unwrap();

    for expr in [
        difficulty_tier_range(EvalContext::Entity, NORMAL, HEROIC),
        mission_is_active(EvalContext::Entity, MISSION),
        has_entity_in_inventory(EvalContext::Entity, A, InventoryConvenienceLabel::General),
    ] {
        assert_eq!(error_kind(eval_with(&data, &mut ctx, &expr)), EvalErrorKind::NoGameBound);
    }
}

#[test]
fn test_mission_state_of_owning_player() {
    let mut data = test_data();
    data.prototypes.add_mission(MissionPrototype::new(MISSION));

    let mut game = ReferenceGame::new();
    let player = game.create_player(A);
    let avatar = game.create_avatar(player, B);
    game.set_mission_state(player, MISSION, MissionState::Active);

    let mut ctx = EvalContextData::with_game(&game);
    ctx.set_entity(EvalContext::Entity, Some(avatar)).unwrap();

    let active = mission_is_active(EvalContext::Entity, MISSION);
    let complete = mission_is_complete(EvalContext::Entity, MISSION);
    assert_eq!(eval_with(&data, &mut ctx, &active), Ok(EvalVar::Bool(true)));
    assert_eq!(eval_with(&data, &mut ctx, &complete), Ok(EvalVar::Bool(false)));

    let unknown = mission_is_active(EvalContext::Entity, C);
    assert_eq!(
        error_kind(eval_with(&data, &mut ctx, &unknown)),
        EvalErrorKind::UnknownMission { mission: C }
    );
}

#[test]
fn test_mission_is_active_only_for_players_and_avatars() {
    let mut data = test_data();
    data.prototypes.add_mission(MissionPrototype::new(MISSION));

    let mut game = ReferenceGame::new();
    let player = game.create_player(A);
    let avatar = game.create_avatar(player, B);
    let held_by_player = game.create_world_entity(C);
    game.add_to_inventory(player, InventoryConvenienceLabel::General, held_by_player);
    let held_by_avatar = game.create_world_entity(C);
    game.add_to_inventory(avatar, InventoryConvenienceLabel::General, held_by_avatar);
    game.set_mission_state(player, MISSION, MissionState::Active);

    let active = mission_is_active(EvalContext::Entity, MISSION);
    for entity in [player, avatar] {
        let mut ctx = EvalContextData::with_game(&game);
        ctx.set_entity(EvalContext::Entity, Some(entity)).unwrap();
        assert_eq!(eval_with(&data, &mut ctx, &active), Ok(EvalVar::Bool(true)));
    }
    for entity in [held_by_player, held_by_avatar] {
        let mut ctx = EvalContextData::with_game(&game);
        ctx.set_entity(EvalContext::Entity, Some(entity)).unwrap();
        assert!(matches!(
            error_kind(eval_with(&data, &mut ctx, &active)),
            EvalErrorKind::InvalidContextObject { .. }
        ));
    }
}

#[test]
fn test_disabled_mission_is_never_active() {
    let mut data = test_data();
    data.prototypes.add_mission(MissionPrototype {
        live_tuning_enabled: false,
        ..MissionPrototype::new(MISSION)
    });

    let mut game = ReferenceGame::new();
    let player = game.create_player(A);
    game.set_mission_state(player, MISSION, MissionState::Active);

    let mut ctx = EvalContextData::with_game(&game);
    ctx.set_entity(EvalContext::Entity, Some(player)).unwrap();
    let active = mission_is_active(EvalContext::Entity, MISSION);
    assert_eq!(eval_with(&data, &mut ctx, &active), Ok(EvalVar::Bool(false)));
}

#[test]
fn test_per_avatar_mission_completion() {
    let mut data = test_data();
    data.prototypes.add_mission(MissionPrototype {
        save_state_per_avatar: true,
        ..MissionPrototype::new(MISSION)
    });
    data.property_info
        .extend_prototype_domain(PropertyEnum::AVATAR_MISSION_STATE, 0, [MISSION])
        .unwrap();

    let mut game = ReferenceGame::new();
    let player = game.create_player(A);
    let primary = game.create_avatar(player, B);
    let alt = game.create_avatar(player, C);
    game.set_mission_state(player, MISSION, MissionState::Completed);

    let param = data
        .property_info
        .lookup(PropertyEnum::AVATAR_MISSION_STATE)
        .unwrap()
        .param_from_prototype(0, MISSION)
        .unwrap();
    let state_id = PropertyId::with_param(PropertyEnum::AVATAR_MISSION_STATE, param);

    let complete = mission_is_complete(EvalContext::Entity, MISSION);
    let mut ctx = EvalContextData::with_game(&game);

    ctx.set_entity(EvalContext::Entity, Some(primary)).unwrap();
    assert_eq!(eval_with(&data, &mut ctx, &complete), Ok(EvalVar::Bool(true)));

    ctx.set_entity(EvalContext::Entity, Some(alt)).unwrap();
    assert_eq!(eval_with(&data, &mut ctx, &complete), Ok(EvalVar::Bool(false)));
    game.properties(alt)
        .unwrap()
        .borrow_mut()
        .set(state_id, MissionState::Completed.to_raw());
    assert_eq!(eval_with(&data, &mut ctx, &complete), Ok(EvalVar::Bool(true)));

    ctx.set_entity(EvalContext::Entity, Some(player)).unwrap();
    assert!(matches!(
        error_kind(eval_with(&data, &mut ctx, &complete)),
        EvalErrorKind::InvalidContextObject { .. }
    ));
}

const BP_ITEM: BlueprintId = BlueprintId::new(100);
const BP_SWORD: BlueprintId = BlueprintId::new(101);
const SWORD_DEFAULT: PrototypeId = PrototypeId::new(200);
const SWORD: PrototypeId = PrototypeId::new(201);
const SHIELD: PrototypeId = PrototypeId::new(202);

fn inventory_data() -> GameData {
    let mut data = test_data();
    data.prototypes.add_blueprint(BP_ITEM, &[]);
    data.prototypes.add_blueprint(BP_SWORD, &[BP_ITEM]);
    data.prototypes.set_default_prototype(BP_SWORD, SWORD_DEFAULT);
    data.prototypes.add_prototype(SWORD, BP_SWORD);
    data.prototypes.add_prototype(SHIELD, BP_ITEM);
    data
}

#[test]
fn test_has_entity_in_inventory() {
    let data = inventory_data();
    let mut game = ReferenceGame::new();
    let player = game.create_player(A);
    let sword = game.create_world_entity(SWORD);
    game.add_to_inventory(player, InventoryConvenienceLabel::General, sword);

    let mut ctx = EvalContextData::with_game(&game);
    ctx.set_entity(EvalContext::Entity, Some(player)).unwrap();
    let holds = |ctx: &mut EvalContextData<'_>, filter, label| {
        eval_with(&data, ctx, &has_entity_in_inventory(EvalContext::Entity, filter, label))
    };

    let general = InventoryConvenienceLabel::General;
    assert_eq!(holds(&mut ctx, SWORD, general), Ok(EvalVar::Bool(true)));
    assert_eq!(holds(&mut ctx, SWORD_DEFAULT, general), Ok(EvalVar::Bool(true)));
    assert_eq!(holds(&mut ctx, SHIELD, general), Ok(EvalVar::Bool(false)));
    assert_eq!(holds(&mut ctx, PrototypeId::INVALID, general), Ok(EvalVar::Bool(true)));
    assert_eq!(
        holds(&mut ctx, SWORD, InventoryConvenienceLabel::Costume),
        Ok(EvalVar::Bool(false))
    );
    assert_eq!(
        error_kind(holds(&mut ctx, SWORD, InventoryConvenienceLabel::None)),
        EvalErrorKind::MissingField { field: "Inventory" }
    );
}

#[test]
fn test_inventory_ignores_non_world_entities() {
    let data = inventory_data();
    let mut game = ReferenceGame::new();
    let player = game.create_player(A);
    let record = game.create_entity(SWORD);
    game.add_to_inventory(player, InventoryConvenienceLabel::Crafting, record);

    let mut ctx = EvalContextData::with_game(&game);
    ctx.set_entity(EvalContext::Entity, Some(player)).unwrap();
    let expr = has_entity_in_inventory(EvalContext::Entity, SWORD, InventoryConvenienceLabel::Crafting);
    assert_eq!(eval_with(&data, &mut ctx, &expr), Ok(EvalVar::Bool(false)));
}

#[test]
fn test_fixed_predicates() {
    assert_eq!(run_expr(&EvalPrototype::IsDynamicCombatLevelEnabled), Ok(EvalVar::Bool(true)));
    assert_eq!(error_kind(run_expr(&EvalPrototype::ExportError)), EvalErrorKind::ExportError);
}

// Reserved operators

#[test]
fn test_reserved_operator_fails() {
    let expr = EvalPrototype::IsInParty {
        context: EvalContext::Entity,
    };
    let err = run_expr(&expr).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::NotYetSupported { op: EvalOp::IsInParty });
    assert_eq!(err.op, Some(EvalOp::IsInParty));
}

#[test]
#[should_panic(expected = "IsInParty is not yet supported")]
fn test_reserved_operator_panics_under_panic_policy() {
    let data = test_data();
    let interpreter = InterpreterBuilder::new(&data)
        .unsupported_policy(UnsupportedOpPolicy::Panic)
        .build();
    let mut ctx = EvalContextData::new();
    let expr = EvalPrototype::IsInParty {
        context: EvalContext::Entity,
    };
    let _ = interpreter.run(Some(&expr), &mut ctx);
}

// Entry points

#[test]
fn test_run_turns_failures_into_error_values() {
    let data = test_data();
    let interpreter = Interpreter::new(&data);
    let mut ctx = EvalContextData::new();

    assert_eq!(interpreter.run(None, &mut ctx), EvalVar::Error);
    assert_eq!(
        error_kind(interpreter.try_run(None, &mut ctx)),
        EvalErrorKind::MissingField { field: "Eval" }
    );
    assert_eq!(interpreter.run(Some(&div(int(1), int(0))), &mut ctx), EvalVar::Error);
}

#[test]
fn test_error_is_tagged_with_failing_node() {
    let err = run_expr(&add(int(1), div(int(1), int(0)))).unwrap_err();
    assert_eq!(err.op, Some(EvalOp::Div));
    assert_eq!(err.node.as_deref(), Some("Div(1, 0)"));
    assert_eq!(err.to_string(), "Div: division by zero in `Div(1, 0)`");
}

#[test]
fn test_typed_entry_points() {
    let data = test_data();
    let interpreter = Interpreter::new(&data);
    let mut ctx = EvalContextData::new();

    assert_eq!(interpreter.run_int(Some(&add(int(2), int(3))), &mut ctx), 5);
    assert_eq!(interpreter.run_int(Some(&float(2.9)), &mut ctx), 2);
    assert_eq!(interpreter.run_long(Some(&int(1 << 40)), &mut ctx), 1 << 40);
    assert_eq!(interpreter.run_float(Some(&int(2)), &mut ctx), 2.0);
    assert!(interpreter.run_bool(Some(&int(2)), &mut ctx));
    assert_eq!(interpreter.run_prototype_id(Some(&proto(A)), &mut ctx), A);

    assert_eq!(interpreter.try_run_int(Some(&proto(A)), &mut ctx), None);
    assert_eq!(interpreter.run_int(Some(&proto(A)), &mut ctx), 0);
    assert_eq!(interpreter.try_run_bool(Some(&div(int(1), int(0))), &mut ctx), None);
    assert_eq!(interpreter.run_prototype_id(None, &mut ctx), PrototypeId::INVALID);
}

#[test]
fn test_deeply_nested_rule() {
    let mut expr = int(0);
    for _ in 0..2_000 {
        expr = add(expr, int(1));
    }
    assert_eq!(run_expr(&expr), Ok(EvalVar::Int(2_000)));
}
