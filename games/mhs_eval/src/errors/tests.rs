use super::*;
use pretty_assertions::assert_eq;

// Kind and message agree

#[test]
fn test_division_by_zero_has_correct_kind() {
    let err = division_by_zero();
    assert_eq!(err.kind, EvalErrorKind::DivisionByZero);
    assert_eq!(err.message, "division by zero");
}

#[test]
fn test_type_mismatch_message() {
    let err = type_mismatch("Add arg1", "Int or Float", EvalVarKind::Bool);
    assert_eq!(err.message, "Add arg1: expected Int or Float, got Bool");
}

#[test]
fn test_context_errors_name_the_slot() {
    assert_eq!(
        read_only_context(EvalContext::Globals).message,
        "context Globals is read-only"
    );
    assert_eq!(
        null_context(EvalContext::Var3).message,
        "context Var3 holds a null reference"
    );
}

#[test]
fn test_new_uses_custom_kind() {
    let err = EvalError::new("bad rule");
    assert_eq!(
        err.kind,
        EvalErrorKind::Custom {
            message: "bad rule".to_string()
        }
    );
    assert_eq!(err.to_string(), "bad rule");
}

// Tagging

#[test]
fn test_display_includes_op_and_node() {
    let err = division_by_zero()
        .with_op(EvalOp::Div)
        .with_node("Div(1, 0)");
    assert_eq!(err.to_string(), "Div: division by zero in `Div(1, 0)`");
}

#[test]
fn test_not_yet_supported_names_the_operator() {
    let err = not_yet_supported(EvalOp::RandomInt);
    assert_eq!(err.message, "RandomInt is not yet supported");
}
