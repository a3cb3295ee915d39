//! Control flow: `IfElse`, `Scope` and the loops.
//!
//! Scopes and loops enter a [`StackFrame`]: the current local stack becomes
//! the caller stack and a fresh local stack is installed. A loop keeps one
//! frame for all of its iterations, so loop state written to `LocalStack`
//! survives from one iteration to the next. Every child is evaluated with
//! the frame's stacks rebound first.
//!
//! Loop gates (`LoopCondition`, `LoopConditionPreScope`, ...) stop the loop
//! on `false`. A gate that yields anything other than `Bool` ends the whole
//! loop immediately and becomes its result; `PostLoop` does not run.

use mhs_gamedata::PrototypeId;
use mhs_properties::{PropertyEnum, PropertyId};
use smallvec::SmallVec;

use super::frame::StackFrame;
use super::Interpreter;
use crate::errors::{loop_limit_exceeded, missing_field, type_mismatch};
use crate::{
    Access, EvalContextData, EvalError, EvalNode, EvalPrototype, EvalResult, EvalVar,
    ForEachConditionLoop, ForEachProtoRefLoop, ForLoop,
};

/// Outcome of a loop gate.
enum Gate {
    Pass,
    Stop,
    /// Non-`Bool` gate value, returned as the loop's result.
    Exit(EvalVar),
}

impl Interpreter<'_> {
    pub(super) fn eval_if_else(
        &self,
        conditional: &EvalNode,
        eval_if: &EvalNode,
        eval_else: &EvalNode,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        let conditional = conditional.as_deref().ok_or_else(|| missing_field("Conditional"))?;
        let eval_if = eval_if.as_deref().ok_or_else(|| missing_field("EvalIf"))?;

        let taken = match self.eval(conditional, ctx)? {
            EvalVar::Bool(b) => b,
            EvalVar::Int(v) => v > 0,
            EvalVar::Float(v) => v > 0.0,
            other => return Err(type_mismatch("Conditional", "Bool, Int or Float", other.kind())),
        };

        if taken {
            self.eval(eval_if, ctx)
        } else {
            match eval_else.as_deref() {
                Some(eval_else) => self.eval(eval_else, ctx),
                None => Ok(EvalVar::Undefined),
            }
        }
    }

    /// Run every child in a fresh frame. The result is the last child's
    /// value; if any child failed, the first failure wins.
    pub(super) fn eval_scope(&self, body: &[EvalPrototype], ctx: &mut EvalContextData<'_>) -> EvalResult {
        if body.is_empty() {
            return Err(missing_field("Scope"));
        }

        let mut frame = ctx.push_frame();
        tracing::trace!(children = body.len(), "enter scope");

        let mut last = EvalVar::Undefined;
        let mut first_error: Option<EvalError> = None;
        for node in body {
            frame.rebind();
            match self.eval(node, &mut frame) {
                Ok(value) => last = value,
                Err(err) if first_error.is_none() => first_error = Some(err),
                Err(_) => {}
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(last),
        }
    }

    pub(super) fn eval_for(&self, def: &ForLoop, ctx: &mut EvalContextData<'_>) -> EvalResult {
        let init = def.loop_var_init.as_deref().ok_or_else(|| missing_field("LoopVarInit"))?;
        let advance = def.loop_advance.as_deref().ok_or_else(|| missing_field("LoopAdvance"))?;
        let condition = def.loop_condition.as_deref().ok_or_else(|| missing_field("LoopCondition"))?;
        if def.scope_loop_body.is_empty() {
            return Err(missing_field("ScopeLoopBody"));
        }

        let mut frame = ctx.push_frame();
        tracing::trace!("enter For frame");

        if let Some(pre_loop) = def.pre_loop.as_deref() {
            self.eval(pre_loop, &mut frame)?;
        }
        self.eval(init, &mut frame)?;

        let mut last = self.eval(condition, &mut frame)?;
        let mut iterations = 0;
        loop {
            let keep_going = match last {
                EvalVar::Bool(b) => b,
                _ => return Ok(last),
            };
            if !keep_going {
                break;
            }
            self.count_iteration(&mut iterations)?;

            self.eval_loop_body(&def.scope_loop_body, &mut frame)?;
            frame.rebind();
            self.eval(advance, &mut frame)?;
            last = self.eval(condition, &mut frame)?;
        }

        frame.rebind_post_loop();
        if let Some(post_loop) = def.post_loop.as_deref() {
            last = self.eval(post_loop, &mut frame)?;
        }
        Ok(last)
    }

    /// Iterate the conditions of a condition collection, binding each to
    /// the `Condition` and `ConditionKeywords` slots in turn.
    pub(super) fn eval_for_each_condition(
        &self,
        def: &ForEachConditionLoop,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        if def.scope_loop_body.is_empty() {
            return Err(missing_field("ScopeLoopBody"));
        }

        let mut frame = ctx.push_frame();
        tracing::trace!(context = %def.condition_collection_context, "enter ForEachConditionInContext frame");

        let mut last = EvalVar::Undefined;
        if let Some(pre_loop) = def.pre_loop.as_deref() {
            last = self.eval(pre_loop, &mut frame)?;
        }

        let var = frame.get_var(
            def.condition_collection_context,
            self.data.globals.as_ref(),
            Access::Read,
        )?;
        let Some(conditions) = var.try_get_condition_collection().cloned() else {
            return Err(type_mismatch(
                "ConditionCollectionContext",
                "ConditionCollectionPtr",
                var.kind(),
            ));
        };

        let mut iterations = 0;
        for condition in conditions.iter() {
            self.count_iteration(&mut iterations)?;
            frame.bind_condition(condition);

            match self.eval_gate(&def.loop_condition_pre_scope, &mut frame)? {
                Gate::Pass => {}
                Gate::Stop => {
                    last = EvalVar::Bool(false);
                    break;
                }
                Gate::Exit(value) => return Ok(value),
            }

            last = self.eval_loop_body(&def.scope_loop_body, &mut frame)?;

            match self.eval_gate(&def.loop_condition_post_scope, &mut frame)? {
                Gate::Pass => {}
                Gate::Stop => {
                    last = EvalVar::Bool(false);
                    break;
                }
                Gate::Exit(value) => return Ok(value),
            }
        }

        frame.clear_condition_slots();
        frame.rebind();
        if let Some(post_loop) = def.post_loop.as_deref() {
            last = self.eval(post_loop, &mut frame)?;
        }
        Ok(last)
    }

    /// Iterate a prototype ref list or vector, exposing each element to the
    /// body as the `EvalLoopVarProtoRef` property on the local stack.
    pub(super) fn eval_for_each_proto_ref(
        &self,
        def: &ForEachProtoRefLoop,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        if def.scope_loop_body.is_empty() {
            return Err(missing_field("ScopeLoopBody"));
        }

        let mut frame = ctx.push_frame();
        tracing::trace!(context = %def.proto_ref_list_context, "enter ForEachProtoRefInContextRefList frame");

        let mut last = EvalVar::Undefined;
        if let Some(pre_loop) = def.pre_loop.as_deref() {
            last = self.eval(pre_loop, &mut frame)?;
        }

        let var = frame.get_var(def.proto_ref_list_context, self.data.globals.as_ref(), Access::Read)?;
        let elements: SmallVec<[PrototypeId; 16]> =
            match var.try_get_proto_ref_list().or_else(|| var.try_get_proto_ref_vector()) {
                Some(elements) => elements.iter().copied().collect(),
                None => {
                    tracing::warn!(
                        context = %def.proto_ref_list_context,
                        "ProtoRefListContext is not a prototype ref list or vector"
                    );
                    return Err(type_mismatch(
                        "ProtoRefListContext",
                        "ProtoRefListPtr or ProtoRefVectorPtr",
                        var.kind(),
                    ));
                }
            };

        let loop_var = PropertyId::new(PropertyEnum::EVAL_LOOP_VAR_PROTO_REF);
        let mut iterations = 0;
        for proto_ref in elements {
            self.count_iteration(&mut iterations)?;

            match self.eval_gate(&def.loop_condition, &mut frame)? {
                Gate::Pass => {}
                Gate::Stop => {
                    last = EvalVar::Bool(false);
                    break;
                }
                Gate::Exit(value) => return Ok(value),
            }

            frame.local().borrow_mut().set(loop_var, proto_ref);
            last = self.eval_loop_body(&def.scope_loop_body, &mut frame)?;
        }

        frame.rebind();
        if let Some(post_loop) = def.post_loop.as_deref() {
            last = self.eval(post_loop, &mut frame)?;
        }
        Ok(last)
    }

    // Loop helpers

    fn eval_loop_body(&self, body: &[EvalPrototype], frame: &mut StackFrame<'_, '_>) -> EvalResult {
        let mut last = EvalVar::Undefined;
        for node in body {
            frame.rebind();
            last = self.eval(node, frame)?;
        }
        Ok(last)
    }

    fn eval_gate(&self, gate: &EvalNode, ctx: &mut EvalContextData<'_>) -> Result<Gate, EvalError> {
        let Some(gate) = gate.as_deref() else {
            return Ok(Gate::Pass);
        };
        Ok(match self.eval(gate, ctx)? {
            EvalVar::Bool(true) => Gate::Pass,
            EvalVar::Bool(false) => Gate::Stop,
            other => Gate::Exit(other),
        })
    }

    fn count_iteration(&self, iterations: &mut u32) -> Result<(), EvalError> {
        *iterations = iterations.saturating_add(1);
        match self.config.max_loop_iterations {
            Some(limit) if *iterations > limit => Err(loop_limit_exceeded(limit)),
            _ => Ok(()),
        }
    }
}
