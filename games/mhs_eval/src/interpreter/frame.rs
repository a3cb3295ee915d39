//! RAII stack frames for scopes and loops.
//!
//! Entering a scope makes the current local stack the caller stack and
//! installs a fresh local stack. [`StackFrame`] performs that swap on
//! creation and restores both collections when dropped, so every exit path
//! (including `?` and unwinding) leaves the context as it was found.
//!
//! The guard derefs to [`EvalContextData`], so handlers pass `&mut frame`
//! wherever a context is expected.

use std::ops::{Deref, DerefMut};

use mhs_properties::PropertyCollectionRef;

use crate::{Condition, EvalContext, EvalContextData, EvalVar};

/// Guard restoring the caller and local stacks on drop.
pub(crate) struct StackFrame<'c, 'g> {
    data: &'c mut EvalContextData<'g>,
    saved_caller: Option<PropertyCollectionRef>,
    saved_local: Option<PropertyCollectionRef>,
    frame_local: PropertyCollectionRef,
    condition_bound: bool,
}

impl<'g> EvalContextData<'g> {
    /// Enter a new scope with a fresh local stack.
    pub(crate) fn push_frame(&mut self) -> StackFrame<'_, 'g> {
        let saved_caller = self.caller_stack.take();
        let saved_local = self.local_stack.take();
        let frame_local = PropertyCollectionRef::new();
        self.caller_stack = saved_local.clone();
        self.local_stack = Some(frame_local.clone());
        StackFrame {
            data: self,
            saved_caller,
            saved_local,
            frame_local,
            condition_bound: false,
        }
    }
}

impl StackFrame<'_, '_> {
    /// Local stack owned by this frame.
    pub(crate) fn local(&self) -> &PropertyCollectionRef {
        &self.frame_local
    }

    /// Re-point the stacks at this frame before evaluating a child.
    ///
    /// A child that swaps the stacks without restoring them cannot leak the
    /// change into its siblings.
    pub(crate) fn rebind(&mut self) {
        self.data.caller_stack = self.saved_local.clone();
        self.data.local_stack = Some(self.frame_local.clone());
    }

    /// Stacks for a loop's `PostLoop`: the enclosing caller stack and this
    /// frame's local stack.
    pub(crate) fn rebind_post_loop(&mut self) {
        self.data.caller_stack = self.saved_caller.clone();
        self.data.local_stack = Some(self.frame_local.clone());
    }

    /// Bind the `Condition` and `ConditionKeywords` slots to `condition`.
    pub(crate) fn bind_condition(&mut self, condition: &Condition) {
        self.data.store_slot(
            EvalContext::Condition,
            EvalVar::PropertyCollectionPtr(Some(condition.properties.clone())),
            false,
        );
        self.data.store_slot(
            EvalContext::ConditionKeywords,
            EvalVar::ProtoRefVectorPtr(Some(condition.keywords.clone())),
            true,
        );
        self.condition_bound = true;
    }

    /// Reset the condition slots to null references.
    pub(crate) fn clear_condition_slots(&mut self) {
        self.data.store_slot(
            EvalContext::Condition,
            EvalVar::PropertyCollectionPtr(None),
            false,
        );
        self.data.store_slot(
            EvalContext::ConditionKeywords,
            EvalVar::ProtoRefVectorPtr(None),
            false,
        );
        self.condition_bound = false;
    }
}

impl Drop for StackFrame<'_, '_> {
    fn drop(&mut self) {
        if self.condition_bound {
            self.clear_condition_slots();
        }
        self.data.caller_stack = self.saved_caller.take();
        self.data.local_stack = self.saved_local.take();
    }
}

impl<'g> Deref for StackFrame<'_, 'g> {
    type Target = EvalContextData<'g>;

    fn deref(&self) -> &Self::Target {
        self.data
    }
}

impl DerefMut for StackFrame<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.data
    }
}
