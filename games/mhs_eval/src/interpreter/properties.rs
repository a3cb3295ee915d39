//! Property reads and writes.
//!
//! Values cross between [`EvalVar`] and [`PropertyValue`] according to the
//! property's declared data type, which is looked up in the schema table
//! before any collection is touched. A write converts first and only then
//! stores, so a failed conversion leaves the collection unchanged.

use mhs_gamedata::{EntityId, PrototypeId, RegionId};
use mhs_properties::{
    PropertyCollectionRef, PropertyDataType, PropertyEnum, PropertyId, PropertyInfo, PropertyParam,
    PropertyParamType, PropertyValue, TimeSpan,
};

use super::Interpreter;
use crate::errors::{missing_field, property_conversion, type_mismatch, unknown_property};
use crate::{
    Access, EvalContext, EvalContextData, EvalError, EvalNode, EvalParams, EvalPrototype, EvalResult,
    EvalVar,
};

/// Convert `var` to the declared type of `info`.
pub(super) fn to_property_value(var: &EvalVar, info: &PropertyInfo) -> Result<PropertyValue, EvalError> {
    let converted = match info.data_type {
        PropertyDataType::Integer => var.try_get_i64().map(PropertyValue::Integer),
        PropertyDataType::Real => var.try_get_f32().map(PropertyValue::Real),
        PropertyDataType::Boolean => var.try_get_bool().map(PropertyValue::Boolean),
        PropertyDataType::Prototype => var.try_get_proto_ref().map(PropertyValue::Prototype),
        PropertyDataType::Asset => var.try_get_asset_ref().map(PropertyValue::Asset),
        PropertyDataType::EntityId => var.try_get_entity_id().map(PropertyValue::EntityId),
        PropertyDataType::RegionId => var
            .try_get_entity_id()
            .map(|id| PropertyValue::RegionId(RegionId::new(id.raw()))),
        PropertyDataType::Time => var
            .try_get_i64()
            .map(|ms| PropertyValue::Time(TimeSpan::from_millis(ms))),
    };
    converted.ok_or_else(|| property_conversion(info.name.as_str(), info.data_type, var.kind()))
}

/// Inverse of [`to_property_value`]. Ids travel as `EntityId`, durations as
/// `Int` milliseconds.
pub(super) fn from_property_value(value: PropertyValue) -> EvalVar {
    match value {
        PropertyValue::Boolean(v) => EvalVar::Bool(v),
        PropertyValue::Real(v) => EvalVar::Float(v),
        PropertyValue::Integer(v) => EvalVar::Int(v),
        PropertyValue::Prototype(v) => EvalVar::ProtoRef(v),
        PropertyValue::Asset(v) => EvalVar::AssetRef(v),
        PropertyValue::EntityId(v) => EvalVar::EntityId(v),
        PropertyValue::RegionId(v) => EvalVar::EntityId(EntityId::new(v.raw())),
        PropertyValue::Time(v) => EvalVar::Int(v.as_millis()),
    }
}

/// Encode `var` as param `index` of `info`. `None` if it does not fit.
fn encode_param(info: &PropertyInfo, index: usize, var: &EvalVar) -> Option<PropertyParam> {
    match info.param_type(index) {
        PropertyParamType::Integer => PropertyParam::new(i64::from(var.try_get_i32()?)).ok(),
        PropertyParamType::Asset => info.param_from_asset(index, var.try_get_asset_ref()?),
        PropertyParamType::Prototype => info.param_from_prototype(index, var.try_get_proto_ref()?),
        PropertyParamType::Invalid => None,
    }
}

impl<'a> Interpreter<'a> {
    pub(super) fn eval_assign_prop(
        &self,
        context: EvalContext,
        prop: PropertyId,
        eval: &EvalNode,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        let eval = eval.as_deref().ok_or_else(|| missing_field("Eval"))?;
        if !prop.is_valid() {
            return Err(missing_field("Prop"));
        }

        let value = self.eval_assignable(eval, ctx)?;
        let collection = self.collection(context, Access::Write, ctx)?;
        let info = self.property_info(prop.property_enum())?;
        write_property(&collection, prop, &value, info)
    }

    pub(super) fn eval_assign_prop_eval_params(
        &self,
        context: EvalContext,
        prop: PrototypeId,
        params: &EvalParams,
        eval: &EvalNode,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        let eval = eval.as_deref().ok_or_else(|| missing_field("Eval"))?;
        if !prop.is_valid() {
            return Err(missing_field("Prop"));
        }

        let value = self.eval_assignable(eval, ctx)?;
        let collection = self.collection(context, Access::Write, ctx)?;
        let info = self.property_info_from_prototype(prop)?;
        let id = self.eval_property_id(info, params, ctx)?;
        write_property(&collection, id, &value, info)
    }

    /// Presence test, falling through to parent collections.
    pub(super) fn eval_has_prop(
        &self,
        context: EvalContext,
        prop: PropertyId,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        if !prop.is_valid() {
            return Err(missing_field("Prop"));
        }
        let collection = self.collection(context, Access::Read, ctx)?;
        let present = collection.borrow().has_property(prop);
        Ok(EvalVar::Bool(present))
    }

    pub(super) fn eval_load_prop(
        &self,
        context: EvalContext,
        prop: PropertyId,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        if !prop.is_valid() {
            return Err(missing_field("Prop"));
        }
        let collection = self.collection(context, Access::Read, ctx)?;
        let info = self.property_info(prop.property_enum())?;
        Ok(read_property(&collection, prop, info))
    }

    /// `LoadProp` with param 0 taken from the `param_context` slot.
    pub(super) fn eval_load_prop_context_params(
        &self,
        context: EvalContext,
        prop: PrototypeId,
        param_context: EvalContext,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        if !prop.is_valid() {
            return Err(missing_field("Prop"));
        }
        let collection = self.collection(context, Access::Read, ctx)?;
        let info = self.property_info_from_prototype(prop)?;

        let mut params = info.default_params();
        if info.param_count() > 0 {
            let var = ctx.get_var(param_context, self.data.globals.as_ref(), Access::Read)?;
            params[0] = encode_param(info, 0, &var).ok_or_else(|| {
                type_mismatch("PropContextParams", "ProtoRef or Int param", var.kind())
            })?;
        }

        let id = PropertyId::with_params(info.property, params);
        Ok(read_property(&collection, id, info))
    }

    pub(super) fn eval_load_prop_eval_params(
        &self,
        context: EvalContext,
        prop: PrototypeId,
        params: &EvalParams,
        ctx: &mut EvalContextData<'_>,
    ) -> EvalResult {
        if !prop.is_valid() {
            return Err(missing_field("Prop"));
        }
        let collection = self.collection(context, Access::Read, ctx)?;
        let info = self.property_info_from_prototype(prop)?;
        let id = self.eval_property_id(info, params, ctx)?;
        Ok(read_property(&collection, id, info))
    }

    // Helpers

    /// Evaluate the value of an assignment. `Error` and `Undefined` cannot
    /// be stored.
    fn eval_assignable(&self, eval: &EvalPrototype, ctx: &mut EvalContextData<'_>) -> EvalResult {
        let value = self.eval(eval, ctx)?;
        match value {
            EvalVar::Error | EvalVar::Undefined => {
                Err(type_mismatch("Eval", "a storable value", value.kind()))
            }
            value => Ok(value),
        }
    }

    /// Property collection behind `context`, resolving entities through the
    /// bound game.
    fn collection(
        &self,
        context: EvalContext,
        access: Access,
        ctx: &EvalContextData<'_>,
    ) -> Result<PropertyCollectionRef, EvalError> {
        let var = ctx.get_var(context, self.data.globals.as_ref(), access)?;
        var.try_get_property_collection(ctx.game())
            .ok_or_else(|| type_mismatch("Context", "a property collection", var.kind()))
    }

    fn property_info(&self, property: PropertyEnum) -> Result<&'a PropertyInfo, EvalError> {
        self.data
            .property_info
            .lookup(property)
            .ok_or_else(|| unknown_property(property))
    }

    fn property_info_from_prototype(&self, prototype: PrototypeId) -> Result<&'a PropertyInfo, EvalError> {
        let property = self
            .data
            .property_info
            .enum_from_prototype(prototype)
            .ok_or_else(|| unknown_property(prototype))?;
        self.property_info(property)
    }

    /// Build a parameterized id from up to four param expressions.
    ///
    /// Params start from the declared defaults. An absent expression, or
    /// one whose value cannot be encoded, keeps the default.
    fn eval_property_id(
        &self,
        info: &PropertyInfo,
        params: &EvalParams,
        ctx: &mut EvalContextData<'_>,
    ) -> Result<PropertyId, EvalError> {
        let mut values = info.default_params();
        let count = info.param_count().min(PropertyId::MAX_PARAMS);

        for (index, node) in params.iter().enumerate().take(count) {
            let Some(node) = node.as_deref() else {
                continue;
            };
            if info.param_type(index) == PropertyParamType::Invalid {
                return Err(EvalError::new(format!(
                    "unknown param type for param {index} of {}",
                    info.name
                )));
            }

            let encoded = self
                .eval(node, ctx)
                .ok()
                .and_then(|var| encode_param(info, index, &var));
            match encoded {
                Some(param) => values[index] = param,
                None => tracing::debug!(
                    property = %info.name,
                    index,
                    "param did not evaluate to an encodable value, keeping default"
                ),
            }
        }

        Ok(PropertyId::with_params(info.property, values))
    }
}

fn write_property(
    collection: &PropertyCollectionRef,
    id: PropertyId,
    value: &EvalVar,
    info: &PropertyInfo,
) -> EvalResult {
    let converted = to_property_value(value, info)?;
    tracing::trace!(property = %info.name, ?id, "assign property");
    collection.borrow_mut().set(id, converted);
    Ok(EvalVar::Undefined)
}

/// Stored value, or the declared default when absent.
fn read_property(collection: &PropertyCollectionRef, id: PropertyId, info: &PropertyInfo) -> EvalVar {
    let value = collection.borrow().get(id).unwrap_or(info.default);
    from_property_value(value)
}
