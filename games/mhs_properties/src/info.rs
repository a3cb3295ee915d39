//! Property schema registry.
//!
//! Every [`PropertyEnum`] in use is described by a [`PropertyInfo`]: its
//! storage type, default value, and the kind of each param. Typed reads
//! and writes consult the [`PropertyInfoTable`] before touching a
//! collection, so an unregistered enum is a hard failure at the call site.
//!
//! Asset and prototype params are stored as small indices into an
//! enumerated domain. Index `0` means "no reference"; the n-th value of the
//! domain is stored as `n + 1`.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use mhs_gamedata::{AssetId, PrototypeId};

use crate::{PropertyDataType, PropertyEnum, PropertyError, PropertyId, PropertyParam, PropertyValue};

/// What a property param refers to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyParamType {
    Invalid,
    Integer,
    Asset,
    Prototype,
}

/// Schema of one param slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyParamInfo {
    pub param_type: PropertyParamType,
    pub default: PropertyParam,
    /// Enumerated asset or prototype ids, in param order.
    domain: Vec<u64>,
}

impl PropertyParamInfo {
    pub fn integer() -> Self {
        Self::of_type(PropertyParamType::Integer)
    }

    pub fn asset(domain: impl IntoIterator<Item = AssetId>) -> Self {
        let mut info = Self::of_type(PropertyParamType::Asset);
        info.domain = domain.into_iter().map(AssetId::raw).collect();
        info
    }

    pub fn prototype(domain: impl IntoIterator<Item = PrototypeId>) -> Self {
        let mut info = Self::of_type(PropertyParamType::Prototype);
        info.domain = domain.into_iter().map(PrototypeId::raw).collect();
        info
    }

    fn of_type(param_type: PropertyParamType) -> Self {
        PropertyParamInfo {
            param_type,
            default: PropertyParam::ZERO,
            domain: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: PropertyParam) -> Self {
        self.default = default;
        self
    }

    fn encode_ref(&self, raw: u64) -> Option<PropertyParam> {
        if raw == 0 {
            return Some(PropertyParam::ZERO);
        }
        let position = self.domain.iter().position(|&value| value == raw)?;
        PropertyParam::new(i64::try_from(position).ok()? + 1).ok()
    }

    fn decode_ref(&self, param: PropertyParam) -> Option<u64> {
        match usize::from(param.raw()) {
            0 => Some(0),
            n => self.domain.get(n - 1).copied(),
        }
    }
}

/// Schema of one property.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyInfo {
    pub property: PropertyEnum,
    pub name: String,
    pub data_type: PropertyDataType,
    pub default: PropertyValue,
    /// Property prototype this enum was generated from, if any.
    pub prototype: PrototypeId,
    params: SmallVec<[PropertyParamInfo; PropertyId::MAX_PARAMS]>,
}

impl PropertyInfo {
    /// Unparameterized property defaulting to the zero of `data_type`.
    pub fn new(property: PropertyEnum, name: impl Into<String>, data_type: PropertyDataType) -> Self {
        PropertyInfo {
            property,
            name: name.into(),
            data_type,
            default: PropertyValue::zero(data_type),
            prototype: PrototypeId::INVALID,
            params: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<PropertyValue>) -> Self {
        self.default = default.into();
        self
    }

    #[must_use]
    pub fn with_param(mut self, param: PropertyParamInfo) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn with_prototype(mut self, prototype: PrototypeId) -> Self {
        self.prototype = prototype;
        self
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Type of param `index`; `Invalid` past the declared params.
    pub fn param_type(&self, index: usize) -> PropertyParamType {
        self.params
            .get(index)
            .map_or(PropertyParamType::Invalid, |p| p.param_type)
    }

    /// Default params, padded with zero past the declared count.
    pub fn default_params(&self) -> [PropertyParam; PropertyId::MAX_PARAMS] {
        let mut params = [PropertyParam::ZERO; PropertyId::MAX_PARAMS];
        for (slot, info) in params.iter_mut().zip(&self.params) {
            *slot = info.default;
        }
        params
    }

    /// Encode a prototype reference for param `index`.
    ///
    /// `None` if the param is not prototype-typed or the prototype is not
    /// part of its domain.
    pub fn param_from_prototype(&self, index: usize, prototype: PrototypeId) -> Option<PropertyParam> {
        let info = self.params.get(index)?;
        if info.param_type != PropertyParamType::Prototype {
            return None;
        }
        info.encode_ref(prototype.raw())
    }

    /// Encode an asset reference for param `index`.
    pub fn param_from_asset(&self, index: usize, asset: AssetId) -> Option<PropertyParam> {
        let info = self.params.get(index)?;
        if info.param_type != PropertyParamType::Asset {
            return None;
        }
        info.encode_ref(asset.raw())
    }

    /// Decode a prototype-typed param back into the reference it encodes.
    pub fn prototype_from_param(&self, index: usize, param: PropertyParam) -> Option<PrototypeId> {
        let info = self.params.get(index)?;
        if info.param_type != PropertyParamType::Prototype {
            return None;
        }
        info.decode_ref(param).map(PrototypeId::new)
    }

    /// Decode an asset-typed param back into the reference it encodes.
    pub fn asset_from_param(&self, index: usize, param: PropertyParam) -> Option<AssetId> {
        let info = self.params.get(index)?;
        if info.param_type != PropertyParamType::Asset {
            return None;
        }
        info.decode_ref(param).map(AssetId::new)
    }
}

/// Registry of property schemas, keyed by enum and by property prototype.
#[derive(Clone, Debug, Default)]
pub struct PropertyInfoTable {
    infos: FxHashMap<PropertyEnum, PropertyInfo>,
    by_prototype: FxHashMap<PrototypeId, PropertyEnum>,
}

impl PropertyInfoTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-populated with the properties rule evaluation itself uses.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        for info in builtin_infos() {
            let registered = table.register(info);
            debug_assert!(registered.is_ok(), "malformed builtin property: {registered:?}");
            if let Err(err) = registered {
                tracing::error!(%err, "builtin property was not registered");
            }
        }
        table
    }

    /// Register a schema.
    pub fn register(&mut self, info: PropertyInfo) -> Result<(), PropertyError> {
        if !info.property.is_valid() || self.infos.contains_key(&info.property) {
            return Err(PropertyError::DuplicateProperty {
                property: info.property,
            });
        }
        if info.param_count() > PropertyId::MAX_PARAMS {
            return Err(PropertyError::TooManyParams {
                property: info.property,
                count: info.param_count(),
                max: PropertyId::MAX_PARAMS,
            });
        }
        if info.default.data_type() != info.data_type {
            return Err(PropertyError::DefaultTypeMismatch {
                property: info.property,
                expected: info.data_type,
                found: info.default.data_type(),
            });
        }
        if info.prototype.is_valid() {
            self.by_prototype.insert(info.prototype, info.property);
        }
        tracing::trace!(property = %info.property, name = %info.name, "registered property");
        self.infos.insert(info.property, info);
        Ok(())
    }

    /// Append prototypes to the enumerated domain of a prototype param.
    ///
    /// Already-enumerated prototypes keep their position.
    pub fn extend_prototype_domain(
        &mut self,
        property: PropertyEnum,
        index: usize,
        prototypes: impl IntoIterator<Item = PrototypeId>,
    ) -> Result<(), PropertyError> {
        let info = self
            .infos
            .get_mut(&property)
            .ok_or(PropertyError::UnknownProperty { property })?;
        let count = info.params.len();
        let param = info
            .params
            .get_mut(index)
            .filter(|p| p.param_type == PropertyParamType::Prototype)
            .ok_or(PropertyError::ParamIndexOutOfRange {
                property,
                index,
                count,
            })?;
        for prototype in prototypes {
            if !param.domain.contains(&prototype.raw()) {
                param.domain.push(prototype.raw());
            }
        }
        Ok(())
    }

    pub fn lookup(&self, property: PropertyEnum) -> Option<&PropertyInfo> {
        self.infos.get(&property)
    }

    /// Enum generated from a property prototype.
    pub fn enum_from_prototype(&self, prototype: PrototypeId) -> Option<PropertyEnum> {
        self.by_prototype.get(&prototype).copied()
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

/// Schemas of the properties the interpreter reads and writes itself.
fn builtin_infos() -> [PropertyInfo; 3] {
    [
        PropertyInfo::new(
            PropertyEnum::EVAL_LOOP_VAR_PROTO_REF,
            "EvalLoopVarProtoRef",
            PropertyDataType::Prototype,
        )
        .with_param(PropertyParamInfo::integer()),
        PropertyInfo::new(
            PropertyEnum::DIFFICULTY_TIER,
            "DifficultyTier",
            PropertyDataType::Prototype,
        ),
        PropertyInfo::new(
            PropertyEnum::AVATAR_MISSION_STATE,
            "AvatarMissionState",
            PropertyDataType::Integer,
        )
        .with_param(PropertyParamInfo::prototype([])),
    ]
}
