//! Property keys.
//!
//! A [`PropertyId`] packs a [`PropertyEnum`] discriminator and up to four
//! [`PropertyParam`]s into a single `u64`, so collections can order and
//! compare keys as plain integers.
//!
//! Layout (most significant first):
//!
//! ```text
//! | enum: 16 | param0: 12 | param1: 12 | param2: 12 | param3: 12 |
//! ```

use std::fmt;

use crate::PropertyError;

/// Property discriminator: which fact a property describes.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct PropertyEnum(u16);

impl PropertyEnum {
    pub const INVALID: PropertyEnum = PropertyEnum(0);
    /// Current element of a `ForEachProtoRefInContextRefList` loop, one integer param.
    pub const EVAL_LOOP_VAR_PROTO_REF: PropertyEnum = PropertyEnum(1);
    /// Difficulty tier prototype of a region or spawn context.
    pub const DIFFICULTY_TIER: PropertyEnum = PropertyEnum(2);
    /// Per-avatar mission state, keyed by the mission prototype param.
    pub const AVATAR_MISSION_STATE: PropertyEnum = PropertyEnum(3);

    #[inline]
    pub const fn new(raw: u16) -> Self {
        PropertyEnum(raw)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for PropertyEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyEnum({})", self.0)
    }
}

impl fmt::Display for PropertyEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "property #{}", self.0)
    }
}

/// One parameter of a [`PropertyId`], limited to [`PropertyParam::BITS`] bits.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct PropertyParam(u16);

impl PropertyParam {
    pub const BITS: u32 = 12;
    pub const MAX: u16 = (1 << Self::BITS) - 1;
    pub const ZERO: PropertyParam = PropertyParam(0);

    /// Create a param, rejecting values that do not fit in the packed layout.
    pub fn new(value: i64) -> Result<Self, PropertyError> {
        match u16::try_from(value) {
            Ok(v) if v <= Self::MAX => Ok(PropertyParam(v)),
            _ => Err(PropertyError::ParamOutOfRange {
                value,
                bits: Self::BITS,
            }),
        }
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

/// Composite property key: an enum plus four params.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct PropertyId(u64);

impl PropertyId {
    pub const MAX_PARAMS: usize = 4;
    pub const INVALID: PropertyId = PropertyId(0);

    const ENUM_SHIFT: u32 = 48;
    const PARAM_MASK: u64 = PropertyParam::MAX as u64;

    /// Key for a property with all params zero.
    #[inline]
    pub const fn new(property: PropertyEnum) -> Self {
        PropertyId((property.0 as u64) << Self::ENUM_SHIFT)
    }

    /// Key for a parameterized property.
    pub fn with_params(property: PropertyEnum, params: [PropertyParam; Self::MAX_PARAMS]) -> Self {
        let mut raw = u64::from(property.0) << Self::ENUM_SHIFT;
        for (index, param) in params.iter().enumerate() {
            raw |= u64::from(param.0) << Self::param_shift(index);
        }
        PropertyId(raw)
    }

    /// Key with only the first param set.
    pub fn with_param(property: PropertyEnum, param0: PropertyParam) -> Self {
        Self::with_params(
            property,
            [param0, PropertyParam::ZERO, PropertyParam::ZERO, PropertyParam::ZERO],
        )
    }

    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        PropertyId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// The discriminator part of the key.
    #[inline]
    pub const fn property_enum(self) -> PropertyEnum {
        PropertyEnum((self.0 >> Self::ENUM_SHIFT) as u16)
    }

    /// Param at `index`, or `None` past [`Self::MAX_PARAMS`].
    pub fn param(self, index: usize) -> Option<PropertyParam> {
        if index >= Self::MAX_PARAMS {
            return None;
        }
        let value = (self.0 >> Self::param_shift(index)) & Self::PARAM_MASK;
        Some(PropertyParam(value as u16))
    }

    /// All four params in order.
    pub fn params(self) -> [PropertyParam; Self::MAX_PARAMS] {
        let mut params = [PropertyParam::ZERO; Self::MAX_PARAMS];
        for (index, slot) in params.iter_mut().enumerate() {
            let value = (self.0 >> Self::param_shift(index)) & Self::PARAM_MASK;
            *slot = PropertyParam(value as u16);
        }
        params
    }

    #[inline]
    fn param_shift(index: usize) -> u32 {
        // param0 sits directly below the enum bits.
        Self::ENUM_SHIFT - PropertyParam::BITS * (index as u32 + 1)
    }
}

impl From<PropertyEnum> for PropertyId {
    fn from(property: PropertyEnum) -> Self {
        PropertyId::new(property)
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return f.write_str("PropertyId::INVALID");
        }
        let [p0, p1, p2, p3] = self.params();
        write!(
            f,
            "PropertyId({}, [{}, {}, {}, {}])",
            self.property_enum().0,
            p0.0,
            p1.0,
            p2.0,
            p3.0
        )
    }
}
