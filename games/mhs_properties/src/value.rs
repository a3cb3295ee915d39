//! Typed property values.

use std::fmt;

use mhs_gamedata::{AssetId, EntityId, PrototypeId, RegionId};

/// Declared storage type of a property.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyDataType {
    Boolean,
    Real,
    Integer,
    Prototype,
    Asset,
    EntityId,
    RegionId,
    Time,
}

impl fmt::Display for PropertyDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A duration with millisecond resolution.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSpan(i64);

impl TimeSpan {
    pub const ZERO: TimeSpan = TimeSpan(0);

    #[inline]
    pub const fn from_millis(ms: i64) -> Self {
        TimeSpan(ms)
    }

    #[inline]
    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

/// A property value tagged with its storage type.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyValue {
    Boolean(bool),
    Real(f32),
    Integer(i64),
    Prototype(PrototypeId),
    Asset(AssetId),
    EntityId(EntityId),
    RegionId(RegionId),
    Time(TimeSpan),
}

impl PropertyValue {
    /// Storage type of this value.
    pub fn data_type(self) -> PropertyDataType {
        match self {
            PropertyValue::Boolean(_) => PropertyDataType::Boolean,
            PropertyValue::Real(_) => PropertyDataType::Real,
            PropertyValue::Integer(_) => PropertyDataType::Integer,
            PropertyValue::Prototype(_) => PropertyDataType::Prototype,
            PropertyValue::Asset(_) => PropertyDataType::Asset,
            PropertyValue::EntityId(_) => PropertyDataType::EntityId,
            PropertyValue::RegionId(_) => PropertyDataType::RegionId,
            PropertyValue::Time(_) => PropertyDataType::Time,
        }
    }

    /// The zero value of a storage type.
    pub fn zero(data_type: PropertyDataType) -> Self {
        match data_type {
            PropertyDataType::Boolean => PropertyValue::Boolean(false),
            PropertyDataType::Real => PropertyValue::Real(0.0),
            PropertyDataType::Integer => PropertyValue::Integer(0),
            PropertyDataType::Prototype => PropertyValue::Prototype(PrototypeId::INVALID),
            PropertyDataType::Asset => PropertyValue::Asset(AssetId::INVALID),
            PropertyDataType::EntityId => PropertyValue::EntityId(EntityId::INVALID),
            PropertyDataType::RegionId => PropertyValue::RegionId(RegionId::INVALID),
            PropertyDataType::Time => PropertyValue::Time(TimeSpan::ZERO),
        }
    }

    pub fn as_integer(self) -> Option<i64> {
        match self {
            PropertyValue::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_real(self) -> Option<f32> {
        match self {
            PropertyValue::Real(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_prototype(self) -> Option<PrototypeId> {
        match self {
            PropertyValue::Prototype(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_asset(self) -> Option<AssetId> {
        match self {
            PropertyValue::Asset(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_entity_id(self) -> Option<EntityId> {
        match self {
            PropertyValue::EntityId(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_region_id(self) -> Option<RegionId> {
        match self {
            PropertyValue::RegionId(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_time(self) -> Option<TimeSpan> {
        match self {
            PropertyValue::Time(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Boolean(v)
    }
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        PropertyValue::Real(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Integer(v)
    }
}

impl From<PrototypeId> for PropertyValue {
    fn from(v: PrototypeId) -> Self {
        PropertyValue::Prototype(v)
    }
}

impl From<AssetId> for PropertyValue {
    fn from(v: AssetId) -> Self {
        PropertyValue::Asset(v)
    }
}

impl From<EntityId> for PropertyValue {
    fn from(v: EntityId) -> Self {
        PropertyValue::EntityId(v)
    }
}

impl From<RegionId> for PropertyValue {
    fn from(v: RegionId) -> Self {
        PropertyValue::RegionId(v)
    }
}

impl From<TimeSpan> for PropertyValue {
    fn from(v: TimeSpan) -> Self {
        PropertyValue::Time(v)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Boolean(v) => write!(f, "{v}"),
            PropertyValue::Real(v) => write!(f, "{v}"),
            PropertyValue::Integer(v) => write!(f, "{v}"),
            PropertyValue::Prototype(v) => write!(f, "{v:?}"),
            PropertyValue::Asset(v) => write!(f, "{v:?}"),
            PropertyValue::EntityId(v) => write!(f, "{v:?}"),
            PropertyValue::RegionId(v) => write!(f, "{v:?}"),
            PropertyValue::Time(v) => write!(f, "{}ms", v.as_millis()),
        }
    }
}
