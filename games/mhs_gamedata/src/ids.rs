//! Stable 64-bit identifiers for game data and runtime entities.
//!
//! Every id is a transparent newtype over `u64`. The raw value `0` is the
//! invalid sentinel for all of them, matching how the data files encode
//! "no reference".

use std::fmt;

/// Define a `u64`-backed id newtype with an `INVALID` sentinel.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Invalid id (sentinel value).
            pub const INVALID: $name = $name(0);

            /// Create from a raw value.
            #[inline]
            pub const fn new(raw: u64) -> Self {
                $name(raw)
            }

            /// Get the raw value.
            #[inline]
            pub const fn raw(self) -> u64 {
                self.0
            }

            /// Check if this is a valid id.
            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!(stringify!($name), "({})"), self.0)
                } else {
                    write!(f, concat!(stringify!($name), "::INVALID"))
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            #[inline]
            fn from(raw: u64) -> Self {
                $name(raw)
            }
        }
    };
}

define_id!(
    /// Reference to a data prototype (an authored record in the game database).
    PrototypeId
);

define_id!(
    /// Reference to an asset (art, sound, localized name, enum-like value).
    AssetId
);

define_id!(
    /// Reference to a numeric curve.
    CurveId
);

define_id!(
    /// Reference to a blueprint, the type descriptor that prototypes derive from.
    BlueprintId
);

define_id!(
    /// Runtime id of an entity inside one game instance.
    EntityId
);

define_id!(
    /// Runtime id of a region inside one game instance.
    RegionId
);

define_id!(
    /// Durable database guid of an entity, stable across sessions.
    DbGuid
);
