//! Inventory categories addressed by data.

use std::fmt;

/// Named inventory category an entity can own.
///
/// `None` is the "unset" value found in data that forgot to pick a label;
/// lookups against it are always rejected.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InventoryConvenienceLabel {
    #[default]
    None,
    AvatarLibrary,
    Costume,
    General,
    Crafting,
    Consumables,
    DeliveryBox,
    ErrorRecovery,
    PvP,
    Summoned,
    Controlled,
    TeamUpLibrary,
    TeamUpGeneral,
    UIItems,
}

impl InventoryConvenienceLabel {
    /// Whether this label names a real category.
    pub fn is_set(self) -> bool {
        self != InventoryConvenienceLabel::None
    }
}

impl fmt::Display for InventoryConvenienceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
