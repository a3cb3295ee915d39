//! Mission prototypes and runtime mission state.

use std::fmt;

use crate::PrototypeId;

/// Lifecycle state of a mission for one player (or one avatar).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MissionState {
    #[default]
    Invalid,
    Inactive,
    Available,
    Active,
    Completed,
    Failed,
}

impl MissionState {
    /// Decode the integer form stored in property collections.
    ///
    /// Unknown values decode to `Invalid`.
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            1 => MissionState::Inactive,
            2 => MissionState::Available,
            3 => MissionState::Active,
            4 => MissionState::Completed,
            5 => MissionState::Failed,
            _ => MissionState::Invalid,
        }
    }

    /// Integer form stored in property collections.
    pub fn to_raw(self) -> i64 {
        match self {
            MissionState::Invalid => 0,
            MissionState::Inactive => 1,
            MissionState::Available => 2,
            MissionState::Active => 3,
            MissionState::Completed => 4,
            MissionState::Failed => 5,
        }
    }
}

impl fmt::Display for MissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissionState::Invalid => "Invalid",
            MissionState::Inactive => "Inactive",
            MissionState::Available => "Available",
            MissionState::Active => "Active",
            MissionState::Completed => "Completed",
            MissionState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// The slice of a mission prototype that rule evaluation needs.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MissionPrototype {
    pub id: PrototypeId,
    /// Cleared for content that is not approved for the current build.
    pub approved_for_use: bool,
    /// Live tuning can switch a mission off without a data push.
    pub live_tuning_enabled: bool,
    /// Whether progress is tracked per avatar instead of per player.
    pub save_state_per_avatar: bool,
}

impl MissionPrototype {
    /// An approved, enabled, player-scoped mission.
    pub fn new(id: PrototypeId) -> Self {
        MissionPrototype {
            id,
            approved_for_use: true,
            live_tuning_enabled: true,
            save_state_per_avatar: false,
        }
    }

    /// Whether the mission may currently be offered or tracked.
    pub fn is_enabled(&self) -> bool {
        self.approved_for_use && self.live_tuning_enabled
    }
}
