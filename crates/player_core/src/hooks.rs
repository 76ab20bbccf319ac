//! Collaborator contracts the player consumes.
//!
//! The scripting engine and the gameplay-object layer live outside this
//! crate. The player fans notifications out to them through these narrow
//! traits, passed in explicitly per call so tests can substitute recording
//! implementations and nothing reads process-wide state.

use serde::{Deserialize, Serialize};

use crate::player::PlayerIndex;
use crate::science::ScienceId;
use crate::team::{ObjectId, TeamId};

/// Skirmish/campaign difficulty setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameDifficulty {
    /// Reduced pressure.
    Easy,
    /// Baseline.
    #[default]
    Normal,
    /// Increased pressure.
    Hard,
}

impl GameDifficulty {
    /// Wire encoding of this difficulty.
    #[must_use]
    pub const fn to_wire(self) -> i32 {
        match self {
            Self::Easy => 0,
            Self::Normal => 1,
            Self::Hard => 2,
        }
    }

    /// Decode a difficulty, clamping unknown values to `Normal`.
    #[must_use]
    pub const fn from_wire(value: i32) -> Self {
        match value {
            0 => Self::Easy,
            2 => Self::Hard,
            _ => Self::Normal,
        }
    }
}

/// Scripting-engine notifications and queries.
pub trait ScriptHooks {
    /// Current match difficulty, used when the player has no AI of its own.
    fn difficulty(&self) -> GameDifficulty;

    /// A player's acquired-science set gained `science`.
    fn science_acquired(&mut self, player: PlayerIndex, science: ScienceId);

    /// An object was created or destroyed somewhere (scorekeeping trigger).
    fn object_count_changed(&mut self);
}

/// Gameplay-object and UI notifications the player fans out.
pub trait WorldHooks {
    /// Re-evaluate upgrade-driven behavior modules on one object.
    fn refresh_upgrade_modules(&mut self, object: ObjectId);

    /// A previously completed upgrade was removed from a player.
    fn upgrade_removed(&mut self, player: PlayerIndex);

    /// Arm any special power on `object` gated by `science`, stamping its
    /// ready frame.
    fn arm_special_power(&mut self, object: ObjectId, science: ScienceId, ready_frame: u32);

    /// The command UI should refresh for this player.
    fn mark_ui_dirty(&mut self);

    /// Advance the player's AI one tick.
    fn update_ai(&mut self, player: PlayerIndex);

    /// Run a team's generic scripts for this tick.
    fn update_team_scripts(&mut self, team: TeamId);

    /// A player's power state crossed the brown-out threshold.
    fn power_brownout_changed(&mut self, player: PlayerIndex, browned_out: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_wire_roundtrip() {
        for difficulty in [
            GameDifficulty::Easy,
            GameDifficulty::Normal,
            GameDifficulty::Hard,
        ] {
            assert_eq!(GameDifficulty::from_wire(difficulty.to_wire()), difficulty);
        }
        assert_eq!(GameDifficulty::from_wire(99), GameDifficulty::Normal);
    }
}
