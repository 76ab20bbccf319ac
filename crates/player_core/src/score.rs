//! Per-player score bookkeeping.

use serde::{Deserialize, Serialize};

use crate::player::PlayerIndex;
use crate::xfer::{Xfer, XferError};

const SCORE_KEEPER_VERSION: u8 = 1;

/// Build/loss counters feeding the end-of-match score screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreKeeper {
    player_index: PlayerIndex,
    /// Units produced by this player.
    pub units_built: u32,
    /// Units of this player destroyed by anyone.
    pub units_lost: u32,
    /// Enemy units destroyed by this player.
    pub units_destroyed: u32,
    /// Structures completed by this player.
    pub buildings_built: u32,
    /// Structures of this player destroyed.
    pub buildings_lost: u32,
    /// Enemy structures destroyed by this player.
    pub buildings_destroyed: u32,
    /// Total cash earned over the match.
    pub money_earned: u32,
    /// Total cash spent over the match.
    pub money_spent: u32,
}

impl ScoreKeeper {
    /// Reset every counter for a fresh match.
    pub fn reset(&mut self, player_index: PlayerIndex) {
        *self = Self {
            player_index,
            ..Self::default()
        };
    }

    /// The player these counters belong to.
    #[must_use]
    pub const fn player_index(&self) -> PlayerIndex {
        self.player_index
    }

    /// Record a produced unit.
    pub fn add_unit_built(&mut self) {
        self.units_built += 1;
    }

    /// Record a completed structure.
    pub fn add_building_built(&mut self) {
        self.buildings_built += 1;
    }

    /// Retract a structure that was sold or cancelled before completion.
    pub fn remove_building_built(&mut self) {
        self.buildings_built = self.buildings_built.saturating_sub(1);
    }

    /// Transfer the counters through a snapshot stream.
    pub fn xfer_snapshot(&mut self, xfer: &mut Xfer) -> Result<(), XferError> {
        let mut version = SCORE_KEEPER_VERSION;
        xfer.xfer_version(&mut version, SCORE_KEEPER_VERSION)?;
        let mut index = i32::from(self.player_index.0);
        xfer.xfer_i32(&mut index)?;
        self.player_index = PlayerIndex(index as u8);
        xfer.xfer_u32(&mut self.units_built)?;
        xfer.xfer_u32(&mut self.units_lost)?;
        xfer.xfer_u32(&mut self.units_destroyed)?;
        xfer.xfer_u32(&mut self.buildings_built)?;
        xfer.xfer_u32(&mut self.buildings_lost)?;
        xfer.xfer_u32(&mut self.buildings_destroyed)?;
        xfer.xfer_u32(&mut self.money_earned)?;
        xfer.xfer_u32(&mut self.money_spent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_clears_counters() {
        let mut score = ScoreKeeper::default();
        score.add_unit_built();
        score.add_building_built();
        score.reset(PlayerIndex(3));
        assert_eq!(score.units_built, 0);
        assert_eq!(score.buildings_built, 0);
        assert_eq!(score.player_index(), PlayerIndex(3));
    }

    #[test]
    fn test_remove_building_built_saturates() {
        let mut score = ScoreKeeper::default();
        score.remove_building_built();
        assert_eq!(score.buildings_built, 0);
    }

    #[test]
    fn test_xfer_roundtrip() {
        let mut score = ScoreKeeper::default();
        score.reset(PlayerIndex(2));
        score.add_unit_built();
        score.add_unit_built();
        score.add_building_built();

        let mut save = Xfer::saver();
        score.xfer_snapshot(&mut save).unwrap();

        let mut load = Xfer::loader(save.into_bytes());
        let mut decoded = ScoreKeeper::default();
        decoded.xfer_snapshot(&mut load).unwrap();
        assert_eq!(decoded, score);
    }
}
