//! Battle-plan bonus bundles.
//!
//! A strategy center can put one of three battle plans into effect; the
//! resulting stat bundle lives on the player as an optional owned struct
//! whose presence itself is meaningful and is transmitted in snapshots.

use serde::{Deserialize, Serialize};

use crate::kind_of::KindOfFlags;
use crate::math::{fixed_serde, Fixed};
use crate::xfer::{Xfer, XferError};

/// Number of battle-plan slots tracked per player.
pub const BATTLE_PLAN_SLOTS: usize = 3;

/// Battle-plan slot indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePlan {
    /// Artillery barrage support.
    Bombardment,
    /// Defensive posture.
    HoldTheLine,
    /// Aggressive sweep.
    SearchAndDestroy,
}

impl BattlePlan {
    /// Slot index of this plan.
    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            Self::Bombardment => 0,
            Self::HoldTheLine => 1,
            Self::SearchAndDestroy => 2,
        }
    }
}

/// Stat-modifier bundle applied to qualifying owned objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlePlanBonuses {
    /// Armor multiplier.
    #[serde(with = "fixed_serde")]
    pub armor_bonus: Fixed,
    /// Sight-range multiplier.
    #[serde(with = "fixed_serde")]
    pub sight_bonus: Fixed,
    /// Outstanding bombardment plan applications.
    pub bombardment: i32,
    /// Outstanding hold-the-line plan applications.
    pub hold_the_line: i32,
    /// Outstanding search-and-destroy plan applications.
    pub search_and_destroy: i32,
    /// Objects must share a tag with this set to qualify.
    pub valid_kind_of: KindOfFlags,
    /// Objects sharing a tag with this set never qualify.
    pub invalid_kind_of: KindOfFlags,
}

impl Default for BattlePlanBonuses {
    fn default() -> Self {
        Self {
            armor_bonus: Fixed::ONE,
            sight_bonus: Fixed::ONE,
            bombardment: 0,
            hold_the_line: 0,
            search_and_destroy: 0,
            valid_kind_of: KindOfFlags::NONE,
            invalid_kind_of: KindOfFlags::NONE,
        }
    }
}

impl BattlePlanBonuses {
    /// Whether an object with the given tags qualifies for these bonuses.
    #[must_use]
    pub fn qualifies(&self, kind_of: KindOfFlags) -> bool {
        kind_of.intersects(self.valid_kind_of) && !kind_of.intersects(self.invalid_kind_of)
    }

    /// Transfer the bundle's fields through a snapshot stream.
    ///
    /// Presence is the owner's concern: the player writes the flag before
    /// calling this.
    pub fn xfer_snapshot(&mut self, xfer: &mut Xfer) -> Result<(), XferError> {
        xfer.xfer_real(&mut self.armor_bonus)?;
        xfer.xfer_real(&mut self.sight_bonus)?;
        xfer.xfer_i32(&mut self.bombardment)?;
        xfer.xfer_i32(&mut self.hold_the_line)?;
        xfer.xfer_i32(&mut self.search_and_destroy)?;
        self.valid_kind_of.xfer_snapshot(xfer)?;
        self.invalid_kind_of.xfer_snapshot(xfer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualification_filters() {
        let bonuses = BattlePlanBonuses {
            valid_kind_of: KindOfFlags::INFANTRY | KindOfFlags::VEHICLE,
            invalid_kind_of: KindOfFlags::AIRCRAFT,
            ..BattlePlanBonuses::default()
        };

        assert!(bonuses.qualifies(KindOfFlags::INFANTRY));
        assert!(!bonuses.qualifies(KindOfFlags::STRUCTURE));
        assert!(!bonuses.qualifies(KindOfFlags::VEHICLE | KindOfFlags::AIRCRAFT));
    }

    #[test]
    fn test_xfer_roundtrip() {
        let mut bonuses = BattlePlanBonuses {
            armor_bonus: Fixed::from_num(1.1),
            sight_bonus: Fixed::from_num(1.25),
            bombardment: 1,
            hold_the_line: 0,
            search_and_destroy: 2,
            valid_kind_of: KindOfFlags::INFANTRY,
            invalid_kind_of: KindOfFlags::STRUCTURE,
        };

        let mut save = Xfer::saver();
        bonuses.xfer_snapshot(&mut save).unwrap();

        let mut load = Xfer::loader(save.into_bytes());
        let mut decoded = BattlePlanBonuses::default();
        decoded.xfer_snapshot(&mut load).unwrap();
        assert_eq!(decoded, bonuses);
    }
}
