//! Capability-tag flag sets for bulk rule matching.
//!
//! Every unit/structure template carries a set of kind-of tags ("structure",
//! "vehicle", ...). Player-level rules — production cost changes, battle-plan
//! filters, build permissions — match whole categories of templates through
//! these sets instead of naming templates individually.

use serde::{Deserialize, Serialize};

use crate::xfer::{Xfer, XferError};

/// A 128-bit capability-tag set.
///
/// # Example
///
/// ```
/// use player_core::kind_of::KindOfFlags;
///
/// let tags = KindOfFlags::VEHICLE.union(KindOfFlags::SELECTABLE);
/// assert!(tags.contains_all(KindOfFlags::VEHICLE));
/// assert!(tags.intersects(KindOfFlags::SELECTABLE));
/// assert!(!tags.contains_all(KindOfFlags::STRUCTURE));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KindOfFlags(u128);

impl KindOfFlags {
    // ========================================
    // Broad template classes
    // ========================================

    /// Fixed structure.
    pub const STRUCTURE: Self = Self(1 << 0);
    /// Foot soldier.
    pub const INFANTRY: Self = Self(1 << 1);
    /// Ground vehicle.
    pub const VEHICLE: Self = Self(1 << 2);
    /// Aircraft.
    pub const AIRCRAFT: Self = Self(1 << 3);
    /// Watercraft.
    pub const BOAT: Self = Self(1 << 4);

    // ========================================
    // Economic / production roles
    // ========================================

    /// Gathers supplies.
    pub const HARVESTER: Self = Self(1 << 5);
    /// Can construct structures.
    pub const DOZER: Self = Self(1 << 6);
    /// Produces units.
    pub const FACTORY: Self = Self(1 << 7);
    /// Supply depot / drop-off point.
    pub const CASH_GENERATOR: Self = Self(1 << 8);
    /// Generates power.
    pub const POWER_SOURCE: Self = Self(1 << 9);

    // ========================================
    // Battlefield roles
    // ========================================

    /// Counts as a base defense.
    pub const BASE_DEFENSE: Self = Self(1 << 10);
    /// Long-range siege weapon.
    pub const ARTILLERY: Self = Self(1 << 11);
    /// Anti-air capable.
    pub const ANTI_AIR: Self = Self(1 << 12);
    /// Transports other units.
    pub const TRANSPORT: Self = Self(1 << 13);
    /// Hero/commando unit.
    pub const HERO: Self = Self(1 << 14);
    /// Can disguise as another template.
    pub const DISGUISER: Self = Self(1 << 15);

    // ========================================
    // Selection / scoring
    // ========================================

    /// Player-selectable.
    pub const SELECTABLE: Self = Self(1 << 16);
    /// Counts toward score.
    pub const SCORE: Self = Self(1 << 17);
    /// Ignored by victory conditions.
    pub const IGNORED_IN_GUI: Self = Self(1 << 18);

    /// Empty set (no tags).
    pub const NONE: Self = Self(0);

    /// Empty set (no tags).
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Whether no tags are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Union of two sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Intersection of two sets.
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Whether any tag is shared with `other`.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether every tag in `other` is present in `self`.
    #[must_use]
    pub const fn contains_all(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set every tag in `other`.
    pub fn set(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear every tag in `other`.
    pub fn clear(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// The matching test used by category rule accumulation.
    ///
    /// True when `required` is non-empty, every `required` tag is present,
    /// and no `excluded` tag is present. Each rule entry is tested against
    /// the same unmodified set, so entries with overlapping or identical
    /// filters each match independently.
    #[must_use]
    pub const fn test_set_and_clear(self, required: Self, excluded: Self) -> bool {
        !required.is_empty() && self.contains_all(required) && !self.intersects(excluded)
    }

    /// Transfer the set as two little-endian 64-bit words, low word first.
    pub fn xfer_snapshot(&mut self, xfer: &mut Xfer) -> Result<(), XferError> {
        let mut low = self.0 as u64;
        let mut high = (self.0 >> 64) as u64;
        xfer.xfer_u64(&mut low)?;
        xfer.xfer_u64(&mut high)?;
        self.0 = (u128::from(high) << 64) | u128::from(low);
        Ok(())
    }
}

impl std::ops::BitOr for KindOfFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_and_contains() {
        let tags = KindOfFlags::STRUCTURE | KindOfFlags::BASE_DEFENSE;
        assert!(tags.contains_all(KindOfFlags::STRUCTURE));
        assert!(tags.contains_all(KindOfFlags::STRUCTURE | KindOfFlags::BASE_DEFENSE));
        assert!(!tags.contains_all(KindOfFlags::VEHICLE));
    }

    #[test]
    fn test_set_and_clear() {
        let mut tags = KindOfFlags::VEHICLE;
        tags.set(KindOfFlags::ANTI_AIR);
        assert!(tags.intersects(KindOfFlags::ANTI_AIR));
        tags.clear(KindOfFlags::VEHICLE);
        assert_eq!(tags, KindOfFlags::ANTI_AIR);
    }

    #[test]
    fn test_match_requires_all_required_tags() {
        let queried = KindOfFlags::VEHICLE | KindOfFlags::ANTI_AIR;
        assert!(queried.test_set_and_clear(KindOfFlags::VEHICLE, KindOfFlags::NONE));
        assert!(queried.test_set_and_clear(
            KindOfFlags::VEHICLE | KindOfFlags::ANTI_AIR,
            KindOfFlags::NONE
        ));
        assert!(!queried.test_set_and_clear(
            KindOfFlags::VEHICLE | KindOfFlags::STRUCTURE,
            KindOfFlags::NONE
        ));
    }

    #[test]
    fn test_match_rejects_excluded_tags() {
        let queried = KindOfFlags::VEHICLE | KindOfFlags::HERO;
        assert!(!queried.test_set_and_clear(KindOfFlags::VEHICLE, KindOfFlags::HERO));
    }

    #[test]
    fn test_empty_filter_never_matches() {
        let queried = KindOfFlags::VEHICLE;
        assert!(!queried.test_set_and_clear(KindOfFlags::NONE, KindOfFlags::NONE));
    }

    #[test]
    fn test_xfer_roundtrip() {
        let mut original = KindOfFlags::STRUCTURE | KindOfFlags::SCORE;
        let mut save = crate::xfer::Xfer::saver();
        original.xfer_snapshot(&mut save).unwrap();

        let mut load = crate::xfer::Xfer::loader(save.into_bytes());
        let mut decoded = KindOfFlags::empty();
        decoded.xfer_snapshot(&mut load).unwrap();
        assert_eq!(decoded, original);
    }
}
