//! Player-scoped upgrades: templates, the resolving center, and ledger
//! records.
//!
//! Each upgrade template owns one bit of a 128-bit [`UpgradeMask`]; the
//! player's ledger mirrors its records into two mask accumulators
//! (in-progress, completed) so "does anyone have X researched" checks are a
//! single mask test. The [`UpgradeCenter`] resolves templates by name, which
//! is how persisted streams reference them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StateError};
use crate::xfer::{Xfer, XferError};

const UPGRADE_VERSION: u8 = 1;

/// Number of distinct upgrade bits available per match.
pub const UPGRADE_MASK_BITS: usize = 128;

/// A 128-bit upgrade membership mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UpgradeMask(u128);

impl UpgradeMask {
    /// Empty mask.
    pub const NONE: Self = Self(0);

    /// Mask with a single bit set.
    ///
    /// # Panics
    /// Panics if `bit` is not below [`UPGRADE_MASK_BITS`].
    #[must_use]
    pub const fn single(bit: u8) -> Self {
        assert!((bit as usize) < UPGRADE_MASK_BITS);
        Self(1u128 << bit)
    }

    /// Whether no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set every bit in `other`.
    pub fn set(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear every bit in `other`.
    pub fn clear(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Clear every bit.
    pub fn clear_all(&mut self) {
        self.0 = 0;
    }

    /// Whether every bit in `test` is set in `self`.
    #[must_use]
    pub const fn test_for_all(self, test: Self) -> bool {
        self.0 & test.0 == test.0
    }

    /// Union of two masks.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Transfer the mask as two little-endian 64-bit words, low word first.
    pub fn xfer_snapshot(&mut self, xfer: &mut Xfer) -> std::result::Result<(), XferError> {
        let mut low = self.0 as u64;
        let mut high = (self.0 >> 64) as u64;
        xfer.xfer_u64(&mut low)?;
        xfer.xfer_u64(&mut high)?;
        self.0 = (u128::from(high) << 64) | u128::from(low);
        Ok(())
    }
}

impl std::ops::BitOr for UpgradeMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

/// Lifecycle state of a ledger record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpgradeStatus {
    /// Placeholder before a real status is assigned (load path).
    #[default]
    Invalid,
    /// Research has been queued and paid for.
    InProduction,
    /// Research finished; effects are live.
    Complete,
}

impl UpgradeStatus {
    /// Wire encoding of this status.
    #[must_use]
    pub const fn to_wire(self) -> i32 {
        match self {
            Self::Invalid => 0,
            Self::InProduction => 1,
            Self::Complete => 2,
        }
    }

    /// Decode a status from its wire encoding.
    pub fn from_wire(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::Invalid),
            1 => Ok(Self::InProduction),
            2 => Ok(Self::Complete),
            other => Err(StateError::CorruptSnapshot(format!(
                "invalid upgrade status {other}"
            ))),
        }
    }
}

/// Definition of a purchasable upgrade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeTemplate {
    /// Unique template name; persisted streams reference upgrades by it.
    pub name: String,
    /// The single mask bit this template owns.
    pub mask: UpgradeMask,
    /// Cash cost to queue the research.
    pub research_cost: u32,
    /// Research duration in logic frames.
    pub research_time: u32,
}

/// Textual upgrade definition, as read from RON data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeDef {
    /// Unique template name.
    pub name: String,
    /// Cash cost to queue the research.
    pub research_cost: u32,
    /// Research duration in logic frames.
    pub research_time: u32,
}

/// Registry of upgrade templates, resolving by name.
///
/// Mask bits are assigned in registration order, so identical data files
/// yield identical masks on every machine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpgradeCenter {
    templates: BTreeMap<String, UpgradeTemplate>,
    registration_order: Vec<String>,
}

impl UpgradeCenter {
    /// Create an empty center.
    #[must_use]
    pub fn new() -> Self {
        Self {
            templates: BTreeMap::new(),
            registration_order: Vec::new(),
        }
    }

    /// Register a template, assigning it the next free mask bit.
    ///
    /// Re-registering an existing name returns the existing template
    /// untouched.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        research_cost: u32,
        research_time: u32,
    ) -> Result<&UpgradeTemplate> {
        let name = name.into();
        if !self.templates.contains_key(&name) {
            let bit = self.registration_order.len();
            if bit >= UPGRADE_MASK_BITS {
                return Err(StateError::DataParse {
                    source_name: name,
                    message: format!("more than {UPGRADE_MASK_BITS} upgrade templates"),
                });
            }
            self.registration_order.push(name.clone());
            self.templates.insert(
                name.clone(),
                UpgradeTemplate {
                    name: name.clone(),
                    mask: UpgradeMask::single(bit as u8),
                    research_cost,
                    research_time,
                },
            );
        }
        Ok(&self.templates[&name])
    }

    /// Look up a template by name.
    #[must_use]
    pub fn find_upgrade(&self, name: &str) -> Option<&UpgradeTemplate> {
        self.templates.get(name)
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no templates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Build a center from a RON list of [`UpgradeDef`] entries.
    pub fn from_ron(source: &str) -> Result<Self> {
        let defs: Vec<UpgradeDef> = ron::from_str(source).map_err(|e| StateError::DataParse {
            source_name: "upgrade definitions".into(),
            message: e.to_string(),
        })?;
        let mut center = Self::new();
        for def in defs {
            center.register(def.name, def.research_cost, def.research_time)?;
        }
        Ok(center)
    }
}

/// One record in a player's upgrade ledger.
///
/// Uniqueness is enforced by template name: a player's ledger holds at most
/// one record per template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upgrade {
    template_name: String,
    mask: UpgradeMask,
    status: UpgradeStatus,
}

impl Upgrade {
    /// Create a record for a template with the given initial status.
    #[must_use]
    pub fn new(template: &UpgradeTemplate, status: UpgradeStatus) -> Self {
        Self {
            template_name: template.name.clone(),
            mask: template.mask,
            status,
        }
    }

    /// Name of the template this record tracks.
    #[must_use]
    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// The template's mask bit.
    #[must_use]
    pub const fn mask(&self) -> UpgradeMask {
        self.mask
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> UpgradeStatus {
        self.status
    }

    /// Set the lifecycle status.
    pub fn set_status(&mut self, status: UpgradeStatus) {
        self.status = status;
    }

    /// Transfer this record's mutable state through a snapshot stream.
    ///
    /// The template name travels separately (the player writes it before
    /// each record so load can resolve the template first).
    pub fn xfer_snapshot(&mut self, xfer: &mut Xfer) -> Result<()> {
        let mut version = UPGRADE_VERSION;
        xfer.xfer_version(&mut version, UPGRADE_VERSION)?;
        let mut raw = self.status.to_wire();
        xfer.xfer_i32(&mut raw)?;
        self.status = UpgradeStatus::from_wire(raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_set_clear_test() {
        let a = UpgradeMask::single(0);
        let b = UpgradeMask::single(100);
        let mut mask = UpgradeMask::NONE;
        mask.set(a);
        mask.set(b);
        assert!(mask.test_for_all(a | b));
        mask.clear(a);
        assert!(!mask.test_for_all(a));
        assert!(mask.test_for_all(b));
    }

    #[test]
    fn test_register_assigns_distinct_bits() {
        let mut center = UpgradeCenter::new();
        let a = center.register("UpgradeComposites", 800, 600).unwrap().mask;
        let b = center.register("UpgradeDrones", 500, 450).unwrap().mask;
        assert_ne!(a, b);
        assert!(!a.test_for_all(b));
    }

    #[test]
    fn test_register_is_idempotent_by_name() {
        let mut center = UpgradeCenter::new();
        let first = center.register("UpgradeComposites", 800, 600).unwrap().mask;
        let (mask, cost) = {
            let again = center.register("UpgradeComposites", 1, 1).unwrap();
            (again.mask, again.research_cost)
        };
        assert_eq!(mask, first);
        assert_eq!(cost, 800);
        assert_eq!(center.len(), 1);
    }

    #[test]
    fn test_find_unknown_is_none() {
        let center = UpgradeCenter::new();
        assert!(center.find_upgrade("UpgradeGhost").is_none());
    }

    #[test]
    fn test_from_ron() {
        let center = UpgradeCenter::from_ron(
            r#"[
                (name: "UpgradeComposites", research_cost: 800, research_time: 600),
                (name: "UpgradeDrones", research_cost: 500, research_time: 450),
            ]"#,
        )
        .unwrap();
        assert_eq!(center.len(), 2);
        assert!(center.find_upgrade("UpgradeDrones").is_some());
    }

    #[test]
    fn test_record_status_roundtrip() {
        let mut center = UpgradeCenter::new();
        let template = center.register("UpgradeComposites", 800, 600).unwrap().clone();
        let mut record = Upgrade::new(&template, UpgradeStatus::Complete);

        let mut save = Xfer::saver();
        record.xfer_snapshot(&mut save).unwrap();

        let mut load = Xfer::loader(save.into_bytes());
        let mut decoded = Upgrade::new(&template, UpgradeStatus::Invalid);
        decoded.xfer_snapshot(&mut load).unwrap();
        assert_eq!(decoded.status(), UpgradeStatus::Complete);
    }
}
