//! Science (tech-tree unlock) and rank metadata stores.
//!
//! A science is an unlockable ability node with a purchase cost, optional
//! prerequisites, and a grantability flag; ranks are general levels that
//! gate skill-point thresholds, grant purchase points, and grant sciences.
//! Both stores are data-driven and RON-loadable in the manner of the rest
//! of the game's definition data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, StateError};
use crate::xfer::{Xfer, XferError, XferMode};

/// Identifier of a science node.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ScienceId(pub u32);

impl ScienceId {
    /// Sentinel for "no science".
    pub const INVALID: Self = Self(u32::MAX);

    /// Whether this id refers to an actual science.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    /// Transfer this id through a snapshot stream.
    pub fn xfer(&mut self, xfer: &mut Xfer) -> std::result::Result<(), XferError> {
        xfer.xfer_u32(&mut self.0)
    }
}

/// Transfer a science list: u16 count, then each id.
///
/// Load replaces the list's contents.
pub fn xfer_science_vec(
    xfer: &mut Xfer,
    sciences: &mut Vec<ScienceId>,
) -> std::result::Result<(), XferError> {
    let count = xfer.xfer_count(sciences.len())?;
    match xfer.mode() {
        XferMode::Save => {
            for science in sciences {
                science.xfer(xfer)?;
            }
        }
        XferMode::Load => {
            sciences.clear();
            for _ in 0..count {
                let mut science = ScienceId::default();
                science.xfer(xfer)?;
                sciences.push(science);
            }
        }
    }
    Ok(())
}

/// Purchase-screen availability override for a science.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScienceAvailability {
    /// Normally purchasable.
    Available,
    /// Visible but not purchasable.
    Disabled,
    /// Not shown at all.
    Hidden,
}

impl ScienceAvailability {
    /// Parse an availability keyword, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("Available") {
            Some(Self::Available)
        } else if value.eq_ignore_ascii_case("Disabled") {
            Some(Self::Disabled)
        } else if value.eq_ignore_ascii_case("Hidden") {
            Some(Self::Hidden)
        } else {
            None
        }
    }
}

/// Definition of one science node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScienceInfo {
    /// Identifier, unique within the store.
    pub id: ScienceId,
    /// Internal name ("SCIENCE_...") used by data files and scripts.
    pub name: String,
    /// Purchase-point cost; 0 means the science cannot be bought directly.
    pub purchase_cost: i32,
    /// Sciences that must all be known before purchase.
    pub prerequisites: Vec<ScienceId>,
    /// Whether scripts may grant this science outright.
    pub grantable: bool,
}

/// Registry of science definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScienceStore {
    infos: BTreeMap<ScienceId, ScienceInfo>,
    by_name: BTreeMap<String, ScienceId>,
}

impl ScienceStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a science definition, replacing any previous entry with the
    /// same id.
    pub fn register(&mut self, info: ScienceInfo) {
        self.by_name.insert(info.name.clone(), info.id);
        self.infos.insert(info.id, info);
    }

    /// Look up a science by id.
    #[must_use]
    pub fn find(&self, id: ScienceId) -> Option<&ScienceInfo> {
        self.infos.get(&id)
    }

    /// Look up a science id by internal name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<ScienceId> {
        self.by_name.get(name).copied()
    }

    /// Purchase cost of a science; unknown sciences cost 0 (not buyable).
    #[must_use]
    pub fn purchase_cost(&self, id: ScienceId) -> i32 {
        self.infos.get(&id).map_or(0, |info| info.purchase_cost)
    }

    /// Whether scripts may grant a science outright.
    #[must_use]
    pub fn is_grantable(&self, id: ScienceId) -> bool {
        self.infos.get(&id).is_some_and(|info| info.grantable)
    }

    /// Whether a science's prerequisites are all present in `known`.
    ///
    /// Unknown sciences have no prerequisites to fail.
    #[must_use]
    pub fn has_prerequisites(&self, known: &[ScienceId], id: ScienceId) -> bool {
        self.infos.get(&id).map_or(true, |info| {
            info.prerequisites.iter().all(|p| known.contains(p))
        })
    }

    /// Number of registered sciences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Whether no sciences are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Build a store from a RON list of [`ScienceInfo`] entries.
    pub fn from_ron(source: &str) -> Result<Self> {
        let infos: Vec<ScienceInfo> = ron::from_str(source).map_err(|e| StateError::DataParse {
            source_name: "science definitions".into(),
            message: e.to_string(),
        })?;
        let mut store = Self::new();
        for info in infos {
            store.register(info);
        }
        Ok(store)
    }
}

/// Metadata for one general rank level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankInfo {
    /// Rank level, 1-based.
    pub level: i32,
    /// Accumulated skill points required to reach this level.
    pub skill_points_needed: i32,
    /// Science purchase points granted on reaching this level.
    pub science_purchase_points_granted: i32,
    /// Sciences granted on reaching this level.
    pub sciences_granted: Vec<ScienceId>,
}

/// Registry of rank metadata, indexed by 1-based level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankInfoStore {
    ranks: Vec<RankInfo>,
}

impl RankInfoStore {
    /// Create an empty store (every lookup yields `None`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rank metadata for the next level.
    ///
    /// Levels are implicit in append order: the first call defines level 1.
    pub fn push_rank(
        &mut self,
        skill_points_needed: i32,
        science_purchase_points_granted: i32,
        sciences_granted: Vec<ScienceId>,
    ) {
        let level = self.ranks.len() as i32 + 1;
        self.ranks.push(RankInfo {
            level,
            skill_points_needed,
            science_purchase_points_granted,
            sciences_granted,
        });
    }

    /// Metadata for a 1-based level, `None` past the top rank.
    #[must_use]
    pub fn rank_info(&self, level: i32) -> Option<&RankInfo> {
        if level < 1 {
            return None;
        }
        self.ranks.get((level - 1) as usize)
    }

    /// Highest defined rank level (0 if the table is empty).
    #[must_use]
    pub fn max_rank_level(&self) -> i32 {
        self.ranks.len() as i32
    }

    /// Build a store from a RON list of [`RankInfo`] entries.
    ///
    /// Entries must be listed in level order starting at 1.
    pub fn from_ron(source: &str) -> Result<Self> {
        let ranks: Vec<RankInfo> = ron::from_str(source).map_err(|e| StateError::DataParse {
            source_name: "rank definitions".into(),
            message: e.to_string(),
        })?;
        for (i, rank) in ranks.iter().enumerate() {
            if rank.level != i as i32 + 1 {
                return Err(StateError::DataParse {
                    source_name: "rank definitions".into(),
                    message: format!("rank at position {i} declares level {}", rank.level),
                });
            }
        }
        Ok(Self { ranks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(names: &[(&str, i32, bool)]) -> ScienceStore {
        let mut store = ScienceStore::new();
        for (i, (name, cost, grantable)) in names.iter().enumerate() {
            store.register(ScienceInfo {
                id: ScienceId(i as u32),
                name: (*name).to_string(),
                purchase_cost: *cost,
                prerequisites: Vec::new(),
                grantable: *grantable,
            });
        }
        store
    }

    #[test]
    fn test_lookup_by_name_and_id() {
        let store = store_with(&[("SCIENCE_RapidDeploy", 1, true)]);
        let id = store.find_by_name("SCIENCE_RapidDeploy").unwrap();
        assert_eq!(store.find(id).unwrap().purchase_cost, 1);
    }

    #[test]
    fn test_unknown_science_costs_zero() {
        let store = ScienceStore::new();
        assert_eq!(store.purchase_cost(ScienceId(99)), 0);
        assert!(!store.is_grantable(ScienceId(99)));
    }

    #[test]
    fn test_prerequisites() {
        let mut store = store_with(&[("SCIENCE_Base", 1, true)]);
        store.register(ScienceInfo {
            id: ScienceId(10),
            name: "SCIENCE_Advanced".into(),
            purchase_cost: 2,
            prerequisites: vec![ScienceId(0)],
            grantable: true,
        });

        assert!(!store.has_prerequisites(&[], ScienceId(10)));
        assert!(store.has_prerequisites(&[ScienceId(0)], ScienceId(10)));
    }

    #[test]
    fn test_rank_lookup_sentinels() {
        let mut ranks = RankInfoStore::new();
        ranks.push_rank(0, 1, vec![]);
        ranks.push_rank(100, 1, vec![ScienceId(3)]);

        assert_eq!(ranks.rank_info(1).unwrap().skill_points_needed, 0);
        assert_eq!(ranks.rank_info(2).unwrap().sciences_granted, vec![ScienceId(3)]);
        assert!(ranks.rank_info(0).is_none());
        assert!(ranks.rank_info(3).is_none());
        assert_eq!(ranks.max_rank_level(), 2);
    }

    #[test]
    fn test_availability_parse() {
        assert_eq!(
            ScienceAvailability::parse("hidden"),
            Some(ScienceAvailability::Hidden)
        );
        assert_eq!(ScienceAvailability::parse("sideways"), None);
    }

    #[test]
    fn test_science_vec_xfer_replaces_contents() {
        let mut original = vec![ScienceId(4), ScienceId(9)];
        let mut save = Xfer::saver();
        xfer_science_vec(&mut save, &mut original).unwrap();

        let mut load = Xfer::loader(save.into_bytes());
        let mut decoded = vec![ScienceId(77)];
        xfer_science_vec(&mut load, &mut decoded).unwrap();
        assert_eq!(decoded, vec![ScienceId(4), ScienceId(9)]);
    }

    #[test]
    fn test_rank_store_from_ron_validates_levels() {
        let err = RankInfoStore::from_ron(
            r#"[
                (level: 2, skill_points_needed: 0, science_purchase_points_granted: 1, sciences_granted: []),
            ]"#,
        );
        assert!(err.is_err());
    }
}
