//! Diplomatic stances and the relation tables that store them.
//!
//! Each player carries two independent tables: one keyed by team id (an
//! explicit per-team override) and one keyed by player index (the general
//! stance toward that player). Resolution order lives in
//! [`crate::player::PlayerState::get_relationship`]: team entry first,
//! controlling player second, [`Relationship::Neutral`] last.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StateError};
use crate::player::PlayerIndex;
use crate::team::TeamId;
use crate::xfer::{Xfer, XferError, XferMode};

/// Schema version of a relation-table snapshot section.
const RELATION_MAP_VERSION: u8 = 1;

/// Diplomatic stance toward another player or team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Relationship {
    /// Open hostility.
    Enemies,
    /// No stance either way. The default when no table entry exists.
    #[default]
    Neutral,
    /// Shared vision and no friendly fire.
    Allies,
}

impl Relationship {
    /// Wire encoding of this stance.
    #[must_use]
    pub const fn to_wire(self) -> i32 {
        match self {
            Self::Enemies => 0,
            Self::Neutral => 1,
            Self::Allies => 2,
        }
    }

    /// Decode a stance from its wire encoding.
    pub fn from_wire(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::Enemies),
            1 => Ok(Self::Neutral),
            2 => Ok(Self::Allies),
            other => Err(StateError::CorruptSnapshot(format!(
                "invalid relationship value {other}"
            ))),
        }
    }
}

/// Key types usable in a relation table.
///
/// Keys know how to move themselves through an [`Xfer`] stream so both
/// tables share one snapshot routine.
pub trait RelationKey: Copy + Ord + Default {
    /// Transfer this key through the stream.
    fn xfer_key(&mut self, xfer: &mut Xfer) -> std::result::Result<(), XferError>;
}

impl RelationKey for PlayerIndex {
    fn xfer_key(&mut self, xfer: &mut Xfer) -> std::result::Result<(), XferError> {
        let mut raw = i32::from(self.0);
        xfer.xfer_i32(&mut raw)?;
        self.0 = raw as u8;
        Ok(())
    }
}

impl RelationKey for TeamId {
    fn xfer_key(&mut self, xfer: &mut Xfer) -> std::result::Result<(), XferError> {
        xfer.xfer_u32(&mut self.0)
    }
}

/// Ordered mapping from an opponent key to a diplomatic stance.
///
/// `BTreeMap` storage keeps snapshot element order deterministic across
/// machines, which the lockstep/replay contract requires.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationMap<K: RelationKey> {
    entries: BTreeMap<K, Relationship>,
}

/// Player-index-keyed relation table.
pub type PlayerRelationMap = RelationMap<PlayerIndex>;

/// Team-id-keyed relation table (explicit per-team overrides).
pub type TeamRelationMap = RelationMap<TeamId>;

impl<K: RelationKey> RelationMap<K> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Look up the stance for a key.
    #[must_use]
    pub fn get(&self, key: K) -> Option<Relationship> {
        self.entries.get(&key).copied()
    }

    /// Upsert the stance for a key.
    pub fn set(&mut self, key: K, stance: Relationship) {
        self.entries.insert(key, stance);
    }

    /// Remove an entry, or clear the whole table.
    ///
    /// `None` clears every entry and reports whether anything was cleared;
    /// `Some(key)` removes exactly that entry and reports whether it
    /// existed.
    pub fn remove(&mut self, key: Option<K>) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        match key {
            None => {
                self.entries.clear();
                true
            }
            Some(key) => self.entries.remove(&key).is_some(),
        }
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Transfer the table: version, entry count, then (key, stance) pairs
    /// in key order. Load inserts over whatever is present.
    pub fn xfer_snapshot(&mut self, xfer: &mut Xfer) -> Result<()> {
        let mut version = RELATION_MAP_VERSION;
        xfer.xfer_version(&mut version, RELATION_MAP_VERSION)?;
        let count = xfer.xfer_count(self.entries.len())?;

        match xfer.mode() {
            XferMode::Save => {
                for (key, stance) in &self.entries {
                    let mut key = *key;
                    key.xfer_key(xfer)?;
                    let mut raw = stance.to_wire();
                    xfer.xfer_i32(&mut raw)?;
                }
            }
            XferMode::Load => {
                for _ in 0..count {
                    let mut key = K::default();
                    key.xfer_key(xfer)?;
                    let mut raw = 0i32;
                    xfer.xfer_i32(&mut raw)?;
                    self.entries.insert(key, Relationship::from_wire(raw)?);
                }
            }
        }
        Ok(())
    }
}
