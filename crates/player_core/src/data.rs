//! Data-driven player definitions and match-level defaults.
//!
//! Player templates are loaded from RON definition files and describe the
//! faction-level baseline a player slot resets to on `init`: side names,
//! starting money, production modifier tables, intrinsic sciences, and the
//! handicap bundle.
//!
//! # Example RON
//!
//! ```ron
//! (
//!     name: "FactionMeridian",
//!     side: "Meridian",
//!     base_side: "Meridian",
//!     starting_money: 10000,
//!     preferred_color: 0x0000FF,
//!     observer: false,
//!     playable_side: true,
//!     intrinsic_sciences: [(0)],
//!     intrinsic_science_purchase_points: 1,
//!     production_cost_changes: {},
//!     production_time_changes: {},
//!     production_veterancy_levels: {},
//!     handicap: (build_cost: 4294967296, build_time: 4294967296),
//! )
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StateError};
use crate::math::{fixed_map_serde, fixed_serde, Fixed};
use crate::production::VeterancyLevel;
use crate::science::ScienceId;

/// Percentage handicaps applied to a player's production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handicap {
    /// Build-cost multiplier (1.0 = no handicap).
    #[serde(with = "fixed_serde")]
    pub build_cost: Fixed,
    /// Build-time multiplier (1.0 = no handicap).
    #[serde(with = "fixed_serde")]
    pub build_time: Fixed,
}

impl Default for Handicap {
    fn default() -> Self {
        Self {
            build_cost: Fixed::ONE,
            build_time: Fixed::ONE,
        }
    }
}

impl Handicap {
    /// Reset both multipliers to the identity.
    pub fn init(&mut self) {
        *self = Self::default();
    }
}

/// Faction-level baseline for a player slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTemplate {
    /// Template name.
    pub name: String,
    /// Side (faction) name.
    pub side: String,
    /// Base side for tech-tree sharing between sub-factions.
    pub base_side: String,
    /// Starting money; 0 defers to the match setup or global default.
    pub starting_money: u32,
    /// Preferred player color as packed RGB (alpha is forced on at init).
    pub preferred_color: i32,
    /// Whether this template denotes a non-playing observer slot.
    pub observer: bool,
    /// Whether this side appears in faction selection.
    pub playable_side: bool,
    /// Sciences known from the start of the match.
    pub intrinsic_sciences: Vec<ScienceId>,
    /// Purchase points available before any rank grants.
    pub intrinsic_science_purchase_points: i32,
    /// Per-template production cost percent adjustments.
    #[serde(with = "fixed_map_serde")]
    pub production_cost_changes: BTreeMap<String, Fixed>,
    /// Per-template production time percent adjustments.
    #[serde(with = "fixed_map_serde")]
    pub production_time_changes: BTreeMap<String, Fixed>,
    /// Per-template starting veterancy.
    pub production_veterancy_levels: BTreeMap<String, VeterancyLevel>,
    /// Production handicap bundle.
    pub handicap: Handicap,
}

impl PlayerTemplate {
    /// Parse a template from a RON document.
    pub fn from_ron(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| StateError::DataParse {
            source_name: "player template".into(),
            message: e.to_string(),
        })
    }
}

/// Per-match setup values that override template defaults.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GameInfo {
    /// Agreed starting money for every player in this match.
    pub starting_money: u32,
}

/// Global fallbacks used when neither template nor match setup decide.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GlobalDefaults {
    /// Starting cash when nothing else specifies one.
    pub default_starting_cash: u32,
    /// Cash value of one supply box.
    pub values_per_supply_box: u32,
}

impl Default for GlobalDefaults {
    fn default() -> Self {
        Self {
            default_starting_cash: 10000,
            values_per_supply_box: 100,
        }
    }
}

/// Localized-text lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextCatalog {
    entries: BTreeMap<String, String>,
}

impl TextCatalog {
    /// Create an empty catalog (every fetch misses).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a label.
    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    /// Fetch a label by key.
    #[must_use]
    pub fn fetch(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}
