//! Production cost/time/veterancy modifier tables.
//!
//! Two kinds of modifier exist: per-template percent adjustments keyed by
//! template name, and category-wide cost multipliers keyed by kind-of flag
//! filters. The category entries are reference-counted so identical grants
//! stack by count instead of duplicating list nodes.

use serde::{Deserialize, Serialize};

use crate::kind_of::KindOfFlags;
use crate::math::{fixed_serde, Fixed};

/// Veterancy level a template's fresh units start at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VeterancyLevel {
    /// Baseline, no bonuses.
    #[default]
    Regular,
    /// One promotion.
    Veteran,
    /// Two promotions.
    Elite,
    /// Maximum promotion.
    Heroic,
}

/// A reference-counted category-wide production cost change.
///
/// Entries with an identical (flags, percent) pair coalesce into one record
/// whose `count` tracks how many grants are outstanding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindOfPercentProductionChange {
    /// Kind-of filter a queried template must fully contain.
    pub flags: KindOfFlags,
    /// Fractional cost adjustment; -0.25 means 25% cheaper.
    #[serde(with = "fixed_serde")]
    pub percent: Fixed,
    /// Outstanding grants of this exact change.
    pub count: u32,
}
