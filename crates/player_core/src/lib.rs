//! # Player Core
//!
//! Deterministic per-player game-state core for a lockstep RTS simulation.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO in the simulation path
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Lockstep multiplayer (identical state across clients)
//! - Save/replay systems with bit-exact round-trips
//! - Headless server builds
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`player`] - The per-player state root and its versioned snapshot
//! - [`relationship`] - Diplomatic stances and relation tables
//! - [`upgrade`] - Upgrade templates, masks, and the resolving center
//! - [`science`] - Science catalog and rank metadata stores
//! - [`team`] - Team prototype/instance registry
//! - [`xfer`] - The ordered save/load stream contract
//! - [`snapshot`] - The framed save-file container

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod attachments;
pub mod battle_plan;
pub mod build_list;
pub mod data;
pub mod economy;
pub mod error;
pub mod hooks;
pub mod kind_of;
pub mod math;
pub mod player;
pub mod production;
pub mod relationship;
pub mod science;
pub mod score;
pub mod snapshot;
pub mod squad;
pub mod team;
pub mod upgrade;
pub mod xfer;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle_plan::{BattlePlan, BattlePlanBonuses};
    pub use crate::data::{GameInfo, GlobalDefaults, PlayerTemplate, TextCatalog};
    pub use crate::error::{Result, StateError};
    pub use crate::hooks::{GameDifficulty, ScriptHooks, WorldHooks};
    pub use crate::kind_of::KindOfFlags;
    pub use crate::math::Fixed;
    pub use crate::player::{
        PlayerContext, PlayerIndex, PlayerState, XferContext, MAX_PLAYER_COUNT,
        PLAYER_SNAPSHOT_VERSION,
    };
    pub use crate::relationship::Relationship;
    pub use crate::science::{RankInfoStore, ScienceAvailability, ScienceId, ScienceStore};
    pub use crate::squad::{Squad, SQUAD_COUNT};
    pub use crate::team::{ObjectId, TeamId, TeamPrototypeId, TeamRegistry};
    pub use crate::upgrade::{UpgradeCenter, UpgradeMask, UpgradeStatus, UpgradeTemplate};
    pub use crate::xfer::{Xfer, XferMode};
}
