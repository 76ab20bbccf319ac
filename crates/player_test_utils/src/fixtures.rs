//! Pre-built stores and a context harness for consistent testing.

use fixed::types::I32F32;

use player_core::data::{GameInfo, GlobalDefaults, PlayerTemplate, TextCatalog};
use player_core::math::Fixed;
use player_core::player::{PlayerContext, PlayerIndex, XferContext};
use player_core::production::VeterancyLevel;
use player_core::science::{RankInfoStore, ScienceId, ScienceInfo, ScienceStore};
use player_core::team::{ObjectId, TeamId, TeamPrototypeId, TeamRegistry};
use player_core::upgrade::UpgradeCenter;

use crate::recording::{RecordingScript, RecordingWorld};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Science known from the start by the fixture template.
pub const SCIENCE_BASIC_TRAINING: ScienceId = ScienceId(0);
/// Science granted at rank 2 by the fixture rank table.
pub const SCIENCE_RAPID_DEPLOY: ScienceId = ScienceId(1);
/// Science granted at rank 3 by the fixture rank table.
pub const SCIENCE_CARPET_BOMB: ScienceId = ScienceId(2);
/// Purchasable science costing 1 point.
pub const SCIENCE_SCAVENGER: ScienceId = ScienceId(3);
/// Purchasable science costing 3 points, requiring the scavenger science.
pub const SCIENCE_SALVAGE_NETWORK: ScienceId = ScienceId(4);
/// Non-grantable, non-purchasable science.
pub const SCIENCE_OBSERVER_EYE: ScienceId = ScienceId(5);

/// Everything a [`PlayerContext`] borrows, bundled for tests.
///
/// Build one harness per test, then borrow contexts from it:
///
/// ```
/// use player_core::player::{PlayerIndex, PlayerState};
/// use player_test_utils::TestHarness;
///
/// let mut harness = TestHarness::new();
/// let mut player = {
///     let mut ctx = harness.ctx(0);
///     PlayerState::new(PlayerIndex(0), &mut ctx)
/// };
/// assert_eq!(player.rank_level(), 1);
/// # let _ = &mut player;
/// ```
#[derive(Debug)]
pub struct TestHarness {
    /// Team prototype/instance registry.
    pub teams: TeamRegistry,
    /// Three-rank fixture table.
    pub ranks: RankInfoStore,
    /// Six-science fixture catalog.
    pub sciences: ScienceStore,
    /// Three-upgrade fixture center.
    pub upgrades: UpgradeCenter,
    /// Text catalog with the science-general label.
    pub text: TextCatalog,
    /// Global fallbacks.
    pub defaults: GlobalDefaults,
    /// Match setup overrides, absent by default.
    pub game_info: Option<GameInfo>,
    /// Recording script hooks.
    pub script: RecordingScript,
    /// Recording world hooks.
    pub world: RecordingWorld,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Build a harness with the canned stores.
    #[must_use]
    pub fn new() -> Self {
        Self {
            teams: TeamRegistry::new(),
            ranks: rank_store(),
            sciences: science_store(),
            upgrades: upgrade_center(),
            text: text_catalog(),
            defaults: GlobalDefaults::default(),
            game_info: None,
            script: RecordingScript::default(),
            world: RecordingWorld::default(),
        }
    }

    /// Borrow a mutable player context at a given logic frame.
    pub fn ctx(&mut self, frame: u32) -> PlayerContext<'_> {
        PlayerContext {
            teams: &self.teams,
            rank_info: &self.ranks,
            sciences: &self.sciences,
            text: &self.text,
            game_info: self.game_info.as_ref(),
            defaults: &self.defaults,
            script: &mut self.script,
            world: &mut self.world,
            frame,
        }
    }

    /// Borrow a snapshot resolution context.
    #[must_use]
    pub fn xfer_ctx(&self) -> XferContext<'_> {
        XferContext {
            upgrades: &self.upgrades,
            teams: &self.teams,
        }
    }

    /// Create a prototype owned by `owner` with one team instance holding
    /// the given member objects.
    ///
    /// The team is named `<proto_name>0`. Returns (prototype id, team id).
    pub fn add_team(
        &mut self,
        owner: PlayerIndex,
        proto_name: &str,
        members: &[u64],
    ) -> (TeamPrototypeId, TeamId) {
        let proto = self.teams.create_prototype(proto_name, Some(owner));
        let team = self
            .teams
            .create_team(proto, format!("{proto_name}0"))
            .expect("prototype was just created");
        for member in members {
            self.teams.add_member(team, ObjectId(*member));
        }
        (proto, team)
    }
}

/// The fixture science catalog.
///
/// Six sciences: one intrinsic, two rank-granted, two purchasable (the
/// second requiring the first), and one that is neither grantable nor
/// purchasable.
#[must_use]
pub fn science_store() -> ScienceStore {
    let mut store = ScienceStore::new();
    store.register(ScienceInfo {
        id: SCIENCE_BASIC_TRAINING,
        name: "SCIENCE_BasicTraining".into(),
        purchase_cost: 0,
        prerequisites: vec![],
        grantable: true,
    });
    store.register(ScienceInfo {
        id: SCIENCE_RAPID_DEPLOY,
        name: "SCIENCE_RapidDeploy".into(),
        purchase_cost: 0,
        prerequisites: vec![],
        grantable: true,
    });
    store.register(ScienceInfo {
        id: SCIENCE_CARPET_BOMB,
        name: "SCIENCE_CarpetBomb".into(),
        purchase_cost: 0,
        prerequisites: vec![],
        grantable: true,
    });
    store.register(ScienceInfo {
        id: SCIENCE_SCAVENGER,
        name: "SCIENCE_Scavenger".into(),
        purchase_cost: 1,
        prerequisites: vec![],
        grantable: true,
    });
    store.register(ScienceInfo {
        id: SCIENCE_SALVAGE_NETWORK,
        name: "SCIENCE_SalvageNetwork".into(),
        purchase_cost: 3,
        prerequisites: vec![SCIENCE_SCAVENGER],
        grantable: true,
    });
    store.register(ScienceInfo {
        id: SCIENCE_OBSERVER_EYE,
        name: "SCIENCE_ObserverEye".into(),
        purchase_cost: 0,
        prerequisites: vec![],
        grantable: false,
    });
    store
}

/// The fixture rank table: three ranks, with purchase-point and science
/// grants at each.
#[must_use]
pub fn rank_store() -> RankInfoStore {
    let mut store = RankInfoStore::new();
    store.push_rank(0, 1, vec![]);
    store.push_rank(100, 1, vec![SCIENCE_RAPID_DEPLOY]);
    store.push_rank(300, 2, vec![SCIENCE_CARPET_BOMB]);
    store
}

/// The fixture upgrade center: three templates.
#[must_use]
pub fn upgrade_center() -> UpgradeCenter {
    let mut center = UpgradeCenter::new();
    center
        .register("UpgradeComposites", 800, 600)
        .expect("fewer than 128 templates registered");
    center
        .register("UpgradeDrones", 500, 450)
        .expect("fewer than 128 templates registered");
    center
        .register("UpgradeNationalism", 2000, 900)
        .expect("fewer than 128 templates registered");
    center
}

/// The fixture text catalog.
#[must_use]
pub fn text_catalog() -> TextCatalog {
    let mut catalog = TextCatalog::new();
    catalog.insert("SCIENCE:GeneralName", "General");
    catalog
}

/// A faction template with starting money, an intrinsic science, one
/// purchase point, and modifier table entries.
#[must_use]
pub fn player_template() -> PlayerTemplate {
    let mut cost_changes = std::collections::BTreeMap::new();
    cost_changes.insert("PowerPlant".to_string(), Fixed::from_num(-0.1));
    let mut time_changes = std::collections::BTreeMap::new();
    time_changes.insert("WarFactory".to_string(), Fixed::from_num(0.25));
    let mut veterancy = std::collections::BTreeMap::new();
    veterancy.insert("Ranger".to_string(), VeterancyLevel::Veteran);

    PlayerTemplate {
        name: "FactionMeridian".into(),
        side: "Meridian".into(),
        base_side: "Meridian".into(),
        starting_money: 2500,
        preferred_color: 0x00_40_80,
        observer: false,
        playable_side: true,
        intrinsic_sciences: vec![SCIENCE_BASIC_TRAINING],
        intrinsic_science_purchase_points: 1,
        production_cost_changes: cost_changes,
        production_time_changes: time_changes,
        production_veterancy_levels: veterancy,
        handicap: player_core::data::Handicap::default(),
    }
}

/// A template that denotes an observer slot with no starting money of its
/// own.
#[must_use]
pub fn observer_template() -> PlayerTemplate {
    PlayerTemplate {
        name: "FactionObserver".into(),
        side: "Observer".into(),
        base_side: "Observer".into(),
        starting_money: 0,
        preferred_color: -1,
        observer: true,
        playable_side: false,
        intrinsic_sciences: vec![],
        intrinsic_science_purchase_points: 0,
        production_cost_changes: std::collections::BTreeMap::new(),
        production_time_changes: std::collections::BTreeMap::new(),
        production_veterancy_levels: std::collections::BTreeMap::new(),
        handicap: player_core::data::Handicap::default(),
    }
}
