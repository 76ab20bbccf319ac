//! The per-player game-state root.
//!
//! [`PlayerState`] aggregates everything one player slot owns — squads,
//! upgrade ledger, diplomacy tables, economy, rank/science progression,
//! production modifiers, battle-plan bonuses — plus the versioned snapshot
//! routine that walks every sub-component in a fixed order. That ordered
//! walk is the canonical save/replay schema: all players must derive
//! identical state from identical streams, so every collection here
//! iterates deterministically and every fractional quantity is fixed-point.
//!
//! Collaborators (team registry, stores, script engine, object layer) are
//! passed in explicitly through [`PlayerContext`] / [`XferContext`]; the
//! player never reads process-wide state.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, VecDeque};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::attachments::{AiState, ResourceManagerState, TunnelNetwork};
use crate::battle_plan::{BattlePlan, BattlePlanBonuses, BATTLE_PLAN_SLOTS};
use crate::build_list::BuildListInfo;
use crate::data::{GameInfo, GlobalDefaults, Handicap, PlayerTemplate, TextCatalog};
use crate::economy::{Energy, Money};
use crate::error::{Result, StateError};
use crate::hooks::{GameDifficulty, ScriptHooks, WorldHooks};
use crate::kind_of::KindOfFlags;
use crate::math::Fixed;
use crate::production::{KindOfPercentProductionChange, VeterancyLevel};
use crate::relationship::{PlayerRelationMap, Relationship, TeamRelationMap};
use crate::science::{xfer_science_vec, RankInfoStore, ScienceAvailability, ScienceId, ScienceStore};
use crate::score::ScoreKeeper;
use crate::squad::{Squad, SQUAD_COUNT};
use crate::team::{ObjectId, Team, TeamId, TeamPrototypeId, TeamRegistry};
use crate::upgrade::{Upgrade, UpgradeCenter, UpgradeMask, UpgradeStatus, UpgradeTemplate};
use crate::xfer::{Xfer, XferMode};

/// Maximum number of player slots in a match.
pub const MAX_PLAYER_COUNT: usize = 16;

/// Current schema version of the player snapshot section.
pub const PLAYER_SNAPSHOT_VERSION: u8 = 8;

/// Index of a player slot, unique per match.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct PlayerIndex(pub u8);

impl PlayerIndex {
    /// Create an index, panicking if it is out of range.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        assert!((index as usize) < MAX_PLAYER_COUNT);
        Self(index)
    }

    /// Single-bit membership mask for fast set tests.
    #[must_use]
    pub const fn mask(self) -> u16 {
        1 << self.0
    }

    /// The index as a usize, for array addressing.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Who is driving this player slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerType {
    /// A human at a client.
    Human,
    /// The computer.
    #[default]
    Computer,
}

/// Ready-frame bookkeeping for one shared special power.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialPowerReadyTimer {
    /// Special-power template id.
    pub id: u32,
    /// Frame at which the power becomes ready.
    pub frame: u32,
}

/// Collaborator bundle for mutating player operations.
///
/// Built fresh per call (or per tick) from whatever owns the collaborators;
/// nothing here is stored on the player.
pub struct PlayerContext<'a> {
    /// Team prototype/instance resolution and traversal.
    pub teams: &'a TeamRegistry,
    /// Rank metadata lookups.
    pub rank_info: &'a RankInfoStore,
    /// Science catalog lookups.
    pub sciences: &'a ScienceStore,
    /// Localized-text lookups.
    pub text: &'a TextCatalog,
    /// Match setup overrides, if a match is configured.
    pub game_info: Option<&'a GameInfo>,
    /// Global fallbacks.
    pub defaults: &'a GlobalDefaults,
    /// Scripting-engine hooks.
    pub script: &'a mut dyn ScriptHooks,
    /// Gameplay-object and UI hooks.
    pub world: &'a mut dyn WorldHooks,
    /// Current logic frame.
    pub frame: u32,
}

/// Collaborator bundle for snapshot load resolution.
pub struct XferContext<'a> {
    /// Resolves upgrade templates by persisted name.
    pub upgrades: &'a UpgradeCenter,
    /// Resolves team prototypes and teams by persisted id.
    pub teams: &'a TeamRegistry,
}

/// The per-player game-state object.
#[derive(Debug)]
pub struct PlayerState {
    player_index: PlayerIndex,
    player_type: PlayerType,
    name: String,
    display_name: String,
    side: String,
    base_side: String,
    color: i32,
    night_color: i32,
    template: Option<PlayerTemplate>,

    money: Money,
    energy: Energy,
    handicap: Handicap,
    score: ScoreKeeper,

    upgrades: VecDeque<Upgrade>,
    upgrades_in_progress: UpgradeMask,
    upgrades_completed: UpgradeMask,

    player_relations: PlayerRelationMap,
    team_relations: TeamRelationMap,

    team_prototypes: Vec<TeamPrototypeId>,
    default_team: Option<TeamId>,
    build_list: Vec<BuildListInfo>,

    ai: Option<AiState>,
    resource_manager: Option<ResourceManagerState>,
    tunnel_network: Option<TunnelNetwork>,

    battle_plan_bonuses: Option<BattlePlanBonuses>,
    active_battle_plans: [i32; BATTLE_PLAN_SLOTS],

    squads: [Squad; SQUAD_COUNT],
    ai_squad: Squad,

    sciences: Vec<ScienceId>,
    disabled_sciences: Vec<ScienceId>,
    hidden_sciences: Vec<ScienceId>,

    rank_level: i32,
    current_skill_points: i32,
    skill_points_needed_for_next_rank: i32,
    rank_progress: i32,
    science_purchase_points: i32,
    skill_points_modifier: Fixed,
    science_general_name: String,

    production_cost_changes: BTreeMap<String, Fixed>,
    production_time_changes: BTreeMap<String, Fixed>,
    production_veterancy_levels: BTreeMap<String, VeterancyLevel>,
    kind_of_production_cost_changes: Vec<KindOfPercentProductionChange>,

    special_power_ready_timers: Vec<SpecialPowerReadyTimer>,

    radar_count: i32,
    disable_proof_radar_count: i32,
    radar_disabled: bool,

    attacked_by: [bool; MAX_PLAYER_COUNT],
    last_attacked_by_frame: u32,
    bounty_cost_to_build: Fixed,

    can_build_units: bool,
    can_build_base: bool,
    observer: bool,
    dead: bool,
    preorder: bool,
    list_in_score_screen: bool,
    units_should_hunt: bool,
    local_player: bool,
}

impl PlayerState {
    /// Construct a player slot and reset it to the templateless baseline.
    #[must_use]
    pub fn new(player_index: PlayerIndex, ctx: &mut PlayerContext<'_>) -> Self {
        let mut player = Self::blank(player_index);
        player.init(None, ctx);
        player
    }

    fn blank(player_index: PlayerIndex) -> Self {
        Self {
            player_index,
            player_type: PlayerType::Computer,
            name: String::new(),
            display_name: String::new(),
            side: String::new(),
            base_side: String::new(),
            color: 0,
            night_color: 0,
            template: None,
            money: Money::default(),
            energy: Energy::new(),
            handicap: Handicap::default(),
            score: ScoreKeeper::default(),
            upgrades: VecDeque::new(),
            upgrades_in_progress: UpgradeMask::NONE,
            upgrades_completed: UpgradeMask::NONE,
            player_relations: PlayerRelationMap::new(),
            team_relations: TeamRelationMap::new(),
            team_prototypes: Vec::new(),
            default_team: None,
            build_list: Vec::new(),
            ai: None,
            resource_manager: None,
            tunnel_network: None,
            battle_plan_bonuses: None,
            active_battle_plans: [0; BATTLE_PLAN_SLOTS],
            squads: std::array::from_fn(|_| Squad::new()),
            ai_squad: Squad::new(),
            sciences: Vec::new(),
            disabled_sciences: Vec::new(),
            hidden_sciences: Vec::new(),
            rank_level: 0,
            current_skill_points: 0,
            skill_points_needed_for_next_rank: i32::MAX,
            rank_progress: 0,
            science_purchase_points: 0,
            skill_points_modifier: Fixed::ONE,
            science_general_name: String::new(),
            production_cost_changes: BTreeMap::new(),
            production_time_changes: BTreeMap::new(),
            production_veterancy_levels: BTreeMap::new(),
            kind_of_production_cost_changes: Vec::new(),
            special_power_ready_timers: Vec::new(),
            radar_count: 0,
            disable_proof_radar_count: 0,
            radar_disabled: false,
            attacked_by: [false; MAX_PLAYER_COUNT],
            last_attacked_by_frame: 0,
            bounty_cost_to_build: Fixed::ZERO,
            can_build_units: true,
            can_build_base: true,
            observer: false,
            dead: false,
            preorder: false,
            list_in_score_screen: true,
            units_should_hunt: false,
            local_player: false,
        }
    }

    // ========================================
    // Lifecycle
    // ========================================

    /// Full reset to a fresh-match baseline.
    ///
    /// With a template, copies its side names, modifier tables, color
    /// (alpha forced opaque) and starting money (falling back to the match
    /// setup, then the global default, when the template supplies zero).
    /// Without one, resets to an empty player allied with itself. Either
    /// way every owned sub-structure is destroyed and recreated.
    pub fn init(&mut self, template: Option<&PlayerTemplate>, ctx: &mut PlayerContext<'_>) {
        if !self.team_prototypes.is_empty() {
            tracing::warn!(
                player = self.player_index.0,
                "team prototype list is not empty at init"
            );
            self.team_prototypes.clear();
        }

        self.skill_points_modifier = Fixed::ONE;
        self.last_attacked_by_frame = 0;
        self.attacked_by = [false; MAX_PLAYER_COUNT];
        self.preorder = false;
        self.dead = false;
        self.radar_count = 0;
        self.disable_proof_radar_count = 0;
        self.radar_disabled = false;
        self.active_battle_plans = [0; BATTLE_PLAN_SLOTS];
        self.battle_plan_bonuses = None;
        self.delete_upgrade_list();
        self.energy.init();
        self.build_list.clear();
        self.default_team = None;
        self.ai = None;
        self.resource_manager = None;
        self.tunnel_network = None;

        for squad in &mut self.squads {
            *squad = Squad::new();
        }
        self.ai_squad = Squad::new();

        self.can_build_base = true;
        self.can_build_units = true;
        self.observer = false;
        self.bounty_cost_to_build = Fixed::ZERO;
        self.list_in_score_screen = true;
        self.units_should_hunt = false;

        if let Some(template) = template {
            self.side = template.side.clone();
            self.base_side = template.base_side.clone();
            self.production_cost_changes = template.production_cost_changes.clone();
            self.production_time_changes = template.production_time_changes.clone();
            self.production_veterancy_levels = template.production_veterancy_levels.clone();
            self.color = template.preferred_color | 0xFF00_0000_u32 as i32;
            self.night_color = self.color;
            self.money = Money::new(template.starting_money);
            self.handicap = template.handicap;

            if self.money.amount() == 0 {
                let amount = ctx
                    .game_info
                    .map_or(ctx.defaults.default_starting_cash, |info| {
                        info.starting_money
                    });
                self.money = Money::new(amount);
            }

            self.display_name.clear();
            self.name.clear();
            self.player_type = PlayerType::Computer;
            self.observer = template.observer;
            self.dead = self.observer;
        } else {
            self.side.clear();
            self.base_side.clear();
            self.production_cost_changes.clear();
            self.production_time_changes.clear();
            self.production_veterancy_levels.clear();
            self.color = -1;
            self.night_color = -1;
            self.money.empty();
            self.handicap.init();
            self.display_name.clear();
            self.name.clear();
            self.player_type = PlayerType::Computer;
            self.set_player_relationship(Some(self.player_index), Relationship::Allies);
        }

        self.score.reset(self.player_index);
        self.template = template.cloned();
        self.reset_rank(ctx);
        self.disabled_sciences.clear();
        self.hidden_sciences.clear();
        self.special_power_ready_timers.clear();
        self.kind_of_production_cost_changes.clear();
    }

    /// Per-tick update: AI and team script delegation, brown-out edge
    /// detection.
    pub fn update(&mut self, ctx: &mut PlayerContext<'_>) {
        if self.ai.is_some() {
            ctx.world.update_ai(self.player_index);
        }

        let teams = ctx.teams;
        for proto_id in &self.team_prototypes {
            if let Some(proto) = teams.find_prototype(*proto_id) {
                for team_id in &proto.instances {
                    ctx.world.update_team_scripts(*team_id);
                }
            }
        }

        if self.energy.penalty_frame() != 0 && ctx.frame > self.energy.penalty_frame() {
            self.energy.set_penalty_frame(0);
            ctx.world
                .power_brownout_changed(self.player_index, !self.energy.has_sufficient_power());
        }
    }

    // ========================================
    // Identity
    // ========================================

    /// This slot's match-unique index.
    #[must_use]
    pub const fn player_index(&self) -> PlayerIndex {
        self.player_index
    }

    /// Single-bit membership mask derived from the index.
    #[must_use]
    pub const fn player_mask(&self) -> u16 {
        self.player_index.mask()
    }

    /// Internal player name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the internal player name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Display name shown in UI.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Set the display name.
    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = name.into();
    }

    /// Side (faction) name.
    #[must_use]
    pub fn side(&self) -> &str {
        &self.side
    }

    /// Base side for tech-tree sharing.
    #[must_use]
    pub fn base_side(&self) -> &str {
        &self.base_side
    }

    /// Packed player color.
    #[must_use]
    pub const fn color(&self) -> i32 {
        self.color
    }

    /// Who is driving this slot.
    #[must_use]
    pub const fn player_type(&self) -> PlayerType {
        self.player_type
    }

    /// Set who drives this slot.
    pub fn set_player_type(&mut self, player_type: PlayerType) {
        self.player_type = player_type;
    }

    /// The template this player was initialized from, if any.
    #[must_use]
    pub const fn template(&self) -> Option<&PlayerTemplate> {
        self.template.as_ref()
    }

    /// Whether this player's side appears in faction selection.
    #[must_use]
    pub fn is_playable_side(&self) -> bool {
        self.template.as_ref().is_some_and(|t| t.playable_side)
    }

    /// Whether this slot is a non-playing observer.
    #[must_use]
    pub const fn is_observer(&self) -> bool {
        self.observer
    }

    /// Whether this player has been eliminated.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Mark this player eliminated or alive.
    pub fn set_dead(&mut self, dead: bool) {
        self.dead = dead;
    }

    /// Whether this is the local client's player.
    #[must_use]
    pub const fn is_local_player(&self) -> bool {
        self.local_player
    }

    /// Mark this slot as the local client's player.
    pub fn set_local_player(&mut self, local: bool) {
        self.local_player = local;
    }

    /// Current match difficulty: the AI's own setting when an AI is
    /// attached, the script engine's otherwise.
    #[must_use]
    pub fn difficulty(&self, script: &dyn ScriptHooks) -> GameDifficulty {
        self.ai.map_or_else(|| script.difficulty(), |ai| ai.difficulty)
    }

    // ========================================
    // Diplomacy
    // ========================================

    /// Resolve this player's stance toward a team.
    ///
    /// Team-level overrides take precedence; otherwise the stance toward
    /// the team's controlling player applies; otherwise neutral.
    #[must_use]
    pub fn get_relationship(&self, team: Option<&Team>) -> Relationship {
        let Some(team) = team else {
            return Relationship::Neutral;
        };

        if let Some(stance) = self.team_relations.get(team.id) {
            return stance;
        }

        if let Some(player) = team.controlling_player() {
            if let Some(stance) = self.player_relations.get(player) {
                return stance;
            }
        }

        Relationship::Neutral
    }

    /// Upsert the stance toward a player. `None` is a no-op.
    pub fn set_player_relationship(&mut self, other: Option<PlayerIndex>, stance: Relationship) {
        if let Some(other) = other {
            self.player_relations.set(other, stance);
        }
    }

    /// Remove a player stance, or clear the whole table with `None`.
    ///
    /// Returns whether anything was removed.
    pub fn remove_player_relationship(&mut self, other: Option<PlayerIndex>) -> bool {
        self.player_relations.remove(other)
    }

    /// Upsert the stance toward a team. `None` is a no-op.
    pub fn set_team_relationship(&mut self, team: Option<TeamId>, stance: Relationship) {
        if let Some(team) = team {
            self.team_relations.set(team, stance);
        }
    }

    /// Remove a team stance, or clear the whole table with `None`.
    ///
    /// Returns whether anything was removed.
    pub fn remove_team_relationship(&mut self, team: Option<TeamId>) -> bool {
        self.team_relations.remove(team)
    }

    // ========================================
    // Upgrade ledger
    // ========================================

    /// Find this player's ledger record for a template.
    #[must_use]
    pub fn find_upgrade(&self, template_name: &str) -> Option<&Upgrade> {
        self.upgrades
            .iter()
            .find(|u| u.template_name() == template_name)
    }

    /// Ledger records in list order (most recently added first).
    #[must_use]
    pub fn upgrades(&self) -> &VecDeque<Upgrade> {
        &self.upgrades
    }

    /// Find-or-create a ledger record, leaving its status untouched when it
    /// already exists. No side effects; returns the record's position.
    fn ledger_insert(&mut self, template: &UpgradeTemplate) -> usize {
        let pos = self
            .upgrades
            .iter()
            .position(|u| u.template_name() == template.name);
        match pos {
            Some(pos) => pos,
            None => {
                self.upgrades
                    .push_front(Upgrade::new(template, UpgradeStatus::Invalid));
                0
            }
        }
    }

    /// Find-or-create the ledger record for a template and move it to the
    /// given status, keeping the mask accumulators consistent.
    ///
    /// Reaching [`UpgradeStatus::Complete`] fires the completion fan-out:
    /// every member object of every owned team refreshes its upgrade
    /// modules.
    pub fn add_upgrade(
        &mut self,
        template: &UpgradeTemplate,
        status: UpgradeStatus,
        ctx: &mut PlayerContext<'_>,
    ) -> &Upgrade {
        let pos = self.ledger_insert(template);
        self.upgrades[pos].set_status(status);

        match status {
            UpgradeStatus::InProduction => {
                self.upgrades_in_progress.set(template.mask);
            }
            UpgradeStatus::Complete => {
                self.upgrades_in_progress.clear(template.mask);
                self.upgrades_completed.set(template.mask);
                self.on_upgrade_completed(ctx);
            }
            UpgradeStatus::Invalid => {}
        }

        if self.local_player {
            ctx.world.mark_ui_dirty();
        }

        &self.upgrades[pos]
    }

    fn on_upgrade_completed(&self, ctx: &mut PlayerContext<'_>) {
        let teams = ctx.teams;
        let world = &mut *ctx.world;
        self.for_each_owned_object(teams, |object| {
            world.refresh_upgrade_modules(object);
        });
    }

    /// Unlink a template's ledger record and clear its mask bits.
    ///
    /// Removing a completed upgrade fires the upgrade-removed hook so
    /// object modules can shut the effects down.
    pub fn remove_upgrade(&mut self, template: &UpgradeTemplate, ctx: &mut PlayerContext<'_>) {
        let Some(pos) = self
            .upgrades
            .iter()
            .position(|u| u.template_name() == template.name)
        else {
            return;
        };
        let was_complete = self
            .upgrades
            .remove(pos)
            .is_some_and(|removed| removed.status() == UpgradeStatus::Complete);

        self.upgrades_in_progress.clear(template.mask);
        self.upgrades_completed.clear(template.mask);

        if was_complete {
            ctx.world.upgrade_removed(self.player_index);
        }

        if self.local_player {
            ctx.world.mark_ui_dirty();
        }
    }

    fn delete_upgrade_list(&mut self) {
        self.upgrades.clear();
        self.upgrades_in_progress.clear_all();
        self.upgrades_completed.clear_all();
    }

    /// Whether every bit of `mask` is completed.
    #[must_use]
    pub const fn has_all_upgrades_complete(&self, mask: UpgradeMask) -> bool {
        self.upgrades_completed.test_for_all(mask)
    }

    /// Whether a template's upgrade is completed.
    #[must_use]
    pub fn has_upgrade_complete(&self, template: &UpgradeTemplate) -> bool {
        self.has_all_upgrades_complete(template.mask)
    }

    /// Whether a template's upgrade is queued.
    #[must_use]
    pub fn has_upgrade_in_production(&self, template: &UpgradeTemplate) -> bool {
        self.upgrades_in_progress.test_for_all(template.mask)
    }

    /// The in-progress mask accumulator.
    #[must_use]
    pub const fn upgrades_in_progress(&self) -> UpgradeMask {
        self.upgrades_in_progress
    }

    /// The completed mask accumulator.
    #[must_use]
    pub const fn upgrades_completed(&self) -> UpgradeMask {
        self.upgrades_completed
    }

    // ========================================
    // Rank and science progression
    // ========================================

    /// Reset rank state to level 1 and rebuild the science set.
    pub fn reset_rank(&mut self, ctx: &mut PlayerContext<'_>) {
        let store = ctx.rank_info;
        self.rank_level = 1;
        self.current_skill_points = 0;
        self.skill_points_needed_for_next_rank = store
            .rank_info(self.rank_level + 1)
            .map_or(i32::MAX, |info| info.skill_points_needed);
        self.rank_progress = 0;
        self.sciences.clear();

        self.science_purchase_points = self
            .template
            .as_ref()
            .map_or(0, |t| t.intrinsic_science_purchase_points);
        if let Some(info) = store.rank_info(self.rank_level) {
            self.science_purchase_points += info.science_purchase_points_granted;
        }

        self.science_general_name = ctx
            .text
            .fetch("SCIENCE:GeneralName")
            .unwrap_or_default()
            .to_string();

        self.reset_sciences(ctx);
    }

    /// Rebuild the acquired-science set from the template and every rank
    /// up to the current level, then notify the script engine of every
    /// science in the final set (unconditionally, per entry).
    pub fn reset_sciences(&mut self, ctx: &mut PlayerContext<'_>) {
        self.sciences.clear();
        if let Some(template) = &self.template {
            self.sciences = template.intrinsic_sciences.clone();
        }

        let store = ctx.rank_info;
        for level in 1..=self.rank_level {
            if let Some(info) = store.rank_info(level) {
                for science in &info.sciences_granted {
                    self.add_science(*science, ctx);
                }
            }
        }

        for science in &self.sciences {
            ctx.script.science_acquired(self.player_index, *science);
        }
    }

    /// Add a science to the acquired set.
    ///
    /// Returns false (leaving state untouched) when already known.
    /// Otherwise arms matching special powers on every owned object,
    /// marks the UI dirty, and notifies the script engine.
    pub fn add_science(&mut self, science: ScienceId, ctx: &mut PlayerContext<'_>) -> bool {
        if self.has_science(science) {
            return false;
        }

        self.sciences.push(science);

        let teams = ctx.teams;
        let frame = ctx.frame;
        let world = &mut *ctx.world;
        self.for_each_owned_object(teams, |object| {
            world.arm_special_power(object, science, frame);
        });
        ctx.world.mark_ui_dirty();

        ctx.script.science_acquired(self.player_index, science);
        true
    }

    /// Add a science only if the catalog marks it grantable.
    ///
    /// Granting a non-grantable science is a programming error: reported,
    /// and false is returned.
    pub fn grant_science(&mut self, science: ScienceId, ctx: &mut PlayerContext<'_>) -> bool {
        if ctx.sciences.is_grantable(science) {
            return self.add_science(science, ctx);
        }

        tracing::warn!(
            science = science.0,
            "cannot grant science marked as non-grantable"
        );
        false
    }

    /// Spend purchase points on a science, if every purchase gate passes.
    pub fn attempt_science_purchase(
        &mut self,
        science: ScienceId,
        ctx: &mut PlayerContext<'_>,
    ) -> bool {
        if !self.is_capable_of_purchasing_science(science, ctx.sciences) {
            return false;
        }

        self.science_purchase_points -= ctx.sciences.purchase_cost(science);
        self.add_science(science, ctx);
        true
    }

    /// Whether a science is in the acquired set.
    #[must_use]
    pub fn has_science(&self, science: ScienceId) -> bool {
        self.sciences.contains(&science)
    }

    /// Acquired sciences in acquisition order.
    #[must_use]
    pub fn sciences(&self) -> &[ScienceId] {
        &self.sciences
    }

    /// Whether a science is explicitly disabled.
    #[must_use]
    pub fn is_science_disabled(&self, science: ScienceId) -> bool {
        self.disabled_sciences.contains(&science)
    }

    /// Whether a science is explicitly hidden.
    #[must_use]
    pub fn is_science_hidden(&self, science: ScienceId) -> bool {
        self.hidden_sciences.contains(&science)
    }

    /// Re-categorize a science between available, disabled, and hidden.
    ///
    /// The science is removed from whichever override list currently holds
    /// it before being appended to the new one, so it can never sit in
    /// both.
    pub fn set_science_availability(
        &mut self,
        science: ScienceId,
        availability: ScienceAvailability,
    ) {
        let was_disabled = if let Some(pos) = self.disabled_sciences.iter().position(|s| *s == science) {
            self.disabled_sciences.remove(pos);
            true
        } else {
            false
        };

        if !was_disabled {
            if let Some(pos) = self.hidden_sciences.iter().position(|s| *s == science) {
                self.hidden_sciences.remove(pos);
            }
        }

        match availability {
            ScienceAvailability::Disabled => self.disabled_sciences.push(science),
            ScienceAvailability::Hidden => self.hidden_sciences.push(science),
            ScienceAvailability::Available => {}
        }
    }

    /// Whether this player's prerequisites for a science are satisfied.
    #[must_use]
    pub fn has_prereqs_for_science(&self, science: ScienceId, store: &ScienceStore) -> bool {
        store.has_prerequisites(&self.sciences, science)
    }

    /// Whether a science could be purchased right now.
    ///
    /// False for the invalid sentinel, known sciences, disabled or hidden
    /// sciences, unmet prerequisites, zero-cost sciences, and costs above
    /// the current purchase points.
    #[must_use]
    pub fn is_capable_of_purchasing_science(
        &self,
        science: ScienceId,
        store: &ScienceStore,
    ) -> bool {
        if !science.is_valid() {
            return false;
        }
        if self.has_science(science) {
            return false;
        }
        if self.is_science_disabled(science) || self.is_science_hidden(science) {
            return false;
        }
        if !self.has_prereqs_for_science(science, store) {
            return false;
        }

        let cost = store.purchase_cost(science);
        cost != 0 && cost <= self.science_purchase_points
    }

    /// Raise the rank level, granting each gained level's purchase points
    /// and sciences exactly once.
    ///
    /// Levels are clamped to the rank table; lowering the rank is not
    /// supported and reports a programming error. Returns whether the rank
    /// changed.
    pub fn set_rank_level(&mut self, new_level: i32, ctx: &mut PlayerContext<'_>) -> bool {
        let store = ctx.rank_info;
        let capped = new_level.clamp(1, store.max_rank_level().max(1));

        if new_level < self.rank_level {
            tracing::warn!(
                from = self.rank_level,
                to = new_level,
                "lowering a player's rank level is not supported"
            );
            return false;
        }
        if capped <= self.rank_level {
            return false;
        }

        for level in (self.rank_level + 1)..=capped {
            if let Some(info) = store.rank_info(level) {
                self.science_purchase_points += info.science_purchase_points_granted;
                for science in &info.sciences_granted {
                    self.add_science(*science, ctx);
                }
            }
        }

        self.rank_level = capped;
        self.skill_points_needed_for_next_rank = store
            .rank_info(capped + 1)
            .map_or(i32::MAX, |info| info.skill_points_needed);
        self.rank_progress = 0;
        ctx.world.mark_ui_dirty();
        true
    }

    /// Award skill points, scaled by the skill-points modifier, leveling
    /// up while the next-rank threshold is met.
    ///
    /// Returns whether at least one rank was gained.
    pub fn add_skill_points(&mut self, points: i32, ctx: &mut PlayerContext<'_>) -> bool {
        let scaled: i32 = (Fixed::from_num(points) * self.skill_points_modifier).to_num();
        self.current_skill_points += scaled;
        self.rank_progress += scaled;

        let mut leveled = false;
        while self.skill_points_needed_for_next_rank != i32::MAX
            && self.current_skill_points >= self.skill_points_needed_for_next_rank
        {
            if !self.set_rank_level(self.rank_level + 1, ctx) {
                break;
            }
            leveled = true;
        }
        leveled
    }

    /// Current rank level (1-based).
    #[must_use]
    pub const fn rank_level(&self) -> i32 {
        self.rank_level
    }

    /// Accumulated skill points.
    #[must_use]
    pub const fn current_skill_points(&self) -> i32 {
        self.current_skill_points
    }

    /// Skill points required for the next rank (`i32::MAX` at top rank).
    #[must_use]
    pub const fn skill_points_needed_for_next_rank(&self) -> i32 {
        self.skill_points_needed_for_next_rank
    }

    /// Unspent science purchase points.
    #[must_use]
    pub const fn science_purchase_points(&self) -> i32 {
        self.science_purchase_points
    }

    /// Grant additional science purchase points.
    pub fn add_science_purchase_points(&mut self, points: i32) {
        self.science_purchase_points += points;
    }

    /// Multiplier applied to incoming skill points.
    #[must_use]
    pub const fn skill_points_modifier(&self) -> Fixed {
        self.skill_points_modifier
    }

    /// Set the skill-point award multiplier.
    pub fn set_skill_points_modifier(&mut self, modifier: Fixed) {
        self.skill_points_modifier = modifier;
    }

    /// Localized "science general" label.
    #[must_use]
    pub fn science_general_name(&self) -> &str {
        &self.science_general_name
    }

    // ========================================
    // Production modifiers
    // ========================================

    /// Per-template cost percent adjustment; 0 when absent.
    #[must_use]
    pub fn get_production_cost_change_percent(&self, template_name: &str) -> Fixed {
        self.production_cost_changes
            .get(template_name)
            .copied()
            .unwrap_or(Fixed::ZERO)
    }

    /// Per-template time percent adjustment; 0 when absent.
    #[must_use]
    pub fn get_production_time_change_percent(&self, template_name: &str) -> Fixed {
        self.production_time_changes
            .get(template_name)
            .copied()
            .unwrap_or(Fixed::ZERO)
    }

    /// Starting veterancy for a template's production; regular when absent.
    #[must_use]
    pub fn get_production_veterancy_level(&self, template_name: &str) -> VeterancyLevel {
        self.production_veterancy_levels
            .get(template_name)
            .copied()
            .unwrap_or_default()
    }

    /// Accumulated cost multiplier for a template's kind-of tags.
    ///
    /// Starts at 1.0; every registered change entry whose filter the tags
    /// fully contain multiplies in its own `(percent + 1)` factor. Entries
    /// are each tested against the same queried set, so overlapping
    /// filters contribute independently.
    #[must_use]
    pub fn get_production_cost_change_based_on_kind_of(&self, flags: KindOfFlags) -> Fixed {
        let mut cost = Fixed::ONE;
        for change in &self.kind_of_production_cost_changes {
            if flags.test_set_and_clear(change.flags, KindOfFlags::NONE) {
                cost = (change.percent + Fixed::ONE) * cost;
            }
        }
        cost
    }

    /// Register a category-wide cost change.
    ///
    /// An identical (flags, percent) pair coalesces into the existing
    /// entry's reference count.
    pub fn add_kind_of_production_cost_change(&mut self, flags: KindOfFlags, percent: Fixed) {
        for change in &mut self.kind_of_production_cost_changes {
            if change.percent == percent && change.flags == flags {
                change.count += 1;
                return;
            }
        }

        self.kind_of_production_cost_changes
            .push(KindOfPercentProductionChange {
                flags,
                percent,
                count: 1,
            });
    }

    /// Release one grant of a category-wide cost change, deleting the
    /// entry when its count reaches zero.
    ///
    /// Removing a change that was never added is a programming error:
    /// reported, state unchanged.
    pub fn remove_kind_of_production_cost_change(&mut self, flags: KindOfFlags, percent: Fixed) {
        let Some(pos) = self
            .kind_of_production_cost_changes
            .iter()
            .position(|change| change.percent == percent && change.flags == flags)
        else {
            tracing::warn!("remove_kind_of_production_cost_change called with an unknown filter");
            return;
        };

        let change = &mut self.kind_of_production_cost_changes[pos];
        change.count -= 1;
        if change.count == 0 {
            self.kind_of_production_cost_changes.remove(pos);
        }
    }

    /// Registered category-wide cost changes, in registration order.
    #[must_use]
    pub fn kind_of_production_cost_changes(&self) -> &[KindOfPercentProductionChange] {
        &self.kind_of_production_cost_changes
    }

    // ========================================
    // Squads
    // ========================================

    /// A hotkey squad by number; `None` above index 9.
    #[must_use]
    pub fn hotkey_squad(&self, number: usize) -> Option<&Squad> {
        self.squads.get(number)
    }

    /// A hotkey squad by number, mutably.
    pub fn hotkey_squad_mut(&mut self, number: usize) -> Option<&mut Squad> {
        self.squads.get_mut(number)
    }

    /// The AI-controlled squad.
    #[must_use]
    pub const fn ai_squad(&self) -> &Squad {
        &self.ai_squad
    }

    /// The AI-controlled squad, mutably.
    pub fn ai_squad_mut(&mut self) -> &mut Squad {
        &mut self.ai_squad
    }

    /// The hotkey squad number an object is assigned to, if any.
    #[must_use]
    pub fn squad_number_for_object(&self, object: ObjectId) -> Option<usize> {
        self.squads
            .iter()
            .position(|squad| squad.is_on_squad(object))
    }

    // ========================================
    // Teams and owned objects
    // ========================================

    /// Record ownership of a team prototype. Already-known prototypes are
    /// left alone.
    pub fn add_team_to_list(&mut self, prototype: TeamPrototypeId) {
        if !self.team_prototypes.contains(&prototype) {
            self.team_prototypes.push(prototype);
        }
    }

    /// Forget a team prototype.
    pub fn remove_team_from_list(&mut self, prototype: TeamPrototypeId) {
        self.team_prototypes.retain(|p| *p != prototype);
    }

    /// Owned team prototypes, in ownership order.
    #[must_use]
    pub fn team_prototypes(&self) -> &[TeamPrototypeId] {
        &self.team_prototypes
    }

    /// Detach every owned team prototype's back-reference and forget them.
    ///
    /// The prototypes themselves stay alive in the registry; only the weak
    /// owner references die. Call at player teardown.
    pub fn detach_all_teams(&mut self, registry: &mut TeamRegistry) {
        for prototype in self.team_prototypes.drain(..) {
            registry.detach_owner(prototype);
        }
        self.default_team = None;
    }

    /// Resolve and activate the default team composed from the player
    /// name.
    ///
    /// A missing default team is a programming error: reported, default
    /// team left unset, false returned.
    pub fn set_default_team(&mut self, registry: &mut TeamRegistry) -> bool {
        let name = format!("team{}", self.name);
        let Some(id) = registry.find_team_by_name(&name).map(|team| team.id) else {
            tracing::warn!(team_name = %name, "no default team with the composed name");
            return false;
        };

        self.default_team = Some(id);
        if let Some(team) = registry.team_mut(id) {
            team.active = true;
        }
        true
    }

    /// The default team, if one has been resolved.
    #[must_use]
    pub const fn default_team(&self) -> Option<TeamId> {
        self.default_team
    }

    /// The pre-placed build list, in build order.
    #[must_use]
    pub fn build_list(&self) -> &[BuildListInfo] {
        &self.build_list
    }

    /// Replace the build list wholesale.
    pub fn set_build_list(&mut self, entries: Vec<BuildListInfo>) {
        self.build_list = entries;
    }

    fn for_each_owned_object(&self, teams: &TeamRegistry, mut f: impl FnMut(ObjectId)) {
        for proto_id in &self.team_prototypes {
            let Some(proto) = teams.find_prototype(*proto_id) else {
                continue;
            };
            for team_id in &proto.instances {
                let Some(team) = teams.find_team(*team_id) else {
                    continue;
                };
                for object in &team.members {
                    f(*object);
                }
            }
        }
    }

    /// Total member objects across every owned team.
    #[must_use]
    pub fn count_owned_objects(&self, teams: &TeamRegistry) -> usize {
        let mut count = 0;
        self.for_each_owned_object(teams, |_| count += 1);
        count
    }

    /// Whether any owned team has any member object.
    #[must_use]
    pub fn has_any_objects(&self, teams: &TeamRegistry) -> bool {
        self.count_owned_objects(teams) > 0
    }

    /// A unit this player owns finished production.
    pub fn on_unit_created(
        &mut self,
        _factory: ObjectId,
        _unit: ObjectId,
        ctx: &mut PlayerContext<'_>,
    ) {
        ctx.script.object_count_changed();
        self.score.add_unit_built();
    }

    /// A structure this player owns finished construction.
    pub fn on_structure_created(
        &mut self,
        _builder: ObjectId,
        _structure: ObjectId,
        ctx: &mut PlayerContext<'_>,
    ) {
        ctx.script.object_count_changed();
        self.score.add_building_built();
    }

    /// A structure this player owns was sold or unbuilt.
    pub fn on_structure_undone(&mut self, _structure: ObjectId) {
        self.score.remove_building_built();
    }

    // ========================================
    // Economy, radar, misc state
    // ========================================

    /// Cash reserve.
    #[must_use]
    pub const fn money(&self) -> &Money {
        &self.money
    }

    /// Cash reserve, mutably.
    pub fn money_mut(&mut self) -> &mut Money {
        &mut self.money
    }

    /// Power grid state.
    #[must_use]
    pub const fn energy(&self) -> &Energy {
        &self.energy
    }

    /// Power grid state, mutably.
    pub fn energy_mut(&mut self) -> &mut Energy {
        &mut self.energy
    }

    /// Score counters.
    #[must_use]
    pub const fn score(&self) -> &ScoreKeeper {
        &self.score
    }

    /// Score counters, mutably.
    pub fn score_mut(&mut self) -> &mut ScoreKeeper {
        &mut self.score
    }

    /// Production handicap bundle.
    #[must_use]
    pub const fn handicap(&self) -> &Handicap {
        &self.handicap
    }

    /// Whether a build cost is affordable right now.
    #[must_use]
    pub const fn can_afford_build(&self, cost: u32) -> bool {
        self.money.can_afford(cost)
    }

    /// Whether a template with the given tags may currently be built.
    #[must_use]
    pub fn allowed_to_build(&self, kind_of: KindOfFlags) -> bool {
        let is_structure = kind_of.contains_all(KindOfFlags::STRUCTURE);
        if !self.can_build_base && is_structure {
            return false;
        }
        self.can_build_units || is_structure
    }

    /// Allow or forbid unit production.
    pub fn set_can_build_units(&mut self, can_build: bool) {
        self.can_build_units = can_build;
    }

    /// Allow or forbid base construction.
    pub fn set_can_build_base(&mut self, can_build: bool) {
        self.can_build_base = can_build;
    }

    /// Whether this player currently has radar coverage.
    #[must_use]
    pub const fn has_radar(&self) -> bool {
        (!self.radar_disabled || self.disable_proof_radar_count != 0) && self.radar_count > 0
    }

    /// Register a radar-providing structure.
    pub fn add_radar(&mut self, disable_proof: bool) {
        self.radar_count += 1;
        if disable_proof {
            self.disable_proof_radar_count += 1;
        }
    }

    /// Unregister a radar-providing structure.
    pub fn remove_radar(&mut self, disable_proof: bool) {
        self.radar_count -= 1;
        if disable_proof {
            self.disable_proof_radar_count -= 1;
        }
    }

    /// Jam or restore this player's radar.
    pub fn set_radar_disabled(&mut self, disabled: bool) {
        self.radar_disabled = disabled;
    }

    /// Record an attack from another player.
    pub fn set_attacked_by(&mut self, attacker: PlayerIndex, frame: u32) {
        self.attacked_by[attacker.as_usize()] = true;
        self.last_attacked_by_frame = frame;
    }

    /// Whether a player has attacked this one during the match.
    #[must_use]
    pub const fn get_attacked_by(&self, attacker: PlayerIndex) -> bool {
        self.attacked_by[attacker.as_usize()]
    }

    /// Frame of the most recent attack against this player.
    #[must_use]
    pub const fn last_attacked_by_frame(&self) -> u32 {
        self.last_attacked_by_frame
    }

    /// Extra cost multiplier levied on this player's production.
    #[must_use]
    pub const fn bounty_cost_to_build(&self) -> Fixed {
        self.bounty_cost_to_build
    }

    /// Set the production bounty multiplier.
    pub fn set_bounty_cost_to_build(&mut self, bounty: Fixed) {
        self.bounty_cost_to_build = bounty;
    }

    /// Whether this player appears on the score screen.
    #[must_use]
    pub const fn list_in_score_screen(&self) -> bool {
        self.list_in_score_screen
    }

    /// Show or hide this player on the score screen.
    pub fn set_list_in_score_screen(&mut self, listed: bool) {
        self.list_in_score_screen = listed;
    }

    /// Whether this player preordered (cosmetic content flag).
    #[must_use]
    pub const fn is_preorder(&self) -> bool {
        self.preorder
    }

    /// Set the preorder flag.
    pub fn set_preorder(&mut self, preorder: bool) {
        self.preorder = preorder;
    }

    /// Whether this player's idle units should hunt.
    #[must_use]
    pub const fn units_should_hunt(&self) -> bool {
        self.units_should_hunt
    }

    /// Toggle idle-unit hunting.
    pub fn set_units_should_hunt(&mut self, hunt: bool) {
        self.units_should_hunt = hunt;
    }

    // ========================================
    // Attachments
    // ========================================

    /// The AI attachment, if this is an AI-driven slot.
    #[must_use]
    pub const fn ai(&self) -> Option<&AiState> {
        self.ai.as_ref()
    }

    /// Attach or detach the AI state.
    pub fn set_ai(&mut self, ai: Option<AiState>) {
        self.ai = ai;
    }

    /// The resource-gathering attachment.
    #[must_use]
    pub const fn resource_manager(&self) -> Option<&ResourceManagerState> {
        self.resource_manager.as_ref()
    }

    /// Attach or detach the resource-gathering state.
    pub fn set_resource_manager(&mut self, manager: Option<ResourceManagerState>) {
        self.resource_manager = manager;
    }

    /// The tunnel-network attachment.
    #[must_use]
    pub const fn tunnel_network(&self) -> Option<&TunnelNetwork> {
        self.tunnel_network.as_ref()
    }

    /// Attach or detach the tunnel-network state.
    pub fn set_tunnel_network(&mut self, network: Option<TunnelNetwork>) {
        self.tunnel_network = network;
    }

    // ========================================
    // Battle plans
    // ========================================

    /// The battle-plan bonus bundle, if any plan is in effect.
    #[must_use]
    pub const fn battle_plan_bonuses(&self) -> Option<&BattlePlanBonuses> {
        self.battle_plan_bonuses.as_ref()
    }

    /// Install or clear the battle-plan bonus bundle.
    pub fn set_battle_plan_bonuses(&mut self, bonuses: Option<BattlePlanBonuses>) {
        self.battle_plan_bonuses = bonuses;
    }

    /// Put one battle plan into effect.
    pub fn activate_battle_plan(&mut self, plan: BattlePlan) {
        self.active_battle_plans[plan.slot()] += 1;
    }

    /// Take one battle plan out of effect.
    pub fn deactivate_battle_plan(&mut self, plan: BattlePlan) {
        let slot = &mut self.active_battle_plans[plan.slot()];
        *slot = (*slot - 1).max(0);
    }

    /// How many applications of a plan are in effect.
    #[must_use]
    pub const fn active_battle_plan_count(&self, plan: BattlePlan) -> i32 {
        self.active_battle_plans[plan.slot()]
    }

    /// Whether an object with the given tags qualifies for the current
    /// battle-plan bonuses.
    #[must_use]
    pub fn does_object_qualify_for_battle_plan(&self, kind_of: KindOfFlags) -> bool {
        self.battle_plan_bonuses
            .as_ref()
            .is_some_and(|bonuses| bonuses.qualifies(kind_of))
    }

    // ========================================
    // Special power timers
    // ========================================

    /// Shared special-power ready timers, in registration order.
    #[must_use]
    pub fn special_power_ready_timers(&self) -> &[SpecialPowerReadyTimer] {
        &self.special_power_ready_timers
    }

    /// Upsert the ready frame for a shared special power.
    pub fn set_special_power_ready_frame(&mut self, id: u32, frame: u32) {
        if let Some(timer) = self
            .special_power_ready_timers
            .iter_mut()
            .find(|t| t.id == id)
        {
            timer.frame = frame;
            return;
        }
        self.special_power_ready_timers
            .push(SpecialPowerReadyTimer { id, frame });
    }

    /// The ready frame for a shared special power, if tracked.
    #[must_use]
    pub fn special_power_ready_frame(&self, id: u32) -> Option<u32> {
        self.special_power_ready_timers
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.frame)
    }

    // ========================================
    // Serialization
    // ========================================

    /// Run the versioned snapshot walk at the current schema version.
    pub fn xfer_snapshot(&mut self, xfer: &mut Xfer, ctx: &XferContext<'_>) -> Result<()> {
        self.xfer_snapshot_at(xfer, ctx, PLAYER_SNAPSHOT_VERSION)
    }

    /// Run the versioned snapshot walk, saving at an explicit (older)
    /// schema version.
    ///
    /// Load mode ignores `version` and honors the stream's own tag. Saving
    /// below the current version exists for compatibility tooling and
    /// version-gate tests; fields a version predates are simply skipped.
    pub fn xfer_snapshot_at(
        &mut self,
        xfer: &mut Xfer,
        ctx: &XferContext<'_>,
        version: u8,
    ) -> Result<()> {
        if version == 0 || version > PLAYER_SNAPSHOT_VERSION {
            return Err(StateError::CorruptSnapshot(format!(
                "cannot save player snapshot at version {version}"
            )));
        }

        let mut version = version;
        xfer.xfer_version(&mut version, PLAYER_SNAPSHOT_VERSION)?;

        self.money.xfer_snapshot(xfer)?;

        let upgrade_count = xfer.xfer_count(self.upgrades.len())?;

        if version >= 7 {
            xfer.xfer_bool(&mut self.preorder)?;
        }

        if version >= 8 {
            xfer_science_vec(xfer, &mut self.disabled_sciences)?;
            xfer_science_vec(xfer, &mut self.hidden_sciences)?;
        }

        match xfer.mode() {
            XferMode::Save => {
                for pos in 0..self.upgrades.len() {
                    let mut name = self.upgrades[pos].template_name().to_string();
                    xfer.xfer_ascii_string(&mut name)?;
                    self.upgrades[pos].xfer_snapshot(xfer)?;
                }
            }
            XferMode::Load => {
                for _ in 0..upgrade_count {
                    let mut name = String::new();
                    xfer.xfer_ascii_string(&mut name)?;
                    let template = ctx
                        .upgrades
                        .find_upgrade(&name)
                        .ok_or_else(|| StateError::UnknownUpgradeTemplate(name.clone()))?
                        .clone();
                    let pos = self.ledger_insert(&template);
                    self.upgrades[pos].xfer_snapshot(xfer)?;
                }
            }
        }

        xfer.xfer_i32(&mut self.radar_count)?;
        xfer.xfer_bool(&mut self.dead)?;
        xfer.xfer_i32(&mut self.disable_proof_radar_count)?;
        xfer.xfer_bool(&mut self.radar_disabled)?;
        self.upgrades_in_progress.xfer_snapshot(xfer)?;
        self.upgrades_completed.xfer_snapshot(xfer)?;
        self.energy.xfer_snapshot(xfer)?;

        let team_count = xfer.xfer_count(self.team_prototypes.len())?;
        match xfer.mode() {
            XferMode::Save => {
                for prototype in &mut self.team_prototypes {
                    xfer.xfer_u32(&mut prototype.0)?;
                }
            }
            XferMode::Load => {
                self.team_prototypes.clear();
                for _ in 0..team_count {
                    let mut id = 0u32;
                    xfer.xfer_u32(&mut id)?;
                    if ctx.teams.find_prototype(TeamPrototypeId(id)).is_none() {
                        return Err(StateError::UnknownTeamPrototype(id));
                    }
                    self.team_prototypes.push(TeamPrototypeId(id));
                }
            }
        }

        let build_list_count = xfer.xfer_count(self.build_list.len())?;
        match xfer.mode() {
            XferMode::Save => {
                for entry in &mut self.build_list {
                    entry.xfer_snapshot(xfer)?;
                }
            }
            XferMode::Load => {
                self.build_list.clear();
                for _ in 0..build_list_count {
                    let mut entry = BuildListInfo::default();
                    entry.xfer_snapshot(xfer)?;
                    self.build_list.push(entry);
                }
            }
        }

        let mut has_ai = self.ai.is_some();
        xfer.xfer_bool(&mut has_ai)?;
        if xfer.mode() == XferMode::Load {
            if has_ai {
                self.ai.get_or_insert_with(AiState::default);
            } else {
                self.ai = None;
            }
        }
        if let Some(ai) = self.ai.as_mut() {
            ai.xfer_snapshot(xfer)?;
        }

        let mut has_resource_manager = self.resource_manager.is_some();
        xfer.xfer_bool(&mut has_resource_manager)?;
        if xfer.mode() == XferMode::Load {
            if has_resource_manager {
                self.resource_manager
                    .get_or_insert_with(ResourceManagerState::default);
            } else {
                self.resource_manager = None;
            }
        }
        if let Some(manager) = self.resource_manager.as_mut() {
            manager.xfer_snapshot(xfer)?;
        }

        let mut has_tunnel_network = self.tunnel_network.is_some();
        xfer.xfer_bool(&mut has_tunnel_network)?;
        if xfer.mode() == XferMode::Load {
            if has_tunnel_network {
                self.tunnel_network.get_or_insert_with(TunnelNetwork::default);
            } else {
                self.tunnel_network = None;
            }
        }
        if let Some(network) = self.tunnel_network.as_mut() {
            network.xfer_snapshot(xfer)?;
        }

        let mut default_team_id = self.default_team.map_or(0, |team| team.0);
        xfer.xfer_u32(&mut default_team_id)?;
        if xfer.mode() == XferMode::Load {
            if default_team_id == 0 {
                self.default_team = None;
            } else if ctx.teams.find_team(TeamId(default_team_id)).is_some() {
                self.default_team = Some(TeamId(default_team_id));
            } else {
                tracing::warn!(
                    team_id = default_team_id,
                    "default team id could not be resolved on load"
                );
                self.default_team = None;
            }
        }

        if version < 5 {
            // Legacy fixed-width science list: appends over whatever init
            // seeded instead of replacing it.
            let science_count = xfer.xfer_count(self.sciences.len())?;
            match xfer.mode() {
                XferMode::Save => {
                    for science in &mut self.sciences {
                        science.xfer(xfer)?;
                    }
                }
                XferMode::Load => {
                    for _ in 0..science_count {
                        let mut science = ScienceId::default();
                        science.xfer(xfer)?;
                        self.sciences.push(science);
                    }
                }
            }
        } else {
            xfer_science_vec(xfer, &mut self.sciences)?;
        }

        xfer.xfer_i32(&mut self.rank_level)?;
        xfer.xfer_i32(&mut self.current_skill_points)?;
        xfer.xfer_i32(&mut self.science_purchase_points)?;
        xfer.xfer_i32(&mut self.skill_points_needed_for_next_rank)?;
        xfer.xfer_i32(&mut self.rank_progress)?;
        xfer.xfer_unicode_string(&mut self.science_general_name)?;
        self.player_relations.xfer_snapshot(xfer)?;
        self.team_relations.xfer_snapshot(xfer)?;
        xfer.xfer_bool(&mut self.can_build_units)?;
        xfer.xfer_bool(&mut self.can_build_base)?;
        xfer.xfer_bool(&mut self.observer)?;

        if version < 2 {
            if xfer.mode() == XferMode::Load {
                self.skill_points_modifier = Fixed::ONE;
            }
        } else {
            xfer.xfer_real(&mut self.skill_points_modifier)?;
        }

        if version < 3 {
            if xfer.mode() == XferMode::Load {
                self.list_in_score_screen = true;
            }
        } else {
            xfer.xfer_bool(&mut self.list_in_score_screen)?;
        }

        let mut attacked = [0u8; MAX_PLAYER_COUNT];
        for (byte, flag) in attacked.iter_mut().zip(self.attacked_by.iter()) {
            *byte = u8::from(*flag);
        }
        xfer.xfer_bytes(&mut attacked)?;
        if xfer.mode() == XferMode::Load {
            for (flag, byte) in self.attacked_by.iter_mut().zip(attacked.iter()) {
                *flag = *byte != 0;
            }
        }

        xfer.xfer_real(&mut self.bounty_cost_to_build)?;
        self.score.xfer_snapshot(xfer)?;

        if xfer.mode() == XferMode::Load && !self.kind_of_production_cost_changes.is_empty() {
            return Err(StateError::CorruptSnapshot(
                "kind-of production change list should be empty before load".into(),
            ));
        }
        let change_count = xfer.xfer_count(self.kind_of_production_cost_changes.len())?;
        match xfer.mode() {
            XferMode::Save => {
                for change in &mut self.kind_of_production_cost_changes {
                    change.flags.xfer_snapshot(xfer)?;
                    xfer.xfer_real(&mut change.percent)?;
                    xfer.xfer_u32(&mut change.count)?;
                }
            }
            XferMode::Load => {
                for _ in 0..change_count {
                    let mut change = KindOfPercentProductionChange {
                        flags: KindOfFlags::NONE,
                        percent: Fixed::ZERO,
                        count: 0,
                    };
                    change.flags.xfer_snapshot(xfer)?;
                    xfer.xfer_real(&mut change.percent)?;
                    xfer.xfer_u32(&mut change.count)?;
                    self.kind_of_production_cost_changes.push(change);
                }
            }
        }

        if version > 4 {
            if xfer.mode() == XferMode::Load && !self.special_power_ready_timers.is_empty() {
                return Err(StateError::CorruptSnapshot(
                    "special power timer list should be empty before load".into(),
                ));
            }
            let timer_count = xfer.xfer_count(self.special_power_ready_timers.len())?;
            match xfer.mode() {
                XferMode::Save => {
                    for timer in &mut self.special_power_ready_timers {
                        xfer.xfer_u32(&mut timer.id)?;
                        xfer.xfer_u32(&mut timer.frame)?;
                    }
                }
                XferMode::Load => {
                    for _ in 0..timer_count {
                        let mut timer = SpecialPowerReadyTimer { id: 0, frame: 0 };
                        xfer.xfer_u32(&mut timer.id)?;
                        xfer.xfer_u32(&mut timer.frame)?;
                        self.special_power_ready_timers.push(timer);
                    }
                }
            }
        } else if xfer.mode() == XferMode::Load {
            self.special_power_ready_timers.clear();
        }

        let mut squad_count = SQUAD_COUNT as u16;
        xfer.xfer_u16(&mut squad_count)?;
        if xfer.mode() == XferMode::Load && usize::from(squad_count) != SQUAD_COUNT {
            return Err(StateError::CorruptSnapshot(format!(
                "squad count {squad_count} does not match the fixed roster size"
            )));
        }
        for squad in &mut self.squads {
            squad.xfer_snapshot(xfer)?;
        }

        let mut has_ai_squad = true;
        xfer.xfer_bool(&mut has_ai_squad)?;
        if has_ai_squad {
            self.ai_squad.xfer_snapshot(xfer)?;
        } else if xfer.mode() == XferMode::Load {
            self.ai_squad = Squad::new();
        }

        let mut has_battle_plan_bonuses = self.battle_plan_bonuses.is_some();
        xfer.xfer_bool(&mut has_battle_plan_bonuses)?;
        if xfer.mode() == XferMode::Load {
            self.battle_plan_bonuses = has_battle_plan_bonuses.then(BattlePlanBonuses::default);
        }
        if let Some(bonuses) = self.battle_plan_bonuses.as_mut() {
            bonuses.xfer_snapshot(xfer)?;
        }

        for slot in &mut self.active_battle_plans {
            xfer.xfer_i32(slot)?;
        }

        if version < 6 {
            if xfer.mode() == XferMode::Load {
                self.units_should_hunt = false;
            }
        } else {
            xfer.xfer_bool(&mut self.units_should_hunt)?;
        }

        Ok(())
    }

    /// Short desync-detection stream: battle-plan bonuses and progression
    /// points only.
    pub fn crc_snapshot(&mut self, xfer: &mut Xfer) -> Result<()> {
        let mut has_bonuses = self.battle_plan_bonuses.is_some();
        xfer.xfer_bool(&mut has_bonuses)?;
        if xfer.mode() == XferMode::Load {
            self.battle_plan_bonuses = has_bonuses.then(BattlePlanBonuses::default);
        }
        if let Some(bonuses) = self.battle_plan_bonuses.as_mut() {
            bonuses.xfer_snapshot(xfer)?;
        }

        xfer.xfer_i32(&mut self.current_skill_points)?;
        xfer.xfer_i32(&mut self.science_purchase_points)?;
        Ok(())
    }

    /// Hash of the CRC snapshot, for cross-client desync checks.
    #[must_use]
    pub fn state_hash(&mut self) -> u64 {
        let mut xfer = Xfer::saver();
        // Save mode touches no fallible decode path.
        let _ = self.crc_snapshot(&mut xfer);
        let mut hasher = DefaultHasher::new();
        xfer.into_bytes().hash(&mut hasher);
        hasher.finish()
    }
}
