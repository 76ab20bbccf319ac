//! Recording implementations of the player's collaborator hooks.
//!
//! Each hook call is appended to a public log so tests can assert on the
//! exact fan-out a mutation produced.

use player_core::hooks::{GameDifficulty, ScriptHooks, WorldHooks};
use player_core::player::PlayerIndex;
use player_core::science::ScienceId;
use player_core::team::{ObjectId, TeamId};

/// Script-engine hooks that record every notification.
#[derive(Debug, Default)]
pub struct RecordingScript {
    /// Difficulty reported to callers.
    pub difficulty: GameDifficulty,
    /// Every science-acquired notification, in call order.
    pub acquired: Vec<(PlayerIndex, ScienceId)>,
    /// Number of object created/destroyed notifications.
    pub object_events: u32,
}

impl ScriptHooks for RecordingScript {
    fn difficulty(&self) -> GameDifficulty {
        self.difficulty
    }

    fn science_acquired(&mut self, player: PlayerIndex, science: ScienceId) {
        self.acquired.push((player, science));
    }

    fn object_count_changed(&mut self) {
        self.object_events += 1;
    }
}

/// World hooks that record every notification.
#[derive(Debug, Default)]
pub struct RecordingWorld {
    /// Objects told to refresh their upgrade modules, in call order.
    pub refreshed: Vec<ObjectId>,
    /// Players whose completed upgrade was removed.
    pub upgrade_removals: Vec<PlayerIndex>,
    /// Special powers armed: (object, science, ready frame).
    pub armed: Vec<(ObjectId, ScienceId, u32)>,
    /// Number of UI-dirty marks.
    pub ui_dirty: u32,
    /// AI update delegations, in call order.
    pub ai_updates: Vec<PlayerIndex>,
    /// Team generic-script update delegations, in call order.
    pub team_script_updates: Vec<TeamId>,
    /// Brown-out notifications: (player, browned out).
    pub brownouts: Vec<(PlayerIndex, bool)>,
}

impl WorldHooks for RecordingWorld {
    fn refresh_upgrade_modules(&mut self, object: ObjectId) {
        self.refreshed.push(object);
    }

    fn upgrade_removed(&mut self, player: PlayerIndex) {
        self.upgrade_removals.push(player);
    }

    fn arm_special_power(&mut self, object: ObjectId, science: ScienceId, ready_frame: u32) {
        self.armed.push((object, science, ready_frame));
    }

    fn mark_ui_dirty(&mut self) {
        self.ui_dirty += 1;
    }

    fn update_ai(&mut self, player: PlayerIndex) {
        self.ai_updates.push(player);
    }

    fn update_team_scripts(&mut self, team: TeamId) {
        self.team_script_updates.push(team);
    }

    fn power_brownout_changed(&mut self, player: PlayerIndex, browned_out: bool) {
        self.brownouts.push((player, browned_out));
    }
}
