//! Round-trip and version-compatibility tests for the player snapshot.
//!
//! These drive the full ordered stream through a populated player and
//! verify the reloaded player is observationally identical, plus the
//! version gates that keep older streams decodable.

use player_core::attachments::{AiState, ResourceManagerState, TunnelNetwork};
use player_core::battle_plan::{BattlePlan, BattlePlanBonuses};
use player_core::build_list::BuildListInfo;
use player_core::hooks::GameDifficulty;
use player_core::prelude::*;
use player_core::science::ScienceAvailability;
use player_core::snapshot::SaveFile;
use player_test_utils::fixtures::{
    player_template, SCIENCE_SALVAGE_NETWORK, SCIENCE_SCAVENGER,
};
use player_test_utils::TestHarness;

fn fresh_player(harness: &mut TestHarness, index: u8) -> PlayerState {
    let template = player_template();
    let mut ctx = harness.ctx(0);
    let mut player = PlayerState::new(PlayerIndex(index), &mut ctx);
    player.init(Some(&template), &mut ctx);
    player
}

/// Build a player exercising every snapshot section.
fn populated_player(harness: &mut TestHarness) -> PlayerState {
    let (proto_a, team_a) = harness.add_team(PlayerIndex(0), "teamAlpha", &[1, 2]);
    let (proto_b, _) = harness.add_team(PlayerIndex(0), "teamBravo", &[3]);
    let default_proto = harness.teams.create_prototype("default", Some(PlayerIndex(0)));
    harness
        .teams
        .create_team(default_proto, "teamCommander")
        .unwrap();

    let mut player = fresh_player(harness, 0);
    player.set_name("Commander");
    player.set_display_name("Commander Vale");

    player.set_player_relationship(Some(PlayerIndex(1)), Relationship::Enemies);
    player.set_player_relationship(Some(PlayerIndex(2)), Relationship::Allies);
    player.set_team_relationship(Some(team_a), Relationship::Allies);

    let composites = harness
        .upgrades
        .find_upgrade("UpgradeComposites")
        .unwrap()
        .clone();
    let drones = harness.upgrades.find_upgrade("UpgradeDrones").unwrap().clone();
    {
        let mut ctx = harness.ctx(0);
        player.add_upgrade(&composites, UpgradeStatus::Complete, &mut ctx);
        player.add_upgrade(&drones, UpgradeStatus::InProduction, &mut ctx);
    }

    player.add_team_to_list(proto_a);
    player.add_team_to_list(proto_b);
    player.set_default_team(&mut harness.teams);

    player.set_build_list(vec![
        BuildListInfo {
            template_name: "PowerPlant".into(),
            x: Fixed::from_num(100),
            y: Fixed::from_num(200),
            angle: Fixed::from_num(0),
            initially_built: true,
            num_rebuilds: 1,
            script: String::new(),
        },
        BuildListInfo {
            template_name: "Barracks".into(),
            x: Fixed::from_num(140),
            y: Fixed::from_num(180),
            angle: Fixed::from_num(1.5),
            initially_built: false,
            num_rebuilds: 0,
            script: "OnBuilt".into(),
        },
    ]);

    player.set_ai(Some(AiState {
        difficulty: GameDifficulty::Hard,
        skillset: 2,
    }));
    player.set_resource_manager(Some(ResourceManagerState {
        pending_supply_sources: vec![ObjectId(40), ObjectId(41)],
    }));
    player.set_tunnel_network(Some(TunnelNetwork {
        tunnels: vec![ObjectId(50)],
        occupants: vec![ObjectId(51), ObjectId(52)],
    }));

    player.set_battle_plan_bonuses(Some(BattlePlanBonuses {
        armor_bonus: Fixed::from_num(1.1),
        sight_bonus: Fixed::from_num(1.2),
        bombardment: 1,
        hold_the_line: 0,
        search_and_destroy: 0,
        valid_kind_of: KindOfFlags::INFANTRY,
        invalid_kind_of: KindOfFlags::AIRCRAFT,
    }));
    player.activate_battle_plan(BattlePlan::Bombardment);

    player.hotkey_squad_mut(0).unwrap().add_object(ObjectId(1));
    player.hotkey_squad_mut(0).unwrap().add_object(ObjectId(2));
    player.hotkey_squad_mut(7).unwrap().add_object(ObjectId(3));
    player.ai_squad_mut().add_object(ObjectId(3));

    {
        let mut ctx = harness.ctx(0);
        player.add_science(SCIENCE_SCAVENGER, &mut ctx);
        player.add_skill_points(120, &mut ctx);
    }
    player.set_science_availability(SCIENCE_SALVAGE_NETWORK, ScienceAvailability::Hidden);
    player.set_skill_points_modifier(Fixed::from_num(1.5));

    player.add_kind_of_production_cost_change(KindOfFlags::VEHICLE, Fixed::from_num(0.1));
    player.add_kind_of_production_cost_change(
        KindOfFlags::STRUCTURE | KindOfFlags::BASE_DEFENSE,
        Fixed::from_num(-0.2),
    );
    player.set_special_power_ready_frame(3, 900);
    player.set_special_power_ready_frame(4, 1200);

    player.add_radar(false);
    player.add_radar(true);
    player.set_radar_disabled(true);
    player.set_attacked_by(PlayerIndex(1), 64);
    player.set_bounty_cost_to_build(Fixed::from_num(0.05));
    player.money_mut().deposit(700);
    player.energy_mut().adjust_production(8);
    player.energy_mut().adjust_consumption(5);
    player.score_mut().add_unit_built();
    player.score_mut().add_building_built();

    player.set_preorder(true);
    player.set_units_should_hunt(true);
    player.set_list_in_score_screen(false);
    player.set_dead(false);

    player
}

fn save_player(player: &mut PlayerState, harness: &TestHarness) -> Vec<u8> {
    let mut xfer = Xfer::saver();
    let ctx = harness.xfer_ctx();
    player.xfer_snapshot(&mut xfer, &ctx).unwrap();
    xfer.into_bytes()
}

fn load_player(bytes: Vec<u8>, player: &mut PlayerState, harness: &TestHarness) {
    let mut xfer = Xfer::loader(bytes);
    let ctx = harness.xfer_ctx();
    player.xfer_snapshot(&mut xfer, &ctx).unwrap();
    assert_eq!(xfer.remaining(), 0, "stream should be fully consumed");
}

#[test]
fn roundtrip_at_current_version_is_observationally_identical() {
    let mut harness = TestHarness::new();
    let mut source = populated_player(&mut harness);
    let bytes = save_player(&mut source, &harness);

    let mut loaded = fresh_player(&mut harness, 0);
    load_player(bytes, &mut loaded, &harness);

    // Relationships.
    let team_a = harness.teams.find_team_by_name("teamAlpha0").unwrap().id;
    let team_b = harness.teams.find_team_by_name("teamBravo0").unwrap().id;
    assert_eq!(
        loaded.get_relationship(harness.teams.find_team(team_a)),
        Relationship::Allies
    );
    assert_eq!(
        loaded.get_relationship(harness.teams.find_team(team_b)),
        source.get_relationship(harness.teams.find_team(team_b))
    );

    // Upgrade ledger: identical record set and status, identical masks.
    assert_eq!(loaded.upgrades().len(), source.upgrades().len());
    for record in source.upgrades() {
        let counterpart = loaded.find_upgrade(record.template_name()).unwrap();
        assert_eq!(counterpart.status(), record.status());
    }
    assert_eq!(loaded.upgrades_in_progress(), source.upgrades_in_progress());
    assert_eq!(loaded.upgrades_completed(), source.upgrades_completed());

    // Sciences, rank, progression.
    assert_eq!(loaded.sciences(), source.sciences());
    assert!(loaded.is_science_hidden(SCIENCE_SALVAGE_NETWORK));
    assert_eq!(loaded.rank_level(), source.rank_level());
    assert_eq!(loaded.current_skill_points(), source.current_skill_points());
    assert_eq!(
        loaded.skill_points_needed_for_next_rank(),
        source.skill_points_needed_for_next_rank()
    );
    assert_eq!(
        loaded.science_purchase_points(),
        source.science_purchase_points()
    );
    assert_eq!(loaded.skill_points_modifier(), source.skill_points_modifier());
    assert_eq!(loaded.science_general_name(), source.science_general_name());

    // Squads.
    for squad in 0..SQUAD_COUNT {
        assert_eq!(
            loaded.hotkey_squad(squad).unwrap().objects(),
            source.hotkey_squad(squad).unwrap().objects()
        );
    }
    assert_eq!(loaded.ai_squad().objects(), source.ai_squad().objects());

    // Teams and build list.
    assert_eq!(loaded.team_prototypes(), source.team_prototypes());
    assert_eq!(loaded.default_team(), source.default_team());
    assert_eq!(loaded.build_list(), source.build_list());

    // Attachments.
    assert_eq!(loaded.ai(), source.ai());
    assert_eq!(loaded.resource_manager(), source.resource_manager());
    assert_eq!(loaded.tunnel_network(), source.tunnel_network());

    // Battle plans.
    assert_eq!(loaded.battle_plan_bonuses(), source.battle_plan_bonuses());
    assert_eq!(
        loaded.active_battle_plan_count(BattlePlan::Bombardment),
        source.active_battle_plan_count(BattlePlan::Bombardment)
    );

    // Economy, score, radar, misc flags.
    assert_eq!(loaded.money().amount(), source.money().amount());
    assert_eq!(loaded.energy(), source.energy());
    assert_eq!(loaded.score(), source.score());
    assert_eq!(loaded.has_radar(), source.has_radar());
    assert_eq!(
        loaded.get_attacked_by(PlayerIndex(1)),
        source.get_attacked_by(PlayerIndex(1))
    );
    assert_eq!(loaded.bounty_cost_to_build(), source.bounty_cost_to_build());
    assert_eq!(loaded.is_preorder(), source.is_preorder());
    assert_eq!(loaded.units_should_hunt(), source.units_should_hunt());
    assert_eq!(loaded.list_in_score_screen(), source.list_in_score_screen());
    assert_eq!(loaded.is_dead(), source.is_dead());
    assert_eq!(
        loaded.special_power_ready_timers(),
        source.special_power_ready_timers()
    );
    assert_eq!(
        loaded.kind_of_production_cost_changes(),
        source.kind_of_production_cost_changes()
    );

    // The desync hash agrees.
    assert_eq!(loaded.state_hash(), source.state_hash());
}

#[test]
fn version_4_stream_loads_with_gated_defaults() {
    let mut harness = TestHarness::new();
    let mut source = fresh_player(&mut harness, 0);
    source.set_special_power_ready_frame(3, 900);
    source.set_preorder(true);
    source.set_units_should_hunt(true);
    source.set_science_availability(SCIENCE_SALVAGE_NETWORK, ScienceAvailability::Disabled);
    source.set_skill_points_modifier(Fixed::from_num(2));

    let mut xfer = Xfer::saver();
    {
        let ctx = harness.xfer_ctx();
        source.xfer_snapshot_at(&mut xfer, &ctx, 4).unwrap();
    }

    let mut loaded = {
        let mut ctx = harness.ctx(0);
        PlayerState::new(PlayerIndex(0), &mut ctx)
    };
    let ctx = harness.xfer_ctx();
    let mut load = Xfer::loader(xfer.into_bytes());
    loaded.xfer_snapshot(&mut load, &ctx).unwrap();
    assert_eq!(load.remaining(), 0);

    // Sections a version-4 stream predates come back as defaults.
    assert!(loaded.special_power_ready_timers().is_empty());
    assert!(!loaded.is_preorder());
    assert!(!loaded.units_should_hunt());
    assert!(!loaded.is_science_disabled(SCIENCE_SALVAGE_NETWORK));
    // The modifier field exists from version 2 onward.
    assert_eq!(loaded.skill_points_modifier(), Fixed::from_num(2));
    // The legacy science list still made it across.
    assert_eq!(loaded.sciences(), source.sciences());
}

#[test]
fn version_1_stream_forces_oldest_defaults() {
    let mut harness = TestHarness::new();
    let mut source = fresh_player(&mut harness, 0);
    source.set_skill_points_modifier(Fixed::from_num(2));
    source.set_list_in_score_screen(false);

    let mut xfer = Xfer::saver();
    {
        let ctx = harness.xfer_ctx();
        source.xfer_snapshot_at(&mut xfer, &ctx, 1).unwrap();
    }

    let mut loaded = {
        let mut ctx = harness.ctx(0);
        PlayerState::new(PlayerIndex(0), &mut ctx)
    };
    let ctx = harness.xfer_ctx();
    let mut load = Xfer::loader(xfer.into_bytes());
    loaded.xfer_snapshot(&mut load, &ctx).unwrap();

    assert_eq!(loaded.skill_points_modifier(), Fixed::ONE);
    assert!(loaded.list_in_score_screen());
}

#[test]
fn unknown_upgrade_template_fails_the_load() {
    let mut harness = TestHarness::new();
    let mut source = populated_player(&mut harness);
    let bytes = save_player(&mut source, &harness);

    let mut loaded = fresh_player(&mut harness, 0);
    let empty_center = UpgradeCenter::new();
    let ctx = XferContext {
        upgrades: &empty_center,
        teams: &harness.teams,
    };
    let mut load = Xfer::loader(bytes);
    let err = loaded.xfer_snapshot(&mut load, &ctx).unwrap_err();
    assert!(matches!(err, StateError::UnknownUpgradeTemplate(_)));
}

#[test]
fn unknown_team_prototype_fails_the_load() {
    let mut harness = TestHarness::new();
    let (proto, _) = harness.add_team(PlayerIndex(0), "teamAlpha", &[1]);
    let mut source = fresh_player(&mut harness, 0);
    source.add_team_to_list(proto);
    let bytes = save_player(&mut source, &harness);

    let mut loaded = fresh_player(&mut harness, 0);
    let empty_teams = TeamRegistry::new();
    let ctx = XferContext {
        upgrades: &harness.upgrades,
        teams: &empty_teams,
    };
    let mut load = Xfer::loader(bytes);
    let err = loaded.xfer_snapshot(&mut load, &ctx).unwrap_err();
    assert!(matches!(err, StateError::UnknownTeamPrototype(_)));
}

#[test]
fn load_onto_dirty_change_list_is_corrupt() {
    let mut harness = TestHarness::new();
    let mut source = fresh_player(&mut harness, 0);
    let bytes = save_player(&mut source, &harness);

    let mut loaded = fresh_player(&mut harness, 0);
    loaded.add_kind_of_production_cost_change(KindOfFlags::VEHICLE, Fixed::from_num(0.1));

    let ctx = harness.xfer_ctx();
    let mut load = Xfer::loader(bytes);
    let err = loaded.xfer_snapshot(&mut load, &ctx).unwrap_err();
    assert!(matches!(err, StateError::CorruptSnapshot(_)));
}

#[test]
fn save_container_roundtrips_every_player() {
    let mut harness = TestHarness::new();
    let mut player0 = populated_player(&mut harness);
    let mut player1 = fresh_player(&mut harness, 1);
    player1.set_attacked_by(PlayerIndex(0), 12);

    let mut save = SaveFile::new("skirmish_twin_rivers", 4096);
    {
        let ctx = harness.xfer_ctx();
        save.add_player(&mut player0, &ctx).unwrap();
        save.add_player(&mut player1, &ctx).unwrap();
    }

    let temp_path = std::env::temp_dir().join("player_core_container_test.sav");
    save.save(&temp_path).unwrap();
    let restored = SaveFile::load(&temp_path).unwrap();
    let _ = std::fs::remove_file(&temp_path);

    assert_eq!(restored.player_count(), 2);
    assert_eq!(restored.scenario_id, "skirmish_twin_rivers");
    assert_eq!(restored.frame, 4096);

    let mut loaded0 = fresh_player(&mut harness, 0);
    let mut loaded1 = fresh_player(&mut harness, 1);
    {
        let ctx = harness.xfer_ctx();
        restored.restore_player(0, &mut loaded0, &ctx).unwrap();
        restored.restore_player(1, &mut loaded1, &ctx).unwrap();
    }

    assert_eq!(loaded0.state_hash(), player0.state_hash());
    assert_eq!(loaded0.sciences(), player0.sciences());
    assert!(loaded1.get_attacked_by(PlayerIndex(0)));
}

#[test]
fn saving_above_current_version_is_rejected() {
    let mut harness = TestHarness::new();
    let mut player = fresh_player(&mut harness, 0);
    let ctx = harness.xfer_ctx();
    let mut xfer = Xfer::saver();
    assert!(player
        .xfer_snapshot_at(&mut xfer, &ctx, PLAYER_SNAPSHOT_VERSION + 1)
        .is_err());
}
