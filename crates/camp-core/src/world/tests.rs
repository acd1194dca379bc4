use super::*;
use contracts::{CartConfig, CommandType, MinerPhase, OreSiteConfig};

fn test_config() -> RunConfig {
    let mut config = RunConfig::default();
    config.run_id = "run_test".to_string();
    config.tick_hz = 10;
    config.duration_seconds = 60;
    config.ore_sites = vec![OreSiteConfig {
        site_id: "ore:east".to_string(),
        position: Vec2::new(3.0, 0.0),
    }];
    config.carts = vec![CartConfig {
        cart_id: "cart:main".to_string(),
        position: Vec2::new(-3.0, 0.0),
        conversion_threshold: 1,
        gold_per_ore: 2,
    }];
    config.mining_time_seconds = 0.6;
    config.hits_to_mine = 3;
    config
}

fn command(world: &CampWorld, id: &str, command_type: CommandType, payload: CommandPayload) -> Command {
    Command::new(
        id,
        world.run_id().to_string(),
        world.status().current_tick,
        command_type,
        payload,
    )
}

fn step_until<F: Fn(&CampWorld) -> bool>(world: &mut CampWorld, max_ticks: u64, done: F) -> bool {
    for _ in 0..max_ticks {
        if !world.step() {
            return false;
        }
        if done(world) {
            return true;
        }
    }
    false
}

fn event_position(world: &CampWorld, event_type: EventType) -> Option<usize> {
    world
        .events()
        .iter()
        .position(|event| event.event_type == event_type)
}

#[test]
fn new_world_spawns_starting_roster_seeking() {
    let world = CampWorld::new(test_config());
    let views = world.miner_views();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].phase, MinerPhase::Seeking);
    assert_eq!(views[0].target_site_id.as_deref(), Some("ore:east"));
    assert_eq!(views[0].cart_id.as_deref(), Some("cart:main"));
}

#[test]
fn full_cycle_credits_gold_and_returns_to_seeking() {
    let mut world = CampWorld::new(test_config());
    world.start();

    let finished = step_until(&mut world, 400, |world| {
        event_position(world, EventType::GoldCredited).is_some()
    });
    assert!(finished, "one full cycle should complete");

    // Exactly one ore unit converted at gold_per_ore = 2.
    assert_eq!(world.gold(), 2);

    let started = event_position(&world, EventType::MiningStarted).expect("mining started");
    let completed = event_position(&world, EventType::MiningCompleted).expect("mining completed");
    let deposited = event_position(&world, EventType::OreDeposited).expect("ore deposited");
    let converted = event_position(&world, EventType::OreConverted).expect("ore converted");
    let credited = event_position(&world, EventType::GoldCredited).expect("gold credited");
    assert!(started < completed);
    assert!(completed < deposited);
    assert!(deposited < converted);
    assert!(converted < credited);

    let hits = world
        .events()
        .iter()
        .filter(|event| event.event_type == EventType::MiningHitLanded)
        .count();
    assert_eq!(hits, 3);

    let view = &world.miner_views()[0];
    assert_eq!(view.phase, MinerPhase::Seeking);
    assert_eq!(view.ore_carried, 0);

    let metrics = world.last_step_metrics();
    assert_eq!(metrics.advanced_ticks, 1);
    assert_eq!(metrics.processed_miners, 1);
}

#[test]
fn threshold_accumulates_across_deposits() {
    let mut config = test_config();
    config.carts[0].conversion_threshold = 3;
    let mut world = CampWorld::new(config);
    world.start();

    let finished = step_until(&mut world, 1200, |world| {
        event_position(world, EventType::OreConverted).is_some()
    });
    assert!(finished, "conversion should eventually trigger");

    let conversion = world
        .events()
        .iter()
        .find(|event| event.event_type == EventType::OreConverted)
        .expect("conversion event");
    let details = conversion.details.as_ref().expect("details");
    assert_eq!(details["ore_converted"], 3);
    assert_eq!(details["gold_yield"], 6);
    assert_eq!(world.gold(), 6);
    assert_eq!(world.cart_panel("cart:main").expect("cart").ore_stored, 0);

    let deposits = world
        .events()
        .iter()
        .filter(|event| event.event_type == EventType::OreDeposited)
        .count();
    assert_eq!(deposits, 3);
}

#[test]
fn funded_purchase_applies_effect_and_escalates_cost() {
    let mut config = test_config();
    config.starting_gold = 5;
    let mut world = CampWorld::new(config);

    let mining_time_before = world.miner_views()[0].mining_time_seconds;
    let purchase = command(
        &world,
        "cmd_buy_mining",
        CommandType::Purchase,
        CommandPayload::Purchase {
            kind: UpgradeKind::MiningSpeedUp,
        },
    );
    world.inject_command(purchase);
    world.start();
    world.step();

    assert!(event_position(&world, EventType::PurchaseApplied).is_some());
    assert_eq!(world.gold(), 0);

    let panel = world.economy_panel();
    let button = panel
        .buttons
        .iter()
        .find(|button| button.kind == UpgradeKind::MiningSpeedUp)
        .expect("button");
    assert_eq!(button.cost, 8);
    assert_eq!(button.level, 1);
    assert!(!button.interactable);

    let mining_time_after = world.miner_views()[0].mining_time_seconds;
    assert!((mining_time_after - mining_time_before * 0.9).abs() < 1e-9);

    // Gold went 5 -> 0, so at least one button flipped.
    assert!(event_position(&world, EventType::AffordabilityChanged).is_some());
}

#[test]
fn unaffordable_purchase_is_reported_not_applied() {
    let mut world = CampWorld::new(test_config());
    let purchase = command(
        &world,
        "cmd_buy_broke",
        CommandType::Purchase,
        CommandPayload::Purchase {
            kind: UpgradeKind::MiningSpeedUp,
        },
    );
    world.inject_command(purchase);
    world.start();
    world.step();

    assert!(event_position(&world, EventType::PurchaseRejected).is_some());
    assert!(event_position(&world, EventType::PurchaseApplied).is_none());
    assert_eq!(world.gold(), 0);

    let button = &world.economy_panel().buttons[0];
    assert_eq!(button.cost, 5);
    assert_eq!(button.level, 0);
}

#[test]
fn moving_speed_purchase_rewrites_whole_roster_without_compounding() {
    let mut config = test_config();
    config.starting_gold = 30;
    config.starting_miners = 2;
    let mut world = CampWorld::new(config);
    world.start();

    for (index, id) in ["cmd_move_1", "cmd_move_2"].iter().enumerate() {
        let purchase = command(
            &world,
            id,
            CommandType::Purchase,
            CommandPayload::Purchase {
                kind: UpgradeKind::MovingSpeedUp,
            },
        );
        world.inject_command(purchase);
        world.step();
        let expected = 5.0 * (1.0 + 0.1 * (index as f64 + 1.0));
        for view in world.miner_views() {
            assert!(
                (view.move_speed - expected).abs() < 1e-9,
                "level {} speed {}",
                index + 1,
                view.move_speed
            );
        }
    }
}

#[test]
fn hired_miner_joins_roster_with_current_tuning() {
    let mut config = test_config();
    config.starting_gold = 15; // one mining upgrade (5) + one hire (10)
    let mut world = CampWorld::new(config);
    world.start();

    let buy_mining = command(
        &world,
        "cmd_tune",
        CommandType::Purchase,
        CommandPayload::Purchase {
            kind: UpgradeKind::MiningSpeedUp,
        },
    );
    world.inject_command(buy_mining);
    world.step();

    let hire = command(
        &world,
        "cmd_hire",
        CommandType::Purchase,
        CommandPayload::Purchase {
            kind: UpgradeKind::HireMiner,
        },
    );
    world.inject_command(hire);
    world.step();

    assert!(event_position(&world, EventType::MinerSpawned).is_some());
    let views = world.miner_views();
    assert_eq!(views.len(), 2);
    let hired = views
        .iter()
        .find(|view| view.miner_id == "miner_001")
        .expect("hired miner");
    assert!((hired.mining_time_seconds - 0.6 * 0.9).abs() < 1e-9);
}

#[test]
fn hire_without_spawn_point_debits_but_skips_spawn() {
    let mut config = test_config();
    config.starting_gold = 10;
    config.spawn_point = None;
    let mut world = CampWorld::new(config);
    assert!(world.miner_views().is_empty());
    world.start();

    let hire = command(
        &world,
        "cmd_hire_nowhere",
        CommandType::Purchase,
        CommandPayload::Purchase {
            kind: UpgradeKind::HireMiner,
        },
    );
    world.inject_command(hire);
    world.step();

    assert!(event_position(&world, EventType::SpawnPointMissing).is_some());
    assert!(event_position(&world, EventType::MinerSpawned).is_none());
    assert!(world.miner_views().is_empty());
    assert_eq!(world.gold(), 0);
    assert_eq!(
        world.economy_panel().buttons[2].cost,
        15,
        "hire cost still escalates"
    );
}

#[test]
fn removing_last_site_idles_miner_once_until_site_returns() {
    let mut world = CampWorld::new(test_config());
    world.start();
    world.step();

    let remove = command(
        &world,
        "cmd_remove_site",
        CommandType::RemoveOreSite,
        CommandPayload::RemoveOreSite {
            site_id: "ore:east".to_string(),
        },
    );
    world.inject_command(remove);
    world.step();

    assert_eq!(world.miner_views()[0].phase, MinerPhase::Idle);
    assert_eq!(world.ore_site_count(), 0);

    // Idle polling stays silent.
    world.step_n(5);
    let idle_events = world
        .events()
        .iter()
        .filter(|event| event.event_type == EventType::MinerIdle)
        .count();
    assert_eq!(idle_events, 1);

    let add = command(
        &world,
        "cmd_add_site",
        CommandType::AddOreSite,
        CommandPayload::AddOreSite {
            site_id: "ore:west".to_string(),
            position: Vec2::new(-1.0, 2.0),
        },
    );
    world.inject_command(add);
    world.step();

    let view = &world.miner_views()[0];
    assert_eq!(view.phase, MinerPhase::Seeking);
    assert_eq!(view.target_site_id.as_deref(), Some("ore:west"));
    assert!(event_position(&world, EventType::OreSiteAdded).is_some());
}

#[test]
fn miner_removal_cancels_cycle_and_records_carried_ore() {
    let mut world = CampWorld::new(test_config());
    world.start();

    // Let the miner finish mining so it carries ore.
    let carrying = step_until(&mut world, 400, |world| {
        world
            .miner_views()
            .first()
            .map(|view| view.ore_carried > 0)
            .unwrap_or(false)
    });
    assert!(carrying);

    let remove = command(
        &world,
        "cmd_remove_miner",
        CommandType::RemoveMiner,
        CommandPayload::RemoveMiner {
            miner_id: "miner_000".to_string(),
        },
    );
    world.inject_command(remove);
    world.step();

    assert!(world.miner_views().is_empty());
    let removed = world
        .events()
        .iter()
        .find(|event| event.event_type == EventType::MinerRemoved)
        .expect("removal event");
    assert_eq!(removed.details.as_ref().expect("details")["ore_lost"], 1);

    // The world keeps ticking with an empty roster.
    assert!(world.step());
}

#[test]
fn identical_configs_replay_identically() {
    let mut left = CampWorld::new(test_config());
    let mut right = CampWorld::new(test_config());
    left.start();
    right.start();
    left.step_n(120);
    right.step_n(120);

    assert_eq!(left.replay_hash(), right.replay_hash());
    assert_eq!(left.events().len(), right.events().len());
    assert_eq!(left.gold(), right.gold());
}

#[test]
fn run_completes_at_max_ticks_and_pauses() {
    let mut config = test_config();
    config.duration_seconds = 1; // 10 ticks at 10 Hz
    let mut world = CampWorld::new(config);
    world.start();

    let committed = world.run_to_tick(100);
    assert_eq!(committed, 10);
    assert!(world.status().is_complete());
    assert_eq!(world.status().mode, RunMode::Paused);
    assert!(!world.step());
}
