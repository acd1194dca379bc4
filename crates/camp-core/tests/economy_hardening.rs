use camp_core::cart::Minecart;
use camp_core::economy::{EconomyError, EconomyLedger};
use camp_core::miner::Miner;
use camp_core::spatial::TagIndex;
use contracts::{CartConfig, RunConfig, UpgradeKind, Vec2};
use proptest::prelude::*;

fn ledger_with_gold(gold: i64) -> EconomyLedger {
    let mut config = RunConfig::default();
    config.starting_gold = gold;
    EconomyLedger::from_config(&config)
}

proptest! {
    /// Cost escalation is exactly round(cost * 1.5), half away from zero.
    #[test]
    fn escalation_matches_float_rounding(cost in 1_i64..100_000) {
        let mut config = RunConfig::default();
        config.starting_gold = cost;
        config.mining_speed_cost = cost;
        let mut ledger = EconomyLedger::from_config(&config);

        let receipt = ledger.try_purchase(UpgradeKind::MiningSpeedUp).unwrap();
        let expected = (cost as f64 * 1.5).round() as i64;
        prop_assert_eq!(receipt.new_cost, expected);
    }

    /// A purchase attempt never drives the balance negative, and a rejected
    /// attempt changes nothing at all.
    #[test]
    fn purchases_never_go_negative(gold in 0_i64..30, attempts in 1_usize..12) {
        let mut ledger = ledger_with_gold(gold);
        for _ in 0..attempts {
            let track_before = ledger.track(UpgradeKind::HireMiner);
            let gold_before = ledger.gold();
            match ledger.try_purchase(UpgradeKind::HireMiner) {
                Ok(receipt) => {
                    prop_assert_eq!(ledger.gold(), gold_before - receipt.cost_paid);
                }
                Err(EconomyError::InsufficientGold { .. }) => {
                    prop_assert_eq!(ledger.gold(), gold_before);
                    prop_assert_eq!(ledger.track(UpgradeKind::HireMiner), track_before);
                }
                Err(other) => prop_assert!(false, "unexpected error {other:?}"),
            }
            prop_assert!(ledger.gold() >= 0);
        }
    }

    /// Conservation across deposits: converted plus still-stored ore equals
    /// everything ever deposited, and the counter resets on conversion.
    #[test]
    fn cart_conserves_ore(threshold in 1_i64..20, amounts in prop::collection::vec(1_i64..10, 1..30)) {
        let mut cart = Minecart::from_config(&CartConfig {
            cart_id: "cart:prop".to_string(),
            position: Vec2::ZERO,
            conversion_threshold: threshold,
            gold_per_ore: 3,
        });

        let mut total_deposited = 0_i64;
        let mut total_converted = 0_i64;
        for amount in amounts {
            total_deposited += amount;
            if let Some(conversion) = cart.deposit(amount).unwrap() {
                prop_assert!(conversion.ore_converted >= threshold);
                prop_assert_eq!(conversion.gold_yield, conversion.ore_converted * 3);
                prop_assert_eq!(cart.ore_stored(), 0);
                total_converted += conversion.ore_converted;
            } else {
                prop_assert!(cart.ore_stored() < threshold);
            }
        }
        prop_assert_eq!(total_converted + cart.ore_stored(), total_deposited);
    }

    /// The moving-speed formula depends only on the level, never on how many
    /// times it has been applied.
    #[test]
    fn moving_speed_is_idempotent_per_level(
        base in 0.5_f64..50.0,
        pct in 0.0_f64..1.0,
        level in 0_u32..40,
        repeats in 1_usize..6,
    ) {
        let mut miner = Miner::new(
            "miner_prop".to_string(),
            Vec2::ZERO,
            base,
            2.0,
            3,
            None,
        );
        for _ in 0..repeats {
            miner.apply_moving_speed_level(pct, level);
        }
        let expected = base * (1.0 + pct * f64::from(level));
        prop_assert!((miner.move_speed - expected).abs() < 1e-9);
    }

    /// Nearest-site selection returns the first strict minimum in encounter
    /// order, so permuting later entries never beats an earlier equal one.
    #[test]
    fn nearest_keeps_first_of_equal_distances(offset in 1.0_f64..100.0) {
        let mut index = TagIndex::new();
        index.add("ore", "far", Vec2::new(offset + 1.0, 0.0));
        index.add("ore", "first", Vec2::new(offset, 0.0));
        index.add("ore", "second", Vec2::new(-offset, 0.0));

        let (id, _) = index.nearest("ore", Vec2::ZERO).unwrap();
        prop_assert_eq!(id, "first");
    }
}

#[test]
fn credit_rejects_negative_and_keeps_balance() {
    let mut ledger = ledger_with_gold(7);
    assert!(matches!(
        ledger.credit(-1),
        Err(EconomyError::InvalidAmount(-1))
    ));
    assert_eq!(ledger.gold(), 7);
    ledger.credit(0).expect("zero credit is a no-op");
    assert_eq!(ledger.gold(), 7);
}
