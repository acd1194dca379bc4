//! Worker agent: seeks ore, mines it over a timed multi-hit sequence,
//! carries it to a minecart, deposits, repeats.
//!
//! The mining sequence is an explicit state-machine timer: elapsed time and
//! hit index live on the agent and advance per tick, so no suspension
//! mechanism is needed and no agent ever blocks another.

use contracts::{AnimationCue, MinerPhase, Vec2};

use crate::motion;

/// Current state of the work cycle. Exactly one state is active at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum MinerState {
    Seeking {
        site_id: String,
    },
    Mining {
        site_id: String,
        hits_done: u32,
        elapsed_in_hit: f64,
    },
    Returning,
    Idle,
}

impl MinerState {
    pub fn phase(&self) -> MinerPhase {
        match self {
            MinerState::Seeking { .. } => MinerPhase::Seeking,
            MinerState::Mining { .. } => MinerPhase::Mining,
            MinerState::Returning => MinerPhase::Returning,
            MinerState::Idle => MinerPhase::Idle,
        }
    }
}

/// What the world resolves for a miner before its tick: the position of its
/// current target site (if it still exists) and of its assigned cart.
#[derive(Debug, Clone, Copy)]
pub struct Surroundings {
    pub target_site: Option<Vec2>,
    pub cart_position: Option<Vec2>,
    pub arrival_radius: f64,
}

/// State transitions surfaced to the world for committing side effects.
#[derive(Debug, Clone, PartialEq)]
pub enum MinerOutcome {
    StartedMining { site_id: String },
    HitLanded { site_id: String, hit_index: u32 },
    CompletedMining { site_id: String },
    /// No usable target (vanished mid-seek, or idle poll); the world
    /// re-queries the nearest ore.
    NeedsTarget,
    /// Entered the cart's trigger volume carrying ore; the world commits the
    /// deposit and re-targets.
    ReachedCart { amount: u32 },
    /// The assigned cart is missing or dangling; the miner went idle.
    CartMissing,
}

/// One tick's worth of intents and transitions.
#[derive(Debug, Clone)]
pub struct MinerTick {
    pub velocity: Vec2,
    pub animation: AnimationCue,
    pub outcomes: Vec<MinerOutcome>,
}

#[derive(Debug, Clone)]
pub struct Miner {
    pub miner_id: String,
    pub position: Vec2,
    pub base_move_speed: f64,
    pub move_speed: f64,
    pub mining_time_seconds: f64,
    pub hits_to_mine: u32,
    pub ore_carried: u32,
    pub cart_id: Option<String>,
    pub state: MinerState,
    /// Last emitted intents, read back by inspectors.
    pub velocity: Vec2,
    pub animation: AnimationCue,
}

impl Miner {
    pub fn new(
        miner_id: String,
        position: Vec2,
        move_speed: f64,
        mining_time_seconds: f64,
        hits_to_mine: u32,
        cart_id: Option<String>,
    ) -> Self {
        Self {
            miner_id,
            position,
            base_move_speed: move_speed,
            move_speed,
            mining_time_seconds,
            hits_to_mine: hits_to_mine.max(1),
            ore_carried: 0,
            cart_id,
            state: MinerState::Idle,
            velocity: Vec2::ZERO,
            animation: AnimationCue::Idle,
        }
    }

    pub fn phase(&self) -> MinerPhase {
        self.state.phase()
    }

    pub fn target_site_id(&self) -> Option<&str> {
        match &self.state {
            MinerState::Seeking { site_id } | MinerState::Mining { site_id, .. } => {
                Some(site_id.as_str())
            }
            _ => None,
        }
    }

    /// Duration of a single hit under the current mining time. Upgrades may
    /// rewrite `mining_time_seconds` mid-sequence; an in-flight hit keeps its
    /// elapsed time and finishes under the new duration.
    fn hit_duration(&self) -> f64 {
        self.mining_time_seconds / f64::from(self.hits_to_mine.max(1))
    }

    /// Advance one tick. Movement is emitted as a velocity intent; the world
    /// integrates it and feeds the position back before the next tick.
    pub fn tick(&mut self, dt: f64, surroundings: &Surroundings) -> MinerTick {
        let mut outcomes = Vec::new();
        let state = std::mem::replace(&mut self.state, MinerState::Idle);

        let (next_state, velocity, animation) = match state {
            MinerState::Seeking { site_id } => match surroundings.target_site {
                None => {
                    outcomes.push(MinerOutcome::NeedsTarget);
                    (MinerState::Idle, Vec2::ZERO, AnimationCue::Idle)
                }
                Some(site_position) => {
                    if motion::within(self.position, site_position, surroundings.arrival_radius) {
                        outcomes.push(MinerOutcome::StartedMining {
                            site_id: site_id.clone(),
                        });
                        (
                            MinerState::Mining {
                                site_id,
                                hits_done: 0,
                                elapsed_in_hit: 0.0,
                            },
                            Vec2::ZERO,
                            AnimationCue::Mining,
                        )
                    } else {
                        (
                            MinerState::Seeking { site_id },
                            motion::steer(self.position, site_position, self.move_speed),
                            AnimationCue::Walking,
                        )
                    }
                }
            },
            MinerState::Mining {
                site_id,
                mut hits_done,
                mut elapsed_in_hit,
            } => {
                elapsed_in_hit += dt;
                let hit_duration = self.hit_duration();
                while elapsed_in_hit >= hit_duration && hits_done < self.hits_to_mine {
                    elapsed_in_hit -= hit_duration;
                    hits_done += 1;
                    outcomes.push(MinerOutcome::HitLanded {
                        site_id: site_id.clone(),
                        hit_index: hits_done,
                    });
                }

                if hits_done >= self.hits_to_mine {
                    // One ore unit per full mining cycle, regardless of hit count.
                    self.ore_carried += 1;
                    outcomes.push(MinerOutcome::CompletedMining { site_id });
                    (MinerState::Returning, Vec2::ZERO, AnimationCue::Walking)
                } else {
                    (
                        MinerState::Mining {
                            site_id,
                            hits_done,
                            elapsed_in_hit,
                        },
                        Vec2::ZERO,
                        AnimationCue::Mining,
                    )
                }
            }
            MinerState::Returning => match surroundings.cart_position {
                None => {
                    outcomes.push(MinerOutcome::CartMissing);
                    (MinerState::Idle, Vec2::ZERO, AnimationCue::Idle)
                }
                Some(cart_position) => {
                    if motion::within(self.position, cart_position, surroundings.arrival_radius) {
                        if self.ore_carried > 0 {
                            outcomes.push(MinerOutcome::ReachedCart {
                                amount: self.ore_carried,
                            });
                            (MinerState::Returning, Vec2::ZERO, AnimationCue::Idle)
                        } else {
                            outcomes.push(MinerOutcome::NeedsTarget);
                            (MinerState::Idle, Vec2::ZERO, AnimationCue::Idle)
                        }
                    } else {
                        (
                            MinerState::Returning,
                            motion::steer(self.position, cart_position, self.move_speed),
                            AnimationCue::Walking,
                        )
                    }
                }
            },
            MinerState::Idle => {
                outcomes.push(MinerOutcome::NeedsTarget);
                (MinerState::Idle, Vec2::ZERO, AnimationCue::Idle)
            }
        };

        self.state = next_state;
        self.velocity = velocity;
        self.animation = animation;

        MinerTick {
            velocity,
            animation,
            outcomes,
        }
    }

    /// Commit a deposit handoff: the full carried count went to the cart.
    pub fn complete_deposit(&mut self) {
        self.ore_carried = 0;
    }

    /// MiningSpeedUp effect: multiplicative per purchase.
    pub fn apply_mining_speed_up(&mut self, pct: f64) {
        self.mining_time_seconds *= 1.0 - pct;
    }

    /// MovingSpeedUp effect: recomputed from the base speed and the current
    /// level. Idempotent at a fixed level, no compounding.
    pub fn apply_moving_speed_level(&mut self, pct: f64, level: u32) {
        self.move_speed = self.base_move_speed * (1.0 + pct * f64::from(level));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn miner() -> Miner {
        Miner::new(
            "miner_000".to_string(),
            Vec2::ZERO,
            5.0,
            2.0,
            3,
            Some("cart:main".to_string()),
        )
    }

    fn near_site() -> Surroundings {
        Surroundings {
            target_site: Some(Vec2::new(0.1, 0.0)),
            cart_position: Some(Vec2::new(-4.0, 0.0)),
            arrival_radius: 0.5,
        }
    }

    #[test]
    fn seeking_emits_walk_intent_toward_site() {
        let mut miner = miner();
        miner.state = MinerState::Seeking {
            site_id: "ore:east".to_string(),
        };
        let surroundings = Surroundings {
            target_site: Some(Vec2::new(8.0, 0.0)),
            cart_position: None,
            arrival_radius: 0.5,
        };

        let tick = miner.tick(0.02, &surroundings);
        assert_eq!(tick.animation, AnimationCue::Walking);
        assert!((tick.velocity.x - 5.0).abs() < 1e-9);
        assert_eq!(miner.phase(), MinerPhase::Seeking);
    }

    #[test]
    fn arrival_at_site_starts_mining_and_zeroes_velocity() {
        let mut miner = miner();
        miner.state = MinerState::Seeking {
            site_id: "ore:east".to_string(),
        };

        let tick = miner.tick(0.02, &near_site());
        assert_eq!(tick.velocity, Vec2::ZERO);
        assert_eq!(tick.animation, AnimationCue::Mining);
        assert!(matches!(
            tick.outcomes.as_slice(),
            [MinerOutcome::StartedMining { .. }]
        ));
        assert_eq!(miner.phase(), MinerPhase::Mining);
    }

    #[test]
    fn mining_lands_hits_and_completes_with_one_ore() {
        let mut miner = miner();
        miner.state = MinerState::Mining {
            site_id: "ore:east".to_string(),
            hits_done: 0,
            elapsed_in_hit: 0.0,
        };

        // 3 hits at 2s/3 each: the full sequence takes 2 seconds.
        let mut hits = 0;
        let mut completed = false;
        for _ in 0..110 {
            let tick = miner.tick(0.02, &near_site());
            for outcome in &tick.outcomes {
                match outcome {
                    MinerOutcome::HitLanded { hit_index, .. } => {
                        hits += 1;
                        assert_eq!(*hit_index, hits);
                    }
                    MinerOutcome::CompletedMining { .. } => completed = true,
                    other => panic!("unexpected outcome {other:?}"),
                }
            }
            if completed {
                break;
            }
        }

        assert_eq!(hits, 3);
        assert!(completed);
        assert_eq!(miner.ore_carried, 1);
        assert_eq!(miner.phase(), MinerPhase::Returning);
    }

    #[test]
    fn oversized_dt_lands_multiple_hits_in_one_tick() {
        let mut miner = miner();
        miner.state = MinerState::Mining {
            site_id: "ore:east".to_string(),
            hits_done: 0,
            elapsed_in_hit: 0.0,
        };

        let tick = miner.tick(5.0, &near_site());
        let hit_count = tick
            .outcomes
            .iter()
            .filter(|outcome| matches!(outcome, MinerOutcome::HitLanded { .. }))
            .count();
        assert_eq!(hit_count, 3);
        assert_eq!(miner.ore_carried, 1);
    }

    #[test]
    fn mining_speed_retune_applies_mid_sequence() {
        let mut miner = miner();
        miner.state = MinerState::Mining {
            site_id: "ore:east".to_string(),
            hits_done: 1,
            elapsed_in_hit: 0.3,
        };

        miner.apply_mining_speed_up(0.5);
        assert!((miner.mining_time_seconds - 1.0).abs() < 1e-9);
        // New hit duration is 1/3s; the 0.3s already elapsed still counts.
        let tick = miner.tick(0.04, &near_site());
        assert!(matches!(
            tick.outcomes.as_slice(),
            [MinerOutcome::HitLanded { hit_index: 2, .. }]
        ));
    }

    #[test]
    fn returning_deposits_only_when_carrying() {
        let mut miner = miner();
        miner.state = MinerState::Returning;
        miner.ore_carried = 2;
        miner.position = Vec2::new(-4.0, 0.0);

        let tick = miner.tick(0.02, &near_site());
        assert!(matches!(
            tick.outcomes.as_slice(),
            [MinerOutcome::ReachedCart { amount: 2 }]
        ));
    }

    #[test]
    fn returning_without_cart_goes_idle() {
        let mut miner = miner();
        miner.state = MinerState::Returning;
        miner.ore_carried = 1;

        let surroundings = Surroundings {
            target_site: None,
            cart_position: None,
            arrival_radius: 0.5,
        };
        let tick = miner.tick(0.02, &surroundings);
        assert!(matches!(
            tick.outcomes.as_slice(),
            [MinerOutcome::CartMissing]
        ));
        assert_eq!(miner.phase(), MinerPhase::Idle);
    }

    #[test]
    fn idle_requests_target_each_tick_without_moving() {
        let mut miner = miner();
        let surroundings = Surroundings {
            target_site: None,
            cart_position: None,
            arrival_radius: 0.5,
        };

        for _ in 0..3 {
            let tick = miner.tick(0.02, &surroundings);
            assert_eq!(tick.velocity, Vec2::ZERO);
            assert!(matches!(
                tick.outcomes.as_slice(),
                [MinerOutcome::NeedsTarget]
            ));
        }
    }

    #[test]
    fn moving_speed_level_is_idempotent() {
        let mut miner = miner();
        miner.apply_moving_speed_level(0.1, 3);
        let once = miner.move_speed;
        miner.apply_moving_speed_level(0.1, 3);
        miner.apply_moving_speed_level(0.1, 3);

        assert!((once - 6.5).abs() < 1e-9);
        assert!((miner.move_speed - once).abs() < 1e-9);
    }
}
