use super::*;

impl CampWorld {
    /// Advance every miner one tick in id order: resolve surroundings
    /// (proximity queries), run the state machine, integrate motion, and
    /// commit transitions.
    pub(super) fn advance_miners(&mut self, tick: u64, sequence_in_tick: &mut u64) -> u64 {
        let dt = self.config.tick_seconds();
        let miner_ids = self.miners.keys().cloned().collect::<Vec<_>>();

        for miner_id in &miner_ids {
            let Some(miner) = self.miners.get(miner_id) else {
                continue;
            };
            let surroundings = Surroundings {
                target_site: miner
                    .target_site_id()
                    .and_then(|site_id| self.sites.get(site_id)),
                cart_position: miner
                    .cart_id
                    .as_deref()
                    .and_then(|cart_id| self.carts.get(cart_id))
                    .map(|cart| cart.position),
                arrival_radius: self.config.arrival_radius,
            };

            let outcomes = {
                let Some(miner) = self.miners.get_mut(miner_id) else {
                    continue;
                };
                let result = miner.tick(dt, &surroundings);
                miner.position = crate::motion::integrate(miner.position, result.velocity, dt);
                result.outcomes
            };

            for outcome in outcomes {
                self.commit_outcome(miner_id, outcome, tick, sequence_in_tick);
            }
        }

        miner_ids.len() as u64
    }

    fn commit_outcome(
        &mut self,
        miner_id: &str,
        outcome: MinerOutcome,
        tick: u64,
        sequence_in_tick: &mut u64,
    ) {
        match outcome {
            MinerOutcome::StartedMining { site_id } => {
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::MiningStarted,
                    vec![miner_actor(miner_id)],
                    Vec::new(),
                    Some(json!({ "site_id": site_id })),
                );
            }
            MinerOutcome::HitLanded { site_id, hit_index } => {
                let hits_to_mine = self
                    .miners
                    .get(miner_id)
                    .map(|miner| miner.hits_to_mine)
                    .unwrap_or(0);
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::MiningHitLanded,
                    vec![miner_actor(miner_id)],
                    Vec::new(),
                    Some(json!({
                        "site_id": site_id,
                        "hit_index": hit_index,
                        "hits_to_mine": hits_to_mine,
                    })),
                );
            }
            MinerOutcome::CompletedMining { site_id } => {
                let ore_carried = self
                    .miners
                    .get(miner_id)
                    .map(|miner| miner.ore_carried)
                    .unwrap_or(0);
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::MiningCompleted,
                    vec![miner_actor(miner_id)],
                    Vec::new(),
                    Some(json!({ "site_id": site_id, "ore_carried": ore_carried })),
                );
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::ReturnStarted,
                    vec![miner_actor(miner_id)],
                    Vec::new(),
                    None,
                );
            }
            MinerOutcome::NeedsTarget => {
                self.retarget_miner(miner_id, tick, sequence_in_tick);
            }
            MinerOutcome::ReachedCart { amount } => {
                self.commit_deposit(miner_id, amount, tick, sequence_in_tick);
            }
            MinerOutcome::CartMissing => {
                let cart_id = self
                    .miners
                    .get(miner_id)
                    .and_then(|miner| miner.cart_id.clone());
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::CartMissing,
                    vec![miner_actor(miner_id)],
                    Vec::new(),
                    Some(json!({ "cart_id": cart_id })),
                );
            }
        }
    }

    /// Deposit the full carried count into the assigned cart in one call,
    /// converting and crediting synchronously, then re-seek the nearest ore.
    fn commit_deposit(
        &mut self,
        miner_id: &str,
        amount: u32,
        tick: u64,
        sequence_in_tick: &mut u64,
    ) {
        let Some(cart_id) = self
            .miners
            .get(miner_id)
            .and_then(|miner| miner.cart_id.clone())
        else {
            return;
        };
        let Some(cart) = self.carts.get_mut(&cart_id) else {
            return;
        };

        let conversion = match cart.deposit(i64::from(amount)) {
            Ok(conversion) => conversion,
            Err(err) => {
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::DepositRejected,
                    vec![miner_actor(miner_id)],
                    Vec::new(),
                    Some(json!({ "cart_id": cart_id, "reason": err.to_string() })),
                );
                return;
            }
        };
        let ore_stored = self.carts[&cart_id].ore_stored();

        if let Some(miner) = self.miners.get_mut(miner_id) {
            miner.complete_deposit();
        }

        let deposit_event_id = self.push_event(
            tick,
            sequence_in_tick,
            EventType::OreDeposited,
            vec![miner_actor(miner_id)],
            Vec::new(),
            Some(json!({
                "cart_id": cart_id,
                "amount": amount,
                "ore_stored": ore_stored,
                "ore_display": format!("Ore: {ore_stored}"),
                "phase": contracts::MinerPhase::Depositing,
            })),
        );

        if let Some(conversion) = conversion {
            let conversion_event_id = self.push_event(
                tick,
                sequence_in_tick,
                EventType::OreConverted,
                Vec::new(),
                vec![deposit_event_id],
                Some(json!({
                    "cart_id": cart_id,
                    "ore_converted": conversion.ore_converted,
                    "gold_yield": conversion.gold_yield,
                })),
            );
            self.credit_ledger(
                conversion.gold_yield,
                vec![conversion_event_id],
                tick,
                sequence_in_tick,
            );
        }

        self.retarget_miner(miner_id, tick, sequence_in_tick);
    }

    /// Nearest-ore selection for one miner. An idle episode is logged once:
    /// the first failed query announces it, later polls stay silent.
    pub(super) fn retarget_miner(
        &mut self,
        miner_id: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
    ) {
        let Some(position) = self.miners.get(miner_id).map(|miner| miner.position) else {
            return;
        };

        let nearest = self
            .sites
            .nearest(ORE_TAG, position)
            .map(|(site_id, site_position)| (site_id.to_string(), site_position));

        match nearest {
            Some((site_id, site_position)) => {
                if let Some(miner) = self.miners.get_mut(miner_id) {
                    miner.state = MinerState::Seeking {
                        site_id: site_id.clone(),
                    };
                }
                self.announced_idle.remove(miner_id);
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::TargetSelected,
                    vec![miner_actor(miner_id)],
                    Vec::new(),
                    Some(json!({
                        "site_id": site_id,
                        "distance": position.distance_to(site_position),
                    })),
                );
            }
            None => {
                if let Some(miner) = self.miners.get_mut(miner_id) {
                    miner.state = MinerState::Idle;
                }
                if self.announced_idle.insert(miner_id.to_string()) {
                    self.push_event(
                        tick,
                        sequence_in_tick,
                        EventType::MinerIdle,
                        vec![miner_actor(miner_id)],
                        Vec::new(),
                        Some(json!({ "reason": "no ore sites tagged" })),
                    );
                }
            }
        }
    }
}

fn miner_actor(miner_id: &str) -> ActorRef {
    ActorRef {
        actor_id: miner_id.to_string(),
        actor_kind: "miner".to_string(),
    }
}
