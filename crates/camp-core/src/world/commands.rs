use super::*;

impl CampWorld {
    pub(super) fn process_due_commands(&mut self, tick: u64, sequence_in_tick: &mut u64) {
        self.queued_commands.sort_by(|a, b| {
            a.effective_tick
                .cmp(&b.effective_tick)
                .then(a.insertion_sequence.cmp(&b.insertion_sequence))
        });

        let mut future = Vec::new();
        let mut due = Vec::new();
        for queued in self.queued_commands.drain(..) {
            if queued.effective_tick <= tick {
                due.push(queued);
            } else {
                future.push(queued);
            }
        }
        self.queued_commands = future;
        self.sync_queue_depth();

        for queued in due {
            self.apply_command(queued.command, tick, sequence_in_tick);
        }
    }

    pub(super) fn apply_command(
        &mut self,
        command: Command,
        tick: u64,
        sequence_in_tick: &mut u64,
    ) {
        let command_ref = format!("cmd:{}", command.command_id);
        match &command.payload {
            CommandPayload::SimStart => self.start(),
            CommandPayload::SimPause => self.pause(),
            CommandPayload::SimStepTick { .. } | CommandPayload::SimRunToTick { .. } => {}
            CommandPayload::Purchase { kind } => {
                self.apply_purchase(*kind, &command_ref, tick, sequence_in_tick);
            }
            CommandPayload::AddOreSite { site_id, position } => {
                self.sites.add(ORE_TAG, site_id, *position);
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::OreSiteAdded,
                    Vec::new(),
                    vec![command_ref.clone()],
                    Some(json!({
                        "site_id": site_id,
                        "position": position,
                        "site_count": self.sites.count(ORE_TAG),
                    })),
                );
            }
            CommandPayload::RemoveOreSite { site_id } => {
                if self.sites.remove(site_id) {
                    self.push_event(
                        tick,
                        sequence_in_tick,
                        EventType::OreSiteRemoved,
                        Vec::new(),
                        vec![command_ref.clone()],
                        Some(json!({
                            "site_id": site_id,
                            "site_count": self.sites.count(ORE_TAG),
                        })),
                    );
                }
            }
            CommandPayload::RemoveMiner { miner_id } => {
                self.announced_idle.remove(miner_id);
                if let Some(miner) = self.miners.remove(miner_id) {
                    self.push_event(
                        tick,
                        sequence_in_tick,
                        EventType::MinerRemoved,
                        vec![ActorRef {
                            actor_id: miner_id.clone(),
                            actor_kind: "removed".to_string(),
                        }],
                        vec![command_ref.clone()],
                        Some(json!({
                            "phase": miner.phase().as_str(),
                            "ore_lost": miner.ore_carried,
                        })),
                    );
                }
            }
        }

        self.push_event(
            tick,
            sequence_in_tick,
            EventType::CommandApplied,
            Vec::new(),
            vec![command_ref],
            Some(json!({ "command_type": command.command_type })),
        );
    }

    /// Purchase bookkeeping plus the kind's effect, broadcast to the whole
    /// roster within this one command application.
    fn apply_purchase(
        &mut self,
        kind: UpgradeKind,
        command_ref: &str,
        tick: u64,
        sequence_in_tick: &mut u64,
    ) {
        let receipt = match self.economy.try_purchase(kind) {
            Ok(receipt) => receipt,
            Err(err) => {
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::PurchaseRejected,
                    Vec::new(),
                    vec![command_ref.to_string()],
                    Some(json!({
                        "kind": kind,
                        "reason": err.to_string(),
                        "gold": self.economy.gold(),
                    })),
                );
                return;
            }
        };

        match kind {
            UpgradeKind::MiningSpeedUp => {
                let pct = self.config.mining_speed_increase_pct;
                for miner in self.miners.values_mut() {
                    miner.apply_mining_speed_up(pct);
                }
            }
            UpgradeKind::MovingSpeedUp => {
                let pct = self.config.moving_speed_increase_pct;
                for miner in self.miners.values_mut() {
                    miner.apply_moving_speed_level(pct, receipt.new_level);
                }
            }
            UpgradeKind::HireMiner => match self.config.spawn_point {
                Some(point) => {
                    let miner_id = self.build_miner(point);
                    self.push_event(
                        tick,
                        sequence_in_tick,
                        EventType::MinerSpawned,
                        vec![ActorRef {
                            actor_id: miner_id.clone(),
                            actor_kind: "miner".to_string(),
                        }],
                        vec![command_ref.to_string()],
                        Some(json!({
                            "roster_size": self.miners.len(),
                            "phase": self.miners[&miner_id].phase().as_str(),
                        })),
                    );
                }
                None => {
                    // The debit stands; only the spawn is skipped.
                    self.push_event(
                        tick,
                        sequence_in_tick,
                        EventType::SpawnPointMissing,
                        Vec::new(),
                        vec![command_ref.to_string()],
                        None,
                    );
                }
            },
        }

        self.push_event(
            tick,
            sequence_in_tick,
            EventType::PurchaseApplied,
            Vec::new(),
            vec![command_ref.to_string()],
            Some(json!({
                "kind": kind,
                "cost_paid": receipt.cost_paid,
                "new_level": receipt.new_level,
                "new_cost": receipt.new_cost,
                "gold": self.economy.gold(),
            })),
        );
        self.refresh_affordability(tick, sequence_in_tick);
    }
}
