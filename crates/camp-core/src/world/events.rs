use super::*;

impl CampWorld {
    pub(super) fn push_event(
        &mut self,
        tick: u64,
        sequence_in_tick: &mut u64,
        event_type: EventType,
        actors: Vec<ActorRef>,
        caused_by: Vec<String>,
        details: Option<Value>,
    ) -> String {
        *sequence_in_tick = sequence_in_tick.saturating_add(1);
        let event_id = format!("evt_{tick:06}_{:04}", *sequence_in_tick);
        self.event_log.push(Event {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: self.status.run_id.clone(),
            tick,
            created_at: synthetic_timestamp(tick, *sequence_in_tick),
            event_id: event_id.clone(),
            sequence_in_tick: *sequence_in_tick,
            event_type,
            actors,
            caused_by,
            details,
        });
        self.replay_hash = mix_replay_hash(self.replay_hash, &event_id, tick, *sequence_in_tick);
        event_id
    }

    /// Recompute affordability from the current balance; emit an event only
    /// when some button's enabled state actually flipped.
    pub(super) fn refresh_affordability(&mut self, tick: u64, sequence_in_tick: &mut u64) {
        let current = self.economy.affordability();
        if current == self.affordability {
            return;
        }
        self.affordability = current.clone();
        let flags = current
            .iter()
            .map(|(kind, affordable)| (kind.as_str().to_string(), json!(affordable)))
            .collect::<serde_json::Map<_, _>>();
        self.push_event(
            tick,
            sequence_in_tick,
            EventType::AffordabilityChanged,
            Vec::new(),
            Vec::new(),
            Some(json!({ "gold": self.economy.gold(), "buttons": flags })),
        );
    }

    /// Credit the ledger and surface the new balance; affordability is
    /// recomputed after every balance change.
    pub(super) fn credit_ledger(
        &mut self,
        amount: i64,
        caused_by: Vec<String>,
        tick: u64,
        sequence_in_tick: &mut u64,
    ) {
        match self.economy.credit(amount) {
            Ok(()) => {
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::GoldCredited,
                    Vec::new(),
                    caused_by,
                    Some(json!({
                        "amount": amount,
                        "gold": self.economy.gold(),
                        "gold_display": format!("Gold: {}", self.economy.gold()),
                    })),
                );
                self.refresh_affordability(tick, sequence_in_tick);
            }
            Err(err) => {
                self.push_event(
                    tick,
                    sequence_in_tick,
                    EventType::DepositRejected,
                    Vec::new(),
                    caused_by,
                    Some(json!({ "reason": err.to_string() })),
                );
            }
        }
    }
}
