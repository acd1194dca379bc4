use super::*;

impl CampWorld {
    pub fn snapshot_for_current_tick(&self) -> Snapshot {
        let tick = self.status.current_tick;

        let economy = json!({
            "gold": self.economy.gold(),
            "gold_display": format!("Gold: {}", self.economy.gold()),
            "upgrades": UpgradeKind::ALL
                .iter()
                .map(|kind| {
                    let track = self.economy.track(*kind);
                    json!({
                        "kind": kind,
                        "cost": track.cost,
                        "level": track.level,
                        "affordable": self.economy.can_afford(*kind),
                    })
                })
                .collect::<Vec<_>>(),
        });

        let carts = self
            .carts
            .values()
            .map(|cart| {
                json!({
                    "cart_id": cart.cart_id,
                    "position": cart.position,
                    "ore_stored": cart.ore_stored(),
                    "conversion_threshold": cart.conversion_threshold,
                    "gold_per_ore": cart.gold_per_ore,
                })
            })
            .collect::<Vec<_>>();

        let miners = self
            .miners
            .values()
            .map(|miner| {
                json!({
                    "miner_id": miner.miner_id,
                    "position": miner.position,
                    "phase": miner.phase(),
                    "ore_carried": miner.ore_carried,
                    "move_speed": miner.move_speed,
                    "mining_time_seconds": miner.mining_time_seconds,
                    "target_site_id": miner.target_site_id(),
                    "cart_id": miner.cart_id,
                })
            })
            .collect::<Vec<_>>();

        let ore_sites = self
            .sites
            .find_by_tag(ORE_TAG)
            .iter()
            .map(|(site_id, position)| json!({ "site_id": site_id, "position": position }))
            .collect::<Vec<_>>();

        Snapshot {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: self.status.run_id.clone(),
            tick,
            created_at: synthetic_timestamp(tick, 0),
            snapshot_id: format!("snap_{tick:06}"),
            world_state_hash: format!("{:016x}", self.state_hash),
            economy,
            carts: Value::Array(carts),
            miners: Value::Array(miners),
            ore_sites: Value::Array(ore_sites),
        }
    }
}
