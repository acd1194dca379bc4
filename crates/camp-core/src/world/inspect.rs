use super::*;

use contracts::{CartPanel, EconomyPanel, MinerView, UpgradeButton};

impl CampWorld {
    /// The upgrade-panel read-model: gold display plus one button per kind,
    /// `interactable` reflecting current affordability.
    pub fn economy_panel(&self) -> EconomyPanel {
        let buttons = UpgradeKind::ALL
            .iter()
            .map(|kind| {
                let track = self.economy.track(*kind);
                UpgradeButton {
                    kind: *kind,
                    label: kind.label().to_string(),
                    cost: track.cost,
                    level: track.level,
                    interactable: self.economy.can_afford(*kind),
                }
            })
            .collect();

        EconomyPanel {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            gold: self.economy.gold(),
            gold_display: format!("Gold: {}", self.economy.gold()),
            buttons,
        }
    }

    pub fn cart_panel(&self, cart_id: &str) -> Option<CartPanel> {
        self.carts.get(cart_id).map(|cart| CartPanel {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            cart_id: cart.cart_id.clone(),
            ore_stored: cart.ore_stored(),
            ore_display: format!("Ore: {}", cart.ore_stored()),
            conversion_threshold: cart.conversion_threshold,
            gold_per_ore: cart.gold_per_ore,
        })
    }

    pub fn miner_view(&self, miner_id: &str) -> Option<MinerView> {
        self.miners.get(miner_id).map(miner_view)
    }

    pub fn miner_views(&self) -> Vec<MinerView> {
        self.miners.values().map(miner_view).collect()
    }

    pub fn ore_site_count(&self) -> usize {
        self.sites.count(ORE_TAG)
    }

    pub fn gold(&self) -> i64 {
        self.economy.gold()
    }
}

fn miner_view(miner: &Miner) -> MinerView {
    MinerView {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        miner_id: miner.miner_id.clone(),
        position: miner.position,
        phase: miner.phase(),
        ore_carried: miner.ore_carried,
        move_speed: miner.move_speed,
        mining_time_seconds: miner.mining_time_seconds,
        hits_to_mine: miner.hits_to_mine,
        target_site_id: miner.target_site_id().map(str::to_string),
        cart_id: miner.cart_id.clone(),
        velocity: miner.velocity,
        animation: miner.animation,
    }
}
