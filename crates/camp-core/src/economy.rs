//! Economy ledger: gold balance plus per-upgrade cost/level bookkeeping.
//!
//! The ledger owns money only. Upgrade *effects* (retuning miners, hiring)
//! are applied by the world so that a purchase and its broadcast happen in
//! one command application.

use std::collections::BTreeMap;

use contracts::{RunConfig, UpgradeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    InvalidAmount(i64),
    InsufficientGold {
        kind: UpgradeKind,
        cost: i64,
        gold: i64,
    },
}

impl std::fmt::Display for EconomyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EconomyError::InvalidAmount(amount) => write!(f, "invalid credit amount {amount}"),
            EconomyError::InsufficientGold { kind, cost, gold } => write!(
                f,
                "not enough gold for {}: cost={} gold={}",
                kind.as_str(),
                cost,
                gold
            ),
        }
    }
}

impl std::error::Error for EconomyError {}

/// Cost/level track for one upgrade kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeTrack {
    pub cost: i64,
    pub level: u32,
}

/// Returned by a successful purchase so the caller can apply the effect and
/// record the event without re-reading ledger state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub kind: UpgradeKind,
    pub cost_paid: i64,
    pub new_level: u32,
    pub new_cost: i64,
}

#[derive(Debug, Clone)]
pub struct EconomyLedger {
    gold: i64,
    tracks: BTreeMap<UpgradeKind, UpgradeTrack>,
}

impl EconomyLedger {
    pub fn from_config(config: &RunConfig) -> Self {
        let mut tracks = BTreeMap::new();
        for kind in UpgradeKind::ALL {
            tracks.insert(
                kind,
                UpgradeTrack {
                    cost: config.base_cost(kind).max(0),
                    level: 0,
                },
            );
        }
        Self {
            gold: config.starting_gold.max(0),
            tracks,
        }
    }

    pub fn gold(&self) -> i64 {
        self.gold
    }

    pub fn track(&self, kind: UpgradeKind) -> UpgradeTrack {
        self.tracks[&kind]
    }

    /// Add gold. Negative amounts are rejected; the balance never shrinks
    /// through this path.
    pub fn credit(&mut self, amount: i64) -> Result<(), EconomyError> {
        if amount < 0 {
            return Err(EconomyError::InvalidAmount(amount));
        }
        self.gold += amount;
        Ok(())
    }

    /// Attempt a purchase: debit the current cost, bump the level, escalate
    /// the cost to `round(old * 1.5)`. An unaffordable purchase changes
    /// nothing and reports why.
    pub fn try_purchase(&mut self, kind: UpgradeKind) -> Result<PurchaseReceipt, EconomyError> {
        let track = self.tracks[&kind];
        if self.gold < track.cost {
            return Err(EconomyError::InsufficientGold {
                kind,
                cost: track.cost,
                gold: self.gold,
            });
        }

        self.gold -= track.cost;
        let updated = UpgradeTrack {
            cost: escalate_cost(track.cost),
            level: track.level + 1,
        };
        self.tracks.insert(kind, updated);

        Ok(PurchaseReceipt {
            kind,
            cost_paid: track.cost,
            new_level: updated.level,
            new_cost: updated.cost,
        })
    }

    pub fn can_afford(&self, kind: UpgradeKind) -> bool {
        self.gold >= self.tracks[&kind].cost
    }

    /// Affordability flags in `UpgradeKind::ALL` order, recomputed from the
    /// current balance.
    pub fn affordability(&self) -> Vec<(UpgradeKind, bool)> {
        UpgradeKind::ALL
            .iter()
            .map(|kind| (*kind, self.can_afford(*kind)))
            .collect()
    }
}

/// `round(cost * 1.5)` in integer arithmetic, rounding half away from zero.
fn escalate_cost(cost: i64) -> i64 {
    (cost * 3 + 1) / 2
}
