//! Transport node: a minecart accumulates deposited ore and converts it to
//! gold the instant the configured threshold is met or exceeded.

use contracts::{CartConfig, Vec2};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    InvalidAmount(i64),
}

impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CartError::InvalidAmount(amount) => write!(f, "invalid deposit amount {amount}"),
        }
    }
}

impl std::error::Error for CartError {}

/// Result of a deposit that crossed the conversion threshold. The caller
/// credits the ledger with `gold_yield` in the same commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub ore_converted: i64,
    pub gold_yield: i64,
}

#[derive(Debug, Clone)]
pub struct Minecart {
    pub cart_id: String,
    pub position: Vec2,
    ore_stored: i64,
    pub conversion_threshold: i64,
    pub gold_per_ore: i64,
}

impl Minecart {
    pub fn from_config(config: &CartConfig) -> Self {
        Self {
            cart_id: config.cart_id.clone(),
            position: config.position,
            ore_stored: 0,
            conversion_threshold: config.conversion_threshold.max(1),
            gold_per_ore: config.gold_per_ore.max(0),
        }
    }

    pub fn ore_stored(&self) -> i64 {
        self.ore_stored
    }

    /// Add ore; convert synchronously when the counter reaches the
    /// threshold. No partial deposit survives a conversion: the counter is
    /// reset to zero before this returns.
    pub fn deposit(&mut self, amount: i64) -> Result<Option<Conversion>, CartError> {
        if amount <= 0 {
            return Err(CartError::InvalidAmount(amount));
        }

        self.ore_stored += amount;
        if self.ore_stored < self.conversion_threshold {
            return Ok(None);
        }

        let ore_converted = self.ore_stored;
        self.ore_stored = 0;
        Ok(Some(Conversion {
            ore_converted,
            gold_yield: ore_converted * self.gold_per_ore,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart(threshold: i64, gold_per_ore: i64) -> Minecart {
        Minecart::from_config(&CartConfig {
            cart_id: "cart:test".to_string(),
            position: Vec2::ZERO,
            conversion_threshold: threshold,
            gold_per_ore,
        })
    }

    #[test]
    fn threshold_one_converts_every_deposit() {
        let mut cart = cart(1, 3);
        let conversion = cart.deposit(2).expect("deposit").expect("converts");
        assert_eq!(conversion.ore_converted, 2);
        assert_eq!(conversion.gold_yield, 6);
        assert_eq!(cart.ore_stored(), 0);
    }

    #[test]
    fn below_threshold_accumulates() {
        let mut cart = cart(5, 2);
        assert!(cart.deposit(2).expect("deposit").is_none());
        assert!(cart.deposit(2).expect("deposit").is_none());
        assert_eq!(cart.ore_stored(), 4);

        let conversion = cart.deposit(3).expect("deposit").expect("crosses");
        assert_eq!(conversion.ore_converted, 7);
        assert_eq!(conversion.gold_yield, 14);
        assert_eq!(cart.ore_stored(), 0);
    }

    #[test]
    fn non_positive_amounts_rejected() {
        let mut cart = cart(1, 1);
        assert!(matches!(cart.deposit(0), Err(CartError::InvalidAmount(0))));
        assert!(matches!(
            cart.deposit(-4),
            Err(CartError::InvalidAmount(-4))
        ));
        assert_eq!(cart.ore_stored(), 0);
    }
}
