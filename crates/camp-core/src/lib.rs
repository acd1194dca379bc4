//! Deterministic idle-mining simulation kernel: miners cycle between ore
//! sites and minecarts, carts convert ore to gold past a threshold, and the
//! economy ledger funds upgrades that rewrite miner parameters live.
//!
//! The kernel is single-threaded and tick-driven: `CampWorld::step` advances
//! one fixed `dt`, processing queued commands, every miner's state machine,
//! deposits, conversions, and ledger credits in a deterministic order.

pub mod cart;
pub mod economy;
pub mod miner;
pub mod motion;
pub mod spatial;
pub mod world;
