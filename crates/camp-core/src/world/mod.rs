use std::collections::{BTreeMap, BTreeSet};

mod commands;
mod events;
mod init;
mod inspect;
mod miners;
mod snapshot;
mod step;

use contracts::{
    ActorRef, Command, CommandPayload, Event, EventType, RunConfig, RunMode, RunStatus, Snapshot,
    UpgradeKind, Vec2, ORE_TAG, SCHEMA_VERSION_V1,
};
use serde_json::{json, Value};

use crate::cart::Minecart;
use crate::economy::EconomyLedger;
use crate::miner::{Miner, MinerOutcome, MinerState, Surroundings};
use crate::spatial::TagIndex;

#[derive(Debug, Clone)]
struct QueuedCommand {
    effective_tick: u64,
    insertion_sequence: u64,
    command: Command,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepMetrics {
    pub advanced_ticks: u64,
    pub processed_batch_tick: u64,
    pub processed_miners: u64,
}

/// The whole camp: ledger, carts, miners, ore sites, command queue, and the
/// append-only event log. Everything the simulation mutates lives here and
/// is advanced by `step` on a single thread.
#[derive(Debug)]
pub struct CampWorld {
    config: RunConfig,
    status: RunStatus,
    queued_commands: Vec<QueuedCommand>,
    event_log: Vec<Event>,
    miners: BTreeMap<String, Miner>,
    carts: BTreeMap<String, Minecart>,
    economy: EconomyLedger,
    sites: TagIndex,
    /// Last published affordability flags, in `UpgradeKind::ALL` order.
    affordability: Vec<(UpgradeKind, bool)>,
    /// Miners whose idleness has been logged for the current idle episode.
    announced_idle: BTreeSet<String>,
    next_command_sequence: u64,
    next_miner_index: u32,
    state_hash: u64,
    replay_hash: u64,
    last_step_metrics: StepMetrics,
}

fn synthetic_timestamp(tick: u64, seq: u64) -> String {
    format!(
        "1970-01-01T{:02}:{:02}:{:02}Z",
        (tick / 3600) % 24,
        (tick / 60) % 60,
        (tick + seq) % 60
    )
}

fn mix_state_hash(state_hash: u64, tick: u64, sequence_in_tick: u64) -> u64 {
    let mut hash = state_hash ^ tick.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    hash ^= sequence_in_tick.wrapping_mul(0x517C_C1B7_2722_0A95);
    hash.rotate_left(17)
}

fn mix_replay_hash(current: u64, event_id: &str, tick: u64, sequence: u64) -> u64 {
    let mut hash = current ^ tick.wrapping_mul(0xA24B_1C62_5B93_2D47);
    hash ^= sequence.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    for byte in event_id.as_bytes() {
        hash = hash.rotate_left(7) ^ u64::from(*byte);
        hash = hash.wrapping_mul(0x517C_C1B7_2722_0A95);
    }
    hash
}

fn mix_seed(seed: u64, salt: u64) -> u64 {
    let mut value = seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    value ^= value.rotate_left(29);
    value = value.wrapping_mul(0x517C_C1B7_2722_0A95);
    value ^ (value >> 31)
}

fn sample_range_i64(seed: u64, stream: u64, min: i64, max: i64) -> i64 {
    if max <= min {
        return min;
    }
    let span = (max - min + 1) as u64;
    let mixed = mix_seed(seed, stream);
    min + (mixed % span) as i64
}

/// Deterministic spawn jitter so stacked hires do not overlap exactly.
fn spawn_jitter(seed: u64, index: u32) -> Vec2 {
    let miner_seed = mix_seed(seed, u64::from(index) + 1);
    let dx = sample_range_i64(miner_seed, 1, -25, 25) as f64 / 100.0;
    let dy = sample_range_i64(miner_seed, 2, -25, 25) as f64 / 100.0;
    Vec2::new(dx, dy)
}

#[cfg(test)]
mod tests;
