//! v1 cross-boundary contracts for the camp kernel, API, persistence, and CLI.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Tag under which harvestable ore sites are registered in the tag index.
pub const ORE_TAG: &str = "ore";

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// 2D position/velocity vector. Distances are Euclidean.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Vec2) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in this direction; the zero vector normalizes to itself.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len == 0.0 {
            Vec2::ZERO
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    pub fn scaled(self, factor: f64) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }

    pub fn offset(self, dx: f64, dy: f64) -> Vec2 {
        Vec2::new(self.x + dx, self.y + dy)
    }
}

// ---------------------------------------------------------------------------
// Upgrades
// ---------------------------------------------------------------------------

/// Closed enumeration of purchasable upgrades. Each kind tracks its own
/// cost/level and carries its own effect routine in the kernel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    MiningSpeedUp,
    MovingSpeedUp,
    HireMiner,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 3] = [
        UpgradeKind::MiningSpeedUp,
        UpgradeKind::MovingSpeedUp,
        UpgradeKind::HireMiner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MiningSpeedUp => "mining_speed_up",
            Self::MovingSpeedUp => "moving_speed_up",
            Self::HireMiner => "hire_miner",
        }
    }

    /// Human-facing button label.
    pub fn label(self) -> &'static str {
        match self {
            Self::MiningSpeedUp => "Mining Speed",
            Self::MovingSpeedUp => "Moving Speed",
            Self::HireMiner => "New Miner",
        }
    }
}

// ---------------------------------------------------------------------------
// Miner phases
// ---------------------------------------------------------------------------

/// Externally visible phase of a miner's work cycle. `Depositing` is an
/// instantaneous handoff and never persists across a tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MinerPhase {
    Seeking,
    Mining,
    Returning,
    Depositing,
    Idle,
}

impl MinerPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seeking => "seeking",
            Self::Mining => "mining",
            Self::Returning => "returning",
            Self::Depositing => "depositing",
            Self::Idle => "idle",
        }
    }
}

/// Animation intent emitted by the kernel for an external animation system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnimationCue {
    Walking,
    Mining,
    Idle,
}

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OreSiteConfig {
    pub site_id: String,
    pub position: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartConfig {
    pub cart_id: String,
    pub position: Vec2,
    pub conversion_threshold: i64,
    pub gold_per_ore: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub schema_version: String,
    pub run_id: String,
    #[serde(with = "serde_u64_string")]
    pub seed: u64,
    pub duration_seconds: u32,
    /// Fixed simulation rate; `dt = 1 / tick_hz` seconds.
    pub tick_hz: u32,
    pub snapshot_every_ticks: u64,
    pub ore_sites: Vec<OreSiteConfig>,
    pub carts: Vec<CartConfig>,
    /// Where hired miners appear. Absent means hires are skipped (logged).
    pub spawn_point: Option<Vec2>,
    pub starting_miners: u32,
    pub move_speed: f64,
    pub mining_time_seconds: f64,
    pub hits_to_mine: u32,
    /// Trigger-volume radius for reaching ore sites and carts.
    pub arrival_radius: f64,
    pub starting_gold: i64,
    pub mining_speed_cost: i64,
    pub moving_speed_cost: i64,
    pub hire_miner_cost: i64,
    pub mining_speed_increase_pct: f64,
    pub moving_speed_increase_pct: f64,
    pub notes: Option<String>,
}

impl RunConfig {
    pub fn max_ticks(&self) -> u64 {
        u64::from(self.duration_seconds) * u64::from(self.tick_hz.max(1))
    }

    pub fn tick_seconds(&self) -> f64 {
        1.0 / f64::from(self.tick_hz.max(1))
    }

    pub fn base_cost(&self, kind: UpgradeKind) -> i64 {
        match kind {
            UpgradeKind::MiningSpeedUp => self.mining_speed_cost,
            UpgradeKind::MovingSpeedUp => self.moving_speed_cost,
            UpgradeKind::HireMiner => self.hire_miner_cost,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: "run_local_001".to_string(),
            seed: 1337,
            duration_seconds: 120,
            tick_hz: 50,
            snapshot_every_ticks: 250,
            ore_sites: vec![
                OreSiteConfig {
                    site_id: "ore:east".to_string(),
                    position: Vec2::new(8.0, 0.0),
                },
                OreSiteConfig {
                    site_id: "ore:north".to_string(),
                    position: Vec2::new(5.0, 6.0),
                },
            ],
            carts: vec![CartConfig {
                cart_id: "cart:main".to_string(),
                position: Vec2::new(-4.0, 0.0),
                conversion_threshold: 1,
                gold_per_ore: 1,
            }],
            spawn_point: Some(Vec2::new(0.0, 0.0)),
            starting_miners: 1,
            move_speed: 5.0,
            mining_time_seconds: 2.0,
            hits_to_mine: 3,
            arrival_radius: 0.5,
            starting_gold: 0,
            mining_speed_cost: 5,
            moving_speed_cost: 7,
            hire_miner_cost: 10,
            mining_speed_increase_pct: 0.1,
            moving_speed_increase_pct: 0.1,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Running,
    Paused,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunStatus {
    pub schema_version: String,
    pub run_id: String,
    pub current_tick: u64,
    pub max_ticks: u64,
    pub mode: RunMode,
    pub queue_depth: usize,
}

impl RunStatus {
    pub fn is_complete(&self) -> bool {
        self.current_tick >= self.max_ticks
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={} tick={}/{} mode={:?} queue_depth={}",
            self.run_id, self.current_tick, self.max_ticks, self.mode, self.queue_depth
        )
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    SimStart,
    SimPause,
    SimStepTick,
    SimRunToTick,
    Purchase,
    AddOreSite,
    RemoveOreSite,
    RemoveMiner,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandPayload {
    SimStart,
    SimPause,
    SimStepTick { steps: u64 },
    SimRunToTick { target_tick: u64 },
    Purchase { kind: UpgradeKind },
    AddOreSite { site_id: String, position: Vec2 },
    RemoveOreSite { site_id: String },
    RemoveMiner { miner_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Command {
    pub schema_version: String,
    pub command_id: String,
    pub run_id: String,
    pub issued_at_tick: u64,
    pub command_type: CommandType,
    pub payload: CommandPayload,
}

impl Command {
    pub fn new(
        command_id: impl Into<String>,
        run_id: impl Into<String>,
        issued_at_tick: u64,
        command_type: CommandType,
        payload: CommandPayload,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            command_id: command_id.into(),
            run_id: run_id.into(),
            issued_at_tick,
            command_type,
            payload,
        }
    }
}

// ---------------------------------------------------------------------------
// API error envelope and command results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    RunNotFound,
    InvalidCommand,
    InvalidQuery,
    TickOutOfRange,
    ContractVersionUnsupported,
    RunStateConflict,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandResult {
    pub schema_version: String,
    pub command_id: String,
    pub run_id: String,
    pub accepted: bool,
    pub error: Option<ApiError>,
}

impl CommandResult {
    pub fn accepted(command: &Command) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            command_id: command.command_id.clone(),
            run_id: command.run_id.clone(),
            accepted: true,
            error: None,
        }
    }

    pub fn rejected(command: &Command, error: ApiError) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            command_id: command.command_id.clone(),
            run_id: command.run_id.clone(),
            accepted: false,
            error: Some(error),
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActorRef {
    pub actor_id: String,
    pub actor_kind: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    CommandApplied,
    MinerSpawned,
    MinerRemoved,
    TargetSelected,
    MinerIdle,
    MiningStarted,
    MiningHitLanded,
    MiningCompleted,
    ReturnStarted,
    OreDeposited,
    DepositRejected,
    OreConverted,
    GoldCredited,
    PurchaseApplied,
    PurchaseRejected,
    AffordabilityChanged,
    OreSiteAdded,
    OreSiteRemoved,
    SpawnPointMissing,
    CartMissing,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub schema_version: String,
    pub run_id: String,
    pub tick: u64,
    pub created_at: String,
    pub event_id: String,
    pub sequence_in_tick: u64,
    pub event_type: EventType,
    pub actors: Vec<ActorRef>,
    pub caused_by: Vec<String>,
    pub details: Option<Value>,
}

// ---------------------------------------------------------------------------
// Snapshots and query envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub schema_version: String,
    pub run_id: String,
    pub tick: u64,
    pub created_at: String,
    pub snapshot_id: String,
    pub world_state_hash: String,
    pub economy: Value,
    pub carts: Value,
    pub miners: Value,
    pub ore_sites: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResponse {
    pub schema_version: String,
    pub query_type: String,
    pub run_id: String,
    pub generated_at_tick: u64,
    pub data: Value,
}

// ---------------------------------------------------------------------------
// Inspector read-models (the "UI" surface)
// ---------------------------------------------------------------------------

/// One upgrade button: label, current cost/level, and whether it is
/// currently affordable (drives enabled/disabled state).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpgradeButton {
    pub kind: UpgradeKind,
    pub label: String,
    pub cost: i64,
    pub level: u32,
    pub interactable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EconomyPanel {
    pub schema_version: String,
    pub gold: i64,
    pub gold_display: String,
    pub buttons: Vec<UpgradeButton>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartPanel {
    pub schema_version: String,
    pub cart_id: String,
    pub ore_stored: i64,
    pub ore_display: String,
    pub conversion_threshold: i64,
    pub gold_per_ore: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinerView {
    pub schema_version: String,
    pub miner_id: String,
    pub position: Vec2,
    pub phase: MinerPhase,
    pub ore_carried: u32,
    pub move_speed: f64,
    pub mining_time_seconds: f64,
    pub hits_to_mine: u32,
    pub target_site_id: Option<String>,
    pub cart_id: Option<String>,
    pub velocity: Vec2,
    pub animation: AnimationCue,
}

pub mod serde_u64_string {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u64>().map_err(D::Error::custom)
    }
}
