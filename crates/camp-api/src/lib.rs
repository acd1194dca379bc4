//! In-process API facade over the camp kernel: command validation,
//! deterministic queueing, and SQLite persistence with snapshot cadence.

mod persistence;
mod server;

use std::path::Path;

use camp_core::world::CampWorld;
use contracts::{
    ApiError, Command, CommandPayload, CommandResult, CommandType, ErrorCode, Event, RunConfig,
    RunStatus, Snapshot, SCHEMA_VERSION_V1,
};
use persistence::SqliteRunStore;
pub use persistence::{PersistedCommandEntry, PersistedRunSummary, PersistenceError, ReplaySlice};
pub use server::{serve, ServerError};

#[derive(Debug)]
struct PersistenceState {
    store: SqliteRunStore,
    persisted_command_count: usize,
    persisted_event_count: usize,
    last_snapshot_tick: Option<u64>,
}

#[derive(Debug)]
pub struct EngineApi {
    engine: CampWorld,
    command_audit: Vec<CommandResult>,
    command_log: Vec<PersistedCommandEntry>,
    persistence: Option<PersistenceState>,
    last_persistence_error: Option<String>,
}

impl EngineApi {
    pub fn from_config(config: RunConfig) -> Self {
        Self {
            engine: CampWorld::new(config),
            command_audit: Vec::new(),
            command_log: Vec::new(),
            persistence: None,
            last_persistence_error: None,
        }
    }

    pub fn attach_sqlite_store(&mut self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let store = SqliteRunStore::open(path)?;
        self.persistence = Some(PersistenceState {
            store,
            persisted_command_count: 0,
            persisted_event_count: 0,
            last_snapshot_tick: None,
        });
        Ok(())
    }

    pub fn initialize_run_storage(
        &mut self,
        replace_existing_run: bool,
    ) -> Result<(), PersistenceError> {
        let Some(state) = self.persistence.as_mut() else {
            return Err(PersistenceError::NotAttached);
        };

        let run_id = self.engine.run_id().to_string();
        if state.store.run_exists(&run_id)? {
            if replace_existing_run {
                state.store.delete_run(&run_id)?;
                state.persisted_command_count = 0;
                state.persisted_event_count = 0;
                state.last_snapshot_tick = None;
            } else {
                return Err(PersistenceError::RunAlreadyExists(run_id));
            }
        }

        let bootstrap_snapshot = self.engine.snapshot_for_current_tick();
        state.store.persist_delta(
            self.engine.config(),
            self.engine.status(),
            &[],
            &[],
            Some(&bootstrap_snapshot),
        )?;
        state.last_snapshot_tick = Some(bootstrap_snapshot.tick);
        self.last_persistence_error = None;
        Ok(())
    }

    pub fn flush_persistence_checked(&mut self) -> Result<(), PersistenceError> {
        let Some(state) = self.persistence.as_mut() else {
            return Err(PersistenceError::NotAttached);
        };

        let new_commands = &self.command_log[state.persisted_command_count..];
        let new_events = &self.engine.events()[state.persisted_event_count..];

        let current_tick = self.engine.status().current_tick;
        let cadence = self.engine.config().snapshot_every_ticks.max(1);
        let snapshot_due = ((current_tick == 0 && state.last_snapshot_tick.is_none())
            || (current_tick > 0
                && ((current_tick % cadence == 0) || self.engine.status().is_complete())))
            && state.last_snapshot_tick != Some(current_tick);

        let snapshot = if snapshot_due {
            Some(self.engine.snapshot_for_current_tick())
        } else {
            None
        };

        state.store.persist_delta(
            self.engine.config(),
            self.engine.status(),
            new_commands,
            new_events,
            snapshot.as_ref(),
        )?;

        state.persisted_command_count = self.command_log.len();
        state.persisted_event_count = self.engine.events().len();

        if let Some(snapshot_payload) = snapshot {
            state.last_snapshot_tick = Some(snapshot_payload.tick);
        }

        self.last_persistence_error = None;
        Ok(())
    }

    pub fn replay_at_tick(&self, run_id: &str, tick: u64) -> Result<ReplaySlice, PersistenceError> {
        let Some(state) = self.persistence.as_ref() else {
            return Err(PersistenceError::NotAttached);
        };

        state.store.load_replay_at_tick(run_id, tick)
    }

    pub fn load_latest_snapshot_at_or_before(
        &self,
        run_id: &str,
        tick: u64,
    ) -> Result<Option<Snapshot>, PersistenceError> {
        let Some(state) = self.persistence.as_ref() else {
            return Err(PersistenceError::NotAttached);
        };

        state.store.load_latest_snapshot_at_or_before(run_id, tick)
    }

    pub fn load_snapshots_range(
        &self,
        run_id: &str,
        from_tick: u64,
        to_tick: u64,
    ) -> Result<Vec<Snapshot>, PersistenceError> {
        let Some(state) = self.persistence.as_ref() else {
            return Err(PersistenceError::NotAttached);
        };

        state.store.load_snapshots_range(run_id, from_tick, to_tick)
    }

    pub fn last_persistence_error(&self) -> Option<&str> {
        self.last_persistence_error.as_deref()
    }

    pub fn run_id(&self) -> &str {
        self.engine.run_id()
    }

    pub fn config(&self) -> &RunConfig {
        self.engine.config()
    }

    pub fn snapshot_for_current_tick(&self) -> Snapshot {
        self.engine.snapshot_for_current_tick()
    }

    pub fn start(&mut self) -> &RunStatus {
        self.engine.start();
        self.flush_persistence_if_enabled();
        self.engine.status()
    }

    pub fn pause(&mut self) -> &RunStatus {
        self.engine.pause();
        self.flush_persistence_if_enabled();
        self.engine.status()
    }

    /// Advance by the requested number of ticks. Auto-starts the engine if
    /// paused so that explicit step requests always advance.
    pub fn step(&mut self, steps: u64) -> (&RunStatus, u64) {
        self.engine.start();
        let committed = self.engine.step_n(steps.max(1));
        self.flush_persistence_if_enabled();
        (self.engine.status(), committed)
    }

    /// Auto-starts the engine if paused so that explicit run-to-tick
    /// requests always advance.
    pub fn run_to_tick(&mut self, tick: u64) -> (&RunStatus, u64) {
        self.engine.start();
        let committed = self.engine.run_to_tick(tick);
        self.flush_persistence_if_enabled();
        (self.engine.status(), committed)
    }

    pub fn submit_command(
        &mut self,
        command: Command,
        effective_tick: Option<u64>,
    ) -> CommandResult {
        let validation_error = self.validate_command(&command, effective_tick);

        let result = match validation_error {
            Some(error) => CommandResult::rejected(&command, error),
            None => {
                self.engine.inject_command(command.clone());
                CommandResult::accepted(&command)
            }
        };

        let scheduled_tick = effective_tick.unwrap_or(command.issued_at_tick);
        self.command_audit.push(result.clone());
        self.command_log.push(PersistedCommandEntry {
            command,
            result: result.clone(),
            effective_tick: scheduled_tick,
        });
        self.flush_persistence_if_enabled();
        result
    }

    pub fn status(&self) -> &RunStatus {
        self.engine.status()
    }

    pub fn command_audit(&self) -> &[CommandResult] {
        &self.command_audit
    }

    pub fn command_log(&self) -> &[PersistedCommandEntry] {
        &self.command_log
    }

    pub fn events(&self) -> &[Event] {
        self.engine.events()
    }

    /// Expose the underlying world for direct inspection.
    pub fn camp_world(&self) -> &CampWorld {
        &self.engine
    }

    fn flush_persistence_if_enabled(&mut self) {
        if self.persistence.is_none() {
            return;
        }

        if let Err(err) = self.flush_persistence_checked() {
            self.last_persistence_error = Some(err.to_string());
        }
    }

    fn validate_command(&self, command: &Command, effective_tick: Option<u64>) -> Option<ApiError> {
        if command.schema_version != SCHEMA_VERSION_V1 {
            return Some(ApiError::new(
                ErrorCode::ContractVersionUnsupported,
                "Unsupported schema_version",
                Some(format!(
                    "got={} expected={}",
                    command.schema_version, SCHEMA_VERSION_V1
                )),
            ));
        }

        if command.run_id != self.engine.run_id() {
            return Some(ApiError::new(
                ErrorCode::RunNotFound,
                "command.run_id does not match active run",
                None,
            ));
        }

        if !command_type_matches_payload(command.command_type, &command.payload) {
            return Some(ApiError::new(
                ErrorCode::InvalidCommand,
                "command_type does not match payload variant",
                None,
            ));
        }

        match &command.payload {
            CommandPayload::SimStepTick { steps } if *steps == 0 => {
                return Some(ApiError::new(
                    ErrorCode::InvalidCommand,
                    "sim.step_tick requires steps >= 1",
                    None,
                ))
            }
            CommandPayload::AddOreSite { site_id, position } => {
                if site_id.trim().is_empty() {
                    return Some(ApiError::new(
                        ErrorCode::InvalidCommand,
                        "add_ore_site requires a non-empty site_id",
                        None,
                    ));
                }
                if !position.x.is_finite() || !position.y.is_finite() {
                    return Some(ApiError::new(
                        ErrorCode::InvalidCommand,
                        "add_ore_site requires a finite position",
                        None,
                    ));
                }
            }
            CommandPayload::RemoveOreSite { site_id } if site_id.trim().is_empty() => {
                return Some(ApiError::new(
                    ErrorCode::InvalidCommand,
                    "remove_ore_site requires a non-empty site_id",
                    None,
                ))
            }
            CommandPayload::RemoveMiner { miner_id } if miner_id.trim().is_empty() => {
                return Some(ApiError::new(
                    ErrorCode::InvalidCommand,
                    "remove_miner requires a non-empty miner_id",
                    None,
                ))
            }
            _ => {}
        }

        let scheduled_tick = effective_tick.unwrap_or(command.issued_at_tick);
        let min_tick = self.status().current_tick + 1;
        if scheduled_tick < min_tick {
            return Some(ApiError::new(
                ErrorCode::TickOutOfRange,
                "cannot schedule command in the past",
                Some(format!(
                    "scheduled_tick={} min_tick={}",
                    scheduled_tick, min_tick
                )),
            ));
        }

        None
    }
}

fn command_type_matches_payload(command_type: CommandType, payload: &CommandPayload) -> bool {
    matches!(
        (command_type, payload),
        (CommandType::SimStart, CommandPayload::SimStart)
            | (CommandType::SimPause, CommandPayload::SimPause)
            | (CommandType::SimStepTick, CommandPayload::SimStepTick { .. })
            | (
                CommandType::SimRunToTick,
                CommandPayload::SimRunToTick { .. }
            )
            | (CommandType::Purchase, CommandPayload::Purchase { .. })
            | (CommandType::AddOreSite, CommandPayload::AddOreSite { .. })
            | (
                CommandType::RemoveOreSite,
                CommandPayload::RemoveOreSite { .. }
            )
            | (CommandType::RemoveMiner, CommandPayload::RemoveMiner { .. })
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::UpgradeKind;

    fn test_config() -> RunConfig {
        let mut config = RunConfig::default();
        config.run_id = "run_api_test".to_string();
        config.tick_hz = 10;
        config.duration_seconds = 30;
        config.snapshot_every_ticks = 4;
        config
    }

    fn temp_db_path(name: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();

        std::env::temp_dir().join(format!("paydirt_{name}_{nanos}.sqlite"))
    }

    #[test]
    fn step_returns_committed_count() {
        let mut api = EngineApi::from_config(test_config());
        api.start();
        let (_, committed) = api.step(3);

        assert_eq!(committed, 3);
        assert_eq!(api.status().current_tick, 3);
    }

    #[test]
    fn rejects_mismatched_payload_type() {
        let config = test_config();
        let mut api = EngineApi::from_config(config.clone());

        let bad = Command::new(
            "cmd_bad",
            config.run_id,
            1,
            CommandType::Purchase,
            CommandPayload::RemoveMiner {
                miner_id: "miner_000".to_string(),
            },
        );

        let result = api.submit_command(bad, None);
        assert!(!result.accepted);
        assert!(result.error.is_some());
    }

    #[test]
    fn rejects_commands_scheduled_in_the_past() {
        let config = test_config();
        let mut api = EngineApi::from_config(config.clone());
        api.start();
        api.step(5);

        let stale = Command::new(
            "cmd_stale",
            config.run_id,
            1,
            CommandType::Purchase,
            CommandPayload::Purchase {
                kind: UpgradeKind::HireMiner,
            },
        );

        let result = api.submit_command(stale, Some(2));
        assert!(!result.accepted);
        let error = result.error.expect("error present");
        assert_eq!(error.error_code, ErrorCode::TickOutOfRange);
    }

    #[test]
    fn accepts_and_applies_valid_purchase_command() {
        let config = test_config();
        let mut api = EngineApi::from_config(config.clone());
        api.start();
        api.step(1);

        let command = Command::new(
            "cmd_buy_1",
            config.run_id,
            api.status().current_tick + 1,
            CommandType::Purchase,
            CommandPayload::Purchase {
                kind: UpgradeKind::MiningSpeedUp,
            },
        );

        let result = api.submit_command(command, Some(api.status().current_tick + 1));
        assert!(result.accepted);

        // Gold is zero, so the purchase lands as a rejection event in-world.
        api.step(1);
        assert!(api
            .events()
            .iter()
            .any(|event| event.event_type == contracts::EventType::PurchaseRejected));
    }

    #[test]
    fn persists_and_replays_by_tick() {
        let config = test_config();
        let run_id = config.run_id.clone();

        let mut api = EngineApi::from_config(config);
        let db_path = temp_db_path("replay");

        api.attach_sqlite_store(&db_path)
            .expect("should attach sqlite store");
        api.initialize_run_storage(true)
            .expect("should initialize storage");

        api.start();
        api.run_to_tick(9);
        api.flush_persistence_checked()
            .expect("flush should succeed");

        let replay = api
            .replay_at_tick(&run_id, 9)
            .expect("replay should load at tick");

        assert!(replay.snapshot.is_some());

        let _ = std::fs::remove_file(&db_path);
        let _ = std::fs::remove_file(db_path.with_extension("sqlite-wal"));
        let _ = std::fs::remove_file(db_path.with_extension("sqlite-shm"));
    }
}
