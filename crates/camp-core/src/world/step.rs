use super::*;

impl CampWorld {
    pub fn start(&mut self) {
        if !self.status.is_complete() {
            self.status.mode = RunMode::Running;
        }
    }

    pub fn pause(&mut self) {
        self.status.mode = RunMode::Paused;
    }

    pub fn run_id(&self) -> &str {
        &self.status.run_id
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn events(&self) -> &[Event] {
        &self.event_log
    }

    pub fn replay_hash(&self) -> u64 {
        self.replay_hash
    }

    pub fn last_step_metrics(&self) -> StepMetrics {
        self.last_step_metrics
    }

    pub fn enqueue_command(&mut self, command: Command, effective_tick: u64) {
        self.queued_commands.push(QueuedCommand {
            effective_tick,
            insertion_sequence: self.next_command_sequence,
            command,
        });
        self.next_command_sequence = self.next_command_sequence.saturating_add(1);
        self.sync_queue_depth();
    }

    pub fn inject_command(&mut self, command: Command) {
        let effective_tick = self.status.current_tick + 1;
        self.enqueue_command(command, effective_tick);
    }

    /// Advance exactly one tick: due commands first, then every miner in id
    /// order, with deposits/conversions/credits committed synchronously.
    pub fn step(&mut self) -> bool {
        let previous_tick = self.status.current_tick;
        self.last_step_metrics = StepMetrics::default();
        if self.status.is_complete() {
            self.status.mode = RunMode::Paused;
            return false;
        }
        self.status.mode = RunMode::Running;
        let tick = self.status.current_tick.saturating_add(1);
        if tick > self.status.max_ticks {
            self.status.mode = RunMode::Paused;
            return false;
        }
        self.status.current_tick = tick;
        let mut sequence_in_tick = 0_u64;

        self.process_due_commands(tick, &mut sequence_in_tick);
        let processed_miners = self.advance_miners(tick, &mut sequence_in_tick);

        self.state_hash = mix_state_hash(self.state_hash, tick, sequence_in_tick);
        self.last_step_metrics = StepMetrics {
            advanced_ticks: self.status.current_tick.saturating_sub(previous_tick),
            processed_batch_tick: tick,
            processed_miners,
        };

        if self.status.current_tick >= self.status.max_ticks {
            self.status.mode = RunMode::Paused;
        }
        self.sync_queue_depth();

        true
    }

    pub fn step_n(&mut self, n: u64) -> u64 {
        let mut committed = 0_u64;
        for _ in 0..n {
            if !self.step() {
                break;
            }
            committed += 1;
        }
        committed
    }

    pub fn run_to_tick(&mut self, tick: u64) -> u64 {
        let mut committed = 0_u64;
        while self.status.current_tick < tick {
            if !self.step() {
                break;
            }
            committed += 1;
        }
        committed
    }

    pub(super) fn sync_queue_depth(&mut self) {
        self.status.queue_depth = self.queued_commands.len();
    }
}
