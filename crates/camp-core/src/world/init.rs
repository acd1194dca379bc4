use super::*;

impl CampWorld {
    pub fn new(config: RunConfig) -> Self {
        let status = RunStatus {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            run_id: config.run_id.clone(),
            current_tick: 0,
            max_ticks: config.max_ticks(),
            mode: RunMode::Paused,
            queue_depth: 0,
        };

        let mut sites = TagIndex::new();
        for site in &config.ore_sites {
            sites.add(ORE_TAG, &site.site_id, site.position);
        }

        let mut carts = BTreeMap::new();
        for cart_config in &config.carts {
            carts.insert(
                cart_config.cart_id.clone(),
                Minecart::from_config(cart_config),
            );
        }

        let economy = EconomyLedger::from_config(&config);
        let affordability = economy.affordability();

        let mut world = Self {
            config,
            status,
            queued_commands: Vec::new(),
            event_log: Vec::new(),
            miners: BTreeMap::new(),
            carts,
            economy,
            sites,
            affordability,
            announced_idle: BTreeSet::new(),
            next_command_sequence: 0,
            next_miner_index: 0,
            state_hash: 0,
            replay_hash: 0,
            last_step_metrics: StepMetrics::default(),
        };

        // Initial roster spawns silently at tick zero.
        let spawn_point = world.config.spawn_point;
        for _ in 0..world.config.starting_miners {
            if let Some(point) = spawn_point {
                world.build_miner(point);
            }
        }

        world
    }

    /// Construct a miner at `point` with parameters reflecting the current
    /// upgrade levels, assign the nearest cart, and target the nearest ore.
    pub(super) fn build_miner(&mut self, point: Vec2) -> String {
        let index = self.next_miner_index;
        self.next_miner_index += 1;

        let miner_id = format!("miner_{index:03}");
        let jitter = spawn_jitter(self.config.seed, index);
        let position = point.offset(jitter.x, jitter.y);

        let moving_level = self.economy.track(UpgradeKind::MovingSpeedUp).level;
        let mining_level = self.economy.track(UpgradeKind::MiningSpeedUp).level;
        let mining_time = self.config.mining_time_seconds
            * (1.0 - self.config.mining_speed_increase_pct).powi(mining_level as i32);

        let mut miner = Miner::new(
            miner_id.clone(),
            position,
            self.config.move_speed,
            mining_time,
            self.config.hits_to_mine,
            self.nearest_cart_id(position),
        );
        miner.apply_moving_speed_level(self.config.moving_speed_increase_pct, moving_level);

        if let Some((site_id, _)) = self.sites.nearest(ORE_TAG, position) {
            miner.state = MinerState::Seeking {
                site_id: site_id.to_string(),
            };
        }

        self.miners.insert(miner_id.clone(), miner);
        miner_id
    }

    fn nearest_cart_id(&self, from: Vec2) -> Option<String> {
        let mut closest: Option<String> = None;
        let mut closest_distance = f64::INFINITY;
        for cart in self.carts.values() {
            let distance = from.distance_to(cart.position);
            if distance < closest_distance {
                closest_distance = distance;
                closest = Some(cart.cart_id.clone());
            }
        }
        closest
    }
}
