//! ParkingWorld - ties the mission clock, animator and panels together.

use parkpilot_core::mission::progress_percent;
use parkpilot_core::{
    AiMetrics, AnimatorFrame, AnimatorInputs, Decision, DecisionEngine, MissionClock, Phase,
    PhaseTransition, Scenario, SensorPanel, SensorReading, TrajectoryAnimator,
};
use crate::context::SimContext;
use parkpilot_env::{PilotContext, TokioContext};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// RNG stream feeding the sensor panel
pub const SENSOR_STREAM: u64 = 1;

/// RNG stream feeding the decision metrics
pub const DECISION_STREAM: u64 = 2;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,
    
    /// Scenario the car parks in
    pub scenario: Scenario,
    
    /// Tick interval
    pub tick: Duration,
    
    /// Time spent in each mission phase
    pub phase_duration: Duration,
    
    /// Maximum simulation duration in seconds.
    /// Zero (or anything that is not a positive finite number) means unlimited.
    pub max_duration_secs: f64,
    
    /// Keep the executing phase open until the car has parked
    pub hold_until_parked: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            scenario: Scenario::Parallel,
            tick: Duration::from_millis(60),
            phase_duration: Duration::from_millis(3000),
            max_duration_secs: 30.0,
            hold_until_parked: true,
        }
    }
}

impl SimConfig {
    /// Time budget for a run, `None` when unlimited.
    pub fn time_budget(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.max_duration_secs)
            .ok()
            .filter(|budget| !budget.is_zero())
    }
}

/// Everything observable after one world tick.
#[derive(Debug, Clone, Serialize)]
pub struct WorldFrame {
    pub tick: u64,
    pub time_sec: f64,
    pub active: bool,
    pub phase: Phase,
    pub progress_percent: u8,
    pub animator: AnimatorFrame,
    
    /// Phase changes that happened during this tick
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<PhaseTransition>,
    
    /// Decisions released during this tick
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub decisions: Vec<Decision>,
    
    pub metrics: AiMetrics,
    
    /// Latest panel readings (resampled on phase changes)
    pub sensors: Vec<SensorReading>,
}

impl WorldFrame {
    /// True once the car sits on its final waypoint with the mission completed.
    pub fn is_parked(&self) -> bool {
        self.phase == Phase::Completed && self.animator.completed
    }
}

/// The ParkingWorld - one demo session.
pub struct ParkingWorld<C: PilotContext> {
    /// Configuration
    pub config: SimConfig,
    
    /// Shared context (clock and RNG streams)
    context: Arc<C>,
    
    mission: MissionClock,
    animator: TrajectoryAnimator,
    decisions: DecisionEngine,
    panel: SensorPanel,
    readings: Vec<SensorReading>,
    
    /// Ticks since creation
    tick_count: u64,
}

impl<C: PilotContext> ParkingWorld<C> {
    /// Creates an inactive world for the configured scenario.
    ///
    /// Panel streams come from `context`; its seed should match `config.seed`.
    pub fn new(config: SimConfig, context: Arc<C>) -> Self {
        if context.seed() != config.seed {
            warn!(
                "Context seed {} differs from configured seed {}; panels follow the context",
                context.seed(),
                config.seed
            );
        }
        let mission = MissionClock::new().with_phase_duration(config.phase_duration);
        let animator = TrajectoryAnimator::new(config.scenario);
        let decisions = DecisionEngine::new(context.rng_stream(DECISION_STREAM));
        let mut panel = SensorPanel::new(context.rng_stream(SENSOR_STREAM));
        let readings = panel.sample(false, Phase::Scanning);
        
        Self {
            config,
            context,
            mission,
            animator,
            decisions,
            panel,
            readings,
            tick_count: 0,
        }
    }
    
    pub fn context(&self) -> &Arc<C> {
        &self.context
    }
    
    /// Activates the session at the scanning phase.
    pub fn start(&mut self) {
        info!("Session started: {} (seed {})", self.config.scenario, self.context.seed());
        self.mission.start();
        self.sync_animator();
        self.decisions.deactivate();
        self.enter_phase(Phase::Scanning);
    }
    
    /// Deactivates the session. The car returns to the origin pose.
    pub fn stop(&mut self) {
        info!("Session stopped");
        self.mission.stop();
        self.sync_animator();
        self.decisions.deactivate();
        self.readings = self.panel.sample(false, self.mission.phase());
    }
    
    /// Deactivates and rewinds the mission clock to scanning.
    pub fn reset(&mut self) {
        self.mission.reset();
        self.stop();
    }
    
    /// Switches scenario. A running trajectory restarts from the origin.
    pub fn set_scenario(&mut self, scenario: Scenario) {
        if scenario != self.config.scenario {
            info!("Scenario changed: {} -> {}", self.config.scenario, scenario);
            self.config.scenario = scenario;
            self.sync_animator();
        }
    }
    
    /// Advances the world by `dt`.
    pub fn tick(&mut self, dt: Duration) -> WorldFrame {
        let parked = self.animator.is_completed();
        self.mission.hold(
            self.config.hold_until_parked && self.mission.phase() == Phase::Executing && !parked,
        );
        
        let transitions = self.mission.advance(dt);
        for transition in &transitions {
            self.enter_phase(transition.to);
        }
        self.sync_animator();
        
        let animator = self.animator.tick(dt);
        let decisions = self.decisions.release_until(self.context.now());
        self.tick_count += 1;
        
        if !decisions.is_empty() {
            debug!("Tick {}: released {} decisions", self.tick_count, decisions.len());
        }
        
        WorldFrame {
            tick: self.tick_count,
            time_sec: self.context.now().as_secs_f64(),
            active: self.mission.is_active(),
            phase: self.mission.phase(),
            progress_percent: progress_percent(self.mission.phase()),
            animator,
            transitions,
            decisions,
            metrics: self.decisions.metrics(),
            sensors: self.readings.clone(),
        }
    }
    
    pub fn is_active(&self) -> bool {
        self.mission.is_active()
    }
    
    pub fn phase(&self) -> Phase {
        self.mission.phase()
    }
    
    pub fn animator(&self) -> &TrajectoryAnimator {
        &self.animator
    }
    
    pub fn decisions(&self) -> &DecisionEngine {
        &self.decisions
    }
    
    pub fn readings(&self) -> &[SensorReading] {
        &self.readings
    }
    
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
    
    fn enter_phase(&mut self, phase: Phase) {
        debug!("Entering {} at {:?}", phase, self.context.now());
        self.decisions.enter_phase(phase, self.context.now());
        self.readings = self.panel.sample(true, phase);
    }
    
    fn sync_animator(&mut self) {
        self.animator.set_inputs(AnimatorInputs {
            scenario: self.config.scenario,
            active: self.mission.is_active(),
            phase: self.mission.phase(),
        });
    }
}

impl ParkingWorld<SimContext> {
    /// World on a fresh virtual clock seeded from `config.seed`.
    pub fn simulated(config: SimConfig) -> Self {
        let context = SimContext::shared(config.seed);
        Self::new(config, context)
    }
}

impl ParkingWorld<TokioContext> {
    /// World on the wall clock, panels seeded from `config.seed`.
    pub fn realtime(config: SimConfig) -> Self {
        let context = TokioContext::shared(config.seed);
        Self::new(config, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    fn world(seed: u64) -> (Arc<SimContext>, ParkingWorld<SimContext>) {
        let world = ParkingWorld::simulated(SimConfig { seed, ..SimConfig::default() });
        (world.context().clone(), world)
    }
    
    fn step(ctx: &SimContext, world: &mut ParkingWorld<SimContext>) -> WorldFrame {
        let dt = world.config.tick;
        ctx.advance_time(dt);
        world.tick(dt)
    }
    
    #[test]
    fn test_inactive_world_stays_at_origin() {
        let (ctx, mut world) = world(42);
        for _ in 0..100 {
            let frame = step(&ctx, &mut world);
            assert!(!frame.active);
            assert!(frame.animator.state.is_origin());
            assert!(frame.decisions.is_empty());
        }
        assert!(world.readings().iter().all(|r| r.distance_cm == 0));
    }
    
    #[test]
    fn test_start_queues_scanning_decisions() {
        let (ctx, mut world) = world(42);
        world.start();
        assert_eq!(world.decisions().pending(), 4);
        
        let frame = step(&ctx, &mut world);
        assert_eq!(frame.phase, Phase::Scanning);
        assert_eq!(frame.decisions.len(), 1);
        assert!(world.readings().iter().all(|r| r.distance_cm > 0));
    }
    
    #[test]
    fn test_car_only_moves_while_executing() {
        let (ctx, mut world) = world(42);
        world.start();
        
        loop {
            let frame = step(&ctx, &mut world);
            if frame.phase == Phase::Executing {
                break;
            }
            assert!(frame.animator.state.is_origin());
        }
        
        let frame = step(&ctx, &mut world);
        assert!(!frame.animator.state.is_origin());
    }
    
    #[test]
    fn test_executing_held_until_parked() {
        let (ctx, mut world) = world(7);
        world.start();
        
        let mut frames = Vec::new();
        for _ in 0..2000 {
            let frame = step(&ctx, &mut world);
            let done = frame.phase == Phase::Completed;
            frames.push(frame);
            if done {
                break;
            }
        }
        
        let last = frames.last().unwrap();
        assert_eq!(last.phase, Phase::Completed);
        assert!(last.animator.completed);
        assert!(last.is_parked());
    }
    
    #[test]
    fn test_stop_returns_to_origin() {
        let (ctx, mut world) = world(42);
        world.start();
        while world.phase() != Phase::Executing {
            step(&ctx, &mut world);
        }
        for _ in 0..20 {
            step(&ctx, &mut world);
        }
        assert!(!world.animator().state().is_origin());
        
        world.stop();
        let frame = step(&ctx, &mut world);
        assert!(frame.animator.state.is_origin());
        assert!(world.decisions().log().is_empty());
    }
    
    #[test]
    fn test_same_seed_same_panels() {
        let (ctx1, mut world1) = world(99);
        let (ctx2, mut world2) = world(99);
        world1.start();
        world2.start();
        
        for _ in 0..200 {
            let a = step(&ctx1, &mut world1);
            let b = step(&ctx2, &mut world2);
            assert_eq!(a.sensors, b.sensors);
            assert_eq!(a.metrics, b.metrics);
            assert_eq!(a.decisions, b.decisions);
        }
    }
    
    #[test]
    fn test_realtime_worlds_share_seeded_panels() {
        let config = SimConfig { seed: 42, ..SimConfig::default() };
        let mut a = ParkingWorld::realtime(config.clone());
        let mut b = ParkingWorld::realtime(config);
        a.start();
        b.start();
        
        assert_eq!(a.context().seed(), 42);
        assert_eq!(a.readings(), b.readings());
        assert_eq!(a.decisions().metrics(), b.decisions().metrics());
    }
    
    #[test]
    fn test_realtime_matches_simulated_panels() {
        let config = SimConfig { seed: 7, ..SimConfig::default() };
        let mut wall = ParkingWorld::realtime(config.clone());
        let mut virt = ParkingWorld::simulated(config);
        wall.start();
        virt.start();
        
        assert_eq!(wall.readings(), virt.readings());
    }
    
    #[test]
    fn test_time_budget() {
        let budget = |secs| SimConfig { max_duration_secs: secs, ..SimConfig::default() }.time_budget();
        
        assert_eq!(budget(30.0), Some(Duration::from_secs(30)));
        assert_eq!(budget(0.0), None);
        assert_eq!(budget(f64::INFINITY), None);
        assert_eq!(budget(-1.0), None);
    }
}
