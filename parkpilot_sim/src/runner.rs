//! Scenario runner - drives a parking session to completion and checks it.

use crate::exporter::{SimExport, SimFrame};
use crate::world::{ParkingWorld, SimConfig, WorldFrame};

use parkpilot_core::decisions::{scenario_complexity, ScenarioComplexity};
use parkpilot_core::sensors::ConeKind;
use parkpilot_core::{DecisionSummary, Gear, Phase, Scenario, Waypoint};
use parkpilot_env::PilotContext;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Position / heading error below which the final pose counts as exact
const FINAL_TOLERANCE: f64 = 1e-6;

/// Slack for float noise when comparing successive distances
const DISTANCE_SLACK: f64 = 1e-9;

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: Scenario,
    
    /// Seed used
    pub seed: u64,
    
    /// Whether scenario passed all assertions
    pub passed: bool,
    
    /// Total ticks executed
    pub total_ticks: u64,
    
    /// Final simulation time in seconds
    pub final_time_secs: f64,
    
    /// Whether the mission completed with the car on its final waypoint
    pub parked: bool,
    
    /// Distance between the final pose and the last waypoint
    pub final_position_error: f64,
    
    /// Heading gap between the final pose and the last waypoint (degrees)
    pub final_heading_error: f64,
    
    /// Failure message if any
    pub failure_reason: Option<String>,
    
    /// Difficulty badge of the scenario
    pub complexity: ScenarioComplexity,
    
    /// Footer numbers of the decision log at the end of the run
    pub decisions: DecisionSummary,
    
    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default)]
pub struct ScenarioMetrics {
    /// Executing ticks until the car reached the last waypoint
    pub ticks_to_park: Option<u64>,
    
    /// Ticks spent in reverse gear
    pub reversing_ticks: u64,
    
    /// Highest cursor value seen
    pub waypoints_reached: usize,
    
    /// Ticks where the distance to an unchanged target grew
    pub distance_regressions: u64,
    
    /// Ticks where the cursor moved backwards
    pub cursor_regressions: u64,
    
    /// Ticks where gear and sensor cones disagreed with the target waypoint
    pub reverse_mismatches: u64,
    
    /// Decision log entries released
    pub decisions_logged: usize,
    
    /// Mission phase changes observed
    pub phase_transitions: u64,
}

/// Runs parking scenarios against the virtual clock.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,
    
    /// Tick interval
    tick: Duration,
    
    /// Time spent in each mission phase
    phase_duration: Duration,
    
    /// Maximum duration in seconds
    max_duration_secs: f64,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        let defaults = SimConfig::default();
        Self {
            seed,
            tick: defaults.tick,
            phase_duration: defaults.phase_duration,
            max_duration_secs: 60.0,
        }
    }
    
    /// Sets the tick interval.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }
    
    /// Sets the time spent in each mission phase.
    pub fn with_phase_duration(mut self, duration: Duration) -> Self {
        self.phase_duration = duration;
        self
    }
    
    /// Sets the maximum duration; 0 means run until parked.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.max_duration_secs = secs;
        self
    }
    
    /// World configuration used for `scenario`.
    pub fn config_for(&self, scenario: Scenario) -> SimConfig {
        SimConfig {
            seed: self.seed,
            scenario,
            tick: self.tick,
            phase_duration: self.phase_duration,
            max_duration_secs: self.max_duration_secs,
            hold_until_parked: true,
        }
    }
    
    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: Scenario) -> ScenarioResult {
        self.run_inner(scenario, None)
    }
    
    /// Runs a scenario, recording every `interval`-th frame into an export.
    pub fn run_recorded(&self, scenario: Scenario, interval: u64) -> (ScenarioResult, SimExport) {
        let mut export = SimExport::new(scenario.name(), self.seed, self.tick.as_millis() as u64);
        let result = self.run_inner(scenario, Some((&mut export, interval.max(1))));
        export.finalize(result.parked, Some(result.final_position_error));
        (result, export)
    }
    
    /// Runs every scenario in order.
    pub fn run_all(&self, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
        scenarios.iter().map(|s| self.run(*s)).collect()
    }
    
    fn run_inner(&self, scenario: Scenario, mut export: Option<(&mut SimExport, u64)>) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        debug!("  {}", scenario.description());
        
        let config = self.config_for(scenario);
        let budget = config.time_budget();
        let mut world = ParkingWorld::simulated(config);
        let context = world.context().clone();
        world.start();
        
        let waypoints = scenario.waypoints();
        let mut checker = InvariantChecker::new(&waypoints);
        let mut parked = false;
        let mut ticks = 0;
        
        // A zero tick never moves the clock; nothing to run
        while !self.tick.is_zero() && budget.map_or(true, |b| context.now() < b) {
            context.advance_time(self.tick);
            let frame = world.tick(self.tick);
            ticks += 1;
            
            checker.observe(&frame);
            
            if let Some((export, interval)) = export.as_mut() {
                if ticks % *interval == 0 || !frame.transitions.is_empty() || frame.is_parked() {
                    export.add_frame(SimFrame::from_world(&frame));
                }
            }
            
            if frame.is_parked() {
                parked = true;
                break;
            }
        }
        
        let state = world.animator().state().clone();
        let (final_position_error, final_heading_error) = match waypoints.last() {
            Some(last) => (state.distance_to(last), state.heading_gap_to(last)),
            None => (0.0, 0.0),
        };
        
        let mut metrics = checker.metrics;
        metrics.decisions_logged = world.decisions().log().len();
        let decisions = world.decisions().summary();
        let complexity = scenario_complexity(scenario);
        
        let failure_reason = if !parked {
            Some(format!("did not park within {:.1}s", self.max_duration_secs))
        } else if final_position_error > FINAL_TOLERANCE || final_heading_error > FINAL_TOLERANCE {
            Some(format!(
                "final pose off by {:.3} units / {:.3} deg",
                final_position_error, final_heading_error
            ))
        } else if metrics.distance_regressions > 0 {
            Some(format!("{} distance regressions", metrics.distance_regressions))
        } else if metrics.cursor_regressions > 0 {
            Some(format!("{} cursor regressions", metrics.cursor_regressions))
        } else if metrics.reverse_mismatches > 0 {
            Some(format!("{} reverse mismatches", metrics.reverse_mismatches))
        } else {
            None
        };
        let passed = failure_reason.is_none();
        
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("  Scenario: {} | Ticks: {} | t={:.2}s", scenario, ticks, context.now().as_secs_f64());
        info!("  PARKING METRICS:");
        info!("    Ticks to park:          {}", metrics.ticks_to_park.map_or("-".to_string(), |t| t.to_string()));
        info!("    Waypoints reached:      {}/{}", metrics.waypoints_reached, waypoints.len().saturating_sub(1));
        info!("    Reversing ticks:        {}", metrics.reversing_ticks);
        info!("    Final error:            {:.4} units  {}", final_position_error, if final_position_error <= FINAL_TOLERANCE { "✓" } else { "✗" });
        info!("    Decisions logged:       {} ({}% completed, {} warnings)", metrics.decisions_logged, decisions.success_rate, decisions.warnings);
        info!("    Complexity:             {} ({})", complexity.difficulty, complexity.score);
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        
        if let Some(reason) = &failure_reason {
            warn!("Scenario {} failed: {}", scenario, reason);
        }
        
        ScenarioResult {
            scenario,
            seed: self.seed,
            passed,
            total_ticks: ticks,
            final_time_secs: context.now().as_secs_f64(),
            parked,
            final_position_error,
            final_heading_error,
            failure_reason,
            complexity,
            decisions,
            metrics,
        }
    }
}

/// Tracks per-tick invariants of a running session.
struct InvariantChecker<'a> {
    waypoints: &'a [Waypoint],
    last_cursor: usize,
    last_target: Option<(usize, f64)>,
    executing_ticks: u64,
    metrics: ScenarioMetrics,
}

impl<'a> InvariantChecker<'a> {
    fn new(waypoints: &'a [Waypoint]) -> Self {
        Self {
            waypoints,
            last_cursor: 0,
            last_target: None,
            executing_ticks: 0,
            metrics: ScenarioMetrics::default(),
        }
    }
    
    fn observe(&mut self, frame: &WorldFrame) {
        self.metrics.phase_transitions += frame.transitions.len() as u64;
        let animator = &frame.animator;
        
        if frame.phase != Phase::Executing || !frame.active {
            return;
        }
        self.executing_ticks += 1;
        
        if animator.cursor < self.last_cursor {
            self.metrics.cursor_regressions += 1;
        }
        self.last_cursor = animator.cursor;
        self.metrics.waypoints_reached = self.metrics.waypoints_reached.max(animator.cursor);
        
        if animator.is_reversing {
            self.metrics.reversing_ticks += 1;
        }
        
        if animator.completed {
            self.metrics.ticks_to_park.get_or_insert(self.executing_ticks);
            self.last_target = None;
            return;
        }
        
        let Some(index) = animator.target_index else {
            return;
        };
        let Some(target) = self.waypoints.get(index) else {
            return;
        };
        
        let distance = animator.state.distance_to(target);
        if let Some((last_index, last_distance)) = self.last_target {
            if last_index == index && distance > last_distance + DISTANCE_SLACK {
                debug!("Distance to waypoint {} grew: {:.4} -> {:.4}", index, last_distance, distance);
                self.metrics.distance_regressions += 1;
            }
        }
        self.last_target = Some((index, distance));
        
        let reverse_target = target.gear == Gear::Reverse;
        let front = cone_active(frame, ConeKind::Front);
        let rear = cone_active(frame, ConeKind::Rear);
        if reverse_target != animator.is_reversing || (reverse_target && (!rear || front)) {
            self.metrics.reverse_mismatches += 1;
        }
    }
}

fn cone_active(frame: &WorldFrame, kind: ConeKind) -> bool {
    frame.animator.cones.iter().any(|c| c.kind == kind && c.active)
}
