//! Decision log and AI metrics panel.
//!
//! Every phase has a fixed script of four decisions. Entering a phase queues
//! them with an 800 ms stagger and rolls fresh headline metrics from the
//! session RNG. None of it is computed from the vehicle state.

use crate::types::{Phase, Scenario};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Gap between consecutive decisions of one phase
pub const DECISION_STAGGER: Duration = Duration::from_millis(800);

/// Fixed "average response" shown in the summary (seconds)
pub const AVERAGE_RESPONSE_SECS: f64 = 0.2;

/// Confidence above which a decision is shown as completed
pub const COMPLETED_CONFIDENCE: u8 = 95;

/// Confidence below which a decision is shown as a warning
pub const WARNING_CONFIDENCE: u8 = 90;

/// Badge shown next to a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    Processing,
    Completed,
    Warning,
}

impl DecisionStatus {
    /// Classifies a confidence value.
    pub fn from_confidence(confidence: u8) -> Self {
        if confidence > COMPLETED_CONFIDENCE {
            DecisionStatus::Completed
        } else if confidence < WARNING_CONFIDENCE {
            DecisionStatus::Warning
        } else {
            DecisionStatus::Processing
        }
    }
}

/// One entry of the decision log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// `"{phase}-{index}"`
    pub id: String,
    pub action: String,
    pub confidence: u8,
    /// Session time at which the entry was released
    pub timestamp: Duration,
    pub status: DecisionStatus,
}

/// Headline gauges of the decision panel, all in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiMetrics {
    pub processing_speed: u8,
    pub confidence: u8,
    pub accuracy: u8,
    pub risk_assessment: u8,
}

impl AiMetrics {
    /// Rolls a fresh set of metrics.
    pub fn roll(rng: &mut ChaCha8Rng) -> Self {
        Self {
            processing_speed: rng.gen_range(80..100),
            confidence: rng.gen_range(85..100),
            accuracy: rng.gen_range(90..100),
            risk_assessment: rng.gen_range(10..35),
        }
    }
}

/// Difficulty badge for a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScenarioComplexity {
    pub difficulty: &'static str,
    pub score: u8,
}

/// Returns the complexity badge for a scenario.
pub fn scenario_complexity(scenario: Scenario) -> ScenarioComplexity {
    match scenario {
        Scenario::Parallel => ScenarioComplexity { difficulty: "High", score: 85 },
        Scenario::Perpendicular => ScenarioComplexity { difficulty: "Medium", score: 65 },
        Scenario::Angled => ScenarioComplexity { difficulty: "Low", score: 45 },
    }
}

/// The four scripted (action, confidence) pairs of a phase.
pub fn phase_script(phase: Phase) -> [(&'static str, u8); 4] {
    match phase {
        Phase::Scanning => [
            ("Analyzing parking environment", 92),
            ("Detecting available spaces", 88),
            ("Identifying obstacles", 95),
            ("Measuring space dimensions", 87),
        ],
        Phase::Planning => [
            ("Calculating optimal trajectory", 94),
            ("Planning steering angles", 91),
            ("Optimizing approach speed", 89),
            ("Validating safety constraints", 97),
        ],
        Phase::Executing => [
            ("Initiating steering maneuver", 93),
            ("Adjusting vehicle position", 88),
            ("Monitoring clearance distances", 96),
            ("Fine-tuning final position", 91),
        ],
        Phase::Completed => [
            ("Parking maneuver completed", 98),
            ("Final position validated", 95),
            ("Safety checks passed", 99),
            ("System ready for next task", 97),
        ],
    }
}

/// Footer numbers of the decision log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionSummary {
    /// Share of completed decisions, floored percent
    pub success_rate: u8,
    pub warnings: usize,
    pub average_response_secs: f64,
}

/// Holds the decision log, the pending queue and the headline metrics.
pub struct DecisionEngine {
    rng: ChaCha8Rng,
    log: Vec<Decision>,
    /// Decisions waiting for their release time, ordered by it
    queue: Vec<Decision>,
    metrics: AiMetrics,
}

impl DecisionEngine {
    /// Creates an empty engine drawing metrics from the given RNG stream.
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self {
            rng,
            log: Vec::new(),
            queue: Vec::new(),
            metrics: AiMetrics::default(),
        }
    }
    
    /// Queues the phase script starting at `at` and rolls new metrics.
    pub fn enter_phase(&mut self, phase: Phase, at: Duration) {
        for (index, (action, confidence)) in phase_script(phase).iter().enumerate() {
            self.queue.push(Decision {
                id: format!("{}-{}", phase.name(), index),
                action: action.to_string(),
                confidence: *confidence,
                timestamp: at + DECISION_STAGGER * index as u32,
                status: DecisionStatus::from_confidence(*confidence),
            });
        }
        self.queue.sort_by_key(|d| d.timestamp);
        self.metrics = AiMetrics::roll(&mut self.rng);
        debug!("Queued {} decisions, metrics {:?}", phase, self.metrics);
    }
    
    /// Releases every queued decision due at or before `now`.
    ///
    /// Returns the newly released entries.
    pub fn release_until(&mut self, now: Duration) -> Vec<Decision> {
        let due = self.queue.iter().take_while(|d| d.timestamp <= now).count();
        let released: Vec<Decision> = self.queue.drain(..due).collect();
        self.log.extend(released.iter().cloned());
        released
    }
    
    /// Clears the log and the queue and zeroes the metrics.
    pub fn deactivate(&mut self) {
        self.log.clear();
        self.queue.clear();
        self.metrics = AiMetrics::default();
    }
    
    pub fn log(&self) -> &[Decision] {
        &self.log
    }
    
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
    
    pub fn metrics(&self) -> AiMetrics {
        self.metrics
    }
    
    pub fn summary(&self) -> DecisionSummary {
        summarize(&self.log)
    }
}

/// Computes the footer numbers for a log.
pub fn summarize(log: &[Decision]) -> DecisionSummary {
    let completed = log.iter().filter(|d| d.status == DecisionStatus::Completed).count();
    let warnings = log.iter().filter(|d| d.status == DecisionStatus::Warning).count();
    
    DecisionSummary {
        success_rate: (completed * 100 / log.len().max(1)) as u8,
        warnings,
        average_response_secs: AVERAGE_RESPONSE_SECS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    
    fn engine(seed: u64) -> DecisionEngine {
        DecisionEngine::new(ChaCha8Rng::seed_from_u64(seed))
    }
    
    #[test]
    fn test_status_thresholds() {
        assert_eq!(DecisionStatus::from_confidence(96), DecisionStatus::Completed);
        assert_eq!(DecisionStatus::from_confidence(95), DecisionStatus::Processing);
        assert_eq!(DecisionStatus::from_confidence(90), DecisionStatus::Processing);
        assert_eq!(DecisionStatus::from_confidence(89), DecisionStatus::Warning);
    }
    
    #[test]
    fn test_staggered_release() {
        let mut engine = engine(42);
        engine.enter_phase(Phase::Scanning, Duration::from_secs(1));
        
        assert!(engine.release_until(Duration::from_millis(999)).is_empty());
        
        let first = engine.release_until(Duration::from_secs(1));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "scanning-0");
        assert_eq!(first[0].action, "Analyzing parking environment");
        
        let rest = engine.release_until(Duration::from_millis(3400));
        assert_eq!(rest.len(), 3);
        assert_eq!(rest[2].id, "scanning-3");
        assert_eq!(rest[2].timestamp, Duration::from_millis(3400));
        assert_eq!(engine.log().len(), 4);
        assert_eq!(engine.pending(), 0);
    }
    
    #[test]
    fn test_metrics_in_range() {
        let mut engine = engine(7);
        for phase in Phase::all().iter().cycle().take(40) {
            engine.enter_phase(*phase, Duration::ZERO);
            let m = engine.metrics();
            assert!((80..100).contains(&m.processing_speed));
            assert!((85..100).contains(&m.confidence));
            assert!((90..100).contains(&m.accuracy));
            assert!((10..35).contains(&m.risk_assessment));
        }
    }
    
    #[test]
    fn test_metrics_deterministic() {
        let mut a = engine(1234);
        let mut b = engine(1234);
        a.enter_phase(Phase::Planning, Duration::ZERO);
        b.enter_phase(Phase::Planning, Duration::ZERO);
        assert_eq!(a.metrics(), b.metrics());
    }
    
    #[test]
    fn test_deactivate_clears() {
        let mut engine = engine(42);
        engine.enter_phase(Phase::Executing, Duration::ZERO);
        engine.release_until(Duration::from_secs(1));
        
        engine.deactivate();
        
        assert!(engine.log().is_empty());
        assert_eq!(engine.pending(), 0);
        assert_eq!(engine.metrics(), AiMetrics::default());
    }
    
    #[test]
    fn test_summary() {
        let mut engine = engine(42);
        engine.enter_phase(Phase::Completed, Duration::ZERO);
        engine.release_until(Duration::from_secs(10));
        
        // 98, 99, 97 completed; 95 processing
        let summary = engine.summary();
        assert_eq!(summary.success_rate, 75);
        assert_eq!(summary.warnings, 0);
        
        let empty = summarize(&[]);
        assert_eq!(empty.success_rate, 0);
    }
    
    #[test]
    fn test_complexity_table() {
        assert_eq!(scenario_complexity(Scenario::Parallel).score, 85);
        assert_eq!(scenario_complexity(Scenario::Perpendicular).difficulty, "Medium");
        assert_eq!(scenario_complexity(Scenario::Angled).score, 45);
    }
}
