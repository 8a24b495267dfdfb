//! Mission phase clock.
//!
//! Cycles the demo through scanning -> planning -> executing -> completed
//! on a fixed period while the session is active.

use crate::types::Phase;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Default time spent in each phase
pub const DEFAULT_PHASE_DURATION: Duration = Duration::from_millis(3000);

/// A phase change reported by `MissionClock::advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: Phase,
    pub to: Phase,
}

/// Drives the simulation phase.
#[derive(Debug, Clone)]
pub struct MissionClock {
    active: bool,
    phase: Phase,
    
    /// Time spent in the current phase
    elapsed: Duration,
    
    phase_duration: Duration,
    
    /// While set, time in the current phase stops accumulating
    held: bool,
}

impl MissionClock {
    /// Creates an inactive clock in the scanning phase.
    pub fn new() -> Self {
        Self {
            active: false,
            phase: Phase::Scanning,
            elapsed: Duration::ZERO,
            phase_duration: DEFAULT_PHASE_DURATION,
            held: false,
        }
    }
    
    /// Sets the time spent in each phase.
    pub fn with_phase_duration(mut self, duration: Duration) -> Self {
        self.phase_duration = duration;
        self
    }
    
    /// Activates the session and restarts from scanning.
    pub fn start(&mut self) {
        info!("Mission started");
        self.active = true;
        self.phase = Phase::Scanning;
        self.elapsed = Duration::ZERO;
        self.held = false;
    }
    
    /// Deactivates the session; the phase returns to scanning.
    pub fn stop(&mut self) {
        if self.active {
            info!("Mission stopped in {} phase", self.phase);
        }
        self.active = false;
        self.phase = Phase::Scanning;
        self.elapsed = Duration::ZERO;
        self.held = false;
    }
    
    /// Same as `stop`; kept separate because the demo has both buttons.
    pub fn reset(&mut self) {
        self.stop();
    }
    
    /// Freezes (or releases) the current phase.
    ///
    /// Used to keep the executing phase open until the car has parked.
    pub fn hold(&mut self, held: bool) {
        self.held = held;
    }
    
    /// Advances the clock by `dt` and returns every phase change that happened.
    pub fn advance(&mut self, dt: Duration) -> Vec<PhaseTransition> {
        let mut transitions = Vec::new();
        if !self.active || self.held || self.phase_duration.is_zero() {
            return transitions;
        }
        
        self.elapsed += dt;
        while self.elapsed >= self.phase_duration {
            self.elapsed -= self.phase_duration;
            let from = self.phase;
            self.phase = from.next();
            debug!("Phase {} -> {}", from, self.phase);
            transitions.push(PhaseTransition { from, to: self.phase });
        }
        
        transitions
    }
    
    pub fn is_active(&self) -> bool {
        self.active
    }
    
    pub fn phase(&self) -> Phase {
        self.phase
    }
    
    pub fn is_held(&self) -> bool {
        self.held
    }
    
    pub fn phase_duration(&self) -> Duration {
        self.phase_duration
    }
    
    /// Progress bar value: 25 / 50 / 75 / 100 by phase.
    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.phase)
    }
}

impl Default for MissionClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress bar value for a phase.
pub fn progress_percent(phase: Phase) -> u8 {
    match phase {
        Phase::Scanning => 25,
        Phase::Planning => 50,
        Phase::Executing => 75,
        Phase::Completed => 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_inactive_clock_does_not_move() {
        let mut clock = MissionClock::new();
        assert!(clock.advance(Duration::from_secs(10)).is_empty());
        assert_eq!(clock.phase(), Phase::Scanning);
    }
    
    #[test]
    fn test_phase_cycle() {
        let mut clock = MissionClock::new();
        clock.start();
        
        assert!(clock.advance(Duration::from_millis(2999)).is_empty());
        let t = clock.advance(Duration::from_millis(1));
        assert_eq!(t, vec![PhaseTransition { from: Phase::Scanning, to: Phase::Planning }]);
        
        clock.advance(Duration::from_secs(6));
        assert_eq!(clock.phase(), Phase::Completed);
        
        clock.advance(Duration::from_secs(3));
        assert_eq!(clock.phase(), Phase::Scanning);
    }
    
    #[test]
    fn test_large_step_reports_each_transition() {
        let mut clock = MissionClock::new().with_phase_duration(Duration::from_millis(100));
        clock.start();
        
        let t = clock.advance(Duration::from_millis(350));
        assert_eq!(t.len(), 3);
        assert_eq!(t[2].to, Phase::Completed);
    }
    
    #[test]
    fn test_hold_freezes_phase() {
        let mut clock = MissionClock::new();
        clock.start();
        clock.advance(Duration::from_secs(6));
        assert_eq!(clock.phase(), Phase::Executing);
        
        clock.hold(true);
        assert!(clock.advance(Duration::from_secs(60)).is_empty());
        assert_eq!(clock.phase(), Phase::Executing);
        
        clock.hold(false);
        clock.advance(Duration::from_secs(3));
        assert_eq!(clock.phase(), Phase::Completed);
    }
    
    #[test]
    fn test_stop_returns_to_scanning() {
        let mut clock = MissionClock::new();
        clock.start();
        clock.advance(Duration::from_secs(7));
        
        clock.stop();
        assert!(!clock.is_active());
        assert_eq!(clock.phase(), Phase::Scanning);
        assert_eq!(clock.progress_percent(), 25);
    }
    
    #[test]
    fn test_progress_percent() {
        let values: Vec<u8> = Phase::all().iter().map(|p| progress_percent(*p)).collect();
        assert_eq!(values, vec![25, 50, 75, 100]);
    }
}
