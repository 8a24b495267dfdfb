//! Async driver - paces a ParkingWorld through `PilotContext::sleep`.
//!
//! With `SimContext` the loop runs as fast as the CPU allows on a virtual
//! clock. With `TokioContext` it ticks in wall-clock time.

use crate::world::{ParkingWorld, WorldFrame};
use parkpilot_core::Scenario;
use parkpilot_env::{EnvError, PilotContext};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Session inputs a front end can change while the loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionControl {
    pub active: bool,
    pub scenario: Scenario,
}

impl SessionControl {
    pub fn running(scenario: Scenario) -> Self {
        Self { active: true, scenario }
    }
    
    pub fn stopped(scenario: Scenario) -> Self {
        Self { active: false, scenario }
    }
}

/// How a drive loop ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveReport {
    pub ticks: u64,
    pub elapsed: Duration,
    
    /// Mission completed with the car parked
    pub parked: bool,
    
    /// The control sender was dropped
    pub closed: bool,
}

/// Ticks `world` until the car parks or the control sender is dropped.
///
/// Frames go to `frames` when given. Running past the world's time budget
/// (`SimConfig::time_budget`) yields `EnvError::Timeout`.
pub async fn drive<C: PilotContext>(
    world: &mut ParkingWorld<C>,
    mut control: watch::Receiver<SessionControl>,
    frames: Option<mpsc::Sender<WorldFrame>>,
) -> Result<DriveReport, EnvError> {
    let context = world.context().clone();
    let tick = world.config.tick;
    let budget = world.config.time_budget();
    let started = context.now();
    let mut ticks = 0;
    
    let initial = *control.borrow_and_update();
    apply(world, initial);
    info!("Drive loop started (tick {:?}, budget {:?})", tick, budget);
    
    loop {
        let elapsed = context.now().saturating_sub(started);
        if let Some(budget) = budget.filter(|b| elapsed >= *b) {
            return Err(EnvError::timeout(budget));
        }
        
        context.sleep(tick).await;
        
        match control.has_changed() {
            Ok(true) => {
                let inputs = *control.borrow_and_update();
                apply(world, inputs);
            }
            Ok(false) => {}
            Err(_) => {
                info!("Control channel closed after {} ticks", ticks);
                return Ok(DriveReport {
                    ticks,
                    elapsed: context.now().saturating_sub(started),
                    parked: false,
                    closed: true,
                });
            }
        }
        
        let frame = world.tick(tick);
        ticks += 1;
        let parked = frame.is_parked();
        
        if let Some(tx) = &frames {
            tx.send(frame)
                .await
                .map_err(|_| EnvError::context("frame receiver dropped"))?;
        }
        
        if parked {
            info!("Parked after {} ticks", ticks);
            return Ok(DriveReport {
                ticks,
                elapsed: context.now().saturating_sub(started),
                parked: true,
                closed: false,
            });
        }
    }
}

fn apply<C: PilotContext>(world: &mut ParkingWorld<C>, inputs: SessionControl) {
    debug!("Applying session inputs {:?}", inputs);
    world.set_scenario(inputs.scenario);
    if inputs.active && !world.is_active() {
        world.start();
    } else if !inputs.active && world.is_active() {
        world.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SimContext;
    use crate::world::SimConfig;
    use parkpilot_core::Phase;
    
    fn sim_world(scenario: Scenario, max_duration_secs: f64) -> ParkingWorld<SimContext> {
        ParkingWorld::simulated(SimConfig { scenario, max_duration_secs, ..SimConfig::default() })
    }
    
    #[tokio::test]
    async fn test_drive_parks_on_virtual_clock() {
        let mut world = sim_world(Scenario::Perpendicular, 60.0);
        let (_tx, rx) = watch::channel(SessionControl::running(Scenario::Perpendicular));
        let (frame_tx, mut frame_rx) = mpsc::channel(10_000);
        
        let report = drive(&mut world, rx, Some(frame_tx)).await.unwrap();
        
        assert!(report.parked);
        assert!(!report.closed);
        assert_eq!(report.elapsed, world.config.tick * report.ticks as u32);
        
        let mut received = Vec::new();
        while let Ok(frame) = frame_rx.try_recv() {
            received.push(frame);
        }
        assert_eq!(received.len() as u64, report.ticks);
        
        let last = received.last().unwrap();
        assert_eq!(last.phase, Phase::Completed);
        assert_eq!(last.animator.cursor, 3);
        assert!(received.iter().all(|f| !f.animator.is_reversing));
    }
    
    #[tokio::test]
    async fn test_drive_times_out_when_idle() {
        let mut world = sim_world(Scenario::Parallel, 1.0);
        let (_tx, rx) = watch::channel(SessionControl::stopped(Scenario::Parallel));
        
        let result = drive(&mut world, rx, None).await;
        
        assert!(matches!(result, Err(EnvError::Timeout(1000))));
    }
    
    #[tokio::test]
    async fn test_drive_zero_duration_runs_until_parked() {
        let mut world = sim_world(Scenario::Angled, 0.0);
        let (_tx, rx) = watch::channel(SessionControl::running(Scenario::Angled));
        
        let report = drive(&mut world, rx, None).await.unwrap();
        
        assert!(report.parked);
        assert!(report.ticks > 0);
    }
    
    #[tokio::test]
    async fn test_drive_ends_when_sender_dropped() {
        let mut world = sim_world(Scenario::Parallel, 0.0);
        let (tx, rx) = watch::channel(SessionControl::running(Scenario::Parallel));
        drop(tx);
        
        let report = drive(&mut world, rx, None).await.unwrap();
        
        assert!(report.closed);
        assert_eq!(report.ticks, 0);
    }
    
    #[tokio::test]
    async fn test_drive_frame_receiver_dropped() {
        let mut world = sim_world(Scenario::Parallel, 0.0);
        let (_tx, rx) = watch::channel(SessionControl::running(Scenario::Parallel));
        let (frame_tx, frame_rx) = mpsc::channel(1);
        drop(frame_rx);
        
        let result = drive(&mut world, rx, Some(frame_tx)).await;
        
        assert!(matches!(result, Err(EnvError::ContextError(_))));
    }
    
    #[tokio::test]
    async fn test_drive_realtime_deactivation() {
        let config = SimConfig {
            tick: Duration::from_millis(10),
            phase_duration: Duration::from_millis(30),
            max_duration_secs: 5.0,
            ..SimConfig::default()
        };
        let mut world = ParkingWorld::realtime(config);
        let (tx, rx) = watch::channel(SessionControl::running(Scenario::Parallel));
        let (frame_tx, mut frame_rx) = mpsc::channel(10_000);
        
        let controller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            let _ = tx.send(SessionControl::stopped(Scenario::Parallel));
            tokio::time::sleep(Duration::from_millis(100)).await;
            drop(tx);
        });
        
        let report = drive(&mut world, rx, Some(frame_tx)).await.unwrap();
        controller.await.unwrap();
        
        assert!(report.closed);
        assert!(!report.parked);
        
        let mut last = None;
        while let Ok(frame) = frame_rx.try_recv() {
            last = Some(frame);
        }
        let last = last.unwrap();
        assert!(!last.active);
        assert!(last.animator.state.is_origin());
    }
}
