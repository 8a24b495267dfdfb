//! Trajectory Demo - Scripted Parking Manoeuvres
//! =============================================
//!
//! Animates each scenario from the origin pose to its parked pose and
//! prints the pose every few ticks, with the sensor cones that would be lit.
//!
//! Run:
//! ```bash
//! cargo run --example trajectory_demo -p parkpilot_core -- perpendicular
//! ```

use parkpilot_core::{AnimatorInputs, ConeKind, Phase, Scenario, TrajectoryAnimator, NOMINAL_TICK};

const PRINT_EVERY: u64 = 10;
const MAX_TICKS: u64 = 2000;

fn main() {
    let scenarios = match std::env::args().nth(1) {
        Some(name) => vec![Scenario::from_name(&name)],
        None => Scenario::all(),
    };
    
    for scenario in scenarios {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║  {:<56}║", format!("{} - {}", scenario, scenario.description()));
        println!("╚══════════════════════════════════════════════════════════╝");
        
        let mut animator = TrajectoryAnimator::new(scenario);
        animator.set_inputs(AnimatorInputs {
            scenario,
            active: true,
            phase: Phase::Executing,
        });
        
        println!("  tick |     x      y   heading  speed  gear     cones   action");
        while !animator.is_completed() && animator.ticks() < MAX_TICKS {
            let frame = animator.tick(NOMINAL_TICK);
            if animator.ticks() % PRINT_EVERY != 0 && !frame.completed {
                continue;
            }
            
            let cones: String = frame
                .cones
                .iter()
                .filter(|c| c.active)
                .map(|c| match c.kind {
                    ConeKind::Front => 'F',
                    ConeKind::Rear => 'R',
                    ConeKind::Left => 'L',
                    ConeKind::Right => 'r',
                })
                .collect();
            
            println!(
                "  {:>4} | {:>6.2} {:>6.2}  {:>7.2}  {:>5.2}  {:<7}  {:<6}  {}",
                animator.ticks(),
                frame.state.position.x,
                frame.state.position.y,
                frame.state.heading,
                frame.state.speed,
                frame.state.gear.name(),
                cones,
                frame.action,
            );
        }
        
        println!(
            "  Parked after {} ticks ({:.1}s), cursor {}\n",
            animator.ticks(),
            animator.ticks() as f64 * NOMINAL_TICK.as_secs_f64(),
            animator.cursor(),
        );
    }
}
