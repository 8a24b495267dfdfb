//! ParkPilot Simulator CLI
//!
//! Runs the scripted parking demo headless and checks that every scenario parks.

use clap::Parser;
use parkpilot_sim::driver::{drive, SessionControl};
use parkpilot_sim::scenarios::ScenarioSelection;
use parkpilot_sim::{ParkingWorld, ScenarioResult, ScenarioRunner, SimConfig, WorldFrame};
use parkpilot_core::{peas_model, sensors, Scenario};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Export every Nth tick (plus phase changes and the final frame)
const EXPORT_INTERVAL: u64 = 5;

/// ParkPilot scripted parking simulator
#[derive(Parser, Debug)]
#[command(name = "parkpilot-sim")]
#[command(about = "Run the scripted autonomous parking demo headless", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,
    
    /// Scenario to run (parallel, perpendicular, angled, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: ScenarioSelection,
    
    /// Tick interval in milliseconds
    #[arg(long, default_value = "60")]
    tick_ms: u64,
    
    /// Time spent in each mission phase in milliseconds
    #[arg(long, default_value = "3000")]
    phase_ms: u64,
    
    /// Maximum simulation duration in seconds (0 = run until parked)
    #[arg(short, long, default_value = "30", value_parser = parse_duration_secs)]
    duration: f64,
    
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
    
    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
    
    /// Export recorded frames to a JSON file
    #[arg(long)]
    export: Option<String>,
    
    /// Pace ticks with the wall clock instead of the virtual one
    #[arg(long)]
    realtime: bool,
}

/// Accepts a finite, non-negative number of seconds.
fn parse_duration_secs(raw: &str) -> Result<f64, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", raw))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("duration must be a finite number >= 0, got '{}'", raw));
    }
    Ok(secs)
}

/// Runs one scenario in wall-clock time through the async driver.
async fn run_realtime(config: SimConfig) -> bool {
    let scenario = config.scenario;
    let mut world = ParkingWorld::realtime(config);
    let (control_tx, control_rx) = watch::channel(SessionControl::running(scenario));
    let (frame_tx, mut frame_rx) = mpsc::channel::<WorldFrame>(64);
    
    let printer = tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            for transition in &frame.transitions {
                let panel = sensors::summarize(&frame.sensors);
                let peas: Vec<&str> = peas_model(transition.to)
                    .iter()
                    .filter(|card| card.active)
                    .map(|card| card.component.title())
                    .collect();
                info!(
                    "  [{:>5.1}s] {} -> {} | {}% | sensors {} active, {} warning | PEAS {:?}",
                    frame.time_sec, transition.from, transition.to, frame.progress_percent,
                    panel.active, panel.warning, peas
                );
            }
            for decision in &frame.decisions {
                info!("  [{:>5.1}s] {} ({}%)", frame.time_sec, decision.action, decision.confidence);
            }
            let state = &frame.animator.state;
            debug!(
                "  t={:.2}s | ({:.1}, {:.1}) {:.1}° | {} | {}",
                frame.time_sec, state.position.x, state.position.y, state.heading, state.gear, frame.animator.action
            );
        }
    });
    
    let outcome = drive(&mut world, control_rx, Some(frame_tx)).await;
    drop(control_tx);
    let _ = printer.await;
    
    match outcome {
        Ok(report) => {
            info!("{} finished after {} ticks ({:.1}s)", scenario, report.ticks, report.elapsed.as_secs_f64());
            report.parked
        }
        Err(e) => {
            error!("{} failed: {}", scenario, e);
            false
        }
    }
}

fn report(result: &ScenarioResult) {
    if result.passed {
        info!("✓ {} (seed={}) PASSED", result.scenario.name(), result.seed);
    } else {
        error!("✗ {} (seed={}) FAILED: {}",
            result.scenario.name(),
            result.seed,
            result.failure_reason.as_deref().unwrap_or("unknown")
        );
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    
    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
    
    if !args.json {
        info!("ParkPilot Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }
    
    let scenarios: Vec<Scenario> = args.scenario.scenarios();
    
    // Determine base seed
    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };
    
    let tick = Duration::from_millis(args.tick_ms);
    let phase_duration = Duration::from_millis(args.phase_ms);
    
    // Handle --realtime mode
    if args.realtime {
        let mut failed = 0;
        for scenario in &scenarios {
            let config = SimConfig {
                seed,
                scenario: *scenario,
                tick,
                phase_duration,
                max_duration_secs: args.duration,
                hold_until_parked: true,
            };
            info!("Running {} in real time", scenario);
            if !run_realtime(config).await {
                failed += 1;
            }
        }
        if failed > 0 {
            std::process::exit(1);
        }
        return;
    }
    
    let runner = ScenarioRunner::new(seed)
        .with_tick(tick)
        .with_phase_duration(phase_duration)
        .with_duration(args.duration);
    
    // Handle --export mode
    if let Some(export_path) = &args.export {
        if !args.scenario.is_single() {
            error!("--export only supports a single scenario, not 'all'");
            std::process::exit(1);
        }
        
        info!("Running with export to: {}", export_path);
        let (result, export) = runner.run_recorded(scenarios[0], EXPORT_INTERVAL);
        report(&result);
        
        match export.write_to_file(export_path) {
            Ok(()) => info!("Exported {} frames to {}", export.frames.len(), export_path),
            Err(e) => {
                error!("Failed to write export: {:?}", e);
                std::process::exit(1);
            }
        }
        
        if !result.passed {
            std::process::exit(1);
        }
        return;
    }
    
    // Run simulations
    let all_results = runner.run_all(&scenarios);
    let failed_count = all_results.iter().filter(|r| !r.passed).count();
    let total = all_results.len();
    
    if args.json {
        // JSON output for CI parsing
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed_count,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "parked": r.parked,
                    "ticks": r.total_ticks,
                    "ticks_to_park": r.metrics.ticks_to_park,
                    "time_secs": r.final_time_secs,
                    "final_error": r.final_position_error,
                    "complexity": r.complexity,
                    "decisions": r.decisions,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to encode summary: {}", e),
        }
    } else {
        for result in &all_results {
            report(result);
        }
        
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        
        if failed_count == 0 {
            info!("✅ All {} scenarios parked!", total);
        } else {
            error!("❌ {}/{} scenarios failed!", failed_count, total);
        }
    }
    
    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_duration_accepts_plain_seconds() {
        assert_eq!(parse_duration_secs("30"), Ok(30.0));
        assert_eq!(parse_duration_secs("0"), Ok(0.0));
        assert_eq!(parse_duration_secs(" 2.5 "), Ok(2.5));
    }
    
    #[test]
    fn test_duration_rejects_non_finite_and_negative() {
        for raw in ["inf", "-inf", "NaN", "-1", "1e400", "soon"] {
            assert!(parse_duration_secs(raw).is_err(), "accepted {raw}");
        }
    }
    
    #[test]
    fn test_cli_rejects_infinite_duration() {
        let parsed = Args::try_parse_from(["parkpilot-sim", "--duration", "inf"]);
        assert!(parsed.is_err());
        
        let args = Args::try_parse_from(["parkpilot-sim", "--duration", "0"]).unwrap();
        assert_eq!(args.duration, 0.0);
    }
}
