//! Example worker unit CLI.
//!
//! Runs one worker against a mine until the mine is empty or the tick limit
//! is reached. An enemy shows up for a few ticks along the way.
//!
//! # Usage
//!
//! ```bash
//! worker [ore] [max_ticks]
//! ```
//!
//! Set `RUST_LOG`-style directives through `HFSM_LOG` to see transitions:
//!
//! ```bash
//! HFSM_LOG=hfsm_graph=debug,example=info worker 30 400
//! ```

use example::{Unit, Worker, simulate};
use hfsm_core::{TracingConfig, TracingFormat};

fn parse_arg(args: &[String], index: usize, default: u64) -> u64 {
    args.get(index)
        .map(|arg| {
            arg.parse().unwrap_or_else(|e| {
                tracing::error!(%arg, error = %e, "invalid number");
                std::process::exit(1);
            })
        })
        .unwrap_or(default)
}

fn main() {
    let mut telemetry = TracingConfig::new().with_format(TracingFormat::Compact);
    if let Ok(filter) = std::env::var("HFSM_LOG") {
        telemetry = telemetry.with_env_filter(filter);
    }
    telemetry.init();

    let args: Vec<String> = std::env::args().collect();
    let ore = u32::try_from(parse_arg(&args, 1, 30)).unwrap_or(u32::MAX);
    let max_ticks = parse_arg(&args, 2, 400);

    let unit = Unit::new(ore);
    match simulate(&Worker::default(), &unit, max_ticks, 40..48) {
        Ok(ticks) => tracing::info!(
            ticks,
            banked = unit.banked(),
            ore_left = unit.ore_left(),
            "simulation finished"
        ),
        Err(e) => {
            tracing::error!(error = %e, "simulation failed");
            std::process::exit(1);
        }
    }
}
