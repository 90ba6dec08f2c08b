use flagsim::{ScenarioConfig, Scenario};
use flagsim::{run_3d, run_headless};
use flagsim::{bench_step, bench_stability};

use clap::Parser;
use anyhow::Result;

use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "flag.yaml")]
    file_name: String,

    /// Run without a window and log a summary
    #[arg(long)]
    headless: bool,

    /// Frames to run in headless mode
    #[arg(long, default_value_t = 600)]
    steps: usize,

    /// Run the timing benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    ScenarioConfig::from_path(&config_path)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.bench {
        bench_step()?;
        bench_stability()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg)?;

    if args.headless {
        run_headless(scenario, args.steps);
    } else {
        run_3d(scenario);
    }

    Ok(())
}
