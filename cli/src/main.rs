//! `ale-agent` — the decision-agent shell's command-line entry point.
//!
//! Wires a settings file to a concrete agent (random / single-action /
//! Sarsa / UCT search / Dyna-2) and runs the start → step* → end → reset
//! episode loop, printing and/or exporting one score line per episode.
//!
//! No real ALE FFI binding is vendored here; this binary's bundled
//! backend is `ale_engine`'s deterministic `ToySimulator`, substituted
//! in behind the `Simulator` trait exactly where a real emulator
//! binding would plug in.

mod agent;
mod config;
mod driver;
mod export;
mod shell;

use std::process::ExitCode;

use ale_engine::settings::Settings;
use ale_engine::test_support::ToySimulator;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser, Debug)]
#[command(author, version, about = "ALE RL agent harness", long_about = None)]
struct Cli {
    /// Path to the `key=value` settings file.
    config_file: String,

    /// Seed for the single explicit RNG stream threaded through the
    /// agent, Sarsa/Dyna-2, and UCT search.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> ale_engine::error::Result<()> {
    log::info!("loading settings from {}", cli.config_file);
    let settings = Settings::load(&cli.config_file)?;

    let rom_files = config::rom_files(&settings)?;
    log::info!(
        "{} game slot(s) configured (ROM loading is out of scope; using the bundled toy simulator): {:?}",
        rom_files.len(),
        rom_files
    );

    let games: Vec<ToySimulator> = (0..rom_files.len()).map(|_| ToySimulator::new()).collect();
    let mut shell = config::build_shell(games, &settings)?;
    if shell.export_frame_images() {
        log::warn!("export_frame_images is set but PNG frame export is not implemented; ignoring");
    }

    let num_actions = shell.sim().legal_actions().len();
    let mut agent = config::build_agent::<ToySimulator>(
        &settings,
        num_actions,
        shell.frame_skip(),
        shell.scale_rewards(),
    )?;

    let driver_config = config::driver_config(&settings)?;
    let mut rng = StdRng::seed_from_u64(cli.seed);

    driver::run(&mut shell, &mut agent, &driver_config, &mut rng)
}
