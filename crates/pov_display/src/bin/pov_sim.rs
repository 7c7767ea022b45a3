//! Headless POV display simulator.
//!
//! Runs the producer and presenter threads against a scripted controller
//! and prints frames to stdout.
//!
//! # Usage
//!
//! ```bash
//! # Marquee for one second, ASCII frames
//! pov_sim --ticks 200
//!
//! # Start in the clock, raw RGB stream to a file
//! pov_sim --scene clock --presenter bytes --ticks 1000 > frames.rgb
//!
//! # Press OPTIONS at tick 100 (next scene), CROSS at 300 held 20 ticks.
//! # Presses from `[[input.script]]` in the config file play as well.
//! pov_sim --press OPTIONS@100 --press CROSS@300+20 --ticks 600
//!
//! # Dump the effective configuration
//! pov_sim --config pov.toml --print-config
//!
//! # Verbose logging
//! RUST_LOG=pov_display=debug pov_sim --ticks 200
//! ```

use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pov_display::{
    AsciiPresenter, ByteStreamPresenter, NullPresenter, Pipeline, PovConfig, PovError, PovResult,
    Presenter, PresenterKind, SceneId, ScriptedInput, ScriptedPress,
};
use tracing::{error, info};

/// POV display simulator
#[derive(Parser, Debug)]
#[command(name = "pov_sim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "POV_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many ticks (runs until killed otherwise)
    #[arg(short = 't', long, value_name = "N")]
    ticks: Option<u64>,

    /// Scene shown first
    #[arg(short = 's', long, value_name = "NAME")]
    scene: Option<SceneId>,

    /// Frame output: ascii, bytes or null
    #[arg(short = 'p', long, value_name = "KIND")]
    presenter: Option<PresenterKind>,

    /// Seed for the space game
    #[arg(long)]
    seed: Option<u64>,

    /// Scripted key press, KEY@TICK or KEY@TICK+HOLD (repeatable)
    #[arg(long = "press", value_name = "KEY@TICK[+HOLD]")]
    presses: Vec<ScriptedPress>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> PovResult<()> {
    let config = effective_config(&args)?;

    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let presses: Vec<ScriptedPress> =
        config.input.script.iter().chain(&args.presses).copied().collect();
    let input = ScriptedInput::from_presses(&presses);
    if !presses.is_empty() {
        info!("Scripted {} presses over {} ticks", presses.len(), input.remaining());
    }

    let presenter: Box<dyn Presenter> = match config.presenter.kind {
        PresenterKind::Ascii => Box::new(AsciiPresenter::new(BufWriter::new(io::stdout()))),
        PresenterKind::Bytes => Box::new(ByteStreamPresenter::new(BufWriter::new(io::stdout()))),
        PresenterKind::Null => Box::new(NullPresenter),
    };

    let handle = Pipeline::spawn(&config, input, presenter)?;
    let report = handle.join()?;

    info!(
        "Ticks: {} ({} overruns, {} resyncs), tick avg {} us / max {} us, max lag {} us",
        report.tick.ticks,
        report.tick.overruns,
        report.tick.resyncs,
        report.tick.avg_tick_us,
        report.tick.max_tick_us,
        report.tick.max_lag_us
    );
    info!(
        "Frames: {} published, {} skipped, {} presented; {} events dropped; {} scene switches",
        report.producer.frames_published,
        report.producer.frames_skipped,
        report.consumer.frames_presented,
        report.producer.events_dropped,
        report.producer.dispatcher.switches
    );

    match report.consumer.error {
        Some(e) => Err(PovError::Presenter(e)),
        None => Ok(()),
    }
}

/// Config file (or defaults) with command-line overrides applied.
fn effective_config(args: &Args) -> PovResult<PovConfig> {
    let mut config = match &args.config {
        Some(path) => PovConfig::load(path)?,
        None => PovConfig::default(),
    };

    if let Some(ticks) = args.ticks {
        config.tick.max_ticks = Some(ticks);
    }
    if let Some(scene) = args.scene {
        config.scenes.default = scene.name().to_owned();
    }
    if let Some(kind) = args.presenter {
        config.presenter.kind = kind;
    }
    if let Some(seed) = args.seed {
        config.scenes.seed = seed;
    }

    config.validate()?;
    Ok(config)
}

/// Logs go to stderr so stdout carries only frames.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("pov_display={level},pov_sim={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_names(true)
        .init();
}
