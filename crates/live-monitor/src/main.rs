//! Live driver fatigue monitor.
//!
//! Reads one `{"timestamp", "ear", "mar"}` JSON object per line from a file
//! or stdin (typically piped from a landmark tracker), classifies each frame
//! and prints alerts as they happen.

mod console;

use alerting::{AlertConfig, AlertManager};
use anyhow::{Context, Result};
use clap::Parser;
use console::{ConsoleSink, JsonSink};
use fatigue::FatigueConfig;
use session::{JsonLinesSource, PresentationSink, Session, Throttled};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines sample file (stdin when absent)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Classifier settings file (TOML, YAML or JSON)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Drop samples arriving faster than this (0 disables)
    #[arg(long, default_value = "30")]
    max_fps: f64,

    /// Print every classifier output as JSON instead of the alert log
    #[arg(long)]
    json: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let config = FatigueConfig::load(args.config.as_deref()).context("loading classifier settings")?;

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let mut source = Throttled::new(JsonLinesSource::new(reader), args.max_fps);

    let stdout = io::stdout().lock();
    let mut sink: Box<dyn PresentationSink> = if args.json {
        Box::new(JsonSink::new(stdout))
    } else {
        Box::new(ConsoleSink::new(stdout, AlertManager::new(AlertConfig::default())?))
    };

    let mut session = Session::new(config)?;
    info!("Monitoring started");
    let summary = session.run(&mut source, sink.as_mut())?;

    eprintln!(
        "Processed {} frames ({} dropped) over {:.1}s: {} blinks, {} yawns, {} fatigue events, {} frames without a face",
        summary.frames,
        source.dropped(),
        summary.elapsed_seconds(),
        summary.blinks,
        summary.yawn_events,
        summary.fatigue_events,
        summary.undetected_frames,
    );
    Ok(())
}
