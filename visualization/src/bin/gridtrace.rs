//! Command line front end: simulate grid worlds and render their traces
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use gridtrace_core::annotation::{OneOrMany, ProgramAnnotation};
use gridtrace_core::model::{ExplicitModel, ExplicitSimulator};
use gridtrace_core::simulation::{RandomSelector, SimulationConfig, SimulationExecutor};
use gridtrace_core::trace::{RecorderConfig, Trace};
use gridtrace_visualization::{Plotter, RenderConfig, VideoFormat, VideoRecorder};

#[derive(Parser, Debug)]
#[command(
    name = "gridtrace",
    about = "Simulate POMDP grid worlds and render their traces as videos",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate random episodes and write one video per kept episode
    Simulate(SimulateArgs),

    /// Render a stored trace into a video file
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Explicit model as JSON
    #[arg(long)]
    model: PathBuf,

    /// Program annotation as JSON
    #[arg(long)]
    annotations: PathBuf,

    /// Render configuration as JSON; missing fields take their defaults
    #[arg(long)]
    render_config: Option<PathBuf>,

    /// Title drawn above every frame
    #[arg(long)]
    title: Option<String>,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// File name prefix of the videos
    #[arg(long, default_value = "trace")]
    prefix: String,

    /// Write GIF instead of MP4
    #[arg(long)]
    gif: bool,

    /// Seed of the simulator and the action selector
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Upper bound on the number of episodes
    #[arg(long, default_value_t = 5)]
    runs: usize,

    /// Stop after this many episodes reached a done state
    #[arg(long, default_value_t = 1)]
    good_runs: usize,

    /// Upper bound on the steps of one episode
    #[arg(long, default_value_t = 200)]
    max_steps: usize,

    /// Only keep episodes that reached a done state
    #[arg(long)]
    only_finishers: bool,

    /// Drop this many steps from the end of every kept trace
    #[arg(long, default_value_t = 0)]
    trim: usize,

    /// Record the states indistinguishable from the visited ones
    #[arg(long)]
    beliefs: bool,

    /// States carrying this label end an episode
    #[arg(long)]
    done_label: Option<String>,

    /// Also store the kept traces as JSON
    #[arg(long)]
    save_traces: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Trace, or list of traces, as JSON
    #[arg(long)]
    trace: PathBuf,

    /// Index of the trace to render when the file holds a list
    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Video file; the suffix selects .gif or .mp4
    #[arg(long)]
    output: PathBuf,
}

struct Sources {
    model: ExplicitModel,
    annotation: ProgramAnnotation,
    config: RenderConfig,
}

fn load_sources(args: &SourceArgs) -> Result<Sources> {
    let model = ExplicitModel::from_path(&args.model)
        .with_context(|| format!("Failed to load model {}", args.model.display()))?;
    let annotation = ProgramAnnotation::from_path(&args.annotations)
        .with_context(|| format!("Failed to load annotation {}", args.annotations.display()))?;
    let config = match &args.render_config {
        Some(path) => load_render_config(path)?,
        None => RenderConfig::default(),
    };
    Ok(Sources {
        model,
        annotation,
        config,
    })
}

fn load_render_config(path: &Path) -> Result<RenderConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read render configuration {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid render configuration {}", path.display()))
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let sources = load_sources(&args.source)?;
    let model = &sources.model;

    let mut plotter = Plotter::new(model, sources.annotation, sources.config)?;
    if let Some(title) = &args.source.title {
        plotter.set_title(title.clone());
    }
    let mut recorder = VideoRecorder::new(
        plotter,
        RecorderConfig {
            only_keep_finishers: args.only_finishers,
            track_beliefs: args.beliefs,
        },
    );

    let mut simulator = ExplicitSimulator::new(model, args.seed);
    if let Some(label) = &args.done_label {
        simulator = simulator.with_done_label(label.clone());
    }
    let mut executor = SimulationExecutor::new(simulator, RandomSelector::new(args.seed));
    if args.beliefs {
        executor = executor.with_beliefs(model);
    }
    let config = SimulationConfig {
        nr_good_runs: args.good_runs,
        total_nr_runs: args.runs,
        max_steps: args.max_steps,
    };
    let finished = executor.simulate(&mut recorder, &config)?;
    info!(
        "Simulated {} episodes, {} reached a done state",
        finished.len(),
        finished.iter().filter(|done| **done).count()
    );

    if args.trim > 0 {
        recorder.trim_from_end(args.trim);
    }

    if let Some(path) = &args.save_traces {
        let json = serde_json::to_string_pretty(recorder.traces())?;
        fs::write(path, json).with_context(|| format!("Failed to write traces to {}", path.display()))?;
        info!("Stored {} traces in {}", recorder.traces().len(), path.display());
    }

    fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create output directory {}", args.out.display()))?;
    let format = if args.gif { VideoFormat::Gif } else { VideoFormat::Mp4 };
    for path in recorder.save(&args.out, &args.prefix, format)? {
        println!("{}", path.display());
    }
    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    let sources = load_sources(&args.source)?;
    let text = fs::read_to_string(&args.trace)
        .with_context(|| format!("Failed to read trace {}", args.trace.display()))?;
    let traces: Vec<Trace> = serde_json::from_str::<OneOrMany<Trace>>(&text)
        .with_context(|| format!("Invalid trace {}", args.trace.display()))?
        .into();
    let Some(trace) = traces.get(args.index) else {
        bail!("Trace index {} out of range, the file holds {} traces", args.index, traces.len());
    };

    let mut plotter = Plotter::new(&sources.model, sources.annotation, sources.config)?;
    if let Some(title) = &args.source.title {
        plotter.set_title(title.clone());
    }
    let frames = plotter.record(&args.output, trace)?;
    println!("{} ({} frames)", args.output.display(), frames);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Simulate(args) => simulate(args),
        Command::Render(args) => render(args),
    }
}
