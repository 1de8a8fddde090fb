use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use vortex_common::SlotId;
use vortex_kernel::{Particle, RuleConfig};
use vortex_render::BillboardInstance;
use vortex_scene::{Scene, SceneConfig};
use vortex_tools::{FieldInspector, FieldSummary};

#[derive(Parser)]
#[command(name = "vortex-cli", about = "Run and inspect vortex particle field scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run a scene for a number of fixed-length frames
    Run {
        /// Scene config file (.yaml, .yml or .json); defaults to the demo scene
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of frames to run (overrides the config)
        #[arg(short, long)]
        frames: Option<u64>,
        /// Frame length in milliseconds (overrides the config)
        #[arg(long)]
        frame_ms: Option<f32>,
        /// RNG seed for a reproducible run (overrides the config)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Update rule (overrides the config)
        #[arg(short, long, value_enum)]
        rule: Option<RuleArg>,
        /// Write the final state as JSON to this path
        #[arg(long)]
        dump: Option<PathBuf>,
        /// Print a text rendering of the final frame
        #[arg(long)]
        render: bool,
        /// Maximum particle lines printed by --render
        #[arg(long, default_value = "20")]
        max_lines: usize,
    },
    /// Print the default scene config as YAML, or write it to a file
    Config {
        /// Output path (.yaml, .yml or .json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RuleArg {
    AttractSwirl,
    Drift,
}

impl From<RuleArg> for RuleConfig {
    fn from(arg: RuleArg) -> Self {
        match arg {
            RuleArg::AttractSwirl => RuleConfig::default(),
            RuleArg::Drift => RuleConfig::Drift,
        }
    }
}

#[derive(Serialize)]
struct Dump<'a> {
    summary: FieldSummary,
    particles: Vec<DumpEntry<'a>>,
    billboards: Vec<BillboardInstance>,
}

#[derive(Serialize)]
struct DumpEntry<'a> {
    slot: SlotId,
    #[serde(flatten)]
    particle: &'a Particle,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Info => {
            println!("vortex-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: {}", vortex_kernel::crate_info());
            println!("emit: {}", vortex_emit::crate_info());
            println!("render: {}", vortex_render::crate_info());
            println!("tools: {}", vortex_tools::crate_info());
            println!("scene: {}", vortex_scene::crate_info());
        }
        Commands::Run {
            config,
            frames,
            frame_ms,
            seed,
            rule,
            dump,
            render,
            max_lines,
        } => {
            let mut scene_config = match &config {
                Some(path) => SceneConfig::load(path)
                    .with_context(|| format!("loading scene config {}", path.display()))?,
                None => SceneConfig::default(),
            };
            if let Some(frames) = frames {
                scene_config.run.frames = frames;
            }
            if let Some(frame_ms) = frame_ms {
                scene_config.run.frame_ms = frame_ms;
            }
            if seed.is_some() {
                scene_config.field.seed = seed;
            }
            if let Some(rule) = rule {
                scene_config.field.rule = rule.into();
            }
            run(scene_config, dump, render, max_lines)?;
        }
        Commands::Config { output } => {
            let config = SceneConfig::default();
            match output {
                Some(path) => {
                    config
                        .save(&path)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Wrote default scene config to {}", path.display());
                }
                None => print!("{}", config.to_yaml()?),
            }
        }
    }

    Ok(())
}

fn run(
    config: SceneConfig,
    dump: Option<PathBuf>,
    render: bool,
    max_lines: usize,
) -> anyhow::Result<()> {
    let mut scene = Scene::new(config).context("building scene")?;
    let delta = config.run.frame_duration().context("frame length")?;

    println!(
        "Running {} frames of {:.2} ms (seed={}, rule={})",
        config.run.frames,
        config.run.frame_ms,
        scene.field().seed(),
        scene.field().rule().name()
    );

    let mut emitted = 0usize;
    let mut dropped = 0usize;
    let mut retired = 0usize;
    let mut peak_active = 0usize;
    for _ in 0..config.run.frames {
        let stats = scene.frame(delta);
        emitted += stats.emitted;
        dropped += stats.dropped;
        retired += stats.retired;
        peak_active = peak_active.max(stats.active);
        if stats.frame % 60 == 0 {
            tracing::debug!(
                frame = stats.frame,
                active = stats.active,
                emitted = stats.emitted,
                retired = stats.retired,
                "progress"
            );
        }
    }

    println!("{}", FieldInspector::summary(scene.field()));
    println!(
        "Frames: {} elapsed={:.2?} emitted={} dropped={} retired={} peak_active={}",
        scene.frames(),
        scene.elapsed(),
        emitted,
        dropped,
        retired,
        peak_active
    );
    let timer = scene.timer();
    println!(
        "Frame cost (last {}): avg={:?} min={:?} max={:?}",
        timer.count(),
        timer.average(),
        timer.min(),
        timer.max()
    );

    if render {
        print!("{}", scene.debug_text(max_lines));
    }

    if let Some(path) = dump {
        let field = scene.field();
        let payload = Dump {
            summary: FieldInspector::summary(field),
            particles: field
                .particles()
                .map(|(slot, particle)| DumpEntry { slot, particle })
                .collect(),
            billboards: scene.billboards(),
        };
        let file =
            File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &payload)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Dumped {} particles to {}", payload.particles.len(), path.display());
    }

    Ok(())
}
