use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for vortex")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy, tests and docs in order, stopping at the first failure
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all targets with warnings denied
    Clippy,
    /// Run all tests
    Test,
    /// Run the particle field benchmarks in release mode
    Bench,
    /// Build rustdoc for the workspace
    Doc,
    /// Run the demo scene through the CLI with a fixed seed
    Demo {
        /// Number of frames
        #[arg(short, long, default_value = "300")]
        frames: u64,
    },
}

/// A named cargo invocation.
struct Step {
    label: &'static str,
    args: Vec<String>,
}

impl Step {
    fn new(label: &'static str, args: &[&str]) -> Self {
        Self {
            label,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

fn fmt() -> Step {
    Step::new("cargo fmt --check", &["fmt", "--all", "--", "--check"])
}

fn clippy() -> Step {
    Step::new(
        "cargo clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn test() -> Step {
    Step::new("cargo test", &["test", "--workspace"])
}

fn bench() -> Step {
    Step::new(
        "cargo bench",
        &["bench", "-p", "vortex-kernel", "--bench", "bench_advance"],
    )
}

fn doc() -> Step {
    Step::new("cargo doc", &["doc", "--workspace", "--no-deps"])
}

fn demo(frames: u64) -> Step {
    let frames = frames.to_string();
    Step::new(
        "vortex-cli demo run",
        &[
            "run", "-p", "vortex-cli", "--", "run", "--seed", "42", "--frames", frames.as_str(),
            "--render",
        ],
    )
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let steps = match cli.command {
        Commands::Check => vec![fmt(), clippy(), test(), doc()],
        Commands::Fmt => vec![fmt()],
        Commands::Clippy => vec![clippy()],
        Commands::Test => vec![test()],
        Commands::Bench => vec![bench()],
        Commands::Doc => vec![doc()],
        Commands::Demo { frames } => vec![demo(frames)],
    };

    for step in &steps {
        run_step(step)?;
    }

    Ok(())
}

fn run_step(step: &Step) -> Result<()> {
    println!("==> Running {}", step.label);
    let status = Command::new("cargo").args(&step.args).status()?;
    if !status.success() {
        anyhow::bail!("{} failed", step.label);
    }
    Ok(())
}
