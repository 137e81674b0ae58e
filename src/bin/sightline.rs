use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "sightline", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a page manifest for schema and timing problems.
    Validate(ValidateArgs),
    /// Play a scroll script against a manifest and write the frame trace.
    Trace(TraceArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input page manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct TraceArgs {
    /// Input page manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Scroll script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Output trace JSON path.
    #[arg(long)]
    out: PathBuf,

    /// Pretty-print the trace.
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "sightline=info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Trace(args) => cmd_trace(args),
    }
}

fn read_manifest(path: &Path) -> anyhow::Result<sightline::PageManifest> {
    let f = File::open(path).with_context(|| format!("open page manifest '{}'", path.display()))?;
    let r = BufReader::new(f);
    let manifest: sightline::PageManifest =
        serde_json::from_reader(r).with_context(|| "parse page manifest JSON")?;
    Ok(manifest)
}

fn read_script(path: &Path) -> anyhow::Result<sightline::ScrollScript> {
    let f = File::open(path).with_context(|| format!("open scroll script '{}'", path.display()))?;
    let r = BufReader::new(f);
    let script: sightline::ScrollScript =
        serde_json::from_reader(r).with_context(|| "parse scroll script JSON")?;
    Ok(script)
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let manifest = read_manifest(&args.in_path)?;
    manifest.validate()?;

    eprintln!(
        "ok: {} section(s), {} nav item(s), {} reveal group(s)",
        manifest.sections.len(),
        manifest.nav.len(),
        manifest.reveals.len()
    );
    Ok(())
}

fn cmd_trace(args: TraceArgs) -> anyhow::Result<()> {
    let manifest = read_manifest(&args.in_path)?;
    let script = read_script(&args.script)?;

    let trace = sightline::run_script(manifest, &script)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let f = File::create(&args.out)
        .with_context(|| format!("create trace '{}'", args.out.display()))?;
    let w = BufWriter::new(f);
    if args.pretty {
        serde_json::to_writer_pretty(w, &trace)
    } else {
        serde_json::to_writer(w, &trace)
    }
    .with_context(|| format!("write trace '{}'", args.out.display()))?;

    eprintln!("wrote {} ({} frames)", args.out.display(), trace.frames.len());
    Ok(())
}
