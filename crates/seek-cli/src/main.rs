mod args;

use anyhow::{Context, Result};
use args::{Cli, ColorArgs, Commands, SweepArgs};
use clap::Parser;
use seek_core::{
    CursorSignature, EngineConfig, FinderChain, InputBackend, PollConfig, Point, Seeker,
};
use seek_platform::{get_pixel_color, EnigoInput, NoopInput, PixelFinder, SystemCursor};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seek=info,seek_core=info,seek_platform=info".into()),
        )
        .try_init();
}

fn build_seeker(config: EngineConfig, dry_run: bool, finders: FinderChain) -> Result<Seeker> {
    let input: Arc<dyn InputBackend> = if dry_run {
        Arc::new(NoopInput::new())
    } else {
        Arc::new(EnigoInput::new().context("failed to initialise input injection")?)
    };
    let seeker = Seeker::new(input, Arc::new(SystemCursor::new()), finders, config)?;
    Ok(seeker)
}

fn run_sweep(config: EngineConfig, dry_run: bool, args: SweepArgs) -> Result<()> {
    let mut seeker = build_seeker(config, dry_run, FinderChain::new())?;
    let outcome = seeker.sweep(
        Point::new(args.x, args.y),
        CursorSignature(args.shape),
        &args.pattern.trajectory(),
    )?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn run_color(config: EngineConfig, dry_run: bool, args: ColorArgs) -> Result<()> {
    let mut finder = PixelFinder::screen().with_stride(args.stride);
    if let Some(tolerance) = args.tolerance {
        finder = finder.with_tolerance(tolerance);
    }
    let timeout = args
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.default_timeout());

    let mut seeker = build_seeker(config, dry_run, FinderChain::new().with(Box::new(finder)))?;
    let target = seeker.color_target(&args.color);
    let poll = match (args.click, args.until_gone) {
        (_, true) => PollConfig::click_until_gone(timeout, args.reset),
        (true, false) => PollConfig::click(timeout, args.reset),
        (false, false) => PollConfig::locate(timeout),
    }
    .with_pacing(seeker.config().pacing);

    let acquisition = seeker.find(args.region, &target, &poll)?;
    println!("{}", serde_json::to_string_pretty(&acquisition)?);
    Ok(())
}

fn run_shape(config: EngineConfig, dry_run: bool) -> Result<()> {
    let seeker = build_seeker(config, dry_run, FinderChain::new())?;
    let (signature, position) = seeker
        .cursor_snapshot()
        .context("failed to read the cursor")?;
    let color = get_pixel_color(position.x, position.y).map(|c| c.to_hex());
    let report = serde_json::json!({
        "shape": signature.0,
        "x": position.x,
        "y": position.y,
        "color": color,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = EngineConfig::load_or_default(cli.config.as_deref());
    info!(command = ?cli.command, dry_run = cli.dry_run, "seek starting");

    match cli.command {
        Commands::Sweep(args) => run_sweep(config, cli.dry_run, args),
        Commands::Color(args) => run_color(config, cli.dry_run, args),
        Commands::Shape => run_shape(config, cli.dry_run),
    }
}
