//! CLI argument parsing with clap derive macros.

use clap::{Parser, Subcommand, ValueEnum};
use seek_core::{SearchRegion, Trajectory};
use std::path::PathBuf;

/// Find things on screen and click them.
#[derive(Debug, Parser)]
#[command(name = "seek", version)]
pub struct Cli {
    /// Config file (YAML, or JSON by extension) [default: <config dir>/seek/config.yaml]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log input actions instead of performing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sweep the pointer around a point until the cursor takes a given shape
    #[command(after_help = "\
Examples:
  seek shape                                  # Capture the signature first
  seek sweep --x 640 --y 400 --shape 65567    # Circular spiral
  seek sweep --x 640 --y 400 --shape 65567 --pattern square")]
    Sweep(SweepArgs),

    /// Look for a pixel color in a region
    #[command(after_help = "\
Examples:
  seek color --region 0,0,800,600 --color FF0000
  seek color --region 0,0,800,600 --color FF0000 --click --reset
  seek color --region 0,0,800,600 --color FF0000 --until-gone --timeout-ms 10000")]
    Color(ColorArgs),

    /// Print the current cursor signature, position and pixel color
    Shape,
}

#[derive(Debug, clap::Args)]
pub struct SweepArgs {
    #[arg(long)]
    pub x: i32,

    #[arg(long)]
    pub y: i32,

    /// Cursor signature to look for (see `seek shape`)
    #[arg(long)]
    pub shape: i64,

    #[arg(long, value_enum, default_value_t = Pattern::Circular)]
    pub pattern: Pattern,
}

#[derive(Debug, clap::Args)]
pub struct ColorArgs {
    /// Search rectangle as x1,y1,x2,y2
    #[arg(long, value_parser = parse_region)]
    pub region: SearchRegion,

    /// Hex color, e.g. FF0000
    #[arg(long)]
    pub color: String,

    /// Maximum summed channel difference [default: derived from similarity]
    #[arg(long)]
    pub tolerance: Option<u32>,

    /// Sample every Nth pixel on both axes
    #[arg(long, default_value_t = 1)]
    pub stride: i32,

    /// Time budget [default: from config]
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Click the color when found
    #[arg(long)]
    pub click: bool,

    /// Click on every appearance until the color is gone
    #[arg(long, conflicts_with = "click")]
    pub until_gone: bool,

    /// Move the pointer away after each click
    #[arg(long)]
    pub reset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Pattern {
    Circular,
    Scatter,
    Elliptical,
    Square,
}

impl Pattern {
    pub fn trajectory(self) -> Trajectory {
        match self {
            Pattern::Circular => Trajectory::circular(),
            Pattern::Scatter => Trajectory::scatter(),
            Pattern::Elliptical => Trajectory::elliptical(),
            Pattern::Square => Trajectory::square(),
        }
    }
}

fn parse_region(s: &str) -> Result<SearchRegion, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid coordinate: {e}"))?;
    match parts[..] {
        [x1, y1, x2, y2] if x1 <= x2 && y1 <= y2 => Ok(SearchRegion::new(x1, y1, x2, y2)),
        [_, _, _, _] => Err("expected x1 <= x2 and y1 <= y2".to_string()),
        _ => Err(format!("expected 4 comma-separated values, got {}", parts.len())),
    }
}
