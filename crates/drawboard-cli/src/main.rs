//! Drawboard CLI
//!
//! Replays a recorded session onto a fresh board and writes the result as PNG.

mod session;

use anyhow::{Context, Result};
use clap::Parser;
use drawboard_core::{Board, BoardConfig};
use std::fs;
use std::path::PathBuf;

/// Headless drawing board.
#[derive(Parser, Debug)]
#[command(name = "drawboard", about = "Replay a drawing session and export it as PNG")]
struct Args {
    /// Canvas width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Session file: a JSON array of actions.
    #[arg(short, long, value_name = "FILE")]
    session: PathBuf,

    /// Output PNG path.
    #[arg(short, long, value_name = "FILE")]
    out: PathBuf,

    /// Board configuration (JSON). Missing fields take their defaults.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Board id. With local storage the board resumes its saved drawing.
    #[arg(long)]
    id: Option<String>,

    /// Font for text actions (TrueType/OpenType).
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            BoardConfig::from_json(&json).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => BoardConfig::default(),
    };

    let json = fs::read_to_string(&args.session)
        .with_context(|| format!("reading session {}", args.session.display()))?;
    let actions = session::parse_session(&json)
        .with_context(|| format!("parsing session {}", args.session.display()))?;

    let mut board = match args.id {
        Some(id) => Board::open(id, args.width, args.height, config),
        None => Board::new(args.width, args.height, config),
    };
    if let Some(path) = &args.font {
        let bytes = fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
        board.load_font(bytes)?;
    }

    let summary = session::replay(&mut board, &actions)?;
    log::info!(
        "Replayed {} actions ({} stroke segments), history at {}/{}",
        summary.actions,
        summary.segments,
        board.history().position(),
        board.history().len()
    );

    let snapshot = board.export_snapshot()?;
    fs::write(&args.out, snapshot.as_bytes())
        .with_context(|| format!("writing {}", args.out.display()))?;
    Ok(())
}
