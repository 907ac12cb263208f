//! One-shot map dump: generate a map from command-line parameters, print it
//! through the ASCII renderer, and optionally write the wire JSON to a file.

use std::fs;

use anyhow::{Context, Result, bail};
use clap::Parser;
use warren_core::render::{RenderOptions, render};
use warren_core::{GeneratorKind, MapRequest, generate, wire};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Generator kind: room, passage or walk
    #[arg(short, long, default_value = "passage")]
    kind: String,
    /// Map width
    #[arg(long, default_value_t = 30)]
    width: usize,
    /// Map height
    #[arg(long, default_value_t = 30)]
    height: usize,
    /// Minimum room count (passage kind)
    #[arg(long, default_value_t = 4)]
    min_rooms: usize,
    /// Maximum room count (passage kind)
    #[arg(long, default_value_t = 8)]
    max_rooms: usize,
    /// Seed; omit for a fresh one
    #[arg(short, long)]
    seed: Option<u64>,
    /// Colour the rendered map with ANSI codes
    #[arg(long, default_value_t = false)]
    color: bool,
    /// Also write the map JSON to this path
    #[arg(long)]
    json: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let kind = match args.kind.as_str() {
        "room" => GeneratorKind::RoomBased,
        "passage" => GeneratorKind::Passage,
        "walk" => GeneratorKind::RandomWalk,
        other => bail!("unknown generator '{other}' (room, passage, walk)"),
    };

    let request = MapRequest {
        kind,
        width: args.width,
        height: args.height,
        min_rooms: args.min_rooms,
        max_rooms: args.max_rooms,
        seed: args.seed,
    };
    let map = generate(&request).context("map generation failed")?;

    let seed = map.metadata.get("seed").cloned().unwrap_or_default();
    println!("{} (seed {seed})", map.name);
    println!("{}", render(&map, RenderOptions { color: args.color })?);

    if let Some(path) = args.json {
        let payload = wire::to_json(&map).context("map serialisation failed")?;
        fs::write(&path, payload).with_context(|| format!("failed to write {path}"))?;
        println!("wrote {path}");
    }
    Ok(())
}
