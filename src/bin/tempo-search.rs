// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::time::Duration;

use serde::Serialize;
use structopt::StructOpt;
use tempo::eval::MaterialEvaluator;
use tempo::search::{self, SearchOptions};
use tempo::table::TranspositionTable;
use tempo::Position;
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

#[derive(Debug, StructOpt)]
struct Options {
    /// FEN representation of the position to analyze.
    #[structopt(name = "FEN")]
    fen: String,

    /// Depth to which to search.
    #[structopt(short, long)]
    depth: u32,

    /// Time budget for the search, in milliseconds.
    #[structopt(short, long)]
    time: Option<u64>,

    /// If present, serializes the output as JSON.
    #[structopt(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report {
    best_move: String,
    best_score: String,
    depth: u32,
    nodes: u64,
    pv: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(LevelFilter::INFO)
        .with_env_filter(EnvFilter::from_env("TEMPO_LOG"))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let ops = Options::from_args();
    let mut pos = Position::from_fen(&ops.fen)
        .map_err(|err| anyhow::anyhow!("invalid FEN '{}': {}", ops.fen, err))?;

    let mut tt = TranspositionTable::default();
    let options = SearchOptions {
        depth: ops.depth,
        time_limit: ops.time.map(Duration::from_millis),
        post: !ops.json,
        ..Default::default()
    };

    let result = search::search(&mut pos, &mut tt, &MaterialEvaluator, &options);
    if ops.json {
        let report = Report {
            best_move: result.best_move.as_coord(),
            best_score: result.best_score.to_string(),
            depth: result.depth,
            nodes: result.nodes,
            pv: result.pv.iter().map(|m| m.as_coord()).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "best move {} (score {}, depth {}, {} nodes)",
            result.best_move.as_coord(),
            result.best_score,
            result.depth,
            result.nodes
        );
    }
    Ok(())
}
