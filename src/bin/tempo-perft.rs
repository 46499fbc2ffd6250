// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::time::Instant;

use structopt::StructOpt;
use tempo::{movegen, Position};

#[derive(Debug, StructOpt)]
struct Options {
    /// The depth to count to.
    #[structopt(short, long)]
    depth: u32,

    /// FEN representation of the position to count from.
    #[structopt(name = "FEN")]
    fen: String,

    /// Print per-root-move subtotals, for diffing against another engine.
    #[structopt(long)]
    divide: bool,
}

fn main() -> anyhow::Result<()> {
    let ops = Options::from_args();
    let mut pos = Position::from_fen(&ops.fen)
        .map_err(|err| anyhow::anyhow!("invalid FEN '{}': {}", ops.fen, err))?;

    let start = Instant::now();
    if ops.divide {
        let mut total = 0;
        for (mov, nodes) in movegen::divide(&mut pos, ops.depth) {
            println!("{}: {}", mov.as_coord(), nodes);
            total += nodes;
        }
        println!("total: {}", total);
    } else {
        println!("{}", movegen::perft(&mut pos, ops.depth));
    }

    let elapsed = start.elapsed();
    eprintln!("elapsed: {:.3}s", elapsed.as_secs_f64());
    Ok(())
}
