// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempo::eval::{Evaluator, MaterialEvaluator};
use tempo::search::{self, SearchOptions};
use tempo::table::TranspositionTable;
use tempo::Position;

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("evaluate-middlegame", |b| {
        let pos = Position::from_fen(
            "r1bq1rk1/ppp2ppp/2np1n2/2b1p3/2B1P3/2NP1N2/PPP2PPP/R1BQ1RK1 w - - 0 7",
        )
        .unwrap();
        b.iter(|| MaterialEvaluator.evaluate(black_box(&pos)));
    });

    c.bench_function("search-middlegame-depth-4", |b| {
        let pos = Position::from_fen(
            "r1bq1rk1/ppp2ppp/2np1n2/2b1p3/2B1P3/2NP1N2/PPP2PPP/R1BQ1RK1 w - - 0 7",
        )
        .unwrap();
        b.iter(|| {
            let mut pos = black_box(&pos).clone();
            let mut tt = TranspositionTable::new(1 << 16);
            let options = SearchOptions {
                depth: 4,
                ..Default::default()
            };
            search::search(&mut pos, &mut tt, &MaterialEvaluator, &options).nodes
        });
    });

    c.bench_function("search-endgame-depth-6", |b| {
        let pos = Position::from_fen("8/pp3ppp/2p1k3/4p3/4P3/2P1K3/PP3PPP/8 w - - 0 1").unwrap();
        b.iter(|| {
            let mut pos = black_box(&pos).clone();
            let mut tt = TranspositionTable::new(1 << 16);
            let options = SearchOptions {
                depth: 6,
                ..Default::default()
            };
            search::search(&mut pos, &mut tt, &MaterialEvaluator, &options).nodes
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
