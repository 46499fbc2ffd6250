// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The search: iterative deepening around a principal-variation alpha-beta with
//! quiescence, null-move pruning, late-move reductions, and transposition-table and
//! killer/history move ordering.
//!
//! The searcher owns mutable references to exactly three long-lived objects — the
//! position (driven by make/unmake), the transposition table, and its own ordering
//! tables — and allocates nothing on the hot path. Cancellation is cooperative: a
//! node-count-gated clock check sets a stop flag, and every active frame unwinds through
//! its matching `unmake`, leaving the position bitwise identical to its pre-search state.

use std::time::{Duration, Instant};

use crate::core::*;
use crate::eval::{Evaluator, Value, MATE};
use crate::movegen;
use crate::table::{Bound, History, Killers, PvTable, TranspositionTable};
use crate::Position;

/// Half-width of the aspiration window wrapped around the previous iteration's score.
pub const ASPIRATION_WINDOW: i32 = 50;

/// How often (in nodes) the clock is polled during search.
const TIME_CHECK_INTERVAL: u64 = 2048;

/// Owns the search clock and budgets. The hard limit is polled inside the tree every
/// [`TIME_CHECK_INTERVAL`] nodes; the soft limit decides between iterations whether
/// another, roughly twice-as-expensive, iteration still fits.
pub struct TimeManager {
    started: Instant,
    budget: Option<Duration>,
    node_limit: Option<u64>,
}

impl TimeManager {
    pub fn start(budget: Option<Duration>, node_limit: Option<u64>) -> TimeManager {
        TimeManager {
            started: Instant::now(),
            budget,
            node_limit,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// The hard stop: the budget is spent or the node cap is hit.
    pub fn is_time_over(&self, nodes: u64) -> bool {
        if let Some(limit) = self.node_limit {
            if nodes > limit {
                return true;
            }
        }

        match self.budget {
            Some(budget) => self.elapsed() > budget,
            None => false,
        }
    }

    /// The soft stop, consulted between iterations: starting another iteration is
    /// pointless if the time spent so far suggests it will not finish.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if let Some(limit) = self.node_limit {
            if nodes > limit {
                return true;
            }
        }

        match self.budget {
            Some(budget) => self.elapsed() * 2 > budget,
            None => false,
        }
    }
}

/// Counters accumulated over one call to [`search`].
#[derive(Default, Clone, Copy, Debug)]
pub struct SearchStats {
    pub nodes: u64,
    pub moves_searched: u64,
    pub hash_probes: u64,
    pub hash_hits: u64,
    pub beta_cutoffs: u64,
}

/// Options for a search.
pub struct SearchOptions {
    /// Maximum depth to iterate to.
    pub depth: u32,

    /// Maximum amount of time to dedicate to this search.
    pub time_limit: Option<Duration>,

    /// Maximum number of nodes to visit.
    pub node_limit: Option<u64>,

    /// Emit a line per completed iteration.
    pub post: bool,

    /// Use the xboard thinking-output format (`ply score time nodes pv`) instead of the
    /// human-readable one.
    pub xboard: bool,
}

impl Default for SearchOptions {
    fn default() -> SearchOptions {
        SearchOptions {
            depth: MAX_PLY as u32,
            time_limit: None,
            node_limit: None,
            post: false,
            xboard: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_move: Move,
    pub best_score: Value,
    /// The deepest fully completed iteration.
    pub depth: u32,
    pub nodes: u64,
    pub pv: Vec<Move>,
    pub stats: SearchStats,
}

/// Runs an iterative-deepening search over the position and returns the best move of the
/// deepest completed iteration. The position comes back untouched; the transposition
/// table retains what the search learned.
pub fn search(
    pos: &mut Position,
    tt: &mut TranspositionTable,
    evaluator: &dyn Evaluator,
    options: &SearchOptions,
) -> SearchResult {
    Searcher::new(pos, tt, evaluator, options).run()
}

struct Searcher<'a> {
    pos: &'a mut Position,
    tt: &'a mut TranspositionTable,
    evaluator: &'a dyn Evaluator,
    options: &'a SearchOptions,
    tm: TimeManager,
    killers: Killers,
    history: History,
    pv: PvTable,
    stats: SearchStats,
    follow_pv: bool,
    stopped: bool,
}

impl<'a> Searcher<'a> {
    fn new(
        pos: &'a mut Position,
        tt: &'a mut TranspositionTable,
        evaluator: &'a dyn Evaluator,
        options: &'a SearchOptions,
    ) -> Searcher<'a> {
        Searcher {
            pos,
            tt,
            evaluator,
            options,
            tm: TimeManager::start(options.time_limit, options.node_limit),
            killers: Killers::new(),
            history: History::new(),
            pv: PvTable::new(),
            stats: SearchStats::default(),
            follow_pv: false,
            stopped: false,
        }
    }

    fn run(&mut self) -> SearchResult {
        let max_depth = self.options.depth.clamp(1, MAX_PLY as u32);
        let mut best_move = Move::null();
        let mut best_score = Value::DRAW;
        let mut completed_depth = 0;
        let mut pv_line = Vec::new();

        let mut alpha = Value::MIN;
        let mut beta = Value::MAX;

        for depth in 1..=max_depth {
            self.follow_pv = true;
            let mut value = self.alpha_beta(alpha, beta, depth as i32, 0, true, true);

            // Falling outside the aspiration window invalidates the iteration; re-search
            // with the window fully open.
            if !self.stopped && (value <= alpha || value >= beta) {
                self.follow_pv = true;
                value = self.alpha_beta(Value::MIN, Value::MAX, depth as i32, 0, true, true);
            }

            if self.stopped {
                // Keep the last completed iteration's answer; a partial iteration is only
                // trusted when there is nothing else.
                if best_move.is_null() {
                    best_move = self.pv.best_move();
                    best_score = value;
                }
                break;
            }

            alpha = value - ASPIRATION_WINDOW;
            beta = value + ASPIRATION_WINDOW;

            best_move = self.pv.best_move();
            best_score = value;
            completed_depth = depth;
            pv_line = self.pv.line().to_vec();

            self.post_iteration(depth, value);

            if value.is_mate() {
                break;
            }
            if self.tm.should_stop(self.stats.nodes) {
                break;
            }
        }

        tracing::debug!(
            nodes = self.stats.nodes,
            hash_hit_rate = self.hash_hit_rate(),
            cutoffs = self.stats.beta_cutoffs,
            "search complete"
        );

        SearchResult {
            best_move,
            best_score,
            depth: completed_depth,
            nodes: self.stats.nodes,
            pv: pv_line,
            stats: self.stats,
        }
    }

    fn hash_hit_rate(&self) -> f64 {
        if self.stats.hash_probes == 0 {
            0.0
        } else {
            self.stats.hash_hits as f64 / self.stats.hash_probes as f64
        }
    }

    fn post_iteration(&self, depth: u32, value: Value) {
        if !self.options.post {
            return;
        }

        let elapsed = self.tm.elapsed();
        let centis = elapsed.as_millis() / 10;
        let pv: Vec<String> = self.pv.line().iter().map(|m| m.as_coord()).collect();
        if self.options.xboard {
            println!(
                "{} {} {} {} {}",
                depth,
                value.as_centipawns(),
                centis,
                self.stats.nodes,
                pv.join(" ")
            );
        } else {
            println!(
                "depth={}, score={}, time={:.2}s, nodes={}, pv={}",
                depth,
                value,
                elapsed.as_secs_f64(),
                self.stats.nodes,
                pv.join(" ")
            );
        }
    }

    fn check_clock(&mut self) {
        if self.stats.nodes % TIME_CHECK_INTERVAL == 0 && self.tm.is_time_over(self.stats.nodes) {
            self.stopped = true;
        }
    }

    fn alpha_beta(
        &mut self,
        mut alpha: Value,
        mut beta: Value,
        depth: i32,
        ply: i32,
        is_pv: bool,
        can_null: bool,
    ) -> Value {
        self.pv.reset_length(ply as usize);

        self.check_clock();
        if self.stopped {
            // The return value is discarded all the way up; callers see the stop flag.
            return Value::DRAW;
        }
        self.stats.nodes += 1;

        // Repetitions cut lines short aggressively inside the tree (second occurrence);
        // the root applies the full threefold rule.
        if self.pos.is_draw(ply > 0) {
            return Value::DRAW;
        }

        let hash = self.pos.zobrist_hash();
        self.stats.hash_probes += 1;
        let probe = self.tt.probe(hash, depth, ply, alpha, beta);
        let tt_move = probe.best_move;
        if ply > 0 {
            if let Some(score) = probe.score {
                self.stats.hash_hits += 1;
                return score;
            }
        }

        if depth <= 0 {
            return self.quiesce(alpha, beta, ply);
        }

        // Mate-distance pruning: no line from here can be better than the fastest
        // conceivable mate, so shrink the window accordingly.
        let mate_value = MATE - ply;
        alpha = alpha.max(Value::new(-mate_value));
        beta = beta.min(Value::new(mate_value - 1));
        if alpha >= beta {
            return alpha;
        }

        let us = self.pos.side_to_move();
        let in_check = self.pos.is_check(us);

        // Null-move pruning: if passing still beats beta, an actual move surely would.
        // Disabled in PV nodes, in check, and without non-pawn material (zugzwang).
        if can_null && depth > 2 && !is_pv && !in_check && self.has_non_pawn_material(us) {
            let r = if depth > 6 { 3 } else { 2 };
            self.pos.make_null();
            let value = -self.alpha_beta(-beta, -beta + 1, depth - 1 - r, ply + 1, false, false);
            self.pos.unmake_null();

            if self.stopped {
                return Value::DRAW;
            }
            if value >= beta {
                return beta;
            }
        }

        let mut list = MoveList::new();
        movegen::generate_moves(us, self.pos, &mut list);
        movegen::score_moves(&mut list, self.pos);
        self.score_quiet_moves(&mut list, ply as usize, us);
        self.score_tt_and_pv_move(&mut list, ply as usize, tt_move);

        let n = list.len();
        let mut found_pv = false;
        let mut bound = Bound::Upper;
        let mut best_move = tt_move;

        for i in 0..n {
            list.sort_moves(i);
            let mov = list.at(i);
            let quiet = mov.is_quiet();
            let is_killer = self.killers.is_killer(ply as usize, mov);

            self.pos.make(mov);

            // Late-move reductions: moves sorted far down the list in a calm position are
            // probably bad, so try them a ply shallower and only re-search on a surprise.
            let do_lmr = i >= 3 && depth >= 3 && quiet && !in_check && !is_killer;

            let mut value;
            if found_pv {
                // Principal-variation search: once one move has raised alpha, prove the
                // rest inferior with zero-window probes and re-search only on failure.
                if do_lmr {
                    value = -self.alpha_beta(-alpha - 1, -alpha, depth - 2, ply + 1, false, true);
                } else {
                    value = alpha + 1;
                }
                if value > alpha {
                    value = -self.alpha_beta(-alpha - 1, -alpha, depth - 1, ply + 1, false, true);
                    if value > alpha && value < beta {
                        value = -self.alpha_beta(-beta, -alpha, depth - 1, ply + 1, true, true);
                    }
                }
            } else if do_lmr {
                value = -self.alpha_beta(-alpha - 1, -alpha, depth - 2, ply + 1, false, true);
                if value > alpha {
                    value = -self.alpha_beta(-beta, -alpha, depth - 1, ply + 1, is_pv, true);
                }
            } else {
                value = -self.alpha_beta(-beta, -alpha, depth - 1, ply + 1, is_pv, true);
            }

            self.pos.unmake(mov);
            self.stats.moves_searched += 1;

            if self.stopped {
                return Value::DRAW;
            }

            if value > alpha {
                found_pv = true;
                bound = Bound::Exact;
                best_move = mov;
                alpha = value;
                self.pv.store(ply as usize, mov);

                if value >= beta {
                    self.stats.beta_cutoffs += 1;
                    if quiet {
                        self.killers.store(ply as usize, mov);
                        self.history.bump(us, mov, depth);
                    }
                    self.tt.record(hash, depth, ply, beta, Bound::Lower, best_move);
                    return beta;
                }
            }
        }

        if n == 0 {
            return if in_check {
                Value::mated_in(ply)
            } else {
                Value::DRAW
            };
        }

        self.tt.record(hash, depth, ply, alpha, bound, best_move);
        alpha
    }

    fn quiesce(&mut self, mut alpha: Value, beta: Value, ply: i32) -> Value {
        self.pv.reset_length(ply as usize);

        self.check_clock();
        if self.stopped {
            return Value::DRAW;
        }
        self.stats.nodes += 1;

        if self.pos.is_draw(ply > 0) {
            return Value::DRAW;
        }

        let stand_pat = self.evaluator.side_relative_eval(self.pos);
        if ply >= MAX_PLY as i32 {
            return stand_pat;
        }
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let us = self.pos.side_to_move();
        let mut list = MoveList::new();
        movegen::generate_loud_moves(us, self.pos, &mut list);
        movegen::score_moves(&mut list, self.pos);
        self.pv.score_pv_move(&mut list, ply as usize, &mut self.follow_pv);

        for i in 0..list.len() {
            list.sort_moves(i);
            let mov = list.at(i);

            // A capture that loses material outright is not going to rescue the
            // position; skip it rather than search it.
            if mov.is_capture() && !mov.is_promotion() && movegen::see(self.pos, mov) < 0 {
                continue;
            }

            self.pos.make(mov);
            let value = -self.quiesce(-beta, -alpha, ply + 1);
            self.pos.unmake(mov);
            self.stats.moves_searched += 1;

            if self.stopped {
                return alpha;
            }

            if value > alpha {
                alpha = value;
                self.pv.store(ply as usize, mov);
                if value >= beta {
                    self.stats.beta_cutoffs += 1;
                    return beta;
                }
            }
        }

        alpha
    }

    fn has_non_pawn_material(&self, side: Color) -> bool {
        let pieces = self.pos.knights(side)
            | self.pos.bishops(side)
            | self.pos.rooks(side)
            | self.pos.queens(side);
        !pieces.is_empty()
    }

    /// Overlays killer and history scores onto the quiet moves in the list; captures
    /// keep their MVV/LVA score.
    fn score_quiet_moves(&self, list: &mut MoveList, ply: usize, us: Color) {
        for i in 0..list.len() {
            let mov = list.at(i);
            if !mov.is_quiet() {
                continue;
            }

            if mov == self.killers.primary(ply) {
                list.set_score(i, 90);
            } else if mov == self.killers.secondary(ply) {
                list.set_score(i, 80);
            } else {
                let bonus = self.history.ordering_bonus(us, mov);
                if bonus > 0 {
                    list.set_score(i, bonus);
                }
            }
        }
    }

    /// The hash move gets the top score. When the list has no hash move and the search is
    /// still walking the previous iteration's principal variation, the PV move gets the
    /// next-best score instead.
    fn score_tt_and_pv_move(&mut self, list: &mut MoveList, ply: usize, tt_move: Move) {
        if !tt_move.is_null() {
            for i in 0..list.len() {
                if list.at(i) == tt_move {
                    list.set_score(i, 255);
                    return;
                }
            }
        }

        let mut follow_pv = self.follow_pv;
        self.pv.score_pv_move(list, ply, &mut follow_pv);
        self.follow_pv = follow_pv;
    }
}

//
// Reference algorithms.
//
// Plain minimax and negamax over the full tree, kept as oracles for the fancy search:
// the two must agree exactly with each other, and alpha-beta must never examine more
// moves than negamax does at equal depth.
//

/// Full-width negamax with no pruning. Returns the side-relative score and the number of
/// moves searched.
pub fn negamax(
    pos: &mut Position,
    evaluator: &dyn Evaluator,
    depth: u32,
) -> (Value, u64) {
    let mut moves = 0;
    let value = negamax_inner(pos, evaluator, depth, 0, &mut moves);
    (value, moves)
}

fn negamax_inner(
    pos: &mut Position,
    evaluator: &dyn Evaluator,
    depth: u32,
    ply: i32,
    moves: &mut u64,
) -> Value {
    if depth == 0 {
        return evaluator.side_relative_eval(pos);
    }

    let mut list = MoveList::new();
    movegen::generate_moves(pos.side_to_move(), pos, &mut list);
    if list.is_empty() {
        return if pos.is_check(pos.side_to_move()) {
            Value::mated_in(ply)
        } else {
            Value::DRAW
        };
    }

    let mut best = Value::MIN;
    for i in 0..list.len() {
        let mov = list.at(i);
        pos.make(mov);
        let value = -negamax_inner(pos, evaluator, depth - 1, ply + 1, moves);
        pos.unmake(mov);
        *moves += 1;
        best = best.max(value);
    }
    best
}

/// Full-width minimax with no pruning, scoring from white's point of view. Returns the
/// white-relative score and the number of moves searched.
pub fn minimax(
    pos: &mut Position,
    evaluator: &dyn Evaluator,
    depth: u32,
    maximizing: bool,
) -> (Value, u64) {
    let mut moves = 0;
    let value = minimax_inner(pos, evaluator, depth, 0, maximizing, &mut moves);
    (value, moves)
}

fn minimax_inner(
    pos: &mut Position,
    evaluator: &dyn Evaluator,
    depth: u32,
    ply: i32,
    maximizing: bool,
    moves: &mut u64,
) -> Value {
    if depth == 0 {
        return evaluator.evaluate(pos);
    }

    let mut list = MoveList::new();
    movegen::generate_moves(pos.side_to_move(), pos, &mut list);
    if list.is_empty() {
        if pos.is_check(pos.side_to_move()) {
            return if maximizing {
                Value::mated_in(ply)
            } else {
                Value::mate_in(ply)
            };
        }
        return Value::DRAW;
    }

    let mut best = if maximizing { Value::MIN } else { Value::MAX };
    for i in 0..list.len() {
        let mov = list.at(i);
        pos.make(mov);
        let value = minimax_inner(pos, evaluator, depth - 1, ply + 1, !maximizing, moves);
        pos.unmake(mov);
        *moves += 1;
        best = if maximizing {
            best.max(value)
        } else {
            best.min(value)
        };
    }
    best
}
