// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An implementation of the xboard (CECP) protocol, driving the internal search.
//! See [the protocol specification](https://www.gnu.org/software/xboard/engine-intf.html)
//! for the full command set.
//!
//! Protocol replies go to the writer handed to [`Engine::execute`]; diagnostic chatter
//! uses `tracing` or protocol comment lines (`# ...`), which conforming GUIs ignore.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::Result;

use crate::core::{Color, Move, MAX_PLY};
use crate::eval::MaterialEvaluator;
use crate::movegen;
use crate::notation;
use crate::search::{self, SearchOptions};
use crate::table::TranspositionTable;
use crate::Position;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// With no time controls configured, think this long per move.
const DEFAULT_MOVE_TIME: Duration = Duration::from_secs(1);

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum EngineSide {
    /// Force mode: the engine only relays moves.
    Idle,
    Playing(Color),
    Analyzing,
}

/// The engine half of an xboard session: one position, one transposition table, and the
/// game's move list (kept so that `undo`/`remove` can replay from the setup position).
pub struct Engine {
    pos: Position,
    tt: TranspositionTable,
    evaluator: MaterialEvaluator,
    setup_fen: String,
    game_moves: Vec<Move>,
    side: EngineSide,
    post: bool,
    max_depth: u32,
    /// Our remaining clock time, in centiseconds, from the `time` command.
    time_left_cs: i64,
    /// Per-move increment in centiseconds, from `level`.
    increment_cs: i64,
    /// Fixed seconds per move, from `st`.
    time_per_move: Option<u64>,
}

impl Engine {
    pub fn new() -> Engine {
        Engine {
            pos: Position::from_start_position(),
            tt: TranspositionTable::default(),
            evaluator: MaterialEvaluator,
            setup_fen: START_FEN.to_string(),
            game_moves: Vec::new(),
            side: EngineSide::Idle,
            post: true,
            max_depth: MAX_PLY as u32,
            time_left_cs: 0,
            increment_cs: 0,
            time_per_move: None,
        }
    }

    /// Reads commands from standard input until `quit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        for maybe_line in stdin.lock().lines() {
            let line = maybe_line?;
            let mut out = stdout.lock();
            if self.execute(&line, &mut out)? {
                break;
            }
            out.flush()?;
        }
        Ok(())
    }

    /// Executes a single protocol command, writing any replies to `out`. Returns true
    /// when the session should end.
    pub fn execute(&mut self, line: &str, out: &mut impl Write) -> Result<bool> {
        let trimmed = line.trim();
        let (command, args) = match trimmed.split_once(' ') {
            Some((command, args)) => (command, args.trim()),
            None => (trimmed, ""),
        };

        tracing::debug!(command, args, "xboard command");

        match command {
            "quit" => return Ok(true),
            "xboard" => {}
            "protover" => self.send_features(out)?,
            "new" => {
                self.setup(START_FEN, out)?;
                self.side = EngineSide::Playing(Color::Black);
                self.max_depth = MAX_PLY as u32;
            }
            "setboard" => {
                self.side = EngineSide::Idle;
                self.setup(args, out)?;
            }
            "usermove" => self.user_move(args, out)?,
            "go" => {
                self.side = EngineSide::Playing(self.pos.side_to_move());
                self.think_and_move(out)?;
            }
            "force" | "result" | "exit" => self.side = EngineSide::Idle,
            "analyze" => self.side = EngineSide::Analyzing,
            "level" => self.set_level(args),
            "time" => self.time_left_cs = args.parse().unwrap_or(self.time_left_cs),
            "otim" => {}
            "sd" => {
                if let Ok(depth) = args.parse::<u32>() {
                    self.max_depth = depth.clamp(1, MAX_PLY as u32);
                }
            }
            "st" => self.time_per_move = args.parse().ok(),
            "memory" => {
                if let Ok(mb) = args.parse::<usize>() {
                    self.tt = TranspositionTable::with_megabytes(mb);
                }
            }
            "ping" => writeln!(out, "pong {}", args)?,
            "undo" => self.take_back(1),
            "remove" => self.take_back(2),
            "post" => self.post = true,
            "nopost" => self.post = false,
            // No pondering: easy/hard are accepted and ignored.
            "easy" | "hard" => {}
            "accepted" | "rejected" | "computer" | "name" | "ics" | "random" | "variant"
            | "book" | "?" | "" => {}
            _ => {
                // Bare coordinate moves arrive from older GUIs that skip `usermove`.
                if notation::parse_coordinate(trimmed, &self.pos).is_some() {
                    self.user_move(trimmed, out)?;
                } else {
                    writeln!(out, "Error (unknown command): {}", command)?;
                }
            }
        }

        Ok(false)
    }

    fn send_features(&self, out: &mut impl Write) -> Result<()> {
        writeln!(out, "feature done=0")?;
        writeln!(
            out,
            "feature myname=\"{} {}\" ping=1 setboard=1 usermove=1 memory=1 sigint=0 sigterm=0",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        )?;
        writeln!(out, "feature done=1")?;
        Ok(())
    }

    fn setup(&mut self, fen: &str, out: &mut impl Write) -> Result<()> {
        match Position::from_fen(fen) {
            Ok(pos) => {
                self.pos = pos;
                self.setup_fen = fen.to_string();
                self.game_moves.clear();
                self.tt.clear();
            }
            Err(err) => {
                tracing::warn!(%err, fen, "rejected position");
                writeln!(out, "tellusererror Illegal position: {}", err)?;
            }
        }
        Ok(())
    }

    fn user_move(&mut self, text: &str, out: &mut impl Write) -> Result<()> {
        let mov = notation::parse_coordinate(text, &self.pos)
            .or_else(|| notation::parse_san(text, &self.pos));
        let mov = match mov {
            Some(mov) => mov,
            None => {
                writeln!(out, "Illegal move: {}", text)?;
                return Ok(());
            }
        };

        self.pos.make(mov);
        self.game_moves.push(mov);

        if let Some(result) = self.game_result() {
            writeln!(out, "{}", result)?;
            self.side = EngineSide::Idle;
            return Ok(());
        }

        if self.side == EngineSide::Playing(self.pos.side_to_move()) {
            self.think_and_move(out)?;
        }
        Ok(())
    }

    /// Allocates a slice of the clock, runs the search, and plays the move it returns.
    fn think_and_move(&mut self, out: &mut impl Write) -> Result<()> {
        let options = SearchOptions {
            depth: self.max_depth,
            time_limit: Some(self.move_time()),
            node_limit: None,
            post: self.post,
            xboard: true,
        };
        let result = search::search(&mut self.pos, &mut self.tt, &self.evaluator, &options);

        if result.best_move.is_null() {
            if let Some(outcome) = self.game_result() {
                writeln!(out, "{}", outcome)?;
            }
            self.side = EngineSide::Idle;
            return Ok(());
        }

        self.pos.make(result.best_move);
        self.game_moves.push(result.best_move);
        writeln!(out, "move {}", result.best_move.as_coord())?;

        if let Some(outcome) = self.game_result() {
            writeln!(out, "{}", outcome)?;
            self.side = EngineSide::Idle;
        }
        Ok(())
    }

    /// The per-move time budget: a fixed `st` setting wins; otherwise spend 1/40th of
    /// the remaining clock plus half the increment, clamped between 100 ms and the
    /// remaining time less a safety margin.
    fn move_time(&self) -> Duration {
        if let Some(seconds) = self.time_per_move {
            return Duration::from_secs(seconds);
        }

        if self.time_left_cs <= 0 {
            return DEFAULT_MOVE_TIME;
        }

        let time_left_ms = self.time_left_cs * 10;
        let mut budget_ms = time_left_ms / 40 + self.increment_cs * 10 / 2;
        if budget_ms >= time_left_ms {
            budget_ms = time_left_ms - 500;
        }
        if budget_ms < 100 {
            budget_ms = 100;
        }
        Duration::from_millis(budget_ms as u64)
    }

    /// Parses `level MPS BASE INC`; only the increment feeds the time heuristic.
    fn set_level(&mut self, args: &str) {
        let mut parts = args.split_whitespace();
        let _mps = parts.next();
        let _base = parts.next();
        if let Some(inc) = parts.next().and_then(|inc| inc.parse::<f64>().ok()) {
            self.increment_cs = (inc * 100.0) as i64;
        }
    }

    /// Replays the game from the setup position minus the last `count` moves. Replaying
    /// is simpler than unwinding and keeps the engine honest about the hash history.
    fn take_back(&mut self, count: usize) {
        let keep = self.game_moves.len().saturating_sub(count);
        let moves: Vec<Move> = self.game_moves[..keep].to_vec();
        if let Ok(pos) = Position::from_fen(&self.setup_fen) {
            self.pos = pos;
            self.game_moves.clear();
            for mov in moves {
                self.pos.make(mov);
                self.game_moves.push(mov);
            }
        }
    }

    /// The game outcome in xboard `result` syntax, if the game is over.
    fn game_result(&self) -> Option<String> {
        let stm = self.pos.side_to_move();
        let mut list = crate::core::MoveList::new();
        movegen::generate_moves(stm, &self.pos, &mut list);
        if list.is_empty() {
            if self.pos.is_check(stm) {
                return Some(match stm {
                    Color::White => "0-1 {Black mates}".to_string(),
                    Color::Black => "1-0 {White mates}".to_string(),
                });
            }
            return Some("1/2-1/2 {Stalemate}".to_string());
        }
        if self.pos.is_draw(false) {
            return Some("1/2-1/2 {Draw}".to_string());
        }
        None
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

/// Runs an xboard session over standard input and output.
pub fn run() -> Result<()> {
    Engine::new().run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec(engine: &mut Engine, line: &str) -> String {
        let mut out = Vec::new();
        engine.execute(line, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn ping_pong() {
        let mut engine = Engine::new();
        assert_eq!(exec(&mut engine, "ping 17"), "pong 17\n");
    }

    #[test]
    fn protover_features() {
        let mut engine = Engine::new();
        let reply = exec(&mut engine, "protover 2");
        assert!(reply.starts_with("feature done=0"));
        assert!(reply.contains("usermove=1"));
        assert!(reply.contains("setboard=1"));
        assert!(reply.trim_end().ends_with("feature done=1"));
    }

    #[test]
    fn illegal_move_is_rejected() {
        let mut engine = Engine::new();
        exec(&mut engine, "force");
        let reply = exec(&mut engine, "usermove e2e5");
        assert!(reply.contains("Illegal move"));
        assert_eq!(engine.pos.as_fen(), START_FEN);
    }

    #[test]
    fn unknown_command_errors() {
        let mut engine = Engine::new();
        let reply = exec(&mut engine, "frobnicate");
        assert!(reply.contains("Error (unknown command): frobnicate"));
    }

    #[test]
    fn force_mode_accepts_moves_silently() {
        let mut engine = Engine::new();
        exec(&mut engine, "force");
        let reply = exec(&mut engine, "usermove e2e4");
        assert_eq!(reply, "");
        assert_eq!(engine.pos.side_to_move(), Color::Black);
    }

    #[test]
    fn engine_replies_with_a_move() {
        let mut engine = Engine::new();
        exec(&mut engine, "new");
        exec(&mut engine, "nopost");
        exec(&mut engine, "sd 3");
        exec(&mut engine, "st 1");
        let reply = exec(&mut engine, "usermove e2e4");
        assert!(reply.starts_with("move "), "got: {}", reply);
        assert_eq!(engine.pos.side_to_move(), Color::White);
    }

    #[test]
    fn undo_and_remove_replay() {
        let mut engine = Engine::new();
        exec(&mut engine, "force");
        exec(&mut engine, "usermove e2e4");
        let after_e4 = engine.pos.as_fen();
        exec(&mut engine, "usermove e7e5");
        exec(&mut engine, "undo");
        assert_eq!(engine.pos.as_fen(), after_e4);

        exec(&mut engine, "usermove e7e5");
        exec(&mut engine, "remove");
        assert_eq!(engine.pos.as_fen(), START_FEN);
    }

    #[test]
    fn setboard_sets_position() {
        let mut engine = Engine::new();
        let fen = "4k3/8/8/8/8/8/8/4K3 w - - 0 1";
        exec(&mut engine, &format!("setboard {}", fen));
        assert_eq!(engine.pos.as_fen(), fen);

        let reply = exec(&mut engine, "setboard not a fen");
        assert!(reply.contains("Illegal position"));
        // The previous position survives a bad setboard.
        assert_eq!(engine.pos.as_fen(), fen);
    }

    #[test]
    fn bare_coordinate_move_accepted() {
        let mut engine = Engine::new();
        exec(&mut engine, "force");
        let reply = exec(&mut engine, "g1f3");
        assert_eq!(reply, "");
        assert_eq!(engine.pos.side_to_move(), Color::Black);
    }

    #[test]
    fn move_time_heuristic() {
        let mut engine = Engine::new();
        // 100 seconds on the clock, no increment: spend 1/40th = 2.5 s.
        engine.time_left_cs = 10_000;
        assert_eq!(engine.move_time(), Duration::from_millis(2500));

        // Increment adds half of itself.
        engine.increment_cs = 200; // 2 seconds
        assert_eq!(engine.move_time(), Duration::from_millis(3500));

        // Nearly out of time: never budget below 100 ms.
        engine.time_left_cs = 4;
        engine.increment_cs = 0;
        assert_eq!(engine.move_time(), Duration::from_millis(100));

        // A fixed per-move setting wins outright.
        engine.time_per_move = Some(3);
        assert_eq!(engine.move_time(), Duration::from_secs(3));
    }

    #[test]
    fn checkmating_move_announces_result() {
        let mut engine = Engine::new();
        exec(&mut engine, "setboard 6k1/5ppp/8/8/8/8/8/3RK3 w - - 0 1");
        exec(&mut engine, "nopost");
        exec(&mut engine, "sd 4");
        exec(&mut engine, "st 1");
        let reply = exec(&mut engine, "go");
        assert!(reply.contains("move d1d8"), "got: {}", reply);
        assert!(reply.contains("1-0"), "got: {}", reply);
    }
}
