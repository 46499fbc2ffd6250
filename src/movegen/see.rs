// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Static exchange evaluation: the net material outcome of a capture sequence on one
//! square, assuming both sides always recapture with their least valuable attacker.
//!
//! The search consumes this only as an ordering and pruning aid (quiescence skips
//! captures that lose material outright); it never contributes to the game-theoretic
//! score.

use crate::{
    core::{attacks, *},
    Position,
};

/// Material values for exchange purposes, indexed by [`PieceKind::exchange_rank`].
const SEE_VALUE: [i32; 7] = [0, 100, 300, 300, 500, 900, 10000];

fn value_of(kind: PieceKind) -> i32 {
    SEE_VALUE[kind.exchange_rank() as usize]
}

/// All pieces of both sides that attack `target` under the given occupancy. The occupancy
/// is a parameter (rather than read from the position) because the exchange simulation
/// peels attackers off the board as they are consumed.
fn attackers_to(pos: &Position, occupied: SquareSet, target: Square) -> SquareSet {
    let kings = pos.pieces_of_kind(Color::White, PieceKind::King)
        | pos.pieces_of_kind(Color::Black, PieceKind::King);
    let knights = pos.knights(Color::White) | pos.knights(Color::Black);
    let rooks_queens = pos.rooks(Color::White)
        | pos.rooks(Color::Black)
        | pos.queens(Color::White)
        | pos.queens(Color::Black);
    let bishops_queens = pos.bishops(Color::White)
        | pos.bishops(Color::Black)
        | pos.queens(Color::White)
        | pos.queens(Color::Black);

    let mut attackers = attacks::king_attacks(target) & kings;
    attackers |= attacks::knight_attacks(target) & knights;
    attackers |= attacks::pawn_attacks(target, Color::Black) & pos.pawns(Color::White);
    attackers |= attacks::pawn_attacks(target, Color::White) & pos.pawns(Color::Black);
    attackers |= attacks::rook_attacks(target, occupied) & rooks_queens;
    attackers |= attacks::bishop_attacks(target, occupied) & bishops_queens;
    attackers
}

/// Sliders that attack `target` through the current occupancy; called after a piece is
/// removed to uncover x-ray attackers standing behind it.
fn xray_attackers(pos: &Position, occupied: SquareSet, target: Square) -> SquareSet {
    let rooks_queens = pos.rooks(Color::White)
        | pos.rooks(Color::Black)
        | pos.queens(Color::White)
        | pos.queens(Color::Black);
    let bishops_queens = pos.bishops(Color::White)
        | pos.bishops(Color::Black)
        | pos.queens(Color::White)
        | pos.queens(Color::Black);

    let mut attackers = attacks::rook_attacks(target, occupied) & rooks_queens;
    attackers |= attacks::bishop_attacks(target, occupied) & bishops_queens;
    attackers & occupied
}

/// The least valuable piece of `side` within `set`, as a single-bit set plus its kind.
fn least_valuable(pos: &Position, set: SquareSet, side: Color) -> Option<(SquareSet, PieceKind)> {
    for kind in [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ] {
        let subset = set & pos.pieces_of_kind(side, kind);
        if let Some(sq) = subset.first() {
            return Some((SquareSet::single(sq), kind));
        }
    }
    None
}

/// Evaluates the exchange started by `mov` on its destination square and returns the net
/// gain in centipawns for the side making the move. Positive means the capture wins
/// material even against best defense.
pub fn see(pos: &Position, mov: Move) -> i32 {
    debug_assert!(!mov.is_null());

    let to = mov.destination();
    let from = mov.source();
    let mut piece = match pos.piece_at(from) {
        Some(piece) => piece.kind,
        None => return 0,
    };

    let pawns = pos.pawns(Color::White) | pos.pawns(Color::Black);
    let may_xray = pawns
        | pos.bishops(Color::White)
        | pos.bishops(Color::Black)
        | pos.rooks(Color::White)
        | pos.rooks(Color::Black)
        | pos.queens(Color::White)
        | pos.queens(Color::Black);

    let mut occupied = pos.occupancy();
    let mut captured_value = pos.piece_at(to).map(|p| value_of(p.kind)).unwrap_or(0);
    if mov.is_en_passant() {
        // The victim pawn shares the attacker's rank and the destination's file; lift it
        // off the board before scanning for attackers through its square.
        let victim_sq = Square::of(from.rank(), to.file());
        captured_value = value_of(PieceKind::Pawn);
        occupied = occupied ^ SquareSet::single(victim_sq);
    }

    let last_rank = SS_RANK_1 | SS_RANK_8;
    let to_bb = SquareSet::single(to);
    let mut from_bb = SquareSet::single(from);
    let mut attadef = attackers_to(pos, occupied, to) | from_bb;
    let mut side = pos.side_to_move();

    let mut gain = [0i32; 32];
    let mut depth = 0;
    gain[0] = captured_value;

    let mut step = 0;
    loop {
        // A pawn arriving on the last rank promotes: the move's own promotion piece on
        // the first step, a queen for every speculative recapture after that.
        if piece == PieceKind::Pawn && !(to_bb & last_rank).is_empty() {
            let promote_to = if step == 0 {
                mov.promotion_piece().map(|p| p.kind).unwrap_or(PieceKind::Queen)
            } else {
                PieceKind::Queen
            };
            gain[depth] += value_of(promote_to) - value_of(PieceKind::Pawn);
            piece = promote_to;
        }
        step += 1;

        depth += 1;
        debug_assert!(depth < gain.len());
        // Speculative store: what this side stands to win if the piece it just moved is
        // itself recaptured.
        gain[depth] = value_of(piece) - gain[depth - 1];
        side = side.toggle();

        if gain[depth].max(-gain[depth - 1]) < 0 {
            break;
        }

        attadef = attadef ^ from_bb;
        occupied = occupied ^ from_bb;
        if !(from_bb & may_xray).is_empty() {
            attadef |= xray_attackers(pos, occupied, to);
        }

        match least_valuable(pos, attadef, side) {
            Some((bb, kind)) => {
                from_bb = bb;
                piece = kind;
            }
            None => break,
        }
    }

    while depth > 1 {
        depth -= 1;
        gain[depth - 1] = -gain[depth].max(-gain[depth - 1]);
    }
    gain[0]
}
