// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Legal move generation.
//!
//! The generator emits fully legal moves directly, rather than filtering pseudo-legal
//! moves with a make/unmake probe. It classifies the position first — who is giving
//! check, which friendly pieces are pinned — and then restricts every piece's targets
//! accordingly:
//!
//!  * in double check only the king may move;
//!  * in single check every non-king move must capture the checker or block its line;
//!  * pinned pieces may only move along the line between the king and their pinner;
//!  * the king may never step onto a square the opponent attacks, computed with the king
//!    itself removed from the occupancy so it cannot hide behind its own shadow along a
//!    slider's line.
//!
//! En-passant gets one extra screen: making the capture removes two pawns from the board
//! at once, which can uncover a rank attack no pin test sees, so the capture is validated
//! against a simulated occupancy.

mod see;

pub use see::see;

use crate::{
    core::{attacks, *},
    position::{kingside_rook, queenside_rook},
    Position,
};

/// Masks restricting where moves may land, derived from the check situation.
struct Restrictions {
    /// Squares a capture may land on (the checker when in check, everything otherwise).
    capture: SquareSet,
    /// Squares a non-capture may land on (the checker's line when in check by a slider).
    push: SquareSet,
}

/// Generates all legal moves for `side` into `list`.
pub fn generate_moves(side: Color, pos: &Position, list: &mut MoveList) {
    generate(side, pos, list, false);
}

/// Generates the loud subset of legal moves: captures, en-passant captures, and
/// promotions. Quiescence search recurses on these alone.
pub fn generate_loud_moves(side: Color, pos: &Position, list: &mut MoveList) {
    generate(side, pos, list, true);
}

pub fn in_check(pos: &Position, side: Color) -> bool {
    pos.is_check(side)
}

fn generate(side: Color, pos: &Position, list: &mut MoveList, loud: bool) {
    let us = side;
    let them = side.toggle();
    let occ = pos.occupancy();
    let friendly = pos.pieces(us);
    let enemy = pos.pieces(them);

    let king_sq = match pos.king(us) {
        Some(sq) => sq,
        // No king on the board: piece-drill positions in tests. Nothing is pinned and
        // nothing is check, so generate unrestricted moves.
        None => {
            let all = Restrictions {
                capture: SquareSet::all(),
                push: SquareSet::all(),
            };
            generate_pawn_moves(us, pos, list, loud, SquareSet::empty(), None, &all);
            generate_knight_moves(us, pos, list, loud, SquareSet::empty(), &all);
            generate_slider_moves(us, pos, list, loud, SquareSet::empty(), None, &all);
            return;
        }
    };

    let danger = king_danger_squares(pos, us, king_sq);
    let checkers = pos.squares_attacking(them, king_sq)
        & !pos.pieces_of_kind(them, PieceKind::King);
    let pinned = pinned_pieces(pos, us, king_sq);

    // King moves are legal exactly when the destination is not defended; the danger set
    // already accounts for slider lines passing through the king's current square.
    let mut king_targets = attacks::king_attacks(king_sq) & !friendly & !danger;
    if loud {
        king_targets &= enemy;
    }
    add_moves_from_targets(list, pos, king_sq, king_targets);

    // Double check: nothing but a king move can help.
    if checkers.len() >= 2 {
        return;
    }

    let restrictions = if let Some(checker_sq) = checkers.first() {
        let is_slider = matches!(
            pos.piece_at(checker_sq).map(|p| p.kind),
            Some(PieceKind::Bishop) | Some(PieceKind::Rook) | Some(PieceKind::Queen)
        );
        Restrictions {
            capture: checkers,
            push: if is_slider {
                attacks::between(king_sq, checker_sq)
            } else {
                SquareSet::empty()
            },
        }
    } else {
        Restrictions {
            capture: SquareSet::all(),
            push: SquareSet::all(),
        }
    };

    generate_pawn_moves(us, pos, list, loud, pinned, Some(king_sq), &restrictions);
    generate_knight_moves(us, pos, list, loud, pinned, &restrictions);
    generate_slider_moves(us, pos, list, loud, pinned, Some(king_sq), &restrictions);

    if !loud && checkers.is_empty() {
        generate_castles(us, pos, list, danger);
    }
}

/// Squares the enemy attacks, computed with our king removed from the occupancy so that
/// stepping away from a checking slider along its own line still counts as attacked.
fn king_danger_squares(pos: &Position, us: Color, king_sq: Square) -> SquareSet {
    let them = us.toggle();
    let occ = pos.occupancy() ^ SquareSet::single(king_sq);

    let their_pawns = pos.pawns(them);
    let mut danger = match them {
        Color::White => {
            their_pawns.shift(Direction::NorthWest) | their_pawns.shift(Direction::NorthEast)
        }
        Color::Black => {
            their_pawns.shift(Direction::SouthWest) | their_pawns.shift(Direction::SouthEast)
        }
    };

    for knight in pos.knights(them) {
        danger |= attacks::knight_attacks(knight);
    }
    for bishop in pos.bishops(them) | pos.queens(them) {
        danger |= attacks::bishop_attacks(bishop, occ);
    }
    for rook in pos.rooks(them) | pos.queens(them) {
        danger |= attacks::rook_attacks(rook, occ);
    }
    if let Some(their_king) = pos.king(them) {
        danger |= attacks::king_attacks(their_king);
    }
    danger
}

/// Friendly pieces that stand alone between our king and an enemy slider of matching
/// line type.
fn pinned_pieces(pos: &Position, us: Color, king_sq: Square) -> SquareSet {
    let them = us.toggle();
    let occ = pos.occupancy();
    let friendly = pos.pieces(us);
    let mut pinned = SquareSet::empty();

    let orthogonal = pos.rooks(them) | pos.queens(them);
    for sniper in orthogonal {
        if sniper.rank() != king_sq.rank() && sniper.file() != king_sq.file() {
            continue;
        }
        let blockers = attacks::between(king_sq, sniper) & occ;
        if blockers.len() == 1 {
            pinned |= blockers & friendly;
        }
    }

    let diagonal = pos.bishops(them) | pos.queens(them);
    for sniper in diagonal {
        if sniper.rank() == king_sq.rank() || sniper.file() == king_sq.file() {
            continue;
        }
        if attacks::line_through(king_sq, sniper).is_empty() {
            continue;
        }
        let blockers = attacks::between(king_sq, sniper) & occ;
        if blockers.len() == 1 {
            pinned |= blockers & friendly;
        }
    }

    pinned
}

fn add_moves_from_targets(list: &mut MoveList, pos: &Position, from: Square, targets: SquareSet) {
    for to in targets {
        match pos.piece_at(to) {
            Some(victim) => list.push(Move::capture(from, to, victim)),
            None => list.push(Move::quiet(from, to)),
        }
    }
}

fn push_promotions(list: &mut MoveList, from: Square, to: Square, us: Color, victim: Option<Piece>) {
    for kind in [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ] {
        let promoted = Piece::new(us, kind);
        match victim {
            Some(victim) => list.push(Move::promotion_capture(from, to, promoted, victim)),
            None => list.push(Move::promotion(from, to, promoted)),
        }
    }
}

fn generate_knight_moves(
    us: Color,
    pos: &Position,
    list: &mut MoveList,
    loud: bool,
    pinned: SquareSet,
    restrictions: &Restrictions,
) {
    let friendly = pos.pieces(us);
    let enemy = pos.pieces(us.toggle());
    let allowed = restrictions.capture | restrictions.push;

    // A pinned knight can never stay on its pin line.
    for from in pos.knights(us) & !pinned {
        let mut targets = attacks::knight_attacks(from) & !friendly & allowed;
        if loud {
            targets &= enemy;
        }
        add_moves_from_targets(list, pos, from, targets);
    }
}

fn generate_slider_moves(
    us: Color,
    pos: &Position,
    list: &mut MoveList,
    loud: bool,
    pinned: SquareSet,
    king_sq: Option<Square>,
    restrictions: &Restrictions,
) {
    let friendly = pos.pieces(us);
    let enemy = pos.pieces(us.toggle());
    let occ = pos.occupancy();
    let allowed = restrictions.capture | restrictions.push;

    let sliders = [
        (pos.bishops(us), PieceKind::Bishop),
        (pos.rooks(us), PieceKind::Rook),
        (pos.queens(us), PieceKind::Queen),
    ];
    for (set, kind) in sliders {
        for from in set {
            let mut targets = match kind {
                PieceKind::Bishop => attacks::bishop_attacks(from, occ),
                PieceKind::Rook => attacks::rook_attacks(from, occ),
                _ => attacks::queen_attacks(from, occ),
            };
            targets &= !friendly & allowed;
            if pinned.contains(from) {
                if let Some(king_sq) = king_sq {
                    targets &= attacks::line_through(king_sq, from);
                }
            }
            if loud {
                targets &= enemy;
            }
            add_moves_from_targets(list, pos, from, targets);
        }
    }
}

fn generate_pawn_moves(
    us: Color,
    pos: &Position,
    list: &mut MoveList,
    loud: bool,
    pinned: SquareSet,
    king_sq: Option<Square>,
    restrictions: &Restrictions,
) {
    let them = us.toggle();
    let occ = pos.occupancy();
    let empty = !occ;
    let enemy = pos.pieces(them);
    let pawns = pos.pawns(us);
    let movable = pawns & !pinned;

    let (up, down, promo_rank, double_rank, capture_dirs) = match us {
        Color::White => (
            Direction::North,
            Direction::South,
            SS_RANK_8,
            SS_RANK_3,
            [Direction::NorthWest, Direction::NorthEast],
        ),
        Color::Black => (
            Direction::South,
            Direction::North,
            SS_RANK_1,
            SS_RANK_6,
            [Direction::SouthWest, Direction::SouthEast],
        ),
    };

    // Pushes for unpinned pawns: shift the whole set at once. Double pushes reuse the
    // single-push set before the check-evasion mask narrows it, so the transit square is
    // known empty.
    let pushes = movable.shift(up) & empty;
    if !loud {
        for to in pushes & restrictions.push & !promo_rank {
            list.push(Move::quiet(to.towards(down), to));
        }
        let doubles = (pushes & double_rank).shift(up) & empty & restrictions.push;
        for to in doubles {
            list.push(Move::double_pawn_push(to.towards(down).towards(down), to));
        }
    }
    for to in pushes & restrictions.push & promo_rank {
        push_promotions(list, to.towards(down), to, us, None);
    }

    // Captures for unpinned pawns.
    for dir in capture_dirs {
        let targets = movable.shift(dir) & enemy & restrictions.capture;
        for to in targets & !promo_rank {
            let victim = pos.piece_at(to);
            debug_assert!(victim.is_some());
            if let Some(victim) = victim {
                list.push(Move::capture(to.towards(dir.reverse()), to, victim));
            }
        }
        for to in targets & promo_rank {
            push_promotions(list, to.towards(dir.reverse()), to, us, pos.piece_at(to));
        }
    }

    // Pinned pawns go one at a time: their moves must stay on the king-pinner line.
    if let Some(king_sq) = king_sq {
        for from in pawns & pinned {
            let line = attacks::line_through(king_sq, from);

            let one = from.towards(up);
            if empty.contains(one) && line.contains(one) {
                if !loud && restrictions.push.contains(one) && !promo_rank.contains(one) {
                    list.push(Move::quiet(from, one));
                }
                if restrictions.push.contains(one) && promo_rank.contains(one) {
                    push_promotions(list, from, one, us, None);
                }
                if !loud && double_rank.contains(one) {
                    let two = one.towards(up);
                    if empty.contains(two) && line.contains(two) && restrictions.push.contains(two)
                    {
                        list.push(Move::double_pawn_push(from, two));
                    }
                }
            }

            for to in attacks::pawn_attacks(from, us) & enemy & restrictions.capture & line {
                if promo_rank.contains(to) {
                    push_promotions(list, from, to, us, pos.piece_at(to));
                } else if let Some(victim) = pos.piece_at(to) {
                    list.push(Move::capture(from, to, victim));
                }
            }
        }
    }

    // En-passant. The capturing pawn stands on rank 5 (white) or rank 4 (black) and lands
    // on the en-passant target square; the victim sits on the capture file at the
    // attacker's rank.
    if let Some(ep) = pos.en_passant_square() {
        let victim = Piece::new(them, PieceKind::Pawn);
        for from in attacks::pawn_attacks(ep, them) & pawns {
            let victim_sq = Square::of(from.rank(), ep.file());

            // In check, the capture must either take the checking pawn or land on the
            // blocking line.
            let resolves_check = restrictions.capture.contains(victim_sq)
                || restrictions.push.contains(ep);
            if !resolves_check {
                continue;
            }

            if let Some(king_sq) = king_sq {
                if pinned.contains(from) && !attacks::line_through(king_sq, from).contains(ep) {
                    continue;
                }
                if ep_discovers_check(pos, us, king_sq, from, ep, victim_sq) {
                    continue;
                }
            }

            list.push(Move::en_passant(from, ep, victim));
        }
    }
}

/// Tests whether an en-passant capture exposes our king. Both pawns leave the board in a
/// single move, so a rook lurking on the shared rank (or a newly uncovered diagonal) can
/// deliver a check that the pin scan cannot see.
fn ep_discovers_check(
    pos: &Position,
    us: Color,
    king_sq: Square,
    from: Square,
    to: Square,
    victim_sq: Square,
) -> bool {
    let them = us.toggle();
    let occ = (pos.occupancy()
        ^ SquareSet::single(from)
        ^ SquareSet::single(victim_sq))
        | SquareSet::single(to);

    let orthogonal = pos.rooks(them) | pos.queens(them);
    if !(attacks::rook_attacks(king_sq, occ) & orthogonal).is_empty() {
        return true;
    }
    let diagonal = pos.bishops(them) | pos.queens(them);
    !(attacks::bishop_attacks(king_sq, occ) & diagonal).is_empty()
}

fn generate_castles(us: Color, pos: &Position, list: &mut MoveList, danger: SquareSet) {
    let occ = pos.occupancy();
    let rook = Piece::new(us, PieceKind::Rook);

    if pos.can_castle_kingside(us) && pos.piece_at(kingside_rook(us)) == Some(rook) {
        let (f, g) = match us {
            Color::White => (F1, G1),
            Color::Black => (F8, G8),
        };
        if !occ.contains(f) && !occ.contains(g) && !danger.contains(f) && !danger.contains(g) {
            list.push(Move::kingside_castle(us));
        }
    }

    if pos.can_castle_queenside(us) && pos.piece_at(queenside_rook(us)) == Some(rook) {
        let (b, c, d) = match us {
            Color::White => (B1, C1, D1),
            Color::Black => (B8, C8, D8),
        };
        // The b-square only needs to be empty; the king never crosses it, so it may be
        // attacked.
        if !occ.contains(b)
            && !occ.contains(c)
            && !occ.contains(d)
            && !danger.contains(c)
            && !danger.contains(d)
        {
            list.push(Move::queenside_castle(us));
        }
    }
}

/// Writes the MVV/LVA score into each move's score byte: most valuable victim first, ties
/// broken towards the least valuable attacker, so pawn-takes-queen outranks
/// queen-takes-pawn. Quiet moves get the baseline score; the search overlays TT, PV,
/// killer, and history scores on top.
pub fn score_moves(list: &mut MoveList, pos: &Position) {
    const DEFAULT_QUIET: u8 = 5;

    for i in 0..list.len() {
        let mov = list.at(i);
        let score = match mov.captured_piece() {
            Some(victim) => {
                let attacker = pos
                    .piece_at(mov.source())
                    .map(|p| p.kind.exchange_rank())
                    .unwrap_or(1);
                10 * victim.kind.exchange_rank() + (6 - attacker)
            }
            None => DEFAULT_QUIET,
        };
        list.set_score(i, score);
    }
}

/// Counts the leaf nodes of the legal move tree to the given depth; the correctness
/// oracle for the move generator, checked against published totals.
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut list = MoveList::new();
    generate_moves(pos.side_to_move(), pos, &mut list);
    if depth == 1 {
        return list.len() as u64;
    }

    let mut nodes = 0;
    for i in 0..list.len() {
        let mov = list.at(i);
        pos.make(mov);
        nodes += perft(pos, depth - 1);
        pos.unmake(mov);
    }
    nodes
}

/// Perft split by root move, for diffing against a known-good engine when a total is off.
pub fn divide(pos: &mut Position, depth: u32) -> Vec<(Move, u64)> {
    let mut list = MoveList::new();
    generate_moves(pos.side_to_move(), pos, &mut list);

    let mut results = Vec::with_capacity(list.len());
    for i in 0..list.len() {
        let mov = list.at(i);
        pos.make(mov);
        let nodes = if depth <= 1 { 1 } else { perft(pos, depth - 1) };
        pos.unmake(mov);
        results.push((mov, nodes));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

    fn perft_fen(fen: &str, depth: u32) -> u64 {
        let mut pos = Position::from_fen(fen).unwrap();
        perft(&mut pos, depth)
    }

    fn moves_for(fen: &str) -> MoveList {
        let pos = Position::from_fen(fen).unwrap();
        let mut list = MoveList::new();
        generate_moves(pos.side_to_move(), &pos, &mut list);
        list
    }

    #[test]
    fn initial_position_counts() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert_eq!(perft_fen(fen, 1), 20);
        assert_eq!(perft_fen(fen, 2), 400);
        assert_eq!(perft_fen(fen, 3), 8902);
        assert_eq!(perft_fen(fen, 4), 197_281);
    }

    #[test]
    #[ignore = "slow; run with --ignored for full validation"]
    fn initial_position_deep() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert_eq!(perft_fen(fen, 5), 4_865_609);
        assert_eq!(perft_fen(fen, 6), 119_060_324);
    }

    #[test]
    fn kiwipete_counts() {
        assert_eq!(perft_fen(KIWIPETE, 1), 48);
        assert_eq!(perft_fen(KIWIPETE, 2), 2039);
        assert_eq!(perft_fen(KIWIPETE, 3), 97_862);
    }

    #[test]
    #[ignore = "slow; run with --ignored for full validation"]
    fn kiwipete_deep() {
        assert_eq!(perft_fen(KIWIPETE, 4), 4_085_603);
    }

    #[test]
    fn position_3_counts() {
        assert_eq!(perft_fen(POSITION_3, 1), 14);
        assert_eq!(perft_fen(POSITION_3, 2), 191);
        assert_eq!(perft_fen(POSITION_3, 3), 2812);
        assert_eq!(perft_fen(POSITION_3, 4), 43_238);
        assert_eq!(perft_fen(POSITION_3, 5), 674_624);
    }

    #[test]
    fn position_4_counts() {
        assert_eq!(perft_fen(POSITION_4, 1), 6);
        assert_eq!(perft_fen(POSITION_4, 2), 264);
        assert_eq!(perft_fen(POSITION_4, 3), 9467);
        assert_eq!(perft_fen(POSITION_4, 4), 422_333);
    }

    #[test]
    fn position_5_counts() {
        assert_eq!(perft_fen(POSITION_5, 1), 44);
        assert_eq!(perft_fen(POSITION_5, 2), 1486);
        assert_eq!(perft_fen(POSITION_5, 3), 62_379);
    }

    #[test]
    fn double_check_only_king_moves() {
        // Knight on f6 and rook on e1 both check the king on e8.
        let list = moves_for("4k3/8/5N2/8/8/8/8/4R1K1 b - - 0 1");
        for mov in list.iter() {
            assert_eq!(mov.source(), E8, "unexpected move {} in double check", mov);
        }
    }

    #[test]
    fn check_must_be_addressed() {
        // Rook checks along the e-file; legal replies capture it, block it, or step away.
        let list = moves_for("4k3/8/8/8/4r3/8/3P4/4K3 w - - 0 1");
        assert!(!list.contains(Move::quiet(D2, D3)));
        assert!(list.contains(Move::quiet(E1, D1)));
        assert!(!list.contains(Move::quiet(E1, E2)));
    }

    #[test]
    fn pinned_piece_stays_on_line() {
        // The bishop on d2 is pinned by the rook on e8... actually on the e-file:
        // king e1, bishop e3, rook e8. The bishop may not leave the file.
        let list = moves_for("4r3/8/8/8/8/4B3/8/4K3 w - - 0 1");
        for mov in list.iter() {
            if mov.source() == E3 {
                panic!("pinned bishop moved: {}", mov);
            }
        }
    }

    #[test]
    fn pinned_rook_slides_along_pin() {
        // King e1, rook e3, enemy rook e8: the pinned rook may slide on the e-file,
        // including capturing the pinner, but never sideways.
        let list = moves_for("4r3/8/8/8/8/4R3/8/4K3 w - - 0 1");
        assert!(list.contains(Move::quiet(E3, E2)));
        assert!(list.contains(Move::quiet(E3, E7)));
        assert!(list.contains(Move::capture(
            E3,
            E8,
            Piece::new(Color::Black, PieceKind::Rook)
        )));
        assert!(!list.contains(Move::quiet(E3, D3)));
        assert!(!list.contains(Move::quiet(E3, A3)));
    }

    #[test]
    fn king_cannot_retreat_along_checking_ray() {
        // Rook checks from e8; e1 -> d1/f1 is fine but the king cannot stay on the file,
        // and cannot step backwards off the board edge, so only the sideways squares and
        // diagonal escapes remain.
        let list = moves_for("4r3/8/8/8/8/8/8/4K3 w - - 0 1");
        assert!(!list.contains(Move::quiet(E1, E2)));
        assert!(list.contains(Move::quiet(E1, D1)));
        assert!(list.contains(Move::quiet(E1, D2)));
        assert!(list.contains(Move::quiet(E1, F2)));
    }

    #[test]
    fn en_passant_pinned_horizontally() {
        // The infamous EP trap: pawn e5 may not capture d6 en passant because both pawns
        // leave the fifth rank at once, exposing the king on a5 to the rook on h5.
        let pos = Position::from_fen("8/8/8/K2pP2r/8/8/8/4k3 w - d6 0 1").unwrap();
        let mut list = MoveList::new();
        generate_moves(Color::White, &pos, &mut list);
        let ep = Move::en_passant(E5, D6, Piece::new(Color::Black, PieceKind::Pawn));
        assert!(!list.contains(ep), "horizontally exposed EP must be illegal");

        // Without the rook, the same capture is fine.
        let pos = Position::from_fen("8/8/8/K2pP3/8/8/8/4k3 w - d6 0 1").unwrap();
        let mut list = MoveList::new();
        generate_moves(Color::White, &pos, &mut list);
        assert!(list.contains(ep));
    }

    #[test]
    fn en_passant_resolves_pawn_check() {
        // The double-pushed pawn on d5 checks the king on e4; capturing it en passant is
        // a legal check evasion.
        let pos = Position::from_fen("8/8/8/3pP3/4K3/8/8/7k w - d6 0 1").unwrap();
        let mut list = MoveList::new();
        generate_moves(Color::White, &pos, &mut list);
        assert!(list.contains(Move::en_passant(
            E5,
            D6,
            Piece::new(Color::Black, PieceKind::Pawn)
        )));
    }

    #[test]
    fn castle_through_attack_forbidden() {
        // Black rook on f8 attacks f1: white may not castle kingside, but queenside
        // remains available.
        let list = moves_for("5r2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!list.contains(Move::kingside_castle(Color::White)));
        assert!(list.contains(Move::queenside_castle(Color::White)));
    }

    #[test]
    fn castle_queenside_b_square_may_be_attacked() {
        // A rook eyeing b1 does not prevent queenside castling; the king never crosses b1.
        let list = moves_for("1r6/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(list.contains(Move::queenside_castle(Color::White)));
    }

    #[test]
    fn castle_blocked_by_piece() {
        let list = moves_for("8/8/8/8/8/8/8/R2QK2R w KQ - 0 1");
        assert!(list.contains(Move::kingside_castle(Color::White)));
        assert!(!list.contains(Move::queenside_castle(Color::White)));
    }

    #[test]
    fn promotions_emitted_four_ways() {
        let list = moves_for("8/4P3/8/8/8/8/8/k6K w - - 0 1");
        let promos: Vec<_> = list.iter().filter(|m| m.is_promotion()).collect();
        assert_eq!(promos.len(), 4);
    }

    #[test]
    fn loud_moves_are_captures_and_promotions() {
        let pos = Position::from_fen(KIWIPETE).unwrap();
        let mut loud = MoveList::new();
        generate_loud_moves(pos.side_to_move(), &pos, &mut loud);
        assert!(!loud.is_empty());
        for mov in loud.iter() {
            assert!(mov.is_capture() || mov.is_promotion(), "not loud: {}", mov);
        }

        // Every loud move is also in the full move list.
        let mut all = MoveList::new();
        generate_moves(pos.side_to_move(), &pos, &mut all);
        for mov in loud.iter() {
            assert!(all.contains(mov));
        }
    }

    #[test]
    fn score_moves_mvv_lva() {
        // White pawn can capture a queen; white queen can capture a pawn. The pawn takes
        // queen capture must score higher.
        let pos = Position::from_fen("k7/8/8/3q3p/2P4Q/8/8/K7 w - - 0 1").unwrap();
        let mut list = MoveList::new();
        generate_moves(Color::White, &pos, &mut list);
        score_moves(&mut list, &pos);

        let mut pawn_takes_queen = 0;
        let mut queen_takes_pawn = 0;
        for mov in list.iter() {
            if mov.source() == C4 && mov.destination() == D5 {
                pawn_takes_queen = mov.score();
            }
            if mov.source() == H4 && mov.destination() == H5 {
                queen_takes_pawn = mov.score();
            }
        }
        assert_eq!(pawn_takes_queen, 10 * 5 + 5);
        assert_eq!(queen_takes_pawn, 10 * 1 + 1);
        assert!(pawn_takes_queen > queen_takes_pawn);
    }

    const ROUND_TRIP_FENS: &[&str] = &[
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        KIWIPETE,
        POSITION_3,
        POSITION_4,
        POSITION_5,
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        "r3k2r/ppp2ppp/2nqbn2/3pp3/3PP3/2NQBN2/PPP2PPP/R3K2R w KQkq - 6 8",
    ];

    #[test]
    fn make_unmake_is_identity_for_every_legal_move() {
        for fen in ROUND_TRIP_FENS {
            let mut pos = Position::from_fen(fen).unwrap();
            let mut list = MoveList::new();
            generate_moves(pos.side_to_move(), &pos, &mut list);

            let before = (pos.zobrist_hash(), pos.as_fen());
            for i in 0..list.len() {
                let mov = list.at(i);
                pos.make(mov);
                pos.unmake(mov);
                let after = (pos.zobrist_hash(), pos.as_fen());
                assert_eq!(before, after, "make/unmake of {} on {}", mov, fen);
            }
        }
    }

    #[test]
    fn incremental_hash_matches_recompute_for_every_legal_move() {
        for fen in ROUND_TRIP_FENS {
            let mut pos = Position::from_fen(fen).unwrap();
            let mut list = MoveList::new();
            generate_moves(pos.side_to_move(), &pos, &mut list);

            for i in 0..list.len() {
                let mov = list.at(i);
                pos.make(mov);
                assert_eq!(
                    pos.zobrist_hash(),
                    pos.computed_hash(),
                    "hash diverged after {} on {}",
                    mov,
                    fen
                );
                pos.unmake(mov);
            }
        }
    }

    #[test]
    fn checkmate_has_no_moves() {
        // Scholar's mate.
        let list = moves_for("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4");
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn stalemate_has_no_moves() {
        let list = moves_for("k7/8/1QK5/8/8/8/8/8 b - - 0 1");
        assert_eq!(list.len(), 0);
    }
}
