// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Move and position text notations beyond FEN: coordinate moves, standard algebraic
//! notation, and EPD records.
//!
//! Parsers here resolve text against the legal move list of a concrete position rather
//! than constructing moves from the text alone; a string that names no legal move is a
//! parse failure, never a mutation.

use std::convert::TryFrom;

use thiserror::Error;

use crate::core::*;
use crate::movegen;
use crate::position::{FenParseError, Position};

#[derive(Debug, Error)]
pub enum EpdParseError {
    #[error("EPD line is missing board fields")]
    MissingFields,
    #[error("invalid position: {0}")]
    Fen(#[from] FenParseError),
    #[error("invalid clock operand: {0}")]
    InvalidClock(String),
}

fn legal_moves(pos: &Position) -> MoveList {
    let mut list = MoveList::new();
    movegen::generate_moves(pos.side_to_move(), pos, &mut list);
    list
}

/// Parses a coordinate move like `e2e4` or `e7e8q` against the legal moves of the
/// position. The castle spellings `e1g1`, `e1c1`, `e8g8`, and `e8c8` resolve to castles
/// exactly when the king stands on the from-square, because that is the only case in
/// which the legal list contains such a king move; `O-O` forms are accepted too.
pub fn parse_coordinate(text: &str, pos: &Position) -> Option<Move> {
    let list = legal_moves(pos);
    match text {
        "O-O" | "0-0" => return list.iter().find(|m| m.is_kingside_castle()),
        "O-O-O" | "0-0-0" => return list.iter().find(|m| m.is_queenside_castle()),
        _ => {}
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 4 {
        return None;
    }

    let from = square_at(&chars, 0)?;
    let to = square_at(&chars, 2)?;
    let promo = chars.get(4).and_then(|&c| kind_from_char(c.to_ascii_uppercase()));

    let found = list.iter().find(|m| {
        m.source() == from
            && m.destination() == to
            && m.promotion_piece().map(|p| p.kind) == promo
    });
    found
}

fn square_at(chars: &[char], idx: usize) -> Option<Square> {
    let file = File::try_from(*chars.get(idx)?).ok()?;
    let rank = Rank::try_from(*chars.get(idx + 1)?).ok()?;
    Some(Square::of(rank, file))
}

fn kind_from_char(c: char) -> Option<PieceKind> {
    match c {
        'N' => Some(PieceKind::Knight),
        'B' => Some(PieceKind::Bishop),
        'R' => Some(PieceKind::Rook),
        'Q' => Some(PieceKind::Queen),
        'K' => Some(PieceKind::King),
        _ => None,
    }
}

fn kind_to_char(kind: PieceKind) -> char {
    match kind {
        PieceKind::Pawn => ' ',
        PieceKind::Knight => 'N',
        PieceKind::Bishop => 'B',
        PieceKind::Rook => 'R',
        PieceKind::Queen => 'Q',
        PieceKind::King => 'K',
    }
}

/// Parses a move in standard algebraic notation against the position's legal moves.
/// Check and mate suffixes and an `e.p.` tag are accepted and ignored; castles may be
/// spelled with `O` or `0`.
pub fn parse_san(text: &str, pos: &Position) -> Option<Move> {
    let list = legal_moves(pos);

    let mut core = text.trim();
    if let Some(stripped) = core.strip_suffix("e.p.") {
        core = stripped.trim_end();
    }
    let core = core.trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));

    match core {
        "O-O" | "0-0" => return list.iter().find(|m| m.is_kingside_castle()),
        "O-O-O" | "0-0-0" => return list.iter().find(|m| m.is_queenside_castle()),
        _ => {}
    }

    let mut chars: Vec<char> = core.chars().collect();

    // Promotion suffix: "=Q" or a trailing piece letter ("e8Q").
    let mut promo = None;
    if let Some(&last) = chars.last() {
        if let Some(kind) = kind_from_char(last) {
            if kind != PieceKind::King && chars.len() > 2 {
                promo = Some(kind);
                chars.pop();
                if chars.last() == Some(&'=') {
                    chars.pop();
                }
            }
        }
    }

    // Leading piece letter; absent for pawn moves.
    let mut idx = 0;
    let piece = match chars.first().and_then(|&c| kind_from_char(c)) {
        Some(kind) => {
            idx += 1;
            kind
        }
        None => PieceKind::Pawn,
    };

    // The destination is the final file-rank pair; whatever sits between the piece
    // letter and the destination is disambiguation and an optional 'x'.
    if chars.len() < idx + 2 {
        return None;
    }
    let dest_chars = &chars[chars.len() - 2..];
    let to = square_at(dest_chars, 0)?;

    let mut from_file = None;
    let mut from_rank = None;
    for &c in &chars[idx..chars.len() - 2] {
        match c {
            'x' => {}
            'a'..='h' => from_file = File::try_from(c).ok(),
            '1'..='8' => from_rank = Rank::try_from(c).ok(),
            _ => return None,
        }
    }

    let mut matched = None;
    for m in list.iter() {
        if m.destination() != to || m.is_castle() {
            continue;
        }
        let mover = pos.piece_at(m.source())?;
        if mover.kind != piece {
            continue;
        }
        if m.promotion_piece().map(|p| p.kind) != promo {
            continue;
        }
        if let Some(file) = from_file {
            if m.source().file() != file {
                continue;
            }
        }
        if let Some(rank) = from_rank {
            if m.source().rank() != rank {
                continue;
            }
        }
        if matched.is_some() {
            // Ambiguous SAN names no unique move.
            return None;
        }
        matched = Some(m);
    }
    matched
}

/// Renders a legal move in standard algebraic notation, including disambiguation and a
/// check or mate suffix.
pub fn san(pos: &mut Position, mov: Move) -> String {
    let mut out = String::new();

    if mov.is_kingside_castle() {
        out.push_str("O-O");
    } else if mov.is_queenside_castle() {
        out.push_str("O-O-O");
    } else {
        let mover = match pos.piece_at(mov.source()) {
            Some(piece) => piece,
            None => return mov.as_coord(),
        };

        if mover.kind == PieceKind::Pawn {
            if mov.is_capture() {
                out.push((b'a' + mov.source().file().as_u8()) as char);
            }
        } else {
            out.push(kind_to_char(mover.kind));

            // Disambiguate when another piece of the same kind also reaches the
            // destination: prefer the file, fall back to the rank, then to both.
            let mut rivals = Vec::new();
            for m in legal_moves(pos).iter() {
                if m.destination() == mov.destination()
                    && m.source() != mov.source()
                    && !m.is_castle()
                    && pos.piece_at(m.source()).map(|p| p.kind) == Some(mover.kind)
                {
                    rivals.push(m.source());
                }
            }
            if !rivals.is_empty() {
                let file_unique = rivals.iter().all(|sq| sq.file() != mov.source().file());
                let rank_unique = rivals.iter().all(|sq| sq.rank() != mov.source().rank());
                if file_unique {
                    out.push((b'a' + mov.source().file().as_u8()) as char);
                } else if rank_unique {
                    out.push((b'1' + mov.source().rank().as_u8()) as char);
                } else {
                    out.push_str(&mov.source().to_string());
                }
            }
        }

        if mov.is_capture() {
            out.push('x');
        }
        out.push_str(&mov.destination().to_string());
        if let Some(promoted) = mov.promotion_piece() {
            out.push('=');
            out.push(kind_to_char(promoted.kind));
        }
    }

    pos.make(mov);
    if pos.is_check(pos.side_to_move()) {
        let replies = legal_moves(pos);
        out.push(if replies.is_empty() { '#' } else { '+' });
    }
    pos.unmake(mov);

    out
}

/// One parsed EPD record: the position described by the first four fields, plus the
/// operations. The `hmvc` and `fmvn` operations feed the position's clocks.
#[derive(Debug)]
pub struct EpdRecord {
    pub position: Position,
    ops: Vec<(String, String)>,
}

impl EpdRecord {
    pub fn op(&self, opcode: &str) -> Option<&str> {
        self.ops
            .iter()
            .find(|(code, _)| code == opcode)
            .map(|(_, operand)| operand.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.op("id")
    }

    /// Resolves the `bm` (best move) operation, if present, against the position.
    pub fn best_move(&self) -> Option<Move> {
        parse_san(self.op("bm")?, &self.position)
    }

    /// The `c0` weighted-move comment, as used by the STS suites:
    /// `c0 "d4=100, h3=67, ...";` parsed into (move, weight) pairs.
    pub fn weighted_moves(&self) -> Vec<(Move, i32)> {
        let mut result = Vec::new();
        let Some(c0) = self.op("c0") else {
            return result;
        };
        for part in c0.split(',') {
            let mut halves = part.trim().splitn(2, '=');
            let (Some(san_text), Some(weight)) = (halves.next(), halves.next()) else {
                continue;
            };
            let (Some(mov), Ok(weight)) = (
                parse_san(san_text.trim(), &self.position),
                weight.trim().parse::<i32>(),
            ) else {
                continue;
            };
            result.push((mov, weight));
        }
        result
    }
}

/// Parses an EPD line: the four FEN board fields followed by `opcode operand;`
/// operations.
pub fn parse_epd(line: &str) -> Result<EpdRecord, EpdParseError> {
    let mut fields = line.split_whitespace();
    let placement = fields.next().ok_or(EpdParseError::MissingFields)?;
    let side = fields.next().ok_or(EpdParseError::MissingFields)?;
    let castling = fields.next().ok_or(EpdParseError::MissingFields)?;
    let en_passant = fields.next().ok_or(EpdParseError::MissingFields)?;

    let rest: Vec<&str> = fields.collect();
    let mut ops = Vec::new();
    for op_text in rest.join(" ").split(';') {
        let op_text = op_text.trim();
        if op_text.is_empty() {
            continue;
        }
        let (opcode, operand) = match op_text.split_once(' ') {
            Some((opcode, operand)) => (opcode, operand.trim().trim_matches('"')),
            None => (op_text, ""),
        };
        ops.push((opcode.to_string(), operand.to_string()));
    }

    let find = |code: &str| {
        ops.iter()
            .find(|(c, _)| c == code)
            .map(|(_, operand)| operand.as_str())
    };
    let halfmove = match find("hmvc") {
        Some(text) => text
            .parse::<u16>()
            .map_err(|_| EpdParseError::InvalidClock(text.to_string()))?,
        None => 0,
    };
    let fullmove = match find("fmvn") {
        Some(text) => text
            .parse::<u16>()
            .map_err(|_| EpdParseError::InvalidClock(text.to_string()))?,
        None => 1,
    };

    let fen = format!(
        "{} {} {} {} {} {}",
        placement, side, castling, en_passant, halfmove, fullmove
    );
    let position = Position::from_fen(fen)?;
    Ok(EpdRecord { position, ops })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_basic() {
        let pos = Position::from_start_position();
        let mov = parse_coordinate("e2e4", &pos).unwrap();
        assert!(mov.is_double_pawn_push());
        assert_eq!(mov.source(), E2);
        assert_eq!(mov.destination(), E4);

        assert!(parse_coordinate("e2e5", &pos).is_none());
        assert!(parse_coordinate("garbage", &pos).is_none());
    }

    #[test]
    fn coordinate_promotion() {
        let pos = Position::from_fen("8/4P3/8/8/8/8/8/k6K w - - 0 1").unwrap();
        let mov = parse_coordinate("e7e8q", &pos).unwrap();
        assert_eq!(mov.promotion_piece().map(|p| p.kind), Some(PieceKind::Queen));
        let knight = parse_coordinate("e7e8n", &pos).unwrap();
        assert_eq!(knight.promotion_piece().map(|p| p.kind), Some(PieceKind::Knight));
        // A bare e7e8 names no legal move; the promotion piece is mandatory.
        assert!(parse_coordinate("e7e8", &pos).is_none());
    }

    #[test]
    fn coordinate_castle_specials() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(parse_coordinate("e1g1", &pos).unwrap().is_kingside_castle());
        assert!(parse_coordinate("e1c1", &pos).unwrap().is_queenside_castle());
        assert!(parse_coordinate("O-O", &pos).unwrap().is_kingside_castle());

        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").unwrap();
        assert!(parse_coordinate("e8g8", &pos).unwrap().is_kingside_castle());
        assert!(parse_coordinate("e8c8", &pos).unwrap().is_queenside_castle());

        // e1g1 is an ordinary move when the piece on e1 is not the king.
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4R2K w - - 0 1").unwrap();
        let mov = parse_coordinate("e1g1", &pos).unwrap();
        assert!(!mov.is_castle());
        assert_eq!(mov.source(), E1);
        assert_eq!(mov.destination(), G1);
    }

    #[test]
    fn san_basic_moves() {
        let pos = Position::from_start_position();
        let nf3 = parse_san("Nf3", &pos).unwrap();
        assert_eq!(nf3.source(), G1);
        assert_eq!(nf3.destination(), F3);

        let e4 = parse_san("e4", &pos).unwrap();
        assert_eq!(e4.destination(), E4);
    }

    #[test]
    fn san_captures_and_suffixes() {
        let pos =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
                .unwrap();
        let capture = parse_san("exd5", &pos).unwrap();
        assert!(capture.is_capture());
        assert_eq!(capture.source(), E4);
        assert_eq!(capture.destination(), D5);

        // Suffixes are tolerated.
        assert_eq!(parse_san("exd5+", &pos), Some(capture));
        assert_eq!(parse_san("exd5!?", &pos), Some(capture));
    }

    #[test]
    fn san_disambiguation() {
        // Knights on b1 and f3 can both reach d2.
        let pos = Position::from_fen("4k3/8/8/8/8/5N2/8/RN2K3 w Q - 0 1").unwrap();
        let nbd2 = parse_san("Nbd2", &pos).unwrap();
        assert_eq!(nbd2.source(), B1);
        let nfd2 = parse_san("Nfd2", &pos).unwrap();
        assert_eq!(nfd2.source(), F3);
        // Plain "Nd2" is ambiguous.
        assert!(parse_san("Nd2", &pos).is_none());
    }

    #[test]
    fn san_promotion() {
        let pos = Position::from_fen("8/4P3/8/8/8/8/8/k6K w - - 0 1").unwrap();
        let promo = parse_san("e8=Q", &pos).unwrap();
        assert_eq!(promo.promotion_piece().map(|p| p.kind), Some(PieceKind::Queen));
        assert_eq!(parse_san("e8Q", &pos), Some(promo));
        assert!(parse_san("e8", &pos).is_none());
    }

    #[test]
    fn san_round_trip() {
        let mut pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let mut list = MoveList::new();
        movegen::generate_moves(pos.side_to_move(), &pos, &mut list);
        for i in 0..list.len() {
            let mov = list.at(i);
            let text = san(&mut pos, mov);
            let parsed = parse_san(&text, &pos);
            assert_eq!(parsed, Some(mov), "SAN {} did not round-trip", text);
        }
    }

    #[test]
    fn san_mate_suffix() {
        // Back-rank mate in one: Rd8#.
        let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/3RK3 w - - 0 1").unwrap();
        let mov = parse_coordinate("d1d8", &pos).unwrap();
        assert_eq!(san(&mut pos, mov), "Rd8#");
    }

    #[test]
    fn epd_with_best_move() {
        let record =
            parse_epd("1k1r4/pp1b1R2/3q2pp/4p3/2B5/4Q3/PPP2B2/2K5 b - - bm Qd1+; id \"BK.01\";")
                .unwrap();
        assert_eq!(record.id(), Some("BK.01"));
        let bm = record.best_move().unwrap();
        assert_eq!(bm.destination(), D1);
        assert_eq!(record.position.side_to_move(), Color::Black);
    }

    #[test]
    fn epd_clock_ops() {
        let record = parse_epd("4k3/8/8/8/8/8/8/4K3 w - - hmvc 12; fmvn 30;").unwrap();
        assert_eq!(record.position.halfmove_clock(), 12);
        assert_eq!(record.position.fullmove_clock(), 30);
    }

    #[test]
    fn epd_weighted_moves() {
        let record = parse_epd(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - c0 \"e4=100, d4=80\";",
        )
        .unwrap();
        let weighted = record.weighted_moves();
        assert_eq!(weighted.len(), 2);
        assert_eq!(weighted[0].0.destination(), E4);
        assert_eq!(weighted[0].1, 100);
        assert_eq!(weighted[1].0.destination(), D4);
        assert_eq!(weighted[1].1, 80);
    }

    #[test]
    fn epd_missing_fields() {
        assert!(matches!(
            parse_epd("8/8/8"),
            Err(EpdParseError::MissingFields)
        ));
    }
}
