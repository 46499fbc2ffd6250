// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::{
    convert::TryFrom,
    fmt::{self, Write},
    hash::{Hash, Hasher},
};

use thiserror::Error;

use crate::{
    core::{self, attacks, *},
    zobrist,
};

/// The state of a position that a move cannot recompute when it is retracted: castling
/// rights, the en-passant square, the clocks, and the hash. One record is pushed per
/// `make` (and per null move) and popped by the matching `unmake`.
#[derive(Copy, Clone, Debug)]
struct State {
    castle_status: CastleStatus,
    en_passant_square: Option<Square>,
    halfmove_clock: u16,
    fullmove_clock: u16,
    zobrist_hash: u64,
}

/// A position, representing a chess game that has progressed up to this point.
///
/// The position keeps a 64-cell mailbox and a set of bitboards that always agree with it:
/// a piece sits on a square in the mailbox exactly when its bit is set in its piece set,
/// and the two color occupancy sets never overlap. Mutation happens through `make`/`unmake`
/// pairs (plus the null-move pair), which must nest perfectly; `unmake` restores the
/// position bit for bit, including the incrementally maintained Zobrist hash.
#[derive(Clone, Debug)]
pub struct Position {
    /// One cell per square; the authoritative piece-at-square lookup.
    mailbox: [Option<Piece>; 64],
    /// SquareSets for each piece and color combination (6 kinds x 2 colors).
    sets_by_piece: [SquareSet; 12],
    /// SquareSets for each color.
    sets_by_color: [SquareSet; 2],
    /// The en-passant target square, if the previous move was a double pawn push.
    en_passant_square: Option<Square>,
    /// The halfmove clock, or the progress towards a draw by the fifty-move rule.
    halfmove_clock: u16,
    /// The fullmove clock; increments after every black move.
    fullmove_clock: u16,
    /// Castle status for both players.
    castle_status: CastleStatus,
    /// Color whose turn it is to move.
    side_to_move: Color,
    /// The Zobrist hash of this position, maintained incrementally.
    zobrist_hash: u64,
    /// Irreversible-state records, one per made move that has not yet been unmade.
    undo_stack: Vec<State>,
    /// Hashes of every position reached since setup, the current one last. Repetition
    /// detection scans the tail of this list.
    hash_history: Vec<u64>,
}

impl Position {
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    pub fn fullmove_clock(&self) -> u16 {
        self.fullmove_clock
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn zobrist_hash(&self) -> u64 {
        self.zobrist_hash
    }

    pub fn castle_status(&self) -> CastleStatus {
        self.castle_status
    }

    pub fn can_castle_kingside(&self, color: Color) -> bool {
        self.castle_status.contains(kingside_castle_mask(color))
    }

    pub fn can_castle_queenside(&self, color: Color) -> bool {
        self.castle_status.contains(queenside_castle_mask(color))
    }

    pub fn pieces(&self, color: Color) -> SquareSet {
        self.sets_by_color[color.index()]
    }

    pub fn occupancy(&self) -> SquareSet {
        self.sets_by_color[0] | self.sets_by_color[1]
    }

    pub fn pieces_of_kind(&self, color: Color, kind: PieceKind) -> SquareSet {
        self.sets_by_piece[color.index() * 6 + kind.index()]
    }

    pub fn pawns(&self, color: Color) -> SquareSet {
        self.pieces_of_kind(color, PieceKind::Pawn)
    }

    pub fn knights(&self, color: Color) -> SquareSet {
        self.pieces_of_kind(color, PieceKind::Knight)
    }

    pub fn bishops(&self, color: Color) -> SquareSet {
        self.pieces_of_kind(color, PieceKind::Bishop)
    }

    pub fn rooks(&self, color: Color) -> SquareSet {
        self.pieces_of_kind(color, PieceKind::Rook)
    }

    pub fn queens(&self, color: Color) -> SquareSet {
        self.pieces_of_kind(color, PieceKind::Queen)
    }

    pub fn king(&self, color: Color) -> Option<Square> {
        self.pieces_of_kind(color, PieceKind::King).first()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.mailbox[square.index()]
    }
}

impl Position {
    pub fn new() -> Position {
        Position {
            mailbox: [None; 64],
            sets_by_piece: [SquareSet::empty(); 12],
            sets_by_color: [SquareSet::empty(); 2],
            halfmove_clock: 0,
            fullmove_clock: 1,
            castle_status: CastleStatus::NONE,
            en_passant_square: None,
            side_to_move: Color::White,
            zobrist_hash: 0,
            undo_stack: Vec::with_capacity(MAX_PLY),
            hash_history: Vec::with_capacity(256),
        }
    }

    pub fn add_piece(&mut self, square: Square, piece: Piece) -> Result<(), ()> {
        if self.piece_at(square).is_some() {
            return Err(());
        }

        self.put_piece(square, piece);
        Ok(())
    }

    pub fn remove_piece(&mut self, square: Square) -> Result<(), ()> {
        if self.piece_at(square).is_none() {
            return Err(());
        }

        self.take_piece(square);
        Ok(())
    }

    pub fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    pub fn set_castle_status(&mut self, status: CastleStatus) {
        self.castle_status = status;
    }

    pub fn set_en_passant_square(&mut self, square: Option<Square>) {
        self.en_passant_square = square;
    }

    /// Recomputes the Zobrist hash from the board state and restarts the hash history.
    /// Call after assembling a position by hand with `add_piece` and the setters.
    pub fn refresh_hash(&mut self) {
        self.zobrist_hash = self.computed_hash();
        self.hash_history.clear();
        self.hash_history.push(self.zobrist_hash);
    }

    /// The position hash computed from scratch, ignoring the incrementally maintained one.
    pub fn computed_hash(&self) -> u64 {
        zobrist::full_hash(
            self.mailbox
                .iter()
                .enumerate()
                .filter_map(|(idx, piece)| {
                    piece.map(|p| (Square::try_from(idx as u8).unwrap(), p))
                }),
            self.castle_status,
            self.en_passant_square.map(|sq| sq.file()),
            self.side_to_move,
        )
    }

    fn put_piece(&mut self, square: Square, piece: Piece) {
        debug_assert!(self.mailbox[square.index()].is_none());
        self.mailbox[square.index()] = Some(piece);
        self.sets_by_color[piece.color.index()].insert(square);
        self.sets_by_piece[piece.color.index() * 6 + piece.kind.index()].insert(square);
        zobrist::modify_piece(&mut self.zobrist_hash, square, piece);
    }

    fn take_piece(&mut self, square: Square) -> Piece {
        let piece = self.mailbox[square.index()].take();
        debug_assert!(piece.is_some());
        let piece = match piece {
            Some(piece) => piece,
            // Unreachable for legal input; see the failure modes note on `make`.
            None => Piece::new(Color::White, PieceKind::Pawn),
        };
        self.sets_by_color[piece.color.index()].remove(square);
        self.sets_by_piece[piece.color.index() * 6 + piece.kind.index()].remove(square);
        zobrist::modify_piece(&mut self.zobrist_hash, square, piece);
        piece
    }

    /// The set of squares containing pieces of `attacker` color that attack `target`.
    ///
    /// Attack symmetry does the heavy lifting: a knight on `target` reaches exactly the
    /// knights that attack `target`, a rook reaches the attacking rooks and queens, and a
    /// pawn of the *defending* color reaches the attacking pawns.
    pub fn squares_attacking(&self, attacker: Color, target: Square) -> SquareSet {
        let occ = self.occupancy();
        let mut attackers = attacks::knight_attacks(target) & self.knights(attacker);
        attackers |= attacks::king_attacks(target) & self.pieces_of_kind(attacker, PieceKind::King);
        attackers |=
            attacks::rook_attacks(target, occ) & (self.rooks(attacker) | self.queens(attacker));
        attackers |=
            attacks::bishop_attacks(target, occ) & (self.bishops(attacker) | self.queens(attacker));
        attackers |= attacks::pawn_attacks(target, attacker.toggle()) & self.pawns(attacker);
        attackers
    }

    pub fn is_check(&self, us: Color) -> bool {
        match self.king(us) {
            Some(king) => !self.squares_attacking(us.toggle(), king).is_empty(),
            None => false,
        }
    }
}

//
// Make and unmake.
//

impl Position {
    /// Makes a move on the position, updating all internal state to reflect its effects.
    /// The move must be legal in this position; debug builds assert the board agrees with
    /// what the move encodes, release builds treat disagreement as undefined.
    pub fn make(&mut self, mov: Move) {
        debug_assert!(!mov.is_null());

        let side = self.side_to_move;
        let moving = self.mailbox[mov.source().index()];
        debug_assert!(moving.map(|p| p.color) == Some(side));
        let moving = match moving {
            Some(piece) => piece,
            None => return,
        };

        self.undo_stack.push(self.state());

        // Captures first, so the destination square is free. The en-passant victim is the
        // one capture that does not sit on the destination square: it shares the source's
        // rank and the destination's file.
        if let Some(victim) = mov.captured_piece() {
            let target = if mov.is_en_passant() {
                Square::of(mov.source().rank(), mov.destination().file())
            } else {
                mov.destination()
            };
            debug_assert_eq!(self.mailbox[target.index()], Some(victim));
            self.take_piece(target);
        }

        self.take_piece(mov.source());
        let placed = match mov.promotion_piece() {
            Some(promoted) => {
                debug_assert_eq!(moving.kind, PieceKind::Pawn);
                debug_assert_eq!(promoted.color, side);
                promoted
            }
            None => moving,
        };
        self.put_piece(mov.destination(), placed);

        // Castles move a second piece: H1->F1, A1->D1, H8->F8, A8->D8.
        if mov.is_castle() {
            let (rook_from, rook_to) = if mov.is_kingside_castle() {
                (kingside_rook(side), mov.destination().towards(Direction::West))
            } else {
                (queenside_rook(side), mov.destination().towards(Direction::East))
            };
            let rook = self.take_piece(rook_from);
            debug_assert_eq!(rook.kind, PieceKind::Rook);
            self.put_piece(rook_to, rook);
        }

        // A double push leaves the en-passant target behind the pawn; every other move
        // clears it. Only the file participates in the hash.
        let new_ep = if mov.is_double_pawn_push() {
            let behind = match side {
                Color::White => mov.destination().towards(Direction::South),
                Color::Black => mov.destination().towards(Direction::North),
            };
            Some(behind)
        } else {
            None
        };
        zobrist::modify_en_passant(
            &mut self.zobrist_hash,
            self.en_passant_square.map(|sq| sq.file()),
            new_ep.map(|sq| sq.file()),
        );
        self.en_passant_square = new_ep;

        // Castling rights go away when the king moves, when a rook leaves its home square,
        // or when a rook is captured on its home square.
        let old_rights = self.castle_status;
        let mut rights = old_rights;
        match moving.kind {
            PieceKind::King => rights &= !castle_mask(side),
            PieceKind::Rook => {
                if mov.source() == kingside_rook(side) {
                    rights &= !kingside_castle_mask(side);
                } else if mov.source() == queenside_rook(side) {
                    rights &= !queenside_castle_mask(side);
                }
            }
            _ => {}
        }
        if mov.is_capture() && !mov.is_en_passant() {
            let them = side.toggle();
            if mov.destination() == kingside_rook(them) {
                rights &= !kingside_castle_mask(them);
            } else if mov.destination() == queenside_rook(them) {
                rights &= !queenside_castle_mask(them);
            }
        }
        zobrist::modify_castling(&mut self.zobrist_hash, old_rights, rights);
        self.castle_status = rights;

        if mov.is_capture() || moving.kind == PieceKind::Pawn {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        self.side_to_move = side.toggle();
        zobrist::modify_side_to_move(&mut self.zobrist_hash);
        if self.side_to_move == Color::White {
            self.fullmove_clock += 1;
        }

        self.hash_history.push(self.zobrist_hash);
    }

    /// Unmakes a move, the exact inverse of `make`. Must be called with the move most
    /// recently made.
    pub fn unmake(&mut self, mov: Move) {
        self.hash_history.pop();

        let side = self.side_to_move.toggle();
        let placed = self.take_piece(mov.destination());
        let moved = if mov.is_promotion() {
            Piece::new(side, PieceKind::Pawn)
        } else {
            placed
        };
        self.put_piece(mov.source(), moved);

        if mov.is_castle() {
            let (rook_from, rook_to) = if mov.is_kingside_castle() {
                (kingside_rook(side), mov.destination().towards(Direction::West))
            } else {
                (queenside_rook(side), mov.destination().towards(Direction::East))
            };
            let rook = self.take_piece(rook_to);
            self.put_piece(rook_from, rook);
        }

        if let Some(victim) = mov.captured_piece() {
            let target = if mov.is_en_passant() {
                Square::of(mov.source().rank(), mov.destination().file())
            } else {
                mov.destination()
            };
            self.put_piece(target, victim);
        }

        self.side_to_move = side;
        self.restore_state();
    }

    /// Makes a null move: the side to move passes. Only the side to move and the
    /// en-passant square change; used by null-move pruning.
    pub fn make_null(&mut self) {
        self.undo_stack.push(self.state());
        zobrist::modify_en_passant(
            &mut self.zobrist_hash,
            self.en_passant_square.map(|sq| sq.file()),
            None,
        );
        self.en_passant_square = None;
        self.side_to_move = self.side_to_move.toggle();
        zobrist::modify_side_to_move(&mut self.zobrist_hash);
        self.hash_history.push(self.zobrist_hash);
    }

    pub fn unmake_null(&mut self) {
        self.hash_history.pop();
        self.side_to_move = self.side_to_move.toggle();
        self.restore_state();
    }

    fn state(&self) -> State {
        State {
            castle_status: self.castle_status,
            en_passant_square: self.en_passant_square,
            halfmove_clock: self.halfmove_clock,
            fullmove_clock: self.fullmove_clock,
            zobrist_hash: self.zobrist_hash,
        }
    }

    fn restore_state(&mut self) {
        let state = self.undo_stack.pop();
        debug_assert!(state.is_some());
        if let Some(state) = state {
            self.castle_status = state.castle_status;
            self.en_passant_square = state.en_passant_square;
            self.halfmove_clock = state.halfmove_clock;
            self.fullmove_clock = state.fullmove_clock;
            self.zobrist_hash = state.zobrist_hash;
        }
    }

    /// Whether this position is drawn by the fifty-move rule or by repetition.
    ///
    /// Repetition is judged differently inside and outside the search tree: inside, the
    /// second occurrence of a position already ends the line (a forced cycle is going
    /// nowhere, so there is no point searching the third visit); outside — and at the
    /// search root — the full threefold rule applies.
    pub fn is_draw(&self, in_search: bool) -> bool {
        if self.halfmove_clock >= 100 {
            return true;
        }

        let needed = if in_search { 2 } else { 3 };
        // Positions older than the last irreversible move can never repeat.
        let window = (self.halfmove_clock as usize + 1).min(self.hash_history.len());
        let current = self.zobrist_hash;
        let seen = self
            .hash_history
            .iter()
            .rev()
            .take(window)
            .filter(|&&hash| hash == current)
            .count();
        seen >= needed
    }
}

//
// FEN parsing and generation.
//
// Positions can be created by parsing FEN and FEN can be produced from particular
// positions; the round trip is exact.
//

/// Possible errors that can arise when parsing a FEN string into a `Position`.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum FenParseError {
    #[error("unexpected char: {0}")]
    UnexpectedChar(char),
    #[error("unexpected EOF while reading")]
    UnexpectedEnd,
    #[error("invalid digit")]
    InvalidDigit,
    #[error("file does not sum to 8")]
    FileDoesNotSumToEight,
    #[error("unknown piece: {0}")]
    UnknownPiece(char),
    #[error("invalid side to move")]
    InvalidSideToMove,
    #[error("invalid castle")]
    InvalidCastle,
    #[error("invalid en-passant")]
    InvalidEnPassant,
    #[error("empty halfmove")]
    EmptyHalfmove,
    #[error("invalid halfmove")]
    InvalidHalfmove,
    #[error("empty fullmove")]
    EmptyFullmove,
    #[error("invalid fullmove")]
    InvalidFullmove,
}

impl Position {
    pub fn from_start_position() -> Position {
        Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap()
    }

    /// Constructs a new position from a FEN representation of a board position.
    pub fn from_fen(fen: impl AsRef<str>) -> Result<Position, FenParseError> {
        use std::{iter::Peekable, str::Chars};

        type Stream<'a> = Peekable<Chars<'a>>;

        fn eat(iter: &mut Stream<'_>, expected: char) -> Result<(), FenParseError> {
            match iter.next() {
                Some(c) if c == expected => Ok(()),
                Some(c) => Err(FenParseError::UnexpectedChar(c)),
                None => Err(FenParseError::UnexpectedEnd),
            }
        }

        fn peek(iter: &mut Stream<'_>) -> Result<char, FenParseError> {
            iter.peek().copied().ok_or(FenParseError::UnexpectedEnd)
        }

        fn eat_side_to_move(iter: &mut Stream<'_>) -> Result<Color, FenParseError> {
            let side = match peek(iter)? {
                'w' => Color::White,
                'b' => Color::Black,
                _ => return Err(FenParseError::InvalidSideToMove),
            };

            iter.next();
            Ok(side)
        }

        fn eat_castle_status(iter: &mut Stream<'_>) -> Result<CastleStatus, FenParseError> {
            if peek(iter)? == '-' {
                iter.next();
                return Ok(CastleStatus::NONE);
            }

            let mut status = CastleStatus::NONE;
            for _ in 0..4 {
                match peek(iter)? {
                    'K' => status |= CastleStatus::WHITE_KINGSIDE,
                    'Q' => status |= CastleStatus::WHITE_QUEENSIDE,
                    'k' => status |= CastleStatus::BLACK_KINGSIDE,
                    'q' => status |= CastleStatus::BLACK_QUEENSIDE,
                    ' ' => break,
                    _ => return Err(FenParseError::InvalidCastle),
                }

                iter.next();
            }

            Ok(status)
        }

        fn eat_en_passant(iter: &mut Stream<'_>) -> Result<Option<Square>, FenParseError> {
            let c = peek(iter)?;
            if c == '-' {
                iter.next();
                return Ok(None);
            }

            let file = File::try_from(c).map_err(|_| FenParseError::InvalidEnPassant)?;
            iter.next();
            let rank_c = peek(iter)?;
            let rank = Rank::try_from(rank_c).map_err(|_| FenParseError::InvalidEnPassant)?;
            iter.next();
            Ok(Some(Square::of(rank, file)))
        }

        fn eat_halfmove(iter: &mut Stream<'_>) -> Result<u16, FenParseError> {
            let mut buf = String::new();
            loop {
                let c = peek(iter)?;
                if !c.is_ascii_digit() {
                    break;
                }

                buf.push(c);
                iter.next();
            }

            if buf.is_empty() {
                return Err(FenParseError::EmptyHalfmove);
            }

            buf.parse::<u16>().map_err(|_| FenParseError::InvalidHalfmove)
        }

        fn eat_fullmove(iter: &mut Stream<'_>) -> Result<u16, FenParseError> {
            let mut buf = String::new();
            for ch in iter {
                if !ch.is_ascii_digit() {
                    break;
                }

                buf.push(ch);
            }

            if buf.is_empty() {
                return Err(FenParseError::EmptyFullmove);
            }

            buf.parse::<u16>().map_err(|_| FenParseError::InvalidFullmove)
        }

        let mut pos = Position::new();
        let str_ref = fen.as_ref();
        let iter = &mut str_ref.chars().peekable();
        for rank in core::ranks().rev() {
            let mut file = 0;
            while file <= 7 {
                let c = peek(iter)?;
                // Digits 1 through 8 indicate runs of empty squares.
                if c.is_ascii_digit() {
                    if !('1'..='8').contains(&c) {
                        return Err(FenParseError::InvalidDigit);
                    }

                    file += c as usize - '0' as usize;
                    if file > 8 {
                        return Err(FenParseError::FileDoesNotSumToEight);
                    }

                    iter.next();
                    continue;
                }

                let piece = Piece::try_from(c).map_err(|_| FenParseError::UnknownPiece(c))?;
                let square = Square::of(rank, File::try_from(file as u8).unwrap());
                pos.add_piece(square, piece).expect("FEN double-add piece?");
                iter.next();
                file += 1;
            }

            if rank != core::RANK_1 {
                eat(iter, '/')?;
            }
        }

        eat(iter, ' ')?;
        pos.side_to_move = eat_side_to_move(iter)?;
        eat(iter, ' ')?;
        pos.castle_status = eat_castle_status(iter)?;
        eat(iter, ' ')?;
        pos.en_passant_square = eat_en_passant(iter)?;
        eat(iter, ' ')?;
        pos.halfmove_clock = eat_halfmove(iter)?;
        eat(iter, ' ')?;
        pos.fullmove_clock = eat_fullmove(iter)?;
        pos.refresh_hash();
        Ok(pos)
    }

    pub fn as_fen(&self) -> String {
        let mut buf = String::new();
        for rank in core::ranks().rev() {
            let mut empty_squares = 0;
            for file in core::files() {
                let square = Square::of(rank, file);
                if let Some(piece) = self.piece_at(square) {
                    if empty_squares != 0 {
                        write!(&mut buf, "{}", empty_squares).unwrap();
                    }
                    write!(&mut buf, "{}", piece).unwrap();
                    empty_squares = 0;
                } else {
                    empty_squares += 1;
                }
            }

            if empty_squares != 0 {
                write!(&mut buf, "{}", empty_squares).unwrap();
            }

            if rank != core::RANK_1 {
                buf.push('/');
            }
        }

        buf.push(' ');
        match self.side_to_move() {
            Color::White => buf.push('w'),
            Color::Black => buf.push('b'),
        }
        buf.push(' ');
        if self.castle_status == CastleStatus::NONE {
            buf.push('-');
        } else {
            if self.can_castle_kingside(Color::White) {
                buf.push('K');
            }
            if self.can_castle_queenside(Color::White) {
                buf.push('Q');
            }
            if self.can_castle_kingside(Color::Black) {
                buf.push('k');
            }
            if self.can_castle_queenside(Color::Black) {
                buf.push('q');
            }
        }
        buf.push(' ');
        if let Some(ep_square) = self.en_passant_square() {
            write!(&mut buf, "{}", ep_square).unwrap();
        } else {
            buf.push('-');
        }
        write!(
            &mut buf,
            " {} {}",
            self.halfmove_clock(),
            self.fullmove_clock()
        )
        .unwrap();
        buf
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in core::ranks().rev() {
            for file in core::files() {
                let sq = Square::of(rank, file);
                if let Some(piece) = self.piece_at(sq) {
                    write!(f, " {} ", piece)?;
                } else {
                    write!(f, " . ")?;
                }
            }

            writeln!(f, "| {}", rank)?;
        }

        for _ in core::files() {
            write!(f, "---")?;
        }

        writeln!(f)?;
        for file in core::files() {
            write!(f, " {} ", file)?;
        }

        writeln!(f)?;
        Ok(())
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}

impl Hash for Position {
    fn hash<H>(&self, hasher: &mut H)
    where
        H: Hasher,
    {
        hasher.write_u64(self.zobrist_hash);
    }
}

pub(crate) fn kingside_rook(color: Color) -> Square {
    match color {
        Color::White => H1,
        Color::Black => H8,
    }
}

pub(crate) fn queenside_rook(color: Color) -> Square {
    match color {
        Color::White => A1,
        Color::Black => A8,
    }
}

fn kingside_castle_mask(color: Color) -> CastleStatus {
    match color {
        Color::White => CastleStatus::WHITE_KINGSIDE,
        Color::Black => CastleStatus::BLACK_KINGSIDE,
    }
}

fn queenside_castle_mask(color: Color) -> CastleStatus {
    match color {
        Color::White => CastleStatus::WHITE_QUEENSIDE,
        Color::Black => CastleStatus::BLACK_QUEENSIDE,
    }
}

fn castle_mask(color: Color) -> CastleStatus {
    match color {
        Color::White => CastleStatus::WHITE,
        Color::Black => CastleStatus::BLACK,
    }
}
