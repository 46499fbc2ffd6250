// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Precomputed attack tables and sliding-piece attack generation.
//!
//! Knight, king, and pawn attacks are simple per-square lookups. Sliding attacks use
//! hyperbola quintessence: the occupancy along a masked line is turned into an attack set
//! with the `(o - 2s) ^ reverse(o' - 2s')` subtraction trick, where the reverse is a byte
//! swap for files and diagonals and a per-byte bit mirror for ranks.

use std::sync::LazyLock;

use crate::core::*;

const SS_RANK_12: SquareSet = SS_RANK_1.or(SS_RANK_2);
const SS_RANK_78: SquareSet = SS_RANK_7.or(SS_RANK_8);

const SS_FILE_AB: SquareSet = SS_FILE_A.or(SS_FILE_B);
const SS_FILE_GH: SquareSet = SS_FILE_G.or(SS_FILE_H);

struct KingTable {
    table: [SquareSet; 64],
}

impl KingTable {
    pub fn new() -> KingTable {
        let mut kt = KingTable {
            table: [SquareSet::empty(); 64],
        };

        for sq in squares() {
            let mut board = SquareSet::empty();
            if !SS_RANK_8.contains(sq) {
                board.insert(sq.plus(8));
                if !SS_FILE_A.contains(sq) {
                    board.insert(sq.plus(7));
                }
                if !SS_FILE_H.contains(sq) {
                    board.insert(sq.plus(9));
                }
            }

            if !SS_RANK_1.contains(sq) {
                board.insert(sq.plus(-8));
                if !SS_FILE_A.contains(sq) {
                    board.insert(sq.plus(-9));
                }
                if !SS_FILE_H.contains(sq) {
                    board.insert(sq.plus(-7));
                }
            }

            if !SS_FILE_A.contains(sq) {
                board.insert(sq.plus(-1));
            }
            if !SS_FILE_H.contains(sq) {
                board.insert(sq.plus(1));
            }

            kt.table[sq.index()] = board;
        }

        kt
    }
}

struct PawnTable {
    table: [[SquareSet; 2]; 64],
}

impl PawnTable {
    pub fn new() -> PawnTable {
        let mut pt = PawnTable {
            table: [[SquareSet::empty(); 2]; 64],
        };

        for sq in squares() {
            for color in colors() {
                let mut board = SquareSet::empty();
                let (edge_rank, up_left, up_right) = match color {
                    Color::White => (SS_RANK_8, 7, 9),
                    Color::Black => (SS_RANK_1, -9, -7),
                };

                if edge_rank.contains(sq) {
                    // A pawn can never stand on its promotion rank.
                    continue;
                }

                if !SS_FILE_A.contains(sq) {
                    board.insert(sq.plus(up_left));
                }
                if !SS_FILE_H.contains(sq) {
                    board.insert(sq.plus(up_right));
                }

                pt.table[sq.index()][color.index()] = board;
            }
        }

        pt
    }
}

struct KnightTable {
    table: [SquareSet; 64],
}

impl KnightTable {
    pub fn new() -> KnightTable {
        let mut kt = KnightTable {
            table: [SquareSet::empty(); 64],
        };

        for sq in squares() {
            let mut board = SquareSet::empty();
            if !SS_FILE_A.contains(sq) && !SS_RANK_78.contains(sq) {
                board.insert(sq.plus(15));
            }
            if !SS_FILE_H.contains(sq) && !SS_RANK_78.contains(sq) {
                board.insert(sq.plus(17));
            }
            if !SS_FILE_GH.contains(sq) && !SS_RANK_8.contains(sq) {
                board.insert(sq.plus(10));
            }
            if !SS_FILE_GH.contains(sq) && !SS_RANK_1.contains(sq) {
                board.insert(sq.plus(-6));
            }
            if !SS_FILE_H.contains(sq) && !SS_RANK_12.contains(sq) {
                board.insert(sq.plus(-15));
            }
            if !SS_FILE_A.contains(sq) && !SS_RANK_12.contains(sq) {
                board.insert(sq.plus(-17));
            }
            if !SS_FILE_AB.contains(sq) && !SS_RANK_1.contains(sq) {
                board.insert(sq.plus(-10));
            }
            if !SS_FILE_AB.contains(sq) && !SS_RANK_8.contains(sq) {
                board.insert(sq.plus(6));
            }
            kt.table[sq.index()] = board;
        }
        kt
    }
}

/// Per-square line masks for the hyperbola attack routines. Each mask excludes the slider's
/// own square.
struct MaskTable {
    rank_ex: [u64; 64],
    file_ex: [u64; 64],
    diag_ex: [u64; 64],
    anti_diag_ex: [u64; 64],
}

impl MaskTable {
    pub fn new() -> MaskTable {
        let mut mt = MaskTable {
            rank_ex: [0; 64],
            file_ex: [0; 64],
            diag_ex: [0; 64],
            anti_diag_ex: [0; 64],
        };

        for sq in squares() {
            mt.rank_ex[sq.index()] = ray(sq, Direction::East).or(ray(sq, Direction::West)).bits();
            mt.file_ex[sq.index()] = ray(sq, Direction::North)
                .or(ray(sq, Direction::South))
                .bits();
            mt.diag_ex[sq.index()] = ray(sq, Direction::NorthEast)
                .or(ray(sq, Direction::SouthWest))
                .bits();
            mt.anti_diag_ex[sq.index()] = ray(sq, Direction::NorthWest)
                .or(ray(sq, Direction::SouthEast))
                .bits();
        }
        mt
    }
}

/// Squares strictly between two aligned squares, and the full line through them. Used for
/// check evasion (blocking squares) and pin restriction.
struct BetweenTable {
    between: Vec<[SquareSet; 64]>,
    line: Vec<[SquareSet; 64]>,
}

impl BetweenTable {
    pub fn new() -> BetweenTable {
        let mut bt = BetweenTable {
            between: vec![[SquareSet::empty(); 64]; 64],
            line: vec![[SquareSet::empty(); 64]; 64],
        };

        let dirs = [
            Direction::North,
            Direction::NorthEast,
            Direction::East,
            Direction::SouthEast,
            Direction::South,
            Direction::SouthWest,
            Direction::West,
            Direction::NorthWest,
        ];

        for sq in squares() {
            for dir in dirs {
                let edge = edge_of(dir);
                if edge.contains(sq) {
                    continue;
                }

                let full = ray(sq, dir)
                    .or(ray(sq, dir.reverse()))
                    .or(SquareSet::single(sq));
                let mut seen = SquareSet::empty();
                let mut cursor = sq;
                loop {
                    cursor = cursor.towards(dir);
                    bt.between[sq.index()][cursor.index()] = seen;
                    bt.line[sq.index()][cursor.index()] = full;
                    seen.insert(cursor);
                    if edge.contains(cursor) {
                        break;
                    }
                }
            }
        }
        bt
    }
}

fn edge_of(dir: Direction) -> SquareSet {
    match dir {
        Direction::North => SS_RANK_8,
        Direction::NorthEast => SS_RANK_8.or(SS_FILE_H),
        Direction::East => SS_FILE_H,
        Direction::SouthEast => SS_RANK_1.or(SS_FILE_H),
        Direction::South => SS_RANK_1,
        Direction::SouthWest => SS_RANK_1.or(SS_FILE_A),
        Direction::West => SS_FILE_A,
        Direction::NorthWest => SS_RANK_8.or(SS_FILE_A),
    }
}

/// Casts a ray from the given square towards the edge of the board, excluding the square
/// itself.
fn ray(sq: Square, dir: Direction) -> SquareSet {
    let edge = edge_of(dir);
    let mut entry = SquareSet::empty();
    if edge.contains(sq) {
        return entry;
    }

    let mut cursor = sq;
    loop {
        cursor = cursor.towards(dir);
        entry.insert(cursor);
        if edge.contains(cursor) {
            break;
        }
    }
    entry
}

static KING_TABLE: LazyLock<KingTable> = LazyLock::new(KingTable::new);
static PAWN_TABLE: LazyLock<PawnTable> = LazyLock::new(PawnTable::new);
static KNIGHT_TABLE: LazyLock<KnightTable> = LazyLock::new(KnightTable::new);
static MASK_TABLE: LazyLock<MaskTable> = LazyLock::new(MaskTable::new);
static BETWEEN_TABLE: LazyLock<BetweenTable> = LazyLock::new(BetweenTable::new);

/// Mirrors a bitboard horizontally about the center files: file a maps to file h and vice
/// versa. This is the "reverse" operation for rank attacks, where a byte swap would be a
/// no-op.
const fn mirror_horizontal(mut x: u64) -> u64 {
    const K1: u64 = 0x5555555555555555;
    const K2: u64 = 0x3333333333333333;
    const K4: u64 = 0x0f0f0f0f0f0f0f0f;
    x = ((x >> 1) & K1) | ((x & K1) << 1);
    x = ((x >> 2) & K2) | ((x & K2) << 2);
    x = ((x >> 4) & K4) | ((x & K4) << 4);
    x
}

/// Hyperbola quintessence along a byte-swappable line (file, diagonal, or anti-diagonal).
fn swapped_line_attacks(occ: u64, sq: Square, mask_ex: u64) -> u64 {
    let slider = 1u64 << sq.as_u8();
    let mut forward = occ & mask_ex;
    let mut reverse = forward.swap_bytes();
    forward = forward.wrapping_sub(slider);
    reverse = reverse.wrapping_sub(slider.swap_bytes());
    forward ^= reverse.swap_bytes();
    forward & mask_ex
}

/// The same subtraction trick along a rank, with a per-byte bit mirror as the reverse.
fn rank_line_attacks(occ: u64, sq: Square, mask_ex: u64) -> u64 {
    let slider = 1u64 << sq.as_u8();
    let mut forward = occ & mask_ex;
    let mut reverse = mirror_horizontal(forward);
    forward = forward.wrapping_sub(slider);
    reverse = reverse.wrapping_sub(mirror_horizontal(slider));
    forward ^= mirror_horizontal(reverse);
    forward & mask_ex
}

pub fn pawn_attacks(sq: Square, color: Color) -> SquareSet {
    PAWN_TABLE.table[sq.index()][color.index()]
}

pub fn knight_attacks(sq: Square) -> SquareSet {
    KNIGHT_TABLE.table[sq.index()]
}

pub fn king_attacks(sq: Square) -> SquareSet {
    KING_TABLE.table[sq.index()]
}

pub fn bishop_attacks(sq: Square, occupancy: SquareSet) -> SquareSet {
    let occ = occupancy.bits();
    let diag = swapped_line_attacks(occ, sq, MASK_TABLE.diag_ex[sq.index()]);
    let anti = swapped_line_attacks(occ, sq, MASK_TABLE.anti_diag_ex[sq.index()]);
    SquareSet::from_bits(diag | anti)
}

pub fn rook_attacks(sq: Square, occupancy: SquareSet) -> SquareSet {
    let occ = occupancy.bits();
    let file = swapped_line_attacks(occ, sq, MASK_TABLE.file_ex[sq.index()]);
    let rank = rank_line_attacks(occ, sq, MASK_TABLE.rank_ex[sq.index()]);
    SquareSet::from_bits(file | rank)
}

pub fn queen_attacks(sq: Square, occupancy: SquareSet) -> SquareSet {
    bishop_attacks(sq, occupancy) | rook_attacks(sq, occupancy)
}

pub fn attacks(kind: PieceKind, color: Color, sq: Square, occupancy: SquareSet) -> SquareSet {
    match kind {
        PieceKind::Pawn => pawn_attacks(sq, color),
        PieceKind::Knight => knight_attacks(sq),
        PieceKind::Bishop => bishop_attacks(sq, occupancy),
        PieceKind::Rook => rook_attacks(sq, occupancy),
        PieceKind::Queen => queen_attacks(sq, occupancy),
        PieceKind::King => king_attacks(sq),
    }
}

/// Squares strictly between two squares, or the empty set when they do not share a rank,
/// file, or diagonal.
pub fn between(a: Square, b: Square) -> SquareSet {
    BETWEEN_TABLE.between[a.index()][b.index()]
}

/// The full line (edge to edge, endpoints included) through two squares, or the empty set
/// when they are not aligned.
pub fn line_through(a: Square, b: Square) -> SquareSet {
    BETWEEN_TABLE.line[a.index()][b.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn king_corner() {
        let attacks = king_attacks(A1);
        assert_eq!(attacks.len(), 3);
        assert!(attacks.contains(A2));
        assert!(attacks.contains(B1));
        assert!(attacks.contains(B2));
    }

    #[test]
    fn knight_corner() {
        let attacks = knight_attacks(H8);
        assert_eq!(attacks.len(), 2);
        assert!(attacks.contains(F7));
        assert!(attacks.contains(G6));
    }

    #[test]
    fn pawn_edge_files() {
        assert_eq!(pawn_attacks(A2, Color::White).len(), 1);
        assert!(pawn_attacks(A2, Color::White).contains(B3));
        assert!(pawn_attacks(D5, Color::Black).contains(C4));
        assert!(pawn_attacks(D5, Color::Black).contains(E4));
    }

    #[test]
    fn rook_empty_board() {
        let attacks = rook_attacks(A1, SquareSet::empty());
        assert_eq!(attacks.len(), 14);
        assert!(attacks.contains(A8));
        assert!(attacks.contains(H1));
        assert!(!attacks.contains(A1));
    }

    #[test]
    fn rook_blocked() {
        let mut occ = SquareSet::empty();
        occ.insert(D4);
        occ.insert(D6);
        occ.insert(F4);
        let attacks = rook_attacks(D4, occ);
        // Up the file: stops at (and includes) the blocker on d6.
        assert!(attacks.contains(D5));
        assert!(attacks.contains(D6));
        assert!(!attacks.contains(D7));
        // Along the rank: stops at the blocker on f4.
        assert!(attacks.contains(E4));
        assert!(attacks.contains(F4));
        assert!(!attacks.contains(G4));
        // Down and left are open to the edge.
        assert!(attacks.contains(D1));
        assert!(attacks.contains(A4));
    }

    #[test]
    fn bishop_blocked() {
        let mut occ = SquareSet::empty();
        occ.insert(C1);
        occ.insert(F4);
        let attacks = bishop_attacks(D2, occ);
        // Blockers are included; squares beyond them are not.
        assert!(attacks.contains(C1));
        assert!(attacks.contains(E3));
        assert!(attacks.contains(F4));
        assert!(!attacks.contains(G5));
        assert!(!attacks.contains(H6));
        // The north-west and south-east rays are open.
        assert!(attacks.contains(C3));
        assert!(attacks.contains(B4));
        assert!(attacks.contains(A5));
        assert!(attacks.contains(E1));
        assert!(!attacks.contains(D2));
    }

    #[test]
    fn queen_center() {
        let attacks = queen_attacks(D4, SquareSet::empty());
        assert_eq!(attacks.len(), 27);
    }

    #[test]
    fn between_aligned() {
        assert_eq!(between(A1, A4), SquareSet::single(A2) | SquareSet::single(A3));
        assert_eq!(between(A1, H8).len(), 6);
        assert!(between(A1, H8).contains(D4));
        assert!(between(A1, B3).is_empty());
        assert!(between(E4, E5).is_empty());
    }

    #[test]
    fn line_through_aligned() {
        let line = line_through(D4, D7);
        assert_eq!(line, SquareSet::all().file(FILE_D));
        assert!(line_through(A1, B3).is_empty());
        let diag = line_through(C3, E5);
        assert!(diag.contains(A1));
        assert!(diag.contains(H8));
    }
}
