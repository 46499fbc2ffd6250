// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Zobrist hashing of positions.
//!
//! Every feature of a position (piece on a square, the castling-rights nibble, the
//! en-passant file, the side to move) gets a random 64-bit mask; the position hash is the
//! XOR of the masks for the features present. Make/unmake keeps the hash current by XORing
//! only the masks of the features that changed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::core::{CastleStatus, Color, File, Piece, Square};

struct ZobristKeys {
    /// One key per (piece, square): 12 pieces laid out white-then-black within each kind
    /// pairing, indexed by the piece wire code minus 2.
    pieces: [[u64; 64]; 12],
    /// One key per castling-rights nibble.
    castling: [u64; 16],
    /// One key per en-passant file. The file alone participates in the hash; the rank is
    /// implied by the side to move.
    en_passant_file: [u64; 8],
    /// XORed in when black is to move.
    side_to_move: u64,
}

impl ZobristKeys {
    fn new(seed: u64) -> ZobristKeys {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut pieces = [[0u64; 64]; 12];
        for square_keys in pieces.iter_mut() {
            for key in square_keys.iter_mut() {
                *key = rng.gen();
            }
        }

        let mut castling = [0u64; 16];
        for key in castling.iter_mut() {
            *key = rng.gen();
        }

        let mut en_passant_file = [0u64; 8];
        for key in en_passant_file.iter_mut() {
            *key = rng.gen();
        }

        ZobristKeys {
            pieces,
            castling,
            en_passant_file,
            side_to_move: rng.gen(),
        }
    }

    fn piece_key(&self, piece: Piece, square: Square) -> u64 {
        self.pieces[piece.code() as usize - 2][square.index()]
    }
}

const ZOBRIST_SEED: u64 = 0xd635e1ca5c8bc6f1;

lazy_static::lazy_static! {
    static ref KEYS: ZobristKeys = ZobristKeys::new(ZOBRIST_SEED);
}

/// Toggles a piece on a square in and out of the hash.
pub fn modify_piece(hash: &mut u64, square: Square, piece: Piece) {
    *hash ^= KEYS.piece_key(piece, square);
}

pub fn modify_side_to_move(hash: &mut u64) {
    *hash ^= KEYS.side_to_move;
}

/// Swaps one castling-rights nibble for another. A no-op when the rights did not change.
pub fn modify_castling(hash: &mut u64, old: CastleStatus, new: CastleStatus) {
    if old != new {
        *hash ^= KEYS.castling[old.bits() as usize];
        *hash ^= KEYS.castling[new.bits() as usize];
    }
}

/// Swaps one en-passant file for another (`None` meaning no en-passant square).
pub fn modify_en_passant(hash: &mut u64, old: Option<File>, new: Option<File>) {
    if old == new {
        return;
    }
    if let Some(file) = old {
        *hash ^= KEYS.en_passant_file[file.as_u8() as usize];
    }
    if let Some(file) = new {
        *hash ^= KEYS.en_passant_file[file.as_u8() as usize];
    }
}

/// Computes a position hash from scratch. Used to seed the hash at position setup and, in
/// tests, to check that the incremental updates in make/unmake stay truthful.
pub fn full_hash(
    pieces: impl Iterator<Item = (Square, Piece)>,
    castling: CastleStatus,
    en_passant_file: Option<File>,
    side_to_move: Color,
) -> u64 {
    let mut hash = 0u64;
    for (square, piece) in pieces {
        hash ^= KEYS.piece_key(piece, square);
    }

    hash ^= KEYS.castling[castling.bits() as usize];
    if let Some(file) = en_passant_file {
        hash ^= KEYS.en_passant_file[file.as_u8() as usize];
    }
    if side_to_move == Color::Black {
        hash ^= KEYS.side_to_move;
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PieceKind, E4, FILE_C, FILE_D};

    #[test]
    fn modify_piece_is_involution() {
        let piece = Piece::new(Color::White, PieceKind::Knight);
        let mut hash = 0xdeadbeef;
        modify_piece(&mut hash, E4, piece);
        assert_ne!(hash, 0xdeadbeef);
        modify_piece(&mut hash, E4, piece);
        assert_eq!(hash, 0xdeadbeef);
    }

    #[test]
    fn castling_noop_when_unchanged() {
        let mut hash = 42;
        modify_castling(&mut hash, CastleStatus::WHITE, CastleStatus::WHITE);
        assert_eq!(hash, 42);
        modify_castling(&mut hash, CastleStatus::WHITE, CastleStatus::WHITE_KINGSIDE);
        assert_ne!(hash, 42);
    }

    #[test]
    fn en_passant_file_swap() {
        let mut hash = 0;
        modify_en_passant(&mut hash, None, Some(FILE_C));
        let with_c = hash;
        modify_en_passant(&mut hash, Some(FILE_C), Some(FILE_D));
        assert_ne!(hash, with_c);
        modify_en_passant(&mut hash, Some(FILE_D), None);
        assert_eq!(hash, 0);
    }

    #[test]
    fn side_to_move_toggles() {
        let mut hash = 0;
        modify_side_to_move(&mut hash);
        assert_ne!(hash, 0);
        modify_side_to_move(&mut hash);
        assert_eq!(hash, 0);
    }
}
