//! Contains structure and data for Zobrist hash keys
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use super::*;

const SEED: u64 = 0x4368_6573_7369_6e67;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The random keys XOR-folded into a `Zobrist` fingerprint
#[derive(Clone, PartialEq, Eq)]
pub struct ZobristKeys {
    pieces: [[[u64; Square::COUNT]; Piece::COUNT]; Color::COUNT],
    black_to_move: u64,
    ep_file: [u64; File::COUNT],
    castling: [u64; CastlingRights::COUNT],
}

impl ZobristKeys {
    /// Generates the keys from a fixed seed
    pub fn new() -> ZobristKeys {
        let mut rng = StdRng::seed_from_u64(SEED);
        let mut keys = ZobristKeys {
            pieces: [[[0; Square::COUNT]; Piece::COUNT]; Color::COUNT],
            black_to_move: 0,
            ep_file: [0; File::COUNT],
            castling: [0; CastlingRights::COUNT],
        };

        for side in keys.pieces.iter_mut() {
            for piece in side.iter_mut() {
                for key in piece.iter_mut() {
                    *key = rng.gen();
                }
            }
        }
        keys.black_to_move = rng.gen();
        for key in keys.ep_file.iter_mut().chain(keys.castling.iter_mut()) {
            *key = rng.gen();
        }

        keys
    }
}

impl fmt::Debug for ZobristKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ZobristKeys { .. }")
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A 64-bit hash key generated from a position
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Zobrist(u64);

impl Zobrist {
    /// Creates a new zobrist key
    pub fn new() -> Zobrist {
        Zobrist(0)
    }

    /// Toggles piece placement
    pub fn toggle_piece(&mut self, keys: &ZobristKeys, c: Color, p: Piece, sq: Square) {
        self.0 ^= keys.pieces[c as usize][p as usize][sq as usize];
    }

    /// Toggles the en-passant file, given as a file mask with zero or one bit set
    pub fn toggle_ep_file(&mut self, keys: &ZobristKeys, ep_file: u8) {
        if ep_file != 0 {
            self.0 ^= keys.ep_file[ep_file.trailing_zeros() as usize];
        }
    }

    /// Toggles each castling flag that is set in `rights`
    pub fn toggle_castling(&mut self, keys: &ZobristKeys, rights: CastlingRights) {
        for bit in 0..CastlingRights::COUNT {
            if u8::from(rights) & (1 << bit) != 0 {
                self.0 ^= keys.castling[bit];
            }
        }
    }

    /// Toggles whose turn it is
    pub fn toggle_turn(&mut self, keys: &ZobristKeys) {
        self.0 ^= keys.black_to_move;
    }
}

impl fmt::Display for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<Zobrist> for u64 {
    /// Allows using the key to get a hash table index
    ///
    /// # Example
    /// ```rust
    /// use chessington::chess::Position;
    ///
    /// let pos = Position::new();
    /// let hash_table_size: usize = 0x10_0000;
    /// let index = u64::from(pos.zobrist_key()) as usize & (hash_table_size - 1);
    /// ```
    fn from(key: Zobrist) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_are_self_inverse() {
        let keys = ZobristKeys::new();
        let mut z = Zobrist::new();

        z.toggle_piece(&keys, Color::White, Piece::Knight, Square::G1);
        z.toggle_turn(&keys);
        z.toggle_ep_file(&keys, 1 << 4);
        z.toggle_castling(&keys, CastlingRights::ALL);
        assert_ne!(z, Zobrist::new());

        z.toggle_castling(&keys, CastlingRights::ALL);
        z.toggle_ep_file(&keys, 1 << 4);
        z.toggle_turn(&keys);
        z.toggle_piece(&keys, Color::White, Piece::Knight, Square::G1);
        assert_eq!(z, Zobrist::new());
    }

    #[test]
    fn no_en_passant_file_toggles_nothing() {
        let keys = ZobristKeys::new();
        let mut z = Zobrist::new();
        z.toggle_ep_file(&keys, 0);
        assert_eq!(z, Zobrist::new());
    }

    #[test]
    fn keys_are_distinct() {
        let keys = ZobristKeys::new();
        assert_ne!(keys.pieces[0][0][8], keys.pieces[1][0][8]);
        assert_ne!(keys.ep_file[0], keys.ep_file[1]);
        assert_ne!(keys.castling[0], keys.castling[3]);
    }
}
