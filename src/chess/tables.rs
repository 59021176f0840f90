//! Precomputed lookup tables shared by every position
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryFrom;
use std::fmt;
use super::*;
use bitboard::{knight_attacks, king_attacks, pawn_attacks};
use position::zobrist::ZobristKeys;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Immutable per-square attack tables and Zobrist keys.
///
/// Built once and shared (usually behind an `Arc`) by every position derived from the same root.
/// The keys come from a fixed seed, so two independently built tables are identical and produce
/// identical fingerprints.
#[derive(Clone, PartialEq, Eq)]
pub struct Tables {
    knight: [Bitboard; Square::COUNT],
    king: [Bitboard; Square::COUNT],
    pawn: [[Bitboard; Square::COUNT]; Color::COUNT],
    keys: ZobristKeys,
}

impl Tables {
    /// Builds the tables
    pub fn new() -> Tables {
        let mut tables = Tables {
            knight: [Bitboard::EMPTY; Square::COUNT],
            king: [Bitboard::EMPTY; Square::COUNT],
            pawn: [[Bitboard::EMPTY; Square::COUNT]; Color::COUNT],
            keys: ZobristKeys::new(),
        };

        for i in 0..Square::COUNT {
            let sq = Bitboard::from(Square::try_from(i).expect("INFALLIBLE"));
            tables.knight[i] = knight_attacks(sq);
            tables.king[i] = king_attacks(sq);
            tables.pawn[Color::White as usize][i] = pawn_attacks(Color::White, sq);
            tables.pawn[Color::Black as usize][i] = pawn_attacks(Color::Black, sq);
        }

        tables
    }

    /// Squares a knight on `sq` attacks
    pub fn knight(&self, sq: Square) -> Bitboard {
        self.knight[sq as usize]
    }

    /// Squares a king on `sq` attacks
    pub fn king(&self, sq: Square) -> Bitboard {
        self.king[sq as usize]
    }

    /// Squares a pawn of color `c` on `sq` attacks
    pub fn pawn(&self, c: Color, sq: Square) -> Bitboard {
        self.pawn[c as usize][sq as usize]
    }

    /// The Zobrist keys
    pub fn keys(&self) -> &ZobristKeys {
        &self.keys
    }
}

impl Default for Tables {
    fn default() -> Self {
        Tables::new()
    }
}

impl fmt::Debug for Tables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Tables { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_match_the_attack_functions() {
        let tables = Tables::new();
        assert_eq!(tables.knight(Square::G1), knight_attacks(Square::G1.into()));
        assert_eq!(tables.king(Square::E8).len(), 5);
        assert_eq!(tables.pawn(Color::White, Square::E4).len(), 2);
        assert!(tables.pawn(Color::Black, Square::E4).contains(Square::D3));
    }

    #[test]
    fn tables_are_deterministic() {
        assert!(Tables::new() == Tables::new());
    }
}
