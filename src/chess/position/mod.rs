//! Contains structures related to the `Position`
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
use std::ops;
use std::sync::Arc;
use super::*;

use bitboard::*;

use Color::*;
use Piece::*;

pub mod zobrist;
pub mod movegen;
mod make;
mod fen;

use zobrist::Zobrist;

/// The FEN string for the standard starting position
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The four castling flags, one bit per side and wing
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    /// The number of distinct flags
    pub const COUNT: usize = 4;

    /// No castling rights at all
    pub const NONE: CastlingRights = CastlingRights(0);

    /// White may castle on the king's side
    pub const WHITE_KING_SIDE: CastlingRights = CastlingRights(0x1);

    /// White may castle on the queen's side
    pub const WHITE_QUEEN_SIDE: CastlingRights = CastlingRights(0x2);

    /// Black may castle on the king's side
    pub const BLACK_KING_SIDE: CastlingRights = CastlingRights(0x4);

    /// Black may castle on the queen's side
    pub const BLACK_QUEEN_SIDE: CastlingRights = CastlingRights(0x8);

    /// Every castling right
    pub const ALL: CastlingRights = CastlingRights(0xf);

    /// The king-side flag for color `c`
    pub fn king_side(c: Color) -> CastlingRights {
        match c {
            White => Self::WHITE_KING_SIDE,
            Black => Self::BLACK_KING_SIDE,
        }
    }

    /// The queen-side flag for color `c`
    pub fn queen_side(c: Color) -> CastlingRights {
        match c {
            White => Self::WHITE_QUEEN_SIDE,
            Black => Self::BLACK_QUEEN_SIDE,
        }
    }

    /// Returns `true` if every flag in `other` is also set in `self`
    pub fn contains(self, other: CastlingRights) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no flag is set
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Sets every flag in `other`
    pub fn insert(&mut self, other: CastlingRights) {
        self.0 |= other.0;
    }

    /// Clears every flag in `other`
    pub fn remove(&mut self, other: CastlingRights) {
        self.0 &= !other.0;
    }

    /// The flag, king square and rook square for each of the four rights
    fn squares() -> [(CastlingRights, Color, Square, Square); CastlingRights::COUNT] {
        [
            (Self::WHITE_KING_SIDE, White, Square::E1, Square::H1),
            (Self::WHITE_QUEEN_SIDE, White, Square::E1, Square::A1),
            (Self::BLACK_KING_SIDE, Black, Square::E8, Square::H8),
            (Self::BLACK_QUEEN_SIDE, Black, Square::E8, Square::A8),
        ]
    }
}

impl ops::BitXor for CastlingRights {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        CastlingRights(self.0 ^ rhs.0)
    }
}

impl fmt::Display for CastlingRights {
    /// Writes the flags as they appear in a FEN string
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return "-".fmt(f);
        }

        let mut s = String::new();
        for (flag, c) in [
            (Self::WHITE_KING_SIDE, 'K'),
            (Self::WHITE_QUEEN_SIDE, 'Q'),
            (Self::BLACK_KING_SIDE, 'k'),
            (Self::BLACK_QUEEN_SIDE, 'q'),
        ].iter() {
            if self.contains(*flag) {
                s.push(*c);
            }
        }
        s.fmt(f)
    }
}

impl From<CastlingRights> for u8 {
    fn from(rights: CastlingRights) -> Self {
        rights.0
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// What `unmake_move` needs to restore the state before a move
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Undo {
    mv: Move,
    ep_file: u8,
    castling: CastlingRights,
    draw_plies: usize,
    zobrist: Zobrist,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A representation of the arrangement of pieces on the board at a given point in the game, as well
/// as castling availability and en passant legality.
///
/// Moves are applied in place with `make_move` and reverted with `unmake_move`, in strict stack
/// order. Clone the position to get an independent copy.
#[derive(Debug, Clone)]
pub struct Position {
    tables: Arc<Tables>,
    pieces: [Bitboard; Piece::COUNT],
    sides: [Bitboard; Color::COUNT],
    turn: Color,
    castling: CastlingRights,
    ep_file: u8,
    zobrist: Zobrist,

    draw_plies: usize,
    move_num: usize,
    history: Vec<Undo>,
}

impl Position {
    /// Returns the standard starting Position
    pub fn new() -> Position {
        Position::with_tables(Arc::new(Tables::new()))
    }

    /// Returns the standard starting position, sharing existing lookup tables
    pub fn with_tables(tables: Arc<Tables>) -> Position {
        Position::from_fen_with_tables(STARTING_FEN, tables).expect("INFALLIBLE")
    }

    /// Returns a position with an empty board
    fn empty_board(tables: Arc<Tables>) -> Position {
        Position {
            tables,
            pieces: [Bitboard::EMPTY; Piece::COUNT],
            sides: [Bitboard::EMPTY; Color::COUNT],
            turn: White,
            castling: CastlingRights::NONE,
            ep_file: 0,
            zobrist: Zobrist::new(),
            draw_plies: 0,
            move_num: 1,
            history: Vec::new(),
        }
    }

    /// Returns the lookup tables used by this position
    pub fn tables(&self) -> &Arc<Tables> {
        &self.tables
    }

    /// Returns the color whose turn it is
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Returns the squares holding pieces of type `p` and color `c`
    pub fn pieces(&self, c: Color, p: Piece) -> Bitboard {
        self.pieces[p as usize] & self.sides[c as usize]
    }

    /// Returns the squares holding pieces of type `p` of either color
    pub fn pieces_of_kind(&self, p: Piece) -> Bitboard {
        self.pieces[p as usize]
    }

    /// Returns the squares holding pieces of color `c`
    pub fn side(&self, c: Color) -> Bitboard {
        self.sides[c as usize]
    }

    /// Returns every occupied square
    pub fn occupied(&self) -> Bitboard {
        self.sides[White as usize] | self.sides[Black as usize]
    }

    /// Returns every empty square
    pub fn empty(&self) -> Bitboard {
        !self.occupied()
    }

    /// Returns the castling rights still held
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    /// Returns the file on which an en-passant capture is possible, as a mask with zero or one
    /// bit set
    pub fn ep_file(&self) -> u8 {
        self.ep_file
    }

    /// Returns the square a pawn would move to when capturing en passant, if any
    pub fn ep_square(&self) -> Option<Square> {
        if self.ep_file == 0 {
            return None;
        }

        let file = File::try_from(self.ep_file.trailing_zeros() as usize).expect("INFALLIBLE");
        let rank = match self.turn {
            White => Rank::R6,
            Black => Rank::R3,
        };
        Some(Square::from_coord(file, rank))
    }

    /// Returns the number of plies which count toward the fifty move rule
    pub fn draw_plies(&self) -> usize {
        self.draw_plies
    }

    /// Returns the full-move number
    pub fn move_num(&self) -> usize {
        self.move_num
    }

    /// Returns the number of moves that can currently be undone
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    /// Returns the most recent move, if any
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|undo| undo.mv)
    }

    /// Return the position's Zobrist key
    pub fn zobrist_key(&self) -> Zobrist {
        self.zobrist
    }

    /// Returns the square where the king of the given color is located
    pub fn king_square(&self, c: Color) -> Square {
        self.pieces(c, King).peek().expect("INFALLIBLE")
    }

    /// Returns the color and type of piece, if any, at the given location
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        let color = if self.sides[White as usize].contains(sq) {
            White
        } else if self.sides[Black as usize].contains(sq) {
            Black
        } else {
            return None;
        };

        for &p in Piece::ALL.iter() {
            if self.pieces[p as usize].contains(sq) {
                return Some((color, p));
            }
        }
        unreachable!("{} is occupied by {} but holds no piece", sq, color)
    }

    /// Returns the pieces of color `by` that attack `sq`, treating `occupied` as the blockers.
    ///
    /// This is the "super-piece" query: every piece type's attack pattern is cast from `sq` and
    /// intersected with the matching enemy pieces.
    pub fn attackers(&self, sq: Square, by: Color, occupied: Bitboard) -> Bitboard {
        let origin = Bitboard::from(sq);
        let empty = !occupied;
        let queens = self.pieces(by, Queen);

        (self.tables.knight(sq) & self.pieces(by, Knight))
            | (self.tables.king(sq) & self.pieces(by, King))
            | (self.tables.pawn(!by, sq) & self.pieces(by, Pawn))
            | (rook_attacks(origin, empty) & (self.pieces(by, Rook) | queens))
            | (bishop_attacks(origin, empty) & (self.pieces(by, Bishop) | queens))
    }

    /// Returns `true` if `sq` is attacked by a piece of color `by`
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        !self.attackers(sq, by, self.occupied()).is_empty()
    }

    /// Returns the enemy pieces giving check to the side to move
    pub fn checkers(&self) -> Bitboard {
        self.attackers(self.king_square(self.turn), !self.turn, self.occupied())
    }

    /// Returns `true` if the color to move is in check.
    pub fn in_check(&self) -> bool {
        !self.checkers().is_empty()
    }

    /// Returns `true` if a draw by the fifty move rule can be claimed (assuming the game isn't
    /// already over)
    pub fn fifty_moves(&self) -> bool {
        self.draw_plies >= 100
    }

    /// Returns `true` if the current position has occurred at least twice before, within the
    /// moves that can still be undone and since the last capture or pawn move.
    pub fn is_threefold(&self) -> bool {
        let window = self.draw_plies.min(self.history.len());
        let mut count = 0;

        // the same side is to move an even number of plies back
        for undo in self.history.iter().rev().take(window).skip(1).step_by(2) {
            if undo.zobrist == self.zobrist {
                count += 1;
                if count >= 2 {
                    return true;
                }
            }
        }

        false
    }

    /// Returns `true` if the side to move has any piece other than pawns and the king
    pub fn has_non_pawn_material(&self, c: Color) -> bool {
        !(self.side(c) & !(self.pieces[Pawn as usize] | self.pieces[King as usize])).is_empty()
    }

    /// Calculate the positions's Zobrist key from scratch
    fn calc_zobrist(&mut self) {
        let keys = self.tables.keys();
        let mut zobrist = Zobrist::new();

        if self.turn == Black {
            zobrist.toggle_turn(keys);
        }
        zobrist.toggle_ep_file(keys, self.ep_file);
        zobrist.toggle_castling(keys, self.castling);

        for &c in Color::ALL.iter() {
            for &p in Piece::ALL.iter() {
                for sq in self.pieces(c, p) {
                    zobrist.toggle_piece(keys, c, p, sq);
                }
            }
        }

        self.zobrist = zobrist;
    }
}

impl Default for Position {
    /// Returns the standard starting Position
    fn default() -> Self {
        Position::new()
    }
}

impl PartialEq for Position {
    /// Two positions are equal if every part of their state matches. The lookup tables are
    /// deterministic and are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.pieces == other.pieces
            && self.sides == other.sides
            && self.turn == other.turn
            && self.castling == other.castling
            && self.ep_file == other.ep_file
            && self.zobrist == other.zobrist
            && self.draw_plies == other.draw_plies
            && self.move_num == other.move_num
            && self.history == other.history
    }
}

impl Eq for Position { }
