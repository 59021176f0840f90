//! Contains the packed move representation
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
use std::num::NonZeroU32;
use super::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Which piece to promote to for a promotion move
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Promotion {
    ToKnight = 0,
    ToBishop = 1,
    ToRook = 2,
    ToQueen = 3,
}

impl Promotion {
    /// Every promotion choice, strongest first
    pub const ALL: [Promotion; 4] = [
        Promotion::ToQueen, Promotion::ToRook, Promotion::ToBishop, Promotion::ToKnight,
    ];

    fn from_bits(bits: u32) -> Promotion {
        match bits & 3 {
            0 => Promotion::ToKnight,
            1 => Promotion::ToBishop,
            2 => Promotion::ToRook,
            _ => Promotion::ToQueen,
        }
    }
}

impl Default for Promotion {
    fn default() -> Self {
        Promotion::ToQueen
    }
}

impl From<Promotion> for Piece {
    fn from(prom: Promotion) -> Self {
        match prom {
            Promotion::ToKnight => Piece::Knight,
            Promotion::ToBishop => Piece::Bishop,
            Promotion::ToRook => Piece::Rook,
            Promotion::ToQueen => Piece::Queen,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The special flag stored in a move
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveKind {
    /// A quiet move or a plain capture, including a two-square pawn advance
    Normal = 0,
    /// A pawn promotion, with or without a capture
    Promotion = 1,
    /// An en-passant capture
    EnPassant = 2,
    /// Castling, encoded as the king capturing its own rook
    Castle = 3,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A move packed into 32 bits.
///
/// | bits  | field                                    |
/// |-------|------------------------------------------|
/// | 0-5   | origin square                            |
/// | 6-11  | destination square                       |
/// | 12-13 | promotion choice                         |
/// | 14-15 | `MoveKind`                               |
/// | 16-18 | moving piece                             |
/// | 19-21 | captured piece, or 6 if nothing captured |
///
/// Castling moves have the king's square as origin and the rook's square as destination, with
/// `Piece::Rook` as the captured piece. A move carries everything needed to apply and revert it
/// except for the castling and en-passant rights, which the position saves separately.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move(NonZeroU32);

const NO_CAPTURE: u32 = 6;

impl Move {
    fn pack(
        orig: Square,
        dest: Square,
        promotion: Promotion,
        kind: MoveKind,
        piece: Piece,
        captured: Option<Piece>,
    ) -> Move {
        let captured = captured.map_or(NO_CAPTURE, |p| p as u32);
        let bits = orig as u32
            | (dest as u32) << 6
            | (promotion as u32) << 12
            | (kind as u32) << 14
            | (piece as u32) << 16
            | captured << 19;

        // the capture field is never zero unless a pawn is captured, and a capture always has
        // distinct origin and destination squares
        Move(NonZeroU32::new(bits).expect("INFALLIBLE"))
    }

    /// A quiet move or capture
    pub fn new(orig: Square, dest: Square, piece: Piece, captured: Option<Piece>) -> Move {
        Move::pack(orig, dest, Promotion::ToKnight, MoveKind::Normal, piece, captured)
    }

    /// A pawn promotion
    pub fn promotion(orig: Square, dest: Square, captured: Option<Piece>, to: Promotion) -> Move {
        Move::pack(orig, dest, to, MoveKind::Promotion, Piece::Pawn, captured)
    }

    /// An en-passant capture, where `dest` is the empty square the pawn moves to
    pub fn en_passant(orig: Square, dest: Square) -> Move {
        Move::pack(orig, dest, Promotion::ToKnight, MoveKind::EnPassant, Piece::Pawn,
            Some(Piece::Pawn))
    }

    /// Castling, given the king's and the rook's squares
    pub fn castle(king: Square, rook: Square) -> Move {
        Move::pack(king, rook, Promotion::ToKnight, MoveKind::Castle, Piece::King,
            Some(Piece::Rook))
    }

    /// A move that passes the turn.
    ///
    /// Never legal, but used by the search for null-move pruning.
    pub fn null() -> Move {
        Move::pack(Square::A1, Square::A1, Promotion::ToKnight, MoveKind::Normal, Piece::King, None)
    }

    /// Returns the raw encoding
    pub fn bits(self) -> u32 {
        self.0.get()
    }

    /// Rebuilds a move from its raw encoding. Returns `None` for zero.
    pub fn from_bits(bits: u32) -> Option<Move> {
        NonZeroU32::new(bits).map(Move)
    }

    /// Returns the square the moving piece starts on
    pub fn origin(self) -> Square {
        Square::try_from((self.bits() & 0o77) as usize).expect("INFALLIBLE")
    }

    /// Returns the destination square (the rook's square for castling)
    pub fn destination(self) -> Square {
        Square::try_from((self.bits() >> 6 & 0o77) as usize).expect("INFALLIBLE")
    }

    /// Returns the move's special flag
    pub fn kind(self) -> MoveKind {
        match self.bits() >> 14 & 3 {
            0 => MoveKind::Normal,
            1 => MoveKind::Promotion,
            2 => MoveKind::EnPassant,
            _ => MoveKind::Castle,
        }
    }

    /// Returns the piece being moved
    pub fn piece(self) -> Piece {
        Piece::try_from((self.bits() >> 16 & 7) as usize)
            .unwrap_or_else(|_| panic!("invalid piece in move {:#x}", self.bits()))
    }

    /// Returns the captured piece, if any. Castling reports the rook.
    pub fn captured(self) -> Option<Piece> {
        match self.bits() >> 19 & 7 {
            NO_CAPTURE => None,
            bits => Some(Piece::try_from(bits as usize)
                .unwrap_or_else(|_| panic!("invalid capture in move {:#x}", self.bits()))),
        }
    }

    /// Returns the promotion choice, if this is a promotion
    pub fn promotion_piece(self) -> Option<Promotion> {
        if self.kind() == MoveKind::Promotion {
            Some(Promotion::from_bits(self.bits() >> 12))
        } else {
            None
        }
    }

    /// Returns `true` if an opponent's piece is captured
    pub fn is_capture(self) -> bool {
        self.kind() != MoveKind::Castle && self.captured().is_some()
    }

    /// Returns `true` for captures and promotions
    pub fn is_tactical(self) -> bool {
        self.is_capture() || self.kind() == MoveKind::Promotion
    }

    /// Returns `true` for the null move
    pub fn is_null(self) -> bool {
        self.origin() == self.destination()
    }

    /// Returns the square the king lands on, for a castling move
    pub fn castle_king_destination(self) -> Square {
        let file = if self.destination().file() > self.origin().file() { File::G } else { File::C };
        Square::from_coord(file, self.origin().rank())
    }

    /// Returns the square the rook lands on, for a castling move
    pub fn castle_rook_destination(self) -> Square {
        let file = if self.destination().file() > self.origin().file() { File::F } else { File::D };
        Square::from_coord(file, self.origin().rank())
    }
}

impl fmt::Display for Move {
    /// Writes the move in long algebraic notation, as used by UCI (e.g. `e2e4`, `e7e8q`). Castling
    /// is written as the king's two-square move.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return "0000".fmt(f);
        }

        let dest = match self.kind() {
            MoveKind::Castle => self.castle_king_destination(),
            _ => self.destination(),
        };
        let promotion = match self.promotion_piece() {
            Some(prom) => Piece::from(prom).to_char(Color::Black).to_string(),
            None => String::new(),
        };

        format!("{}{}{}", self.origin(), dest, promotion).fmt(f)
    }
}
