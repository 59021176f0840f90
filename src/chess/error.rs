//! Defines the error types needed by the chess module
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Error type used by methods in the `chess` module
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// Empty FEN string
    Empty,
    /// Cannot parse the board field of a FEN string
    ParseBoard,
    /// Cannot parse the side to move
    ParseTurn,
    /// Cannot parse the castling flags
    ParseCastling,
    /// Cannot parse the en-passant square
    ParseEnPassant,
    /// Cannot parse the half-move clock
    ParseHalfMoveClock,
    /// Cannot parse the full-move number
    ParseMoveNumber,
    /// Missing king or multiple kings of the same color
    KingCount,
    /// Pawn on first or last rank
    InvalidPawnRank,
    /// Player can capture opponent's king
    KingCapturable,
    /// En-passant square is occupied or has no capturable pawn
    EnPassantPawn,
    /// Castling flags aren't valid for this position
    InvalidCastling,
    /// Cannot parse a color
    ParseColor,
    /// Cannot parse a piece
    ParsePiece,
    /// Cannot parse a square, file or rank
    ParseSquare,
    /// Cannot parse a move
    ParseMove,
    /// Illegal move
    IllegalMove,
    /// Ambiguous move
    AmbiguousMove,
    /// Failed to convert an integer to an another type
    TryFromIntError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;

        match self {
            Empty => "empty position string",
            ParseBoard => "cannot parse board",
            ParseTurn => "cannot parse side to move",
            ParseCastling => "cannot parse castling flags",
            ParseEnPassant => "cannot parse en-passant square",
            ParseHalfMoveClock => "cannot parse half-move clock",
            ParseMoveNumber => "cannot parse move number",
            KingCount => "missing king or multiple kings of the same color",
            InvalidPawnRank => "pawn on first or last rank",
            KingCapturable => "king is under attack on opponent's move",
            EnPassantPawn => "en-passant square without capturable pawn",
            InvalidCastling => "castling flags aren't valid for this position",
            ParseColor => "cannot parse color",
            ParsePiece => "cannot parse piece",
            ParseSquare => "cannot parse square",
            ParseMove => "cannot parse move",
            IllegalMove => "illegal move",
            AmbiguousMove => "ambiguous move",
            TryFromIntError => "integer out of range",
        }.fmt(f)
    }
}

impl std::error::Error for Error { }

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Result type used by methods in the `chess` module
pub type Result<T> = std::result::Result<T, Error>;
