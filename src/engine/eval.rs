//! Scores and static evaluation of a position.
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::ops;
use crate::chess::{Color, Piece, Square, Position};

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A score in centipawns, relative to the side to move.
///
/// Scores at the extremes encode forced mates: `mates_in(n)` is a mate delivered `n` plies from
/// the root of the search.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(i16);

impl Score {
    /// The furthest mate, in plies, that a score can represent
    pub const MAX_MATE_PLY: usize = 1_000;

    /// Returns the greatest possible score
    pub fn infinity() -> Self {
        Score(10_000)
    }
    /// Returns the score for a draw
    pub fn draw() -> Self {
        Score(0)
    }
    /// Returns the score for checkmating in `n` plies
    pub fn mates_in(n: usize) -> Self {
        Score::infinity() - n as i16
    }
    /// Returns the score for being checkmated in `n` plies
    pub fn mated_in(n: usize) -> Self {
        -Score::infinity() + n as i16
    }

    /// Returns the greatest score that isn't a mate. Static evaluations never go beyond it.
    pub fn max_eval() -> Self {
        Score::mates_in(Self::MAX_MATE_PLY) - 1
    }

    /// Returns `true` if the score is a forced mate for either side
    pub fn is_mate(self) -> bool {
        self >= Score::mates_in(Self::MAX_MATE_PLY) || self <= Score::mated_in(Self::MAX_MATE_PLY)
    }

    /// Returns the number of full moves to mate, negative when the side to move is being mated
    pub fn mate_moves(self) -> Option<i16> {
        if self >= Score::mates_in(Self::MAX_MATE_PLY) {
            Some((Score::infinity().0 - self.0 + 1) / 2)
        } else if self <= Score::mated_in(Self::MAX_MATE_PLY) {
            Some(-(Score::infinity().0 + self.0) / 2)
        } else {
            None
        }
    }
}

impl ops::Neg for Score {
    type Output = Score;

    fn neg(self) -> Self {
        Score(-self.0)
    }
}

impl ops::Add<i16> for Score {
    type Output = Score;

    fn add(self, rhs: i16) -> Self {
        Score(self.0 + rhs)
    }
}

impl ops::Sub<i16> for Score {
    type Output = Score;

    fn sub(self, rhs: i16) -> Self {
        Score(self.0 - rhs)
    }
}

impl From<i16> for Score {
    fn from(val: i16) -> Self {
        Score(val)
    }
}

impl From<Score> for i16 {
    fn from(val: Score) -> Self {
        val.0
    }
}

/// Written the way UCI reports it: `cp 35` or `mate -2`
impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mate_moves() {
            Some(moves) => write!(f, "mate {}", moves),
            None => write!(f, "cp {}", self.0),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
const PIECE_VAL: [i16; Piece::COUNT] = [ 100, 320, 330, 500, 900, 0 ];

// Non-king material at or above which the king uses only the middlegame table, and at or below
// which it uses only the endgame table.
const MIDGAME_MATERIAL: i16 = 2*900 + 4*500 + 2*330;
const ENDGAME_MATERIAL: i16 = 2*500 + 2*330;

// Tables are indexed by square from white's point of view, so the first row is rank 1.
// Black's pieces look up the flipped square.
const PIECE_SQUARE_VAL: [[i16; Square::COUNT]; Piece::COUNT - 1] = [
    [ // Pawn
      //  a    b    c    d    e    f    g    h
          0,   0,   0,   0,   0,   0,   0,   0, // 1
          5,  10,  10, -20, -20,  10,  10,   5, // 2
          5,  -5, -10,   0,   0, -10,  -5,   5, // 3
          0,   0,   0,  20,  20,   0,   0,   0, // 4
          5,   5,  10,  25,  25,  10,   5,   5, // 5
         10,  10,  20,  30,  30,  20,  10,  10, // 6
         50,  50,  50,  50,  50,  50,  50,  50, // 7
          0,   0,   0,   0,   0,   0,   0,   0, // 8
    ],
    [ // Knight
      //  a    b    c    d    e    f    g    h
        -50, -40, -30, -30, -30, -30, -40, -50, // 1
        -40, -20,   0,   5,   5,   0, -20, -40, // 2
        -30,   5,  10,  15,  15,  10,   5, -30, // 3
        -30,   0,  15,  20,  20,  15,   0, -30, // 4
        -30,   5,  15,  20,  20,  15,   5, -30, // 5
        -30,   0,  10,  15,  15,  10,   0, -30, // 6
        -40, -20,   0,   0,   0,   0, -20, -40, // 7
        -50, -40, -30, -30, -30, -30, -40, -50, // 8
    ],
    [ // Bishop
      //  a    b    c    d    e    f    g    h
        -20, -10, -10, -10, -10, -10, -10, -20, // 1
        -10,   5,   0,   0,   0,   0,   5, -10, // 2
        -10,  10,  10,  10,  10,  10,  10, -10, // 3
        -10,   0,  10,  10,  10,  10,   0, -10, // 4
        -10,   5,   5,  10,  10,   5,   5, -10, // 5
        -10,   0,   5,  10,  10,   5,   0, -10, // 6
        -10,   0,   0,   0,   0,   0,   0, -10, // 7
        -20, -10, -10, -10, -10, -10, -10, -20, // 8
    ],
    [ // Rook
      //  a    b    c    d    e    f    g    h
          0,   0,   0,   5,   5,   0,   0,   0, // 1
         -5,   0,   0,   0,   0,   0,   0,  -5, // 2
         -5,   0,   0,   0,   0,   0,   0,  -5, // 3
         -5,   0,   0,   0,   0,   0,   0,  -5, // 4
         -5,   0,   0,   0,   0,   0,   0,  -5, // 5
         -5,   0,   0,   0,   0,   0,   0,  -5, // 6
          5,  10,  10,  10,  10,  10,  10,   5, // 7
          0,   0,   0,   0,   0,   0,   0,   0, // 8
    ],
    [ // Queen
      //  a    b    c    d    e    f    g    h
        -20, -10, -10,  -5,  -5, -10, -10, -20, // 1
        -10,   0,   5,   0,   0,   0,   0, -10, // 2
        -10,   5,   5,   5,   5,   5,   0, -10, // 3
          0,   0,   5,   5,   5,   5,   0,  -5, // 4
         -5,   0,   5,   5,   5,   5,   0,  -5, // 5
        -10,   0,   5,   5,   5,   5,   0, -10, // 6
        -10,   0,   0,   0,   0,   0,   0, -10, // 7
        -20, -10, -10,  -5,  -5, -10, -10, -20, // 8
    ],
];

const MID_KING_TABLE: [i16; Square::COUNT] = [
  //  a    b    c    d    e    f    g    h
     20,  30,  10,   0,   0,  10,  30,  20, // 1
     20,  20,   0,   0,   0,   0,  20,  20, // 2
    -10, -20, -20, -20, -20, -20, -20, -10, // 3
    -20, -30, -30, -40, -40, -30, -30, -20, // 4
    -30, -40, -40, -50, -50, -40, -40, -30, // 5
    -30, -40, -40, -50, -50, -40, -40, -30, // 6
    -30, -40, -40, -50, -50, -40, -40, -30, // 7
    -30, -40, -40, -50, -50, -40, -40, -30, // 8
];

const END_KING_TABLE: [i16; Square::COUNT] = [
  //  a    b    c    d    e    f    g    h
    -50, -30, -30, -30, -30, -30, -30, -50, // 1
    -30, -30,   0,   0,   0,   0, -30, -30, // 2
    -30, -10,  20,  30,  30,  20, -10, -30, // 3
    -30, -10,  30,  40,  40,  30, -10, -30, // 4
    -30, -10,  30,  40,  40,  30, -10, -30, // 5
    -30, -10,  20,  30,  30,  20, -10, -30, // 6
    -30, -20, -10,   0,   0, -10, -20, -30, // 7
    -50, -40, -30, -20, -20, -30, -40, -50, // 8
];

/// Returns the value of a piece.
pub fn piece_val(piece: Piece) -> i16 {
    PIECE_VAL[piece as usize]
}

fn relative(color: Color, sq: Square) -> usize {
    match color {
        Color::White => sq as usize,
        Color::Black => sq.flip() as usize,
    }
}

/// Returns the king's square value, blended between the middlegame and endgame tables by the
/// non-king material left on the board.
fn king_val(sq: usize, material: i16) -> i16 {
    let material = material.max(ENDGAME_MATERIAL).min(MIDGAME_MATERIAL);
    let mid_weight = i32::from(material - ENDGAME_MATERIAL);
    let end_weight = i32::from(MIDGAME_MATERIAL - material);

    let blended = (i32::from(MID_KING_TABLE[sq])*mid_weight
        + i32::from(END_KING_TABLE[sq])*end_weight)
        / i32::from(MIDGAME_MATERIAL - ENDGAME_MATERIAL);
    blended as i16
}

/// Returns the estimated static score for the position, relative to the side to move.
pub fn evaluate(pos: &Position) -> Score {
    use Color::*;
    use Piece::*;

    let mut val = [0; Color::COUNT];
    let mut total_piece_val = 0;

    let mut knights = [0; Color::COUNT];
    let mut bishops = [0; Color::COUNT];
    let mut good_pieces = [false; Color::COUNT];

    for color in Color::ALL.iter().copied() {
        for piece in [Pawn, Knight, Bishop, Rook, Queen].iter().copied() {
            let squares = pos.pieces(color, piece);
            let count = squares.len() as i16;
            for sq in squares {
                val[color as usize] += PIECE_VAL[piece as usize]
                    + PIECE_SQUARE_VAL[piece as usize][relative(color, sq)];
            }
            if piece != Pawn {
                total_piece_val += count * PIECE_VAL[piece as usize];
            }

            if count > 0 {
                match piece {
                    Knight => knights[color as usize] = count,
                    Bishop => bishops[color as usize] = count,
                    _ => good_pieces[color as usize] = true,
                }
            }
        }
    }

    for color in Color::ALL.iter().copied() {
        val[color as usize] += king_val(relative(color, pos.king_square(color)), total_piece_val);
    }

    let max_eval = i16::from(Score::max_eval());
    let val = (val[pos.turn() as usize] - val[!pos.turn() as usize]).max(-max_eval).min(max_eval);

    // a side without pawns or major pieces needs more than a single minor piece to win
    let strong_side = if val > 0 { pos.turn() } else { !pos.turn() };
    let weak_side = !strong_side as usize;
    let strong_side = strong_side as usize;

    if good_pieces[strong_side]
    || bishops[strong_side] + knights[strong_side] > 2
    || (bishops[strong_side] == 2 && bishops[weak_side] == 0) {
        val.into()
    } else if good_pieces[weak_side] || bishops[weak_side] > 0 || knights[weak_side] > 0 {
        (val/25).into()
    } else {
        Score::draw()
    }
}
