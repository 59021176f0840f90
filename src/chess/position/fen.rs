//! Reading and writing positions in Forsyth-Edwards Notation
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryInto;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use super::*;

impl Position {
    /// Parse a position from a FEN string
    pub fn from_fen_str(s: &str) -> Result<Position> {
        Position::from_fen_with_tables(s, Arc::new(Tables::new()))
    }

    /// Parse a position from a FEN string, sharing existing lookup tables.
    ///
    /// The half-move clock and full-move number are optional and default to 0 and 1. Nothing of
    /// any previous position carries over, and the position is validated before it is returned.
    pub fn from_fen_with_tables(s: &str, tables: Arc<Tables>) -> Result<Position> {
        use Error::*;

        let mut pos = Position::empty_board(tables);
        let mut fields = s.split_whitespace();

        // parse the board
        if let Some(board) = fields.next() {
            let mut r = Rank::COUNT - 1;
            let mut f = 0;
            for c in board.chars() {
                match c {
                    '1'..='8' => {
                        f += c.to_digit(10).expect("INFALLIBLE") as usize;
                        if f > File::COUNT {
                            return Err(ParseBoard);
                        }
                    }
                    '/' => {
                        if f == File::COUNT && r > 0 {
                            r -= 1;
                            f = 0;
                        } else {
                            return Err(ParseBoard);
                        }
                    }
                    _ => {
                        let sq = match (f.try_into(), r.try_into()) {
                            (Ok(f), Ok(r)) => Square::from_coord(f, r),
                            _ => return Err(ParseBoard),
                        };
                        let (color, piece) = Piece::from_char(c).map_err(|_| ParseBoard)?;

                        pos.pieces[piece as usize].insert(sq);
                        pos.sides[color as usize].insert(sq);

                        f += 1;
                    }
                }
            }
            if r > 0 || f < File::COUNT {
                return Err(ParseBoard);
            }
        } else {
            return Err(Empty);
        }

        // parse the turn
        match fields.next() {
            Some(turn) => pos.turn = turn.parse::<Color>().map_err(|_| ParseTurn)?,
            None => return Err(ParseTurn),
        }

        // parse the castling flags
        match fields.next() {
            Some("-") => {},
            Some(castling_flags) => {
                for c in castling_flags.chars() {
                    pos.castling.insert(match c {
                        'K' => CastlingRights::WHITE_KING_SIDE,
                        'Q' => CastlingRights::WHITE_QUEEN_SIDE,
                        'k' => CastlingRights::BLACK_KING_SIDE,
                        'q' => CastlingRights::BLACK_QUEEN_SIDE,
                        _ => return Err(ParseCastling),
                    });
                }
            },
            None => return Err(ParseCastling),
        }

        // parse en passant square
        let ep_square = match fields.next() {
            Some("-") => None,
            Some(ep_square) => Some(ep_square.parse::<Square>().map_err(|_| ParseEnPassant)?),
            None => return Err(ParseEnPassant),
        };

        // parse half move clock, if present
        if let Some(plies) = fields.next() {
            pos.draw_plies = plies.parse::<usize>().map_err(|_| ParseHalfMoveClock)?;
        }

        // parse move number, if present
        if let Some(move_num) = fields.next() {
            pos.move_num = move_num.parse::<usize>().map_err(|_| ParseMoveNumber)?;
        }

        // validate position legality
        for &c in Color::ALL.iter() {
            // Step 1: verify exactly one king per side
            if pos.pieces(c, King).len() != 1 {
                return Err(KingCount);
            }
            // Step 2: no pawns on ranks 1 and 8
            if pos.pieces(c, Pawn).intersects(Bitboard::from(Rank::R1) | Rank::R8.into()) {
                return Err(InvalidPawnRank);
            }
        }
        // Step 3: opponent's king is not attacked
        if pos.is_attacked(pos.king_square(!pos.turn), pos.turn) {
            return Err(KingCapturable);
        }
        // Step 4: an en-passant square must be empty, on the right rank, with a pawn to capture
        if let Some(ep_square) = ep_square {
            let ep_rank = match pos.turn {
                White => Rank::R6,
                Black => Rank::R3,
            };
            let pawn_square = Bitboard::from(ep_square).shift(Direction::forward(!pos.turn));
            if ep_square.rank() != ep_rank
                || pos.occupied().contains(ep_square)
                || !pos.pieces(!pos.turn, Pawn).intersects(pawn_square) {
                return Err(EnPassantPawn);
            }
            pos.ep_file = 1 << ep_square.file() as u8;
        }
        // Step 5: if castling rights exist, king and rook must be in the correct squares
        for &(flag, c, king, rook) in CastlingRights::squares().iter() {
            if pos.castling.contains(flag)
                && !(pos.pieces(c, King).contains(king) && pos.pieces(c, Rook).contains(rook)) {
                return Err(InvalidCastling);
            }
        }

        pos.calc_zobrist();

        Ok(pos)
    }

    /// Converts the position to a FEN string
    pub fn to_fen_str(&self) -> String {
        // the board
        let mut board = String::new();
        for r in (0..Rank::COUNT).rev() {
            let mut count = 0;
            for f in 0..File::COUNT {
                let sq = Square::from_coord(
                    f.try_into().expect("INFALLIBLE"),
                    r.try_into().expect("INFALLIBLE"),
                );
                if let Some((c, p)) = self.piece_at(sq) {
                    if count > 0 {
                        board += &count.to_string();
                        count = 0;
                    }
                    board.push(p.to_char(c));
                } else {
                    count += 1;
                }
            }
            if count > 0 {
                board += &count.to_string();
            }
            if r > 0 {
                board += "/";
            }
        }

        // en passant square
        let ep_square = match self.ep_square() {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        // return the full fen string
        format!("{} {} {} {} {} {}", board, self.turn, self.castling, ep_square,
                                     self.draw_plies, self.move_num)
    }
}

impl fmt::Display for Position {
    /// Writes out the position using FEN
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_fen_str().fmt(f)
    }
}

impl FromStr for Position {
    type Err = Error;

    /// Parse a position from a FEN string
    fn from_str(s: &str) -> Result<Self> {
        Position::from_fen_str(s)
    }
}
