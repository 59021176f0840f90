//! Applying and reverting moves
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use super::*;

impl Position {
    /// Applies a legal move.
    ///
    /// The move must come from `generate_moves` (or `parse_move`) on this exact position. Applying
    /// anything else leaves the position in an unspecified state.
    pub fn make_move(&mut self, mv: Move) {
        self.push_undo(mv);

        let us = self.turn;
        self.apply(mv, us);

        let ep_file = if mv.piece() == Pawn
            && (mv.destination() as i8 - mv.origin() as i8).abs() == 16 {
            1 << mv.origin().file() as u8
        } else {
            0
        };
        self.set_ep_file(ep_file);
        self.set_castling(self.remaining_castling());

        if mv.piece() == Pawn || mv.is_capture() {
            self.draw_plies = 0;
        } else {
            self.draw_plies += 1;
        }

        self.switch_turn();
        if us == Black {
            self.move_num += 1;
        }
    }

    /// Reverts the most recent move (or null move) and returns it, or `None` if there is nothing
    /// to revert
    pub fn unmake_move(&mut self) -> Option<Move> {
        let undo = self.history.pop()?;

        self.switch_turn();
        if !undo.mv.is_null() {
            if self.turn == Black {
                self.move_num -= 1;
            }
            self.apply(undo.mv, self.turn);
        }

        self.set_ep_file(undo.ep_file);
        self.set_castling(undo.castling);
        self.draw_plies = undo.draw_plies;

        debug_assert_eq!(self.zobrist, undo.zobrist, "fingerprint mismatch undoing {}", undo.mv);
        Some(undo.mv)
    }

    /// Passes the turn to the opponent without moving.
    ///
    /// Must not be used while in check. The fifty-move count restarts so that repetitions are
    /// never detected across a null move.
    pub fn make_null_move(&mut self) {
        debug_assert!(!self.in_check(), "null move while in check");

        self.push_undo(Move::null());
        self.set_ep_file(0);
        self.draw_plies = 0;
        self.switch_turn();
    }

    /// Reverts a null move made with `make_null_move`
    pub fn unmake_null_move(&mut self) {
        debug_assert!(self.last_move().map_or(false, Move::is_null), "last move is not null");
        self.unmake_move();
    }

    fn push_undo(&mut self, mv: Move) {
        self.history.push(Undo {
            mv,
            ep_file: self.ep_file,
            castling: self.castling,
            draw_plies: self.draw_plies,
            zobrist: self.zobrist,
        });
    }

    /// Moves the pieces for `mv`, played by `us`.
    ///
    /// Every placement change is a toggle, so applying the same move a second time reverts it.
    fn apply(&mut self, mv: Move, us: Color) {
        let them = !us;
        let orig = mv.origin();
        let dest = mv.destination();

        match mv.kind() {
            MoveKind::Normal => {
                if let Some(captured) = mv.captured() {
                    self.toggle(them, captured, dest);
                }
                self.toggle(us, mv.piece(), orig);
                self.toggle(us, mv.piece(), dest);
            },
            MoveKind::Promotion => {
                let promotion = mv.promotion_piece().expect("INFALLIBLE");
                if let Some(captured) = mv.captured() {
                    self.toggle(them, captured, dest);
                }
                self.toggle(us, Pawn, orig);
                self.toggle(us, promotion.into(), dest);
            },
            MoveKind::EnPassant => {
                let victim = Square::from_coord(dest.file(), orig.rank());
                self.toggle(them, Pawn, victim);
                self.toggle(us, Pawn, orig);
                self.toggle(us, Pawn, dest);
            },
            MoveKind::Castle => {
                self.toggle(us, King, orig);
                self.toggle(us, Rook, dest);
                self.toggle(us, King, mv.castle_king_destination());
                self.toggle(us, Rook, mv.castle_rook_destination());
            },
        }
    }

    fn toggle(&mut self, c: Color, p: Piece, sq: Square) {
        self.pieces[p as usize].toggle(sq);
        self.sides[c as usize].toggle(sq);
        self.zobrist.toggle_piece(self.tables.keys(), c, p, sq);
    }

    fn switch_turn(&mut self) {
        self.turn = !self.turn;
        self.zobrist.toggle_turn(self.tables.keys());
    }

    fn set_ep_file(&mut self, ep_file: u8) {
        self.zobrist.toggle_ep_file(self.tables.keys(), self.ep_file);
        self.ep_file = ep_file;
        self.zobrist.toggle_ep_file(self.tables.keys(), self.ep_file);
    }

    fn set_castling(&mut self, castling: CastlingRights) {
        self.zobrist.toggle_castling(self.tables.keys(), self.castling ^ castling);
        self.castling = castling;
    }

    /// The current castling rights, minus any whose king or rook has left its square
    fn remaining_castling(&self) -> CastlingRights {
        let mut rights = self.castling;
        for &(flag, c, king, rook) in CastlingRights::squares().iter() {
            if !(self.pieces(c, King).contains(king) && self.pieces(c, Rook).contains(rook)) {
                rights.remove(flag);
            }
        }
        rights
    }
}
