//! Legal move generation
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::iter::Chain;
use std::slice;
use std::vec;
use super::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// One of the four lines a sliding piece can pin along
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RayFamily {
    /// Along a file
    Vertical = 0,
    /// Along a rank
    Horizontal = 1,
    /// From lower left to upper right
    Diagonal = 2,
    /// From upper left to lower right
    AntiDiagonal = 3,
}

impl RayFamily {
    /// All four families
    pub const ALL: [RayFamily; 4] = [
        RayFamily::Vertical, RayFamily::Horizontal, RayFamily::Diagonal, RayFamily::AntiDiagonal,
    ];

    /// The two opposite directions making up the line
    pub fn directions(self) -> [Direction; 2] {
        use Direction::*;

        match self {
            RayFamily::Vertical => [North, South],
            RayFamily::Horizontal => [East, West],
            RayFamily::Diagonal => [NorthEast, SouthWest],
            RayFamily::AntiDiagonal => [NorthWest, SouthEast],
        }
    }

    /// The pieces that attack along this family
    fn sliders(self) -> [Piece; 2] {
        match self {
            RayFamily::Vertical | RayFamily::Horizontal => [Rook, Queen],
            RayFamily::Diagonal | RayFamily::AntiDiagonal => [Bishop, Queen],
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The pinned pieces of a position, grouped by the line they are pinned along.
///
/// A pinned piece lies alone between the side to move's king and an enemy slider of the matching
/// family. It may only move along that family's line through the king.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Pins {
    pinned: [Bitboard; 4],
    lines: [Bitboard; 4],
}

impl Pins {
    /// Returns the pieces pinned along `family`
    pub fn pinned(&self, family: RayFamily) -> Bitboard {
        self.pinned[family as usize]
    }

    /// Returns every pinned piece
    pub fn all(&self) -> Bitboard {
        self.pinned.iter().fold(Bitboard::EMPTY, |acc, &bb| acc | bb)
    }

    /// Returns the squares a piece on `sq` may move to without exposing the king
    pub fn allowed(&self, sq: Square) -> Bitboard {
        for i in 0..self.pinned.len() {
            if self.pinned[i].contains(sq) {
                return self.lines[i];
            }
        }
        Bitboard::ALL
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The legal moves of a position, split into quiet and tactical moves.
///
/// Tactical moves are captures (including en passant) and promotions. Everything else, castling
/// included, is quiet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MoveList {
    /// Moves that neither capture nor promote
    pub quiet: Vec<Move>,
    /// Captures and promotions
    pub tactical: Vec<Move>,
}

impl MoveList {
    /// Creates an empty list
    pub fn new() -> MoveList {
        MoveList {
            quiet: Vec::with_capacity(48),
            tactical: Vec::with_capacity(16),
        }
    }

    /// Returns the total number of moves
    pub fn len(&self) -> usize {
        self.quiet.len() + self.tactical.len()
    }

    /// Returns `true` if there are no legal moves
    pub fn is_empty(&self) -> bool {
        self.quiet.is_empty() && self.tactical.is_empty()
    }

    /// Returns `true` if `mv` is one of the moves
    pub fn contains(&self, mv: Move) -> bool {
        if mv.is_tactical() {
            self.tactical.contains(&mv)
        } else {
            self.quiet.contains(&mv)
        }
    }

    /// Iterates over the tactical moves, then the quiet ones
    pub fn iter(&self) -> Chain<slice::Iter<'_, Move>, slice::Iter<'_, Move>> {
        self.tactical.iter().chain(self.quiet.iter())
    }

    fn push(&mut self, mv: Move) {
        if mv.is_tactical() {
            self.tactical.push(mv);
        } else {
            self.quiet.push(mv);
        }
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = Chain<vec::IntoIter<Move>, vec::IntoIter<Move>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tactical.into_iter().chain(self.quiet.into_iter())
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = Chain<slice::Iter<'a, Move>, slice::Iter<'a, Move>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Position {
    /// Returns every square attacked by pieces of color `by`.
    ///
    /// The king of the other color is left out of the blockers, so squares behind it on a
    /// checking ray count as attacked and the king cannot step back along the ray.
    pub fn attack_map(&self, by: Color) -> Bitboard {
        let empty = !(self.occupied() ^ self.pieces(!by, King).into());
        let queens = self.pieces(by, Queen);
        let mut attacks = pawn_attacks(by, self.pieces(by, Pawn))
            | rook_attacks(self.pieces(by, Rook) | queens, empty)
            | bishop_attacks(self.pieces(by, Bishop) | queens, empty);

        for sq in self.pieces(by, Knight) {
            attacks |= self.tables.knight(sq);
        }
        for sq in self.pieces(by, King) {
            attacks |= self.tables.king(sq);
        }

        attacks
    }

    /// Finds the pieces of either color that lie alone between the side to move's king and an
    /// enemy slider
    pub fn pins(&self) -> Pins {
        let king = self.king_square(self.turn);
        let origin = Bitboard::from(king);
        let empty = self.empty();
        let them = !self.turn;
        let mut pins = Pins::default();

        for &family in RayFamily::ALL.iter() {
            let [a, b] = family.sliders();
            let sliders = self.pieces(them, a) | self.pieces(them, b);
            let mut line = Bitboard::EMPTY;

            for &dir in family.directions().iter() {
                line |= slide(dir, origin, Bitboard::ALL);
                let blocker = slide(dir, origin, empty) & !empty;
                if !blocker.is_empty() && slide(dir, blocker, empty).intersects(sliders) {
                    pins.pinned[family as usize] |= blocker;
                }
            }
            pins.lines[family as usize] = line;
        }

        pins
    }

    /// Generates every legal move for the side to move
    pub fn generate_moves(&self) -> MoveList {
        let mut list = MoveList::new();
        let us = self.turn;
        let them = !us;
        let king = self.king_square(us);
        let own = self.side(us);
        let empty = self.empty();
        let danger = self.attack_map(them);

        // the king can always try to step out of danger
        let targets = self.tables.king(king) & !own & !danger;
        self.push_targets(&mut list, King, king, targets);

        let checkers = self.checkers();
        if checkers.len() > 1 {
            return list;
        }

        let accept = match checkers.peek() {
            None => Bitboard::ALL,
            Some(checker) => match self.piece_at(checker) {
                Some((_, p)) if p.is_slider() => ray_between(king, checker),
                _ => checker.into(),
            },
        };
        let pins = self.pins();

        // a pinned knight can never stay on its pin line
        for sq in self.pieces(us, Knight) & !pins.all() {
            let targets = self.tables.knight(sq) & !own & accept;
            self.push_targets(&mut list, Knight, sq, targets);
        }

        for &p in [Bishop, Rook, Queen].iter() {
            for sq in self.pieces(us, p) {
                let origin = Bitboard::from(sq);
                let attacks = match p {
                    Bishop => bishop_attacks(origin, empty),
                    Rook => rook_attacks(origin, empty),
                    _ => queen_attacks(origin, empty),
                };
                let targets = attacks & !own & accept & pins.allowed(sq);
                self.push_targets(&mut list, p, sq, targets);
            }
        }

        self.generate_pawn_moves(&mut list, accept, &pins);

        if checkers.is_empty() {
            self.generate_castling(&mut list, danger);
        }

        list
    }

    /// Returns every legal move for the side to move, tactical moves first
    pub fn legal_moves(&self) -> Vec<Move> {
        self.generate_moves().into_iter().collect()
    }

    fn push_targets(&self, list: &mut MoveList, p: Piece, orig: Square, targets: Bitboard) {
        for dest in targets {
            let captured = self.piece_at(dest).map(|(_, p)| p);
            list.push(Move::new(orig, dest, p, captured));
        }
    }

    fn generate_pawn_moves(&self, list: &mut MoveList, accept: Bitboard, pins: &Pins) {
        let us = self.turn;
        let them = !us;
        let empty = self.empty();
        let enemy = self.side(them);
        let promotion_rank = Bitboard::from(us.promotion_rank());

        for orig in self.pieces(us, Pawn) {
            let origin = Bitboard::from(orig);
            let allowed = pins.allowed(orig) & accept;
            let pushes = pawn_pushes(us, origin, empty) & allowed;
            let captures = self.tables.pawn(us, orig) & enemy & allowed;

            for dest in pushes | captures {
                let captured = self.piece_at(dest).map(|(_, p)| p);
                if promotion_rank.contains(dest) {
                    for &prom in Promotion::ALL.iter() {
                        list.push(Move::promotion(orig, dest, captured, prom));
                    }
                } else {
                    list.push(Move::new(orig, dest, Pawn, captured));
                }
            }
        }

        if let Some(dest) = self.ep_square() {
            let victim = Bitboard::from(dest).shift(Direction::forward(them));
            let victim_sq = victim.peek().expect("INFALLIBLE");
            let capturers = self.tables.pawn(them, dest) & self.pieces(us, Pawn);

            // the capture resolves a check only by removing a checking pawn or by blocking
            if !accept.contains(dest) && !accept.intersects(victim) {
                return;
            }

            for orig in capturers {
                if pins.allowed(orig).contains(dest) && self.ep_is_safe(orig, dest, victim_sq) {
                    list.push(Move::en_passant(orig, dest));
                }
            }
        }
    }

    /// Returns `false` if removing both pawns of an en-passant capture, and adding the capturing
    /// pawn on `dest`, exposes the king to a slider.
    ///
    /// The capturing pawn is not necessarily flagged as pinned: with both pawns on the same rank,
    /// neither one alone blocks the line.
    fn ep_is_safe(&self, orig: Square, dest: Square, victim: Square) -> bool {
        let us = self.turn;
        let them = !us;
        let king = Bitboard::from(self.king_square(us));
        let occupied = (self.occupied() ^ orig.into() ^ victim.into()) | dest.into();
        let empty = !occupied;
        let queens = self.pieces(them, Queen);
        let rooks = self.pieces(them, Rook) | queens;
        let bishops = self.pieces(them, Bishop) | queens;

        !rook_attacks(king, empty).intersects(rooks)
            && !bishop_attacks(king, empty).intersects(bishops)
    }

    fn generate_castling(&self, list: &mut MoveList, danger: Bitboard) {
        let us = self.turn;
        let rank = us.back_rank();
        let occupied = self.occupied();

        for &(flag, file, king_dest, pass) in [
            (CastlingRights::king_side(us), File::H, File::G, File::F),
            (CastlingRights::queen_side(us), File::A, File::C, File::D),
        ].iter() {
            if !self.castling.contains(flag) {
                continue;
            }

            let king = Square::from_coord(File::E, rank);
            let rook = Square::from_coord(file, rank);
            let lane = ray_between(king, rook) & !Bitboard::from(rook);
            let transit: Bitboard = [king, Square::from_coord(pass, rank),
                Square::from_coord(king_dest, rank)].iter().copied().collect();

            if !lane.intersects(occupied) && !transit.intersects(danger) {
                list.push(Move::castle(king, rook));
            }
        }
    }

    /// Parses a move in long algebraic notation (e.g. `e2e4`, `e7e8q`) and finds the matching
    /// legal move.
    ///
    /// Castling may be given as the king's two-square move (`e1g1`) or as the king taking its own
    /// rook (`e1h1`). A promotion without a piece letter promotes to a queen.
    pub fn parse_move(&self, s: &str) -> Result<Move> {
        let s = s.trim();
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return Err(Error::ParseMove);
        }

        let orig: Square = s[0..2].parse().map_err(|_| Error::ParseMove)?;
        let dest: Square = s[2..4].parse().map_err(|_| Error::ParseMove)?;
        let promotion = match s.get(4..5) {
            None => None,
            Some("n") | Some("N") => Some(Promotion::ToKnight),
            Some("b") | Some("B") => Some(Promotion::ToBishop),
            Some("r") | Some("R") => Some(Promotion::ToRook),
            Some("q") | Some("Q") => Some(Promotion::ToQueen),
            Some(_) => return Err(Error::ParseMove),
        };

        let found = self.generate_moves().into_iter().find(|mv| {
            if mv.origin() != orig {
                return false;
            }

            match mv.kind() {
                MoveKind::Castle => dest == mv.destination() || dest == mv.castle_king_destination(),
                MoveKind::Promotion => dest == mv.destination()
                    && mv.promotion_piece() == Some(promotion.unwrap_or_default()),
                _ => dest == mv.destination() && promotion.is_none(),
            }
        });

        found.ok_or(Error::IllegalMove)
    }
}
