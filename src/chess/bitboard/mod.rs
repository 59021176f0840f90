//! Provides a representation of a set of squares
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryInto;
use std::iter::FusedIterator;
use std::iter::{FromIterator, Extend};
use std::ops;
use std::fmt;
use super::*;

mod attacks;
pub use attacks::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A set of squares with each bit representing one square
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(u64);

impl Bitboard {
    /// The empty set
    pub const EMPTY: Bitboard = Bitboard(0);

    /// Every square on the board
    pub const ALL: Bitboard = Bitboard(!0);

    const FILE_A: u64 = 0x0101_0101_0101_0101;
    const FILE_H: u64 = 0x8080_8080_8080_8080;

    /// Creates a new, empty bitboard
    pub fn new() -> Bitboard {
        Default::default()
    }

    /// Returns the number of squares in the bitboard
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if the bitboard is empty
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the bitboard contains `sq`
    pub fn contains(self, sq: Square) -> bool {
        !(self & sq.into()).is_empty()
    }

    /// Returns `true` if `self` intersects `other`
    pub fn intersects(self, other: Bitboard) -> bool {
        !(self & other).is_empty()
    }

    /// Adds a square to the bitboard if it is not already present
    pub fn insert(&mut self, sq: Square) {
        *self |= sq.into();
    }

    /// Removes a square from the bitboard if it is present
    pub fn remove(&mut self, sq: Square) {
        *self &= !Bitboard::from(sq);
    }

    /// Toggles a square in the bitboard
    pub fn toggle(&mut self, sq: Square) {
        *self ^= sq.into();
    }

    /// Removes the lowest square from the bitboard and returns it
    pub fn pop(&mut self) -> Option<Square> {
        let sq = self.peek();
        // clear the least significant bit
        self.0 &= self.0.wrapping_sub(1);
        sq
    }

    /// Returns the square that would be removed by a pop command
    pub fn peek(self) -> Option<Square> {
        if self.0 != 0 {
            Some((self.0.trailing_zeros() as usize).try_into().expect("INFALLIBLE"))
        } else {
            None
        }
    }

    /// Returns a bitboard with every square moved one step in `dir`.
    ///
    /// Squares that would leave the board, including across the a- or h-file edge, are dropped.
    pub fn shift(self, dir: Direction) -> Bitboard {
        use Direction::*;

        let bits = self.0;
        Bitboard(match dir {
            North => bits << 8,
            South => bits >> 8,
            East => (bits & !Self::FILE_H) << 1,
            West => (bits & !Self::FILE_A) >> 1,
            NorthEast => (bits & !Self::FILE_H) << 9,
            NorthWest => (bits & !Self::FILE_A) << 7,
            SouthEast => (bits & !Self::FILE_H) >> 7,
            SouthWest => (bits & !Self::FILE_A) >> 9,
        })
    }
}

impl ops::Not for Bitboard {
    type Output = Self;

    fn not(self) -> Self::Output {
        Bitboard(!self.0)
    }
}

impl ops::BitAnd for Bitboard {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 & rhs.0)
    }
}

impl ops::BitAndAssign for Bitboard {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0
    }
}

impl ops::BitOr for Bitboard {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}

impl ops::BitXor for Bitboard {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl ops::BitXorAssign for Bitboard {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0
    }
}

impl fmt::Display for Bitboard {
    /// Draws the board with rank 8 on top, `x` for members and `.` for the rest
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..Rank::COUNT).rev() {
            for file in 0..File::COUNT {
                let sq = Square::from_coord(
                    file.try_into().expect("INFALLIBLE"),
                    rank.try_into().expect("INFALLIBLE"),
                );
                write!(f, "{}", if self.contains(sq) { 'x' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::LowerHex for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for Bitboard {
    fn from(val: u64) -> Bitboard {
        Bitboard(val)
    }
}

impl From<Bitboard> for u64 {
    fn from(bb: Bitboard) -> u64 {
        bb.0
    }
}

impl From<Square> for Bitboard {
    fn from(sq: Square) -> Bitboard {
        Bitboard(1 << sq as u64)
    }
}

impl From<File> for Bitboard {
    fn from(f: File) -> Bitboard {
        Bitboard(Self::FILE_A << f as u64)
    }
}

impl From<Rank> for Bitboard {
    fn from(r: Rank) -> Bitboard {
        Bitboard(0xff << (8 * r as u64))
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item=Square>>(iter: I) -> Self {
        let mut bd = Bitboard::new();
        bd.extend(iter);
        bd
    }
}

impl Extend<Square> for Bitboard {
    fn extend<I: IntoIterator<Item=Square>>(&mut self, iter: I) {
        for sq in iter {
            self.insert(sq);
        }
    }
}

/// Iterator over the squares of a `Bitboard`, lowest square first
#[derive(Debug, Copy, Clone)]
pub struct IntoIter(Bitboard);

impl Iterator for IntoIter {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl ExactSizeIterator for IntoIter { }

impl FusedIterator for IntoIter { }

////////////////////////////////////////////////////////////////////////////////////////////////////
/// One of the eight compass directions a piece can travel in, seen from white's side
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    /// All eight directions
    pub const ALL: [Direction; 8] = [
        Direction::North, Direction::South, Direction::East, Direction::West,
        Direction::NorthEast, Direction::NorthWest, Direction::SouthEast, Direction::SouthWest,
    ];

    /// The directions a rook moves in
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North, Direction::South, Direction::East, Direction::West,
    ];

    /// The directions a bishop moves in
    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast, Direction::NorthWest, Direction::SouthEast, Direction::SouthWest,
    ];

    /// Returns the direction a pawn of color `c` advances in
    pub fn forward(c: Color) -> Direction {
        match c {
            Color::White => Direction::North,
            Color::Black => Direction::South,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_operations() {
        assert_eq!(Bitboard::new(), Bitboard::EMPTY);
        assert_eq!(Bitboard::new().len(), 0);
        assert!(Bitboard::new().is_empty());
        assert_eq!(Bitboard::ALL.len(), 64);

        let mut bb = Bitboard::new();
        bb.insert(Square::A1);
        bb.insert(Square::H8);
        assert!(bb.contains(Square::A1));
        assert!(bb.contains(Square::H8));
        assert!(!bb.contains(Square::D4));
        assert!(bb.intersects(Square::H8.into()));

        bb.remove(Square::A1);
        assert!(!bb.contains(Square::A1));
        bb.toggle(Square::H8);
        bb.toggle(Square::D4);
        assert_eq!(bb, Bitboard::from(Square::D4));
    }

    #[test]
    fn iteration_is_lowest_square_first() {
        let bb: Bitboard = vec![Square::H8, Square::C3, Square::A1].into_iter().collect();
        assert_eq!(bb.into_iter().len(), 3);
        assert_eq!(bb.into_iter().collect::<Vec<_>>(), vec![Square::A1, Square::C3, Square::H8]);
        assert_eq!(bb.peek(), Some(Square::A1));
        assert_eq!(Bitboard::EMPTY.peek(), None);
    }

    #[test]
    fn files_and_ranks() {
        assert_eq!(u64::from(Bitboard::from(File::A)), 0x0101_0101_0101_0101);
        assert_eq!(u64::from(Bitboard::from(File::H)), 0x8080_8080_8080_8080);
        assert_eq!(u64::from(Bitboard::from(Rank::R1)), 0xff);
        assert_eq!(u64::from(Bitboard::from(Rank::R8)), 0xff00_0000_0000_0000);
        assert!(Bitboard::from(File::E).contains(Square::E5));
        assert!(Bitboard::from(Rank::R5).contains(Square::E5));
    }

    #[test]
    fn shifts_do_not_wrap_around_edges() {
        let h4 = Bitboard::from(Square::H4);
        assert!(h4.shift(Direction::East).is_empty());
        assert!(h4.shift(Direction::NorthEast).is_empty());
        assert_eq!(h4.shift(Direction::West), Square::G4.into());
        assert_eq!(h4.shift(Direction::NorthWest), Square::G5.into());

        let a4 = Bitboard::from(Square::A4);
        assert!(a4.shift(Direction::West).is_empty());
        assert!(a4.shift(Direction::SouthWest).is_empty());
        assert_eq!(a4.shift(Direction::SouthEast), Square::B3.into());

        assert!(Bitboard::from(Square::E8).shift(Direction::North).is_empty());
        assert!(Bitboard::from(Square::E1).shift(Direction::South).is_empty());
    }

    #[test]
    fn display_draws_rank_8_first() {
        let s = Bitboard::from(Square::A8).to_string();
        assert!(s.starts_with("x......."));
        assert_eq!(s.lines().count(), 8);
        assert_eq!(format!("{:x}", Bitboard::from(Square::E1)), "10");
    }
}
