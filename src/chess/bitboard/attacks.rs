//! Attack sets for every piece type
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use super::*;
use Direction::*;

/// Returns every square reachable in direction `dir` from any square in `origin`.
///
/// The rays flood through `empty` and stop on the first square that is not empty, which is
/// included so captures are reachable. The origin squares themselves are never included.
pub fn slide(dir: Direction, origin: Bitboard, empty: Bitboard) -> Bitboard {
    let mut flood = origin;
    let mut front = origin;

    // six steps through empty squares cover the longest line
    for _ in 0..6 {
        front = front.shift(dir) & empty;
        flood |= front;
    }

    flood.shift(dir)
}

/// Squares attacked by rooks on `origin`
pub fn rook_attacks(origin: Bitboard, empty: Bitboard) -> Bitboard {
    Direction::ORTHOGONAL.iter().fold(Bitboard::EMPTY, |acc, &dir| {
        acc | slide(dir, origin, empty)
    })
}

/// Squares attacked by bishops on `origin`
pub fn bishop_attacks(origin: Bitboard, empty: Bitboard) -> Bitboard {
    Direction::DIAGONAL.iter().fold(Bitboard::EMPTY, |acc, &dir| {
        acc | slide(dir, origin, empty)
    })
}

/// Squares attacked by queens on `origin`
pub fn queen_attacks(origin: Bitboard, empty: Bitboard) -> Bitboard {
    rook_attacks(origin, empty) | bishop_attacks(origin, empty)
}

/// Squares attacked by knights on `origin`
pub fn knight_attacks(origin: Bitboard) -> Bitboard {
    let n = origin.shift(North);
    let s = origin.shift(South);
    let e = origin.shift(East);
    let w = origin.shift(West);

    n.shift(NorthEast) | n.shift(NorthWest)
        | s.shift(SouthEast) | s.shift(SouthWest)
        | e.shift(NorthEast) | e.shift(SouthEast)
        | w.shift(NorthWest) | w.shift(SouthWest)
}

/// Squares attacked by kings on `origin`
pub fn king_attacks(origin: Bitboard) -> Bitboard {
    Direction::ALL.iter().fold(Bitboard::EMPTY, |acc, &dir| acc | origin.shift(dir))
}

/// Squares attacked by pawns of color `c` on `origin`
pub fn pawn_attacks(c: Color, origin: Bitboard) -> Bitboard {
    let forward = origin.shift(Direction::forward(c));
    forward.shift(East) | forward.shift(West)
}

/// Single and double pawn pushes for pawns of color `c` on `origin`
pub fn pawn_pushes(c: Color, origin: Bitboard, empty: Bitboard) -> Bitboard {
    let forward = Direction::forward(c);
    let double_rank = match c {
        Color::White => Rank::R4,
        Color::Black => Rank::R5,
    };

    let single = origin.shift(forward) & empty;
    let double = single.shift(forward) & empty & double_rank.into();

    single | double
}

/// Returns the squares from `from` toward `to`, excluding `from` and including `to`.
///
/// # Panics
///
/// Panics if the two squares do not share a rank, file or diagonal.
pub fn ray_between(from: Square, to: Square) -> Bitboard {
    let origin = Bitboard::from(from);
    let target = Bitboard::from(to);

    for &dir in Direction::ALL.iter() {
        let ray = slide(dir, origin, !target);
        if ray.contains(to) {
            return ray;
        }
    }

    panic!("ray_between: {} and {} are not aligned", from, to);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squares(list: &[Square]) -> Bitboard {
        list.iter().copied().collect()
    }

    #[test]
    fn slide_stops_on_first_blocker() {
        let occupied = squares(&[Square::A4, Square::E7]);
        let attacks = slide(North, Square::E2.into(), !occupied);
        assert_eq!(attacks, squares(&[Square::E3, Square::E4, Square::E5, Square::E6, Square::E7]));

        let attacks = slide(West, Square::E4.into(), !occupied);
        assert_eq!(attacks, squares(&[Square::D4, Square::C4, Square::B4, Square::A4]));
    }

    #[test]
    fn slide_covers_the_longest_line() {
        let attacks = slide(NorthEast, Square::A1.into(), Bitboard::ALL);
        assert_eq!(attacks.len(), 7);
        assert!(attacks.contains(Square::H8));
    }

    #[test]
    fn rook_and_bishop_on_empty_board() {
        assert_eq!(rook_attacks(Square::D4.into(), Bitboard::ALL).len(), 14);
        assert_eq!(bishop_attacks(Square::D4.into(), Bitboard::ALL).len(), 13);
        assert_eq!(queen_attacks(Square::D4.into(), Bitboard::ALL).len(), 27);
        assert_eq!(bishop_attacks(Square::A1.into(), Bitboard::ALL).len(), 7);
    }

    #[test]
    fn leaper_attacks() {
        assert_eq!(knight_attacks(Square::A1.into()), squares(&[Square::B3, Square::C2]));
        assert_eq!(knight_attacks(Square::D4.into()).len(), 8);
        assert_eq!(knight_attacks(Square::H8.into()), squares(&[Square::G6, Square::F7]));
        assert_eq!(king_attacks(Square::A1.into()), squares(&[Square::A2, Square::B1, Square::B2]));
        assert_eq!(king_attacks(Square::E4.into()).len(), 8);
    }

    #[test]
    fn pawn_attacks_and_pushes() {
        assert_eq!(pawn_attacks(Color::White, Square::A2.into()), Square::B3.into());
        assert_eq!(pawn_attacks(Color::Black, Square::E7.into()),
            squares(&[Square::D6, Square::F6]));

        assert_eq!(pawn_pushes(Color::White, Square::E2.into(), Bitboard::ALL),
            squares(&[Square::E3, Square::E4]));
        assert_eq!(pawn_pushes(Color::Black, Square::E7.into(), Bitboard::ALL),
            squares(&[Square::E6, Square::E5]));
        assert_eq!(pawn_pushes(Color::White, Square::E3.into(), Bitboard::ALL),
            Square::E4.into());

        // blocked directly in front
        let empty = !Bitboard::from(Square::E3);
        assert!(pawn_pushes(Color::White, Square::E2.into(), empty).is_empty());
    }

    #[test]
    fn ray_between_includes_the_target() {
        assert_eq!(ray_between(Square::E1, Square::E4),
            squares(&[Square::E2, Square::E3, Square::E4]));
        assert_eq!(ray_between(Square::H8, Square::E5),
            squares(&[Square::G7, Square::F6, Square::E5]));
        assert_eq!(ray_between(Square::A1, Square::B1), Square::B1.into());
    }

    #[test]
    #[should_panic]
    fn ray_between_panics_when_not_aligned() {
        ray_between(Square::A1, Square::B3);
    }
}
