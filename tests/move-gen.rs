//! Checks the move generator against known perft counts
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use chessington::chess::{variations, Position, STARTING_FEN};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const ENDGAME: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const PROMOTIONS: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
const MIRRORED: &str = "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1";
const BUGGY: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
const MIDDLEGAME: &str = "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10";

fn count(fen: &str, depth: usize) -> usize {
    let mut pos: Position = fen.parse().expect("valid FEN");
    let before = pos.to_fen_str();
    let count = variations::count(&mut pos, depth);
    assert_eq!(pos.to_fen_str(), before, "position not restored after counting");
    count
}

fn check_depths(fen: &str, expected: &[usize]) {
    for (depth, &expected) in expected.iter().enumerate() {
        let depth = depth + 1;
        assert_eq!(count(fen, depth), expected, "{} at depth {}", fen, depth);
    }
}

mod standard_positions {
    use super::*;

    #[test]
    fn starting_position() {
        check_depths(STARTING_FEN, &[20, 400, 8902, 197281, 4865609]);
    }

    #[test]
    fn kiwipete() {
        check_depths(KIWIPETE, &[48, 2039, 97862, 4085603]);
    }

    #[test]
    fn endgame_with_en_passant_pins() {
        check_depths(ENDGAME, &[14, 191, 2812, 43238, 674624]);
    }

    #[test]
    fn promotions_and_castling() {
        check_depths(PROMOTIONS, &[6, 264, 9467, 422333]);
        check_depths(MIRRORED, &[6, 264, 9467, 422333]);
    }

    #[test]
    fn underpromotion_with_check() {
        check_depths(BUGGY, &[44, 1486, 62379, 2103487]);
    }

    #[test]
    fn quiet_middlegame() {
        check_depths(MIDDLEGAME, &[46, 2079, 89890]);
    }

    #[test]
    #[ignore]
    fn starting_position_deep() {
        assert_eq!(count(STARTING_FEN, 6), 119060324);
    }

    #[test]
    #[ignore]
    fn kiwipete_deep() {
        assert_eq!(count(KIWIPETE, 5), 193690690);
    }

    #[test]
    #[ignore]
    fn endgame_deep() {
        assert_eq!(count(ENDGAME, 7), 178633661);
    }
}

mod small_positions {
    use super::count;

    const CASES: &[(&str, usize)] = &[
        // castling rights
        ("4k3/8/8/8/8/8/8/4K2R w K - 0 1", 764643),
        ("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1", 846648),
        ("4k2r/8/8/8/8/8/8/4K3 w k - 0 1", 899442),
        ("r3k3/8/8/8/8/8/8/4K3 w q - 0 1", 1001523),
        ("8/8/8/8/8/8/6k1/4K2R w K - 0 1", 185867),
        ("8/8/8/8/8/8/1k6/R3K3 w Q - 0 1", 413018),
        ("4k2r/6K1/8/8/8/8/8/8 w k - 0 1", 179869),
        ("r3k3/1K6/8/8/8/8/8/8 w q - 0 1", 367724),
        ("4k3/8/8/8/8/8/8/4K2R b K - 0 1", 899442),
        ("8/8/8/8/8/8/6k1/4K2R b K - 0 1", 179869),
        // knights
        ("K7/8/2n5/1n6/8/8/8/k6N w - - 0 1", 588695),
        ("k7/8/2N5/1N6/8/8/8/K6n w - - 0 1", 688780),
        // queens
        ("6kq/8/8/8/8/8/8/7K w - - 0 1", 391507),
        ("6qk/8/8/8/8/8/8/7K b - - 0 1", 419369),
        // pawns
        ("8/8/8/8/8/K7/P7/k7 w - - 0 1", 6249),
        ("K7/p7/k7/8/8/8/8/8 w - - 0 1", 2343),
        ("8/2k1p3/3pP3/3P2K1/8/8/8/8 w - - 0 1", 34834),
        ("8/2k1p3/3pP3/3P2K1/8/8/8/8 b - - 0 1", 34822),
        ("8/8/8/8/8/4k3/4P3/4K3 w - - 0 1", 11848),
        ("8/8/3k4/3p4/3P4/3K4/8/8 w - - 0 1", 53138),
        ("k7/8/3p4/8/3P4/8/8/7K b - - 0 1", 21104),
        ("7k/3p4/8/8/3P4/8/8/K7 w - - 0 1", 32191),
        ("k7/8/8/7p/6P1/8/8/K7 w - - 0 1", 41874),
        ("k7/8/8/3p4/4p3/8/8/7K b - - 0 1", 22579),
        ("3k4/3pp3/8/8/8/8/3PP3/3K4 w - - 0 1", 199002),
        // promotions
        ("8/Pk6/8/8/8/8/6Kp/8 w - - 0 1", 1030499),
    ];

    #[test]
    fn depth_6() {
        for &(fen, expected) in CASES {
            assert_eq!(count(fen, 6), expected, "{}", fen);
        }
    }

    #[test]
    #[ignore]
    fn promotions_deep() {
        assert_eq!(count("n1n5/PPPk4/8/8/8/8/4Kppp/5N1N w - - 0 1", 6), 71179139);
        assert_eq!(count("n1n5/1Pk5/8/8/8/8/5Kp1/5N1N b - - 0 1", 6), 37665329);
    }
}

mod parallel {
    use super::*;

    #[test]
    fn matches_single_threaded_count() {
        let pos: Position = KIWIPETE.parse().expect("valid FEN");
        for threads in 1..=4 {
            assert_eq!(variations::count_parallel(&pos, 3, threads), 97862);
        }
        assert_eq!(variations::count_parallel(&pos, 1, 4), 48);
        assert_eq!(variations::count_parallel(&pos, 0, 4), 1);
    }
}
