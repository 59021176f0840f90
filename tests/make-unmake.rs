//! Walks move trees checking that making and unmaking moves keeps the position consistent
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use chessington::chess::{Position, STARTING_FEN};

const POSITIONS: &[&str] = &[
    STARTING_FEN,
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
];

/// Checks every node of the tree below `pos` to `depth`
fn walk(pos: &mut Position, depth: usize) {
    if depth == 0 {
        return;
    }

    let before = pos.clone();
    for mv in before.legal_moves() {
        let us = pos.turn();
        pos.make_move(mv);

        assert!(!pos.is_attacked(pos.king_square(us), pos.turn()),
            "{} leaves the king attacked in {}", mv, before);
        assert_eq!(pos.last_move(), Some(mv));

        let fresh = Position::from_fen_with_tables(&pos.to_fen_str(), pos.tables().clone())
            .expect("generated positions are valid");
        assert_eq!(pos.zobrist_key(), fresh.zobrist_key(), "after {} in {}", mv, before);

        walk(pos, depth - 1);

        assert_eq!(pos.unmake_move(), Some(mv));
        assert_eq!(*pos, before, "after undoing {}", mv);
    }
}

#[test]
fn trees_stay_consistent() {
    for fen in POSITIONS {
        let mut pos: Position = fen.parse().expect("valid FEN");
        walk(&mut pos, 2);
        assert_eq!(pos.to_fen_str(), *fen);
    }
}

#[test]
fn null_moves_restore_the_position() {
    for fen in POSITIONS {
        let mut pos: Position = fen.parse().expect("valid FEN");
        if pos.in_check() {
            continue;
        }
        let before = pos.clone();

        pos.make_null_move();
        assert_eq!(pos.turn(), !before.turn());
        assert_ne!(pos.zobrist_key(), before.zobrist_key());
        assert_eq!(pos.draw_plies(), 0);

        pos.unmake_null_move();
        assert_eq!(pos, before);
    }
}

#[test]
fn long_game_unwinds_to_the_start() {
    let mut pos = Position::new();
    let start = pos.clone();
    let moves = [
        "e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4", "f3d4", "g8f6", "b1c3", "a7a6",
        "c1e3", "e7e5", "d4b3", "c8e6", "f2f3", "f8e7", "d1d2", "e8g8", "e1c1", "b8d7",
        "g2g4", "b7b5", "g4g5", "b5b4", "c3e2", "f6e8", "f3f4", "a6a5", "f4f5", "a5a4",
    ];

    for s in moves.iter() {
        let mv = pos.parse_move(s).expect("legal move");
        pos.make_move(mv);
    }
    assert_eq!(pos.move_num(), 16);
    assert!(pos.castling().is_empty());

    while pos.unmake_move().is_some() { }
    assert_eq!(pos, start);
}
