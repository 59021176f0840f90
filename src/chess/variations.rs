//! Module for counting and printing the number of variations from a given position
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::panic;
use std::thread;
use crate::chess::*;

/// Print the number of variations of the given `depth` for each legal move from `pos`
pub fn print(pos: &mut Position, depth: usize) -> usize {
    if depth < 1 {
        return 1;
    }

    let mut total = 0;

    for m in pos.generate_moves() {
        pos.make_move(m);
        let count = count(pos, depth - 1);
        total += count;
        println!("\t{:7}\t{:12}\t{}", m, count, pos);
        pos.unmake_move();
    }

    total
}

/// Count the number of variations of the given `depth` from `pos`
pub fn count(pos: &mut Position, depth: usize) -> usize {
    if depth < 1 {
        return 1;
    }

    let moves = pos.generate_moves();
    if depth == 1 {
        return moves.len();
    }

    let mut total = 0;
    for m in moves {
        pos.make_move(m);
        total += count(pos, depth - 1);
        pos.unmake_move();
    }

    total
}

/// Count the number of variations of the given `depth` from `pos`, splitting the moves from `pos`
/// between `threads` worker threads.
///
/// Each worker gets its own copy of the position and every `threads`-th root move.
pub fn count_parallel(pos: &Position, depth: usize, threads: usize) -> usize {
    if depth < 2 || threads < 2 {
        return count(&mut pos.clone(), depth);
    }

    let moves = pos.legal_moves();
    let handles: Vec<_> = (0..threads.min(moves.len())).map(|i| {
        let mut pos = pos.clone();
        let share: Vec<Move> = moves.iter().skip(i).step_by(threads).copied().collect();

        thread::spawn(move || {
            let mut total = 0;
            for m in share {
                pos.make_move(m);
                total += count(&mut pos, depth - 1);
                pos.unmake_move();
            }
            total
        })
    }).collect();

    handles.into_iter()
        .map(|handle| handle.join().unwrap_or_else(|error| panic::resume_unwind(error)))
        .sum()
}
