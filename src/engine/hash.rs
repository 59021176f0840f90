//! The Transposition Table
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::mem::size_of;
use crate::chess::{Move, Zobrist};
use crate::engine::Score;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Indicates the kind of bound a transposition table has.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bound {
    /// The true score is at least this high (the search failed high)
    Lower,
    /// The score is exact
    Exact,
    /// The true score is at most this high (the search failed low)
    Upper,
}

impl Bound {
    /// Classifies a score against the window it was searched with
    pub fn from_window(score: Score, alpha: Score, beta: Score) -> Bound {
        if score >= beta {
            Bound::Lower
        } else if score > alpha {
            Bound::Exact
        } else {
            Bound::Upper
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// An entry in the transposition table.
///
/// Only the top 16 bits of the fingerprint are kept; the rest is implied by where the entry is
/// stored. It is guaranteed to be exactly 12 bytes, including as an `Option`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HashEntry {
    // 4 bytes
    best_move: Option<Move>,
    // 2 bytes
    key: u16,
    // 2 bytes
    score: Score,
    // 1 byte
    depth: i8,
    // 1 byte
    bound: Bound,
    // 1 byte
    age: u8,
}

impl HashEntry {
    pub fn new(
        zobrist: Zobrist,
        age: u8, depth: i8,
        bound: Bound, score: Score,
        best_move: Option<Move>)
    -> HashEntry {
        HashEntry {
            best_move,
            key: key_of(zobrist),
            score,
            depth,
            bound,
            age,
        }
    }

    /// Returns `true` if the entry may belong to the position with this fingerprint
    pub fn matches(&self, zobrist: Zobrist) -> bool {
        self.key == key_of(zobrist)
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn depth(&self) -> i8 {
        self.depth
    }

    pub fn bound(&self) -> Bound {
        self.bound
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// The best move found, which must be checked against the legal moves before use
    pub fn best_move(&self) -> Option<Move> {
        self.best_move
    }
}

fn key_of(zobrist: Zobrist) -> u16 {
    (u64::from(zobrist) >> 48) as u16
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A transposition table
///
/// Each fingerprint maps to a small group of buckets. A new entry takes an empty bucket or the
/// bucket already holding the same position; failing that, it evicts the shallowest entry that it
/// out-searches by `replace_depth` plies or out-dates by `replace_age` searches.
#[derive(Debug)]
pub struct HashTable {
    table: Vec<BucketList>,
    replace_depth: i8,
    replace_age: u8,
}
type BucketList = [Option<HashEntry>; HashTable::BUCKETS];

impl HashTable {
    const BUCKETS: usize = 4;

    /// Creates a table using at most `size_mb` megabytes, but never less than one group of buckets
    pub fn new(size_mb: usize, replace_depth: i8, replace_age: u8) -> HashTable {
        HashTable {
            table: vec![[None; Self::BUCKETS]; Self::groups(size_mb)],
            replace_depth,
            replace_age,
        }
    }

    fn groups(size_mb: usize) -> usize {
        let groups = (size_mb << 20)/size_of::<BucketList>();
        if groups < 2 {
            1
        } else if groups.is_power_of_two() {
            groups
        } else {
            groups.next_power_of_two()/2
        }
    }

    /// Returns the number of entries the table can hold
    pub fn capacity(&self) -> usize {
        self.table.len()*Self::BUCKETS
    }

    /// Returns the number of occupied entries per thousand, sampled from the start of the table
    pub fn usage_permille(&self) -> usize {
        let sample = self.table.len().min(1_000/Self::BUCKETS);
        let used: usize = self.table[..sample].iter()
            .map(|list| list.iter().filter(|e| e.is_some()).count())
            .sum();
        used*1_000/(sample*Self::BUCKETS)
    }

    fn index(&self, zobrist: Zobrist) -> usize {
        u64::from(zobrist) as usize & (self.table.len() - 1)
    }

    /// Looks up a position. Mate scores are returned relative to `cur_ply`.
    pub fn get(&self, zobrist: Zobrist, cur_ply: usize) -> Option<HashEntry> {
        let mut entry = self.table[self.index(zobrist)].iter()
            .flatten()
            .find(|entry| entry.matches(zobrist))
            .copied()?;

        if entry.score >= Score::mates_in(Score::MAX_MATE_PLY) {
            entry.score = entry.score - cur_ply as i16;
        } else if entry.score <= Score::mated_in(Score::MAX_MATE_PLY) {
            entry.score = entry.score + cur_ply as i16;
        }

        Some(entry)
    }

    /// Stores an entry, if the replacement policy allows. Mate scores are given relative to
    /// `cur_ply`, and stored relative to the position itself.
    pub fn insert(&mut self, zobrist: Zobrist, mut new_entry: HashEntry, cur_ply: usize) {
        let index = self.index(zobrist);

        if new_entry.score >= Score::mates_in(Score::MAX_MATE_PLY) {
            new_entry.score = new_entry.score + cur_ply as i16;
        } else if new_entry.score <= Score::mated_in(Score::MAX_MATE_PLY) {
            new_entry.score = new_entry.score - cur_ply as i16;
        }

        let mut bucket = None;
        let mut weakest = i16::max_value();
        for (b, slot) in self.table[index].iter().enumerate() {
            match slot {
                // buckets fill in order and are never emptied one at a time
                None => {
                    bucket = Some(b);
                    break;
                },
                Some(entry) if entry.key == new_entry.key => {
                    if new_entry.depth >= entry.depth {
                        bucket = Some(b);
                    } else {
                        bucket = None;
                    }
                    break;
                },
                Some(entry) => {
                    let deeper = i16::from(new_entry.depth) - i16::from(entry.depth)
                        >= i16::from(self.replace_depth);
                    let newer = new_entry.age.wrapping_sub(entry.age) >= self.replace_age;
                    if (deeper || newer) && i16::from(entry.depth) < weakest {
                        weakest = i16::from(entry.depth);
                        bucket = Some(b);
                    }
                },
            }
        }

        if let Some(b) = bucket {
            self.table[index][b] = Some(new_entry);
        }
    }

    pub fn clear(&mut self) {
        for list in self.table.iter_mut() {
            *list = [None; Self::BUCKETS];
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod test {
    use super::*;
    use crate::chess::{Position, Piece, Square};

    fn zobrist(fen: &str) -> Zobrist {
        Position::from_fen_str(fen).expect("valid fen").zobrist_key()
    }

    #[test]
    fn hash_entry_size() {
        assert_eq!(size_of::<HashEntry>(), 12);
        assert_eq!(size_of::<Option<HashEntry>>(), 12);
    }

    #[test]
    fn table_size() {
        assert_eq!(HashTable::new(0, 1, 7).capacity(), HashTable::BUCKETS);
        let table = HashTable::new(1, 1, 7);
        assert!(table.capacity()*size_of::<Option<HashEntry>>() <= 1 << 20);
        assert!(table.capacity()*size_of::<Option<HashEntry>>() > 1 << 19);
        assert!(table.table.len().is_power_of_two());
    }

    #[test]
    fn store_and_probe() {
        let mut table = HashTable::new(1, 1, 7);
        let key = zobrist("4k3/8/8/8/8/8/8/4K2R w K - 0 1");
        let mv = Move::new(Square::H1, Square::H8, Piece::Rook, None);

        assert_eq!(table.get(key, 0), None);
        table.insert(key, HashEntry::new(key, 0, 3, Bound::Exact, Score::from(25), Some(mv)), 0);

        let entry = table.get(key, 0).expect("stored entry");
        assert_eq!(entry.best_move(), Some(mv));
        assert_eq!(entry.depth(), 3);
        assert_eq!(entry.bound(), Bound::Exact);
        assert_eq!(entry.score(), Score::from(25));

        table.clear();
        assert_eq!(table.get(key, 0), None);
    }

    #[test]
    fn mate_scores_are_relative_to_the_node() {
        let mut table = HashTable::new(1, 1, 7);
        let key = zobrist("4k3/8/8/8/8/8/8/4K2R w K - 0 1");

        // found mate in 5 from the root while 2 plies deep: mate in 3 from here
        table.insert(key, HashEntry::new(key, 0, 4, Bound::Exact, Score::mates_in(5), None), 2);
        assert_eq!(table.get(key, 2).map(|e| e.score()), Some(Score::mates_in(5)));
        assert_eq!(table.get(key, 6).map(|e| e.score()), Some(Score::mates_in(9)));

        table.insert(key, HashEntry::new(key, 0, 4, Bound::Exact, Score::mated_in(4), None), 1);
        assert_eq!(table.get(key, 0).map(|e| e.score()), Some(Score::mated_in(3)));
    }

    #[test]
    fn replacement_policy() {
        // a single group of buckets, so every position competes for the same slots
        let mut table = HashTable::new(0, 2, 3);
        let keys: Vec<Zobrist> = ["P7", "1P6", "2P5", "3P4", "4P3", "5P2"].iter()
            .map(|rank| zobrist(&format!("4k3/8/8/8/8/8/{}/4K3 w - - 0 1", rank)))
            .collect();
        let entry = |k: Zobrist, age: u8, depth: i8| {
            HashEntry::new(k, age, depth, Bound::Lower, Score::from(depth as i16), None)
        };

        for &k in &keys[..4] {
            table.insert(k, entry(k, 0, 5), 0);
        }
        for &k in &keys[..4] {
            assert!(table.get(k, 0).is_some());
        }
        assert_eq!(table.usage_permille(), 1_000);

        // same depth and age: nothing is evicted
        table.insert(keys[4], entry(keys[4], 0, 5), 0);
        assert!(table.get(keys[4], 0).is_none());

        // enough extra depth evicts something
        table.insert(keys[4], entry(keys[4], 0, 7), 0);
        assert!(table.get(keys[4], 0).is_some());

        // so does enough age
        table.insert(keys[5], entry(keys[5], 3, 1), 0);
        assert!(table.get(keys[5], 0).is_some());

        // the same position is only replaced by an equal or deeper search
        table.insert(keys[4], entry(keys[4], 3, 2), 0);
        assert_eq!(table.get(keys[4], 0).map(|e| e.depth()), Some(7));
        table.insert(keys[4], entry(keys[4], 3, 9), 0);
        assert_eq!(table.get(keys[4], 0).map(|e| e.depth()), Some(9));
    }

    #[test]
    fn bound_from_window() {
        let (alpha, beta) = (Score::from(-10), Score::from(10));
        assert_eq!(Bound::from_window(Score::from(10), alpha, beta), Bound::Lower);
        assert_eq!(Bound::from_window(Score::from(0), alpha, beta), Bound::Exact);
        assert_eq!(Bound::from_window(Score::from(-10), alpha, beta), Bound::Upper);
    }
}
