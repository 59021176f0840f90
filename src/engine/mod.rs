//! The engine
//
//  Copyright 2019 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::cmp::{max, min, Reverse};
use std::fmt;
use std::time::{Duration, Instant};
use log::debug;
use crate::chess::{Position, Move, MoveKind};

pub mod eval;
pub mod hash;
pub mod params;
pub use eval::{Score, evaluate, piece_val};
pub use hash::{Bound, HashEntry, HashTable};
pub use params::{ConfigError, SearchParameters};

/// The deepest iteration a search will attempt, whatever the limits say
pub const MAX_DEPTH: i8 = 100;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Thinking output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thinking {
    score: Score,
    depth: usize,
    time: Duration,
    nodes: u64,
    pv: Vec<Move>,
}

impl Thinking {
    fn new() -> Self {
        Thinking {
            score: -Score::infinity(),
            depth: 0,
            time: Duration::from_secs(0),
            nodes: 0,
            pv: Vec::new(),
        }
    }

    /// Returns the estimated score for the principle variation.
    pub fn score(&self) -> Score {
        self.score
    }

    /// Returns the search depth that was reached.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the amount of time used for the search.
    pub fn time(&self) -> Duration {
        self.time
    }

    /// Returns the number of nodes searched.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Returns the average number of nodes searched per second.
    pub fn nps(&self) -> u64 {
        self.nodes*1000/max(self.time.as_millis() as u64, 1)
    }

    /// Returns the principle variation.
    pub fn pv(&self) -> &[Move] {
        &self.pv
    }

    /// Returns the best move found in the search.
    pub fn best_move(&self) -> Option<Move> {
        self.pv.first().copied()
    }

    /// Returns the best move to ponder on.
    pub fn ponder_move(&self) -> Option<Move> {
        self.pv.get(1).copied()
    }
}

/// Written in the form of a UCI `info` line, without the leading `info`
impl fmt::Display for Thinking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "depth {} score {} nodes {} nps {} time {}",
            self.depth, self.score, self.nodes, self.nps(), self.time.as_millis())?;
        if !self.pv.is_empty() {
            write!(f, " pv")?;
            for mv in &self.pv {
                write!(f, " {}", mv)?;
            }
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Limits on a single search.
///
/// The time budget is only checked between iterations, so a search can overrun it by up to one
/// iteration. With neither limit set, the configured default budget applies, unless the search is
/// `infinite`. An infinite search has no time budget and ends only at the depth limit or when the
/// report callback says to stop.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// The last depth to search, if less than the configured maximum
    pub depth: Option<usize>,
    /// The time budget
    pub time: Option<Duration>,
    /// Search until stopped
    pub infinite: bool,
}

impl SearchLimits {
    /// Limits a search by depth alone
    pub fn depth(depth: usize) -> Self {
        SearchLimits { depth: Some(depth), ..SearchLimits::default() }
    }

    /// Limits a search by time alone
    pub fn time(time: Duration) -> Self {
        SearchLimits { time: Some(time), ..SearchLimits::default() }
    }

    /// A search that runs until it is stopped
    pub fn infinite() -> Self {
        SearchLimits { infinite: true, ..SearchLimits::default() }
    }

    /// The time budget a search with these limits gets, given the default budget
    pub fn budget(&self, default_time: Duration) -> Option<Duration> {
        match self {
            SearchLimits { infinite: true, .. } => None,
            SearchLimits { time: Some(time), .. } => Some(*time),
            SearchLimits { depth: Some(_), .. } => None,
            SearchLimits { depth: None, time: None, .. } => Some(default_time),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The engine
///
/// Searches run on the caller's thread and borrow the position mutably for their duration, making
/// and unmaking moves on it. The position is returned in the state it was given.
#[derive(Debug)]
pub struct Engine {
    params: SearchParameters,
    hash: HashTable,
    killers: Vec<[Option<Move>; 2]>,
    root_move: Option<Move>,
    nodes: u64,
    age: u8,
}

impl Engine {
    /// Creates a new Engine.
    pub fn new(params: SearchParameters) -> Self {
        let hash = HashTable::new(
            if params.use_hash { params.hash_size_mb } else { 0 },
            params.replace_depth,
            params.replace_age,
        );

        Engine {
            params,
            hash,
            killers: Vec::new(),
            root_move: None,
            nodes: 0,
            age: 0,
        }
    }

    /// Returns the parameters the engine searches with
    pub fn params(&self) -> &SearchParameters {
        &self.params
    }

    /// Replaces the transposition table with an empty one of the given size
    pub fn set_hash_size(&mut self, size_mb: usize) {
        self.params.hash_size_mb = size_mb;
        self.hash = HashTable::new(size_mb, self.params.replace_depth, self.params.replace_age);
    }

    /// Forgets everything learned from earlier searches
    pub fn new_game(&mut self) {
        self.hash.clear();
        self.age = 0;
    }

    /// Searches `pos` for the best move by iterative deepening.
    ///
    /// After every completed iteration `report` receives the thinking so far; returning `false`
    /// stops the search. The thinking from the last completed iteration is returned. If there are
    /// no legal moves, it has an empty principle variation and the checkmate or stalemate score.
    pub fn search<F>(&mut self, pos: &mut Position, limits: &SearchLimits, mut report: F)
        -> Thinking
        where F: FnMut(&Thinking) -> bool {
        let start_time = Instant::now();
        let budget = limits.budget(self.params.default_time());
        let max_depth = limits.depth
            .map_or(self.params.max_depth, |depth| depth.min(MAX_DEPTH as usize) as i8)
            .min(MAX_DEPTH)
            .max(1);

        let mut thinking = Thinking::new();
        self.nodes = 0;
        self.age = self.age.wrapping_add(1);
        self.killers.clear();
        self.root_move = None;

        debug!("searching: {}", pos);
        let moves = pos.generate_moves();
        if moves.is_empty() {
            thinking.score = if pos.in_check() { Score::mated_in(0) } else { Score::draw() };
            return thinking;
        }

        let mut depth = self.params.starting_depth.max(1).min(max_depth);
        while depth <= max_depth {
            let (score, pv) = self.search_root(pos, depth, thinking.score);

            thinking.score = score;
            thinking.depth = depth as usize;
            thinking.pv = pv;
            thinking.time = start_time.elapsed();
            thinking.nodes = self.nodes;
            self.root_move = thinking.best_move();
            debug!("{}", thinking);

            if !report(&thinking) || moves.len() == 1 {
                break;
            }
            if let Some(mate) = score.mate_moves() {
                // a mate found within the full-width search can't get any shorter
                if usize::from(mate.abs() as u16)*2 <= depth as usize {
                    break;
                }
            }
            if budget.map_or(false, |budget| start_time.elapsed() >= budget) {
                break;
            }
            depth += 1;
        }

        thinking
    }

    /// Searches the root to `depth`, first within an aspiration window around `prev_score`,
    /// widening it whenever the score falls outside.
    fn search_root(&mut self, pos: &mut Position, depth: i8, prev_score: Score)
        -> (Score, Vec<Move>) {
        let window = self.params.aspiration_window;
        let (mut alpha, mut beta) = (-Score::infinity(), Score::infinity());
        if window > 0 && depth >= self.params.aspiration_min_depth && !prev_score.is_mate()
            && prev_score > -Score::infinity() {
            alpha = max(prev_score - window, -Score::infinity());
            beta = min(prev_score + window, Score::infinity());
        }

        loop {
            let mut pv = Vec::new();
            let score = self.negamax(pos, 0, depth, alpha, beta, false, &mut pv);

            if score <= alpha && alpha > -Score::infinity() {
                debug!("depth {} failed low at {}", depth, score);
                alpha = -Score::infinity();
            } else if score >= beta && beta < Score::infinity() {
                debug!("depth {} failed high at {}", depth, score);
                beta = Score::infinity();
            } else {
                return (score, pv);
            }
        }
    }

    /// Searches the current position to `depth`, looking for a maximum score of `beta` and a
    /// minimum score of `alpha`. The principle variation is written to `pv`.
    #[allow(clippy::too_many_arguments)]
    fn negamax(&mut self,
        pos: &mut Position, ply: usize, depth: i8,
        mut alpha: Score, beta: Score,
        null_ok: bool, pv: &mut Vec<Move>)
    -> Score {
        pv.clear();

        if ply > 0 && (pos.fifty_moves() || pos.is_threefold()) {
            return Score::draw();
        }

        // leaf node
        if depth <= 0 {
            return if self.params.use_quiescence {
                self.quiesce(pos, ply, 0, alpha, beta)
            } else {
                self.nodes += 1;
                evaluate(pos)
            };
        }

        self.nodes += 1;
        let moves = pos.generate_moves();
        if moves.is_empty() {
            return if pos.in_check() { Score::mated_in(ply) } else { Score::draw() };
        }

        let zobrist = pos.zobrist_key();
        let mut hash_move = None;
        if self.params.use_hash {
            if let Some(entry) = self.hash.get(zobrist, ply) {
                // a stale or colliding entry may hold a move that isn't legal here
                hash_move = entry.best_move().filter(|&mv| moves.contains(mv));

                if let Some(mv) = hash_move {
                    if ply > 0 && entry.depth() >= depth {
                        let score = entry.score();
                        let usable = match entry.bound() {
                            Bound::Exact => true,
                            Bound::Lower => score >= beta,
                            Bound::Upper => score <= alpha,
                        };
                        if usable {
                            pv.push(mv);
                            return score;
                        }
                    }
                }
            }
        }
        if ply == 0 && hash_move.is_none() {
            hash_move = self.root_move.filter(|&mv| moves.contains(mv));
        }

        if null_ok && self.params.use_null_move
            && !pos.in_check()
            && !beta.is_mate()
            && pos.has_non_pawn_material(pos.turn())
            && evaluate(pos) >= beta {
            let reduction = max(self.params.null_move_reduction, 0);

            pos.make_null_move();
            let score = -self.negamax(pos, ply + 1, depth - 1 - reduction, -beta, -beta + 1, false,
                &mut Vec::new());
            pos.unmake_null_move();

            if score >= beta {
                return if score.is_mate() { beta } else { score };
            }
        }

        let killers = if self.params.use_killers { self.killers_at(ply) } else { [None; 2] };
        let mut ordered: Vec<(i32, Move)> = moves.iter()
            .map(|&mv| (order_score(mv, hash_move, &killers), mv))
            .collect();
        ordered.sort_by_key(|&(score, _)| Reverse(score));

        let orig_alpha = alpha;
        let mut best_score = -Score::infinity();
        let mut best_move = None;
        let mut child_pv = Vec::new();

        for (_, mv) in ordered {
            pos.make_move(mv);
            let score = -self.negamax(pos, ply + 1, depth - 1, -beta, -alpha, true, &mut child_pv);
            pos.unmake_move();

            if score > best_score {
                best_score = score;
                best_move = Some(mv);

                if score > alpha {
                    alpha = score;
                    pv.clear();
                    pv.push(mv);
                    pv.extend_from_slice(&child_pv);
                }
            }

            if score >= beta {
                if !mv.is_tactical() {
                    self.add_killer(ply, mv);
                }
                break;
            }
        }

        if self.params.use_hash {
            let bound = Bound::from_window(best_score, orig_alpha, beta);
            self.hash.insert(zobrist,
                HashEntry::new(zobrist, self.age, depth, bound, best_score, best_move), ply);
        }

        best_score
    }

    /// Searches only tactical moves from the current position, looking for a maximum score of
    /// `beta` and a minimum score of `alpha`. Positions in check search every evasion, and the
    /// first ply may also try quiet checks.
    fn quiesce(&mut self, pos: &mut Position, ply: usize, qply: i8, mut alpha: Score, beta: Score)
        -> Score {
        self.nodes += 1;

        let in_check = pos.in_check();
        let moves = pos.generate_moves();
        if moves.is_empty() {
            return if in_check { Score::mated_in(ply) } else { Score::draw() };
        }

        let stand_pat = evaluate(pos);
        if qply >= self.params.max_quiescence_depth {
            return stand_pat;
        }

        let mut best_score = -Score::infinity();
        if !in_check {
            if stand_pat >= beta {
                return stand_pat;
            }
            best_score = stand_pat;
            alpha = max(alpha, stand_pat);
        }

        let try_checks = !in_check && qply == 0 && self.params.quiescence_checks;
        let mut ordered: Vec<(i32, Move)> = moves.iter()
            .filter(|mv| in_check || try_checks || mv.is_tactical())
            .map(|&mv| (order_score(mv, None, &[None; 2]), mv))
            .collect();
        ordered.sort_by_key(|&(score, _)| Reverse(score));

        for (_, mv) in ordered {
            if !in_check && self.params.use_delta && mv.kind() != MoveKind::Promotion {
                if let Some(captured) = mv.captured().filter(|_| mv.is_capture()) {
                    if stand_pat + piece_val(captured) + self.params.delta_margin < alpha {
                        continue;
                    }
                }
            }

            pos.make_move(mv);
            if !in_check && !mv.is_tactical() && !pos.in_check() {
                pos.unmake_move();
                continue;
            }
            let score = -self.quiesce(pos, ply + 1, qply + 1, -beta, -alpha);
            pos.unmake_move();

            if score >= beta {
                return score;
            }
            best_score = max(best_score, score);
            alpha = max(alpha, best_score);
        }

        best_score
    }

    fn killers_at(&mut self, ply: usize) -> [Option<Move>; 2] {
        if self.killers.len() <= ply {
            self.killers.resize(ply + 1, [None; 2]);
        }
        self.killers[ply]
    }

    fn add_killer(&mut self, ply: usize, mv: Move) {
        if !self.params.use_killers {
            return;
        }
        let killers = {
            self.killers_at(ply);
            &mut self.killers[ply]
        };
        if killers[0] != Some(mv) {
            killers[1] = killers[0];
            killers[0] = Some(mv);
        }
    }
}

/// Ranks a move for searching: the cached move, then captures and promotions by most valuable
/// victim and least valuable attacker, then killers, then the rest.
fn order_score(mv: Move, hash_move: Option<Move>, killers: &[Option<Move>; 2]) -> i32 {
    if Some(mv) == hash_move {
        return 1_000_000;
    }

    if mv.is_tactical() {
        let victim = if mv.is_capture() {
            mv.captured().map_or(0, piece_val)
        } else {
            0
        };
        let promotion = mv.promotion_piece().map_or(0, |p| piece_val(p.into()));
        let attacker = piece_val(mv.piece());
        return 100_000 + 10*i32::from(victim + promotion) - i32::from(attacker);
    }

    if Some(mv) == killers[0] {
        90_000
    } else if Some(mv) == killers[1] {
        89_000
    } else {
        0
    }
}
