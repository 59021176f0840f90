//! Tests the search engine through its public interface
//
//  Copyright 2020 Michael Leany
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::sync::Arc;
use std::time::Duration;
use chessington::chess::{Position, Tables};
use chessington::engine::{Engine, Score, SearchLimits, SearchParameters, Thinking};
use chessington::protocol::uci::set_up_position;

fn engine() -> Engine {
    Engine::new(SearchParameters { hash_size_mb: 1, ..SearchParameters::default() })
}

fn search_to(pos: &mut Position, depth: usize) -> Thinking {
    engine().search(pos, &SearchLimits::depth(depth), |_| true)
}

#[test]
fn fixed_depth_searches_are_deterministic() {
    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
    let mut pos: Position = fen.parse().expect("valid FEN");

    let first = search_to(&mut pos, 4);
    let second = search_to(&mut pos, 4);

    assert_eq!(first.best_move(), second.best_move());
    assert_eq!(first.score(), second.score());
    assert_eq!(first.nodes(), second.nodes());
    assert_eq!(first.pv(), second.pv());
    assert_eq!(pos.to_fen_str(), fen);
}

#[test]
fn principle_variation_is_playable() {
    let mut pos = Position::new();
    let thinking = search_to(&mut pos, 4);

    assert!(!thinking.pv().is_empty());
    for &mv in thinking.pv() {
        assert!(pos.generate_moves().contains(mv), "{} is not legal in {}", mv, pos);
        pos.make_move(mv);
    }
}

#[test]
fn finds_mate_in_two() {
    let mut pos: Position = "k7/8/2K5/8/8/8/8/7R w - - 0 1".parse().expect("valid FEN");
    let thinking = search_to(&mut pos, 6);

    assert_eq!(thinking.score(), Score::mates_in(3));
    assert_eq!(thinking.score().mate_moves(), Some(2));
    assert!(thinking.to_string().contains("score mate 2"));
}

#[test]
fn checkmated_and_stalemated_sides_have_no_move() {
    let mut mated: Position = "R5k1/5ppp/8/8/8/8/5PPP/6K1 b - - 0 1".parse().expect("valid FEN");
    let thinking = search_to(&mut mated, 4);
    assert_eq!(thinking.best_move(), None);
    assert!(thinking.score() < -Score::from(9000));

    let mut stalemate: Position = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".parse().expect("valid FEN");
    let thinking = search_to(&mut stalemate, 4);
    assert_eq!(thinking.best_move(), None);
    assert_eq!(thinking.score(), Score::draw());
}

#[test]
fn losing_side_repeats_for_a_draw() {
    let tables = Arc::new(Tables::new());
    let moves: Vec<String> = [
        "h1g1", "a8b8", "g1h1", "b8a8",
        "h1g1", "a8b8", "g1h1", "b8a8",
        "h1g1", "a8b8",
    ].iter().map(|s| s.to_string()).collect();
    let mut pos = set_up_position(&tables, Some("K7/8/Q7/8/8/8/8/7k b - - 0 1"), &moves)
        .expect("legal moves");

    let thinking = search_to(&mut pos, 3);
    assert_eq!(thinking.best_move().map(|mv| mv.to_string()), Some("g1h1".to_string()));
    assert_eq!(thinking.score(), Score::draw());
}

#[test]
fn deeper_limits_complete_deeper_searches() {
    let mut pos = Position::new();
    assert_eq!(search_to(&mut pos, 2).depth(), 2);
    assert_eq!(search_to(&mut pos, 4).depth(), 4);
}

#[test]
fn larger_time_budgets_never_complete_less() {
    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
    let mut pos: Position = fen.parse().expect("valid FEN");

    let mut completed = Vec::new();
    for &ms in &[10, 100, 400] {
        let limits = SearchLimits::time(Duration::from_millis(ms));
        completed.push(engine().search(&mut pos, &limits, |_| true).depth());
    }

    assert!(completed[0] >= 1);
    assert!(completed.windows(2).all(|w| w[0] <= w[1]), "completed depths: {:?}", completed);
}

#[test]
fn time_limited_search_returns_a_move() {
    let mut pos = Position::new();
    let thinking = engine().search(&mut pos, &SearchLimits::time(Duration::from_millis(50)), |_| true);

    assert!(thinking.depth() >= 1);
    assert!(thinking.best_move().is_some());
    assert_eq!(pos, Position::new());
}

#[test]
fn new_game_keeps_results_reproducible() {
    let mut engine = engine();
    let mut pos = Position::new();

    let first = engine.search(&mut pos, &SearchLimits::depth(3), |_| true);
    engine.new_game();
    let second = engine.search(&mut pos, &SearchLimits::depth(3), |_| true);

    assert_eq!(first.best_move(), second.best_move());
    assert_eq!(first.score(), second.score());
}
