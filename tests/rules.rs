/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use xiangqi::{Ai, Color, Difficulty, Game, GamePosition, GameStatus, Position};

fn sq(s: &str) -> Position {
    s.parse().unwrap()
}

#[test]
fn test_lone_soldier_only_moves_forward() {
    let mut game = Game::from_position(
        GamePosition::from_fen("3k5/9/9/9/9/9/4P4/9/9/5K3 w").unwrap(),
    );

    assert!(game.select_piece(Position::new(6, 4)));
    assert_eq!(game.position().valid_moves(), [Position::new(5, 4)]);
}

#[test]
fn test_soldier_moves_sideways_across_the_river() {
    let game = Game::from_position(
        GamePosition::from_fen("3k5/9/9/9/4P4/9/9/9/9/5K3 w").unwrap(),
    );

    let mut dests = game.legal_destinations(Position::new(4, 4));
    dests.sort();
    assert_eq!(
        dests,
        [Position::new(3, 4), Position::new(4, 3), Position::new(4, 5)]
    );
}

#[test]
fn test_ai_finds_a_legal_opening_move() {
    let game = Game::new();
    let ai = Ai::new(Difficulty::Easy);

    let res = ai.search(game.position());
    let mv = res.bestmove.expect("the start position has legal moves");

    assert!(game.legal_destinations(mv.from()).contains(&mv.to()));
    assert_eq!(mv.piece().color(), Color::Red);
    assert!(res.nodes > 44);

    // The search worked on a copy
    assert_eq!(game.snapshot(), GamePosition::new());
}

#[test]
fn test_checkmate_flow() {
    let mut game = Game::from_position(
        GamePosition::from_fen("4k4/R8/9/9/9/8R/9/9/9/3K5 w").unwrap(),
    );
    assert_eq!(game.position().status(), GameStatus::Playing);

    game.make_move_str("i4i9").unwrap();
    let position = game.position();
    assert_eq!(position.status(), GameStatus::Checkmate);
    assert_eq!(position.winner(), Some(Color::Red));
    assert!(game.is_game_over());
    assert!(game.get_all_valid_moves().is_empty());

    // Nothing moves once the game is over
    assert!(!game.make_move(sq("e9"), sq("d9")));

    assert!(game.undo_last_move());
    assert_eq!(game.position().status(), GameStatus::Playing);
    assert_eq!(game.position().winner(), None);
    assert_eq!(game.position().side_to_move(), Color::Red);
}

#[test]
fn test_capture_and_undo_round_trip() {
    let mut game = Game::new();
    let start = game.snapshot();

    game.make_move_str("h2e2").unwrap();
    game.make_move_str("h7e7").unwrap();
    game.make_move_str("e2e6").unwrap();

    let history = game.position().history();
    assert_eq!(history.len(), 3);
    assert!(history[2].is_capture());
    assert_eq!(game.move_history(), ["Ch2e2", "Ch7e7", "Ce2xe6"]);
    assert_eq!(game.position().board().piece_count(), 31);

    while game.undo_last_move() {}
    assert_eq!(game.snapshot(), start);
}

#[test]
fn test_difficulty_changes_take_effect_mid_game() {
    let mut game = Game::new();
    let mut ai = Ai::new(Difficulty::Easy);

    let mv = ai.best_move(game.position()).unwrap();
    assert!(game.make_move(mv.from(), mv.to()));

    ai.set_difficulty(Difficulty::Medium);
    assert_eq!(ai.config().max_depth, 4);
    assert_eq!("hard".parse::<Difficulty>().unwrap().depth(), 6);
}
