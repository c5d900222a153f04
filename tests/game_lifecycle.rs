//! End-to-end liveness: a full `Game` (dealer + bot players, all real
//! threads) must terminate promptly once asked to, and never needs more
//! than a bounded wait to do so.

mod common;

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use common::RecordingUi;
use set_table::{Game, GameConfig};
use std::sync::Arc;

fn small_bot_config() -> GameConfig {
    GameConfig {
        players: 3,
        deck_size: 27,
        table_size: 12,
        feature_size: 3,
        card_attributes: 3,
        feature_radix: 3,
        turn_timeout_millis: 500,
        turn_timeout_warning_millis: 100,
        point_freeze_millis: 5,
        penalty_freeze_millis: 5,
        table_delay_millis: 0,
        hints: true,
        human_players: Vec::new(),
    }
}

#[test]
fn terminate_stops_a_running_game_within_a_few_seconds() {
    let (game, handle) = Game::new(small_bot_config()).unwrap();
    let recording = Arc::new(RecordingUi::default());
    let game = game.with_ui(recording.clone());

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = game.run();
        let _ = tx.send(result);
    });

    thread::sleep(Duration::from_millis(150));
    handle.terminate();

    let result = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("game did not terminate within the bound");

    assert!(result.scores.len() == 3);
    assert!(recording.events_snapshot().iter().any(|e| e.starts_with("place_card")));
}

#[test]
fn human_key_presses_reach_the_grid_through_game_handle() {
    // `GameHandle::key_pressed` must be able to drive a human-marked
    // player, not just bots.
    let mut config = small_bot_config();
    config.human_players = vec![0];
    let (game, handle) = Game::new(config).unwrap();
    let recording = Arc::new(RecordingUi::default());
    let game = game.with_ui(recording.clone());

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = game.run();
        let _ = tx.send(result);
    });

    // Give the dealer time to deal the first table before pressing keys.
    thread::sleep(Duration::from_millis(150));
    for slot in 0..4u16 {
        handle.key_pressed(0, slot);
    }
    thread::sleep(Duration::from_millis(150));
    handle.terminate();

    rx.recv_timeout(Duration::from_secs(5))
        .expect("game did not terminate within the bound");

    assert!(
        recording.events_snapshot().iter().any(|e| e.starts_with("place_token(0,")),
        "human player 0's key presses never reached the grid"
    );
}

#[test]
fn untimed_game_also_terminates_on_request() {
    let mut config = small_bot_config();
    config.turn_timeout_millis = -1;
    let (game, handle) = Game::new(config).unwrap();

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = game.run();
        let _ = tx.send(result);
    });

    thread::sleep(Duration::from_millis(150));
    handle.terminate();

    rx.recv_timeout(Duration::from_secs(5))
        .expect("untimed game did not terminate within the bound");
}
