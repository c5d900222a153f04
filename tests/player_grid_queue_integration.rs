//! Exercises a single `Player` thread against a real `Grid` and
//! `ProposalQueue`, the slice of behavior that does not need a running
//! `Dealer` to observe.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::RecordingUi;
use set_table::{Grid, Player, ProposalQueue, ShutdownToken, Ui, Verdict};

fn setup(
    feature_size: usize,
    table_size: usize,
) -> (Arc<Player>, Arc<Grid>, Arc<ProposalQueue>, Arc<ShutdownToken>, Arc<RecordingUi>, Arc<AtomicBool>) {
    let shutdown = Arc::new(ShutdownToken::new());
    let recording = Arc::new(RecordingUi::default());
    let ui: Arc<dyn Ui> = recording.clone();
    let grid = Arc::new(Grid::new(
        table_size,
        1,
        feature_size,
        Duration::from_millis(0),
        ui.clone(),
        shutdown.clone(),
    ));
    let queue = Arc::new(ProposalQueue::new(1));
    let dealing = Arc::new(AtomicBool::new(false));
    let player = Arc::new(Player::new(
        0,
        false,
        grid.clone(),
        queue.clone(),
        ui,
        shutdown.clone(),
        dealing.clone(),
        feature_size,
        table_size,
        Duration::from_millis(5),
        Duration::from_millis(5),
    ));
    (player, grid, queue, shutdown, recording, dealing)
}

#[test]
fn legal_set_is_scored_end_to_end() {
    let (player, grid, queue, shutdown, recording, _dealing) = setup(3, 6);
    let thread_player = player.clone();
    let thread = thread::spawn(move || thread_player.run());

    // Cards 0, 1, 2 decode to [0,0,0], [1,0,0], [2,0,0]: a legal set.
    grid.place_card(0, 0);
    grid.place_card(1, 1);
    grid.place_card(2, 2);

    player.key_pressed(0);
    player.key_pressed(1);
    player.key_pressed(2);

    assert!(queue.wait_for_work(Duration::from_secs(2)), "player never submitted a proposal");
    let submitted = {
        let mut guard = queue.lock_exclusive();
        guard.pop()
    };
    assert_eq!(submitted, Some(0));

    player.deliver_verdict(Verdict::Legal);

    // point() sleeps for point_freeze before returning to the main loop; give
    // it generous headroom before asserting.
    thread::sleep(Duration::from_millis(200));
    assert_eq!(player.info.score(), 1);

    shutdown.cancel();
    player.interrupt();
    thread.join().unwrap();
    assert!(player.has_exited());
    assert!(recording.events_snapshot().iter().any(|e| e.starts_with("set_score(0,1)")));
}

#[test]
fn illegal_set_applies_penalty_without_scoring() {
    let (player, grid, queue, shutdown, recording, _dealing) = setup(3, 6);
    let thread_player = player.clone();
    let thread = thread::spawn(move || thread_player.run());

    // Cards 0, 9, 1 decode to [0,0,0], [0,0,1], [1,0,0]: not a legal set.
    grid.place_card(0, 0);
    grid.place_card(9, 1);
    grid.place_card(1, 2);

    player.key_pressed(0);
    player.key_pressed(1);
    player.key_pressed(2);

    assert!(queue.wait_for_work(Duration::from_secs(2)));
    {
        let mut guard = queue.lock_exclusive();
        assert_eq!(guard.pop(), Some(0));
    }
    player.deliver_verdict(Verdict::Illegal);

    thread::sleep(Duration::from_millis(200));
    assert_eq!(player.info.score(), 0);

    shutdown.cancel();
    player.interrupt();
    thread.join().unwrap();
    assert!(recording.events_snapshot().iter().any(|e| e.starts_with("set_freeze(0,5")));
}

#[test]
fn key_events_during_redeal_are_dropped() {
    let (player, grid, queue, shutdown, _recording, dealing) = setup(3, 6);
    grid.place_card(0, 0);
    grid.place_card(1, 1);
    grid.place_card(2, 2);

    dealing.store(true, Ordering::Release);
    player.key_pressed(0);
    player.key_pressed(1);
    player.key_pressed(2);
    dealing.store(false, Ordering::Release);

    // None of the presses above should have reached the queue, so waiting
    // briefly for work must time out.
    assert!(!queue.wait_for_work(Duration::from_millis(100)));

    shutdown.cancel();
}
