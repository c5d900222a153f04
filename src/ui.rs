//! The UI sink contract and a console-logging default implementation,
//! expressed as a swappable trait so tests can substitute a recording sink.

use crate::domain::{Card, PlayerId, Slot};

/// Side-effectful sink for everything the table wants to announce.
/// Implementations are expected to be cheap and non-blocking; a slow sink
/// would stall the dealer or a player mid-critical-section.
pub trait Ui: Send + Sync {
    fn place_card(&self, card: Card, slot: Slot);
    fn remove_card(&self, slot: Slot);
    fn place_token(&self, player: PlayerId, slot: Slot);
    fn remove_token(&self, player: PlayerId, slot: Slot);
    fn set_score(&self, player: PlayerId, score: u32);
    /// `0` clears the freeze display.
    fn set_freeze(&self, player: PlayerId, remaining_millis: u64);
    fn set_countdown(&self, remaining_millis: u64, warn: bool);
    fn set_elapsed(&self, elapsed_millis: u64);
    fn announce_winner(&self, players: &[PlayerId]);
    /// A set the oracle found on the current table, emitted for `hints`.
    fn hint(&self, cards: &[Card]);
}

/// Default `Ui` that logs every callback through `tracing`, so the demo
/// binary and integration tests always have a working sink.
#[derive(Default)]
pub struct ConsoleUi;

const LOG_TARGET: &str = "set_table::ui";

impl Ui for ConsoleUi {
    fn place_card(&self, card: Card, slot: Slot) {
        tracing::info!(target: LOG_TARGET, card, slot, "card placed");
    }

    fn remove_card(&self, slot: Slot) {
        tracing::info!(target: LOG_TARGET, slot, "card removed");
    }

    fn place_token(&self, player: PlayerId, slot: Slot) {
        tracing::debug!(target: LOG_TARGET, player, slot, "token placed");
    }

    fn remove_token(&self, player: PlayerId, slot: Slot) {
        tracing::debug!(target: LOG_TARGET, player, slot, "token removed");
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        tracing::info!(target: LOG_TARGET, player, score, "score updated");
    }

    fn set_freeze(&self, player: PlayerId, remaining_millis: u64) {
        if remaining_millis == 0 {
            tracing::debug!(target: LOG_TARGET, player, "freeze cleared");
        } else {
            tracing::info!(target: LOG_TARGET, player, remaining_millis, "player frozen");
        }
    }

    fn set_countdown(&self, remaining_millis: u64, warn: bool) {
        tracing::debug!(target: LOG_TARGET, remaining_millis, warn, "countdown tick");
    }

    fn set_elapsed(&self, elapsed_millis: u64) {
        tracing::debug!(target: LOG_TARGET, elapsed_millis, "elapsed tick");
    }

    fn announce_winner(&self, players: &[PlayerId]) {
        tracing::info!(target: LOG_TARGET, ?players, "winner announced");
    }

    fn hint(&self, cards: &[Card]) {
        tracing::info!(target: LOG_TARGET, ?cards, "hint");
    }
}
