use std::sync::Mutex;

use set_table::{Card, PlayerId, Slot, Ui};

/// A `Ui` that records every callback instead of logging it, so integration
/// tests can assert on what the table actually announced.
#[derive(Default)]
pub struct RecordingUi {
    pub events: Mutex<Vec<String>>,
}

impl RecordingUi {
    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events_snapshot(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl Ui for RecordingUi {
    fn place_card(&self, card: Card, slot: Slot) {
        self.record(format!("place_card({card},{slot})"));
    }

    fn remove_card(&self, slot: Slot) {
        self.record(format!("remove_card({slot})"));
    }

    fn place_token(&self, player: PlayerId, slot: Slot) {
        self.record(format!("place_token({player},{slot})"));
    }

    fn remove_token(&self, player: PlayerId, slot: Slot) {
        self.record(format!("remove_token({player},{slot})"));
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        self.record(format!("set_score({player},{score})"));
    }

    fn set_freeze(&self, player: PlayerId, remaining_millis: u64) {
        self.record(format!("set_freeze({player},{remaining_millis})"));
    }

    fn set_countdown(&self, remaining_millis: u64, warn: bool) {
        self.record(format!("set_countdown({remaining_millis},{warn})"));
    }

    fn set_elapsed(&self, elapsed_millis: u64) {
        self.record(format!("set_elapsed({elapsed_millis})"));
    }

    fn announce_winner(&self, players: &[PlayerId]) {
        self.record(format!("announce_winner({players:?})"));
    }

    fn hint(&self, cards: &[Card]) {
        self.record(format!("hint({cards:?})"));
    }
}
