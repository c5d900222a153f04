//! The Grid: slot-to-card and (slot, player)-to-token state, guarded
//! per-slot so the dealer and every player thread can mutate disjoint slots
//! without contending on a single global lock.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::domain::{Card, PlayerId, Slot, TokenOutcome};
use crate::shutdown::ShutdownToken;
use crate::ui::Ui;

struct SlotState {
    card: Option<Card>,
    tokens: Vec<bool>,
}

impl SlotState {
    fn new(num_players: usize) -> Self {
        Self {
            card: None,
            tokens: vec![false; num_players],
        }
    }
}

/// Shared grid state. The slot-to-card bijection holds by construction:
/// a card lives in at most one `SlotState.card` and is looked up by
/// scanning slots rather than mirroring a separate `card_to_slot` map, so
/// there is no second structure that can fall out of sync. Token presence,
/// the per-player token cap and the per-player token count are maintained
/// together by `place_token`/`remove_token` below.
pub struct Grid {
    table_size: usize,
    feature_size: usize,
    slots: Vec<Mutex<SlotState>>,
    tokens_per_player: Vec<AtomicU8>,
    ui: Arc<dyn Ui>,
    table_delay: Duration,
    shutdown: Arc<ShutdownToken>,
}

impl Grid {
    pub fn new(
        table_size: usize,
        num_players: usize,
        feature_size: usize,
        table_delay: Duration,
        ui: Arc<dyn Ui>,
        shutdown: Arc<ShutdownToken>,
    ) -> Self {
        Self {
            table_size,
            feature_size,
            slots: (0..table_size).map(|_| Mutex::new(SlotState::new(num_players))).collect(),
            tokens_per_player: (0..num_players).map(|_| AtomicU8::new(0)).collect(),
            ui,
            table_delay,
            shutdown,
        }
    }

    pub fn table_size(&self) -> usize {
        self.table_size
    }

    /// Places `card` on `slot`. Precondition: the slot is empty. A
    /// violation is a programming bug, not a recoverable error.
    ///
    /// Returns `false` without mutating anything if cancelled during the
    /// animation delay.
    pub fn place_card(&self, card: Card, slot: Slot) -> bool {
        if !self.shutdown.sleep(self.table_delay) {
            return false;
        }
        let mut state = self.slots[slot as usize].lock();
        debug_assert!(state.card.is_none(), "place_card into an occupied slot");
        state.card = Some(card);
        drop(state);
        self.ui.place_card(card, slot);
        true
    }

    /// Removes whatever card occupies `slot`, clearing every player's token
    /// there first. Precondition: the slot is occupied.
    pub fn remove_card(&self, slot: Slot) -> Option<Card> {
        if !self.shutdown.sleep(self.table_delay) {
            return None;
        }
        let mut state = self.slots[slot as usize].lock();
        let card = state.card.take();
        debug_assert!(card.is_some(), "remove_card on an empty slot");
        let holders: Vec<PlayerId> = state
            .tokens
            .iter()
            .enumerate()
            .filter_map(|(p, &held)| held.then_some(p as PlayerId))
            .collect();
        for &p in &holders {
            state.tokens[p as usize] = false;
        }
        drop(state);
        for p in holders {
            self.tokens_per_player[p as usize].fetch_sub(1, Ordering::AcqRel);
            self.ui.remove_token(p, slot);
        }
        self.ui.remove_card(slot);
        card
    }

    /// Toggle-with-cap semantics: if the player already has a token on this
    /// slot, it is removed; otherwise a token is placed if the player is
    /// under the cap and the slot is occupied. The presence check, the cap
    /// check and the mutation all happen under the one slot mutex, so a
    /// concurrent `remove_card` on the same slot cannot observe a
    /// half-applied placement.
    pub fn place_token(&self, player: PlayerId, slot: Slot) -> TokenOutcome {
        let mut state = self.slots[slot as usize].lock();
        if state.tokens[player as usize] {
            state.tokens[player as usize] = false;
            drop(state);
            self.tokens_per_player[player as usize].fetch_sub(1, Ordering::AcqRel);
            self.ui.remove_token(player, slot);
            return TokenOutcome::Removed;
        }

        if state.card.is_none() {
            return TokenOutcome::Rejected;
        }

        let count = self.tokens_per_player[player as usize].load(Ordering::Acquire);
        if count as usize >= self.feature_size {
            return TokenOutcome::Rejected;
        }

        state.tokens[player as usize] = true;
        drop(state);
        self.tokens_per_player[player as usize].fetch_add(1, Ordering::AcqRel);
        self.ui.place_token(player, slot);
        TokenOutcome::Placed
    }

    /// Clears `player`'s token on `slot` if set. Returns whether a bit was
    /// actually cleared.
    pub fn remove_token(&self, player: PlayerId, slot: Slot) -> bool {
        let mut state = self.slots[slot as usize].lock();
        if !state.tokens[player as usize] {
            return false;
        }
        state.tokens[player as usize] = false;
        drop(state);
        self.tokens_per_player[player as usize].fetch_sub(1, Ordering::AcqRel);
        self.ui.remove_token(player, slot);
        true
    }

    pub fn tokens_for_player(&self, player: PlayerId) -> u8 {
        self.tokens_per_player[player as usize].load(Ordering::Acquire)
    }

    /// Snapshot of `(slot, card)` for every slot currently held by `player`,
    /// re-derived fresh under each slot's lock so the dealer always
    /// validates against the player's current tokens rather than a stale
    /// copy taken before submission.
    pub fn player_proposal(&self, player: PlayerId) -> Vec<(Slot, Card)> {
        let mut result = Vec::with_capacity(self.feature_size);
        for slot in 0..self.table_size {
            let state = self.slots[slot].lock();
            if state.tokens[player as usize] {
                if let Some(card) = state.card {
                    result.push((slot as Slot, card));
                }
            }
        }
        result
    }

    pub fn count_cards(&self) -> usize {
        self.slots.iter().filter(|s| s.lock().card.is_some()).count()
    }

    pub fn cards_on_table(&self) -> Vec<Card> {
        self.slots.iter().filter_map(|s| s.lock().card).collect()
    }

    pub fn empty_slots(&self) -> Vec<Slot> {
        (0..self.table_size)
            .filter(|&s| self.slots[s].lock().card.is_none())
            .map(|s| s as Slot)
            .collect()
    }

    pub fn is_empty_slot(&self, slot: Slot) -> bool {
        self.slots[slot as usize].lock().card.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ConsoleUi;

    fn grid(table_size: usize, players: usize, feature_size: usize) -> Grid {
        Grid::new(
            table_size,
            players,
            feature_size,
            Duration::from_millis(0),
            Arc::new(ConsoleUi),
            Arc::new(ShutdownToken::new()),
        )
    }

    #[test]
    fn place_then_remove_token_is_idempotent() {
        let g = grid(4, 2, 3);
        g.place_card(10, 0);
        assert_eq!(g.place_token(0, 0), TokenOutcome::Placed);
        assert_eq!(g.place_token(0, 0), TokenOutcome::Removed);
        assert_eq!(g.tokens_for_player(0), 0);
    }

    #[test]
    fn token_rejected_once_cap_reached() {
        let g = grid(4, 2, 2);
        g.place_card(1, 0);
        g.place_card(2, 1);
        g.place_card(3, 2);
        assert_eq!(g.place_token(0, 0), TokenOutcome::Placed);
        assert_eq!(g.place_token(0, 1), TokenOutcome::Placed);
        assert_eq!(g.place_token(0, 2), TokenOutcome::Rejected);
        assert_eq!(g.tokens_for_player(0), 2);
    }

    #[test]
    fn token_rejected_on_empty_slot() {
        let g = grid(4, 2, 3);
        assert_eq!(g.place_token(0, 0), TokenOutcome::Rejected);
    }

    #[test]
    fn remove_card_clears_every_holder() {
        let g = grid(4, 3, 3);
        g.place_card(5, 0);
        g.place_token(0, 0);
        g.place_token(1, 0);
        assert_eq!(g.tokens_for_player(0), 1);
        assert_eq!(g.tokens_for_player(1), 1);
        let removed = g.remove_card(0);
        assert_eq!(removed, Some(5));
        assert_eq!(g.tokens_for_player(0), 0);
        assert_eq!(g.tokens_for_player(1), 0);
        assert!(g.is_empty_slot(0));
    }

    #[test]
    fn player_proposal_only_includes_full_slots() {
        let g = grid(4, 2, 3);
        g.place_card(1, 0);
        g.place_card(2, 1);
        g.place_token(0, 0);
        g.place_token(0, 1);
        let proposal = g.player_proposal(0);
        assert_eq!(proposal.len(), 2);
    }

    #[test]
    fn count_and_cards_on_table_agree() {
        let g = grid(4, 2, 3);
        g.place_card(1, 0);
        g.place_card(2, 1);
        assert_eq!(g.count_cards(), 2);
        let mut cards = g.cards_on_table();
        cards.sort();
        assert_eq!(cards, vec![1, 2]);
    }
}
