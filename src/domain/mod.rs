//! Core value types shared by every component of the table.

use std::sync::atomic::{AtomicU32, Ordering};

/// Opaque card identity in `[0, deck_size)`.
pub type Card = u32;

/// Grid position in `[0, table_size)`.
pub type Slot = u16;

/// Player identity in `[0, players)`.
pub type PlayerId = u16;

/// Outcome of a `Grid::place_token` toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenOutcome {
    /// The player had no token on the slot and one was placed.
    Placed,
    /// The player already held a token there; it was removed.
    Removed,
    /// The player has no more tokens to spend, or the slot is empty.
    Rejected,
}

/// Verdict delivered to a player after the dealer validates a proposal.
///
/// `Neutral` covers the race where a racing `remove_card` invalidated the
/// proposal before it could be tested, so the player is simply told to
/// resume rather than being scored one way or the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Legal,
    Illegal,
    Neutral,
}

/// Static identity and live score of a player seat.
#[derive(Debug)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub human: bool,
    score: AtomicU32,
}

impl PlayerInfo {
    pub fn new(id: PlayerId, human: bool) -> Self {
        Self {
            id,
            human,
            score: AtomicU32::new(0),
        }
    }

    pub fn score(&self) -> u32 {
        self.score.load(Ordering::Acquire)
    }

    /// Returns the score after incrementing.
    pub fn add_point(&self) -> u32 {
        self.score.fetch_add(1, Ordering::AcqRel) + 1
    }
}
