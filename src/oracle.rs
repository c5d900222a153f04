//! The set oracle contract and the default feature-encoding implementation
//! that resolves the canonical Set game.

use crate::domain::Card;

/// Pure, thread-safe rules engine for "is this a legal set". Implementations
/// must be deterministic: the dealer and any test harness depend on repeated
/// calls with the same cards returning the same answer.
pub trait Oracle: Send + Sync {
    /// Enumerate up to `limit` legal sets found among `cards`. An empty
    /// `limit` of `0` means "just tell me if any exist" and may return at
    /// most one result.
    fn find_sets(&self, cards: &[Card], limit: usize) -> Vec<Vec<Card>>;

    /// Test whether `cards` (expected to have exactly `feature_size` entries)
    /// forms a legal set.
    fn test_set(&self, cards: &[Card]) -> bool;

    /// Decode each card into its feature digit vector, for hint logging.
    fn cards_to_features(&self, cards: &[Card]) -> Vec<Vec<u8>>;
}

/// Default oracle for the canonical Set game. Each card is a base-`radix`
/// digit vector of length `card_attributes` (4 in the canonical game: number,
/// color, shading, shape); `set_size` cards (3 in the canonical game) form a
/// set iff every attribute is either all-equal or all-distinct across them.
///
/// `set_size` and `card_attributes` are deliberately independent: the former
/// is a rule of the game (how many cards you need), the latter is a property
/// of the deck's encoding (how many attributes each card has). Conflating
/// them only works by coincidence when both happen to be 3.
#[derive(Clone, Debug)]
pub struct DefaultOracle {
    set_size: usize,
    card_attributes: usize,
    radix: u32,
}

impl DefaultOracle {
    pub fn new(set_size: usize, card_attributes: usize, radix: u32) -> Self {
        Self { set_size, card_attributes, radix }
    }

    fn decode(&self, card: Card) -> Vec<u8> {
        let mut digits = Vec::with_capacity(self.card_attributes);
        let mut remaining = card;
        for _ in 0..self.card_attributes {
            digits.push((remaining % self.radix) as u8);
            remaining /= self.radix;
        }
        digits
    }

    fn is_set(&self, cards: &[Card]) -> bool {
        if cards.len() != self.set_size {
            return false;
        }
        let features: Vec<Vec<u8>> = cards.iter().map(|&c| self.decode(c)).collect();
        for attribute_index in 0..self.card_attributes {
            let values: Vec<u8> = features.iter().map(|f| f[attribute_index]).collect();
            if !all_equal(&values) && !all_distinct(&values) {
                return false;
            }
        }
        true
    }
}

fn all_equal(values: &[u8]) -> bool {
    values.windows(2).all(|pair| pair[0] == pair[1])
}

fn all_distinct(values: &[u8]) -> bool {
    for i in 0..values.len() {
        for j in (i + 1)..values.len() {
            if values[i] == values[j] {
                return false;
            }
        }
    }
    true
}

impl Oracle for DefaultOracle {
    fn find_sets(&self, cards: &[Card], limit: usize) -> Vec<Vec<Card>> {
        let mut found = Vec::new();
        if cards.len() < self.set_size {
            return found;
        }
        let cap = if limit == 0 { usize::MAX } else { limit };
        combinations_indexed(cards, 0, self.set_size, &mut Vec::new(), &mut |combo| {
            if self.is_set(combo) {
                found.push(combo.to_vec());
            }
            found.len() < cap
        });
        found
    }

    fn test_set(&self, cards: &[Card]) -> bool {
        self.is_set(cards)
    }

    fn cards_to_features(&self, cards: &[Card]) -> Vec<Vec<u8>> {
        cards.iter().map(|&c| self.decode(c)).collect()
    }
}

/// Invokes `visit` on every `k`-combination of `items`, in index order,
/// stopping early once `visit` returns `false`.
fn combinations_indexed(
    items: &[Card],
    start: usize,
    k: usize,
    scratch: &mut Vec<Card>,
    visit: &mut dyn FnMut(&[Card]) -> bool,
) -> bool {
    if scratch.len() == k {
        return visit(scratch);
    }
    for i in start..items.len() {
        scratch.push(items[i]);
        let keep_going = combinations_indexed(items, i + 1, k, scratch, visit);
        scratch.pop();
        if !keep_going {
            return false;
        }
    }
    true
}
