//! Bot driver: one auxiliary thread per non-human player, feeding
//! `key_pressed` with uniformly random slot picks.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::grid::Grid;
use crate::player::Player;
use crate::shutdown::ShutdownToken;

/// Back-off between a bot's key presses, so validators get CPU instead of
/// every bot hammering the grid continuously.
pub const BOT_BREAK_MILLIS: u64 = 500;

pub struct BotDriver {
    player: Arc<Player>,
    grid: Arc<Grid>,
    shutdown: Arc<ShutdownToken>,
    rng: StdRng,
}

impl BotDriver {
    pub fn new(player: Arc<Player>, grid: Arc<Grid>, shutdown: Arc<ShutdownToken>, seed: u64) -> Self {
        Self {
            player,
            grid,
            shutdown,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn run(mut self) {
        while !self.shutdown.is_cancelled() {
            if let Some(slot) = self.pick_occupied_slot() {
                self.player.key_pressed(slot);
            }
            if !self.shutdown.sleep(Duration::from_millis(BOT_BREAK_MILLIS)) {
                break;
            }
        }
    }

    /// Picks a uniformly random occupied slot, re-drawing until a hit.
    /// Returns `None` only if shutdown fires while waiting for one, or the
    /// table has no slots at all.
    fn pick_occupied_slot(&mut self) -> Option<u16> {
        if self.grid.table_size() == 0 {
            return None;
        }
        loop {
            if self.shutdown.is_cancelled() {
                return None;
            }
            let empty = self.grid.empty_slots();
            let occupied: Vec<u16> = (0..self.grid.table_size() as u16)
                .filter(|s| !empty.contains(s))
                .collect();
            if !occupied.is_empty() {
                let index = self.rng.gen_range(0..occupied.len());
                return Some(occupied[index]);
            }
            // Grid momentarily empty (mid-reshuffle); back off briefly and
            // retry rather than busy-spinning.
            if !self.shutdown.sleep(Duration::from_millis(10)) {
                return None;
            }
        }
    }
}
