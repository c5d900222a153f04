//! The top-level harness: wires a `GameConfig` into a live `Grid`,
//! `ProposalQueue`, `Oracle`, `Ui` and `Dealer`, and exposes the one external
//! control a caller needs, early termination, via `GameHandle`.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::GameConfig;
use crate::dealer::{Dealer, GameResult};
use crate::domain::{PlayerId, Slot};
use crate::error::ConfigError;
use crate::grid::Grid;
use crate::oracle::{DefaultOracle, Oracle};
use crate::player::Player;
use crate::queue::ProposalQueue;
use crate::shutdown::ShutdownToken;
use crate::ui::{ConsoleUi, Ui};

/// A handle retained by the caller that started a `Game`, letting it request
/// early shutdown (e.g. from a signal handler in the demo binary) and route
/// key events to human-marked players, without needing a reference to the
/// `Game` itself, which `run` consumes.
///
/// `players` starts empty and is filled in by `run()` as soon as the player
/// threads exist, so `key_pressed` calls that arrive before `run()` reaches
/// that point are simply dropped: there is no player yet to receive them.
#[derive(Clone)]
pub struct GameHandle {
    shutdown: Arc<ShutdownToken>,
    players: Arc<Mutex<Vec<Arc<Player>>>>,
}

impl GameHandle {
    pub fn terminate(&self) {
        self.shutdown.cancel();
    }

    /// Forwards to `Player::key_pressed` for the named player. A no-op if
    /// `player` does not exist or `run()` has not yet reached the point of
    /// spawning players.
    pub fn key_pressed(&self, player: PlayerId, slot: Slot) {
        if let Some(p) = self.players.lock().iter().find(|p| p.id() == player) {
            p.key_pressed(slot);
        }
    }
}

pub struct Game {
    config: GameConfig,
    ui: Arc<dyn Ui>,
    oracle: Arc<dyn Oracle>,
    shutdown: Arc<ShutdownToken>,
    rng_seed: u64,
    players_slot: Arc<Mutex<Vec<Arc<Player>>>>,
}

impl Game {
    /// Validates `config` and builds a `Game` ready to `run`, along with the
    /// `GameHandle` used to terminate it early. Defaults to `ConsoleUi` and
    /// `DefaultOracle`; swap either with `with_ui`/`with_oracle` before `run`.
    pub fn new(config: GameConfig) -> Result<(Self, GameHandle), ConfigError> {
        config.validate()?;
        let shutdown = Arc::new(ShutdownToken::new());
        let oracle: Arc<dyn Oracle> = Arc::new(DefaultOracle::new(
            config.feature_size,
            config.card_attributes,
            config.feature_radix,
        ));
        let ui: Arc<dyn Ui> = Arc::new(ConsoleUi);
        let players_slot = Arc::new(Mutex::new(Vec::new()));
        let handle = GameHandle {
            shutdown: shutdown.clone(),
            players: players_slot.clone(),
        };
        let game = Self {
            config,
            ui,
            oracle,
            shutdown,
            rng_seed: rand::random(),
            players_slot,
        };
        Ok((game, handle))
    }

    pub fn with_ui(mut self, ui: Arc<dyn Ui>) -> Self {
        self.ui = ui;
        self
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn Oracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Fixes the dealer's shuffle RNG seed, for reproducible test runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Runs the table to completion (blocking). Consumes `self`: the
    /// `GameHandle` obtained from `new` is the only way to interrupt it.
    pub fn run(self) -> GameResult {
        let dealing = Arc::new(AtomicBool::new(true));
        let grid = Arc::new(Grid::new(
            self.config.table_size as usize,
            self.config.players as usize,
            self.config.feature_size,
            Duration::from_millis(self.config.table_delay_millis),
            self.ui.clone(),
            self.shutdown.clone(),
        ));
        let queue = Arc::new(ProposalQueue::new(self.config.players as usize));

        let players: Vec<Arc<Player>> = (0..self.config.players as PlayerId)
            .map(|id| {
                Arc::new(Player::new(
                    id,
                    self.config.is_human(id),
                    grid.clone(),
                    queue.clone(),
                    self.ui.clone(),
                    self.shutdown.clone(),
                    dealing.clone(),
                    self.config.feature_size,
                    self.config.table_size as usize,
                    Duration::from_millis(self.config.point_freeze_millis),
                    Duration::from_millis(self.config.penalty_freeze_millis),
                ))
            })
            .collect();

        *self.players_slot.lock() = players.clone();

        let dealer = Dealer::new(
            self.config,
            grid,
            queue,
            self.oracle,
            self.ui,
            self.shutdown,
            dealing,
            players,
            self.rng_seed,
        );
        dealer.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_invalid_config() {
        let mut config = GameConfig::default();
        config.players = 0;
        assert!(Game::new(config).is_err());
    }

    #[test]
    fn terminate_before_run_ends_the_game_promptly() {
        let (game, handle) = Game::new(GameConfig::default()).unwrap();
        handle.terminate();
        let result = game.run();
        assert!(result.winners.len() <= usize::from(GameConfig::default().players));
    }

    #[test]
    fn key_pressed_before_run_is_a_harmless_no_op() {
        let (_game, handle) = Game::new(GameConfig::default()).unwrap();
        // `run()` was never called, so there is no player 0 to reach yet.
        handle.key_pressed(0, 0);
    }

    #[test]
    fn key_pressed_for_unknown_player_is_ignored() {
        let config = GameConfig {
            players: 2,
            ..GameConfig::default()
        };
        let (game, handle) = Game::new(config).unwrap();
        handle.terminate();
        // Exercise the lookup path with an id past the configured player
        // count; it must simply find nothing rather than panicking.
        handle.key_pressed(99, 0);
        game.run();
    }
}
