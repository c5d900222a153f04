//! Configuration surface: the knobs every other module is built on.
//!
//! `GameConfig` is the value every component actually reads. It can be built
//! three ways: programmatic defaults, a `clap`-derived CLI/env overlay for
//! the demo binary, or a `serde_json` file loaded ahead of those overlays.

use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::domain::PlayerId;
use crate::error::ConfigError;

/// Runtime knobs for one table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of player agents (P).
    pub players: u16,
    /// Total distinct cards in the deck (D).
    pub deck_size: u32,
    /// Number of grid slots (T).
    pub table_size: u16,
    /// Required cardinality of a valid set (F): how many cards a proposal
    /// must hold before the dealer will test it. Fixed at 3 for the
    /// canonical game; distinct from `card_attributes` below.
    pub feature_size: usize,
    /// Number of per-card attributes the `Oracle` decodes each card into
    /// (the canonical game's number/color/shading/shape gives 4).
    pub card_attributes: usize,
    /// Radix of each attribute (the canonical game uses 3).
    pub feature_radix: u32,
    /// >0 countdown, =0 elapsed-since-last-action, <0 no timer display.
    pub turn_timeout_millis: i64,
    /// When remaining countdown ms drops below this, the UI enters "warning".
    pub turn_timeout_warning_millis: u64,
    /// Freeze duration credited for a legal set.
    pub point_freeze_millis: u64,
    /// Freeze duration charged for an illegal set.
    pub penalty_freeze_millis: u64,
    /// Per-card animation delay applied in `place_card`/`remove_card`.
    pub table_delay_millis: u64,
    /// Emit one hint roughly a third of the way through the timer.
    pub hints: bool,
    /// Player ids that are operated by real input rather than a bot driver.
    pub human_players: Vec<PlayerId>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: 4,
            deck_size: 81,
            table_size: 12,
            feature_size: 3,
            card_attributes: 4,
            feature_radix: 3,
            turn_timeout_millis: 60_000,
            turn_timeout_warning_millis: 5_000,
            point_freeze_millis: 3_000,
            penalty_freeze_millis: 3_000,
            table_delay_millis: 150,
            hints: true,
            human_players: Vec::new(),
        }
    }
}

impl GameConfig {
    pub fn turn_timeout(&self) -> Option<Duration> {
        if self.turn_timeout_millis > 0 {
            Some(Duration::from_millis(self.turn_timeout_millis as u64))
        } else {
            None
        }
    }

    pub fn is_elapsed_mode(&self) -> bool {
        self.turn_timeout_millis == 0
    }

    pub fn is_human(&self, player: PlayerId) -> bool {
        self.human_players.contains(&player)
    }

    /// Validates the cross-field invariants a `Game` requires before it can
    /// be constructed from this config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players == 0 {
            return Err(ConfigError::NoPlayers);
        }
        if self.table_size as u32 > self.deck_size {
            return Err(ConfigError::InvalidTableSize {
                table_size: self.table_size,
                deck_size: self.deck_size,
            });
        }
        let expected = self.feature_radix.pow(self.card_attributes as u32);
        if expected != self.deck_size {
            return Err(ConfigError::InvalidDeckSize(self.deck_size, self.card_attributes));
        }
        if self.turn_timeout_millis > 0 && self.turn_timeout_warning_millis == 0 {
            return Err(ConfigError::InvalidTimers(
                "turn_timeout_warning_millis must be > 0 in countdown mode",
            ));
        }
        Ok(())
    }
}

/// CLI/env overlay for the demo binary: one `#[arg(long, env = "...")]`
/// field per knob.
#[derive(Debug, Parser)]
#[command(name = "set_table_demo")]
#[command(about = "Run a headless Set table with bot players", long_about = None)]
pub struct GameArgs {
    /// Optional JSON file with a `GameConfig` to use as the base, before the
    /// flags below are applied on top of it.
    #[arg(long)]
    pub config_file: Option<std::path::PathBuf>,

    #[arg(long, env = "SET_TABLE_PLAYERS")]
    pub players: Option<u16>,

    #[arg(long, env = "SET_TABLE_TURN_TIMEOUT_MILLIS")]
    pub turn_timeout_millis: Option<i64>,

    #[arg(long, env = "SET_TABLE_TABLE_SIZE")]
    pub table_size: Option<u16>,

    #[arg(long, env = "SET_TABLE_HINTS")]
    pub hints: Option<bool>,

    /// Toggle structured (JSON) tracing output.
    #[arg(long)]
    pub json_logs: bool,
}

impl GameArgs {
    /// Builds the final `GameConfig`: file override first, then individual
    /// flags/env vars layered on top.
    pub fn resolve(&self) -> Result<GameConfig, anyhow::Error> {
        let mut config = if let Some(path) = &self.config_file {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str(&text)?
        } else {
            GameConfig::default()
        };

        if let Some(players) = self.players {
            config.players = players;
        }
        if let Some(timeout) = self.turn_timeout_millis {
            config.turn_timeout_millis = timeout;
        }
        if let Some(table_size) = self.table_size {
            config.table_size = table_size;
        }
        if let Some(hints) = self.hints {
            config.hints = hints;
        }

        config.validate()?;
        Ok(config)
    }
}
