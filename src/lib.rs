//! `set_table`: the concurrency core of a real-time multi-player Set
//! card-matching table. A shared `Grid`, a `ProposalQueue` FIFO, one
//! `Player` thread per seat (optionally driven by a `BotDriver`), and a
//! `Dealer` that owns the game's lifecycle end to end.

pub mod bot;
pub mod config;
pub mod dealer;
pub mod domain;
pub mod error;
pub mod game;
pub mod grid;
pub mod oracle;
pub mod player;
pub mod queue;
pub mod shutdown;
pub mod ui;

pub use bot::BotDriver;
pub use config::{GameArgs, GameConfig};
pub use dealer::{Dealer, GameResult};
pub use domain::{Card, PlayerId, PlayerInfo, Slot, TokenOutcome, Verdict};
pub use error::{ConfigError, GameError};
pub use game::{Game, GameHandle};
pub use grid::Grid;
pub use oracle::{DefaultOracle, Oracle};
pub use player::Player;
pub use queue::{ProposalQueue, ProposalQueueGuard};
pub use shutdown::ShutdownToken;
pub use ui::{ConsoleUi, Ui};
