//! Error taxonomy. Programmer-bug preconditions stay as panics, never
//! reached in a correct implementation; these enums cover the handful of
//! recoverable failures a caller can actually act on.

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("deck_size {0} is not a valid power of the feature radix for card_attributes {1}")]
    InvalidDeckSize(u32, usize),
    #[error("table_size {table_size} must be <= deck_size {deck_size}")]
    InvalidTableSize { table_size: u16, deck_size: u32 },
    #[error("players must be > 0")]
    NoPlayers,
    #[error("invalid timer configuration: {0}")]
    InvalidTimers(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("the table is shutting down")]
    ShuttingDown,
}
