//! Headless demo binary: parses `GameArgs`, resolves a `GameConfig`, and
//! runs an all-bot table to completion with `ConsoleUi`.

use clap::Parser;
use set_table::{Game, GameArgs};
use tracing_subscriber::EnvFilter;

fn init_tracing(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn main() -> anyhow::Result<()> {
    let args = GameArgs::parse();
    init_tracing(args.json_logs);

    let config = args.resolve()?;
    tracing::info!(
        target: "set_table::demo",
        players = config.players,
        table_size = config.table_size,
        turn_timeout_millis = config.turn_timeout_millis,
        "starting table"
    );

    let (game, _handle) = Game::new(config)?;
    let result = game.run();

    tracing::info!(target: "set_table::demo", winners = ?result.winners, scores = ?result.scores, "table finished");
    Ok(())
}
