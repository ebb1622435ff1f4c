mod app;
mod cli;
mod commands;
mod config;
mod deck;
mod render;
mod stage;
mod theme;
mod tokens;
mod watch;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.log_filter()),
    )
    .format_timestamp(None)
    .init();

    cli.run()
}
