pub mod completion;
pub mod config;
pub mod export;
pub mod list;

use colored::Colorize;

pub fn print_version() {
    println!(
        "{} {}",
        "authdeck".bold(),
        env!("CARGO_PKG_VERSION").green()
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION").dimmed());
}
