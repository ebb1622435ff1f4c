use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = match Config::load_from(&path) {
        Ok(config) => {
            println!("{} {}", "Config file:".bold(), path.display());
            config
        }
        Err(_) => {
            println!(
                "{} {} {}",
                "Config file:".bold(),
                path.display(),
                "(not created yet, showing defaults)".dimmed()
            );
            Config::default()
        }
    };
    println!();
    print!("{}", serde_yaml::to_string(&config)?);

    let stage = config.to_stage_config();
    println!();
    println!("{}", "Effective stage settings:".bold());
    println!(
        "  refresh interval   {} ms",
        stage.refresh_interval.as_millis()
    );
    println!(
        "  retry delays       {:?} ms",
        stage
            .retry_delays
            .iter()
            .map(|d| d.as_millis())
            .collect::<Vec<_>>()
    );
    println!(
        "  steady recompute   {} ms",
        stage.steady_recompute.as_millis()
    );
    println!("  bypass padding     {}", stage.routing.bypass_padding);
    println!("  pulse step         {}", stage.pulse_step);
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {key} = {value} ({})",
        "Saved".green().bold(),
        path.display()
    );
    Ok(())
}
