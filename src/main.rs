mod config;
mod engine;
mod error;
mod fruit;
mod game;
mod grid;
mod highscores;
mod input;
mod menu;
mod render;
mod snake;
mod term;

use std::fs::File;

use clap::Parser;
use log::info;
use simplelog::{LevelFilter, WriteLogger};

use config::Config;
use error::{GameError, Result};

fn main() {
    let config = Config::parse();

    // The exit status is always 0; problems are reported on stderr
    if let Err(e) = run(config) {
        eprintln!("snake: {}", e);
    }
}

fn run(config: Config) -> Result<()> {
    config.validate()?;
    setup_logging(&config)?;
    info!("Starting with {:?}", config);

    let mut game = game::SnakeGame::new(config)?;
    game.run()?;

    info!("Bye");
    Ok(())
}

// The game owns the terminal, so logs go to a file
fn setup_logging(config: &Config) -> Result<()> {
    let level = if config.debug { LevelFilter::Debug } else { LevelFilter::Info };
    let file = File::create(&config.log_file).map_err(|source| GameError::LogFile {
        path: config.log_file.clone(),
        source,
    })?;

    WriteLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_target_level(LevelFilter::Error)
            .build(),
        file,
    )?;
    Ok(())
}
