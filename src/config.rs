use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::engine::EngineSettings;
use crate::error::{GameError, Result};
use crate::fruit::MarketSettings;
use crate::highscores::DEFAULT_CAPACITY;

const SCORES_FILE_NAME: &str = ".snake_scores";

/// A terminal snake game with timed fruit and a high score table.
#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Milliseconds per turn. Smaller values make the snake faster.
    #[arg(
        long = "turn-ms",
        value_name = "MILLISECONDS",
        default_value_t = 250,
        value_parser = clap::value_parser!(u64).range(1..=10_000)
    )]
    pub turn_ms: u64,
    /// Seconds a fruit stays on the board once it has appeared.
    #[arg(
        long = "fruit-lifetime",
        value_name = "SECONDS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub fruit_lifetime: u64,
    /// Points scored for each fruit.
    #[arg(
        long = "fruit-points",
        value_name = "POINTS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub fruit_points: u32,
    /// Average number of new fruit per second.
    #[arg(long = "spawn-rate", value_name = "PER_SECOND", default_value_t = 0.1)]
    pub spawn_rate: f64,
    /// How many entries the high score table keeps.
    #[arg(long = "max-scores", value_name = "COUNT", default_value_t = DEFAULT_CAPACITY)]
    pub max_scores: usize,
    /// High score file. Defaults to ~/.snake_scores.
    #[arg(long = "scores-file", value_name = "PATH")]
    pub scores_file: Option<PathBuf>,
    /// Where log output goes while the game owns the terminal.
    #[arg(long = "log-file", value_name = "PATH", default_value = "snake.log")]
    pub log_file: PathBuf,
    /// Log debug messages too.
    #[arg(short, long)]
    pub debug: bool,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !self.spawn_rate.is_finite() || self.spawn_rate <= 0.0 {
            return Err(GameError::Config(format!(
                "spawn rate must be a positive number, got {}",
                self.spawn_rate
            )));
        }
        if self.max_scores == 0 {
            return Err(GameError::Config("the high score table needs room for at least one entry".into()));
        }
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            turn_duration: Duration::from_millis(self.turn_ms),
            market: MarketSettings {
                spawn_rate: self.spawn_rate,
                lifetime: Some(Duration::from_secs(self.fruit_lifetime)),
                points: self.fruit_points,
                ..MarketSettings::default()
            },
        }
    }

    pub fn scores_path(&self) -> PathBuf {
        if let Some(path) = &self.scores_file {
            return path.clone();
        }
        match homedir::get_my_home() {
            Ok(Some(home)) => home.join(SCORES_FILE_NAME),
            _ => PathBuf::from(SCORES_FILE_NAME),
        }
    }

    /// Human readable summary for the options screen.
    pub fn describe(&self) -> Vec<String> {
        vec![
            format!("Turn length:      {} ms", self.turn_ms),
            format!("Fruit lifetime:   {} s", self.fruit_lifetime),
            format!("Fruit points:     {}", self.fruit_points),
            format!("Fruit per second: {}", self.spawn_rate),
            format!("High score slots: {}", self.max_scores),
            format!("Score file:       {}", self.scores_path().display()),
        ]
    }
}
