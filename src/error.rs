use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("Terminal error: {0}")]
    Terminal(#[from] crossterm::ErrorKind),
    #[error("Couldn't install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error("Couldn't create log file {path:?}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Couldn't write high scores to {path:?}: {source}")]
    ScoresFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Terminal is too small ({width}x{height}), need at least {min_width}x{min_height}")]
    TerminalTooSmall {
        width: i32,
        height: i32,
        min_width: i32,
        min_height: i32,
    },
}

pub type Result<T> = std::result::Result<T, GameError>;
