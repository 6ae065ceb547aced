//! The high score ledger.
//!
//! Scores are kept best first (ties ordered by name) and stored as plain
//! `name,score` lines.

use std::cmp::Ordering;
use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{GameError, Result};

pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreRecord {
    pub name: String,
    pub score: u32,
}

impl ScoreRecord {
    pub fn new<S: Into<String>>(name: S, score: u32) -> Self {
        ScoreRecord { name: name.into(), score }
    }

    /// Parses a `name,score` line. Lines without a comma, with a blank name
    /// or with a score that isn't a positive number are rejected.
    pub fn parse_line(line: &str) -> Option<Self> {
        let (name, score) = line.rsplit_once(',')?;
        if name.trim().is_empty() {
            return None;
        }
        let score: i64 = score.trim().parse().ok()?;
        if score <= 0 {
            return None;
        }
        Some(ScoreRecord::new(name, u32::try_from(score).ok()?))
    }

    /// Ledger order: higher scores first, then names alphabetically.
    fn rank(&self, other: &Self) -> Ordering {
        other.score.cmp(&self.score).then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for ScoreRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.name, self.score)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighScores {
    records: Vec<ScoreRecord>,
    capacity: usize,
}

impl HighScores {
    pub fn new(capacity: usize) -> Self {
        HighScores { records: vec![], capacity: capacity.max(1) }
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `score` would earn a place on the ledger. Zero never does,
    /// since it wouldn't survive a reload.
    pub fn is_qualifying(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        match self.records.last() {
            Some(weakest) if self.records.len() >= self.capacity => score > weakest.score,
            _ => true,
        }
    }

    /// Inserts in ledger order, dropping whatever falls off the end. Inserting
    /// an exact duplicate does nothing. Returns whether the ledger changed.
    pub fn insert<S: Into<String>>(&mut self, name: S, score: u32) -> bool {
        let record = ScoreRecord::new(name, score);
        let index = match self.records.binary_search_by(|existing| existing.rank(&record)) {
            Ok(_) => return false,
            Err(index) => index,
        };
        if index >= self.capacity {
            return false;
        }
        self.records.insert(index, record);
        self.records.truncate(self.capacity);
        true
    }

    /// Reads `name,score` lines. Lines that don't parse, including ones that
    /// aren't valid UTF-8, are skipped; only an I/O error ends the read.
    pub fn read_from<R: BufRead>(reader: R, capacity: usize) -> io::Result<Self> {
        let mut scores = HighScores::new(capacity);
        for (i, raw) in reader.split(b'\n').enumerate() {
            let mut raw = raw?;
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            let line = match String::from_utf8(raw) {
                Ok(line) => line,
                Err(e) => {
                    warn!("Skipping high score line {} with invalid UTF-8: {:?}", i + 1, e.as_bytes());
                    continue;
                }
            };
            match ScoreRecord::parse_line(&line) {
                Some(record) => {
                    scores.insert(record.name, record.score);
                }
                None if line.trim().is_empty() => {}
                None => warn!("Skipping malformed high score line {}: {:?}", i + 1, line),
            }
        }
        Ok(scores)
    }

    /// Loads the ledger from `path`. A missing or unreadable file is an
    /// empty ledger.
    pub fn load<P: AsRef<Path>>(path: P, capacity: usize) -> Self {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                info!("No high scores loaded from {:?}: {}", path, e);
                return HighScores::new(capacity);
            }
        };

        match HighScores::read_from(BufReader::new(file), capacity) {
            Ok(scores) => {
                info!("Loaded {} high scores from {:?}", scores.records.len(), path);
                scores
            }
            Err(e) => {
                warn!("Error reading high scores from {:?}: {}", path, e);
                HighScores::new(capacity)
            }
        }
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for record in &self.records {
            writeln!(writer, "{}", record)?;
        }
        writer.flush()
    }

    /// Writes the ledger next to `path` first and renames it into place, so
    /// a failed write leaves the previous file intact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let scores_error = |source| GameError::ScoresFile { path: path.to_path_buf(), source };

        let tmp = temp_sibling(path);
        let written = File::create(&tmp)
            .and_then(|file| self.write_to(BufWriter::new(file)))
            .and_then(|()| fs::rename(&tmp, path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(scores_error(e));
        }

        info!("Saved {} high scores to {:?}", self.records.len(), path);
        Ok(())
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
