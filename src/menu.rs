//! Keyboard state for the main menu and the high score name prompt.

use crossterm::event::{KeyCode, KeyEvent};

use crate::input::is_ctrl_c;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MenuItem {
    Play,
    HighScores,
    Options,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 4] = [MenuItem::Play, MenuItem::HighScores, MenuItem::Options, MenuItem::Quit];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Play => "Play",
            MenuItem::HighScores => "High Scores",
            MenuItem::Options => "Options",
            MenuItem::Quit => "Quit",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MenuState {
    highlighted: usize,
}

impl MenuState {
    pub fn highlighted(&self) -> MenuItem {
        MenuItem::ALL[self.highlighted]
    }

    pub fn move_up(&mut self) {
        self.highlighted = (self.highlighted + MenuItem::ALL.len() - 1) % MenuItem::ALL.len();
    }

    pub fn move_down(&mut self) {
        self.highlighted = (self.highlighted + 1) % MenuItem::ALL.len();
    }

    /// Moves the highlight or picks an item.
    pub fn handle_key(&mut self, ev: &KeyEvent) -> Option<MenuItem> {
        if is_ctrl_c(ev) {
            return Some(MenuItem::Quit);
        }
        match ev.code {
            KeyCode::Up | KeyCode::Char('w') => self.move_up(),
            KeyCode::Down | KeyCode::Char('s') => self.move_down(),
            KeyCode::Enter | KeyCode::Char(' ') => return Some(self.highlighted()),
            KeyCode::Char('q') | KeyCode::Esc => return Some(MenuItem::Quit),
            _ => {}
        }
        None
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec!["S N A K E".to_string(), String::new()];
        lines.extend(MenuItem::ALL.iter().map(|&item| {
            if item == self.highlighted() {
                format!("> {} <", item.label())
            } else {
                item.label().to_string()
            }
        }));
        lines
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptState {
    Editing,
    Done(String),
    Cancelled,
}

/// Name entry for a new high score.
#[derive(Clone, Debug, Default)]
pub struct NamePrompt {
    buffer: String,
}

impl NamePrompt {
    pub const MAX_LEN: usize = 16;

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn handle_key(&mut self, ev: &KeyEvent) -> PromptState {
        if is_ctrl_c(ev) {
            return PromptState::Cancelled;
        }
        match ev.code {
            KeyCode::Enter if !self.buffer.trim().is_empty() => {
                return PromptState::Done(self.buffer.trim().to_string());
            }
            KeyCode::Esc => return PromptState::Cancelled,
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            // Commas separate fields in the score file.
            KeyCode::Char(ch) if ch != ',' && !ch.is_control() => {
                if self.buffer.chars().count() < Self::MAX_LEN {
                    self.buffer.push(ch);
                }
            }
            _ => {}
        }
        PromptState::Editing
    }

    pub fn lines(&self, score: u32) -> Vec<String> {
        vec![
            format!("New high score: {}!", score),
            String::new(),
            "Enter your name:".to_string(),
            format!("[{:<width$}]", self.buffer, width = Self::MAX_LEN),
            String::new(),
            "Enter to save, Esc to skip".to_string(),
        ]
    }
}
