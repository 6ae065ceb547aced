use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::snake::Direction::{self, *};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Quit,
}

impl Command {
    pub fn from_key_event(ev: &KeyEvent) -> Option<Command> {
        if is_ctrl_c(ev) {
            return Some(Command::Quit);
        }

        match ev.code {
            KeyCode::Char('w') | KeyCode::Up => Some(Command::Move(Up)),
            KeyCode::Char('a') | KeyCode::Left => Some(Command::Move(Left)),
            KeyCode::Char('s') | KeyCode::Down => Some(Command::Move(Down)),
            KeyCode::Char('d') | KeyCode::Right => Some(Command::Move(Right)),
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
            _ => None,
        }
    }

    /// Collapses everything typed during one turn into a single command:
    /// quitting beats moving, and the last move wins.
    pub fn latest<I: IntoIterator<Item = Command>>(commands: I) -> Option<Command> {
        commands.into_iter().fold(None, |latest, cmd| match (latest, cmd) {
            (Some(Command::Quit), _) => latest,
            _ => Some(cmd),
        })
    }
}

pub trait InputSource {
    type Error;

    /// Returns immediately, discarding anything but the latest command.
    fn poll_command(&mut self) -> Result<Option<Command>, Self::Error>;

    /// Blocks until a key maps to a command.
    fn wait_command(&mut self) -> Result<Command, Self::Error>;
}

pub fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
