use std::path::PathBuf;

use log::{info, warn};
use rand::Rng;

use crate::config::Config;
use crate::engine::{TurnClock, TurnEngine, TurnOutcome};
use crate::error::{GameError, Result};
use crate::grid::Grid;
use crate::highscores::HighScores;
use crate::input::{Command, InputSource};
use crate::menu::{MenuItem, MenuState, NamePrompt, PromptState};
use crate::render::RenderSink;
use crate::term::TermManager;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    GameOver { score: u32 },
}

/// Runs one play session to its end. Waits for the first direction, then
/// plays one turn per tick until the snake dies or the player quits.
pub fn play_session<T, R>(
    term: &mut T,
    engine: &mut TurnEngine<R>,
) -> std::result::Result<SessionEnd, <T as RenderSink>::Error>
where
    T: RenderSink + InputSource<Error = <T as RenderSink>::Error>,
    R: Rng,
{
    engine.render(term)?;

    loop {
        match term.wait_command()? {
            Command::Quit => return Ok(SessionEnd::Quit),
            Command::Move(direction) => {
                if engine.steer(direction) {
                    break;
                }
            }
        }
    }

    let clock = TurnClock::start(engine.turn_duration());
    loop {
        clock.wait_for(engine.turn() + 1);

        match term.poll_command()? {
            Some(Command::Quit) => {
                info!("Session abandoned after {} turns", engine.turn());
                return Ok(SessionEnd::Quit);
            }
            Some(Command::Move(direction)) => {
                engine.steer(direction);
            }
            None => {}
        }

        let outcome = engine.play_turn();
        engine.render(term)?;
        if let TurnOutcome::GameOver { score } = outcome {
            return Ok(SessionEnd::GameOver { score });
        }
    }
}

pub struct SnakeGame {
    config: Config,
    term: TermManager,
    scores: HighScores,
    scores_path: PathBuf,
    menu: MenuState,
}

impl SnakeGame {
    pub fn new(config: Config) -> Result<Self> {
        let term = TermManager::new()?;
        let scores_path = config.scores_path();
        let scores = HighScores::load(&scores_path, config.max_scores);
        Ok(SnakeGame { config, term, scores, scores_path, menu: MenuState::default() })
    }

    /// Takes over the terminal until the player quits, and hands it back
    /// afterwards even if something failed.
    pub fn run(&mut self) -> Result<()> {
        let grid = self.term.grid();
        if !grid.is_playable() {
            return Err(GameError::TerminalTooSmall {
                width: grid.width,
                height: grid.height,
                min_width: Grid::MIN_WIDTH,
                min_height: Grid::MIN_HEIGHT,
            });
        }

        self.term.setup()?;
        let res = self.main_menu();
        self.term.restore()?;
        res
    }

    ///////////////////////////////////////////////////////////////////////////

    fn main_menu(&mut self) -> Result<()> {
        loop {
            self.term.clear()?;
            self.term.show_message(&self.menu.lines())?;

            let key = self.term.read_key_blocking()?;
            match self.menu.handle_key(&key) {
                Some(MenuItem::Play) => self.play()?,
                Some(MenuItem::HighScores) => self.show_high_scores()?,
                Some(MenuItem::Options) => self.show_options()?,
                Some(MenuItem::Quit) => return Ok(()),
                None => {}
            }
        }
    }

    fn play(&mut self) -> Result<()> {
        self.term.clear()?;
        let mut engine = TurnEngine::new(self.term.grid(), self.config.engine_settings());

        match play_session(&mut self.term, &mut engine)? {
            SessionEnd::Quit => Ok(()),
            SessionEnd::GameOver { score } => self.game_over(score),
        }
    }

    fn game_over(&mut self, score: u32) -> Result<()> {
        let mut lines = vec!["Game over!".to_string(), format!("Score: {}", score)];

        if self.scores.is_qualifying(score) {
            if let Some(name) = self.ask_name(score)? {
                self.scores.insert(name, score);
                if let Err(e) = self.scores.save(&self.scores_path) {
                    warn!("{}", e);
                    lines.push(String::new());
                    lines.push("Warning: high scores could not be saved".to_string());
                }
            }
        }

        lines.extend(["".to_string(), "Press any key to continue".to_string()]);
        self.term.show_message(&lines)?;
        self.wait_key()
    }

    fn ask_name(&mut self, score: u32) -> Result<Option<String>> {
        let mut prompt = NamePrompt::default();
        loop {
            self.term.show_message(&prompt.lines(score))?;
            match prompt.handle_key(&self.term.read_key_blocking()?) {
                PromptState::Editing => {}
                PromptState::Done(name) => return Ok(Some(name)),
                PromptState::Cancelled => return Ok(None),
            }
        }
    }

    fn show_high_scores(&mut self) -> Result<()> {
        let mut lines = vec!["High Scores".to_string(), String::new()];
        if self.scores.records().is_empty() {
            lines.push("No high scores yet".to_string());
        }
        let width = self.scores.records().iter().map(|r| r.name.chars().count()).max().unwrap_or(0);
        lines.extend(
            self.scores
                .records()
                .iter()
                .enumerate()
                .map(|(i, r)| format!("{:>2}. {:<width$} {:>6}", i + 1, r.name, r.score, width = width)),
        );
        lines.extend(["".to_string(), "Press any key".to_string()]);

        self.term.show_message(&lines)?;
        self.wait_key()
    }

    fn show_options(&mut self) -> Result<()> {
        let mut lines = vec!["Options".to_string(), String::new()];
        lines.extend(self.config.describe());
        lines.extend(["".to_string(), "Set these on the command line, see --help".to_string()]);

        self.term.show_message(&lines)?;
        self.wait_key()
    }

    fn wait_key(&mut self) -> Result<()> {
        self.term.read_key_blocking()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_log::test;

    use super::*;
    use crate::engine::{EngineSettings, EngineState};
    use crate::grid::{Coords, Grid};
    use crate::input::testing::ScriptedInput;
    use crate::render::testing::FrameRecorder;
    use crate::snake::Direction::*;

    #[derive(Default)]
    struct FakeTerm {
        frames: FrameRecorder,
        input: ScriptedInput,
    }

    impl RenderSink for FakeTerm {
        type Error = Infallible;

        fn draw_cell(&mut self, pos: Coords, glyph: char) -> std::result::Result<(), Infallible> {
            self.frames.draw_cell(pos, glyph)
        }

        fn clear_frame(&mut self) -> std::result::Result<(), Infallible> {
            self.frames.clear_frame()
        }

        fn present(&mut self) -> std::result::Result<(), Infallible> {
            self.frames.present()
        }
    }

    impl InputSource for FakeTerm {
        type Error = Infallible;

        fn poll_command(&mut self) -> std::result::Result<Option<Command>, Infallible> {
            self.input.poll_command()
        }

        fn wait_command(&mut self) -> std::result::Result<Command, Infallible> {
            self.input.wait_command()
        }
    }

    fn fast_engine() -> TurnEngine<StdRng> {
        let settings = EngineSettings { turn_duration: Duration::from_millis(1), ..EngineSettings::default() };
        TurnEngine::with_rng(Grid::new(20, 40), settings, StdRng::seed_from_u64(5))
    }

    #[test]
    fn quitting_before_the_first_move_ends_the_session() {
        let mut term = FakeTerm { input: ScriptedInput::new([None, Some(Command::Quit)]), ..FakeTerm::default() };
        let mut engine = fast_engine();
        assert_eq!(play_session(&mut term, &mut engine).unwrap(), SessionEnd::Quit);
        assert_eq!(engine.state(), EngineState::AwaitingFirstInput);
        assert_eq!(term.frames.presented, 1);
    }

    #[test]
    fn quitting_mid_game_records_nothing() {
        let mut term = FakeTerm {
            input: ScriptedInput::new([Some(Command::Move(Left)), None, Some(Command::Move(Down)), None, Some(Command::Quit)]),
            ..FakeTerm::default()
        };
        let mut engine = fast_engine();
        assert_eq!(play_session(&mut term, &mut engine).unwrap(), SessionEnd::Quit);
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.turn(), 3);
        assert_eq!(engine.snake().head(), Coords::new(11, 19));
    }

    #[test]
    fn reversed_first_move_is_ignored() {
        let mut term = FakeTerm {
            input: ScriptedInput::new([Some(Command::Move(Down)), Some(Command::Move(Up)), Some(Command::Quit)]),
            ..FakeTerm::default()
        };
        let mut engine = fast_engine();
        assert_eq!(play_session(&mut term, &mut engine).unwrap(), SessionEnd::Quit);
        assert_eq!(engine.turn(), 0);
        assert_eq!(engine.state(), EngineState::Running);
    }

    #[test]
    fn running_into_the_wall_ends_with_the_score() {
        // Head starts at (9, 20); seven turns up reaches row 2, the eighth hits the border.
        let mut term = FakeTerm { input: ScriptedInput::new([Some(Command::Move(Up))]), ..FakeTerm::default() };
        term.input.polls.extend(std::iter::repeat(None).take(20));
        let mut engine = fast_engine();
        assert_eq!(play_session(&mut term, &mut engine).unwrap(), SessionEnd::GameOver { score: 0 });
        assert_eq!(engine.turn(), 8);
        assert_eq!(term.frames.at(2, 20), Some(crate::render::DEAD_SNAKE_CHAR));
    }
}
