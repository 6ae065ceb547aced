//! The turn engine: one fixed-length step of the game at a time.

use std::collections::HashSet;
use std::thread::sleep;
use std::time::{Duration, Instant};

use log::{info, trace};
use rand::rngs::ThreadRng;
use rand::Rng;

use crate::fruit::{FruitMarket, MarketSettings};
use crate::grid::{Coords, Grid};
use crate::render::{self, RenderSink, DEAD_SNAKE_CHAR, FRUIT_CHAR, SNAKE_BODY_CHAR, SNAKE_TAIL_CHAR};
use crate::snake::{Direction, Snake};

#[derive(Clone, Debug, PartialEq)]
pub struct EngineSettings {
    pub turn_duration: Duration,
    pub market: MarketSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings { turn_duration: Duration::from_millis(250), market: MarketSettings::default() }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// The snake sits still until the first direction key.
    AwaitingFirstInput,
    Running,
    GameOver { score: u32 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    Continue,
    GameOver { score: u32 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Death {
    Wall,
    SelfBite,
}

pub struct TurnEngine<R = ThreadRng> {
    grid: Grid,
    settings: EngineSettings,
    snake: Snake,
    market: FruitMarket,
    rng: R,
    state: EngineState,
    turn: u64,
    score: u32,
    pending: Option<Direction>,
    // Eating is noticed one turn before the body grows.
    got_fruit: bool,
}

impl TurnEngine<ThreadRng> {
    pub fn new(grid: Grid, settings: EngineSettings) -> Self {
        TurnEngine::with_rng(grid, settings, rand::thread_rng())
    }
}

impl<R: Rng> TurnEngine<R> {
    pub fn with_rng(grid: Grid, settings: EngineSettings, rng: R) -> Self {
        let snake = Snake::initial_placement(grid);
        TurnEngine::from_parts(grid, settings, snake, rng)
    }

    pub fn from_parts(grid: Grid, settings: EngineSettings, snake: Snake, rng: R) -> Self {
        let market = FruitMarket::new(settings.market.clone());
        TurnEngine {
            grid,
            settings,
            snake,
            market,
            rng,
            state: EngineState::AwaitingFirstInput,
            turn: 0,
            score: 0,
            pending: None,
            got_fruit: false,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn market(&self) -> &FruitMarket {
        &self.market
    }

    #[cfg(test)]
    pub(crate) fn market_mut(&mut self) -> &mut FruitMarket {
        &mut self.market
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn turn_duration(&self) -> Duration {
        self.settings.turn_duration
    }

    /// Game time: turns played times the turn length.
    pub fn game_time(&self) -> Duration {
        self.settings.turn_duration * u32::try_from(self.turn).unwrap_or(u32::MAX)
    }

    /// Buffers a direction for the next turn; the latest call wins. While
    /// waiting for the first input, an acceptable direction starts the game
    /// without spending a turn. Returns whether the engine is running.
    pub fn steer(&mut self, direction: Direction) -> bool {
        match self.state {
            EngineState::AwaitingFirstInput => {
                if direction == self.snake.direction().opposite() {
                    return false;
                }
                info!("Session started heading {:?}", direction);
                self.pending = Some(direction);
                self.state = EngineState::Running;
                true
            }
            EngineState::Running => {
                self.pending = Some(direction);
                true
            }
            EngineState::GameOver { .. } => false,
        }
    }

    pub fn play_turn(&mut self) -> TurnOutcome {
        match self.state {
            EngineState::AwaitingFirstInput => return TurnOutcome::Continue,
            EngineState::GameOver { score } => return TurnOutcome::GameOver { score },
            EngineState::Running => {}
        }

        self.turn += 1;
        let now = self.game_time();

        if let Some(direction) = self.pending.take() {
            self.snake.set_direction(direction);
        }
        let candidate = self.snake.next_head();

        if self.market.is_spawn_due(now) {
            let mut occupied: HashSet<Coords> = self.snake.body().collect();
            occupied.insert(candidate);
            self.market.spawn(now, &occupied, self.grid.interior(), &mut self.rng);
        }

        let grow = self.got_fruit;
        let gained = self.market.prune_and_consume(now, candidate);
        self.got_fruit = gained > 0;

        if !self.grid.interior().contains(candidate) {
            return self.die(Death::Wall, candidate);
        }
        if self.snake.will_collide_with_self(candidate, grow) {
            return self.die(Death::SelfBite, candidate);
        }

        self.snake.advance(candidate, grow);
        self.score += gained;
        trace!("Turn {}: head {} score {}", self.turn, candidate, self.score);

        TurnOutcome::Continue
    }

    fn die(&mut self, death: Death, at: Coords) -> TurnOutcome {
        info!(
            "Game over on turn {} ({:?} at {}), final score {}",
            self.turn, death, at, self.score
        );
        self.state = EngineState::GameOver { score: self.score };
        TurnOutcome::GameOver { score: self.score }
    }

    pub fn render<S: RenderSink + ?Sized>(&self, sink: &mut S) -> Result<(), S::Error> {
        let now = self.game_time();
        let dead = matches!(self.state, EngineState::GameOver { .. });

        sink.clear_frame()?;
        render::draw_border(sink, self.grid)?;

        sink.draw_text(Coords::new(0, 0), &format!("Time: {:.1}s", now.as_secs_f64()))?;
        let score = format!("Score: {}", self.score);
        let score_col = (self.grid.width - score.chars().count() as i32).max(0);
        sink.draw_text(Coords::new(0, score_col), &score)?;

        for fruit in self.market.ripe(now) {
            sink.draw_cell(fruit.pos, FRUIT_CHAR)?;
        }

        let last = self.snake.len() - 1;
        for (i, pos) in self.snake.body().enumerate() {
            let ch = match i {
                _ if dead => DEAD_SNAKE_CHAR,
                0 => self.snake.head_char(),
                i if i == last => SNAKE_TAIL_CHAR,
                _ => SNAKE_BODY_CHAR,
            };
            sink.draw_cell(pos, ch)?;
        }

        sink.present()
    }
}

/// Keeps turns on a fixed cadence measured from the session start, so slow
/// turns don't make the game drift.
#[derive(Clone, Debug)]
pub struct TurnClock {
    started: Instant,
    turn_duration: Duration,
}

impl TurnClock {
    pub fn start(turn_duration: Duration) -> Self {
        TurnClock { started: Instant::now(), turn_duration }
    }

    /// How long to wait until `turn` is due.
    pub fn delay_before(&self, turn: u64) -> Duration {
        let due = self.turn_duration * u32::try_from(turn).unwrap_or(u32::MAX);
        due.saturating_sub(self.started.elapsed())
    }

    pub fn wait_for(&self, turn: u64) {
        let delay = self.delay_before(turn);
        if !delay.is_zero() {
            sleep(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_log::test;

    use super::*;
    use crate::fruit::Fruit;
    use crate::render::testing::FrameRecorder;
    use crate::snake::Direction::*;

    const GRID: Grid = Grid::new(20, 40);

    fn engine() -> TurnEngine<StdRng> {
        TurnEngine::with_rng(GRID, EngineSettings::default(), StdRng::seed_from_u64(11))
    }

    fn engine_with(snake: Snake) -> TurnEngine<StdRng> {
        TurnEngine::from_parts(GRID, EngineSettings::default(), snake, StdRng::seed_from_u64(11))
    }

    fn forever_fruit(row: i32, col: i32) -> Fruit {
        Fruit::new(Coords::new(row, col), Duration::ZERO, None, 10)
    }

    #[test]
    fn stays_put_until_first_direction() {
        let mut engine = engine();
        assert_eq!(engine.state(), EngineState::AwaitingFirstInput);
        assert_eq!(engine.play_turn(), TurnOutcome::Continue);
        assert_eq!(engine.turn(), 0);
        assert_eq!(engine.snake().head(), Coords::new(9, 20));

        // Facing up, so down would bite the neck.
        assert!(!engine.steer(Down));
        assert_eq!(engine.state(), EngineState::AwaitingFirstInput);

        assert!(engine.steer(Right));
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.turn(), 0);
        assert_eq!(engine.play_turn(), TurnOutcome::Continue);
        assert_eq!(engine.turn(), 1);
        assert_eq!(engine.snake().head(), Coords::new(9, 21));
        assert_eq!(engine.game_time(), Duration::from_millis(250));
    }

    #[test]
    fn eating_grows_the_body_one_turn_later() {
        let mut engine = engine();
        engine.market_mut().insert(forever_fruit(9, 19));
        let initial = engine.snake().len();

        engine.steer(Left);
        assert_eq!(engine.play_turn(), TurnOutcome::Continue);
        assert_eq!(engine.snake().head(), Coords::new(9, 19));
        assert_eq!(engine.score(), 10);
        assert_eq!(engine.snake().len(), initial);
        assert!(!engine.market().is_fruit_at(Coords::new(9, 19)));

        assert_eq!(engine.play_turn(), TurnOutcome::Continue);
        assert_eq!(engine.snake().len(), initial + 1);

        assert_eq!(engine.play_turn(), TurnOutcome::Continue);
        assert_eq!(engine.snake().len(), initial + 1);
        assert_eq!(engine.score(), 10);
    }

    #[test]
    fn hitting_the_top_wall_ends_the_game() {
        let mut engine = engine_with(Snake::new(Coords::new(3, 20), 4, Up));
        engine.market_mut().insert(forever_fruit(10, 10));
        engine.market_mut().insert(forever_fruit(2, 21));

        engine.steer(Right);
        engine.play_turn();
        engine.steer(Up);
        engine.play_turn();
        assert_eq!(engine.snake().head(), Coords::new(2, 21));
        assert_eq!(engine.score(), 10);

        assert_eq!(engine.play_turn(), TurnOutcome::GameOver { score: 10 });
        assert_eq!(engine.state(), EngineState::GameOver { score: 10 });
        assert_eq!(engine.snake().head(), Coords::new(2, 21));

        // Terminal: nothing moves any more.
        assert!(!engine.steer(Left));
        assert_eq!(engine.play_turn(), TurnOutcome::GameOver { score: 10 });
        assert_eq!(engine.snake().head(), Coords::new(2, 21));
    }

    #[test]
    fn every_wall_is_lethal() {
        for (head, direction) in [
            (Coords::new(18, 20), Down),
            (Coords::new(10, 1), Left),
            (Coords::new(10, 38), Right),
            (Coords::new(2, 20), Up),
        ] {
            let mut engine = engine_with(Snake::new(head, 1, direction));
            engine.steer(direction);
            assert_eq!(engine.play_turn(), TurnOutcome::GameOver { score: 0 }, "{:?}", direction);
        }
    }

    #[test]
    fn chasing_the_tail_is_allowed() {
        // Square loop: head (5, 5), (5, 6), (6, 6), tail (6, 5), heading up.
        let mut snake = Snake::new(Coords::new(6, 5), 1, Up);
        snake.advance(Coords::new(6, 6), true);
        snake.advance(Coords::new(5, 6), true);
        snake.advance(Coords::new(5, 5), true);
        snake.set_direction(Left);

        let mut engine = engine_with(snake);
        engine.steer(Down);
        assert_eq!(engine.play_turn(), TurnOutcome::Continue);
        assert_eq!(engine.snake().head(), Coords::new(6, 5));
        assert_eq!(engine.snake().len(), 4);
    }

    #[test]
    fn biting_the_tail_while_growing_is_fatal() {
        // head (5, 6), (6, 6), (6, 5), tail (7, 5), heading up.
        let mut snake = Snake::new(Coords::new(7, 5), 1, Up);
        snake.advance(Coords::new(6, 5), true);
        snake.advance(Coords::new(6, 6), true);
        snake.advance(Coords::new(5, 6), true);

        let mut engine = engine_with(snake);
        engine.market_mut().insert(forever_fruit(5, 5));
        engine.steer(Left);
        assert_eq!(engine.play_turn(), TurnOutcome::Continue);
        assert_eq!(engine.score(), 10);
        assert_eq!(engine.snake().tail(), Coords::new(6, 5));

        // The body grows this turn, so the tail stays where the head is going.
        engine.steer(Down);
        assert_eq!(engine.play_turn(), TurnOutcome::GameOver { score: 10 });
    }

    #[test]
    fn running_into_the_body_is_fatal() {
        let mut engine = engine_with(Snake::new(Coords::new(10, 10), 5, Right));
        engine.steer(Up);
        engine.play_turn();
        engine.steer(Left);
        engine.play_turn();
        engine.steer(Down);
        assert_eq!(engine.play_turn(), TurnOutcome::GameOver { score: 0 });
    }

    #[test]
    fn fruit_is_spawned_when_due() {
        let mut engine = engine();
        engine.steer(Up);
        engine.play_turn();
        assert_eq!(engine.market().fruits().len(), 1);
        let fruit = engine.market().fruits()[0].clone();
        assert!(fruit.created >= engine.game_time() + Duration::from_secs(5));
        assert!(!engine.snake().contains(fruit.pos));

        // Not due again until the first one shows up.
        engine.play_turn();
        assert_eq!(engine.market().fruits().len(), 1);
    }

    #[test]
    fn frame_shows_status_border_fruit_and_snake() {
        let mut engine = engine();
        engine.market_mut().insert(forever_fruit(4, 4));
        engine.market_mut().insert(Fruit::new(Coords::new(5, 5), Duration::from_secs(60), None, 10));
        let mut sink = FrameRecorder::default();
        engine.render(&mut sink).unwrap();

        assert!(sink.row_text(0, 40).starts_with("Time: 0.0s"));
        assert!(sink.row_text(0, 40).ends_with("Score: 0"));
        assert_eq!(sink.at(1, 0), Some('O'));
        assert_eq!(sink.at(4, 4), Some(FRUIT_CHAR));
        assert_eq!(sink.at(5, 5), None);
        assert_eq!(sink.at(9, 20), Some('^'));
        assert_eq!(sink.at(10, 20), Some(SNAKE_BODY_CHAR));
        assert_eq!(sink.at(12, 20), Some(SNAKE_TAIL_CHAR));
        assert_eq!(sink.presented, 1);
    }

    #[test]
    fn dead_snake_is_crossed_out() {
        let mut engine = engine_with(Snake::new(Coords::new(2, 20), 3, Up));
        engine.steer(Up);
        engine.play_turn();
        let mut sink = FrameRecorder::default();
        engine.render(&mut sink).unwrap();
        assert_eq!(sink.count(DEAD_SNAKE_CHAR), 3);
    }

    #[test]
    fn clock_waits_for_the_turn_boundary() {
        let clock = TurnClock::start(Duration::from_secs(10));
        assert_eq!(clock.delay_before(0), Duration::ZERO);
        let delay = clock.delay_before(2);
        assert!(delay > Duration::from_secs(19) && delay <= Duration::from_secs(20));

        let fast = TurnClock::start(Duration::from_millis(2));
        fast.wait_for(3);
        assert_eq!(fast.delay_before(3), Duration::ZERO);
    }
}
