use std::collections::VecDeque;

use crate::grid::{Coords, Grid};
use Direction::*;

const INITIAL_SNAKE_LENGTH: usize = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    /// (row, col) unit step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (-1, 0),
            Down => (1, 0),
            Left => (0, -1),
            Right => (0, 1),
        }
    }
}

/// Snake segments, head at the front and tail at the back.
#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Coords>,
    direction: Direction,
}

impl Snake {
    /// Builds a straight snake with its head at `head`, facing `direction`,
    /// the rest of the body trailing behind it.
    pub fn new(head: Coords, size: usize, direction: Direction) -> Self {
        let (d_row, d_col) = direction.delta();
        let body = (0..size.max(1) as i32)
            .map(|i| head.offset(-d_row * i, -d_col * i))
            .collect();
        Snake { body, direction }
    }

    /// The starting snake: four segments standing upright around the grid center.
    pub fn initial_placement(grid: Grid) -> Self {
        let head = grid.center().offset(-1, 0);
        Snake::new(head, INITIAL_SNAKE_LENGTH, Up)
    }

    pub fn head(&self) -> Coords {
        self.body[0]
    }

    pub fn tail(&self) -> Coords {
        self.body[self.body.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn body(&self) -> impl Iterator<Item = Coords> + '_ {
        self.body.iter().copied()
    }

    pub fn contains(&self, pos: Coords) -> bool {
        self.body.contains(&pos)
    }

    pub fn predicted_head(&self, direction: Direction) -> Coords {
        let (d_row, d_col) = direction.delta();
        self.head().offset(d_row, d_col)
    }

    pub fn next_head(&self) -> Coords {
        self.predicted_head(self.direction)
    }

    /// When the snake is not growing its tail moves out of the way during the
    /// same step, so stepping onto the current tail cell is allowed.
    pub fn will_collide_with_self(&self, candidate: Coords, growing: bool) -> bool {
        let checked = if growing { self.body.len() } else { self.body.len() - 1 };
        self.body.iter().take(checked).any(|&pos| pos == candidate)
    }

    /// Moves the head to `candidate`. Returns the vacated tail cell, if any.
    pub fn advance(&mut self, candidate: Coords, grow: bool) -> Option<Coords> {
        self.body.push_front(candidate);
        if grow {
            None
        } else {
            self.body.pop_back()
        }
    }

    /// Turning back onto the neck is ignored. Returns whether the turn was taken.
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        if new_direction == self.direction.opposite() {
            return false;
        }
        self.direction = new_direction;
        true
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn head_char(&self) -> char {
        match self.direction {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}
