use std::fmt;

use rand::Rng;

/// A cell on the terminal grid. Row 0 is the top line of the screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Coords {
    pub row: i32,
    pub col: i32,
}

impl Coords {
    pub const fn new(row: i32, col: i32) -> Self {
        Coords { row, col }
    }

    pub fn offset(self, d_row: i32, d_col: i32) -> Self {
        Coords::new(self.row + d_row, self.col + d_col)
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Size of the whole screen the game is drawn on.
///
/// Row 0 holds the timer and score, rows 1 and `height - 1` are the top and
/// bottom border, columns 0 and `width - 1` the side borders.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub height: i32,
    pub width: i32,
}

impl Grid {
    pub const MIN_HEIGHT: i32 = 10;
    pub const MIN_WIDTH: i32 = 20;

    pub const fn new(height: i32, width: i32) -> Self {
        Grid { height, width }
    }

    /// The play area, where the snake may move and fruit may grow.
    pub fn interior(&self) -> Bounds {
        Bounds {
            top: 2,
            bottom: self.height - 2,
            left: 1,
            right: self.width - 2,
        }
    }

    pub fn center(&self) -> Coords {
        Coords::new(self.height / 2, self.width / 2)
    }

    pub fn is_playable(&self) -> bool {
        self.height >= Self::MIN_HEIGHT && self.width >= Self::MIN_WIDTH
    }
}

/// An inclusive rectangle of cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

impl Bounds {
    pub fn contains(&self, pos: Coords) -> bool {
        (self.top..=self.bottom).contains(&pos.row) && (self.left..=self.right).contains(&pos.col)
    }

    pub fn area(&self) -> usize {
        if self.bottom < self.top || self.right < self.left {
            return 0;
        }
        ((self.bottom - self.top + 1) * (self.right - self.left + 1)) as usize
    }

    pub fn cells(self) -> impl Iterator<Item = Coords> {
        (self.top..=self.bottom)
            .flat_map(move |row| (self.left..=self.right).map(move |col| Coords::new(row, col)))
    }

    /// Uniformly drawn cell. The bounds must not be empty.
    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Coords {
        Coords::new(
            rng.gen_range(self.top..=self.bottom),
            rng.gen_range(self.left..=self.right),
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use test_log::test;

    use super::*;

    #[test]
    fn interior_excludes_status_line_and_borders() {
        let interior = Grid::new(20, 40).interior();
        assert_eq!(interior, Bounds { top: 2, bottom: 18, left: 1, right: 38 });
        assert!(interior.contains(Coords::new(2, 1)));
        assert!(interior.contains(Coords::new(18, 38)));
        assert!(!interior.contains(Coords::new(1, 20)));
        assert!(!interior.contains(Coords::new(19, 20)));
        assert!(!interior.contains(Coords::new(9, 0)));
        assert!(!interior.contains(Coords::new(9, 39)));
        assert_eq!(interior.area(), 17 * 38);
        assert_eq!(interior.cells().count(), interior.area());
    }

    #[test]
    fn random_cells_stay_inside() {
        let interior = Grid::new(12, 24).interior();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert!(interior.contains(interior.random_cell(&mut rng)));
        }
    }
}
