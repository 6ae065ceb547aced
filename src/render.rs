use crate::grid::{Coords, Grid};

pub const SNAKE_BODY_CHAR: char = '*';
pub const SNAKE_TAIL_CHAR: char = '.';
pub const DEAD_SNAKE_CHAR: char = 'X';
pub const FRUIT_CHAR: char = '@';

const BORDER_H_CHAR: char = '-';
const BORDER_V_CHAR: char = '|';
const BORDER_CORNER_CHAR: char = 'O';

/// Something a frame can be drawn onto, one character cell at a time.
pub trait RenderSink {
    type Error;

    fn draw_cell(&mut self, pos: Coords, glyph: char) -> Result<(), Self::Error>;

    fn clear_frame(&mut self) -> Result<(), Self::Error>;

    fn present(&mut self) -> Result<(), Self::Error>;

    fn draw_text(&mut self, pos: Coords, text: &str) -> Result<(), Self::Error> {
        for (i, ch) in text.chars().enumerate() {
            self.draw_cell(pos.offset(0, i as i32), ch)?;
        }
        Ok(())
    }
}

pub fn draw_border<S: RenderSink + ?Sized>(sink: &mut S, grid: Grid) -> Result<(), S::Error> {
    let (top, bottom) = (1, grid.height - 1);
    let (left, right) = (0, grid.width - 1);

    for col in left..=right {
        let ch = if col == left || col == right { BORDER_CORNER_CHAR } else { BORDER_H_CHAR };
        sink.draw_cell(Coords::new(top, col), ch)?;
        sink.draw_cell(Coords::new(bottom, col), ch)?;
    }

    for row in top + 1..bottom {
        sink.draw_cell(Coords::new(row, left), BORDER_V_CHAR)?;
        sink.draw_cell(Coords::new(row, right), BORDER_V_CHAR)?;
    }

    Ok(())
}
