use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use crossterm::event::{poll, read, Event, KeyEvent};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style, terminal};

use crate::grid::{Coords, Grid};
use crate::input::{Command, InputSource};
use crate::render::RenderSink;

/// Crossterm-backed screen and keyboard.
///
/// Frames are double buffered: drawing goes to `back`, and `present` only
/// sends the cells that differ from what is on `screen`.
pub struct TermManager {
    width: u16,
    height: u16,
    stdout: Stdout,
    screen: Vec<char>,
    back: Vec<char>,
    current_msg: Option<Message>,
}

struct Message {
    top_left: (u16, u16),
    width: u16,
    height: u16,
}

impl TermManager {
    pub fn new() -> crossterm::Result<Self> {
        let (width, height) = terminal::size()?;
        let cells = width as usize * height as usize;
        Ok(TermManager {
            width,
            height,
            stdout: stdout(),
            screen: vec![' '; cells],
            back: vec![' '; cells],
            current_msg: None,
        })
    }

    pub fn setup(&mut self) -> crossterm::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
    }

    pub fn restore(&mut self) -> crossterm::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.height as i32, self.width as i32)
    }

    pub fn read_key_blocking(&self) -> crossterm::Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                return Ok(ev);
            }
        }
    }

    pub fn read_key_events_queue(&self) -> crossterm::Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(0))? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    /// Clears the whole screen, including the buffers.
    pub fn clear(&mut self) -> crossterm::Result<()> {
        self.current_msg = None;
        self.screen.iter_mut().for_each(|ch| *ch = ' ');
        self.back.iter_mut().for_each(|ch| *ch = ' ');
        execute!(self.stdout, terminal::Clear(ClearType::All))
    }

    /// Draws a centered box with `lines` over whatever is on screen.
    pub fn show_message<S: AsRef<str>>(&mut self, lines: &[S]) -> crossterm::Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2).min(self.height as usize) as u16;
        let widest = lines.iter().map(|l| l.as_ref().chars().count()).max().unwrap_or(0);
        let msg_width = (widest + 2).min(self.width as usize) as u16;
        let top_left = ((self.width - msg_width) / 2, (self.height - msg_height) / 2);

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1] {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, y), ' ')?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().take(msg_height as usize - 2).enumerate() {
            let padded_line = format!("{: ^width$}", line.as_ref(), width = msg_width as usize);
            let y = top_left.1 + i as u16 + 1;
            for (x_diff, ch) in padded_line.chars().take(msg_width as usize).enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as u16, y), ch)?;
            }
        }

        self.current_msg = Some(Message { width: msg_width, height: msg_height, top_left });
        self.flush()
    }

    pub fn hide_message(&mut self) -> crossterm::Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let (x, y) = (msg.top_left.0 + x_diff, msg.top_left.1 + y_diff);
                let ch = self.screen[self.index(x, y)];
                self.print_at_no_save((x, y), ch)?;
            }
        }

        self.flush()
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    pub fn flush(&mut self) -> crossterm::Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, x: u16, y: u16) -> usize {
        self.width as usize * y as usize + x as usize
    }

    fn print_at_no_save(&mut self, (x, y): (u16, u16), ch: char) -> crossterm::Result<()> {
        // Used for message boxes, which must not overwrite the screen buffer
        queue!(self.stdout, cursor::MoveTo(x, y), style::Print(ch))
    }
}

impl RenderSink for TermManager {
    type Error = crossterm::ErrorKind;

    fn draw_cell(&mut self, pos: Coords, glyph: char) -> crossterm::Result<()> {
        if pos.row < 0 || pos.col < 0 || pos.row >= self.height as i32 || pos.col >= self.width as i32 {
            return Ok(());
        }
        let i = self.index(pos.col as u16, pos.row as u16);
        self.back[i] = glyph;
        Ok(())
    }

    fn clear_frame(&mut self) -> crossterm::Result<()> {
        self.back.iter_mut().for_each(|ch| *ch = ' ');
        Ok(())
    }

    fn present(&mut self) -> crossterm::Result<()> {
        self.hide_message()?;
        for (i, (x, y), ch) in changed_cells(&self.screen, &self.back, self.width) {
            queue!(self.stdout, cursor::MoveTo(x, y), style::Print(ch))?;
            self.screen[i] = ch;
        }
        self.flush()
    }
}

impl InputSource for TermManager {
    type Error = crossterm::ErrorKind;

    fn poll_command(&mut self) -> crossterm::Result<Option<Command>> {
        let events = self.read_key_events_queue()?;
        Ok(Command::latest(events.iter().filter_map(Command::from_key_event)))
    }

    fn wait_command(&mut self) -> crossterm::Result<Command> {
        loop {
            if let Some(cmd) = Command::from_key_event(&self.read_key_blocking()?) {
                return Ok(cmd);
            }
        }
    }
}

/// Cells where `back` differs from what is on `screen`, as buffer index,
/// screen position and the new glyph.
fn changed_cells(screen: &[char], back: &[char], width: u16) -> Vec<(usize, (u16, u16), char)> {
    let width = width as usize;
    screen
        .iter()
        .zip(back)
        .enumerate()
        .filter(|(_, (old, new))| old != new)
        .map(|(i, (_, &ch))| (i, ((i % width) as u16, (i / width) as u16), ch))
        .collect()
}
