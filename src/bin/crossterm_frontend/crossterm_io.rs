use chip8_vm::emulator::{PixelBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};

use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use std::io::{stdout, Stdout, Write};

/// Draws frames into the terminal, two columns per pixel.
/// Only cells that changed since the last frame are written.
pub struct CrosstermOutput {
    out: Stdout,
    cells: [[u8; SCREEN_WIDTH]; SCREEN_HEIGHT],
}

impl CrosstermOutput {
    pub fn new() -> crossterm::Result<CrosstermOutput> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;
        let mut output = CrosstermOutput {
            out,
            cells: [[0; SCREEN_WIDTH]; SCREEN_HEIGHT],
        };
        output.draw_border()?;
        Ok(output)
    }

    fn draw_border(&mut self) -> crossterm::Result<()> {
        let bottom = SCREEN_HEIGHT as u16 + 1;
        let right = 2 * SCREEN_WIDTH as u16 + 1;
        let horizontal = "━".repeat(2 * SCREEN_WIDTH);
        queue!(self.out, cursor::MoveTo(0, 0), Print(format!("┏{}┓", horizontal)))?;
        for y in 1..bottom {
            queue!(self.out, cursor::MoveTo(0, y), Print('┃'), cursor::MoveTo(right, y), Print('┃'))?;
        }
        queue!(self.out, cursor::MoveTo(0, bottom), Print(format!("┗{}┛", horizontal)))?;
        self.out.flush()?;
        Ok(())
    }

    /// Write one status line under the screen.
    pub fn status(&mut self, text: &str) -> crossterm::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(0, SCREEN_HEIGHT as u16 + 2),
            Clear(ClearType::CurrentLine),
            Print(text)
        )?;
        self.out.flush()?;
        Ok(())
    }

    pub fn refresh(&mut self, frame: &PixelBuffer) -> crossterm::Result<()> {
        for y in 0..frame.height().min(SCREEN_HEIGHT) {
            for x in 0..frame.width().min(SCREEN_WIDTH) {
                let state = frame.is_on(x, y) as u8;
                let old_state = &mut self.cells[y][x];
                if *old_state != state {
                    *old_state = state;
                    queue!(
                        self.out,
                        cursor::MoveTo(2 * x as u16 + 1, y as u16 + 1),
                        Print(if state == 1 { "██" } else { "  " })
                    )?;
                }
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

impl Drop for CrosstermOutput {
    fn drop(&mut self) {
        let _ = execute!(self.out, LeaveAlternateScreen, cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}
