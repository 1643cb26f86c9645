use std::fmt;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
type Screen = [[u8; SCREEN_WIDTH]; SCREEN_HEIGHT];
const EMPTY_SCREEN: Screen = [[0; SCREEN_WIDTH]; SCREEN_HEIGHT];

/// The 64x32 monochrome framebuffer.
/// Every cell is 0 or 1.
pub struct Display {
    screen: Screen,
    needs_redraw: bool,
}

impl Display {
    pub fn new() -> Display {
        Display {
            screen: EMPTY_SCREEN,
            needs_redraw: false,
        }
    }

    pub fn clear(&mut self) {
        self.screen = EMPTY_SCREEN;
        self.needs_redraw = true;
    }

    /// XOR a sprite onto the screen, wrapping around the edges.
    /// Returns true if any pixel was switched off.
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let mut collision = false;
        let mut changed = false;
        for (dy, row) in sprite.iter().enumerate() {
            let py = (y + dy) % SCREEN_HEIGHT;
            for dx in 0..8 {
                let bit = (row >> (7 - dx)) & 1;
                if bit == 0 {
                    continue;
                }
                let px = (x + dx) % SCREEN_WIDTH;
                let cell = &mut self.screen[py][px];
                if *cell == 1 {
                    collision = true;
                }
                *cell ^= 1;
                changed = true;
            }
        }
        if changed {
            self.needs_redraw = true;
        }
        collision
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.screen[y % SCREEN_HEIGHT][x % SCREEN_WIDTH]
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Clear the redraw flag, returning what it was.
    pub fn consume_redraw(&mut self) -> bool {
        std::mem::replace(&mut self.needs_redraw, false)
    }

    pub fn pixel_snapshot(&self) -> PixelBuffer {
        PixelBuffer {
            pixels: self.screen.iter().flat_map(|row| row.iter().copied()).collect(),
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

/// A copy of the screen, row-major, one byte per pixel (0 is off, 1 is on).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn width(&self) -> usize {
        SCREEN_WIDTH
    }

    pub fn height(&self) -> usize {
        SCREEN_HEIGHT
    }

    /// Coordinates wrap around the screen edges like sprite drawing does.
    pub fn is_on(&self, x: usize, y: usize) -> bool {
        let (x, y) = (x % SCREEN_WIDTH, y % SCREEN_HEIGHT);
        self.pixels[y * SCREEN_WIDTH + x] == 1
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks(SCREEN_WIDTH)
    }
}

impl fmt::Display for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for c in row.iter() {
                write!(f, "{}", if *c == 1 { "#" } else { "." })?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
