//! The 4K address space, with the font at 0x050 and programs at 0x200.

use super::error::LoadError;

pub const MEM_SIZE: usize = 4096;
pub const ADDR_MASK: u16 = 0x0FFF;
pub const PROGRAM_START: u16 = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEM_SIZE - PROGRAM_START as usize;
pub const FONT_START: u16 = 0x050;
/// Each glyph is five rows tall.
pub const FONT_GLYPH_SIZE: u16 = 5;

const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

pub struct Memory {
    bytes: [u8; MEM_SIZE],
}

impl Memory {
    pub fn new() -> Memory {
        let mut memory = Memory { bytes: [0; MEM_SIZE] };
        memory.reset();
        memory
    }

    /// Zero everything, then write the font back.
    pub fn reset(&mut self) {
        self.bytes = [0; MEM_SIZE];
        let font_start = FONT_START as usize;
        self.bytes[font_start..font_start + FONT.len()].copy_from_slice(&FONT);
    }

    /// Copy a program into memory at 0x200.
    /// Nothing is written unless the whole program fits.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.is_empty() {
            return Err(LoadError::EmptyProgram);
        }
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(LoadError::RomTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        let start = PROGRAM_START as usize;
        self.bytes[start..start + program.len()].copy_from_slice(program);
        Ok(())
    }

    pub fn read_byte(&self, addr: u16) -> u8 {
        self.bytes[(addr & ADDR_MASK) as usize]
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) {
        self.bytes[(addr & ADDR_MASK) as usize] = value;
    }

    /// Read a big-endian word, the second byte wraps around to 0x000.
    pub fn read_word(&self, addr: u16) -> u16 {
        let left = self.read_byte(addr);
        let right = self.read_byte(addr.wrapping_add(1));
        ((left as u16) << 8) | right as u16
    }

    /// Read `len` consecutive bytes starting at `addr`, wrapping at the top of memory.
    pub fn read_wrapping(&self, addr: u16, len: usize) -> Vec<u8> {
        (0..len)
            .map(|offset| self.read_byte(addr.wrapping_add(offset as u16)))
            .collect()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
