/// A raw two-byte opcode, with accessors for
/// the different fields an instruction can encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    /// Opcodes are stored big-endian, so the first byte is the high byte.
    pub fn from_two_u8(left: u8, right: u8) -> Opcode {
        Opcode(((left as u16) << 8) | right as u16)
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// The four nibbles, most significant first.
    pub fn nibbles(self) -> (u8, u8, u8, u8) {
        (
            ((self.0 >> 12) & 0xF) as u8,
            ((self.0 >> 8) & 0xF) as u8,
            ((self.0 >> 4) & 0xF) as u8,
            (self.0 & 0xF) as u8,
        )
    }

    /// NNN
    pub fn addr(self) -> u16 {
        self.0 & 0x0FFF
    }

    /// KK
    pub fn byte(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// N
    pub fn nibble(self) -> u8 {
        (self.0 & 0x000F) as u8
    }
}
