//! The CHIP-8 CPU as described at https://en.wikipedia.org/wiki/CHIP-8#Virtual_machine_description.

use super::display::Display;
use super::error::Fault;
use super::input::Keypad;
use super::instruction::*;
use super::memory::{Memory, ADDR_MASK, FONT_GLYPH_SIZE, FONT_START, PROGRAM_START};
use super::opcode::Opcode;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const NUM_REGISTERS: usize = 16;
pub const STACK_SIZE: usize = 16;
const FLAG: usize = 0xF;

/// Whether the CPU is executing or suspended on `FX0A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyWait {
    Running,
    /// Suspended until a key goes down, the key is stored in the register.
    WaitingForKey(Reg),
    /// A key arrived, the next cycle stores it and moves past `FX0A`.
    KeyReceived(Reg, u8),
}

pub struct Cpu {
    registers: [u8; NUM_REGISTERS],
    i: u16,
    program_counter: u16,
    stack_pointer: usize,
    stack: [u16; STACK_SIZE],
    delay_timer: u8,
    sound_timer: u8,
    key_wait: KeyWait,
    rng: StdRng,
}

impl Cpu {
    pub fn new(rng: StdRng) -> Cpu {
        Cpu {
            registers: [0; NUM_REGISTERS],
            i: 0,
            program_counter: PROGRAM_START,
            stack_pointer: 0,
            stack: [0; STACK_SIZE],
            delay_timer: 0,
            sound_timer: 0,
            key_wait: KeyWait::Running,
            rng,
        }
    }

    /// Zero every register and go back to 0x200. The random source is kept.
    pub fn reset(&mut self) {
        self.registers = [0; NUM_REGISTERS];
        self.i = 0;
        self.program_counter = PROGRAM_START;
        self.stack_pointer = 0;
        self.stack = [0; STACK_SIZE];
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.key_wait = KeyWait::Running;
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn registers(&self) -> &[u8; NUM_REGISTERS] {
        &self.registers
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn stack_depth(&self) -> usize {
        self.stack_pointer
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn key_wait(&self) -> KeyWait {
        self.key_wait
    }

    pub fn is_waiting_for_key(&self) -> bool {
        matches!(self.key_wait, KeyWait::WaitingForKey(_))
    }

    /// Hand a freshly pressed key to a pending `FX0A`.
    /// Returns false if nothing was waiting.
    pub fn key_pressed(&mut self, key: u8) -> bool {
        match self.key_wait {
            KeyWait::WaitingForKey(reg) => {
                log::debug!("Key {:X} resolves wait into V{:X}", key, reg.0);
                self.key_wait = KeyWait::KeyReceived(reg, key);
                true
            }
            _ => false,
        }
    }

    /// Decrement both timers by one, stopping at zero.
    pub fn update_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Fetch, decode and execute a single instruction.
    /// Returns the fault if the instruction had to be skipped.
    pub fn execute_cycle(
        &mut self,
        memory: &mut Memory,
        display: &mut Display,
        keypad: &Keypad,
    ) -> Option<Fault> {
        match self.key_wait {
            KeyWait::WaitingForKey(_) => return None,
            KeyWait::KeyReceived(Reg(x), key) => {
                self.registers[x as usize] = key;
                self.key_wait = KeyWait::Running;
                self.skip();
                return None;
            }
            KeyWait::Running => {}
        }

        // Each opcode is two bytes
        let pc = self.program_counter;
        let opcode = Opcode(memory.read_word(pc));
        self.skip();

        match Instruction::decode(opcode) {
            Some(instruction) => {
                log::trace!("{:#05x}: {}", pc, instruction);
                self.execute_single(pc, instruction, memory, display, keypad)
            }
            None => Some(Fault::UnknownOpcode {
                pc,
                opcode: opcode.as_u16(),
            }),
        }
    }

    /// Move the program counter past the next instruction.
    fn skip(&mut self) {
        self.program_counter = self.program_counter.wrapping_add(2) & ADDR_MASK;
    }

    fn jump(&mut self, addr: u16) {
        self.program_counter = addr & ADDR_MASK & !1;
    }

    /// Execute a single instruction. The program counter already points past it.
    fn execute_single(
        &mut self,
        pc: u16,
        instruction: Instruction,
        memory: &mut Memory,
        display: &mut Display,
        keypad: &Keypad,
    ) -> Option<Fault> {
        match instruction {
            // Machine code routines are not supported
            Instruction::Sys(_) => {}

            Instruction::ClearScreen => display.clear(),

            // Return to the previous call site via the stack.
            Instruction::Return => {
                if self.stack_pointer == 0 {
                    return Some(Fault::StackUnderflow { pc });
                }
                self.stack_pointer -= 1;
                self.program_counter = self.stack[self.stack_pointer];
            }

            Instruction::Goto(Addr(addr)) => self.jump(addr),

            // Store the current address on the stack, then jump to the specified address
            Instruction::Call(Addr(addr)) => {
                if self.stack_pointer == STACK_SIZE {
                    return Some(Fault::StackOverflow { pc });
                }
                self.stack[self.stack_pointer] = self.program_counter;
                self.stack_pointer += 1;
                self.jump(addr);
            }

            Instruction::IfRegEqConst(Reg(x), Const(n)) => {
                if self.registers[x as usize] == n {
                    self.skip();
                }
            }

            Instruction::IfRegNeqConst(Reg(x), Const(n)) => {
                if self.registers[x as usize] != n {
                    self.skip();
                }
            }

            Instruction::IfRegEqReg(Reg(x), Reg(y)) => {
                if self.registers[x as usize] == self.registers[y as usize] {
                    self.skip();
                }
            }

            Instruction::SetRegToConst(Reg(x), Const(n)) => {
                self.registers[x as usize] = n;
            }

            // No carry flag for the immediate form
            Instruction::IncRegByConst(Reg(x), Const(n)) => {
                self.registers[x as usize] = self.registers[x as usize].wrapping_add(n);
            }

            Instruction::SetRegToReg(Reg(x), Reg(y)) => {
                self.registers[x as usize] = self.registers[y as usize];
            }

            Instruction::BitwiseOr(Reg(x), Reg(y)) => {
                self.registers[x as usize] |= self.registers[y as usize];
            }

            Instruction::BitwiseAnd(Reg(x), Reg(y)) => {
                self.registers[x as usize] &= self.registers[y as usize];
            }

            Instruction::BitwiseXor(Reg(x), Reg(y)) => {
                self.registers[x as usize] ^= self.registers[y as usize];
            }

            // VF is written last, so it wins when X is F.
            Instruction::IncRegByReg(Reg(x), Reg(y)) => {
                let (sum, carry) = self.registers[x as usize].overflowing_add(self.registers[y as usize]);
                self.registers[x as usize] = sum;
                self.registers[FLAG] = carry as u8;
            }

            Instruction::DecRegByReg(Reg(x), Reg(y)) => {
                let (diff, borrow) = self.registers[x as usize].overflowing_sub(self.registers[y as usize]);
                self.registers[x as usize] = diff;
                self.registers[FLAG] = !borrow as u8;
            }

            Instruction::BitshiftRight(Reg(x)) => {
                let shifted_out = self.registers[x as usize] & 1;
                self.registers[x as usize] >>= 1;
                self.registers[FLAG] = shifted_out;
            }

            Instruction::SetVxVyMinusVx(Reg(x), Reg(y)) => {
                let (diff, borrow) = self.registers[y as usize].overflowing_sub(self.registers[x as usize]);
                self.registers[x as usize] = diff;
                self.registers[FLAG] = !borrow as u8;
            }

            Instruction::BitshiftLeft(Reg(x)) => {
                let shifted_out = self.registers[x as usize] >> 7;
                self.registers[x as usize] <<= 1;
                self.registers[FLAG] = shifted_out;
            }

            Instruction::IfRegNeqReg(Reg(x), Reg(y)) => {
                if self.registers[x as usize] != self.registers[y as usize] {
                    self.skip();
                }
            }

            Instruction::SetI(Addr(addr)) => {
                self.i = addr;
            }

            Instruction::SetPcToV0PlusAddr(Addr(addr)) => {
                self.jump(self.registers[0] as u16 + addr);
            }

            Instruction::SetVxRand(Reg(x), Const(n)) => {
                self.registers[x as usize] = self.rng.gen::<u8>() & n;
            }

            Instruction::Draw(Reg(x), Reg(y), Const(sprite_height)) => {
                let x_coord = self.registers[x as usize] as usize;
                let y_coord = self.registers[y as usize] as usize;

                // Each row of the sprite is 8 bits
                let sprite = memory.read_wrapping(self.i, sprite_height as usize);
                let collision = display.draw_sprite(x_coord, y_coord, &sprite);

                self.registers[FLAG] = collision as u8;
            }

            Instruction::IfKeyEqVx(Reg(x)) => {
                if keypad.is_pressed(self.registers[x as usize] as usize) {
                    self.skip();
                }
            }

            Instruction::IfKeyNeqVx(Reg(x)) => {
                if !keypad.is_pressed(self.registers[x as usize] as usize) {
                    self.skip();
                }
            }

            Instruction::SetRegToDelayTimer(Reg(x)) => {
                self.registers[x as usize] = self.delay_timer;
            }

            // Stay on this instruction until a key is pressed
            Instruction::SetRegToGetKey(reg) => {
                log::debug!("Waiting for key into V{:X}", reg.0);
                self.program_counter = pc;
                self.key_wait = KeyWait::WaitingForKey(reg);
            }

            Instruction::SetDelayTimerToReg(Reg(x)) => {
                self.delay_timer = self.registers[x as usize];
            }

            Instruction::SetSoundTimerToReg(Reg(x)) => {
                self.sound_timer = self.registers[x as usize];
            }

            Instruction::AddRegToI(Reg(x)) => {
                self.i = self.i.wrapping_add(self.registers[x as usize] as u16) & ADDR_MASK;
            }

            Instruction::SetIToSpriteAddrVx(Reg(x)) => {
                let digit = (self.registers[x as usize] & 0xF) as u16;
                self.i = FONT_START + FONT_GLYPH_SIZE * digit;
            }

            Instruction::SetIToBcdOfReg(Reg(x)) => {
                let value = self.registers[x as usize];
                memory.write_byte(self.i, value / 100);
                memory.write_byte(self.i.wrapping_add(1), (value / 10) % 10);
                memory.write_byte(self.i.wrapping_add(2), value % 10);
            }

            // Dump register values up to Vx
            Instruction::RegDump(Reg(x)) => {
                for reg_no in 0..=x as u16 {
                    memory.write_byte(self.i.wrapping_add(reg_no), self.registers[reg_no as usize]);
                }
            }

            // Load register values up to Vx
            Instruction::RegLoad(Reg(x)) => {
                for reg_no in 0..=x as u16 {
                    self.registers[reg_no as usize] = memory.read_byte(self.i.wrapping_add(reg_no));
                }
            }
        };
        None
    }
}
