//! The emulator, made up of memory, a display, a keypad and a CPU.

pub mod config;
pub mod cpu;
pub mod display;
pub mod error;
pub mod input;
pub mod instruction;
pub mod memory;
pub mod opcode;

pub use config::{Config, TimerMode};
pub use cpu::KeyWait;
pub use display::{PixelBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use error::{Fault, FaultLog, LoadError};

use cpu::{Cpu, NUM_REGISTERS};
use display::Display;
use input::Keypad;
use memory::Memory;

use rand::rngs::StdRng;
use rand::SeedableRng;

type FaultHandler = Box<dyn FnMut(Fault)>;

/// A complete CHIP-8 machine.
///
/// The emulator never drives itself: the host calls [`Emulator::step`] at
/// whatever pace it likes, and feeds key events in between with
/// [`Emulator::press`] and [`Emulator::release`]. Waiting for a key is just a
/// state, so nothing here ever blocks.
pub struct Emulator {
    cpu: Cpu,
    memory: Memory,
    display: Display,
    keypad: Keypad,
    config: Config,
    faults: FaultLog,
    on_fault: Option<FaultHandler>,
    running: bool,
}

impl Emulator {
    /// Create a new emulator with default settings
    pub fn new() -> Emulator {
        Emulator::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Emulator {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Emulator {
            cpu: Cpu::new(rng),
            memory: Memory::new(),
            display: Display::new(),
            keypad: Keypad::new(),
            config,
            faults: FaultLog::default(),
            on_fault: None,
            running: false,
        }
    }

    /// Put every component back to its power-on state.
    /// With a fixed seed the random source restarts too, so runs replay exactly.
    pub fn reset(&mut self) {
        log::debug!("Resetting emulator");
        self.cpu.reset();
        if let Some(seed) = self.config.seed {
            self.cpu.reseed(seed);
        }
        self.memory.reset();
        self.display.clear();
        self.keypad.reset();
        self.faults = FaultLog::default();
        self.running = false;
    }

    /// Reset, then copy a program into memory at 0x200.
    /// On error the emulator stays freshly reset.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadError> {
        self.reset();
        self.memory.load_program(program)?;
        log::debug!("Loaded {} byte program", program.len());
        Ok(())
    }

    /// Perform a single step: execute one instruction unless waiting for a
    /// key, then update the timers once.
    pub fn step(&mut self) {
        if !self.cpu.is_waiting_for_key() {
            let fault = self
                .cpu
                .execute_cycle(&mut self.memory, &mut self.display, &self.keypad);
            if let Some(fault) = fault {
                self.record_fault(fault);
            }
        }
        if self.config.timer_mode == TimerMode::PerStep {
            self.cpu.update_timers();
        }
    }

    /// Update the timers. Meant to be called at 60Hz with [`TimerMode::Decoupled`].
    pub fn tick_timers(&mut self) {
        self.cpu.update_timers();
    }

    fn record_fault(&mut self, fault: Fault) {
        log::warn!("{}", fault);
        self.faults.record(fault);
        if let Some(handler) = self.on_fault.as_mut() {
            handler(fault);
        }
    }

    /// Call `handler` with every fault as it happens.
    pub fn on_fault<F: FnMut(Fault) + 'static>(&mut self, handler: F) {
        self.on_fault = Some(Box::new(handler));
    }

    pub fn faults(&self) -> &FaultLog {
        &self.faults
    }

    pub fn press(&mut self, key: usize) {
        if self.keypad.set_key(key, true) {
            self.cpu.key_pressed(key as u8);
        }
    }

    pub fn release(&mut self, key: usize) {
        self.keypad.set_key(key, false);
    }

    pub fn is_pressed(&self, key: usize) -> bool {
        self.keypad.is_pressed(key)
    }

    pub fn needs_redraw(&self) -> bool {
        self.display.needs_redraw()
    }

    /// Clear the redraw flag, returning whether a new frame was pending.
    pub fn consume_redraw(&mut self) -> bool {
        self.display.consume_redraw()
    }

    pub fn pixel_snapshot(&self) -> PixelBuffer {
        self.display.pixel_snapshot()
    }

    pub fn display_width(&self) -> usize {
        SCREEN_WIDTH
    }

    pub fn display_height(&self) -> usize {
        SCREEN_HEIGHT
    }

    /// The host should be beeping while this is true.
    pub fn sound_active(&self) -> bool {
        self.cpu.sound_timer() > 0
    }

    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = Some(seed);
        self.cpu.reseed(seed);
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registers(&self) -> &[u8; NUM_REGISTERS] {
        self.cpu.registers()
    }

    pub fn pc(&self) -> u16 {
        self.cpu.program_counter()
    }

    pub fn index(&self) -> u16 {
        self.cpu.index()
    }

    pub fn delay_timer(&self) -> u8 {
        self.cpu.delay_timer()
    }

    pub fn sound_timer(&self) -> u8 {
        self.cpu.sound_timer()
    }

    pub fn stack_depth(&self) -> usize {
        self.cpu.stack_depth()
    }

    pub fn key_wait(&self) -> KeyWait {
        self.cpu.key_wait()
    }

    pub fn is_waiting_for_key(&self) -> bool {
        self.cpu.is_waiting_for_key()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn seeded() -> Emulator {
        Emulator::with_config(Config::default().with_seed(42))
    }

    #[test]
    fn load_then_step() {
        let mut emulator = seeded();
        emulator.load_program(&[0x60, 0x05]).unwrap();
        emulator.step();
        assert_eq!(emulator.registers()[0], 5);
        assert_eq!(emulator.pc(), 0x202);
    }

    #[test]
    fn draw_program_draws_itself() {
        let program = [0xA2, 0x00, 0xD0, 0x05];
        let mut emulator = seeded();
        emulator.load_program(&program).unwrap();
        emulator.consume_redraw();
        emulator.step();
        emulator.step();
        assert!(emulator.needs_redraw());

        let snapshot = emulator.pixel_snapshot();
        let rows = [0xA2, 0x00, 0xD0, 0x05, 0x00];
        for (y, row) in rows.iter().enumerate() {
            for x in 0..8 {
                assert_eq!(snapshot.is_on(x, y), (row >> (7 - x)) & 1 == 1, "pixel ({}, {})", x, y);
            }
            assert!((8..SCREEN_WIDTH).all(|x| !snapshot.is_on(x, y)));
        }
        assert_eq!(emulator.registers()[0xF], 0);
    }

    #[test]
    fn too_large_program_leaves_fresh_state() {
        let mut emulator = seeded();
        emulator.load_program(&[0x60, 0x05]).unwrap();
        emulator.step();

        let result = emulator.load_program(&vec![0x12; 3585]);
        assert_eq!(result, Err(LoadError::RomTooLarge { size: 3585, max: 3584 }));
        assert_eq!(emulator.memory().as_slice(), Memory::new().as_slice());
        assert_eq!(emulator.registers(), &[0; NUM_REGISTERS]);
        assert_eq!(emulator.pc(), 0x200);
    }

    #[test]
    fn faults_are_counted_and_reported() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        let mut emulator = seeded();
        emulator.on_fault(move |fault| sink.borrow_mut().push(fault));
        emulator.load_program(&[0x00, 0xEE, 0xFF, 0xFF, 0x60, 0x01]).unwrap();
        emulator.step();
        emulator.step();
        emulator.step();

        assert_eq!(emulator.faults().stack_underflows, 1);
        assert_eq!(emulator.faults().unknown_opcodes, 1);
        assert_eq!(
            *seen.borrow(),
            vec![
                Fault::StackUnderflow { pc: 0x200 },
                Fault::UnknownOpcode { pc: 0x202, opcode: 0xFFFF },
            ]
        );
        // Still running after the faults
        assert_eq!(emulator.registers()[0], 1);
    }

    #[test]
    fn wait_for_key_resumes_on_press() {
        let mut emulator = seeded();
        emulator.load_program(&[0xF3, 0x0A, 0x60, 0x01]).unwrap();
        emulator.step();
        assert!(emulator.is_waiting_for_key());
        for _ in 0..5 {
            emulator.step();
            assert_eq!(emulator.pc(), 0x200);
        }

        emulator.press(0xB);
        emulator.step();
        assert_eq!(emulator.registers()[3], 0xB);
        assert_eq!(emulator.pc(), 0x202);
        assert!(!emulator.is_waiting_for_key());
    }

    #[test]
    fn held_key_does_not_resolve_wait() {
        let mut emulator = seeded();
        emulator.load_program(&[0xF3, 0x0A]).unwrap();
        emulator.press(4);
        emulator.step();
        emulator.press(4);
        emulator.step();
        assert!(emulator.is_waiting_for_key());

        emulator.release(4);
        emulator.press(4);
        emulator.step();
        assert_eq!(emulator.registers()[3], 4);
    }

    #[test]
    fn timers_tick_while_waiting() {
        // V0 = 3, DT = V0, wait for key
        let mut emulator = seeded();
        emulator.load_program(&[0x60, 0x03, 0xF0, 0x15, 0xF1, 0x0A]).unwrap();
        emulator.step();
        emulator.step();
        assert_eq!(emulator.delay_timer(), 2);
        emulator.step();
        emulator.step();
        emulator.step();
        assert_eq!(emulator.delay_timer(), 0);
        emulator.step();
        assert_eq!(emulator.delay_timer(), 0);
    }

    #[test]
    fn decoupled_timers_only_tick_on_request() {
        let config = Config::default().with_seed(1).with_timer_mode(TimerMode::Decoupled);
        let mut emulator = Emulator::with_config(config);
        emulator.load_program(&[0x60, 0x03, 0xF0, 0x18, 0x12, 0x04]).unwrap();
        for _ in 0..10 {
            emulator.step();
        }
        assert_eq!(emulator.sound_timer(), 3);
        assert!(emulator.sound_active());
        emulator.tick_timers();
        assert_eq!(emulator.sound_timer(), 2);
    }

    #[test]
    fn reset_clears_everything() {
        let mut emulator = seeded();
        emulator.load_program(&[0xA0, 0x50, 0xD0, 0x05]).unwrap();
        emulator.start();
        emulator.press(1);
        emulator.step();
        emulator.step();
        emulator.reset();

        assert!(!emulator.is_running());
        assert!(!emulator.is_pressed(1));
        assert_eq!(emulator.index(), 0);
        assert_eq!(emulator.pixel_snapshot(), Display::new().pixel_snapshot());
        assert_eq!(emulator.memory().read_byte(0x200), 0);
        assert_eq!(emulator.memory().read_byte(0x050), 0xF0);
    }

    #[test]
    fn seeded_runs_replay_after_reset() {
        let program = [0xC0, 0xFF, 0xC1, 0xFF];
        let mut emulator = seeded();
        emulator.load_program(&program).unwrap();
        emulator.step();
        emulator.step();
        let first = *emulator.registers();

        emulator.load_program(&program).unwrap();
        emulator.step();
        emulator.step();
        assert_eq!(first, *emulator.registers());
    }

    #[test]
    fn reseed_replays_random_sequence() {
        let program = [0xC0, 0xFF, 0xC1, 0xFF];
        let mut emulator = Emulator::new();
        emulator.load_program(&program).unwrap();
        emulator.reseed(9);
        assert_eq!(emulator.config().seed, Some(9));
        emulator.step();
        emulator.step();
        let first = *emulator.registers();

        // Reloading reseeds from the stored seed
        emulator.load_program(&program).unwrap();
        emulator.step();
        emulator.step();
        assert_eq!(first, *emulator.registers());

        let mut configured = Emulator::with_config(Config::default().with_seed(9));
        configured.load_program(&program).unwrap();
        configured.step();
        configured.step();
        assert_eq!(first, *configured.registers());
    }

    #[test]
    fn instances_are_independent() {
        let mut a = seeded();
        let mut b = seeded();
        a.load_program(&[0x60, 0x01]).unwrap();
        b.load_program(&[0x60, 0x02]).unwrap();
        a.step();
        b.step();
        assert_eq!(a.registers()[0], 1);
        assert_eq!(b.registers()[0], 2);
    }

    #[test]
    fn fixed_display_size() {
        let emulator = seeded();
        assert_eq!(emulator.display_width(), 64);
        assert_eq!(emulator.display_height(), 32);
    }
}
