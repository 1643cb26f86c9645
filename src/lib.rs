/*!

A CHIP-8 virtual machine as specified at https://en.wikipedia.org/wiki/CHIP-8.

# Crossterm Frontend

If you want to try the emulator on some programs, there is a ready-to-use implementation
you can run by using `cargo run --release --bin crossterm_frontend -- <program>`.
The keypad is mapped to the left-hand side of the keyboard (`1234`, `qwer`, `asdf`, `zxcv`),
and `Esc` quits.

For a headless run that prints the final screen, use `cargo run --release -- <program> --steps 1000`.

# Library

The main way of running a program is to load it as bytes, then step the emulator.

```rust
use chip8_vm::emulator::Emulator;

let mut emulator = Emulator::new();

// Load a program at address 0x200: set V0 to 5.
emulator.load_program(&[0x60, 0x05]).unwrap();
emulator.step();

assert_eq!(emulator.registers()[0], 5);
assert_eq!(emulator.pc(), 0x202);
```

The emulator never loops or blocks by itself. The host decides how often to call `step`,
feeds key presses in between, and reads the screen back whenever a redraw is pending.

```rust
use chip8_vm::emulator::Emulator;

let mut emulator = Emulator::new();

// Wait for a key into V3, then draw the font glyph for it.
emulator.load_program(&[0xF3, 0x0A, 0xF3, 0x29, 0xD0, 0x05]).unwrap();
emulator.step();
assert!(emulator.is_waiting_for_key());

emulator.press(0x7);
for _ in 0..3 {
    emulator.step();
}

if emulator.consume_redraw() {
    let frame = emulator.pixel_snapshot();
    assert!(frame.is_on(0, 0));
}
```

Loading a program that does not fit is an error, and leaves the emulator freshly reset.

```rust
use chip8_vm::emulator::{Emulator, LoadError};

let mut emulator = Emulator::new();
let result = emulator.load_program(&[0; 4000]);
assert_eq!(result, Err(LoadError::RomTooLarge { size: 4000, max: 3584 }));
```

## Timing

By default every `step` also updates the delay and sound timers once, so the host
should step at roughly 60Hz for accurate timers. To run instructions faster, use
`TimerMode::Decoupled` and call `tick_timers` from a separate 60Hz clock.

```rust
use chip8_vm::emulator::{Config, Emulator, TimerMode};

let config = Config::default().with_timer_mode(TimerMode::Decoupled).with_seed(7);
let mut emulator = Emulator::with_config(config);
emulator.load_program(&[0x12, 0x00]).unwrap();

for _ in 0..12 {
    emulator.step();
}
emulator.tick_timers();
```
*/

pub mod emulator;
