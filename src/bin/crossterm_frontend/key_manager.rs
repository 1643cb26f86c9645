use crossterm::event::KeyCode;
use std::time::{Duration, Instant};

/// Terminals only report key presses, never releases.
/// A key counts as held until `timeout` passes without it repeating.
pub struct KeyManager {
    timeout: Duration,
    held_since: [Option<Instant>; 16],
}

impl KeyManager {
    pub fn new(timeout: Duration) -> KeyManager {
        KeyManager {
            timeout,
            held_since: [None; 16],
        }
    }

    /// Record a press (or auto-repeat) of a keypad key.
    pub fn press(&mut self, key: usize, now: Instant) {
        if let Some(slot) = self.held_since.get_mut(key) {
            *slot = Some(now);
        }
    }

    /// Keys whose hold has run out. They are forgotten once returned.
    pub fn expired(&mut self, now: Instant) -> Vec<usize> {
        let timeout = self.timeout;
        let mut released = Vec::new();
        for (key, slot) in self.held_since.iter_mut().enumerate() {
            if let Some(since) = *slot {
                if now.duration_since(since) >= timeout {
                    *slot = None;
                    released.push(key);
                }
            }
        }
        released
    }
}

/// The usual COSMAC VIP layout on the left-hand side of a qwerty keyboard:
///
/// ```text
/// 1 2 3 C      1 2 3 4
/// 4 5 6 D  <-  q w e r
/// 7 8 9 E      a s d f
/// A 0 B F      z x c v
/// ```
pub fn key_to_keypad(key: KeyCode) -> Option<usize> {
    let c = match key {
        KeyCode::Char(c) => c.to_ascii_lowercase(),
        _ => return None,
    };
    let index = match c {
        'x' => 0x0,
        '1' => 0x1,
        '2' => 0x2,
        '3' => 0x3,
        'q' => 0x4,
        'w' => 0x5,
        'e' => 0x6,
        'a' => 0x7,
        's' => 0x8,
        'd' => 0x9,
        'z' => 0xA,
        'c' => 0xB,
        '4' => 0xC,
        'r' => 0xD,
        'f' => 0xE,
        'v' => 0xF,
        _ => return None,
    };
    Some(index)
}
