pub const NUM_KEYS: usize = 16;

/// The 16-key hexadecimal keypad.
/// Only the current state of each key is kept, there is no event queue.
pub struct Keypad {
    keys: [bool; NUM_KEYS],
}

impl Keypad {
    pub fn new() -> Keypad {
        Keypad {
            keys: [false; NUM_KEYS],
        }
    }

    pub fn reset(&mut self) {
        self.keys = [false; NUM_KEYS];
    }

    /// Set the state of a key, ignoring keys outside 0..=0xF.
    /// Returns true if the key went from released to pressed.
    pub fn set_key(&mut self, key: usize, pressed: bool) -> bool {
        match self.keys.get_mut(key) {
            Some(state) => {
                let was_pressed = std::mem::replace(state, pressed);
                pressed && !was_pressed
            }
            None => {
                log::debug!("Ignoring key {} outside the keypad", key);
                false
            }
        }
    }

    pub fn is_pressed(&self, key: usize) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }
}

impl Default for Keypad {
    fn default() -> Self {
        Self::new()
    }
}
