use std::str::FromStr;

/// How the delay and sound timers are driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Every `step()` updates the timers once.
    PerStep,
    /// `step()` leaves the timers alone, the host calls `tick_timers()` at 60Hz.
    Decoupled,
}

impl Default for TimerMode {
    fn default() -> Self {
        TimerMode::PerStep
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "per-step" | "perstep" | "step" => Ok(TimerMode::PerStep),
            "decoupled" | "60hz" => Ok(TimerMode::Decoupled),
            other => Err(format!("unknown timer mode '{}', expected per-step or decoupled", other)),
        }
    }
}

/// Emulator settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub timer_mode: TimerMode,
    /// Seed for the random number generator, taken from the OS when `None`.
    pub seed: Option<u64>,
}

impl Config {
    pub fn with_seed(mut self, seed: u64) -> Config {
        self.seed = Some(seed);
        self
    }

    pub fn with_timer_mode(mut self, timer_mode: TimerMode) -> Config {
        self.timer_mode = timer_mode;
        self
    }
}
