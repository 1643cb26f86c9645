use std::path::PathBuf;
use std::time::{Duration, Instant};

use structopt::StructOpt;

use chip8_vm::emulator::{Config, Emulator, TimerMode};

mod crossterm_io;
mod key_manager;
use crossterm::event::{poll, read, Event, KeyCode};
use crossterm_io::CrosstermOutput;
use key_manager::{key_to_keypad, KeyManager};

const TIMER_PERIOD: Duration = Duration::from_micros(1_000_000 / 60);
const KEY_HOLD: Duration = Duration::from_millis(250);

/// The program options.
#[derive(StructOpt)]
struct Opt {
    /// The program to execute
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Instructions per second
    #[structopt(long, default_value = "700")]
    hz: u64,

    /// Timer mode, per-step or decoupled
    #[structopt(long, default_value = "decoupled")]
    timers: TimerMode,

    /// Seed for the random number generator
    #[structopt(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Get configuration and read input file
    let opt = Opt::from_args();
    log::info!("Executing {:?}", &opt.input);
    let program = std::fs::read(&opt.input)?;

    let config = Config {
        timer_mode: opt.timers,
        seed: opt.seed,
    };
    let mut emulator = Emulator::with_config(config);
    emulator.load_program(&program)?;

    let mut output = CrosstermOutput::new()?;
    let mut keys = KeyManager::new(KEY_HOLD);
    let step_period = Duration::from_nanos(1_000_000_000 / opt.hz.max(1));
    let mut next_timer_tick = Instant::now() + TIMER_PERIOD;
    let mut faults_shown = 0;

    // Start execution
    emulator.start();
    while emulator.is_running() {
        let now = Instant::now();

        // Drain terminal events without blocking
        while poll(Duration::from_millis(0))? {
            if let Event::Key(key_event) = read()? {
                match key_event.code {
                    KeyCode::Esc => emulator.stop(),
                    code => match key_to_keypad(code) {
                        Some(key) => {
                            keys.press(key, now);
                            emulator.press(key);
                        }
                        None => log::debug!("Unmapped key {:?}", code),
                    },
                }
            }
        }
        for key in keys.expired(now) {
            emulator.release(key);
        }

        emulator.step();

        if emulator.config().timer_mode == TimerMode::Decoupled && now >= next_timer_tick {
            emulator.tick_timers();
            next_timer_tick += TIMER_PERIOD;
        }

        if emulator.consume_redraw() {
            output.refresh(&emulator.pixel_snapshot())?;
        }
        if emulator.faults().total() != faults_shown {
            faults_shown = emulator.faults().total();
            if let Some(fault) = emulator.faults().last {
                output.status(&format!("{} faults, last: {}", faults_shown, fault))?;
            }
        }

        std::thread::sleep(step_period);
    }

    Ok(())
}
