use std::path::PathBuf;
use std::time::{Duration, Instant};

use structopt::StructOpt;

use chip8_vm::emulator::{Config, Emulator, TimerMode};

const TIMER_PERIOD: Duration = Duration::from_micros(1_000_000 / 60);

/// Run a CHIP-8 program without a screen, then print the final frame.
#[derive(StructOpt)]
struct Opt {
    /// The program to execute
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// How many steps to run before printing the screen
    #[structopt(short, long, default_value = "1000")]
    steps: u64,

    /// Steps per second, 0 runs as fast as possible
    #[structopt(long, default_value = "0")]
    hz: u64,

    /// Timer mode, per-step or decoupled
    #[structopt(long, default_value = "per-step")]
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

    let pause = if opt.hz > 0 {
        Some(Duration::from_nanos(1_000_000_000 / opt.hz))
    } else {
        None
    };

    // Start execution
    emulator.start();
    let mut frames = 0u64;
    let mut next_timer_tick = Instant::now() + TIMER_PERIOD;
    for _ in 0..opt.steps {
        emulator.step();

        if opt.timers == TimerMode::Decoupled && Instant::now() >= next_timer_tick {
            emulator.tick_timers();
            next_timer_tick += TIMER_PERIOD;
        }
        if emulator.consume_redraw() {
            frames += 1;
        }
        if let Some(pause) = pause {
            std::thread::sleep(pause);
        }
    }
    emulator.stop();

    log::info!(
        "Ran {} steps, {} frames, {} faults",
        opt.steps,
        frames,
        emulator.faults().total()
    );
    print!("{}", emulator.pixel_snapshot());

    Ok(())
}
