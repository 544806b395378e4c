#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-interval scheduler that turns elapsed time into tick commands.
//!
//! The cadence only issues ticks while the world reports that the simulation
//! is running. Stopping never interrupts a tick in flight; it prevents the next
//! one from being scheduled.

use std::time::Duration;

use robot_arena_core::{Command, Event};

/// Interval between ticks used by the reference animation driver.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

const DEFAULT_MAX_TICKS_PER_FRAME: u32 = 8;

/// Configuration parameters required to construct the cadence system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    tick_interval: Duration,
    max_ticks_per_frame: u32,
}

impl Config {
    /// Creates a new configuration using the provided interval and per-frame cap.
    #[must_use]
    pub const fn new(tick_interval: Duration, max_ticks_per_frame: u32) -> Self {
        Self {
            tick_interval,
            max_ticks_per_frame,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL, DEFAULT_MAX_TICKS_PER_FRAME)
    }
}

/// Pure system that emits [`Command::Tick`] at a fixed cadence.
#[derive(Debug)]
pub struct Cadence {
    tick_interval: Duration,
    max_ticks_per_frame: u32,
    accumulator: Duration,
    running: bool,
}

impl Cadence {
    /// Creates a paused cadence using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tick_interval: config.tick_interval,
            max_ticks_per_frame: config.max_ticks_per_frame,
            accumulator: Duration::ZERO,
            running: false,
        }
    }

    /// Reports whether ticks are currently being scheduled.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Aligns the cadence with a world whose running flag changed without an
    /// event, such as one that was just loaded.
    pub fn sync(&mut self, running: bool) {
        self.running = running;
        if !running {
            self.accumulator = Duration::ZERO;
        }
    }

    /// Consumes world events and the wall-clock time since the previous call
    /// to emit the ticks that are due.
    ///
    /// At most `max_ticks_per_frame` ticks are emitted per call; time owed
    /// beyond that is discarded so a stalled driver does not burst afterwards.
    pub fn handle(&mut self, events: &[Event], elapsed: Duration, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::RunningChanged { running } => self.sync(*running),
                Event::ArenaCleared => self.accumulator = Duration::ZERO,
                _ => {}
            }
        }

        if !self.running || self.tick_interval.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(elapsed);
        let due = self.resolve_due_ticks();
        for _ in 0..due {
            out.push(Command::Tick);
        }
    }

    fn resolve_due_ticks(&mut self) -> u32 {
        let mut due = 0;
        while self.accumulator >= self.tick_interval {
            if due == self.max_ticks_per_frame {
                self.accumulator = Duration::ZERO;
                break;
            }
            self.accumulator -= self.tick_interval;
            due += 1;
        }
        due
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
