use crate::threads::{Mutex, INTERRUPT_REGISTRY, SCHEDULER};

/// Number of timer ticks since the OS booted.
pub fn ticks() -> usize {
    TIMER.lock().ticks
}

/// Suspends the calling thread until at least `ticks` timer ticks have
/// elapsed. Busy-waits by yielding the CPU rather than blocking outright, so
/// it may be called before the scheduler itself is capable of waking a
/// sleeping thread back up.
pub fn sleep(ticks: usize) {
    let start = self::ticks();
    while self::ticks() - start < ticks {
        SCHEDULER.lock().yield_current_thread();
    }
}

use super::pit::{Channel, Mode, PIT};

/// Number of timer interrupts per second.
pub const FREQUENCY: usize = 100;

/// Sets up the timer to interrupt [`FREQUENCY`] times per second, and
/// registers the corresponding interrupt.
pub fn init() {
    PIT.lock()
        .configure(Channel::OUT0, Mode::RateGenerator, FREQUENCY);

    INTERRUPT_REGISTRY
        .lock()
        .register(0x20, interrupt, "8254 Timer");
}

/// Manages the ticks and calibration.
pub struct Timer {
    /// Number of timer ticks since OS booted.
    ticks: usize,
}

impl Timer {
    /// Creates a new [`Timer`].
    pub const fn new() -> Timer {
        Self { ticks: 0 }
    }

    /// Timer tick.
    pub fn tick(&mut self) {
        self.ticks += 1;
    }
}

/// Global timer.
pub static TIMER: Mutex<Timer> = Mutex::new(Timer::new());

/// Timer interrupt handler.
fn interrupt(_frame: x86_64::structures::idt::InterruptStackFrame) {
    TIMER.lock().tick();
    SCHEDULER.lock().tick();
}
