//! LED blink driven by a periodic timer interrupt and consumed by a polling main loop.
//!
//! The timer interrupt only calls [`TimerFlag::signal`]. The main loop calls
//! [`BlinkController::poll`] as fast as it can; each poll that finds the flag set clears it and
//! inverts the LED. One timer event, one toggle, as long as the loop polls faster than the timer
//! fires.

use core::cell::Cell;

use critical_section::Mutex;
use embedded_hal::digital::StatefulOutputPin;

use crate::timer::TimerConfig;

/// Tick rate of the blink timer, in Hz.
pub const BLINK_TIMER_CLOCK_HZ: u32 = 10_000;

/// Blink timer period. `(BLINK_TIMER_PERIOD + 1) / BLINK_TIMER_CLOCK_HZ` is the toggle interval:
/// 1 second.
pub const BLINK_TIMER_PERIOD: u32 = 9_999;

pub const BLINK_TIMER_IRQ_PRIORITY: u8 = 7;

/// Everything needed to start the blink timer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlinkTimerConfig {
    pub counter: TimerConfig,
    /// Tick rate, in Hz.
    pub clock_hz: u32,
    /// Priority of the terminal-count interrupt.
    pub priority: u8,
}

impl Default for BlinkTimerConfig {
    fn default() -> Self {
        Self {
            counter: TimerConfig::periodic(BLINK_TIMER_PERIOD),
            clock_hz: BLINK_TIMER_CLOCK_HZ,
            priority: BLINK_TIMER_IRQ_PRIORITY,
        }
    }
}

impl BlinkTimerConfig {
    /// Seconds between two LED toggles.
    pub fn interval_secs(&self) -> f32 {
        self.counter.interval_secs(self.clock_hz)
    }
}

/// Set by the timer interrupt, cleared by the main loop. No other writers.
pub struct TimerFlag {
    pending: Mutex<Cell<bool>>,
}

impl TimerFlag {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(Cell::new(false)),
        }
    }

    /// Mark a timer event as pending. Call from the timer interrupt.
    pub fn signal(&self) {
        critical_section::with(|cs| self.pending.borrow(cs).set(true));
    }

    /// Read and clear the flag in one step, so an event raised between the two can't be lost.
    pub fn take(&self) -> bool {
        critical_section::with(|cs| self.pending.borrow(cs).replace(false))
    }

    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| self.pending.borrow(cs).get())
    }
}

impl Default for TimerFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the LED pin and consumes [`TimerFlag`] events.
pub struct BlinkController<'a, P> {
    led: P,
    flag: &'a TimerFlag,
    active: bool,
    toggles: u32,
}

impl<'a, P: StatefulOutputPin> BlinkController<'a, P> {
    pub fn new(led: P, flag: &'a TimerFlag) -> Self {
        Self {
            led,
            flag,
            active: true,
            toggles: 0,
        }
    }

    /// One main loop iteration. Returns `true` if the LED was toggled.
    pub fn poll(&mut self) -> bool {
        if !self.flag.take() {
            return false;
        }

        if !self.active {
            return false;
        }

        // Pin errors aren't recoverable here, and the next event toggles again anyway.
        self.led.toggle().ok();
        self.toggles = self.toggles.wrapping_add(1);
        true
    }

    /// Pause or resume blinking. While paused, timer events are still consumed, so resuming
    /// doesn't replay a backlog.
    pub fn set_active(&mut self, active: bool) {
        if self.active != active {
            log_info!("LED blink {}", if active { "resumed" } else { "paused" });
        }
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Toggles applied since construction.
    pub fn toggles(&self) -> u32 {
        self.toggles
    }

    /// Current LED level, as last driven.
    pub fn led_is_on(&mut self) -> bool {
        self.led.is_set_high().unwrap_or(false)
    }

    /// Give the LED pin back.
    pub fn free(self) -> P {
        self.led
    }
}
