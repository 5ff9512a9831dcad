//! Periodic timer configuration, and the [`PeriodicTimer`] trait the blink timer implements.
//!
//! The counter ticks at a configured clock rate and raises a terminal-count event each time it
//! reaches its period, then reloads and keeps going.

use crate::error::TimerError;

/// Timer count direction
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CountDir {
    Up = 0,
    Down = 1,
}

/// Timer events that can raise an interrupt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerEvent {
    /// The counter reached its period (counting up) or zero (counting down) and reloaded.
    TerminalCount,
    /// The counter matched `compare_value`. Only raised with `is_compare` set.
    Compare,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Counter settings. The tick rate is set separately, with [`PeriodicTimer::set_frequency`].
pub struct TimerConfig {
    /// Terminal count. The counter visits `0..=period`, so one cycle is `period + 1` ticks.
    pub period: u32,
    /// Compare match value; ignored unless `is_compare` is set.
    pub compare_value: u32,
    pub direction: CountDir,
    pub is_compare: bool,
    /// Reload and keep counting after the terminal count, instead of stopping.
    pub is_continuous: bool,
    /// Counter value at start.
    pub value: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            period: 0,
            compare_value: 0,
            direction: CountDir::Up,
            is_compare: false,
            is_continuous: true,
            value: 0,
        }
    }
}

impl TimerConfig {
    /// A continuous up-counter with the given period.
    pub fn periodic(period: u32) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    /// Ticks between two terminal-count events.
    pub fn ticks_per_cycle(&self) -> u64 {
        self.period as u64 + 1
    }

    /// Seconds between two terminal-count events when ticking at `clock_hz`.
    pub fn interval_secs(&self, clock_hz: u32) -> f32 {
        self.ticks_per_cycle() as f32 / clock_hz as f32
    }
}

/// A hardware counter that raises periodic events.
pub trait PeriodicTimer {
    /// Load period, direction, mode and start value. Doesn't start the counter.
    fn configure(&mut self, cfg: &TimerConfig) -> Result<(), TimerError>;

    /// Set the tick rate, in Hz.
    fn set_frequency(&mut self, hz: u32) -> Result<(), TimerError>;

    /// Enable or disable the interrupt for `event`, at `priority`.
    fn enable_event(&mut self, event: TimerEvent, priority: u8, enable: bool);

    /// Start counting.
    fn start(&mut self);

    /// Clear a pending `event`. Call this at the top of the timer's interrupt handler, or it
    /// retriggers as soon as the handler returns.
    fn clear_event(&mut self, event: TimerEvent);
}

/// Calculate the prescaler that divides `timer_clock_hz` down to `tick_hz`. The result is the
/// value to write to a `PSC`-style register: the clock is divided by `psc + 1`.
///
/// Fails unless `timer_clock_hz` is an exact multiple of `tick_hz`, with a ratio in
/// `1..=65_536`.
pub fn calc_prescaler(timer_clock_hz: u32, tick_hz: u32) -> Result<u16, TimerError> {
    // PSC range: 0 to 65535
    // TIMclk / (PSC + 1) = tick rate
    if tick_hz == 0 || tick_hz > timer_clock_hz || timer_clock_hz % tick_hz != 0 {
        return Err(TimerError::UnreachableFrequency);
    }

    let div = timer_clock_hz / tick_hz;

    u16::try_from(div - 1).map_err(|_| TimerError::UnreachableFrequency)
}
