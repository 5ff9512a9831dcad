//! Simulated board for host tests: GPIO lines, pins, a tick-accurate timer and a [`Platform`]
//! that can be told to fail.
//!
//! Everything borrows from a [`SimBoard`] so tests can hand pins to the code under test and
//! still drive inputs and inspect outputs from the outside.

use core::{cell::Cell, convert::Infallible};

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};

use crate::{
    Error, Result,
    error::{GpioError, TimerError},
    gpio::{LINE_COUNT, Line, PinConfig, Platform, Trigger},
    timer::{CountDir, PeriodicTimer, TimerConfig, TimerEvent},
};

/// One simulated wire.
#[derive(Debug)]
pub struct SimLine {
    level: Cell<bool>,
    writes: Cell<u32>,
    stamp: Cell<u32>,
    config: Cell<Option<PinConfig>>,
}

impl SimLine {
    pub fn new(level: bool) -> Self {
        Self {
            level: Cell::new(level),
            writes: Cell::new(0),
            stamp: Cell::new(0),
            config: Cell::new(None),
        }
    }

    pub fn level(&self) -> bool {
        self.level.get()
    }

    /// Set the level from outside, as another device on the wire would. Not counted as a write.
    pub fn drive(&self, level: bool) {
        self.level.set(level);
    }

    /// Number of times a pin handle drove this line.
    pub fn writes(&self) -> u32 {
        self.writes.get()
    }

    /// Board-wide sequence number of the most recent write to this line, if it was written
    /// through a handle from [`SimBoard`] or [`SimPlatform`].
    pub fn last_write(&self) -> Option<u32> {
        match self.stamp.get() {
            0 => None,
            n => Some(n),
        }
    }

    /// Configuration applied by [`SimPlatform::init_pin`], if any.
    pub fn config(&self) -> Option<PinConfig> {
        self.config.get()
    }
}

/// Pin handle onto a [`SimLine`]. Reads and writes are never refused, whatever the direction.
///
/// Handles that come from a [`SimBoard`] share its write counter, so tests can tell in which
/// order lines were written.
#[derive(Debug)]
pub struct SimPin<'a> {
    line: &'a SimLine,
    sequence: Option<&'a Cell<u32>>,
}

impl<'a> SimPin<'a> {
    pub fn new(line: &'a SimLine) -> Self {
        Self {
            line,
            sequence: None,
        }
    }

    fn write(&mut self, level: bool) {
        self.line.level.set(level);
        self.line.writes.set(self.line.writes.get() + 1);
        if let Some(seq) = self.sequence {
            seq.set(seq.get() + 1);
            self.line.stamp.set(seq.get());
        }
    }
}

impl ErrorType for SimPin<'_> {
    type Error = Infallible;
}

impl InputPin for SimPin<'_> {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.line.level())
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(!self.line.level())
    }
}

impl OutputPin for SimPin<'_> {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

impl StatefulOutputPin for SimPin<'_> {
    fn is_set_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.line.level())
    }

    fn is_set_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(!self.line.level())
    }
}

/// All thirteen lines of the board.
#[derive(Debug)]
pub struct SimBoard {
    lines: [SimLine; LINE_COUNT],
    sequence: Cell<u32>,
}

impl SimBoard {
    pub fn new() -> Self {
        Self {
            lines: core::array::from_fn(|_| SimLine::new(false)),
            sequence: Cell::new(0),
        }
    }

    pub fn line(&self, line: Line) -> &SimLine {
        &self.lines[line.index()]
    }

    /// A pin handle on `line`, without going through configuration.
    pub fn pin(&self, line: Line) -> SimPin<'_> {
        SimPin {
            line: self.line(line),
            sequence: Some(&self.sequence),
        }
    }

    pub fn level(&self, line: Line) -> bool {
        self.line(line).level()
    }

    pub fn drive(&self, line: Line, level: bool) {
        self.line(line).drive(level)
    }

    pub fn writes(&self, line: Line) -> u32 {
        self.line(line).writes()
    }

    pub fn config(&self, line: Line) -> Option<PinConfig> {
        self.line(line).config()
    }

    /// See [`SimLine::last_write`].
    pub fn last_write(&self, line: Line) -> Option<u32> {
        self.line(line).last_write()
    }

    /// Writes made through board-issued pin handles, across all lines.
    pub fn write_count(&self) -> u32 {
        self.sequence.get()
    }
}

impl Default for SimBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter that advances one tick per [`SimTimer::tick`] call.
#[derive(Debug, Default)]
pub struct SimTimer {
    config: Option<TimerConfig>,
    hz: u32,
    counter: u32,
    running: bool,
    event_enabled: bool,
    priority: u8,
    cleared: u32,
}

impl SimTimer {
    /// Advance one tick. Returns `true` if a terminal-count interrupt fired.
    pub fn tick(&mut self) -> bool {
        let Some(cfg) = self.config else {
            return false;
        };
        if !self.running {
            return false;
        }

        let terminal = match cfg.direction {
            CountDir::Up => {
                if self.counter >= cfg.period {
                    self.counter = 0;
                    true
                } else {
                    self.counter += 1;
                    false
                }
            }
            CountDir::Down => {
                if self.counter == 0 {
                    self.counter = cfg.period;
                    true
                } else {
                    self.counter -= 1;
                    false
                }
            }
        };

        if terminal && !cfg.is_continuous {
            self.running = false;
        }

        terminal && self.event_enabled
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frequency(&self) -> u32 {
        self.hz
    }

    pub fn config(&self) -> Option<TimerConfig> {
        self.config
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// Number of times the terminal-count event was cleared.
    pub fn cleared(&self) -> u32 {
        self.cleared
    }
}

impl PeriodicTimer for SimTimer {
    fn configure(&mut self, cfg: &TimerConfig) -> core::result::Result<(), TimerError> {
        if cfg.period == 0 || cfg.value > cfg.period {
            return Err(TimerError::PeriodOutOfRange);
        }
        self.config = Some(*cfg);
        self.counter = cfg.value;
        Ok(())
    }

    fn set_frequency(&mut self, hz: u32) -> core::result::Result<(), TimerError> {
        if hz == 0 {
            return Err(TimerError::UnreachableFrequency);
        }
        self.hz = hz;
        Ok(())
    }

    fn enable_event(&mut self, event: TimerEvent, priority: u8, enable: bool) {
        if event == TimerEvent::TerminalCount {
            self.event_enabled = enable;
            self.priority = priority;
        }
    }

    fn start(&mut self) {
        self.running = true;
    }

    fn clear_event(&mut self, event: TimerEvent) {
        if event == TimerEvent::TerminalCount {
            self.cleared += 1;
        }
    }
}

/// [`Platform`] over a [`SimBoard`].
#[derive(Debug)]
pub struct SimPlatform<'a> {
    board: &'a SimBoard,
    claimed: [bool; LINE_COUNT],
    edge_interrupts: [Option<(Trigger, u8)>; LINE_COUNT],
    fail_board: bool,
    fail_pin: Option<Line>,
    fail_timer: bool,
    timer_claimed: bool,
}

impl<'a> SimPlatform<'a> {
    pub fn new(board: &'a SimBoard) -> Self {
        Self {
            board,
            claimed: [false; LINE_COUNT],
            edge_interrupts: [None; LINE_COUNT],
            fail_board: false,
            fail_pin: None,
            fail_timer: false,
            timer_claimed: false,
        }
    }

    /// Make [`Platform::init_board`] fail.
    pub fn fail_board(mut self) -> Self {
        self.fail_board = true;
        self
    }

    /// Make [`Platform::init_pin`] fail for `line`.
    pub fn fail_pin(mut self, line: Line) -> Self {
        self.fail_pin = Some(line);
        self
    }

    /// Make [`Platform::init_timer`] fail.
    pub fn fail_timer(mut self) -> Self {
        self.fail_timer = true;
        self
    }

    /// Trigger and priority of the edge interrupt enabled on `line`, if any.
    pub fn edge_interrupt(&self, line: Line) -> Option<(Trigger, u8)> {
        self.edge_interrupts[line.index()]
    }

    /// Number of lines with an edge interrupt enabled.
    pub fn edge_interrupt_count(&self) -> usize {
        self.edge_interrupts.iter().filter(|e| e.is_some()).count()
    }

    /// Number of lines configured so far.
    pub fn pins_claimed(&self) -> usize {
        self.claimed.iter().filter(|c| **c).count()
    }
}

impl<'a> Platform for SimPlatform<'a> {
    type Pin = SimPin<'a>;
    type Timer = SimTimer;

    fn init_board(&mut self) -> Result<()> {
        if self.fail_board {
            return Err(Error::BoardInit);
        }
        Ok(())
    }

    fn init_pin(
        &mut self,
        line: Line,
        config: PinConfig,
    ) -> core::result::Result<Self::Pin, GpioError> {
        if self.fail_pin == Some(line) {
            return Err(GpioError::Hardware);
        }
        if !config.drive.allows(config.direction) {
            return Err(GpioError::InvalidDrive);
        }
        if self.claimed[line.index()] {
            return Err(GpioError::InUse);
        }
        self.claimed[line.index()] = true;

        let board: &'a SimBoard = self.board;
        let sim = board.line(line);
        sim.config.set(Some(config));
        sim.level.set(config.init_state);

        Ok(SimPin {
            line: sim,
            sequence: Some(&board.sequence),
        })
    }

    fn init_timer(&mut self) -> Result<Self::Timer> {
        if self.fail_timer || self.timer_claimed {
            return Err(TimerError::Unavailable.into());
        }
        self.timer_claimed = true;
        Ok(SimTimer::default())
    }

    fn enable_edge_interrupt(
        &mut self,
        line: Line,
        trigger: Trigger,
        priority: u8,
    ) -> core::result::Result<(), GpioError> {
        if !self.claimed[line.index()] {
            return Err(GpioError::Unmapped);
        }
        self.edge_interrupts[line.index()] = Some((trigger, priority));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::Signal;

    #[test]
    fn pin_reads_what_was_driven() {
        let line = SimLine::new(false);
        let mut pin = SimPin::new(&line);

        line.drive(true);
        assert!(pin.is_high().unwrap());
        assert_eq!(line.writes(), 0);

        pin.set_low().unwrap();
        assert!(!line.level());
        pin.toggle().unwrap();
        assert!(pin.is_set_high().unwrap());
        assert_eq!(line.writes(), 2);
    }

    #[test]
    fn platform_applies_config_and_initial_level() {
        let board = SimBoard::new();
        let mut platform = SimPlatform::new(&board);
        let cs = Line::Internal(Signal::Cs);

        platform.init_pin(cs, PinConfig::output(true)).unwrap();
        assert_eq!(board.config(cs), Some(PinConfig::output(true)));
        assert!(board.level(cs));
        assert_eq!(platform.pins_claimed(), 1);

        assert_eq!(
            platform.init_pin(cs, PinConfig::output(true)).err(),
            Some(GpioError::InUse)
        );
    }

    #[test]
    fn board_pins_stamp_writes_in_order() {
        let board = SimBoard::new();
        let mut platform = SimPlatform::new(&board);
        let led = Line::Led;
        let mosi = Line::Internal(Signal::Mosi);

        let mut led_pin = platform.init_pin(led, PinConfig::output(false)).unwrap();
        let mut mosi_pin = board.pin(mosi);
        // Initial levels and outside drives aren't writes.
        board.drive(mosi, true);
        assert_eq!(board.write_count(), 0);
        assert_eq!(board.last_write(mosi), None);

        mosi_pin.set_low().unwrap();
        led_pin.set_high().unwrap();
        mosi_pin.set_high().unwrap();

        assert_eq!(board.write_count(), 3);
        assert_eq!(board.last_write(led), Some(2));
        assert_eq!(board.last_write(mosi), Some(3));
        assert_eq!(board.writes(mosi), 2);

        // Bare handles aren't sequenced.
        let line = SimLine::new(false);
        SimPin::new(&line).set_high().unwrap();
        assert_eq!(line.last_write(), None);
        assert_eq!(line.writes(), 1);
    }

    #[test]
    fn timer_fires_once_per_period() {
        let mut timer = SimTimer::default();
        timer.configure(&TimerConfig::periodic(4)).unwrap();
        timer.set_frequency(1_000).unwrap();
        timer.enable_event(TimerEvent::TerminalCount, 7, true);

        // Not started yet.
        assert!(!timer.tick());
        timer.start();

        let fired = (0..50).filter(|_| timer.tick()).count();
        assert_eq!(fired, 10);
    }

    #[test]
    fn one_shot_timer_stops() {
        let mut timer = SimTimer::default();
        let cfg = TimerConfig {
            is_continuous: false,
            ..TimerConfig::periodic(2)
        };
        timer.configure(&cfg).unwrap();
        timer.enable_event(TimerEvent::TerminalCount, 0, true);
        timer.start();

        let fired = (0..20).filter(|_| timer.tick()).count();
        assert_eq!(fired, 1);
        assert!(!timer.is_running());
    }

    #[test]
    fn down_counter_fires_at_zero() {
        let mut timer = SimTimer::default();
        let cfg = TimerConfig {
            direction: CountDir::Down,
            value: 3,
            ..TimerConfig::periodic(3)
        };
        timer.configure(&cfg).unwrap();
        timer.enable_event(TimerEvent::TerminalCount, 0, true);
        timer.start();

        // 3, 2, 1, then zero -> event.
        assert!(!timer.tick());
        assert!(!timer.tick());
        assert!(!timer.tick());
        assert!(timer.tick());
    }
}
