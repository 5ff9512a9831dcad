//! Pin configuration types, the logical line map, and the [`Platform`] trait that the board
//! binding implements.
//!
//! Reading and writing configured pins goes through the `embedded-hal` digital traits; this
//! module only covers what those traits don't: direction, drive strength, initial level, and
//! edge interrupt setup.

use embedded_hal::digital::{InputPin, StatefulOutputPin};

use crate::{error::GpioError, timer::PeriodicTimer, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Pin direction.
pub enum Direction {
    Input,
    Output,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Drive strength. `None` is a high-impedance input; `Strong` is push-pull.
pub enum Drive {
    None,
    Strong,
    OpenDrain,
    PullUp,
    PullDown,
}

impl Drive {
    /// Whether this drive mode can be used with a given direction. A push-pull or open-drain
    /// driver on an input makes no sense, and an output always has a driver.
    pub fn allows(&self, direction: Direction) -> bool {
        match (direction, self) {
            (Direction::Input, Self::None | Self::PullUp | Self::PullDown) => true,
            (Direction::Output, Self::Strong | Self::OpenDrain) => true,
            _ => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// A pulse edge, passed to edge handlers.
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    /// The edge that leaves a line at `level`. Edge interrupt controllers often only report
    /// that *an* edge happened; read the pin in the handler and pass the level here.
    pub fn from_level(level: bool) -> Self {
        if level { Self::Rising } else { Self::Falling }
    }

    pub fn is_rising(&self) -> bool {
        matches!(self, Self::Rising)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Which edges raise an interrupt.
pub enum Trigger {
    Rising,
    Falling,
    Both,
}

impl Trigger {
    pub fn accepts(&self, edge: Edge) -> bool {
        matches!(
            (self, edge),
            (Self::Both, _) | (Self::Rising, Edge::Rising) | (Self::Falling, Edge::Falling)
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// One of the six signals carried on each header.
pub enum Signal {
    Mosi,
    Miso,
    Clk,
    Cs,
    Irq,
    Reset,
}

impl Signal {
    pub const ALL: [Signal; 6] = [
        Self::Mosi,
        Self::Miso,
        Self::Clk,
        Self::Cs,
        Self::Irq,
        Self::Reset,
    ];

    fn index(&self) -> usize {
        match self {
            Self::Mosi => 0,
            Self::Miso => 1,
            Self::Clk => 2,
            Self::Cs => 3,
            Self::Irq => 4,
            Self::Reset => 5,
        }
    }
}

/// Number of logical lines: the LED plus six signals on each of the two headers.
pub const LINE_COUNT: usize = 13;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// A logical GPIO line. The board binding maps each one to a physical pin.
pub enum Line {
    /// Status LED.
    Led,
    /// Radar-facing header. The radar is the SPI peripheral on this bus.
    Internal(Signal),
    /// Passthrough header. An external SPI controller drives this bus.
    External(Signal),
}

impl Line {
    /// Dense index in `0..LINE_COUNT`, for tables keyed by line.
    pub fn index(&self) -> usize {
        match self {
            Self::Led => 0,
            Self::Internal(s) => 1 + s.index(),
            Self::External(s) => 7 + s.index(),
        }
    }

    /// Short console name, eg `RSPI_CLK` or `EXT_SPI_CS`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Led => "USER_LED",
            Self::Internal(Signal::Mosi) => "RSPI_MOSI",
            Self::Internal(Signal::Miso) => "RSPI_MISO",
            Self::Internal(Signal::Clk) => "RSPI_CLK",
            Self::Internal(Signal::Cs) => "RSPI_CS",
            Self::Internal(Signal::Irq) => "RSPI_IRQ",
            Self::Internal(Signal::Reset) => "RXRES_L",
            Self::External(Signal::Mosi) => "EXT_SPI_MOSI",
            Self::External(Signal::Miso) => "EXT_SPI_MISO",
            Self::External(Signal::Clk) => "EXT_SPI_CLK",
            Self::External(Signal::Cs) => "EXT_SPI_CS",
            Self::External(Signal::Irq) => "EXT_SPI_IRQ",
            Self::External(Signal::Reset) => "EXT_RXRES_L",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Everything needed to bring a pin up: direction, drive strength and the level it starts at.
pub struct PinConfig {
    pub direction: Direction,
    pub drive: Drive,
    /// Initial output level. For inputs, the level the line is expected to idle at.
    pub init_state: bool,
}

impl PinConfig {
    /// A push-pull output starting at `init_state`.
    pub const fn output(init_state: bool) -> Self {
        Self {
            direction: Direction::Output,
            drive: Drive::Strong,
            init_state,
        }
    }

    /// A high-impedance input idling at `init_state`.
    pub const fn input(init_state: bool) -> Self {
        Self {
            direction: Direction::Input,
            drive: Drive::None,
            init_state,
        }
    }

    /// The same signal seen from the other end of the bridge: outputs become high-impedance
    /// inputs and inputs become push-pull outputs. The initial level is kept.
    pub const fn inverted(&self) -> Self {
        match self.direction {
            Direction::Output => Self::input(self.init_state),
            Direction::Input => Self::output(self.init_state),
        }
    }
}

/// The board binding: brings up peripherals and hands out configured pins and the blink timer.
///
/// Implemented by the firmware for real hardware and by [`crate::mock::SimPlatform`] for tests.
pub trait Platform {
    /// A configured pin. Every line uses the same type so pins can be stored side by side;
    /// input-only lines just never have their output driven by anything but the relay.
    type Pin: InputPin + StatefulOutputPin;

    /// The periodic timer used for the blink.
    type Timer: PeriodicTimer;

    /// Clocks, debug console and anything else that must be running before pins are touched.
    fn init_board(&mut self) -> Result<()>;

    /// Configure `line` and return a handle to it.
    fn init_pin(
        &mut self,
        line: Line,
        config: PinConfig,
    ) -> core::result::Result<Self::Pin, GpioError>;

    /// Claim the hardware timer used for the blink.
    fn init_timer(&mut self) -> Result<Self::Timer>;

    /// Route edges on `line` to the interrupt controller, at `priority`. The handler itself
    /// lives in [`crate::dispatch::InterruptTable`].
    fn enable_edge_interrupt(
        &mut self,
        line: Line,
        trigger: Trigger,
        priority: u8,
    ) -> core::result::Result<(), GpioError>;
}
