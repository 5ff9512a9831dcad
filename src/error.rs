//! Common error definitions.
//!
//! Every error here is an initialization failure. None of them are retried: the firmware
//! reports the error and halts.

use core::fmt;

use crate::{dispatch::DispatchError, gpio::Line};

macro_rules! impl_from_error {
    ($error:ident) => {
        impl From<$error> for Error {
            fn from(error: $error) -> Self {
                Self::$error(error)
            }
        }
    };
}

/// Alias for Result<T, Error>.
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Pin configuration errors.
pub enum GpioError {
    /// The line isn't routed to a pin on this board.
    Unmapped,
    /// The drive mode can't be used with the requested direction.
    InvalidDrive,
    /// The pin, or its edge interrupt line, is already claimed.
    InUse,
    /// The peripheral rejected the configuration.
    Hardware,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Timer setup errors.
pub enum TimerError {
    /// The timer peripheral couldn't be claimed or clocked.
    Unavailable,
    /// The tick frequency can't be derived from the timer's input clock.
    UnreachableFrequency,
    /// The period doesn't fit the counter.
    PeriodOutOfRange,
}

/// Collection of all errors that can occur.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Clock tree, debug console or other board-level setup failed.
    BoardInit,
    /// A pin couldn't be configured.
    PinInit(Line, GpioError),
    TimerError(TimerError),
    DispatchError(DispatchError),
}

impl_from_error!(TimerError);
impl_from_error!(DispatchError);

impl Error {
    /// Numeric code printed next to the error message on the console.
    ///
    /// `0x1xx` board, `0x2LK` pin (`L` line index, `K` cause), `0x3xx` timer, `0x4xx` dispatch.
    pub fn code(&self) -> u32 {
        match self {
            Self::BoardInit => 0x100,
            Self::PinInit(line, e) => {
                let cause = match e {
                    GpioError::Unmapped => 1,
                    GpioError::InvalidDrive => 2,
                    GpioError::InUse => 3,
                    GpioError::Hardware => 4,
                };
                0x200 | (line.index() as u32) << 4 | cause
            }
            Self::TimerError(e) => {
                0x300
                    | match e {
                        TimerError::Unavailable => 1,
                        TimerError::UnreachableFrequency => 2,
                        TimerError::PeriodOutOfRange => 3,
                    }
            }
            Self::DispatchError(e) => {
                0x400
                    | match e {
                        DispatchError::Full => 1,
                        DispatchError::AlreadyRegistered => 2,
                    }
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoardInit => write!(f, "board init failed"),
            Self::PinInit(line, e) => write!(f, "GPIO init failed on {}: {:?}", line.name(), e),
            Self::TimerError(e) => write!(f, "timer init failed: {:?}", e),
            Self::DispatchError(e) => write!(f, "interrupt registration failed: {:?}", e),
        }
    }
}
