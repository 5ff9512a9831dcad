//! Firmware core for a radar SPI passthrough board.
//!
//! Two reactive behaviours share one process:
//!
//! - A periodic timer interrupt sets a flag that the main loop consumes to blink the status
//!   LED. See [`blink`].
//! - Edge interrupts on the external clock pin and the radar's IRQ pin re-drive the SPI lines
//!   between the on-board radar header and the external passthrough header, synchronously, inside
//!   the interrupt. See [`passthrough`].
//!
//! Hardware is reached through [`gpio::Platform`] and the `embedded-hal` digital traits. The
//! `firmware/` package binds these to an STM32G4 using `stm32-hal2`; [`mock`] binds them to
//! simulated lines for host tests.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod log;

pub mod app;
pub mod blink;
pub mod board;
pub mod dispatch;
pub mod error;
pub mod gpio;
pub mod macros;
pub mod mock;
pub mod passthrough;
pub mod timer;

pub use error::{Error, Result};
