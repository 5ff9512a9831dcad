//! On-target tests for the radar passthrough. The board binding is shared with the firmware.

#![no_std]

#[path = "../../../firmware/src/board.rs"]
pub mod board;
