//! Startup sequence and the fatal error path.

use crate::{
    Error, Result,
    blink::BlinkTimerConfig,
    board::bring_up,
    dispatch::{EdgeHandler, InterruptTable},
    gpio::{Line, Platform, Trigger},
    passthrough::{CLOCK_EDGE_LINE, EDGE_IRQ_PRIORITY, IRQ_EDGE_LINE, SpiRelay},
    timer::{PeriodicTimer, TimerEvent},
};

/// Printed once the pins and edge interrupts are up.
pub const BANNER: &str = concat!("Radar Passthrough v", env!("CARGO_PKG_VERSION"));

/// Interrupt-context entry points for the two edge sources. These are plain functions, so
/// they reach the relay through a global.
#[derive(Clone, Copy)]
pub struct Handlers {
    /// Edges on the external clock.
    pub clock: EdgeHandler,
    /// Edges on the radar's IRQ output.
    pub irq: EdgeHandler,
}

/// Everything startup hands back. The caller moves the relay and timer into the globals the
/// interrupt handlers use, and keeps the LED for the main loop.
pub struct System<P, T> {
    pub led: P,
    pub relay: SpiRelay<P>,
    pub timer: T,
}

fn enable_edge<P: Platform, const N: usize>(
    platform: &mut P,
    interrupts: &InterruptTable<N>,
    line: Line,
    handler: EdgeHandler,
) -> Result<()> {
    interrupts.register(line, Trigger::Both, EDGE_IRQ_PRIORITY, handler)?;
    platform
        .enable_edge_interrupt(line, Trigger::Both, EDGE_IRQ_PRIORITY)
        .map_err(|e| Error::PinInit(line, e))
}

/// Bring the board up: clocks and console, all pins, both edge interrupts, then the blink
/// timer. Returns at the first failure, before anything after it is touched.
pub fn startup<P: Platform, const N: usize>(
    platform: &mut P,
    interrupts: &InterruptTable<N>,
    handlers: Handlers,
    blink: &BlinkTimerConfig,
) -> Result<System<P::Pin, P::Timer>> {
    platform.init_board()?;

    let pins = bring_up(platform)?;

    enable_edge(platform, interrupts, CLOCK_EDGE_LINE, handlers.clock)?;
    enable_edge(platform, interrupts, IRQ_EDGE_LINE, handlers.irq)?;

    log_info!("{}", BANNER);

    let mut timer = platform.init_timer()?;
    timer.configure(&blink.counter)?;
    timer.set_frequency(blink.clock_hz)?;
    timer.enable_event(TimerEvent::TerminalCount, blink.priority, true);
    timer.start();

    Ok(System {
        led: pins.led,
        relay: SpiRelay::new(pins.internal, pins.external),
        timer,
    })
}

/// Report `error` and stop. Nothing is retried.
pub fn halt(error: Error) -> ! {
    log_error!("{} (code {})", error, error.code());
    loop {
        cortex_m::asm::nop();
    }
}
