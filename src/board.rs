//! Pin bring-up: every line the firmware uses, with its direction, drive and initial level.

use crate::{
    Error, Result,
    gpio::{LINE_COUNT, Line, PinConfig, Platform, Signal},
    passthrough::{Bus, INTERNAL_PINS, external_config},
};

/// Configuration of every line, in bring-up order and indexed by [`Line::index`]. External
/// lines take the inverse role of their internal counterpart.
pub const PIN_TABLE: [(Line, PinConfig); LINE_COUNT] = [
    // LED starts off.
    (Line::Led, PinConfig::output(false)),
    (Line::Internal(Signal::Mosi), INTERNAL_PINS[0].1),
    (Line::Internal(Signal::Miso), INTERNAL_PINS[1].1),
    (Line::Internal(Signal::Clk), INTERNAL_PINS[2].1),
    (Line::Internal(Signal::Cs), INTERNAL_PINS[3].1),
    (Line::Internal(Signal::Irq), INTERNAL_PINS[4].1),
    (Line::Internal(Signal::Reset), INTERNAL_PINS[5].1),
    (Line::External(Signal::Mosi), external_config(&INTERNAL_PINS[0].1)),
    (Line::External(Signal::Miso), external_config(&INTERNAL_PINS[1].1)),
    (Line::External(Signal::Clk), external_config(&INTERNAL_PINS[2].1)),
    (Line::External(Signal::Cs), external_config(&INTERNAL_PINS[3].1)),
    (Line::External(Signal::Irq), external_config(&INTERNAL_PINS[4].1)),
    (Line::External(Signal::Reset), external_config(&INTERNAL_PINS[5].1)),
];

/// Configuration for `line`.
pub fn config_for(line: Line) -> PinConfig {
    PIN_TABLE[line.index()].1
}

/// Every configured pin, ready to hand out to the blink controller and the relay.
pub struct Pins<P> {
    pub led: P,
    pub internal: Bus<P>,
    pub external: Bus<P>,
}

fn init_line<P: Platform>(platform: &mut P, line: Line) -> Result<P::Pin> {
    platform.init_pin(line, config_for(line)).map_err(|e| {
        let error = Error::PinInit(line, e);
        log_error!("GPIO init failed: {} {:?} (code {})", line.name(), e, error.code());
        error
    })
}

fn init_bus<P: Platform>(platform: &mut P, side: fn(Signal) -> Line) -> Result<Bus<P::Pin>> {
    // Field initializers run in the order written, which is table order.
    Ok(Bus {
        mosi: init_line(platform, side(Signal::Mosi))?,
        miso: init_line(platform, side(Signal::Miso))?,
        clk: init_line(platform, side(Signal::Clk))?,
        cs: init_line(platform, side(Signal::Cs))?,
        irq: init_line(platform, side(Signal::Irq))?,
        reset: init_line(platform, side(Signal::Reset))?,
    })
}

/// Configure the LED, then the internal header, then the external header. Stops at the first
/// line that fails; lines already configured are left as they are.
pub fn bring_up<P: Platform>(platform: &mut P) -> Result<Pins<P::Pin>> {
    let led = init_line(platform, Line::Led)?;
    let internal = init_bus(platform, Line::Internal)?;
    let external = init_bus(platform, Line::External)?;

    log_debug!("{} GPIO lines configured", LINE_COUNT);

    Ok(Pins {
        led,
        internal,
        external,
    })
}
