//! SPI passthrough between the radar header and the external header.
//!
//! There is no SPI peripheral involved. Every transition of the external clock re-drives the
//! data, clock, chip-select and reset lines from inside the edge interrupt, and every transition
//! of the radar's IRQ line is copied to the external IRQ line. Correctness depends entirely on
//! interrupt latency being small compared to the external clock period; nothing is buffered,
//! debounced or framed.

use embedded_hal::digital::{InputPin, OutputPin, PinState};

use crate::gpio::{Edge, Line, PinConfig, Signal};

/// Interrupt priority for both edge sources.
///
/// The relative priority of the clock and IRQ edges is undecided; until it is, they share one.
pub const EDGE_IRQ_PRIORITY: u8 = 7;

/// Radar-facing header. The MCU acts as SPI controller towards the radar.
pub const INTERNAL_PINS: [(Signal, PinConfig); 6] = [
    (Signal::Mosi, PinConfig::output(false)),
    (Signal::Miso, PinConfig::input(false)),
    (Signal::Clk, PinConfig::output(false)),
    // Chip select is active low: start deselected.
    (Signal::Cs, PinConfig::output(true)),
    (Signal::Irq, PinConfig::input(false)),
    (Signal::Reset, PinConfig::output(false)),
];

/// Configuration for `signal` on the external header: the internal one, inverted.
pub const fn external_config(internal: &PinConfig) -> PinConfig {
    internal.inverted()
}

/// The six lines of one header.
pub struct Bus<P> {
    pub mosi: P,
    pub miso: P,
    pub clk: P,
    pub cs: P,
    pub irq: P,
    pub reset: P,
}

/// Mirrors signals between the two headers. Owns all twelve bus pins.
pub struct SpiRelay<P> {
    internal: Bus<P>,
    external: Bus<P>,
    clock_edges: u32,
    irq_edges: u32,
}

/// Copy `src`'s level onto `dst`. Errors are ignored: the next edge re-drives the line anyway.
fn mirror<P: InputPin + OutputPin>(src: &mut P, dst: &mut P) {
    let level = src.is_high().unwrap_or(false);
    dst.set_state(PinState::from(level)).ok();
}

impl<P: InputPin + OutputPin> SpiRelay<P> {
    pub fn new(internal: Bus<P>, external: Bus<P>) -> Self {
        Self {
            internal,
            external,
            clock_edges: 0,
            irq_edges: 0,
        }
    }

    /// Handler for an edge on the external clock input.
    ///
    /// Always runs all six steps, in this order: downstream hardware expects every line to be
    /// re-driven on every edge, chip select or not.
    pub fn on_clock_edge(&mut self, edge: Edge) {
        let signal = edge.is_rising();

        log_debug!("SPI_CLK interrupt triggered: {}", signal as u8);

        // Controller out: external MOSI onto the radar's data input.
        mirror(&mut self.external.mosi, &mut self.internal.mosi);
        // Controller in: radar's data output onto external MISO.
        mirror(&mut self.internal.miso, &mut self.external.miso);
        self.internal.clk.set_state(PinState::from(signal)).ok();
        mirror(&mut self.external.cs, &mut self.internal.cs);
        mirror(&mut self.internal.reset, &mut self.external.reset);

        self.clock_edges = self.clock_edges.wrapping_add(1);
    }

    /// Handler for an edge on the radar's IRQ output. The edge direction doesn't matter; the
    /// current level is copied.
    pub fn on_irq_edge(&mut self, _edge: Edge) {
        log_debug!("SPI_IRQ interrupt triggered");

        mirror(&mut self.internal.irq, &mut self.external.irq);

        self.irq_edges = self.irq_edges.wrapping_add(1);
    }

    /// Clock edges relayed so far.
    pub fn clock_edges(&self) -> u32 {
        self.clock_edges
    }

    /// IRQ edges relayed so far.
    pub fn irq_edges(&self) -> u32 {
        self.irq_edges
    }

    /// Give both buses back.
    pub fn free(self) -> (Bus<P>, Bus<P>) {
        (self.internal, self.external)
    }
}

/// The line an edge handler is attached to.
pub const CLOCK_EDGE_LINE: Line = Line::External(Signal::Clk);
pub const IRQ_EDGE_LINE: Line = Line::Internal(Signal::Irq);
