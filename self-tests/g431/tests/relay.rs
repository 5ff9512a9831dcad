// On-target tests for pin bring-up and the SPI relay.

// This test requires wires to be connected between the following pins, standing in for the
// external controller and the radar:
// * pa0 <-> pc7 (EXT_SPI_MOSI)
// * pa1 <-> pb14 (RSPI_MISO)
// * pa4 <-> pb11 (RSPI_IRQ)
// * pa6 <-> pc4 (EXT_SPI_CS)

#![deny(warnings)]
#![no_std]
#![no_main]

use panic_probe as _;

#[cfg(test)]
#[embedded_test::tests(setup = rtt_target::rtt_init_defmt!())]
mod tests {
    use hal::{
        gpio::{Pin, PinMode, Port},
        pac,
    };
    use radar_passthrough::{
        board::bring_up,
        gpio::{Edge, Line, Platform, Signal},
        passthrough::SpiRelay,
    };
    use self_tests_g431::board::{input_level, BoardPin, Nucleo};

    struct State {
        relay: SpiRelay<BoardPin>,
        ext_mosi: Pin,
        radar_miso: Pin,
        radar_irq: Pin,
        ext_cs: Pin,
    }

    #[init]
    fn init() -> State {
        let dp = pac::Peripherals::take().unwrap();
        let mut platform = Nucleo::new(dp.TIM2);
        platform.init_board().unwrap();

        let pins = bring_up(&mut platform).unwrap();

        State {
            relay: SpiRelay::new(pins.internal, pins.external),
            ext_mosi: Pin::new(Port::A, 0, PinMode::Output),
            radar_miso: Pin::new(Port::A, 1, PinMode::Output),
            radar_irq: Pin::new(Port::A, 4, PinMode::Output),
            ext_cs: Pin::new(Port::A, 6, PinMode::Output),
        }
    }

    // Sanity check
    #[test]
    fn initial_levels() {
        let dp = pac::Peripherals::take().unwrap();
        let mut platform = Nucleo::new(dp.TIM2);
        platform.init_board().unwrap();
        let _pins = bring_up(&mut platform).unwrap();

        defmt::assert!(!input_level(Line::Led));
        defmt::assert!(input_level(Line::Internal(Signal::Cs)));
        defmt::assert!(!input_level(Line::Internal(Signal::Clk)));
    }

    #[test]
    fn clock_follows_edge(mut state: State) {
        state.relay.on_clock_edge(Edge::Rising);
        defmt::assert!(input_level(Line::Internal(Signal::Clk)));

        state.relay.on_clock_edge(Edge::Falling);
        defmt::assert!(!input_level(Line::Internal(Signal::Clk)));
    }

    #[test]
    fn data_cross_mirrors(mut state: State) {
        state.ext_mosi.set_high();
        state.radar_miso.set_low();
        state.relay.on_clock_edge(Edge::Rising);
        defmt::assert!(input_level(Line::Internal(Signal::Mosi)));
        defmt::assert!(!input_level(Line::External(Signal::Miso)));

        state.ext_mosi.set_low();
        state.radar_miso.set_high();
        state.relay.on_clock_edge(Edge::Falling);
        defmt::assert!(!input_level(Line::Internal(Signal::Mosi)));
        defmt::assert!(input_level(Line::External(Signal::Miso)));
    }

    #[test]
    fn chip_select_mirrors(mut state: State) {
        state.ext_cs.set_low();
        state.relay.on_clock_edge(Edge::Rising);
        defmt::assert!(!input_level(Line::Internal(Signal::Cs)));

        state.ext_cs.set_high();
        state.relay.on_clock_edge(Edge::Falling);
        defmt::assert!(input_level(Line::Internal(Signal::Cs)));
    }

    #[test]
    fn irq_mirrors(mut state: State) {
        state.radar_irq.set_high();
        state.relay.on_irq_edge(Edge::Rising);
        defmt::assert!(input_level(Line::External(Signal::Irq)));

        state.radar_irq.set_low();
        state.relay.on_irq_edge(Edge::Falling);
        defmt::assert!(!input_level(Line::External(Signal::Irq)));
    }
}
