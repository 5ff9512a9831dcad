//! Radar SPI passthrough firmware for the NUCLEO-G431RB.
//!
//! TIM2 fires once a second and sets a flag; the main loop polls the flag and toggles the user
//! LED. EXTI edge interrupts on the external clock and on the radar's IRQ line re-drive the SPI
//! lines between the two headers.

#![no_std]
#![no_main]

mod board;

use cortex_m_rt::entry; // The runtime

use hal::pac::{self, interrupt};
use radar_passthrough::{
    access_global,
    app::{self, Handlers, System},
    blink::{BlinkController, BlinkTimerConfig, TimerFlag, BLINK_TIMER_IRQ_PRIORITY},
    dispatch::InterruptTable,
    gpio::Edge,
    init_globals, make_globals,
    passthrough::{SpiRelay, CLOCK_EDGE_LINE, EDGE_IRQ_PRIORITY, IRQ_EDGE_LINE},
    setup_nvic,
    timer::{PeriodicTimer, TimerEvent},
    Error,
};

use defmt_rtt as _;
// global logger
use panic_probe as _;

use board::{BlinkTimer, BoardPin, Nucleo};

/// Priority bits implemented by the STM32G4 NVIC.
const NVIC_PRIO_BITS: u8 = 4;

static INTERRUPTS: InterruptTable<2> = InterruptTable::new();
static BLINK_FLAG: TimerFlag = TimerFlag::new();

make_globals!((RELAY, SpiRelay<BoardPin>), (BLINK_TIMER, BlinkTimer));

fn on_clock_edge(edge: Edge) {
    critical_section::with(|cs| {
        access_global!(RELAY, relay, cs);
        relay.on_clock_edge(edge);
    });
}

fn on_irq_edge(edge: Edge) {
    critical_section::with(|cs| {
        access_global!(RELAY, relay, cs);
        relay.on_irq_edge(edge);
    });
}

#[entry]
fn main() -> ! {
    let Some(mut cp) = cortex_m::Peripherals::take() else {
        app::halt(Error::BoardInit);
    };
    let Some(dp) = pac::Peripherals::take() else {
        app::halt(Error::BoardInit);
    };

    let mut platform = Nucleo::new(dp.TIM2);

    let handlers = Handlers {
        clock: on_clock_edge,
        irq: on_irq_edge,
    };

    let System { led, relay, timer } =
        match app::startup(&mut platform, &INTERRUPTS, handlers, &BlinkTimerConfig::default()) {
            Ok(system) => system,
            Err(e) => app::halt(e),
        };

    init_globals!((RELAY, relay), (BLINK_TIMER, timer));

    setup_nvic!([
        (EXTI9_5, EDGE_IRQ_PRIORITY << NVIC_PRIO_BITS),
        (EXTI15_10, EDGE_IRQ_PRIORITY << NVIC_PRIO_BITS),
        (TIM2, BLINK_TIMER_IRQ_PRIORITY << NVIC_PRIO_BITS),
    ], cp);

    let mut blink = BlinkController::new(led, &BLINK_FLAG);

    loop {
        blink.poll();
    }
}

#[interrupt]
/// External SPI clock, PC5.
fn EXTI9_5() {
    board::clear_edge(CLOCK_EDGE_LINE);
    let edge = Edge::from_level(board::input_level(CLOCK_EDGE_LINE));
    INTERRUPTS.dispatch(CLOCK_EDGE_LINE, edge);
}

#[interrupt]
/// Radar IRQ, PB11.
fn EXTI15_10() {
    board::clear_edge(IRQ_EDGE_LINE);
    let edge = Edge::from_level(board::input_level(IRQ_EDGE_LINE));
    INTERRUPTS.dispatch(IRQ_EDGE_LINE, edge);
}

#[interrupt]
/// Blink timer terminal count.
fn TIM2() {
    critical_section::with(|cs| {
        access_global!(BLINK_TIMER, timer, cs);
        timer.clear_event(TimerEvent::TerminalCount);
    });
    BLINK_FLAG.signal();
}

// same panicking *behavior* as `panic-probe` but doesn't print a panic message
// this prevents the panic message being printed *twice* when `defmt::panic` is invoked
#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}
