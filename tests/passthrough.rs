//! End-to-end scenarios on the simulated board: startup, the blink loop driven by simulated
//! timer ticks, and SPI traffic relayed through the interrupt table.

use std::cell::RefCell;

use radar_passthrough::{
    Error,
    app::{Handlers, System, startup},
    blink::{BLINK_TIMER_CLOCK_HZ, BlinkController, BlinkTimerConfig, TimerFlag},
    dispatch::InterruptTable,
    error::GpioError,
    gpio::{Edge, Line, Signal},
    mock::{SimBoard, SimPin, SimPlatform},
    passthrough::{CLOCK_EDGE_LINE, IRQ_EDGE_LINE, SpiRelay},
    timer::{PeriodicTimer, TimerEvent},
};

// Simulated pins aren't `Send`, so the relay global is per test thread.
thread_local! {
    static RELAY: RefCell<Option<SpiRelay<SimPin<'static>>>> = const { RefCell::new(None) };
}

fn on_clock(edge: Edge) {
    RELAY.with(|r| {
        if let Some(relay) = r.borrow_mut().as_mut() {
            relay.on_clock_edge(edge);
        }
    });
}

fn on_irq(edge: Edge) {
    RELAY.with(|r| {
        if let Some(relay) = r.borrow_mut().as_mut() {
            relay.on_irq_edge(edge);
        }
    });
}

const HANDLERS: Handlers = Handlers {
    clock: on_clock,
    irq: on_irq,
};

fn leaked_board() -> &'static SimBoard {
    Box::leak(Box::new(SimBoard::new()))
}

#[test]
fn led_blinks_once_per_second() {
    let board = SimBoard::new();
    let mut platform = SimPlatform::new(&board);
    let interrupts: InterruptTable<2> = InterruptTable::new();
    let cfg = BlinkTimerConfig::default();

    let System { led, mut timer, .. } =
        startup(&mut platform, &interrupts, HANDLERS, &cfg).unwrap();

    let flag = TimerFlag::new();
    let mut blink = BlinkController::new(led, &flag);
    let initial = board.level(Line::Led);

    let mut ticks: u64 = 0;
    let mut toggle_ticks = Vec::new();

    while blink.toggles() < 10 {
        // Timer interrupt.
        if timer.tick() {
            timer.clear_event(TimerEvent::TerminalCount);
            flag.signal();
        }
        ticks += 1;

        // Main loop, polling faster than the timer fires.
        if blink.poll() {
            toggle_ticks.push(ticks);
        }
        assert!(ticks < 1_000_000, "LED never toggled ten times");
    }

    let elapsed = ticks as f32 / BLINK_TIMER_CLOCK_HZ as f32;
    assert_eq!(elapsed, 10.0);
    assert_eq!(cfg.interval_secs(), 1.0);
    assert!(toggle_ticks.windows(2).all(|w| w[1] - w[0] == 10_000));

    // An even number of inversions.
    assert_eq!(board.level(Line::Led), initial);
    assert_eq!(board.writes(Line::Led), 10);
    assert_eq!(timer.cleared(), 10);
}

#[test]
fn paused_blink_leaves_led_alone() {
    let board = SimBoard::new();
    let mut platform = SimPlatform::new(&board);
    let interrupts: InterruptTable<2> = InterruptTable::new();

    let System { led, mut timer, .. } =
        startup(&mut platform, &interrupts, HANDLERS, &BlinkTimerConfig::default()).unwrap();

    let flag = TimerFlag::new();
    let mut blink = BlinkController::new(led, &flag);
    blink.set_active(false);

    for _ in 0..50_000 {
        if timer.tick() {
            flag.signal();
        }
        blink.poll();
    }
    assert_eq!(board.writes(Line::Led), 0);

    blink.set_active(true);
    for _ in 0..10_000 {
        if timer.tick() {
            flag.signal();
        }
        blink.poll();
    }
    assert_eq!(blink.toggles(), 1);
}

/// Clock one byte through the bridge, MSB first, in SPI mode 0: the controller sets MOSI while
/// the clock is low, both sides sample on the rising edge.
fn transfer_byte(
    board: &SimBoard,
    interrupts: &InterruptTable<2>,
    mosi: u8,
    miso: u8,
) -> (u8, u8) {
    let mut radar_saw = 0u8;
    let mut controller_saw = 0u8;

    for bit in (0..8).rev() {
        board.drive(Line::External(Signal::Mosi), mosi >> bit & 1 == 1);
        board.drive(Line::Internal(Signal::Miso), miso >> bit & 1 == 1);

        board.drive(CLOCK_EDGE_LINE, true);
        assert!(interrupts.dispatch(CLOCK_EDGE_LINE, Edge::Rising));
        assert!(board.level(Line::Internal(Signal::Clk)));

        radar_saw = radar_saw << 1 | board.level(Line::Internal(Signal::Mosi)) as u8;
        controller_saw = controller_saw << 1 | board.level(Line::External(Signal::Miso)) as u8;

        board.drive(CLOCK_EDGE_LINE, false);
        assert!(interrupts.dispatch(CLOCK_EDGE_LINE, Edge::Falling));
        assert!(!board.level(Line::Internal(Signal::Clk)));
    }

    (radar_saw, controller_saw)
}

#[test]
fn spi_transaction_is_relayed() {
    let board = leaked_board();
    let mut platform = SimPlatform::new(board);
    let interrupts: InterruptTable<2> = InterruptTable::new();

    let system =
        startup(&mut platform, &interrupts, HANDLERS, &BlinkTimerConfig::default()).unwrap();
    RELAY.with(|r| r.replace(Some(system.relay)));

    // Select the radar. CS follows on the next clock edge.
    board.drive(Line::External(Signal::Cs), false);

    let (radar_saw, controller_saw) = transfer_byte(board, &interrupts, 0xA5, 0x3C);
    assert_eq!(radar_saw, 0xA5);
    assert_eq!(controller_saw, 0x3C);
    assert!(!board.level(Line::Internal(Signal::Cs)));

    // Deselect; still mirrored on the next edge.
    board.drive(Line::External(Signal::Cs), true);
    board.drive(CLOCK_EDGE_LINE, true);
    interrupts.dispatch(CLOCK_EDGE_LINE, Edge::Rising);
    assert!(board.level(Line::Internal(Signal::Cs)));

    let clock_edges = RELAY.with(|r| r.borrow().as_ref().map(|relay| relay.clock_edges()));
    assert_eq!(clock_edges, Some(17));
}

#[test]
fn radar_irq_and_reset_reach_external_header() {
    let board = leaked_board();
    let mut platform = SimPlatform::new(board);
    let interrupts: InterruptTable<2> = InterruptTable::new();

    let system =
        startup(&mut platform, &interrupts, HANDLERS, &BlinkTimerConfig::default()).unwrap();
    RELAY.with(|r| r.replace(Some(system.relay)));

    board.drive(IRQ_EDGE_LINE, true);
    assert!(interrupts.dispatch(IRQ_EDGE_LINE, Edge::Rising));
    assert!(board.level(Line::External(Signal::Irq)));

    board.drive(IRQ_EDGE_LINE, false);
    assert!(interrupts.dispatch(IRQ_EDGE_LINE, Edge::Falling));
    assert!(!board.level(Line::External(Signal::Irq)));

    // Reset is only relayed on clock edges.
    board.drive(Line::Internal(Signal::Reset), true);
    assert!(!board.level(Line::External(Signal::Reset)));
    board.drive(CLOCK_EDGE_LINE, true);
    interrupts.dispatch(CLOCK_EDGE_LINE, Edge::Rising);
    assert!(board.level(Line::External(Signal::Reset)));
}

#[test]
fn failed_pin_init_stops_before_main_loop() {
    let board = SimBoard::new();
    let line = Line::Internal(Signal::Clk);
    let mut platform = SimPlatform::new(&board).fail_pin(line);
    let interrupts: InterruptTable<2> = InterruptTable::new();

    let result = startup(&mut platform, &interrupts, HANDLERS, &BlinkTimerConfig::default());

    assert_eq!(result.err(), Some(Error::PinInit(line, GpioError::Hardware)));
    assert_eq!(interrupts.registered(), 0);
    assert_eq!(platform.edge_interrupt_count(), 0);
    // Edges arriving anyway go nowhere.
    assert!(!interrupts.dispatch(CLOCK_EDGE_LINE, Edge::Rising));
    assert!(!interrupts.dispatch(IRQ_EDGE_LINE, Edge::Rising));
}
