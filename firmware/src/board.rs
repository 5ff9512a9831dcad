//! NUCLEO-G431RB binding: physical pin map, GPIO and EXTI setup, and the blink timer on TIM2.
//!
//! Pin map. The internal header sits on port B, the external header on port C:
//!
//! | Line        | Pin  | Line          | Pin  |
//! |-------------|------|---------------|------|
//! | RSPI_MOSI   | PB15 | EXT_SPI_MOSI  | PC7  |
//! | RSPI_MISO   | PB14 | EXT_SPI_MISO  | PC6  |
//! | RSPI_CLK    | PB13 | EXT_SPI_CLK   | PC5  |
//! | RSPI_CS     | PB12 | EXT_SPI_CS    | PC4  |
//! | RSPI_IRQ    | PB11 | EXT_SPI_IRQ   | PC3  |
//! | RXRES_L     | PB10 | EXT_RXRES_L   | PC2  |
//!
//! The user LED (LD2) is PA5.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, StatefulOutputPin};
use hal::{
    clocks::Clocks,
    gpio::{self, Edge as ExtiEdge, OutputType, Pin, PinMode, Port, Pull},
    pac::{self, TIM2},
    timer::{Timer, TimerInterrupt},
};
use radar_passthrough::{
    error::{GpioError, TimerError},
    gpio::{Direction, Drive, LINE_COUNT, Line, PinConfig, Platform, Signal, Trigger},
    timer::{calc_prescaler, CountDir, PeriodicTimer, TimerConfig, TimerEvent},
    Error, Result,
};

/// Port and pin number of `line`.
pub const fn pin_of(line: Line) -> (Port, u8) {
    match line {
        Line::Led => (Port::A, 5),
        Line::Internal(s) => (Port::B, 15 - signal_offset(s)),
        Line::External(s) => (Port::C, 7 - signal_offset(s)),
    }
}

const fn signal_offset(signal: Signal) -> u8 {
    match signal {
        Signal::Mosi => 0,
        Signal::Miso => 1,
        Signal::Clk => 2,
        Signal::Cs => 3,
        Signal::Irq => 4,
        Signal::Reset => 5,
    }
}

/// Read the input data register for `line` without going through a pin handle. For edge
/// interrupt handlers, which don't own the pin.
pub fn input_level(line: Line) -> bool {
    let (port, n) = pin_of(line);
    let idr = unsafe {
        match port {
            Port::A => (*pac::GPIOA::ptr()).idr().read().bits(),
            Port::B => (*pac::GPIOB::ptr()).idr().read().bits(),
            Port::C => (*pac::GPIOC::ptr()).idr().read().bits(),
            // Nothing is mapped elsewhere.
            _ => 0,
        }
    };
    idr & (1 << n) != 0
}

/// A configured GPIO pin, exposed through the `embedded-hal` digital traits.
pub struct BoardPin {
    pin: Pin,
    /// Last level written. The output data register is write-only through the HAL.
    level: bool,
}

impl ErrorType for BoardPin {
    type Error = Infallible;
}

impl InputPin for BoardPin {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.pin.is_high())
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.pin.is_low())
    }
}

impl OutputPin for BoardPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.pin.set_low();
        self.level = false;
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.pin.set_high();
        self.level = true;
        Ok(())
    }
}

impl StatefulOutputPin for BoardPin {
    fn is_set_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.level)
    }

    fn is_set_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(!self.level)
    }
}

/// Blink timer on TIM2.
pub struct BlinkTimer {
    timer: Timer<TIM2>,
    /// TIM2 input clock, in Hz.
    clock_hz: u32,
}

impl PeriodicTimer for BlinkTimer {
    fn configure(&mut self, cfg: &TimerConfig) -> core::result::Result<(), TimerError> {
        // Only the continuous up-counter the blink needs. Direction and one-pulse mode are
        // fixed when the HAL timer is built.
        if cfg.direction != CountDir::Up
            || !cfg.is_continuous
            || cfg.is_compare
            || cfg.value != 0
        {
            return Err(TimerError::Unavailable);
        }
        // TIM2 is 32 bits wide, so any period fits.
        self.timer.set_auto_reload(cfg.period);
        Ok(())
    }

    fn set_frequency(&mut self, hz: u32) -> core::result::Result<(), TimerError> {
        let psc = calc_prescaler(self.clock_hz, hz)?;
        self.timer.set_prescaler(psc);
        Ok(())
    }

    fn enable_event(&mut self, event: TimerEvent, priority: u8, enable: bool) {
        let interrupt = match event {
            TimerEvent::TerminalCount => TimerInterrupt::Update,
            TimerEvent::Compare => TimerInterrupt::CaptureCompare1,
        };
        if enable {
            self.timer.enable_interrupt(interrupt);
        } else {
            self.timer.disable_interrupt(interrupt);
        }
        // NVIC priority is applied with the other vectors once the globals are in place.
        defmt::debug!("TIM2 {} interrupt enabled: {}, priority {}", event, enable, priority);
    }

    fn start(&mut self) {
        self.timer.enable();
    }

    fn clear_event(&mut self, event: TimerEvent) {
        let interrupt = match event {
            TimerEvent::TerminalCount => TimerInterrupt::Update,
            TimerEvent::Compare => TimerInterrupt::CaptureCompare1,
        };
        self.timer.clear_interrupt(interrupt);
    }
}

/// The board. Owns the clock configuration and the timer peripheral until they're handed out.
pub struct Nucleo {
    clocks: Clocks,
    tim2: Option<TIM2>,
    configs: [Option<PinConfig>; LINE_COUNT],
    /// EXTI lines in use, one bit per pin number. Ports share EXTI lines.
    exti_claimed: u16,
}

impl Nucleo {
    pub fn new(tim2: TIM2) -> Self {
        Self {
            clocks: Clocks::default(),
            tim2: Some(tim2),
            configs: [None; LINE_COUNT],
            exti_claimed: 0,
        }
    }
}

impl Platform for Nucleo {
    type Pin = BoardPin;
    type Timer = BlinkTimer;

    fn init_board(&mut self) -> Result<()> {
        self.clocks.setup().map_err(|_| Error::BoardInit)?;
        defmt::debug!("Clocks up; APB1 timer clock {} Hz", self.clocks.apb1_timer());
        Ok(())
    }

    fn init_pin(
        &mut self,
        line: Line,
        config: PinConfig,
    ) -> core::result::Result<BoardPin, GpioError> {
        if !config.drive.allows(config.direction) {
            return Err(GpioError::InvalidDrive);
        }
        if self.configs[line.index()].is_some() {
            return Err(GpioError::InUse);
        }

        let (port, n) = pin_of(line);

        let pin = match config.direction {
            Direction::Output => {
                let mut pin = Pin::new(port, n, PinMode::Output);
                pin.output_type(match config.drive {
                    Drive::OpenDrain => OutputType::OpenDrain,
                    _ => OutputType::PushPull,
                });
                if config.init_state {
                    pin.set_high();
                } else {
                    pin.set_low();
                }
                pin
            }
            Direction::Input => {
                let mut pin = Pin::new(port, n, PinMode::Input);
                pin.pull(match config.drive {
                    Drive::PullUp => Pull::Up,
                    Drive::PullDown => Pull::Dn,
                    _ => Pull::Floating,
                });
                pin
            }
        };

        self.configs[line.index()] = Some(config);

        Ok(BoardPin {
            pin,
            level: config.init_state,
        })
    }

    fn init_timer(&mut self) -> Result<BlinkTimer> {
        let regs = self.tim2.take().ok_or(TimerError::Unavailable)?;

        // Placeholder rate; `configure` and `set_frequency` write the real ARR and PSC.
        let timer = Timer::new_tim2(regs, 1., Default::default(), &self.clocks);

        Ok(BlinkTimer {
            timer,
            clock_hz: self.clocks.apb1_timer(),
        })
    }

    fn enable_edge_interrupt(
        &mut self,
        line: Line,
        trigger: Trigger,
        priority: u8,
    ) -> core::result::Result<(), GpioError> {
        match self.configs[line.index()] {
            Some(cfg) if cfg.direction == Direction::Input => (),
            Some(_) => return Err(GpioError::InvalidDrive),
            None => return Err(GpioError::Unmapped),
        }

        let (port, n) = pin_of(line);
        if self.exti_claimed & (1 << n) != 0 {
            return Err(GpioError::InUse);
        }
        self.exti_claimed |= 1 << n;

        // Re-taking an input pin leaves its mode and pull as configured.
        let mut pin = Pin::new(port, n, PinMode::Input);
        pin.enable_interrupt(match trigger {
            Trigger::Rising => ExtiEdge::Rising,
            Trigger::Falling => ExtiEdge::Falling,
            Trigger::Both => ExtiEdge::Either,
        });

        defmt::debug!("EXTI{} routed to {}, priority {}", n, line.name(), priority);
        Ok(())
    }
}

/// Clear the pending flag of `line`'s EXTI line. Call first thing in the handler.
pub fn clear_edge(line: Line) {
    let (_, n) = pin_of(line);
    gpio::clear_exti_interrupt(n);
}
