//! Macros for the globals that interrupt handlers share with the main loop, and for NVIC setup.
//!
//! Interrupt handlers can't take arguments, so anything they use (the relay, the blink timer)
//! lives in a `static` of the form `Mutex<RefCell<Option<T>>>`, filled in once startup is done.

/// Syntax helper for getting global variables of the form `Mutex<RefCell<Option>>>` from an
/// interrupt-free context - eg in interrupt handlers.
///
/// Returns from the enclosing function or closure if the global hasn't been initialized yet,
/// which is what an interrupt that fires before startup finishes should do.
///
/// Example: `access_global!(RELAY, relay, cs)`
#[macro_export]
macro_rules! access_global {
    ($NAME_GLOBAL:ident, $name_local:ident, $cs:expr) => {
        let mut part1 = $NAME_GLOBAL.borrow($cs).borrow_mut();
        let Some($name_local) = part1.as_mut() else {
            return;
        };
    };
}

/// Syntax helper for setting global variables of the form `Mutex<RefCell<Option>>>`.
/// eg in interrupt handlers. Ideal for non-copy-type variables that can't be initialized
/// immediatiately.
///
/// Example: `make_globals!(
///     (RELAY, SpiRelay<BoardPin>),
///     (BLINK_TIMER, BlinkTimer),
/// )`
#[macro_export]
macro_rules! make_globals {
    ($(($NAME:ident, $type:ty)),+ $(,)?) => {
        $(
            static $NAME: ::critical_section::Mutex<core::cell::RefCell<Option<$type>>> =
                ::critical_section::Mutex::new(core::cell::RefCell::new(None));
        )+
    };
}

/// Initialize one or more globals inside a critical section.
///
/// Usage:
/// ```ignore
/// init_globals!(
///     (RELAY, system.relay),
///     (BLINK_TIMER, system.timer),
/// );
/// ```
#[macro_export]
macro_rules! init_globals {
    ($(($NAME:ident, $val:expr)),* $(,)?) => {
        ::critical_section::with(|cs| {
            $(
                $NAME.borrow(cs).replace(Some($val));
            )*
        });
    };
}

/// Automates Cortex-M NVIC setup. The second value is NVIC priority; lower
/// is higher priority. Expects the device's `pac` in scope. Example use:
/// setup_nvic!([
///     (TIM2, 7 << 4),
///     (EXTI9_5, 7 << 4),
/// ], cp);
#[macro_export]
macro_rules! setup_nvic {
    (
        [ $( ($int:ident, $prio:expr) ),* $(,)? ],
        $cp:ident
    ) => {
        unsafe {
            $(
                $cp.NVIC.set_priority(pac::Interrupt::$int, $prio);
            )*
            $(
                cortex_m::peripheral::NVIC::unmask(pac::Interrupt::$int);
            )*
        }
    };
}
