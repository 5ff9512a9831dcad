//! Console output. `defmt` when the `defmt` feature is on (the firmware enables it and
//! provides the RTT transport), `println!` under unit tests, and nothing otherwise.
//!
//! Only use format syntax that both `defmt` and `core::fmt` accept: `{}` and `{:?}`.

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! log_info {
            ($($arg:tt)*) => { ::defmt::info!($($arg)*) };
        }

        macro_rules! log_debug {
            ($($arg:tt)*) => { ::defmt::debug!($($arg)*) };
        }

        macro_rules! log_warn {
            ($($arg:tt)*) => { ::defmt::warn!($($arg)*) };
        }

        macro_rules! log_error {
            ($($arg:tt)*) => { ::defmt::error!($($arg)*) };
        }
    } else if #[cfg(test)] {
        macro_rules! log_info {
            ($($arg:tt)*) => { println!("[INFO] {}", format_args!($($arg)*)) };
        }

        macro_rules! log_debug {
            ($($arg:tt)*) => { println!("[DEBUG] {}", format_args!($($arg)*)) };
        }

        macro_rules! log_warn {
            ($($arg:tt)*) => { println!("[WARN] {}", format_args!($($arg)*)) };
        }

        macro_rules! log_error {
            ($($arg:tt)*) => { println!("[ERROR] {}", format_args!($($arg)*)) };
        }
    } else {
        // Keep the arguments type-checked so a log line can't rot while logging is off.
        macro_rules! log_info {
            ($($arg:tt)*) => {{
                if false {
                    let _ = ::core::format_args!($($arg)*);
                }
            }};
        }

        macro_rules! log_debug {
            ($($arg:tt)*) => {{
                if false {
                    let _ = ::core::format_args!($($arg)*);
                }
            }};
        }

        macro_rules! log_warn {
            ($($arg:tt)*) => {{
                if false {
                    let _ = ::core::format_args!($($arg)*);
                }
            }};
        }

        macro_rules! log_error {
            ($($arg:tt)*) => {{
                if false {
                    let _ = ::core::format_args!($($arg)*);
                }
            }};
        }
    }
}
