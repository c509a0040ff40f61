//! Logging abstraction
//!
//! Provides unified logging macros that work across different targets:
//! - Embedded (`defmt` feature): Uses defmt, transport chosen by the binary (RTT, etc.)
//! - Host tests: Uses println!
//! - Host non-test: No-op
//!
//! Drivers log from interrupt context, so everything above `debug` must stay
//! off the per-byte paths. State transitions are logged at `trace`.
//!
//! Arguments follow the defmt formatting rules (`{}` and `{:?}` only), so any
//! type passed to a macro must implement `defmt::Format` when the `defmt`
//! feature is enabled.

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[INFO] {}", format!($($arg)*));
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[WARN] {}", format!($($arg)*));
    }};
}

/// Log error message
///
/// Every fatal path logs through this macro right before it halts.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        eprintln!("[ERROR] {}", format!($($arg)*));
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[DEBUG] {}", format!($($arg)*));
    }};
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::trace!($($arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[TRACE] {}", format!($($arg)*));
    }};
}

/// Log an error and halt
///
/// Used for every non-recoverable condition (precondition violations,
/// unexpected hardware signals, unbalanced votes). Release builds abort on
/// panic, so this never returns.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {{
        $crate::log_error!($($arg)*);
        panic!($($arg)*)
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_log_macros_expand_on_host() {
        let mode = 2u8;
        crate::log_info!("entering EM{}", mode);
        crate::log_warn!("vote table at {}", mode);
        crate::log_error!("unexpected signal {}", mode);
        crate::log_debug!("event {} posted", mode);
        crate::log_trace!("state {:?}", mode);
    }

    #[test]
    #[should_panic(expected = "halted at 7")]
    fn test_fatal_panics_with_message() {
        crate::fatal!("halted at {}", 7);
    }
}
