//! Platform error types
//!
//! Only peripheral configuration can fail recoverably. Everything that goes
//! wrong once a driver is running is a wiring or logic fault and halts through
//! `fatal!` instead.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All hardware backends map their configuration failures to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformError {
    /// LEUART configuration failed
    Uart(UartError),
    /// I2C configuration failed
    I2c(I2cError),
    /// LETIMER configuration failed
    Timer(TimerError),
}

/// UART-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartError {
    /// Baud rate zero or above what the low-frequency clock can generate
    InvalidBaudRate,
    /// Data bits outside 8..=9
    InvalidDataBits,
}

/// I2C-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cError {
    /// Frequency zero or above the maximum for the selected clock ratio
    InvalidFrequency,
    /// Bus did not return to idle after the reset sequence
    BusError,
}

/// Timer-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerError {
    /// Period counts do not fit the 16-bit counter
    Overflow,
    /// Zero period, zero clock, or active time longer than the period
    InvalidDuration,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Uart(e) => write!(f, "UART error: {:?}", e),
            PlatformError::I2c(e) => write!(f, "I2C error: {:?}", e),
            PlatformError::Timer(e) => write!(f, "Timer error: {:?}", e),
        }
    }
}

impl From<UartError> for PlatformError {
    fn from(e: UartError) -> Self {
        PlatformError::Uart(e)
    }
}

impl From<I2cError> for PlatformError {
    fn from(e: I2cError) -> Self {
        PlatformError::I2c(e)
    }
}

impl From<TimerError> for PlatformError {
    fn from(e: TimerError) -> Self {
        PlatformError::Timer(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn test_display_names_the_peripheral() {
        assert_eq!(
            PlatformError::I2c(I2cError::InvalidFrequency).to_string(),
            "I2C error: InvalidFrequency"
        );
        assert_eq!(
            PlatformError::from(TimerError::Overflow).to_string(),
            "Timer error: Overflow"
        );
    }

    #[test]
    fn test_every_variant_is_a_peripheral_config_failure() {
        let errors = [
            PlatformError::from(UartError::InvalidDataBits),
            PlatformError::from(I2cError::BusError),
            PlatformError::from(TimerError::InvalidDuration),
        ];
        for error in errors {
            let peripheral = match error {
                PlatformError::Uart(_) => "UART",
                PlatformError::I2c(_) => "I2C",
                PlatformError::Timer(_) => "Timer",
            };
            assert!(error.to_string().starts_with(peripheral));
        }
    }
}
