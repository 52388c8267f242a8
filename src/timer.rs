//! # Tick Timer Arithmetic
//!
//! SysTick counts down from its reload value to zero and then raises the
//! SysTick exception, so a reload of `R` gives a period of `R + 1` core
//! clocks. The register is 24 bits wide.
//!
//! Programming the peripheral is done by the port layer
//! (`arch::cortex_m0::configure_systick`); this module only does the math so
//! it can be checked at compile time and tested on the host.

use core::fmt;

/// Largest value the 24-bit SysTick reload register accepts.
pub const SYSTICK_MAX_RELOAD: u32 = 0x00FF_FFFF;

/// Reasons a tick rate cannot be produced from a given core clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// A tick rate of zero would never preempt.
    ZeroTickRate,
    /// The tick rate is faster than the core clock (reload would underflow).
    TickRateTooHigh,
    /// The reload does not fit in the 24-bit register.
    ReloadTooLarge,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::ZeroTickRate => f.write_str("tick rate is zero"),
            TimerError::TickRateTooHigh => f.write_str("tick rate exceeds the core clock"),
            TimerError::ReloadTooLarge => f.write_str("reload value exceeds 24 bits"),
        }
    }
}

/// Compute the SysTick reload value: `core_clock_hz / tick_hz - 1`.
///
/// If `tick_hz` does not divide the clock evenly the quotient is truncated,
/// so every tick runs slightly short. That error is bounded by one core
/// clock per tick and is not corrected.
pub const fn reload_value(core_clock_hz: u32, tick_hz: u32) -> Result<u32, TimerError> {
    if tick_hz == 0 {
        return Err(TimerError::ZeroTickRate);
    }
    let counts = core_clock_hz / tick_hz;
    if counts == 0 {
        return Err(TimerError::TickRateTooHigh);
    }
    let reload = counts - 1;
    if reload > SYSTICK_MAX_RELOAD {
        return Err(TimerError::ReloadTooLarge);
    }
    Ok(reload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_for_1khz_at_16mhz() {
        assert_eq!(reload_value(16_000_000, 1000), Ok(15_999));
    }

    #[test]
    fn test_reload_truncates_uneven_rates() {
        // 16 MHz / 7 Hz = 2_285_714.28...
        assert_eq!(reload_value(16_000_000, 7), Ok(2_285_713));
    }

    #[test]
    fn test_reload_rejects_zero_rate() {
        assert_eq!(reload_value(16_000_000, 0), Err(TimerError::ZeroTickRate));
    }

    #[test]
    fn test_reload_rejects_rate_above_clock() {
        assert_eq!(reload_value(1000, 2000), Err(TimerError::TickRateTooHigh));
    }

    #[test]
    fn test_reload_rejects_24bit_overflow() {
        // 1 Hz at 16 MHz still fits, 1 Hz at 48 MHz does not.
        assert_eq!(reload_value(16_000_000, 1), Ok(15_999_999));
        assert_eq!(reload_value(48_000_000, 1), Err(TimerError::ReloadTooLarge));
    }
}
