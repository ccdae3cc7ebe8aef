//! Module: config
//!
//! Purpose: press-timing calibration for the classifier.
//!
//! The three thresholds are calibration knobs, not constants: a loaded
//! calibration file or a runtime `set_calibration` retunes the classifier
//! without a code change. Validation happens here, at configuration time;
//! the classifier itself never re-checks ordering on the hot path.

use serde::{Deserialize, Serialize};

/// Press-duration thresholds, in milliseconds of monotonic time.
///
/// Classification of a press of duration `d`:
///
/// ```text
///             d < debounce_ms  → Debounce (noise, ignored)
/// debounce_ms ≤ d < dash_ms    → Dot
///    dash_ms  ≤ d ≤ refresh_ms → Dash
///             d > refresh_ms   → Refresh (abandon current input)
/// ```
///
/// `0 < debounce_ms < dash_ms < refresh_ms` must hold; [`Calibration::validate`]
/// rejects anything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Presses shorter than this are electrical noise.
    pub debounce_ms: i64,
    /// Presses at least this long are dashes.
    pub dash_ms: i64,
    /// Presses longer than this abandon the input attempt.
    pub refresh_ms: i64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            dash_ms: 200,
            refresh_ms: 1000,
        }
    }
}

impl Calibration {
    pub const fn new(debounce_ms: i64, dash_ms: i64, refresh_ms: i64) -> Self {
        Self {
            debounce_ms,
            dash_ms,
            refresh_ms,
        }
    }

    /// Check threshold ordering.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.debounce_ms <= 0 {
            return Err(CalibrationError::NonPositiveThreshold);
        }
        if self.debounce_ms >= self.dash_ms {
            return Err(CalibrationError::DebounceNotBelowDash);
        }
        if self.dash_ms >= self.refresh_ms {
            return Err(CalibrationError::DashNotBelowRefresh);
        }
        Ok(())
    }
}

/// Calibration rejection with code and message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// C01: a threshold is zero or negative
    NonPositiveThreshold,
    /// C02: debounce threshold not strictly below dash threshold
    DebounceNotBelowDash,
    /// C03: dash threshold not strictly below refresh threshold
    DashNotBelowRefresh,
}

impl CalibrationError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::NonPositiveThreshold => "C01",
            Self::DebounceNotBelowDash => "C02",
            Self::DashNotBelowRefresh => "C03",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::NonPositiveThreshold => "threshold must be positive",
            Self::DebounceNotBelowDash => "debounce threshold must be below dash threshold",
            Self::DashNotBelowRefresh => "dash threshold must be below refresh threshold",
        }
    }
}

impl core::fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Calibration::default().validate().is_ok());
    }

    #[test]
    fn test_tuned_ranges_are_valid() {
        // The knobs people actually turn: slow dash, long refresh
        assert!(Calibration::new(50, 700, 4000).validate().is_ok());
        assert!(Calibration::new(20, 250, 1500).validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive() {
        let err = Calibration::new(0, 200, 1000).validate().unwrap_err();
        assert_eq!(err, CalibrationError::NonPositiveThreshold);
        assert_eq!(err.code(), "C01");
    }

    #[test]
    fn test_rejects_debounce_at_or_above_dash() {
        assert_eq!(
            Calibration::new(200, 200, 1000).validate().unwrap_err(),
            CalibrationError::DebounceNotBelowDash
        );
        assert_eq!(
            Calibration::new(300, 200, 1000).validate().unwrap_err(),
            CalibrationError::DebounceNotBelowDash
        );
    }

    #[test]
    fn test_rejects_dash_at_or_above_refresh() {
        assert_eq!(
            Calibration::new(50, 1000, 1000).validate().unwrap_err(),
            CalibrationError::DashNotBelowRefresh
        );
    }

    #[test]
    fn test_error_display() {
        let text = format!("{}", CalibrationError::DebounceNotBelowDash);
        assert!(text.starts_with("C02:"));
    }
}
