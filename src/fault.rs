//! Fault state for invariant violations.
//!
//! Nothing in this core is fatal to the poll loop: a raised fault records
//! that an invariant broke, diagnostics report it, and polling continues.
//! A trainer that mislabels an answer is broken; a trainer that wedges on
//! a diagnostic is worse.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Why a fault was raised.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// No fault (normal operation).
    None = 0,

    /// The letter source produced a letter with no table code.
    /// Should be unreachable; the session re-draws instead of running a
    /// round with an empty target.
    InvalidLetter = 1,

    /// The presentation consumer fell a full ring behind and skipped
    /// feedback events.
    FeedbackOverrun = 2,
}

impl FaultCode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => FaultCode::InvalidLetter,
            2 => FaultCode::FeedbackOverrun,
            _ => FaultCode::None,
        }
    }
}

/// Thread-safe sticky fault flag.
///
/// Raised from the poll loop or the presentation consumer, read by
/// diagnostics. Sticky until cleared; the total count survives clears.
pub struct FaultState {
    raised: AtomicBool,
    code: AtomicU8,
    /// Code-specific detail: the offending letter, or events skipped.
    data: AtomicU32,
    /// Faults since power-on, never reset.
    count: AtomicU32,
}

impl FaultState {
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
            code: AtomicU8::new(0),
            data: AtomicU32::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// Raise a fault with code-specific detail data.
    #[inline]
    pub fn raise(&self, code: FaultCode, data: u32) {
        self.code.store(code as u8, Ordering::Release);
        self.data.store(data, Ordering::Release);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.raised.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Last raised code; meaningful only while `is_raised()`.
    #[inline]
    pub fn code(&self) -> FaultCode {
        FaultCode::from_u8(self.code.load(Ordering::Acquire))
    }

    /// Detail of the last fault (meaning depends on the code).
    #[inline]
    pub fn data(&self) -> u32 {
        self.data.load(Ordering::Acquire)
    }

    /// Total faults since power-on.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Acknowledge the fault. The count is preserved for diagnostics.
    #[inline]
    pub fn clear(&self) {
        self.raised.store(false, Ordering::Release);
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_and_clear() {
        let fault = FaultState::new();
        assert!(!fault.is_raised());
        assert_eq!(fault.code(), FaultCode::None);

        fault.raise(FaultCode::InvalidLetter, b'?' as u32);
        assert!(fault.is_raised());
        assert_eq!(fault.code(), FaultCode::InvalidLetter);
        assert_eq!(fault.data(), b'?' as u32);
        assert_eq!(fault.count(), 1);

        fault.clear();
        assert!(!fault.is_raised());
        assert_eq!(fault.count(), 1);
    }

    #[test]
    fn test_count_accumulates_across_clears() {
        let fault = FaultState::new();
        fault.raise(FaultCode::FeedbackOverrun, 10);
        fault.clear();
        fault.raise(FaultCode::InvalidLetter, 1);
        fault.clear();
        fault.raise(FaultCode::FeedbackOverrun, 2);
        assert_eq!(fault.count(), 3);
        assert_eq!(fault.code(), FaultCode::FeedbackOverrun);
    }

    #[test]
    fn test_code_round_trip() {
        for code in [
            FaultCode::None,
            FaultCode::InvalidLetter,
            FaultCode::FeedbackOverrun,
        ] {
            assert_eq!(FaultCode::from_u8(code as u8), code);
        }
        assert_eq!(FaultCode::from_u8(200), FaultCode::None);
    }
}
