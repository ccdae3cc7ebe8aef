//! Press-timing signal classifier.
//!
//! Pure logic, no hardware dependencies. Consumes the sampled level of the
//! key line plus a monotonic clock, produces at most one [`Symbol`] per
//! poll. Fully testable on host.
//!
//! The classifier knows nothing about Morse semantics: it only measures
//! how long the line was held high and buckets that duration against the
//! calibrated thresholds. Polling may happen at any cadence — every
//! decision is made from absolute timestamps, never from tick counts.

use crate::config::{Calibration, CalibrationError};
use crate::event::Symbol;

/// Press-duration classifier for the key input line.
///
/// # Example
///
/// ```
/// use morse_trainer::classify::PressClassifier;
/// use morse_trainer::config::Calibration;
/// use morse_trainer::event::Symbol;
///
/// let mut classifier = PressClassifier::new(Calibration::default()).unwrap();
///
/// assert_eq!(classifier.poll(0, false), Symbol::None);  // seed
/// assert_eq!(classifier.poll(10, true), Symbol::None);  // press start
/// assert_eq!(classifier.poll(70, false), Symbol::Dot);  // 60 ms press
/// ```
pub struct PressClassifier {
    calibration: Calibration,

    /// Level seen at the previous poll; `None` until the first sample
    /// seeds it, so a line that idles high at power-on is not mistaken
    /// for a press in progress.
    last_level: Option<bool>,

    /// Timestamp of the rising edge of the current press.
    /// Meaningful only between a rising edge and its paired release.
    press_start_ms: Option<i64>,
}

impl PressClassifier {
    /// Create a classifier with validated thresholds.
    pub fn new(calibration: Calibration) -> Result<Self, CalibrationError> {
        calibration.validate()?;
        Ok(Self {
            calibration,
            last_level: None,
            press_start_ms: None,
        })
    }

    /// Swap in new thresholds at runtime.
    ///
    /// Rejected calibrations leave the current thresholds in force.
    pub fn set_calibration(&mut self, calibration: Calibration) -> Result<(), CalibrationError> {
        calibration.validate()?;
        self.calibration = calibration;
        Ok(())
    }

    /// Current thresholds.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// True between a rising edge and its release.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.press_start_ms.is_some()
    }

    /// Sample the line once.
    ///
    /// Returns exactly one [`Symbol`]; `Symbol::None` when no release edge
    /// occurred this poll. A press is classified at its release edge from
    /// `now_ms - press_start_ms`.
    #[inline]
    pub fn poll(&mut self, now_ms: i64, level: bool) -> Symbol {
        let last = match self.last_level {
            // First real sample seeds the edge detector
            None => {
                self.last_level = Some(level);
                return Symbol::None;
            }
            Some(last) => last,
        };

        if level == last {
            return Symbol::None;
        }
        self.last_level = Some(level);

        if level {
            // Rising edge: press begins, not yet classifiable
            self.press_start_ms = Some(now_ms);
            return Symbol::None;
        }

        // Falling edge: classify the completed press
        match self.press_start_ms.take() {
            Some(start_ms) => self.classify(now_ms - start_ms),
            // Release without a recorded press (line was high at seed time)
            None => Symbol::None,
        }
    }

    /// Forget edge history and any press in progress.
    pub fn reset(&mut self) {
        self.last_level = None;
        self.press_start_ms = None;
    }

    fn classify(&self, duration_ms: i64) -> Symbol {
        let c = &self.calibration;
        if duration_ms > c.refresh_ms {
            Symbol::Refresh
        } else if duration_ms >= c.dash_ms {
            Symbol::Dash
        } else if duration_ms >= c.debounce_ms {
            Symbol::Dot
        } else {
            Symbol::Debounce
        }
    }
}

/// Edge detector for the submit line.
///
/// The submit action is edge-triggered: holding the line high fires once.
/// Seeds from the first sample exactly like the classifier, so a line that
/// powers up high does not produce a phantom submit.
#[derive(Default)]
pub struct EdgeDetector {
    last_level: Option<bool>,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample the line; true exactly on a low→high transition.
    #[inline]
    pub fn poll(&mut self, level: bool) -> bool {
        let rising = match self.last_level {
            None => false,
            Some(last) => level && !last,
        };
        self.last_level = Some(level);
        rising
    }

    pub fn reset(&mut self) {
        self.last_level = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> PressClassifier {
        PressClassifier::new(Calibration::default()).unwrap()
    }

    fn press(c: &mut PressClassifier, start_ms: i64, duration_ms: i64) -> Symbol {
        assert_eq!(c.poll(start_ms, true), Symbol::None);
        c.poll(start_ms + duration_ms, false)
    }

    #[test]
    fn test_duration_buckets() {
        let mut c = classifier();
        c.poll(0, false); // seed

        assert_eq!(press(&mut c, 100, 10), Symbol::Debounce);
        assert_eq!(press(&mut c, 300, 60), Symbol::Dot);
        assert_eq!(press(&mut c, 600, 400), Symbol::Dash);
        assert_eq!(press(&mut c, 1500, 1500), Symbol::Refresh);
    }

    #[test]
    fn test_bucket_boundaries() {
        let mut c = classifier();
        c.poll(0, false);

        // debounce_ms is the first dot duration
        assert_eq!(press(&mut c, 100, 49), Symbol::Debounce);
        assert_eq!(press(&mut c, 300, 50), Symbol::Dot);
        // dash_ms is the first dash duration
        assert_eq!(press(&mut c, 600, 199), Symbol::Dot);
        assert_eq!(press(&mut c, 900, 200), Symbol::Dash);
        // refresh_ms is still a dash; one past is a refresh
        assert_eq!(press(&mut c, 1200, 1000), Symbol::Dash);
        assert_eq!(press(&mut c, 3000, 1001), Symbol::Refresh);
    }

    #[test]
    fn test_no_edge_is_none_and_idempotent() {
        let mut c = classifier();
        c.poll(0, false);
        for t in 1..50 {
            assert_eq!(c.poll(t * 7, false), Symbol::None);
        }
        assert!(!c.is_pressed());
    }

    #[test]
    fn test_press_in_progress_yields_none() {
        let mut c = classifier();
        c.poll(0, false);
        assert_eq!(c.poll(10, true), Symbol::None);
        // held high across several polls
        assert_eq!(c.poll(20, true), Symbol::None);
        assert_eq!(c.poll(90, true), Symbol::None);
        assert!(c.is_pressed());
        assert_eq!(c.poll(110, false), Symbol::Dot);
        assert!(!c.is_pressed());
    }

    #[test]
    fn test_non_uniform_polling() {
        let mut c = classifier();
        c.poll(0, false);
        // Sparse polls: only the absolute timestamps matter
        assert_eq!(c.poll(1_000_000, true), Symbol::None);
        assert_eq!(c.poll(1_000_300, false), Symbol::Dash);
    }

    #[test]
    fn test_line_high_at_power_on() {
        let mut c = classifier();
        // First sample seeds with the line already high
        assert_eq!(c.poll(0, true), Symbol::None);
        // The un-paired release is ignored, not classified
        assert_eq!(c.poll(500, false), Symbol::None);
        // Next full press classifies normally
        assert_eq!(press(&mut c, 600, 60), Symbol::Dot);
    }

    #[test]
    fn test_reset_forgets_press() {
        let mut c = classifier();
        c.poll(0, false);
        c.poll(10, true);
        c.reset();
        // Release after reset pairs with nothing
        assert_eq!(c.poll(400, false), Symbol::None);
    }

    #[test]
    fn test_recalibration_applies() {
        let mut c = classifier();
        c.poll(0, false);
        assert_eq!(press(&mut c, 100, 300), Symbol::Dash);

        c.set_calibration(Calibration::new(50, 700, 4000)).unwrap();
        assert_eq!(press(&mut c, 1000, 300), Symbol::Dot);
    }

    #[test]
    fn test_recalibration_rejects_bad_ordering() {
        let mut c = classifier();
        let before = *c.calibration();
        assert!(c.set_calibration(Calibration::new(500, 200, 1000)).is_err());
        assert_eq!(*c.calibration(), before);
    }

    #[test]
    fn test_edge_detector_rising_only() {
        let mut e = EdgeDetector::new();
        assert!(!e.poll(false)); // seed
        assert!(e.poll(true));
        assert!(!e.poll(true)); // held
        assert!(!e.poll(false));
        assert!(e.poll(true));
    }

    #[test]
    fn test_edge_detector_seeds_high() {
        let mut e = EdgeDetector::new();
        assert!(!e.poll(true)); // no phantom submit at power-on
        assert!(!e.poll(true));
        assert!(!e.poll(false));
        assert!(e.poll(true));
    }
}
