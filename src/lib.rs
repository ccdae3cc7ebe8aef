//! # MorseTrainer
//!
//! Single-key Morse code trainer core.
//!
//! ## Architecture
//!
//! Two leaf components feed one driver, all pure logic:
//! - [`classify::PressClassifier`] turns key-line edges plus a monotonic
//!   clock into [`event::Symbol`]s. Knows nothing about Morse.
//! - [`morse`] is the static alphabet table plus the letter source seam.
//! - [`session::TrainingSession`] owns the round: target letter, input
//!   buffer, mode transitions, scoring.
//!
//! Presentation is isolated behind the [`feedback::FeedbackStream`]:
//! the poll loop pushes events, a display drains them. No callbacks,
//! no shared state, no blocking anywhere on the poll path.

#![cfg_attr(not(test), no_std)]

pub mod classify;
pub mod config;
pub mod event;
pub mod fault;
pub mod feedback;
pub mod logging;
pub mod morse;
pub mod session;

pub use classify::{EdgeDetector, PressClassifier};
pub use config::{Calibration, CalibrationError};
pub use event::{FeedbackEvent, Mode, Outcome, Symbol};
pub use fault::{FaultCode, FaultState};
pub use feedback::{FeedbackConsumer, FeedbackStream};
pub use morse::{CodeBuf, LetterSource, RandomLetters, ScriptedLetters};
pub use session::TrainingSession;
