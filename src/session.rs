//! Practice session finite state machine.
//!
//! Pure logic, no hardware dependencies. Consumes one classified
//! [`Symbol`] plus the externally supplied [`Mode`] and submit edge per
//! poll, owns the target letter and input buffer, and publishes
//! [`FeedbackEvent`]s for the presentation layer. Fully testable on host.
//!
//! # Modes
//!
//! - **Learn**: the target code is shown; the round resolves by itself
//!   the moment the input reaches the target's length.
//! - **Test**: the code is hidden; only the submit line resolves the
//!   round, and a running score is kept.
//!
//! Rule precedence within one poll: mode change, then round draw, then
//! symbol handling. Earlier rules short-circuit later ones, so a mode
//! flip always discards whatever the key did in the same poll.

use crate::event::{FeedbackEvent, Mode, Outcome, Symbol};
use crate::fault::{FaultCode, FaultState};
use crate::feedback::FeedbackStream;
use crate::morse::{self, CodeBuf, LetterSource};

/// Bound on target re-draws after an invalid-letter fault.
/// Unreachable with a sane letter source; keeps the poll loop finite.
const DRAW_ATTEMPTS: usize = 8;

/// Round state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RoundState {
    /// No mode selected; nothing to practice.
    Idle,
    /// Target drawn, accumulating input.
    AwaitingInput,
    /// Round finished; a fresh target is drawn on the next poll.
    Resolved,
}

/// Trainer session processor.
///
/// # Example
///
/// ```
/// use morse_trainer::event::{Mode, Outcome, Symbol};
/// use morse_trainer::fault::FaultState;
/// use morse_trainer::feedback::FeedbackStream;
/// use morse_trainer::morse::ScriptedLetters;
/// use morse_trainer::session::TrainingSession;
///
/// let fault = FaultState::new();
/// let stream = FeedbackStream::<16>::new();
/// let mut session = TrainingSession::new(ScriptedLetters::new(b"E"), &fault);
///
/// // Entering a mode draws the first target
/// assert_eq!(session.poll(Mode::Learn, Symbol::None, false, &stream), Outcome::ModeChanged);
/// // E is a single dot: one dot resolves the round
/// assert_eq!(session.poll(Mode::Learn, Symbol::Dot, false, &stream), Outcome::Correct);
/// ```
pub struct TrainingSession<'a, L: LetterSource> {
    letters: L,
    fault: &'a FaultState,

    state: RoundState,
    /// Mode seen at the previous poll; a differing signal is rule 1.
    mode: Mode,

    target_letter: u8,
    target_code: &'static str,
    input: CodeBuf,
    score: u32,
}

impl<'a, L: LetterSource> TrainingSession<'a, L> {
    /// Create an idle session (no mode selected).
    pub fn new(letters: L, fault: &'a FaultState) -> Self {
        Self {
            letters,
            fault,
            state: RoundState::Idle,
            mode: Mode::None,
            target_letter: 0,
            target_code: "",
            input: CodeBuf::EMPTY,
            score: 0,
        }
    }

    /// Drive the state machine one poll.
    ///
    /// * `mode` - externally supplied mode signal, sampled this poll
    /// * `symbol` - classifier output for this poll
    /// * `submit` - rising edge of the submit line (test mode only)
    ///
    /// Feedback events for anything that happened are pushed to `feedback`;
    /// the returned [`Outcome`] summarizes the poll (`InProgress` when
    /// nothing notable occurred).
    pub fn poll<const N: usize>(
        &mut self,
        mode: Mode,
        symbol: Symbol,
        submit: bool,
        feedback: &FeedbackStream<N>,
    ) -> Outcome {
        // Rule 1: mode change cancels the round, symbol and all
        if mode != self.mode {
            self.mode = mode;
            self.input.clear();
            self.score = 0;
            self.target_letter = 0;
            self.target_code = "";
            self.emit(feedback, Outcome::ModeChanged);

            if mode == Mode::None {
                self.state = RoundState::Idle;
            } else {
                self.begin_round(feedback);
            }
            return Outcome::ModeChanged;
        }

        if self.mode == Mode::None {
            return Outcome::InProgress;
        }

        // Rule 2: a resolved (or never-started) round draws its target
        // before any input is looked at
        if self.state != RoundState::AwaitingInput {
            return self.begin_round(feedback);
        }

        match symbol {
            // Rule 3: noise and quiet polls leave the round untouched
            Symbol::None | Symbol::Debounce => {}

            // Rule 4: an over-long press restarts the attempt, same target
            Symbol::Refresh => {
                self.input.clear();
                self.emit(feedback, Outcome::InputCleared);
                return Outcome::InputCleared;
            }

            // Rule 5: a mark lands in the buffer
            Symbol::Dot | Symbol::Dash => {
                if let Some(mark) = symbol.mark() {
                    // A saturated buffer drops the mark; the attempt is
                    // already unmatchable at that length
                    let _ = self.input.push(mark);
                }
                self.emit(feedback, Outcome::SymbolAccepted);

                // Learn resolves on its own at full target length;
                // shorter input keeps waiting even on a dead-end prefix
                if self.mode == Mode::Learn && self.input.len() == self.target_code.len() {
                    return self.resolve(feedback);
                }

                if !(self.mode == Mode::Test && submit) {
                    return Outcome::SymbolAccepted;
                }
                // fall through: mark and submit in the same poll
            }
        }

        // Test mode resolves only on the submit edge
        if self.mode == Mode::Test && submit {
            return self.resolve(feedback);
        }

        Outcome::InProgress
    }

    /// Mode seen at the last poll.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Running test-mode score.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Current target letter; 0 while idle.
    pub fn target_letter(&self) -> u8 {
        self.target_letter
    }

    /// Current target code; empty while idle.
    pub fn target_code(&self) -> &'static str {
        self.target_code
    }

    /// Input accumulated so far this round.
    pub fn input(&self) -> &CodeBuf {
        &self.input
    }

    /// True while a target is drawn and accepting input.
    pub fn is_round_active(&self) -> bool {
        self.state == RoundState::AwaitingInput
    }

    // --- Private methods ---

    /// Draw a fresh target and announce it.
    ///
    /// A letter without a table code raises [`FaultCode::InvalidLetter`]
    /// and the draw is retried; the session never runs a round against an
    /// empty code (every input would trivially "match").
    fn begin_round<const N: usize>(&mut self, feedback: &FeedbackStream<N>) -> Outcome {
        for _ in 0..DRAW_ATTEMPTS {
            let letter = self.letters.next_letter();
            let code = morse::code_for(letter);
            if code.is_empty() {
                // Letter source invariant broken; record it and re-draw
                self.fault.raise(FaultCode::InvalidLetter, letter as u32);
                continue;
            }

            self.target_letter = letter;
            self.target_code = code;
            self.input.clear();
            self.state = RoundState::AwaitingInput;
            self.emit(feedback, Outcome::LetterShown);
            return Outcome::LetterShown;
        }

        // Letter source is broken; stay resolved and retry next poll
        self.state = RoundState::Resolved;
        Outcome::InProgress
    }

    /// Compare input against the target and close the round.
    fn resolve<const N: usize>(&mut self, feedback: &FeedbackStream<N>) -> Outcome {
        let correct = self.input.matches(self.target_code);

        if self.mode == Mode::Test {
            if correct {
                self.score += 1;
            } else {
                self.score = 0;
            }
        }

        self.input.clear();
        self.state = RoundState::Resolved;

        let outcome = if correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        self.emit(feedback, outcome);
        outcome
    }

    fn emit<const N: usize>(&self, feedback: &FeedbackStream<N>, kind: Outcome) {
        let shown_code = if self.mode == Mode::Learn {
            CodeBuf::from_code(self.target_code)
        } else {
            // Test mode never reveals the code
            CodeBuf::EMPTY
        };

        feedback.push(FeedbackEvent {
            kind,
            mode: self.mode,
            letter: self.target_letter,
            shown_code,
            input: self.input,
            score: self.score,
        });
    }
}
