//! Host simulation for the trainer core.
//!
//! Runs the same poll loop the firmware would run — classifier, session,
//! feedback stream, log ring — with a scripted key in place of a physical
//! button. The simulated operator reads `LetterShown` events and keys the
//! answer back, perfectly in learn mode and with one deliberate mistake
//! in test mode, so every transition of the core gets exercised.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;

use morse_trainer::{
    morse, trainer_info, Calibration, EdgeDetector, FaultState, FeedbackConsumer, FeedbackEvent,
    FeedbackStream, Mode, Outcome, PressClassifier, RandomLetters, TrainingSession,
};
use morse_trainer::logging::LogRing;

/// Feedback ring capacity for the simulation.
const FEEDBACK_CAPACITY: usize = 64;

/// Gap between simulated key actions, well clear of any threshold.
const GAP_MS: i64 = 150;

#[derive(Parser)]
#[command(name = "trainer", about = "Simulated Morse practice session")]
struct Args {
    /// Seed for the target-letter sequence
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// JSON calibration file overriding the default thresholds
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Rounds to play in each mode
    #[arg(long, default_value_t = 3)]
    rounds: u32,

    /// Print per-poll diagnostics from the log ring
    #[arg(long)]
    verbose: bool,
}

/// Simulated operator driving one poll loop.
struct Sim<'a> {
    now_ms: i64,
    mode: Mode,
    classifier: PressClassifier,
    submit: EdgeDetector,
    session: TrainingSession<'a, RandomLetters<rand::rngs::SmallRng>>,
    feedback: &'a FeedbackStream<FEEDBACK_CAPACITY>,
    consumer: FeedbackConsumer<'a, FEEDBACK_CAPACITY>,
    log: &'a LogRing,

    /// Press durations derived from the active calibration.
    dot_press_ms: i64,
    dash_press_ms: i64,
    refresh_press_ms: i64,

    /// Current target, learned from `LetterShown` events.
    target_code: Option<String>,
}

impl<'a> Sim<'a> {
    /// One iteration of the poll loop.
    fn poll(&mut self, key_level: bool, submit_level: bool) {
        let symbol = self.classifier.poll(self.now_ms, key_level);
        let submit = self.submit.poll(submit_level);
        self.session.poll(self.mode, symbol, submit, self.feedback);
        self.pump();
    }

    /// Let time pass with the key up.
    fn idle(&mut self) {
        self.now_ms += GAP_MS;
        self.poll(false, false);
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        trainer_info!(self.log, self.now_ms, "mode signal -> {:?}", mode);
        self.idle();
    }

    /// Hold the key down for `duration_ms`, then release.
    fn press_key(&mut self, duration_ms: i64) {
        self.now_ms += GAP_MS;
        self.poll(true, false);
        self.now_ms += duration_ms;
        self.poll(false, false);
    }

    /// Key a whole code string.
    fn key_code(&mut self, code: &str) {
        for mark in code.bytes() {
            match mark {
                b'.' => self.press_key(self.dot_press_ms),
                _ => self.press_key(self.dash_press_ms),
            }
        }
    }

    /// Tap the submit line.
    fn press_submit(&mut self) {
        self.now_ms += GAP_MS;
        self.poll(false, true);
        self.poll(false, false);
    }

    /// Render pending feedback events and track the current target.
    fn pump(&mut self) {
        let events: Vec<FeedbackEvent> = self.consumer.drain().collect();
        for event in events {
            if event.kind == Outcome::LetterShown {
                self.target_code = Some(if event.shown_code.is_empty() {
                    morse::code_for(event.letter).to_string()
                } else {
                    event.shown_code.as_str().to_string()
                });
            }
            render(self.now_ms, &event);
        }
    }

    /// Print buffered diagnostics.
    fn drain_log(&mut self, verbose: bool) {
        while let Some(entry) = self.log.drain() {
            if verbose || entry.level <= morse_trainer::logging::LogLevel::Info {
                println!(
                    "    [{:>6} ms] {:5} {}",
                    entry.timestamp_ms,
                    entry.level.as_str(),
                    entry.text()
                );
            }
        }
    }
}

fn render(now_ms: i64, event: &FeedbackEvent) {
    let letter = if event.letter == 0 {
        '-'
    } else {
        event.letter as char
    };

    let label = match event.kind {
        Outcome::LetterShown => {
            if event.shown_code.is_empty() {
                format!("target {letter} (code hidden)")
            } else {
                format!("target {letter} (code {})", event.shown_code)
            }
        }
        Outcome::SymbolAccepted => format!("input \"{}\"", event.input),
        Outcome::InputCleared => "input cleared".to_string(),
        Outcome::Correct => format!("CORRECT   score {}", event.score),
        Outcome::Incorrect => format!("INCORRECT score {}", event.score),
        Outcome::ModeChanged => format!("mode changed -> {:?}", event.mode),
        Outcome::InProgress => return,
    };

    println!("[{now_ms:>6} ms] {label}");
}

fn load_calibration(args: &Args) -> Result<Calibration, Box<dyn Error>> {
    let calibration = match &args.calibration {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            serde_json::from_str(&text)?
        }
        None => Calibration::default(),
    };
    calibration
        .validate()
        .map_err(|e| format!("calibration rejected: {e}"))?;
    Ok(calibration)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let calibration = load_calibration(&args)?;
    let classifier =
        PressClassifier::new(calibration).map_err(|e| format!("calibration rejected: {e}"))?;

    let feedback: FeedbackStream<FEEDBACK_CAPACITY> = FeedbackStream::new();
    let fault = FaultState::new();
    let log: LogRing = LogRing::new();

    let mut sim = Sim {
        now_ms: 0,
        mode: Mode::None,
        classifier,
        submit: EdgeDetector::new(),
        session: TrainingSession::new(RandomLetters::seeded(args.seed), &fault),
        feedback: &feedback,
        consumer: FeedbackConsumer::new(&feedback, &fault),
        log: &log,
        dot_press_ms: (calibration.debounce_ms + calibration.dash_ms) / 2,
        dash_press_ms: (calibration.dash_ms + calibration.refresh_ms) / 2,
        refresh_press_ms: calibration.refresh_ms + calibration.refresh_ms / 2,
        target_code: None,
    };

    println!(
        "calibration: debounce {} ms / dash {} ms / refresh {} ms",
        calibration.debounce_ms, calibration.dash_ms, calibration.refresh_ms
    );

    // --- Learn phase: the operator copies the displayed code ---
    println!("\n== learn ==");
    sim.set_mode(Mode::Learn);
    for _ in 0..args.rounds {
        let code = sim.target_code.clone().ok_or("no target displayed")?;
        sim.key_code(&code);
        sim.idle(); // draw the next round
    }

    // A stray mark, abandoned with an over-long press, then the real answer.
    // Skipped for one-mark targets, where any mark already resolves.
    let code = sim.target_code.clone().ok_or("no target displayed")?;
    if code.len() > 1 {
        sim.press_key(sim.dash_press_ms);
        sim.press_key(sim.refresh_press_ms);
    }
    sim.key_code(&code);
    sim.idle();
    sim.drain_log(args.verbose);

    // --- Test phase: hidden code, explicit submit, one planted mistake ---
    println!("\n== test ==");
    sim.press_key(sim.dot_press_ms); // start a round, then abandon it by switching modes
    sim.set_mode(Mode::Test);
    for round in 0..args.rounds {
        let code = sim.target_code.clone().ok_or("no target displayed")?;
        if round == 1 {
            sim.key_code(&flip_first_mark(&code));
        } else {
            sim.key_code(&code);
        }
        sim.press_submit();
        sim.idle();
    }
    sim.drain_log(args.verbose);

    println!("\nfinal score: {}", sim.session.score());
    if fault.is_raised() {
        println!("fault raised: {:?} (count {})", fault.code(), fault.count());
    }

    Ok(())
}

/// Turn a correct answer into a wrong one of the same length.
fn flip_first_mark(code: &str) -> String {
    let mut bytes = code.as_bytes().to_vec();
    if let Some(first) = bytes.first_mut() {
        *first = if *first == b'.' { b'-' } else { b'.' };
    }
    String::from_utf8(bytes).unwrap_or_default()
}
