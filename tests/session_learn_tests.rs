//! Learn-mode session behavior, driven with pre-classified symbols.

use morse_trainer::{
    morse, FaultState, FeedbackStream, Mode, Outcome, ScriptedLetters, Symbol, TrainingSession,
};

const CAP: usize = 256;

fn symbols_for(code: &str) -> Vec<Symbol> {
    code.bytes()
        .map(|b| if b == b'.' { Symbol::Dot } else { Symbol::Dash })
        .collect()
}

#[test]
fn test_keying_the_exact_code_is_correct_for_every_letter() {
    // Round-trip property over the whole alphabet, one session
    let alphabet: Vec<u8> = (b'A'..=b'Z').collect();
    let stream = FeedbackStream::<CAP>::new();
    let fault = FaultState::new();
    let mut session = TrainingSession::new(ScriptedLetters::new(&alphabet), &fault);

    session.poll(Mode::Learn, Symbol::None, false, &stream);

    for letter in b'A'..=b'Z' {
        assert_eq!(session.target_letter(), letter);
        let marks = symbols_for(morse::code_for(letter));
        let (last, rest) = marks.split_last().unwrap();

        for &mark in rest {
            assert_eq!(
                session.poll(Mode::Learn, mark, false, &stream),
                Outcome::SymbolAccepted
            );
        }
        assert_eq!(
            session.poll(Mode::Learn, *last, false, &stream),
            Outcome::Correct,
            "letter {}",
            letter as char
        );
        assert!(session.input().is_empty());

        // Quiet poll draws the next target
        session.poll(Mode::Learn, Symbol::None, false, &stream);
    }

    assert!(!fault.is_raised());
}

#[test]
fn test_exactly_one_correct_event_per_round() {
    let stream = FeedbackStream::<CAP>::new();
    let fault = FaultState::new();
    let mut session = TrainingSession::new(ScriptedLetters::new(b"H"), &fault);
    session.poll(Mode::Learn, Symbol::None, false, &stream);

    for _ in 0..4 {
        session.poll(Mode::Learn, Symbol::Dot, false, &stream);
    }

    let corrects = (0..stream.write_head())
        .filter_map(|i| stream.read(i))
        .filter(|e| e.kind == Outcome::Correct)
        .count();
    assert_eq!(corrects, 1);
}

#[test]
fn test_length_equal_mismatch_resolves_incorrect() {
    let stream = FeedbackStream::<CAP>::new();
    let fault = FaultState::new();
    let mut session = TrainingSession::new(ScriptedLetters::new(b"A"), &fault);
    session.poll(Mode::Learn, Symbol::None, false, &stream);

    // "--" against ".-": resolution fires at length 2, not before
    assert_eq!(
        session.poll(Mode::Learn, Symbol::Dash, false, &stream),
        Outcome::SymbolAccepted
    );
    assert_eq!(
        session.poll(Mode::Learn, Symbol::Dash, false, &stream),
        Outcome::Incorrect
    );
    assert!(session.input().is_empty());
}

#[test]
fn test_refresh_restarts_the_attempt_without_penalty() {
    let stream = FeedbackStream::<CAP>::new();
    let fault = FaultState::new();
    let mut session = TrainingSession::new(ScriptedLetters::new(b"S"), &fault);
    session.poll(Mode::Learn, Symbol::None, false, &stream);

    // Wrong start, abandoned, then the real answer on the same target
    session.poll(Mode::Learn, Symbol::Dash, false, &stream);
    assert_eq!(
        session.poll(Mode::Learn, Symbol::Refresh, false, &stream),
        Outcome::InputCleared
    );
    assert_eq!(session.target_letter(), b'S');

    session.poll(Mode::Learn, Symbol::Dot, false, &stream);
    session.poll(Mode::Learn, Symbol::Dot, false, &stream);
    assert_eq!(
        session.poll(Mode::Learn, Symbol::Dot, false, &stream),
        Outcome::Correct
    );
}

#[test]
fn test_debounce_storm_changes_nothing() {
    let stream = FeedbackStream::<CAP>::new();
    let fault = FaultState::new();
    let mut session = TrainingSession::new(ScriptedLetters::new(b"S"), &fault);
    session.poll(Mode::Learn, Symbol::None, false, &stream);
    session.poll(Mode::Learn, Symbol::Dot, false, &stream);

    let head = stream.write_head();
    for _ in 0..100 {
        assert_eq!(
            session.poll(Mode::Learn, Symbol::Debounce, false, &stream),
            Outcome::InProgress
        );
    }
    assert_eq!(stream.write_head(), head);
    assert_eq!(session.input().as_str(), ".");
}

#[test]
fn test_mode_switch_mid_round_emits_single_mode_changed() {
    let stream = FeedbackStream::<CAP>::new();
    let fault = FaultState::new();
    let mut session = TrainingSession::new(ScriptedLetters::new(b"SO"), &fault);
    session.poll(Mode::Learn, Symbol::None, false, &stream);
    session.poll(Mode::Learn, Symbol::Dot, false, &stream);

    let head = stream.write_head();
    session.poll(Mode::Test, Symbol::None, false, &stream);

    let kinds: Vec<Outcome> = (head..stream.write_head())
        .filter_map(|i| stream.read(i))
        .map(|e| e.kind)
        .collect();

    assert_eq!(
        kinds.iter().filter(|&&k| k == Outcome::ModeChanged).count(),
        1
    );
    assert!(!kinds.contains(&Outcome::Correct));
    assert!(!kinds.contains(&Outcome::Incorrect));
    assert!(session.input().is_empty());
}
