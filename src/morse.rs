//! Static Morse alphabet table and code buffers.
//!
//! Pure lookup, no state. The only nondeterminism in the whole core is
//! target-letter selection, isolated behind [`LetterSource`] so tests and
//! the demo binary can feed a fixed sequence.

use rand::{rngs::SmallRng, Rng, RngCore, SeedableRng};

/// Number of letters in the table (A–Z).
pub const LETTER_COUNT: usize = 26;

/// Longest code in the table, in marks.
pub const MAX_CODE_LEN: usize = 4;

/// Input buffer capacity in marks.
///
/// Twice the longest code: in test mode nothing resolves the buffer until
/// the submit line fires, so leave headroom for over-long attempts. A
/// saturated buffer can never equal a table code, which is the point.
pub const INPUT_CAPACITY: usize = 2 * MAX_CODE_LEN;

/// ITU codes for A–Z, indexed by `letter - b'A'`.
const CODES: [&str; LETTER_COUNT] = [
    ".-",   // A
    "-...", // B
    "-.-.", // C
    "-..",  // D
    ".",    // E
    "..-.", // F
    "--.",  // G
    "....", // H
    "..",   // I
    ".---", // J
    "-.-",  // K
    ".-..", // L
    "--",   // M
    "-.",   // N
    "---",  // O
    ".--.", // P
    "--.-", // Q
    ".-.",  // R
    "...",  // S
    "-",    // T
    "..-",  // U
    "...-", // V
    ".--",  // W
    "-..-", // X
    "-.--", // Y
    "--..", // Z
];

/// Code string for an ASCII letter.
///
/// Total over `b'A'..=b'Z'` (case-folded). Anything else gets the empty
/// sentinel code, never a panic.
pub fn code_for(letter: u8) -> &'static str {
    let upper = letter.to_ascii_uppercase();
    match upper {
        b'A'..=b'Z' => CODES[(upper - b'A') as usize],
        _ => "",
    }
}

/// Reverse lookup: the letter whose code is exactly `code`.
pub fn letter_for(code: &str) -> Option<u8> {
    CODES
        .iter()
        .position(|&c| c == code)
        .map(|idx| b'A' + idx as u8)
}

/// Source of target letters for the session.
///
/// The session never calls an RNG directly; it asks its `LetterSource`.
pub trait LetterSource {
    /// Next target letter, ASCII uppercase.
    fn next_letter(&mut self) -> u8;
}

/// Uniformly random letters from any [`RngCore`].
pub struct RandomLetters<R: RngCore> {
    rng: R,
}

impl<R: RngCore> RandomLetters<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomLetters<SmallRng> {
    /// Convenience constructor for a reproducible run.
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> LetterSource for RandomLetters<R> {
    fn next_letter(&mut self) -> u8 {
        b'A' + self.rng.gen_range(0..LETTER_COUNT as u8)
    }
}

/// Fixed letter sequence, wrapping around at the end.
///
/// Used by tests and by scripted demo runs where the target order must be
/// known up front.
pub struct ScriptedLetters<'a> {
    letters: &'a [u8],
    next: usize,
}

impl<'a> ScriptedLetters<'a> {
    /// `letters` must be non-empty ASCII letters.
    pub fn new(letters: &'a [u8]) -> Self {
        Self { letters, next: 0 }
    }
}

impl<'a> LetterSource for ScriptedLetters<'a> {
    fn next_letter(&mut self) -> u8 {
        let letter = self.letters[self.next % self.letters.len()];
        self.next += 1;
        letter.to_ascii_uppercase()
    }
}

/// Fixed-capacity buffer of dot/dash marks.
///
/// Holds the accumulated input of the current round, and code snapshots
/// inside feedback events. Plain `Copy` data so it can live in ring-buffer
/// slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodeBuf {
    bytes: [u8; INPUT_CAPACITY],
    len: u8,
}

impl CodeBuf {
    /// The empty buffer.
    pub const EMPTY: Self = Self {
        bytes: [0; INPUT_CAPACITY],
        len: 0,
    };

    /// Snapshot of a code string, truncated at capacity.
    pub fn from_code(code: &str) -> Self {
        let mut buf = Self::EMPTY;
        for &b in code.as_bytes().iter().take(INPUT_CAPACITY) {
            buf.bytes[buf.len as usize] = b;
            buf.len += 1;
        }
        buf
    }

    /// Append one mark (`b'.'` or `b'-'`).
    ///
    /// Returns `false` if the buffer is saturated; the mark is dropped and
    /// the buffer is left unchanged.
    pub fn push(&mut self, mark: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.bytes[self.len as usize] = mark;
        self.len += 1;
        true
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len as usize == INPUT_CAPACITY
    }

    /// Buffer contents as a `.`/`-` string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII marks are ever pushed
        core::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }

    /// Exact string equality against a code.
    pub fn matches(&self, code: &str) -> bool {
        self.as_str() == code
    }
}

impl Default for CodeBuf {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl core::fmt::Display for CodeBuf {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
