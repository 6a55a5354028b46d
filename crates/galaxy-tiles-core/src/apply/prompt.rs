//! Interactive confirmation before the shell configuration is touched.

use std::io::BufRead;
use tracing::warn;

/// Asks the user whether to continue.
pub trait Confirmation {
    /// Show `warning` and return true on an affirmative answer.
    fn confirm(&mut self, warning: &str) -> bool;
}

/// Whether a typed answer means yes.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Reads the answer from a line-based reader, stdin by default.
pub struct StdinConfirmation<R = std::io::StdinLock<'static>> {
    reader: R,
}

impl StdinConfirmation {
    pub fn new() -> Self {
        Self {
            reader: std::io::stdin().lock(),
        }
    }
}

impl Default for StdinConfirmation {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead> StdinConfirmation<R> {
    pub fn with_reader(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> Confirmation for StdinConfirmation<R> {
    fn confirm(&mut self, warning: &str) -> bool {
        warn!("{}\nDo you want to proceed? [yN]", warning);

        let mut answer = String::new();
        match self.reader.read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            // An unreadable answer is a no.
            Err(_) => false,
        }
    }
}
