//! Data-permission consent gate.
//!
//! Nothing that touches user data may run before the operator has accepted
//! the privacy notice. A successful prompt yields a [`Consented`] token, and
//! the bot and the function registry can only be built with one.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Title shown above the notice.
pub const CONSENT_TITLE: &str = "Data Permission and Privacy";

/// The privacy notice text.
pub const CONSENT_MESSAGE: &str = "We value your privacy. By using this application, you consent to the \
collection and use of your data as described in our privacy policy. Do you agree to proceed?";

/// Failure to present the prompt at all.
#[derive(Debug, Error)]
pub enum ConsentError {
    #[error("Consent prompt I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Proof that the operator accepted the privacy notice.
///
/// Only [`obtain`] can construct one outside this module.
#[derive(Debug, Clone, Copy)]
pub struct Consented {
    _private: (),
}

impl Consented {
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self { _private: () }
    }
}

/// A blocking yes/no prompt.
pub trait ConsentGate {
    /// Present the choice and block until it is answered.
    fn ask(&mut self) -> Result<bool, ConsentError>;
}

/// Ask the gate once. `None` means the operator declined.
pub fn obtain(gate: &mut dyn ConsentGate) -> Result<Option<Consented>, ConsentError> {
    if gate.ask()? {
        log::info!("User accepted consent. Proceeding with application.");
        Ok(Some(Consented { _private: () }))
    } else {
        log::info!("User declined consent. Exiting application.");
        Ok(None)
    }
}

/// Consent prompt rendered on a terminal (or any reader/writer pair).
pub struct TerminalConsent<R, W> {
    input: R,
    output: W,
}

impl TerminalConsent<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalConsent<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> ConsentGate for TerminalConsent<R, W> {
    fn ask(&mut self) -> Result<bool, ConsentError> {
        writeln!(self.output, "{}", CONSENT_TITLE)?;
        writeln!(self.output, "{}", CONSENT_MESSAGE)?;
        write!(self.output, "[Accept/Decline] > ")?;
        self.output.flush()?;

        let mut line = String::new();
        // EOF reads zero bytes and falls through as a decline.
        self.input.read_line(&mut line)?;
        Ok(is_affirmative(&line))
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "a" | "accept" | "y" | "yes"
    )
}
