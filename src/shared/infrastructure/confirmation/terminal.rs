// Asks on a terminal. Anything but an explicit yes, including a closed input, is a no.

use crate::shared::infrastructure::confirmation::Confirm;
use std::io::{BufRead, BufReader, Stderr, Stdin, Write};
use std::sync::Mutex;

pub struct TerminalConfirm<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl TerminalConfirm<BufReader<Stdin>, Stderr> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }

    fn ask(&self, prompt: &str) -> std::io::Result<String> {
        if let Ok(mut output) = self.output.lock() {
            write!(output, "{prompt} [y/N] ")?;
            output.flush()?;
        }
        let mut answer = String::new();
        if let Ok(mut input) = self.input.lock() {
            input.read_line(&mut answer)?;
        }
        Ok(answer)
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

impl<R: BufRead + Send, W: Write + Send> Confirm for TerminalConfirm<R, W> {
    fn confirm(&self, prompt: &str) -> bool {
        match self.ask(prompt) {
            Ok(answer) => is_yes(&answer),
            Err(error) => {
                tracing::warn!(%error, "could not read confirmation, treating it as a no");
                false
            }
        }
    }
}
