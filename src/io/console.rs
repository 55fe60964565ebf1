//! Console backends
//!
//! A [`Console`] is the byte-level edge of the interpreter: it writes text and
//! hands back whole input lines. Everything above it (formatting, token-wise
//! input, buffer limits) lives in [`IoChannel`](super::IoChannel).
//!
//! - [`StdConsole`]: process stdin/stdout
//! - [`CapturedConsole`]: scripted input and captured output, for tests and
//!   embedding

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Line-oriented text console
pub trait Console {
    /// Write `text` exactly as given
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Next input line without its line terminator, or `None` at end of input
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Everything written so far, for consoles that keep it
    fn captured_output(&self) -> Option<&str> {
        None
    }
}

/// Console over the process's standard streams
#[derive(Debug, Default)]
pub struct StdConsole;

impl StdConsole {
    pub fn new() -> Self {
        StdConsole
    }
}

impl Console for StdConsole {
    fn write(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

/// Console with scripted input and in-memory output
#[derive(Debug, Clone, Default)]
pub struct CapturedConsole {
    input: VecDeque<String>,
    output: String,
}

impl CapturedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Console whose input is `input`, split into lines
    pub fn with_input(input: &str) -> Self {
        CapturedConsole {
            input: input.lines().map(str::to_string).collect(),
            output: String::new(),
        }
    }
}

impl Console for CapturedConsole {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }

    fn captured_output(&self) -> Option<&str> {
        Some(&self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_console_round_trip() {
        let mut console = CapturedConsole::with_input("first\nsecond\n");
        console.write("a\nb\n").unwrap();

        assert_eq!(console.read_line().unwrap().as_deref(), Some("first"));
        assert_eq!(console.read_line().unwrap().as_deref(), Some("second"));
        assert_eq!(console.read_line().unwrap(), None);
        assert_eq!(console.captured_output(), Some("a\nb\n"));
    }
}
