//! I/O channel between running programs and a console
//!
//! Every console-visible effect of a program passes through [`IoChannel`]:
//! - [`IoChannel::write_formatted`]: `printf`
//! - [`IoChannel::read_formatted`]: `scanf`
//! - [`IoChannel::read_line`]: `gets`
//! - [`IoChannel::write_line`]: `puts`
//!
//! # Input model
//!
//! Input arrives from the [`Console`] one line at a time. `read_formatted`
//! consumes the current line token by token, pulling more lines when a
//! directive needs them. When a formatted read leaves only whitespace on the
//! current line, that remainder is dropped so a following `read_line` starts
//! on a fresh line (the usual `scanf("%d")` then `gets` pattern).

pub mod console;
pub mod format;

pub use console::{CapturedConsole, Console, StdConsole};

use crate::memory::value::Value;
use format::ScanDirective;
use thiserror::Error;

/// Channel failures; the interpreter attaches the source location
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChannelError {
    #[error("{0}")]
    FormatMismatch(String),
    #[error("input exhausted")]
    InputExhausted,
    #[error("{0}")]
    Io(String),
}

impl From<std::io::Error> for ChannelError {
    fn from(err: std::io::Error) -> Self {
        ChannelError::Io(err.to_string())
    }
}

/// A formatted read that stopped early, with what it read before stopping
#[derive(Debug, Clone, PartialEq)]
pub struct ScanFailure {
    pub read: Vec<Value>,
    pub error: ChannelError,
}

impl From<ChannelError> for ScanFailure {
    fn from(error: ChannelError) -> Self {
        ScanFailure {
            read: Vec::new(),
            error,
        }
    }
}

/// Formatted and line-oriented I/O over a [`Console`]
pub struct IoChannel {
    console: Box<dyn Console>,
    /// Unconsumed part of the current input line, `'\n'` included
    line: Vec<char>,
    pos: usize,
}

impl IoChannel {
    pub fn new(console: Box<dyn Console>) -> Self {
        IoChannel {
            console,
            line: Vec::new(),
            pos: 0,
        }
    }

    pub fn console(&self) -> &dyn Console {
        self.console.as_ref()
    }

    /// Render `format` against `values` and write it, returning the bytes written
    pub fn write_formatted(&mut self, format: &str, values: &[Value]) -> Result<usize, ChannelError> {
        let text = format::format_printf(format, values)?;
        self.console.write(&text)?;
        Ok(text.len())
    }

    /// Write `text` followed by a newline
    pub fn write_line(&mut self, text: &str) -> Result<(), ChannelError> {
        self.console.write(&format!("{}\n", text))?;
        Ok(())
    }

    /// Read the rest of the current line, or the next line if none is pending
    pub fn read_line(&mut self) -> Result<String, ChannelError> {
        if self.pos < self.line.len() {
            let rest: String = self.line[self.pos..].iter().collect();
            self.discard_line();
            return Ok(rest.strip_suffix('\n').unwrap_or(&rest).to_string());
        }
        self.console
            .read_line()?
            .ok_or(ChannelError::InputExhausted)
    }

    /// Read one value per conversion in `format`
    ///
    /// Integer conversions produce [`Value::Int`], floating ones
    /// [`Value::Float`], `%c` a [`Value::Char`] and `%s` a NUL-terminated
    /// char array sized to the word read. Reading stops at the first
    /// directive that fails; the values converted before it come back in the
    /// [`ScanFailure`].
    pub fn read_formatted(&mut self, format: &str) -> Result<Vec<Value>, ScanFailure> {
        let directives = format::parse_scan_format(format)?;
        let mut read = Vec::with_capacity(format::scan_conversion_count(&directives));

        if let Err(error) = self.scan_directives(&directives, &mut read) {
            return Err(ScanFailure { read, error });
        }

        if self.line[self.pos.min(self.line.len())..]
            .iter()
            .all(|c| c.is_whitespace())
        {
            self.discard_line();
        }
        Ok(read)
    }

    fn scan_directives(&mut self, directives: &[ScanDirective], read: &mut Vec<Value>) -> Result<(), ChannelError> {
        for directive in directives {
            match directive {
                ScanDirective::Whitespace => self.skip_whitespace()?,
                ScanDirective::Literal(expected) => {
                    let found = self.next_char()?.ok_or(ChannelError::InputExhausted)?;
                    if found != *expected {
                        self.pos -= 1;
                        return Err(ChannelError::FormatMismatch(format!(
                            "expected '{}' in input, found '{}'",
                            expected,
                            found.escape_default()
                        )));
                    }
                }
                ScanDirective::Convert { conversion, width } => {
                    read.push(self.scan_conversion(*conversion, *width)?);
                }
            }
        }
        Ok(())
    }

    fn scan_conversion(&mut self, conversion: char, width: Option<usize>) -> Result<Value, ChannelError> {
        if conversion == 'c' {
            let c = self.next_char()?.ok_or(ChannelError::InputExhausted)?;
            return Ok(Value::Char(c as u32 as u8 as i8));
        }

        self.skip_whitespace()?;
        let limit = width.unwrap_or(usize::MAX);
        match conversion {
            'd' | 'i' => {
                let token = self.take_while(limit, |token, c| {
                    c.is_ascii_digit() || (token.is_empty() && (c == '-' || c == '+'))
                });
                token
                    .parse::<i32>()
                    .map(Value::Int)
                    .map_err(|_| self.reject(&token, "an integer"))
            }
            'f' | 'e' | 'g' => {
                let token = self.take_while(limit, |token, c| {
                    let prev = token.chars().last();
                    c.is_ascii_digit()
                        || (c == '.' && !token.contains('.') && !token.contains(['e', 'E']))
                        || ((c == 'e' || c == 'E')
                            && prev.is_some_and(|p| p.is_ascii_digit())
                            && !token.contains(['e', 'E']))
                        || ((c == '-' || c == '+')
                            && (token.is_empty() || matches!(prev, Some('e') | Some('E'))))
                });
                token
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| self.reject(&token, "a number"))
            }
            _ => {
                let word = self.take_while(limit, |_, c| !c.is_whitespace());
                if word.is_empty() {
                    return Err(ChannelError::InputExhausted);
                }
                Value::c_string(&word, word.len() + 1)
                    .ok_or_else(|| ChannelError::FormatMismatch("unreadable word".to_string()))
            }
        }
    }

    /// Put a rejected token back and describe the mismatch
    fn reject(&mut self, token: &str, expected: &str) -> ChannelError {
        self.pos -= token.chars().count();
        if token.is_empty() {
            let found = self
                .line
                .get(self.pos)
                .map(|c| c.escape_default().to_string())
                .unwrap_or_default();
            ChannelError::FormatMismatch(format!("expected {}, found '{}'", expected, found))
        } else {
            ChannelError::FormatMismatch(format!("expected {}, found '{}'", expected, token))
        }
    }

    /// Consume characters from the current line while `accept` holds
    fn take_while(&mut self, limit: usize, accept: impl Fn(&str, char) -> bool) -> String {
        let mut token = String::new();
        while token.chars().count() < limit {
            match self.line.get(self.pos) {
                Some(&c) if accept(&token, c) => {
                    token.push(c);
                    self.pos += 1;
                }
                _ => break,
            }
        }
        token
    }

    /// Skip whitespace, pulling lines until something else shows up
    fn skip_whitespace(&mut self) -> Result<(), ChannelError> {
        loop {
            while self.line.get(self.pos).is_some_and(|c| c.is_whitespace()) {
                self.pos += 1;
            }
            if self.pos < self.line.len() {
                return Ok(());
            }
            if !self.fill_line()? {
                return Err(ChannelError::InputExhausted);
            }
        }
    }

    fn next_char(&mut self) -> Result<Option<char>, ChannelError> {
        if self.pos >= self.line.len() && !self.fill_line()? {
            return Ok(None);
        }
        let c = self.line[self.pos];
        self.pos += 1;
        Ok(Some(c))
    }

    /// Replace the exhausted line with the next console line
    fn fill_line(&mut self) -> Result<bool, ChannelError> {
        match self.console.read_line()? {
            Some(text) => {
                self.line = text.chars().chain(std::iter::once('\n')).collect();
                self.pos = 0;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn discard_line(&mut self) {
        self.line.clear();
        self.pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn channel(input: &str) -> IoChannel {
        IoChannel::new(Box::new(CapturedConsole::with_input(input)))
    }

    #[test]
    fn test_scanf_then_gets_reads_fresh_line() {
        let mut io = channel("42\nhello world\n");
        assert_eq!(io.read_formatted("%d").unwrap(), vec![Value::Int(42)]);
        assert_eq!(io.read_line().unwrap(), "hello world");
    }

    #[test]
    fn test_tokens_span_lines() {
        let mut io = channel("1 2\n3\n");
        let values = io.read_formatted("%d %d %d").unwrap();
        assert_eq!(values, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn test_leftover_tokens_stay_on_line() {
        let mut io = channel("7 rest of line\n");
        assert_eq!(io.read_formatted("%d").unwrap(), vec![Value::Int(7)]);
        assert_eq!(io.read_line().unwrap(), " rest of line");
    }

    #[test]
    fn test_float_and_string_conversions() {
        let mut io = channel("-2.5e1 word\n");
        let values = io.read_formatted("%lf %s").unwrap();
        assert_eq!(values[0], Value::Float(-25.0));
        assert_eq!(values[1].as_c_string().as_deref(), Some("word"));
    }

    #[test]
    fn test_char_conversion_does_not_skip_whitespace() {
        let mut io = channel(" x\n");
        assert_eq!(io.read_formatted("%c").unwrap(), vec![Value::Char(b' ' as i8)]);
    }

    #[test]
    fn test_malformed_input_is_recoverable() {
        let mut io = channel("abc\n12\n");
        assert!(matches!(
            io.read_formatted("%d"),
            Err(ScanFailure {
                error: ChannelError::FormatMismatch(_),
                ..
            })
        ));
        // The bad token is still pending
        assert_eq!(io.read_line().unwrap(), "abc");
        assert_eq!(io.read_formatted("%d").unwrap(), vec![Value::Int(12)]);
    }

    #[test]
    fn test_end_of_input() {
        let mut io = channel("");
        assert_eq!(io.read_formatted("%d"), Err(ChannelError::InputExhausted.into()));
        assert_eq!(io.read_line(), Err(ChannelError::InputExhausted));
    }

    #[test]
    fn test_failed_conversion_keeps_earlier_values() {
        let mut io = channel("1 x\n");
        let failure = io.read_formatted("%d %d").unwrap_err();
        assert_eq!(failure.read, vec![Value::Int(1)]);
        assert!(matches!(failure.error, ChannelError::FormatMismatch(_)));
        assert_eq!(io.read_line().unwrap(), "x");
    }

    #[test]
    fn test_literal_matching() {
        let mut io = channel("3,4\n");
        let values = io.read_formatted("%d,%d").unwrap();
        assert_eq!(values, vec![Value::Int(3), Value::Int(4)]);
    }

    #[test]
    fn test_writes() {
        let mut io = channel("");
        io.write_formatted("%d-%s", &[Value::Int(1), Value::c_string("a", 2).unwrap()])
            .unwrap();
        io.write_line("done").unwrap();
        assert_eq!(io.console().captured_output(), Some("1-a\ndone\n"));
    }
}
