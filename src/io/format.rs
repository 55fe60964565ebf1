//! `printf` rendering and `scanf` format parsing
//!
//! # Output conversions
//!
//! `%d %i %u %x %X %o %c %f %F %s %%`, each accepting the flags `-`, `0`, `+`
//! and space, a field width, a `.precision`, and the length modifiers `l`,
//! `ll`, `h`, `hh` (accepted and ignored, so `%lf` is `%f`).
//!
//! `char` arguments are promoted to `int` for the integer conversions. A
//! floating argument for an integer conversion, or the reverse, is a
//! [`ChannelError::FormatMismatch`]; C would print garbage.
//!
//! # Input directives
//!
//! [`parse_scan_format`] splits a `scanf` format into whitespace runs,
//! literal characters and conversions (`%d %i %c %f %lf %e %g %s %%`, with
//! an optional maximum width).

use super::ChannelError;
use crate::interpreter::constants::DEFAULT_FLOAT_PRECISION;
use crate::memory::value::Value;

/// Parsed `%[flags][width][.precision][length]conversion`
#[derive(Debug, Clone, Default, PartialEq)]
struct ConversionSpec {
    left_align: bool,
    zero_pad: bool,
    plus_sign: bool,
    space_sign: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: char,
}

/// Render a `printf` format against its arguments
pub fn format_printf(format: &str, args: &[Value]) -> Result<String, ChannelError> {
    let mut output = String::new();
    let mut chars = format.chars().peekable();
    let mut remaining = args.iter();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            output.push(ch);
            continue;
        }

        let mut spec = ConversionSpec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.left_align = true,
                '0' => spec.zero_pad = true,
                '+' => spec.plus_sign = true,
                ' ' => spec.space_sign = true,
                _ => break,
            }
            chars.next();
        }
        spec.width = take_number(&mut chars);
        if chars.peek() == Some(&'.') {
            chars.next();
            spec.precision = Some(take_number(&mut chars).unwrap_or(0));
        }
        while matches!(chars.peek(), Some('l') | Some('h')) {
            chars.next();
        }

        spec.conversion = chars
            .next()
            .ok_or_else(|| ChannelError::FormatMismatch("Format ends after '%'".to_string()))?;

        if spec.conversion == '%' {
            output.push('%');
            continue;
        }

        let arg = remaining.next().ok_or_else(|| {
            ChannelError::FormatMismatch(format!(
                "Not enough arguments for format string at %{}",
                spec.conversion
            ))
        })?;
        output.push_str(&render(&spec, arg)?);
    }

    if remaining.next().is_some() {
        return Err(ChannelError::FormatMismatch(
            "More arguments than format conversions".to_string(),
        ));
    }

    Ok(output)
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(&c) = chars.peek().filter(|c| c.is_ascii_digit()) {
        digits.push(c);
        chars.next();
    }
    digits.parse().ok()
}

fn mismatch(spec: &ConversionSpec, expected: &str, arg: &Value) -> ChannelError {
    ChannelError::FormatMismatch(format!(
        "%{} expects {}, got {}",
        spec.conversion,
        expected,
        arg.kind_name()
    ))
}

fn integer_arg(spec: &ConversionSpec, arg: &Value) -> Result<i32, ChannelError> {
    match arg {
        Value::Int(n) => Ok(*n),
        Value::Char(c) => Ok(i32::from(*c)),
        _ => Err(mismatch(spec, "int", arg)),
    }
}

fn render(spec: &ConversionSpec, arg: &Value) -> Result<String, ChannelError> {
    match spec.conversion {
        'd' | 'i' => {
            let n = integer_arg(spec, arg)?;
            let mut digits = n.unsigned_abs().to_string();
            if let Some(precision) = spec.precision {
                digits = format!("{:0>width$}", digits, width = precision);
            }
            Ok(pad_numeric(spec, sign_prefix(spec, n < 0), &digits))
        }
        'u' | 'x' | 'X' | 'o' => {
            let n = integer_arg(spec, arg)? as u32;
            let mut digits = match spec.conversion {
                'x' => format!("{:x}", n),
                'X' => format!("{:X}", n),
                'o' => format!("{:o}", n),
                _ => n.to_string(),
            };
            if let Some(precision) = spec.precision {
                digits = format!("{:0>width$}", digits, width = precision);
            }
            Ok(pad_numeric(spec, "", &digits))
        }
        'c' => {
            let byte = match arg {
                Value::Char(c) => *c as u8,
                Value::Int(n) => *n as u8,
                _ => return Err(mismatch(spec, "char", arg)),
            };
            Ok(pad_text(spec, &(byte as char).to_string()))
        }
        'f' | 'F' => {
            let v = match arg {
                Value::Float(v) => *v,
                _ => return Err(mismatch(spec, "double", arg)),
            };
            let precision = spec.precision.unwrap_or(DEFAULT_FLOAT_PRECISION);
            let digits = if v.is_nan() {
                "nan".to_string()
            } else if v.is_infinite() {
                "inf".to_string()
            } else {
                format!("{:.*}", precision, v.abs())
            };
            let digits = if spec.conversion == 'F' {
                digits.to_uppercase()
            } else {
                digits
            };
            let negative = v.is_sign_negative() && !v.is_nan();
            Ok(pad_numeric(spec, sign_prefix(spec, negative), &digits))
        }
        's' => {
            let text = arg
                .as_c_string()
                .ok_or_else(|| mismatch(spec, "string", arg))?;
            let text = match spec.precision {
                Some(p) => text.chars().take(p).collect(),
                None => text,
            };
            Ok(pad_text(spec, &text))
        }
        other => Err(ChannelError::FormatMismatch(format!(
            "Unsupported format specifier: %{}",
            other
        ))),
    }
}

fn sign_prefix(spec: &ConversionSpec, negative: bool) -> &'static str {
    if negative {
        "-"
    } else if spec.plus_sign {
        "+"
    } else if spec.space_sign {
        " "
    } else {
        ""
    }
}

/// Pad a number to the field width; zero padding goes between sign and digits
fn pad_numeric(spec: &ConversionSpec, sign: &str, digits: &str) -> String {
    let len = sign.len() + digits.len();
    let width = spec.width.unwrap_or(0);
    if len >= width {
        return format!("{}{}", sign, digits);
    }
    let fill = width - len;
    // C ignores '0' when an integer precision is given
    let zero_ok = spec.zero_pad
        && !spec.left_align
        && !(spec.precision.is_some() && !matches!(spec.conversion, 'f' | 'F'));
    if spec.left_align {
        format!("{}{}{}", sign, digits, " ".repeat(fill))
    } else if zero_ok {
        format!("{}{}{}", sign, "0".repeat(fill), digits)
    } else {
        format!("{}{}{}", " ".repeat(fill), sign, digits)
    }
}

fn pad_text(spec: &ConversionSpec, text: &str) -> String {
    let width = spec.width.unwrap_or(0);
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let fill = " ".repeat(width - len);
    if spec.left_align {
        format!("{}{}", text, fill)
    } else {
        format!("{}{}", fill, text)
    }
}

/// One element of a `scanf` format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanDirective {
    /// Any run of whitespace: skips any amount of input whitespace
    Whitespace,
    /// An ordinary character that must match the input exactly
    Literal(char),
    /// A `%` conversion producing one value
    Convert {
        conversion: char,
        width: Option<usize>,
    },
}

/// Split a `scanf` format into directives
pub fn parse_scan_format(format: &str) -> Result<Vec<ScanDirective>, ChannelError> {
    let mut directives = Vec::new();
    let mut chars = format.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch.is_whitespace() {
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            directives.push(ScanDirective::Whitespace);
            continue;
        }
        if ch != '%' {
            directives.push(ScanDirective::Literal(ch));
            continue;
        }

        let width = take_number(&mut chars);
        while matches!(chars.peek(), Some('l') | Some('h')) {
            chars.next();
        }
        match chars.next() {
            Some('%') => directives.push(ScanDirective::Literal('%')),
            Some(conversion @ ('d' | 'i' | 'c' | 'f' | 'e' | 'g' | 's')) => {
                directives.push(ScanDirective::Convert { conversion, width })
            }
            Some(other) => {
                return Err(ChannelError::FormatMismatch(format!(
                    "Unsupported scanf specifier: %{}",
                    other
                )))
            }
            None => {
                return Err(ChannelError::FormatMismatch(
                    "Format ends after '%'".to_string(),
                ))
            }
        }
    }

    Ok(directives)
}

/// Number of values a `scanf` format will produce
pub fn scan_conversion_count(directives: &[ScanDirective]) -> usize {
    directives
        .iter()
        .filter(|d| matches!(d, ScanDirective::Convert { .. }))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Value {
        Value::c_string(s, s.len() + 1).unwrap()
    }

    #[test]
    fn test_basic_conversions() {
        let out = format_printf(
            "Person: age = %d, initial = %c\n",
            &[Value::Int(25), Value::Char(b'J' as i8)],
        )
        .unwrap();
        assert_eq!(out, "Person: age = 25, initial = J\n");
    }

    #[test]
    fn test_float_precision() {
        let stored = 3.14f32 as f64;
        assert_eq!(format_printf("%f", &[Value::Float(stored)]).unwrap(), "3.140000");
        assert_eq!(format_printf("%.2f", &[Value::Float(2.5)]).unwrap(), "2.50");
        assert_eq!(format_printf("%lf", &[Value::Float(-0.5)]).unwrap(), "-0.500000");
    }

    #[test]
    fn test_width_and_flags() {
        assert_eq!(format_printf("[%5d]", &[Value::Int(42)]).unwrap(), "[   42]");
        assert_eq!(format_printf("[%-5d]", &[Value::Int(42)]).unwrap(), "[42   ]");
        assert_eq!(format_printf("[%05d]", &[Value::Int(-42)]).unwrap(), "[-0042]");
        assert_eq!(format_printf("[%+d]", &[Value::Int(7)]).unwrap(), "[+7]");
        assert_eq!(format_printf("[%x]", &[Value::Int(255)]).unwrap(), "[ff]");
        assert_eq!(format_printf("[%u]", &[Value::Int(-1)]).unwrap(), "[4294967295]");
        assert_eq!(format_printf("[%8.3f]", &[Value::Float(3.14159)]).unwrap(), "[   3.142]");
        assert_eq!(format_printf("[%-6s|%.2s]", &[text("ab"), text("xyz")]).unwrap(), "[ab    |xy]");
        assert_eq!(format_printf("100%%", &[]).unwrap(), "100%");
    }

    #[test]
    fn test_char_promotes_for_integer_conversion() {
        assert_eq!(format_printf("%d", &[Value::Char(65)]).unwrap(), "65");
    }

    #[test]
    fn test_mismatches() {
        assert!(matches!(
            format_printf("%d", &[Value::Float(1.0)]),
            Err(ChannelError::FormatMismatch(_))
        ));
        assert!(matches!(
            format_printf("%d %d", &[Value::Int(1)]),
            Err(ChannelError::FormatMismatch(_))
        ));
        assert!(matches!(
            format_printf("%d", &[Value::Int(1), Value::Int(2)]),
            Err(ChannelError::FormatMismatch(_))
        ));
        assert!(matches!(
            format_printf("%q", &[Value::Int(1)]),
            Err(ChannelError::FormatMismatch(_))
        ));
    }

    #[test]
    fn test_scan_format_parsing() {
        let directives = parse_scan_format("%d, %lf %19s").unwrap();
        assert_eq!(
            directives,
            vec![
                ScanDirective::Convert {
                    conversion: 'd',
                    width: None
                },
                ScanDirective::Literal(','),
                ScanDirective::Whitespace,
                ScanDirective::Convert {
                    conversion: 'f',
                    width: None
                },
                ScanDirective::Whitespace,
                ScanDirective::Convert {
                    conversion: 's',
                    width: Some(19)
                },
            ]
        );
        assert_eq!(scan_conversion_count(&directives), 3);
        assert!(parse_scan_format("%p").is_err());
    }
}
