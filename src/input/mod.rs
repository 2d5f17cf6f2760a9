//! Input validation and context-aware sanitization.
//!
//! [`sanitize`] first runs a heuristic scan over the raw input, recording what it found in a
//! [`Findings`] bit set, and then filters the bytes through the character table of the target
//! [`Context`], replacing everything else with `_`.
//!
//! ### Example:
//! ```
//! use io_kit::input::{Context, Findings, sanitize};
//!
//! let clean = sanitize(b"<script>alert('xss')</script>", Context::Html, 64).unwrap();
//! assert!(clean.findings.contains(Findings::SCRIPT | Findings::MODIFIED));
//! assert_eq!(clean.output, b"_script_alert__xss____script_");
//! ```

mod heuristics;
mod validate;

use std::fmt;
use std::io::{self, BufRead};

use bitflags::bitflags;
use thiserror::Error;

pub use heuristics::scan;
pub use validate::{
    is_alnum, is_disposable_email, is_email, is_float, is_int, is_length, is_suspicious_bot,
    is_suspicious_user, is_weak_password, shannon_entropy,
};

/// Upper bound on the number of input bytes inspected by [`sanitize`].
pub const SCAN_WINDOW: usize = 4096;

const REPLACEMENT: u8 = b'_';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("output size must be non-zero")]
    ZeroOutputSize,
}

bitflags! {
    /// What the heuristic scan and the filter observed. Values are stable.
    #[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
    pub struct Findings: u8 {
        const MODIFIED = 0x01;
        const SCRIPT = 0x02;
        const SQL = 0x04;
        const SHELL = 0x08;
        const BASE64 = 0x10;
        const PATH = 0x20;
        const BOT = 0x40;
        const SPAM = 0x80;
    }
}

impl Findings {
    pub const OK: Findings = Findings::empty();

    pub fn is_ok(self) -> bool {
        self.is_empty()
    }
}

impl fmt::Debug for Findings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("OK");
        }
        for (i, (name, _)) in self.iter_names().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

/// The downstream consumer the sanitized text is meant for.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Context {
    /// Alphanumerics, space and `_ - . , : / \ @ + = # % ( ) [ ]`.
    #[default]
    Generic,
    /// Alphanumerics, space and `- _ . ,`.
    Html,
    /// Alphanumerics, space and `_ -`.
    Sql,
    /// Alphanumerics, space and `_ - . /`.
    Shell,
    /// Alphanumerics and `_ - .`.
    Filename,
    /// Every byte is passed through; only the heuristic scan runs.
    None,
}

impl Context {
    pub fn from_id(id: &str) -> Option<Context> {
        let context = match id.to_ascii_lowercase().as_str() {
            "generic" => Context::Generic,
            "html" => Context::Html,
            "sql" => Context::Sql,
            "shell" => Context::Shell,
            "filename" => Context::Filename,
            "none" => Context::None,
            _ => return None,
        };
        Some(context)
    }

    fn extra(self) -> &'static [u8] {
        match self {
            Context::Generic => b" _-.,:/\\@+=#%()[]",
            Context::Html => b" -_.,",
            Context::Sql => b" _-",
            Context::Shell => b" _-./",
            Context::Filename => b"_-.",
            Context::None => b"",
        }
    }

    /// True when `b` may appear unchanged in output for this context.
    pub fn permits(self, b: u8) -> bool {
        self == Context::None || b.is_ascii_alphanumeric() || self.extra().contains(&b)
    }
}

/// Result of [`sanitize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    pub output: Vec<u8>,
    pub findings: Findings,
}

/// Scans and filters at most [`SCAN_WINDOW`] bytes of `input` for `context`.
///
/// The output holds at most `output_size - 1` bytes, mirroring a terminated buffer of
/// `output_size` bytes. In [`Context::Sql`] a SQL finding also sets
/// [`Findings::MODIFIED`], even when no byte was replaced.
pub fn sanitize(
    input: &[u8],
    context: Context,
    output_size: usize,
) -> Result<Sanitized, InputError> {
    if output_size == 0 {
        return Err(InputError::ZeroOutputSize);
    }

    let window = &input[..input.len().min(SCAN_WINDOW)];
    let mut findings = heuristics::scan(window);

    let limit = output_size - 1;
    let mut output = Vec::with_capacity(window.len().min(limit));
    for &b in window.iter().take(limit) {
        if context.permits(b) {
            output.push(b);
        } else {
            output.push(REPLACEMENT);
            findings |= Findings::MODIFIED;
        }
    }

    if context == Context::Sql && findings.contains(Findings::SQL) {
        findings |= Findings::MODIFIED;
    }
    Ok(Sanitized { output, findings })
}

/// Reads one line, drops the line terminator and trims surrounding whitespace.
/// Returns `None` at end of input.
pub fn read_line_trimmed<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod findings {
        use super::*;

        #[test]
        fn test_stable_values() {
            assert_eq!(Findings::MODIFIED.bits(), 0x01);
            assert_eq!(Findings::SPAM.bits(), 0x80);
            assert_eq!((Findings::SQL | Findings::PATH).bits(), 0x24);
            assert!(Findings::OK.is_ok());
            assert_eq!(Findings::from_bits(0x24), Some(Findings::SQL | Findings::PATH));
            assert_eq!(Findings::all().bits(), 0xff);
        }

        #[test]
        fn test_debug_names() {
            assert_eq!(format!("{:?}", Findings::OK), "OK");
            assert_eq!(
                format!("{:?}", Findings::SCRIPT | Findings::MODIFIED),
                "MODIFIED|SCRIPT"
            );
        }
    }

    mod sanitize {
        use super::*;

        #[test]
        fn test_script_in_html() -> Result<(), InputError> {
            let result = sanitize(b"<script>alert('xss')</script>", Context::Html, 256)?;
            assert!(result.findings.contains(Findings::SCRIPT));
            assert!(result.findings.contains(Findings::MODIFIED));
            assert!(result.output.contains(&b'_'));
            assert!(!result.output.contains(&b'<'));
            Ok(())
        }

        #[test]
        fn test_clean_input_is_untouched() -> Result<(), InputError> {
            let result = sanitize(b"report-2024.txt", Context::Filename, 64)?;
            assert_eq!(result.output, b"report-2024.txt");
            assert_eq!(result.findings, Findings::OK);
            Ok(())
        }

        #[test]
        fn test_sql_context_marks_sql_findings() -> Result<(), InputError> {
            let result = sanitize(b"select name from users", Context::Sql, 64)?;
            assert_eq!(result.output, b"select name from users");
            assert_eq!(result.findings, Findings::SQL | Findings::MODIFIED);

            let result = sanitize(b"select name from users", Context::Generic, 64)?;
            assert_eq!(result.findings, Findings::SQL);
            Ok(())
        }

        #[test]
        fn test_output_is_bounded() -> Result<(), InputError> {
            let result = sanitize(b"abcdef", Context::Generic, 4)?;
            assert_eq!(result.output, b"abc");
            let result = sanitize(b"abcdef", Context::Generic, 1)?;
            assert!(result.output.is_empty());
            assert_eq!(
                sanitize(b"abc", Context::Generic, 0),
                Err(InputError::ZeroOutputSize)
            );
            Ok(())
        }

        #[test]
        fn test_window_limits_scan() -> Result<(), InputError> {
            let mut input = vec![b'a'; SCAN_WINDOW];
            input.extend_from_slice(b" <script>");
            let result = sanitize(&input, Context::Html, usize::MAX)?;
            assert_eq!(result.output.len(), SCAN_WINDOW);
            assert!(!result.findings.contains(Findings::SCRIPT));
            Ok(())
        }

        #[test]
        fn test_none_context_passes_everything() -> Result<(), InputError> {
            let result = sanitize(b"a<b>|c", Context::None, 64)?;
            assert_eq!(result.output, b"a<b>|c");
            assert!(!result.findings.contains(Findings::MODIFIED));
            assert!(result.findings.contains(Findings::SHELL));
            Ok(())
        }

        #[test]
        fn test_context_ids() {
            assert_eq!(Context::from_id("HTML"), Some(Context::Html));
            assert_eq!(Context::from_id("filename"), Some(Context::Filename));
            assert_eq!(Context::from_id("xml"), None);
        }
    }

    mod read_line {
        use super::*;
        use std::io::Cursor;

        #[test]
        fn test_read_line_trimmed() -> io::Result<()> {
            let mut reader = Cursor::new("  first line \r\nsecond\n\nlast");
            assert_eq!(read_line_trimmed(&mut reader)?, Some("first line".to_string()));
            assert_eq!(read_line_trimmed(&mut reader)?, Some("second".to_string()));
            assert_eq!(read_line_trimmed(&mut reader)?, Some(String::new()));
            assert_eq!(read_line_trimmed(&mut reader)?, Some("last".to_string()));
            assert_eq!(read_line_trimmed(&mut reader)?, None);
            Ok(())
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_context() -> impl Strategy<Value = Context> {
            prop_oneof![
                Just(Context::Generic),
                Just(Context::Html),
                Just(Context::Sql),
                Just(Context::Shell),
                Just(Context::Filename),
            ]
        }

        proptest! {
            #[test]
            fn output_is_bounded_and_permitted(
                input in proptest::collection::vec(any::<u8>(), 0..256),
                context in any_context(),
                size in 1usize..128,
            ) {
                let result = sanitize(&input, context, size).unwrap();
                prop_assert!(result.output.len() <= size - 1);
                prop_assert!(result.output.iter().all(|&b| context.permits(b)));
            }

            #[test]
            fn modified_iff_replaced_or_sql(
                input in proptest::collection::vec(any::<u8>(), 0..128),
                context in any_context(),
            ) {
                let result = sanitize(&input, context, 1024).unwrap();
                let replaced = input.iter().any(|&b| !context.permits(b));
                let sql = context == Context::Sql && result.findings.contains(Findings::SQL);
                prop_assert_eq!(result.findings.contains(Findings::MODIFIED), replaced || sql);
            }
        }
    }
}
