//! A small byte-oriented regular expression engine.
//!
//! Patterns compile to a program for a backtracking VM. Supported syntax: literals, `.`,
//! `^`, `$`, alternation `|`, capturing `( )` and non-capturing `(?: )` groups, the
//! quantifiers `* + ?` and `{n}`, `{n,}`, `{n,m}` (with a lazy `?` suffix), bracket classes
//! `[a-z]` / `[^...]`, and the escapes `\d \w \s \D \W \S \n \t \r`.
//!
//! `^` asserts the start of the input (or of a line under `multiline`); `$` the end.
//!
//! ### Example:
//! ```
//! use io_kit::regex::Regex;
//!
//! let re = Regex::compile("^(\\w+)@(\\w+)\\.com$", &["icase"]).unwrap();
//! let m = re.find(b"Alice@Example.COM").unwrap().unwrap();
//! assert_eq!(m.group_count(), 2);
//! assert_eq!(m.group(1), Some(&b"Example"[..]));
//! assert!(!re.is_match(b"alice@example.org").unwrap());
//! ```

mod compile;
mod vm;

use std::ops::BitOr;

use bitflags::bitflags;
use thiserror::Error;

use compile::Program;
use vm::Flags;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegexError {
    #[error("syntax error at offset {pos}: {msg}")]
    Syntax { pos: usize, msg: &'static str },
    #[error("compiled program exceeds the size limit")]
    TooLarge,
    #[error("out of memory while matching")]
    OutOfMemory,
    #[error("malformed program")]
    MalformedProgram,
}

bitflags! {
    /// Compile options as a bit set.
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
    pub struct RegexOptions: u32 {
        /// ASCII case-insensitive comparison.
        const ICASE = 1;
        /// `^` and `$` also match at line boundaries.
        const MULTILINE = 1 << 1;
        /// `.` also matches `\n`.
        const DOTALL = 1 << 2;
        /// Quantifiers prefer the shortest match unless marked lazy.
        const UNGREEDY = 1 << 3;
        /// Only try a match starting at offset 0.
        const ANCHORED = 1 << 4;
    }
}

impl RegexOptions {
    pub const NONE: RegexOptions = RegexOptions::empty();

    const IDS: [(&'static str, RegexOptions); 5] = [
        ("icase", Self::ICASE),
        ("multiline", Self::MULTILINE),
        ("dotall", Self::DOTALL),
        ("ungreedy", Self::UNGREEDY),
        ("anchored", Self::ANCHORED),
    ];

    /// Builds the set from option ids. Unknown ids are ignored.
    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> RegexOptions {
        ids.iter()
            .filter_map(|id| {
                Self::IDS
                    .iter()
                    .find(|(name, _)| *name == id.as_ref())
                    .map(|&(_, opt)| opt)
            })
            .fold(Self::NONE, BitOr::bitor)
    }
}

/// A compiled pattern. Immutable, so it can be shared between threads.
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: String,
    program: Program,
    options: RegexOptions,
}

impl Regex {
    /// Compiles `pattern` with option ids such as `"icase"` or `"multiline"`.
    pub fn compile<S: AsRef<str>>(pattern: &str, options: &[S]) -> Result<Regex, RegexError> {
        Self::with_options(pattern, RegexOptions::from_ids(options))
    }

    pub fn with_options(pattern: &str, options: RegexOptions) -> Result<Regex, RegexError> {
        let program = compile::compile(
            pattern.as_bytes(),
            options.contains(RegexOptions::UNGREEDY),
        )?;
        Ok(Regex {
            pattern: pattern.to_string(),
            program,
            options,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn options(&self) -> RegexOptions {
        self.options
    }

    /// Number of capturing groups in the pattern.
    pub fn group_count(&self) -> usize {
        self.program.groups
    }

    fn flags(&self) -> Flags {
        Flags {
            icase: self.options.contains(RegexOptions::ICASE),
            multiline: self.options.contains(RegexOptions::MULTILINE),
            dotall: self.options.contains(RegexOptions::DOTALL),
            anchored: self.options.contains(RegexOptions::ANCHORED),
        }
    }

    /// Returns the leftmost match, `Ok(None)` when there is none.
    pub fn find<'t>(&self, text: &'t [u8]) -> Result<Option<Match<'t>>, RegexError> {
        let slots = vm::search(&self.program, self.flags(), text)?;
        Ok(slots.map(|slots| Match { text, slots }))
    }

    /// Yes/no check that does not build a [`Match`].
    pub fn is_match(&self, text: &[u8]) -> Result<bool, RegexError> {
        Ok(vm::search(&self.program, self.flags(), text)?.is_some())
    }
}

/// A successful match borrowing the searched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'t> {
    text: &'t [u8],
    slots: Vec<Option<usize>>,
}

impl<'t> Match<'t> {
    fn span(&self, group: usize) -> Option<(usize, usize)> {
        match (self.slots.get(2 * group)?, self.slots.get(2 * group + 1)?) {
            (Some(start), Some(end)) if start <= end => Some((*start, *end)),
            _ => None,
        }
    }

    pub fn start(&self) -> usize {
        self.span(0).map_or(0, |(start, _)| start)
    }

    pub fn end(&self) -> usize {
        self.span(0).map_or(0, |(_, end)| end)
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The matched bytes.
    pub fn as_bytes(&self) -> &'t [u8] {
        &self.text[self.start()..self.end()]
    }

    /// Number of capturing groups, the whole match excluded.
    pub fn group_count(&self) -> usize {
        self.slots.len() / 2 - 1
    }

    /// Text captured by group `index` (0-based over capturing groups), or `None` when the
    /// group does not exist or did not participate in the match.
    pub fn group(&self, index: usize) -> Option<&'t [u8]> {
        let (start, end) = self.span(index.checked_add(1)?)?;
        Some(&self.text[start..end])
    }
}
