//! Safe, allocation-aware building blocks for text and filesystem I/O.
//!
//! ### Overview
//!
//! `io-kit` bundles the small utilities that input-handling code keeps rewriting:
//!
//! - [`cstring`]: bounded byte-string primitives and the growable [`StringStream`].
//! - [`cipher`]: a registry of classical ciphers and radix encodings addressed by id strings
//!   such as `"caesar:shift=5"` or `"base64:url=1"`.
//! - [`regex`]: a compact backtracking regex engine with captures and option flags.
//! - [`input`]: context-aware sanitization with heuristic findings, plus validators for
//!   numbers, emails, passwords, usernames and user agents.
//! - [`dir`]: a portable directory façade over a per-OS [`Platform`](dir::Platform) adapter.
//!
//! **Key ideas**:
//! - **No panics on bad input**: every fallible operation returns a `Result` or an `Option`.
//! - **Typed errors** for pure transforms, [`anyhow`] errors with context for filesystem work.
//! - **Quiet by default**: directory operations emit [`tracing`] events, nothing is printed
//!   unless the application installs a subscriber.

mod core;
pub mod cipher;
pub mod cstring;
pub mod dir;
pub mod input;
pub mod regex;

pub use crate::core::Result;
pub use cipher::{CipherError, CipherSpec, Codec};
pub use cstring::{StreamError, StringStream};
pub use dir::{Directory, Entry, EntryType};
pub use input::{Context, Findings, sanitize};
pub use regex::{Match, Regex, RegexError, RegexOptions};
