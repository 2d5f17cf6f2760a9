//! Phrase tables and the heuristic scan behind [`Findings`].
//!
//! All phrases are lower-case; the input is folded once before matching.

use super::Findings;
use crate::cstring;

pub const SCRIPT_PHRASES: &[&str] = &[
    "<script",
    "</script",
    "javascript:",
    "vbscript:",
    "eval(",
    "document.cookie",
    "document.write",
    "window.location",
    "iframe",
    "<svg",
    "srcdoc=",
];

pub const SQL_PHRASES: &[&str] = &[
    "select ",
    "insert ",
    "update ",
    "delete ",
    "drop ",
    "union ",
    "--",
    "/*",
    "0x",
    "xp_",
    "information_schema",
    "' or '",
    " or 1=1",
    "sleep(",
    "benchmark(",
];

pub const SHELL_PHRASES: &[&str] = &[
    "curl ",
    "wget ",
    "rm -rf",
    "powershell",
    "cmd.exe",
    "|",
    "&&",
    "$(",
    "`",
    "/bin/sh",
    "/bin/bash",
    "bash -c",
    "sh -c",
    "zsh",
    "nc -e",
    "mkfifo",
];

pub const BOT_PHRASES: &[&str] = &[
    "bot",
    "crawl",
    "spider",
    "slurp",
    "curl/",
    "wget/",
    "python-requests",
    "python-urllib",
    "go-http-client",
    "httpclient",
    "scrapy",
    "headless",
    "phantomjs",
    "selenium",
    "puppeteer",
];

pub const SPAM_PHRASES: &[&str] = &[
    "viagra",
    "free money",
    "click here",
    "bitcoin",
    "winner!",
    "act now",
    "buy now",
    "limited time offer",
    "100% free",
    "risk-free",
    "work from home",
    "earn $",
    "casino",
    "lottery",
];

pub const PATH_PHRASES: &[&str] = &[
    "../",
    "..\\",
    "%2e%2e",
    "/etc/passwd",
    "/etc/shadow",
    "/proc/self/environ",
    "c:\\",
    "\\windows\\system32",
    "file://",
];

/// Shortest run of base64-alphabet bytes reported as [`Findings::BASE64`].
pub const BASE64_RUN: usize = 80;

/// Shortest event-handler name after `on` (`onload`, `onclick`, ...).
const MIN_HANDLER_NAME: usize = 3;

fn any_phrase(haystack: &[u8], phrases: &[&str]) -> bool {
    phrases
        .iter()
        .any(|phrase| cstring::contains(haystack, phrase.as_bytes()))
}

/// Detects inline event handlers such as `onerror=` or `onload =`. The `on` must start a
/// word so that `button=` is not reported.
fn has_event_handler(lower: &[u8]) -> bool {
    let mut from = 0;
    while let Some(at) = cstring::index_of(&lower[from..], b"on") {
        let start = from + at;
        from = start + 2;

        if start > 0 && lower[start - 1].is_ascii_alphanumeric() {
            continue;
        }
        let name_len = lower[from..]
            .iter()
            .take_while(|b| b.is_ascii_lowercase())
            .count();
        if name_len < MIN_HANDLER_NAME {
            continue;
        }
        let rest = &lower[from + name_len..];
        let spaces = rest.iter().take_while(|&&b| b == b' ').count();
        if rest.get(spaces) == Some(&b'=') {
            return true;
        }
    }
    false
}

fn is_base64_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=')
}

fn has_base64_run(input: &[u8]) -> bool {
    input
        .split(|&b| !is_base64_byte(b))
        .any(|run| run.len() >= BASE64_RUN)
}

/// Matches `input` against every phrase table. Never sets [`Findings::MODIFIED`].
pub fn scan(input: &[u8]) -> Findings {
    let lower = cstring::to_lower(input);
    let mut findings = Findings::OK;

    if any_phrase(&lower, SCRIPT_PHRASES) || has_event_handler(&lower) {
        findings |= Findings::SCRIPT;
    }
    if any_phrase(&lower, SQL_PHRASES) {
        findings |= Findings::SQL;
    }
    if any_phrase(&lower, SHELL_PHRASES) {
        findings |= Findings::SHELL;
    }
    if any_phrase(&lower, BOT_PHRASES) {
        findings |= Findings::BOT;
    }
    if any_phrase(&lower, SPAM_PHRASES) {
        findings |= Findings::SPAM;
    }
    if any_phrase(&lower, PATH_PHRASES) {
        findings |= Findings::PATH;
    }
    if has_base64_run(input) {
        findings |= Findings::BASE64;
    }
    findings
}

/// Case-insensitive bot signature check used for user-agent strings.
pub fn is_bot_signature(user_agent: &[u8]) -> bool {
    any_phrase(&cstring::to_lower(user_agent), BOT_PHRASES)
}
