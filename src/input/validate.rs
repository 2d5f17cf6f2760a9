//! Specialized validators for numbers, e-mail addresses, passwords, user agents and user
//! names.

use std::collections::HashMap;

use super::heuristics;

/// Domains accepted by [`is_email`].
pub const EMAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "hotmail.com",
    "icloud.com",
];

pub const DISPOSABLE_DOMAINS: &[&str] = &[
    "mailinator.com",
    "10minutemail.com",
    "guerrillamail.com",
    "tempmail.com",
    "temp-mail.org",
    "yopmail.com",
    "trashmail.com",
    "getnada.com",
    "dispostable.com",
    "sharklasers.com",
    "throwawaymail.com",
    "maildrop.cc",
    "fakeinbox.com",
];

pub const WEAK_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "123456",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty",
    "qwerty123",
    "qwertyuiop",
    "abc123",
    "111111",
    "letmein",
    "welcome",
    "welcome1",
    "iloveyou",
    "admin",
    "admin123",
    "monkey",
    "dragon",
    "football",
    "baseball",
    "sunshine",
    "princess",
    "trustno1",
    "passw0rd",
    "p@ssw0rd",
    "p@ssword1",
];

const USER_KEYWORDS: &[&str] = &[
    "bot", "crawler", "spider", "scraper", "spam", "fake", "test123", "admin123", "root123",
];

const KEYBOARD_WALKS: &[&str] = &[
    "qwerty", "asdf", "zxcv", "qazwsx", "1qaz", "poiuy", "lkjh", "mnbv", "12345", "09876",
];

const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 64;
const PASSWORD_MIN_CLASSES: usize = 3;

const USER_MIN: usize = 3;
const USER_MAX: usize = 32;
const USER_MAX_DIGIT_RUN: usize = 5;
const USER_MAX_SYMBOL_RUN: usize = 4;
const USER_MAX_DIGITS: usize = 8;
const USER_MAX_DIGIT_RATIO: f64 = 0.45;
const USER_MIN_LETTER_RATIO: f64 = 0.3;
const USER_MAX_SYMBOL_RATIO: f64 = 0.3;
const USER_MAX_ENTROPY: f64 = 4.2;
const USER_HEX_LEN: usize = 16;

/// Parses a base-10 `i32`, the whole string must be consumed.
pub fn is_int(s: &str) -> Option<i32> {
    s.parse().ok()
}

/// Parses a float, the whole string must be consumed.
pub fn is_float(s: &str) -> Option<f64> {
    s.parse().ok()
}

/// True when every byte is ASCII alphanumeric. The empty string qualifies.
pub fn is_alnum(s: &[u8]) -> bool {
    s.iter().all(u8::is_ascii_alphanumeric)
}

/// Accepts `local@domain` with a non-empty local part and a domain from
/// [`EMAIL_DOMAINS`] (compared byte for byte).
pub fn is_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && EMAIL_DOMAINS.contains(&domain),
        None => false,
    }
}

pub fn is_length(s: &[u8], max_len: usize) -> bool {
    s.len() <= max_len
}

fn is_symbol(b: u8) -> bool {
    !b.is_ascii_alphanumeric()
}

fn all_same(s: &[u8]) -> bool {
    s.windows(2).all(|w| w[0] == w[1])
}

fn strictly_increasing(s: &[u8]) -> bool {
    s.windows(2).all(|w| w[0] < w[1])
}

fn strictly_decreasing(s: &[u8]) -> bool {
    s.windows(2).all(|w| w[0] > w[1])
}

/// Reports a password as weak when any of these holds: its length is outside 8..=64; fewer
/// than three of lower/upper/digit/symbol appear; it is a well-known password; its bytes are
/// all equal or strictly monotonic; it equals the user name or e-mail (ignoring ASCII case).
pub fn is_weak_password(password: &str, username: &str, email: &str) -> bool {
    let bytes = password.as_bytes();
    if bytes.len() < PASSWORD_MIN || bytes.len() > PASSWORD_MAX {
        return true;
    }

    let classes = [
        bytes.iter().any(u8::is_ascii_lowercase),
        bytes.iter().any(u8::is_ascii_uppercase),
        bytes.iter().any(u8::is_ascii_digit),
        bytes.iter().any(|&b| is_symbol(b)),
    ];
    if classes.iter().filter(|&&present| present).count() < PASSWORD_MIN_CLASSES {
        return true;
    }

    if WEAK_PASSWORDS
        .iter()
        .any(|weak| weak.eq_ignore_ascii_case(password))
    {
        return true;
    }
    if all_same(bytes) || strictly_increasing(bytes) || strictly_decreasing(bytes) {
        return true;
    }

    (!username.is_empty() && password.eq_ignore_ascii_case(username))
        || (!email.is_empty() && password.eq_ignore_ascii_case(email))
}

/// Case-insensitive bot signature check for user-agent strings.
pub fn is_suspicious_bot(user_agent: &str) -> bool {
    heuristics::is_bot_signature(user_agent.as_bytes())
}

/// True when the domain of `addr` (the part after the last `@`, or all of `addr`) is a known
/// throwaway provider. Comparison ignores ASCII case.
pub fn is_disposable_email(addr: &str) -> bool {
    let domain = addr.rsplit_once('@').map_or(addr, |(_, domain)| domain);
    DISPOSABLE_DOMAINS
        .iter()
        .any(|d| d.eq_ignore_ascii_case(domain))
}

fn longest_run<F: Fn(u8) -> bool>(s: &[u8], pred: F) -> usize {
    let mut best = 0;
    let mut run = 0;
    for &b in s {
        run = if pred(b) { run + 1 } else { 0 };
        best = best.max(run);
    }
    best
}

/// Base-2 Shannon entropy of the byte distribution.
pub fn shannon_entropy(s: &[u8]) -> f64 {
    if s.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<u8, usize> = HashMap::new();
    for &b in s {
        *counts.entry(b).or_default() += 1;
    }
    let len = s.len() as f64;
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / len;
            -p * p.log2()
        })
        .sum()
}

fn is_alternating(s: &[u8]) -> bool {
    s.len() >= 4 && s[0] != s[1] && s.iter().enumerate().all(|(i, &b)| b == s[i % 2])
}

/// Flags user names that look generated, scripted or abusive.
pub fn is_suspicious_user(name: &str) -> bool {
    let s = name.as_bytes();
    if s.len() < USER_MIN || s.len() > USER_MAX {
        return true;
    }

    let digits = s.iter().filter(|b| b.is_ascii_digit()).count();
    let letters = s.iter().filter(|b| b.is_ascii_alphabetic()).count();
    let symbols = s.len() - digits - letters;
    let len = s.len() as f64;

    if longest_run(s, |b| b.is_ascii_digit()) >= USER_MAX_DIGIT_RUN
        || longest_run(s, is_symbol) >= USER_MAX_SYMBOL_RUN
        || digits >= USER_MAX_DIGITS
    {
        return true;
    }
    if digits as f64 / len > USER_MAX_DIGIT_RATIO
        || (letters as f64 / len) < USER_MIN_LETTER_RATIO
        || symbols as f64 / len > USER_MAX_SYMBOL_RATIO
    {
        return true;
    }

    let lower = name.to_ascii_lowercase();
    if USER_KEYWORDS.iter().chain(KEYBOARD_WALKS).any(|k| lower.contains(k)) {
        return true;
    }
    if all_same(s) || is_alternating(s) {
        return true;
    }
    if shannon_entropy(s) > USER_MAX_ENTROPY {
        return true;
    }
    if lower.contains('@') || lower.contains("http") {
        return true;
    }
    s.len() >= USER_HEX_LEN && s.iter().all(u8::is_ascii_hexdigit)
}
