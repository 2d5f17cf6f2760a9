//! Length-bounded byte-string primitives.
//!
//! Every function works on plain byte slices and hands back freshly owned
//! `Vec<u8>` values, so ownership transfer is explicit in the signature.
//! A `0` byte inside an input is treated as a terminator by the `max_len`
//! bounded functions (`length`, `copy`, `concat`, `compare`), which keeps
//! them interchangeable with nul-terminated buffers coming from interop code.
//! All other functions treat `0` as an ordinary byte.
//!
//! Case folding is ASCII only; locale is never consulted.

mod stream;

use std::cmp::Ordering;
use std::fmt;

pub use stream::{StreamError, StringStream};

/// Bytes removed by [`trim`] and collapsed by [`normalize_spaces`].
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Returns the index of the first `0` byte of `s`, or `max_len` (clamped to
/// the slice length) when no terminator is found. Bytes past `max_len` are
/// never read.
pub fn length(s: &[u8], max_len: usize) -> usize {
    let bounded = &s[..s.len().min(max_len)];
    bounded.iter().position(|&b| b == 0).unwrap_or(bounded.len())
}

/// Copies at most `max_len` bytes of `s`, stopping at the first terminator.
pub fn copy(s: &[u8], max_len: usize) -> Vec<u8> {
    s[..length(s, max_len)].to_vec()
}

/// Concatenates `a` and `b` so that the result plus a terminator fits in
/// `max_len` bytes. The tail of `b` (and then `a`) is dropped when needed.
pub fn concat(a: &[u8], b: &[u8], max_len: usize) -> Vec<u8> {
    let room = max_len.saturating_sub(1);
    let a = &a[..length(a, usize::MAX)];
    let b = &b[..length(b, usize::MAX)];

    let mut out = Vec::with_capacity(room.min(a.len() + b.len()));
    out.extend_from_slice(&a[..a.len().min(room)]);
    let left = room - out.len();
    out.extend_from_slice(&b[..b.len().min(left)]);
    out
}

/// Lexicographic comparison over unsigned bytes, looking at no more than
/// `max_len` bytes of either side.
pub fn compare(a: &[u8], b: &[u8], max_len: usize) -> Ordering {
    a[..length(a, max_len)].cmp(&b[..length(b, max_len)])
}

/// ASCII case-insensitive comparison.
pub fn icmp(a: &[u8], b: &[u8]) -> Ordering {
    let fa = a.iter().map(u8::to_ascii_lowercase);
    let fb = b.iter().map(u8::to_ascii_lowercase);
    fa.cmp(fb)
}

pub fn iequals(a: &[u8], b: &[u8]) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// ASCII case-insensitive substring test. An empty needle is always found.
pub fn icontains(s: &[u8], sub: &[u8]) -> bool {
    if sub.is_empty() {
        return true;
    }
    s.windows(sub.len()).any(|w| w.eq_ignore_ascii_case(sub))
}

pub fn equals(a: &[u8], b: &[u8]) -> bool {
    a == b
}

/// Removes leading and trailing spaces, tabs, CR and LF in place.
pub fn trim(s: &mut Vec<u8>) {
    let end = s.iter().rposition(|&b| !is_space(b)).map_or(0, |i| i + 1);
    s.truncate(end);
    let start = s.iter().position(|&b| !is_space(b)).unwrap_or(s.len());
    s.drain(..start);
}

/// Splits at every occurrence of `delim`. Empty fields are kept, so the
/// result always holds `count(delim) + 1` elements.
pub fn split(s: &[u8], delim: u8) -> Vec<Vec<u8>> {
    s.split(|&b| b == delim).map(<[u8]>::to_vec).collect()
}

/// Joins `parts` with a single `delim` byte between neighbours.
pub fn join<T: AsRef<[u8]>>(parts: &[T], delim: u8) -> Vec<u8> {
    let total = parts.iter().map(|p| p.as_ref().len() + 1).sum::<usize>();
    let mut out = Vec::with_capacity(total);
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(delim);
        }
        out.extend_from_slice(part.as_ref());
    }
    out
}

/// Left-to-right, non-overlapping replacement of `old` by `new`.
/// An empty `old` leaves the input untouched.
pub fn replace(s: &[u8], old: &[u8], new: &[u8]) -> Vec<u8> {
    if old.is_empty() {
        return s.to_vec();
    }
    let mut out = Vec::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        if s[i..].starts_with(old) {
            out.extend_from_slice(new);
            i += old.len();
        } else {
            out.push(s[i]);
            i += 1;
        }
    }
    out
}

pub fn to_upper(s: &[u8]) -> Vec<u8> {
    s.to_ascii_uppercase()
}

pub fn to_lower(s: &[u8]) -> Vec<u8> {
    s.to_ascii_lowercase()
}

pub fn starts_with(s: &[u8], prefix: &[u8]) -> bool {
    s.starts_with(prefix)
}

pub fn ends_with(s: &[u8], suffix: &[u8]) -> bool {
    s.ends_with(suffix)
}

pub fn contains(s: &[u8], sub: &[u8]) -> bool {
    find(s, sub).is_some()
}

/// Position of the first occurrence of `sub`, `None` on a miss.
pub fn index_of(s: &[u8], sub: &[u8]) -> Option<usize> {
    find(s, sub)
}

/// Number of non-overlapping occurrences of `sub`. An empty needle counts zero.
pub fn count(s: &[u8], sub: &[u8]) -> usize {
    if sub.is_empty() {
        return 0;
    }
    let mut n = 0;
    let mut rest = s;
    while let Some(pos) = find(rest, sub) {
        n += 1;
        rest = &rest[pos + sub.len()..];
    }
    n
}

/// Prepends `ch` until the result is `total` bytes long.
pub fn pad_left(s: &[u8], total: usize, ch: u8) -> Vec<u8> {
    if s.len() >= total {
        return s.to_vec();
    }
    let mut out = vec![ch; total - s.len()];
    out.extend_from_slice(s);
    out
}

/// Appends `ch` until the result is `total` bytes long.
pub fn pad_right(s: &[u8], total: usize, ch: u8) -> Vec<u8> {
    let mut out = s.to_vec();
    if out.len() < total {
        out.resize(total, ch);
    }
    out
}

/// Removes runs of `ch` from both ends.
pub fn strip(s: &[u8], ch: u8) -> Vec<u8> {
    let start = s.iter().position(|&b| b != ch).unwrap_or(s.len());
    let end = s.iter().rposition(|&b| b != ch).map_or(start, |i| i + 1);
    s[start..end].to_vec()
}

/// `s` repeated `n` times, cut at `max_len` bytes.
pub fn repeat(s: &[u8], n: usize, max_len: usize) -> Vec<u8> {
    let full = s.len().saturating_mul(n);
    let mut out = Vec::with_capacity(full.min(max_len));
    for _ in 0..n {
        let left = max_len - out.len();
        if left == 0 || s.is_empty() {
            break;
        }
        out.extend_from_slice(&s[..s.len().min(left)]);
    }
    out
}

/// Collapses every run of whitespace into one space and trims both ends.
pub fn normalize_spaces(s: &[u8]) -> Vec<u8> {
    let words: Vec<&[u8]> = s.split(|&b| is_space(b)).filter(|w| !w.is_empty()).collect();
    join(&words, b' ')
}

/// Removes one pair of matching surrounding quotes (`"..."` or `'...'`).
pub fn strip_quotes(s: &[u8]) -> Vec<u8> {
    match s {
        [first, inner @ .., last] if first == last && matches!(*first, b'"' | b'\'') => {
            inner.to_vec()
        }
        _ => s.to_vec(),
    }
}

/// Returns `len` bytes of `s` starting at `start`, clamped to the end of `s`.
/// `None` when `start` lies at or beyond the end.
pub fn substring(s: &[u8], start: usize, len: usize) -> Option<Vec<u8>> {
    if start >= s.len() {
        return None;
    }
    let end = start.saturating_add(len).min(s.len());
    Some(s[start..end].to_vec())
}

pub fn reverse(s: &[u8]) -> Vec<u8> {
    s.iter().rev().copied().collect()
}

pub fn append(dest: &[u8], src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(dest.len() + src.len());
    out.extend_from_slice(dest);
    out.extend_from_slice(src);
    out
}

/// Renders `format_args!` output into a fresh byte string.
///
/// ```
/// let s = io_kit::cstring::format(format_args!("{}-{:03}", "id", 7));
/// assert_eq!(s, b"id-007");
/// ```
pub fn format(args: fmt::Arguments<'_>) -> Vec<u8> {
    fmt::format(args).into_bytes()
}

/// Escapes quote, backslash and the `\n \r \t \b \f` control bytes.
/// Every other byte is copied unchanged.
pub fn escape_json(s: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() + s.len() / 8);
    for &b in s {
        let escaped = match b {
            b'"' => b'"',
            b'\\' => b'\\',
            b'\n' => b'n',
            b'\r' => b'r',
            b'\t' => b't',
            0x08 => b'b',
            0x0c => b'f',
            _ => {
                out.push(b);
                continue;
            }
        };
        out.push(b'\\');
        out.push(escaped);
    }
    out
}

fn parse_hex4(s: &[u8]) -> Option<u32> {
    if s.len() < 4 {
        return None;
    }
    s[..4].iter().try_fold(0u32, |acc, &b| {
        let digit = (b as char).to_digit(16)?;
        Some(acc * 16 + digit)
    })
}

fn push_code_point(out: &mut Vec<u8>, cp: u32) {
    match char::from_u32(cp) {
        Some(c) => {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
        None => out.push(b'?'),
    }
}

/// Reverses [`escape_json`] and decodes `\uXXXX` sequences (including
/// surrogate pairs) to UTF-8. A malformed `\u` escape becomes `?`.
pub fn unescape_json(s: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        let b = s[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }
        let Some(&c) = s.get(i + 1) else {
            out.push(b'\\');
            break;
        };
        i += 2;
        match c {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'u' => {
                let Some(hi) = parse_hex4(&s[i..]) else {
                    out.push(b'?');
                    continue;
                };
                i += 4;
                if (0xD800..0xDC00).contains(&hi) {
                    // high surrogate, only valid with a following low half
                    let low = s[i..]
                        .strip_prefix(b"\\u")
                        .and_then(parse_hex4)
                        .filter(|lo| (0xDC00..0xE000).contains(lo));
                    match low {
                        Some(lo) => {
                            i += 6;
                            push_code_point(&mut out, 0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00));
                        }
                        None => out.push(b'?'),
                    }
                } else {
                    push_code_point(&mut out, hi);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod bounded {
        use super::*;

        #[test]
        fn test_length_stops_at_terminator() {
            assert_eq!(length(b"hello\0world", 64), 5);
            assert_eq!(length(b"hello", 3), 3);
            assert_eq!(length(b"hello", 64), 5);
            assert_eq!(length(b"", 10), 0);
        }

        #[test]
        fn test_copy_is_bounded() {
            assert_eq!(copy(b"abcdef", 4), b"abcd");
            assert_eq!(copy(b"ab\0cd", 10), b"ab");
            assert!(length(&copy(b"abcdef", 4), 4) <= length(b"abcdef", 4));
        }

        #[test]
        fn test_concat_truncates() {
            assert_eq!(concat(b"foo", b"bar", 100), b"foobar");
            assert_eq!(concat(b"foo", b"bar", 5), b"foob");
            assert_eq!(concat(b"foo", b"bar", 2), b"f");
            assert!(concat(b"foo", b"bar", 0).is_empty());
        }

        #[test]
        fn test_compare() {
            assert_eq!(compare(b"abc", b"abd", 10), Ordering::Less);
            assert_eq!(compare(b"abc", b"abd", 2), Ordering::Equal);
            assert_eq!(compare(b"b", b"a", 10), Ordering::Greater);
            assert_eq!(compare(b"\xff", b"a", 10), Ordering::Greater);
            assert_eq!(compare(b"abc\0x", b"abc\0y", 10), Ordering::Equal);
        }
    }

    mod case {
        use super::*;

        #[test]
        fn test_icmp_and_iequals() {
            assert_eq!(icmp(b"Hello", b"hELLO"), Ordering::Equal);
            assert_eq!(icmp(b"apple", b"Banana"), Ordering::Less);
            assert!(iequals(b"MiXeD", b"mixed"));
            assert!(!iequals(b"mixed", b"mixe"));
        }

        #[test]
        fn test_icontains() {
            assert!(icontains(b"Hello World", b"WORLD"));
            assert!(icontains(b"abc", b""));
            assert!(!icontains(b"abc", b"abcd"));
        }

        #[test]
        fn test_case_fold_is_ascii_only() {
            assert_eq!(to_upper(b"abc\xe9"), b"ABC\xe9");
            assert_eq!(to_lower(b"ABC-1"), b"abc-1");
        }
    }

    mod shaping {
        use super::*;

        #[test]
        fn test_trim_preserves_inner_whitespace() {
            let mut s = b" \t hello  world \r\n".to_vec();
            trim(&mut s);
            assert_eq!(s, b"hello  world");

            let mut blank = b" \n\t ".to_vec();
            trim(&mut blank);
            assert!(blank.is_empty());
        }

        #[test]
        fn test_split_keeps_empty_fields() {
            let parts = split(b"a,,b,", b',');
            assert_eq!(parts, vec![b"a".to_vec(), vec![], b"b".to_vec(), vec![]]);
            assert_eq!(split(b"", b','), vec![Vec::<u8>::new()]);
        }

        #[test]
        fn test_join_has_no_trailing_delimiter() {
            assert_eq!(join(&["a", "b", "c"], b'/'), b"a/b/c");
            assert!(join::<&str>(&[], b'/').is_empty());
        }

        #[test]
        fn test_replace_non_overlapping() {
            assert_eq!(replace(b"aaaa", b"aa", b"b"), b"bb");
            assert_eq!(replace(b"hello world", b"o", b"0"), b"hell0 w0rld");
            assert_eq!(replace(b"abc", b"", b"x"), b"abc");
        }

        #[test]
        fn test_pad() {
            assert_eq!(pad_left(b"7", 3, b'0'), b"007");
            assert_eq!(pad_right(b"ab", 4, b'.'), b"ab..");
            assert_eq!(pad_left(b"long", 2, b'0'), b"long");
        }

        #[test]
        fn test_strip_and_repeat() {
            assert_eq!(strip(b"xxhixx", b'x'), b"hi");
            assert!(strip(b"xxxx", b'x').is_empty());
            assert_eq!(repeat(b"ab", 3, 100), b"ababab");
            assert_eq!(repeat(b"ab", 3, 5), b"ababa");
            assert!(repeat(b"ab", 0, 5).is_empty());
        }

        #[test]
        fn test_normalize_spaces() {
            assert_eq!(normalize_spaces(b"  a \t\n b   c "), b"a b c");
            assert!(normalize_spaces(b"   ").is_empty());
        }

        #[test]
        fn test_strip_quotes() {
            assert_eq!(strip_quotes(b"\"quoted\""), b"quoted");
            assert_eq!(strip_quotes(b"'single'"), b"single");
            assert_eq!(strip_quotes(b"'mixed\""), b"'mixed\"");
            assert_eq!(strip_quotes(b"\""), b"\"");
            assert_eq!(strip_quotes(b"\"\""), b"");
        }
    }

    mod queries {
        use super::*;

        #[test]
        fn test_index_of_and_contains() {
            assert_eq!(index_of(b"hello", b"ll"), Some(2));
            assert_eq!(index_of(b"hello", b"z"), None);
            assert!(contains(b"hello", b"ell"));
            assert!(starts_with(b"hello", b"he"));
            assert!(ends_with(b"hello", b"lo"));
        }

        #[test]
        fn test_count_substring() {
            assert_eq!(count(b"abababa", b"aba"), 2);
            assert_eq!(count(b"abc", b""), 0);
        }

        #[test]
        fn test_substring_reverse_append() {
            assert_eq!(substring(b"hello", 1, 3), Some(b"ell".to_vec()));
            assert_eq!(substring(b"hello", 3, 99), Some(b"lo".to_vec()));
            assert_eq!(substring(b"hello", 5, 1), None);
            assert_eq!(reverse(b"abc"), b"cba");
            assert_eq!(append(b"foo", b"bar"), b"foobar");
        }

        #[test]
        fn test_format() {
            assert_eq!(format(format_args!("{}:{}", "x", 42)), b"x:42");
        }
    }

    mod json {
        use super::*;

        #[test]
        fn test_escape_json() {
            assert_eq!(escape_json(b"a\"b\\c\n"), b"a\\\"b\\\\c\\n");
            assert_eq!(escape_json(b"\t\r\x08\x0c"), b"\\t\\r\\b\\f");
        }

        #[test]
        fn test_unescape_json() {
            assert_eq!(unescape_json(b"line\\nnext"), b"line\nnext");
            assert_eq!(unescape_json(b"\\u0041\\u00e9"), "A\u{e9}".as_bytes());
            assert_eq!(unescape_json(b"\\ud83d\\ude00"), "\u{1F600}".as_bytes());
            assert_eq!(unescape_json(b"\\u12"), b"?12");
            assert_eq!(unescape_json(b"\\ud83d"), b"?");
            assert_eq!(unescape_json(b"tail\\"), b"tail\\");
        }
    }

    fn json_safe_bytes() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(
            any::<u8>().prop_filter("bare control byte", |&b| {
                b >= 0x20 || matches!(b, b'\n' | b'\r' | b'\t' | 0x08 | 0x0c)
            }),
            0..64,
        )
    }

    proptest! {
        #[test]
        fn prop_trim_is_idempotent(s in prop::collection::vec(any::<u8>(), 0..64)) {
            let mut once = s.clone();
            trim(&mut once);
            let mut twice = once.clone();
            trim(&mut twice);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_normalize_spaces_is_idempotent(s in "[ a-c\t\r\n]{0,40}") {
            let once = normalize_spaces(s.as_bytes());
            prop_assert_eq!(normalize_spaces(&once), once);
        }

        #[test]
        fn prop_concat_fits(a in "[a-z]{0,20}", b in "[a-z]{0,20}", n in 0usize..50) {
            prop_assert!(concat(a.as_bytes(), b.as_bytes(), n).len() <= n);
        }

        #[test]
        fn prop_json_escape_roundtrip(s in json_safe_bytes()) {
            prop_assert_eq!(unescape_json(&escape_json(&s)), s);
        }
    }
}
