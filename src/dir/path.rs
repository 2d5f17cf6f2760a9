//! String-level path helpers. Both `/` and `\` are accepted as separators on input;
//! [`normalize`] and [`join`] emit the platform separator.

use std::path::MAIN_SEPARATOR;

fn is_sep(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Length of a `C:` drive prefix, if any.
fn drive_len(p: &str) -> usize {
    let bytes = p.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        2
    } else {
        0
    }
}

/// True for `/x`, `\x` and `C:\x` forms.
pub fn is_absolute(p: &str) -> bool {
    p[drive_len(p)..].starts_with(is_sep)
}

/// Appends `child` to `base` with exactly one separator between them. An absolute `child`
/// replaces `base`.
pub fn join(base: &str, child: &str) -> String {
    if base.is_empty() || is_absolute(child) {
        return child.to_string();
    }
    if child.is_empty() {
        return base.to_string();
    }
    let mut out = base.trim_end_matches(is_sep).to_string();
    let is_root = out.len() == drive_len(base) && base.len() > out.len();
    if is_root {
        // keep the root separator of "/" or "C:\"
        out = base[..out.len() + 1].to_string();
    } else {
        out.push(MAIN_SEPARATOR);
    }
    out.push_str(child.trim_start_matches(is_sep));
    out
}

/// Last component, ignoring trailing separators. A root is its own basename.
pub fn basename(p: &str) -> &str {
    let trimmed = p.trim_end_matches(is_sep);
    if trimmed.is_empty() {
        return if p.is_empty() { "" } else { &p[..1] };
    }
    match trimmed.rfind(is_sep) {
        Some(i) => &trimmed[i + 1..],
        None => &trimmed[drive_len(trimmed)..],
    }
}

/// Everything before the last component; `.` for a bare name, the root for a top-level
/// path.
pub fn dirname(p: &str) -> String {
    let trimmed = p.trim_end_matches(is_sep);
    if trimmed.is_empty() {
        return if p.is_empty() { ".".to_string() } else { p[..1].to_string() };
    }
    match trimmed.rfind(is_sep) {
        Some(i) => {
            let parent = trimmed[..i].trim_end_matches(is_sep);
            if parent.len() == drive_len(trimmed) {
                // parent is the root
                trimmed[..parent.len() + 1].to_string()
            } else {
                parent.to_string()
            }
        }
        None => {
            let drive = drive_len(trimmed);
            if drive > 0 { trimmed[..drive].to_string() } else { ".".to_string() }
        }
    }
}

/// Collapses runs of separators into one platform separator and strips a trailing
/// separator unless the path is a root.
pub fn normalize(p: &str) -> String {
    let mut out = String::with_capacity(p.len());
    let mut last_was_sep = false;
    for c in p.chars() {
        if is_sep(c) {
            if !last_was_sep {
                out.push(MAIN_SEPARATOR);
            }
            last_was_sep = true;
        } else {
            out.push(c);
            last_was_sep = false;
        }
    }
    if out.len() > drive_len(&out) + 1 && out.ends_with(MAIN_SEPARATOR) {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native(p: &str) -> String {
        p.replace('/', &MAIN_SEPARATOR.to_string())
    }

    #[test]
    fn test_is_absolute() {
        assert!(is_absolute("/usr/bin"));
        assert!(is_absolute("\\Windows"));
        assert!(is_absolute("C:\\Windows"));
        assert!(is_absolute("c:/tmp"));
        assert!(!is_absolute("usr/bin"));
        assert!(!is_absolute("C:relative"));
        assert!(!is_absolute(""));
    }

    #[test]
    fn test_join() {
        assert_eq!(join("a", "b"), native("a/b"));
        assert_eq!(join("a/", "/b"), "/b");
        assert_eq!(join("a//", "b"), native("a/b"));
        assert_eq!(join("/", "b"), "/b");
        assert_eq!(join("", "b"), "b");
        assert_eq!(join("a", ""), "a");
        assert_eq!(join("C:\\", "x"), "C:\\x");
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("/a/b/c.txt"), "c.txt");
        assert_eq!(basename("/a/b/"), "b");
        assert_eq!(basename("c.txt"), "c.txt");
        assert_eq!(basename("C:\\dir\\f"), "f");
        assert_eq!(basename("/"), "/");
        assert_eq!(basename(""), "");
    }

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("/a/b/c.txt"), "/a/b");
        assert_eq!(dirname("/a/b/"), "/a");
        assert_eq!(dirname("/a"), "/");
        assert_eq!(dirname("a"), ".");
        assert_eq!(dirname("a//b"), "a");
        assert_eq!(dirname("/"), "/");
        assert_eq!(dirname(""), ".");
        assert_eq!(dirname("C:\\x"), "C:\\");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a//b///c/"), native("a/b/c"));
        assert_eq!(normalize("a\\b"), native("a/b"));
        assert_eq!(normalize("/"), native("/"));
        assert_eq!(normalize("//"), native("/"));
        assert_eq!(normalize("C:\\\\"), native("C:/"));
        assert_eq!(normalize(""), "");
    }
}
