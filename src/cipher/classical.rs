//! Letter-substitution and transposition codecs.

const MORSE: [&str; 36] = [
    ".-", "-...", "-.-.", "-..", ".", "..-.", "--.", "....", "..", ".---", "-.-", ".-..", "--",
    "-.", "---", ".--.", "--.-", ".-.", "...", "-", "..-", "...-", ".--", "-..-", "-.--", "--..",
    "-----", ".----", "..---", "...--", "....-", ".....", "-....", "--...", "---..", "----.",
];

const MORSE_WORD_SEP: &str = "/";

const LEET: [&str; 26] = [
    "4", "8", "(", "|)", "3", "|=", "6", "#", "1", "_|", "|<", "|_", "|\\/|", "|\\|", "0", "|*",
    "0_", "|2", "5", "7", "|_|", "\\/", "\\/\\/", "><", "`/", "2",
];

const BACON_GROUP: usize = 5;

/// Rotates every ASCII letter by `shift` positions within its case; other bytes pass through.
pub fn caesar(text: &[u8], shift: i32) -> Vec<u8> {
    let shift = shift.rem_euclid(26) as u8;
    text.iter().map(|&b| rotate(b, shift)).collect()
}

fn rotate(b: u8, shift: u8) -> u8 {
    match b {
        b'a'..=b'z' => b'a' + (b - b'a' + shift) % 26,
        b'A'..=b'Z' => b'A' + (b - b'A' + shift) % 26,
        _ => b,
    }
}

pub fn atbash(text: &[u8]) -> Vec<u8> {
    text.iter()
        .map(|&b| match b {
            b'a'..=b'z' => b'z' - (b - b'a'),
            b'A'..=b'Z' => b'Z' - (b - b'A'),
            _ => b,
        })
        .collect()
}

/// Vigenère over ASCII letters. `key` holds upper-case letters and is never empty.
/// The key position only advances on letters.
pub fn vigenere(text: &[u8], key: &[u8], decode: bool) -> Vec<u8> {
    if key.is_empty() {
        return text.to_vec();
    }

    let mut ki = 0;
    text.iter()
        .map(|&b| {
            if !b.is_ascii_alphabetic() {
                return b;
            }
            let k = key[ki % key.len()].to_ascii_uppercase().wrapping_sub(b'A') % 26;
            ki += 1;
            rotate(b, if decode { 26 - k } else { k })
        })
        .collect()
}

/// Rail index of each position along the zigzag.
fn zigzag(len: usize, rails: usize) -> Vec<usize> {
    let cycle = 2 * (rails - 1);
    (0..len)
        .map(|i| {
            let k = i % cycle;
            if k < rails { k } else { cycle - k }
        })
        .collect()
}

/// Positions of the plain text in the order they appear in the cipher text.
///
/// More rails than bytes leave the text unchanged, so the count is capped at the length.
fn rail_order(len: usize, rails: usize) -> Vec<usize> {
    let pattern = zigzag(len, rails.clamp(2, len.max(2)));
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by_key(|&i| pattern[i]);
    order
}

pub fn railfence_encode(text: &[u8], rails: usize) -> Vec<u8> {
    rail_order(text.len(), rails)
        .into_iter()
        .map(|i| text[i])
        .collect()
}

pub fn railfence_decode(text: &[u8], rails: usize) -> Vec<u8> {
    let mut out = vec![0u8; text.len()];
    for (&pos, &b) in rail_order(text.len(), rails).iter().zip(text) {
        out[pos] = b;
    }
    out
}

/// Letters become five-symbol A/B groups (the binary index of the letter, A = 0);
/// spaces pass through, everything else is dropped.
pub fn baconian_encode(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * BACON_GROUP);
    for &b in text {
        if b.is_ascii_alphabetic() {
            let index = b.to_ascii_uppercase() - b'A';
            for bit in (0..BACON_GROUP).rev() {
                out.push(if index >> bit & 1 == 1 { b'B' } else { b'A' });
            }
        } else if b == b' ' {
            out.push(b' ');
        }
    }
    out
}

pub fn baconian_decode(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() / BACON_GROUP + 1);
    let mut i = 0;
    while i < text.len() {
        if text[i] == b' ' {
            out.push(b' ');
            i += 1;
            continue;
        }

        let end = (i + BACON_GROUP).min(text.len());
        let group = &text[i..end];
        let index = if group.len() == BACON_GROUP {
            group.iter().try_fold(0u8, |acc, &b| match b.to_ascii_uppercase() {
                b'A' => Some(acc << 1),
                b'B' => Some(acc << 1 | 1),
                _ => None,
            })
        } else {
            None
        };

        match index {
            Some(index) if index < 26 => out.push(b'A' + index),
            _ => out.push(b'?'),
        }
        i = end;
    }
    out
}

/// Upper-cases letters and digits into Morse tokens joined by single spaces; a space becomes
/// the word separator `/`. Other bytes are dropped.
pub fn morse_encode(text: &[u8]) -> Vec<u8> {
    let mut tokens: Vec<&str> = Vec::with_capacity(text.len());
    for &b in text {
        match b.to_ascii_uppercase() {
            c @ b'A'..=b'Z' => tokens.push(MORSE[(c - b'A') as usize]),
            c @ b'0'..=b'9' => tokens.push(MORSE[(c - b'0') as usize + 26]),
            b' ' => tokens.push(MORSE_WORD_SEP),
            _ => {}
        }
    }
    tokens.join(" ").into_bytes()
}

pub fn morse_decode(text: &[u8]) -> Vec<u8> {
    text.split(|b| b.is_ascii_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            if token == MORSE_WORD_SEP.as_bytes() {
                return b' ';
            }
            match MORSE.iter().position(|code| code.as_bytes() == token) {
                Some(i) if i < 26 => b'A' + i as u8,
                Some(i) => b'0' + (i - 26) as u8,
                None => b'?',
            }
        })
        .collect()
}

pub fn leet_encode(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for &b in text {
        if b.is_ascii_alphabetic() {
            out.extend_from_slice(LEET[(b.to_ascii_uppercase() - b'A') as usize].as_bytes());
        } else {
            out.push(b);
        }
    }
    out
}

/// Longest glyph match wins at each position; decoded letters are upper-case and bytes that
/// start no glyph pass through.
pub fn leet_decode(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut rest = text;
    while let Some(&first) = rest.first() {
        let best = LEET
            .iter()
            .enumerate()
            .filter(|(_, glyph)| rest.starts_with(glyph.as_bytes()))
            .max_by_key(|(_, glyph)| glyph.len());

        match best {
            Some((i, glyph)) => {
                out.push(b'A' + i as u8);
                rest = &rest[glyph.len()..];
            }
            None => {
                out.push(first);
                rest = &rest[1..];
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caesar_wraps_both_cases() {
        assert_eq!(caesar(b"xyz XYZ", 3), b"abc ABC");
        assert_eq!(caesar(b"abc", 23), b"xyz");
        assert_eq!(caesar(b"1-2", 5), b"1-2");
    }

    #[test]
    fn test_atbash() {
        assert_eq!(atbash(b"Hello"), b"Svool");
        assert_eq!(atbash(b"azAZ09"), b"zaZA09");
    }

    #[test]
    fn test_vigenere_skips_non_letters() {
        assert_eq!(vigenere(b"A-A", b"B", false), b"B-B");
        assert_eq!(vigenere(b"ab", b"KEY", false), b"kf");
        assert_eq!(vigenere(b"kf", b"KEY", true), b"ab");
    }

    #[test]
    fn test_railfence_degenerate() {
        assert_eq!(railfence_encode(b"ab", 5), b"ab");
        assert_eq!(railfence_encode(b"abcd", 2), b"acbd");
        assert_eq!(railfence_decode(b"acbd", 2), b"abcd");
        assert!(railfence_encode(b"", 3).is_empty());
        assert_eq!(railfence_encode(b"abc", usize::MAX), b"abc");
        assert_eq!(railfence_decode(b"abc", usize::MAX), b"abc");
    }

    #[test]
    fn test_baconian_table() {
        assert_eq!(baconian_encode(b"ABC"), b"AAAAAAAAABAAABA");
        assert_eq!(baconian_encode(b"z"), b"BBAAB");
        assert_eq!(baconian_encode(b"a b!"), b"AAAAA AAAAB");
        assert_eq!(baconian_decode(b"AAAAA AAAAB"), b"A B");
    }

    #[test]
    fn test_baconian_unknown_groups() {
        assert_eq!(baconian_decode(b"BBBBB"), b"?");
        assert_eq!(baconian_decode(b"AAXAA"), b"?");
        assert_eq!(baconian_decode(b"AAAAAAB"), b"A?");
    }

    #[test]
    fn test_morse_words_and_unknown_tokens() {
        assert_eq!(morse_encode(b"sos 911!"), b"... --- ... / ----. .---- .----");
        assert_eq!(morse_decode(b"... --- ... / ----. .---- .----"), b"SOS 911");
        assert_eq!(morse_decode(b"...---... .-"), b"?A");
        assert_eq!(morse_decode(b"  .-   -...  "), b"AB");
    }

    #[test]
    fn test_leet() {
        assert_eq!(leet_encode(b"Leet!"), b"|_337!");
        assert_eq!(leet_decode(b"|_337!"), b"LEET!");
        assert_eq!(leet_decode(b"|_|"), b"U");
        assert_eq!(leet_decode(b"\\/\\/"), b"W");
        assert_eq!(leet_decode(b"0_0"), b"QO");
    }
}
