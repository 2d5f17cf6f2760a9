//! Positional codecs: Base64, Base32, binary and hexadecimal.

use super::CipherError;

const BASE64_STD: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const BASE64_URL: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
const BASE32: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";
const PAD: u8 = b'=';

fn malformed(codec: &'static str, reason: &'static str) -> CipherError {
    CipherError::Malformed { codec, reason }
}

/// Inserts a newline after every `width` bytes. A zero width leaves `data` untouched.
fn wrap_lines(data: Vec<u8>, width: usize) -> Vec<u8> {
    if width == 0 || data.len() <= width {
        return data;
    }
    let mut out = Vec::with_capacity(data.len() + data.len() / width);
    for (i, line) in data.chunks(width).enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        out.extend_from_slice(line);
    }
    out
}

/// Collects the symbol values of `text`, skipping ASCII whitespace. Once a pad byte is
/// seen only pad bytes and whitespace may follow.
fn symbols<F>(text: &[u8], codec: &'static str, value_of: F) -> Result<Vec<u8>, CipherError>
where
    F: Fn(u8) -> Option<u8>,
{
    let mut values = Vec::with_capacity(text.len());
    let mut padded = false;
    for &b in text {
        if b.is_ascii_whitespace() {
            continue;
        }
        if b == PAD {
            padded = true;
            continue;
        }
        if padded {
            return Err(malformed(codec, "data after padding"));
        }
        values.push(value_of(b).ok_or_else(|| malformed(codec, "invalid character"))?);
    }
    Ok(values)
}

pub fn base64_encode(data: &[u8], url: bool, wrap: usize) -> Vec<u8> {
    let alphabet = if url { BASE64_URL } else { BASE64_STD };
    let mut out = Vec::with_capacity(data.len().div_ceil(3) * 4);

    for chunk in data.chunks(3) {
        let b = [chunk[0], *chunk.get(1).unwrap_or(&0), *chunk.get(2).unwrap_or(&0)];
        let n = (b[0] as u32) << 16 | (b[1] as u32) << 8 | b[2] as u32;
        let emitted = chunk.len() + 1;
        for i in 0..4 {
            if i < emitted {
                out.push(alphabet[(n >> (18 - 6 * i) & 0x3f) as usize]);
            } else {
                out.push(PAD);
            }
        }
    }
    wrap_lines(out, wrap)
}

pub fn base64_decode(text: &[u8], url: bool) -> Result<Vec<u8>, CipherError> {
    let alphabet = if url { BASE64_URL } else { BASE64_STD };
    let values = symbols(text, "base64", |b| {
        alphabet.iter().position(|&a| a == b).map(|i| i as u8)
    })?;
    if values.len() % 4 == 1 {
        return Err(malformed("base64", "truncated quantum"));
    }

    let mut out = Vec::with_capacity(values.len() / 4 * 3 + 2);
    for quantum in values.chunks(4) {
        let n = quantum
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, &v)| acc | (v as u32) << (18 - 6 * i));
        let bytes = n.to_be_bytes();
        out.extend_from_slice(&bytes[1..quantum.len()]);
    }
    Ok(out)
}

pub fn base32_encode(data: &[u8], wrap: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len().div_ceil(5) * 8);

    for chunk in data.chunks(5) {
        let mut block = [0u8; 8];
        block[3..3 + chunk.len()].copy_from_slice(chunk);
        let n = u64::from_be_bytes(block);
        // symbols carrying at least one input bit
        let emitted = (chunk.len() * 8).div_ceil(5);
        for i in 0..8 {
            if i < emitted {
                out.push(BASE32[(n >> (35 - 5 * i) & 0x1f) as usize]);
            } else {
                out.push(PAD);
            }
        }
    }
    wrap_lines(out, wrap)
}

pub fn base32_decode(text: &[u8]) -> Result<Vec<u8>, CipherError> {
    let values = symbols(text, "base32", |b| {
        let b = b.to_ascii_uppercase();
        BASE32.iter().position(|&a| a == b).map(|i| i as u8)
    })?;

    let mut out = Vec::with_capacity(values.len() / 8 * 5 + 4);
    for block in values.chunks(8) {
        let len = match block.len() {
            8 => 5,
            7 => 4,
            5 => 3,
            4 => 2,
            2 => 1,
            _ => return Err(malformed("base32", "truncated block")),
        };
        let n = block
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, &v)| acc | (v as u64) << (35 - 5 * i));
        out.extend_from_slice(&n.to_be_bytes()[3..3 + len]);
    }
    Ok(out)
}

/// Eight `0`/`1` symbols per byte, most significant bit first, groups joined by `sep`.
pub fn binary_encode(data: &[u8], sep: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * (8 + sep.len()));
    for (i, &b) in data.iter().enumerate() {
        if i > 0 {
            out.extend_from_slice(sep);
        }
        for bit in (0..8).rev() {
            out.push(if b >> bit & 1 == 1 { b'1' } else { b'0' });
        }
    }
    out
}

pub fn binary_decode(text: &[u8], sep: &[u8]) -> Result<Vec<u8>, CipherError> {
    let bits = if sep.is_empty() {
        text.to_vec()
    } else {
        crate::cstring::replace(text, sep, b"")
    };
    if bits.len() % 8 != 0 {
        return Err(malformed("binary", "length is not a multiple of 8"));
    }

    bits.chunks(8)
        .map(|group| {
            group.iter().try_fold(0u8, |acc, &b| match b {
                b'0' => Ok(acc << 1),
                b'1' => Ok(acc << 1 | 1),
                _ => Err(malformed("binary", "expected only 0 and 1")),
            })
        })
        .collect()
}

pub fn hex_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 2);
    for &b in data {
        out.push(HEX_UPPER[(b >> 4) as usize]);
        out.push(HEX_UPPER[(b & 0x0f) as usize]);
    }
    out
}

pub fn hex_decode(text: &[u8]) -> Result<Vec<u8>, CipherError> {
    if text.len() % 2 != 0 {
        return Err(malformed("hex", "odd length"));
    }

    let nibble = |b: u8| match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(malformed("hex", "expected hex digits")),
    };
    text.chunks(2)
        .map(|pair| -> Result<u8, CipherError> { Ok(nibble(pair[0])? << 4 | nibble(pair[1])?) })
        .collect()
}
