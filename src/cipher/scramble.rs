//! Binary-safe byte scramblers: repeating-key XOR and a seeded Fisher-Yates shuffle.

/// Next state of the 31-bit linear congruential generator driving [`shuffle`].
fn lcg_next(x: u32) -> u32 {
    x.wrapping_mul(1_103_515_245).wrapping_add(12_345) & 0x7fff_ffff
}

/// XORs every byte with the key, cycling through it. Its own inverse.
pub fn xor(data: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return data.to_vec();
    }
    data.iter()
        .zip(key.iter().cycle())
        .map(|(&b, &k)| b ^ k)
        .collect()
}

/// Source index of every output position, the same for a given length and seed.
fn permutation(len: usize, mut seed: u32) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..len).collect();
    for i in (1..len).rev() {
        seed = lcg_next(seed);
        let j = seed as usize % (i + 1);
        idx.swap(i, j);
    }
    idx
}

pub fn shuffle(data: &[u8], seed: u32) -> Vec<u8> {
    permutation(data.len(), seed)
        .into_iter()
        .map(|i| data[i])
        .collect()
}

pub fn unshuffle(data: &[u8], seed: u32) -> Vec<u8> {
    let mut out = vec![0u8; data.len()];
    for (pos, src) in permutation(data.len(), seed).into_iter().enumerate() {
        out[src] = data[pos];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcg_stays_in_31_bits() {
        assert_eq!(lcg_next(0), 12_345);
        let mut x = u32::MAX;
        for _ in 0..100 {
            x = lcg_next(x);
            assert!(x <= 0x7fff_ffff);
        }
    }

    #[test]
    fn test_xor() {
        assert_eq!(xor(b"\x00\x01\x02", b"\x0f"), b"\x0f\x0e\x0d");
        assert_eq!(xor(&xor(b"secret", b"ab"), b"ab"), b"secret");
        assert_eq!(xor(b"same", b""), b"same");
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let data: Vec<u8> = (0..=255).collect();
        let shuffled = shuffle(&data, 7);
        assert_ne!(shuffled, data);

        let mut sorted = shuffled.clone();
        sorted.sort();
        assert_eq!(sorted, data);

        assert_eq!(shuffle(&data, 7), shuffled);
        assert_ne!(shuffle(&data, 8), shuffled);
        assert_eq!(unshuffle(&shuffled, 7), data);
    }

    #[test]
    fn test_shuffle_short_inputs() {
        assert!(shuffle(b"", 1).is_empty());
        assert_eq!(shuffle(b"x", 1), b"x");
        assert_eq!(unshuffle(b"x", 1), b"x");
    }
}
