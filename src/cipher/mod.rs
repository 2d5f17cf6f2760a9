//! Classical ciphers and text codecs behind a single id-keyed registry.
//!
//! Every codec is a pair of pure functions over byte strings. A codec is chosen by an id
//! string of the form `id[:name=value,...]`, e.g. `caesar:shift=5` or `base64:url=1,wrap=76`.
//! Id lookup is ASCII case-insensitive; unknown parameter names are ignored.
//!
//! ### Registered ids:
//! - `caesar`, `rot13`, `atbash`, `vigenere`, `railfence`, `baconian`, `morse`, `leet`
//! - `base64`, `base32`, `binary`, `hex` (alias `haxor`)
//! - `xor`, `shuffle` (binary-safe byte scramblers)
//!
//! ### Example:
//! ```
//! use io_kit::cipher;
//!
//! let secret = cipher::encode(b"Hello, World!", "caesar").unwrap();
//! assert_eq!(secret, b"Khoor, Zruog!");
//! assert_eq!(cipher::decode(&secret, "CAESAR").unwrap(), b"Hello, World!");
//! ```

mod classical;
mod radix;
mod scramble;

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("unknown cipher id: {0:?}")]
    UnknownCipher(String),
    #[error("invalid value {value:?} for parameter {name:?}")]
    InvalidParam { name: String, value: String },
    #[error("malformed {codec} input: {reason}")]
    Malformed {
        codec: &'static str,
        reason: &'static str,
    },
}

/// The codec families known to the registry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Codec {
    Caesar,
    Rot13,
    Atbash,
    Vigenere,
    RailFence,
    Baconian,
    Morse,
    Leet,
    Base64,
    Base32,
    Binary,
    Hex,
    Xor,
    Shuffle,
}

const REGISTRY: &[(&str, Codec)] = &[
    ("caesar", Codec::Caesar),
    ("rot13", Codec::Rot13),
    ("atbash", Codec::Atbash),
    ("vigenere", Codec::Vigenere),
    ("railfence", Codec::RailFence),
    ("baconian", Codec::Baconian),
    ("morse", Codec::Morse),
    ("leet", Codec::Leet),
    ("base64", Codec::Base64),
    ("base32", Codec::Base32),
    ("binary", Codec::Binary),
    ("hex", Codec::Hex),
    ("haxor", Codec::Hex),
    ("xor", Codec::Xor),
    ("shuffle", Codec::Shuffle),
];

const DEFAULT_SHIFT: i32 = 3;
const DEFAULT_KEY: &str = "KEY";
const DEFAULT_RAILS: usize = 3;
const DEFAULT_SEED: u32 = 0;

impl Codec {
    /// Looks up a bare id (no parameters), ignoring ASCII case.
    pub fn from_id(id: &str) -> Option<Codec> {
        REGISTRY
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(id))
            .map(|&(_, codec)| codec)
    }

    /// Canonical id of the codec.
    pub fn id(&self) -> &'static str {
        REGISTRY
            .iter()
            .find(|(_, codec)| codec == self)
            .map(|&(name, _)| name)
            .unwrap_or_default()
    }

    /// All registered ids, aliases included.
    pub fn ids() -> impl Iterator<Item = &'static str> {
        REGISTRY.iter().map(|&(name, _)| name)
    }
}

/// A codec together with the parameters parsed from its id string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherSpec {
    pub codec: Codec,
    /// Caesar rotation, reduced modulo 26.
    pub shift: i32,
    /// Vigenère key (upper-cased letters only) or XOR key (any bytes).
    pub key: Vec<u8>,
    /// Rail-fence rail count, at least 2.
    pub rails: usize,
    /// Separator placed between binary groups.
    pub sep: Vec<u8>,
    /// Use the URL-safe base64 alphabet.
    pub url: bool,
    /// Line width for base64/base32 output; 0 disables wrapping.
    pub wrap: usize,
    /// Reverse the encoded form.
    pub reverse: bool,
    /// Shuffle generator seed.
    pub seed: u32,
}

impl CipherSpec {
    pub fn new(codec: Codec) -> Self {
        Self {
            codec,
            shift: DEFAULT_SHIFT,
            key: DEFAULT_KEY.as_bytes().to_vec(),
            rails: DEFAULT_RAILS,
            sep: Vec::new(),
            url: false,
            wrap: 0,
            reverse: false,
            seed: DEFAULT_SEED,
        }
    }

    fn set_param(&mut self, name: &str, value: &str) -> Result<(), CipherError> {
        let invalid = || CipherError::InvalidParam {
            name: name.to_string(),
            value: value.to_string(),
        };

        match name.to_ascii_lowercase().as_str() {
            "shift" => self.shift = value.trim().parse().map_err(|_| invalid())?,
            "key" if self.codec == Codec::Xor => {
                if value.is_empty() {
                    return Err(invalid());
                }
                self.key = value.as_bytes().to_vec();
            }
            "key" => {
                if value.is_empty() || !value.bytes().all(|b| b.is_ascii_alphabetic()) {
                    return Err(invalid());
                }
                self.key = value.to_ascii_uppercase().into_bytes();
            }
            "rails" => {
                let rails: usize = value.trim().parse().map_err(|_| invalid())?;
                if rails < 2 {
                    return Err(invalid());
                }
                self.rails = rails;
            }
            "sep" => {
                // a separator made of digits could not be told apart from the bits
                if value.bytes().any(|b| b == b'0' || b == b'1') {
                    return Err(invalid());
                }
                self.sep = value.as_bytes().to_vec();
            }
            "url" => self.url = parse_flag(value).ok_or_else(invalid)?,
            "wrap" => self.wrap = value.trim().parse().map_err(|_| invalid())?,
            "reverse" => self.reverse = parse_flag(value).ok_or_else(invalid)?,
            "seed" => self.seed = value.trim().parse().map_err(|_| invalid())?,
            _ => {}
        }
        Ok(())
    }

    pub fn encode(&self, text: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut out = match self.codec {
            Codec::Caesar => classical::caesar(text, self.shift),
            Codec::Rot13 => classical::caesar(text, 13),
            Codec::Atbash => classical::atbash(text),
            Codec::Vigenere => classical::vigenere(text, &self.key, false),
            Codec::RailFence => classical::railfence_encode(text, self.rails),
            Codec::Baconian => classical::baconian_encode(text),
            Codec::Morse => classical::morse_encode(text),
            Codec::Leet => classical::leet_encode(text),
            Codec::Base64 => radix::base64_encode(text, self.url, self.wrap),
            Codec::Base32 => radix::base32_encode(text, self.wrap),
            Codec::Binary => radix::binary_encode(text, &self.sep),
            Codec::Hex => radix::hex_encode(text),
            Codec::Xor => scramble::xor(text, &self.key),
            Codec::Shuffle => scramble::shuffle(text, self.seed),
        };
        if self.reverse {
            out.reverse();
        }
        Ok(out)
    }

    pub fn decode(&self, text: &[u8]) -> Result<Vec<u8>, CipherError> {
        let reversed;
        let text = if self.reverse {
            reversed = text.iter().rev().copied().collect::<Vec<u8>>();
            &reversed[..]
        } else {
            text
        };

        let out = match self.codec {
            Codec::Caesar => classical::caesar(text, 26 - self.shift.rem_euclid(26)),
            Codec::Rot13 => classical::caesar(text, 13),
            Codec::Atbash => classical::atbash(text),
            Codec::Vigenere => classical::vigenere(text, &self.key, true),
            Codec::RailFence => classical::railfence_decode(text, self.rails),
            Codec::Baconian => classical::baconian_decode(text),
            Codec::Morse => classical::morse_decode(text),
            Codec::Leet => classical::leet_decode(text),
            Codec::Base64 => radix::base64_decode(text, self.url)?,
            Codec::Base32 => radix::base32_decode(text)?,
            Codec::Binary => radix::binary_decode(text, &self.sep)?,
            Codec::Hex => radix::hex_decode(text)?,
            Codec::Xor => scramble::xor(text, &self.key),
            Codec::Shuffle => scramble::unshuffle(text, self.seed),
        };
        Ok(out)
    }
}

impl FromStr for CipherSpec {
    type Err = CipherError;

    /// Parses `id[:name=value(,name=value)*]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, params) = match s.split_once(':') {
            Some((id, params)) => (id, Some(params)),
            None => (s, None),
        };

        let codec = Codec::from_id(id.trim())
            .ok_or_else(|| CipherError::UnknownCipher(id.to_string()))?;
        let mut spec = CipherSpec::new(codec);

        for param in params.into_iter().flat_map(|p| p.split(',')) {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            match param.split_once('=') {
                Some((name, value)) => spec.set_param(name.trim(), value)?,
                // a bare name is a switched-on flag
                None => spec.set_param(param, "1")?,
            }
        }
        Ok(spec)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Encodes `text` with the codec named by `id`.
pub fn encode(text: &[u8], id: &str) -> Result<Vec<u8>, CipherError> {
    id.parse::<CipherSpec>()?.encode(text)
}

/// Decodes `text` with the codec named by `id`. Fails on malformed input without
/// returning partial output.
pub fn decode(text: &[u8], id: &str) -> Result<Vec<u8>, CipherError> {
    id.parse::<CipherSpec>()?.decode(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod registry {
        use super::*;

        #[test]
        fn test_lookup_is_case_insensitive() {
            assert_eq!(Codec::from_id("Base64"), Some(Codec::Base64));
            assert_eq!(Codec::from_id("ROT13"), Some(Codec::Rot13));
            assert_eq!(Codec::from_id("haxor"), Some(Codec::Hex));
            assert_eq!(Codec::from_id("base6"), None);
            assert_eq!(Codec::Hex.id(), "hex");
        }

        #[test]
        fn test_unknown_id() {
            assert_eq!(
                encode(b"abc", "enigma"),
                Err(CipherError::UnknownCipher("enigma".to_string()))
            );
            assert!(decode(b"abc", "").is_err());
        }

        #[test]
        fn test_every_id_encodes_empty_input() -> Result<(), CipherError> {
            for id in Codec::ids() {
                assert!(encode(b"", id)?.is_empty(), "{id}");
                assert!(decode(b"", id)?.is_empty(), "{id}");
            }
            Ok(())
        }
    }

    mod params {
        use super::*;

        #[test]
        fn test_parse_params() -> Result<(), CipherError> {
            let spec: CipherSpec = "vigenere:key=lemon,unknown=1".parse()?;
            assert_eq!(spec.codec, Codec::Vigenere);
            assert_eq!(spec.key, b"LEMON");

            let spec: CipherSpec = "base64: url=1 , wrap=4".parse()?;
            assert!(spec.url);
            assert_eq!(spec.wrap, 4);

            let spec: CipherSpec = "hex:reverse".parse()?;
            assert!(spec.reverse);
            Ok(())
        }

        #[test]
        fn test_invalid_param_values() {
            for id in [
                "caesar:shift=x",
                "railfence:rails=1",
                "vigenere:key=k3y",
                "base64:url=maybe",
                "binary:sep=0",
                "binary:sep=a1",
                "shuffle:seed=-1",
                "xor:key=",
            ] {
                assert!(
                    matches!(id.parse::<CipherSpec>(), Err(CipherError::InvalidParam { .. })),
                    "{id}"
                );
            }
        }

        #[test]
        fn test_shift_param() -> Result<(), CipherError> {
            assert_eq!(encode(b"abz", "caesar:shift=1")?, b"bca");
            assert_eq!(encode(b"abc", "caesar:shift=-1")?, b"zab");
            assert_eq!(encode(b"abc", "caesar:shift=27")?, b"bcd");
            assert_eq!(decode(b"zab", "caesar:shift=-1")?, b"abc");
            Ok(())
        }

        #[test]
        fn test_xor_key_is_raw_bytes() -> Result<(), CipherError> {
            let spec: CipherSpec = "xor:key=k3y".parse()?;
            assert_eq!(spec.key, b"k3y");
            assert_eq!(encode(b"k3y", "xor:key=k3y")?, [0, 0, 0]);
            Ok(())
        }

        #[test]
        fn test_binary_separator() -> Result<(), CipherError> {
            let encoded = encode(b"AB", "binary:sep=|")?;
            assert_eq!(encoded, b"01000001|01000010");
            assert_eq!(decode(&encoded, "binary:sep=|")?, b"AB");
            Ok(())
        }

        #[test]
        fn test_reverse_param() -> Result<(), CipherError> {
            let encoded = encode(b"hello", "hex:reverse=1")?;
            assert_eq!(encoded, b"F6C6C65686");
            assert_eq!(decode(&encoded, "hex:reverse=1")?, b"hello");
            Ok(())
        }
    }

    mod scenarios {
        use super::*;

        #[test]
        fn test_caesar_default_shift() -> Result<(), CipherError> {
            let encoded = encode(b"Hello, World!", "caesar")?;
            assert_eq!(encoded, b"Khoor, Zruog!");
            assert_eq!(decode(&encoded, "caesar")?, b"Hello, World!");
            Ok(())
        }

        #[test]
        fn test_base64_hello_world() -> Result<(), CipherError> {
            let encoded = encode(b"hello world", "base64")?;
            assert_eq!(encoded, b"aGVsbG8gd29ybGQ=");
            assert_eq!(decode(&encoded, "base64")?, b"hello world");
            Ok(())
        }

        #[test]
        fn test_railfence_three_rails() -> Result<(), CipherError> {
            let encoded = encode(b"WEAREDISCOVEREDFLEEATONCE", "railfence")?;
            assert_eq!(encoded, b"WECRLTEERDSOEEFEAOCAIVDEN");
            assert_eq!(decode(&encoded, "railfence")?, b"WEAREDISCOVEREDFLEEATONCE");
            Ok(())
        }

        #[test]
        fn test_vigenere_lemon() -> Result<(), CipherError> {
            let encoded = encode(b"ATTACK AT DAWN", "vigenere:key=LEMON")?;
            assert_eq!(encoded, b"LXFOPV EF RNHR");
            assert_eq!(decode(&encoded, "vigenere:key=LEMON")?, b"ATTACK AT DAWN");
            Ok(())
        }

        #[test]
        fn test_morse_sos() -> Result<(), CipherError> {
            assert_eq!(encode(b"SOS", "morse")?, b"... --- ...");
            assert_eq!(decode(b"... --- ...", "morse")?, b"SOS");
            Ok(())
        }

        #[test]
        fn test_malformed_inputs() {
            assert!(matches!(decode(b"ABC", "hex"), Err(CipherError::Malformed { .. })));
            assert!(matches!(decode(b"0101", "binary"), Err(CipherError::Malformed { .. })));
            assert!(matches!(decode(b"0101010x", "binary"), Err(CipherError::Malformed { .. })));
            assert!(matches!(decode(b"a$bc", "base64"), Err(CipherError::Malformed { .. })));
        }

        #[test]
        fn test_huge_rail_count() -> Result<(), CipherError> {
            let id = "railfence:rails=18446744073709551615";
            assert_eq!(encode(b"abc", id)?, b"abc");
            assert_eq!(decode(b"abc", id)?, b"abc");
            Ok(())
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const ROUND_TRIP_IDS: &[&str] = &[
            "caesar",
            "caesar:shift=11",
            "vigenere",
            "base64",
            "base64:url=1,wrap=10",
            "base32",
            "base32:wrap=8",
            "binary",
            "binary:sep=|",
            "railfence",
            "railfence:rails=5",
            "hex",
            "rot13",
            "atbash",
            "atbash:reverse=1",
            "xor",
            "xor:key=s3cr3t!",
            "shuffle",
            "shuffle:seed=42",
            "shuffle:seed=4294967295,reverse",
        ];

        proptest! {
            #[test]
            fn round_trip_any_bytes(data in proptest::collection::vec(any::<u8>(), 0..64)) {
                for id in ROUND_TRIP_IDS {
                    let encoded = encode(&data, id).unwrap();
                    prop_assert_eq!(decode(&encoded, id).unwrap(), data.clone(), "{}", id);
                }
            }

            #[test]
            fn round_trip_morse(text in "[A-Z0-9]{1,8}( [A-Z0-9]{1,8}){0,3}") {
                let encoded = encode(text.as_bytes(), "morse").unwrap();
                prop_assert_eq!(decode(&encoded, "morse").unwrap(), text.as_bytes());
            }

            #[test]
            fn round_trip_baconian(text in "[A-Z]{1,8}( [A-Z]{1,8}){0,3}") {
                let encoded = encode(text.as_bytes(), "baconian").unwrap();
                prop_assert_eq!(decode(&encoded, "baconian").unwrap(), text.as_bytes());
            }

            #[test]
            fn involutions(data in proptest::collection::vec(any::<u8>(), 0..64)) {
                for id in ["rot13", "atbash"] {
                    let twice = encode(&encode(&data, id).unwrap(), id).unwrap();
                    prop_assert_eq!(twice, data.clone());
                }
            }
        }
    }
}
