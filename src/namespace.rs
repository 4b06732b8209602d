use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{Error, Result};

/// Size of a version-zero user namespace ID.
pub const SHORT_ID_LEN: usize = 10;
/// Size of the full namespace ID field.
pub const LONG_ID_LEN: usize = 28;
/// Leading zero bytes a version-zero namespace ID must carry in its 28-byte form.
pub const V0_ZERO_PREFIX_LEN: usize = LONG_ID_LEN - SHORT_ID_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingRule {
    /// Short IDs are kept as-is; the namespace constructor right-aligns them.
    None,
    /// Short IDs are right-aligned into a zero-filled buffer here.
    LeftZeroPad,
}

/// Sizing policy for namespace IDs. Fixed per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceSpec {
    pub target_len: usize,
    pub padding: PaddingRule,
}

impl NamespaceSpec {
    /// 10-byte IDs, hashed when the input is longer.
    pub const SHORT: NamespaceSpec = NamespaceSpec {
        target_len: SHORT_ID_LEN,
        padding: PaddingRule::None,
    };

    /// 28-byte zero-prefixed IDs.
    pub const LONG: NamespaceSpec = NamespaceSpec {
        target_len: LONG_ID_LEN,
        padding: PaddingRule::LeftZeroPad,
    };
}

/// Named policy as it appears in config.toml.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespacePolicy {
    #[default]
    Short,
    Long,
}

impl NamespacePolicy {
    pub fn spec(self) -> NamespaceSpec {
        match self {
            NamespacePolicy::Short => NamespaceSpec::SHORT,
            NamespacePolicy::Long => NamespaceSpec::LONG,
        }
    }
}

/// How the raw namespace string is turned into bytes.
///
/// `HexIfPossible` reinterprets any even-length string that parses as hex, so
/// literal text such as `"deed"` or `"cafe"` becomes binary. Use `Literal` to
/// always take the string's own bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoding {
    #[default]
    HexIfPossible,
    Literal,
}

/// A normalized namespace ID, always `spec.target_len` bytes wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    spec: NamespaceSpec,
    id: Vec<u8>,
    bytes: Vec<u8>,
}

impl Namespace {
    /// Effective ID bytes before any constructor padding.
    pub fn id(&self) -> &[u8] {
        &self.id
    }

    /// The fixed-size ID buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Checks the version-zero structural rule the network enforces.
    pub fn validate_v0(&self) -> Result<()> {
        if self.bytes.len() != self.spec.target_len {
            return Err(Error::NamespaceConstructionFailed(format!(
                "expected {} bytes, got {}",
                self.spec.target_len,
                self.bytes.len()
            )));
        }
        if self.bytes.len() == LONG_ID_LEN
            && self.bytes[..V0_ZERO_PREFIX_LEN].iter().any(|b| *b != 0)
        {
            return Err(Error::NamespaceConstructionFailed(format!(
                "version-zero namespace {} must start with {} zero bytes",
                self, V0_ZERO_PREFIX_LEN
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.bytes))
    }
}

/// Bytes the sizing policy operates on.
pub fn effective_bytes(input: &str, decoding: Decoding) -> Vec<u8> {
    match decoding {
        Decoding::HexIfPossible if input.len() % 2 == 0 => {
            hex::decode(input).unwrap_or_else(|_| input.as_bytes().to_vec())
        }
        _ => input.as_bytes().to_vec(),
    }
}

/// First 10 bytes of SHA-256 over `bytes`.
fn short_digest(bytes: &[u8]) -> Vec<u8> {
    Sha256::digest(bytes)[..SHORT_ID_LEN].to_vec()
}

fn right_align(id: &[u8], width: usize) -> Vec<u8> {
    let mut buf = vec![0u8; width];
    buf[width - id.len()..].copy_from_slice(id);
    buf
}

/// Turns an arbitrary string into a namespace ID under `spec`. Never fails.
pub fn normalize(input: &str, spec: NamespaceSpec, decoding: Decoding) -> Namespace {
    let raw = effective_bytes(input, decoding);

    let id = match spec.padding {
        PaddingRule::None if raw.len() > spec.target_len => short_digest(&raw),
        PaddingRule::None => raw,
        PaddingRule::LeftZeroPad if raw.len() > spec.target_len => {
            right_align(&short_digest(&raw), spec.target_len)
        }
        PaddingRule::LeftZeroPad => right_align(&raw, spec.target_len),
    };

    let bytes = right_align(&id, spec.target_len);
    Namespace { spec, id, bytes }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sha_prefix(bytes: &[u8]) -> Vec<u8> {
        Sha256::digest(bytes)[..10].to_vec()
    }

    #[test]
    fn test_literal_fallback_for_non_hex() {
        // "test" has even length but is not hex
        let ns = normalize("test", NamespaceSpec::SHORT, Decoding::HexIfPossible);
        assert_eq!(ns.id(), &[0x74, 0x65, 0x73, 0x74]);
        assert_eq!(ns.as_bytes(), &[0, 0, 0, 0, 0, 0, 0x74, 0x65, 0x73, 0x74]);
    }

    #[test]
    fn test_even_length_hex_is_decoded() {
        let ns = normalize("deadbeef", NamespaceSpec::SHORT, Decoding::HexIfPossible);
        assert_eq!(ns.id(), &[0xde, 0xad, 0xbe, 0xef]);

        // "deed" is valid hex and is reinterpreted as two bytes
        let ns = normalize("deed", NamespaceSpec::SHORT, Decoding::HexIfPossible);
        assert_eq!(ns.id(), &[0xde, 0xed]);
    }

    #[test]
    fn test_odd_length_hex_stays_literal() {
        let ns = normalize("abc", NamespaceSpec::SHORT, Decoding::HexIfPossible);
        assert_eq!(ns.id(), b"abc");
    }

    #[test]
    fn test_literal_decoding_skips_hex() {
        let ns = normalize("deed", NamespaceSpec::SHORT, Decoding::Literal);
        assert_eq!(ns.id(), b"deed");
    }

    #[test]
    fn test_short_policy_hashes_long_input() {
        // 40 non-hex ASCII characters
        let input = "g".repeat(40);
        let ns = normalize(&input, NamespaceSpec::SHORT, Decoding::HexIfPossible);
        assert_eq!(ns.id(), sha_prefix(input.as_bytes()).as_slice());
        assert_eq!(ns.as_bytes(), ns.id());
    }

    #[test]
    fn test_short_policy_hashes_decoded_bytes() {
        // 22 hex chars -> 11 decoded bytes, one over the limit
        let input = "00112233445566778899aa";
        let decoded = hex::decode(input).unwrap();
        let ns = normalize(input, NamespaceSpec::SHORT, Decoding::HexIfPossible);
        assert_eq!(ns.id(), sha_prefix(&decoded).as_slice());
    }

    #[test]
    fn test_short_policy_exactly_ten_bytes_unhashed() {
        let ns = normalize("0123456789", NamespaceSpec::SHORT, Decoding::Literal);
        assert_eq!(ns.as_bytes(), b"0123456789");
    }

    #[test]
    fn test_long_policy_left_pads() {
        let ns = normalize("0102030405060708", NamespaceSpec::LONG, Decoding::HexIfPossible);
        let mut expected = vec![0u8; 20];
        expected.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(ns.as_bytes(), expected.as_slice());
        assert!(ns.validate_v0().is_ok());
    }

    #[test]
    fn test_long_policy_hashes_overflow_into_zero_prefix() {
        let input = "x".repeat(29);
        let ns = normalize(&input, NamespaceSpec::LONG, Decoding::HexIfPossible);
        assert_eq!(ns.as_bytes().len(), 28);
        assert!(ns.as_bytes()[..18].iter().all(|b| *b == 0));
        assert_eq!(&ns.as_bytes()[18..], sha_prefix(input.as_bytes()).as_slice());
        assert!(ns.validate_v0().is_ok());
    }

    #[test]
    fn test_long_policy_exact_length_passes_through() {
        let input = "y".repeat(28);
        let ns = normalize(&input, NamespaceSpec::LONG, Decoding::Literal);
        assert_eq!(ns.as_bytes(), input.as_bytes());
        // no zero prefix, rejected by the version-zero check
        assert!(matches!(
            ns.validate_v0(),
            Err(Error::NamespaceConstructionFailed(_))
        ));
    }

    #[test]
    fn test_output_length_and_zero_prefix_for_many_inputs() {
        let inputs: Vec<String> = (0..64)
            .map(|n| "ab".repeat(n / 2) + if n % 2 == 1 { "z" } else { "" })
            .chain(["", "test", "my-rollup", "DEADBEEF", "ünïcödé"].map(String::from))
            .collect();

        for input in &inputs {
            for decoding in [Decoding::HexIfPossible, Decoding::Literal] {
                let eff = effective_bytes(input, decoding);

                let short = normalize(input, NamespaceSpec::SHORT, decoding);
                assert_eq!(short.as_bytes().len(), 10, "input {input:?}");
                if eff.len() <= 10 {
                    assert_eq!(short.id(), eff.as_slice());
                }

                let long = normalize(input, NamespaceSpec::LONG, decoding);
                assert_eq!(long.as_bytes().len(), 28, "input {input:?}");
                let zeros = 28 - eff.len().min(28);
                assert!(long.as_bytes()[..zeros].iter().all(|b| *b == 0));
            }
        }
    }

    #[test]
    fn test_normalize_is_deterministic() {
        for input in ["test", "deadbeef", &"q".repeat(100)] {
            for spec in [NamespaceSpec::SHORT, NamespaceSpec::LONG] {
                assert_eq!(
                    normalize(input, spec, Decoding::HexIfPossible),
                    normalize(input, spec, Decoding::HexIfPossible)
                );
            }
        }
    }

    #[test]
    fn test_display_is_hex() {
        let ns = normalize("0a0b", NamespaceSpec::SHORT, Decoding::HexIfPossible);
        assert_eq!(ns.to_string(), format!("{}0a0b", "00".repeat(8)));
    }
}
