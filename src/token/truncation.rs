//! Dynamic truncation of a digest into a short decimal code.
//!
//! This is not the byte-aligned truncation of RFC 4226. The digest is read
//! as one big unsigned integer and rendered as a `0b`-prefixed binary
//! string without leading zeros. The last four characters of that string
//! give an offset `o`; the characters `[o * 8, o * 8 + 32)` (clipped to the
//! end of the string, and including the `0b` prefix when `o == 0`) are read
//! back as a base-2 integer; the decimal rendering of that integer is cut
//! to its last `length` characters. No left padding is applied, so a small
//! window value yields a code shorter than `length`.
//!
//! Codes already issued by existing deployments depend on these exact
//! semantics.

/// Builds the `0b`-prefixed binary rendering of `digest` read as a big-endian integer.
fn binary_string(digest: &[u8]) -> String {
    let mut bits = String::with_capacity(2 + digest.len() * 8);
    bits.push_str("0b");
    for byte in digest {
        bits.push_str(&format!("{byte:08b}"));
    }

    // Strip leading zeros, keeping at least one digit.
    let first_one = bits[2..].find('1').map_or(bits.len() - 1, |i| i + 2);
    bits.replace_range(2..first_one, "");
    bits
}

/// Parses a binary literal that may carry a `0b` prefix. An empty literal is zero.
fn parse_binary(literal: &str) -> u64 {
    let digits = literal.strip_prefix("0b").unwrap_or(literal);
    digits
        .bytes()
        .fold(0u64, |acc, bit| (acc << 1) | u64::from(bit == b'1'))
}

/// Reduces `digest` to a decimal code of at most `length` characters.
pub fn dynamic_truncate(digest: &[u8], length: usize) -> String {
    let bits = binary_string(digest);

    let tail = &bits[bits.len().saturating_sub(4)..];
    let offset = parse_binary(tail) as usize;

    let start = (offset * 8).min(bits.len());
    let end = (offset * 8 + 32).min(bits.len());
    let code = parse_binary(&bits[start..end]).to_string();

    code[code.len().saturating_sub(length)..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(hex_digest: &str) -> Vec<u8> {
        hex::decode(hex_digest).unwrap()
    }

    #[test]
    fn test_binary_string_strips_leading_zeros() {
        assert_eq!(binary_string(&[0x00, 0x05]), "0b101");
        assert_eq!(binary_string(&[0x80]), "0b10000000");
        assert_eq!(binary_string(&[0x00, 0x00]), "0b0");
    }

    #[test]
    fn test_parse_binary() {
        assert_eq!(parse_binary("0b101"), 5);
        assert_eq!(parse_binary("101"), 5);
        assert_eq!(parse_binary("0b"), 0);
        assert_eq!(parse_binary(""), 0);
    }

    #[test]
    fn test_all_ones_clips_window_at_string_end() {
        // Offset 15 starts the window 10 characters before the end.
        let code = dynamic_truncate(&digest("ffffffffffffffffffffffffffffffff"), 8);
        assert_eq!(code, "1023");
    }

    #[test]
    fn test_zero_offset_window_includes_prefix() {
        // Window is "0b" followed by thirty ones.
        let code = dynamic_truncate(&digest("ffffffff000000000000000000000000"), 8);
        assert_eq!(code, "73741823");
        let code = dynamic_truncate(&digest("ffffffff000000000000000000000000"), 10);
        assert_eq!(code, "1073741823");
    }

    #[test]
    fn test_leading_zeros_shift_the_window() {
        let code = dynamic_truncate(&digest("0123456789abcdef0123456789abcdef"), 8);
        assert_eq!(code, "7");
    }

    #[test]
    fn test_zero_window() {
        let code = dynamic_truncate(&digest("8000000000000000000000000000000a"), 8);
        assert_eq!(code, "0");
    }

    #[test]
    fn test_window_past_end_is_zero() {
        let code = dynamic_truncate(&digest("00000000000000000000000000000001"), 8);
        assert_eq!(code, "0");
    }

    #[test]
    fn test_output_never_exceeds_length() {
        for length in 1..=10 {
            for seed in 0u8..32 {
                let mut bytes = [seed.wrapping_mul(37); 20];
                bytes[19] = seed;
                let code = dynamic_truncate(&bytes, length);
                assert!(code.len() <= length);
                assert!(!code.is_empty());
                assert!(code.bytes().all(|b| b.is_ascii_digit()));
            }
        }
    }
}
