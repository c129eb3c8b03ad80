//! Address-space accounting.

use crate::models::Family;

/// Number of addresses covered by a prefix of length `prefix_len`.
///
/// Returns `2^(W - prefix_len)` for a family of `W` bits. When the count would
/// be 2^64 or more the result is 0: callers must read 0 for a non-empty prefix
/// as "too large to count", not as an empty network.
pub fn address_count(prefix_len: u8, family: Family) -> u64 {
    let host_bits = family.bits().saturating_sub(prefix_len);
    if host_bits >= 64 {
        return 0;
    }
    1u64 << host_bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_count_ipv4() {
        for p in 0..=32u8 {
            assert_eq!(address_count(p, Family::V4), 1u64 << (32 - p));
        }
        assert_eq!(address_count(0, Family::V4), 4_294_967_296);
        assert_eq!(address_count(24, Family::V4), 256);
        assert_eq!(address_count(32, Family::V4), 1);
    }

    #[test]
    fn test_address_count_ipv6_guarded() {
        for p in 0..=64u8 {
            assert_eq!(address_count(p, Family::V6), 0, "/{p} should be guarded");
        }
    }

    #[test]
    fn test_address_count_ipv6_small() {
        for p in 65..=128u8 {
            assert_eq!(address_count(p, Family::V6), 1u64 << (128 - p));
        }
        assert_eq!(address_count(65, Family::V6), 1u64 << 63);
        assert_eq!(address_count(120, Family::V6), 256);
        assert_eq!(address_count(128, Family::V6), 1);
    }
}
