//! Lock identifier derivation.
//!
//! Advisory locks are keyed by a 64-bit integer. Keys are hashed with SHA-1,
//! the digest is read as a big-endian unsigned integer, and the first 18
//! decimal digits of that integer become the lock id. The result is always
//! below `10^18`, so it fits an `i64`, and matches ids produced by other
//! clients of the same scheme.

use sha1::{Digest, Sha1};

/// Number of leading decimal digits kept from the digest.
pub const LOCK_ID_DIGITS: usize = 18;

/// Derive the advisory lock id for a key.
pub fn lock_id(key: &str) -> i64 {
    let digest = Sha1::digest(key.as_bytes());
    decimal_digits(&digest)
        .iter()
        .take(LOCK_ID_DIGITS)
        .fold(0i64, |id, digit| id * 10 + i64::from(*digit))
}

/// Decimal digits (most significant first) of a big-endian unsigned integer.
fn decimal_digits(bytes: &[u8]) -> Vec<u8> {
    let mut limbs: Vec<u32> = bytes
        .chunks(4)
        .map(|chunk| chunk.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
        .collect();
    let mut digits = Vec::with_capacity(bytes.len() * 3);

    // repeated division by 10, least significant digit first
    while limbs.iter().any(|limb| *limb != 0) {
        let mut remainder = 0u64;
        for limb in limbs.iter_mut() {
            let acc = (remainder << 32) | u64::from(*limb);
            *limb = (acc / 10) as u32;
            remainder = acc % 10;
        }
        digits.push(remainder as u8);
    }

    if digits.is_empty() {
        digits.push(0);
    }
    digits.reverse();
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_ids() {
        assert_eq!(lock_id("key"), 948743577643725528);
        assert_eq!(lock_id("resource"), 696859890192789580);
        assert_eq!(lock_id("orders:42"), 893023953996973308);
        assert_eq!(lock_id("42"), 838146913046966959);
        assert_eq!(lock_id(""), 124584541093122799);
    }

    #[test]
    fn same_key_same_id() {
        assert_eq!(lock_id("user:7"), lock_id("user:7"));
        assert_eq!(lock_id("user:7"), 133796909894866533);
    }

    #[test]
    fn ids_stay_in_range() {
        for i in 0..1000 {
            let id = lock_id(&format!("key-{}", i));
            assert!(id >= 0);
            assert!(id < 1_000_000_000_000_000_000);
        }
    }

    #[test]
    fn distinct_keys_rarely_collide() {
        let ids: std::collections::HashSet<i64> =
            (0..10_000).map(|i| lock_id(&format!("resource-{}", i))).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn decimal_digits_of_small_numbers() {
        assert_eq!(decimal_digits(&[0, 0, 0, 0]), vec![0]);
        assert_eq!(decimal_digits(&[0, 0, 1, 0]), vec![2, 5, 6]);
        assert_eq!(
            decimal_digits(&[0xff; 8]),
            vec![1, 8, 4, 4, 6, 7, 4, 4, 0, 7, 3, 7, 0, 9, 5, 5, 1, 6, 1, 5]
        );
    }
}
