//! Hashing used by extrinsics and addresses.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Blake2b512, Digest};

type Blake2b256 = Blake2b<U32>;

/// 32-byte blake2b digest (extrinsic hashes, oversized signing payloads).
pub fn blake2_256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Blake2b256::digest(data));
    out
}

/// 64-byte blake2b digest over several parts.
pub(crate) fn blake2_512(parts: &[&[u8]]) -> [u8; 64] {
    let mut hasher = Blake2b512::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(&hasher.finalize());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake2_256_of_empty_input() {
        assert_eq!(
            crate::hex::to_hex(&blake2_256(b"")),
            "0x0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn blake2_512_concatenates_parts() {
        assert_eq!(blake2_512(&[b"ab", b"c"]), blake2_512(&[b"abc"]));
    }
}
