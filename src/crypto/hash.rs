use sha3::{Digest, Keccak256};

/// Keccak256 digest of raw bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak256 digest as a 0x-prefixed hex string.
pub fn keccak256_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(keccak256(data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak256_hex_matches_empty_string_vector() {
        let digest = keccak256_hex(b"");
        assert_eq!(
            digest,
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_eq!(digest.len(), 66);
    }

    #[test]
    fn keccak256_is_deterministic() {
        assert_eq!(keccak256(b"wallet"), keccak256(b"wallet"));
        assert_ne!(keccak256(b"wallet"), keccak256(b"wallets"));
    }
}
