use sha3::{Digest, Keccak256};

/// A 32-byte Keccak-256 digest.
pub type H256 = [u8; 32];

/// Keccak-256 of `data`.
pub fn keccak256(data: impl AsRef<[u8]>) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data.as_ref());
    let hash = hasher.finalize();
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    result
}
