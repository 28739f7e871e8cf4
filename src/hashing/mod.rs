//! BLAKE3 helpers for cache keys, identity hashes and vector point ids.

use blake3::Hasher;

/// Collapses runs of whitespace to a single space and trims both ends.
///
/// Embedding cache keys are computed over this form so that cosmetic whitespace
/// differences never trigger a second model call.
pub fn canonicalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[inline]
pub fn hash_text(text: &str) -> [u8; 32] {
    *blake3::hash(text.as_bytes()).as_bytes()
}

/// Lowercase hex BLAKE3 digest of the canonical form of `text`.
#[inline]
pub fn content_address(text: &str) -> String {
    blake3::hash(canonicalize_text(text).as_bytes())
        .to_hex()
        .to_string()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used where the consumer needs an integer id (Qdrant point ids). With 64 bits the
/// birthday bound sits around four billion items, far beyond the number of canonical
/// jobs a single collection holds. A collision overwrites one vector point; the job id
/// stored in the payload lets readers detect it.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

#[inline]
pub fn point_id_for_job(job_id: &str) -> u64 {
    hash_to_u64(job_id.as_bytes())
}

/// Hashes already-normalized identity parts with a separator so that
/// `("ab", "c")` and `("a", "bc")` never collide.
pub fn hash_parts(parts: &[&str]) -> String {
    let mut hasher = Hasher::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b"|");
        }
        hasher.update(part.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
