use sha2::{Digest, Sha256};

/// Length of the hex hash suffix appended to every key.
const KEY_HASH_LEN: usize = 24;

/// Derive the filename-safe cache key for a repository identity
/// (`owner/name`).
///
/// The readable portion keeps the identity inspectable on disk; the
/// SHA-256 suffix keeps distinct identities from colliding after the
/// lossy character substitution.
pub fn derive_key(identity: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!("{}_{}", sanitize(identity), &digest[..KEY_HASH_LEN])
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
