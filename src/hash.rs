//! Content fingerprint: a 16-hex-digit truncation of the SHA-256 of a
//! file's textual content, used to detect unchanged files across
//! indexing passes.

use sha2::{Digest, Sha256};

pub fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();
    let hex = format!("{digest:x}");
    hex[..16].to_string()
}
