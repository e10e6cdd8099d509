//! Hashing utilities.

use sha2::{Digest, Sha256};
use subtle_encoding::{Encoding, Hex};

/// Lowercase hexadecimal SHA256 of the given content. Used to tell whether
/// an edited template still matches the version that was loaded.
pub fn content_hash<S: AsRef<str>>(s: S) -> String {
    let digest = Sha256::digest(s.as_ref().as_bytes());
    Hex::lower_case()
        .encode_to_string(digest)
        .unwrap_or_default()
}
