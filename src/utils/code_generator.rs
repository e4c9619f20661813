//! Deterministic short code derivation.
//!
//! A short code is a pure function of `(long_url, owner_id)`: SHA-256 over
//! the concatenation, first 16 hex characters of the digest parsed as a
//! base-16 integer, re-encoded in base-36, fixed at [`CODE_LENGTH`]
//! characters. Shortening the same URL twice for the same owner therefore
//! yields the same code without touching the database, while two owners
//! shortening the same URL get distinct codes.
//!
//! Determinism also means the generator cannot resolve collisions itself;
//! callers must check global uniqueness of the result before inserting
//! (see `LinkService`).

use sha2::{Digest, Sha256};

/// Fixed output length in base-36 digits. 36^6 ≈ 2.2 × 10^9 codes.
pub const CODE_LENGTH: usize = 6;

/// Number of leading hex digits of the digest folded into the code.
/// 16 hex digits = 64 bits, the widest prefix that fits a `u64`.
const HEX_PREFIX_LEN: usize = 16;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Derives the short code for a `(long_url, owner_id)` pair.
///
/// The caller is expected to pass an already validated, normalized URL;
/// this function never fails and never mutates state, so it is safe to
/// call speculatively.
pub fn generate_code(long_url: &str, owner_id: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(long_url.as_bytes());
    hasher.update(owner_id.to_string().as_bytes());
    let digest = hex::encode(hasher.finalize());

    // 16 hex chars always parse: the slice is lowercase hex by construction.
    let prefix = u64::from_str_radix(&digest[..HEX_PREFIX_LEN], 16)
        .expect("hex digest prefix is valid base-16");

    let encoded = encode_base36(prefix);

    // Keep the most significant digits; left-pad small values with '0'
    // so the output length is always CODE_LENGTH.
    if encoded.len() >= CODE_LENGTH {
        encoded[..CODE_LENGTH].to_string()
    } else {
        format!("{:0>width$}", encoded, width = CODE_LENGTH)
    }
}

/// Encodes a `u64` in lowercase base-36, most significant digit first.
fn encode_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(13);
    while value > 0 {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();

    String::from_utf8(digits).expect("base-36 alphabet is ASCII")
}
