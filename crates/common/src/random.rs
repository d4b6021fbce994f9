//! Random identifiers for attendance codes and invitation tokens.

use rand::rngs::OsRng;
use rand::{Rng, RngCore};

/// Characters used for human-readable attendance codes.
///
/// Upper-case letters and digits only, without the look-alikes `0`, `O`,
/// `1` and `I`, so a code read aloud in a meeting is typed correctly.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate a fixed-length, human-readable attendance code.
pub fn generate_attendance_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_ALPHABET.len());
            char::from(CODE_ALPHABET[idx])
        })
        .collect()
}

/// Generate an unguessable token: `bytes` bytes from the OS RNG, hex encoded.
pub fn generate_secure_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}
