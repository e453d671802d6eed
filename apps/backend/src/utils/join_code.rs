//! Room code generation.
//!
//! Codes are 6 characters from `[A-Z0-9]`. Uniqueness is enforced by the
//! `rooms.code` index; callers regenerate on collision.

use rand::Rng;

use crate::domain::names::ROOM_CODE_LEN;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}
