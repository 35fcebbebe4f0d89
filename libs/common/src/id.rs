use rand::Rng;
use ulid::Ulid;

/// Alphabet for session join codes. Excludes `0/O` and `1/I/L` so codes
/// survive being read aloud or typed from a stream overlay.
const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Length of a session join code.
pub const JOIN_CODE_LEN: usize = 6;

/// Generates a new ULID-based ID with the given prefix.
///
/// # Examples
/// ```
/// let id = draftpod_common::id::prefixed_ulid("usr");
/// assert!(id.starts_with("usr_"));
/// ```
pub fn prefixed_ulid(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new().to_string())
}

/// Generates a short session join code (e.g. `K7QWNP`).
///
/// Join codes are what players type to find each other, so they are short
/// and human-friendly rather than globally unique; the caller is expected
/// to re-roll on collision against its live session map.
pub fn session_code<R: Rng>(rng: &mut R) -> String {
    (0..JOIN_CODE_LEN)
        .map(|_| JOIN_CODE_ALPHABET[rng.gen_range(0..JOIN_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Well-known ID prefixes.
pub mod prefix {
    pub const USER: &str = "usr";
    pub const BOT: &str = "bot";
    pub const LOG: &str = "log";
}
