use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};

/// Length of the numeric one-time codes sent by email.
pub const OTP_CODE_LENGTH: usize = 6;

/// Generates an unpredictable session identifier (256 bits, hex encoded).
/// A fresh identifier is issued at every login; identifiers are never reused.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generates a zero-padded numeric one-time code from the OS CSPRNG.
pub fn generate_otp_code() -> String {
    let code: u32 = OsRng.gen_range(0..1_000_000);
    format!("{:06}", code)
}

/// SHA-256 hex digest used for session tokens persisted in the database.
/// The plaintext token only ever lives in the cookie and the session store.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
