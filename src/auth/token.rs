use rand::RngCore;
use rand_core::OsRng;

use crate::model::session::Token;

/// A fresh 128-bit session token, hex encoded.
pub fn generate_token() -> Token {
    let mut rng = OsRng::default();
    format!("{:016x}{:016x}", rng.next_u64(), rng.next_u64())
}
