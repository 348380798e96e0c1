use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;

use crate::model::Error;

lazy_static! {
    /// Checked against when a login names an unknown user, so that path
    /// costs as much as a wrong password.
    pub static ref DUMMY_HASH: String =
        hash_password("footprint-dummy-password").unwrap_or_default();
}

pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);

    // Argon2 with default params (Argon2id v19)
    let argon2 = Argon2::default();

    // Hash password to PHC string ($argon2id$v=19$...)
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(Error::Hash)?
        .to_string();

    Ok(password_hash)
}

pub fn check_passwords(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// [`hash_password`] on the blocking pool, keeping argon2 off the executor.
pub async fn hash_in_background(password: String) -> Result<String, Error> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// [`check_passwords`] on the blocking pool.
pub async fn check_in_background(password: String, hash: String) -> Result<bool, Error> {
    Ok(tokio::task::spawn_blocking(move || check_passwords(&password, &hash)).await?)
}
