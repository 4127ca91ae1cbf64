//! Argon2id hashing for the admin password.
//!
//! Only the PHC string is configured (`ADMIN_PASSWORD_HASH`); salt and cost
//! parameters travel inside it. `summit-api hash-password` prints one.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hash `password` with a fresh random salt and return the PHC string.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// `Ok(false)` on a mismatch. A malformed `phc` is an `Err`, since it means
/// the server is misconfigured rather than the caller being wrong.
pub fn verify_password(password: &str, phc: &str) -> Result<bool, Error> {
    let expected = PasswordHash::new(phc)?;
    match Argon2::default().verify_password(password.as_bytes(), &expected) {
        Ok(()) => Ok(true),
        Err(Error::Password) => Ok(false),
        Err(other) => Err(other),
    }
}
