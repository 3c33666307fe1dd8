use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

lazy_static! {
    /// Hash checked when no account matches, so unknown emails cost one
    /// Argon2 verification like a wrong password does.
    static ref DUMMY_HASH: String =
        hash_password("unused-dummy-password").expect("argon2 default params hash");
}

/// Hash `plain` with Argon2id and a fresh random salt. The result is a PHC
/// string carrying algorithm, parameters, salt and digest.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Check `plain` against a stored PHC string. A stored hash that does not
/// parse counts as a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "argon2 parse hash error");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Check `plain` against the stored hash of a user that may not exist.
/// A missing user is verified against `DUMMY_HASH` and always fails.
pub fn verify_password_or_dummy(plain: &str, stored: Option<&str>) -> bool {
    match stored {
        Some(hash) => verify_password(plain, hash),
        None => {
            verify_password(plain, &DUMMY_HASH);
            false
        }
    }
}
