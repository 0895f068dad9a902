//! Argon2 password hashing. Digests are PHC strings (`$argon2id$v=19$...`)
//! carrying algorithm, parameters and salt, so verification needs nothing
//! beyond the stored string.

use anyhow::Context;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

pub fn hash(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("argon2 hash: {e}"))?;
    Ok(digest.to_string())
}

/// `Ok(false)` on mismatch; `Err` only when `digest` is not a PHC string.
pub fn verify(plain: &str, digest: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(digest).map_err(|e| anyhow::anyhow!("argon2 parse digest: {e}"))?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("argon2 verify: {e}")),
    }
}

/// Runs [`hash`] on the blocking pool so request workers are not stalled.
pub async fn hash_blocking(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash(&plain))
        .await
        .context("hash task panicked")?
}

pub async fn verify_blocking(plain: String, digest: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify(&plain, &digest))
        .await
        .context("verify task panicked")?
}
