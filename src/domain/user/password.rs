//! Argon2id password hashing with a fresh random salt per password.
use argon2::{
	password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
	Argon2,
};

use crate::services::response::ServiceError;

/// PHC-formatted hash string, safe to store.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
	let salt = SaltString::generate(&mut OsRng);
	Argon2::default()
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|err| ServiceError::Internal(format!("Password hashing failed: {err}")))
}

pub fn verify_password(
	password: &str,
	password_hash: &str,
) -> Result<bool, ServiceError> {
	let parsed = PasswordHash::new(password_hash).map_err(|err| ServiceError::Internal(format!("Invalid password hash format: {err}")))?;

	match Argon2::default().verify_password(password.as_bytes(), &parsed) {
		Ok(()) => Ok(true),
		Err(argon2::password_hash::Error::Password) => Ok(false),
		Err(err) => Err(ServiceError::Internal(format!("Password verification failed: {err}"))),
	}
}
