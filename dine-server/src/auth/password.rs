//! Password hashing (argon2)
//!
//! Hashing is CPU-bound; request handlers use the async wrappers, which run
//! on tokio's blocking pool.

use shared::{AppError, ErrorCode};
use tokio::sync::OnceCell;

/// Hash verified for unknown usernames, built on first use
static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `false` for a wrong password and for a malformed stored hash alike
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub async fn hash_password_async(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::internal(format!("hash task failed: {e}")))?
        .map_err(|e| AppError::with_message(ErrorCode::InternalError, e.to_string()))
}

pub async fn verify_password_async(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::internal(format!("verify task failed: {e}")))
}

/// Run one verification against a throwaway hash
///
/// Login calls this for an unknown username so it costs the same argon2 work
/// as a wrong password.
pub async fn verify_dummy_async(password: String) -> Result<(), AppError> {
    let hash = DUMMY_HASH
        .get_or_try_init(|| hash_password_async("unknown-operator".to_string()))
        .await?
        .clone();
    verify_password_async(password, hash).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("s3cret!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret!", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("", ""));
    }

    #[tokio::test]
    async fn async_wrappers_agree() {
        let hash = hash_password_async("pw".to_string()).await.unwrap();
        assert!(verify_password_async("pw".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password_async("nope".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_users_still_pay_for_a_verification() {
        verify_dummy_async("guess".to_string()).await.unwrap();
        let hash = DUMMY_HASH.get().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!verify_password("guess", hash));

        verify_dummy_async("again".to_string()).await.unwrap();
        assert_eq!(DUMMY_HASH.get(), Some(hash));
    }
}
