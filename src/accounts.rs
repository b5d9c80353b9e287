//! Account registration, credential checks and profile lookups.
//!
//! Access tokens are minted by the gateway in front of this service; a
//! successful login here only answers who the credentials belong to.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{LoginRequest, MobileCheck, MobileLookup, NewUser, RegisterRequest, UserProfile};
use crate::sanitize::ValidationError;
use crate::store::UserStore;

const SALT_LEN: usize = 16;

/// Argon2id PHC string for `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt)
        .map_err(|e| ApiError::Internal(format!("salt encoding failed: {e}")))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// False for a wrong password and for a stored hash that does not parse.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is unreadable");
            false
        }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    trimmed(value).ok_or_else(|| ValidationError::new(field, "is required"))
}

pub async fn register(
    users: &dyn UserStore,
    form: RegisterRequest,
) -> Result<UserProfile, ApiError> {
    let username = required(form.username, "username")?;
    let email = required(form.email, "email")?;
    if !email.contains('@') {
        return Err(ValidationError::new("email", "expected an email address").into());
    }
    let password = form
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ValidationError::new("password", "is required"))?;

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))??;

    let user = users
        .create(NewUser {
            username,
            email,
            mobile: trimmed(form.mobile),
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "👤 account created");
    Ok(UserProfile::from(&user))
}

/// Finds the account by mobile, or by username when no mobile is given,
/// and checks the password.
pub async fn login(users: &dyn UserStore, form: LoginRequest) -> Result<UserProfile, ApiError> {
    let user = match (trimmed(form.mobile), trimmed(form.username)) {
        (Some(mobile), _) => users.by_mobile(&mobile).await?,
        (None, Some(username)) => users.by_username(&username).await?,
        (None, None) => None,
    };
    let invalid = || ApiError::Unauthorized("Invalid credentials".into());
    let Some(user) = user else {
        return Err(invalid());
    };

    let password = form.password.unwrap_or_default();
    let stored = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| ApiError::Internal(format!("verification task failed: {e}")))?;

    if !verified {
        tracing::info!(user_id = %user.id, "🔒 login rejected");
        return Err(invalid());
    }
    Ok(UserProfile::from(&user))
}

pub async fn profile(users: &dyn UserStore, user_id: Uuid) -> Result<UserProfile, ApiError> {
    users
        .by_id(user_id)
        .await?
        .map(|user| UserProfile::from(&user))
        .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

/// Whether an account uses `mobile`, and its username if so.
pub async fn check_mobile(
    users: &dyn UserStore,
    lookup: MobileLookup,
) -> Result<MobileCheck, ApiError> {
    let mobile = trimmed(lookup.mobile)
        .ok_or_else(|| ValidationError::new("mobile", "Mobile number required"))?;
    let user = users.by_mobile(&mobile).await?;

    Ok(MobileCheck {
        exists: user.is_some(),
        username: user.map(|u| u.username),
    })
}
