use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        password::{check_password, hash_password, PasswordCheck},
        JwtKeys,
    },
    error::{ApiError, ApiResult},
    users::{
        dto::{LoginRequest, SignupRequest, UpdateUserRequest},
        repo::UserRepo,
        repo_types::{UserChanges, UserDocument},
    },
};

/// Sent for every failed login, whatever the reason.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub async fn signup(repo: &dyn UserRepo, payload: SignupRequest) -> ApiResult<UserDocument> {
    let email = normalize_email(&payload.email);

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::BadRequest("Password must not be empty".into()));
    }

    if repo.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let user = UserDocument {
        id: Uuid::new_v4().to_string(),
        name: payload.name.trim().to_string(),
        email,
        password_hash: hash_password(&payload.password)?,
    };
    repo.insert(&user).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Returns a signed token for a matching email/password pair. Unknown email,
/// empty passwords and mismatches all collapse into the same 401.
pub async fn login(repo: &dyn UserRepo, keys: &JwtKeys, payload: LoginRequest) -> ApiResult<String> {
    let email = normalize_email(&payload.email);

    let Some(user) = repo.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
    };

    match check_password(&payload.password, &user.password_hash) {
        PasswordCheck::Match => {}
        PasswordCheck::Mismatch => {
            warn!(user_id = %user.id, "login invalid password");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
        }
        PasswordCheck::Unusable => {
            error!(user_id = %user.id, "stored password hash is unusable");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
        }
    }

    let token = keys.sign(&user.id, &user.email)?;
    info!(user_id = %user.id, "user logged in");
    Ok(token)
}

/// Partial update of name, email and password. Empty strings count as
/// "not supplied"; a new password is hashed before it reaches the store.
pub async fn update_user(
    repo: &dyn UserRepo,
    id: &str,
    payload: UpdateUserRequest,
) -> ApiResult<UserDocument> {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

    let mut changes = UserChanges {
        name: non_empty(payload.name).map(|n| n.trim().to_string()),
        email: non_empty(payload.email).map(|e| normalize_email(&e)),
        password_hash: None,
    };

    if let Some(email) = &changes.email {
        if !is_valid_email(email) {
            return Err(ApiError::BadRequest("Invalid email".into()));
        }
        if let Some(holder) = repo.find_by_email(email).await? {
            if holder.id != id {
                warn!(email = %email, user_id = %id, "email already registered");
                return Err(ApiError::Conflict("Email already registered".into()));
            }
        }
    }

    if let Some(password) = payload.password.filter(|p| !p.is_empty()) {
        changes.password_hash = Some(hash_password(&password)?);
    }

    let user = repo.update(id, changes).await?.ok_or(ApiError::NotFound)?;
    info!(user_id = %user.id, "user updated");
    Ok(user)
}
