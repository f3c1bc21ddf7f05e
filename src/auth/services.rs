use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::{CreateUserError, UserRepo},
        repo_types::{NewUser, User},
    },
    error::{ApiError, ApiResult},
};

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid");
    }
    EMAIL_RE.is_match(email)
}

lazy_static! {
    /// Verified against when the email is unknown, so both login failures
    /// cost one Argon2 verification.
    static ref DUMMY_HASH: Option<String> = hash_password("unused-login-placeholder").ok();
}

fn burn_password_check(plain: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain, hash);
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn auth_response(keys: &JwtKeys, user: User) -> ApiResult<AuthResponse> {
    let token = keys
        .issue(user.id)
        .map_err(|e| ApiError::Internal(e.into()))?;
    Ok(AuthResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        token,
    })
}

pub async fn register(
    users: &dyn UserRepo,
    keys: &JwtKeys,
    payload: RegisterRequest,
) -> ApiResult<AuthResponse> {
    let name = payload.name.trim().to_string();
    let email = normalize_email(&payload.email);

    if name.is_empty() {
        return Err(ApiError::validation("name", "Name is required"));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::validation("email", "Invalid email"));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }

    if users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = hash_password(&payload.password)?;
    let user = users
        .create(NewUser {
            name,
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            CreateUserError::DuplicateEmail => ApiError::DuplicateEmail,
            CreateUserError::Other(e) => ApiError::Internal(e),
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    auth_response(keys, user)
}

/// Unknown email and wrong password produce the same error.
pub async fn login(
    users: &dyn UserRepo,
    keys: &JwtKeys,
    payload: LoginRequest,
) -> ApiResult<AuthResponse> {
    let email = normalize_email(&payload.email);

    let Some(user) = users.find_by_email(&email).await? else {
        burn_password_check(&payload.password);
        warn!(email = %email, "login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    auth_response(keys, user)
}
