//! Account creation and login.

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::TokenKeys;
use crate::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::models::{PublicUser, Role, User};
use crate::store::UserStore;
use validator::Validate;

/// Message for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Creates an account and returns its public fields.
///
/// The uniqueness pre-check gives a clean error in the common case; the store's
/// own constraint covers concurrent registrations of the same name.
pub async fn register<S>(
    users: &S,
    request: RegisterRequest,
    bcrypt_cost: u32,
) -> Result<PublicUser, AppError>
where
    S: UserStore + ?Sized,
{
    request.validate()?;
    let username = request.username.trim().to_string();

    if users.find_user_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let password_hash = hash_password(&request.password, bcrypt_cost)?;
    let role = Role::parse_or_default(request.role.as_deref());
    let user = users
        .insert_user(User::new(username, password_hash, role))
        .await?;

    Ok(PublicUser::from(&user))
}

/// Checks a username/password pair and issues a session token.
pub async fn login<S>(
    users: &S,
    keys: &TokenKeys,
    request: LoginRequest,
) -> Result<AuthResponse, AppError>
where
    S: UserStore + ?Sized,
{
    request.validate()?;

    let user = users
        .find_user_by_username(request.username.trim())
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    Ok(AuthResponse {
        token: keys.issue(&user)?,
        user: PublicUser::from(&user),
    })
}
