use crate::{
    auth::{credentials, LoginRequest, RegisterRequest},
    error::AppError,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Register a new user
///
/// Creates an account and returns its public fields (`id`, `username`, `role`).
/// No token is issued; clients log in afterwards.
///
/// ## Responses:
/// - `201 Created`: the new user.
/// - `400 Bad Request`: missing or blank `username`/`password`.
/// - `409 Conflict`: the username is taken.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user = credentials::register(
        state.store.as_ref(),
        register_data.into_inner(),
        state.bcrypt_cost,
    )
    .await?;

    log::info!("registered {:?} {} with id {}", user.role, user.username, user.id);
    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Verifies the credentials and returns a bearer token together with the user.
///
/// ## Responses:
/// - `200 OK`: `{token, user}`.
/// - `400 Bad Request`: missing or blank fields.
/// - `401 Unauthorized`: unknown username or wrong password, reported identically.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let username = login_data.username.trim().to_string();

    match credentials::login(state.store.as_ref(), &state.tokens, login_data.into_inner()).await {
        Ok(response) => {
            log::info!("user {} logged in", response.user.id);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(err @ AppError::Unauthorized(_)) => {
            log::warn!("failed login for username {:?}", username);
            Err(err)
        }
        Err(err) => Err(err),
    }
}
