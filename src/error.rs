//!
//! # Custom Error Handling
//!
//! This module defines the error type `AppError` shared by every layer of the
//! marketplace: stores, the credential manager, the access gate and the HTTP handlers.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so a handler can return
//! `Result<_, AppError>` and the client always receives a JSON body of the form
//! `{"message": "..."}` with a matching status code.
//! `From` implementations cover the foreign error types the crate touches
//! (`sqlx`, `validator`, `jsonwebtoken`, `bcrypt`, `actix-multipart`, `std::io`),
//! which keeps the `?` operator usable everywhere.

use actix_multipart::MultipartError;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// A required input is missing or violates a field rule (HTTP 400).
    ValidationError(String),
    /// The request could not be decoded at all, e.g. a broken multipart stream (HTTP 400).
    BadRequest(String),
    /// Missing, malformed or expired credentials (HTTP 401).
    /// Also used for failed logins, with a single generic message.
    Unauthorized(String),
    /// The caller is authenticated but not allowed to touch the resource (HTTP 403).
    Forbidden(String),
    /// The requested record does not exist (HTTP 404).
    NotFound(String),
    /// A uniqueness constraint was violated, e.g. a taken username (HTTP 409).
    Conflict(String),
    /// An unexpected failure reported by the persistence store (HTTP 500).
    /// The underlying message is surfaced to the client.
    DatabaseError(String),
    /// Any other server-side failure: hashing, token signing, file I/O (HTTP 500).
    InternalServerError(String),
}

impl AppError {
    /// The message placed in the JSON body.
    pub fn message(&self) -> &str {
        match self {
            AppError::ValidationError(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::DatabaseError(msg)
            | AppError::InternalServerError(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into JSON `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(status).json(json!({
            "message": self.message()
        }))
    }
}

/// Postgres' name for the `UNIQUE` constraint on `users.username`.
pub const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Converts `sqlx::Error` into `AppError`.
///
/// Unique-index violations become `AppError::Conflict`; everything else is an
/// unexpected persistence failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                AppError::Conflict(unique_violation_message(db_error.constraint()))
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

fn unique_violation_message(constraint: Option<&str>) -> String {
    match constraint {
        Some(USERNAME_CONSTRAINT) => "Username already exists".to_string(),
        Some(other) => format!("Duplicate value violates {}", other),
        None => "Duplicate record".to_string(),
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {}", error))
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(error: MultipartError) -> AppError {
        AppError::BadRequest(format!("Invalid multipart payload: {}", error))
    }
}
