use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

/// Error taxonomy surfaced at the HTTP boundary and used by the scan
/// pipeline to decide whether a failure is per-document (isolated) or
/// must abort the whole request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    NotFound,
    BadRequest,
    ConfigResolution,
    Auth,
    Decode,
    Io,
    Ocr,
    Storage,
    PermissionDenied,
    Internal,
}

#[derive(Debug)]
pub struct AppError {
    pub kind: Kind,
    message: String,
}

impl AppError {
    pub fn new(kind: Kind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Kind::BadRequest, message)
    }

    pub fn not_found() -> Self {
        Self::new(Kind::NotFound, "resource not found")
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(Kind::Auth, message)
    }

    pub fn config_resolution(message: impl Into<String>) -> Self {
        Self::new(Kind::ConfigResolution, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(Kind::Decode, message)
    }

    pub fn ocr(message: impl Into<String>) -> Self {
        Self::new(Kind::Ocr, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(Kind::Storage, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(Kind::PermissionDenied, message)
    }

    pub fn internal<E: Display>(error: E) -> Self {
        Self::new(Kind::Internal, error.to_string())
    }

    /// Per-document scan failures are recoverable at the call site; the
    /// project scan keeps going with the next document.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.kind, Kind::Storage)
    }

    fn status(&self) -> StatusCode {
        match self.kind {
            Kind::NotFound => StatusCode::NOT_FOUND,
            Kind::BadRequest | Kind::ConfigResolution => StatusCode::BAD_REQUEST,
            Kind::Auth => StatusCode::INTERNAL_SERVER_ERROR,
            Kind::Decode
            | Kind::Io
            | Kind::Ocr
            | Kind::Storage
            | Kind::PermissionDenied
            | Kind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = ?self.kind, message = %self.message, "unhandled error at API boundary");
            let body = Json(ErrorResponse {
                detail: "internal server error".to_string(),
            });
            return (status, body).into_response();
        }
        let body = Json(ErrorResponse {
            detail: self.message,
        });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl From<diesel::result::Error> for AppError {
    fn from(value: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error as DieselError};
        match value {
            DieselError::NotFound => AppError::not_found(),
            DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::CheckViolation,
                ref info,
            ) => AppError::bad_request(info.message().to_string()),
            _ => AppError::new(Kind::Storage, value.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError::internal(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::new(Kind::Io, value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        AppError::new(Kind::Decode, value.to_string())
    }
}
