use std::fmt;

use axum::{http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CtxError {
    pub error: AppError,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppError {
    Generic { description: String },
    Validation { description: String },
    AuthenticationFail,
    AuthorizationFail { required: String },
    EntityFailIdNotFound { ident: String },
    Conflict { description: String },
    AuthFailNoJwtCookie,
    AuthFailJwtInvalid { source: String },
    Serde { source: String },
    SurrealDb { source: String },
}

/// CtxError implements IntoResponse and is what handlers surface to clients.
pub type CtxResult<T> = core::result::Result<T, CtxError>;
/// Any error for storing before composing a response.
pub type AppResult<T> = core::result::Result<T, AppError>;

impl std::error::Error for AppError {}

impl From<surrealdb::Error> for CtxError {
    fn from(value: surrealdb::Error) -> Self {
        CtxError {
            error: value.into(),
        }
    }
}

impl From<AppError> for CtxError {
    fn from(value: AppError) -> Self {
        CtxError { error: value }
    }
}

const INTERNAL: &str = "Internal error";

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic { description } => write!(f, "{description}"),
            Self::Validation { description } => write!(f, "{description}"),
            Self::AuthenticationFail => write!(f, "Invalid credentials"),
            Self::AuthorizationFail { required } => {
                write!(f, "Not authorized: requires {required}")
            }
            Self::EntityFailIdNotFound { ident } => write!(f, "{ident} not found"),
            Self::Conflict { description } => write!(f, "{description}"),
            Self::AuthFailNoJwtCookie => write!(f, "Not authorized to access this route"),
            Self::AuthFailJwtInvalid { .. } => {
                write!(f, "The provided token is not valid")
            }
            Self::Serde { source } => write!(f, "Serde error - {source}"),
            Self::SurrealDb { .. } => write!(f, "{INTERNAL}"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponseBody {
    pub success: bool,
    pub message: String,
}

impl ErrorResponseBody {
    pub fn new(message: String) -> Self {
        ErrorResponseBody {
            success: false,
            message,
        }
    }
}

impl From<ErrorResponseBody> for String {
    fn from(value: ErrorResponseBody) -> Self {
        serde_json::to_string(&value).unwrap_or(value.message)
    }
}

// REST error response; Conflict stays in the 400 class, no distinct 409.
impl IntoResponse for CtxError {
    fn into_response(self) -> axum::response::Response {
        tracing::debug!("->> {:<12} - into_response - {self:?}", "ERROR");
        let status_code = match self.error {
            AppError::EntityFailIdNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::AuthenticationFail
            | AppError::AuthFailNoJwtCookie
            | AppError::AuthFailJwtInvalid { .. } => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationFail { .. } => StatusCode::FORBIDDEN,
            AppError::Validation { .. }
            | AppError::Conflict { .. }
            | AppError::Serde { .. }
            | AppError::Generic { .. }
            | AppError::SurrealDb { .. } => StatusCode::BAD_REQUEST,
        };
        let err = self.error.clone();
        let body: String = ErrorResponseBody::new(self.error.to_string()).into();
        let mut response = (status_code, body).into_response();
        // Insert the real Error into the response - for the logger
        response.extensions_mut().insert(err);
        response
    }
}

// External Errors
impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde {
            source: value.to_string(),
        }
    }
}

impl From<surrealdb::Error> for AppError {
    fn from(value: surrealdb::Error) -> Self {
        Self::SurrealDb {
            source: value.to_string(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::AuthFailJwtInvalid {
            source: value.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for CtxError {
    fn from(value: validator::ValidationErrors) -> Self {
        CtxError {
            error: AppError::Validation {
                description: value.to_string(),
            },
        }
    }
}

impl From<CtxError> for AppError {
    fn from(value: CtxError) -> Self {
        value.error
    }
}
