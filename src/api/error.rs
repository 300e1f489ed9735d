//! API error mapping.
//!
//! Domain errors surface in two shapes: as GraphQL errors carrying a
//! machine-readable `extensions.code`, and as a JSON envelope
//! `{"error": {"code", "message", "details"}}` on plain HTTP routes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use async_graphql::ErrorExtensions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::db::Environment;
use crate::error::Error;

/// Message shown for store failures outside development
pub const SANITIZED_DB_MESSAGE: &str = "Internal server error during DB operation";

/// Error codes for API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors
    Unauthenticated,
    Forbidden,
    BadUserInput,
    DuplicateResource,
    NotFound,
    Conflict,

    // Server errors
    InternalServerError,
    ServiceUnavailable,
}

impl ErrorCode {
    /// HTTP status used when the error is returned outside GraphQL
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::BadUserInput => StatusCode::BAD_REQUEST,
            ErrorCode::DuplicateResource => StatusCode::CONFLICT,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::BadUserInput => "BAD_USER_INPUT",
            ErrorCode::DuplicateResource => "DUPLICATE_RESOURCE",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn for_error(err: &Error) -> Self {
        match err {
            Error::AuthenticationRequired | Error::InvalidCredentials => ErrorCode::Unauthenticated,
            Error::AuthorizationDenied(_) => ErrorCode::Forbidden,
            Error::ValidationFailed { .. } => ErrorCode::BadUserInput,
            Error::Duplicate(_) => ErrorCode::DuplicateResource,
            Error::NotFound(_) => ErrorCode::NotFound,
            Error::Conflict(_) => ErrorCode::Conflict,
            Error::Store(_) | Error::Internal(_) => ErrorCode::InternalServerError,
        }
    }
}

/// The inner error object in the response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    /// Field-level validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

/// The full error response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    status: StatusCode,
    message: String,
    fields: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: code.status_code(),
            code,
            message: message.into(),
            fields: None,
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Map a domain error, logging store failures and hiding their
    /// details unless running in development
    pub fn from_domain(err: Error, environment: Environment) -> Self {
        let code = ErrorCode::for_error(&err);
        match err {
            Error::ValidationFailed { message, fields } => Self {
                fields: Some(fields),
                ..Self::new(code, message)
            },
            Error::Store(db_err) => {
                tracing::error!("Database error: {}", db_err);
                if environment.is_development() {
                    Self::new(code, format!("{}: {}", SANITIZED_DB_MESSAGE, db_err))
                } else {
                    Self::new(code, SANITIZED_DB_MESSAGE)
                }
            }
            Error::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                if environment.is_development() {
                    Self::new(code, message)
                } else {
                    Self::new(code, "Internal server error")
                }
            }
            other => Self::new(code, other.to_string()),
        }
    }

    /// GraphQL error with `extensions.code` and, for validation failures,
    /// `extensions.fields`
    pub fn into_graphql(self) -> async_graphql::Error {
        let code = self.code.as_str();
        let fields = self.fields;
        async_graphql::Error::new(self.message).extend_with(|_, ext| {
            ext.set("code", code);
            if let Some(fields) = &fields {
                if let Ok(value) =
                    serde_json::to_value(fields).and_then(async_graphql::Value::from_json)
                {
                    ext.set("fields", value);
                }
            }
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let response = ErrorResponse {
            error: ErrorBody {
                code: self.code.as_str().to_string(),
                message: self.message,
                details: self.fields,
            },
        };

        (self.status, Json(response)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}
