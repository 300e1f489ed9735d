//! Domain errors shared by the repository layer, the booking engine and the API.

use std::collections::HashMap;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No (valid) bearer token on a request that needs one
    #[error("Not authenticated")]
    AuthenticationRequired,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated, but the role or ownership does not permit the operation
    #[error("{0}")]
    AuthorizationDenied(String),

    #[error("{message}")]
    ValidationFailed {
        message: String,
        fields: HashMap<String, Vec<String>>,
    },

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    NotFound(String),

    /// The entity is in a state that does not allow the operation
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::AuthorizationDenied(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate(message.into())
    }

    /// Validation error with field-level details
    pub fn validation(fields: HashMap<String, Vec<String>>) -> Self {
        let message = if fields.len() == 1 {
            fields
                .values()
                .next()
                .and_then(|v| v.first())
                .cloned()
                .unwrap_or_else(|| "Validation failed".to_string())
        } else {
            format!("Validation failed for {} fields", fields.len())
        };

        Self::ValidationFailed { message, fields }
    }

    pub fn validation_field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = HashMap::new();
        fields.insert(field.to_string(), vec![message.into()]);
        Self::validation(fields)
    }

    /// True when the underlying store rejected a write on a UNIQUE constraint
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Store(sqlx::Error::Database(db_err)) => {
                db_err.message().contains("UNIQUE constraint failed")
            }
            _ => false,
        }
    }
}

/// Collects field-level validation errors before failing an operation
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: HashMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }

    /// Record the error of a `Result<_, String>` validator, if any
    pub fn check<T>(&mut self, field: &str, result: std::result::Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Return Ok(()) if no errors were collected
    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(self.errors))
        }
    }
}
