use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudentDbError {
    #[error("Schema error: field '{field}' {message}")]
    Schema { field: String, message: String },

    #[error("Email domain not allowed: {domain}")]
    Domain { domain: String },

    #[error("Invalid argument '{name}': {value}")]
    InvalidArgument { name: String, value: String },

    #[error("Student not found: {id}")]
    NotFound { id: String },

    #[error("Student already exists: {id}")]
    Conflict { id: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StudentDbError {
    pub(crate) fn schema(field: &str, message: impl Into<String>) -> Self {
        StudentDbError::Schema {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Stable name of the error category, used in HTTP and CLI error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            StudentDbError::Schema { .. } => "SchemaError",
            StudentDbError::Domain { .. } => "DomainError",
            StudentDbError::InvalidArgument { .. } => "InvalidArgument",
            StudentDbError::NotFound { .. } => "NotFound",
            StudentDbError::Conflict { .. } => "Conflict",
            StudentDbError::Storage(_) | StudentDbError::Io(_) | StudentDbError::Json(_) => {
                "StorageError"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StudentDbError>;
