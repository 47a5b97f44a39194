//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A masking pattern failed to compile
    #[error("Invalid mask pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// An attached transport rejected a record
    #[error("Transport '{name}' failed: {message}")]
    TransportError { name: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// The console bridge could not be registered with the `log` facade
    #[error("Console bridge unavailable: {0}")]
    ConsoleBridge(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(name: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::TransportError {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a console bridge error
    pub fn console_bridge<S: Into<String>>(msg: S) -> Self {
        LoggerError::ConsoleBridge(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
