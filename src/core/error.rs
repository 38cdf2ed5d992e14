use thiserror::Error;

#[derive(Error, Debug)]
pub enum BusError {
    #[error(
        "Argument '{parameter}' (position {position}) of handler '{method}' has a malformed type '{declared}': expected a single named type"
    )]
    MalformedArgumentType {
        method: String,
        parameter: String,
        position: usize,
        declared: String,
    },

    #[error("Return type '{declared}' of handler '{method}' cannot be reduced to a single named type")]
    UnresolvableReturnType { method: String, declared: String },

    #[error(
        "Unknown type '{type_name}' for argument '{parameter}' (position {position}) of handler '{method}'"
    )]
    UnknownType {
        method: String,
        parameter: String,
        position: usize,
        type_name: String,
    },

    #[error("Type '{0}' is already registered")]
    TypeAlreadyRegistered(String),

    #[error("Type '{type_name}' refers to unregistered parent '{parent}'")]
    UnknownParentType { type_name: String, parent: String },

    #[error("Invalid type hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("Cannot determine the message class of handler '{method}'")]
    MissingMessageClass { method: String },

    #[error("No invocation thunk bound for handler '{method}'")]
    MissingThunk { method: String },

    #[error("Message type mismatch: expected '{expected}', got '{actual}'")]
    MessageTypeMismatch { expected: String, actual: String },

    #[error("Handler '{method}' failed: {source}")]
    HandlerFailed {
        method: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to create datetime: {0}")]
    CreateDateTimeFailed(String),

    #[error("Invalid datetime format specified: {0}")]
    InvalidDateTimeFormat(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, BusError>;

impl BusError {
    /// Whether the error was raised while building a descriptor.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedArgumentType { .. }
                | Self::UnresolvableReturnType { .. }
                | Self::UnknownType { .. }
                | Self::MissingMessageClass { .. }
                | Self::MissingThunk { .. }
        )
    }
}

impl From<std::io::Error> for BusError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
