use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_format(name: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: name.into(),
                message: Default::default(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    /// A current-term accessor (or posting handoff) was used while the cursor
    /// was not positioned on a term.
    pub fn unpositioned(operation: &'static str) -> Error {
        Error(ErrorKind::Unpositioned { operation }.into())
    }

    /// The backend does not implement the requested operation.
    pub fn unsupported(operation: &'static str) -> Error {
        Error(ErrorKind::Unsupported { operation }.into())
    }

    pub fn term_not_found(term: &[u8]) -> Error {
        Error(
            ErrorKind::TermNotFound {
                term: String::from_utf8_lossy(term).into_owned(),
            }
            .into(),
        )
    }

    pub fn ordinal_out_of_range(ord: u64, size: u64) -> Error {
        Error(ErrorKind::OrdinalOutOfRange { ord, size }.into())
    }

    pub fn incompatible_state(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::IncompatibleTermState {
                message: message.into(),
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("invalid format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("{operation} called while the cursor is not positioned on a term")]
    Unpositioned { operation: &'static str },

    #[error("operation not supported: {operation}")]
    Unsupported { operation: &'static str },

    #[error("term '{term}' does not exist")]
    TermNotFound { term: String },

    #[error("term ordinal {ord} is out of range (size {size})")]
    OrdinalOutOfRange { ord: u64, size: u64 },

    #[error("incompatible term state: {message}")]
    IncompatibleTermState { message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
