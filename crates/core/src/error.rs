//! Error types for mediaq.

use alloc::string::String;
use core::fmt;

/// Result type alias for mediaq operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised by the media query registry.
///
/// All of these are usage errors or permanent facts about the host, so none
/// of them is worth retrying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The host does not expose the native match/subscribe capability.
    UnsupportedFeature {
        feature: String,
    },
    /// An argument had the wrong shape or was empty.
    InvalidArgument {
        message: String,
    },
    /// No condition has been registered under this name.
    NotRegistered {
        name: String,
    },
    /// The registry was disposed or dropped.
    Disposed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedFeature { feature } => {
                write!(f, "The feature \"{}\" is not supported by this host.", feature)
            }
            Error::InvalidArgument { message } => {
                write!(f, "Invalid argument: {}", message)
            }
            Error::NotRegistered { name } => {
                write!(
                    f,
                    "No media query has been registered with the name \"{}\".",
                    name
                )
            }
            Error::Disposed => write!(f, "The media query registry has been disposed."),
        }
    }
}

impl core::error::Error for Error {}

impl Error {
    /// Creates an unsupported feature error.
    pub fn unsupported_feature(feature: impl Into<String>) -> Self {
        Error::UnsupportedFeature {
            feature: feature.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a not registered error.
    pub fn not_registered(name: impl Into<String>) -> Self {
        Error::NotRegistered { name: name.into() }
    }

    /// Creates a disposed error.
    #[inline]
    pub fn disposed() -> Self {
        Error::Disposed
    }

    /// Returns true if this error should surface as a type error at a dynamic boundary.
    #[inline]
    pub fn is_type_error(&self) -> bool {
        matches!(self, Error::InvalidArgument { .. })
    }
}
