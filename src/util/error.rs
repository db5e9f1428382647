//! Error types for the Cameo library.

use std::fmt;
use thiserror::Error;

use super::FourCc;

/// Status code returned by a host registry primitive.
///
/// Zero means success. Every other value is a host-defined failure, usually
/// a four-character code such as `'who?'`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Status(pub i32);

impl Status {
    /// The call succeeded.
    pub const NO_ERROR: Self = Self(0);
    /// The object does not know about the requested property.
    pub const UNKNOWN_PROPERTY: Self = Self::code(*b"who?");
    /// The object id is not valid.
    pub const BAD_OBJECT: Self = Self::code(*b"!obj");
    /// The supplied buffer size is wrong for the property.
    pub const BAD_PROPERTY_SIZE: Self = Self::code(*b"!siz");
    /// The operation cannot be performed on this object.
    pub const ILLEGAL_OPERATION: Self = Self::code(*b"nope");
    /// The object does not support the operation.
    pub const UNSUPPORTED_OPERATION: Self = Self::code(*b"unop");
    /// Catch-all failure.
    pub const UNSPECIFIED: Self = Self::code(*b"what");

    const fn code(bytes: [u8; 4]) -> Self {
        Self(i32::from_be_bytes(bytes))
    }

    /// Returns true for the success status.
    #[inline]
    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Convert to a `Result`, mapping any failure to [`Error::HostCallFailed`].
    #[inline]
    pub fn check(self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(Error::HostCallFailed { status: self })
        }
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status({})", self)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fcc = FourCc(self.0 as u32);
        if self.0 != 0 && fcc.is_printable() {
            write!(f, "'{}'", fcc)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Main error type for Cameo operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A host primitive returned a non-success status
    #[error("Host call failed with status {status}")]
    HostCallFailed { status: Status },

    /// A qualified read was issued without a qualifier
    #[error("Property '{selector}' requires a qualifier")]
    QualifierRequired { selector: FourCc },

    /// Value tag does not match the declared value type of the property
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Selector is not part of the given property set
    #[error("Unknown key '{selector}' in {set}")]
    UnknownKey { set: &'static str, selector: FourCc },

    /// Operation requires different read semantics than the property declares
    #[error("Property '{selector}' does not support {expected}")]
    SemanticsMismatch { selector: FourCc, expected: &'static str },

    /// Host returned data that cannot be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid data error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// The host status carried by this error, if it came from a round trip.
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::HostCallFailed { status } => Some(*status),
            _ => None,
        }
    }

    /// True when the failure means the property is simply not defined on the
    /// queried object, as opposed to a transient or caller-side error.
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            Self::HostCallFailed { status } if *status == Status::UNKNOWN_PROPERTY
        )
    }
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        Self::HostCallFailed { status }
    }
}

/// Result type alias for Cameo operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::HostCallFailed { status: Status::UNKNOWN_PROPERTY };
        assert_eq!(e.to_string(), "Host call failed with status 'who?'");

        let e = Error::TypeMismatch { expected: "uint32".into(), actual: "float64".into() };
        assert!(e.to_string().contains("uint32"));
        assert!(e.to_string().contains("float64"));
    }

    #[test]
    fn test_status_check() {
        assert!(Status::NO_ERROR.check().is_ok());
        let err = Status::BAD_OBJECT.check().unwrap_err();
        assert_eq!(err.status(), Some(Status::BAD_OBJECT));
        assert!(!err.is_absent());
        assert!(Status::UNKNOWN_PROPERTY.check().unwrap_err().is_absent());
    }

    #[test]
    fn test_status_display_numeric() {
        assert_eq!(Status(-50).to_string(), "-50");
        assert_eq!(Status::NO_ERROR.to_string(), "0");
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
