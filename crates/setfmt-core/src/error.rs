//! Error types and the errno values they surface as at the C boundary.

use thiserror::Error;

/// Invalid argument.
pub const EINVAL: i32 = 22;
/// Value too large for defined data type.
pub const EOVERFLOW: i32 = 75;
/// Invalid or incomplete multibyte or wide character.
pub const EILSEQ: i32 = 84;

/// Rejection reported by the formatting primitive (a negative `vsnprintf` result).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("no argument supplied at position {index}")]
    MissingArgument { index: usize },
    #[error("argument #{index} cannot be rendered by %{conversion}")]
    ArgumentMismatch { index: usize, conversion: char },
    #[error("%{conversion} is not supported")]
    UnsupportedConversion { conversion: char },
    #[error("argument #{index} is not a valid wide character")]
    InvalidWideChar { index: usize },
    #[error("rendered output would exceed INT_MAX bytes")]
    Overflow,
}

impl EncodingError {
    /// The negative status code a C caller sees for this error.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::MissingArgument { .. }
            | Self::ArgumentMismatch { .. }
            | Self::UnsupportedConversion { .. } => -EINVAL,
            Self::InvalidWideChar { .. } => -EILSEQ,
            Self::Overflow => -EOVERFLOW,
        }
    }
}

/// Failure of one format-and-emit call. The sink was not invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error("render buffer of {capacity} bytes could not be allocated")]
    AllocationExhausted { capacity: usize },
    #[error("template could not be rendered: {0}")]
    Encoding(#[from] EncodingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_negative_errno_values() {
        assert_eq!(EncodingError::MissingArgument { index: 0 }.code(), -22);
        assert_eq!(EncodingError::InvalidWideChar { index: 1 }.code(), -84);
        assert_eq!(EncodingError::Overflow.code(), -75);
    }

    #[test]
    fn emit_error_wraps_encoding_error() {
        let err: EmitError = EncodingError::Overflow.into();
        assert_eq!(err, EmitError::Encoding(EncodingError::Overflow));
        assert!(err.to_string().contains("INT_MAX"));
    }
}
