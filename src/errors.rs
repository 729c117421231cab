use thiserror::Error;
use uuid::Uuid;

/// A single field-level validation message, as reported by the backend
/// (e.g. `{"email": ["The email field is required."]}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Error taxonomy for every remote operation.
///
/// The split between `Transport`, `Server` and `EmptyDownload` is load
/// bearing: a zero-byte report download is a server-side integrity problem,
/// not a network failure, and callers present the two differently.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Field-level validation failure; blocks submission client-side.
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    /// The request never produced a usable response (DNS, timeout, TLS...).
    #[error("Network error: {0}")]
    Transport(String),

    /// The server answered with a business error; the message is surfaced
    /// to the user verbatim.
    #[error("{0}")]
    Server(String),

    /// A download completed but produced a zero-byte file.
    #[error("Downloaded file was empty")]
    EmptyDownload,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum CartError {
    /// A mutation for this line is still in flight; duplicate submissions
    /// on the same line are rejected, other lines are unaffected.
    #[error("Cart line {0} already has a pending update")]
    LineBusy(Uuid),

    #[error("Cart line {0} not found")]
    UnknownLine(Uuid),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_displays_message_verbatim() {
        let err = ApiError::Server("Cannot reduce quantity below stock".to_string());
        assert_eq!(err.to_string(), "Cannot reduce quantity below stock");
    }

    #[test]
    fn validation_error_carries_fields() {
        let err = ApiError::Validation {
            message: "The given data was invalid.".to_string(),
            fields: vec![FieldError {
                field: "email".to_string(),
                message: "The email field is required.".to_string(),
            }],
        };
        match err {
            ApiError::Validation { fields, .. } => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "email");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_download_is_distinct_from_transport() {
        assert!(!matches!(
            ApiError::EmptyDownload,
            ApiError::Transport(_) | ApiError::Server(_)
        ));
    }

    #[test]
    fn api_error_converts_into_cart_error() {
        let cart_err: CartError = ApiError::Server("nope".to_string()).into();
        assert!(matches!(cart_err, CartError::Api(ApiError::Server(_))));
    }
}
