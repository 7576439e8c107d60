use std::fmt;

/// Errors raised while registering or resolving routes
///
/// `InvalidPattern` is a registration-time error and should abort startup.
/// `MethodNotAllowed` and `NotFound` are request-time outcomes that the
/// dispatcher turns into `405` and `404` responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The regex built from a route pattern failed to compile
    InvalidPattern {
        /// The pattern as passed at registration
        pattern: String,
        /// The regex engine's explanation
        reason: String,
    },
    /// No route was ever registered for this method
    MethodNotAllowed {
        /// The request method
        method: String,
    },
    /// The method is known but none of its patterns match the path
    NotFound {
        /// The request method
        method: String,
        /// The request path
        path: String,
    },
}

impl RouterError {
    /// HTTP status code the error maps to
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            RouterError::InvalidPattern { .. } => 500,
            RouterError::MethodNotAllowed { .. } => 405,
            RouterError::NotFound { .. } => 404,
        }
    }
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::InvalidPattern { pattern, reason } => {
                write!(
                    f,
                    "invalid route pattern \"{}\": the generated regex does not compile: {}",
                    pattern, reason
                )
            }
            RouterError::MethodNotAllowed { method } => {
                write!(f, "no routes registered for method {}", method)
            }
            RouterError::NotFound { method, path } => {
                write!(f, "no route matches {} {}", method, path)
            }
        }
    }
}

impl std::error::Error for RouterError {}
