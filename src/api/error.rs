//! API error types with status classification.

/// Error from a remote API call.
#[derive(Debug)]
pub struct ApiError {
    /// The kind of error
    pub kind: ApiErrorKind,
    /// HTTP status code, if applicable
    pub status_code: Option<u16>,
    /// Error message
    pub message: String,
}

impl ApiError {
    /// Create a server error.
    pub fn server_error(status_code: u16, message: String) -> Self {
        Self {
            kind: ApiErrorKind::ServerError,
            status_code: Some(status_code),
            message,
        }
    }

    /// Create a client error (bad request, auth, missing resource).
    pub fn client_error(status_code: u16, message: String) -> Self {
        Self {
            kind: ApiErrorKind::ClientError,
            status_code: Some(status_code),
            message,
        }
    }

    /// Create a network error.
    pub fn network_error(message: String) -> Self {
        Self {
            kind: ApiErrorKind::NetworkError,
            status_code: None,
            message,
        }
    }

    /// Create a parse error.
    pub fn parse_error(message: String) -> Self {
        Self {
            kind: ApiErrorKind::ParseError,
            status_code: None,
            message,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (HTTP {}): {}", self.kind, code, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Classification of API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Server error (500, 502, 503, 504)
    ServerError,
    /// Client error (400, 401, 403, 404)
    ClientError,
    /// Network error (connection failed, timeout)
    NetworkError,
    /// Response body was not the expected JSON
    ParseError,
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiErrorKind::ServerError => write!(f, "Server error"),
            ApiErrorKind::ClientError => write!(f, "Client error"),
            ApiErrorKind::NetworkError => write!(f, "Network error"),
            ApiErrorKind::ParseError => write!(f, "Parse error"),
        }
    }
}

/// Parse HTTP status code into error kind.
pub fn classify_http_status(status: u16) -> ApiErrorKind {
    match status {
        500 | 502 | 503 | 504 => ApiErrorKind::ServerError,
        400..=499 => ApiErrorKind::ClientError,
        _ => ApiErrorKind::ServerError,
    }
}
