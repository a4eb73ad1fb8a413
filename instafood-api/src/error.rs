use serde_json::json;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("You must be logged in to do this")]
    AuthRequired,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server rejected the request ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    ServerRejected {
        status: u16,
        message: Option<String>,
    },

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::AuthRequired => StatusCode::UNAUTHORIZED,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Network(_) => StatusCode::BAD_GATEWAY,
            Error::ServerRejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message the server attached to this error, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Error::ServerRejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::AuthRequired => json!({
                "message": "authentication required",
                "type": "auth-required",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::NotFound(what) => json!({
                "message": format!("{what} not found"),
                "type": "not-found",
            }),
            Error::Network(msg) => json!({
                "message": msg,
                "type": "network",
            }),
            Error::ServerRejected { message, .. } => json!({
                "message": message,
                "type": "rejected",
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
        })
        .expect("serializing error contents")
    }

    /// Interpret a non-success response
    ///
    /// The server sends `{"message": ...}` bodies on most failures, but any
    /// other body (including none at all) is accepted and yields no message.
    pub fn parse(status: u16, body: &[u8]) -> Error {
        let message = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|data| {
                data.get("message")
                    .and_then(|m| m.as_str())
                    .map(String::from)
            })
            .filter(|m| !m.is_empty());
        match status {
            401 => Error::AuthRequired,
            _ => Error::ServerRejected { status, message },
        }
    }
}
