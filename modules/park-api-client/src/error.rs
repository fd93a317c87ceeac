use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// The API answered but refused the operation, either with a non-2xx
    /// status or with `success: false` in the body. `message` and `error`
    /// are the body fields of the same names.
    #[error("API error (status {status}): {}", describe(.message, .error, "no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
        error: Option<String>,
    },

    #[error("Unauthorized: {}", describe(.message, .error, "login required"))]
    Unauthorized {
        redirect_url: Option<String>,
        message: Option<String>,
        error: Option<String>,
    },
}

fn describe<'a>(
    message: &'a Option<String>,
    error: &'a Option<String>,
    fallback: &'a str,
) -> &'a str {
    message.as_deref().or(error.as_deref()).unwrap_or(fallback)
}

impl ApiError {
    /// The body's `message` field.
    pub fn server_message(&self) -> Option<&str> {
        self.fields().0
    }

    /// The body's `error` field, falling back to `message`.
    pub fn server_error(&self) -> Option<&str> {
        let (message, error) = self.fields();
        error.or(message)
    }

    /// The body's `message` field, falling back to `error`.
    pub fn server_text(&self) -> Option<&str> {
        let (message, error) = self.fields();
        message.or(error)
    }

    /// Transport or decoding failure, as opposed to an answer from the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Parse(_))
    }

    fn fields(&self) -> (Option<&str>, Option<&str>) {
        match self {
            ApiError::Rejected { message, error, .. }
            | ApiError::Unauthorized { message, error, .. } => {
                (message.as_deref(), error.as_deref())
            }
            ApiError::Network(_) | ApiError::Parse(_) => (None, None),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}
