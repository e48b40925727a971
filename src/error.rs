use axum::http::StatusCode;

/// Why a profile line could not be turned into [`crate::stats::Stats`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("profile file is empty")]
    NoData,

    #[error("profile line has no field at index {index}")]
    MissingField { index: usize },

    #[error("field {index} is not a non-negative integer: {value:?}")]
    InvalidNumber { index: usize, value: String },
}

/// Failure of a single upstream stats lookup.
///
/// `Display` carries the detail and is meant for logs only. What the caller
/// gets to see is [`FetchError::public_message`].
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("user `{0}` not found upstream")]
    NotFound(String),

    #[error("could not parse profile: {0}")]
    Parse(#[from] ParseError),

    #[error("upstream unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    UpstreamStatus(StatusCode),

    #[error("internal error: {0}")]
    Internal(String),
}

impl FetchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FetchError::NotFound(_) => StatusCode::NOT_FOUND,
            FetchError::Parse(_)
            | FetchError::Unreachable(_)
            | FetchError::UpstreamStatus(_)
            | FetchError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text rendered into the error badge. Never includes upstream detail.
    pub fn public_message(&self) -> String {
        match self {
            FetchError::NotFound(username) => format!("User '{username}' not found"),
            FetchError::Parse(ParseError::NoData) => "No data found in profile file".to_string(),
            FetchError::Parse(_) => "Could not parse stats".to_string(),
            FetchError::Unreachable(_) => "Could not connect to Project Euler".to_string(),
            FetchError::UpstreamStatus(_) => "Project Euler request failed".to_string(),
            FetchError::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

/// Everything the badge endpoint can fail with.
#[derive(thiserror::Error, Debug)]
pub enum BadgeError {
    #[error("missing `username` query parameter")]
    MissingUsername,

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl BadgeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BadgeError::MissingUsername => StatusCode::BAD_REQUEST,
            BadgeError::Fetch(err) => err.status_code(),
        }
    }

    pub fn public_message(&self) -> String {
        match self {
            BadgeError::MissingUsername => "Username required (?username=...)".to_string(),
            BadgeError::Fetch(err) => err.public_message(),
        }
    }
}
