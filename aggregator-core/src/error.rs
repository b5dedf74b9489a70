use reqwest::StatusCode;
use thiserror::Error;

/// Structured codes the backend may attach to a duplicate-subscription error.
const DUPLICATE_CODES: &[&str] = &["duplicate", "conflict", "already_subscribed"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Auth,
    Conflict,
    Validation,
    Unexpected,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid api url: {0}")]
    Url(#[from] url::ParseError),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("backend returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        message: Option<String>,
        code: Option<String>,
    },
}

impl ApiError {
    pub fn status(status: StatusCode, message: impl Into<Option<String>>) -> Self {
        Self::Status {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::Url(_) => ErrorKind::Transport,
            Self::Decode(_) => ErrorKind::Unexpected,
            Self::Status { status, .. } => match *status {
                StatusCode::UNAUTHORIZED => ErrorKind::Auth,
                StatusCode::CONFLICT => ErrorKind::Conflict,
                s if s.is_client_error() => ErrorKind::Validation,
                _ => ErrorKind::Unexpected,
            },
        }
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The error text sent by the backend, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref().filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }

    /// Backend message when present, `fallback` otherwise.
    pub fn describe(&self, fallback: &str) -> String {
        self.backend_message().unwrap_or(fallback).to_string()
    }

    /// Whether the backend refused the request because it already holds the record.
    ///
    /// A structured `code` wins when present; otherwise a 409 or a message
    /// mentioning a unique/duplicate violation counts.
    pub fn is_duplicate(&self) -> bool {
        let Self::Status {
            status,
            message,
            code,
        } = self
        else {
            return false;
        };

        if let Some(code) = code.as_deref() {
            let code = code.to_ascii_lowercase();
            return DUPLICATE_CODES.contains(&code.as_str());
        }

        if *status == StatusCode::CONFLICT {
            return true;
        }

        message
            .as_deref()
            .map(|m| {
                let m = m.to_lowercase();
                m.contains("unique") || m.contains("duplicate")
            })
            .unwrap_or(false)
    }

    /// 401, or 400 from an endpoint behind the auth middleware (missing token).
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self.status_code(),
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::BAD_REQUEST)
        )
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session storage i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate the configuration directory")]
    NoConfigDir,
    #[error("configuration i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}
