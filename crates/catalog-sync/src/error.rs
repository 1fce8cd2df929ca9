use crate::batch::BatchResponse;
use crate::phase::ItemId;

/// The request itself could not complete (connection, HTTP status, malformed body).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("request failed{}: {message}", http_status(.status))]
pub struct TransportError {
    /// HTTP status when the server answered at all.
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

fn http_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Errors that can end a sync session or a single import.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The backend answered with `success = false`.
    #[error("{message}")]
    Application {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// One item of a selective import failed.
    #[error("{item}: {message}")]
    PerItem { item: ItemId, message: String },
}

const DEFAULT_FAILURE_MESSAGE: &str = "the server reported a failure";

impl SyncError {
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application {
            message: message.into(),
            details: None,
        }
    }

    /// Build an application error from a `success = false` response.
    pub fn from_response(response: &BatchResponse) -> Self {
        Self::Application {
            message: response
                .message
                .clone()
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_owned()),
            details: response.details.clone(),
        }
    }

    /// Structured details meant for the diagnostic channel, if any.
    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Application { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
