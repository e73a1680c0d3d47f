//! Error types for the session dashboard

use thiserror::Error;

/// What kind of record a `NotFound` refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    User,
    Session,
    Scenario,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecordKind::User => "user",
            RecordKind::Session => "session",
            RecordKind::Scenario => "scenario",
        };
        f.write_str(name)
    }
}

/// Main error type for the dashboard
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("{kind} not found: {key}")]
    NotFound { kind: RecordKind, key: String },

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A fetch task ended without producing a result (panicked or cancelled)
    #[error("Fetch task failed: {0}")]
    TaskFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl DashboardError {
    pub fn session_not_found(session_id: u64) -> Self {
        DashboardError::NotFound {
            kind: RecordKind::Session,
            key: session_id.to_string(),
        }
    }

    pub fn scenario_not_found(label: &str) -> Self {
        DashboardError::NotFound {
            kind: RecordKind::Scenario,
            key: label.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DashboardError::NotFound { .. })
    }

    /// Failures where the fetch itself could not complete
    pub fn is_transport(&self) -> bool {
        matches!(self, DashboardError::Transport(_))
    }
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
