//! # Sync Error Types
//!
//! Error types for sync operations.
//!
//! ## Failure Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  TRANSIENT (is_transient)           PERMANENT                           │
//! │  ────────────────────────           ─────────                           │
//! │  Transport  - network down,         Rejected  - remote refused the row  │
//! │               timeout, 5xx          Serialization - undecodable payload │
//! │                                     InvalidConfig / InvalidUrl          │
//! │  Retry = next sync trigger.                                             │
//! │                                     Permanent failures skip the record; │
//! │  SPECIAL                            it stays pending and visible.       │
//! │  ───────                                                                │
//! │  NotFound  - on delete this is SUCCESS (the goal state already holds)   │
//! │                                                                         │
//! │  None of these ever surface to the register: the engine logs and        │
//! │  swallows at the protocol boundary.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering remote and engine failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Transport Errors (transient)
    // =========================================================================
    /// Network-level failure: offline, DNS, timeout, 5xx.
    #[error("Transport error: {0}")]
    Transport(String),

    // =========================================================================
    // Remote Rejections (permanent)
    // =========================================================================
    /// The remote understood the request and refused it.
    #[error("Remote rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The target row does not exist remotely.
    #[error("Remote row not found: {0}")]
    NotFound(String),

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// Queue payload or wire row could not be (de)serialized.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Local store failure during a sync cycle.
    #[error("Database error: {0}")]
    Database(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Invalid remote base URL.
    #[error("Invalid remote URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        // Anything the HTTP client itself fails on is a connectivity problem.
        SyncError::Transport(err.to_string())
    }
}

impl From<caja_db::DbError> for SyncError {
    fn from(err: caja_db::DbError) -> Self {
        SyncError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Classification (drives push retry policy)
// =============================================================================

impl SyncError {
    /// True if the failure is connectivity-shaped: the record stays queued
    /// and the next sync trigger retries it.
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::Transport(_))
    }

    /// True if the remote reported the row as absent. For delete pushes
    /// this is reclassified as success.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(SyncError::Transport("connection refused".into()).is_transient());
        assert!(!SyncError::Rejected {
            status: 409,
            message: "duplicate".into()
        }
        .is_transient());

        assert!(SyncError::NotFound("products/p-1".into()).is_not_found());
        assert!(!SyncError::Transport("offline".into()).is_not_found());
    }
}
