//! Error handling for Kicklab
//!
//! Errors fall into four groups: validation (never sent over the network),
//! conflict (asset deletion blocked by presets), transport/server, and engine
//! initialization.

use thiserror::Error;

/// Result type alias for Kicklab operations
pub type Result<T> = std::result::Result<T, KicklabError>;

/// Main error type for Kicklab operations
#[derive(Error, Debug)]
pub enum KicklabError {
    // Validation Errors
    #[error("Invalid preset name '{name}': {reason}")]
    InvalidPresetName { name: String, reason: String },

    #[error("Sign in to save or delete presets")]
    NotAuthenticated,

    #[error("Cannot update shared preset '{name}'")]
    CannotUpdateShared { name: String },

    #[error("Cannot delete shared preset '{name}'")]
    CannotDeleteShared { name: String },

    #[error("No preset is selected")]
    NoCurrentPreset,

    #[error("Delete kicks to generate more ({total}/{cap})")]
    CapacityReached { total: u32, cap: u32 },

    #[error("Invalid tempo '{input}'")]
    InvalidTempo { input: String },

    // Conflict Errors
    #[error("Kick is used by presets: {}", presets.join(", "))]
    AssetConflict { presets: Vec<String> },

    // Transport / Server Errors
    #[error("Daily generation limit reached: {message}")]
    DailyLimitReached { message: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request failed: {message}")]
    Transport { message: String },

    // Engine Errors
    #[error("Audio engine is not ready")]
    EngineNotReady,

    #[error("Audio engine did not acknowledge within {timeout_ms}ms")]
    HandshakeTimeout { timeout_ms: u64 },

    #[error("Audio engine initialization cancelled")]
    InitCancelled,

    #[error("Audio engine command channel closed")]
    ChannelClosed,

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Failed to decode audio: {reason}")]
    Decode { reason: String },

    // Configuration Errors
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KicklabError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            KicklabError::InvalidPresetName { .. } => "INVALID_PRESET_NAME",
            KicklabError::NotAuthenticated => "NOT_AUTHENTICATED",
            KicklabError::CannotUpdateShared { .. } => "CANNOT_UPDATE_SHARED",
            KicklabError::CannotDeleteShared { .. } => "CANNOT_DELETE_SHARED",
            KicklabError::NoCurrentPreset => "NO_CURRENT_PRESET",
            KicklabError::CapacityReached { .. } => "CAPACITY_REACHED",
            KicklabError::InvalidTempo { .. } => "INVALID_TEMPO",
            KicklabError::AssetConflict { .. } => "ASSET_CONFLICT",
            KicklabError::DailyLimitReached { .. } => "DAILY_LIMIT_REACHED",
            KicklabError::NotFound { .. } => "NOT_FOUND",
            KicklabError::Server { .. } => "SERVER_ERROR",
            KicklabError::Transport { .. } => "TRANSPORT_ERROR",
            KicklabError::EngineNotReady => "ENGINE_NOT_READY",
            KicklabError::HandshakeTimeout { .. } => "HANDSHAKE_TIMEOUT",
            KicklabError::InitCancelled => "INIT_CANCELLED",
            KicklabError::ChannelClosed => "CHANNEL_CLOSED",
            KicklabError::Fetch { .. } => "FETCH_FAILED",
            KicklabError::Decode { .. } => "DECODE_FAILED",
            KicklabError::Config { .. } => "CONFIG_ERROR",
            KicklabError::Io(_) => "IO_ERROR",
            KicklabError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// True for errors detected locally, before any request was issued
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            KicklabError::InvalidPresetName { .. }
                | KicklabError::NotAuthenticated
                | KicklabError::CannotUpdateShared { .. }
                | KicklabError::CannotDeleteShared { .. }
                | KicklabError::NoCurrentPreset
                | KicklabError::CapacityReached { .. }
                | KicklabError::InvalidTempo { .. }
        )
    }

    /// Check if this error is recoverable by the user
    pub fn is_recoverable(&self) -> bool {
        match self {
            KicklabError::AssetConflict { .. } => true,
            KicklabError::Transport { .. } => true,
            KicklabError::Server { .. } => true,
            KicklabError::DailyLimitReached { .. } => true,
            KicklabError::Fetch { .. } => true,
            _ => self.is_validation(),
        }
    }

    /// Preset names carried by a deletion conflict
    pub fn conflicting_presets(&self) -> Option<&[String]> {
        match self {
            KicklabError::AssetConflict { presets } => Some(presets),
            _ => None,
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            KicklabError::InvalidPresetName { .. } => {
                Some("Use 1-32 letters, digits or spaces.")
            }
            KicklabError::NotAuthenticated => Some("Sign in to manage your own presets."),
            KicklabError::CannotUpdateShared { .. } => {
                Some("Save under a different name to keep your changes.")
            }
            KicklabError::CapacityReached { .. } => {
                Some("Delete some generated kicks to make room.")
            }
            KicklabError::AssetConflict { .. } => {
                Some("Confirm the deletion to also remove the listed presets.")
            }
            KicklabError::DailyLimitReached { .. } => Some("Try again tomorrow."),
            KicklabError::Transport { .. } | KicklabError::Server { .. } => {
                Some("Check your connection and try again.")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = KicklabError::CannotUpdateShared {
            name: "Init".to_string(),
        };
        assert_eq!(err.error_code(), "CANNOT_UPDATE_SHARED");
        assert_eq!(err.to_string(), "Cannot update shared preset 'Init'");
    }

    #[test]
    fn test_validation_errors_are_local() {
        assert!(KicklabError::CapacityReached { total: 30, cap: 30 }.is_validation());
        assert!(!KicklabError::Transport {
            message: "timeout".to_string()
        }
        .is_validation());
    }

    #[test]
    fn test_conflict_carries_preset_names() {
        let err = KicklabError::AssetConflict {
            presets: vec!["Intro".to_string(), "Drop".to_string()],
        };
        assert_eq!(
            err.conflicting_presets(),
            Some(&["Intro".to_string(), "Drop".to_string()][..])
        );
        assert!(err.is_recoverable());
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_engine_errors_not_recoverable() {
        assert!(!KicklabError::HandshakeTimeout { timeout_ms: 5000 }.is_recoverable());
        assert_eq!(KicklabError::EngineNotReady.error_code(), "ENGINE_NOT_READY");
    }
}
