//! Error types for the player-state core.

use thiserror::Error;

use crate::xfer::XferError;

/// Result type alias using [`StateError`].
pub type Result<T> = std::result::Result<T, StateError>;

/// Top-level error type for player-state operations.
///
/// Load-time variants represent save-file corruption or version-mismatch
/// bugs and abort the load rather than patching over bad data.
#[derive(Debug, Error)]
pub enum StateError {
    /// Stream-level serialization failure.
    #[error(transparent)]
    Xfer(#[from] XferError),

    /// An upgrade template named in a save stream does not exist.
    #[error("Unable to find upgrade template '{0}'")]
    UnknownUpgradeTemplate(String),

    /// A persisted team prototype id could not be resolved.
    #[error("Unable to find team prototype by id {0}")]
    UnknownTeamPrototype(u32),

    /// A structural invariant expected of well-formed saves was violated.
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// Data file parsing error.
    #[error("Failed to parse data '{source_name}': {message}")]
    DataParse {
        /// Name of the data source that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// Save container framing error.
    #[error("Invalid save container: {0}")]
    InvalidContainer(String),
}
