//! Scanner session configuration.

/// Size of the host runtime's serialization buffer in bytes.
pub const SERIALIZATION_BUFFER_SIZE: usize = 1024;

/// Configuration for a scanner session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScannerConfig {
    /// Upper bound on the encoded state size used by
    /// [`ScannerState::serialize_to_vec`](crate::ScannerState::serialize_to_vec).
    /// Defaults to [`SERIALIZATION_BUFFER_SIZE`].
    pub serialization_capacity: usize,

    /// Whether a heredoc terminator line may be indented.
    /// Defaults to `true`, matching Raku's dedenting heredocs.
    pub indented_terminators: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            serialization_capacity: SERIALIZATION_BUFFER_SIZE,
            indented_terminators: true,
        }
    }
}

impl ScannerConfig {
    /// Create a config with the specified serialization capacity.
    pub fn with_serialization_capacity(serialization_capacity: usize) -> Self {
        Self {
            serialization_capacity,
            ..Default::default()
        }
    }

    /// Create a config that only accepts terminators at column 0.
    pub fn strict_terminators() -> Self {
        Self {
            indented_terminators: false,
            ..Default::default()
        }
    }
}
