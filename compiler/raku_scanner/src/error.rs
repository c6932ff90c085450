//! Scanner error taxonomy.
//!
//! Every failure the scanner can hit is returned as a [`ScannerError`] value.
//! None of them terminate the host: the engine downgrades
//! [`ScannerError::StackUnderflow`] to "no match", and the host reacts to the
//! codec errors by falling back to a full re-lex.

use std::fmt;

/// Which of the two scanner stacks an error refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StackKind {
    /// The quote-construct / comment delimiter stack.
    Brace,
    /// The pending heredoc stack.
    Heredoc,
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackKind::Brace => f.write_str("brace"),
            StackKind::Heredoc => f.write_str("heredoc"),
        }
    }
}

/// Why a serialized scanner state was rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum CorruptionKind {
    /// A declared count or length runs past the end of the buffer.
    #[error("declared length exceeds remaining input")]
    Truncated,
    /// The buffer holds bytes beyond the encoded state.
    #[error("unexpected trailing bytes")]
    TrailingBytes,
    /// A delimiter or sentinel value is not a Unicode scalar value.
    #[error("invalid codepoint 0x{0:X}")]
    InvalidCodepoint(u32),
    /// A heredoc flag word has bits outside the five interpolation flags.
    #[error("unknown interpolation flag bits 0b{0:b}")]
    UnknownFlags(u32),
    /// A heredoc nesting level drops or skips a level.
    #[error("inconsistent heredoc nesting level {0}")]
    InvalidNesting(u32),
    /// Any other structural decoding failure.
    #[error("malformed state record")]
    Malformed,
}

/// Recoverable scanner failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScannerError {
    /// Attempted to pop the root frame of a stack.
    #[error("cannot pop the root frame of the {0} stack")]
    StackUnderflow(StackKind),

    /// The encoded state does not fit in the destination buffer.
    #[error("serialized scanner state needs {needed} bytes but only {capacity} are available")]
    SerializationOverflow { needed: usize, capacity: usize },

    /// A serialized state failed validation.
    #[error("serialized scanner state is corrupt: {0}")]
    DeserializationCorruption(CorruptionKind),

    /// A frame or sentinel copy could not be allocated.
    #[error("allocation failed while growing the {0} stack")]
    AllocationFailure(StackKind),
}
