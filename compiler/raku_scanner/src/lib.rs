//! External scanner state for the Raku tree-sitter grammar.
//!
//! Some Raku tokens cannot be described by the grammar's declarative rules:
//!
//! - **Quote constructs** whose delimiters are chosen by the author and may
//!   nest (`Q[a [b] c]`, `q«...»`, `q/.../`).
//! - **Embedded comments** (`` #`( ... ) ``) with nested brackets.
//! - **Heredoc bodies** (`q:to/END/`), which start on the line after the
//!   introducer, end at a sentinel line, and interpolate selectively.
//!
//! This crate decides those tokens. It keeps two stacks across scan calls,
//! a [`BraceStack`] of expected closing delimiters and a [`HeredocStack`] of
//! pending heredocs, and snapshots both into a bounded byte buffer so the
//! host can resume lexing in the middle of a document after an edit.
//!
//! # Host protocol
//!
//! ```text
//! create       ScannerState::new()
//! scan         state.scan(&mut lexer, valid)   -> Ok(Some(token)) | Ok(None)
//! heredoc      state.declare_heredoc("END", InterpFlags::from_adverbs("qq:to"))
//! serialize    state.serialize(&mut buf)       -> bytes written
//! deserialize  state.restore(&buf[..len])
//! destroy      drop(state)
//! ```
//!
//! # Tracing
//!
//! Stack mutations are logged at `trace`, heredoc declarations at `debug`,
//! and recovered failures at `warn`. Call [`init_tracing`] and set
//! `RUST_LOG=raku_scanner=trace` to see them.

pub mod brace_stack;
pub mod codec;
pub mod config;
pub mod delimiters;
mod engine;
pub mod error;
pub mod heredoc;
pub mod lexer;
mod state;
pub mod token;

pub use brace_stack::{BraceFrame, BraceStack};
pub use config::{ScannerConfig, SERIALIZATION_BUFFER_SIZE};
pub use error::{CorruptionKind, ScannerError, StackKind};
pub use heredoc::{HeredocFrame, HeredocStack, InterpFlags};
pub use lexer::{Lexer, StrLexer};
pub use state::ScannerState;
pub use token::{Span, Token, TokenKind, ValidTokens};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Only installs a subscriber when `RUST_LOG`
/// is set, e.g. `RUST_LOG=raku_scanner=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
