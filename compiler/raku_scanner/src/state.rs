//! Scanner session state.
//!
//! One [`ScannerState`] lives for one parse of one document. It owns both
//! stacks outright; dropping it releases them.

use crate::brace_stack::BraceStack;
use crate::codec;
use crate::config::ScannerConfig;
use crate::engine::Engine;
use crate::error::ScannerError;
use crate::heredoc::{HeredocStack, InterpFlags};
use crate::lexer::Lexer;
use crate::token::{Token, ValidTokens};

/// Persistent state of the external scanner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScannerState {
    braces: BraceStack,
    heredocs: HeredocStack,
    config: ScannerConfig,
}

impl ScannerState {
    /// Fresh state: both stacks at their root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state with a custom configuration.
    pub fn with_config(config: ScannerConfig) -> Self {
        ScannerState {
            braces: BraceStack::new(),
            heredocs: HeredocStack::new(),
            config,
        }
    }

    /// Rebuild a state from a snapshot written by [`serialize`](Self::serialize).
    ///
    /// An empty slice yields the same state as [`new`](Self::new).
    pub fn deserialize(bytes: &[u8]) -> Result<Self, ScannerError> {
        let mut state = Self::new();
        state.restore(bytes)?;
        Ok(state)
    }

    /// Replace both stacks with the snapshot in `bytes`.
    ///
    /// On error the current stacks are kept unchanged.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), ScannerError> {
        let (braces, heredocs) = codec::decode(bytes)?;
        self.braces = braces;
        self.heredocs = heredocs;
        Ok(())
    }

    /// Write a snapshot of both stacks into `buf`, returning the bytes used.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize, ScannerError> {
        codec::encode(&self.braces, &self.heredocs, buf)
    }

    /// Snapshot into a new buffer bounded by the configured capacity.
    pub fn serialize_to_vec(&self) -> Result<Vec<u8>, ScannerError> {
        let mut buf = vec![0u8; self.config.serialization_capacity];
        let len = self.serialize(&mut buf)?;
        buf.truncate(len);
        Ok(buf)
    }

    /// Decide the external token at the lexer's position.
    ///
    /// Returns `Ok(None)` when nothing matches; the stacks are then
    /// unchanged.
    pub fn scan<L: Lexer + ?Sized>(
        &mut self,
        lexer: &mut L,
        valid: ValidTokens,
    ) -> Result<Option<Token>, ScannerError> {
        Engine {
            braces: &mut self.braces,
            heredocs: &mut self.heredocs,
            config: &self.config,
            lexer,
        }
        .scan(valid)
    }

    /// Record a heredoc introducer recognized by the grammar.
    pub fn declare_heredoc(
        &mut self,
        sentinel: &str,
        flags: InterpFlags,
    ) -> Result<(), ScannerError> {
        self.heredocs.push(sentinel, flags)
    }

    /// Return both stacks to their root.
    pub fn reset(&mut self) {
        self.braces.clear();
        self.heredocs.clear();
    }

    #[inline]
    pub fn braces(&self) -> &BraceStack {
        &self.braces
    }

    #[inline]
    pub fn braces_mut(&mut self) -> &mut BraceStack {
        &mut self.braces
    }

    #[inline]
    pub fn heredocs(&self) -> &HeredocStack {
        &self.heredocs
    }

    #[inline]
    pub fn heredocs_mut(&mut self) -> &mut HeredocStack {
        &mut self.heredocs
    }

    #[inline]
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }
}
