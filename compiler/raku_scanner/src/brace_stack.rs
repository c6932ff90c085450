//! Stack of open bracket-delimited constructs.
//!
//! Contrary to its name, this is not used for ordinary `{ ... }` blocks but
//! for constructs whose delimiters are chosen by the author, chiefly quoting
//! constructs (`Q[...]`, `q«...»`) and embedded comments (`` #`(...) ``).
//!
//! The root frame is implicit: an empty stack is the root at depth 0, and it
//! can never be popped. Frames live in an owning `Vec`, so the frame at index
//! `i` has depth `i + 1` and releasing frames is plain truncation.

use crate::delimiters;
use crate::error::{ScannerError, StackKind};

/// One open, unmatched construct.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BraceFrame {
    closing: char,
}

impl BraceFrame {
    /// Frame expecting `closing` as its terminator.
    pub const fn new(closing: char) -> Self {
        BraceFrame { closing }
    }

    /// The character that closes this construct.
    #[inline]
    pub const fn closing_delimiter(self) -> char {
        self.closing
    }

    /// The character that opened this construct (reverse table lookup).
    pub fn opening_delimiter(self) -> char {
        delimiters::opener_for(self.closing)
    }
}

/// LIFO of expected closing delimiters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BraceStack {
    frames: Vec<BraceFrame>,
}

impl BraceStack {
    /// A stack holding only the root.
    pub const fn new() -> Self {
        BraceStack { frames: Vec::new() }
    }

    /// Rebuild a stack from closing delimiters ordered root outward.
    pub(crate) fn from_frames(frames: Vec<BraceFrame>) -> Self {
        BraceStack { frames }
    }

    /// Current depth; 0 at the root.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` when only the root remains.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.frames.is_empty()
    }

    /// Open a construct delimited by `opening`.
    ///
    /// The closing delimiter comes from the pair table, or is `opening`
    /// itself for symmetric delimiters.
    pub fn push(&mut self, opening: char) -> Result<(), ScannerError> {
        self.frames
            .try_reserve(1)
            .map_err(|_| ScannerError::AllocationFailure(StackKind::Brace))?;
        let closing = delimiters::closing_for(opening);
        self.frames.push(BraceFrame::new(closing));
        tracing::trace!(?opening, ?closing, depth = self.depth(), "brace push");
        Ok(())
    }

    /// Close the innermost construct, returning its closing delimiter.
    pub fn pop(&mut self) -> Result<char, ScannerError> {
        let frame = self
            .frames
            .pop()
            .ok_or(ScannerError::StackUnderflow(StackKind::Brace))?;
        tracing::trace!(closing = ?frame.closing, depth = self.depth(), "brace pop");
        Ok(frame.closing)
    }

    /// Closing delimiter of the innermost construct; `None` at the root.
    #[inline]
    pub fn top_closing_delimiter(&self) -> Option<char> {
        self.frames.last().map(|frame| frame.closing)
    }

    /// Innermost frame; `None` at the root.
    #[inline]
    pub fn top(&self) -> Option<BraceFrame> {
        self.frames.last().copied()
    }

    /// Frames ordered from the root outward, paired with their depth.
    pub fn frames(&self) -> impl ExactSizeIterator<Item = (usize, BraceFrame)> + '_ {
        self.frames
            .iter()
            .enumerate()
            .map(|(index, frame)| (index + 1, *frame))
    }

    /// Release every frame above `depth`.
    pub(crate) fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }

    /// Release every frame, leaving the root.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
