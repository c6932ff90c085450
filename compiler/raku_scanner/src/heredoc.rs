//! Pending heredoc tracking.
//!
//! A heredoc introducer (`q:to/END/`, `qq:to<EOS>`) declares a body that
//! starts on the line after the introducer and runs until a line holding only
//! the sentinel. Several heredocs may be declared on one line; their bodies
//! follow one another in declaration order. Heredocs may also be declared
//! inside the interpolated code of another heredoc's body.
//!
//! Declarations push onto the top of the stack. Each frame records the
//! nesting level it was declared at: one more than the heredoc whose body was
//! being scanned at the time, or the level of the newest pending frame when
//! no body is in progress. Heredocs declared on the same line share a level
//! and are drained first in, first out. A group declared inside a body takes
//! over at the start of the next line and is drained before the enclosing
//! body resumes. See [`HeredocStack::body_frame`].
//!
//! # Interpolation flags
//!
//! | Bit | Flag       | Boundary in body |
//! |-----|------------|------------------|
//! | 0   | `CLOSURE`  | `{`              |
//! | 1   | `SCALAR`   | `$name`          |
//! | 2   | `ARRAY`    | `@name`          |
//! | 3   | `HASH`     | `%name`          |
//! | 4   | `FUNCTION` | `&name`          |
//!
//! The bit order is part of the serialized state format and must not change.

use bitflags::bitflags;

use crate::error::{ScannerError, StackKind};

bitflags! {
    /// Which embedded constructs a heredoc body interpolates.
    ///
    /// Fixed when the heredoc is declared, never mutated afterwards.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct InterpFlags: u32 {
        /// `{ ... }` closure blocks.
        const CLOSURE = 1 << 0;
        /// `$name` scalar variables.
        const SCALAR = 1 << 1;
        /// `@name` array variables.
        const ARRAY = 1 << 2;
        /// `%name` hash variables.
        const HASH = 1 << 3;
        /// `&name(...)` function calls.
        const FUNCTION = 1 << 4;
    }
}

impl InterpFlags {
    /// Full `qq` interpolation.
    pub const QQ: Self = Self::all();

    /// Returns `true` if any construct is interpolated.
    #[inline]
    pub const fn interpolates(self) -> bool {
        !self.is_empty()
    }

    /// Derive flags from a list of Raku quote adverbs.
    ///
    /// Accepts the adverb text with or without leading colons, e.g. `"qq:to"`,
    /// `":s:a:to"` or `"heredoc"`. Adverbs that do not affect interpolation
    /// are ignored.
    pub fn from_adverbs(adverbs: &str) -> Self {
        adverbs
            .split(':')
            .map(str::trim)
            .fold(Self::empty(), |flags, adverb| {
                flags
                    | match adverb {
                        "qq" => Self::QQ,
                        "s" | "scalar" => Self::SCALAR,
                        "a" | "array" => Self::ARRAY,
                        "h" | "hash" => Self::HASH,
                        "f" | "function" => Self::FUNCTION,
                        "c" | "closure" => Self::CLOSURE,
                        _ => Self::empty(),
                    }
            })
    }

    /// The flag that gates a variable or call sigil.
    pub(crate) fn for_sigil(c: char) -> Option<Self> {
        match c {
            '$' => Some(Self::SCALAR),
            '@' => Some(Self::ARRAY),
            '%' => Some(Self::HASH),
            '&' => Some(Self::FUNCTION),
            _ => None,
        }
    }
}

/// One declared heredoc whose body has not been fully consumed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HeredocFrame {
    sentinel: Box<[char]>,
    flags: InterpFlags,
    level: u32,
    body_started: bool,
}

impl HeredocFrame {
    pub(crate) fn new(
        sentinel: Box<[char]>,
        flags: InterpFlags,
        level: u32,
        body_started: bool,
    ) -> Self {
        HeredocFrame {
            sentinel,
            flags,
            level,
            body_started,
        }
    }

    /// Text that, alone on a line, terminates this heredoc.
    #[inline]
    pub fn sentinel(&self) -> &[char] {
        &self.sentinel
    }

    /// Interpolation flags fixed at declaration.
    #[inline]
    pub fn flags(&self) -> InterpFlags {
        self.flags
    }

    /// Interpolation nesting level the heredoc was declared at.
    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Whether any body text of this heredoc has been scanned.
    #[inline]
    pub fn body_started(&self) -> bool {
        self.body_started
    }
}

/// Pending heredocs, oldest at the bottom.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HeredocStack {
    frames: Vec<HeredocFrame>,
}

impl HeredocStack {
    /// A stack holding only the root.
    pub const fn new() -> Self {
        HeredocStack { frames: Vec::new() }
    }

    pub(crate) fn from_frames(frames: Vec<HeredocFrame>) -> Self {
        HeredocStack { frames }
    }

    /// Number of heredoc bodies still to be scanned; equals the depth.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.frames.len()
    }

    /// Declare a heredoc terminated by `sentinel`.
    ///
    /// The sentinel is copied, so the caller's source text may be released
    /// as soon as this returns.
    pub fn push(&mut self, sentinel: &str, flags: InterpFlags) -> Result<(), ScannerError> {
        let alloc_failure = |_| ScannerError::AllocationFailure(StackKind::Heredoc);
        let mut chars = Vec::new();
        chars
            .try_reserve_exact(sentinel.chars().count())
            .map_err(alloc_failure)?;
        chars.extend(sentinel.chars());
        self.frames.try_reserve(1).map_err(alloc_failure)?;

        let newest = self.frames.last().map_or(0, HeredocFrame::level);
        let level = self
            .in_progress()
            .map_or(newest, |index| self.frames[index].level.saturating_add(1))
            .max(newest);
        self.frames.push(HeredocFrame::new(
            chars.into_boxed_slice(),
            flags,
            level,
            false,
        ));
        tracing::debug!(
            sentinel,
            ?flags,
            level,
            pending = self.pending_count(),
            "heredoc declared"
        );
        Ok(())
    }

    /// Index of the innermost heredoc whose body is being scanned.
    fn in_progress(&self) -> Option<usize> {
        self.frames.iter().rposition(|frame| frame.body_started)
    }

    /// The heredoc whose body text comes next, with its index.
    ///
    /// Mid-line this is the body in progress. At the start of a line, a group
    /// declared inside that body takes over, oldest first. With no body in
    /// progress it is the oldest pending heredoc.
    pub fn body_frame(&self, at_line_start: bool) -> Option<(usize, &HeredocFrame)> {
        let index = match self.in_progress() {
            Some(current) if at_line_start => {
                let level = self.frames[current].level;
                self.frames
                    .iter()
                    .position(|frame| frame.level > level)
                    .unwrap_or(current)
            }
            Some(current) => current,
            None if self.frames.is_empty() => return None,
            None => 0,
        };
        Some((index, &self.frames[index]))
    }

    /// Record that body text of the frame at `index` has been scanned.
    pub(crate) fn mark_body_started(&mut self, index: usize) {
        if let Some(frame) = self.frames.get_mut(index) {
            frame.body_started = true;
        }
    }

    /// Remove the frame at `index` once its terminator line is seen.
    pub(crate) fn terminate(&mut self, index: usize) -> Result<HeredocFrame, ScannerError> {
        if index >= self.frames.len() {
            return Err(ScannerError::StackUnderflow(StackKind::Heredoc));
        }
        let frame = self.frames.remove(index);
        tracing::debug!(
            level = frame.level,
            pending = self.pending_count(),
            "heredoc terminated"
        );
        Ok(frame)
    }

    /// Remove the most recently declared heredoc.
    pub fn pop(&mut self) -> Result<HeredocFrame, ScannerError> {
        self.frames
            .pop()
            .ok_or(ScannerError::StackUnderflow(StackKind::Heredoc))
    }

    /// Remove the oldest pending heredoc.
    ///
    /// Frames declared after it move one level closer to the root.
    pub fn pop_oldest(&mut self) -> Result<HeredocFrame, ScannerError> {
        self.terminate(0)
    }

    /// The earliest declared pending heredoc.
    #[inline]
    pub fn oldest(&self) -> Option<&HeredocFrame> {
        self.frames.first()
    }

    /// The most recently declared heredoc.
    #[inline]
    pub fn top(&self) -> Option<&HeredocFrame> {
        self.frames.last()
    }

    /// Frames ordered from the root outward (oldest first), paired with
    /// their depth.
    pub fn frames(&self) -> impl ExactSizeIterator<Item = (usize, &HeredocFrame)> + '_ {
        self.frames
            .iter()
            .enumerate()
            .map(|(index, frame)| (index + 1, frame))
    }

    /// Drop every pending heredoc, leaving the root.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests;
