//! Binary snapshot of both scanner stacks.
//!
//! The host stores the snapshot as an opaque blob next to each cached syntax
//! node and hands it back when it resumes lexing after an edit, so the
//! encoding must round-trip bit-exactly.
//!
//! # Layout
//!
//! Little-endian, fixed-width integers (bincode fixint encoding):
//!
//! ```text
//! u64                brace count N
//! u32 × N            closing delimiters, root outward
//! u64                heredoc count M
//! M × {
//!     u32            interpolation flags (see `InterpFlags`)
//!     u32            nesting level
//!     u8             body started (0 or 1)
//!     u64            sentinel length L
//!     u32 × L        sentinel codepoints
//! }
//! ```
//!
//! Heredocs are written oldest first, in declaration order. Nesting levels
//! never decrease from one heredoc to the next and grow by at most one.
//!
//! # Untrusted input
//!
//! Decoding is bounded by the input length: every count and length is checked
//! against the bytes that remain, so a corrupt or truncated buffer is
//! rejected instead of read past. Codepoints, flag words and nesting levels
//! are validated before any frame is rebuilt.

use std::io;

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::brace_stack::{BraceFrame, BraceStack};
use crate::error::{CorruptionKind, ScannerError};
use crate::heredoc::{HeredocFrame, HeredocStack, InterpFlags};

#[derive(Debug, Serialize, Deserialize)]
struct WireState {
    braces: Vec<u32>,
    heredocs: Vec<WireHeredoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireHeredoc {
    flags: u32,
    level: u32,
    body_started: bool,
    sentinel: Vec<u32>,
}

impl WireState {
    fn capture(braces: &BraceStack, heredocs: &HeredocStack) -> Self {
        WireState {
            braces: braces
                .frames()
                .map(|(_, frame)| u32::from(frame.closing_delimiter()))
                .collect(),
            heredocs: heredocs
                .frames()
                .map(|(_, frame)| WireHeredoc {
                    flags: frame.flags().bits(),
                    level: frame.level(),
                    body_started: frame.body_started(),
                    sentinel: frame.sentinel().iter().copied().map(u32::from).collect(),
                })
                .collect(),
        }
    }

    fn restore(self) -> Result<(BraceStack, HeredocStack), CorruptionKind> {
        let braces = self
            .braces
            .into_iter()
            .map(|value| decode_char(value).map(BraceFrame::new))
            .collect::<Result<Vec<_>, _>>()?;

        check_levels(self.heredocs.iter().map(|wire| wire.level))?;
        let heredocs = self
            .heredocs
            .into_iter()
            .map(|wire| -> Result<HeredocFrame, CorruptionKind> {
                let flags = InterpFlags::from_bits(wire.flags)
                    .ok_or(CorruptionKind::UnknownFlags(wire.flags))?;
                let sentinel = wire
                    .sentinel
                    .into_iter()
                    .map(decode_char)
                    .collect::<Result<Box<[char]>, _>>()?;
                Ok(HeredocFrame::new(
                    sentinel,
                    flags,
                    wire.level,
                    wire.body_started,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((
            BraceStack::from_frames(braces),
            HeredocStack::from_frames(heredocs),
        ))
    }
}

fn check_levels(levels: impl Iterator<Item = u32>) -> Result<(), CorruptionKind> {
    let mut previous: Option<u32> = None;
    for level in levels {
        if let Some(prev) = previous {
            if level < prev || level - prev > 1 {
                return Err(CorruptionKind::InvalidNesting(level));
            }
        }
        previous = Some(level);
    }
    Ok(())
}

fn decode_char(value: u32) -> Result<char, CorruptionKind> {
    char::from_u32(value).ok_or(CorruptionKind::InvalidCodepoint(value))
}

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
}

/// Encode both stacks into `buf`, returning the number of bytes written.
///
/// Fails with [`ScannerError::SerializationOverflow`] without touching `buf`
/// when the snapshot does not fit.
#[tracing::instrument(level = "trace", skip_all, fields(
    braces = braces.depth(),
    heredocs = heredocs.pending_count(),
    capacity = buf.len(),
))]
pub fn encode(
    braces: &BraceStack,
    heredocs: &HeredocStack,
    buf: &mut [u8],
) -> Result<usize, ScannerError> {
    let capacity = buf.len();
    let wire = WireState::capture(braces, heredocs);
    let needed = wire_options()
        .serialized_size(&wire)
        .ok()
        .and_then(|size| usize::try_from(size).ok())
        .unwrap_or(usize::MAX);

    if needed > capacity {
        tracing::warn!(needed, capacity, "scanner state exceeds serialization buffer");
        return Err(ScannerError::SerializationOverflow { needed, capacity });
    }

    wire_options()
        .serialize_into(&mut buf[..needed], &wire)
        .map_err(|_| ScannerError::SerializationOverflow { needed, capacity })?;
    Ok(needed)
}

/// Decode stacks previously written by [`encode`].
///
/// An empty slice decodes to two root-only stacks.
#[tracing::instrument(level = "trace", skip_all, fields(len = bytes.len()))]
pub fn decode(bytes: &[u8]) -> Result<(BraceStack, HeredocStack), ScannerError> {
    if bytes.is_empty() {
        return Ok((BraceStack::new(), HeredocStack::new()));
    }

    let limit = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    let mut remaining = bytes;
    let wire: WireState = wire_options()
        .with_limit(limit)
        .deserialize_from(&mut remaining)
        .map_err(|err| corrupt(classify(&err)))?;

    if !remaining.is_empty() {
        return Err(corrupt(CorruptionKind::TrailingBytes));
    }

    wire.restore().map_err(corrupt)
}

fn classify(err: &bincode::ErrorKind) -> CorruptionKind {
    match err {
        bincode::ErrorKind::SizeLimit => CorruptionKind::Truncated,
        bincode::ErrorKind::Io(io_err) if io_err.kind() == io::ErrorKind::UnexpectedEof => {
            CorruptionKind::Truncated
        }
        _ => CorruptionKind::Malformed,
    }
}

fn corrupt(kind: CorruptionKind) -> ScannerError {
    tracing::warn!(%kind, "rejecting serialized scanner state");
    ScannerError::DeserializationCorruption(kind)
}
