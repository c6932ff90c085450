//! Lookahead access supplied by the host.
//!
//! The scanner never owns the source text. It sees one character of
//! lookahead at a time through [`Lexer`], mirroring the host runtime's lexer
//! interface: peek, advance, and read the current byte offset and column.
//! When the scanner reports no match the host discards whatever was advanced.
//!
//! [`StrLexer`] implements the trait over an in-memory `&str` for hosts that
//! hold the whole document.

/// One-character lookahead over the host's input.
pub trait Lexer {
    /// The character at the current position; `None` at end of input.
    fn lookahead(&self) -> Option<char>;

    /// Consume the lookahead character. No-op at end of input.
    fn advance(&mut self);

    /// Byte offset of the lookahead character.
    fn offset(&self) -> u32;

    /// Zero-based column of the lookahead character, in characters.
    fn column(&self) -> u32;

    /// Returns `true` at end of input.
    #[inline]
    fn is_eof(&self) -> bool {
        self.lookahead().is_none()
    }
}

/// [`Lexer`] over a borrowed string.
#[derive(Clone, Copy, Debug)]
pub struct StrLexer<'a> {
    source: &'a str,
    pos: u32,
    column: u32,
}

impl<'a> StrLexer<'a> {
    /// Lexer positioned at the start of `source`.
    ///
    /// Sources longer than `u32::MAX` bytes are cut off at that length.
    pub fn new(source: &'a str) -> Self {
        let source = if u32::try_from(source.len()).is_ok() {
            source
        } else {
            truncate_to_u32(source)
        };
        StrLexer {
            source,
            pos: 0,
            column: 0,
        }
    }

    /// Lexer positioned at byte `pos`, the point a host resumes from.
    ///
    /// `pos` is clamped to the source length and moved back to the nearest
    /// character boundary.
    pub fn at(source: &'a str, pos: u32) -> Self {
        let mut lexer = Self::new(source);
        let mut pos = (pos as usize).min(lexer.source.len());
        while !lexer.source.is_char_boundary(pos) {
            pos -= 1;
        }
        let line_start = lexer.source[..pos].rfind('\n').map_or(0, |i| i + 1);
        let column = lexer.source[line_start..pos].chars().count();
        lexer.pos = u32::try_from(pos).unwrap_or(u32::MAX);
        lexer.column = u32::try_from(column).unwrap_or(u32::MAX);
        lexer
    }

    /// The unconsumed remainder of the source.
    pub fn rest(&self) -> &'a str {
        &self.source[self.pos as usize..]
    }

    /// The source text covered by `span`.
    pub fn slice(&self, span: crate::Span) -> &'a str {
        &self.source[span.start as usize..span.end as usize]
    }
}

fn truncate_to_u32(source: &str) -> &str {
    let mut end = u32::MAX as usize;
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    &source[..end]
}

impl Lexer for StrLexer<'_> {
    #[inline]
    fn lookahead(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.lookahead() {
            #[allow(clippy::cast_possible_truncation, reason = "len_utf8 is at most 4")]
            let width = c.len_utf8() as u32;
            self.pos += width;
            if c == '\n' {
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
    }

    #[inline]
    fn offset(&self) -> u32 {
        self.pos
    }

    #[inline]
    fn column(&self) -> u32 {
        self.column
    }
}
