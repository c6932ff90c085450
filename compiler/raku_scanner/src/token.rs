//! External token kinds and the host's valid-token set.

use std::fmt;

use bitflags::bitflags;

/// Tokens produced by the external scanner.
///
/// Discriminants follow the order of the grammar's `externals` list, which is
/// also the order of the host's valid-symbol array.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    /// Opening delimiter of a quote construct.
    QuoteConsOpen = 0,
    /// Closing delimiter of a quote construct.
    QuoteConsClose = 1,
    /// A complete embedded (`` #`(...) ``) comment.
    MultilineComment = 2,
    /// One stretch of heredoc body text, or its terminator line.
    HeredocBody = 3,
}

impl TokenKind {
    /// All kinds, in valid-symbol order.
    pub const ALL: [TokenKind; 4] = [
        TokenKind::QuoteConsOpen,
        TokenKind::QuoteConsClose,
        TokenKind::MultilineComment,
        TokenKind::HeredocBody,
    ];

    /// The [`ValidTokens`] bit for this kind.
    pub const fn as_valid(self) -> ValidTokens {
        match self {
            TokenKind::QuoteConsOpen => ValidTokens::QUOTE_CONS_OPEN,
            TokenKind::QuoteConsClose => ValidTokens::QUOTE_CONS_CLOSE,
            TokenKind::MultilineComment => ValidTokens::MULTILINE_COMMENT,
            TokenKind::HeredocBody => ValidTokens::HEREDOC_BODY,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::QuoteConsOpen => "quote_cons_open",
            TokenKind::QuoteConsClose => "quote_cons_close",
            TokenKind::MultilineComment => "multiline_comment",
            TokenKind::HeredocBody => "heredoc_body",
        })
    }
}

bitflags! {
    /// Token kinds the grammar accepts at the current position.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ValidTokens: u8 {
        const QUOTE_CONS_OPEN = 1 << 0;
        const QUOTE_CONS_CLOSE = 1 << 1;
        const MULTILINE_COMMENT = 1 << 2;
        const HEREDOC_BODY = 1 << 3;
    }
}

impl ValidTokens {
    /// Build from the host's valid-symbol array.
    ///
    /// Entries beyond the four external tokens are ignored; missing entries
    /// count as not valid.
    pub fn from_symbols(symbols: &[bool]) -> Self {
        TokenKind::ALL
            .iter()
            .zip(symbols)
            .filter(|&(_, &valid)| valid)
            .fold(Self::empty(), |set, (kind, _)| set | kind.as_valid())
    }

    /// Whether `kind` is accepted.
    #[inline]
    pub const fn accepts(self, kind: TokenKind) -> bool {
        self.contains(kind.as_valid())
    }
}

/// Half-open byte range `[start, end)` in the source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Length in bytes; 0 for an inverted span.
    #[inline]
    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A matched external token.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Set on the heredoc-body token that consumed its terminator line.
    pub terminator: bool,
}

impl Token {
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Token {
            kind,
            span,
            terminator: false,
        }
    }

    pub(crate) const fn heredoc_terminator(span: Span) -> Self {
        Token {
            kind: TokenKind::HeredocBody,
            span,
            terminator: true,
        }
    }
}
