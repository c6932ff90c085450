//! Token decision engine.
//!
//! Called once per token attempt with the host's valid-token set. Decides
//! which external token, if any, starts at the lookahead position and
//! mutates the stacks accordingly. Rules are tried in order:
//!
//! 1. **Heredoc body**: a heredoc is pending and the grammar wants body text.
//! 2. **Embedded comment**: `` #` `` followed by an opening bracket.
//! 3. **Quote construct**: the innermost closer, or an acceptable opener.
//!
//! A "no match" result always leaves both stacks as they were; the host
//! rewinds its own position and falls back to the grammar's rules.

use crate::brace_stack::BraceStack;
use crate::config::ScannerConfig;
use crate::delimiters;
use crate::error::ScannerError;
use crate::heredoc::{HeredocStack, InterpFlags};
use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind, ValidTokens};

/// One scan invocation over the session's stacks.
pub(crate) struct Engine<'s, L: Lexer + ?Sized> {
    pub(crate) braces: &'s mut BraceStack,
    pub(crate) heredocs: &'s mut HeredocStack,
    pub(crate) config: &'s ScannerConfig,
    pub(crate) lexer: &'s mut L,
}

impl<L: Lexer + ?Sized> Engine<'_, L> {
    /// Run the decision rules.
    ///
    /// Stack underflow is reported as no match. Allocation failure is
    /// propagated with the stacks rolled back.
    pub(crate) fn scan(&mut self, valid: ValidTokens) -> Result<Option<Token>, ScannerError> {
        let result = if self.heredocs.pending_count() > 0 && valid.accepts(TokenKind::HeredocBody)
        {
            self.heredoc_body()
        } else if valid.accepts(TokenKind::MultilineComment) && self.lexer.lookahead() == Some('#')
        {
            self.multiline_comment()
        } else if valid.intersects(ValidTokens::QUOTE_CONS_OPEN | ValidTokens::QUOTE_CONS_CLOSE) {
            self.quote(valid)
        } else {
            Ok(None)
        };

        match result {
            Err(ScannerError::StackUnderflow(kind)) => {
                tracing::warn!(%kind, "stack underflow during scan, reporting no match");
                Ok(None)
            }
            Ok(Some(token)) => {
                tracing::trace!(kind = %token.kind, span = %token.span, "external token");
                Ok(Some(token))
            }
            other => other,
        }
    }

    // ─── Heredoc bodies ──────────────────────────────────────────────

    fn heredoc_body(&mut self) -> Result<Option<Token>, ScannerError> {
        let at_line_start = self.lexer.column() == 0;
        let Some((index, frame)) = self.heredocs.body_frame(at_line_start) else {
            return Ok(None);
        };
        let flags = frame.flags();
        let start = self.lexer.offset();

        if at_line_start
            && match_terminator(
                &mut *self.lexer,
                frame.sentinel(),
                self.config.indented_terminators,
            )
        {
            self.heredocs.terminate(index)?;
            let span = Span::new(start, self.lexer.offset());
            return Ok(Some(Token::heredoc_terminator(span)));
        }

        let end = scan_body_line(&mut *self.lexer, flags);
        if end == start {
            return Ok(None);
        }
        self.heredocs.mark_body_started(index);
        Ok(Some(Token::new(
            TokenKind::HeredocBody,
            Span::new(start, end),
        )))
    }

    // ─── Embedded comments ───────────────────────────────────────────

    fn multiline_comment(&mut self) -> Result<Option<Token>, ScannerError> {
        let start = self.lexer.offset();
        if self.lexer.lookahead() != Some('#') {
            return Ok(None);
        }
        self.lexer.advance();
        if self.lexer.lookahead() != Some('`') {
            return Ok(None);
        }
        self.lexer.advance();
        let Some(open) = self
            .lexer
            .lookahead()
            .filter(|&c| delimiters::is_bracket(c))
        else {
            return Ok(None);
        };

        let base = self.braces.depth();
        let closed = self.scan_balanced(open, base);
        if !matches!(closed, Ok(true)) {
            self.braces.truncate(base);
        }
        if closed? {
            let span = Span::new(start, self.lexer.offset());
            Ok(Some(Token::new(TokenKind::MultilineComment, span)))
        } else {
            Ok(None)
        }
    }

    /// Consume from `open` through its matching closer, returning `false`
    /// if input ends first.
    fn scan_balanced(&mut self, open: char, base: usize) -> Result<bool, ScannerError> {
        let nests = delimiters::nests(open);
        self.braces.push(open)?;
        self.lexer.advance();

        while let Some(c) = self.lexer.lookahead() {
            if self.braces.top_closing_delimiter() == Some(c) {
                self.braces.pop()?;
                self.lexer.advance();
                if self.braces.depth() == base {
                    return Ok(true);
                }
            } else if nests && c == open {
                self.braces.push(c)?;
                self.lexer.advance();
            } else {
                self.lexer.advance();
            }
        }
        Ok(false)
    }

    // ─── Quote constructs ────────────────────────────────────────────

    fn quote(&mut self, valid: ValidTokens) -> Result<Option<Token>, ScannerError> {
        let start = self.lexer.offset();
        let Some(c) = self.lexer.lookahead() else {
            return Ok(None);
        };

        // Closers win, so a symmetric delimiter ends its construct.
        if valid.accepts(TokenKind::QuoteConsClose) && self.braces.top_closing_delimiter() == Some(c)
        {
            self.braces.pop()?;
            self.lexer.advance();
            let span = Span::new(start, self.lexer.offset());
            return Ok(Some(Token::new(TokenKind::QuoteConsClose, span)));
        }

        if valid.accepts(TokenKind::QuoteConsOpen) {
            let opens = match self.braces.top() {
                None => delimiters::can_open_quote(c),
                Some(frame) => frame.opening_delimiter() == c && delimiters::nests(c),
            };
            if opens {
                self.braces.push(c)?;
                self.lexer.advance();
                let span = Span::new(start, self.lexer.offset());
                return Ok(Some(Token::new(TokenKind::QuoteConsOpen, span)));
            }
        }

        Ok(None)
    }
}

/// Try to consume a terminator line for `sentinel`.
///
/// Characters consumed before a mismatch belong to the body line.
fn match_terminator<L: Lexer + ?Sized>(lexer: &mut L, sentinel: &[char], indented: bool) -> bool {
    if indented {
        skip_horizontal_space(lexer);
    }
    for &expected in sentinel {
        if lexer.lookahead() != Some(expected) {
            return false;
        }
        lexer.advance();
    }
    skip_horizontal_space(lexer);

    match lexer.lookahead() {
        None => true,
        Some('\n') => {
            lexer.advance();
            true
        }
        Some('\r') => {
            lexer.advance();
            match lexer.lookahead() {
                None => true,
                Some('\n') => {
                    lexer.advance();
                    true
                }
                Some(_) => false,
            }
        }
        Some(_) => false,
    }
}

fn skip_horizontal_space<L: Lexer + ?Sized>(lexer: &mut L) {
    while matches!(lexer.lookahead(), Some(' ' | '\t')) {
        lexer.advance();
    }
}

/// Scan body text to the end of the line (newline included) or to the first
/// interpolation boundary `flags` enables, returning the end offset.
///
/// Variable sigils are boundaries when a name follows. `&` is a boundary
/// only for a call, `&name(`.
fn scan_body_line<L: Lexer + ?Sized>(lexer: &mut L, flags: InterpFlags) -> u32 {
    let mut end = lexer.offset();
    while let Some(c) = lexer.lookahead() {
        match c {
            '\n' => {
                lexer.advance();
                return lexer.offset();
            }
            '\\' if flags.interpolates() => {
                lexer.advance();
                if lexer.lookahead().is_some_and(|next| next != '\n') {
                    lexer.advance();
                }
            }
            '{' if flags.contains(InterpFlags::CLOSURE) => return end,
            '&' if flags.contains(InterpFlags::FUNCTION) => {
                lexer.advance();
                if lexer.lookahead().is_some_and(is_ident_start) {
                    while lexer.lookahead().is_some_and(is_ident_continue) {
                        lexer.advance();
                    }
                    // Only `&name(` is a call; `AT&T` is text.
                    if lexer.lookahead() == Some('(') {
                        return end;
                    }
                }
            }
            _ => match InterpFlags::for_sigil(c) {
                Some(flag) if flags.contains(flag) => {
                    lexer.advance();
                    if lexer.lookahead().is_some_and(is_ident_start) {
                        return end;
                    }
                }
                _ => lexer.advance(),
            },
        }
        end = lexer.offset();
    }
    end
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c == '-' || c.is_alphanumeric()
}
