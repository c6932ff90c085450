//! Static opening → closing delimiter table.
//!
//! Raku quote constructs (`Q[...]`, `q«...»`, `` #`(...) `` comments) accept
//! any bracket pair as delimiters. Characters without a registered pair are
//! symmetric: the same character opens and closes (`q/.../`, `q!...!`).
//!
//! Each pair carries a `nests` bit. When set, an occurrence of the opening
//! character inside an open construct starts a nested level that must be
//! closed before the outer closer counts. Bracket pairs nest; quotation-mark
//! pairs and symmetric delimiters never do.
//!
//! The table is built once on first use and is read-only afterwards.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

/// One registered asymmetric delimiter pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DelimiterPair {
    pub open: char,
    pub close: char,
    /// Whether the opener nests inside a construct it opened.
    pub nests: bool,
}

impl DelimiterPair {
    const fn bracket(open: char, close: char) -> Self {
        DelimiterPair {
            open,
            close,
            nests: true,
        }
    }

    const fn quotes(open: char, close: char) -> Self {
        DelimiterPair {
            open,
            close,
            nests: false,
        }
    }
}

/// Registered pairs, ASCII first.
const PAIRS: &[DelimiterPair] = &[
    DelimiterPair::bracket('(', ')'),
    DelimiterPair::bracket('[', ']'),
    DelimiterPair::bracket('{', '}'),
    DelimiterPair::bracket('<', '>'),
    // Guillemets
    DelimiterPair::bracket('\u{00AB}', '\u{00BB}'),
    DelimiterPair::bracket('\u{2039}', '\u{203A}'),
    // Mathematical brackets
    DelimiterPair::bracket('\u{27E6}', '\u{27E7}'),
    DelimiterPair::bracket('\u{27E8}', '\u{27E9}'),
    DelimiterPair::bracket('\u{27EA}', '\u{27EB}'),
    DelimiterPair::bracket('\u{2983}', '\u{2984}'),
    // CJK brackets
    DelimiterPair::bracket('\u{300C}', '\u{300D}'),
    DelimiterPair::bracket('\u{300E}', '\u{300F}'),
    DelimiterPair::bracket('\u{3010}', '\u{3011}'),
    DelimiterPair::bracket('\u{3014}', '\u{3015}'),
    DelimiterPair::bracket('\u{3016}', '\u{3017}'),
    DelimiterPair::bracket('\u{3018}', '\u{3019}'),
    DelimiterPair::bracket('\u{301A}', '\u{301B}'),
    // Halfwidth corner brackets
    DelimiterPair::bracket('\u{FF62}', '\u{FF63}'),
    // Quotation marks
    DelimiterPair::quotes('\u{2018}', '\u{2019}'),
    DelimiterPair::quotes('\u{201A}', '\u{2018}'),
    DelimiterPair::quotes('\u{201C}', '\u{201D}'),
    DelimiterPair::quotes('\u{201E}', '\u{201C}'),
];

struct DelimiterTable {
    by_open: FxHashMap<char, DelimiterPair>,
    by_close: FxHashMap<char, DelimiterPair>,
}

static TABLE: LazyLock<DelimiterTable> = LazyLock::new(|| {
    let mut by_open = FxHashMap::default();
    let mut by_close = FxHashMap::default();
    for pair in PAIRS {
        by_open.insert(pair.open, *pair);
        by_close.entry(pair.close).or_insert(*pair);
    }
    DelimiterTable { by_open, by_close }
});

/// Look up the pair registered for an opening character.
pub fn lookup_open(open: char) -> Option<DelimiterPair> {
    TABLE.by_open.get(&open).copied()
}

/// Look up the pair registered for a closing character.
pub fn lookup_close(close: char) -> Option<DelimiterPair> {
    TABLE.by_close.get(&close).copied()
}

/// Closing delimiter for `open`; `open` itself when no pair is registered.
pub fn closing_for(open: char) -> char {
    lookup_open(open).map_or(open, |pair| pair.close)
}

/// Opening delimiter that produces `close`; `close` itself for symmetric
/// delimiters.
pub fn opener_for(close: char) -> char {
    lookup_close(close).map_or(close, |pair| pair.open)
}

/// Whether `open` starts a nested level when seen inside its own construct.
pub fn nests(open: char) -> bool {
    lookup_open(open).is_some_and(|pair| pair.nests)
}

/// Whether `open` is a registered asymmetric opening bracket.
pub fn is_bracket(open: char) -> bool {
    lookup_open(open).is_some()
}

/// Whether `c` may open a quote construct from outside any construct.
///
/// Registered openers always qualify. Bare closers, whitespace, word
/// characters, `#` and control characters never do.
pub fn can_open_quote(c: char) -> bool {
    if is_bracket(c) {
        return true;
    }
    if lookup_close(c).is_some() {
        return false;
    }
    !(c.is_whitespace() || c.is_alphanumeric() || c.is_control() || c == '_' || c == '#')
}
