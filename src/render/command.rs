//! Comment command tokens: `<!-- #NAME -->` and `<!-- #NAME: ARGUMENT -->`.
//!
//! `NAME` is `[A-Z0-9_]+`. `ARGUMENT` is the shortest text up to ` -->`,
//! taken verbatim. Tokens never span lines.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- #([A-Z0-9_]+)(?:: (.*?))? -->").unwrap());

/// One command token found in a source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    pub name: &'a str,
    pub argument: Option<&'a str>,
    /// The full matched token, echoed back for unknown commands.
    pub raw: &'a str,
    /// Byte range of `raw` inside the scanned source.
    pub span: Range<usize>,
}

impl<'a> Command<'a> {
    /// Parse a single complete token.
    ///
    /// Returns `None` unless the whole of `token` is one command.
    pub fn parse(token: &'a str) -> Option<Self> {
        let command = scan(token).into_iter().next()?;
        (command.span == (0..token.len())).then_some(command)
    }

    /// Whether the token carries an argument, e.g. `TEMPLATE: nav`.
    #[inline]
    pub fn has_argument(&self) -> bool {
        self.argument.is_some()
    }
}

/// Find every command token in `source`, left to right, non-overlapping.
pub fn scan(source: &str) -> Vec<Command<'_>> {
    TOKEN
        .captures_iter(source)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Command {
                name: caps.get(1)?.as_str(),
                argument: caps.get(2).map(|m| m.as_str()),
                raw: whole.as_str(),
                span: whole.range(),
            })
        })
        .collect()
}

/// First `<!-- #NAME: ARGUMENT -->` named `name` that carries an argument.
pub fn find_argument<'a>(source: &'a str, name: &str) -> Option<&'a str> {
    scan(source)
        .into_iter()
        .find(|c| c.name == name && c.has_argument())
        .and_then(|c| c.argument)
}
