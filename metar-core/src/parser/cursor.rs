use regex::{Captures, Regex};

/// Compile a group grammar anchored at the cursor and swallowing trailing blanks.
///
/// The group must end at whitespace or at the end of the text, so `TS` never
/// matches the front of `TSRA`.
pub(crate) fn group(body: &str) -> Regex {
    Regex::new(&format!(r"^(?:{body})(?:\s+|$)")).expect("group pattern must compile")
}

/// Uppercase, trim, drop a trailing `=` and collapse runs of whitespace.
pub(crate) fn normalize(raw: &str) -> String {
    raw.trim()
        .trim_end_matches('=')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Forward-only reader over normalized report text.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text.trim_start() }
    }

    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    pub fn rest(&self) -> &'a str {
        self.rest
    }

    pub fn peek_token(&self) -> Option<&'a str> {
        self.rest.split_whitespace().next()
    }

    /// Consume the next whitespace-delimited token.
    pub fn next_token(&mut self) -> Option<&'a str> {
        let rest: &'a str = self.rest;
        let token = rest.split_whitespace().next()?;
        self.rest = rest[token.len()..].trim_start();
        Some(token)
    }

    /// Consume a group when `pattern` matches at the cursor.
    pub fn take(&mut self, pattern: &Regex) -> Option<Captures<'a>> {
        let rest: &'a str = self.rest;
        let caps = pattern.captures(rest)?;
        let end = caps.get(0).map_or(0, |m| m.end());
        if end == 0 {
            return None;
        }
        self.rest = &rest[end..];
        Some(caps)
    }

    /// Matched text of a group without its trailing whitespace.
    pub fn matched(caps: &Captures<'a>) -> &'a str {
        caps.get(0).map_or("", |m| m.as_str().trim_end())
    }

    /// Split off everything after the first standalone `keyword` token.
    pub fn split_at_keyword(text: &'a str, keyword: &str) -> (&'a str, Option<&'a str>) {
        let mut offset = 0;
        for token in text.split(' ') {
            if token == keyword {
                let before = text[..offset].trim_end();
                let after = text[offset + token.len()..].trim_start();
                return (before, Some(after));
            }
            offset += token.len() + 1;
        }
        (text, None)
    }
}
