/*
 * scop2c: generate C loop nests from polyhedral programs.
 * Copyright (C) 2022  Ruifeng Xie
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

//! Line-oriented cursor over OpenScop text.

use std::str::FromStr;
use super::{ParseError, ParseErrorKind};

/// Remove the `#` comment (if any) and surrounding whitespaces.
pub(crate) fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(content, _)| content).trim()
}

/// Parse a single token, reporting a [`ParseErrorKind::InvalidInteger`] on failure.
pub(crate) fn parse_token<T: FromStr>(lines: &Lines, token: &str) -> Result<T, ParseError> {
    token.parse().map_err(|_| lines.error(ParseErrorKind::InvalidInteger(token.to_string())))
}

/// Cursor over the lines of an OpenScop text.
///
/// "Data" lines are lines with their comments stripped, blank lines are skipped altogether.
/// "Text" lines are used for free-form extension contents: only blank lines and lines consisting
/// entirely of a comment are skipped, the rest is kept verbatim.
pub(crate) struct Lines<'a> {
    lines: Vec<&'a str>,
    next: usize,
    current: usize,
}

impl<'a> Lines<'a> {
    pub fn new(text: &'a str) -> Self {
        Lines { lines: text.lines().collect(), next: 0, current: 0 }
    }

    fn skip_blank(&mut self) {
        while self.next < self.lines.len() && strip_comment(self.lines[self.next]).is_empty() {
            self.next += 1;
        }
    }

    /// The next data line, without consuming it.
    pub fn peek(&mut self) -> Option<&'a str> {
        self.skip_blank();
        self.lines.get(self.next).map(|line| strip_comment(*line))
    }

    /// Consume the next data line.
    pub fn next(&mut self) -> Option<&'a str> {
        let line = self.peek()?;
        self.next += 1;
        self.current = self.next;
        Some(line)
    }

    /// Consume the next data line, which must exist.
    pub fn expect(&mut self, what: &'static str) -> Result<&'a str, ParseError> {
        match self.next() {
            Some(line) => Ok(line),
            None => Err(self.eof(what)),
        }
    }

    /// Consume the next data line, which must be exactly `expected`.
    pub fn expect_exact(&mut self, expected: &'static str) -> Result<(), ParseError> {
        let line = self.expect(expected)?;
        if line == expected { return Ok(()); }
        Err(self.error(ParseErrorKind::Unexpected { expected, found: line.to_string() }))
    }

    /// Consume the next data line, which must be a single integer.
    pub fn expect_int<T: FromStr>(&mut self, what: &'static str) -> Result<T, ParseError> {
        let line = self.expect(what)?;
        if line.split_whitespace().count() != 1 {
            return Err(self.error(ParseErrorKind::Unexpected { expected: what, found: line.to_string() }));
        }
        parse_token(self, line)
    }

    /// Consume the next text line.
    pub fn next_text(&mut self) -> Option<&'a str> {
        while self.next < self.lines.len() {
            let line: &'a str = self.lines[self.next];
            self.next += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') { continue; }
            self.current = self.next;
            return Some(trimmed);
        }
        None
    }

    /// Consume the next line, whatever it is.
    pub fn next_verbatim(&mut self) -> Option<&'a str> {
        let line: &'a str = *self.lines.get(self.next)?;
        self.next += 1;
        self.current = self.next;
        Some(line.trim_end())
    }

    /// Error located at the line last consumed.
    pub fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError { line: self.current.max(1), kind }
    }

    /// Premature end of input.
    pub fn eof(&self, what: &'static str) -> ParseError {
        ParseError { line: self.lines.len().max(1), kind: ParseErrorKind::UnexpectedEof(what) }
    }
}
