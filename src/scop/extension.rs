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

//! OpenScop extensions, i.e. the `<tag> ... </tag>` blocks.

use std::fmt::{Display, Formatter};
use itertools::Itertools;

use super::{ParseError, ParseErrorKind, lines::{Lines, parse_token}};

/// Statement body, with the names of its original iterators.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Body {
    /// Original iterator names, outermost first.
    pub iterators: Vec<String>,
    /// Statement text, e.g. `C[i][j] += A[i][k] * B[k][j];`.
    pub expression: String,
}

/// Location of the SCoP in its original source file.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Coordinates {
    /// Source file name.
    pub file: String,
    /// Starting line and column.
    pub start: (usize, usize),
    /// Ending line and column.
    pub end: (usize, usize),
    /// Indentation of the SCoP.
    pub indentation: usize,
}

/// Directive flags of a [`Loop`] annotation.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Directive(pub u32);

impl Directive {
    /// No directive.
    pub const NONE: Directive = Directive(0);
    /// Shared-memory parallel loop (`#pragma omp parallel for`).
    pub const PARALLEL: Directive = Directive(1);
    /// Distributed-memory parallel loop.
    pub const MPI: Directive = Directive(2);
    /// Vectorisable loop.
    pub const VECTOR: Directive = Directive(4);
    /// User-defined directive, with its text in [`Loop::user`].
    pub const USER: Directive = Directive(8);

    /// Whether or not all the flags in `other` are set.
    pub fn contains(self, other: Directive) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Annotation for the loops on some iterator, as written by parallelising tools.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Loop {
    /// Name of the loop iterator, i.e. a scattering dimension name.
    pub iterator: String,
    /// Statements (numbered from 1) the annotated loops may contain.
    pub statements: Vec<usize>,
    /// Comma-separated private variables, if any.
    pub private_vars: Option<String>,
    /// Directive flags.
    pub directive: Directive,
    /// User-defined directive text, for [`Directive::USER`].
    pub user: Option<String>,
}

/// OpenScop extensions.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Extension {
    /// `<body>`: statement body.
    Body(Body),
    /// `<scatnames>`: names of the scattering dimensions.
    Scatnames(Vec<String>),
    /// `<arrays>`: array identifiers and their names.
    Arrays(Vec<(usize, String)>),
    /// `<coordinates>`: location in the original source.
    Coordinates(Coordinates),
    /// `<loop>`: loop annotations.
    Loop(Vec<Loop>),
    /// Unsupported extension, kept verbatim.
    Unknown {
        /// The tag, without angle brackets.
        tag: String,
        /// Contents between the opening and closing tags.
        content: Vec<String>,
    },
}

/// Tag name of an opening tag line `<tag>`.
pub(crate) fn opening_tag(line: &str) -> Option<&str> {
    let tag = line.strip_prefix('<')?.strip_suffix('>')?;
    if tag.is_empty() || tag.starts_with('/') { None } else { Some(tag) }
}

/// Read whitespace-separated names until the closing tag.
fn read_names(lines: &mut Lines, closing: &'static str) -> Result<Vec<String>, ParseError> {
    let mut names = Vec::new();
    loop {
        let line = lines.next().ok_or_else(|| lines.eof(closing))?;
        if line == closing { return Ok(names); }
        names.extend(line.split_whitespace().map(str::to_string));
    }
}

/// Read a single data line of exactly two integers.
fn read_pair(lines: &mut Lines, what: &'static str) -> Result<(usize, usize), ParseError> {
    let line = lines.expect(what)?;
    match line.split_whitespace().collect_vec()[..] {
        [a, b] => Ok((parse_token(lines, a)?, parse_token(lines, b)?)),
        _ => Err(lines.error(ParseErrorKind::Unexpected { expected: what, found: line.to_string() })),
    }
}

fn read_loop(lines: &mut Lines) -> Result<Loop, ParseError> {
    let iterator = lines.expect("iterator name")?.to_string();
    let count = lines.expect_int::<usize>("number of statements")?;
    let statements = (0..count)
        .map(|_| lines.expect_int::<usize>("statement identifier"))
        .collect::<Result<Vec<_>, _>>()?;
    let private_vars = lines.expect("private variables")?;
    let private_vars = match private_vars {
        "(null)" => None,
        vars => Some(vars.to_string()),
    };
    let line = lines.expect("directive")?;
    let (flags, user) = match line.split_once(char::is_whitespace) {
        Some((flags, user)) => (flags, Some(user.trim().to_string())),
        None => (line, None),
    };
    let directive = Directive(parse_token(lines, flags)?);
    Ok(Loop { iterator, statements, private_vars, directive, user })
}

fn read_closing(lines: &mut Lines, closing: &'static str) -> Result<(), ParseError> {
    lines.expect_exact(closing)
}

impl Extension {
    /// The tag for this extension.
    pub fn tag(&self) -> &str {
        match self {
            Extension::Body(_) => "body",
            Extension::Scatnames(_) => "scatnames",
            Extension::Arrays(_) => "arrays",
            Extension::Coordinates(_) => "coordinates",
            Extension::Loop(_) => "loop",
            Extension::Unknown { tag, .. } => tag,
        }
    }

    /// Read an extension, starting from its opening tag.
    pub(crate) fn read(lines: &mut Lines) -> Result<Extension, ParseError> {
        let line = lines.expect("extension")?;
        let tag = opening_tag(line).ok_or_else(|| lines.error(ParseErrorKind::Unexpected {
            expected: "an extension tag",
            found: line.to_string(),
        }))?;
        Ok(match tag {
            "body" => {
                let count = lines.expect_int::<usize>("number of original iterators")?;
                let mut iterators = Vec::new();
                while iterators.len() < count {
                    let line = lines.expect("original iterators")?;
                    iterators.extend(line.split_whitespace().map(str::to_string));
                }
                if iterators.len() != count {
                    return Err(lines.error(ParseErrorKind::NameCount {
                        expected: count,
                        found: iterators.len(),
                    }));
                }
                let mut expression = Vec::new();
                loop {
                    let line = lines.next_text().ok_or_else(|| lines.eof("</body>"))?;
                    if line == "</body>" { break; }
                    expression.push(line);
                }
                Extension::Body(Body { iterators, expression: expression.join("\n") })
            }
            "scatnames" => Extension::Scatnames(read_names(lines, "</scatnames>")?),
            "arrays" => {
                let count = lines.expect_int::<usize>("number of arrays")?;
                let mut tokens = Vec::new();
                while tokens.len() < 2 * count {
                    let line = lines.expect("array name")?;
                    tokens.extend(line.split_whitespace());
                }
                let arrays = tokens.into_iter().tuples::<(&str, &str)>()
                    .map(|(id, name)| Ok((parse_token(lines, id)?, name.to_string())))
                    .collect::<Result<Vec<_>, ParseError>>()?;
                read_closing(lines, "</arrays>")?;
                Extension::Arrays(arrays)
            }
            "coordinates" => {
                let file = lines.next_text().ok_or_else(|| lines.eof("file name"))?.to_string();
                let start = read_pair(lines, "starting line and column")?;
                let end = read_pair(lines, "ending line and column")?;
                let indentation = lines.expect_int("indentation")?;
                read_closing(lines, "</coordinates>")?;
                Extension::Coordinates(Coordinates { file, start, end, indentation })
            }
            "loop" => {
                let count = lines.expect_int::<usize>("number of loops")?;
                let loops = (0..count).map(|_| read_loop(lines)).collect::<Result<Vec<_>, _>>()?;
                read_closing(lines, "</loop>")?;
                Extension::Loop(loops)
            }
            tag => {
                let closing = format!("</{tag}>");
                let mut content = Vec::new();
                loop {
                    let line = lines.next_verbatim()
                        .ok_or_else(|| lines.error(ParseErrorKind::UnterminatedExtension(tag.to_string())))?;
                    if line.trim() == closing { break; }
                    content.push(line.to_string());
                }
                Extension::Unknown { tag: tag.to_string(), content }
            }
        })
    }
}

impl Display for Extension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let tag = self.tag();
        writeln!(f, "<{tag}>")?;
        match self {
            Extension::Body(body) => {
                writeln!(f, "# Number of original iterators")?;
                writeln!(f, "{}", body.iterators.len())?;
                if !body.iterators.is_empty() {
                    writeln!(f, "# List of original iterators")?;
                    writeln!(f, "{}", body.iterators.iter().format(" "))?;
                }
                writeln!(f, "# Statement body expression")?;
                writeln!(f, "{}", body.expression)?;
            }
            Extension::Scatnames(names) => writeln!(f, "{}", names.iter().format(" "))?,
            Extension::Arrays(arrays) => {
                writeln!(f, "# Number of arrays")?;
                writeln!(f, "{}", arrays.len())?;
                writeln!(f, "# Mapping array-identifiers/array-names")?;
                for (id, name) in arrays {
                    writeln!(f, "{id} {name}")?;
                }
            }
            Extension::Coordinates(c) => {
                writeln!(f, "# File name")?;
                writeln!(f, "{}", c.file)?;
                writeln!(f, "# Starting line and column")?;
                writeln!(f, "{} {}", c.start.0, c.start.1)?;
                writeln!(f, "# Ending line and column")?;
                writeln!(f, "{} {}", c.end.0, c.end.1)?;
                writeln!(f, "# Indentation")?;
                writeln!(f, "{}", c.indentation)?;
            }
            Extension::Loop(loops) => {
                writeln!(f, "# Number of loops")?;
                writeln!(f, "{}", loops.len())?;
                for (k, l) in loops.iter().enumerate() {
                    writeln!(f, "# ===========================================")?;
                    writeln!(f, "# Loop number {}", k + 1)?;
                    writeln!(f, "# Iterator name")?;
                    writeln!(f, "{}", l.iterator)?;
                    writeln!(f, "# Number of stmts")?;
                    writeln!(f, "{}", l.statements.len())?;
                    if !l.statements.is_empty() {
                        writeln!(f, "# Statement identifiers")?;
                        for id in &l.statements { writeln!(f, "{id}")?; }
                    }
                    writeln!(f, "# Private variables")?;
                    writeln!(f, "{}", l.private_vars.as_deref().unwrap_or("(null)"))?;
                    writeln!(f, "# Directive")?;
                    match &l.user {
                        Some(user) => writeln!(f, "{} {user}", l.directive.0)?,
                        None => writeln!(f, "{}", l.directive.0)?,
                    }
                }
            }
            Extension::Unknown { content, .. } => {
                for line in content { writeln!(f, "{line}")?; }
            }
        }
        writeln!(f, "</{tag}>")
    }
}
