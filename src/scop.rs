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

//! Static control parts (SCoPs) in the OpenScop format.
//!
//! A file holds one or more SCoPs, each (optionally, if there is only one of them) enclosed in
//! `<OpenScop>` and `</OpenScop>`. A SCoP reads:
//! 1. the target language, e.g. `C`;
//! 2. the `CONTEXT` relation, constraints on the parameters;
//! 3. `0` or `1`, whether parameter names follow (as a `<strings>` block);
//! 4. the number of statements, then for each statement the number of its relations, the relations
//!    themselves (`DOMAIN` first, then optionally `SCATTERING`, then accesses), the number of its
//!    extensions, and the extensions;
//! 5. global extensions, until the end of the SCoP.
//!
//! `#` starts a comment, blank lines are insignificant.

pub mod relation;
pub mod extension;
mod lines;

use std::fmt::{Display, Formatter};
use displaydoc::Display as DisplayDoc;
use itertools::Itertools;
use num::BigInt;
use thiserror::Error;

pub use relation::{Relation, RelationKind, RelationPart};
pub use extension::{Body, Coordinates, Directive, Extension, Loop};
use lines::{Lines, strip_comment};

const START_TAG: &str = "<OpenScop>";
const END_TAG: &str = "</OpenScop>";

/// Parse error for [`Scop`]s, with the (1-based) line number where it was detected.
#[derive(Debug, DisplayDoc, Error)]
#[displaydoc("line {line}: {kind}")]
pub struct ParseError {
    /// Line number.
    pub line: usize,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

/// All kinds of parse errors.
#[derive(Debug, DisplayDoc, Clone, Eq, PartialEq)]
pub enum ParseErrorKind {
    /// unexpected end of input, expected {0}
    UnexpectedEof(&'static str),
    /// expected {expected}, found `{found}`
    Unexpected {
        /// What the reader was looking for.
        expected: &'static str,
        /// What it found instead.
        found: String,
    },
    /// invalid integer `{0}`
    InvalidInteger(String),
    /// unknown relation type `{0}`
    UnknownRelation(String),
    /// {0} relation is an empty union
    EmptyUnion(RelationKind),
    /// relation header declares {columns} columns, but its dimensions require {expected}
    ColumnMismatch {
        /// Number of columns in the header.
        columns: usize,
        /// Number of columns implied by the dimensions.
        expected: usize,
    },
    /// constraint row has {actual} entries, expected {expected}
    RowLength {
        /// Number of columns in the header.
        expected: usize,
        /// Number of entries in the row.
        actual: usize,
    },
    /// the first column of a row must be 0 or 1, found {0}
    InvalidRowKind(BigInt),
    /// expected {expected} relation, found {found}
    UnexpectedRelation {
        /// Relation types allowed at this position.
        expected: &'static str,
        /// The actual relation type.
        found: RelationKind,
    },
    /// {kind} relation has {found} parameters, but the context declares {expected}
    ParameterMismatch {
        /// Type of the offending relation.
        kind: RelationKind,
        /// Number of parameters in the context.
        expected: usize,
        /// Number of parameters in the relation.
        found: usize,
    },
    /// {kind} relation has {found} {what} dimensions, but the domain has {expected} iterators
    DimensionMismatch {
        /// Type of the offending relation.
        kind: RelationKind,
        /// Which dimensions: "input" or "output".
        what: &'static str,
        /// Number of iterators of the domain.
        expected: usize,
        /// Number of dimensions found.
        found: usize,
    },
    /// a statement needs at least a DOMAIN relation
    MissingDomain,
    /// expected {expected} names, found {found}
    NameCount {
        /// Number of names declared.
        expected: usize,
        /// Number of names present.
        found: usize,
    },
    /// unterminated extension `<{0}>`
    UnterminatedExtension(String),
}

/// A statement in a [`Scop`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Statement {
    /// Iteration domain.
    pub domain: Relation,
    /// Scattering (schedule) of the statement instances, if any.
    pub scattering: Option<Relation>,
    /// Access relations.
    pub accesses: Vec<Relation>,
    /// Statement extensions.
    pub extensions: Vec<Extension>,
}

impl Statement {
    /// Number of iterators, i.e. output dimensions of the domain.
    pub fn iterator_count(&self) -> usize { self.domain.output_dims() }

    /// The `<body>` extension, if any.
    pub fn body(&self) -> Option<&Body> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Body(body) => Some(body),
            _ => None,
        })
    }

    fn relation_count(&self) -> usize {
        1 + self.scattering.iter().count() + self.accesses.len()
    }

    fn read(lines: &mut Lines, params: usize) -> Result<Statement, ParseError> {
        let count = lines.expect_int::<usize>("number of relations")?;
        let mut relations = Vec::with_capacity(count);
        for _ in 0..count {
            let relation = Relation::read(lines)?;
            for part in &relation.parts {
                if part.params != params {
                    return Err(lines.error(ParseErrorKind::ParameterMismatch {
                        kind: relation.kind,
                        expected: params,
                        found: part.params,
                    }));
                }
            }
            relations.push(relation);
        }
        let mut relations = relations.into_iter();
        let Some(domain) = relations.next() else {
            return Err(lines.error(ParseErrorKind::MissingDomain));
        };
        if domain.kind != RelationKind::Domain {
            return Err(lines.error(ParseErrorKind::UnexpectedRelation {
                expected: "a DOMAIN",
                found: domain.kind,
            }));
        }
        let iterators = domain.output_dims();
        let mut relations = relations.peekable();
        let scattering = relations.next_if(|r| r.kind == RelationKind::Scattering);
        let accesses = relations.collect_vec();
        let check_dims = |relation: &Relation, what: &'static str, found: fn(&RelationPart) -> usize| {
            match relation.parts.iter().map(found).find(|n| *n != iterators) {
                None => Ok(()),
                Some(found) => Err(lines.error(ParseErrorKind::DimensionMismatch {
                    kind: relation.kind,
                    what,
                    expected: iterators,
                    found,
                })),
            }
        };
        check_dims(&domain, "output", |part| part.output_dims)?;
        if let Some(scattering) = &scattering {
            check_dims(scattering, "input", |part| part.input_dims)?;
        }
        for access in &accesses {
            if !access.kind.is_access() {
                return Err(lines.error(ParseErrorKind::UnexpectedRelation {
                    expected: "an access",
                    found: access.kind,
                }));
            }
        }
        let count = lines.expect_int::<usize>("number of statement extensions")?;
        let extensions = (0..count)
            .map(|_| Extension::read(lines))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Statement { domain, scattering, accesses, extensions })
    }
}

/// A static control part.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Scop {
    /// Target language, e.g. `C`.
    pub language: String,
    /// Constraints on the parameters.
    pub context: Relation,
    /// Parameter names, if provided.
    pub parameters: Option<Vec<String>>,
    /// All the statements, in textual order.
    pub statements: Vec<Statement>,
    /// Global extensions.
    pub extensions: Vec<Extension>,
}

impl Scop {
    /// Number of parameters.
    pub fn parameter_count(&self) -> usize { self.context.params() }

    /// Names of the scattering dimensions, from the `<scatnames>` extension.
    pub fn scatnames(&self) -> Option<&[String]> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Scatnames(names) => Some(names.as_slice()),
            _ => None,
        })
    }

    /// Loop annotations, from the `<loop>` extension.
    pub fn loops(&self) -> &[Loop] {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Loop(loops) => Some(loops.as_slice()),
            _ => None,
        }).unwrap_or(&[])
    }

    fn read(lines: &mut Lines) -> Result<Scop, ParseError> {
        let language = lines.expect("language")?.to_string();
        let context = Relation::read(lines)?;
        if context.kind != RelationKind::Context {
            return Err(lines.error(ParseErrorKind::UnexpectedRelation {
                expected: "a CONTEXT",
                found: context.kind,
            }));
        }
        let params = context.params();
        let provided = lines.expect_int::<u8>("whether parameter names are provided")?;
        let parameters = if provided != 0 {
            lines.expect_exact("<strings>")?;
            let mut names = Vec::new();
            loop {
                let line = lines.expect("</strings>")?;
                if line == "</strings>" { break; }
                names.extend(line.split_whitespace().map(str::to_string));
            }
            if names.len() != params {
                return Err(lines.error(ParseErrorKind::NameCount { expected: params, found: names.len() }));
            }
            Some(names)
        } else { None };
        let count = lines.expect_int::<usize>("number of statements")?;
        let statements = (0..count)
            .map(|_| Statement::read(lines, params))
            .collect::<Result<Vec<_>, _>>()?;
        let mut extensions = Vec::new();
        while let Some(line) = lines.peek() {
            if line == END_TAG || line == START_TAG { break; }
            extensions.push(Extension::read(lines)?);
        }
        Ok(Scop { language, context, parameters, statements, extensions })
    }
}

/// Read all the [`Scop`]s from source text.
pub fn read_scops(text: &str) -> Result<Vec<Scop>, ParseError> {
    let mut lines = Lines::new(text);
    let tagged = text.lines().any(|line| strip_comment(line) == START_TAG);
    if !tagged {
        if lines.peek().is_none() { return Ok(Vec::new()); }
        let scop = Scop::read(&mut lines)?;
        if let Some(line) = lines.next() {
            return Err(lines.error(ParseErrorKind::Unexpected {
                expected: "end of input",
                found: line.to_string(),
            }));
        }
        return Ok(vec![scop]);
    }
    let mut scops = Vec::new();
    while let Some(line) = lines.next() {
        if line != START_TAG {
            return Err(lines.error(ParseErrorKind::Unexpected {
                expected: START_TAG,
                found: line.to_string(),
            }));
        }
        scops.push(Scop::read(&mut lines)?);
        lines.expect_exact(END_TAG)?;
    }
    Ok(scops)
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# Number of relations describing the statement:")?;
        writeln!(f, "{}\n", self.relation_count())?;
        writeln!(f, "# ---------------------------------------------- Domain")?;
        writeln!(f, "{}", self.domain)?;
        if let Some(scattering) = &self.scattering {
            writeln!(f, "# ---------------------------------------------- Scattering")?;
            writeln!(f, "{}", scattering)?;
        }
        if !self.accesses.is_empty() {
            writeln!(f, "# ---------------------------------------------- Access")?;
            for access in &self.accesses {
                writeln!(f, "{}", access)?;
            }
        }
        writeln!(f, "# ---------------------------------------------- Statement Extensions")?;
        writeln!(f, "# Number of Statement Extensions")?;
        writeln!(f, "{}", self.extensions.len())?;
        for ext in &self.extensions {
            write!(f, "{}", ext)?;
        }
        Ok(())
    }
}

impl Display for Scop {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{START_TAG}\n")?;
        writeln!(f, "# =============================================== Global")?;
        writeln!(f, "# Language")?;
        writeln!(f, "{}\n", self.language)?;
        writeln!(f, "# Context")?;
        writeln!(f, "{}", self.context)?;
        writeln!(f, "# Parameters are provided")?;
        match &self.parameters {
            Some(names) => {
                writeln!(f, "1")?;
                writeln!(f, "<strings>\n{}\n</strings>\n", names.iter().format(" "))?;
            }
            None => writeln!(f, "0\n")?,
        }
        writeln!(f, "# Number of statements")?;
        writeln!(f, "{}\n", self.statements.len())?;
        for (k, statement) in self.statements.iter().enumerate() {
            writeln!(f, "# =============================================== Statement {}", k + 1)?;
            writeln!(f, "{}", statement)?;
        }
        if !self.extensions.is_empty() {
            writeln!(f, "# =============================================== Extensions")?;
            for ext in &self.extensions {
                writeln!(f, "{}", ext)?;
            }
        }
        writeln!(f, "{END_TAG}")
    }
}

/// Print a series of [`Scop`]s as OpenScop text.
pub fn display_scops(scops: &[Scop]) -> String {
    scops.iter().join("\n")
}

#[cfg(test)]
mod tests {
    use crate::samples;
    use super::{display_scops, read_scops, RelationKind};

    #[test]
    fn test_read_samples() {
        for input in samples::ALL_SAMPLES {
            let scops = read_scops(input).unwrap();
            assert_eq!(scops.len(), 1);
            let printed = display_scops(&scops);
            assert_eq!(read_scops(&printed).unwrap(), scops);
        }
    }

    #[test]
    fn test_read_matmul() {
        let scop = read_scops(samples::MATMUL).unwrap().remove(0);
        assert_eq!(scop.language, "C");
        assert_eq!(scop.parameter_count(), 1);
        assert_eq!(scop.parameters, Some(vec!["N".to_string()]));
        assert_eq!(scop.statements.len(), 2);
        let s2 = &scop.statements[1];
        assert_eq!(s2.iterator_count(), 3);
        assert_eq!(s2.scattering.as_ref().map(|s| s.output_dims()), Some(7));
        assert_eq!(s2.accesses.iter().map(|a| a.kind).collect::<Vec<_>>(),
                   vec![RelationKind::Write, RelationKind::Read, RelationKind::Read, RelationKind::Read]);
        let body = s2.body().unwrap();
        assert_eq!(body.iterators, vec!["i", "j", "k"]);
        assert_eq!(body.expression, "C[i][j] = C[i][j] + A[i][k] * B[k][j];");
        assert_eq!(scop.scatnames().map(<[String]>::len), Some(7));
    }

    #[test]
    fn test_untagged_and_empty() {
        assert!(read_scops("# nothing here\n\n").unwrap().is_empty());
        let untagged = indoc::indoc! {"
            C
            CONTEXT
            0 2 0 0 0 0
            0
            1
            1
            DOMAIN
            1 3 1 0 0 0
            0 1 -4
            0
        "};
        let scops = read_scops(untagged).unwrap();
        assert_eq!(scops.len(), 1);
        assert_eq!(scops[0].statements[0].iterator_count(), 1);
        assert!(scops[0].statements[0].scattering.is_none());
    }

    #[test]
    fn test_read_errors() {
        let error = |text: &str| read_scops(text).unwrap_err().to_string();
        let header = "<OpenScop>\nC\nCONTEXT\n0 3 0 0 0 1\n";
        assert_eq!(error(&format!("{header}1\n<strings>\nN M\n</strings>\n")),
                   "line 8: expected 1 names, found 2");
        assert_eq!(error(&format!("{header}0\n1\n1\nSCATTERING\n0 3 0 0 0 1\n")),
                   "line 9: expected a DOMAIN relation, found SCATTERING");
        assert_eq!(error(&format!("{header}0\n1\n1\nDOMAIN\n0 2 0 0 0 0\n")),
                   "line 9: DOMAIN relation has 0 parameters, but the context declares 1");
        assert_eq!(error(&format!("{header}0\n0\n")),
                   "line 6: unexpected end of input, expected </OpenScop>");
        assert_eq!(error("C\nDOMAIN\n0 2 0 0 0 0\n"),
                   "line 3: expected a CONTEXT relation, found DOMAIN");
        assert_eq!(error(&format!("{header}0\n1\n0\n")),
                   "line 7: a statement needs at least a DOMAIN relation");
    }
}
