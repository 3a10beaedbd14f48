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

//! Relations: unions of constraint matrices.
//!
//! Each row of a constraint matrix reads `e/i | output | input | local | params | constant`, where
//! `e/i` is `0` for an equality and `1` for an inequality (`>= 0`).

use std::fmt::{Display, Formatter};
use itertools::Itertools;
use num::{BigInt, One, Zero};
use parse_display::{Display, FromStr};

use crate::poly::{Constraint, ConstraintKind};
use super::{ParseError, ParseErrorKind, lines::{Lines, parse_token}};

/// Relation types.
#[derive(Debug, Display, FromStr, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
#[display(style = "SNAKE_CASE")]
#[allow(missing_docs)]
pub enum RelationKind {
    Undefined,
    Context,
    Domain,
    Scattering,
    Read,
    Write,
    MayWrite,
}

impl RelationKind {
    /// Access relations: `READ`, `WRITE`, and `MAY_WRITE`.
    pub fn is_access(self) -> bool {
        matches!(self, RelationKind::Read | RelationKind::Write | RelationKind::MayWrite)
    }
}

/// One part of a (union) relation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RelationPart {
    /// Number of output dimensions (iterators for domains, scattering dimensions for scatterings).
    pub output_dims: usize,
    /// Number of input dimensions.
    pub input_dims: usize,
    /// Number of local (existentially quantified) dimensions.
    pub local_dims: usize,
    /// Number of parameters.
    pub params: usize,
    /// Constraint rows: coefficients for output, input, local dimensions, parameters, and
    /// finally the constant.
    pub rows: Vec<Constraint>,
}

impl RelationPart {
    /// Number of columns in the textual matrix, including the `e/i` column.
    pub fn columns(&self) -> usize {
        self.output_dims + self.input_dims + self.local_dims + self.params + 2
    }

    fn read(lines: &mut Lines) -> Result<RelationPart, ParseError> {
        let header = lines.expect("relation dimensions")?;
        let numbers = header.split_whitespace()
            .map(|token| parse_token::<usize>(lines, token))
            .collect::<Result<Vec<_>, _>>()?;
        let [rows, columns, output_dims, input_dims, local_dims, params] = match numbers[..] {
            [a, b, c, d, e, f] => [a, b, c, d, e, f],
            _ => return Err(lines.error(ParseErrorKind::Unexpected {
                expected: "6 relation dimensions",
                found: header.to_string(),
            })),
        };
        let mut part = RelationPart { output_dims, input_dims, local_dims, params, rows: Vec::new() };
        if part.columns() != columns {
            return Err(lines.error(ParseErrorKind::ColumnMismatch { columns, expected: part.columns() }));
        }
        for _ in 0..rows {
            let line = lines.expect("constraint row")?;
            let entries = line.split_whitespace()
                .map(|token| parse_token::<BigInt>(lines, token))
                .collect::<Result<Vec<_>, _>>()?;
            if entries.len() != columns {
                return Err(lines.error(ParseErrorKind::RowLength { expected: columns, actual: entries.len() }));
            }
            let Some((marker, coefficients)) = entries.split_first() else {
                return Err(lines.error(ParseErrorKind::RowLength { expected: columns, actual: 0 }));
            };
            let kind = if marker.is_zero() {
                ConstraintKind::Equality
            } else if marker.is_one() {
                ConstraintKind::Inequality
            } else {
                return Err(lines.error(ParseErrorKind::InvalidRowKind(marker.clone())));
            };
            part.rows.push(Constraint::new(kind, coefficients.to_vec()));
        }
        Ok(part)
    }
}

impl Display for RelationPart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} {} {} {} {} {}", self.rows.len(), self.columns(),
                 self.output_dims, self.input_dims, self.local_dims, self.params)?;
        for row in &self.rows {
            let marker = match row.kind {
                ConstraintKind::Equality => 0,
                ConstraintKind::Inequality => 1,
            };
            writeln!(f, "{marker:>4} {}", row.coefficients.iter()
                .format_with(" ", |c, f| f(&format_args!("{c:>4}"))))?;
        }
        Ok(())
    }
}

/// A relation: union of one or more [`RelationPart`]s.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Relation {
    /// Type of this relation.
    pub kind: RelationKind,
    /// All the parts in this union, never empty.
    pub parts: Vec<RelationPart>,
}

impl Relation {
    /// Number of parameters (taken from the first part).
    pub fn params(&self) -> usize { self.parts[0].params }
    /// Number of output dimensions (taken from the first part).
    pub fn output_dims(&self) -> usize { self.parts[0].output_dims }
    /// Whether or not this is a union of several parts.
    pub fn is_union(&self) -> bool { self.parts.len() > 1 }

    /// Read a relation: its type, an optional number of union parts, then all the parts.
    pub(crate) fn read(lines: &mut Lines) -> Result<Relation, ParseError> {
        let keyword = lines.expect("relation type")?;
        let kind = keyword.parse::<RelationKind>()
            .map_err(|_| lines.error(ParseErrorKind::UnknownRelation(keyword.to_string())))?;
        let next = lines.peek().ok_or_else(|| lines.eof("relation dimensions"))?;
        let count = if next.split_whitespace().count() == 1 {
            lines.expect_int::<usize>("number of union parts")?
        } else { 1 };
        if count == 0 {
            return Err(lines.error(ParseErrorKind::EmptyUnion(kind)));
        }
        let parts = (0..count)
            .map(|_| RelationPart::read(lines))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Relation { kind, parts })
    }
}

impl Display for Relation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.kind)?;
        if self.is_union() { writeln!(f, "{}", self.parts.len())?; }
        for (k, part) in self.parts.iter().enumerate() {
            if k > 0 { writeln!(f)?; }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}
