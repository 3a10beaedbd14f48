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

//! Scattered statement domains, the input to the scanner.
//!
//! All the domains live in one space: `K` scattering dimensions, then the iterators of the
//! statement with the most of them, then the parameters. Iterator `j` of any statement is
//! dimension `K + j`.

use itertools::Itertools;
use log::debug;
use num::{BigInt, One, Zero};

use crate::clast::StatementMacro;
use crate::poly::{Constraint, Polyhedron};
use crate::scop::{Relation, RelationKind, RelationPart, Scop, Statement};
use super::Error;

/// A convex part of the scattered domain of a statement.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Entry {
    /// Index of the statement in the SCoP, starting from 0.
    pub statement: usize,
    /// Number of dimensions to scan before reaching the statement.
    pub depth: usize,
    /// Domain, scattering and context constraints.
    pub domain: Polyhedron,
}

/// Everything the scanner needs to know about a SCoP.
#[derive(Debug, Clone)]
pub struct Input {
    /// Number of scattering dimensions.
    pub scattering_dims: usize,
    /// Total number of dimensions.
    pub dims: usize,
    /// Number of parameters.
    pub params: usize,
    /// Constraints on the parameters.
    pub context: Polyhedron,
    /// Disjoint convex parts of all the statements, in statement order.
    pub entries: Vec<Entry>,
    /// Names of all the dimensions.
    pub dim_names: Vec<String>,
    /// Names of the parameters.
    pub param_names: Vec<String>,
    /// Macros for the statements with a known body.
    pub macros: Vec<StatementMacro>,
}

struct Space {
    scattering_dims: usize,
    dims: usize,
    params: usize,
}

impl Space {
    fn width(&self) -> usize { self.dims + self.params + 1 }

    /// Place a row of `part` in this space, with its output dimensions starting at `outputs`
    /// and its input dimensions starting at `inputs`.
    fn embed(&self, row: &Constraint, part: &RelationPart, outputs: usize, inputs: usize) -> Constraint {
        let mut coefficients = vec![BigInt::zero(); self.width()];
        let (o, i) = (part.output_dims, part.input_dims);
        for k in 0..o { coefficients[outputs + k] = row.coefficient(k).clone(); }
        for k in 0..i { coefficients[inputs + k] = row.coefficient(o + k).clone(); }
        let params = o + i + part.local_dims;
        for k in 0..part.params { coefficients[self.dims + k] = row.coefficient(params + k).clone(); }
        coefficients[self.dims + self.params] = row.constant().clone();
        Constraint::new(row.kind, coefficients)
    }

    /// `dim = other`, or `dim = 0` when `other` is `None`.
    fn binding(&self, dim: usize, other: Option<usize>) -> Constraint {
        let mut coefficients = vec![BigInt::zero(); self.width()];
        coefficients[dim] = BigInt::one();
        if let Some(other) = other { coefficients[other] = -BigInt::one(); }
        Constraint::equality(coefficients)
    }

    fn context(&self, context: &Relation) -> Result<Polyhedron, Error> {
        let part = match context.parts.as_slice() {
            [part] => part,
            _ => return Err(Error::UnsupportedContext("union of relations")),
        };
        if part.output_dims + part.input_dims > 0 {
            return Err(Error::UnsupportedContext("output or input dimensions"));
        }
        if part.local_dims > 0 {
            return Err(Error::UnsupportedContext("local dimensions"));
        }
        let rows = part.rows.iter().map(|row| self.embed(row, part, 0, 0));
        Ok(Polyhedron::from_constraints(self.dims, self.params, rows))
    }

    fn schedule(&self, index: usize, statement: &Statement) -> Result<Polyhedron, Error> {
        let unsupported = |reason| Error::UnsupportedRelation {
            statement: index + 1,
            kind: RelationKind::Scattering,
            reason,
        };
        let iterators = statement.iterator_count();
        let mut result = Polyhedron::universe(self.dims, self.params);
        let Some(scattering) = &statement.scattering else {
            for k in 0..self.scattering_dims {
                let iterator = (k < iterators).then(|| self.scattering_dims + k);
                result.add(self.binding(k, iterator));
            }
            return Ok(result);
        };
        let part = match scattering.parts.as_slice() {
            [part] => part,
            _ => return Err(unsupported("union of relations")),
        };
        if part.local_dims > 0 { return Err(unsupported("local dimensions")); }
        for row in &part.rows {
            result.add(self.embed(row, part, 0, self.scattering_dims));
        }
        for k in part.output_dims..self.scattering_dims {
            result.add(self.binding(k, None));
        }
        Ok(result)
    }

    fn domain(&self, index: usize, part: &RelationPart) -> Result<Polyhedron, Error> {
        let unsupported = |reason| Error::UnsupportedRelation {
            statement: index + 1,
            kind: RelationKind::Domain,
            reason,
        };
        if part.local_dims > 0 { return Err(unsupported("local dimensions")); }
        if part.input_dims > 0 { return Err(unsupported("input dimensions")); }
        let rows = part.rows.iter().map(|row| self.embed(row, part, self.scattering_dims, 0));
        Ok(Polyhedron::from_constraints(self.dims, self.params, rows))
    }
}

impl Input {
    /// Collect the scattered domains of all the statements in a [`Scop`].
    pub fn from_scop(scop: &Scop) -> Result<Input, Error> {
        let statements = &scop.statements;
        let scattered = statements.iter().filter(|s| s.scattering.is_some()).count();
        if scattered != 0 && scattered != statements.len() {
            return Err(Error::MixedScattering);
        }
        let max_iterators = statements.iter().map(Statement::iterator_count).max().unwrap_or(0);
        let scattering_dims = if scattered == 0 {
            max_iterators
        } else {
            statements.iter()
                .filter_map(|s| s.scattering.as_ref())
                .map(Relation::output_dims)
                .max().unwrap_or(0)
        };
        let space = Space {
            scattering_dims,
            dims: scattering_dims + max_iterators,
            params: scop.parameter_count(),
        };
        let context = space.context(&scop.context)?;

        let mut entries = Vec::new();
        for (index, statement) in statements.iter().enumerate() {
            let schedule = space.schedule(index, statement)?.intersect(&context);
            let depth = scattering_dims + statement.iterator_count();
            let mut previous: Vec<Polyhedron> = Vec::new();
            for part in &statement.domain.parts {
                let domain = space.domain(index, part)?;
                let mut pieces = vec![domain.clone()];
                for earlier in &previous {
                    pieces = pieces.iter().flat_map(|piece| piece.difference(earlier)).collect();
                }
                previous.push(domain);
                for piece in pieces {
                    let domain = piece.intersect(&schedule);
                    if domain.is_empty() {
                        debug!(target: "codegen", "S{}: dropping empty part {}", index + 1, domain);
                        continue;
                    }
                    entries.push(Entry { statement: index, depth, domain });
                }
            }
        }

        let dim_names = match scop.scatnames() {
            Some(names) if names.len() >= scattering_dims =>
                names[..scattering_dims].iter().cloned()
                    .chain((scattering_dims..space.dims).map(|k| format!("c{}", k + 1)))
                    .collect(),
            _ => (0..space.dims).map(|k| format!("c{}", k + 1)).collect(),
        };
        let param_names = match &scop.parameters {
            Some(names) => names.clone(),
            None => (0..space.params).map(|k| format!("P{}", k + 1)).collect(),
        };
        let macros = statements.iter().enumerate()
            .filter_map(|(index, statement)| statement.body().map(|body| StatementMacro {
                statement: index + 1,
                iterators: body.iterators.clone(),
                body: body.expression.clone(),
            }))
            .collect_vec();
        debug!(target: "codegen", "{} scattering dimensions, {} dimensions in total, {} entries",
               scattering_dims, space.dims, entries.len());
        Ok(Input {
            scattering_dims,
            dims: space.dims,
            params: space.params,
            context,
            entries,
            dim_names,
            param_names,
            macros,
        })
    }
}
