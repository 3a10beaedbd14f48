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

//! Polyhedral scanning: from scattered domains to loop nests.
//!
//! Dimensions are scanned one level at a time. At each level, the domains of all the statements
//! still active are projected onto the outer dimensions, and the projections are separated into
//! disjoint pieces. The pieces are then ordered by the current dimension, and every piece becomes
//! a loop (or a simple binding, if the dimension is fixed by an equality) whose body is generated
//! recursively for the statements in the piece.
//!
//! Pieces which cannot be ordered one before the other are merged into a single loop, covering
//! all of them. The inner levels then re-check the constraints of each statement.
//!
//! Once all the scattering dimensions are fixed, statements are generated one after another in
//! their textual order.

pub mod input;

use std::collections::BTreeSet;
use displaydoc::Display as DisplayDoc;
use itertools::Itertools;
use log::{debug, info, trace};
use num::{BigInt, One, Signed, Zero};
use thiserror::Error;

use crate::clast::{Condition, Expr, Parallel, Program, Stmt};
use crate::poly::{Constraint, Normalized, Polyhedron};
use crate::scop::{Directive, Loop, RelationKind, Scop};
pub use input::{Entry, Input};

/// Code generation errors.
#[derive(Debug, DisplayDoc, Error, Clone, Eq, PartialEq)]
pub enum Error {
    /// either all statements or none of them should have a scattering relation
    MixedScattering,
    /// unsupported context relation: {0}
    UnsupportedContext(&'static str),
    /// unsupported {kind} relation for statement S{statement}: {reason}
    UnsupportedRelation {
        /// Statement number, starting from 1.
        statement: usize,
        /// Type of the relation.
        kind: RelationKind,
        /// What is not supported.
        reason: &'static str,
    },
    /// no {1} bound for the loop on `{0}`
    Unbounded(String, &'static str),
}

/// Generate the loop nest for a [`Scop`].
pub fn generate(scop: &Scop) -> Result<Program, Error> {
    let input = Input::from_scop(scop)?;
    let generator = Generator { input: &input };
    let bindings = vec![None; input.dims];
    let mut body = generator.generate(0, &input.entries, &input.context, &bindings)?;
    annotate(&mut body, scop.loops());
    info!(target: "codegen", "generated code for {} statements", scop.statements.len());
    Ok(Program { macros: input.macros.clone(), body })
}

/// Value of a dimension fixed by an equality, as an affine form of the free dimensions.
type Binding = Option<Vec<BigInt>>;

/// Disjoint region of a projection, with the entries active in it.
#[derive(Debug, Clone)]
struct Piece {
    polyhedron: Polyhedron,
    members: BTreeSet<usize>,
}

/// Split the projections into disjoint pieces.
fn separate(projections: impl IntoIterator<Item=(usize, Polyhedron)>) -> Vec<Piece> {
    let mut pieces: Vec<Piece> = Vec::new();
    for (index, projection) in projections {
        if projection.is_empty() { continue; }
        let mut next = Vec::with_capacity(pieces.len() + 1);
        let mut rest = vec![projection.clone()];
        for piece in pieces {
            let common = piece.polyhedron.intersect(&projection);
            if common.is_empty() {
                next.push(piece);
                continue;
            }
            for outside in piece.polyhedron.difference(&projection) {
                next.push(Piece { polyhedron: outside, members: piece.members.clone() });
            }
            rest = rest.iter().flat_map(|r| r.difference(&piece.polyhedron)).collect();
            let mut members = piece.members;
            members.insert(index);
            next.push(Piece { polyhedron: common, members });
        }
        next.extend(rest.into_iter().map(|polyhedron| Piece {
            polyhedron,
            members: BTreeSet::from([index]),
        }));
        pieces = next;
    }
    pieces
}

/// Whether or not some point in `a` might come before some point in `b` at `level`, with the
/// same values for all the outer dimensions.
fn may_precede(level: usize, a: &Polyhedron, b: &Polyhedron) -> bool {
    let dims = a.dims();
    let shifted = a.add_dim().swap_dims(level, dims);
    let mut both = shifted.intersect(&b.add_dim());
    let mut coefficients = vec![BigInt::zero(); both.width()];
    coefficients[level] = BigInt::one();
    coefficients[dims] = -BigInt::one();
    coefficients[both.width() - 1] = -BigInt::one();
    both.add(Constraint::inequality(coefficients));
    !both.is_empty()
}

/// Group the pieces into components that can be generated one after another, and sort them.
fn order(level: usize, pieces: Vec<Piece>, entries: &[Entry]) -> Vec<Vec<Piece>> {
    let n = pieces.len();
    let precedes = (0..n)
        .map(|a| (0..n).map(|b| a != b && may_precede(level, &pieces[a].polyhedron, &pieces[b].polyhedron))
            .collect_vec())
        .collect_vec();
    let mut reach = precedes.clone();
    for k in 0..n {
        for a in 0..n {
            for b in 0..n {
                if reach[a][k] && reach[k][b] { reach[a][b] = true; }
            }
        }
    }
    let mut component = vec![usize::MAX; n];
    let mut count = 0;
    for a in 0..n {
        if component[a] != usize::MAX { continue; }
        for b in a..n {
            if b == a || (reach[a][b] && reach[b][a]) { component[b] = count; }
        }
        count += 1;
    }
    let key = |c: usize| (0..n)
        .filter(|a| component[*a] == c)
        .flat_map(|a| pieces[a].members.iter().map(|m| entries[*m].statement))
        .min();
    let mut remaining = (0..count).collect_vec();
    let mut sorted = Vec::with_capacity(count);
    while !remaining.is_empty() {
        let ready = |c: usize| (0..n).all(|a| (0..n).all(|b| {
            !(precedes[a][b] && component[b] == c && component[a] != c && remaining.contains(&component[a]))
        }));
        let (k, c) = remaining.iter().copied().enumerate()
            .filter(|(_, c)| ready(*c))
            .min_by_key(|(_, c)| key(*c))
            .unwrap_or((0, remaining[0]));
        remaining.remove(k);
        sorted.push(c);
    }
    let mut groups = vec![Vec::new(); count];
    for (a, piece) in pieces.into_iter().enumerate() {
        groups[component[a]].push(piece);
    }
    if groups.iter().any(|g| g.len() > 1) {
        debug!(target: "codegen", "level {level}: merged {n} pieces into {count} loops");
    }
    sorted.into_iter().map(|c| std::mem::take(&mut groups[c])).collect()
}

/// Statements called somewhere in `stmts`.
fn statements_in(stmts: &[Stmt], result: &mut BTreeSet<usize>) {
    for stmt in stmts {
        match stmt {
            Stmt::For { body, .. } | Stmt::Guard { body, .. } => statements_in(body, result),
            Stmt::User { statement, .. } => { result.insert(*statement); }
            Stmt::Assign { .. } => {}
        }
    }
}

/// Mark the loops matching some `<loop>` annotation as parallel.
///
/// A loop matches when its iterator has the annotated name, and every statement in its body is
/// one of the annotated statements (an empty list admits all of them).
fn annotate(stmts: &mut [Stmt], loops: &[Loop]) {
    for stmt in stmts {
        match stmt {
            Stmt::For { iterator, body, parallel, .. } => {
                let mut contained = BTreeSet::new();
                statements_in(body, &mut contained);
                for l in loops {
                    if l.iterator != *iterator { continue; }
                    if !l.statements.is_empty() && !contained.iter().all(|s| l.statements.contains(s)) {
                        continue;
                    }
                    if l.directive.contains(Directive::PARALLEL) {
                        *parallel = Some(Parallel::Omp { private_vars: l.private_vars.clone() });
                    } else if l.directive.contains(Directive::VECTOR) && parallel.is_none() {
                        *parallel = Some(Parallel::Vector);
                    }
                }
                if parallel.is_some() {
                    debug!(target: "codegen", "loop on `{iterator}` marked as {parallel:?}");
                }
                annotate(body, loops);
            }
            Stmt::Guard { body, .. } => annotate(body, loops),
            Stmt::Assign { .. } | Stmt::User { .. } => {}
        }
    }
}

struct Generator<'a> {
    input: &'a Input,
}

impl Generator<'_> {
    fn name(&self, var: usize) -> String {
        if var < self.input.dims {
            self.input.dim_names[var].clone()
        } else {
            self.input.param_names[var - self.input.dims].clone()
        }
    }

    fn substitute(&self, coefficients: &[BigInt], bindings: &[Binding]) -> Vec<BigInt> {
        let mut result = coefficients.to_vec();
        for (var, binding) in bindings.iter().enumerate() {
            let Some(binding) = binding else { continue };
            let c = std::mem::take(&mut result[var]);
            if c.is_zero() { continue; }
            for (r, b) in result.iter_mut().zip(binding) { *r += &c * b; }
        }
        result
    }

    fn expr(&self, coefficients: &[BigInt], bindings: &[Binding]) -> Expr {
        Expr::affine(&self.substitute(coefficients, bindings), |var| self.name(var))
    }

    /// Conditions for the constraints, or `None` if they can never hold.
    fn conditions(&self, constraints: &[Constraint], bindings: &[Binding]) -> Option<Vec<Condition>> {
        let mut result = Vec::new();
        for c in constraints {
            let substituted = Constraint::new(c.kind, self.substitute(&c.coefficients, bindings));
            match substituted.normalize() {
                Normalized::Tautology => {}
                Normalized::Contradiction => return None,
                Normalized::Proper(c) => result.push(Condition::affine(
                    &c.coefficients, c.is_equality(), |var| self.name(var))),
            }
        }
        Some(result)
    }

    /// `a * x + rest = 0` as `x = numerator / a` with a positive `a`.
    fn solve(&self, constraint: &Constraint, level: usize) -> (BigInt, Vec<BigInt>) {
        let a = constraint.coefficient(level);
        let mut numerator = constraint.coefficients.clone();
        numerator[level] = BigInt::zero();
        if a.is_positive() {
            for c in numerator.iter_mut() { *c = -&*c; }
        }
        (a.abs(), numerator)
    }

    /// Lower and upper bounds for `level` in a piece without an equality on `level`.
    fn bounds(&self, piece: &Polyhedron, context: &Polyhedron, level: usize,
              bindings: &[Binding]) -> Result<(Expr, Expr), Error> {
        let simplified = piece.simplify(context);
        let split = |constraints: &[Constraint]| -> (Vec<Constraint>, Vec<Constraint>) {
            constraints.iter()
                .filter(|c| c.involves(level))
                .cloned()
                .partition(|c| c.coefficient(level).is_positive())
        };
        let (mut lowers, mut uppers) = split(simplified.constraints());
        if lowers.is_empty() || uppers.is_empty() {
            (lowers, uppers) = split(piece.constraints());
        }
        let lower = lowers.iter().map(|c| {
            let (a, numerator) = self.solve(c, level);
            // a x + r >= 0  ~>  x >= ceild(-r, a)
            self.expr(&numerator, bindings).ceil_div(&a)
        }).collect_vec();
        let upper = uppers.iter().map(|c| {
            let (a, numerator) = self.solve(c, level);
            self.expr(&numerator, bindings).floor_div(&a)
        }).collect_vec();
        if lower.is_empty() { return Err(Error::Unbounded(self.name(level), "lower")); }
        if upper.is_empty() { return Err(Error::Unbounded(self.name(level), "upper")); }
        Ok((Expr::max_of(lower), Expr::min_of(upper)))
    }

    fn equality<'p>(&self, piece: &'p Polyhedron, level: usize) -> Option<&'p Constraint> {
        piece.constraints().iter()
            .filter(|c| c.is_equality() && c.involves(level))
            .min_by_key(|c| c.coefficient(level).abs())
    }

    fn generate(&self, level: usize, entries: &[Entry], context: &Polyhedron,
                bindings: &[Binding]) -> Result<Vec<Stmt>, Error> {
        match entries {
            [] => return Ok(Vec::new()),
            [entry] if entry.depth == level => return Ok(self.user(entry, context, bindings)),
            _ if level >= self.input.scattering_dims && entries.len() > 1 => {
                let mut result = Vec::new();
                for entry in entries {
                    result.extend(self.generate(level, std::slice::from_ref(entry), context, bindings)?);
                }
                return Ok(result);
            }
            _ => {}
        }
        let projections = entries.iter().enumerate()
            .map(|(k, entry)| (k, entry.domain.project_onto(level + 1).intersect(context)));
        let pieces = separate(projections);
        trace!(target: "codegen", "level {level}: {} entries, {} pieces", entries.len(), pieces.len());
        let mut result = Vec::new();
        for component in order(level, pieces, entries) {
            let stmts = match component.as_slice() {
                [piece] => self.single(level, piece, entries, context, bindings)?,
                _ => self.merged(level, &component, entries, context, bindings)?,
            };
            result.extend(stmts);
        }
        Ok(result)
    }

    fn user(&self, entry: &Entry, context: &Polyhedron, bindings: &[Binding]) -> Vec<Stmt> {
        let remaining = entry.domain.simplify(context);
        let Some(conditions) = self.conditions(remaining.constraints(), bindings) else {
            return Vec::new();
        };
        let width = self.input.dims + self.input.params + 1;
        let args = (self.input.scattering_dims..entry.depth).map(|dim| {
            let mut unit = vec![BigInt::zero(); width];
            unit[dim] = BigInt::one();
            self.expr(&unit, bindings)
        }).collect();
        Stmt::guarded(conditions, vec![Stmt::User { statement: entry.statement + 1, args }])
    }

    fn single(&self, level: usize, piece: &Piece, entries: &[Entry], context: &Polyhedron,
              bindings: &[Binding]) -> Result<Vec<Stmt>, Error> {
        let members = piece.members.iter().map(|m| entries[*m].clone()).collect_vec();
        let inner = context.intersect(&piece.polyhedron);
        if let Some(eq) = self.equality(&piece.polyhedron, level) {
            let guard = piece.polyhedron.project_onto(level).simplify(context);
            let Some(mut conditions) = self.conditions(guard.constraints(), bindings) else {
                return Ok(Vec::new());
            };
            let (a, numerator) = self.solve(eq, level);
            let body = if a.is_one() {
                let value = self.substitute(&numerator, bindings);
                let mut bindings = bindings.to_vec();
                bindings[level] = Some(value);
                self.generate(level + 1, &members, &inner, &bindings)?
            } else {
                let value = self.expr(&numerator, bindings);
                conditions.push(Condition::Divisible(value.clone(), a.clone()));
                let mut body = vec![Stmt::Assign {
                    name: self.name(level),
                    value: Expr::Div(Box::new(value), a),
                }];
                body.extend(self.generate(level + 1, &members, &inner, bindings)?);
                body
            };
            if body.is_empty() { return Ok(Vec::new()); }
            return Ok(Stmt::guarded(conditions, body));
        }
        let simplified = piece.polyhedron.simplify(context);
        let guard = simplified.constraints().iter()
            .filter(|c| !c.involves(level))
            .cloned()
            .collect_vec();
        let Some(conditions) = self.conditions(&guard, bindings) else {
            return Ok(Vec::new());
        };
        let (lower, upper) = self.bounds(&piece.polyhedron, context, level, bindings)?;
        let body = self.generate(level + 1, &members, &inner, bindings)?;
        if body.is_empty() { return Ok(Vec::new()); }
        let iterator = self.name(level);
        Ok(Stmt::guarded(conditions, vec![Stmt::For { iterator, lower, upper, body, parallel: None }]))
    }

    fn merged(&self, level: usize, pieces: &[Piece], entries: &[Entry], context: &Polyhedron,
              bindings: &[Binding]) -> Result<Vec<Stmt>, Error> {
        let mut lowers = Vec::new();
        let mut uppers = Vec::new();
        let mut members = Vec::new();
        for piece in pieces {
            if let Some(eq) = self.equality(&piece.polyhedron, level) {
                let (a, numerator) = self.solve(eq, level);
                let value = self.expr(&numerator, bindings);
                lowers.push(value.clone().ceil_div(&a));
                uppers.push(value.floor_div(&a));
            } else {
                let (lower, upper) = self.bounds(&piece.polyhedron, context, level, bindings)?;
                lowers.push(lower);
                uppers.push(upper);
            }
            // restrict each statement to the pieces of this loop
            for m in &piece.members {
                let entry = &entries[*m];
                members.push((*m, Entry {
                    statement: entry.statement,
                    depth: entry.depth,
                    domain: entry.domain.intersect(&piece.polyhedron),
                }));
            }
        }
        members.sort_by_key(|(m, _)| *m);
        let members = members.into_iter().map(|(_, entry)| entry).collect_vec();
        let body = self.generate(level + 1, &members, context, bindings)?;
        if body.is_empty() { return Ok(Vec::new()); }
        Ok(vec![Stmt::For {
            iterator: self.name(level),
            lower: Expr::min_of(lowers),
            upper: Expr::max_of(uppers),
            body,
            parallel: None,
        }])
    }
}
