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

//! Integer polyhedra with arbitrary-precision coefficients.
//!
//! A [`Polyhedron`] lives in a fixed space of `dims` dimensions followed by `params` parameters.
//! Every [`Constraint`] stores one coefficient per variable of that space, plus the constant
//! term as its last coefficient. Projections keep the space intact: eliminated dimensions simply
//! stop appearing in the constraints.
//!
//! # Design Notes
//! Elimination is Fourier–Motzkin over the rationals, with constraints tightened to integer
//! bounds after every step (dividing by the gcd and rounding the constant). The emptiness test
//! is therefore conservative in one direction only: a polyhedron reported empty contains no
//! integer point, while a non-empty answer might still have no integer point. All users of this
//! module only rely on the first direction.

use std::fmt::{Display, Formatter};
use itertools::Itertools;
use log::trace;
use num::{BigInt, Integer, One, Signed, Zero};
use smallvec::{SmallVec, smallvec};

/// Kind of an affine [`Constraint`].
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum ConstraintKind {
    /// `e = 0`.
    Equality,
    /// `e >= 0`.
    Inequality,
}

/// Affine constraint over the variables of a space, plus a constant.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Constraint {
    /// Equality or inequality.
    pub kind: ConstraintKind,
    /// Coefficients of all the variables (dimensions first, then parameters), then the constant.
    pub coefficients: Vec<BigInt>,
}

/// Result of normalising a [`Constraint`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Normalized {
    /// The constraint holds everywhere.
    Tautology,
    /// The constraint has no integer solution.
    Contradiction,
    /// The constraint in its canonical form.
    Proper(Constraint),
}

impl Constraint {
    /// Create a constraint from its kind and coefficients.
    pub fn new(kind: ConstraintKind, coefficients: Vec<BigInt>) -> Self {
        Constraint { kind, coefficients }
    }
    /// Shorthand for `e >= 0`.
    pub fn inequality(coefficients: Vec<BigInt>) -> Self {
        Constraint::new(ConstraintKind::Inequality, coefficients)
    }
    /// Shorthand for `e = 0`.
    pub fn equality(coefficients: Vec<BigInt>) -> Self {
        Constraint::new(ConstraintKind::Equality, coefficients)
    }
    /// Whether or not this is an equality.
    pub fn is_equality(&self) -> bool { self.kind == ConstraintKind::Equality }
    /// Number of variables (excluding the constant).
    pub fn variable_count(&self) -> usize { self.coefficients.len() - 1 }
    /// Variable coefficients, excluding the constant.
    pub fn variables(&self) -> &[BigInt] { &self.coefficients[..self.variable_count()] }
    /// The constant term.
    pub fn constant(&self) -> &BigInt { &self.coefficients[self.variable_count()] }
    /// Coefficient for the variable `var`.
    pub fn coefficient(&self, var: usize) -> &BigInt { &self.coefficients[var] }
    /// Whether or not the variable `var` appears in this constraint.
    pub fn involves(&self, var: usize) -> bool { !self.coefficients[var].is_zero() }

    /// Negation of this constraint, as a union of (at most two) disjoint inequalities.
    pub fn negate(&self) -> SmallVec<[Constraint; 2]> {
        let negated = || {
            let mut coefficients = self.coefficients.iter().map(|c| -c).collect_vec();
            let n = coefficients.len() - 1;
            coefficients[n] -= BigInt::one();
            Constraint::inequality(coefficients)
        };
        match self.kind {
            ConstraintKind::Inequality => smallvec![negated()],
            ConstraintKind::Equality => {
                let mut greater = self.coefficients.clone();
                let n = greater.len() - 1;
                greater[n] -= BigInt::one();
                smallvec![Constraint::inequality(greater), negated()]
            }
        }
    }

    /// Canonical form: variable coefficients divided by their gcd, inequality constants rounded
    /// down, equalities with a positive leading coefficient.
    pub fn normalize(mut self) -> Normalized {
        let gcd = self.variables().iter()
            .fold(BigInt::zero(), |g, c| g.gcd(c));
        if gcd.is_zero() {
            let constant = self.constant();
            let holds = match self.kind {
                ConstraintKind::Equality => constant.is_zero(),
                ConstraintKind::Inequality => !constant.is_negative(),
            };
            return if holds { Normalized::Tautology } else { Normalized::Contradiction };
        }
        let n = self.variable_count();
        match self.kind {
            ConstraintKind::Equality => {
                if !self.coefficients[n].is_multiple_of(&gcd) { return Normalized::Contradiction; }
                let leading_negative = self.coefficients.iter()
                    .find(|c| !c.is_zero()).map_or(false, Signed::is_negative);
                let divisor = if leading_negative { -gcd } else { gcd };
                for c in self.coefficients.iter_mut() { *c = &*c / &divisor; }
            }
            ConstraintKind::Inequality => {
                for c in self.coefficients[..n].iter_mut() { *c = &*c / &gcd; }
                self.coefficients[n] = self.coefficients[n].div_floor(&gcd);
            }
        }
        Normalized::Proper(self)
    }

    /// `factor_self * self + factor_other * other`, with the kind of `self`.
    fn combine(&self, factor_self: &BigInt, other: &Constraint, factor_other: &BigInt) -> Constraint {
        let coefficients = self.coefficients.iter().zip(&other.coefficients)
            .map(|(a, b)| factor_self * a + factor_other * b)
            .collect();
        Constraint::new(self.kind, coefficients)
    }

    /// Use the equality `eq` to remove the variable `var` from this constraint.
    fn substitute(&self, eq: &Constraint, var: usize) -> Constraint {
        let a = eq.coefficient(var);
        let b = self.coefficient(var);
        let factor = -(b * a.signum());
        self.combine(&a.abs(), eq, &factor)
    }

    /// Combine a lower bound (positive coefficient) with an upper bound (negative coefficient)
    /// for the variable `var`.
    fn combine_bounds(lower: &Constraint, upper: &Constraint, var: usize) -> Constraint {
        let a = lower.coefficient(var);
        let b = upper.coefficient(var);
        let mut result = lower.combine(&-b, upper, a);
        result.kind = ConstraintKind::Inequality;
        result
    }

    /// Insert a zero coefficient for a new variable at `position`.
    fn insert_variable(&mut self, position: usize) {
        self.coefficients.insert(position, BigInt::zero());
    }
}

/// Write the affine form `coefficients · (vars, 1)` using `name` for the variables.
fn write_affine(f: &mut impl std::fmt::Write, coefficients: &[BigInt],
                name: impl Fn(usize) -> String) -> std::fmt::Result {
    let n = coefficients.len() - 1;
    let mut first = true;
    for (var, c) in coefficients[..n].iter().enumerate() {
        if c.is_zero() { continue; }
        let sign = if c.is_negative() { "-" } else if first { "" } else { "+" };
        let abs = c.abs();
        if abs.is_one() {
            write!(f, "{sign}{}", name(var))?;
        } else {
            write!(f, "{sign}{abs}*{}", name(var))?;
        }
        first = false;
    }
    let constant = &coefficients[n];
    if first {
        write!(f, "{constant}")
    } else if constant.is_positive() {
        write!(f, "+{constant}")
    } else if constant.is_negative() {
        write!(f, "{constant}")
    } else {
        Ok(())
    }
}

/// Convex integer polyhedron: conjunction of affine [`Constraint`]s.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Polyhedron {
    dims: usize,
    params: usize,
    constraints: Vec<Constraint>,
}

impl Polyhedron {
    /// The whole space.
    pub fn universe(dims: usize, params: usize) -> Self {
        Polyhedron { dims, params, constraints: Vec::new() }
    }
    /// Polyhedron defined by some constraints.
    pub fn from_constraints(dims: usize, params: usize,
                            constraints: impl IntoIterator<Item=Constraint>) -> Self {
        let mut result = Polyhedron::universe(dims, params);
        for c in constraints { result.add(c); }
        result
    }
    /// Number of dimensions.
    pub fn dims(&self) -> usize { self.dims }
    /// Number of parameters.
    pub fn params(&self) -> usize { self.params }
    /// Number of coefficients in each constraint (variables plus the constant).
    pub fn width(&self) -> usize { self.dims + self.params + 1 }
    /// All the constraints, in canonical form.
    pub fn constraints(&self) -> &[Constraint] { &self.constraints }
    /// Whether or not this polyhedron is the whole space.
    fn contradiction(&self) -> Constraint {
        let mut coefficients = vec![BigInt::zero(); self.width()];
        coefficients[self.width() - 1] = -BigInt::one();
        Constraint::inequality(coefficients)
    }

    fn mark_empty(&mut self) {
        self.constraints = vec![self.contradiction()];
    }

    /// Whether or not this polyhedron is already known to be empty, without any elimination.
    pub fn is_marked_empty(&self) -> bool {
        matches!(self.constraints.as_slice(), [c] if c.variables().iter().all(Zero::is_zero))
    }

    /// Add a constraint, keeping the constraint set canonical: duplicates and weaker parallel
    /// inequalities are dropped, opposite inequalities meeting at a point become an equality.
    pub fn add(&mut self, constraint: Constraint) {
        assert_eq!(constraint.coefficients.len(), self.width(), "constraint from another space");
        if self.is_marked_empty() { return; }
        let constraint = match constraint.normalize() {
            Normalized::Tautology => return,
            Normalized::Contradiction => return self.mark_empty(),
            Normalized::Proper(c) => c,
        };
        if self.constraints.contains(&constraint) { return; }
        if constraint.kind == ConstraintKind::Inequality {
            for k in 0..self.constraints.len() {
                let other = &self.constraints[k];
                if other.kind != ConstraintKind::Inequality { continue; }
                if other.variables() == constraint.variables() {
                    if constraint.constant() < other.constant() {
                        self.constraints[k] = constraint;
                    }
                    return;
                }
                let opposite = other.variables().iter().zip(constraint.variables())
                    .all(|(a, b)| *a == -b);
                if opposite {
                    let sum = other.constant() + constraint.constant();
                    if sum.is_negative() { return self.mark_empty(); }
                    if sum.is_zero() {
                        let coefficients = constraint.coefficients.clone();
                        self.constraints.remove(k);
                        return self.add(Constraint::equality(coefficients));
                    }
                }
            }
        }
        self.constraints.push(constraint);
    }

    /// Builder-style [`Polyhedron::add`].
    pub fn with(mut self, constraint: Constraint) -> Self {
        self.add(constraint);
        self
    }

    /// Intersection of two polyhedra in the same space.
    pub fn intersect(&self, other: &Polyhedron) -> Polyhedron {
        assert_eq!((self.dims, self.params), (other.dims, other.params));
        let mut result = self.clone();
        for c in &other.constraints { result.add(c.clone()); }
        result
    }

    /// Eliminate the variable `var` (Fourier–Motzkin, or substitution through an equality).
    pub fn eliminate(&mut self, var: usize) {
        if self.is_marked_empty() { return; }
        let (mut involved, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.constraints)
            .into_iter().partition(|c| c.involves(var));
        self.constraints = rest;
        let pivot = involved.iter()
            .enumerate()
            .filter(|(_, c)| c.is_equality())
            .min_by_key(|(_, c)| c.coefficient(var).abs())
            .map(|(k, _)| k);
        if let Some(pivot) = pivot {
            let eq = involved.swap_remove(pivot);
            for c in involved { self.add(c.substitute(&eq, var)); }
        } else {
            let (lower, upper): (Vec<_>, Vec<_>) = involved.into_iter()
                .partition(|c| c.coefficient(var).is_positive());
            for l in &lower {
                for u in &upper {
                    self.add(Constraint::combine_bounds(l, u, var));
                }
            }
        }
    }

    /// Eliminate all the variables in `vars`, cheapest first.
    pub fn eliminate_all(&mut self, vars: impl IntoIterator<Item=usize>) {
        let mut pending = vars.into_iter().collect_vec();
        while !self.is_marked_empty() {
            let cost = |var: usize| {
                let (mut pos, mut neg, mut eq) = (0usize, 0usize, false);
                for c in &self.constraints {
                    let a = c.coefficient(var);
                    if a.is_zero() { continue; }
                    if c.is_equality() { eq = true; } else if a.is_positive() { pos += 1; } else { neg += 1; }
                }
                if eq { 0 } else { pos * neg }
            };
            let Some((k, _)) = pending.iter().enumerate()
                .min_by_key(|(_, var)| cost(**var)) else { break };
            let var = pending.swap_remove(k);
            self.eliminate(var);
        }
    }

    /// Projection onto the first `k` dimensions (and all the parameters).
    pub fn project_onto(&self, k: usize) -> Polyhedron {
        let mut result = self.clone();
        result.eliminate_all(k..self.dims);
        result
    }

    /// Whether or not this polyhedron (for some value of the parameters) is empty.
    pub fn is_empty(&self) -> bool {
        if self.is_marked_empty() { return true; }
        let mut result = self.clone();
        result.eliminate_all(0..self.dims + self.params);
        result.is_marked_empty()
    }

    /// Whether or not every point of this polyhedron satisfies `constraint`.
    pub fn implies(&self, constraint: &Constraint) -> bool {
        constraint.negate().into_iter()
            .all(|negation| self.clone().with(negation).is_empty())
    }

    /// Difference `self \ other`, as a list of disjoint non-empty polyhedra.
    pub fn difference(&self, other: &Polyhedron) -> Vec<Polyhedron> {
        let mut pieces = Vec::new();
        let mut rest = self.clone();
        for c in &other.constraints {
            for negation in c.negate() {
                let piece = rest.clone().with(negation);
                if !piece.is_empty() { pieces.push(piece); }
            }
            rest.add(c.clone());
            if rest.is_empty() { break; }
        }
        pieces
    }

    /// Remove the constraints implied by `context` together with the other constraints.
    pub fn simplify(&self, context: &Polyhedron) -> Polyhedron {
        if self.is_marked_empty() { return self.clone(); }
        let mut kept = self.constraints.clone();
        let mut k = 0;
        while k < kept.len() {
            let mut others = context.clone();
            for (j, c) in kept.iter().enumerate() {
                if j != k { others.add(c.clone()); }
            }
            if others.implies(&kept[k]) {
                trace!(target: "poly", "dropping redundant constraint {}", self.show(&kept[k]));
                kept.remove(k);
            } else {
                k += 1;
            }
        }
        Polyhedron { dims: self.dims, params: self.params, constraints: kept }
    }

    /// The same polyhedron, in a space with one more dimension (appended after the existing
    /// dimensions, before the parameters).
    pub fn add_dim(&self) -> Polyhedron {
        let mut constraints = self.constraints.clone();
        for c in constraints.iter_mut() { c.insert_variable(self.dims); }
        Polyhedron { dims: self.dims + 1, params: self.params, constraints }
    }

    /// The same polyhedron with the dimensions `a` and `b` exchanged.
    pub fn swap_dims(&self, a: usize, b: usize) -> Polyhedron {
        assert!(a < self.dims && b < self.dims);
        let mut constraints = self.constraints.clone();
        for c in constraints.iter_mut() { c.coefficients.swap(a, b); }
        Polyhedron { dims: self.dims, params: self.params, constraints }
    }

    fn show<'a>(&'a self, constraint: &'a Constraint) -> impl Display + 'a {
        ShowConstraint { dims: self.dims, constraint }
    }
}

struct ShowConstraint<'a> {
    dims: usize,
    constraint: &'a Constraint,
}

impl Display for ShowConstraint<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let dims = self.dims;
        write_affine(f, &self.constraint.coefficients, |var| if var < dims {
            format!("d{var}")
        } else {
            format!("p{}", var - dims)
        })?;
        match self.constraint.kind {
            ConstraintKind::Equality => write!(f, " = 0"),
            ConstraintKind::Inequality => write!(f, " >= 0"),
        }
    }
}

impl Display for Polyhedron {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ {} }}", self.constraints.iter().map(|c| self.show(c)).format(", "))
    }
}
