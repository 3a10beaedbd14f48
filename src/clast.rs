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

//! C-like abstract syntax tree for generated loop nests.

use std::collections::BTreeSet;
use std::fmt::{Arguments, Display, Formatter, Write};
use itertools::Itertools;
use num::{BigInt, Integer, One, Signed, Zero};

/// Integer expressions.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Expr {
    /// Integer literal.
    Int(BigInt),
    /// Variable or parameter.
    Name(String),
    /// `coefficient * name`.
    Term(BigInt, String),
    /// Sum of several expressions.
    Sum(Vec<Expr>),
    /// Minimum of several expressions.
    Min(Vec<Expr>),
    /// Maximum of several expressions.
    Max(Vec<Expr>),
    /// Rounded-up division by a positive constant.
    Ceild(Box<Expr>, BigInt),
    /// Rounded-down division by a positive constant.
    Floord(Box<Expr>, BigInt),
    /// Exact division by a positive constant.
    Div(Box<Expr>, BigInt),
}

impl Expr {
    /// The affine form `coefficients · (vars, 1)`, using `name` for the variables.
    pub fn affine(coefficients: &[BigInt], name: impl Fn(usize) -> String) -> Expr {
        let n = coefficients.len() - 1;
        let (variables, constant) = (&coefficients[..n], &coefficients[n]);
        let mut items = variables.iter().enumerate()
            .filter(|(_, c)| !c.is_zero())
            .map(|(var, c)| if c.is_one() {
                Expr::Name(name(var))
            } else {
                Expr::Term(c.clone(), name(var))
            })
            .collect_vec();
        if items.is_empty() { return Expr::Int(constant.clone()); }
        if !constant.is_zero() { items.push(Expr::Int(constant.clone())); }
        if items.len() == 1 { items.remove(0) } else { Expr::Sum(items) }
    }

    /// `ceild(self, d)`, folding the trivial cases.
    pub fn ceil_div(self, d: &BigInt) -> Expr {
        match self {
            _ if d.is_one() => self,
            Expr::Int(n) => Expr::Int(-(-n).div_floor(d)),
            e => Expr::Ceild(Box::new(e), d.clone()),
        }
    }

    /// `floord(self, d)`, folding the trivial cases.
    pub fn floor_div(self, d: &BigInt) -> Expr {
        match self {
            _ if d.is_one() => self,
            Expr::Int(n) => Expr::Int(n.div_floor(d)),
            e => Expr::Floord(Box::new(e), d.clone()),
        }
    }

    /// Maximum of the given expressions (which must not be empty).
    pub fn max_of(mut exprs: Vec<Expr>) -> Expr {
        exprs.dedup();
        if exprs.len() == 1 { exprs.remove(0) } else { Expr::Max(exprs) }
    }

    /// Minimum of the given expressions (which must not be empty).
    pub fn min_of(mut exprs: Vec<Expr>) -> Expr {
        exprs.dedup();
        if exprs.len() == 1 { exprs.remove(0) } else { Expr::Min(exprs) }
    }

    fn is_negative(&self) -> bool {
        match self {
            Expr::Int(n) | Expr::Term(n, _) => n.is_negative(),
            _ => false,
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, Expr::Sum(_)) || self.is_negative()
    }

    fn helpers(&self, used: &mut BTreeSet<Helper>) {
        used.extend(match self {
            Expr::Min(_) => Some(Helper::Min),
            Expr::Max(_) => Some(Helper::Max),
            Expr::Ceild(_, _) => Some(Helper::Ceild),
            Expr::Floord(_, _) => Some(Helper::Floord),
            _ => None,
        });
        match self {
            Expr::Int(_) | Expr::Name(_) | Expr::Term(_, _) => {}
            Expr::Sum(items) | Expr::Min(items) | Expr::Max(items) =>
                for e in items { e.helpers(used) },
            Expr::Ceild(e, _) | Expr::Floord(e, _) | Expr::Div(e, _) => e.helpers(used),
        }
    }
}

struct Operand<'a>(&'a Expr);

impl Display for Operand<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_compound() { write!(f, "({})", self.0) } else { write!(f, "{}", self.0) }
    }
}

/// Statement macro argument, parenthesised unless it is a single token or a call.
struct Argument<'a>(&'a Expr);

impl Display for Argument<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Expr::Name(_) | Expr::Min(_) | Expr::Max(_) | Expr::Ceild(_, _) | Expr::Floord(_, _) =>
                write!(f, "{}", self.0),
            Expr::Int(n) if !n.is_negative() => write!(f, "{n}"),
            e => write!(f, "({e})"),
        }
    }
}

fn write_nested(f: &mut Formatter<'_>, op: &str, items: &[Expr]) -> std::fmt::Result {
    match items {
        [] => unreachable!("empty {op}"),
        [x] => write!(f, "{x}"),
        [init @ .., last] => {
            write!(f, "{op}(")?;
            write_nested(f, op, init)?;
            write!(f, ",{last})")
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Int(n) => write!(f, "{n}"),
            Expr::Name(x) => write!(f, "{x}"),
            Expr::Term(c, x) if c.is_one() => write!(f, "{x}"),
            Expr::Term(c, x) if (-c).is_one() => write!(f, "-{x}"),
            Expr::Term(c, x) => write!(f, "{c}*{x}"),
            Expr::Sum(items) => {
                for (k, item) in items.iter().enumerate() {
                    if k > 0 && !item.is_negative() { write!(f, "+")?; }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Expr::Min(items) => write_nested(f, "min", items),
            Expr::Max(items) => write_nested(f, "max", items),
            Expr::Ceild(e, d) => write!(f, "ceild({e},{d})"),
            Expr::Floord(e, d) => write!(f, "floord({e},{d})"),
            Expr::Div(e, d) => write!(f, "{}/{d}", Operand(e)),
        }
    }
}

/// Conditions in guards.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Condition {
    /// `lhs >= rhs`.
    Ge(Expr, Expr),
    /// `lhs <= rhs`.
    Le(Expr, Expr),
    /// `lhs == rhs`.
    Eq(Expr, Expr),
    /// `expr % d == 0`.
    Divisible(Expr, BigInt),
}

impl Condition {
    /// Condition `coefficients · (vars, 1) >= 0` (or `== 0` if `equality`), written with the
    /// positive terms on the left.
    pub fn affine(coefficients: &[BigInt], equality: bool, name: impl Fn(usize) -> String) -> Condition {
        let n = coefficients.len() - 1;
        let zero = BigInt::zero();
        let positive = coefficients[..n].iter()
            .map(|c| if c.is_positive() { c.clone() } else { zero.clone() })
            .chain(std::iter::once(zero.clone()))
            .collect_vec();
        let negative = coefficients[..n].iter()
            .map(|c| if c.is_negative() { -c } else { zero.clone() })
            .chain(std::iter::once(-&coefficients[n]))
            .collect_vec();
        if positive.iter().all(Zero::is_zero) {
            // 0 >= rhs, flipped so that the variables come first
            let lhs = Expr::affine(&negative[..n].iter().cloned().chain([zero]).collect_vec(), &name);
            let rhs = Expr::Int(coefficients[n].clone());
            return if equality { Condition::Eq(lhs, rhs) } else { Condition::Le(lhs, rhs) };
        }
        let lhs = Expr::affine(&positive, &name);
        let rhs = Expr::affine(&negative, &name);
        if equality { Condition::Eq(lhs, rhs) } else { Condition::Ge(lhs, rhs) }
    }

    fn helpers(&self, used: &mut BTreeSet<Helper>) {
        match self {
            Condition::Ge(lhs, rhs) | Condition::Le(lhs, rhs) | Condition::Eq(lhs, rhs) => {
                lhs.helpers(used);
                rhs.helpers(used);
            }
            Condition::Divisible(e, _) => e.helpers(used),
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Ge(lhs, rhs) => write!(f, "{lhs} >= {rhs}"),
            Condition::Le(lhs, rhs) => write!(f, "{lhs} <= {rhs}"),
            Condition::Eq(lhs, rhs) => write!(f, "{lhs} == {rhs}"),
            Condition::Divisible(e, d) => write!(f, "{}%{d} == 0", Operand(e)),
        }
    }
}

/// Parallel execution of a loop.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Parallel {
    /// `#pragma omp parallel for`, bounds in `lbp` and `ubp`.
    Omp {
        /// Comma-separated private variables.
        private_vars: Option<String>,
    },
    /// `#pragma ivdep` and `#pragma vector always`, bounds in `lbv` and `ubv`.
    Vector,
}

impl Parallel {
    fn bounds(&self) -> (&'static str, &'static str) {
        match self {
            Parallel::Omp { .. } => ("lbp", "ubp"),
            Parallel::Vector => ("lbv", "ubv"),
        }
    }
}

/// Statements.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Stmt {
    /// `for (iterator = lower; iterator <= upper; iterator++) { body }`.
    For {
        /// Loop variable.
        iterator: String,
        /// Lower bound, inclusive.
        lower: Expr,
        /// Upper bound, inclusive.
        upper: Expr,
        /// Loop body.
        body: Vec<Stmt>,
        /// Parallel execution, if the loop is annotated.
        parallel: Option<Parallel>,
    },
    /// `if (c1 && c2 && ...) { body }`.
    Guard {
        /// Conditions, never empty.
        conditions: Vec<Condition>,
        /// Guarded statements.
        body: Vec<Stmt>,
    },
    /// `name = value;`.
    Assign {
        /// Variable being assigned.
        name: String,
        /// Its value.
        value: Expr,
    },
    /// Statement instance, e.g. `S1(i,j);`.
    User {
        /// Statement number, starting from 1.
        statement: usize,
        /// Values of its iterators.
        args: Vec<Expr>,
    },
}

impl Stmt {
    /// Wrap `body` in a [`Stmt::Guard`], unless there is no condition at all.
    pub fn guarded(conditions: Vec<Condition>, body: Vec<Stmt>) -> Vec<Stmt> {
        if conditions.is_empty() { body } else { vec![Stmt::Guard { conditions, body }] }
    }

    fn visit(&self, used: &mut BTreeSet<Helper>, variables: &mut Vec<String>) {
        fn declare(variables: &mut Vec<String>, name: &str) {
            if !variables.iter().any(|v| v == name) { variables.push(name.to_string()); }
        }
        match self {
            Stmt::For { iterator, lower, upper, body, parallel } => {
                declare(variables, iterator);
                if let Some(parallel) = parallel {
                    let (lb, ub) = parallel.bounds();
                    declare(variables, lb);
                    declare(variables, ub);
                }
                lower.helpers(used);
                upper.helpers(used);
                for s in body { s.visit(used, variables); }
            }
            Stmt::Guard { conditions, body } => {
                for c in conditions { c.helpers(used); }
                for s in body { s.visit(used, variables); }
            }
            Stmt::Assign { name, value } => {
                declare(variables, name);
                value.helpers(used);
            }
            Stmt::User { args, .. } => for e in args { e.helpers(used) },
        }
    }
}

/// Write `v` indented by 2 spaces.
pub(crate) fn write_indented<W>(f: &mut W, v: Arguments, buffer: &mut String) -> std::fmt::Result
    where W: Write + ?Sized {
    buffer.clear();
    writeln!(buffer, "{}", v)?;
    for line in buffer.lines() {
        writeln!(f, "  {}", line)?;
    }
    Ok(())
}

struct Indented<'a>(&'a [Stmt]);

impl Display for Indented<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let mut buffer = String::new();
        for stmt in self.0 {
            write_indented(f, format_args!("{}", stmt), &mut buffer)?;
        }
        Ok(())
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stmt::For { iterator: i, lower, upper, body, parallel: None } =>
                write!(f, "for ({i}={lower};{i}<={upper};{i}++) {{\n{}}}", Indented(body)),
            Stmt::For { iterator: i, lower, upper, body, parallel: Some(parallel) } => {
                let (lb, ub) = parallel.bounds();
                writeln!(f, "{lb}={lower};")?;
                writeln!(f, "{ub}={upper};")?;
                match parallel {
                    Parallel::Omp { private_vars: Some(vars) } =>
                        writeln!(f, "#pragma omp parallel for private({vars})")?,
                    Parallel::Omp { private_vars: None } => writeln!(f, "#pragma omp parallel for")?,
                    Parallel::Vector => {
                        writeln!(f, "#pragma ivdep")?;
                        writeln!(f, "#pragma vector always")?;
                    }
                }
                write!(f, "for ({i}={lb};{i}<={ub};{i}++) {{\n{}}}", Indented(body))
            }
            Stmt::Guard { conditions, body } => {
                match conditions.as_slice() {
                    [c] => write!(f, "if ({c}) ")?,
                    cs => write!(f, "if ({}) ", cs.iter().format_with(" && ", |c, f| f(&format_args!("({c})"))))?,
                }
                write!(f, "{{\n{}}}", Indented(body))
            }
            Stmt::Assign { name, value } => write!(f, "{name} = {value};"),
            Stmt::User { statement, args } =>
                write!(f, "S{statement}({});", args.iter().map(Argument).format(",")),
        }
    }
}

/// Helper macros possibly used in the generated code.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
enum Helper {
    Ceild,
    Floord,
    Max,
    Min,
}

impl Helper {
    fn definition(self) -> &'static str {
        match self {
            Helper::Ceild => "#define ceild(n,d)  (((n)<0) ? -((-(n))/(d)) : ((n)+(d)-1)/(d))",
            Helper::Floord => "#define floord(n,d) (((n)<0) ? -((-(n)+(d)-1)/(d)) : (n)/(d))",
            Helper::Max => "#define max(x,y)    ((x) > (y) ? (x) : (y))",
            Helper::Min => "#define min(x,y)    ((x) < (y) ? (x) : (y))",
        }
    }
}

/// Macro definition for a statement, e.g. `#define S1(i,j) { A[i][j] = 0; }`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StatementMacro {
    /// Statement number, starting from 1.
    pub statement: usize,
    /// Names of the macro parameters (the original iterators).
    pub iterators: Vec<String>,
    /// Statement text.
    pub body: String,
}

impl Display for StatementMacro {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#define S{}({}) {{ {} }}", self.statement, self.iterators.iter().format(","),
               self.body.lines().map(str::trim).format(" "))
    }
}

/// A whole generated program.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Program {
    /// Statement macros, for statements with a known body.
    pub macros: Vec<StatementMacro>,
    /// The loop nest.
    pub body: Vec<Stmt>,
}

impl Program {
    /// The loop nest alone, without any macro or declaration.
    pub fn statements(&self) -> impl Display + '_ {
        Statements(&self.body)
    }

    /// Loop variables, in order of first appearance.
    pub fn variables(&self) -> Vec<String> {
        let mut variables = Vec::new();
        let mut used = BTreeSet::new();
        for s in &self.body { s.visit(&mut used, &mut variables); }
        variables
    }

    fn helpers(&self) -> BTreeSet<Helper> {
        let mut used = BTreeSet::new();
        let mut variables = Vec::new();
        for s in &self.body { s.visit(&mut used, &mut variables); }
        used
    }
}

struct Statements<'a>(&'a [Stmt]);

impl Display for Statements<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.iter().try_for_each(|s| writeln!(f, "{s}"))
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let helpers = self.helpers();
        for helper in &helpers {
            writeln!(f, "{}", helper.definition())?;
        }
        if !helpers.is_empty() { writeln!(f)?; }
        for m in &self.macros {
            writeln!(f, "{m}")?;
        }
        if !self.macros.is_empty() { writeln!(f)?; }
        let variables = self.variables();
        if !variables.is_empty() {
            writeln!(f, "int {};\n", variables.iter().format(", "))?;
        }
        write!(f, "{}", self.statements())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use num::{BigInt, Integer, ToPrimitive};
    use crate::poly::tests::coefficients;
    use super::{Condition, Expr, Parallel, Program, StatementMacro, Stmt};

    fn int(n: i64) -> Expr { Expr::Int(BigInt::from(n)) }

    fn name(x: &str) -> Expr { Expr::Name(x.to_string()) }

    fn var(names: &'static [&'static str]) -> impl Fn(usize) -> String {
        move |k| names[k].to_string()
    }

    fn eval(e: &Expr, env: &HashMap<String, i64>) -> i64 {
        let small = |n: &BigInt| n.to_i64().unwrap();
        match e {
            Expr::Int(n) => small(n),
            Expr::Name(x) => env[x],
            Expr::Term(c, x) => small(c) * env[x],
            Expr::Sum(items) => items.iter().map(|e| eval(e, env)).sum(),
            Expr::Min(items) => items.iter().map(|e| eval(e, env)).min().unwrap(),
            Expr::Max(items) => items.iter().map(|e| eval(e, env)).max().unwrap(),
            Expr::Ceild(e, d) => -Integer::div_floor(&-eval(e, env), &small(d)),
            Expr::Floord(e, d) => Integer::div_floor(&eval(e, env), &small(d)),
            Expr::Div(e, d) => {
                let (n, d) = (eval(e, env), small(d));
                assert_eq!(n % d, 0, "inexact division");
                n / d
            }
        }
    }

    fn holds(c: &Condition, env: &HashMap<String, i64>) -> bool {
        match c {
            Condition::Ge(lhs, rhs) => eval(lhs, env) >= eval(rhs, env),
            Condition::Le(lhs, rhs) => eval(lhs, env) <= eval(rhs, env),
            Condition::Eq(lhs, rhs) => eval(lhs, env) == eval(rhs, env),
            Condition::Divisible(e, d) => eval(e, env) % d.to_i64().unwrap() == 0,
        }
    }

    fn run(stmts: &[Stmt], env: &mut HashMap<String, i64>, trace: &mut Vec<(usize, Vec<i64>)>) {
        for stmt in stmts {
            match stmt {
                Stmt::For { iterator, lower, upper, body, .. } => {
                    let (lower, upper) = (eval(lower, env), eval(upper, env));
                    for k in lower..=upper {
                        env.insert(iterator.clone(), k);
                        run(body, env, trace);
                    }
                }
                Stmt::Guard { conditions, body } =>
                    if conditions.iter().all(|c| holds(c, env)) { run(body, env, trace) },
                Stmt::Assign { name, value } => {
                    let value = eval(value, env);
                    env.insert(name.clone(), value);
                }
                Stmt::User { statement, args } =>
                    trace.push((*statement, args.iter().map(|e| eval(e, env)).collect())),
            }
        }
    }

    /// Execute the program with the given parameter values, recording the statement instances.
    pub(crate) fn execute(program: &Program, params: &[(&str, i64)]) -> Vec<(usize, Vec<i64>)> {
        let mut env = params.iter().map(|(x, v)| (x.to_string(), *v)).collect();
        let mut trace = Vec::new();
        run(&program.body, &mut env, &mut trace);
        trace
    }

    #[test]
    fn test_affine_expr() {
        let names = var(&["i", "j", "N"]);
        assert_eq!(Expr::affine(&coefficients(&[0, 0, 2, -1]), &names).to_string(), "2*N-1");
        assert_eq!(Expr::affine(&coefficients(&[-1, 0, 1, 0]), &names).to_string(), "-i+N");
        assert_eq!(Expr::affine(&coefficients(&[0, 0, 0, 7]), &names).to_string(), "7");
        assert_eq!(Expr::affine(&coefficients(&[0, 1, 0, 0]), &names), name("j"));
        assert_eq!(Expr::affine(&coefficients(&[0, -3, 0, 0]), &names).to_string(), "-3*j");
    }

    #[test]
    fn test_compound_expr() {
        let n = name("N");
        let sum = Expr::Sum(vec![n.clone(), int(1)]);
        assert_eq!(sum.clone().ceil_div(&BigInt::from(2)).to_string(), "ceild(N+1,2)");
        assert_eq!(int(-7).floor_div(&BigInt::from(2)), int(-4));
        assert_eq!(int(-7).ceil_div(&BigInt::from(2)), int(-3));
        assert_eq!(n.clone().ceil_div(&BigInt::from(1)), n);
        assert_eq!(Expr::max_of(vec![int(0), n.clone(), name("M")]).to_string(), "max(max(0,N),M)");
        assert_eq!(Expr::min_of(vec![n.clone(), n.clone()]), n);
        assert_eq!(Expr::Div(Box::new(sum.clone()), BigInt::from(2)).to_string(), "(N+1)/2");
        assert_eq!(Condition::Divisible(sum, BigInt::from(3)).to_string(), "(N+1)%3 == 0");
        assert_eq!(Condition::Divisible(n, BigInt::from(3)).to_string(), "N%3 == 0");
    }

    #[test]
    fn test_affine_condition() {
        let names = var(&["i", "j", "N"]);
        let ge = |xs: &[i64]| Condition::affine(&coefficients(xs), false, &names).to_string();
        assert_eq!(ge(&[0, 0, 1, -2]), "N >= 2");
        assert_eq!(ge(&[0, 0, -1, 10]), "N <= 10");
        assert_eq!(ge(&[1, -1, 0, 0]), "i >= j");
        assert_eq!(ge(&[2, 0, -1, 1]), "2*i >= N-1");
        let eq = Condition::affine(&coefficients(&[1, 0, -1, 0]), true, &names);
        assert_eq!(eq.to_string(), "i == N");
    }

    #[test]
    fn test_print_program() {
        let program = Program {
            macros: vec![StatementMacro {
                statement: 1,
                iterators: vec!["i".to_string(), "j".to_string()],
                body: "A[i][j] = 0;".to_string(),
            }],
            body: vec![Stmt::Guard {
                conditions: vec![Condition::Ge(name("N"), int(1)), Condition::Ge(name("M"), int(1))],
                body: vec![Stmt::For {
                    iterator: "i".to_string(),
                    lower: int(0),
                    upper: Expr::min_of(vec![name("N"), name("M")]),
                    body: vec![
                        Stmt::Assign { name: "j".to_string(), value: Expr::Term(BigInt::from(2), "i".to_string()) },
                        Stmt::User { statement: 1, args: vec![name("i"), name("j")] },
                    ],
                    parallel: None,
                }],
            }],
        };
        assert_eq!(program.to_string(), indoc::indoc! {"
            #define min(x,y)    ((x) < (y) ? (x) : (y))

            #define S1(i,j) { A[i][j] = 0; }

            int i, j;

            if ((N >= 1) && (M >= 1)) {
              for (i=0;i<=min(N,M);i++) {
                j = 2*i;
                S1(i,j);
              }
            }
        "});
        assert_eq!(execute(&program, &[("N", 2), ("M", 3)]),
                   vec![(1, vec![0, 0]), (1, vec![1, 2]), (1, vec![2, 4])]);
        assert!(execute(&program, &[("N", 0), ("M", 3)]).is_empty());
    }

    #[test]
    fn test_statement_arguments() {
        let names = var(&["c1", "c2", "N"]);
        let args = vec![
            Expr::affine(&coefficients(&[1, -1, 0, 0]), &names),
            name("c2"),
            Expr::affine(&coefficients(&[0, 2, 0, 0]), &names),
            Expr::affine(&coefficients(&[0, -1, 0, 0]), &names),
            int(-1),
            int(3),
            Expr::max_of(vec![int(0), name("N")]),
            Expr::Div(Box::new(name("c1")), BigInt::from(2)),
        ];
        let call = Stmt::User { statement: 1, args };
        assert_eq!(call.to_string(), "S1((c1-c2),c2,(2*c2),(-c2),(-1),3,max(0,N),(c1/2));");
    }

    #[test]
    fn test_print_parallel_loops() {
        let inner = Stmt::For {
            iterator: "t2".to_string(),
            lower: int(0),
            upper: name("N"),
            body: vec![Stmt::User { statement: 1, args: vec![name("t1"), name("t2")] }],
            parallel: Some(Parallel::Vector),
        };
        let program = Program {
            macros: Vec::new(),
            body: vec![Stmt::For {
                iterator: "t1".to_string(),
                lower: int(0),
                upper: Expr::Sum(vec![name("N"), int(-1)]),
                body: vec![inner],
                parallel: Some(Parallel::Omp { private_vars: Some("lbv,ubv,t2".to_string()) }),
            }],
        };
        assert_eq!(program.variables(), ["t1", "lbp", "ubp", "t2", "lbv", "ubv"]);
        assert_eq!(program.statements().to_string(), indoc::indoc! {"
            lbp=0;
            ubp=N-1;
            #pragma omp parallel for private(lbv,ubv,t2)
            for (t1=lbp;t1<=ubp;t1++) {
              lbv=0;
              ubv=N;
              #pragma ivdep
              #pragma vector always
              for (t2=lbv;t2<=ubv;t2++) {
                S1(t1,t2);
              }
            }
        "});
        assert_eq!(execute(&program, &[("N", 2)]).len(), 6);
    }
}
