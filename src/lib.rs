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

//! Generate C loop nests from polyhedral programs.
//!
//! The input is a static control part (SCoP) in the OpenScop format: for every statement, its
//! iteration domain and its scattering (the schedule of its instances), as integer polyhedra.
//! The output is a C loop nest running every statement instance exactly once, in the
//! lexicographic order of the scattering.
//!
//! - [`scop`]: reading and writing OpenScop files;
//! - [`codegen`]: scanning the scattered domains into a loop nest;
//! - [`clast`]: the generated loop nest and its printing as C code.

#![warn(missing_docs)]

mod poly;
pub mod scop;
pub mod clast;
pub mod codegen;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::Cli;

#[cfg(test)]
mod samples;

pub use scop::{Scop, read_scops};
pub use clast::Program;
pub use codegen::generate;
