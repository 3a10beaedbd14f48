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

//! Command line interface support.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use displaydoc::Display as DisplayDoc;
use parse_display::{Display, FromStr};
use thiserror::Error;
use clap::{AppSettings, Parser};
use log::{info, warn};

use crate::{codegen, scop::{self, display_scops, read_scops}};

/// Entry to the command line interface.
#[derive(Parser)]
#[clap(global_setting(AppSettings::PropagateVersion))]
#[clap(author, version, about)]
pub struct Cli {
    /// The input OpenScop file.
    input: PathBuf,
    /// The output file, overwritten if it exists.
    output: PathBuf,
    /// What to write into the output file.
    #[clap(short, long, default_value = "c")]
    target_format: TargetFormat,
    /// Also print helper macros, statement macros and loop variable declarations.
    #[clap(long)]
    prelude: bool,
}

/// Supported target formats.
#[derive(Debug, Display, FromStr, Copy, Clone, Eq, PartialEq)]
#[display(style = "lowercase")]
pub enum TargetFormat {
    /// C code scanning the first SCoP in the input file.
    C,
    /// All the SCoPs in the input file, in canonical OpenScop layout.
    Scop,
}

/// All kinds of errors that might happen during command line execution.
#[derive(Debug, DisplayDoc, Error)]
pub enum Error {
    /// "errors" from [`clap`], including requests such as `--version` or `--help`.
    #[displaydoc("{0}")]
    InvalidArguments(#[from] clap::Error),
    /// cannot open input file {path}: {source}
    CannotOpenInput {
        /// Path to the input file.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// cannot open output file {path}: {source}
    CannotOpenOutput {
        /// Path to the output file.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// parse error: {0}
    InvalidInput(#[from] scop::ParseError),
    /// cannot generate code: {0}
    Unsupported(#[from] codegen::Error),
    /// failed to read or write file: {0}
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code for this error.
    ///
    /// Usage errors exit successfully, everything else exits with `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArguments(_) => 0,
            _ => 1,
        }
    }
}

/// Result type for the command line interface.
pub type Result = std::result::Result<(), Error>;

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

impl Cli {
    /// Run the command line interface.
    pub fn run() -> Result {
        let options: Cli = Cli::try_parse()?;
        options.execute()
    }

    /// Convert the input file according to the options.
    pub fn execute(&self) -> Result {
        let mut input = File::open(&self.input).map_err(|source| Error::CannotOpenInput {
            path: display_path(&self.input),
            source,
        })?;
        let output = File::create(&self.output).map_err(|source| Error::CannotOpenOutput {
            path: display_path(&self.output),
            source,
        })?;
        let mut contents = String::new();
        input.read_to_string(&mut contents)?;
        let scops = read_scops(&contents)?;
        info!(target: "cli", "read {} SCoP(s) from {}", scops.len(), self.input.display());
        let mut output = BufWriter::new(output);
        match self.target_format {
            TargetFormat::C => {
                if scops.len() > 1 {
                    warn!(target: "cli", "only the first of the {} SCoPs is converted", scops.len());
                }
                match scops.first() {
                    None => warn!(target: "cli", "no SCoP in {}", self.input.display()),
                    Some(scop) => {
                        let program = codegen::generate(scop)?;
                        if self.prelude {
                            write!(output, "{}", program)?;
                        } else {
                            write!(output, "{}", program.statements())?;
                        }
                    }
                }
            }
            TargetFormat::Scop => write!(output, "{}", display_scops(&scops))?,
        }
        output.flush()?;
        Ok(())
    }
}
