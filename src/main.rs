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

use std::io::Write;
use scop2c::{Cli, cli::Error};

fn main() {
    env_logger::init();
    if let Err(err) = Cli::run() {
        let reported = match &err {
            Error::InvalidArguments(usage) => usage.print(),
            _ => writeln!(std::io::stderr(), "ERROR: {}", err),
        };
        // an unreported error always fails
        std::process::exit(if reported.is_ok() { err.exit_code() } else { 1 });
    }
}
