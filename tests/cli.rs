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

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const SQUARE: &str = indoc::indoc! {"
    <OpenScop>
    C
    CONTEXT
    1 3 0 0 0 1
    1  1 -1
    1
    <strings>
    N
    </strings>
    1
    1
    DOMAIN
    4 5 2 0 0 1
    1  1  0  0  0
    1 -1  0  1 -1
    1  0  1  0  0
    1  0 -1  1 -1
    1
    <body>
    2
    i j
    A[i][j] = 0;
    </body>
    </OpenScop>
"};

fn scop2c<P: AsRef<Path>>(args: &[P]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scop2c"))
        .args(args.iter().map(|a| a.as_ref().as_os_str()))
        .output()
        .unwrap()
}

fn entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries = std::fs::read_dir(dir).unwrap()
        .map(|entry| entry.unwrap().path())
        .collect::<Vec<_>>();
    entries.sort();
    entries
}

#[test]
fn test_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.scop");
    std::fs::write(&input, SQUARE).unwrap();
    let target = dir.path().join("out.c");
    let extra = dir.path().join("extra.c");
    let calls: [&[&Path]; 3] = [&[], &[&input], &[&input, &target, &extra]];
    for args in calls {
        let output = scop2c(args);
        assert_eq!(output.status.code(), Some(0), "arguments {args:?}");
        assert!(!output.stderr.is_empty());
        assert_eq!(entries(dir.path()), [input.clone()]);
        assert_eq!(std::fs::read_to_string(&input).unwrap(), SQUARE);
    }
}

#[test]
fn test_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.scop");
    let target = dir.path().join("out.c");
    let output = scop2c(&[&input, &target]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot open input file"));
    assert!(!target.exists());
}

#[test]
fn test_unwritable_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.scop");
    std::fs::write(&input, SQUARE).unwrap();
    let target = dir.path().join("no-such-dir").join("out.c");
    let output = scop2c(&[&input, &target]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot open output file"));
}

#[test]
fn test_generate_code() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.scop");
    std::fs::write(&input, SQUARE).unwrap();
    let target = dir.path().join("out.c");
    let output = scop2c(&[&input, &target]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(std::fs::read_to_string(&target).unwrap(), indoc::indoc! {"
        for (c1=0;c1<=N-1;c1++) {
          for (c2=0;c2<=N-1;c2++) {
            S1(c1,c2);
          }
        }
    "});

    let output = scop2c(&[
        input.as_os_str(), target.as_os_str(),
        "--prelude".as_ref(), "-t".as_ref(), "c".as_ref(),
    ]);
    assert_eq!(output.status.code(), Some(0));
    let code = std::fs::read_to_string(&target).unwrap();
    assert!(code.starts_with("#define S1(i,j) { A[i][j] = 0; }\n\nint c1, c2;\n\nfor (c1=0;"));
}

#[test]
fn test_rewrite_scop() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.scop");
    std::fs::write(&input, SQUARE).unwrap();
    let target = dir.path().join("out.scop");
    let output = scop2c(&[input.as_os_str(), target.as_os_str(), "--target-format=scop".as_ref()]);
    assert_eq!(output.status.code(), Some(0));
    let text = std::fs::read_to_string(&target).unwrap();
    assert!(text.contains("<OpenScop>"));
    assert!(text.contains("A[i][j] = 0;"));
}
