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

//! Sample SCoPs for testing.

/// Matrix multiplication, with explicit scattering and all the usual extensions.
pub const MATMUL: &str = indoc::indoc! {"
    <OpenScop>

    # =============================================== Global
    # Language
    C

    # Context
    CONTEXT
    1 3 0 0 0 1
    # e/i| N | 1
       1   1  -1    ## N-1 >= 0

    # Parameters are provided
    1
    <strings>
    N
    </strings>

    # Number of statements
    2

    # =============================================== Statement 1
    # Number of relations describing the statement:
    3

    # ---------------------------------------------- 1.1 Domain
    DOMAIN
    4 5 2 0 0 1
    # e/i| i   j | N | 1
       1   1   0   0   0    ## i >= 0
       1  -1   0   1  -1    ## -i+N-1 >= 0
       1   0   1   0   0    ## j >= 0
       1   0  -1   1  -1    ## -j+N-1 >= 0

    # ---------------------------------------------- 1.2 Scattering
    SCATTERING
    5 10 5 2 0 1
    # e/i| c1  c2  c3  c4  c5 | i   j | N | 1
       0  -1   0   0   0   0   0   0   0   0    ## c1 == 0
       0   0  -1   0   0   0   1   0   0   0    ## c2 == i
       0   0   0  -1   0   0   0   0   0   0    ## c3 == 0
       0   0   0   0  -1   0   0   1   0   0    ## c4 == j
       0   0   0   0   0  -1   0   0   0   0    ## c5 == 0

    # ---------------------------------------------- 1.3 Access
    WRITE
    3 8 3 2 0 1
    # e/i| Arr  [1]  [2]| i   j | N | 1
       0  -1    0    0    0   0   0   1    ## Arr == C
       0   0   -1    0    1   0   0   0    ## [1] == i
       0   0    0   -1    0   1   0   0    ## [2] == j

    # ---------------------------------------------- 1.4 Statement Extensions
    # Number of Statement Extensions
    1
    <body>
    # Number of original iterators
    2
    # List of original iterators
    i j
    # Statement body expression
    C[i][j] = 0.0;
    </body>

    # =============================================== Statement 2
    # Number of relations describing the statement:
    6

    # ---------------------------------------------- 2.1 Domain
    DOMAIN
    6 6 3 0 0 1
    # e/i| i   j   k | N | 1
       1   1   0   0   0   0    ## i >= 0
       1  -1   0   0   1  -1    ## -i+N-1 >= 0
       1   0   1   0   0   0    ## j >= 0
       1   0  -1   0   1  -1    ## -j+N-1 >= 0
       1   0   0   1   0   0    ## k >= 0
       1   0   0  -1   1  -1    ## -k+N-1 >= 0

    # ---------------------------------------------- 2.2 Scattering
    SCATTERING
    7 13 7 3 0 1
    # e/i| c1  c2  c3  c4  c5  c6  c7 | i   j   k | N | 1
       0  -1   0   0   0   0   0   0   0   0   0   0   0    ## c1 == 0
       0   0  -1   0   0   0   0   0   1   0   0   0   0    ## c2 == i
       0   0   0  -1   0   0   0   0   0   0   0   0   0    ## c3 == 0
       0   0   0   0  -1   0   0   0   0   1   0   0   0    ## c4 == j
       0   0   0   0   0  -1   0   0   0   0   0   0   1    ## c5 == 1
       0   0   0   0   0   0  -1   0   0   0   1   0   0    ## c6 == k
       0   0   0   0   0   0   0  -1   0   0   0   0   0    ## c7 == 0

    # ---------------------------------------------- 2.3 Access
    WRITE
    3 9 3 3 0 1
    # e/i| Arr  [1]  [2]| i   j   k | N | 1
       0  -1    0    0    0   0   0   0   1    ## Arr == C
       0   0   -1    0    1   0   0   0   0    ## [1] == i
       0   0    0   -1    0   1   0   0   0    ## [2] == j

    READ
    3 9 3 3 0 1
    # e/i| Arr  [1]  [2]| i   j   k | N | 1
       0  -1    0    0    0   0   0   0   1    ## Arr == C
       0   0   -1    0    1   0   0   0   0    ## [1] == i
       0   0    0   -1    0   1   0   0   0    ## [2] == j

    READ
    3 9 3 3 0 1
    # e/i| Arr  [1]  [2]| i   j   k | N | 1
       0  -1    0    0    0   0   0   0   2    ## Arr == A
       0   0   -1    0    1   0   0   0   0    ## [1] == i
       0   0    0   -1    0   0   1   0   0    ## [2] == k

    READ
    3 9 3 3 0 1
    # e/i| Arr  [1]  [2]| i   j   k | N | 1
       0  -1    0    0    0   0   0   0   3    ## Arr == B
       0   0   -1    0    0   0   1   0   0    ## [1] == k
       0   0    0   -1    0   1   0   0   0    ## [2] == j

    # ---------------------------------------------- 2.4 Statement Extensions
    # Number of Statement Extensions
    1
    <body>
    # Number of original iterators
    3
    # List of original iterators
    i j k
    # Statement body expression
    C[i][j] = C[i][j] + A[i][k] * B[k][j];
    </body>

    # =============================================== Extensions
    <scatnames>
    b0 i b1 j b2 k b3
    </scatnames>

    <arrays>
    # Number of arrays
    3
    # Mapping array-identifiers/array-names
    1 C
    2 A
    3 B
    </arrays>

    <coordinates>
    # File name
    matmul.c
    # Starting line and column
    4 0
    # Ending line and column
    11 0
    # Indentation
    2
    </coordinates>

    </OpenScop>
"};

/// Lower triangle of a square, without scattering or parameter names.
pub const TRIANGLE: &str = indoc::indoc! {"
    <OpenScop>
    C
    CONTEXT
    0 3 0 0 0 1
    0
    1
    1
    DOMAIN
    4 5 2 0 0 1
    1  1  0  0  0   ## i >= 0
    1 -1  0  1 -1   ## i <= N-1
    1  0  1  0  0   ## j >= 0
    1  1 -1  0  0   ## j <= i
    1
    <body>
    2
    i j
    A[i][j] = A[j][i];
    </body>
    </OpenScop>
"};

/// Two loops with partially overlapping ranges, depending on different parameters.
pub const OVERLAP: &str = indoc::indoc! {"
    <OpenScop>
    C
    CONTEXT
    0 4 0 0 0 2
    1
    <strings>
    N M
    </strings>
    2
    1
    DOMAIN
    2 5 1 0 0 2
    1  1  0  0  0   ## i >= 0
    1 -1  1  0  0   ## i <= N
    1
    <body>
    1
    i
    a[i] = 0;
    </body>
    1
    DOMAIN
    2 5 1 0 0 2
    1  1  0  0 -2   ## i >= 2
    1 -1  0  1  0   ## i <= M
    1
    <body>
    1
    i
    b[i] = a[i - 2];
    </body>
    </OpenScop>
"};

/// Union domains.
pub const UNION: &str = indoc::indoc! {"
    <OpenScop>
    C
    CONTEXT
    0 2 0 0 0 0
    0
    2
    1
    DOMAIN
    2
    2 3 1 0 0 0
    1  1  0   ## i >= 0
    1 -1  5   ## i <= 5
    2 3 1 0 0 0
    1  1 -3   ## i >= 3
    1 -1  8   ## i <= 8
    0
    1
    DOMAIN
    2 3 1 0 0 0
    1  1 -2   ## i >= 2
    1 -1  4   ## i <= 4
    0
    <pragma>
    # kept as is
    </pragma>
    </OpenScop>
"};

/// Scattering functions with non-unit coefficients: S1 runs at even times, S2 at odd times.
pub const STRIDE: &str = indoc::indoc! {"
    <OpenScop>
    C
    CONTEXT
    0 3 0 0 0 1
    1
    <strings>
    N
    </strings>
    2
    2
    DOMAIN
    2 4 1 0 0 1
    1  1  0  0   ## i >= 0
    1 -1  1  0   ## i <= N
    SCATTERING
    1 5 1 1 0 1
    0 -1  2  0  0   ## c1 == 2*i
    0
    2
    DOMAIN
    2 4 1 0 0 1
    1  1  0  0   ## i >= 0
    1 -1  1  0   ## i <= N
    SCATTERING
    1 5 1 1 0 1
    0 -1  2  0  1   ## c1 == 2*i+1
    0
    </OpenScop>
"};

/// Statements of different depths, and no scattering at all.
pub const MIXED_DEPTH: &str = indoc::indoc! {"
    <OpenScop>
    C
    CONTEXT
    0 3 0 0 0 1
    1
    <strings>
    N
    </strings>
    3
    1
    DOMAIN
    2 4 1 0 0 1
    1  1  0  0   ## i >= 0
    1 -1  1  0   ## i <= N
    0
    1
    DOMAIN
    4 5 2 0 0 1
    1  1  0  0  0   ## i >= 0
    1 -1  0  1  0   ## i <= N
    1  0  1  0  0   ## j >= 0
    1  1 -1  0  0   ## j <= i
    0
    1
    DOMAIN
    1 3 0 0 0 1
    1  1 -2   ## N >= 2
    0
    </OpenScop>
"};

/// Skewed schedule: the first scattering dimension is `i+j`, so `i` is recovered as `c1-c2`.
pub const SKEWED: &str = indoc::indoc! {r#"
    <OpenScop>
    C
    CONTEXT
    1 3 0 0 0 1
    1  1 -1   ## N >= 1
    1
    <strings>
    N
    </strings>
    1
    2
    DOMAIN
    4 5 2 0 0 1
    1  1  0  0  0   ## i >= 0
    1 -1  0  1 -1   ## i <= N-1
    1  0  1  0  0   ## j >= 0
    1  0 -1  1 -1   ## j <= N-1
    SCATTERING
    2 7 2 2 0 1
    0 -1  0  1  1  0  0   ## c1 == i+j
    0  0 -1  0  1  0  0   ## c2 == j
    1
    <body>
    2
    i j
    printf("%d %d\n", N-i, j);
    </body>
    </OpenScop>
"#};

/// All the samples above.
pub const ALL_SAMPLES: &[&str] = &[MATMUL, TRIANGLE, OVERLAP, UNION, STRIDE, MIXED_DEPTH, SKEWED];
