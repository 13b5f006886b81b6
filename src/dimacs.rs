//! DIMACS CNF reading and model printing.
//!
//! A file starts with zero or more comment (or otherwise non-problem) lines,
//! followed by a `p cnf <vars> <clauses>` problem line, followed by
//! whitespace-separated literals. Each clause is terminated by a 0 and may
//! span lines; a final clause terminated by end of input instead of a 0 is
//! still kept. Example: (x1 OR x2) AND (x3) AND (NOT x2 OR NOT x3 OR x4):
//!
//! ```text
//! c Header comment
//! p cnf 4 3
//! 1 2 0
//! 3 0
//! -2 -3 4 0
//! ```

use crate::cnf::Cnf;
use crate::lits::Lit;
use itertools::Itertools;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no problem line in input")]
    MissingProblemLine,
    #[error("malformed problem line: {0:?}")]
    BadProblemLine(String),
    #[error("variable or clause count out of range: {0:?}")]
    CountOverflow(String),
    #[error("bad literal token: {0:?}")]
    BadLiteral(String),
    #[error("literal {lit} out of range for {num_vars} variables")]
    LiteralOutOfRange { lit: i64, num_vars: i32 },
    #[error("declared {declared} clauses, found {found}")]
    ClauseCountMismatch { declared: usize, found: usize },
}

/// Outcome of reading a DIMACS file: a formula, or the verdict that the input
/// contains an empty clause and is therefore unsatisfiable as given.
pub enum Dimacs {
    Formula(Cnf),
    EmptyClause,
}

pub fn parse_dimacs_file(path: impl AsRef<Path>) -> Result<Dimacs, DimacsError> {
    parse_dimacs(BufReader::new(File::open(path)?))
}

pub fn parse_dimacs(input: impl BufRead) -> Result<Dimacs, DimacsError> {
    let mut lines = input.lines();

    // Skip lines until the problem line.
    let (num_vars, num_clauses) = loop {
        let line = match lines.next() {
            Some(line) => line?,
            None => return Err(DimacsError::MissingProblemLine),
        };
        let trimmed = line.trim_start();
        if trimmed.split_whitespace().next() == Some("p") {
            break problem_line(trimmed)?;
        }
    };

    let mut lits: Vec<Lit> = Vec::new();
    let mut start: Vec<u32> = Vec::new();
    let mut clause_begin = 0usize;
    for line in lines {
        for token in line?.split_whitespace() {
            let lit: i64 = token
                .parse()
                .map_err(|_| DimacsError::BadLiteral(token.to_string()))?;
            if lit == 0 {
                if lits.len() == clause_begin {
                    return Ok(Dimacs::EmptyClause);
                }
                start.push(clause_begin as u32);
                clause_begin = lits.len();
                continue;
            }
            if lit.unsigned_abs() as u128 > num_vars as u128 {
                return Err(DimacsError::LiteralOutOfRange { lit, num_vars });
            }
            lits.push(Lit(lit as i32));
        }
    }
    // A final clause terminated by EOF instead of 0 still counts.
    if lits.len() > clause_begin {
        start.push(clause_begin as u32);
    }
    if start.len() != num_clauses {
        return Err(DimacsError::ClauseCountMismatch {
            declared: num_clauses,
            found: start.len(),
        });
    }
    Ok(Dimacs::Formula(Cnf::from_parts(num_vars, lits, start)))
}

fn problem_line(line: &str) -> Result<(i32, usize), DimacsError> {
    let bad = || DimacsError::BadProblemLine(line.to_string());
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("p") || tokens.next() != Some("cnf") {
        return Err(bad());
    }
    let num_vars: i64 = tokens.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let num_clauses: i64 = tokens.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
    if tokens.next().is_some() {
        return Err(bad());
    }
    if num_vars < 0 || num_clauses < 0 {
        return Err(bad());
    }
    if num_vars > i32::MAX as i64 || num_clauses > i32::MAX as i64 {
        return Err(DimacsError::CountOverflow(line.to_string()));
    }
    Ok((num_vars as i32, num_clauses as usize))
}

/// Writes a satisfying assignment in the solver-competition v-line format:
/// ten literals per line, each variable positive if true and negated if
/// false, with a ` 0` terminator after the last one.
pub fn write_model(out: &mut impl Write, model: &[bool]) -> std::io::Result<()> {
    let num_vars = model.len().saturating_sub(1);
    if num_vars == 0 {
        return writeln!(out, "v 0");
    }
    let chunks = (1..=num_vars).chunks(10);
    for chunk in &chunks {
        write!(out, "v")?;
        let mut last = 0;
        for v in chunk {
            write!(out, " {}", if model[v] { v as i64 } else { -(v as i64) })?;
            last = v;
        }
        if last == num_vars {
            write!(out, " 0")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
