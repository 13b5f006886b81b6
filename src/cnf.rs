use crate::lits::*;
use itertools::Itertools;

/// Index of a clause in the formula.
pub type ClauseRef = i32;
pub const CLAUSE_NONE: ClauseRef = -1;

/// Immutable CNF formula. Clauses are stored as a flat literal array with no
/// terminator between clauses. Example: (1 OR 2) AND (3 OR -2 OR -1) is
/// stored as [1][2][3][-2][-1] with start = [0, 2]. The end of clause c is
/// the start of clause c+1, except for the final clause, which runs to the
/// end of the literal array.
pub struct Cnf {
    lits: Vec<Lit>,
    start: Vec<u32>,
    num_vars: i32,
}

impl Cnf {
    /// Builds a formula from explicit clause lists. Every clause must be
    /// nonempty (an empty clause is a parse-time verdict, not a formula) and
    /// every literal in range.
    pub fn new(num_vars: i32, clauses: impl IntoIterator<Item = Vec<Lit>>) -> Cnf {
        let mut lits = Vec::new();
        let mut start = Vec::new();
        for clause in clauses {
            assert!(!clause.is_empty(), "empty clause in Cnf::new");
            start.push(lits.len() as u32);
            lits.extend(clause);
        }
        Self::from_parts(num_vars, lits, start)
    }

    pub(crate) fn from_parts(num_vars: i32, lits: Vec<Lit>, start: Vec<u32>) -> Cnf {
        debug_assert!(lits.iter().all(|l| 1 <= l.var().0 && l.var().0 <= num_vars));
        Cnf { lits, start, num_vars }
    }

    pub fn num_vars(&self) -> i32 {
        self.num_vars
    }

    pub fn num_clauses(&self) -> usize {
        self.start.len()
    }

    pub fn num_lits(&self) -> usize {
        self.lits.len()
    }

    /// The literals of clause c.
    pub fn clause(&self, c: ClauseRef) -> &[Lit] {
        let begin = self.start[c as usize] as usize;
        let end = if c as usize + 1 == self.start.len() {
            self.lits.len()
        } else {
            self.start[c as usize + 1] as usize
        };
        &self.lits[begin..end]
    }

    pub fn clauses(&self) -> impl Iterator<Item = &[Lit]> + '_ {
        (0..self.num_clauses()).map(move |c| self.clause(c as ClauseRef))
    }

    /// Checks that every clause has at least one true literal under the
    /// one-indexed assignment.
    pub fn eval(&self, model: &[bool]) -> bool {
        self.clauses()
            .all(|c| c.iter().any(|l| l.is_pos() == model[l.var().idx()]))
    }

    /// Renders clause c for trace output, marking true literals with `*`.
    pub fn dump_clause(&self, c: ClauseRef, val: &[bool]) -> String {
        let body = self
            .clause(c)
            .iter()
            .map(|l| {
                if l.is_pos() == val[l.var().idx()] {
                    format!("{}*", l.0)
                } else {
                    format!("{}", l.0)
                }
            })
            .join(" ");
        format!("({})", body)
    }
}
