use crate::cnf::*;
use crate::lits::*;
use crate::rng::RandomSource;
use itertools::Itertools;
use log::trace;

/// Mutable search state derived from the current assignment. Everything here
/// is maintained incrementally by `flip`, so a flip touches only the clauses
/// containing the flipped variable instead of re-scanning the formula.
pub struct SearchState {
    /// One-indexed truth values of the variables.
    val: VMap<bool>,
    /// Number of true literals in each clause, counting multiplicity.
    numtrue: CMap<i32>,
    /// cost[v] is the number of clauses in which v is the variable of the
    /// unique true literal, i.e. the number of clauses that flipping v would
    /// break.
    cost: VMap<i32>,
    /// Dense stack of currently unsatisfied clauses.
    unsat: Vec<ClauseRef>,
    /// Reverse lookup into the stack: if unsat[i] = c then where_unsat[c] = i.
    /// CLAUSE_NONE exactly when clause c is satisfied.
    where_unsat: CMap<i32>,
    /// Maps each literal to the clauses containing it. A literal occurring m
    /// times in a clause contributes m entries; the increment/decrement
    /// arithmetic in `flip` relies on that.
    occs: LMap<Vec<ClauseRef>>,
}

impl SearchState {
    /// Sizes and zeroes all state for the given formula and builds the
    /// occurrence index. The index never changes afterwards.
    pub fn new(cnf: &Cnf) -> SearchState {
        let nv = cnf.num_vars() as usize;
        let nc = cnf.num_clauses();
        let mut occs: LMap<Vec<ClauseRef>> = vec![Vec::new(); 2 * nv];
        for c in 0..nc {
            for l in cnf.clause(c as ClauseRef) {
                occs[l.code()].push(c as ClauseRef);
            }
        }
        SearchState {
            val: vec![false; nv + 1],
            numtrue: vec![0; nc],
            cost: vec![0; nv + 1],
            unsat: Vec::new(),
            where_unsat: vec![CLAUSE_NONE; nc],
            occs,
        }
    }

    /// Draws a fresh assignment from a biased coin and recomputes the derived
    /// counters from scratch.
    pub fn init(&mut self, cnf: &Cnf, rng: &mut impl RandomSource, initial_bias: f64) {
        for v in 1..self.val.len() {
            self.val[v] = rng.flip(initial_bias);
        }
        self.unsat.clear();
        self.where_unsat.iter_mut().for_each(|w| *w = CLAUSE_NONE);
        self.cost.iter_mut().for_each(|c| *c = 0);
        for c in 0..cnf.num_clauses() as ClauseRef {
            let mut numtrue = 0;
            let mut last_true = LIT_UNDEF;
            for &l in cnf.clause(c) {
                if self.is_true(l) {
                    numtrue += 1;
                    last_true = l;
                }
            }
            self.numtrue[c as usize] = numtrue;
            if numtrue == 0 {
                self.register_unsatisfied(c);
            } else if numtrue == 1 {
                self.cost[last_true.var().idx()] += 1;
            }
        }
    }

    pub fn is_true(&self, l: Lit) -> bool {
        self.val[l.var().idx()] == l.is_pos()
    }

    /// One-indexed assignment; slot 0 is unused.
    pub fn values(&self) -> &[bool] {
        &self.val
    }

    pub fn num_unsat(&self) -> usize {
        self.unsat.len()
    }

    pub fn unsat_clause(&self, i: usize) -> ClauseRef {
        self.unsat[i]
    }

    pub fn cost(&self, v: Var) -> i32 {
        self.cost[v.idx()]
    }

    /// Removes c from the unsatisfied stack in O(1): the last element is
    /// swapped into c's slot and its reverse index fixed up before the stack
    /// shrinks. No-op if c is not on the stack.
    fn register_satisfied(&mut self, c: ClauseRef) {
        if self.where_unsat[c as usize] == CLAUSE_NONE {
            return;
        }
        let slot = self.where_unsat[c as usize];
        let last = self.unsat[self.unsat.len() - 1];
        self.where_unsat[last as usize] = slot;
        let top = self.unsat.len() - 1;
        self.unsat.swap(slot as usize, top);
        self.where_unsat[c as usize] = CLAUSE_NONE;
        self.unsat.pop();
    }

    /// Pushes c onto the unsatisfied stack. No-op if c is already on it.
    fn register_unsatisfied(&mut self, c: ClauseRef) {
        if self.where_unsat[c as usize] != CLAUSE_NONE {
            return;
        }
        self.where_unsat[c as usize] = self.unsat.len() as i32;
        self.unsat.push(c);
    }

    /// Flips the variable of `choice` and updates numtrue, cost and the
    /// unsatisfied stack for every clause containing that variable.
    pub fn flip(&mut self, cnf: &Cnf, choice: Lit) {
        let v = choice.var();
        // pos is the literal form that was true before the flip.
        let pos = if self.is_true(choice) { choice } else { !choice };
        let neg = !pos;
        trace!("flip {:?}, pos {:?}", v, pos.0);

        self.val[v.idx()] = !self.val[v.idx()];

        // Clauses where pos was true and is now false.
        for i in 0..self.occs[pos.code()].len() {
            let c = self.occs[pos.code()][i];
            self.numtrue[c as usize] -= 1;
            if self.numtrue[c as usize] == 0 {
                // Clause is newly unsatisfied; v was its unique true literal.
                self.register_unsatisfied(c);
                self.cost[v.idx()] -= 1;
            } else if self.numtrue[c as usize] == 1 {
                // Some other literal in the clause became the unique true one.
                for &l in cnf.clause(c) {
                    if self.is_true(l) {
                        self.cost[l.var().idx()] += 1;
                        break;
                    }
                }
            }
        }

        // Clauses where pos was false and is now true.
        for i in 0..self.occs[neg.code()].len() {
            let c = self.occs[neg.code()][i];
            self.numtrue[c as usize] += 1;
            if self.numtrue[c as usize] == 1 {
                // Clause is newly satisfied; v is now its unique true literal.
                self.register_satisfied(c);
                self.cost[v.idx()] += 1;
            } else if self.numtrue[c as usize] == 2 {
                // The literal that was unique loses its cost. Skip neg: it is
                // true in this clause now, but only because of this flip.
                for &l in cnf.clause(c) {
                    if l != neg && self.is_true(l) {
                        self.cost[l.var().idx()] -= 1;
                        break;
                    }
                }
            }
        }
    }

    /// Renders the unsatisfied stack for trace output.
    pub fn dump_unsat(&self, cnf: &Cnf) -> String {
        self.unsat
            .iter()
            .map(|&c| format!("[{}] {}", c, cnf.dump_clause(c, &self.val)))
            .join(", ")
    }

    /// Testing aid: recomputes every derived counter from the assignment and
    /// compares. Intended for formulas without repeated literals in a clause;
    /// on those, cost bookkeeping is only self-consistent, not exact.
    pub fn consistent_with(&self, cnf: &Cnf) -> bool {
        let mut num_empty = 0;
        for c in 0..cnf.num_clauses() {
            let numtrue = cnf
                .clause(c as ClauseRef)
                .iter()
                .filter(|l| self.is_true(**l))
                .count() as i32;
            if numtrue != self.numtrue[c] {
                trace!("numtrue[{}] is {}, expected {}", c, self.numtrue[c], numtrue);
                return false;
            }
            let slot = self.where_unsat[c];
            if (slot != CLAUSE_NONE) != (numtrue == 0) {
                trace!("where_unsat[{}] disagrees with numtrue {}", c, numtrue);
                return false;
            }
            if slot != CLAUSE_NONE && self.unsat[slot as usize] != c as ClauseRef {
                trace!("unsat[where_unsat[{}]] != {}", c, c);
                return false;
            }
            if numtrue == 0 {
                num_empty += 1;
            }
        }
        if self.unsat.len() != num_empty {
            trace!("unsat stack has {} entries, expected {}", self.unsat.len(), num_empty);
            return false;
        }
        let mut cost: VMap<i32> = vec![0; self.cost.len()];
        for c in 0..cnf.num_clauses() {
            if self.numtrue[c] == 1 {
                if let Some(l) = cnf.clause(c as ClauseRef).iter().find(|l| self.is_true(**l)) {
                    cost[l.var().idx()] += 1;
                }
            }
        }
        if cost != self.cost {
            trace!("cost disagrees: {:?} vs expected {:?}", self.cost, cost);
            return false;
        }
        true
    }
}
