//! WalkSAT: stochastic local search over CNF formulas. Either finds a
//! satisfying assignment or runs forever; the only unsatisfiability it can
//! prove is an empty clause in the input.

use log::{debug, info, trace};

pub mod cnf;
pub mod dimacs;
pub mod lits;
pub mod rng;
pub mod state;

pub use cnf::{ClauseRef, Cnf, CLAUSE_NONE};
pub use dimacs::{Dimacs, DimacsError};
pub use lits::{Lit, Var, LIT_UNDEF};
pub use rng::{RandomSource, SolverRng};
pub use state::SearchState;

/// Search parameters, fixed over a run.
pub struct Params {
    /// Probability that true is selected for each variable during the
    /// initial random assignment.
    pub initial_bias: f64,
    /// Probability that the flip literal is chosen from all literals in a
    /// clause instead of from all minimum cost literals.
    pub non_greedy_choice: f64,
    /// Seed for the pseudo-random generator; 0 seeds from the wall clock.
    pub seed: u64,
    /// Give up and report Unknown after this many flips; 0 means never.
    pub max_flips: u64,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            initial_bias: 0.1,
            non_greedy_choice: 0.65,
            seed: 0,
            max_flips: 0,
        }
    }
}

#[derive(Default)]
pub struct Stats {
    pub flips: u64,
}

/// Outcome of a run. `Sat` carries the one-indexed assignment (slot 0
/// unused). `Unsat` only ever arises from an empty clause in the input;
/// `Unknown` only when a flip cap is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    Sat(Vec<bool>),
    Unsat,
    Unknown,
}

/// The Algorithm W driver: repeatedly picks an unsatisfied clause uniformly
/// at random and flips one of its variables, preferring flips that break few
/// satisfied clauses.
pub struct Walker<R> {
    pub cnf: Cnf,
    pub state: SearchState,
    pub params: Params,
    pub stats: Stats,
    rng: R,
}

impl Walker<SolverRng> {
    pub fn new(cnf: Cnf, params: Params) -> Walker<SolverRng> {
        let rng = SolverRng::from_seed(params.seed);
        Walker::with_rng(cnf, params, rng)
    }
}

impl<R: RandomSource> Walker<R> {
    pub fn with_rng(cnf: Cnf, params: Params, rng: R) -> Walker<R> {
        let state = SearchState::new(&cnf);
        Walker {
            cnf,
            state,
            params,
            stats: Stats::default(),
            rng,
        }
    }

    /// Runs the search from a fresh random assignment. Returns `Sat` with a
    /// model, or `Unknown` if a flip cap is set and exhausted; with no cap
    /// this does not return on unsatisfiable input.
    pub fn solve(&mut self) -> SolveResult {
        let start_time = std::time::Instant::now();
        info!(
            "* solve: {} vars, {} clauses",
            self.cnf.num_vars(),
            self.cnf.num_clauses()
        );

        // W1. [Initialize.]
        self.state
            .init(&self.cnf, &mut self.rng, self.params.initial_bias);
        debug!("initial unsatisfied: {}", self.state.num_unsat());

        loop {
            // W2. [Done?]
            if self.state.num_unsat() == 0 {
                info!(
                    "* sat after {} flips in {:.3}s",
                    self.stats.flips,
                    start_time.elapsed().as_secs_f64()
                );
                return SolveResult::Sat(self.state.values().to_vec());
            }
            if self.params.max_flips > 0 && self.stats.flips >= self.params.max_flips {
                info!("* giving up after {} flips", self.stats.flips);
                return SolveResult::Unknown;
            }

            // W3. [Choose j.]
            let q = self.rng.uniform(self.state.num_unsat());
            let c = self.state.unsat_clause(q);
            trace!("unsat clauses: {}", self.state.dump_unsat(&self.cnf));
            debug!(
                "chose clause {}: {}",
                c,
                self.cnf.dump_clause(c, self.state.values())
            );

            // W4. [Choose l.]
            let choice = self.choose_literal(c);
            debug!(
                "chose {} to flip (cost = {})",
                choice.0,
                self.state.cost(choice.var())
            );

            // W5. [Flip l.]
            self.state.flip(&self.cnf, choice);
            self.stats.flips += 1;
        }
    }

    /// Single scan over the literals of clause c with reservoir sampling:
    /// uniform among the minimum cost literals, or -- when a non-greedy round
    /// was drawn and no zero cost literal exists -- uniform among all
    /// literals of the clause. Discovering a cost of 0 always restarts the
    /// minimum cost reservoir, non-greedy round or not.
    fn choose_literal(&mut self, c: ClauseRef) -> Lit {
        let Walker {
            cnf,
            state,
            params,
            rng,
            ..
        } = self;
        let all = rng.flip(params.non_greedy_choice);
        let mut choice = LIT_UNDEF;
        let mut min_cost = i32::MAX;
        let mut k = 1u64;
        for &l in cnf.clause(c) {
            let cost = state.cost(l.var());
            trace!("{} has cost {}", l.var().0, cost);
            if cost < min_cost {
                min_cost = cost;
                if !all || min_cost == 0 {
                    k = 1;
                }
            }
            if (all && min_cost > 0) || cost == min_cost {
                if rng.flip(1.0 / k as f64) {
                    choice = l;
                }
                k += 1;
            }
        }
        assert!(choice != LIT_UNDEF, "no flip literal chosen");
        choice
    }
}

/// Reads a DIMACS file and runs the solver on it. An empty clause in the
/// input short-circuits to `Unsat` without searching.
pub fn solve_dimacs_file(
    path: impl AsRef<std::path::Path>,
    params: Params,
) -> Result<SolveResult, DimacsError> {
    match dimacs::parse_dimacs_file(path)? {
        Dimacs::EmptyClause => Ok(SolveResult::Unsat),
        Dimacs::Formula(cnf) => {
            let mut walker = Walker::new(cnf, params);
            Ok(walker.solve())
        }
    }
}
