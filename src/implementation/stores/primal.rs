// Copyright 2024 the bcp developers
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! This module defines the `Primal` store: the incumbent solutions, the
//! cutoff bound derived from them, and the found/best bookkeeping the stop
//! monitor consults. Plug-ins never write into the store directly; they
//! submit candidates which the engine checks against the constraint
//! handlers before acceptance.

use crate::{Lp, Prob, Set, Stat};

/// How a primal solution came to be.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SolOrigin {
    /// Values of the node's LP solution
    Lp,
    /// Values of the node's pseudo solution
    Pseudo,
    /// Values proposed by an external relaxator
    Relax,
    /// Values constructed by a primal heuristic
    Heur,
}

/// A primal solution: one value per problem variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Sol {
    pub vals: Vec<f64>,
    pub obj: f64,
    pub origin: SolOrigin,
}

impl Sol {
    pub fn new(prob: &Prob, vals: Vec<f64>, origin: SolOrigin) -> Self {
        let obj = prob.sol_objval(&vals);
        Sol { vals, obj, origin }
    }

    /// The value this solution assigns to a variable.
    pub fn value(&self, var: crate::VarId) -> f64 {
        self.vals[var.id()]
    }
}

/// The primal solution store.
#[derive(Debug)]
pub struct Primal {
    sols: Vec<Sol>,
    candidates: Vec<Sol>,
    /// The best known primal objective value (the objective limit while no
    /// solution was found); never increases
    pub upperbound: f64,
    /// The bound nodes are cut off against; mirrors `upperbound`
    pub cutoffbound: f64,
    /// Feasible solutions found (including non-improving ones)
    pub nsolsfound: u64,
    /// Improving solutions found
    pub nbestsolsfound: u64,
}

impl Primal {
    pub fn new(set: &Set, objlim: f64) -> Self {
        let upper = objlim.min(set.infinity());
        Primal {
            sols: vec![],
            candidates: vec![],
            upperbound: upper,
            cutoffbound: upper,
            nsolsfound: 0,
            nbestsolsfound: 0,
        }
    }

    pub fn n_sols(&self) -> usize {
        self.sols.len()
    }

    pub fn best_sol(&self) -> Option<&Sol> {
        self.sols.first()
    }

    pub fn best_obj(&self, set: &Set) -> f64 {
        self.best_sol().map_or(set.infinity(), |s| s.obj)
    }

    /// Queues a candidate solution for feasibility checking by the engine.
    pub fn submit_candidate(&mut self, sol: Sol) {
        self.candidates.push(sol);
    }

    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// Removes and returns the queued candidates.
    pub fn take_candidates(&mut self) -> Vec<Sol> {
        std::mem::take(&mut self.candidates)
    }

    /// Records a solution that passed the feasibility checks. Only strictly
    /// improving solutions are stored; every feasible one is counted.
    /// Returns whether the solution became the new incumbent.
    pub fn add_checked_sol(
        &mut self,
        set: &Set,
        stat: &mut Stat,
        lp: &mut Lp,
        sol: Sol,
    ) -> bool {
        self.nsolsfound += 1;
        if !set.is_lt(sol.obj, self.upperbound) {
            return false;
        }
        log::debug!(
            "new incumbent with objective {} (previous upper bound {})",
            sol.obj,
            self.upperbound
        );
        self.upperbound = sol.obj;
        self.cutoffbound = self.cutoffbound.min(sol.obj);
        lp.set_cutoff_bound(set, self.cutoffbound);
        self.nbestsolsfound += 1;
        stat.bestsolnode = stat.nnodes;
        self.sols.insert(0, sol);
        true
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_primal {
    use super::*;
    use crate::{LpCol, LpError, LpKernel, LpRow, LpSolution, LpSolveReq, Var};

    struct NeverCalled;
    impl LpKernel for NeverCalled {
        fn solve(
            &mut self,
            _: &[LpCol],
            _: &[LpRow],
            _: &LpSolveReq,
        ) -> std::result::Result<LpSolution, LpError> {
            unreachable!()
        }
    }

    fn prob() -> Prob {
        let mut prob = Prob::new("test");
        prob.add_var(Var::new("x", 2.0, 0.0, 10.0, true));
        prob
    }

    #[test]
    fn the_empty_store_reports_the_objective_limit() {
        let set = Set::default();
        let primal = Primal::new(&set, 100.0);
        assert_eq!(100.0, primal.upperbound);
        assert_eq!(100.0, primal.cutoffbound);
        assert!(primal.best_sol().is_none());
    }

    #[test]
    fn improving_solutions_lower_the_cutoff_bound() {
        let set = Set::default();
        let mut stat = Stat::new();
        let mut lp = Lp::new(Box::new(NeverCalled));
        let prob = prob();
        let mut primal = Primal::new(&set, set.infinity());

        let stored = primal.add_checked_sol(
            &set,
            &mut stat,
            &mut lp,
            Sol::new(&prob, vec![3.0], SolOrigin::Heur),
        );
        assert!(stored);
        assert_eq!(6.0, primal.upperbound);
        assert_eq!(6.0, primal.cutoffbound);
        assert_eq!(6.0, lp.cutoffbound);
        assert_eq!(1, primal.nbestsolsfound);
    }

    #[test]
    fn non_improving_solutions_are_counted_but_not_stored() {
        let set = Set::default();
        let mut stat = Stat::new();
        let mut lp = Lp::new(Box::new(NeverCalled));
        let prob = prob();
        let mut primal = Primal::new(&set, set.infinity());

        primal.add_checked_sol(
            &set,
            &mut stat,
            &mut lp,
            Sol::new(&prob, vec![1.0], SolOrigin::Heur),
        );
        let stored = primal.add_checked_sol(
            &set,
            &mut stat,
            &mut lp,
            Sol::new(&prob, vec![5.0], SolOrigin::Heur),
        );
        assert!(!stored);
        assert_eq!(2, primal.nsolsfound);
        assert_eq!(1, primal.nbestsolsfound);
        assert_eq!(1, primal.n_sols());
        assert_eq!(2.0, primal.upperbound);
    }

    #[test]
    fn candidates_wait_until_taken() {
        let set = Set::default();
        let prob = prob();
        let mut primal = Primal::new(&set, set.infinity());
        primal.submit_candidate(Sol::new(&prob, vec![1.0], SolOrigin::Heur));
        assert!(primal.has_candidates());
        assert_eq!(1, primal.take_candidates().len());
        assert!(!primal.has_candidates());
    }
}
