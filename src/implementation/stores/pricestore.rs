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

//! This module defines the `Pricestore`, the buffer between the pricers and
//! the LP: candidate columns accumulate here, are applied in one batch, and
//! any bounds a pricer tightened temporarily are rolled back afterwards.

use ordered_float::OrderedFloat;

use crate::{BoundDir, Lp, Prob, Set, VarId};

/// A candidate column with the score deciding its position in the batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedVar {
    pub var: VarId,
    pub score: f64,
}

/// The pricing storage.
#[derive(Debug, Default)]
pub struct Pricestore {
    vars: Vec<PricedVar>,
    boundresets: Vec<(VarId, BoundDir, f64)>,
    initiallp: bool,
    /// Candidate columns submitted over the whole solve
    pub nvarsfound: u64,
    /// Columns actually activated in the LP
    pub nvarsapplied: u64,
}

impl Pricestore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Informs the storage that the initial LP is being populated; scores
    /// are irrelevant then and every submitted variable is kept.
    pub fn start_initial_lp(&mut self) {
        self.initiallp = true;
    }

    /// Informs the storage that the initial LP setup is finished.
    pub fn end_initial_lp(&mut self) {
        self.initiallp = false;
    }

    /// Submits a candidate column. Duplicate submissions keep the better
    /// score.
    pub fn add_var(&mut self, var: VarId, score: f64) {
        if let Some(entry) = self.vars.iter_mut().find(|pv| pv.var == var) {
            entry.score = entry.score.max(score);
            return;
        }
        self.vars.push(PricedVar { var, score });
        self.nvarsfound += 1;
    }

    /// Submits every inactive problem variable whose reduced cost under the
    /// current LP duals is negative (it can improve the relaxation).
    pub fn add_prob_vars(&mut self, set: &Set, prob: &Prob, lp: &Lp) {
        for (id, var) in prob.vars() {
            if var.col.is_some() {
                continue;
            }
            let redcost = lp.reduced_cost(prob, id);
            if set.is_lt(redcost, 0.0) {
                self.add_var(id, -redcost);
            }
        }
    }

    /// The number of candidate columns waiting to be applied.
    pub fn n_vars(&self) -> usize {
        self.vars.len()
    }

    /// Temporarily tightens a bound on behalf of a pricer; rolled back by
    /// `reset_bounds` at the end of the pricing round.
    pub fn add_bdviolvar(&mut self, prob: &mut Prob, var: VarId, dir: BoundDir, newbound: f64) {
        let v = prob.var_mut(var);
        let old = match dir {
            BoundDir::Lower => std::mem::replace(&mut v.lb, newbound),
            BoundDir::Upper => std::mem::replace(&mut v.ub, newbound),
        };
        self.boundresets.push((var, dir, old));
    }

    /// The number of temporary bound changes waiting to be rolled back.
    pub fn n_bound_resets(&self) -> usize {
        self.boundresets.len()
    }

    /// Activates all candidate columns in the LP, best score first.
    pub fn apply_vars(&mut self, prob: &mut Prob, lp: &mut Lp) {
        self.vars
            .sort_by_key(|pv| std::cmp::Reverse(OrderedFloat(pv.score)));
        for pv in self.vars.drain(..) {
            let var = prob.var_mut(pv.var);
            if var.col.is_some() {
                continue;
            }
            let idx = lp.add_col(pv.var);
            prob.var_mut(pv.var).col = Some(idx);
            prob.ncolvars += 1;
            self.nvarsapplied += 1;
        }
    }

    /// Rolls back the temporary bounds set by the pricers.
    pub fn reset_bounds(&mut self, prob: &mut Prob, lp: &mut Lp) {
        for (var, dir, old) in self.boundresets.drain(..) {
            let v = prob.var_mut(var);
            match dir {
                BoundDir::Lower => v.lb = old,
                BoundDir::Upper => v.ub = old,
            }
            if v.col.is_some() {
                lp.notify_bound_change();
            }
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_pricestore {
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

    #[test]
    fn duplicate_submissions_keep_the_better_score() {
        let mut store = Pricestore::new();
        store.add_var(VarId(0), 1.0);
        store.add_var(VarId(0), 3.0);
        assert_eq!(1, store.n_vars());
        assert_eq!(1, store.nvarsfound);
    }

    #[test]
    fn apply_activates_columns_best_score_first() {
        let mut store = Pricestore::new();
        let mut prob = Prob::new("test");
        prob.add_var(Var::new("x", 1.0, 0.0, 1.0, true).priced());
        prob.add_var(Var::new("y", 1.0, 0.0, 1.0, true).priced());
        let mut lp = Lp::new(Box::new(NeverCalled));

        store.add_var(VarId(0), 1.0);
        store.add_var(VarId(1), 5.0);
        store.apply_vars(&mut prob, &mut lp);

        assert_eq!(0, store.n_vars());
        assert_eq!(2, prob.ncolvars);
        // y scored better and got the first column
        assert_eq!(Some(0), prob.var(VarId(1)).col);
        assert_eq!(Some(1), prob.var(VarId(0)).col);
        assert_eq!(2, store.nvarsapplied);
    }

    #[test]
    fn temporary_bounds_are_rolled_back() {
        let mut store = Pricestore::new();
        let mut prob = Prob::new("test");
        prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        let mut lp = Lp::new(Box::new(NeverCalled));

        store.add_bdviolvar(&mut prob, VarId(0), BoundDir::Upper, 3.0);
        assert_eq!(3.0, prob.var(VarId(0)).ub);
        assert_eq!(1, store.n_bound_resets());

        store.reset_bounds(&mut prob, &mut lp);
        assert_eq!(10.0, prob.var(VarId(0)).ub);
        assert_eq!(0, store.n_bound_resets());
    }
}
