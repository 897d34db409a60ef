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

//! The pseudo-cost updater and the node estimate. After a node's initial LP
//! was solved to optimality, the objective gain over the LP-state fork is
//! attributed to the branching bound changes that were applied since.

use crate::{BdChgOrigin, LpSolstat, PseudocostFlag, Solver, VarId};

impl Solver {
    /// Was this branching bound change the one that absorbed the LP gain?
    /// True iff the variable's old LP value lay strictly outside the current
    /// local bounds on some side and the new LP value coincides with the
    /// bound closest to the old value.
    fn is_pseudocost_update_valid(&self, var: VarId, oldlpsolval: f64) -> bool {
        // an unknown old LP value cannot be attributed
        if !oldlpsolval.is_finite() {
            return false;
        }
        let v = self.prob.var(var);
        if self.set.is_lt(oldlpsolval, v.lb) {
            self.set.is_eq(v.lp_sol(), v.lb)
        } else if self.set.is_gt(oldlpsolval, v.ub) {
            self.set.is_eq(v.lp_sol(), v.ub)
        } else {
            false
        }
    }

    /// Updates the variables' pseudo-cost values after the focus node's
    /// initial LP was solved to optimality.
    pub(crate) fn update_pseudocost(&mut self) {
        if !self.lp.solved || self.lp.solstat() != LpSolstat::Optimal {
            return;
        }
        let Some(fork) = self.tree.focuslpstatefork else {
            return;
        };
        let forkdepth = self.tree.node(fork).depth;
        let actdepth = self.tree.focus_depth();

        // walk from the fork down to the focus node and collect the
        // branching bound changes in between; the flags prevent a variable
        // with several bound changes from being counted twice
        let mut updates: Vec<(VarId, f64)> = vec![];
        let mut nvalidupdates = 0usize;
        for d in (forkdepth + 1)..=actdepth {
            let id = self.tree.path()[d];
            for i in 0..self.tree.node(id).domchg.len() {
                let bc = self.tree.node(id).domchg[i];
                let BdChgOrigin::Branching { lpsolval } = bc.origin else {
                    continue;
                };
                if self.prob.var(bc.var).pcflag != PseudocostFlag::None {
                    continue;
                }
                updates.push((bc.var, lpsolval));
                if self.is_pseudocost_update_valid(bc.var, lpsolval) {
                    self.prob.var_mut(bc.var).pcflag = PseudocostFlag::Update;
                    nvalidupdates += 1;
                } else {
                    self.prob.var_mut(bc.var).pcflag = PseudocostFlag::Ignore;
                }
            }
        }

        // the responsibility for the dual gain is spread equally over all
        // valid updates
        let weight = if nvalidupdates > 0 {
            1.0 / nvalidupdates as f64
        } else {
            1.0
        };
        let lpgain = (self.lp.objval() - self.tree.node(fork).lower).max(0.0);
        for (var, oldlpsolval) in updates {
            let v = self.prob.var_mut(var);
            if v.pcflag == PseudocostFlag::Update {
                let delta = v.lp_sol() - oldlpsolval;
                log::debug!(
                    "updating pseudocosts of <{}>: sol {} -> {}, gain {}, weight {}",
                    v.name(),
                    oldlpsolval,
                    v.lp_sol(),
                    lpgain,
                    weight
                );
                v.update_pseudocost(delta, lpgain, weight);
            }
            v.pcflag = PseudocostFlag::None;
        }
    }

    /// Updates the focus node's estimate after an optimal LP solve:
    /// `lower + sum(min(f_j * psc_down_j, (1 - f_j) * psc_up_j))` over the
    /// fractional candidates.
    pub(crate) fn update_estimate(&mut self) {
        if self.lp.solstat() != LpSolstat::Optimal || !self.lp.isrelax {
            return;
        }
        let cands = self.branchcand.lp_cands(&self.set, &self.prob, &self.lp);
        let mut estimate = self.tree.focus_lower();
        for cand in cands {
            let var = self.prob.var(cand.var);
            let pscdown = var.pseudocost(0.0 - cand.frac);
            let pscup = var.pseudocost(1.0 - cand.frac);
            estimate += pscdown.min(pscup);
        }
        self.tree.set_focus_estimate(estimate);
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_pseudocost {
    use crate::*;

    struct Always {
        objval: f64,
        colvals: Vec<f64>,
    }
    impl LpKernel for Always {
        fn solve(
            &mut self,
            _: &[LpCol],
            _: &[LpRow],
            _: &LpSolveReq,
        ) -> std::result::Result<LpSolution, LpError> {
            Ok(LpSolution {
                solstat: LpSolstat::Optimal,
                objval: self.objval,
                colvals: self.colvals.clone(),
                rowduals: vec![],
                iterations: 1,
            })
        }
    }

    /// Root with lower bound 1.0 and LP state stored; branch down on x at
    /// LP value 2.5; focus the down child where the LP now answers 3.0 with
    /// x sitting at its new upper bound 2.0.
    fn solver_after_branching() -> Solver {
        let mut prob = Prob::new("test");
        let x = prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        let mut s = Solver::new(
            prob,
            Set::default(),
            Box::new(Always {
                objval: 3.0,
                colvals: vec![2.0],
            }),
        );
        s.lp.add_col(x);
        s.prob.var_mut(x).col = Some(0);
        s.prob.ncolvars = 1;
        let root = Some(s.tree.root());
        s.tree
            .focus_node(root, &s.set, &mut s.prob, &mut s.lp, f64::INFINITY);
        s.tree.update_focus_lower(1.0);
        s.tree.store_focus_lpstate();
        s.prob.var_mut(x).lpsol = 2.5;

        let mut data = super::super::data!(s);
        let children = data.branch_var(x, 2.5).unwrap();
        let down = children[0];
        s.tree
            .focus_node(Some(down), &s.set, &mut s.prob, &mut s.lp, f64::INFINITY);
        s.lp
            .solve_and_eval(&s.set, &mut s.stat, &mut s.prob, None, false, false)
            .unwrap();
        s
    }

    #[test]
    fn the_gain_is_attributed_to_the_branching_variable() {
        let mut s = solver_after_branching();
        s.update_pseudocost();

        // gain 3.0 - 1.0 = 2.0 over a move of 2.0 -> 2.5, i.e. 0.5 down
        let var = s.prob.var(VarId(0));
        assert_eq!(PseudocostFlag::None, var.pcflag);
        let down = var.pseudocost(-0.5);
        assert!((down - 2.0).abs() < 1e-9);
        // the up direction has no history and reports unit cost
        assert_eq!(0.5, var.pseudocost(0.5));
    }

    #[test]
    fn no_fork_means_no_update() {
        let mut prob = Prob::new("test");
        let x = prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        let mut s = Solver::new(
            prob,
            Set::default(),
            Box::new(Always {
                objval: 3.0,
                colvals: vec![2.0],
            }),
        );
        s.lp.add_col(x);
        s.prob.var_mut(x).col = Some(0);
        let root = Some(s.tree.root());
        s.tree
            .focus_node(root, &s.set, &mut s.prob, &mut s.lp, f64::INFINITY);
        s.lp
            .solve_and_eval(&s.set, &mut s.stat, &mut s.prob, None, false, false)
            .unwrap();

        s.update_pseudocost();
        assert_eq!(1.0, s.prob.var(x).pseudocost(-1.0));
    }

    #[test]
    fn an_interior_old_value_is_not_a_valid_update() {
        let mut s = solver_after_branching();
        // pretend the old LP value was inside the child's bounds
        if let BdChgOrigin::Branching { lpsolval } =
            &mut s.tree.node_mut(s.tree.focus_id()).domchg[0].origin
        {
            *lpsolval = 1.0;
        }
        s.update_pseudocost();
        // flag hygiene holds and nothing was recorded
        assert_eq!(PseudocostFlag::None, s.prob.var(VarId(0)).pcflag);
        assert_eq!(0.5, s.prob.var(VarId(0)).pseudocost(-0.5));
    }

    #[test]
    fn estimate_adds_the_cheaper_direction_per_candidate() {
        let mut s = solver_after_branching();
        s.lp.isrelax = true;
        s.prob.var_mut(VarId(0)).lpsol = 1.25;
        s.tree.update_focus_lower(3.0);
        s.update_estimate();
        // psc without history: min(0.25, 0.75) on top of the bound
        let est = s.tree.node(s.tree.focus_id()).estimate;
        assert!((est - 3.25).abs() < 1e-9);
    }
}
