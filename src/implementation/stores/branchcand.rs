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

//! This module defines the `Branchcand` store grouping the three families
//! of branching candidates: LP-fractional variables, externally registered
//! candidates (typically submitted by relaxators), and the pseudo
//! candidates (all unfixed integer variables).

use crate::{Lp, Prob, Set, VarId};

/// An LP branching candidate: an integer variable with a fractional value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LpCand {
    pub var: VarId,
    /// The candidate's LP solution value
    pub val: f64,
    /// Its fractionality `val - floor(val)`
    pub frac: f64,
}

/// The branching candidate storage.
#[derive(Debug, Default)]
pub struct Branchcand {
    extern_cands: Vec<VarId>,
}

impl Branchcand {
    pub fn new() -> Self {
        Self::default()
    }

    /// The integer variables taking a fractional value in the current LP
    /// solution.
    pub fn lp_cands(&self, set: &Set, prob: &Prob, lp: &Lp) -> Vec<LpCand> {
        lp.cols()
            .iter()
            .filter_map(|&id| {
                let var = prob.var(id);
                if !var.integral {
                    return None;
                }
                let val = var.lp_sol();
                if set.is_integral(val) {
                    return None;
                }
                Some(LpCand {
                    var: id,
                    val,
                    frac: set.frac(val),
                })
            })
            .collect()
    }

    /// The number of LP branching candidates.
    pub fn n_lp_cands(&self, set: &Set, prob: &Prob, lp: &Lp) -> usize {
        self.lp_cands(set, prob, lp).len()
    }

    /// Registers an external branching candidate for the current node.
    pub fn add_extern_cand(&mut self, var: VarId) {
        if !self.extern_cands.contains(&var) {
            self.extern_cands.push(var);
        }
    }

    pub fn extern_cands(&self) -> &[VarId] {
        &self.extern_cands
    }

    pub fn n_extern_cands(&self) -> usize {
        self.extern_cands.len()
    }

    /// Clears the external candidates; called whenever the node changes or
    /// the relaxators are about to run again.
    pub fn clear_extern_cands(&mut self) {
        self.extern_cands.clear();
    }

    /// The pseudo branching candidates: every unfixed integer variable.
    pub fn pseudo_cands(&self, set: &Set, prob: &Prob) -> Vec<VarId> {
        prob.vars()
            .filter(|(_, var)| var.integral && !set.is_eq(var.lb, var.ub))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn n_pseudo_cands(&self, set: &Set, prob: &Prob) -> usize {
        self.pseudo_cands(set, prob).len()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_branchcand {
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
    fn fractional_integer_columns_are_lp_candidates() {
        let set = Set::default();
        let mut prob = Prob::new("test");
        let x = prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        let y = prob.add_var(Var::new("y", 1.0, 0.0, 10.0, false));
        let mut lp = Lp::new(Box::new(NeverCalled));
        for (i, id) in [x, y].into_iter().enumerate() {
            lp.add_col(id);
            prob.var_mut(id).col = Some(i);
        }
        prob.var_mut(x).lpsol = 2.5;
        prob.var_mut(y).lpsol = 3.5; // continuous: never a candidate

        let cands = Branchcand::new().lp_cands(&set, &prob, &lp);
        assert_eq!(1, cands.len());
        assert_eq!(x, cands[0].var);
        assert_eq!(0.5, cands[0].frac);
    }

    #[test]
    fn integral_values_are_no_candidates() {
        let set = Set::default();
        let mut prob = Prob::new("test");
        let x = prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        let mut lp = Lp::new(Box::new(NeverCalled));
        lp.add_col(x);
        prob.var_mut(x).col = Some(0);
        prob.var_mut(x).lpsol = 3.0;

        assert_eq!(0, Branchcand::new().n_lp_cands(&set, &prob, &lp));
    }

    #[test]
    fn pseudo_candidates_are_the_unfixed_integers() {
        let set = Set::default();
        let mut prob = Prob::new("test");
        prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        prob.add_var(Var::new("fixed", 1.0, 2.0, 2.0, true));
        prob.add_var(Var::new("cont", 1.0, 0.0, 10.0, false));

        let cands = Branchcand::new().pseudo_cands(&set, &prob);
        assert_eq!(vec![VarId(0)], cands);
    }

    #[test]
    fn extern_candidates_are_deduplicated_and_clearable() {
        let mut cand = Branchcand::new();
        cand.add_extern_cand(VarId(1));
        cand.add_extern_cand(VarId(1));
        assert_eq!(1, cand.n_extern_cands());
        cand.clear_extern_cands();
        assert_eq!(0, cand.n_extern_cands());
    }
}
