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

//! This module provides the stock branching rule.

use crate::{BranchResult, BranchRule, Result, SolvingData};

/// Branches on the integer variable whose LP value is the most fractional
/// (closest to one half); on pseudo solutions it takes the first unfixed
/// integer variable. The branching records the LP solution value with the
/// bound changes it creates, so the pseudo-cost updater can attribute the
/// dual gains later on.
#[derive(Debug, Default, Copy, Clone)]
pub struct MostFractionalBranching;

impl MostFractionalBranching {
    pub fn new() -> Self {
        MostFractionalBranching
    }
}

impl BranchRule for MostFractionalBranching {
    fn name(&self) -> &str {
        "mostfractional"
    }

    fn execute_lp(&mut self, data: &mut SolvingData, _allow_addcons: bool) -> Result<BranchResult> {
        let cands = data.branchcand.lp_cands(data.set, data.prob, data.lp);
        let Some(best) = cands.iter().max_by(|a, b| {
            let fa = a.frac.min(1.0 - a.frac);
            let fb = b.frac.min(1.0 - b.frac);
            fa.total_cmp(&fb)
        }) else {
            return Ok(BranchResult::DidNotRun);
        };
        data.branch_var(best.var, best.val)?;
        Ok(BranchResult::Branched)
    }

    fn execute_pseudo(
        &mut self,
        data: &mut SolvingData,
        _allow_addcons: bool,
    ) -> Result<BranchResult> {
        let cands = data.branchcand.pseudo_cands(data.set, data.prob);
        let Some(&var) = cands.first() else {
            return Ok(BranchResult::DidNotRun);
        };
        let v = data.prob.var(var);
        let val = v.best_bound().clamp(v.lb, v.ub);
        data.branch_var(var, val)?;
        Ok(BranchResult::Branched)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_branching {
    // the rule is exercised end-to-end through the solver tests; what is
    // covered here is only the candidate selection
    use super::*;
    use crate::LpCand;
    use crate::VarId;

    #[test]
    fn the_most_fractional_candidate_wins() {
        let cands = [
            LpCand {
                var: VarId(0),
                val: 1.1,
                frac: 0.1,
            },
            LpCand {
                var: VarId(1),
                val: 3.5,
                frac: 0.5,
            },
            LpCand {
                var: VarId(2),
                val: 0.8,
                frac: 0.8,
            },
        ];
        let best = cands
            .iter()
            .max_by(|a, b| {
                let fa = a.frac.min(1.0 - a.frac);
                let fb = b.frac.min(1.0 - b.frac);
                fa.total_cmp(&fb)
            })
            .unwrap();
        assert_eq!(VarId(1), best.var);
        let _ = MostFractionalBranching::new();
    }
}
