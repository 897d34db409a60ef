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

//! This module defines `Lp`, the engine-side wrapper around the external
//! simplex kernel. The wrapper owns the LP shape (columns, rows) and the
//! state machine the drivers reason about: `flushed` (no pending edits),
//! `solved` (flushed and evaluated), the solution status cache, the cutoff
//! bound mirror, the `resolvelperror` latch and the `installing` hint.

use crate::{
    LpCol, LpKernel, LpRow, LpSolstat, LpSolveReq, Prob, Result, Set, Stat, VarId,
};

/// Where a row of the LP relaxation came from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RowOrigin {
    /// The LP relaxation of an initial constraint
    ConsInitial,
    /// A cutting plane produced by a separator or an enforcement call
    Separation,
    /// A reusable cut taken from the global cut pool
    Pool,
}

/// A linear inequality `lhs <= coefs * x <= rhs` over problem variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    name: String,
    pub lhs: f64,
    pub rhs: f64,
    pub coefs: Vec<(VarId, f64)>,
    pub origin: RowOrigin,
    /// The depth of the node this row was created at; the row is only valid
    /// in that node's subtree and is unloaded when the focus leaves it
    pub depth: usize,
    /// Whether the row may be removed again once it became redundant
    pub removable: bool,
}

impl Row {
    pub fn new(name: impl Into<String>, lhs: f64, rhs: f64, coefs: Vec<(VarId, f64)>) -> Self {
        Row {
            name: name.into(),
            lhs,
            rhs,
            coefs,
            origin: RowOrigin::Separation,
            depth: 0,
            removable: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The row activity under the given variable values.
    pub fn activity(&self, value_of: impl Fn(VarId) -> f64) -> f64 {
        self.coefs.iter().map(|&(v, c)| c * value_of(v)).sum()
    }

    /// By how much the row is violated under the given values (0 if satisfied).
    pub fn violation(&self, value_of: impl Fn(VarId) -> f64) -> f64 {
        let act = self.activity(value_of);
        (self.lhs - act).max(act - self.rhs).max(0.0)
    }

    /// A cut with a single nonzero coefficient is really a bound change.
    pub fn single_coef(&self) -> Option<(VarId, f64)> {
        match self.coefs[..] {
            [(var, coef)] => Some((var, coef)),
            _ => None,
        }
    }

    /// A stable key for pool deduplication.
    pub fn hash_key(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut h = fxhash::FxHasher::default();
        self.lhs.to_bits().hash(&mut h);
        self.rhs.to_bits().hash(&mut h);
        for &(v, c) in &self.coefs {
            v.hash(&mut h);
            c.to_bits().hash(&mut h);
        }
        h.finish()
    }
}

/// The LP relaxation of the focus node.
pub struct Lp {
    kernel: Box<dyn LpKernel>,
    cols: Vec<VarId>,
    rows: Vec<Row>,
    flushed: bool,
    /// Valid only while `flushed` still holds from the last solve
    pub solved: bool,
    solstat: LpSolstat,
    objval: f64,
    rowduals: Vec<f64>,
    /// Mirror of the primal cutoff bound, handed to the kernel
    pub cutoffbound: f64,
    /// Whether the LP is a valid relaxation of the current subproblem
    pub isrelax: bool,
    /// Latched when a heuristic left the LP in an unusable state; cleared
    /// only by the node solver's recovery path
    pub resolvelperror: bool,
    /// Hint to the kernel that the surrounding cut loop is about to stall
    pub installing: bool,
}

impl Lp {
    pub fn new(kernel: Box<dyn LpKernel>) -> Self {
        Lp {
            kernel,
            cols: vec![],
            rows: vec![],
            flushed: true,
            solved: false,
            solstat: LpSolstat::NotSolved,
            objval: 0.0,
            rowduals: vec![],
            cutoffbound: f64::INFINITY,
            isrelax: true,
            resolvelperror: false,
            installing: false,
        }
    }

    #[inline]
    pub fn flushed(&self) -> bool {
        self.flushed
    }

    pub fn n_cols(&self) -> usize {
        self.cols.len()
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> &[VarId] {
        &self.cols
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Appends a column for the given variable. The caller (the pricing
    /// storage) is responsible for recording the column index on the
    /// variable itself.
    pub fn add_col(&mut self, var: VarId) -> usize {
        self.cols.push(var);
        self.flushed = false;
        self.solved = false;
        self.cols.len() - 1
    }

    /// Appends a row.
    pub fn add_row(&mut self, row: Row) -> usize {
        self.rows.push(row);
        self.flushed = false;
        self.solved = false;
        self.rows.len() - 1
    }

    /// Tells the LP that the bounds of one of its columns changed.
    pub fn notify_bound_change(&mut self) {
        self.flushed = false;
        self.solved = false;
    }

    /// Applies all pending edits. With the deferred-assembly kernel seam
    /// this amounts to validating the invariant `flushed => no pending
    /// edits` for the next solve.
    pub fn flush(&mut self) {
        self.flushed = true;
    }

    /// The status of the last solve, `NotSolved` if the shape changed since.
    pub fn solstat(&self) -> LpSolstat {
        if self.solved {
            self.solstat
        } else {
            LpSolstat::NotSolved
        }
    }

    /// The objective value of the last solve (infinite when infeasible).
    pub fn objval(&self) -> f64 {
        self.objval
    }

    /// The dual value of a row in the last solve, 0 when unavailable.
    pub fn row_dual(&self, row: usize) -> f64 {
        self.rowduals.get(row).copied().unwrap_or(0.0)
    }

    /// The reduced cost of a variable under the last solve's dual values.
    pub fn reduced_cost(&self, prob: &Prob, var: VarId) -> f64 {
        let mut red = prob.var(var).obj;
        for (r, row) in self.rows.iter().enumerate() {
            for &(v, c) in &row.coefs {
                if v == var {
                    red -= c * self.row_dual(r);
                }
            }
        }
        red
    }

    /// Updates the mirrored cutoff bound. A tighter bound may turn an
    /// optimal solve into an objective-limit one; a relaxed bound
    /// invalidates a previous objective-limit answer.
    pub fn set_cutoff_bound(&mut self, set: &Set, bound: f64) {
        let old = self.cutoffbound;
        self.cutoffbound = bound;
        if self.solved {
            if self.solstat == LpSolstat::Optimal && set.is_ge(self.objval, bound) {
                self.solstat = LpSolstat::ObjLimit;
            } else if self.solstat == LpSolstat::ObjLimit && bound > old {
                self.solved = false;
            }
        }
    }

    /// Permanently removes the rows the kernel reports redundant. Returns
    /// the number of removed rows; the LP must be re-solved afterwards.
    pub fn remove_redundant_rows(&mut self, prob: &Prob) -> usize {
        let (cols, rows) = self.assemble(prob);
        let mut redundant = self.kernel.redundant_rows(&cols, &rows);
        redundant.retain(|&r| r < self.rows.len() && self.rows[r].removable);
        if redundant.is_empty() {
            return 0;
        }
        redundant.sort_unstable();
        for &r in redundant.iter().rev() {
            self.rows.remove(r);
        }
        self.flushed = false;
        self.solved = false;
        redundant.len()
    }

    /// Clears the whole LP shape; used when a restart abandons the search
    /// tree. The kernel keeps living, only its warm start data is stale.
    pub fn reset(&mut self) {
        self.cols.clear();
        self.rows.clear();
        self.flushed = true;
        self.solved = false;
        self.solstat = LpSolstat::NotSolved;
        self.rowduals.clear();
        self.isrelax = true;
        self.resolvelperror = false;
        self.installing = false;
    }

    /// Unloads every row that is only valid below the given depth. Called
    /// when the focus path changes.
    pub fn remove_rows_below(&mut self, depth: usize) {
        let before = self.rows.len();
        self.rows.retain(|row| row.depth <= depth);
        if self.rows.len() != before {
            self.flushed = false;
            self.solved = false;
        }
    }

    fn assemble(&self, prob: &Prob) -> (Vec<LpCol>, Vec<LpRow>) {
        let cols = self
            .cols
            .iter()
            .map(|&v| {
                let var = prob.var(v);
                LpCol {
                    var: v,
                    obj: var.obj,
                    lb: var.lb,
                    ub: var.ub,
                }
            })
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| LpRow {
                lhs: row.lhs,
                rhs: row.rhs,
                coefs: row
                    .coefs
                    .iter()
                    .filter_map(|&(v, c)| prob.var(v).col.map(|idx| (idx, c)))
                    .collect(),
            })
            .collect();
        (cols, rows)
    }

    /// Flushes pending edits, hands the LP to the kernel and evaluates the
    /// outcome. Returns `true` when the kernel ran into numerical troubles;
    /// the caller decides whether that is recoverable.
    pub fn solve_and_eval(
        &mut self,
        set: &Set,
        stat: &mut Stat,
        prob: &mut Prob,
        iterlimit: Option<u64>,
        use_dual: bool,
        from_scratch: bool,
    ) -> Result<bool> {
        if self.flushed && self.solved {
            return Ok(false);
        }
        self.flush();

        let (cols, rows) = self.assemble(prob);
        let req = LpSolveReq {
            iterlimit,
            use_dual,
            from_scratch,
            cutoffbound: self.cutoffbound,
            installing: self.installing,
        };

        stat.nlps += 1;
        stat.lpcount += 1;

        match self.kernel.solve(&cols, &rows, &req) {
            Ok(sol) => {
                stat.nlpiterations += sol.iterations;
                self.solstat = sol.solstat;
                self.objval = match sol.solstat {
                    LpSolstat::Infeasible => set.infinity(),
                    LpSolstat::UnboundedRay => -set.infinity(),
                    _ => sol.objval,
                };
                for (idx, &v) in self.cols.iter().enumerate() {
                    let var = prob.var_mut(v);
                    var.lpsol = sol.colvals.get(idx).copied().unwrap_or(var.best_bound());
                }
                self.rowduals = sol.rowduals;
                self.solved = true;
                log::debug!(
                    "lp {} solved: status {:?}, obj {}",
                    stat.nlps,
                    self.solstat,
                    self.objval
                );
                Ok(false)
            }
            Err(err) => {
                self.solved = false;
                self.solstat = LpSolstat::Error;
                log::debug!("lp {} failed: {}", stat.nlps, err);
                Ok(true)
            }
        }
    }
}

impl std::fmt::Debug for Lp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lp")
            .field("ncols", &self.cols.len())
            .field("nrows", &self.rows.len())
            .field("flushed", &self.flushed)
            .field("solved", &self.solved)
            .field("solstat", &self.solstat)
            .field("objval", &self.objval)
            .finish()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_lp {
    use super::*;
    use crate::{LpError, LpSolution, Var};

    /// A kernel that replays a scripted sequence of answers.
    struct Scripted {
        answers: Vec<std::result::Result<LpSolution, LpError>>,
        next: usize,
    }
    impl Scripted {
        fn new(answers: Vec<std::result::Result<LpSolution, LpError>>) -> Self {
            Scripted { answers, next: 0 }
        }
    }
    impl LpKernel for Scripted {
        fn solve(
            &mut self,
            cols: &[LpCol],
            _rows: &[LpRow],
            _req: &LpSolveReq,
        ) -> std::result::Result<LpSolution, LpError> {
            let mut ans = self.answers[self.next.min(self.answers.len() - 1)].clone();
            self.next += 1;
            if let Ok(sol) = &mut ans {
                sol.colvals.resize(cols.len(), 0.0);
            }
            ans
        }
    }

    fn optimal(objval: f64) -> std::result::Result<LpSolution, LpError> {
        Ok(LpSolution {
            solstat: LpSolstat::Optimal,
            objval,
            colvals: vec![],
            rowduals: vec![],
            iterations: 3,
        })
    }

    fn one_var_prob() -> Prob {
        let mut prob = Prob::new("test");
        let x = prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        prob.var_mut(x).col = Some(0);
        prob.ncolvars = 1;
        prob
    }

    #[test]
    fn fresh_lp_is_flushed_but_not_solved() {
        let lp = Lp::new(Box::new(Scripted::new(vec![optimal(0.0)])));
        assert!(lp.flushed());
        assert!(!lp.solved);
        assert_eq!(LpSolstat::NotSolved, lp.solstat());
    }

    #[test]
    fn solve_and_eval_flushes_and_solves() {
        let set = Set::default();
        let mut stat = Stat::new();
        let mut prob = one_var_prob();
        let mut lp = Lp::new(Box::new(Scripted::new(vec![optimal(5.0)])));
        lp.add_col(VarId(0));

        let lperror = lp.solve_and_eval(&set, &mut stat, &mut prob, None, false, false);
        assert!(!lperror.unwrap());
        assert!(lp.flushed() && lp.solved);
        assert_eq!(LpSolstat::Optimal, lp.solstat());
        assert_eq!(5.0, lp.objval());
        assert_eq!(1, stat.nlps);
        assert_eq!(3, stat.nlpiterations);
    }

    #[test]
    fn a_kernel_error_leaves_the_lp_unsolved() {
        let set = Set::default();
        let mut stat = Stat::new();
        let mut prob = one_var_prob();
        let mut lp = Lp::new(Box::new(Scripted::new(vec![Err(LpError(
            "singular basis".into(),
        ))])));
        lp.add_col(VarId(0));

        let lperror = lp.solve_and_eval(&set, &mut stat, &mut prob, None, false, false);
        assert!(lperror.unwrap());
        assert!(!lp.solved);
        assert_eq!(LpSolstat::NotSolved, lp.solstat());
    }

    #[test]
    fn bound_change_invalidates_the_solve() {
        let set = Set::default();
        let mut stat = Stat::new();
        let mut prob = one_var_prob();
        let mut lp = Lp::new(Box::new(Scripted::new(vec![optimal(5.0), optimal(6.0)])));
        lp.add_col(VarId(0));
        lp.solve_and_eval(&set, &mut stat, &mut prob, None, false, false)
            .unwrap();
        assert!(lp.solved);

        lp.notify_bound_change();
        assert!(!lp.flushed());
        assert_eq!(LpSolstat::NotSolved, lp.solstat());

        lp.solve_and_eval(&set, &mut stat, &mut prob, None, true, false)
            .unwrap();
        assert_eq!(6.0, lp.objval());
        assert_eq!(2, stat.nlps);
    }

    #[test]
    fn tightening_the_cutoff_bound_turns_optimal_into_objlimit() {
        let set = Set::default();
        let mut stat = Stat::new();
        let mut prob = one_var_prob();
        let mut lp = Lp::new(Box::new(Scripted::new(vec![optimal(5.0)])));
        lp.add_col(VarId(0));
        lp.solve_and_eval(&set, &mut stat, &mut prob, None, false, false)
            .unwrap();

        lp.set_cutoff_bound(&set, 4.0);
        assert_eq!(LpSolstat::ObjLimit, lp.solstat());
    }

    #[test]
    fn local_rows_are_unloaded_when_the_path_retracts() {
        let mut lp = Lp::new(Box::new(Scripted::new(vec![optimal(0.0)])));
        let mut deep = Row::new("deep", 0.0, 1.0, vec![(VarId(0), 1.0)]);
        deep.depth = 3;
        lp.add_row(Row::new("root", 0.0, 1.0, vec![(VarId(0), 1.0)]));
        lp.add_row(deep);
        assert_eq!(2, lp.n_rows());

        lp.remove_rows_below(1);
        assert_eq!(1, lp.n_rows());
        assert_eq!("root", lp.rows()[0].name());
    }

    #[test]
    fn single_coefficient_rows_are_bound_changes() {
        let row = Row::new("bc", f64::NEG_INFINITY, 4.0, vec![(VarId(2), 2.0)]);
        assert_eq!(Some((VarId(2), 2.0)), row.single_coef());
        let row = Row::new("real", 0.0, 4.0, vec![(VarId(0), 1.0), (VarId(1), 1.0)]);
        assert_eq!(None, row.single_coef());
    }
}
