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

//! This module (and its submodules) implement the drivers of the node
//! processing engine. The [`Solver`] owns the whole engine state and the
//! plug-in registries; each driver is a method operating on that state. The
//! [`SolvingData`] view is what the plug-ins receive: everything except the
//! registries themselves, so a plug-in can never re-enter a driver.

use crate::{
    BdChg, BdChgOrigin, BoundDir, Branchcand, BranchDir, BranchRule, Conflict, ConsHdlr, Cutpool,
    Error, EventFilter, EventListener, Heuristic, Lp, LpKernel, NodeId, NodeSelector, Pricestore,
    Pricer, Primal, Prob, Propagator, Relaxator, Result, Row, Separator, Sepastore, Set, Sol,
    SolOrigin, Stat, Status, Tree, Var, VarId, LPSOLVAL_UNKNOWN,
};

mod stop;
mod heur;
mod propagate;
mod pseudocost;
mod lpsolve;
mod separate;
mod price;
mod pricecut;
mod relax;
mod enforce;
mod node;
mod driver;

pub use driver::Outcome;

/// The view of the engine state a plug-in works with: configuration,
/// statistics, problem, tree, LP and the stores. Mutations that must respect
/// engine invariants (bound changes, branchings, cut and solution
/// submission) go through the methods of this type rather than the raw
/// fields.
pub struct SolvingData<'a> {
    pub set: &'a Set,
    pub stat: &'a mut Stat,
    pub prob: &'a mut Prob,
    pub tree: &'a mut Tree,
    pub lp: &'a mut Lp,
    pub primal: &'a mut Primal,
    pub pricestore: &'a mut Pricestore,
    pub sepastore: &'a mut Sepastore,
    pub cutpool: &'a mut Cutpool,
    pub branchcand: &'a mut Branchcand,
    pub conflict: &'a mut Conflict,
}

/// The outcome of a bound tightening request.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Tightened {
    /// The new bound empties the domain: the node can be cut off
    Cutoff,
    /// The bound was tightened and recorded at the focus node
    Tightened,
    /// The request did not improve on the current bound
    Unchanged,
}

impl SolvingData<'_> {
    /// Tightens the local lower bound of a variable, recording the change at
    /// the focus node. Root-level changes become global.
    pub fn tighten_lb(&mut self, var: VarId, newbound: f64, origin: BdChgOrigin) -> Tightened {
        self.tighten(var, BoundDir::Lower, newbound, origin)
    }

    /// Tightens the local upper bound of a variable, recording the change at
    /// the focus node. Root-level changes become global.
    pub fn tighten_ub(&mut self, var: VarId, newbound: f64, origin: BdChgOrigin) -> Tightened {
        self.tighten(var, BoundDir::Upper, newbound, origin)
    }

    fn tighten(
        &mut self,
        var: VarId,
        dir: BoundDir,
        newbound: f64,
        origin: BdChgOrigin,
    ) -> Tightened {
        let set = self.set;
        let v = self.prob.var(var);
        let newbound = if v.integral {
            match dir {
                BoundDir::Lower => set.feas_ceil(newbound),
                BoundDir::Upper => set.feas_floor(newbound),
            }
        } else {
            newbound
        };
        let (old, improves, infeasible) = match dir {
            BoundDir::Lower => (v.lb, set.is_gt(newbound, v.lb), set.is_gt(newbound, v.ub)),
            BoundDir::Upper => (v.ub, set.is_lt(newbound, v.ub), set.is_lt(newbound, v.lb)),
        };
        if infeasible {
            return Tightened::Cutoff;
        }
        if !improves {
            return Tightened::Unchanged;
        }

        self.tree.record_bound_change(BdChg {
            var,
            dir,
            oldbound: old,
            newbound,
            origin,
        });
        let at_root = self.tree.focus_depth() == 0;
        let v = self.prob.var_mut(var);
        match dir {
            BoundDir::Lower => v.lb = newbound,
            BoundDir::Upper => v.ub = newbound,
        }
        if at_root {
            match dir {
                BoundDir::Lower => v.glb = newbound,
                BoundDir::Upper => v.gub = newbound,
            }
            if v.integral && self.set.is_eq(v.lb, v.ub) {
                self.stat.nrootintfixingsrun += 1;
            }
        }
        if v.col.is_some() {
            self.lp.notify_bound_change();
        }
        self.stat.nboundchgs += 1;
        self.stat.domchgcount += 1;
        Tightened::Tightened
    }

    /// Submits a cut to the separation storage. The cut is valid for the
    /// subtree of the focus node.
    pub fn add_cut(&mut self, mut row: Row) {
        row.depth = self.tree.focus_depth();
        self.sepastore.add_cut(row);
    }

    /// Stores a globally valid cut in the reusable cut pool.
    pub fn add_pool_cut(&mut self, mut row: Row) {
        row.depth = 0;
        self.cutpool.add_cut(row);
    }

    /// Submits a candidate primal solution. The engine checks it against the
    /// constraint handlers before it may become the incumbent.
    pub fn submit_sol(&mut self, vals: Vec<f64>, origin: SolOrigin) {
        let sol = Sol::new(self.prob, vals, origin);
        self.primal.submit_candidate(sol);
    }

    /// Creates a pricer-generated variable and submits its column with the
    /// given score.
    pub fn add_priced_var(&mut self, var: Var, score: f64) -> VarId {
        let id = self.prob.add_var(var.priced());
        self.pricestore.add_var(id, score);
        id
    }

    /// Temporarily tightens a bound on behalf of a pricer; the price loop
    /// rolls it back after the round.
    pub fn price_tighten_bound(&mut self, var: VarId, dir: BoundDir, newbound: f64) {
        self.pricestore.add_bdviolvar(self.prob, var, dir, newbound);
        if self.prob.var(var).col.is_some() {
            self.lp.notify_bound_change();
        }
    }

    /// Splits the focus node on the given variable around the given value.
    /// A fractional value creates the two children `x <= floor(val)` and
    /// `x >= ceil(val)`; an integral value creates up to three (below, equal
    /// and above). Returns the created children.
    pub fn branch_var(&mut self, var: VarId, val: f64) -> Result<Vec<NodeId>> {
        let v = self.prob.var(var);
        let (lb, ub) = (v.lb, v.ub);
        let lpsolval = if v.col.is_some() {
            v.lp_sol()
        } else {
            LPSOLVAL_UNKNOWN
        };
        let base = self.tree.focus_lower();
        let mut children = vec![];
        let mut spawn = |data: &mut SolvingData,
                         target_lb: Option<f64>,
                         target_ub: Option<f64>,
                         delta: f64| {
            let est = base + data.prob.var(var).pseudocost(delta);
            let child = data.tree.create_child(data.stat, est);
            if let Some(bound) = target_ub {
                if bound < ub {
                    data.tree.record_child_bound_change(
                        child,
                        BdChg {
                            var,
                            dir: BoundDir::Upper,
                            oldbound: ub,
                            newbound: bound,
                            origin: BdChgOrigin::Branching { lpsolval },
                        },
                    );
                }
            }
            if let Some(bound) = target_lb {
                if bound > lb {
                    data.tree.record_child_bound_change(
                        child,
                        BdChg {
                            var,
                            dir: BoundDir::Lower,
                            oldbound: lb,
                            newbound: bound,
                            origin: BdChgOrigin::Branching { lpsolval },
                        },
                    );
                }
            }
            child
        };

        if self.set.is_integral(val) {
            let mid = self.set.feas_floor(val);
            if self.set.is_ge(mid - 1.0, lb) {
                children.push(spawn(self, None, Some(mid - 1.0), mid - 1.0 - val));
            }
            children.push(spawn(self, Some(mid), Some(mid), 0.0));
            if self.set.is_le(mid + 1.0, ub) {
                children.push(spawn(self, Some(mid + 1.0), None, mid + 1.0 - val));
            }
        } else {
            let down = self.set.feas_floor(val);
            let up = self.set.feas_ceil(val);
            children.push(spawn(self, None, Some(down), down - val));
            children.push(spawn(self, Some(up), None, up - val));
        }
        self.stat.lastbranchdir = BranchDir::Up;
        self.stat.lastbranchvar = Some(var);
        log::debug!(
            "branched on <{}> at {} into {} children",
            self.prob.var(var).name(),
            val,
            children.len()
        );
        Ok(children)
    }
}

/// Builds the [`SolvingData`] view from the solver's fields; the split
/// borrow keeps the plug-in registries accessible next to it.
macro_rules! data {
    ($s:expr) => {
        SolvingData {
            set: &$s.set,
            stat: &mut $s.stat,
            prob: &mut $s.prob,
            tree: &mut $s.tree,
            lp: &mut $s.lp,
            primal: &mut $s.primal,
            pricestore: &mut $s.pricestore,
            sepastore: &mut $s.sepastore,
            cutpool: &mut $s.cutpool,
            branchcand: &mut $s.branchcand,
            conflict: &mut $s.conflict,
        }
    };
}
pub(crate) use data;

/// The node processing engine. Construct it with a transformed problem, a
/// configuration and an LP kernel, register your plug-ins, and call
/// [`Solver::solve`].
pub struct Solver {
    pub(crate) set: Set,
    pub(crate) stat: Stat,
    pub(crate) prob: Prob,
    pub(crate) tree: Tree,
    pub(crate) lp: Lp,
    pub(crate) primal: Primal,
    pub(crate) pricestore: Pricestore,
    pub(crate) sepastore: Sepastore,
    pub(crate) cutpool: Cutpool,
    pub(crate) branchcand: Branchcand,
    pub(crate) conflict: Conflict,
    pub(crate) plugins: crate::Plugins,
    pub(crate) events: EventFilter,
}

impl Solver {
    pub fn new(prob: Prob, set: Set, kernel: Box<dyn LpKernel>) -> Self {
        let tree = Tree::new(&set);
        let primal = Primal::new(&set, prob.objlim);
        Solver {
            stat: Stat::new(),
            tree,
            lp: Lp::new(kernel),
            primal,
            pricestore: Pricestore::new(),
            sepastore: Sepastore::new(),
            cutpool: Cutpool::new(),
            branchcand: Branchcand::new(),
            conflict: Conflict::new(),
            plugins: crate::Plugins::new(),
            events: EventFilter::new(),
            prob,
            set,
        }
    }

    // -- plug-in registration ------------------------------------------------

    pub fn add_propagator(&mut self, plugin: Box<dyn Propagator>) {
        self.plugins.add_propagator(plugin);
    }
    pub fn add_conshdlr(&mut self, plugin: Box<dyn ConsHdlr>) {
        self.plugins.add_conshdlr(plugin);
    }
    pub fn add_separator(&mut self, plugin: Box<dyn Separator>) {
        self.plugins.add_separator(plugin);
    }
    pub fn add_pricer(&mut self, plugin: Box<dyn Pricer>) {
        self.plugins.add_pricer(plugin);
    }
    pub fn add_relaxator(&mut self, plugin: Box<dyn Relaxator>) {
        self.plugins.add_relaxator(plugin);
    }
    pub fn add_heuristic(&mut self, plugin: Box<dyn Heuristic>) {
        self.plugins.add_heuristic(plugin);
    }
    pub fn add_branchrule(&mut self, plugin: Box<dyn BranchRule>) {
        self.plugins.add_branchrule(plugin);
    }
    pub fn set_nodesel(&mut self, plugin: Box<dyn NodeSelector>) {
        self.plugins.set_nodesel(plugin);
    }
    pub fn add_event_listener(&mut self, listener: Box<dyn EventListener>) {
        self.events.add_listener(listener);
    }

    // -- observers -----------------------------------------------------------

    pub fn set(&self) -> &Set {
        &self.set
    }

    /// Mutable access to the configuration, e.g. to change limits between
    /// two solve calls.
    pub fn set_mut(&mut self) -> &mut Set {
        &mut self.set
    }

    pub fn stat(&self) -> &Stat {
        &self.stat
    }

    pub fn prob(&self) -> &Prob {
        &self.prob
    }

    pub fn status(&self) -> Status {
        self.stat.status
    }

    pub fn best_solution(&self) -> Option<&Sol> {
        self.primal.best_sol()
    }

    pub fn best_objective(&self) -> Option<f64> {
        self.primal.best_sol().map(|s| s.obj)
    }

    /// The global dual bound.
    pub fn lowerbound(&self) -> f64 {
        self.tree.lowerbound(&self.set)
    }

    /// The best known primal bound.
    pub fn upperbound(&self) -> f64 {
        self.primal.upperbound
    }

    /// A handle the application can use to interrupt the solve.
    pub fn interrupt_handle(&self) -> crate::InterruptHandle {
        self.stat.interrupt_handle()
    }

    /// The relative optimality gap.
    pub fn gap(&self) -> f64 {
        let lower = self.lowerbound();
        let upper = self.upperbound();
        if self.set.is_infinity(upper) || self.set.is_infinity(-lower) {
            return self.set.infinity();
        }
        if self.set.is_eq(lower, upper) {
            0.0
        } else if self.set.is_zero(lower) || self.set.is_zero(upper) || lower * upper < 0.0 {
            self.set.infinity()
        } else {
            (upper - lower).abs() / lower.abs().min(upper.abs())
        }
    }

    /// A coarse estimate of the engine's memory footprint, in MB.
    pub(crate) fn mem_used_mb(&self) -> f64 {
        let lp_bytes = self.lp.n_rows() * 128 + self.lp.n_cols() * 64;
        let prob_bytes = self.prob.n_vars() * std::mem::size_of::<Var>();
        self.tree.estimate_mem_mb() + (lp_bytes + prob_bytes) as f64 / (1024.0 * 1024.0)
    }

    // -- solution checking ---------------------------------------------------

    /// Checks a candidate solution: global bounds, integrality, and every
    /// constraint handler's `check`.
    pub(crate) fn check_sol(&mut self, sol: &Sol) -> Result<bool> {
        for (id, var) in self.prob.vars() {
            let val = sol.vals.get(id.id()).copied().unwrap_or(var.best_bound());
            if val < var.glb - self.set.num_feastol || val > var.gub + self.set.num_feastol {
                return Ok(false);
            }
            if var.integral && !self.set.is_integral(val) {
                return Ok(false);
            }
        }
        for i in 0..self.plugins.conshdlrs.len() {
            if !self.plugins.conshdlrs[i].plugin.check(&self.prob, sol)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Checks and files all queued candidate solutions. Returns whether one
    /// of them became the new incumbent.
    pub(crate) fn try_candidate_sols(&mut self) -> Result<bool> {
        let mut foundbest = false;
        while self.primal.has_candidates() {
            for sol in self.primal.take_candidates() {
                if !self.check_sol(&sol)? {
                    continue;
                }
                foundbest |=
                    self.primal
                        .add_checked_sol(&self.set, &mut self.stat, &mut self.lp, sol);
            }
        }
        Ok(foundbest)
    }

    /// Raises the focus node's lower bound to the LP objective, provided the
    /// LP currently is a valid relaxation.
    pub(crate) fn update_focus_lower_from_lp(&mut self) {
        if self.lp.solved && self.lp.isrelax {
            let objval = self.lp.objval().min(self.set.infinity());
            self.tree.update_focus_lower(objval);
        }
    }

    /// Prints one node information line, gated by the verbosity level.
    pub(crate) fn display_line(&mut self, force: bool) {
        if self.set.disp_verblevel < crate::VerbLevel::Normal && !force {
            return;
        }
        let lower = self.lowerbound();
        let upper = self.upperbound();
        log::info!(
            "node {} | depth {} | open {} | lower {:.6} | upper {:.6} | gap {:.2}%",
            self.stat.nnodes,
            self.tree.focus_depth(),
            self.tree.n_open(),
            lower,
            upper,
            (self.gap() * 100.0).min(1e20),
        );
    }
}

impl Error {
    /// Shorthand for the protocol violation error.
    pub(crate) fn invalid_result(
        name: &str,
        context: &'static str,
        result: &'static str,
    ) -> Error {
        Error::InvalidResult {
            name: name.to_string(),
            context,
            result,
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
