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

//! The tree driver: the main solving loop selecting and focusing nodes,
//! dispatching them to the node solver, recording solutions and events,
//! and deciding on restarts and the final status.

use crate::{BranchResult, Event, HeurTiming, NodeId, Result, Solver, Status};

/// The outcome of a [`Solver::solve`] call: the final status and the best
/// objective value found, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub status: Status,
    pub best_obj: Option<f64>,
}

impl Solver {
    /// If feasible, adds the focus node's current solution (LP or pseudo)
    /// to the solution storage. In exact solving mode the solution is
    /// re-checked through the constraint handlers first.
    fn add_current_solution(&mut self) -> Result<()> {
        let sol = self.current_sol();
        if self.set.misc_exactsolve {
            if !self.check_sol(&sol)? {
                return Ok(());
            }
        }
        self.primal
            .add_checked_sol(&self.set, &mut self.stat, &mut self.lp, sol);
        Ok(())
    }

    /// The main solving loop. Returns whether the search should be
    /// restarted with the bounds accumulated at the root.
    pub fn solve_cip(&mut self) -> Result<bool> {
        self.plugins.sort();

        // check for an immediate restart (a restarted run may have been
        // aborted right away)
        let mut restartfac = self.set.presol_subrestartfac;
        if self.tree.focus_depth() == 0 {
            restartfac = restartfac.min(self.set.presol_restartfac);
        }
        let mut restart = self.restart_allowed(restartfac);

        // number of successful conflict analyses that triggers a restart
        let restartconfnum = if self.set.conf_restartnum > 0 {
            let mut num = self.set.conf_restartnum as f64;
            for _ in 0..self.stat.nconfrestarts {
                num *= self.set.conf_restartfac;
            }
            num
        } else {
            f64::MAX
        };
        debug_assert!(restartconfnum >= 0.0);

        self.stat.status = Status::Unknown;

        let mut nextnode: Option<NodeId> = None;
        let mut unbounded = false;

        while !self.is_stopped(true) && !restart {
            let mut foundsol = false;

            // select and focus the next node, skipping nodes that turned
            // out to lie in a cut off subtree
            let focusnode = loop {
                if nextnode.is_none() {
                    nextnode = self.plugins.nodesel.select(&mut self.tree)?;
                }
                let candidate = nextnode.take();
                let cutoff = self.tree.focus_node(
                    candidate,
                    &self.set,
                    &mut self.prob,
                    &mut self.lp,
                    self.primal.cutoffbound,
                );
                if !cutoff {
                    break candidate;
                }
                self.stat.ndelayedcutoffs += 1;
            };

            // no node left: optimization finished
            let Some(focusnode) = focusnode else {
                debug_assert_eq!(0, self.tree.n_open());
                break;
            };

            // update depth and node count statistics
            let depth = self.tree.node(focusnode).depth;
            self.stat.maxdepth = self.stat.maxdepth.max(depth);
            self.stat.maxtotaldepth = self.stat.maxtotaldepth.max(depth);
            self.stat.nnodes += 1;
            self.stat.ntotalnodes += 1;

            self.events.emit(Event::NodeFocused(focusnode))?;

            // solve the focus node
            let out = self.solve_node()?;
            debug_assert!(!out.cutoff || out.infeasible);
            unbounded |= out.unbounded;
            restart = out.restart;

            if !restart {
                if !out.infeasible {
                    // the node solution is feasible: store it
                    debug_assert!(!out.cutoff);
                    self.add_current_solution()?;
                    self.events.emit(Event::NodeFeasible(focusnode))?;
                } else if !out.unbounded {
                    if self.tree.n_children() == 0 {
                        // increase the cutoff counter of the last branching
                        // variable
                        if let Some(var) = self.stat.lastbranchvar {
                            let dir = self.stat.lastbranchdir;
                            self.prob.var_mut(var).increase_cutoff_sum(dir, 1.0);
                        }
                        self.events.emit(Event::NodeInfeasible(focusnode))?;
                    } else {
                        self.events.emit(Event::NodeBranched(focusnode))?;
                    }
                }

                // in exact solving mode the enforcement may have accepted a
                // solution that the exact check later rejected; the subtree
                // has to be investigated further by pseudo branching
                if !out.cutoff
                    && !out.unbounded
                    && self.tree.n_children() == 0
                    && self.tree.focus_lower() < self.primal.cutoffbound
                {
                    debug_assert!(self.set.misc_exactsolve);
                    loop {
                        let mut result = BranchResult::DidNotRun;
                        if self.branchcand.n_pseudo_cands(&self.set, &self.prob) == 0 {
                            if self.prob.ncontvars > 0 {
                                log::error!(
                                    "cannot branch on an all-fixed LP in exact solving mode"
                                );
                            }
                        } else {
                            result = self.branch_exec_pseudo(false)?;
                            debug_assert!(result != BranchResult::DidNotRun);
                        }
                        if result != BranchResult::ReducedDom {
                            break;
                        }
                    }
                }

                // preselect the node to process next, the primal heuristics
                // need to know whether we will be plunging
                nextnode = self.plugins.nodesel.select(&mut self.tree)?;

                // call the after-node heuristics, unless they already ran
                // inside the node solver
                let nnodes = self.tree.n_open();
                if !out.afternodeheur && (!out.cutoff || nnodes > 0) {
                    foundsol = self.primal_heuristics(HeurTiming::AFTER_NODE, nextnode)?;
                }

                // a new incumbent may have cut off the preselected node
                if nnodes != self.tree.n_open() || self.is_stopped(true) {
                    nextnode = None;
                }
            } else if !out.infeasible {
                // a restart interrupts the node, but its feasible solution
                // is kept
                self.add_current_solution()?;
            }

            // trigger a restart due to conflicts
            let nsuccessconflicts = self.conflict.n_success();
            if nsuccessconflicts as f64 >= restartconfnum
                && self.plugins.n_active_pricers() == 0
            {
                log::info!(
                    "(run {}, node {}) restarting after {} successful conflict analyses",
                    self.stat.nruns,
                    self.stat.nnodes,
                    nsuccessconflicts
                );
                restart = true;
                self.stat.nconfrestarts += 1;
            }

            // display a node information line
            self.display_line(depth == 0 && out.infeasible && !foundsol);

            log::debug!(
                "node {} processed: {} siblings, {} children, {} open",
                self.stat.nnodes,
                self.tree.siblings().len(),
                self.tree.n_children(),
                self.tree.n_open()
            );
        }

        log::debug!("solving finished (restart={})", restart);

        // if the focus node is the last one and its bound meets the cutoff
        // bound, drain it by refocusing nothing; otherwise the final status
        // would wrongly read as a gap limit
        if self.tree.focus().is_some()
            && self.tree.n_open() == 0
            && self
                .set
                .is_ge(self.tree.focus_lower(), self.primal.cutoffbound)
        {
            self.tree.focus_node(
                None,
                &self.set,
                &mut self.prob,
                &mut self.lp,
                self.primal.cutoffbound,
            );
        }

        // solved to completion: compute the final status
        if self.tree.n_open() == 0 && self.tree.focus().is_none() {
            restart = false;

            if unbounded {
                if self.primal.n_sols() > 0 {
                    self.stat.status = Status::Unbounded;
                } else {
                    self.stat.status = Status::InfOrUnbd;
                }
            } else if self.primal.n_sols() == 0
                || self
                    .set
                    .is_ge(self.primal.best_obj(&self.set), self.prob.objlim)
            {
                self.stat.status = Status::Infeasible;
            } else {
                self.stat.status = Status::Optimal;
            }
        }

        Ok(restart)
    }

    /// Abandons the current tree and prepares the next run: the bounds
    /// accumulated at the root become the new global bounds, the LP and the
    /// tree start from scratch, the primal solutions and global statistics
    /// survive.
    fn prepare_restart(&mut self) {
        log::info!(
            "(run {}) restarting search from the root",
            self.stat.nruns
        );
        // unwind the active path so every variable is back at root bounds
        self.tree.focus_node(
            None,
            &self.set,
            &mut self.prob,
            &mut self.lp,
            self.primal.cutoffbound,
        );
        for id in self.prob.var_ids().collect::<Vec<_>>() {
            let var = self.prob.var_mut(id);
            var.lb = var.glb;
            var.ub = var.gub;
            var.col = None;
        }
        self.prob.ncolvars = 0;
        self.lp.reset();
        self.tree = crate::Tree::new(&self.set);
        self.stat.prepare_restart(self.prob.n_vars());
        self.stat.userrestart = false;
    }

    /// Runs the branch-and-bound search to completion (or until a limit
    /// fires), restarting as often as the node solver requests it.
    pub fn solve(&mut self) -> Result<Outcome> {
        loop {
            let restart = self.solve_cip()?;
            if !restart {
                break;
            }
            self.prepare_restart();
        }
        Ok(Outcome {
            status: self.stat.status,
            best_obj: self.best_objective(),
        })
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

/// Unlike the rest of the library, the driver module is not unit tested in
/// depth here; the integration tests exercise complete solves against
/// scripted plug-ins and kernels. What is covered below is the bookkeeping
/// around the loop.
#[cfg(test)]
mod test_driver {
    use crate::*;

    struct Always(LpSolution);
    impl LpKernel for Always {
        fn solve(
            &mut self,
            cols: &[LpCol],
            _: &[LpRow],
            _: &LpSolveReq,
        ) -> std::result::Result<LpSolution, LpError> {
            let mut sol = self.0.clone();
            sol.colvals
                .resize(cols.len(), sol.colvals.first().copied().unwrap_or(0.0));
            Ok(sol)
        }
    }

    fn optimal(objval: f64, val: f64) -> LpSolution {
        LpSolution {
            solstat: LpSolstat::Optimal,
            objval,
            colvals: vec![val],
            rowduals: vec![],
            iterations: 1,
        }
    }

    struct Integrality;
    impl ConsHdlr for Integrality {
        fn name(&self) -> &str {
            "integrality"
        }
        fn enforce_lp(&mut self, data: &mut SolvingData, _: bool) -> Result<EnfoResult> {
            if data
                .branchcand
                .lp_cands(data.set, data.prob, data.lp)
                .is_empty()
            {
                Ok(EnfoResult::Feasible)
            } else {
                Ok(EnfoResult::Infeasible)
            }
        }
        fn enforce_pseudo(
            &mut self,
            _: &mut SolvingData,
            _: bool,
            _: bool,
            _: bool,
        ) -> Result<EnfoResult> {
            Ok(EnfoResult::Feasible)
        }
    }

    fn solver(lpsol: LpSolution) -> Solver {
        let mut prob = Prob::new("test");
        prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        let mut s = Solver::new(prob, Set::default(), Box::new(Always(lpsol)));
        s.add_conshdlr(Box::new(Integrality));
        s.add_branchrule(Box::new(MostFractionalBranching::new()));
        s
    }

    #[test]
    fn an_integral_root_lp_solves_the_problem_outright() {
        let mut s = solver(optimal(3.0, 3.0));
        let outcome = s.solve().unwrap();
        assert_eq!(Status::Optimal, outcome.status);
        assert_eq!(Some(3.0), outcome.best_obj);
        assert_eq!(1, s.stat().nnodes);
    }

    #[test]
    fn node_events_are_emitted_in_order() {
        use std::cell::RefCell;
        use std::rc::Rc;
        struct Recorder(Rc<RefCell<Vec<Event>>>);
        impl EventListener for Recorder {
            fn notify(&mut self, event: &Event) -> Result<()> {
                self.0.borrow_mut().push(*event);
                Ok(())
            }
        }
        let seen = Rc::new(RefCell::new(vec![]));
        let mut s = solver(optimal(3.0, 3.0));
        s.add_event_listener(Box::new(Recorder(Rc::clone(&seen))));

        s.solve().unwrap();
        let seen = seen.borrow();
        assert!(matches!(seen[0], Event::NodeFocused(_)));
        assert!(seen.iter().any(|e| matches!(e, Event::FirstLpSolved(_))));
        // the root LP shortcut stores the solution and bounds the root out,
        // so the node closes as infeasible with the incumbent already set
        assert!(seen
            .iter()
            .any(|e| matches!(e, Event::NodeFeasible(_) | Event::NodeInfeasible(_))));
    }

    #[test]
    fn the_node_limit_reports_its_status() {
        let mut s = solver(optimal(2.5, 2.5));
        s.set_mut().change_limit_nodes(0);
        let outcome = s.solve().unwrap();
        assert_eq!(Status::NodeLimit, outcome.status);
    }
}
