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

//! The node solver: the outer fixed point driving one focus node through
//! propagate -> relax -> LP (price and cut) -> enforce -> branch, with
//! bounding interleaved after every phase, LP-error recovery by downgrading
//! to a pseudo node, and the restart checks.

use super::pricecut::PriceCut;
use super::{data, SolvingData};
use crate::{
    BranchResult, ConflictChannel, Error, HeurTiming, LpSolstat, Result, Sol, SolOrigin, Solver,
};

/// Maximal number of LP numerical failures tolerated per node.
const MAXNLPERRORS: u32 = 10;

/// The outcome of solving one focus node.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NodeOutcome {
    pub cutoff: bool,
    pub unbounded: bool,
    pub infeasible: bool,
    pub restart: bool,
    /// The after-node heuristics already ran inside the node solver
    pub afternodeheur: bool,
}

impl Solver {
    /// Updates the focus lower bound with the pseudo objective value and
    /// cuts the node off by bounding; a pseudo objective crossing the bound
    /// additionally triggers pseudo conflict analysis.
    pub(crate) fn apply_bounding(&mut self, cutoff: &mut bool) -> Result<()> {
        if *cutoff {
            return Ok(());
        }
        let pseudoobjval = self.prob.pseudo_objval(&self.set);
        self.tree.update_focus_lower(pseudoobjval);

        let lower = self.tree.focus_lower();
        let cutoffbound = self.primal.cutoffbound;
        let bounded_out = if self.set.misc_exactsolve {
            lower >= cutoffbound
        } else {
            self.set.is_ge(lower, cutoffbound)
        };
        if bounded_out {
            log::debug!(
                "node is cut off by bounding (lower={}, upper={})",
                lower,
                cutoffbound
            );
            self.tree.update_focus_lower(self.set.infinity());
            *cutoff = true;

            // the pseudo objective itself crossed the bound: the cost bound
            // can be turned into conflict constraints
            if pseudoobjval >= cutoffbound && !self.set.is_infinity(-pseudoobjval) {
                self.conflict.analyze(ConflictChannel::Pseudo, &self.tree);
            }
        }
        Ok(())
    }

    /// Applies the cuts waiting in the separation storage, or clears them if
    /// the node is already cut off.
    pub(crate) fn apply_cuts(
        &mut self,
        root: bool,
        cutoff: &mut bool,
        propagateagain: &mut bool,
        solvelpagain: &mut bool,
    ) -> Result<()> {
        if *cutoff {
            // the cuts are of no use: the node is infeasible anyway
            self.sepastore.clear_cuts();
        } else if self.sepastore.n_cuts() > 0 {
            let olddomchgcount = self.stat.domchgcount;
            *cutoff |= self.apply_sepastore_cuts(root)?;
            *propagateagain |= self.stat.domchgcount != olddomchgcount;
            *solvelpagain = true;
        }
        Ok(())
    }

    /// Updates the cutoff, propagate-again and relax-again flags of the
    /// current solving loop.
    pub(crate) fn update_loop_status(
        &mut self,
        depth: usize,
        cutoff: &mut bool,
        propagateagain: &mut bool,
        solverelaxagain: &mut bool,
    ) {
        // check if the path was cut off
        *cutoff |= self.tree.cutoffdepth <= depth;

        if self.tree.n_children() == 0 {
            *propagateagain |= self.tree.focus_needs_reprop();
            *solverelaxagain |= self.relaxs_unsolved();
        } else {
            // branching was performed: no further loop iteration
            *propagateagain = false;
            *solverelaxagain = false;
        }
    }

    /// The node's current solution: the LP solution on an LP node, the
    /// pseudo solution otherwise.
    pub(crate) fn current_sol(&self) -> Sol {
        let haslp = self.tree.focushaslp;
        let vals = self
            .prob
            .vars()
            .map(|(_, v)| if haslp { v.lp_sol() } else { v.best_bound() })
            .collect();
        let origin = if haslp {
            SolOrigin::Lp
        } else {
            SolOrigin::Pseudo
        };
        Sol::new(&self.prob, vals, origin)
    }

    // -- branching dispatch ---------------------------------------------------

    /// Lets the branching rules split the node on the LP solution.
    pub(crate) fn branch_exec_lp(&mut self, allow_addcons: bool) -> Result<BranchResult> {
        let mut result = BranchResult::DidNotRun;
        for i in self.plugins.branch_order() {
            if result != BranchResult::DidNotRun {
                break;
            }
            let mut data = data!(self);
            result = self.plugins.branchrules[i].execute_lp(&mut data, allow_addcons)?;
        }
        Ok(result)
    }

    /// Lets the branching rules split the node on the external candidates.
    pub(crate) fn branch_exec_extern(&mut self, allow_addcons: bool) -> Result<BranchResult> {
        let mut result = BranchResult::DidNotRun;
        for i in self.plugins.branch_order() {
            if result != BranchResult::DidNotRun {
                break;
            }
            let mut data = data!(self);
            result = self.plugins.branchrules[i].execute_extern(&mut data, allow_addcons)?;
        }
        Ok(result)
    }

    /// Lets the branching rules split the node on the pseudo solution.
    pub(crate) fn branch_exec_pseudo(&mut self, allow_addcons: bool) -> Result<BranchResult> {
        let mut result = BranchResult::DidNotRun;
        for i in self.plugins.branch_order() {
            if result != BranchResult::DidNotRun {
                break;
            }
            let mut data = data!(self);
            result = self.plugins.branchrules[i].execute_pseudo(&mut data, allow_addcons)?;
        }
        Ok(result)
    }

    // -- the LP part of a node ------------------------------------------------

    /// Solves the focus node's LP: initial LP (with the root feasibility
    /// shortcut), then the price-and-cut loop, then the objective-limit
    /// retry for aborted pricing.
    pub(crate) fn solve_node_lp(&mut self, initiallpsolved: bool) -> Result<PriceCut> {
        let nlps = self.stat.nlps;
        let nlpiterations = self.stat.nlpiterations;
        let mut out = PriceCut::default();

        if !initiallpsolved {
            // load and solve the initial LP of the node
            let (cutoff, lperror) = self.solve_node_initial_lp()?;
            out.cutoff = cutoff;
            out.lperror = lperror;
            log::debug!(
                "price-and-cut loop: initial LP status {:?}, obj {}",
                self.lp.solstat(),
                self.lp.objval()
            );

            self.stat.ninitlps += self.stat.nlps - nlps;
            self.stat.ninitlpiterations += self.stat.nlpiterations - nlpiterations;

            // at the root we try the initial LP solution right away, to
            // avoid the expensive setup of separator data structures on an
            // already feasible instance; skip it when the root solve was
            // aborted, the solution data would be stale
            if self.tree.focus_depth() == 0
                && !out.cutoff
                && !out.lperror
                && matches!(
                    self.lp.solstat(),
                    LpSolstat::Optimal | LpSolstat::UnboundedRay
                )
                && !self.is_stopped(false)
            {
                let sol = self.current_sol();
                let stored = if self.check_sol(&sol)? {
                    self.primal
                        .add_checked_sol(&self.set, &mut self.stat, &mut self.lp, sol)
                } else {
                    false
                };
                if stored && self.prob.all_cols_in_lp() {
                    log::debug!("root node initial LP feasible: cut off the root node");
                    self.update_focus_lower_from_lp();
                    self.apply_bounding(&mut out.cutoff)?;
                    debug_assert!(out.cutoff);
                }
                if self.lp.solstat() == LpSolstat::UnboundedRay {
                    out.unbounded = true;
                }
            }
        }
        debug_assert_eq!(0, self.sepastore.n_cuts());

        if !out.cutoff && !out.lperror {
            let pc = self.price_and_cut_loop(initiallpsolved)?;
            out.cutoff |= pc.cutoff;
            out.unbounded |= pc.unbounded;
            out.lperror = pc.lperror;
            out.pricingaborted = pc.pricingaborted;
        }

        // if pricing was aborted and the LP stopped at the objective limit,
        // the LP objective is no valid bound for the subtree; re-solve once
        // with the cutoff bound disabled
        if out.pricingaborted && self.lp.solstat() == LpSolstat::ObjLimit && !out.cutoff {
            let tmpcutoff = self.lp.cutoffbound;
            self.lp.cutoffbound = f64::INFINITY;
            self.lp.solved = false;

            out.lperror |= self.lp.solve_and_eval(
                &self.set,
                &mut self.stat,
                &mut self.prob,
                None,
                false,
                false,
            )?;
            self.lp.cutoffbound = tmpcutoff;
            log::debug!(
                "re-optimized LP without cutoff bound: status {:?}",
                self.lp.solstat()
            );

            if self.lp.solstat() == LpSolstat::Infeasible {
                out.cutoff = true;
            }
        }

        self.stat.nnodelps += self.stat.nlps - nlps;
        self.stat.nnodelpiterations += self.stat.nlpiterations - nlpiterations;
        if self.tree.focus_depth() == 0 {
            self.stat.nrootlpiterations += self.stat.nlpiterations - nlpiterations;
        }

        Ok(out)
    }

    // -- the restart gates ----------------------------------------------------

    /// The shared gating of the immediate and final restart decisions: the
    /// restart budget must allow it, no pricer may be active, and either the
    /// user asked for it or enough root integer fixings accumulated.
    pub(crate) fn restart_allowed(&self, restartfac: f64) -> bool {
        (self.set.presol_maxrestarts == -1
            || self.stat.nruns <= self.set.presol_maxrestarts as u32)
            && self.plugins.n_active_pricers() == 0
            && (self.stat.userrestart
                || (self.stat.nrootintfixingsrun as f64
                    > restartfac * (self.prob.n_vars() - self.prob.ncontvars) as f64
                    && (self.stat.nruns == 1
                        || self.prob.n_vars() as f64
                            <= (1.0 - self.set.presol_restartminred)
                                * self.stat.prevrunnvars as f64)))
    }

    // -- the outer fixed point ------------------------------------------------

    /// Solves the focus node.
    pub(crate) fn solve_node(&mut self) -> Result<NodeOutcome> {
        let mut out = NodeOutcome::default();
        let focusnode = self.tree.focus_id();
        let actdepth = self.tree.node(focusnode).depth;
        let mut pricingaborted = false;

        debug_assert_eq!(0, self.sepastore.n_cuts());
        debug_assert_eq!(0, self.conflict.n_conflicts());

        // any relaxation data of the previous node is stale here
        self.mark_relaxs_unsolved();
        self.branchcand.clear_extern_cands();

        log::debug!(
            "processing node {} in depth {}",
            self.stat.nnodes,
            actdepth
        );

        // check if we want to solve the LP at this node:
        // - the LP solve depth and frequency must demand it
        // - the root LP is solved whenever the frequency is 0
        // - a node that the pseudo objective bounds out anyway gets none
        let pseudoobjval = self.prob.pseudo_objval(&self.set);
        let mut focusnodehaslp =
            self.set.lp_solvedepth == -1 || actdepth as i32 <= self.set.lp_solvedepth;
        focusnodehaslp = focusnodehaslp
            && self.set.lp_solvefreq >= 1
            && actdepth as i32 % self.set.lp_solvefreq == 0;
        focusnodehaslp = focusnodehaslp || (actdepth == 0 && self.set.lp_solvefreq == 0);
        focusnodehaslp =
            focusnodehaslp && self.set.is_lt(pseudoobjval, self.primal.cutoffbound);
        self.tree.focushaslp = focusnodehaslp;

        // call the primal heuristics that run before the node is solved
        self.primal_heuristics(HeurTiming::BEFORE_NODE, None)?;

        // if diving produced an LP error, switch back to a pseudo node
        if self.lp.resolvelperror {
            self.tree.focushaslp = false;
            self.lp.resolvelperror = false;
        }

        // external node solving loop
        let mut lastdomchgcount = self.stat.domchgcount;
        let mut lastlpcount = self.stat.lpcount;
        let mut initiallpsolved = false;
        let mut nlperrors = 0u32;
        self.stat.npricerounds = 0;
        self.stat.nseparounds = 0;
        let mut solverelaxagain = true;
        let mut solvelpagain = true;
        let mut propagateagain = true;
        let mut fullpropagation = true;
        let mut branched = false;
        let mut forcedlpsolve = false;
        let mut nloops = 0u32;
        while !out.cutoff
            && (solverelaxagain || solvelpagain || propagateagain)
            && nlperrors < MAXNLPERRORS
            && !out.restart
        {
            debug_assert_eq!(0, self.sepastore.n_cuts());
            nloops += 1;
            let mut lperror = false;
            let mut solverelax = solverelaxagain;
            solverelaxagain = false;
            let mut solvelp = solvelpagain;
            solvelpagain = false;
            let propagate_now = propagateagain;
            propagateagain = false;
            let mut forcedenforcement = false;

            // update the lower bound with the pseudo objective value and cut
            // off the node by bounding
            self.apply_bounding(&mut out.cutoff)?;

            // domain propagation
            if propagate_now && !out.cutoff {
                let lpwasflushed = self.lp.flushed();
                let oldnboundchgs = self.stat.nboundchgs;

                let depth = self.tree.focus_depth();
                out.cutoff |= self.propagate_domains(depth, 0, fullpropagation)?;
                fullpropagation = false;

                out.cutoff |= self.tree.cutoffdepth <= actdepth;

                // a bound change unflushed the LP: it has to be resolved
                solvelp = solvelp || (lpwasflushed && !self.lp.flushed());
                // new bound changes invalidate the relaxators too
                solverelax = solverelax || self.stat.nboundchgs > oldnboundchgs;

                self.apply_bounding(&mut out.cutoff)?;
            }
            debug_assert_eq!(0, self.sepastore.n_cuts());

            // primal heuristics applicable after the propagation loop; a
            // solution found here re-requests propagation
            if !out.cutoff {
                propagateagain |= self.primal_heuristics(HeurTiming::AFTER_PROP_LOOP, None)?;
            }

            // solve external relaxations with non-negative priority
            if solverelax && !out.cutoff {
                self.branchcand.clear_extern_cands();

                let ro = self.solve_node_relax(actdepth, true)?;
                out.cutoff |= ro.cutoff;
                propagateagain |= ro.propagateagain;
                solvelpagain |= ro.solvelpagain;
                solverelaxagain |= ro.solverelaxagain;

                out.cutoff |= self.tree.cutoffdepth <= actdepth;
                self.apply_cuts(
                    actdepth == 0,
                    &mut out.cutoff,
                    &mut propagateagain,
                    &mut solvelpagain,
                )?;
                self.apply_bounding(&mut out.cutoff)?;
            }
            debug_assert_eq!(0, self.sepastore.n_cuts());

            // check if we want to solve the LP at this node
            if solvelp && !out.cutoff && self.tree.focushaslp {
                let lpout = self.solve_node_lp(initiallpsolved)?;
                initiallpsolved = true;
                out.cutoff |= lpout.cutoff;
                out.unbounded |= lpout.unbounded;
                lperror = lpout.lperror;
                pricingaborted = lpout.pricingaborted;
                log::debug!(
                    "LP status: {:?}, LP obj: {}, count: {}",
                    self.lp.solstat(),
                    self.lp.objval(),
                    self.stat.lpcount
                );

                out.cutoff |= self.tree.cutoffdepth <= actdepth;

                // an error during LP solving: switch to the pseudo solution
                if lperror {
                    if forcedlpsolve {
                        return Err(Error::NumericalTroubles {
                            node: self.stat.nnodes,
                            lpcount: self.stat.nlps,
                        });
                    }
                    self.tree.focushaslp = false;
                    nlperrors += 1;
                    log::info!(
                        "(node {}) unresolved numerical troubles in LP {} -- using pseudo solution instead (loop {})",
                        self.stat.nnodes,
                        self.stat.nlps,
                        nlperrors
                    );
                }

                if matches!(
                    self.lp.solstat(),
                    LpSolstat::TimeLimit | LpSolstat::IterLimit
                ) {
                    self.tree.focushaslp = false;
                    forcedenforcement = true;
                }

                // in exact solving mode an unproven LP infeasibility forces
                // the pseudo solution; with every variable fixed and
                // continuous variables present there is nothing to fall
                // back to
                if !out.cutoff
                    && !lperror
                    && self.set.misc_exactsolve
                    && self.lp.solstat() == LpSolstat::Infeasible
                    && self.tree.focus_lower() < self.primal.cutoffbound
                {
                    if self.branchcand.n_pseudo_cands(&self.set, &self.prob) == 0
                        && self.prob.ncontvars > 0
                    {
                        return Err(Error::ExactSolveLimitation {
                            node: self.stat.nnodes,
                        });
                    }
                    self.tree.focushaslp = false;
                    log::info!(
                        "(node {}) could not prove infeasibility of LP {} -- using pseudo solution instead",
                        self.stat.nnodes,
                        self.stat.nlps
                    );
                }

                self.apply_bounding(&mut out.cutoff)?;
            }
            debug_assert_eq!(0, self.sepastore.n_cuts());

            // solve external relaxations with negative priority
            if solverelax && !out.cutoff {
                let ro = self.solve_node_relax(actdepth, false)?;
                out.cutoff |= ro.cutoff;
                propagateagain |= ro.propagateagain;
                solvelpagain |= ro.solvelpagain;
                solverelaxagain |= ro.solverelaxagain;

                out.cutoff |= self.tree.cutoffdepth <= actdepth;
                self.apply_cuts(
                    actdepth == 0,
                    &mut out.cutoff,
                    &mut propagateagain,
                    &mut solvelpagain,
                )?;
                self.apply_bounding(&mut out.cutoff)?;
            }

            self.update_loop_status(
                actdepth,
                &mut out.cutoff,
                &mut propagateagain,
                &mut solverelaxagain,
            );

            // primal heuristics after the LP loop; on the first loop of the
            // first run's root node the after-node heuristics join in, they
            // may improve the bound for reduced cost strengthening
            let mut foundsol = false;
            if !out.cutoff || self.tree.n_open() > 0 {
                if actdepth == 0 && self.stat.nruns == 1 && nloops == 1 {
                    foundsol = self.primal_heuristics(
                        HeurTiming::AFTER_LP_LOOP | HeurTiming::AFTER_NODE,
                        None,
                    )?;
                    out.afternodeheur = true;
                } else {
                    foundsol = self.primal_heuristics(HeurTiming::AFTER_LP_LOOP, None)?;
                }

                // heuristics may have found a solution that bounds us out
                self.apply_bounding(&mut out.cutoff)?;
            }

            // check if a heuristic left us with an invalid LP
            if self.lp.resolvelperror {
                if forcedlpsolve {
                    return Err(Error::NumericalTroubles {
                        node: self.stat.nnodes,
                        lpcount: self.stat.nlps,
                    });
                }
                self.tree.focushaslp = false;
                self.lp.resolvelperror = false;
                nlperrors += 1;
                log::info!(
                    "(node {}) unresolved numerical troubles in LP {} -- using pseudo solution instead (loop {})",
                    self.stat.nnodes,
                    self.stat.nlps,
                    nlperrors
                );
            }

            // an improved solution invalidates everything
            if foundsol {
                propagateagain = true;
                solvelpagain = true;
                solverelaxagain = true;
                self.mark_relaxs_unsolved();
            }

            // enforce constraints
            branched = false;
            if !out.cutoff && !solverelaxagain && !solvelpagain && !propagateagain {
                // a changed solution has to be re-enforced completely;
                // otherwise only the constraints added by the last
                // enforcement run again, but the infeasible flag survives
                if lastdomchgcount != self.stat.domchgcount
                    || lastlpcount != self.stat.lpcount
                {
                    lastdomchgcount = self.stat.domchgcount;
                    lastlpcount = self.stat.lpcount;
                    out.infeasible = false;
                }

                let eo = self.enforce_constraints(out.infeasible, forcedenforcement)?;
                branched = eo.branched;
                out.cutoff |= eo.cutoff;
                out.infeasible = eo.infeasible;
                propagateagain |= eo.propagateagain;
                solvelpagain |= eo.solvelpagain;
                solverelaxagain |= eo.solverelaxagain;

                debug_assert!(!branched || (!out.cutoff && out.infeasible));

                self.apply_cuts(
                    actdepth == 0,
                    &mut out.cutoff,
                    &mut propagateagain,
                    &mut solvelpagain,
                )?;
                self.apply_bounding(&mut out.cutoff)?;
                self.update_loop_status(
                    actdepth,
                    &mut out.cutoff,
                    &mut propagateagain,
                    &mut solverelaxagain,
                );
            }
            debug_assert_eq!(0, self.sepastore.n_cuts());

            // enforcement found the node feasible, but pricing was aborted:
            // the solution need not be the best of the subtree, so keep it
            // as a candidate and force a branching
            if pricingaborted && !out.infeasible && !out.cutoff {
                let sol = self.current_sol();
                if self.check_sol(&sol)? {
                    self.primal
                        .add_checked_sol(&self.set, &mut self.stat, &mut self.lp, sol);
                }
                out.infeasible = true;
            }

            // the node is infeasible and nobody resolved it: branch on the
            // LP solution, the external candidates, or the pseudo solution
            forcedlpsolve = false;
            if out.infeasible
                && !out.cutoff
                && !out.unbounded
                && !solverelaxagain
                && !solvelpagain
                && !propagateagain
                && !branched
            {
                let nlpcands = if self.tree.focushaslp {
                    self.branchcand.n_lp_cands(&self.set, &self.prob, &self.lp)
                } else {
                    0
                };

                let mut result = BranchResult::DidNotRun;
                if nlpcands > 0 {
                    // branch on the LP solution; adding constraints is not
                    // allowed, it need not change the LP and could loop
                    log::debug!(
                        "infeasibility in depth {} was not resolved: branch on the LP solution with {} fractionals",
                        actdepth,
                        nlpcands
                    );
                    result = self.branch_exec_lp(false)?;
                    debug_assert!(result != BranchResult::DidNotRun);
                } else {
                    if self.branchcand.n_extern_cands() > 0 {
                        log::debug!(
                            "infeasibility in depth {} was not resolved: branch on {} external candidates",
                            actdepth,
                            self.branchcand.n_extern_cands()
                        );
                        result = self.branch_exec_extern(true)?;
                    }
                    if result == BranchResult::DidNotRun {
                        log::debug!(
                            "infeasibility in depth {} was not resolved: branch on the pseudo solution",
                            actdepth
                        );
                        result = self.branch_exec_pseudo(true)?;
                    }
                }

                match result {
                    BranchResult::Cutoff => {
                        debug_assert_eq!(0, self.tree.n_children());
                        out.cutoff = true;
                        log::debug!("branching rule detected a cutoff");
                    }
                    BranchResult::ConsAdded => {
                        debug_assert_eq!(0, self.tree.n_children());
                        if nlpcands > 0 {
                            return Err(Error::invalid_result(
                                "branching",
                                "LP branching",
                                "ConsAdded",
                            ));
                        }
                        propagateagain = true;
                        solvelpagain = true;
                        solverelaxagain = true;
                        self.mark_relaxs_unsolved();
                    }
                    BranchResult::ReducedDom => {
                        debug_assert_eq!(0, self.tree.n_children());
                        propagateagain = true;
                        solvelpagain = true;
                        solverelaxagain = true;
                        self.mark_relaxs_unsolved();
                    }
                    BranchResult::Separated => {
                        debug_assert_eq!(0, self.tree.n_children());
                        debug_assert!(self.sepastore.n_cuts() > 0);
                        solvelpagain = true;
                        solverelaxagain = true;
                        self.mark_relaxs_unsolved();
                    }
                    BranchResult::Branched => {
                        debug_assert!(self.tree.n_children() >= 1);
                        debug_assert_eq!(0, self.sepastore.n_cuts());
                        branched = true;
                    }
                    BranchResult::DidNotRun => {
                        // every integer variable is fixed in the infeasible
                        // solution
                        debug_assert_eq!(0, self.tree.n_children());
                        debug_assert_eq!(
                            0,
                            self.branchcand.n_pseudo_cands(&self.set, &self.prob)
                        );

                        if self.prob.ncontvars == 0 && self.plugins.n_active_pricers() == 0 {
                            // the pseudo solution is completely fixed
                            out.cutoff = true;
                            log::debug!("cutoff: all variables are fixed in the current node");
                        } else if matches!(
                            self.lp.solstat(),
                            LpSolstat::TimeLimit | LpSolstat::IterLimit
                        ) || self.is_stopped(false)
                        {
                            // a limit fired; create a single child cloning
                            // the focus node so the tree driver terminates
                            // cleanly
                            let est = self.tree.node(focusnode).estimate;
                            let _child = self.tree.create_child(&mut self.stat, est);
                            branched = true;
                        } else {
                            if pricingaborted {
                                return Err(Error::invalid_result(
                                    "pricing",
                                    "forced branching",
                                    "DidNotRun",
                                ));
                            }
                            // solve the LP in the next loop, and this LP
                            // must succeed
                            log::info!(
                                "(node {}) forcing the solution of an LP",
                                self.stat.nnodes
                            );
                            self.tree.focushaslp = true;
                            solvelpagain = true;
                            forcedlpsolve = true;
                        }
                    }
                }
                debug_assert!(out.cutoff || solvelpagain || propagateagain || branched);

                self.apply_cuts(
                    actdepth == 0,
                    &mut out.cutoff,
                    &mut propagateagain,
                    &mut solvelpagain,
                )?;
                self.apply_bounding(&mut out.cutoff)?;
                self.update_loop_status(
                    actdepth,
                    &mut out.cutoff,
                    &mut propagateagain,
                    &mut solverelaxagain,
                );
            }

            // check for an immediate restart
            out.restart = out.restart
                || (actdepth == 0 && self.restart_allowed(self.set.presol_immrestartfac));

            log::debug!(
                "node solving iteration {} finished: cutoff={}, propagateagain={}, solverelaxagain={}, solvelpagain={}, nlperrors={}, restart={}",
                nloops,
                out.cutoff,
                propagateagain,
                solverelaxagain,
                solvelpagain,
                nlperrors,
                out.restart
            );
        }
        debug_assert_eq!(0, self.sepastore.n_cuts());

        // flush the conflict set storage
        let _conflictsets = self.conflict.flush();

        // check for too many LP errors
        if nlperrors >= MAXNLPERRORS {
            return Err(Error::NumericalTroubles {
                node: self.stat.nnodes,
                lpcount: self.stat.nlps,
            });
        }

        // check for a final restart
        let mut restartfac = self.set.presol_subrestartfac;
        if actdepth == 0 {
            restartfac = restartfac.min(self.set.presol_restartfac);
        }
        out.restart = out.restart || self.restart_allowed(restartfac);

        // check for cutoff
        if out.cutoff {
            log::debug!("node is cut off");
            self.tree.update_focus_lower(self.set.infinity());
            out.infeasible = true;
            out.restart = false;
        }

        let _ = branched;

        Ok(out)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
