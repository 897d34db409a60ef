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

//! Constraint enforcement: every handler judges the node's LP or pseudo
//! solution until one of them resolves the infeasibility by cutting off,
//! branching, reducing a domain or separating a cut. Enforcement-generated
//! cuts bypass the selection policy (forced mode), and pseudo enforcement
//! must never produce cuts at all.

use super::data;
use super::SolvingData;
use crate::{EnfoResult, Error, LpSolstat, Result, Solver};

/// The verdict translation of one enforcement pass.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Enforcement {
    pub branched: bool,
    pub cutoff: bool,
    pub infeasible: bool,
    pub propagateagain: bool,
    pub solvelpagain: bool,
    pub solverelaxagain: bool,
}

impl Solver {
    /// Enforces the constraints on the focus node's LP or pseudo solution.
    /// `infeasible` carries over the verdict of an earlier enforcement of
    /// the same solution; `forced` demands a decision even on an
    /// objective-infeasible pseudo solution.
    pub(crate) fn enforce_constraints(
        &mut self,
        infeasible: bool,
        forced: bool,
    ) -> Result<Enforcement> {
        let mut out = Enforcement {
            infeasible,
            ..Enforcement::default()
        };

        let haslp = self.tree.focushaslp;
        log::debug!(
            "enforcing constraints on the {} solution",
            if haslp { "LP" } else { "pseudo" }
        );

        // is the pseudo solution ruled out by its objective value alone?
        let objinfeasible = if haslp {
            false
        } else {
            let pseudoobjval = self.prob.pseudo_objval(&self.set);
            self.set.is_lt(pseudoobjval, self.tree.focus_lower())
        };

        // during enforcement, generated cuts enter the LP in any case
        self.sepastore.start_force_cuts();

        let mut resolved = false;
        for h in self.plugins.conshdlr_enfo_order() {
            if resolved {
                break;
            }
            debug_assert_eq!(0, self.sepastore.n_cuts());

            let result = if haslp {
                debug_assert!(self.lp.flushed() && self.lp.solved);
                let mut data = data!(self);
                self.plugins.conshdlrs[h]
                    .plugin
                    .enforce_lp(&mut data, out.infeasible)?
            } else {
                let mut data = data!(self);
                let result = self.plugins.conshdlrs[h].plugin.enforce_pseudo(
                    &mut data,
                    out.infeasible,
                    objinfeasible,
                    forced,
                )?;
                if self.sepastore.n_cuts() != 0 {
                    self.sepastore.end_force_cuts();
                    return Err(Error::invalid_result(
                        self.plugins.conshdlrs[h].plugin.name(),
                        "pseudo enforcement",
                        "Separated",
                    ));
                }
                result
            };
            log::debug!(
                "enforcing of <{}> returned {:?}",
                self.plugins.conshdlrs[h].plugin.name(),
                result
            );

            match result {
                EnfoResult::Cutoff => {
                    debug_assert_eq!(0, self.tree.n_children());
                    out.cutoff = true;
                    out.infeasible = true;
                    resolved = true;
                }
                EnfoResult::ConsAdded => {
                    debug_assert_eq!(0, self.tree.n_children());
                    out.infeasible = true;
                    out.propagateagain = true;
                    out.solvelpagain = true;
                    out.solverelaxagain = true;
                    self.mark_relaxs_unsolved();
                    resolved = true;
                }
                EnfoResult::ReducedDom => {
                    debug_assert_eq!(0, self.tree.n_children());
                    out.infeasible = true;
                    out.propagateagain = true;
                    out.solvelpagain = true;
                    out.solverelaxagain = true;
                    self.mark_relaxs_unsolved();
                    resolved = true;
                }
                EnfoResult::Separated => {
                    debug_assert!(self.sepastore.n_cuts() > 0);
                    out.infeasible = true;
                    out.solvelpagain = true;
                    out.solverelaxagain = true;
                    self.mark_relaxs_unsolved();
                    resolved = true;
                }
                EnfoResult::Branched => {
                    debug_assert!(self.tree.n_children() >= 1);
                    debug_assert_eq!(0, self.sepastore.n_cuts());
                    out.infeasible = true;
                    out.branched = true;
                    resolved = true;
                }
                EnfoResult::SolveLp => {
                    if haslp {
                        self.sepastore.end_force_cuts();
                        return Err(Error::invalid_result(
                            self.plugins.conshdlrs[h].plugin.name(),
                            "LP enforcement",
                            "SolveLp",
                        ));
                    }
                    out.infeasible = true;
                    out.solvelpagain = true;
                    resolved = true;
                    // the node's LP must be solved
                    self.tree.focushaslp = true;
                }
                EnfoResult::Infeasible => {
                    debug_assert_eq!(0, self.tree.n_children());
                    out.infeasible = true;
                }
                EnfoResult::Feasible => {
                    debug_assert_eq!(0, self.tree.n_children());
                }
                EnfoResult::DidNotRun => {
                    if !objinfeasible {
                        self.sepastore.end_force_cuts();
                        return Err(Error::invalid_result(
                            self.plugins.conshdlrs[h].plugin.name(),
                            "enforcement",
                            "DidNotRun",
                        ));
                    }
                    out.infeasible = true;
                }
            }

            // the enforcement may have added a primal solution, after which
            // the LP status can change to the objective limit
            self.try_candidate_sols()?;
            if haslp && self.lp.solstat() == LpSolstat::ObjLimit {
                out.cutoff = true;
                out.infeasible = true;
                resolved = true;
                log::debug!("LP exceeded the objective limit during enforcement");
            }
        }

        self.sepastore.end_force_cuts();

        log::debug!(
            "enforcing result: branched={}, cutoff={}, infeasible={}, propagateagain={}, solvelpagain={}",
            out.branched,
            out.cutoff,
            out.infeasible,
            out.propagateagain,
            out.solvelpagain
        );

        Ok(out)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
