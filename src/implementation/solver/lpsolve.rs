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

//! The LP constructor and the initial LP solve of a node: lazy construction
//! from the LP-state fork ancestor, installation of the initial columns
//! (through the pricing storage) and rows (through the constraint handlers
//! and the separation storage), and the cut application turning
//! single-column cuts into bound changes.

use super::{data, SolvingData, Tightened};
use crate::{BdChgOrigin, Event, LpSolstat, Result, Solver};

impl Solver {
    /// Applies the cuts waiting in the separation storage: single-column
    /// cuts become bound changes, everything else enters the LP as a row
    /// valid for the focus subtree (or globally, under the root flag).
    /// Returns whether a cut or reduction proved the node infeasible.
    pub(crate) fn apply_sepastore_cuts(&mut self, root: bool) -> Result<bool> {
        let cuts = self.sepastore.take_cuts();
        let mut cutoff = false;
        for mut cut in cuts {
            if cutoff {
                break;
            }
            if cut.coefs.is_empty() {
                // a constant row can only be a proof of infeasibility
                if cut.lhs > self.set.num_feastol || cut.rhs < -self.set.num_feastol {
                    cutoff = true;
                }
                continue;
            }
            if let Some((var, coef)) = cut.single_coef() {
                if self.set.is_zero(coef) {
                    if cut.lhs > self.set.num_feastol || cut.rhs < -self.set.num_feastol {
                        cutoff = true;
                    }
                    continue;
                }
                let (lbbound, ubbound) = if coef > 0.0 {
                    (cut.lhs / coef, cut.rhs / coef)
                } else {
                    (cut.rhs / coef, cut.lhs / coef)
                };
                let mut data = data!(self);
                if lbbound.is_finite() && !data.set.is_infinity(lbbound.abs()) {
                    cutoff |= data.tighten_lb(var, lbbound, BdChgOrigin::ConsHdlr)
                        == Tightened::Cutoff;
                }
                if !cutoff && ubbound.is_finite() && !data.set.is_infinity(ubbound.abs()) {
                    cutoff |= data.tighten_ub(var, ubbound, BdChgOrigin::ConsHdlr)
                        == Tightened::Cutoff;
                }
            } else {
                cut.depth = if root { 0 } else { self.tree.focus_depth() };
                self.lp.add_row(cut);
                self.sepastore.ncutsapplied += 1;
            }
        }
        Ok(cutoff)
    }

    /// Puts the LP relaxations of all initial constraints into the LP.
    pub(crate) fn init_conss_lp(&mut self, root: bool) -> Result<bool> {
        self.sepastore.start_initial_lp();
        log::debug!("init LP: initial rows");
        for i in 0..self.plugins.conshdlrs.len() {
            let mut data = data!(self);
            self.plugins.conshdlrs[i].plugin.init_lp(&mut data)?;
        }
        let cutoff = self.apply_sepastore_cuts(root)?;
        self.sepastore.end_initial_lp();
        Ok(cutoff)
    }

    /// Sets up the initial LP relaxation of the focus node: at the root the
    /// initial variables become columns, then every constraint handler
    /// installs its initial rows.
    fn init_lp(&mut self, root: bool) -> Result<bool> {
        if root {
            self.pricestore.start_initial_lp();
            log::debug!("init LP: initial columns");
            for id in self.prob.var_ids().collect::<Vec<_>>() {
                if self.prob.var(id).initial {
                    self.pricestore.add_var(id, 0.0);
                }
            }
            self.pricestore.apply_vars(&mut self.prob, &mut self.lp);
            self.pricestore.end_initial_lp();
        }
        self.init_conss_lp(root)
    }

    /// Constructs the LP of the focus node if it was not constructed yet.
    /// The warm-start state of the LP-state fork ancestor is kernel-internal
    /// and picked up on the next solve.
    pub fn construct_current_lp(&mut self) -> Result<bool> {
        let mut cutoff = false;
        if !self.tree.focuslpconstructed {
            log::debug!("loading LP at depth {}", self.tree.focus_depth());
            let initroot = self.tree.focus_depth() == 0 && self.lp.n_cols() == 0;
            self.tree.focuslpconstructed = true;
            cutoff = self.init_lp(initroot)?;
        }
        Ok(cutoff)
    }

    /// Loads and solves the initial LP of the focus node. On a clean solve
    /// the first-LP event fires, the node's LP state is recorded for its
    /// children, and the pseudo-cost updater runs.
    pub(crate) fn solve_node_initial_lp(&mut self) -> Result<(bool, bool)> {
        let cutoff = self.construct_current_lp()?;
        if cutoff {
            return Ok((true, false));
        }

        log::debug!("node: solve initial LP");
        let lperror =
            self.lp
                .solve_and_eval(&self.set, &mut self.stat, &mut self.prob, None, true, false)?;

        if !lperror {
            if !matches!(
                self.lp.solstat(),
                LpSolstat::IterLimit | LpSolstat::TimeLimit
            ) {
                self.events.emit(Event::FirstLpSolved(self.tree.focus_id()))?;
            }
            self.tree.store_focus_lpstate();
            self.update_pseudocost();
        }

        Ok((false, lperror))
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
