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

//! The separation driver: ordered rounds of LP- and solution-based
//! separators and constraint-handler separations. A plug-in that tightens a
//! bound invalidates the LP; the driver re-solves it with the dual simplex
//! before the next LP-dependent plug-in runs. Working off the delayed
//! separators returns at the first produced cut so the caller can restart
//! the round.

use super::data;
use super::SolvingData;
use crate::{LpSolstat, Result, SepaResult, Sol, Solver};

/// The aggregated flags of one separation round.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SepaRound {
    pub delayed: bool,
    pub enoughcuts: bool,
    pub cutoff: bool,
    pub lperror: bool,
    pub mustsepa: bool,
    pub mustprice: bool,
}

impl Solver {
    /// Makes sure the LP is flushed and solved again after a separation
    /// plug-in applied bound changes.
    fn separation_round_resolve_lp(&mut self, round: &mut SepaRound) -> Result<()> {
        if !round.cutoff && !self.lp.flushed() {
            log::debug!("separation: resolve LP");
            round.lperror |= self.lp.solve_and_eval(
                &self.set,
                &mut self.stat,
                &mut self.prob,
                None,
                true,
                false,
            )?;
            round.mustsepa = true;
            round.mustprice = true;
        }
        Ok(())
    }

    fn lp_separable(&self, round: &SepaRound) -> bool {
        !round.cutoff
            && !round.lperror
            && !round.enoughcuts
            && self.lp.flushed()
            && self.lp.solved
            && matches!(
                self.lp.solstat(),
                LpSolstat::Optimal | LpSolstat::UnboundedRay
            )
    }

    fn note_enoughcuts(&self, round: &mut SepaRound, root: bool) {
        round.enoughcuts |=
            self.sepastore.n_cuts() as i64 >= 2 * self.set.sepa_maxcuts(root);
    }

    /// Applies one round of separation on the LP solution.
    pub(crate) fn separation_round_lp(
        &mut self,
        depth: usize,
        bounddist: f64,
        onlydelayed: bool,
    ) -> Result<SepaRound> {
        let root = depth == 0;
        let mut round = SepaRound::default();
        self.note_enoughcuts(&mut round, root);
        let mut consadded = false;

        log::debug!(
            "calling separators on LP solution in depth {} (onlydelayed: {})",
            depth,
            onlydelayed
        );

        // call LP separators with non-negative priority
        for i in self.plugins.sepa_order() {
            if !self.lp_separable(&round) {
                break;
            }
            if self.plugins.sepas[i].plugin.priority() < 0 {
                continue;
            }
            if onlydelayed && !self.plugins.sepas[i].lp_delayed {
                continue;
            }
            let mut data = data!(self);
            let result =
                self.plugins.sepas[i]
                    .plugin
                    .execute_lp(&mut data, depth, bounddist, onlydelayed)?;
            self.plugins.sepas[i].lp_delayed = result == SepaResult::Delayed;
            round.cutoff |= result == SepaResult::Cutoff;
            consadded |= result == SepaResult::ConsAdded;
            round.delayed |= result == SepaResult::Delayed;
            self.note_enoughcuts(&mut round, root);
            self.separation_round_resolve_lp(&mut round)?;
            if onlydelayed
                && matches!(
                    result,
                    SepaResult::ConsAdded | SepaResult::ReducedDom | SepaResult::Separated
                )
            {
                round.delayed = true;
                return Ok(round);
            }
        }

        // try separating the constraints of the constraint handlers
        for i in self.plugins.conshdlr_sepa_order() {
            if !self.lp_separable(&round) {
                break;
            }
            if onlydelayed && !self.plugins.conshdlrs[i].sepa_delayed {
                continue;
            }
            let mut data = data!(self);
            let result =
                self.plugins.conshdlrs[i]
                    .plugin
                    .separate_lp(&mut data, depth, onlydelayed)?;
            self.plugins.conshdlrs[i].sepa_delayed = result == SepaResult::Delayed;
            round.cutoff |= result == SepaResult::Cutoff;
            consadded |= result == SepaResult::ConsAdded;
            round.delayed |= result == SepaResult::Delayed;
            self.note_enoughcuts(&mut round, root);
            self.separation_round_resolve_lp(&mut round)?;
            if onlydelayed
                && matches!(
                    result,
                    SepaResult::ConsAdded | SepaResult::ReducedDom | SepaResult::Separated
                )
            {
                round.delayed = true;
                return Ok(round);
            }
        }

        // call LP separators with negative priority
        for i in self.plugins.sepa_order() {
            if !self.lp_separable(&round) {
                break;
            }
            if self.plugins.sepas[i].plugin.priority() >= 0 {
                continue;
            }
            if onlydelayed && !self.plugins.sepas[i].lp_delayed {
                continue;
            }
            let mut data = data!(self);
            let result =
                self.plugins.sepas[i]
                    .plugin
                    .execute_lp(&mut data, depth, bounddist, onlydelayed)?;
            self.plugins.sepas[i].lp_delayed = result == SepaResult::Delayed;
            round.cutoff |= result == SepaResult::Cutoff;
            consadded |= result == SepaResult::ConsAdded;
            round.delayed |= result == SepaResult::Delayed;
            self.note_enoughcuts(&mut round, root);
            self.separation_round_resolve_lp(&mut round)?;
            if onlydelayed
                && matches!(
                    result,
                    SepaResult::ConsAdded | SepaResult::ReducedDom | SepaResult::Separated
                )
            {
                round.delayed = true;
                return Ok(round);
            }
        }

        // process the constraints that were added during this round
        while consadded {
            debug_assert!(!onlydelayed);
            consadded = false;
            for i in self.plugins.conshdlr_sepa_order() {
                if !self.lp_separable(&round) {
                    break;
                }
                let mut data = data!(self);
                let result =
                    self.plugins.conshdlrs[i]
                        .plugin
                        .separate_lp(&mut data, depth, onlydelayed)?;
                self.plugins.conshdlrs[i].sepa_delayed = result == SepaResult::Delayed;
                round.cutoff |= result == SepaResult::Cutoff;
                consadded |= result == SepaResult::ConsAdded;
                round.delayed |= result == SepaResult::Delayed;
                self.note_enoughcuts(&mut round, root);
                self.separation_round_resolve_lp(&mut round)?;
            }
        }

        log::debug!(
            "separation round finished: delayed={}, enoughcuts={}, cutoff={}",
            round.delayed,
            round.enoughcuts,
            round.cutoff
        );

        Ok(round)
    }

    /// Applies one round of separation on the given primal solution. The LP
    /// plays no role here; the stop monitor is polled between plug-ins
    /// instead.
    pub(crate) fn separation_round_sol(
        &mut self,
        sol: &Sol,
        depth: usize,
        onlydelayed: bool,
    ) -> Result<SepaRound> {
        let root = depth == 0;
        let mut round = SepaRound::default();
        let mut consadded = false;

        log::debug!(
            "calling separators on primal solution in depth {} (onlydelayed: {})",
            depth,
            onlydelayed
        );

        // call separators with non-negative priority
        for i in self.plugins.sepa_order() {
            if round.cutoff || round.enoughcuts || self.is_stopped(false) {
                break;
            }
            if self.plugins.sepas[i].plugin.priority() < 0 {
                continue;
            }
            if onlydelayed && !self.plugins.sepas[i].sol_delayed {
                continue;
            }
            let mut data = data!(self);
            let result =
                self.plugins.sepas[i]
                    .plugin
                    .execute_sol(&mut data, sol, depth, onlydelayed)?;
            self.plugins.sepas[i].sol_delayed = result == SepaResult::Delayed;
            round.cutoff |= result == SepaResult::Cutoff;
            consadded |= result == SepaResult::ConsAdded;
            round.delayed |= result == SepaResult::Delayed;
            self.note_enoughcuts(&mut round, root);
            if onlydelayed
                && matches!(
                    result,
                    SepaResult::ConsAdded | SepaResult::ReducedDom | SepaResult::Separated
                )
            {
                round.delayed = true;
                return Ok(round);
            }
        }

        // try separating the constraints of the constraint handlers
        for i in self.plugins.conshdlr_sepa_order() {
            if round.cutoff || round.enoughcuts || self.is_stopped(false) {
                break;
            }
            if onlydelayed && !self.plugins.conshdlrs[i].sepa_delayed {
                continue;
            }
            let mut data = data!(self);
            let result =
                self.plugins.conshdlrs[i]
                    .plugin
                    .separate_sol(&mut data, sol, depth, onlydelayed)?;
            self.plugins.conshdlrs[i].sepa_delayed = result == SepaResult::Delayed;
            round.cutoff |= result == SepaResult::Cutoff;
            consadded |= result == SepaResult::ConsAdded;
            round.delayed |= result == SepaResult::Delayed;
            self.note_enoughcuts(&mut round, root);
            if onlydelayed
                && matches!(
                    result,
                    SepaResult::ConsAdded | SepaResult::ReducedDom | SepaResult::Separated
                )
            {
                round.delayed = true;
                return Ok(round);
            }
        }

        // call separators with negative priority
        for i in self.plugins.sepa_order() {
            if round.cutoff || round.enoughcuts || self.is_stopped(false) {
                break;
            }
            if self.plugins.sepas[i].plugin.priority() >= 0 {
                continue;
            }
            if onlydelayed && !self.plugins.sepas[i].sol_delayed {
                continue;
            }
            let mut data = data!(self);
            let result =
                self.plugins.sepas[i]
                    .plugin
                    .execute_sol(&mut data, sol, depth, onlydelayed)?;
            self.plugins.sepas[i].sol_delayed = result == SepaResult::Delayed;
            round.cutoff |= result == SepaResult::Cutoff;
            consadded |= result == SepaResult::ConsAdded;
            round.delayed |= result == SepaResult::Delayed;
            self.note_enoughcuts(&mut round, root);
            if onlydelayed
                && matches!(
                    result,
                    SepaResult::ConsAdded | SepaResult::ReducedDom | SepaResult::Separated
                )
            {
                round.delayed = true;
                return Ok(round);
            }
        }

        // process the constraints that were added during this round
        while consadded {
            debug_assert!(!onlydelayed);
            consadded = false;
            for i in self.plugins.conshdlr_sepa_order() {
                if round.cutoff || round.enoughcuts || self.is_stopped(false) {
                    break;
                }
                let mut data = data!(self);
                let result =
                    self.plugins.conshdlrs[i]
                        .plugin
                        .separate_sol(&mut data, sol, depth, onlydelayed)?;
                self.plugins.conshdlrs[i].sepa_delayed = result == SepaResult::Delayed;
                round.cutoff |= result == SepaResult::Cutoff;
                consadded |= result == SepaResult::ConsAdded;
                round.delayed |= result == SepaResult::Delayed;
                self.note_enoughcuts(&mut round, root);
            }
        }

        Ok(round)
    }

    /// Applies one round of separation on the LP solution (`sol == None`)
    /// or on the given primal solution. Returns the `delayed` and `cutoff`
    /// flags of the round.
    pub fn separation_round(
        &mut self,
        sol: Option<&Sol>,
        depth: usize,
        onlydelayed: bool,
    ) -> Result<(bool, bool)> {
        let round = match sol {
            None => self.separation_round_lp(depth, 0.0, onlydelayed)?,
            Some(sol) => self.separation_round_sol(sol, depth, onlydelayed)?,
        };
        self.stat.nseparounds += 1;
        Ok((round.delayed, round.cutoff))
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
