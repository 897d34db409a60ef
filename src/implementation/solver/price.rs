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

//! The price loop: solves the current LP completely with pricing in new
//! variables, until the LP is optimal on the full column set or pricing has
//! to give up. An aborted price loop taints the LP: its objective is no
//! valid dual bound then.

use super::data;
use super::SolvingData;
use crate::{Error, HeurTiming, LpSolstat, PricerResult, Result, Solver, VerbLevel};

/// The outcome of a price loop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PriceLoop {
    /// Number of problem variables in the LP after pricing
    pub npricedcolvars: usize,
    /// A separation round should follow (the LP shape changed)
    pub mustsepa: bool,
    /// The strongest lower bound any pricer reported
    pub lowerbound: f64,
    /// An unresolved numerical error occurred
    pub lperror: bool,
    /// Pricing was aborted; the LP value must not be used as a bound
    pub aborted: bool,
}

impl Solver {
    /// Solves the current LP with pricing in new variables. Precondition:
    /// the LP is flushed and solved. `maxpricerounds == -1` prices without
    /// a round limit (required for a valid dual bound).
    pub(crate) fn price_loop(
        &mut self,
        pretendroot: bool,
        displayinfo: bool,
        maxpricerounds: i32,
    ) -> Result<PriceLoop> {
        debug_assert!(self.lp.flushed() && self.lp.solved);

        let mut out = PriceLoop {
            npricedcolvars: self.prob.ncolvars,
            mustsepa: false,
            lowerbound: -self.set.infinity(),
            lperror: false,
            aborted: false,
        };

        // if the LP is unbounded we do not need to price, and if all the
        // variables are in the LP already there is nothing to price in
        let mut mustprice = matches!(
            self.lp.solstat(),
            LpSolstat::Optimal | LpSolstat::Infeasible | LpSolstat::ObjLimit
        ) && !self.prob.all_cols_in_lp();

        let maxpricerounds = if maxpricerounds == -1 {
            i32::MAX
        } else {
            maxpricerounds
        };

        let mut npricerounds = 0;
        while !out.lperror && mustprice && npricerounds < maxpricerounds {
            debug_assert!(self.lp.flushed() && self.lp.solved);

            if self.is_stopped(false) {
                log::warn!("pricing has been interrupted -- LP of current node is invalid");
                out.aborted = true;
                break;
            }

            // call the primal heuristics which are callable during pricing
            self.primal_heuristics(HeurTiming::DURING_PRICING_LOOP, None)?;

            // price problem variables
            log::debug!("problem variable pricing");
            debug_assert_eq!(0, self.pricestore.n_vars());
            debug_assert_eq!(0, self.pricestore.n_bound_resets());
            self.pricestore
                .add_prob_vars(&self.set, &self.prob, &self.lp);
            out.npricedcolvars = self.prob.ncolvars;

            // call the external pricers that are active for this problem
            log::debug!("external variable pricing");
            let maxpricevars = self.set.price_maxvars(pretendroot);
            let mut enoughvars = self.pricestore.n_vars() as i64 >= maxpricevars / 2 + 1;
            for p in self.plugins.pricer_order() {
                if enoughvars {
                    break;
                }
                if !self.plugins.pricers[p].is_active() {
                    continue;
                }
                let mut data = data!(self);
                let (lb, result) = self.plugins.pricers[p].execute(&mut data)?;
                log::debug!(
                    "pricer <{}> returned {:?} with lower bound {}",
                    self.plugins.pricers[p].name(),
                    result,
                    lb
                );
                enoughvars = self.pricestore.n_vars() as i64 >= (maxpricevars + 1) / 2;
                out.aborted |= result == PricerResult::DidNotRun;
                out.lowerbound = out.lowerbound.max(lb);
            }

            // apply the priced variables to the LP
            self.pricestore.apply_vars(&mut self.prob, &mut self.lp);
            debug_assert_eq!(0, self.pricestore.n_vars());
            mustprice = !self.lp.flushed() || self.prob.ncolvars != out.npricedcolvars;
            out.mustsepa |= !self.lp.flushed();

            // after adding columns the LP is primal feasible; primal simplex
            // applies, unless the LP was infeasible before
            log::debug!("pricing: solve LP");
            out.lperror |= self.lp.solve_and_eval(
                &self.set,
                &mut self.stat,
                &mut self.prob,
                None,
                true,
                false,
            )?;

            // reset the bounds temporarily set by the pricers
            log::debug!("pricing: reset bounds");
            self.pricestore.reset_bounds(&mut self.prob, &mut self.lp);
            debug_assert_eq!(0, self.pricestore.n_bound_resets());

            // put all initial constraints into the LP; detecting a cutoff
            // here would mean an initial constraint rendered the already
            // dual feasible LP infeasible
            let cutoff = self.init_conss_lp(pretendroot)?;
            if cutoff {
                return Err(Error::invalid_result(
                    "initlp",
                    "pricing re-initialization",
                    "Cutoff",
                ));
            }
            mustprice = mustprice || !self.lp.flushed() || self.prob.ncolvars != out.npricedcolvars;
            out.mustsepa |= !self.lp.flushed();

            // solve the LP again after resetting bounds and adding new
            // initial constraints (with dual simplex)
            log::debug!("pricing: solve LP after resetting bounds");
            out.lperror |= self.lp.solve_and_eval(
                &self.set,
                &mut self.stat,
                &mut self.prob,
                None,
                false,
                false,
            )?;

            self.stat.npricerounds += 1;
            npricerounds += 1;

            if displayinfo
                && mustprice
                && (self.set.disp_verblevel >= VerbLevel::Full
                    || (self.set.disp_verblevel >= VerbLevel::High && npricerounds % 100 == 1))
            {
                self.display_line(true);
            }

            // if the LP is unbounded, we can stop pricing
            mustprice = mustprice
                && matches!(
                    self.lp.solstat(),
                    LpSolstat::Optimal | LpSolstat::Infeasible | LpSolstat::ObjLimit
                );
        }

        out.aborted = out.aborted
            || out.lperror
            || matches!(self.lp.solstat(), LpSolstat::NotSolved | LpSolstat::Error)
            || npricerounds == maxpricerounds;

        // record whether the current LP is a valid relaxation of the node
        self.lp.isrelax = !out.aborted;

        Ok(out)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
