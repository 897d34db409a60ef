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

//! The price-and-cut orchestrator: the fixed point interleaving pricing,
//! separation, propagation and heuristics around the node's LP. Stall
//! detection caps unproductive separation rounds, pulling in the delayed
//! separators and hinting the kernel (`installing`) shortly before the cap.

use crate::{ConflictChannel, Event, HeurTiming, LpSolstat, Result, Solver, VerbLevel};

/// The outcome of the price-and-cut loop.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct PriceCut {
    pub cutoff: bool,
    pub unbounded: bool,
    pub lperror: bool,
    pub pricingaborted: bool,
}

impl Solver {
    /// Solves the focus node's LP in a price-and-cut loop.
    pub(crate) fn price_and_cut_loop(&mut self, initiallpsolved: bool) -> Result<PriceCut> {
        let actdepth = self.tree.focus_depth();
        let root = actdepth == 0;

        // check if we want to separate at this node
        let loclowerbound = self.tree.focus_lower();
        let glblowerbound = self.tree.lowerbound(&self.set);
        let denom = self.primal.cutoffbound - glblowerbound;
        let bounddist = if denom > 0.0 {
            (loclowerbound - glblowerbound) / denom
        } else {
            0.0
        };
        let mut separate = self.set.is_le(bounddist, self.set.sepa_maxbounddist);
        separate = separate
            && (self.set.sepa_maxruns == -1 || self.stat.nruns <= self.set.sepa_maxruns as u32);

        // get the maximal number of separation rounds
        let mut maxseparounds = if root {
            self.set.sepa_maxroundsroot
        } else {
            self.set.sepa_maxrounds
        };
        if maxseparounds == -1 {
            maxseparounds = i32::MAX;
        }
        if self.stat.nruns > 1 && root && self.set.sepa_maxroundsrootsubrun >= 0 {
            maxseparounds = maxseparounds.min(self.set.sepa_maxroundsrootsubrun);
        }
        if initiallpsolved && self.set.sepa_maxaddrounds >= 0 {
            maxseparounds =
                maxseparounds.min(self.stat.nseparounds as i32 + self.set.sepa_maxaddrounds);
        }
        let mut maxnsepastallrounds = self.set.sepa_maxstallrounds;
        if maxnsepastallrounds == -1 {
            maxnsepastallrounds = i32::MAX;
        }

        // solve the initial LP of the price-and-cut loop
        log::debug!("node: solve LP with price and cut");
        let mut out = PriceCut::default();
        out.lperror =
            self.lp
                .solve_and_eval(&self.set, &mut self.stat, &mut self.prob, None, true, false)?;

        let mut npricedcolvars = self.prob.ncolvars;
        let mut mustprice = true;
        let mut mustsepa = separate;
        let mut delayedsepa = false;
        let mut nsepastallrounds = 0i32;
        let mut stalllpobjval = f64::MIN;
        let mut stallnfracs = usize::MAX;
        self.lp.installing = false;

        while !out.cutoff && !out.lperror && (mustprice || mustsepa || delayedsepa) {
            log::debug!("-------- node solving loop --------");
            debug_assert!(self.lp.flushed() && self.lp.solved);

            // solve the LP with pricing in new variables
            while mustprice && !out.lperror {
                let oldlowerbound = self.tree.lowerbound(&self.set);

                let pl = self.price_loop(root, root, -1)?;
                mustprice = false;
                mustsepa |= pl.mustsepa;
                npricedcolvars = pl.npricedcolvars;
                out.lperror = pl.lperror;
                out.pricingaborted = pl.aborted;

                // fold in the lower bound reported by the pricers
                self.tree.update_focus_lower(pl.lowerbound);

                // fold in the LP objective, unless the LP is tainted
                if !out.lperror && !out.pricingaborted {
                    self.update_focus_lower_from_lp();
                    self.update_estimate();
                    log::debug!(
                        "new lower bound {} (LP status {:?})",
                        self.tree.focus_lower(),
                        self.lp.solstat()
                    );
                }

                if root && self.set.disp_verblevel >= VerbLevel::High {
                    self.display_line(true);
                }

                if !out.lperror {
                    // a higher global dual bound may enable further domain
                    // reductions; propagate again unless the focus is
                    // bounded out anyway
                    let newlowerbound = self.tree.lowerbound(&self.set);
                    if self.set.is_gt(newlowerbound, oldlowerbound)
                        && self.set.is_lt(self.tree.focus_lower(), self.primal.cutoffbound)
                    {
                        log::debug!(
                            "global lower bound moved from {} to {}: propagate domains again",
                            oldlowerbound,
                            newlowerbound
                        );
                        let depth = self.tree.focus_depth();
                        out.cutoff |= self.propagate_domains(depth, 0, false)?;

                        if !self.lp.flushed() && !out.cutoff {
                            // at the root, remove redundant rows for good
                            if root {
                                self.lp.flush();
                                let removed = self.lp.remove_redundant_rows(&self.prob);
                                if removed > 0 {
                                    log::debug!("removed {} redundant rows", removed);
                                }
                            }
                            out.lperror |= self.lp.solve_and_eval(
                                &self.set,
                                &mut self.stat,
                                &mut self.prob,
                                None,
                                true,
                                false,
                            )?;
                            mustprice = true;
                        }
                    }
                }

                // call the primal heuristics that apply during the LP loop
                if self.lp.solstat() == LpSolstat::Optimal {
                    self.primal_heuristics(HeurTiming::DURING_LP_LOOP, None)?;
                    out.lperror |= self.lp.resolvelperror;
                }
            }
            debug_assert!(self.lp.flushed() || out.cutoff);

            // check if we exceeded the separation round limit
            mustsepa = mustsepa
                && (self.stat.nseparounds as i32) < maxseparounds
                && nsepastallrounds < maxnsepastallrounds
                && !out.cutoff;

            // a final round with the delayed separators, unless regular
            // separation still applies
            delayedsepa = delayedsepa && !mustsepa && !out.cutoff;
            mustsepa |= delayedsepa;

            // if the LP is infeasible, exceeded the objective limit or a
            // global limit fired (root only), separation is pointless
            if mustsepa
                && (!separate
                    || !matches!(
                        self.lp.solstat(),
                        LpSolstat::Optimal | LpSolstat::UnboundedRay
                    )
                    || self
                        .set
                        .is_ge(self.tree.focus_lower(), self.primal.cutoffbound)
                    || (root && self.is_stopped(false)))
            {
                mustsepa = false;
                delayedsepa = false;
            }

            // separation and reduced cost strengthening
            if !out.cutoff && !out.lperror && mustsepa {
                let olddomchgcount = self.stat.domchgcount;
                mustsepa = false;
                let mut enoughcuts = self.set.sepa_maxcuts(root) == 0;

                // global cut pool separation
                if !enoughcuts && !delayedsepa {
                    let poolfreq = self.set.sepa_poolfreq;
                    if (poolfreq == 0 && actdepth == 0)
                        || (poolfreq > 0 && actdepth % poolfreq as usize == 0)
                    {
                        log::debug!("global cut pool separation");
                        debug_assert_eq!(0, self.sepastore.n_cuts());
                        let _result = self.cutpool.separate(
                            &self.set,
                            &self.prob,
                            &mut self.sepastore,
                            root,
                        );
                        enoughcuts |=
                            self.sepastore.n_cuts() as i64 >= 2 * self.set.sepa_maxcuts(root);
                    }
                }

                // separate constraints and LP
                if !out.cutoff
                    && !out.lperror
                    && !enoughcuts
                    && self.lp.solved
                    && matches!(
                        self.lp.solstat(),
                        LpSolstat::Optimal | LpSolstat::UnboundedRay
                    )
                {
                    let round = self.separation_round_lp(actdepth, bounddist, delayedsepa)?;
                    delayedsepa = round.delayed;
                    enoughcuts |= round.enoughcuts;
                    out.cutoff |= round.cutoff;
                    out.lperror |= round.lperror;
                    mustsepa |= round.mustsepa;
                    mustprice |= round.mustprice;

                    // close to the stall cap: also call the delayed
                    // separators now
                    if !out.cutoff
                        && !out.lperror
                        && !enoughcuts
                        && self.lp.solved
                        && matches!(
                            self.lp.solstat(),
                            LpSolstat::Optimal | LpSolstat::UnboundedRay
                        )
                        && nsepastallrounds >= maxnsepastallrounds - 1
                        && delayedsepa
                    {
                        let round = self.separation_round_lp(actdepth, bounddist, true)?;
                        delayedsepa = round.delayed;
                        enoughcuts |= round.enoughcuts;
                        out.cutoff |= round.cutoff;
                        out.lperror |= round.lperror;
                        mustsepa |= round.mustsepa;
                        mustprice |= round.mustprice;
                    }
                }

                if out.cutoff
                    || out.lperror
                    || matches!(
                        self.lp.solstat(),
                        LpSolstat::Infeasible
                            | LpSolstat::ObjLimit
                            | LpSolstat::IterLimit
                            | LpSolstat::TimeLimit
                    )
                {
                    // the found cuts are of no use: the node is infeasible
                    // anyway (or the LP is in trouble)
                    self.sepastore.clear_cuts();
                } else {
                    // apply the found cuts
                    out.cutoff |= self.apply_sepastore_cuts(root)?;

                    if !out.cutoff {
                        mustprice |=
                            !self.lp.flushed() || self.prob.ncolvars != npricedcolvars;
                        mustsepa |= !self.lp.flushed();

                        // a cut with a single column became a bound change:
                        // propagate again
                        if self.stat.domchgcount != olddomchgcount {
                            let depth = self.tree.focus_depth();
                            out.cutoff |= self.propagate_domains(depth, 0, false)?;

                            if root {
                                self.lp.flush();
                                let _ = self.lp.remove_redundant_rows(&self.prob);
                            }
                        }

                        if !out.cutoff {
                            // solve LP (with dual simplex)
                            log::debug!("separation: solve LP");
                            out.lperror |= self.lp.solve_and_eval(
                                &self.set,
                                &mut self.stat,
                                &mut self.prob,
                                None,
                                true,
                                false,
                            )?;

                            if !out.lperror && self.lp.solstat() == LpSolstat::Optimal {
                                // stall accounting
                                let nfracs = if matches!(
                                    self.lp.solstat(),
                                    LpSolstat::Optimal | LpSolstat::UnboundedRay
                                ) {
                                    self.branchcand.n_lp_cands(&self.set, &self.prob, &self.lp)
                                } else {
                                    usize::MAX
                                };
                                let lpobjval = self.lp.objval();
                                let objreldiff = crate::Set::rel_diff(lpobjval, stalllpobjval);
                                log::debug!(
                                    "LP bound moved from {} to {} (reldiff {})",
                                    stalllpobjval,
                                    lpobjval,
                                    objreldiff
                                );
                                if objreldiff > 1e-4
                                    || (nfracs as f64)
                                        <= (0.9 - 0.1 * nsepastallrounds as f64)
                                            * stallnfracs as f64
                                {
                                    nsepastallrounds = 0;
                                    stalllpobjval = lpobjval;
                                    stallnfracs = nfracs;
                                    self.lp.installing = false;
                                } else {
                                    nsepastallrounds += 1;
                                }
                                // tell the kernel we are (close to) stalling
                                if nsepastallrounds >= maxnsepastallrounds - 2 {
                                    self.lp.installing = true;
                                }
                                log::debug!(
                                    "nsepastallrounds={}/{}",
                                    nsepastallrounds,
                                    maxnsepastallrounds
                                );
                            }
                        }
                    }
                }

                log::debug!(
                    "separation round {} finished ({} stall rounds): mustprice={}, mustsepa={}, delayedsepa={}",
                    self.stat.nseparounds,
                    nsepastallrounds,
                    mustprice,
                    mustsepa,
                    delayedsepa
                );

                self.stat.nseparounds += 1;
            }
        }

        // update the lower bound with the final LP
        if out.cutoff {
            self.tree.update_focus_lower(self.set.infinity());
        } else if !out.lperror {
            debug_assert!(self.lp.flushed() && self.lp.solved);

            self.update_focus_lower_from_lp();
            self.update_estimate();

            // issue the LPSOLVED event
            if !matches!(
                self.lp.solstat(),
                LpSolstat::IterLimit | LpSolstat::TimeLimit
            ) {
                self.events.emit(Event::LpSolved(self.tree.focus_id()))?;
            }

            // analyze an infeasible LP (not necessary at the root)
            if !self.set.misc_exactsolve
                && !root
                && self.lp.isrelax
                && matches!(
                    self.lp.solstat(),
                    LpSolstat::Infeasible | LpSolstat::ObjLimit
                )
            {
                let channel = if self.lp.solstat() == LpSolstat::Infeasible {
                    ConflictChannel::InfeasibleLp
                } else {
                    ConflictChannel::BoundExceedingLp
                };
                self.conflict.analyze(channel, &self.tree);
            }

            // check for unboundedness
            if self.lp.solstat() == LpSolstat::UnboundedRay {
                debug_assert!(root);
                out.unbounded = true;
            }
        }
        self.lp.installing = false;

        log::debug!(
            "final lower bound of the price-and-cut loop: {} (LP status {:?})",
            self.tree.focus_lower(),
            self.lp.solstat()
        );

        Ok(out)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_pricecut {
    use crate::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Replays a scripted list of LP answers, repeating the last one.
    struct Scripted {
        answers: Vec<LpSolution>,
        next: usize,
    }
    impl LpKernel for Scripted {
        fn solve(
            &mut self,
            cols: &[LpCol],
            _: &[LpRow],
            _: &LpSolveReq,
        ) -> std::result::Result<LpSolution, LpError> {
            let mut sol = self.answers[self.next.min(self.answers.len() - 1)].clone();
            self.next += 1;
            sol.colvals.resize(cols.len(), 0.5);
            Ok(sol)
        }
    }

    fn optimal(objval: f64) -> LpSolution {
        LpSolution {
            solstat: LpSolstat::Optimal,
            objval,
            colvals: vec![],
            rowduals: vec![],
            iterations: 1,
        }
    }

    /// Adds one cut per call for a while, then stays quiet.
    struct CutMaker {
        ncuts: usize,
        ncalls: Rc<RefCell<usize>>,
        delayed_first: bool,
    }
    impl Separator for CutMaker {
        fn name(&self) -> &str {
            "cutmaker"
        }
        fn execute_lp(
            &mut self,
            data: &mut SolvingData,
            _depth: usize,
            _bounddist: f64,
            only_delayed: bool,
        ) -> Result<SepaResult> {
            let mut calls = self.ncalls.borrow_mut();
            *calls += 1;
            if self.delayed_first && !only_delayed {
                return Ok(SepaResult::Delayed);
            }
            if *calls <= self.ncuts {
                let n = *calls;
                data.add_cut(Row::new(
                    format!("cut{}", n),
                    f64::NEG_INFINITY,
                    10.0 + n as f64,
                    vec![(VarId(0), 1.0), (VarId(1), n as f64)],
                ));
                Ok(SepaResult::Separated)
            } else {
                Ok(SepaResult::DidNotFind)
            }
        }
    }

    fn solver(answers: Vec<LpSolution>) -> Solver {
        let mut prob = Prob::new("test");
        let x = prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        let y = prob.add_var(Var::new("y", 1.0, 0.0, 10.0, true));
        let mut s = Solver::new(prob, Set::default(), Box::new(Scripted { answers, next: 0 }));
        for (i, id) in [x, y].into_iter().enumerate() {
            s.lp.add_col(id);
            s.prob.var_mut(id).col = Some(i);
        }
        s.prob.ncolvars = 2;
        let root = Some(s.tree.root());
        s.tree
            .focus_node(root, &s.set, &mut s.prob, &mut s.lp, f64::INFINITY);
        s
    }

    #[test]
    fn an_improving_objective_keeps_the_stall_counter_at_zero() {
        // the LP objective rises by more than 1e-4 on every re-solve
        let answers: Vec<LpSolution> = (0..20).map(|i| optimal(i as f64)).collect();
        let ncalls = Rc::new(RefCell::new(0));
        let mut s = solver(answers);
        s.add_separator(Box::new(CutMaker {
            ncuts: 5,
            ncalls: Rc::clone(&ncalls),
            delayed_first: false,
        }));
        s.plugins.sort();

        let out = s.price_and_cut_loop(false).unwrap();
        assert!(!out.cutoff && !out.lperror && !out.pricingaborted);
        assert_eq!(LpSolstat::Optimal, s.lp.solstat());
        assert!(s.lp.isrelax);
        // 5 productive rounds plus the final idle one
        assert!(s.stat.nseparounds >= 6);
        assert!(!s.lp.installing);
    }

    #[test]
    fn stalling_hits_the_cap_and_sets_the_installing_hint() {
        // the objective never moves: every separation round stalls
        let set = SetBuilder::default().sepa_maxstallrounds(2).build().unwrap();
        let ncalls = Rc::new(RefCell::new(0));
        let mut prob = Prob::new("test");
        let x = prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        let y = prob.add_var(Var::new("y", 1.0, 0.0, 10.0, true));
        let mut s = Solver::new(
            prob,
            set,
            Box::new(Scripted {
                answers: vec![optimal(1.0)],
                next: 0,
            }),
        );
        for (i, id) in [x, y].into_iter().enumerate() {
            s.lp.add_col(id);
            s.prob.var_mut(id).col = Some(i);
        }
        s.prob.ncolvars = 2;
        let root = Some(s.tree.root());
        s.tree
            .focus_node(root, &s.set, &mut s.prob, &mut s.lp, f64::INFINITY);
        s.add_separator(Box::new(CutMaker {
            ncuts: 50,
            ncalls: Rc::clone(&ncalls),
            delayed_first: false,
        }));
        s.plugins.sort();

        let out = s.price_and_cut_loop(false).unwrap();
        assert!(!out.cutoff && !out.lperror);
        // the loop terminated despite the separator's endless supply
        assert!(s.stat.nseparounds <= 5);
        // the hint was raised while stalling; the exit path clears it
        assert!(!s.lp.installing);
    }

    #[test]
    fn delayed_separators_get_a_final_round() {
        let ncalls = Rc::new(RefCell::new(0));
        let mut s = solver(vec![optimal(1.0)]);
        s.add_separator(Box::new(CutMaker {
            ncuts: 0,
            ncalls: Rc::clone(&ncalls),
            delayed_first: true,
        }));
        s.plugins.sort();

        let out = s.price_and_cut_loop(false).unwrap();
        assert!(!out.cutoff && !out.lperror);
        // once delayed in the regular round, once worked off
        assert!(*ncalls.borrow() >= 2);
    }

    #[test]
    fn the_lpsolved_event_fires_on_a_clean_exit() {
        struct Recorder(Rc<RefCell<Vec<Event>>>);
        impl EventListener for Recorder {
            fn notify(&mut self, event: &Event) -> Result<()> {
                self.0.borrow_mut().push(*event);
                Ok(())
            }
        }
        let seen = Rc::new(RefCell::new(vec![]));
        let mut s = solver(vec![optimal(1.0)]);
        s.add_event_listener(Box::new(Recorder(Rc::clone(&seen))));
        s.plugins.sort();

        s.price_and_cut_loop(false).unwrap();
        assert!(seen
            .borrow()
            .iter()
            .any(|e| matches!(e, Event::LpSolved(_))));
    }

    #[test]
    fn a_deep_infeasible_lp_triggers_conflict_analysis() {
        let infeasible = LpSolution {
            solstat: LpSolstat::Infeasible,
            objval: 0.0,
            colvals: vec![],
            rowduals: vec![],
            iterations: 1,
        };
        let mut s = solver(vec![infeasible]);
        // move the focus below the root with one branching decision
        let mut data = super::super::data!(s);
        let children = data.branch_var(VarId(0), 4.5).unwrap();
        let down = children[0];
        s.tree
            .focus_node(Some(down), &s.set, &mut s.prob, &mut s.lp, f64::INFINITY);
        s.lp.isrelax = true;

        let out = s.price_and_cut_loop(false).unwrap();
        assert!(!out.cutoff);
        assert_eq!(
            1,
            s.conflict.n_success_of(ConflictChannel::InfeasibleLp)
        );
    }
}
