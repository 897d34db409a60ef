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

//! The relaxation driver: calls the external relaxators in two priority
//! bands (non-negative before the LP, negative after it) and folds their
//! lower bounds into the focus node.

use super::data;
use super::SolvingData;
use crate::{RelaxResult, Result, Solver};

/// The aggregated flags of one relaxation pass.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct RelaxOutcome {
    pub cutoff: bool,
    pub propagateagain: bool,
    pub solvelpagain: bool,
    pub solverelaxagain: bool,
}

impl Solver {
    /// Calls the relaxators of the band selected by `beforelp`.
    pub(crate) fn solve_node_relax(
        &mut self,
        depth: usize,
        beforelp: bool,
    ) -> Result<RelaxOutcome> {
        let mut out = RelaxOutcome::default();

        for r in self.plugins.relax_order() {
            if out.cutoff {
                break;
            }
            if beforelp != (self.plugins.relaxs[r].plugin.priority() >= 0) {
                continue;
            }

            let mut data = data!(self);
            let (lowerbound, result) =
                self.plugins.relaxs[r].plugin.execute(&mut data, depth)?;
            self.plugins.relaxs[r].solved = result != RelaxResult::Suspended;

            match result {
                RelaxResult::Cutoff => {
                    out.cutoff = true;
                    log::debug!(
                        "relaxator <{}> detected a cutoff",
                        self.plugins.relaxs[r].plugin.name()
                    );
                }
                RelaxResult::ConsAdded => {
                    // new constraints have to be both propagated and separated
                    out.solvelpagain = true;
                    out.propagateagain = true;
                }
                RelaxResult::ReducedDom => {
                    out.solvelpagain = true;
                    out.propagateagain = true;
                }
                RelaxResult::Separated => {
                    out.solvelpagain = true;
                }
                RelaxResult::Suspended => {
                    out.solverelaxagain = true;
                }
                RelaxResult::Success | RelaxResult::DidNotRun => {}
            }

            if !matches!(
                result,
                RelaxResult::Cutoff | RelaxResult::DidNotRun | RelaxResult::Suspended
            ) {
                self.tree.update_focus_lower(lowerbound);
                log::debug!(
                    "new lower bound given by relaxator <{}>: {}",
                    self.plugins.relaxs[r].plugin.name(),
                    lowerbound
                );
            }
        }

        Ok(out)
    }

    /// Invalidates the work of every relaxator; called whenever an improved
    /// incumbent, a new constraint, a reduced domain or a new cut makes
    /// their previous answers stale.
    pub(crate) fn mark_relaxs_unsolved(&mut self) {
        for entry in self.plugins.relaxs.iter_mut() {
            entry.solved = false;
        }
    }

    /// Whether some relaxator must be called again before the node can be
    /// finished.
    pub(crate) fn relaxs_unsolved(&self) -> bool {
        self.plugins.relaxs.iter().any(|entry| !entry.solved)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_relax {
    use crate::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct NeverCalled;
    impl LpKernel for NeverCalled {
        fn solve(
            &mut self,
            _: &[LpCol],
            _: &[LpRow],
            _: &LpSolveReq,
        ) -> std::result::Result<LpSolution, LpError> {
            unreachable!()
        }
    }

    struct Scripted {
        name: &'static str,
        prio: i32,
        verdicts: Vec<(f64, RelaxResult)>,
        calls: Rc<RefCell<Vec<&'static str>>>,
        next: usize,
    }
    impl Relaxator for Scripted {
        fn name(&self) -> &str {
            self.name
        }
        fn priority(&self) -> i32 {
            self.prio
        }
        fn execute(&mut self, _data: &mut SolvingData, _depth: usize) -> Result<(f64, RelaxResult)> {
            self.calls.borrow_mut().push(self.name);
            let v = self
                .verdicts
                .get(self.next)
                .copied()
                .unwrap_or((-f64::INFINITY, RelaxResult::DidNotRun));
            self.next += 1;
            Ok(v)
        }
    }

    fn solver() -> Solver {
        let mut prob = Prob::new("test");
        prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        let mut s = Solver::new(prob, Set::default(), Box::new(NeverCalled));
        let root = Some(s.tree.root());
        s.tree
            .focus_node(root, &s.set, &mut s.prob, &mut s.lp, f64::INFINITY);
        s
    }

    #[test]
    fn bands_are_selected_by_priority_sign() {
        let calls = Rc::new(RefCell::new(vec![]));
        let mut s = solver();
        s.add_relaxator(Box::new(Scripted {
            name: "pre",
            prio: 10,
            verdicts: vec![(1.0, RelaxResult::Success)],
            calls: Rc::clone(&calls),
            next: 0,
        }));
        s.add_relaxator(Box::new(Scripted {
            name: "post",
            prio: -10,
            verdicts: vec![(2.0, RelaxResult::Success)],
            calls: Rc::clone(&calls),
            next: 0,
        }));
        s.plugins.sort();

        s.solve_node_relax(0, true).unwrap();
        assert_eq!(vec!["pre"], *calls.borrow());
        assert_eq!(1.0, s.tree.focus_lower());

        s.solve_node_relax(0, false).unwrap();
        assert_eq!(vec!["pre", "post"], *calls.borrow());
        assert_eq!(2.0, s.tree.focus_lower());
    }

    #[test]
    fn reduced_domains_request_propagation_and_lp() {
        let calls = Rc::new(RefCell::new(vec![]));
        let mut s = solver();
        s.add_relaxator(Box::new(Scripted {
            name: "reducer",
            prio: 0,
            verdicts: vec![(0.5, RelaxResult::ReducedDom)],
            calls: Rc::clone(&calls),
            next: 0,
        }));
        s.plugins.sort();

        let out = s.solve_node_relax(0, true).unwrap();
        assert!(out.propagateagain && out.solvelpagain);
        assert!(!out.solverelaxagain);
        // a reduced domain still reports a usable bound
        assert_eq!(0.5, s.tree.focus_lower());
    }

    #[test]
    fn suspended_relaxators_request_another_pass() {
        let calls = Rc::new(RefCell::new(vec![]));
        let mut s = solver();
        s.add_relaxator(Box::new(Scripted {
            name: "suspended",
            prio: 0,
            verdicts: vec![(-f64::INFINITY, RelaxResult::Suspended)],
            calls: Rc::clone(&calls),
            next: 0,
        }));
        s.plugins.sort();

        let out = s.solve_node_relax(0, true).unwrap();
        assert!(out.solverelaxagain);
        assert!(s.relaxs_unsolved());
        // the suspended bound is not folded in
        assert_eq!(-f64::INFINITY, s.tree.focus_lower());
    }

    #[test]
    fn a_cutoff_stops_the_band() {
        let calls = Rc::new(RefCell::new(vec![]));
        let mut s = solver();
        s.add_relaxator(Box::new(Scripted {
            name: "cutter",
            prio: 10,
            verdicts: vec![(0.0, RelaxResult::Cutoff)],
            calls: Rc::clone(&calls),
            next: 0,
        }));
        s.add_relaxator(Box::new(Scripted {
            name: "unreached",
            prio: 5,
            verdicts: vec![],
            calls: Rc::clone(&calls),
            next: 0,
        }));
        s.plugins.sort();

        let out = s.solve_node_relax(0, true).unwrap();
        assert!(out.cutoff);
        assert_eq!(vec!["cutter"], *calls.borrow());
    }

    #[test]
    fn marking_unsolved_resets_every_relaxator() {
        let calls = Rc::new(RefCell::new(vec![]));
        let mut s = solver();
        s.add_relaxator(Box::new(Scripted {
            name: "a",
            prio: 0,
            verdicts: vec![(0.0, RelaxResult::Success)],
            calls: Rc::clone(&calls),
            next: 0,
        }));
        s.plugins.sort();

        s.solve_node_relax(0, true).unwrap();
        assert!(!s.relaxs_unsolved());
        s.mark_relaxs_unsolved();
        assert!(s.relaxs_unsolved());
    }
}
