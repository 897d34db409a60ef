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

//! The stop/status monitor: evaluates the configured limits in a fixed
//! priority order and caches the verdict in `Stat::status`.

use crate::{Solver, Status};

impl Solver {
    /// Recomputes `Stat::status` against the current limits and returns
    /// whether solving should halt.
    ///
    /// Node-count limits are only consulted when `check_node_limits` is set;
    /// a query from inside a node must not be stopped by them, and a status
    /// cached from an earlier outer check is masked out accordingly.
    pub fn is_stopped(&mut self, check_node_limits: bool) -> bool {
        let lower = self.tree.lowerbound(&self.set);
        let upper = self.primal.upperbound;

        // once the bounds meet, the run finishes normally; never report a
        // limit then
        if self.set.is_le(upper, lower) {
            return false;
        }

        if self.set.limit_changed {
            self.stat.status = Status::Unknown;
            self.set.limit_changed = false;
        }

        if self.stat.take_interrupt() {
            self.stat.status = Status::UserInterrupt;
        } else if self.stat.solving_time() >= self.set.limit_time {
            self.stat.status = Status::TimeLimit;
        } else if self.mem_used_mb() >= self.set.limit_memory {
            self.stat.status = Status::MemLimit;
        } else if self.set.is_lt(self.gap(), self.set.limit_gap) {
            self.stat.status = Status::GapLimit;
        } else if self.set.is_lt(upper - lower, self.set.limit_absgap) {
            self.stat.status = Status::GapLimit;
        } else if self.set.limit_solutions >= 0
            && self.primal.nsolsfound >= self.set.limit_solutions as u64
        {
            self.stat.status = Status::SolLimit;
        } else if self.set.limit_bestsol >= 0
            && self.primal.nbestsolsfound >= self.set.limit_bestsol as u64
        {
            self.stat.status = Status::BestSolLimit;
        } else if check_node_limits
            && self.set.limit_nodes >= 0
            && self.stat.nnodes >= self.set.limit_nodes as u64
        {
            self.stat.status = Status::NodeLimit;
        } else if check_node_limits
            && self.set.limit_stallnodes >= 0
            && self.stat.nnodes >= self.stat.bestsolnode + self.set.limit_stallnodes as u64
        {
            self.stat.status = Status::StallNodeLimit;
        }

        if check_node_limits {
            self.stat.status != Status::Unknown
        } else {
            // a node-interior query must not be stopped by a node limit that
            // an earlier outer check cached
            self.stat.status != Status::Unknown
                && self.stat.status != Status::NodeLimit
                && self.stat.status != Status::StallNodeLimit
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_stop {
    use crate::*;

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

    fn solver(set: Set) -> Solver {
        let mut prob = Prob::new("test");
        prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        Solver::new(prob, set, Box::new(NeverCalled))
    }

    #[test]
    fn no_limits_no_stop() {
        let mut s = solver(Set::default());
        assert!(!s.is_stopped(true));
        assert_eq!(Status::Unknown, s.status());
    }

    #[test]
    fn node_limit_stops_only_outer_checks() {
        let set = SetBuilder::default().limit_nodes(5).build().unwrap();
        let mut s = solver(set);
        s.stat.nnodes = 5;
        assert!(s.is_stopped(true));
        assert_eq!(Status::NodeLimit, s.status());
        // the cached node-limit status must not stop a node-interior query
        assert!(!s.is_stopped(false));
    }

    #[test]
    fn stall_node_limit_counts_from_the_best_solution() {
        let set = SetBuilder::default().limit_stallnodes(10).build().unwrap();
        let mut s = solver(set);
        s.stat.nnodes = 9;
        s.stat.bestsolnode = 0;
        assert!(!s.is_stopped(true));
        s.stat.nnodes = 10;
        assert!(s.is_stopped(true));
        assert_eq!(Status::StallNodeLimit, s.status());
    }

    #[test]
    fn the_interrupt_is_consumed_one_shot() {
        let mut s = solver(Set::default());
        s.interrupt_handle().interrupt();
        assert!(s.is_stopped(true));
        assert_eq!(Status::UserInterrupt, s.status());
    }

    #[test]
    fn a_changed_limit_resets_the_cached_status() {
        let set = SetBuilder::default().limit_nodes(5).build().unwrap();
        let mut s = solver(set);
        s.stat.nnodes = 5;
        assert!(s.is_stopped(true));
        s.set_mut().change_limit_nodes(100);
        assert!(!s.is_stopped(true));
        assert_eq!(Status::Unknown, s.status());
    }

    #[test]
    fn met_bounds_mask_every_limit() {
        let set = SetBuilder::default().limit_nodes(0).build().unwrap();
        let mut s = solver(set);
        s.tree.focus_node(
            Some(NodeId(0)),
            &Set::default(),
            &mut Prob::new("x"),
            &mut Lp::new(Box::new(NeverCalled)),
            f64::INFINITY,
        );
        s.tree.update_focus_lower(3.0);
        s.primal.upperbound = 3.0;
        assert!(!s.is_stopped(true));
    }

    #[test]
    fn solution_limits_fire_in_order() {
        let set = SetBuilder::default()
            .limit_solutions(2)
            .limit_bestsol(1)
            .build()
            .unwrap();
        let mut s = solver(set);
        s.primal.nsolsfound = 2;
        s.primal.nbestsolsfound = 1;
        assert!(s.is_stopped(true));
        // the solution limit ranks above the best-solution limit
        assert_eq!(Status::SolLimit, s.status());
    }
}
