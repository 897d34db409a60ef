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

//! This module defines the `Conflict` store. The analysis internals are the
//! business of an external collaborator; what the engine owns are the
//! trigger points (propagation cutoffs, infeasible and bound-exceeding LPs,
//! strong branching, pseudo-objective cutoffs), the per-channel success
//! counters feeding the conflict-driven restart, and the flush contract
//! turning accumulated conflict sets into constraints between nodes.

use crate::{BdChg, BdChgOrigin, NodeId, Tree};

/// The analysis channel a conflict set came from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ConflictChannel {
    Propagation,
    InfeasibleLp,
    BoundExceedingLp,
    StrongBranching,
    Pseudo,
}

/// A conflict set: a conjunction of branching bound changes that cannot all
/// hold in a feasible solution.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictSet {
    pub channel: ConflictChannel,
    pub bdchgs: Vec<BdChg>,
}

/// The conflict storage.
#[derive(Debug, Default)]
pub struct Conflict {
    conflictsets: Vec<ConflictSet>,
    nprop_success: u64,
    ninflp_success: u64,
    nboundlp_success: u64,
    nsb_success: u64,
    npseudo_success: u64,
    /// Conflict constraints handed out by `flush` over the whole solve
    pub nappliedconss: u64,
}

impl Conflict {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of conflict sets waiting to be flushed.
    pub fn n_conflicts(&self) -> usize {
        self.conflictsets.len()
    }

    /// The number of successful analysis calls summed over all channels;
    /// the quantity the conflict-driven restart is gated on.
    pub fn n_success(&self) -> u64 {
        self.nprop_success
            + self.ninflp_success
            + self.nboundlp_success
            + self.nsb_success
            + self.npseudo_success
    }

    pub fn n_success_of(&self, channel: ConflictChannel) -> u64 {
        match channel {
            ConflictChannel::Propagation => self.nprop_success,
            ConflictChannel::InfeasibleLp => self.ninflp_success,
            ConflictChannel::BoundExceedingLp => self.nboundlp_success,
            ConflictChannel::StrongBranching => self.nsb_success,
            ConflictChannel::Pseudo => self.npseudo_success,
        }
    }

    /// Runs one analysis on the given channel: the branching decisions on
    /// the active path form the conflict set. Analysis succeeds when the
    /// path carries at least one branching decision to blame.
    pub fn analyze(&mut self, channel: ConflictChannel, tree: &Tree) -> bool {
        let bdchgs: Vec<BdChg> = tree
            .path()
            .iter()
            .flat_map(|&id: &NodeId| tree.node(id).domchg.iter())
            .filter(|bc| matches!(bc.origin, BdChgOrigin::Branching { .. }))
            .copied()
            .collect();
        if bdchgs.is_empty() {
            return false;
        }
        log::debug!(
            "conflict analysis ({:?}) produced a set of {} bound changes",
            channel,
            bdchgs.len()
        );
        self.conflictsets.push(ConflictSet { channel, bdchgs });
        match channel {
            ConflictChannel::Propagation => self.nprop_success += 1,
            ConflictChannel::InfeasibleLp => self.ninflp_success += 1,
            ConflictChannel::BoundExceedingLp => self.nboundlp_success += 1,
            ConflictChannel::StrongBranching => self.nsb_success += 1,
            ConflictChannel::Pseudo => self.npseudo_success += 1,
        }
        true
    }

    /// Flushes the accumulated conflict sets into constraints. The engine
    /// has no constraint system of its own, so the sets are handed to the
    /// caller; interested constraint handlers pick them up from there.
    pub fn flush(&mut self) -> Vec<ConflictSet> {
        self.nappliedconss += self.conflictsets.len() as u64;
        std::mem::take(&mut self.conflictsets)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_conflict {
    use super::*;
    use crate::{
        BoundDir, Lp, LpCol, LpError, LpKernel, LpRow, LpSolution, LpSolveReq, Prob, Set, Stat,
        Var, VarId,
    };

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

    fn tree_with_branching() -> (Set, Tree) {
        let set = Set::default();
        let mut stat = Stat::new();
        let mut prob = Prob::new("test");
        prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        let mut lp = Lp::new(Box::new(NeverCalled));
        let mut tree = Tree::new(&set);
        tree.focus_node(Some(tree.root()), &set, &mut prob, &mut lp, f64::INFINITY);
        let child = tree.create_child(&mut stat, 0.0);
        tree.record_child_bound_change(
            child,
            BdChg {
                var: VarId(0),
                dir: BoundDir::Upper,
                oldbound: 10.0,
                newbound: 4.0,
                origin: BdChgOrigin::Branching { lpsolval: 4.5 },
            },
        );
        tree.focus_node(Some(child), &set, &mut prob, &mut lp, f64::INFINITY);
        (set, tree)
    }

    #[test]
    fn analysis_blames_the_branching_decisions_on_the_path() {
        let (_, tree) = tree_with_branching();
        let mut conflict = Conflict::new();
        assert!(conflict.analyze(ConflictChannel::InfeasibleLp, &tree));
        assert_eq!(1, conflict.n_conflicts());
        assert_eq!(1, conflict.n_success_of(ConflictChannel::InfeasibleLp));
        assert_eq!(1, conflict.n_success());
    }

    #[test]
    fn analysis_fails_without_branching_decisions() {
        let set = Set::default();
        let mut prob = Prob::new("test");
        prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        let mut lp = Lp::new(Box::new(NeverCalled));
        let mut tree = Tree::new(&set);
        tree.focus_node(Some(tree.root()), &set, &mut prob, &mut lp, f64::INFINITY);

        let mut conflict = Conflict::new();
        assert!(!conflict.analyze(ConflictChannel::Propagation, &tree));
        assert_eq!(0, conflict.n_success());
    }

    #[test]
    fn flushing_empties_the_storage_and_counts() {
        let (_, tree) = tree_with_branching();
        let mut conflict = Conflict::new();
        conflict.analyze(ConflictChannel::Pseudo, &tree);
        conflict.analyze(ConflictChannel::Propagation, &tree);

        let sets = conflict.flush();
        assert_eq!(2, sets.len());
        assert_eq!(0, conflict.n_conflicts());
        assert_eq!(2, conflict.nappliedconss);
        // the success counters survive the flush
        assert_eq!(2, conflict.n_success());
    }
}
