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

//! This module defines the most basic data types that are used throughout all
//! the code of our library (both at the abstraction and implementation levels).
//! These are also the types your plug-ins are likely to work with: identifiers,
//! plug-in verdicts, solver statuses, engine events and the error type.

// ----------------------------------------------------------------------------
// --- IDENTIFIERS ------------------------------------------------------------
// ----------------------------------------------------------------------------

/// This type denotes a variable of the transformed problem at hand. Each
/// variable is identified with an integer ranging from 0 until
/// `prob.n_vars()`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct VarId(pub usize);
impl VarId {
    #[inline]
    /// This function returns the id (numeric value) of the variable.
    pub fn id(self) -> usize {
        self.0
    }
}

/// The identifier of a node: it indicates the position of the referenced node
/// in the node arena of the search tree.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub usize);
impl NodeId {
    #[inline]
    /// This function returns the id (numeric value) of the node.
    pub fn id(self) -> usize {
        self.0
    }
}

/// The identifier of a row in the LP relaxation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RowId(pub usize);

// ----------------------------------------------------------------------------
// --- STATUSES ---------------------------------------------------------------
// ----------------------------------------------------------------------------

/// The status of the overall solving process, recomputed by the stop monitor
/// and finalized by the tree driver.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Status {
    /// The problem was not solved yet and no limit intervened
    Unknown,
    /// The user asked the solver to stop
    UserInterrupt,
    /// The node limit was reached
    NodeLimit,
    /// No improving solution was found within the stall node limit
    StallNodeLimit,
    /// The time limit was reached
    TimeLimit,
    /// The memory limit was reached
    MemLimit,
    /// The gap (or absolute gap) limit was reached
    GapLimit,
    /// The requested number of solutions was found
    SolLimit,
    /// The requested number of improving solutions was found
    BestSolLimit,
    /// The problem was solved to proven optimality
    Optimal,
    /// The problem admits no solution at least as good as the objective limit
    Infeasible,
    /// The problem is unbounded (a feasible solution exists)
    Unbounded,
    /// The problem is either infeasible or unbounded
    InfOrUnbd,
}

/// The status reported by the LP kernel for the most recent solve.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LpSolstat {
    /// The LP has not been solved in its current shape
    NotSolved,
    /// The LP was solved to a dual feasible optimum
    Optimal,
    /// The LP is primal infeasible
    Infeasible,
    /// The LP is unbounded and an unbounded primal ray exists
    UnboundedRay,
    /// The dual bound crossed the objective (cutoff) limit
    ObjLimit,
    /// The iteration limit was hit before convergence
    IterLimit,
    /// The time limit was hit before convergence
    TimeLimit,
    /// The kernel gave up with a numerical error
    Error,
}

// ----------------------------------------------------------------------------
// --- TREE VOCABULARY --------------------------------------------------------
// ----------------------------------------------------------------------------

/// The role a node currently plays in the search tree.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NodeType {
    /// The node that is currently being processed
    Focus,
    /// A formerly processed node that is focused a second time to be drained
    Refocus,
    /// A child of the focus node
    Child,
    /// A sibling of the focus node
    Sibling,
    /// An open node stored in the leaf queue
    Leaf,
    /// A temporary probing node (never focusable by the tree driver)
    Probing,
    /// A closed interior node kept for path reconstruction
    Junction,
}

/// The side of a variable domain a bound change applies to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BoundDir {
    Lower,
    Upper,
}

/// A branching direction, used by the pseudo-cost bookkeeping.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BranchDir {
    Down,
    Up,
}

/// Where a bound change originated. Branching changes additionally remember
/// the LP solution value of the variable at the moment the branching was
/// decided; the pseudo-cost updater needs it to attribute dual gains.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BdChgOrigin {
    Branching { lpsolval: f64 },
    ConsHdlr,
    Prop,
}

/// One bound change recorded in a node's domain-change list.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BdChg {
    pub var: VarId,
    pub dir: BoundDir,
    pub oldbound: f64,
    pub newbound: f64,
    pub origin: BdChgOrigin,
}

/// The transient marker used by the pseudo-cost updater to make sure a
/// variable is attributed at most one share of the dual gain per pass.
/// Invariant: the flag is `None` outside of that pass.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum PseudocostFlag {
    /// The variable's bounds were not changed
    #[default]
    None,
    /// Bound changes on the variable should be ignored for pseudo-cost updates
    Ignore,
    /// The pseudo-cost value of the variable should be updated
    Update,
}

// ----------------------------------------------------------------------------
// --- PLUG-IN VERDICTS -------------------------------------------------------
// ----------------------------------------------------------------------------

/// The verdict of a propagation call (propagator or constraint handler).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PropResult {
    /// The current subproblem was proven infeasible
    Cutoff,
    /// At least one domain was reduced
    ReducedDom,
    /// The plug-in chose to postpone its work to a later round
    Delayed,
    /// The plug-in ran but found no reduction
    DidNotFind,
    /// The plug-in skipped this invocation
    DidNotRun,
}

/// The verdict of a separation call (separator or constraint handler).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SepaResult {
    /// The current subproblem was proven infeasible
    Cutoff,
    /// A constraint was added that has to be propagated and separated itself
    ConsAdded,
    /// At least one cutting plane was added to the separation storage
    Separated,
    /// At least one domain was reduced
    ReducedDom,
    /// The plug-in chose to postpone its work to a later round
    Delayed,
    /// The plug-in ran but found no cut
    DidNotFind,
    /// The plug-in skipped this invocation
    DidNotRun,
}

/// The verdict of a constraint-handler enforcement call.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EnfoResult {
    /// The current subproblem was proven infeasible
    Cutoff,
    /// A constraint was added to resolve the infeasibility
    ConsAdded,
    /// A domain was reduced to resolve the infeasibility
    ReducedDom,
    /// A cutting plane was added to resolve the infeasibility
    Separated,
    /// The handler created children resolving the infeasibility
    Branched,
    /// The pseudo solution is unusable, the node's LP must be solved
    SolveLp,
    /// The solution is infeasible but the handler did not resolve it
    Infeasible,
    /// The solution satisfies all of the handler's constraints
    Feasible,
    /// The handler skipped the check (only valid on objective-infeasible
    /// pseudo solutions)
    DidNotRun,
}

/// The verdict of an external relaxator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RelaxResult {
    Cutoff,
    ConsAdded,
    ReducedDom,
    Separated,
    /// The relaxator wants to be called again before the node can be finished
    Suspended,
    Success,
    DidNotRun,
}

/// The verdict of a variable pricer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PricerResult {
    /// Pricing was performed exhaustively, the reported bound is valid
    Success,
    /// Pricing was skipped or incomplete; the price loop must record an abort
    DidNotRun,
}

/// The verdict of a branching rule.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BranchResult {
    Cutoff,
    ConsAdded,
    ReducedDom,
    Separated,
    Branched,
    DidNotRun,
}

/// The verdict of a primal heuristic.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HeurResult {
    /// At least one solution candidate was submitted
    FoundSol,
    /// The heuristic ran but found nothing
    DidNotFind,
    /// The heuristic skipped this invocation
    DidNotRun,
    /// The heuristic asked to be re-invoked at the end of the timing window
    Delayed,
}

// ----------------------------------------------------------------------------
// --- HEURISTIC TIMING -------------------------------------------------------
// ----------------------------------------------------------------------------

/// The points of the node solving process at which a primal heuristic may be
/// invoked. Timings are bit flags: a heuristic declares a mask of the timings
/// it wants, and the driver calls it whenever the current timing intersects
/// that mask.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub struct HeurTiming(pub u32);

impl HeurTiming {
    pub const BEFORE_NODE: HeurTiming = HeurTiming(1 << 0);
    pub const DURING_LP_LOOP: HeurTiming = HeurTiming(1 << 1);
    pub const AFTER_LP_LOOP: HeurTiming = HeurTiming(1 << 2);
    pub const AFTER_NODE: HeurTiming = HeurTiming(1 << 3);
    pub const DURING_PRICING_LOOP: HeurTiming = HeurTiming(1 << 4);
    pub const BEFORE_PRESOL: HeurTiming = HeurTiming(1 << 5);
    pub const DURING_PRESOL_LOOP: HeurTiming = HeurTiming(1 << 6);
    pub const AFTER_PROP_LOOP: HeurTiming = HeurTiming(1 << 7);
    /// The focus node had an LP and the next node is a child or sibling
    pub const AFTER_LP_NODE: HeurTiming = HeurTiming(1 << 8);
    /// The focus node had no LP and the next node is a child or sibling
    pub const AFTER_PSEUDO_NODE: HeurTiming = HeurTiming(1 << 9);
    /// The focus node had an LP and the plunge is over
    pub const AFTER_LP_PLUNGE: HeurTiming = HeurTiming(1 << 10);
    /// The focus node had no LP and the plunge is over
    pub const AFTER_PSEUDO_PLUNGE: HeurTiming = HeurTiming(1 << 11);

    /// Does the mask contain every bit of `other`?
    #[inline]
    pub fn contains(self, other: HeurTiming) -> bool {
        self.0 & other.0 == other.0
    }
    /// Does the mask share at least one bit with `other`?
    #[inline]
    pub fn intersects(self, other: HeurTiming) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for HeurTiming {
    type Output = HeurTiming;
    fn bitor(self, rhs: HeurTiming) -> HeurTiming {
        HeurTiming(self.0 | rhs.0)
    }
}
impl std::ops::BitOrAssign for HeurTiming {
    fn bitor_assign(&mut self, rhs: HeurTiming) {
        self.0 |= rhs.0;
    }
}
impl std::ops::BitAnd for HeurTiming {
    type Output = HeurTiming;
    fn bitand(self, rhs: HeurTiming) -> HeurTiming {
        HeurTiming(self.0 & rhs.0)
    }
}
impl std::ops::Not for HeurTiming {
    type Output = HeurTiming;
    fn not(self) -> HeurTiming {
        HeurTiming(!self.0)
    }
}

// ----------------------------------------------------------------------------
// --- EVENTS -----------------------------------------------------------------
// ----------------------------------------------------------------------------

/// The events produced by the core and broadcast to the global event filter.
/// Each event carries the focus node it refers to and is delivered before the
/// corresponding state transition is considered complete.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Event {
    /// A node was selected and focused by the tree driver
    NodeFocused(NodeId),
    /// The focus node's solution was accepted as feasible
    NodeFeasible(NodeId),
    /// The focus node was closed as infeasible without children
    NodeInfeasible(NodeId),
    /// The focus node was split into children
    NodeBranched(NodeId),
    /// The node's first LP was solved
    FirstLpSolved(NodeId),
    /// The node's last LP of the price-and-cut loop was solved
    LpSolved(NodeId),
}

impl Event {
    /// The focus node the event refers to.
    pub fn node(self) -> NodeId {
        match self {
            Event::NodeFocused(n)
            | Event::NodeFeasible(n)
            | Event::NodeInfeasible(n)
            | Event::NodeBranched(n)
            | Event::FirstLpSolved(n)
            | Event::LpSolved(n) => n,
        }
    }
}

// ----------------------------------------------------------------------------
// --- ERRORS -----------------------------------------------------------------
// ----------------------------------------------------------------------------

/// A numerical failure reported by the LP kernel. This is *not* a fatal error
/// by itself: the engine recovers from a bounded number of these per node by
/// downgrading the node to a pseudo node.
#[derive(Debug, Clone, thiserror::Error)]
#[error("numerical troubles in LP: {0}")]
pub struct LpError(pub String);

/// The fatal error kinds of the engine. Everything recoverable (LP numerical
/// failures below the per-node threshold, delayed plug-ins, stalling) is
/// handled locally and never surfaces here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Too many LP failures at one node, or a failure under a forced solve.
    #[error("(node {node}) unresolved numerical troubles in LP {lpcount} cannot be dealt with")]
    NumericalTroubles { node: u64, lpcount: u64 },

    /// A plug-in returned a verdict the calling driver does not accept.
    #[error("plug-in <{name}> returned invalid result <{result}> in {context}")]
    InvalidResult {
        name: String,
        context: &'static str,
        result: &'static str,
    },

    /// In exact-solve mode the LP claimed an infeasibility that cannot be
    /// proved while every variable is fixed and continuous variables remain.
    #[error("(node {node}) could not prove infeasibility of LP with all variables fixed: feature not yet implemented")]
    ExactSolveLimitation { node: u64 },
}

/// The result type used by every fallible operation of the engine.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_common {
    use super::*;

    #[test]
    fn test_var_id() {
        assert_eq!(0, VarId(0).id());
        assert_eq!(3, VarId(3).id());
        assert_eq!(7, NodeId(7).id());
    }

    #[test]
    fn timing_masks_combine() {
        let mask = HeurTiming::AFTER_LP_LOOP | HeurTiming::AFTER_NODE;
        assert!(mask.contains(HeurTiming::AFTER_NODE));
        assert!(mask.intersects(HeurTiming::AFTER_LP_LOOP));
        assert!(!mask.intersects(HeurTiming::BEFORE_NODE));
    }

    #[test]
    fn after_node_specialization_clears_the_generic_bit() {
        let mut timing = HeurTiming::AFTER_LP_LOOP | HeurTiming::AFTER_NODE;
        timing = timing & !HeurTiming::AFTER_NODE;
        timing |= HeurTiming::AFTER_LP_NODE;
        assert!(!timing.intersects(HeurTiming::AFTER_NODE));
        assert!(timing.intersects(HeurTiming::AFTER_LP_NODE));
    }

    #[test]
    fn events_carry_their_node() {
        assert_eq!(NodeId(4), Event::NodeFocused(NodeId(4)).node());
        assert_eq!(NodeId(2), Event::LpSolved(NodeId(2)).node());
    }

    #[test]
    fn pseudocost_flag_defaults_to_none() {
        assert_eq!(PseudocostFlag::None, PseudocostFlag::default());
    }
}
