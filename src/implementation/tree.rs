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

//! This module defines the branch-and-bound `Tree`. Nodes live in an arena
//! and reference each other through stable [`NodeId`] indices; the active
//! path from the root to the focus node is a dense vector indexed by depth.
//! Open leaves wait in a best-bound priority queue; the children and
//! siblings of the focus node are kept apart so the node selector can plunge
//! without touching the queue.

use std::cmp::Ordering;

use binary_heap_plus::BinaryHeap;
use compare::Compare;
use ordered_float::OrderedFloat;

use crate::{BdChg, BoundDir, Lp, NodeId, NodeType, Prob, Set, Stat};

/// One node of the search tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub ntype: NodeType,
    pub depth: usize,
    pub parent: Option<NodeId>,
    /// Local dual bound; non-decreasing over the node's lifetime
    pub lower: f64,
    /// Estimated objective value of the best solution in the subtree
    pub estimate: f64,
    /// The bound changes distinguishing this node from its parent
    pub domchg: Vec<BdChg>,
    /// Nearest ancestor whose LP state was stored (warm start source)
    pub lpfork: Option<NodeId>,
    /// Whether this node's own LP state was stored
    pub has_lpstate: bool,
    /// Whether the node lies on the active path
    pub active: bool,
    /// Whether the node must be repropagated when it regains focus
    pub reprop: bool,
    /// Whether the node was closed by a cutoff
    pub cutoff: bool,
}

/// An entry of the leaf queue. The recorded bound is the node's lower bound
/// at push time; entries turned stale by a focus switch or a cutoff are
/// skipped lazily when popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenNode {
    pub id: NodeId,
    pub lower: OrderedFloat<f64>,
}

/// Orders the leaf queue so the node with the smallest lower bound pops
/// first (the queue itself is a max-heap, hence the inversion).
#[derive(Debug, Clone, Copy, Default)]
pub struct BestBoundOrder;
impl Compare<OpenNode> for BestBoundOrder {
    fn compare(&self, l: &OpenNode, r: &OpenNode) -> Ordering {
        r.lower
            .cmp(&l.lower)
            .then_with(|| r.id.cmp(&l.id))
    }
}

/// The branch-and-bound tree.
pub struct Tree {
    nodes: Vec<Node>,
    /// The active path; `path[d]` is the depth-`d` ancestor of the focus
    path: Vec<NodeId>,
    focus: Option<NodeId>,
    children: Vec<NodeId>,
    siblings: Vec<NodeId>,
    leaves: BinaryHeap<OpenNode, BestBoundOrder>,
    /// Number of non-stale entries in `leaves`
    nleaves: usize,
    /// Smallest depth at which the active path was cut off
    pub cutoffdepth: usize,
    /// LP-state fork ancestor of the focus node
    pub focuslpstatefork: Option<NodeId>,
    /// Whether the focus node's LP was constructed already
    pub focuslpconstructed: bool,
    /// Whether the focus node is processed as an LP node
    pub focushaslp: bool,
}

impl Tree {
    /// Creates a tree holding nothing but an (open) root node.
    pub fn new(set: &Set) -> Self {
        let root = Node {
            ntype: NodeType::Leaf,
            depth: 0,
            parent: None,
            lower: -set.infinity(),
            estimate: -set.infinity(),
            domchg: vec![],
            lpfork: None,
            has_lpstate: false,
            active: false,
            reprop: false,
            cutoff: false,
        };
        let mut leaves = BinaryHeap::from_vec_cmp(vec![], BestBoundOrder);
        leaves.push(OpenNode {
            id: NodeId(0),
            lower: OrderedFloat(root.lower),
        });
        Tree {
            nodes: vec![root],
            path: vec![],
            focus: None,
            children: vec![],
            siblings: vec![],
            leaves,
            nleaves: 1,
            cutoffdepth: usize::MAX,
            focuslpstatefork: None,
            focuslpconstructed: false,
            focushaslp: false,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.id()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.id()]
    }

    pub fn focus(&self) -> Option<NodeId> {
        self.focus
    }

    /// The focus node id; must only be called while a node is in focus.
    pub fn focus_id(&self) -> NodeId {
        self.focus.expect("a node is in focus")
    }

    pub fn focus_depth(&self) -> usize {
        self.focus.map_or(0, |id| self.nodes[id.id()].depth)
    }

    pub fn focus_lower(&self) -> f64 {
        self.focus
            .map(|id| self.nodes[id.id()].lower)
            .unwrap_or(f64::NEG_INFINITY)
    }

    /// Depth of the LP-state fork ancestor, -1 when there is none.
    pub fn lpfork_depth(&self) -> i64 {
        self.focuslpstatefork
            .map_or(-1, |id| self.nodes[id.id()].depth as i64)
    }

    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn siblings(&self) -> &[NodeId] {
        &self.siblings
    }

    pub fn n_children(&self) -> usize {
        self.children.len()
    }

    /// The number of open (focusable) nodes: children, siblings and leaves.
    pub fn n_open(&self) -> usize {
        self.children.len() + self.siblings.len() + self.nleaves
    }

    /// Raises the focus node's lower bound (bounds never decrease).
    pub fn update_focus_lower(&mut self, bound: f64) {
        let id = self.focus_id();
        let node = &mut self.nodes[id.id()];
        if bound > node.lower {
            node.lower = bound;
        }
    }

    /// Sets the focus node's estimate.
    pub fn set_focus_estimate(&mut self, estimate: f64) {
        let id = self.focus_id();
        self.nodes[id.id()].estimate = estimate;
    }

    /// Records that the focus node's LP state was stored; its children can
    /// warm start from here.
    pub fn store_focus_lpstate(&mut self) {
        let id = self.focus_id();
        self.nodes[id.id()].has_lpstate = true;
    }

    /// Appends a bound change to the focus node's domain-change list.
    pub fn record_bound_change(&mut self, bc: BdChg) {
        let id = self.focus_id();
        self.nodes[id.id()].domchg.push(bc);
    }

    /// Marks the focus node for repropagation.
    pub fn mark_focus_reprop(&mut self) {
        let id = self.focus_id();
        self.nodes[id.id()].reprop = true;
    }

    /// Whether the focus node asked to be propagated again.
    pub fn focus_needs_reprop(&self) -> bool {
        self.focus.is_some_and(|id| self.nodes[id.id()].reprop)
    }

    /// Marks the focus node completely propagated in the current
    /// repropagation subtree level.
    pub fn mark_focus_propagated(&mut self) {
        let id = self.focus_id();
        self.nodes[id.id()].reprop = false;
    }

    /// Closes the focus node by cutoff: its bound jumps to infinity and the
    /// active path is flagged cut off from its depth on.
    pub fn cut_off_focus(&mut self, set: &Set) {
        let id = self.focus_id();
        let depth = self.nodes[id.id()].depth;
        let node = &mut self.nodes[id.id()];
        node.cutoff = true;
        node.lower = set.infinity();
        self.cutoffdepth = self.cutoffdepth.min(depth);
    }

    /// Creates a child of the focus node. The child starts out with its
    /// parent's lower bound and warm starts from the parent's LP state if
    /// one was stored, from the parent's own fork otherwise.
    pub fn create_child(&mut self, stat: &mut Stat, estimate: f64) -> NodeId {
        let parent = self.focus_id();
        let pnode = &self.nodes[parent.id()];
        let lpfork = if pnode.has_lpstate {
            Some(parent)
        } else {
            pnode.lpfork
        };
        let child = Node {
            ntype: NodeType::Child,
            depth: pnode.depth + 1,
            parent: Some(parent),
            lower: pnode.lower,
            estimate,
            domchg: vec![],
            lpfork,
            has_lpstate: false,
            active: false,
            reprop: false,
            cutoff: false,
        };
        self.nodes.push(child);
        let id = NodeId(self.nodes.len() - 1);
        self.children.push(id);
        stat.maxtotaldepth = stat.maxtotaldepth.max(self.nodes[id.id()].depth);
        id
    }

    /// Appends a bound change to a *child* node (used by branching rules
    /// while the parent is still the focus).
    pub fn record_child_bound_change(&mut self, child: NodeId, bc: BdChg) {
        self.nodes[child.id()].domchg.push(bc);
    }

    /// The child with the best (lowest) lower bound, ties broken by
    /// estimate.
    pub fn best_child(&self) -> Option<NodeId> {
        self.best_of(&self.children)
    }

    /// The sibling with the best (lowest) lower bound.
    pub fn best_sibling(&self) -> Option<NodeId> {
        self.best_of(&self.siblings)
    }

    fn best_of(&self, ids: &[NodeId]) -> Option<NodeId> {
        ids.iter()
            .copied()
            .min_by(|&a, &b| {
                let na = &self.nodes[a.id()];
                let nb = &self.nodes[b.id()];
                OrderedFloat(na.lower)
                    .cmp(&OrderedFloat(nb.lower))
                    .then_with(|| OrderedFloat(na.estimate).cmp(&OrderedFloat(nb.estimate)))
            })
    }

    /// The open leaf with the smallest lower bound, skipping entries turned
    /// stale by earlier focus switches.
    pub fn peek_best_leaf(&mut self) -> Option<NodeId> {
        while let Some(top) = self.leaves.peek().copied() {
            let node = &self.nodes[top.id.id()];
            if node.ntype == NodeType::Leaf && !node.cutoff {
                return Some(top.id);
            }
            self.leaves.pop();
        }
        None
    }

    /// The smallest lower bound over all open nodes and the focus node.
    pub fn lowerbound(&self, set: &Set) -> f64 {
        let mut lower = self.focus_lower().max(-set.infinity());
        if self.focus.is_none() {
            lower = set.infinity();
        }
        for &id in self.children.iter().chain(self.siblings.iter()) {
            lower = lower.min(self.nodes[id.id()].lower);
        }
        for open in self.leaves.iter() {
            let node = &self.nodes[open.id.id()];
            if node.ntype == NodeType::Leaf && !node.cutoff {
                lower = lower.min(node.lower);
            }
        }
        lower
    }

    fn push_leaf(&mut self, id: NodeId, set: &Set, cutoffbound: f64) {
        let node = &mut self.nodes[id.id()];
        if set.is_ge(node.lower, cutoffbound) {
            node.ntype = NodeType::Junction;
            node.cutoff = true;
            node.lower = set.infinity();
            return;
        }
        node.ntype = NodeType::Leaf;
        self.leaves.push(OpenNode {
            id,
            lower: OrderedFloat(node.lower),
        });
        self.nleaves += 1;
    }

    fn apply_domchg(&mut self, id: NodeId, prob: &mut Prob, lp: &mut Lp) {
        for i in 0..self.nodes[id.id()].domchg.len() {
            let bc = self.nodes[id.id()].domchg[i];
            let var = prob.var_mut(bc.var);
            match bc.dir {
                BoundDir::Lower => var.lb = bc.newbound,
                BoundDir::Upper => var.ub = bc.newbound,
            }
            if var.col.is_some() {
                lp.notify_bound_change();
            }
        }
    }

    fn undo_domchg(&mut self, id: NodeId, prob: &mut Prob, lp: &mut Lp) {
        for i in (0..self.nodes[id.id()].domchg.len()).rev() {
            let bc = self.nodes[id.id()].domchg[i];
            let var = prob.var_mut(bc.var);
            match bc.dir {
                BoundDir::Lower => var.lb = bc.oldbound,
                BoundDir::Upper => var.ub = bc.oldbound,
            }
            if var.col.is_some() {
                lp.notify_bound_change();
            }
        }
    }

    /// Focuses the given node (or none, to drain the tree). Relatives of the
    /// old focus are relocated, the active path is switched with all domain
    /// changes undone and replayed, and rows that are only valid below the
    /// common ancestor are unloaded from the LP.
    ///
    /// Returns `true` when the node turned out to lie in a cut off subtree
    /// (a delayed cutoff); the caller must then select another node.
    pub fn focus_node(
        &mut self,
        next: Option<NodeId>,
        set: &Set,
        prob: &mut Prob,
        lp: &mut Lp,
        cutoffbound: f64,
    ) -> bool {
        if let Some(id) = next {
            let node = &self.nodes[id.id()];
            if node.cutoff || set.is_ge(node.lower, cutoffbound) {
                let node = &mut self.nodes[id.id()];
                node.cutoff = true;
                node.lower = set.infinity();
                node.ntype = NodeType::Junction;
                self.children.retain(|&c| c != id);
                self.siblings.retain(|&c| c != id);
                if self.nleaves > 0 {
                    // the entry, if any, goes stale; fix the count lazily
                    self.nleaves = self.count_valid_leaves();
                }
                return true;
            }
        }

        let old = self.focus;
        let next_is_child = next.is_some_and(|id| self.nodes[id.id()].parent == old && old.is_some());
        let next_is_sibling = !next_is_child
            && next.is_some_and(|id| {
                old.is_some_and(|o| {
                    self.nodes[id.id()].parent == self.nodes[o.id()].parent
                        && self.siblings.contains(&id)
                })
            });

        // relocate the relatives of the old focus
        let mut tosibling: Vec<NodeId> = vec![];
        let mut toleaf: Vec<NodeId> = vec![];
        if next_is_child {
            tosibling.extend(self.children.iter().copied().filter(|&c| Some(c) != next));
            toleaf.append(&mut self.siblings);
        } else if next_is_sibling {
            tosibling.extend(self.siblings.iter().copied().filter(|&s| Some(s) != next));
            toleaf.append(&mut self.children);
        } else {
            toleaf.append(&mut self.children);
            toleaf.append(&mut self.siblings);
        }
        self.children.clear();
        self.siblings = tosibling;
        for &id in &self.siblings {
            self.nodes[id.id()].ntype = NodeType::Sibling;
        }
        for id in toleaf {
            self.push_leaf(id, set, cutoffbound);
        }

        // the old focus is closed; its domain changes stay for replay
        if let Some(o) = old {
            if Some(o) != next {
                self.nodes[o.id()].ntype = NodeType::Junction;
            }
        }

        // switch the active path
        let newpath = match next {
            None => vec![],
            Some(id) => {
                let mut chain = vec![id];
                let mut cur = self.nodes[id.id()].parent;
                while let Some(p) = cur {
                    chain.push(p);
                    cur = self.nodes[p.id()].parent;
                }
                chain.reverse();
                chain
            }
        };
        let mut common = 0;
        while common < self.path.len()
            && common < newpath.len()
            && self.path[common] == newpath[common]
        {
            common += 1;
        }
        for d in (common..self.path.len()).rev() {
            let id = self.path[d];
            self.undo_domchg(id, prob, lp);
            self.nodes[id.id()].active = false;
        }
        if next.is_some() {
            lp.remove_rows_below(common.saturating_sub(1));
        }
        for d in common..newpath.len() {
            let id = newpath[d];
            self.apply_domchg(id, prob, lp);
            self.nodes[id.id()].active = true;
        }
        self.path = newpath;

        self.focus = next;
        if let Some(id) = next {
            let was_focused = self.nodes[id.id()].ntype == NodeType::Junction;
            self.nodes[id.id()].ntype = if was_focused {
                NodeType::Refocus
            } else {
                NodeType::Focus
            };
            self.focuslpstatefork = self.nodes[id.id()].lpfork;
            if self.nleaves > 0 {
                self.nleaves = self.count_valid_leaves();
            }
        } else {
            self.focuslpstatefork = None;
        }
        self.focuslpconstructed = false;
        self.focushaslp = false;
        self.cutoffdepth = usize::MAX;
        false
    }

    fn count_valid_leaves(&self) -> usize {
        self.leaves
            .iter()
            .filter(|open| {
                let node = &self.nodes[open.id.id()];
                node.ntype == NodeType::Leaf && !node.cutoff
            })
            .count()
    }

    /// A coarse estimate of the memory held by the tree, in MB.
    pub fn estimate_mem_mb(&self) -> f64 {
        let node_bytes: usize = self
            .nodes
            .iter()
            .map(|n| std::mem::size_of::<Node>() + n.domchg.len() * std::mem::size_of::<BdChg>())
            .sum();
        let queue_bytes = self.leaves.len() * std::mem::size_of::<OpenNode>();
        (node_bytes + queue_bytes) as f64 / (1024.0 * 1024.0)
    }
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("nnodes", &self.nodes.len())
            .field("focus", &self.focus)
            .field("nchildren", &self.children.len())
            .field("nsiblings", &self.siblings.len())
            .field("nleaves", &self.nleaves)
            .finish()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_tree {
    use super::*;
    use crate::{BdChgOrigin, LpCol, LpError, LpKernel, LpRow, LpSolution, LpSolveReq, Var, VarId};

    struct NeverCalled;
    impl LpKernel for NeverCalled {
        fn solve(
            &mut self,
            _: &[LpCol],
            _: &[LpRow],
            _: &LpSolveReq,
        ) -> std::result::Result<LpSolution, LpError> {
            unreachable!("the tree tests never solve an LP")
        }
    }

    fn setup() -> (Set, Stat, Prob, Lp, Tree) {
        let set = Set::default();
        let stat = Stat::new();
        let mut prob = Prob::new("test");
        prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        let lp = Lp::new(Box::new(NeverCalled));
        let tree = Tree::new(&set);
        (set, stat, prob, lp, tree)
    }

    fn branch(tree: &mut Tree, stat: &mut Stat, var: VarId, val: f64) -> (NodeId, NodeId) {
        let down = tree.create_child(stat, 0.0);
        tree.record_child_bound_change(
            down,
            BdChg {
                var,
                dir: BoundDir::Upper,
                oldbound: 10.0,
                newbound: val.floor(),
                origin: BdChgOrigin::Branching { lpsolval: val },
            },
        );
        let up = tree.create_child(stat, 0.0);
        tree.record_child_bound_change(
            up,
            BdChg {
                var,
                dir: BoundDir::Lower,
                oldbound: 0.0,
                newbound: val.ceil(),
                origin: BdChgOrigin::Branching { lpsolval: val },
            },
        );
        (down, up)
    }

    #[test]
    fn the_fresh_tree_has_one_open_leaf() {
        let (_, _, _, _, mut tree) = setup();
        assert_eq!(1, tree.n_open());
        assert_eq!(Some(tree.root()), tree.peek_best_leaf());
    }

    #[test]
    fn focusing_the_root_empties_the_queue() {
        let (set, _, mut prob, mut lp, mut tree) = setup();
        let cutoff = tree.focus_node(Some(tree.root()), &set, &mut prob, &mut lp, f64::INFINITY);
        assert!(!cutoff);
        assert_eq!(Some(tree.root()), tree.focus());
        assert_eq!(0, tree.n_open());
        assert_eq!(&[tree.root()], tree.path());
    }

    #[test]
    fn focusing_a_child_applies_its_bound_changes() {
        let (set, mut stat, mut prob, mut lp, mut tree) = setup();
        tree.focus_node(Some(tree.root()), &set, &mut prob, &mut lp, f64::INFINITY);
        let (down, up) = branch(&mut tree, &mut stat, VarId(0), 4.5);

        tree.focus_node(Some(down), &set, &mut prob, &mut lp, f64::INFINITY);
        assert_eq!(4.0, prob.var(VarId(0)).ub);
        assert_eq!(0.0, prob.var(VarId(0)).lb);
        // the up-child became a sibling of the new focus
        assert_eq!(&[up], tree.siblings());
        assert_eq!(2, tree.path().len());
    }

    #[test]
    fn focusing_the_sibling_swaps_the_bound_changes() {
        let (set, mut stat, mut prob, mut lp, mut tree) = setup();
        tree.focus_node(Some(tree.root()), &set, &mut prob, &mut lp, f64::INFINITY);
        let (down, up) = branch(&mut tree, &mut stat, VarId(0), 4.5);
        tree.focus_node(Some(down), &set, &mut prob, &mut lp, f64::INFINITY);

        tree.focus_node(Some(up), &set, &mut prob, &mut lp, f64::INFINITY);
        assert_eq!(10.0, prob.var(VarId(0)).ub);
        assert_eq!(5.0, prob.var(VarId(0)).lb);
        assert!(tree.siblings().is_empty());
    }

    #[test]
    fn a_bounded_out_node_is_a_delayed_cutoff() {
        let (set, mut stat, mut prob, mut lp, mut tree) = setup();
        tree.focus_node(Some(tree.root()), &set, &mut prob, &mut lp, f64::INFINITY);
        let (down, _up) = branch(&mut tree, &mut stat, VarId(0), 4.5);
        tree.node_mut(down).lower = 100.0;

        let cutoff = tree.focus_node(Some(down), &set, &mut prob, &mut lp, 50.0);
        assert!(cutoff);
        assert!(tree.node(down).cutoff);
        assert!(set.is_infinity(tree.node(down).lower));
    }

    #[test]
    fn unfocused_relatives_become_leaves() {
        let (set, mut stat, mut prob, mut lp, mut tree) = setup();
        tree.focus_node(Some(tree.root()), &set, &mut prob, &mut lp, f64::INFINITY);
        let (down, up) = branch(&mut tree, &mut stat, VarId(0), 4.5);
        tree.node_mut(down).lower = 1.0;
        tree.node_mut(up).lower = 2.0;

        // jumping back to the root pushes both children to the leaf queue
        tree.focus_node(Some(down), &set, &mut prob, &mut lp, f64::INFINITY);
        let (dd, _du) = branch(&mut tree, &mut stat, VarId(0), 2.5);
        tree.focus_node(Some(dd), &set, &mut prob, &mut lp, f64::INFINITY);
        assert_eq!(&[up][..], {
            // up was pushed to the leaves when focusing dd
            let peek = tree.peek_best_leaf();
            assert!(peek.is_some());
            &[peek.unwrap()][..]
        });
    }

    #[test]
    fn lowerbound_is_the_min_over_open_nodes() {
        let (set, mut stat, mut prob, mut lp, mut tree) = setup();
        tree.focus_node(Some(tree.root()), &set, &mut prob, &mut lp, f64::INFINITY);
        tree.update_focus_lower(5.0);
        let (down, up) = branch(&mut tree, &mut stat, VarId(0), 4.5);
        tree.node_mut(down).lower = 6.0;
        tree.node_mut(up).lower = 7.0;
        assert_eq!(5.0, tree.lowerbound(&set));

        tree.focus_node(Some(down), &set, &mut prob, &mut lp, f64::INFINITY);
        assert_eq!(6.0, tree.lowerbound(&set));
    }

    #[test]
    fn focus_lower_is_monotone() {
        let (set, _, mut prob, mut lp, mut tree) = setup();
        tree.focus_node(Some(tree.root()), &set, &mut prob, &mut lp, f64::INFINITY);
        tree.update_focus_lower(3.0);
        tree.update_focus_lower(1.0);
        assert_eq!(3.0, tree.focus_lower());
    }

    #[test]
    fn children_inherit_the_lp_fork() {
        let (set, mut stat, mut prob, mut lp, mut tree) = setup();
        tree.focus_node(Some(tree.root()), &set, &mut prob, &mut lp, f64::INFINITY);
        tree.store_focus_lpstate();
        let (down, _) = branch(&mut tree, &mut stat, VarId(0), 4.5);
        assert_eq!(Some(tree.root()), tree.node(down).lpfork);

        tree.focus_node(Some(down), &set, &mut prob, &mut lp, f64::INFINITY);
        assert_eq!(Some(tree.root()), tree.focuslpstatefork);
        // no LP state stored here: the grandchild forks from the root too
        let (dd, _) = branch(&mut tree, &mut stat, VarId(0), 2.5);
        assert_eq!(Some(tree.root()), tree.node(dd).lpfork);
    }

    #[test]
    fn focusing_none_drains_the_path() {
        let (set, _, mut prob, mut lp, mut tree) = setup();
        tree.focus_node(Some(tree.root()), &set, &mut prob, &mut lp, f64::INFINITY);
        tree.focus_node(None, &set, &mut prob, &mut lp, f64::INFINITY);
        assert_eq!(None, tree.focus());
        assert!(tree.path().is_empty());
        assert!(!tree.node(NodeId(0)).active);
    }
}
