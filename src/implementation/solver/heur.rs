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

//! The primal heuristics driver: invokes the registered heuristics at one
//! timing point, specializing the generic after-node timing into the
//! LP/pseudo and node/plunge variants based on the upcoming node.

use super::{data, SolvingData};
use crate::{HeurTiming, NodeId, NodeType, Result, Solver};

impl Solver {
    /// Calls the primal heuristics whose timing mask intersects the given
    /// timing. `nextnode` is the node the tree driver will focus next (if
    /// known); the after-node heuristics need it to distinguish plunging
    /// from jumping. Returns whether a new incumbent was found.
    pub(crate) fn primal_heuristics(
        &mut self,
        timing: HeurTiming,
        nextnode: Option<NodeId>,
    ) -> Result<bool> {
        if self.plugins.heurs.is_empty() {
            return Ok(false);
        }
        // nothing left to do once the branch-and-bound process is finished
        if timing == HeurTiming::AFTER_NODE && nextnode.is_none() {
            return Ok(false);
        }

        // specialize the AFTER_NODE timing flag
        let mut timing = timing;
        if timing.contains(HeurTiming::AFTER_NODE) {
            timing = timing & !HeurTiming::AFTER_NODE;

            // we are plunging iff the next node is a sibling or a child
            let plunging = nextnode.is_some_and(|id| {
                matches!(
                    self.tree.node(id).ntype,
                    NodeType::Child | NodeType::Sibling
                )
            });
            let pseudonode = !self.tree.focushaslp;
            if plunging && self.tree.focus_depth() > 0 {
                timing |= if pseudonode {
                    HeurTiming::AFTER_PSEUDO_NODE
                } else {
                    HeurTiming::AFTER_LP_NODE
                };
            } else if pseudonode {
                timing |= HeurTiming::AFTER_PSEUDO_PLUNGE | HeurTiming::AFTER_PSEUDO_NODE;
            } else {
                timing |= HeurTiming::AFTER_LP_PLUNGE | HeurTiming::AFTER_LP_NODE;
            }
        }

        let depth = self.tree.focus_depth();
        let lpforkdepth = self.tree.lpfork_depth();
        let oldnbestsols = self.primal.nbestsolsfound;
        let mut ndelayed = 0usize;

        for i in self.plugins.heur_order() {
            // a diving heuristic may render the previously solved node LP
            // invalid; further LP heuristics would only fail
            if self.lp.resolvelperror {
                break;
            }
            if !self.plugins.heurs[i].timing_mask().intersects(timing) {
                continue;
            }
            log::debug!(
                "executing heuristic <{}> at timing {:?}",
                self.plugins.heurs[i].name(),
                timing
            );
            let mut data = data!(self);
            let _result =
                self.plugins.heurs[i].execute(&mut data, depth, lpforkdepth, timing, &mut ndelayed)?;
            self.try_candidate_sols()?;
        }

        Ok(self.primal.nbestsolsfound > oldnbestsols)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
