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

//! The domain propagation driver. One round visits the propagators with
//! non-negative priority, then the constraint handlers, then the negative
//! priority propagators; rounds repeat while reductions keep coming. The
//! delayed plug-ins are worked off exactly when the round that would
//! otherwise terminate the loop would leave delayed work behind.

use super::data;
use super::SolvingData;
use crate::{PropResult, Result, Solver};

/// The aggregated flags of one propagation round.
#[derive(Debug, Default, Clone, Copy)]
struct PropRound {
    delayed: bool,
    propagain: bool,
    cutoff: bool,
}

impl Solver {
    /// Applies one round of propagation by calling the propagators and the
    /// constraint handlers in their prescribed order.
    fn propagation_round(
        &mut self,
        depth: usize,
        fullpropagation: bool,
        onlydelayed: bool,
    ) -> Result<PropRound> {
        let mut round = PropRound::default();
        let abortoncutoff = self.set.prop_abortoncutoff;

        // call propagators with non-negative priority
        for i in self.plugins.prop_order() {
            if round.cutoff && abortoncutoff {
                break;
            }
            if self.plugins.props[i].plugin.priority() < 0 {
                continue;
            }
            if onlydelayed && !self.plugins.props[i].delayed {
                continue;
            }
            let mut data = data!(self);
            let result = self.plugins.props[i]
                .plugin
                .execute(&mut data, depth, onlydelayed)?;
            self.plugins.props[i].delayed = result == PropResult::Delayed;
            round.delayed |= result == PropResult::Delayed;
            round.propagain |= result == PropResult::ReducedDom;
            round.cutoff |= result == PropResult::Cutoff;
            if result == PropResult::Cutoff {
                log::debug!(
                    "propagator <{}> detected a cutoff",
                    self.plugins.props[i].plugin.name()
                );
            }
            // working off the delayed plug-ins stops at the first reduction
            if onlydelayed && result == PropResult::ReducedDom {
                round.delayed = true;
                return Ok(round);
            }
        }

        // propagate constraints
        for i in 0..self.plugins.conshdlrs.len() {
            if round.cutoff && abortoncutoff {
                break;
            }
            if onlydelayed && !self.plugins.conshdlrs[i].prop_delayed {
                continue;
            }
            let mut data = data!(self);
            let result = self.plugins.conshdlrs[i].plugin.propagate(
                &mut data,
                depth,
                fullpropagation,
                onlydelayed,
            )?;
            self.plugins.conshdlrs[i].prop_delayed = result == PropResult::Delayed;
            round.delayed |= result == PropResult::Delayed;
            round.propagain |= result == PropResult::ReducedDom;
            round.cutoff |= result == PropResult::Cutoff;
            if result == PropResult::Cutoff {
                log::debug!(
                    "constraint handler <{}> detected a cutoff in propagation",
                    self.plugins.conshdlrs[i].plugin.name()
                );
            }
            if onlydelayed && result == PropResult::ReducedDom {
                round.delayed = true;
                return Ok(round);
            }
        }

        // call propagators with negative priority
        for i in self.plugins.prop_order() {
            if round.cutoff && abortoncutoff {
                break;
            }
            if self.plugins.props[i].plugin.priority() >= 0 {
                continue;
            }
            if onlydelayed && !self.plugins.props[i].delayed {
                continue;
            }
            let mut data = data!(self);
            let result = self.plugins.props[i]
                .plugin
                .execute(&mut data, depth, onlydelayed)?;
            self.plugins.props[i].delayed = result == PropResult::Delayed;
            round.delayed |= result == PropResult::Delayed;
            round.propagain |= result == PropResult::ReducedDom;
            round.cutoff |= result == PropResult::Cutoff;
            if onlydelayed && result == PropResult::ReducedDom {
                round.delayed = true;
                return Ok(round);
            }
        }

        Ok(round)
    }

    /// Applies propagation rounds on the focus node until no further
    /// reductions are found, a cutoff is detected, the round limit is
    /// exhausted, or a stop is signalled.
    ///
    /// `maxrounds == 0` uses the configured cap (root vs non-root),
    /// `maxrounds == -1` removes the cap. The node is marked propagated on
    /// completion.
    pub(crate) fn propagate_domains(
        &mut self,
        depth: usize,
        maxrounds: i32,
        mut fullpropagation: bool,
    ) -> Result<bool> {
        let mut maxrounds = match maxrounds {
            0 => {
                if depth == 0 {
                    self.set.prop_maxroundsroot
                } else {
                    self.set.prop_maxrounds
                }
            }
            n => n,
        };
        if maxrounds == -1 {
            maxrounds = i32::MAX;
        }

        log::debug!(
            "domain propagation of node in depth {} (maxrounds {})",
            depth,
            maxrounds
        );

        let mut cutoff = false;
        let mut propround = 0;
        let mut propagain = true;
        while propagain && !cutoff && propround < maxrounds && !self.is_stopped(false) {
            propround += 1;

            let round = self.propagation_round(depth, fullpropagation, false)?;
            propagain = round.propagain;
            cutoff = round.cutoff;
            let mut delayed = round.delayed;

            // if the propagation would terminate, work off the delayed
            // plug-ins until nothing is delayed or new reductions appear
            while delayed && (!propagain || propround >= maxrounds) && !cutoff {
                let round = self.propagation_round(depth, fullpropagation, true)?;
                delayed = round.delayed;
                propagain |= round.propagain;
                cutoff |= round.cutoff;
            }

            // a reduction was found: the next round has to look at all
            // constraints again, even if the plug-in applied no change itself
            fullpropagation = true;
        }

        self.tree.mark_focus_propagated();

        Ok(cutoff)
    }

    /// Applies domain propagation on the focus node and flushes the conflict
    /// storage afterwards.
    pub fn propagate(&mut self, depth: usize, maxrounds: i32, full: bool) -> Result<bool> {
        let cutoff = self.propagate_domains(depth, maxrounds, full)?;
        let _conflictsets = self.conflict.flush();
        Ok(cutoff)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
