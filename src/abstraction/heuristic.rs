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

//! This module defines the `Heuristic` trait: a primal heuristic trying to
//! construct feasible solutions at configurable points of the node solving
//! process.

use crate::{HeurResult, HeurTiming, Result, SolvingData};

/// A primal heuristic. The driver invokes a heuristic whenever the current
/// timing point intersects the heuristic's timing mask, in decreasing
/// priority order.
///
/// Solutions are submitted as candidates through the passed [`SolvingData`];
/// the engine checks them against the constraint handlers before they may
/// become incumbents. A heuristic must never leave the solver in probing or
/// diving mode; one that invalidated the LP on its way out must set the LP's
/// `resolvelperror` latch so the node solver can recover.
pub trait Heuristic {
    /// A human readable identifier, used in logs and protocol errors.
    fn name(&self) -> &str;

    /// The priority deciding the position of this heuristic at each timing
    /// point.
    fn priority(&self) -> i32 {
        0
    }

    /// The timing points this heuristic wants to be invoked at.
    fn timing_mask(&self) -> HeurTiming;

    /// Runs the heuristic. `lpforkdepth` is the depth of the LP-state fork
    /// ancestor of the focus node (or -1 when there is none), `timing` the
    /// (already specialized) point of invocation, and `ndelayed` the number
    /// of heuristics delayed so far in this window; a heuristic that answers
    /// `Delayed` must increment it.
    fn execute(
        &mut self,
        data: &mut SolvingData,
        depth: usize,
        lpforkdepth: i64,
        timing: HeurTiming,
        ndelayed: &mut usize,
    ) -> Result<HeurResult>;
}
