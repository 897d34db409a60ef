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

//! This module defines the `ConsHdlr` trait, the most powerful (and the most
//! demanding) plug-in family of the engine: a constraint handler owns the
//! semantics of one class of constraints and participates in LP
//! initialization, separation, propagation, enforcement and solution
//! checking.

use crate::{EnfoResult, Prob, PropResult, Result, SepaResult, Sol, SolvingData};

/// A constraint handler. The engine guarantees that within every driver round
/// the handlers are visited in a fixed order: registration order for
/// propagation and checking, decreasing `sepa_priority` for separation, and
/// decreasing `enfo_priority` for enforcement.
///
/// The enforcement callbacks are the only mandatory ones: a handler that
/// cannot decide feasibility of a candidate solution is not a constraint
/// handler. Everything else defaults to "does not participate".
pub trait ConsHdlr {
    /// A human readable identifier, used in logs and protocol errors.
    fn name(&self) -> &str;

    /// Priority of this handler within a separation round.
    fn sepa_priority(&self) -> i32 {
        0
    }

    /// Priority of this handler within constraint enforcement.
    fn enfo_priority(&self) -> i32 {
        0
    }

    /// Adds the LP relaxation of all initial constraints of this handler to
    /// the LP, by submitting rows to the separation storage. The engine
    /// re-invokes this after pricing rounds for constraints that became
    /// initial in the meantime; a handler must track which rows it already
    /// installed.
    fn init_lp(&mut self, _data: &mut SolvingData) -> Result<()> {
        Ok(())
    }

    /// Separates the current LP solution.
    fn separate_lp(
        &mut self,
        _data: &mut SolvingData,
        _depth: usize,
        _only_delayed: bool,
    ) -> Result<SepaResult> {
        Ok(SepaResult::DidNotRun)
    }

    /// Separates an arbitrary primal solution.
    fn separate_sol(
        &mut self,
        _data: &mut SolvingData,
        _sol: &Sol,
        _depth: usize,
        _only_delayed: bool,
    ) -> Result<SepaResult> {
        Ok(SepaResult::DidNotRun)
    }

    /// Propagates the domains of the variables appearing in this handler's
    /// constraints. Between the first and the final round of a node only the
    /// newly added constraints need to be looked at, unless `full` is set.
    fn propagate(
        &mut self,
        _data: &mut SolvingData,
        _depth: usize,
        _full: bool,
        _only_delayed: bool,
    ) -> Result<PropResult> {
        Ok(PropResult::DidNotRun)
    }

    /// Enforces the current LP solution. `infeasible` tells the handler that
    /// an earlier handler already found the solution infeasible (so a
    /// `Feasible` answer will not make the solution acceptable).
    fn enforce_lp(&mut self, data: &mut SolvingData, infeasible: bool) -> Result<EnfoResult>;

    /// Enforces the current pseudo solution. `objinfeasible` indicates that
    /// the pseudo solution is already known to violate the objective bound,
    /// in which case `DidNotRun` is an acceptable answer; `forced` demands a
    /// decision even then (the node's LP was unusable). A pseudo enforcement
    /// must never produce cuts.
    fn enforce_pseudo(
        &mut self,
        data: &mut SolvingData,
        infeasible: bool,
        objinfeasible: bool,
        forced: bool,
    ) -> Result<EnfoResult>;

    /// Decides whether the given primal solution satisfies all of this
    /// handler's constraints. Used by the primal store before a candidate
    /// solution may become an incumbent.
    fn check(&self, _prob: &Prob, _sol: &Sol) -> Result<bool> {
        Ok(true)
    }
}
