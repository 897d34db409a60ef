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

//! This module defines the `Separator` trait: a cutting plane algorithm that
//! is not tied to a particular constraint class.

use crate::{Result, SepaResult, Sol, SolvingData};

/// A cutting plane plug-in. Within a separation round, separators with
/// non-negative priority run before the constraint handlers, those with
/// negative priority after them.
///
/// A separator submits its cuts to the separation storage through the passed
/// [`SolvingData`]; the engine applies them in one batch at the end of the
/// round. Tightening a variable bound is allowed too, but invalidates the LP:
/// the engine re-solves it before the next LP-dependent plug-in runs.
pub trait Separator {
    /// A human readable identifier, used in logs and protocol errors.
    fn name(&self) -> &str;

    /// The priority deciding the position of this separator within a
    /// separation round.
    fn priority(&self) -> i32 {
        0
    }

    /// Separates the current LP solution. `bounddist` is the relative
    /// distance of the node's dual bound to the global dual bound; expensive
    /// separators may use it to restrict themselves to promising nodes.
    fn execute_lp(
        &mut self,
        _data: &mut SolvingData,
        _depth: usize,
        _bounddist: f64,
        _only_delayed: bool,
    ) -> Result<SepaResult> {
        Ok(SepaResult::DidNotRun)
    }

    /// Separates an arbitrary primal solution.
    fn execute_sol(
        &mut self,
        _data: &mut SolvingData,
        _sol: &Sol,
        _depth: usize,
        _only_delayed: bool,
    ) -> Result<SepaResult> {
        Ok(SepaResult::DidNotRun)
    }
}
