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

//! This module defines the `Relaxator` trait: an external lower bounding
//! procedure that complements (or replaces) the LP relaxation.

use crate::{RelaxResult, Result, SolvingData};

/// An external relaxator. Relaxators with non-negative priority run before
/// the node's LP is solved, those with negative priority after it.
///
/// Along with its verdict a relaxator reports a lower bound valid for the
/// current subproblem (`f64::NEG_INFINITY` when it has none); any verdict
/// other than `Cutoff`, `Suspended` and `DidNotRun` makes the engine fold
/// that bound into the focus node.
pub trait Relaxator {
    /// A human readable identifier, used in logs and protocol errors.
    fn name(&self) -> &str;

    /// The priority deciding both the position of this relaxator within its
    /// band and whether it runs before (>= 0) or after (< 0) the LP.
    fn priority(&self) -> i32 {
        0
    }

    /// Solves the relaxation for the current focus node.
    fn execute(&mut self, data: &mut SolvingData, depth: usize) -> Result<(f64, RelaxResult)>;
}
