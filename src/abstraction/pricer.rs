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

//! This module defines the `Pricer` trait: a column generation algorithm that
//! creates problem variables on demand.

use crate::{PricerResult, Result, SolvingData};

/// A variable pricer. Active pricers are called in decreasing priority order
/// within each pricing round until the pricing storage holds enough
/// candidate columns.
///
/// A pricer inspects the current LP (typically its dual solution) through the
/// passed [`SolvingData`], creates promising variables, and submits them to
/// the pricing storage. Along with its verdict it reports a valid lower bound
/// on the subproblem objective, or `f64::NEG_INFINITY` when it cannot provide
/// one. A `DidNotRun` verdict taints the whole price loop: the resulting LP
/// value must no longer be used as a dual bound.
pub trait Pricer {
    /// A human readable identifier, used in logs and protocol errors.
    fn name(&self) -> &str;

    /// The priority deciding the position of this pricer within a round.
    fn priority(&self) -> i32 {
        0
    }

    /// Whether the pricer participates in the current problem. Restarts are
    /// forbidden while any pricer is active.
    fn is_active(&self) -> bool {
        true
    }

    /// Performs one pricing pass, returning a lower bound and a verdict.
    fn execute(&mut self, data: &mut SolvingData) -> Result<(f64, PricerResult)>;
}
