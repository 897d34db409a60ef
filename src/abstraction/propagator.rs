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

//! This module defines the `Propagator` trait: a domain propagation algorithm
//! that is not tied to a particular constraint class.

use crate::{PropResult, Result, SolvingData};

/// A domain propagation plug-in. Within a propagation round, propagators with
/// non-negative priority run before the constraint handlers, those with
/// negative priority after them; inside each group the order is by decreasing
/// priority.
///
/// A propagator tightens variable domains through the bound-change operations
/// of the passed [`SolvingData`] and reports what happened through its
/// [`PropResult`] verdict. Returning `Delayed` postpones the work: the engine
/// re-invokes only the delayed plug-ins when the round that would otherwise
/// terminate propagation would leave work behind.
pub trait Propagator {
    /// A human readable identifier, used in logs and protocol errors.
    fn name(&self) -> &str;

    /// The priority deciding the position of this propagator within a
    /// propagation round.
    fn priority(&self) -> i32 {
        0
    }

    /// Executes one propagation pass at the given depth. When `only_delayed`
    /// is set, the engine is working off the plug-ins that returned `Delayed`
    /// in the round before.
    fn execute(
        &mut self,
        data: &mut SolvingData,
        depth: usize,
        only_delayed: bool,
    ) -> Result<PropResult>;
}
