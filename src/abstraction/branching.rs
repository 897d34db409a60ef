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

//! This module defines the `BranchRule` trait: the strategy splitting an
//! unresolved node into children.

use crate::{BranchResult, Result, SolvingData};

/// A branching rule. When enforcement flagged the node solution infeasible
/// without resolving it, the engine asks the branching rules -- in
/// decreasing priority order, stopping at the first verdict other than
/// `DidNotRun` -- to split the node. Three entry points exist, tried in
/// order by the node solver: branching on the LP solution (only when
/// fractional candidates exist), on externally registered candidates, and on
/// the pseudo solution.
///
/// `allow_addcons` tells the rule whether a `ConsAdded` verdict is
/// acceptable; it never is for LP branching, because adding a constraint
/// need not change the LP and could loop forever.
pub trait BranchRule {
    /// A human readable identifier, used in logs and protocol errors.
    fn name(&self) -> &str;

    /// The priority deciding the position of this rule among its peers.
    fn priority(&self) -> i32 {
        0
    }

    /// Branches on the current LP solution.
    fn execute_lp(
        &mut self,
        _data: &mut SolvingData,
        _allow_addcons: bool,
    ) -> Result<BranchResult> {
        Ok(BranchResult::DidNotRun)
    }

    /// Branches on the externally registered branching candidates.
    fn execute_extern(
        &mut self,
        _data: &mut SolvingData,
        _allow_addcons: bool,
    ) -> Result<BranchResult> {
        Ok(BranchResult::DidNotRun)
    }

    /// Branches on the pseudo solution.
    fn execute_pseudo(
        &mut self,
        _data: &mut SolvingData,
        _allow_addcons: bool,
    ) -> Result<BranchResult> {
        Ok(BranchResult::DidNotRun)
    }
}
