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

//! This module provides the stock node selectors.

use crate::{NodeId, NodeSelector, Result, Tree};

/// _This is the default node selector._ It plunges into the children of the
/// focus node while there are any (then its siblings), and falls back to the
/// open leaf with the best lower bound. Plunging keeps the LP warm starts
/// cheap; the best-bound fallback keeps the global dual bound moving.
#[derive(Debug, Default, Copy, Clone)]
pub struct BestBoundSelector;

impl BestBoundSelector {
    pub fn new() -> Self {
        BestBoundSelector
    }
}

impl NodeSelector for BestBoundSelector {
    fn name(&self) -> &str {
        "bestbound"
    }

    fn select(&mut self, tree: &mut Tree) -> Result<Option<NodeId>> {
        if let Some(child) = tree.best_child() {
            return Ok(Some(child));
        }
        if let Some(sibling) = tree.best_sibling() {
            return Ok(Some(sibling));
        }
        Ok(tree.peek_best_leaf())
    }
}

/// A depth-first selector: children first, then siblings, and only when the
/// plunge is exhausted an open leaf. Useful when feasible solutions are deep
/// and memory is tight.
#[derive(Debug, Default, Copy, Clone)]
pub struct DepthFirstSelector;

impl DepthFirstSelector {
    pub fn new() -> Self {
        DepthFirstSelector
    }
}

impl NodeSelector for DepthFirstSelector {
    fn name(&self) -> &str {
        "dfs"
    }

    fn select(&mut self, tree: &mut Tree) -> Result<Option<NodeId>> {
        // take the most recently created child; the plunge should reach a
        // feasible leaf quickly
        if let Some(&child) = tree.children().last() {
            return Ok(Some(child));
        }
        if let Some(&sibling) = tree.siblings().last() {
            return Ok(Some(sibling));
        }
        Ok(tree.peek_best_leaf())
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
