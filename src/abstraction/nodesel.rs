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

//! This module defines the `NodeSelector` trait: the strategy picking the
//! next node the tree driver will focus.

use crate::{NodeId, Result, Tree};

/// A node selection strategy. After every processed node the tree driver asks
/// the selector for the next node to focus among the focus node's children,
/// its siblings, and the open leaves. Returning `None` declares the tree
/// exhausted.
pub trait NodeSelector {
    /// A human readable identifier, used in logs and protocol errors.
    fn name(&self) -> &str;

    /// Selects the next node to be focused.
    fn select(&mut self, tree: &mut Tree) -> Result<Option<NodeId>>;
}
