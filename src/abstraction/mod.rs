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

//! This module (and its submodules) provide the abstractions for the plug-in
//! families the node processing engine consumes. A client willing to use our
//! library implements a selection of these traits -- at the very least a
//! constraint handler, a branching rule and an LP kernel -- and registers the
//! objects with the solver. The engine itself never knows anything about a
//! plug-in beyond its priority and the verdicts it returns.

mod propagator;
mod conshdlr;
mod separator;
mod pricer;
mod relaxator;
mod heuristic;
mod branching;
mod nodesel;
mod lp;
mod events;

pub use propagator::*;
pub use conshdlr::*;
pub use separator::*;
pub use pricer::*;
pub use relaxator::*;
pub use heuristic::*;
pub use branching::*;
pub use nodesel::*;
pub use lp::*;
pub use events::*;
