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

//! This module (and its submodules) provide the engine proper: the data
//! model (settings, statistics, problem, tree, LP), the storage components,
//! the plug-in registries, the drivers, and a handful of stock plug-in
//! implementations.

mod settings;
mod stat;
mod prob;
mod lp;
mod tree;
mod stores;
mod plugins;
mod events;
mod solver;
mod heuristics;

pub use settings::*;
pub use stat::*;
pub use prob::*;
pub use lp::*;
pub use tree::*;
pub use stores::*;
pub use plugins::*;
pub use events::*;
pub use solver::*;
pub use heuristics::*;
