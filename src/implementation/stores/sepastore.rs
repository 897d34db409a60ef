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

//! This module defines the `Sepastore`, the buffer collecting candidate
//! cuts before they are applied to the LP in one batch. During constraint
//! enforcement the store runs in forced mode: enforcement-generated cuts
//! bypass any selection policy, a constraint handler relying on its cut
//! entering the LP must not be second-guessed.

use fxhash::FxHashSet;

use crate::Row;

/// The separation storage.
#[derive(Debug, Default)]
pub struct Sepastore {
    cuts: Vec<Row>,
    hashes: FxHashSet<u64>,
    forcecuts: bool,
    initiallp: bool,
    /// Cuts submitted over the whole solve
    pub ncutsfound: u64,
    /// Cuts actually entered into the LP
    pub ncutsapplied: u64,
}

impl Sepastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters forced mode: every submitted cut will be applied.
    pub fn start_force_cuts(&mut self) {
        self.forcecuts = true;
    }

    pub fn end_force_cuts(&mut self) {
        self.forcecuts = false;
    }

    /// Whether submitted cuts currently bypass the selection policy.
    pub fn forced(&self) -> bool {
        self.forcecuts || self.initiallp
    }

    /// Informs the storage that the initial LP is being populated.
    pub fn start_initial_lp(&mut self) {
        self.initiallp = true;
    }

    pub fn end_initial_lp(&mut self) {
        self.initiallp = false;
    }

    /// Submits a cut. Exact duplicates of cuts already waiting are dropped.
    pub fn add_cut(&mut self, row: Row) {
        if !self.hashes.insert(row.hash_key()) {
            return;
        }
        self.cuts.push(row);
        self.ncutsfound += 1;
    }

    /// The number of cuts waiting to be applied.
    pub fn n_cuts(&self) -> usize {
        self.cuts.len()
    }

    /// Removes and returns all waiting cuts for application.
    pub fn take_cuts(&mut self) -> Vec<Row> {
        self.hashes.clear();
        std::mem::take(&mut self.cuts)
    }

    /// Drops all waiting cuts; used when the node is infeasible anyway and
    /// the cuts are of no use.
    pub fn clear_cuts(&mut self) {
        self.hashes.clear();
        self.cuts.clear();
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
