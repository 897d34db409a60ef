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

//! This module defines the global `Cutpool`: cuts that proved useful once
//! are kept around, deduplicated, and re-separated against later LP
//! solutions; cuts that stay quiet for too long age out.

use fxhash::FxHashMap;

use crate::{Prob, Row, SepaResult, Sepastore, Set};

const DEFAULT_AGELIMIT: u32 = 100;

#[derive(Debug)]
struct PooledCut {
    row: Row,
    age: u32,
}

/// The global pool of reusable cuts.
#[derive(Debug)]
pub struct Cutpool {
    cuts: Vec<PooledCut>,
    hashes: FxHashMap<u64, usize>,
    agelimit: u32,
    /// Number of separation calls on the pool
    pub ncalls: u64,
    /// Number of cuts the pool handed to the separation storage
    pub ncutsfound: u64,
}

impl Cutpool {
    pub fn new() -> Self {
        Cutpool {
            cuts: vec![],
            hashes: FxHashMap::default(),
            agelimit: DEFAULT_AGELIMIT,
            ncalls: 0,
            ncutsfound: 0,
        }
    }

    /// Stores a cut in the pool, unless an identical one is already there.
    pub fn add_cut(&mut self, row: Row) {
        let key = row.hash_key();
        if self.hashes.contains_key(&key) {
            return;
        }
        self.hashes.insert(key, self.cuts.len());
        self.cuts.push(PooledCut { row, age: 0 });
    }

    pub fn n_cuts(&self) -> usize {
        self.cuts.len()
    }

    /// Separates the current LP solution against the pool: violated cuts
    /// move (as copies) into the separation storage and rejuvenate, quiet
    /// cuts age and eventually drop out.
    pub fn separate(
        &mut self,
        set: &Set,
        prob: &Prob,
        sepastore: &mut Sepastore,
        root: bool,
    ) -> SepaResult {
        self.ncalls += 1;
        let mut found = false;
        for cut in self.cuts.iter_mut() {
            let violation = cut.row.violation(|v| prob.var(v).lp_sol());
            if violation > set.num_feastol {
                let mut row = cut.row.clone();
                if root {
                    row.depth = 0;
                }
                sepastore.add_cut(row);
                cut.age = 0;
                found = true;
                self.ncutsfound += 1;
            } else {
                cut.age += 1;
            }
        }
        let agelimit = self.agelimit;
        if self.cuts.iter().any(|c| c.age > agelimit) {
            self.cuts.retain(|c| c.age <= agelimit);
            self.hashes.clear();
            for (i, cut) in self.cuts.iter().enumerate() {
                self.hashes.insert(cut.row.hash_key(), i);
            }
        }
        if found {
            SepaResult::Separated
        } else {
            SepaResult::DidNotFind
        }
    }
}

impl Default for Cutpool {
    fn default() -> Self {
        Self::new()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_cutpool {
    use super::*;
    use crate::{Var, VarId};

    fn prob_with_lpsol(val: f64) -> Prob {
        let mut prob = Prob::new("test");
        let x = prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
        prob.var_mut(x).col = Some(0);
        prob.var_mut(x).lpsol = val;
        prob
    }

    #[test]
    fn identical_cuts_are_pooled_once() {
        let mut pool = Cutpool::new();
        pool.add_cut(Row::new("c", 0.0, 1.0, vec![(VarId(0), 1.0)]));
        pool.add_cut(Row::new("c'", 0.0, 1.0, vec![(VarId(0), 1.0)]));
        assert_eq!(1, pool.n_cuts());
    }

    #[test]
    fn violated_cuts_enter_the_sepastore() {
        let set = Set::default();
        let prob = prob_with_lpsol(5.0);
        let mut pool = Cutpool::new();
        let mut sepastore = Sepastore::new();
        // x <= 1 is violated by x = 5
        pool.add_cut(Row::new("c", f64::NEG_INFINITY, 1.0, vec![(VarId(0), 1.0)]));

        let result = pool.separate(&set, &prob, &mut sepastore, true);
        assert_eq!(SepaResult::Separated, result);
        assert_eq!(1, sepastore.n_cuts());
        assert_eq!(1, pool.ncutsfound);
    }

    #[test]
    fn satisfied_cuts_age_and_drop_out() {
        let set = Set::default();
        let prob = prob_with_lpsol(0.5);
        let mut pool = Cutpool::new();
        let mut sepastore = Sepastore::new();
        pool.add_cut(Row::new("c", f64::NEG_INFINITY, 1.0, vec![(VarId(0), 1.0)]));

        for _ in 0..=DEFAULT_AGELIMIT {
            let result = pool.separate(&set, &prob, &mut sepastore, false);
            assert_eq!(SepaResult::DidNotFind, result);
        }
        assert_eq!(0, pool.n_cuts());
    }
}
