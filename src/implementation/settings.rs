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

//! This module defines `Set`, the global configuration of the engine, along
//! with the generated `SetBuilder`. Settings are immutable inside a single
//! node; the only concession is the `limit_changed` one-shot flag raised by
//! the limit mutators so the stop monitor knows to re-evaluate its cached
//! status.

use derive_builder::Builder;

/// Verbosity of the node display lines.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum VerbLevel {
    None,
    Minimal,
    Normal,
    High,
    Full,
}

/// The global configuration of the engine.
///
/// # Example
/// ```
/// # use bcp::*;
/// let set = SetBuilder::default()
///     .limit_nodes(1000)
///     .sepa_maxrounds(3)
///     .build()
///     .unwrap();
/// assert_eq!(1000, set.limit_nodes);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct Set {
    /// Time limit in seconds
    pub limit_time: f64,
    /// Memory limit in MB (checked against a coarse arena estimate)
    pub limit_memory: f64,
    /// Node limit (-1: unlimited)
    pub limit_nodes: i64,
    /// Limit on nodes processed since the last improving solution (-1: off)
    pub limit_stallnodes: i64,
    /// Stop once this many solutions were found (-1: off)
    pub limit_solutions: i64,
    /// Stop once this many improving solutions were found (-1: off)
    pub limit_bestsol: i64,
    /// Stop once the relative gap drops below this value
    pub limit_gap: f64,
    /// Stop once the absolute gap drops below this value
    pub limit_absgap: f64,

    /// Maximal number of propagation rounds per non-root node (-1: unlimited)
    pub prop_maxrounds: i32,
    /// Maximal number of propagation rounds at the root (-1: unlimited)
    pub prop_maxroundsroot: i32,
    /// Break propagation rounds as soon as a cutoff is detected
    pub prop_abortoncutoff: bool,

    /// Maximal number of separation rounds per non-root node (-1: unlimited)
    pub sepa_maxrounds: i32,
    /// Maximal number of separation rounds at the root (-1: unlimited)
    pub sepa_maxroundsroot: i32,
    /// Round cap for root nodes of runs after the first (-1: no extra cap)
    pub sepa_maxroundsrootsubrun: i32,
    /// Extra rounds granted when the node LP is solved a further time (-1: off)
    pub sepa_maxaddrounds: i32,
    /// Maximal number of consecutive stalling separation rounds (-1: unlimited)
    pub sepa_maxstallrounds: i32,
    /// Maximal number of cuts separated per non-root round
    pub sepa_maxcuts: i32,
    /// Maximal number of cuts separated per root round
    pub sepa_maxcutsroot: i32,
    /// Only separate nodes whose relative bound distance is below this
    pub sepa_maxbounddist: f64,
    /// Only separate during the first n runs (-1: always)
    pub sepa_maxruns: i32,
    /// Frequency of global cut pool separation (0: root only)
    pub sepa_poolfreq: i32,

    /// Maximal number of candidate columns priced per non-root round
    pub price_maxvars: i32,
    /// Maximal number of candidate columns priced per root round
    pub price_maxvarsroot: i32,

    /// Solve node LPs up to this depth only (-1: everywhere)
    pub lp_solvedepth: i32,
    /// Solve the LP at every n-th depth level (0: root only)
    pub lp_solvefreq: i32,

    /// Maximal number of restarts (-1: unlimited)
    pub presol_maxrestarts: i32,
    /// Fraction of root integer fixings triggering a restart between nodes
    pub presol_restartfac: f64,
    /// The same fraction for runs after the first
    pub presol_subrestartfac: f64,
    /// Fraction of root integer fixings triggering an immediate restart
    pub presol_immrestartfac: f64,
    /// Minimal problem size reduction required to restart again
    pub presol_restartminred: f64,

    /// Successful conflict analyses triggering a restart (0: off)
    pub conf_restartnum: i32,
    /// Growth factor on the conflict restart threshold per restart
    pub conf_restartfac: f64,

    /// Exact solving mode: bound comparisons are performed exactly
    pub misc_exactsolve: bool,
    /// Verbosity of the display lines
    pub disp_verblevel: VerbLevel,

    /// Absolute epsilon of the numerics layer
    pub num_eps: f64,
    /// Feasibility tolerance for integrality and row activity checks
    pub num_feastol: f64,
    /// Every value at or above this threshold counts as infinite
    pub num_infinity: f64,

    /// One-shot flag: a limit was mutated and the cached status is stale
    #[builder(setter(skip))]
    pub limit_changed: bool,
}

impl Default for Set {
    fn default() -> Self {
        Set {
            limit_time: 1e20,
            limit_memory: 1e20,
            limit_nodes: -1,
            limit_stallnodes: -1,
            limit_solutions: -1,
            limit_bestsol: -1,
            limit_gap: 0.0,
            limit_absgap: 0.0,
            prop_maxrounds: 100,
            prop_maxroundsroot: 1000,
            prop_abortoncutoff: true,
            sepa_maxrounds: 5,
            sepa_maxroundsroot: -1,
            sepa_maxroundsrootsubrun: -1,
            sepa_maxaddrounds: 1,
            sepa_maxstallrounds: 5,
            sepa_maxcuts: 100,
            sepa_maxcutsroot: 2000,
            sepa_maxbounddist: 1.0,
            sepa_maxruns: -1,
            sepa_poolfreq: 0,
            price_maxvars: 100,
            price_maxvarsroot: 2000,
            lp_solvedepth: -1,
            lp_solvefreq: 1,
            presol_maxrestarts: -1,
            presol_restartfac: 0.05,
            presol_subrestartfac: 0.06,
            presol_immrestartfac: 0.2,
            presol_restartminred: 0.1,
            conf_restartnum: 0,
            conf_restartfac: 1.5,
            misc_exactsolve: false,
            disp_verblevel: VerbLevel::Normal,
            num_eps: 1e-9,
            num_feastol: 1e-6,
            num_infinity: 1e20,
            limit_changed: false,
        }
    }
}

impl Set {
    /// The representation of +infinity under the current numerics.
    #[inline]
    pub fn infinity(&self) -> f64 {
        self.num_infinity
    }

    /// Is the value at or beyond the infinity threshold?
    #[inline]
    pub fn is_infinity(&self, val: f64) -> bool {
        val >= self.num_infinity
    }

    #[inline]
    pub fn is_eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.num_eps
    }
    #[inline]
    pub fn is_lt(&self, a: f64, b: f64) -> bool {
        a < b - self.num_eps
    }
    #[inline]
    pub fn is_le(&self, a: f64, b: f64) -> bool {
        a <= b + self.num_eps
    }
    #[inline]
    pub fn is_gt(&self, a: f64, b: f64) -> bool {
        a > b + self.num_eps
    }
    #[inline]
    pub fn is_ge(&self, a: f64, b: f64) -> bool {
        a >= b - self.num_eps
    }
    #[inline]
    pub fn is_zero(&self, a: f64) -> bool {
        a.abs() <= self.num_eps
    }

    /// Rounds down within the feasibility tolerance.
    #[inline]
    pub fn feas_floor(&self, a: f64) -> f64 {
        (a + self.num_feastol).floor()
    }
    /// Rounds up within the feasibility tolerance.
    #[inline]
    pub fn feas_ceil(&self, a: f64) -> f64 {
        (a - self.num_feastol).ceil()
    }
    /// Fractionality of a value, measured from its feasible floor.
    #[inline]
    pub fn frac(&self, a: f64) -> f64 {
        a - self.feas_floor(a)
    }
    /// Is the value integral within the feasibility tolerance?
    #[inline]
    pub fn is_integral(&self, a: f64) -> bool {
        let f = self.frac(a);
        f <= self.num_feastol || f >= 1.0 - self.num_feastol
    }

    /// Relative difference of two values: `(a - b) / max(|a|, |b|, 1)`.
    #[inline]
    pub fn rel_diff(a: f64, b: f64) -> f64 {
        (a - b) / a.abs().max(b.abs()).max(1.0)
    }

    /// Per-round cut cap, depending on whether we separate the root.
    #[inline]
    pub fn sepa_maxcuts(&self, root: bool) -> i64 {
        if root {
            self.sepa_maxcutsroot as i64
        } else {
            self.sepa_maxcuts as i64
        }
    }

    /// Per-round priced-column cap, depending on whether we price the root.
    #[inline]
    pub fn price_maxvars(&self, root: bool) -> i64 {
        if root {
            self.price_maxvarsroot as i64
        } else {
            self.price_maxvars as i64
        }
    }

    /// Mutates the node limit; flags the cached status as stale.
    pub fn change_limit_nodes(&mut self, limit: i64) {
        self.limit_nodes = limit;
        self.limit_changed = true;
    }

    /// Mutates the time limit; flags the cached status as stale.
    pub fn change_limit_time(&mut self, limit: f64) {
        self.limit_time = limit;
        self.limit_changed = true;
    }

    /// Mutates the solution limit; flags the cached status as stale.
    pub fn change_limit_solutions(&mut self, limit: i64) {
        self.limit_solutions = limit;
        self.limit_changed = true;
    }

    /// Mutates the gap limit; flags the cached status as stale.
    pub fn change_limit_gap(&mut self, limit: f64) {
        self.limit_gap = limit;
        self.limit_changed = true;
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
