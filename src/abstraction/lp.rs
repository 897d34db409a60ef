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

//! This module defines the `LpKernel` trait, the seam between the engine and
//! the external simplex implementation. The engine maintains the LP shape
//! (columns, rows, bounds) and its state machine; the kernel only ever sees
//! a flushed snapshot and answers with a solution status.

use crate::{LpError, LpSolstat, VarId};

/// One column of the flushed LP, in kernel order.
#[derive(Debug, Clone, PartialEq)]
pub struct LpCol {
    /// The problem variable this column stands for
    pub var: VarId,
    /// Objective coefficient
    pub obj: f64,
    /// Local lower bound
    pub lb: f64,
    /// Local upper bound
    pub ub: f64,
}

/// One row of the flushed LP: `lhs <= coefs * x <= rhs`, coefficients keyed
/// by kernel column index.
#[derive(Debug, Clone, PartialEq)]
pub struct LpRow {
    pub lhs: f64,
    pub rhs: f64,
    pub coefs: Vec<(usize, f64)>,
}

/// The parameters of one kernel solve.
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolveReq {
    /// Iteration limit, `None` for unlimited
    pub iterlimit: Option<u64>,
    /// Prefer the dual simplex (the primal basis is infeasible)
    pub use_dual: bool,
    /// Discard any warm start information the kernel kept
    pub from_scratch: bool,
    /// The objective cutoff; the kernel may stop with `ObjLimit` once its
    /// dual bound crosses it
    pub cutoffbound: f64,
    /// A hint that the surrounding cut loop is about to stall; the kernel
    /// may use it to tighten its own termination criteria
    pub installing: bool,
}

/// The kernel's answer to a solve request.
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    pub solstat: LpSolstat,
    /// Objective value (meaningful for `Optimal` and `ObjLimit`)
    pub objval: f64,
    /// Primal values, one per column
    pub colvals: Vec<f64>,
    /// Dual values, one per row; may be empty if the kernel does not expose
    /// duals (problem-variable pricing then finds no candidates)
    pub rowduals: Vec<f64>,
    /// Simplex iterations spent on this request
    pub iterations: u64,
}

/// The external simplex kernel. Warm-start bookkeeping (bases, scaling, ...)
/// is entirely kernel-internal; `from_scratch` is the only knob the engine
/// ever turns on it.
pub trait LpKernel {
    /// Solves the given flushed column/row system.
    fn solve(
        &mut self,
        cols: &[LpCol],
        rows: &[LpRow],
        req: &LpSolveReq,
    ) -> std::result::Result<LpSolution, LpError>;

    /// Returns the indices of the rows that are redundant in the current
    /// basis and may be permanently dropped. The default kernel keeps
    /// everything.
    fn redundant_rows(&mut self, _cols: &[LpCol], _rows: &[LpRow]) -> Vec<usize> {
        vec![]
    }
}
