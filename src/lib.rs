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

//! # BCP
//! BCP is a generic branch-and-bound engine with an integrated
//! price-and-cut loop for constraint integer programs. Its goal is to let
//! you describe the *semantics* of your problem through a set of plug-ins --
//! constraint handlers, propagators, separators, pricers, relaxators,
//! heuristics, branching rules -- while the engine owns the search tree and
//! the delicate interleaving around the LP relaxation: domain propagation,
//! pricing until dual feasibility, cutting plane rounds with stall
//! detection, constraint enforcement, bounding, conflict-driven restarts.
//!
//! The LP itself is an external collaborator behind the [`LpKernel`] seam:
//! the engine maintains the LP shape and state machine, the kernel only
//! answers solve requests.
//!
//! ## Quick Example
//! The following minimalistic use of bcp minimizes a single integer
//! variable. The LP kernel is a toy that puts every column at its lower
//! bound; a real application would plug in a simplex implementation. The
//! only constraint class is integrality, enforced by a tiny handler.
//!
//! ```
//! use bcp::*;
//!
//! /// A toy kernel: the LP minimum of a box-constrained problem with
//! /// nonnegative objective is every column at its lower bound.
//! struct BoxKernel;
//! impl LpKernel for BoxKernel {
//!     fn solve(
//!         &mut self,
//!         cols: &[LpCol],
//!         _rows: &[LpRow],
//!         _req: &LpSolveReq,
//!     ) -> Result<LpSolution, LpError> {
//!         let colvals: Vec<f64> = cols.iter().map(|c| c.lb).collect();
//!         let objval = cols.iter().map(|c| c.obj * c.lb).sum();
//!         Ok(LpSolution {
//!             solstat: LpSolstat::Optimal,
//!             objval,
//!             colvals,
//!             rowduals: vec![],
//!             iterations: 1,
//!         })
//!     }
//! }
//!
//! /// The integrality "constraint class": a solution is acceptable iff
//! /// every integer variable takes an integral value.
//! struct Integrality;
//! impl ConsHdlr for Integrality {
//!     fn name(&self) -> &str {
//!         "integrality"
//!     }
//!     fn enforce_lp(&mut self, data: &mut SolvingData, _infeasible: bool) -> bcp::Result<EnfoResult> {
//!         if data.branchcand.lp_cands(data.set, data.prob, data.lp).is_empty() {
//!             Ok(EnfoResult::Feasible)
//!         } else {
//!             Ok(EnfoResult::Infeasible)
//!         }
//!     }
//!     fn enforce_pseudo(
//!         &mut self,
//!         _data: &mut SolvingData,
//!         _infeasible: bool,
//!         _objinfeasible: bool,
//!         _forced: bool,
//!     ) -> bcp::Result<EnfoResult> {
//!         Ok(EnfoResult::Feasible)
//!     }
//! }
//!
//! // 1. Describe the transformed problem
//! let mut prob = Prob::new("tiny");
//! prob.add_var(Var::new("x", 1.0, 2.0, 10.0, true));
//!
//! // 2. Create the solver with a configuration and the kernel
//! let mut solver = Solver::new(prob, Set::default(), Box::new(BoxKernel));
//!
//! // 3. Register the plug-ins (a stock branching rule suffices here)
//! solver.add_conshdlr(Box::new(Integrality));
//! solver.add_branchrule(Box::new(MostFractionalBranching::new()));
//!
//! // 4. Minimize
//! let outcome = solver.solve().unwrap();
//! assert_eq!(Status::Optimal, outcome.status);
//! assert_eq!(Some(2.0), outcome.best_obj);
//! ```
//!
//! ## Going further
//! The abstractions a client implements live in the `abstraction` module:
//! start with [`ConsHdlr`] and [`BranchRule`], then look into
//! [`Propagator`], [`Separator`], [`Pricer`], [`Relaxator`] and
//! [`Heuristic`] as your problem demands. The engine side -- the search
//! [`Tree`], the [`Lp`] state machine, the stores and the [`Solver`]
//! drivers -- is documented in the `implementation` module.

mod common;
mod abstraction;
mod implementation;

pub use common::*;
pub use abstraction::*;
pub use implementation::*;
