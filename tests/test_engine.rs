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

//! End-to-end scenarios: complete solves against scripted plug-ins and
//! scripted LP kernels, checking the engine's visible state transitions.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bcp::*;

// ----------------------------------------------------------------------------
// --- SCRIPTED COLLABORATORS -------------------------------------------------
// ----------------------------------------------------------------------------

/// An LP kernel replaying a scripted list of answers (the last one repeats).
/// It records how often it was called and whether it ever saw the
/// `installing` hint.
struct ScriptedKernel {
    answers: Vec<Result<LpSolution, LpError>>,
    ncalls: Rc<Cell<usize>>,
    saw_installing: Rc<Cell<bool>>,
}

impl ScriptedKernel {
    fn new(answers: Vec<Result<LpSolution, LpError>>) -> Self {
        ScriptedKernel {
            answers,
            ncalls: Rc::new(Cell::new(0)),
            saw_installing: Rc::new(Cell::new(false)),
        }
    }
}

impl LpKernel for ScriptedKernel {
    fn solve(
        &mut self,
        cols: &[LpCol],
        _rows: &[LpRow],
        req: &LpSolveReq,
    ) -> Result<LpSolution, LpError> {
        let n = self.ncalls.get();
        self.ncalls.set(n + 1);
        if req.installing {
            self.saw_installing.set(true);
        }
        let mut answer = self.answers[n.min(self.answers.len() - 1)].clone();
        if let Ok(sol) = &mut answer {
            let fill = sol.colvals.first().copied().unwrap_or(0.0);
            sol.colvals.resize(cols.len(), fill);
        }
        answer
    }
}

fn optimal(objval: f64, val: f64) -> Result<LpSolution, LpError> {
    Ok(LpSolution {
        solstat: LpSolstat::Optimal,
        objval,
        colvals: vec![val],
        rowduals: vec![],
        iterations: 1,
    })
}

fn infeasible() -> Result<LpSolution, LpError> {
    Ok(LpSolution {
        solstat: LpSolstat::Infeasible,
        objval: 0.0,
        colvals: vec![],
        rowduals: vec![],
        iterations: 1,
    })
}

/// A kernel that must never be asked anything.
struct NeverCalled;
impl LpKernel for NeverCalled {
    fn solve(
        &mut self,
        _: &[LpCol],
        _: &[LpRow],
        _: &LpSolveReq,
    ) -> Result<LpSolution, LpError> {
        panic!("the LP kernel must not be consulted in this scenario");
    }
}

/// The integrality constraint class: a solution is acceptable iff every
/// integer variable takes an integral value.
struct Integrality;
impl ConsHdlr for Integrality {
    fn name(&self) -> &str {
        "integrality"
    }
    fn enforce_lp(&mut self, data: &mut SolvingData, _infeasible: bool) -> bcp::Result<EnfoResult> {
        if data
            .branchcand
            .lp_cands(data.set, data.prob, data.lp)
            .is_empty()
        {
            Ok(EnfoResult::Feasible)
        } else {
            Ok(EnfoResult::Infeasible)
        }
    }
    fn enforce_pseudo(
        &mut self,
        _data: &mut SolvingData,
        _infeasible: bool,
        _objinfeasible: bool,
        _forced: bool,
    ) -> bcp::Result<EnfoResult> {
        Ok(EnfoResult::Feasible)
    }
    fn check(&self, prob: &Prob, sol: &Sol) -> bcp::Result<bool> {
        let ok = prob.vars().all(|(id, var)| {
            !var.integral || (sol.value(id) - sol.value(id).round()).abs() <= 1e-6
        });
        Ok(ok)
    }
}

fn one_var_solver(kernel: Box<dyn LpKernel>, set: Set) -> Solver {
    let mut prob = Prob::new("one");
    prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
    let mut solver = Solver::new(prob, set, kernel);
    solver.add_conshdlr(Box::new(Integrality));
    solver.add_branchrule(Box::new(MostFractionalBranching::new()));
    solver
}

// ----------------------------------------------------------------------------
// --- SCENARIO 1: pure LP solve at the root ----------------------------------
// ----------------------------------------------------------------------------

#[test]
fn an_integral_root_lp_is_optimal_after_one_node() {
    let kernel = ScriptedKernel::new(vec![optimal(3.0, 3.0)]);
    let ncalls = Rc::clone(&kernel.ncalls);
    let mut solver = one_var_solver(Box::new(kernel), Set::default());

    let outcome = solver.solve().unwrap();

    assert_eq!(Status::Optimal, outcome.status);
    assert_eq!(Some(3.0), outcome.best_obj);
    assert_eq!(1, solver.stat().nnodes);
    assert!(ncalls.get() >= 1);
    let best = solver.best_solution().unwrap();
    assert_eq!(3.0, best.value(VarId(0)));
}

// ----------------------------------------------------------------------------
// --- SCENARIO 2: infeasibility by propagation -------------------------------
// ----------------------------------------------------------------------------

/// A propagator that proves infeasibility right away.
struct CutoffPropagator;
impl Propagator for CutoffPropagator {
    fn name(&self) -> &str {
        "alwayscutoff"
    }
    fn execute(
        &mut self,
        _data: &mut SolvingData,
        _depth: usize,
        _only_delayed: bool,
    ) -> bcp::Result<PropResult> {
        Ok(PropResult::Cutoff)
    }
}

#[test]
fn a_propagation_cutoff_at_the_root_proves_infeasibility_without_any_lp() {
    let mut solver = one_var_solver(Box::new(NeverCalled), Set::default());
    solver.add_propagator(Box::new(CutoffPropagator));

    let outcome = solver.solve().unwrap();

    assert_eq!(Status::Infeasible, outcome.status);
    assert_eq!(None, outcome.best_obj);
    assert_eq!(0, solver.stat().nlps);
    // the cut off root carries an infinite bound
    assert!(solver.lowerbound() >= 1e20);
}

// ----------------------------------------------------------------------------
// --- SCENARIO 3: price-and-cut convergence ----------------------------------
// ----------------------------------------------------------------------------

/// Prices one prepared column per round until all of them are in the LP.
struct ColumnPricer {
    queue: Vec<VarId>,
    nrounds: Rc<Cell<usize>>,
}
impl Pricer for ColumnPricer {
    fn name(&self) -> &str {
        "columns"
    }
    fn execute(&mut self, data: &mut SolvingData) -> bcp::Result<(f64, PricerResult)> {
        self.nrounds.set(self.nrounds.get() + 1);
        if let Some(var) = self.queue.pop() {
            data.pricestore.add_var(var, 1.0);
        }
        Ok((0.0, PricerResult::Success))
    }
}

/// Adds one (real, two-column) cut per call for a bounded number of calls.
struct FiniteSeparator {
    ncuts: usize,
    ncalls: usize,
}
impl Separator for FiniteSeparator {
    fn name(&self) -> &str {
        "finite"
    }
    fn execute_lp(
        &mut self,
        data: &mut SolvingData,
        _depth: usize,
        _bounddist: f64,
        _only_delayed: bool,
    ) -> bcp::Result<SepaResult> {
        self.ncalls += 1;
        if self.ncalls <= self.ncuts {
            data.add_cut(Row::new(
                format!("c{}", self.ncalls),
                f64::NEG_INFINITY,
                100.0 + self.ncalls as f64,
                vec![(VarId(0), 1.0), (VarId(1), 1.0)],
            ));
            Ok(SepaResult::Separated)
        } else {
            Ok(SepaResult::DidNotFind)
        }
    }
}

#[test]
fn price_and_cut_converges_with_a_rising_objective() {
    // the LP objective rises by more than 1e-4 on every solve, so the
    // stall counter never moves
    let answers: Vec<Result<LpSolution, LpError>> =
        (0..40).map(|i| optimal(i as f64, 2.0)).collect();
    let kernel = ScriptedKernel::new(answers);
    let saw_installing = Rc::clone(&kernel.saw_installing);

    let mut prob = Prob::new("pricing");
    prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
    prob.add_var(Var::new("y", 1.0, 0.0, 10.0, true));
    // three column-representable variables the pricer will activate
    let p1 = prob.add_var(Var::new("p1", 1.0, 0.0, 1.0, false).priced());
    let p2 = prob.add_var(Var::new("p2", 1.0, 0.0, 1.0, false).priced());
    let p3 = prob.add_var(Var::new("p3", 1.0, 0.0, 1.0, false).priced());

    let nrounds = Rc::new(Cell::new(0));
    let mut solver = Solver::new(prob, Set::default(), Box::new(kernel));
    solver.add_conshdlr(Box::new(Integrality));
    solver.add_branchrule(Box::new(MostFractionalBranching::new()));
    solver.add_pricer(Box::new(ColumnPricer {
        queue: vec![p3, p2, p1],
        nrounds: Rc::clone(&nrounds),
    }));
    solver.add_separator(Box::new(FiniteSeparator { ncuts: 5, ncalls: 0 }));
    // one node is enough: the LP values stay integral
    solver.set_mut().change_limit_nodes(1);

    let _ = solver.solve().unwrap();

    // all prepared columns were priced in
    assert!(solver.prob().all_cols_in_lp());
    assert!(nrounds.get() >= 3);
    // separation ran its five productive rounds without ever stalling
    assert!(solver.stat().nseparounds >= 5);
    assert!(!saw_installing.get());
}

// ----------------------------------------------------------------------------
// --- SCENARIO 4: stalling pulls in the delayed separators -------------------
// ----------------------------------------------------------------------------

/// Keeps producing cuts that never help; the LP objective stays flat.
struct EndlessSeparator {
    ncalls: usize,
}
impl Separator for EndlessSeparator {
    fn name(&self) -> &str {
        "endless"
    }
    fn execute_lp(
        &mut self,
        data: &mut SolvingData,
        _depth: usize,
        _bounddist: f64,
        _only_delayed: bool,
    ) -> bcp::Result<SepaResult> {
        self.ncalls += 1;
        data.add_cut(Row::new(
            format!("noise{}", self.ncalls),
            f64::NEG_INFINITY,
            1000.0 + self.ncalls as f64,
            vec![(VarId(0), 1.0), (VarId(1), self.ncalls as f64)],
        ));
        Ok(SepaResult::Separated)
    }
}

/// Delays itself in regular rounds; records when it is finally worked off.
struct DelayedSeparator {
    invoked_delayed: Rc<Cell<bool>>,
}
impl Separator for DelayedSeparator {
    fn name(&self) -> &str {
        "lazybones"
    }
    fn priority(&self) -> i32 {
        -10
    }
    fn execute_lp(
        &mut self,
        _data: &mut SolvingData,
        _depth: usize,
        _bounddist: f64,
        only_delayed: bool,
    ) -> bcp::Result<SepaResult> {
        if only_delayed {
            self.invoked_delayed.set(true);
            Ok(SepaResult::DidNotFind)
        } else {
            Ok(SepaResult::Delayed)
        }
    }
}

#[test]
fn stalling_invokes_delayed_separators_and_hints_the_kernel() {
    // a flat objective with a fractional column: every round stalls
    let kernel = ScriptedKernel::new(vec![optimal(1.0, 2.5)]);
    let saw_installing = Rc::clone(&kernel.saw_installing);

    let mut prob = Prob::new("stall");
    prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
    prob.add_var(Var::new("y", 1.0, 0.0, 10.0, true));
    let set = SetBuilder::default().sepa_maxstallrounds(3).build().unwrap();
    let invoked_delayed = Rc::new(Cell::new(false));

    let mut solver = Solver::new(prob, set, Box::new(kernel));
    solver.add_conshdlr(Box::new(Integrality));
    solver.add_branchrule(Box::new(MostFractionalBranching::new()));
    solver.add_separator(Box::new(EndlessSeparator { ncalls: 0 }));
    solver.add_separator(Box::new(DelayedSeparator {
        invoked_delayed: Rc::clone(&invoked_delayed),
    }));
    solver.set_mut().change_limit_nodes(1);

    let _ = solver.solve().unwrap();

    // the loop hit the stall cap instead of separating forever
    assert!(solver.stat().nseparounds <= 8);
    // close to the cap the delayed separator was worked off
    assert!(invoked_delayed.get());
    // and the kernel was told that the loop was stalling
    assert!(saw_installing.get());
}

// ----------------------------------------------------------------------------
// --- SCENARIO 5: LP error recovery ------------------------------------------
// ----------------------------------------------------------------------------

/// Demands an LP once, then accepts the pseudo solution.
struct NeedsLpOnce {
    asked: bool,
}
impl ConsHdlr for NeedsLpOnce {
    fn name(&self) -> &str {
        "needslp"
    }
    fn enforce_lp(&mut self, _data: &mut SolvingData, _infeasible: bool) -> bcp::Result<EnfoResult> {
        Ok(EnfoResult::Feasible)
    }
    fn enforce_pseudo(
        &mut self,
        _data: &mut SolvingData,
        _infeasible: bool,
        _objinfeasible: bool,
        _forced: bool,
    ) -> bcp::Result<EnfoResult> {
        if !self.asked {
            self.asked = true;
            Ok(EnfoResult::SolveLp)
        } else {
            Ok(EnfoResult::Feasible)
        }
    }
}

#[test]
fn two_lp_errors_downgrade_the_node_twice_and_the_pseudo_solution_wins() {
    let kernel = ScriptedKernel::new(vec![
        Err(LpError("singular basis".into())),
        Err(LpError("singular basis again".into())),
        optimal(0.0, 0.0),
    ]);
    let ncalls = Rc::clone(&kernel.ncalls);

    let mut prob = Prob::new("troubled");
    prob.add_var(Var::new("x", 1.0, 0.0, 10.0, true));
    let mut solver = Solver::new(prob, Set::default(), Box::new(kernel));
    solver.add_conshdlr(Box::new(NeedsLpOnce { asked: false }));
    solver.add_branchrule(Box::new(MostFractionalBranching::new()));

    let outcome = solver.solve().unwrap();

    // the node survived both failures on the pseudo solution
    assert_eq!(Status::Optimal, outcome.status);
    // x sits at its objective-minimizing bound in the pseudo solution
    assert_eq!(Some(0.0), outcome.best_obj);
    // the kernel failed twice and was not consulted again
    assert_eq!(2, ncalls.get());
}

// ----------------------------------------------------------------------------
// --- SCENARIO 6: restart by conflicts ---------------------------------------
// ----------------------------------------------------------------------------

#[test]
fn successful_conflict_analyses_trigger_a_restart() {
    // run 1: fractional root, branching; the first child's LP is
    // infeasible which yields a successful conflict analysis and, with
    // conf_restartnum = 1, a restart. run 2: the root is integral.
    let kernel = ScriptedKernel::new(vec![
        optimal(2.5, 2.5),
        infeasible(),
        optimal(3.0, 3.0),
    ]);
    let set = SetBuilder::default()
        .conf_restartnum(1)
        .conf_restartfac(2.0)
        .build()
        .unwrap();
    let mut solver = one_var_solver(Box::new(kernel), set);

    let outcome = solver.solve().unwrap();

    assert_eq!(1, solver.stat().nconfrestarts);
    assert_eq!(2, solver.stat().nruns);
    assert_eq!(Status::Optimal, outcome.status);
    assert_eq!(Some(3.0), outcome.best_obj);
}

#[test]
fn no_restart_while_a_pricer_is_active() {
    struct IdlePricer;
    impl Pricer for IdlePricer {
        fn name(&self) -> &str {
            "idle"
        }
        fn execute(&mut self, _data: &mut SolvingData) -> bcp::Result<(f64, PricerResult)> {
            Ok((-f64::INFINITY, PricerResult::Success))
        }
    }

    let kernel = ScriptedKernel::new(vec![optimal(2.5, 2.5), infeasible(), infeasible()]);
    let set = SetBuilder::default()
        .conf_restartnum(1)
        .conf_restartfac(2.0)
        .build()
        .unwrap();
    let mut solver = one_var_solver(Box::new(kernel), set);
    solver.add_pricer(Box::new(IdlePricer));

    let _ = solver.solve().unwrap();

    // plenty of conflicts, but the active pricer forbids restarting
    assert_eq!(0, solver.stat().nconfrestarts);
    assert_eq!(1, solver.stat().nruns);
}

// ----------------------------------------------------------------------------
// --- INVARIANTS -------------------------------------------------------------
// ----------------------------------------------------------------------------

#[test]
fn the_cutoff_bound_never_increases() {
    struct BoundWatcher {
        bounds: Rc<RefCell<Vec<f64>>>,
    }
    impl Heuristic for BoundWatcher {
        fn name(&self) -> &str {
            "watcher"
        }
        fn timing_mask(&self) -> HeurTiming {
            HeurTiming::BEFORE_NODE
        }
        fn execute(
            &mut self,
            data: &mut SolvingData,
            _depth: usize,
            _lpforkdepth: i64,
            _timing: HeurTiming,
            _ndelayed: &mut usize,
        ) -> bcp::Result<HeurResult> {
            self.bounds.borrow_mut().push(data.primal.cutoffbound);
            Ok(HeurResult::DidNotFind)
        }
    }

    let kernel = ScriptedKernel::new(vec![
        optimal(2.5, 2.5),
        optimal(3.0, 3.0),
        optimal(4.0, 4.0),
    ]);
    let bounds = Rc::new(RefCell::new(vec![]));
    let mut solver = one_var_solver(Box::new(kernel), Set::default());
    solver.add_heuristic(Box::new(BoundWatcher {
        bounds: Rc::clone(&bounds),
    }));

    let _ = solver.solve().unwrap();

    let bounds = bounds.borrow();
    assert!(bounds.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn focusing_back_and_forth_restores_the_domain_state() {
    // branch at the root, walk into the down child, back up to the up
    // child, and compare the sibling's view of the domains
    let kernel = ScriptedKernel::new(vec![optimal(2.5, 2.5), infeasible()]);
    let mut solver = one_var_solver(Box::new(kernel), Set::default());
    // the second child inherits a pristine domain state of [3, 10]
    let _ = solver.solve().unwrap();
    // after the solve the tree is drained; global bounds are intact
    assert_eq!(0.0, solver.prob().var(VarId(0)).glb);
    assert_eq!(10.0, solver.prob().var(VarId(0)).gub);
}

#[test]
fn the_global_lower_bound_is_monotone_across_the_outer_loop() {
    // collect the global lower bound before every node via a heuristic
    struct Collect {
        bounds: Rc<RefCell<Vec<f64>>>,
    }
    impl Heuristic for Collect {
        fn name(&self) -> &str {
            "collect"
        }
        fn timing_mask(&self) -> HeurTiming {
            HeurTiming::BEFORE_NODE
        }
        fn execute(
            &mut self,
            data: &mut SolvingData,
            _depth: usize,
            _lpforkdepth: i64,
            _timing: HeurTiming,
            _ndelayed: &mut usize,
        ) -> bcp::Result<HeurResult> {
            self.bounds
                .borrow_mut()
                .push(data.tree.lowerbound(data.set));
            Ok(HeurResult::DidNotFind)
        }
    }

    let kernel = ScriptedKernel::new(vec![
        optimal(2.5, 2.5),
        optimal(3.0, 3.0),
        optimal(4.0, 4.0),
    ]);
    let bounds = Rc::new(RefCell::new(vec![]));
    let mut solver = one_var_solver(Box::new(kernel), Set::default());
    solver.add_heuristic(Box::new(Collect {
        bounds: Rc::clone(&bounds),
    }));

    let _ = solver.solve().unwrap();

    let bounds = bounds.borrow();
    assert!(bounds.windows(2).all(|w| w[1] >= w[0] - 1e-9));
}

#[test]
fn pseudocost_flags_stay_clean_outside_the_update_pass() {
    let kernel = ScriptedKernel::new(vec![
        optimal(2.5, 2.5),
        optimal(3.0, 3.0),
        optimal(4.0, 4.0),
    ]);
    let mut solver = one_var_solver(Box::new(kernel), Set::default());
    let _ = solver.solve().unwrap();
    for (_, var) in solver.prob().vars() {
        assert_eq!(PseudocostFlag::None, var.pcflag);
    }
}

#[test]
fn a_solution_limit_stops_the_search() {
    let kernel = ScriptedKernel::new(vec![optimal(2.5, 2.5), optimal(3.0, 3.0)]);
    let set = SetBuilder::default().limit_solutions(1).build().unwrap();
    let mut solver = one_var_solver(Box::new(kernel), set);

    let outcome = solver.solve().unwrap();
    // one feasible solution was enough
    assert!(matches!(
        outcome.status,
        Status::SolLimit | Status::Optimal
    ));
    assert!(solver.stat().nnodes >= 1);
}
