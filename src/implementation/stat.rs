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

//! This module defines `Stat`, the global solving statistics, and the
//! interrupt handle an embedding application uses to stop the solver from a
//! signal handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::{BranchDir, Status, VarId};

/// A cloneable handle that lets the embedding application request a stop at
/// the next cooperative suspension point (e.g. from a Ctrl-C handler).
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle(Arc<AtomicBool>);

impl InterruptHandle {
    /// Requests an interrupt. The request is consumed one-shot by the stop
    /// monitor and turned into `Status::UserInterrupt`.
    pub fn interrupt(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub(crate) fn take(&self) -> bool {
        self.0.swap(false, Ordering::Relaxed)
    }
}

/// The global solving statistics. All counters are monotonically
/// non-decreasing over one run, except `status` (recomputed by every stop
/// check) and the per-node round counters which the node solver resets.
#[derive(Debug)]
pub struct Stat {
    /// Nodes processed in the current run
    pub nnodes: u64,
    /// Nodes processed over all runs
    pub ntotalnodes: u64,
    /// Deepest node focused in the current run
    pub maxdepth: usize,
    /// Deepest node focused over all runs
    pub maxtotaldepth: usize,

    /// LPs solved in total
    pub nlps: u64,
    /// LPs solved as a node's first LP
    pub ninitlps: u64,
    /// LPs solved within node processing
    pub nnodelps: u64,
    /// Simplex iterations in total
    pub nlpiterations: u64,
    /// Simplex iterations spent on initial LPs
    pub ninitlpiterations: u64,
    /// Simplex iterations spent on node LPs
    pub nnodelpiterations: u64,
    /// Simplex iterations spent on the root node
    pub nrootlpiterations: u64,
    /// Strictly increasing counter of LP shape changes, orders LP states
    pub lpcount: u64,

    /// Pricing rounds at the current node
    pub npricerounds: u32,
    /// Separation rounds at the current node
    pub nseparounds: u32,

    /// Bound changes applied in total
    pub nboundchgs: u64,
    /// Strictly increasing counter of domain changes, orders domain states
    pub domchgcount: u64,
    /// Integer variables fixed at the root in the current run
    pub nrootintfixingsrun: u64,

    /// Number of solving runs (restarts + 1)
    pub nruns: u32,
    /// Restarts triggered by conflict analysis
    pub nconfrestarts: u32,
    /// Number of variables the previous run ended with
    pub prevrunnvars: usize,
    /// Nodes that were already cut off when the selector produced them
    pub ndelayedcutoffs: u64,
    /// Node at which the current incumbent was found
    pub bestsolnode: u64,

    /// The variable branched on most recently, and the direction taken
    pub lastbranchvar: Option<VarId>,
    pub lastbranchdir: BranchDir,

    /// One-shot: the user asked for an interrupt through the API
    pub userinterrupt: bool,
    /// One-shot: the user asked for a restart through the API
    pub userrestart: bool,

    /// The current solving status
    pub status: Status,

    solving_start: Instant,
    interrupt: InterruptHandle,
}

impl Stat {
    pub fn new() -> Self {
        Stat {
            nnodes: 0,
            ntotalnodes: 0,
            maxdepth: 0,
            maxtotaldepth: 0,
            nlps: 0,
            ninitlps: 0,
            nnodelps: 0,
            nlpiterations: 0,
            ninitlpiterations: 0,
            nnodelpiterations: 0,
            nrootlpiterations: 0,
            lpcount: 0,
            npricerounds: 0,
            nseparounds: 0,
            nboundchgs: 0,
            domchgcount: 0,
            nrootintfixingsrun: 0,
            nruns: 1,
            nconfrestarts: 0,
            prevrunnvars: 0,
            ndelayedcutoffs: 0,
            bestsolnode: 0,
            lastbranchvar: None,
            lastbranchdir: BranchDir::Down,
            userinterrupt: false,
            userrestart: false,
            status: Status::Unknown,
            solving_start: Instant::now(),
            interrupt: InterruptHandle::default(),
        }
    }

    /// The wall clock seconds spent solving so far.
    pub fn solving_time(&self) -> f64 {
        self.solving_start.elapsed().as_secs_f64()
    }

    /// A handle the application can use to interrupt the solve.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// Consumes a pending interrupt request, if any.
    pub(crate) fn take_interrupt(&mut self) -> bool {
        if self.userinterrupt {
            self.userinterrupt = false;
            return true;
        }
        self.interrupt.take()
    }

    /// Resets the per-run counters when a restart abandons the tree.
    pub(crate) fn prepare_restart(&mut self, nvars: usize) {
        self.prevrunnvars = nvars;
        self.nnodes = 0;
        self.maxdepth = 0;
        self.nrootintfixingsrun = 0;
        self.nruns += 1;
        self.status = Status::Unknown;
    }
}

impl Default for Stat {
    fn default() -> Self {
        Self::new()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_stat {
    use super::*;

    #[test]
    fn fresh_stats_are_run_one_and_unknown() {
        let stat = Stat::new();
        assert_eq!(1, stat.nruns);
        assert_eq!(Status::Unknown, stat.status);
        assert_eq!(0, stat.nnodes);
    }

    #[test]
    fn interrupt_handle_is_consumed_one_shot() {
        let mut stat = Stat::new();
        let handle = stat.interrupt_handle();
        assert!(!stat.take_interrupt());
        handle.interrupt();
        assert!(stat.take_interrupt());
        assert!(!stat.take_interrupt());
    }

    #[test]
    fn restart_keeps_total_counters() {
        let mut stat = Stat::new();
        stat.nnodes = 10;
        stat.ntotalnodes = 10;
        stat.prepare_restart(42);
        assert_eq!(0, stat.nnodes);
        assert_eq!(10, stat.ntotalnodes);
        assert_eq!(2, stat.nruns);
        assert_eq!(42, stat.prevrunnvars);
    }
}
