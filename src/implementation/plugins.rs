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

//! This module defines the per-family plug-in registries. Plug-ins are owned
//! as boxed trait objects; next to each propagator, separator and constraint
//! handler lives the engine-side `delayed` bit (it is the caller's job to
//! reset it at the next round, the plug-in only ever reports its verdict).
//! The drivers iterate plug-ins through priority-sorted index views computed
//! once before solving starts.

use crate::{
    BestBoundSelector, BranchRule, ConsHdlr, Heuristic, NodeSelector, Pricer, Propagator,
    Relaxator, Separator,
};

pub struct PropEntry {
    pub plugin: Box<dyn Propagator>,
    pub delayed: bool,
}

pub struct ConsEntry {
    pub plugin: Box<dyn ConsHdlr>,
    pub sepa_delayed: bool,
    pub prop_delayed: bool,
}

pub struct SepaEntry {
    pub plugin: Box<dyn Separator>,
    pub lp_delayed: bool,
    pub sol_delayed: bool,
}

pub struct RelaxEntry {
    pub plugin: Box<dyn Relaxator>,
    /// Whether the relaxator's last answer is still valid for the focus node
    pub solved: bool,
}

/// The plug-in registries of one solver instance.
pub struct Plugins {
    pub props: Vec<PropEntry>,
    pub conshdlrs: Vec<ConsEntry>,
    pub sepas: Vec<SepaEntry>,
    pub pricers: Vec<Box<dyn Pricer>>,
    pub relaxs: Vec<RelaxEntry>,
    pub heurs: Vec<Box<dyn Heuristic>>,
    pub branchrules: Vec<Box<dyn BranchRule>>,
    pub nodesel: Box<dyn NodeSelector>,

    prop_order: Vec<usize>,
    sepa_order: Vec<usize>,
    conshdlr_sepa_order: Vec<usize>,
    conshdlr_enfo_order: Vec<usize>,
    pricer_order: Vec<usize>,
    relax_order: Vec<usize>,
    heur_order: Vec<usize>,
    branch_order: Vec<usize>,
}

impl Plugins {
    pub fn new() -> Self {
        Plugins {
            props: vec![],
            conshdlrs: vec![],
            sepas: vec![],
            pricers: vec![],
            relaxs: vec![],
            heurs: vec![],
            branchrules: vec![],
            nodesel: Box::new(BestBoundSelector::new()),
            prop_order: vec![],
            sepa_order: vec![],
            conshdlr_sepa_order: vec![],
            conshdlr_enfo_order: vec![],
            pricer_order: vec![],
            relax_order: vec![],
            heur_order: vec![],
            branch_order: vec![],
        }
    }

    pub fn add_propagator(&mut self, plugin: Box<dyn Propagator>) {
        self.props.push(PropEntry {
            plugin,
            delayed: false,
        });
    }

    pub fn add_conshdlr(&mut self, plugin: Box<dyn ConsHdlr>) {
        self.conshdlrs.push(ConsEntry {
            plugin,
            sepa_delayed: false,
            prop_delayed: false,
        });
    }

    pub fn add_separator(&mut self, plugin: Box<dyn Separator>) {
        self.sepas.push(SepaEntry {
            plugin,
            lp_delayed: false,
            sol_delayed: false,
        });
    }

    pub fn add_pricer(&mut self, plugin: Box<dyn Pricer>) {
        self.pricers.push(plugin);
    }

    pub fn add_relaxator(&mut self, plugin: Box<dyn Relaxator>) {
        self.relaxs.push(RelaxEntry {
            plugin,
            solved: false,
        });
    }

    pub fn add_heuristic(&mut self, plugin: Box<dyn Heuristic>) {
        self.heurs.push(plugin);
    }

    pub fn add_branchrule(&mut self, plugin: Box<dyn BranchRule>) {
        self.branchrules.push(plugin);
    }

    pub fn set_nodesel(&mut self, plugin: Box<dyn NodeSelector>) {
        self.nodesel = plugin;
    }

    /// The number of pricers participating in the current problem. Restarts
    /// are forbidden while this is nonzero.
    pub fn n_active_pricers(&self) -> usize {
        self.pricers.iter().filter(|p| p.is_active()).count()
    }

    /// Recomputes every priority-sorted view. Called once when solving
    /// starts; priorities are static afterwards.
    pub fn sort(&mut self) {
        self.prop_order = sorted_by(self.props.len(), |i| self.props[i].plugin.priority());
        self.sepa_order = sorted_by(self.sepas.len(), |i| self.sepas[i].plugin.priority());
        self.conshdlr_sepa_order = sorted_by(self.conshdlrs.len(), |i| {
            self.conshdlrs[i].plugin.sepa_priority()
        });
        self.conshdlr_enfo_order = sorted_by(self.conshdlrs.len(), |i| {
            self.conshdlrs[i].plugin.enfo_priority()
        });
        self.pricer_order = sorted_by(self.pricers.len(), |i| self.pricers[i].priority());
        self.relax_order = sorted_by(self.relaxs.len(), |i| self.relaxs[i].plugin.priority());
        self.heur_order = sorted_by(self.heurs.len(), |i| self.heurs[i].priority());
        self.branch_order = sorted_by(self.branchrules.len(), |i| self.branchrules[i].priority());
    }

    pub fn prop_order(&self) -> Vec<usize> {
        self.prop_order.clone()
    }
    pub fn sepa_order(&self) -> Vec<usize> {
        self.sepa_order.clone()
    }
    pub fn conshdlr_sepa_order(&self) -> Vec<usize> {
        self.conshdlr_sepa_order.clone()
    }
    pub fn conshdlr_enfo_order(&self) -> Vec<usize> {
        self.conshdlr_enfo_order.clone()
    }
    pub fn pricer_order(&self) -> Vec<usize> {
        self.pricer_order.clone()
    }
    pub fn relax_order(&self) -> Vec<usize> {
        self.relax_order.clone()
    }
    pub fn heur_order(&self) -> Vec<usize> {
        self.heur_order.clone()
    }
    pub fn branch_order(&self) -> Vec<usize> {
        self.branch_order.clone()
    }
}

impl Default for Plugins {
    fn default() -> Self {
        Self::new()
    }
}

/// Indices `0..len` sorted by decreasing priority, stable for equal
/// priorities (registration order breaks ties).
fn sorted_by(len: usize, priority: impl Fn(usize) -> i32) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(priority(i)));
    order
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_plugins {
    use super::*;
    use crate::{PropResult, Result, SolvingData};

    struct Prio(&'static str, i32);
    impl Propagator for Prio {
        fn name(&self) -> &str {
            self.0
        }
        fn priority(&self) -> i32 {
            self.1
        }
        fn execute(
            &mut self,
            _data: &mut SolvingData,
            _depth: usize,
            _only_delayed: bool,
        ) -> Result<PropResult> {
            Ok(PropResult::DidNotRun)
        }
    }

    #[test]
    fn orders_are_sorted_by_decreasing_priority() {
        let mut plugins = Plugins::new();
        plugins.add_propagator(Box::new(Prio("low", -10)));
        plugins.add_propagator(Box::new(Prio("high", 100)));
        plugins.add_propagator(Box::new(Prio("mid", 0)));
        plugins.sort();
        assert_eq!(vec![1, 2, 0], plugins.prop_order());
    }

    #[test]
    fn registration_order_breaks_priority_ties() {
        let mut plugins = Plugins::new();
        plugins.add_propagator(Box::new(Prio("first", 0)));
        plugins.add_propagator(Box::new(Prio("second", 0)));
        plugins.sort();
        assert_eq!(vec![0, 1], plugins.prop_order());
    }
}
