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

//! This module defines the global `EventFilter`: the set of listeners the
//! core broadcasts its events to. Emission is synchronous; the announced
//! state transition is complete once every listener has returned.

use crate::{Event, EventListener, Result};

/// The global event filter.
#[derive(Default)]
pub struct EventFilter {
    listeners: Vec<Box<dyn EventListener>>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Box<dyn EventListener>) {
        self.listeners.push(listener);
    }

    pub fn n_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// Broadcasts an event to every listener.
    pub fn emit(&mut self, event: Event) -> Result<()> {
        log::debug!("event {:?}", event);
        for listener in self.listeners.iter_mut() {
            listener.notify(&event)?;
        }
        Ok(())
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_events {
    use super::*;
    use crate::NodeId;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<Event>>>);
    impl EventListener for Recorder {
        fn notify(&mut self, event: &Event) -> Result<()> {
            self.0.borrow_mut().push(*event);
            Ok(())
        }
    }

    #[test]
    fn every_listener_sees_every_event() {
        let seen_a = Rc::new(RefCell::new(vec![]));
        let seen_b = Rc::new(RefCell::new(vec![]));
        let mut filter = EventFilter::new();
        filter.add_listener(Box::new(Recorder(Rc::clone(&seen_a))));
        filter.add_listener(Box::new(Recorder(Rc::clone(&seen_b))));

        filter.emit(Event::NodeFocused(NodeId(1))).unwrap();
        filter.emit(Event::LpSolved(NodeId(1))).unwrap();

        assert_eq!(2, seen_a.borrow().len());
        assert_eq!(seen_a.borrow().as_slice(), seen_b.borrow().as_slice());
    }
}
