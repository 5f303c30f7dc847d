//! An in-memory host driven by application code.
//!
//! `ManualHost` keeps the truth value of each expression in a table and
//! notifies subscribers when a value is flipped with `set_matches`. It is the
//! host for headless environments and for tests.

use crate::host::{MediaHost, NativeCallback};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use hashbrown::HashMap;

/// Handle for a `ManualHost` subscription.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ManualHandle(u64);

struct Watch {
    handle: u64,
    expression: String,
    on_change: NativeCallback,
}

#[derive(Default)]
struct ManualState {
    /// Expression -> current truth value
    matches: HashMap<String, bool>,
    /// Live subscriptions, in subscription order
    watches: Vec<Watch>,
    next_handle: u64,
    evaluations: usize,
    subscribed: usize,
    unsubscribed: usize,
}

/// A `MediaHost` whose expression values are set explicitly.
pub struct ManualHost {
    supported: bool,
    state: RefCell<ManualState>,
}

impl Default for ManualHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualHost {
    /// Creates a host that supports every feature. All expressions start false.
    pub fn new() -> Self {
        Self {
            supported: true,
            state: RefCell::new(ManualState::default()),
        }
    }

    /// Creates a host that reports no features at all.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            state: RefCell::new(ManualState::default()),
        }
    }

    /// Sets the initial value of an expression without notifying anyone.
    pub fn with_matches(self, expression: &str, matches: bool) -> Self {
        self.state
            .borrow_mut()
            .matches
            .insert(expression.into(), matches);
        self
    }

    /// Sets the value of `expression`, notifying its subscribers if it flipped.
    ///
    /// Returns true if subscribers were notified.
    pub fn set_matches(&self, expression: &str, matches: bool) -> bool {
        let previous = self
            .state
            .borrow_mut()
            .matches
            .insert(expression.into(), matches)
            .unwrap_or(false);
        if previous == matches {
            return false;
        }
        self.notify(expression, matches);
        true
    }

    /// Notifies the subscribers of `expression` without checking for a flip.
    pub fn fire(&self, expression: &str, matches: bool) {
        self.state
            .borrow_mut()
            .matches
            .insert(expression.into(), matches);
        self.notify(expression, matches);
    }

    fn notify(&self, expression: &str, matches: bool) {
        // Callbacks may subscribe or unsubscribe, so run them unborrowed
        let callbacks: Vec<NativeCallback> = self
            .state
            .borrow()
            .watches
            .iter()
            .filter(|w| w.expression == expression)
            .map(|w| w.on_change.clone())
            .collect();
        for on_change in callbacks {
            on_change(matches, expression);
        }
    }

    /// Returns the number of live subscriptions.
    pub fn active_subscriptions(&self) -> usize {
        self.state.borrow().watches.len()
    }

    /// Returns the number of live subscriptions for `expression`.
    pub fn subscriptions_for(&self, expression: &str) -> usize {
        self.state
            .borrow()
            .watches
            .iter()
            .filter(|w| w.expression == expression)
            .count()
    }

    /// Returns how many times `evaluate` was called.
    pub fn evaluation_count(&self) -> usize {
        self.state.borrow().evaluations
    }

    /// Returns how many subscriptions were ever opened.
    pub fn subscribe_count(&self) -> usize {
        self.state.borrow().subscribed
    }

    /// Returns how many subscriptions were released.
    pub fn unsubscribe_count(&self) -> usize {
        self.state.borrow().unsubscribed
    }
}

impl MediaHost for ManualHost {
    type Handle = ManualHandle;

    fn supports_feature(&self, _feature: &str) -> bool {
        self.supported
    }

    fn evaluate(&self, expression: &str) -> bool {
        let mut state = self.state.borrow_mut();
        state.evaluations += 1;
        state.matches.get(expression).copied().unwrap_or(false)
    }

    fn subscribe(&self, expression: &str, on_change: NativeCallback) -> ManualHandle {
        let mut state = self.state.borrow_mut();
        let handle = state.next_handle;
        state.next_handle += 1;
        state.subscribed += 1;
        state.watches.push(Watch {
            handle,
            expression: expression.into(),
            on_change,
        });
        ManualHandle(handle)
    }

    fn unsubscribe(&self, handle: ManualHandle) {
        let mut state = self.state.borrow_mut();
        let before = state.watches.len();
        state.watches.retain(|w| w.handle != handle.0);
        if state.watches.len() < before {
            state.unsubscribed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::Cell;

    #[test]
    fn test_manual_host_evaluate() {
        let host = ManualHost::new().with_matches("print", true);
        assert!(host.evaluate("print"));
        assert!(!host.evaluate("(orientation: portrait)"));
        assert_eq!(host.evaluation_count(), 2);
    }

    #[test]
    fn test_manual_host_notifies_on_flip() {
        let host = ManualHost::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let _handle = host.subscribe(
            "(max-width: 767px)",
            Rc::new(move |matches: bool, media: &str| {
                seen_clone.borrow_mut().push((matches, String::from(media)));
            }),
        );

        assert!(host.set_matches("(max-width: 767px)", true));
        // Same value, no flip
        assert!(!host.set_matches("(max-width: 767px)", true));
        // Other expression
        host.set_matches("print", true);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], (true, String::from("(max-width: 767px)")));
    }

    #[test]
    fn test_manual_host_unsubscribe() {
        let host = ManualHost::new();
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        let handle = host.subscribe(
            "print",
            Rc::new(move |_: bool, _: &str| count_clone.set(count_clone.get() + 1)),
        );
        assert_eq!(host.active_subscriptions(), 1);

        host.unsubscribe(handle);
        assert_eq!(host.active_subscriptions(), 0);
        assert_eq!(host.unsubscribe_count(), 1);

        host.fire("print", true);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_manual_host_unsupported() {
        let host = ManualHost::unsupported();
        assert!(!host.supports_feature("matchMedia"));
        assert!(ManualHost::new().supports_feature("matchMedia"));
    }

    #[test]
    fn test_callback_may_unsubscribe_during_notify() {
        let host = Rc::new(ManualHost::new());
        let handle: Rc<RefCell<Option<ManualHandle>>> = Rc::new(RefCell::new(None));

        let host_clone = host.clone();
        let handle_clone = handle.clone();
        let h = host.subscribe(
            "print",
            Rc::new(move |_: bool, _: &str| {
                if let Some(h) = handle_clone.borrow_mut().take() {
                    host_clone.unsubscribe(h);
                }
            }),
        );
        *handle.borrow_mut() = Some(h);

        host.fire("print", true);
        assert_eq!(host.active_subscriptions(), 0);
    }
}
