//! Host collaborators.
//!
//! The registry never talks to a platform directly. It is given a
//! `MediaHost`, which evaluates and watches expressions, and a
//! `HostContext`, which every listener invocation is routed through.

use alloc::boxed::Box;
use alloc::rc::Rc;

/// Callback a host invokes with `(matches, media)` when an expression flips.
pub type NativeCallback = Rc<dyn Fn(bool, &str)>;

/// A deferred listener invocation handed to a `HostContext`.
pub type Task = Box<dyn FnOnce()>;

/// The native capability pair the registry is built on.
///
/// Implementations use interior mutability where they need state; every
/// method takes `&self` so that callbacks may re-enter the host.
pub trait MediaHost {
    /// Opaque subscription handle. Consumed by `unsubscribe`.
    type Handle;

    /// Returns true if the host exposes `feature`.
    fn supports_feature(&self, feature: &str) -> bool;

    /// Synchronously evaluates `expression`.
    fn evaluate(&self, expression: &str) -> bool;

    /// Starts watching `expression`, calling `on_change` on every flip.
    fn subscribe(&self, expression: &str, on_change: NativeCallback) -> Self::Handle;

    /// Stops a subscription returned by `subscribe`.
    fn unsubscribe(&self, handle: Self::Handle);
}

impl<H: MediaHost + ?Sized> MediaHost for Rc<H> {
    type Handle = H::Handle;

    fn supports_feature(&self, feature: &str) -> bool {
        (**self).supports_feature(feature)
    }

    fn evaluate(&self, expression: &str) -> bool {
        (**self).evaluate(expression)
    }

    fn subscribe(&self, expression: &str, on_change: NativeCallback) -> Self::Handle {
        (**self).subscribe(expression, on_change)
    }

    fn unsubscribe(&self, handle: Self::Handle) {
        (**self).unsubscribe(handle)
    }
}

/// Execution wrapper around listener invocations.
///
/// A UI host typically runs the task inside its update cycle so that state
/// mutated by the listener is picked up by the next render.
pub trait HostContext {
    /// Runs `task` in the host's update context.
    fn run(&self, task: Task);
}

impl<F> HostContext for F
where
    F: Fn(Task),
{
    fn run(&self, task: Task) {
        self(task)
    }
}

/// Runs every task immediately, with no surrounding context.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateContext;

impl HostContext for ImmediateContext {
    #[inline]
    fn run(&self, task: Task) {
        task()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn test_immediate_context_runs_task() {
        let ran = Rc::new(Cell::new(false));
        let ran_clone = ran.clone();
        ImmediateContext.run(Box::new(move || ran_clone.set(true)));
        assert!(ran.get());
    }

    #[test]
    fn test_closure_context() {
        let wrapped = Rc::new(Cell::new(0));
        let wrapped_clone = wrapped.clone();
        let context = move |task: Task| {
            wrapped_clone.set(wrapped_clone.get() + 1);
            task();
        };

        let ran = Rc::new(Cell::new(false));
        let ran_clone = ran.clone();
        context.run(Box::new(move || ran_clone.set(true)));

        assert!(ran.get());
        assert_eq!(wrapped.get(), 1);
    }
}
