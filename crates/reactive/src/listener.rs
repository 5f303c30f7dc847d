//! Listener bookkeeping.
//!
//! Listeners are stored per condition name in registration order. A listener
//! attached to several names shares one `ListenerId` across all of them so it
//! can be detached in a single call.

use crate::event::MediaChangeEvent;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;

/// Unique identifier for a listener registration.
pub type ListenerId = u64;

/// Callback type for change notifications.
pub type Listener = Rc<dyn Fn(&MediaChangeEvent)>;

/// Condition name -> listeners, in registration order.
pub struct ListenerTable {
    listeners: HashMap<String, Vec<(ListenerId, Listener)>>,
    /// Next listener ID to assign
    next_id: ListenerId,
}

impl Default for ListenerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenerTable {
    /// Creates an empty listener table.
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 1,
        }
    }

    /// Attaches `listener` to every name in `names`.
    ///
    /// Returns the ID that detaches it again.
    pub fn attach(&mut self, names: &[String], listener: Listener) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;

        for name in names {
            self.listeners
                .entry(name.clone())
                .or_default()
                .push((id, listener.clone()));
        }

        id
    }

    /// Detaches listener `id` from every name in `names`.
    ///
    /// Returns true if at least one entry was removed.
    pub fn detach(&mut self, names: &[String], id: ListenerId) -> bool {
        let mut removed = false;
        for name in names {
            if let Some(entries) = self.listeners.get_mut(name.as_str()) {
                let before = entries.len();
                entries.retain(|(entry_id, _)| *entry_id != id);
                removed |= entries.len() < before;
                if entries.is_empty() {
                    self.listeners.remove(name.as_str());
                }
            }
        }
        removed
    }

    /// Returns a copy of the listeners for `name`, in registration order.
    pub fn snapshot(&self, name: &str) -> Vec<Listener> {
        self.listeners
            .get(name)
            .map(|entries| entries.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns the number of listeners attached to `name`.
    pub fn count(&self, name: &str) -> usize {
        self.listeners.get(name).map(Vec::len).unwrap_or(0)
    }

    /// Returns true if no listener is attached to any name.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Removes every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| String::from(*n)).collect()
    }

    struct NoLookup;

    impl crate::event::MediaLookup for NoLookup {
        fn is_media(&self, _name: &str) -> mediaq_core::Result<bool> {
            Ok(false)
        }
    }

    fn noop() -> Listener {
        Rc::new(|_: &MediaChangeEvent| {})
    }

    #[test]
    fn test_attach_assigns_ids() {
        let mut table = ListenerTable::new();

        let id1 = table.attach(&names(&["phone"]), noop());
        let id2 = table.attach(&names(&["phone"]), noop());

        assert_eq!(id1, 1);
        assert_eq!(id2, 2);
        assert_eq!(table.count("phone"), 2);
    }

    #[test]
    fn test_attach_multiple_names() {
        let mut table = ListenerTable::new();
        table.attach(&names(&["phone", "tablet"]), noop());

        assert_eq!(table.count("phone"), 1);
        assert_eq!(table.count("tablet"), 1);
        assert_eq!(table.count("desktop"), 0);
    }

    #[test]
    fn test_detach_from_all_names() {
        let mut table = ListenerTable::new();
        let ns = names(&["phone", "tablet"]);
        let id = table.attach(&ns, noop());
        let other = table.attach(&names(&["phone"]), noop());

        assert!(table.detach(&ns, id));
        assert_eq!(table.count("phone"), 1);
        assert_eq!(table.count("tablet"), 0);

        // Already removed
        assert!(!table.detach(&ns, id));

        assert!(table.detach(&names(&["phone"]), other));
        assert!(table.is_empty());
    }

    #[test]
    fn test_snapshot_preserves_order() {
        let mut table = ListenerTable::new();
        let order = Rc::new(core::cell::RefCell::new(Vec::new()));

        for i in 0..3 {
            let order = order.clone();
            let listener: Listener =
                Rc::new(move |_: &MediaChangeEvent| order.borrow_mut().push(i));
            table.attach(&names(&["desktop"]), listener);
        }

        let snapshot = table.snapshot("desktop");
        assert_eq!(snapshot.len(), 3);
        assert!(table.snapshot("print").is_empty());

        let lookup: Rc<dyn crate::event::MediaLookup> = Rc::new(NoLookup);
        let event =
            MediaChangeEvent::new("desktop", true, "(min-width: 979px)", Rc::downgrade(&lookup));
        for listener in &snapshot {
            listener(&event);
        }
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicate_name_detaches_every_copy() {
        let mut table = ListenerTable::new();
        let ns = names(&["phone", "phone"]);
        let id = table.attach(&ns, noop());
        assert_eq!(table.count("phone"), 2);

        table.detach(&ns, id);
        assert_eq!(table.count("phone"), 0);
    }

    #[test]
    fn test_clear() {
        let mut table = ListenerTable::new();
        table.attach(&names(&["print"]), noop());
        table.attach(&names(&["portrait"]), noop());

        table.clear();
        assert!(table.is_empty());
    }
}
