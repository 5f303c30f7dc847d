//! Change events delivered to listeners.

use alloc::rc::Weak;
use alloc::string::String;
use core::fmt;
use hashbrown::HashMap;
use mediaq_core::{Error, Result};

/// Read access to the registry's current condition state.
pub trait MediaLookup {
    /// Returns whether the condition `name` currently holds.
    fn is_media(&self, name: &str) -> Result<bool>;
}

/// Condition name -> new truth value.
pub type Changes = HashMap<String, bool>;

/// Event passed to a listener when a watched condition flips.
///
/// The event only holds a weak reference to its registry. A listener may keep
/// an event past the registry's lifetime, and `is_media` then fails with
/// `Error::Disposed`.
#[derive(Clone)]
pub struct MediaChangeEvent {
    query_name: String,
    matches: bool,
    media: String,
    changes: Changes,
    lookup: Weak<dyn MediaLookup>,
}

impl MediaChangeEvent {
    pub(crate) fn new(
        query_name: &str,
        matches: bool,
        media: &str,
        lookup: Weak<dyn MediaLookup>,
    ) -> Self {
        let mut changes = Changes::with_capacity(1);
        changes.insert(query_name.into(), matches);
        Self {
            query_name: query_name.into(),
            matches,
            media: media.into(),
            changes,
            lookup,
        }
    }

    /// Returns the name of the condition that changed.
    #[inline]
    pub fn query_name(&self) -> &str {
        &self.query_name
    }

    /// Returns the new truth value.
    #[inline]
    pub fn matches(&self) -> bool {
        self.matches
    }

    /// Returns the expression as reported by the host.
    #[inline]
    pub fn media(&self) -> &str {
        &self.media
    }

    /// Returns the changed conditions, keyed by condition name.
    #[inline]
    pub fn changes(&self) -> &Changes {
        &self.changes
    }

    /// Returns whether another registered condition currently holds.
    pub fn is_media(&self, name: &str) -> Result<bool> {
        match self.lookup.upgrade() {
            Some(lookup) => lookup.is_media(name),
            None => Err(Error::disposed()),
        }
    }
}

impl fmt::Debug for MediaChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaChangeEvent")
            .field("query_name", &self.query_name)
            .field("matches", &self.matches)
            .field("media", &self.media)
            .field("changes", &self.changes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;

    struct FixedLookup;

    impl MediaLookup for FixedLookup {
        fn is_media(&self, name: &str) -> Result<bool> {
            match name {
                "desktop" => Ok(true),
                "phone" => Ok(false),
                _ => Err(Error::not_registered(name)),
            }
        }
    }

    fn event(
        name: &str,
        matches: bool,
        media: &str,
        lookup: &Rc<dyn MediaLookup>,
    ) -> MediaChangeEvent {
        MediaChangeEvent::new(name, matches, media, Rc::downgrade(lookup))
    }

    #[test]
    fn test_event_fields() {
        let lookup: Rc<dyn MediaLookup> = Rc::new(FixedLookup);
        let event = event("desktop", true, "(min-width: 979px)", &lookup);
        assert_eq!(event.query_name(), "desktop");
        assert!(event.matches());
        assert_eq!(event.media(), "(min-width: 979px)");
    }

    #[test]
    fn test_changes_keyed_by_query_name() {
        let lookup: Rc<dyn MediaLookup> = Rc::new(FixedLookup);
        let event = event("phone", false, "(max-width: 767px)", &lookup);
        assert_eq!(event.changes().len(), 1);
        assert_eq!(event.changes().get(event.query_name()), Some(&false));
        assert_eq!(event.changes().get("name"), None);
    }

    #[test]
    fn test_event_is_media_delegates() {
        let lookup: Rc<dyn MediaLookup> = Rc::new(FixedLookup);
        let event = event("phone", false, "(max-width: 767px)", &lookup);
        assert_eq!(event.is_media("desktop"), Ok(true));
        assert_eq!(event.is_media("tv"), Err(Error::not_registered("tv")));
    }

    #[test]
    fn test_event_outliving_lookup() {
        let lookup: Rc<dyn MediaLookup> = Rc::new(FixedLookup);
        let event = event("desktop", true, "(min-width: 979px)", &lookup);
        drop(lookup);
        assert_eq!(event.is_media("desktop"), Err(Error::disposed()));
    }
}
