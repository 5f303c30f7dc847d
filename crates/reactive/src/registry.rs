//! Media query registry and change dispatch.
//!
//! This module provides `MediaQueryRegistry`, which keeps named conditions,
//! their cached truth values and the listeners watching them, and fans out
//! host change notifications to those listeners.
//!
//! All state lives behind a single `Rc`. Native callbacks only hold a `Weak`
//! reference, and so do change events, so neither a host subscription nor an
//! event kept by a listener keeps the registry alive. No
//! table borrow is held while calling into the host, the host context or a
//! listener, which lets listeners re-enter any registry method.

use crate::event::{MediaChangeEvent, MediaLookup};
use crate::host::{HostContext, ImmediateContext, MediaHost, NativeCallback};
use crate::listener::{Listener, ListenerId, ListenerTable};
use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use hashbrown::HashMap;
use mediaq_core::{validate_name, Error, MediaQuery, QueryNames, Result, DEFAULT_QUERIES};

/// Host feature the registry requires.
pub const MATCH_MEDIA: &str = "matchMedia";

/// A registered condition and its live native subscription.
struct Condition<K> {
    /// Generation of this registration, used to drop stale notifications
    generation: u64,
    media: String,
    handle: K,
}

struct Tables<K> {
    queries: HashMap<String, Condition<K>>,
    /// Condition name -> last known truth value
    state: HashMap<String, bool>,
    listeners: ListenerTable,
    next_generation: u64,
}

impl<K> Tables<K> {
    fn new() -> Self {
        Self {
            queries: HashMap::new(),
            state: HashMap::new(),
            listeners: ListenerTable::new(),
            next_generation: 1,
        }
    }
}

struct Shared<H: MediaHost> {
    host: H,
    context: Box<dyn HostContext>,
    feature: String,
    supported: bool,
    disposed: Cell<bool>,
    tables: RefCell<Tables<H::Handle>>,
}

impl<H: MediaHost + 'static> Shared<H> {
    fn ensure_supported(&self) -> Result<()> {
        if self.disposed.get() {
            Err(Error::disposed())
        } else if self.supported {
            Ok(())
        } else {
            Err(Error::unsupported_feature(self.feature.as_str()))
        }
    }

    fn register_query(self: &Rc<Self>, name: &str, media: &str) -> Result<()> {
        self.ensure_supported()?;
        validate_name(name)?;
        self.subscribe_query(name, media);
        Ok(())
    }

    /// Replaces the condition `name` with a fresh subscription to `media`.
    ///
    /// `name` must already be validated.
    fn subscribe_query(self: &Rc<Self>, name: &str, media: &str) {
        self.unregister_query(name);

        let generation = {
            let mut tables = self.tables.borrow_mut();
            let generation = tables.next_generation;
            tables.next_generation += 1;
            generation
        };

        let weak: Weak<Self> = Rc::downgrade(self);
        let owned_name = String::from(name);
        let on_change: NativeCallback = Rc::new(move |matches: bool, media: &str| {
            if let Some(shared) = weak.upgrade() {
                shared.handle_change(&owned_name, generation, matches, media);
            }
        });
        let handle = self.host.subscribe(media, on_change);

        self.tables.borrow_mut().queries.insert(
            name.into(),
            Condition {
                generation,
                media: media.into(),
                handle,
            },
        );
    }

    fn unregister_query(&self, name: &str) -> bool {
        let removed = {
            let mut tables = self.tables.borrow_mut();
            tables.state.remove(name);
            tables.queries.remove(name)
        };
        match removed {
            Some(condition) => {
                self.host.unsubscribe(condition.handle);
                true
            }
            None => false,
        }
    }

    fn handle_change(self: &Rc<Self>, name: &str, generation: u64, matches: bool, media: &str) {
        let listeners = {
            let mut tables = self.tables.borrow_mut();
            match tables.queries.get(name) {
                Some(condition) if condition.generation == generation => {}
                // Released or replaced subscription
                _ => return,
            }
            tables.state.insert(name.into(), matches);
            tables.listeners.snapshot(name)
        };

        let lookup: Weak<dyn MediaLookup> = Rc::downgrade(self) as Weak<Shared<H>>;
        for listener in listeners {
            let event = MediaChangeEvent::new(name, matches, media, lookup.clone());
            self.context.run(Box::new(move || listener(&event)));
        }
    }

    fn default_names(&self) -> Vec<String> {
        let tables = self.tables.borrow();
        DEFAULT_QUERIES
            .iter()
            .filter(|(name, _)| tables.queries.contains_key(*name))
            .map(|(name, _)| String::from(*name))
            .collect()
    }

    fn release_all(&self) {
        let conditions: Vec<Condition<H::Handle>> = {
            let mut tables = self.tables.borrow_mut();
            tables.state.clear();
            tables.listeners.clear();
            tables.queries.drain().map(|(_, c)| c).collect()
        };
        for condition in conditions {
            self.host.unsubscribe(condition.handle);
        }
    }
}

impl<H: MediaHost + 'static> MediaLookup for Shared<H> {
    fn is_media(&self, name: &str) -> Result<bool> {
        if self.disposed.get() {
            return Err(Error::disposed());
        }
        let media = {
            let tables = self.tables.borrow();
            let Some(condition) = tables.queries.get(name) else {
                return Err(Error::not_registered(name));
            };
            if let Some(&matches) = tables.state.get(name) {
                return Ok(matches);
            }
            condition.media.clone()
        };

        let matches = self.host.evaluate(&media);
        let mut tables = self.tables.borrow_mut();
        // The host may have released the condition while evaluating
        if tables.queries.contains_key(name) {
            tables.state.insert(name.into(), matches);
        }
        Ok(matches)
    }
}

impl<H: MediaHost> Drop for Shared<H> {
    fn drop(&mut self) {
        let tables = self.tables.get_mut();
        for (_, condition) in tables.queries.drain() {
            self.host.unsubscribe(condition.handle);
        }
    }
}

/// Handle returned by `on_media_change`.
///
/// Calling `unregister` detaches the listener from every name it was
/// attached to. Further calls do nothing. Dropping the handle does not
/// detach the listener.
pub struct ListenerHandle<H: MediaHost> {
    shared: Weak<Shared<H>>,
    names: Vec<String>,
    id: ListenerId,
    active: Cell<bool>,
}

impl<H: MediaHost + 'static> ListenerHandle<H> {
    /// Detaches the listener. Returns true on the first effective call.
    pub fn unregister(&self) -> bool {
        if !self.active.replace(false) {
            return false;
        }
        match self.shared.upgrade() {
            Some(shared) => shared.tables.borrow_mut().listeners.detach(&self.names, self.id),
            None => false,
        }
    }

    /// Returns true until `unregister` has been called.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Returns the names the listener was attached to.
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Builder for `MediaQueryRegistry`.
pub struct RegistryBuilder<H: MediaHost> {
    host: H,
    context: Box<dyn HostContext>,
    feature: String,
    defaults: bool,
    queries: Vec<MediaQuery>,
}

impl<H: MediaHost + 'static> RegistryBuilder<H> {
    /// Creates a builder for `host`, running listeners immediately.
    pub fn new(host: H) -> Self {
        Self {
            host,
            context: Box::new(ImmediateContext),
            feature: String::from(MATCH_MEDIA),
            defaults: true,
            queries: Vec::new(),
        }
    }

    /// Routes every listener invocation through `context`.
    pub fn context(mut self, context: impl HostContext + 'static) -> Self {
        self.context = Box::new(context);
        self
    }

    /// Sets the host feature checked at construction.
    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = feature.into();
        self
    }

    /// Skips registration of the built-in default conditions.
    pub fn without_defaults(mut self) -> Self {
        self.defaults = false;
        self
    }

    /// Registers an extra condition at construction, after the defaults.
    pub fn query(mut self, query: MediaQuery) -> Self {
        self.queries.push(query);
        self
    }

    /// Builds the registry.
    ///
    /// If the host lacks the required feature, the registry is created empty
    /// and every mutating call fails with `Error::UnsupportedFeature`.
    pub fn build(self) -> MediaQueryRegistry<H> {
        let supported = self.host.supports_feature(&self.feature);
        let shared = Rc::new(Shared {
            host: self.host,
            context: self.context,
            feature: self.feature,
            supported,
            disposed: Cell::new(false),
            tables: RefCell::new(Tables::new()),
        });

        if supported {
            let mut queries = Vec::with_capacity(DEFAULT_QUERIES.len() + self.queries.len());
            if self.defaults {
                queries.extend(MediaQuery::defaults());
            }
            queries.extend(self.queries);
            for query in &queries {
                shared.subscribe_query(query.name(), query.media());
            }
        }

        MediaQueryRegistry { shared }
    }
}

/// A registry of named media conditions.
///
/// # Example
///
/// ```
/// use mediaq_reactive::{ManualHost, MediaQueryRegistry};
/// use std::rc::Rc;
///
/// let host = Rc::new(ManualHost::new());
/// let registry = MediaQueryRegistry::create(host.clone());
///
/// let handle = registry
///     .on_media_change("desktop", |event| {
///         assert_eq!(event.query_name(), "desktop");
///     })
///     .unwrap();
///
/// host.set_matches("(min-width: 979px)", true);
/// assert_eq!(registry.is_media("desktop"), Ok(true));
/// handle.unregister();
/// ```
pub struct MediaQueryRegistry<H: MediaHost> {
    shared: Rc<Shared<H>>,
}

impl<H: MediaHost> Clone for MediaQueryRegistry<H> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<H: MediaHost + 'static> MediaQueryRegistry<H> {
    /// Creates a registry with the default conditions registered.
    pub fn create(host: H) -> Self {
        RegistryBuilder::new(host).build()
    }

    /// Returns a builder for a registry over `host`.
    pub fn builder(host: H) -> RegistryBuilder<H> {
        RegistryBuilder::new(host)
    }

    /// Returns the host this registry is built on.
    #[inline]
    pub fn host(&self) -> &H {
        &self.shared.host
    }

    /// Returns true if the host supports media queries.
    #[inline]
    pub fn supports_media(&self) -> bool {
        self.shared.supported
    }

    /// Fails with `Error::UnsupportedFeature` if the host lacks media queries.
    pub fn ensure_supported(&self) -> Result<()> {
        self.shared.ensure_supported()
    }

    /// Registers `media` under `name`, replacing any existing condition.
    ///
    /// A replaced condition's native subscription is released without
    /// notifying anyone.
    pub fn register_query(&self, name: &str, media: &str) -> Result<()> {
        self.shared.register_query(name, media)
    }

    /// Unregisters the condition `name`. Does nothing if it is unknown.
    ///
    /// Listeners attached to `name` stay attached and fire again if the
    /// name is registered later.
    pub fn unregister_query(&self, name: &str) -> bool {
        self.shared.unregister_query(name)
    }

    /// Attaches `listener` to the conditions named by `names`.
    ///
    /// `QueryNames::Defaults` resolves to the built-in default names that are
    /// registered at the time of the call.
    pub fn on_media_change<F>(
        &self,
        names: impl Into<QueryNames>,
        listener: F,
    ) -> Result<ListenerHandle<H>>
    where
        F: Fn(&MediaChangeEvent) + 'static,
    {
        self.on_media_change_rc(names.into(), Rc::new(listener))
    }

    /// Attaches an already shared listener. See `on_media_change`.
    pub fn on_media_change_rc(
        &self,
        names: QueryNames,
        listener: Listener,
    ) -> Result<ListenerHandle<H>> {
        self.shared.ensure_supported()?;
        let names = names.resolve(|| self.shared.default_names())?;

        let id = self
            .shared
            .tables
            .borrow_mut()
            .listeners
            .attach(&names, listener);

        Ok(ListenerHandle {
            shared: Rc::downgrade(&self.shared),
            names,
            id,
            active: Cell::new(true),
        })
    }

    /// Returns whether the condition `name` currently holds.
    ///
    /// The value is cached; the host is only asked the first time and is
    /// kept current by change notifications afterwards.
    pub fn is_media(&self, name: &str) -> Result<bool> {
        self.shared.is_media(name)
    }

    /// Returns true if `name` is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.shared.tables.borrow().queries.contains_key(name)
    }

    /// Returns the expression registered under `name`.
    pub fn expression(&self, name: &str) -> Option<String> {
        self.shared
            .tables
            .borrow()
            .queries
            .get(name)
            .map(|c| c.media.clone())
    }

    /// Returns every registered condition, sorted by name.
    pub fn queries(&self) -> Vec<MediaQuery> {
        let tables = self.shared.tables.borrow();
        let mut queries: Vec<MediaQuery> = tables
            .queries
            .iter()
            .filter_map(|(name, c)| MediaQuery::new(name.as_str(), c.media.as_str()).ok())
            .collect();
        queries.sort_by(|a, b| a.name().cmp(b.name()));
        queries
    }

    /// Returns the built-in default names that are currently registered.
    pub fn default_names(&self) -> Vec<String> {
        self.shared.default_names()
    }

    /// Returns the number of listeners attached to `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.shared.tables.borrow().listeners.count(name)
    }

    /// Returns a lookup handle that answers `is_media` for this registry.
    pub fn lookup(&self) -> Rc<dyn MediaLookup> {
        self.shared.clone()
    }

    /// Releases every native subscription and clears all tables.
    ///
    /// The registry is inert afterwards: `register_query`, `on_media_change`
    /// and `is_media` fail with `Error::Disposed`. Calling `dispose` again
    /// does nothing.
    pub fn dispose(&self) {
        if !self.shared.disposed.replace(true) {
            self.shared.release_all();
        }
    }

    /// Returns true once `dispose` has been called.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.get()
    }
}
