//! mediaq Reactive - Named media conditions with change notification.
//!
//! This crate layers a registry over a host's native "does this media
//! expression match" and "tell me when it changes" primitives. Client code
//! subscribes to named conditions such as `phone` or `portrait` and is
//! notified whenever the condition's truth value flips.
//!
//! # Core Concepts
//!
//! - `MediaHost`: The native capability pair (evaluate, subscribe)
//! - `HostContext`: Wrapper every listener invocation runs inside
//! - `MediaQueryRegistry`: Named conditions, cached state and listeners
//! - `MediaChangeEvent`: What a listener receives on a change
//! - `ManualHost`: An in-memory host for headless use and tests
//!
//! # Example
//!
//! ```
//! use mediaq_reactive::{ManualHost, MediaQueryRegistry, QueryNames};
//! use std::rc::Rc;
//!
//! let host = Rc::new(ManualHost::new());
//! let registry = MediaQueryRegistry::create(host.clone());
//!
//! // Watch every default condition
//! let handle = registry
//!     .on_media_change(QueryNames::Defaults, |event| {
//!         let _ = (event.query_name(), event.matches());
//!     })
//!     .unwrap();
//!
//! host.set_matches("(orientation: portrait)", true);
//! assert_eq!(registry.is_media("portrait"), Ok(true));
//!
//! handle.unregister();
//! registry.dispose();
//! ```

#![no_std]

extern crate alloc;

pub mod event;
pub mod host;
pub mod listener;
pub mod manual;
pub mod registry;

pub use event::{Changes, MediaChangeEvent, MediaLookup};
pub use host::{HostContext, ImmediateContext, MediaHost, NativeCallback, Task};
pub use listener::{Listener, ListenerId, ListenerTable};
pub use manual::{ManualHandle, ManualHost};
pub use registry::{ListenerHandle, MediaQueryRegistry, RegistryBuilder, MATCH_MEDIA};

// Re-export commonly used types from dependencies
pub use mediaq_core::{Error, MediaQuery, QueryNames, Result, DEFAULT_QUERIES};
