//! mediaq Web - WASM bindings for named media queries.
//!
//! This crate exposes the mediaq registry to JavaScript on top of
//! `window.matchMedia`.
//!
//! # Core Components
//!
//! - `WindowHost`: `MediaHost` over `window.matchMedia`
//! - `JsContext`: Runs listeners inside a JavaScript `apply(fn)` hook
//! - `JsMediaQueryService`: The `MediaQueryService` class
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import { MediaQueryService } from 'mediaq';
//!
//! const media = new MediaQueryService();
//!
//! const unregister = media.onMediaChange(event => {
//!   if (event.queryName === 'phone' && event.matches) {
//!     collapseSidebar();
//!   }
//! });
//!
//! media.isMedia('desktop'); // true on a wide screen
//! ```

extern crate alloc;

mod log;

pub mod convert;
pub mod host;
pub mod service;

pub use convert::{error_to_js, event_to_js, js_to_query_names};
pub use host::{Attachment, JsContext, WindowHost, WindowSubscription};
pub use service::JsMediaQueryService;
