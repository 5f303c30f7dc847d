//! MediaQueryService - JavaScript entry point for named media queries.
//!
//! This module provides `JsMediaQueryService`, exported to JavaScript as
//! `MediaQueryService`. It owns a registry over `window.matchMedia` with the
//! default conditions registered.

use crate::convert::{error_to_js, event_to_js, js_to_query_names, to_js_object, DefaultQueries};
use crate::host::{JsContext, WindowHost};
use crate::log::debug_log;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use mediaq_core::Error;
use mediaq_reactive::{MediaChangeEvent, MediaQueryRegistry};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// A registered query as seen from JavaScript.
#[derive(Serialize)]
struct QueryInfo {
    name: String,
    media: String,
}

/// Named media query registry for JavaScript.
///
/// # Example (JavaScript)
///
/// ```javascript
/// const service = new MediaQueryService(fn => $rootScope.$apply(fn));
///
/// const unregister = service.onMediaChange(['phone', 'tablet'], event => {
///   console.log(event.queryName, event.matches, event.isMedia('portrait'));
/// });
///
/// service.registerQuery('wide', '(min-width: 1400px)');
/// unregister();
/// ```
#[wasm_bindgen(js_name = MediaQueryService)]
pub struct JsMediaQueryService {
    registry: MediaQueryRegistry<WindowHost>,
}

impl JsMediaQueryService {
    /// Returns the underlying registry.
    pub fn registry(&self) -> &MediaQueryRegistry<WindowHost> {
        &self.registry
    }
}

#[wasm_bindgen(js_class = MediaQueryService)]
impl JsMediaQueryService {
    /// Creates a service over the global `window`.
    ///
    /// `apply`, if given, is called with a function for every listener
    /// invocation and must run it, e.g. `fn => scope.$apply(fn)`.
    #[wasm_bindgen(constructor)]
    pub fn new(apply: Option<js_sys::Function>) -> JsMediaQueryService {
        let registry = MediaQueryRegistry::builder(WindowHost::new())
            .context(JsContext::new(apply))
            .build();
        if !registry.supports_media() {
            debug_log!("mediaq: matchMedia is not available, no queries registered");
        }
        Self { registry }
    }

    /// Registers a named media query, replacing any query with that name.
    #[wasm_bindgen(js_name = registerQuery)]
    pub fn register_query(&self, name: &str, media: &str) -> Result<(), JsValue> {
        self.registry
            .register_query(name, media)
            .map_err(error_to_js)?;
        debug_log!("mediaq: registered {} as {}", name, media);
        Ok(())
    }

    /// Unregisters a named media query. Unknown names are ignored.
    #[wasm_bindgen(js_name = unregisterQuery)]
    pub fn unregister_query(&self, name: &str) {
        if self.registry.unregister_query(name) {
            debug_log!("mediaq: unregistered {}", name);
        }
    }

    /// Registers a listener for changes to the named queries.
    ///
    /// Accepts `(listener)`, `(name, listener)` or `(names, listener)`.
    /// Returns a function that unregisters the listener; calling it more
    /// than once has no further effect.
    #[wasm_bindgen(js_name = onMediaChange)]
    pub fn on_media_change(
        &self,
        query_names: JsValue,
        listener: JsValue,
    ) -> Result<js_sys::Function, JsValue> {
        self.registry.ensure_supported().map_err(error_to_js)?;

        // onMediaChange(listener)
        let (query_names, listener) = if query_names.is_function() && listener.is_undefined() {
            (JsValue::UNDEFINED, query_names)
        } else {
            (query_names, listener)
        };

        let names = js_to_query_names(&query_names).map_err(error_to_js)?;
        let callback: js_sys::Function = listener
            .dyn_into()
            .map_err(|_| error_to_js(Error::invalid_argument("\"listener\" must be a function.")))?;

        let handle = self
            .registry
            .on_media_change(names, move |event: &MediaChangeEvent| {
                debug_log!("mediaq: {} -> {}", event.query_name(), event.matches());
                let js_event = event_to_js(event);
                if let Err(err) = callback.call1(&JsValue::NULL, &js_event) {
                    debug_log!("mediaq: listener threw {:?}", err);
                }
            })
            .map_err(error_to_js)?;
        debug_log!("mediaq: listener attached to {:?}", handle.names());

        // Create unregister function
        let unregister = Closure::wrap(Box::new(move || {
            handle.unregister();
        }) as Box<dyn FnMut()>);
        let js_fn: js_sys::Function = unregister
            .as_ref()
            .unchecked_ref::<js_sys::Function>()
            .clone();
        unregister.forget();
        Ok(js_fn)
    }

    /// Returns whether the named query currently matches.
    #[wasm_bindgen(js_name = isMedia)]
    pub fn is_media(&self, name: &str) -> Result<bool, JsValue> {
        self.registry.is_media(name).map_err(error_to_js)
    }

    /// Returns the built-in default queries as `{ name: media }`.
    #[wasm_bindgen(getter, js_name = defaultQueries)]
    pub fn default_queries(&self) -> JsValue {
        to_js_object(&DefaultQueries).unwrap_or(JsValue::UNDEFINED)
    }

    /// Returns true if the browser supports `matchMedia`.
    #[wasm_bindgen(getter, js_name = supportsMedia)]
    pub fn supports_media(&self) -> bool {
        self.registry.supports_media()
    }

    /// Returns the registered queries as `[{ name, media }]`, sorted by name.
    pub fn queries(&self) -> Result<JsValue, JsValue> {
        let queries: Vec<QueryInfo> = self
            .registry
            .queries()
            .into_iter()
            .map(|q| QueryInfo {
                name: q.name().into(),
                media: q.media().into(),
            })
            .collect();
        to_js_object(&queries)
    }

    /// Releases every `matchMedia` listener and forgets all queries and listeners.
    ///
    /// Every later call except `dispose` and `unregisterQuery` throws.
    pub fn dispose(&self) {
        self.registry.dispose();
        debug_log!("mediaq: disposed");
    }
}
