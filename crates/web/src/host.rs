//! Browser host over `window.matchMedia`.

use crate::log::debug_log;
use alloc::string::String;
use js_sys::{Function, Reflect};
use mediaq_reactive::{HostContext, MediaHost, NativeCallback, Task};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{MediaQueryList, Window};

/// How a subscription's listener is attached to its `MediaQueryList`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attachment {
    /// `addEventListener("change", ..)`
    Event,
    /// Legacy `addListener(..)`, for engines where `MediaQueryList` is not an
    /// `EventTarget`
    Legacy,
    /// Nothing accepted the listener; the condition never fires
    Detached,
}

/// A live `change` listener on a `MediaQueryList`.
pub struct WindowSubscription {
    list: Option<MediaQueryList>,
    attachment: Attachment,
    closure: Closure<dyn FnMut(JsValue)>,
}

impl WindowSubscription {
    /// Returns how the listener was attached.
    #[inline]
    pub fn attachment(&self) -> Attachment {
        self.attachment
    }
}

/// `MediaHost` backed by the global `window`.
///
/// Outside a browser (no `window`) every feature is reported missing, so a
/// registry built on it refuses to register anything.
pub struct WindowHost {
    window: Option<Window>,
}

impl Default for WindowHost {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowHost {
    /// Creates a host for the current global `window`.
    pub fn new() -> Self {
        Self {
            window: web_sys::window(),
        }
    }

    fn match_media(&self, expression: &str) -> Option<MediaQueryList> {
        self.window
            .as_ref()?
            .match_media(expression)
            .ok()
            .flatten()
    }
}

/// Reads `matches` and `media` off a change notification.
///
/// `change` events and the legacy listener argument (the list itself) both
/// carry these two properties.
pub(crate) fn read_change(value: &JsValue, expression: &str) -> (bool, String) {
    let matches = Reflect::get(value, &JsValue::from_str("matches"))
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let media = Reflect::get(value, &JsValue::from_str("media"))
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_else(|| String::from(expression));
    (matches, media)
}

#[allow(deprecated)]
pub(crate) fn attach(list: &MediaQueryList, callback: &Function) -> Attachment {
    if list.add_event_listener_with_callback("change", callback).is_ok() {
        Attachment::Event
    } else if list.add_listener_with_opt_callback(Some(callback)).is_ok() {
        Attachment::Legacy
    } else {
        Attachment::Detached
    }
}

#[allow(deprecated)]
pub(crate) fn detach(list: &MediaQueryList, attachment: Attachment, callback: &Function) {
    let _ = match attachment {
        Attachment::Event => list.remove_event_listener_with_callback("change", callback),
        Attachment::Legacy => list.remove_listener_with_opt_callback(Some(callback)),
        Attachment::Detached => Ok(()),
    };
}

impl MediaHost for WindowHost {
    type Handle = WindowSubscription;

    fn supports_feature(&self, feature: &str) -> bool {
        match self.window {
            Some(ref window) => Reflect::has(window, &JsValue::from_str(feature)).unwrap_or(false),
            None => false,
        }
    }

    fn evaluate(&self, expression: &str) -> bool {
        self.match_media(expression)
            .map(|list| list.matches())
            .unwrap_or(false)
    }

    fn subscribe(&self, expression: &str, on_change: NativeCallback) -> WindowSubscription {
        let owned = String::from(expression);
        let closure = Closure::wrap(Box::new(move |change: JsValue| {
            let (matches, media) = read_change(&change, &owned);
            on_change(matches, media.as_str());
        }) as Box<dyn FnMut(JsValue)>);

        let list = self.match_media(expression);
        let attachment = match list {
            Some(ref list) => attach(list, closure.as_ref().unchecked_ref()),
            None => Attachment::Detached,
        };
        if attachment == Attachment::Detached {
            debug_log!("mediaq: cannot watch {}", expression);
        }

        WindowSubscription {
            list,
            attachment,
            closure,
        }
    }

    fn unsubscribe(&self, handle: WindowSubscription) {
        if let Some(ref list) = handle.list {
            detach(list, handle.attachment, handle.closure.as_ref().unchecked_ref());
        }
        // Dropping the closure frees the Rust side of the listener
    }
}

/// `HostContext` that hands each listener call to a JavaScript `apply(fn)`.
///
/// `apply` receives a function and must call it, e.g. a framework's digest
/// entry point bound to its scope. Without `apply`, listeners run directly.
pub struct JsContext {
    apply: Option<Function>,
}

impl JsContext {
    /// Creates a context around an optional `apply` function.
    pub fn new(apply: Option<Function>) -> Self {
        Self { apply }
    }
}

impl HostContext for JsContext {
    fn run(&self, task: Task) {
        match self.apply {
            Some(ref apply) => {
                let callback = Closure::once_into_js(move || task());
                if let Err(err) = apply.call1(&JsValue::NULL, &callback) {
                    debug_log!("mediaq: apply threw {:?}", err);
                }
            }
            None => task(),
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    /// A `MediaQueryList` stand-in that only knows the legacy listener API.
    fn legacy_list() -> MediaQueryList {
        Function::new_no_args(
            "const list = { matches: true, media: 'print', added: 0, removed: 0 };
             list.addEventListener = () => { throw new TypeError('not an EventTarget'); };
             list.removeEventListener = list.addEventListener;
             list.addListener = () => { list.added += 1; };
             list.removeListener = () => { list.removed += 1; };
             return list;",
        )
        .call0(&JsValue::NULL)
        .unwrap()
        .unchecked_into()
    }

    fn counter(list: &MediaQueryList, key: &str) -> Option<f64> {
        Reflect::get(list, &JsValue::from_str(key)).unwrap().as_f64()
    }

    #[wasm_bindgen_test]
    fn test_attach_falls_back_to_legacy_listener() {
        let list = legacy_list();
        let callback = Function::new_no_args("");

        let attachment = attach(&list, &callback);
        assert_eq!(attachment, Attachment::Legacy);
        assert_eq!(counter(&list, "added"), Some(1.0));

        detach(&list, attachment, &callback);
        assert_eq!(counter(&list, "removed"), Some(1.0));
    }

    #[wasm_bindgen_test]
    fn test_attach_prefers_change_event() {
        let host = WindowHost::new();
        let subscription = host.subscribe("print", alloc::rc::Rc::new(|_: bool, _: &str| {}));
        assert_eq!(subscription.attachment(), Attachment::Event);
        host.unsubscribe(subscription);
    }

    #[wasm_bindgen_test]
    fn test_read_change_from_list() {
        let list = legacy_list();
        assert_eq!(read_change(&list, "print"), (true, String::from("print")));

        let empty = js_sys::Object::new();
        assert_eq!(
            read_change(&empty, "(max-width: 767px)"),
            (false, String::from("(max-width: 767px)"))
        );
    }
}
