//! Console logging, compiled in with the `debug-log` feature.

/// Logs a formatted message with `console.debug` when `debug-log` is enabled.
macro_rules! debug_log {
    ($($arg:tt)*) => {{
        #[cfg(feature = "debug-log")]
        {
            let message = alloc::format!($($arg)*);
            web_sys::console::debug_1(&wasm_bindgen::JsValue::from_str(&message));
        }
        #[cfg(not(feature = "debug-log"))]
        {
            let _ = || alloc::format!($($arg)*);
        }
    }};
}

pub(crate) use debug_log;
