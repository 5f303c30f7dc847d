//! Conversions between JavaScript values and mediaq types.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use js_sys::{Array, Object, Reflect};
use mediaq_core::{Error, QueryNames, DEFAULT_QUERIES};
use mediaq_reactive::MediaChangeEvent;
use serde::ser::{Serialize, SerializeMap, Serializer};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Converts a registry error into a JavaScript exception.
///
/// Argument errors become `TypeError`s, everything else a plain `Error`.
pub fn error_to_js(err: Error) -> JsValue {
    let message = err.to_string();
    if err.is_type_error() {
        js_sys::TypeError::new(&message).into()
    } else {
        js_sys::Error::new(&message).into()
    }
}

/// Reads the `queryNames` argument of `onMediaChange`.
///
/// - `undefined`: the default conditions
/// - a string: that single name
/// - an array of strings: those names, in order
pub fn js_to_query_names(value: &JsValue) -> Result<QueryNames, Error> {
    if value.is_undefined() {
        return Ok(QueryNames::Defaults);
    }
    if let Some(name) = value.as_string() {
        return Ok(QueryNames::One(name));
    }
    if Array::is_array(value) {
        let array: &Array = value.unchecked_ref();
        let mut names = Vec::with_capacity(array.length() as usize);
        for item in array.iter() {
            match item.as_string() {
                Some(name) => names.push(name),
                None => {
                    return Err(Error::invalid_argument(
                        "\"queryNames\" must only contain strings.",
                    ))
                }
            }
        }
        return Ok(QueryNames::Many(names));
    }
    Err(Error::invalid_argument(
        "\"queryNames\" must be a string or an array.",
    ))
}

/// Builds the JavaScript event object handed to a listener.
///
/// The object has `queryName`, `matches`, `media`, `changes` (keyed by the
/// condition name) and an `isMedia(name)` function bound to the registry.
/// Once the registry is gone, `isMedia` throws.
pub fn event_to_js(event: &MediaChangeEvent) -> JsValue {
    let obj = Object::new();
    Reflect::set(&obj, &"queryName".into(), &event.query_name().into()).ok();
    Reflect::set(&obj, &"matches".into(), &JsValue::from_bool(event.matches())).ok();
    Reflect::set(&obj, &"media".into(), &event.media().into()).ok();

    let changes = Object::new();
    for (name, matches) in event.changes() {
        Reflect::set(&changes, &name.as_str().into(), &JsValue::from_bool(*matches)).ok();
    }
    Reflect::set(&obj, &"changes".into(), &changes).ok();

    // The event only holds the registry weakly, so JS keeping `isMedia`
    // does not keep the registry alive
    let source = event.clone();
    let is_media = Closure::wrap(Box::new(move |name: String| {
        source.is_media(&name).map_err(error_to_js)
    }) as Box<dyn FnMut(String) -> Result<bool, JsValue>>);
    Reflect::set(&obj, &"isMedia".into(), &is_media.into_js_value()).ok();

    obj.into()
}

/// The built-in default table, serialized in table order.
pub struct DefaultQueries;

impl Serialize for DefaultQueries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(DEFAULT_QUERIES.len()))?;
        for (name, media) in DEFAULT_QUERIES {
            map.serialize_entry(name, media)?;
        }
        map.end()
    }
}

/// Serializes `value` as plain JavaScript objects rather than `Map`s.
pub fn to_js_object<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(Into::into)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use alloc::vec;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_query_names_from_undefined() {
        assert_eq!(js_to_query_names(&JsValue::UNDEFINED), Ok(QueryNames::Defaults));
    }

    #[wasm_bindgen_test]
    fn test_query_names_from_string() {
        assert_eq!(
            js_to_query_names(&JsValue::from_str("phone")),
            Ok(QueryNames::One("phone".into()))
        );
    }

    #[wasm_bindgen_test]
    fn test_query_names_from_array() {
        let array = Array::new();
        array.push(&"phone".into());
        array.push(&"tablet".into());
        assert_eq!(
            js_to_query_names(&array.into()),
            Ok(QueryNames::Many(vec!["phone".into(), "tablet".into()]))
        );
    }

    #[wasm_bindgen_test]
    fn test_query_names_rejects_other_shapes() {
        assert!(js_to_query_names(&JsValue::from_f64(3.0)).is_err());
        assert!(js_to_query_names(&JsValue::NULL).is_err());

        let array = Array::new();
        array.push(&JsValue::from_f64(1.0));
        assert!(js_to_query_names(&array.into()).is_err());
    }

    #[wasm_bindgen_test]
    fn test_error_to_js_type_error() {
        let err = error_to_js(Error::invalid_argument("bad"));
        assert!(err.is_instance_of::<js_sys::TypeError>());

        let err = error_to_js(Error::not_registered("tv"));
        assert!(err.is_instance_of::<js_sys::Error>());
        assert!(!err.is_instance_of::<js_sys::TypeError>());
    }

    #[wasm_bindgen_test]
    fn test_default_queries_object() {
        let obj = to_js_object(&DefaultQueries).unwrap();
        let phone = Reflect::get(&obj, &"phone".into()).unwrap();
        assert_eq!(phone.as_string().as_deref(), Some("(max-width: 767px)"));
        let keys = Object::keys(obj.unchecked_ref());
        assert_eq!(keys.length(), 6);
    }
}
