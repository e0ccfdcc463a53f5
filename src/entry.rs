//! Page Entry Points
//!
//! Functions exported to the page's JavaScript. Errors are thrown as strings.
//!
//! Besides the module exports, `install_globals` publishes the same functions
//! on `window` so inline page scripts can call `start_session_timeout(...)`
//! and `refresh_session()` by name. They exist once the module has started;
//! scripts running earlier must wait for the module's init promise.

use leptos_fieldlist::FieldListOptions;
use wasm_bindgen::closure::WasmClosure;
use wasm_bindgen::prelude::*;

use crate::config::{SessionTimeoutConfig, TimeoutArgs};
use crate::errors::SessionError;
use crate::session;

/// Start the session countdown; called once by the page after login
#[wasm_bindgen]
pub fn start_session_timeout(
    box_id: String,
    time_id: String,
    time_remaining_seconds: f64,
    timeout_link: String,
    refresh_link: String,
    refresh_error_text: String,
    show_time_left_seconds: f64,
) -> Result<(), JsValue> {
    let config = SessionTimeoutConfig {
        box_id,
        time_id,
        time_remaining_seconds,
        timeout_link,
        refresh_link,
        refresh_error_text,
        show_time_left_seconds,
    };
    session::start(config)?;
    Ok(())
}

/// Same as `start_session_timeout`, taking one options object
#[wasm_bindgen]
pub fn start_session_timeout_with(options: JsValue) -> Result<(), JsValue> {
    let config: SessionTimeoutConfig =
        serde_wasm_bindgen::from_value(options).map_err(|e| SessionError::InvalidConfig {
            message: e.to_string(),
        })?;
    session::start(config)?;
    Ok(())
}

/// Extend the session; the page calls this on user activity
#[wasm_bindgen]
pub fn refresh_session() -> Result<(), JsValue> {
    session::refresh_active()?;
    Ok(())
}

/// Attach field lists added to the page after load.
///
/// Already attached containers are left alone. Returns how many were attached.
#[wasm_bindgen]
pub fn attach_field_lists(options: JsValue) -> Result<usize, JsValue> {
    let options = if options.is_undefined() || options.is_null() {
        crate::config::field_list_options()
    } else {
        serde_wasm_bindgen::from_value::<FieldListOptions>(options)
            .map_err(|e| JsValue::from_str(&e.to_string()))?
    };
    Ok(leptos_fieldlist::attach_all(&options))
}

/// Recent log lines, oldest first
#[wasm_bindgen]
pub fn recent_log_lines() -> js_sys::Array {
    console_logger::recent_lines()
        .into_iter()
        .map(|line| JsValue::from_str(&line))
        .collect()
}

fn number_arg(value: &JsValue) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_string().and_then(|text| text.trim().parse().ok()))
}

type StartArgs = (JsValue, JsValue, JsValue, JsValue, JsValue, JsValue, JsValue);

fn start_from_globals(args: StartArgs) -> Result<(), JsValue> {
    let (box_id, time_id, remaining, timeout_link, refresh_link, error_text, show_left) = args;
    let config = SessionTimeoutConfig::from_args(TimeoutArgs {
        box_id: box_id.as_string(),
        time_id: time_id.as_string(),
        time_remaining_seconds: number_arg(&remaining),
        timeout_link: timeout_link.as_string(),
        refresh_link: refresh_link.as_string(),
        refresh_error_text: error_text.as_string(),
        show_time_left_seconds: number_arg(&show_left),
    })?;
    session::start(config)?;
    Ok(())
}

fn publish<T: ?Sized + WasmClosure>(window: &web_sys::Window, name: &str, closure: Closure<T>) {
    if let Err(err) = js_sys::Reflect::set(window, &JsValue::from_str(name), closure.as_ref()) {
        tracing::warn!("could not publish window.{}: {:?}", name, err);
    }
    closure.forget();
}

/// Publish the entry points as `window` globals
pub fn install_globals() {
    let Some(window) = web_sys::window() else {
        tracing::warn!("no window available, entry points not published");
        return;
    };
    let start = Closure::<dyn FnMut(JsValue, JsValue, JsValue, JsValue, JsValue, JsValue, JsValue) -> Result<(), JsValue>>::new(
        |a: JsValue, b: JsValue, c: JsValue, d: JsValue, e: JsValue, f: JsValue, g: JsValue| {
            start_from_globals((a, b, c, d, e, f, g))
        },
    );
    publish(&window, "start_session_timeout", start);
    publish(
        &window,
        "start_session_timeout_with",
        Closure::<dyn FnMut(JsValue) -> Result<(), JsValue>>::new(start_session_timeout_with),
    );
    publish(
        &window,
        "refresh_session",
        Closure::<dyn FnMut() -> Result<(), JsValue>>::new(refresh_session),
    );
    publish(
        &window,
        "attach_field_lists",
        Closure::<dyn FnMut(JsValue) -> Result<usize, JsValue>>::new(attach_field_lists),
    );
    publish(
        &window,
        "recent_log_lines",
        Closure::<dyn FnMut() -> js_sys::Array>::new(recent_log_lines),
    );
    tracing::debug!("entry points published on window");
}
