//! Browser Host
//!
//! `SessionHost` backed by the real page: `Date.now()`, gloo timers, the
//! timer elements named in the config, and `window.location`.

use gloo_timers::callback::Timeout;
use leptos::mount::mount_to;
use leptos::prelude::*;
use reactive_stores::Store;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

use super::monitor::SessionHost;
use crate::components::TimeLeft;
use crate::config::SessionTimeoutConfig;
use crate::errors::SessionError;
use crate::store::{TimerStore, TimerView, TimerViewStoreFields};

pub struct BrowserHost {
    window: Window,
    timer: TimerStore,
}

/// Accepts a bare element id or any CSS selector (`#id`, `.class`, ...)
fn find_element(document: &Document, target: &str) -> Result<Element, SessionError> {
    let missing = || SessionError::MissingElement { id: target.to_string() };
    let is_bare_id = target.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_');
    if is_bare_id {
        return document.get_element_by_id(target).ok_or_else(missing);
    }
    document.query_selector(target).ok().flatten().ok_or_else(missing)
}

impl BrowserHost {
    /// Resolve the timer elements and mount the timer text into `time_id`
    pub fn mount(config: &SessionTimeoutConfig) -> Result<Self, SessionError> {
        let window = web_sys::window().ok_or(SessionError::NoWindow)?;
        let document = window.document().ok_or(SessionError::NoWindow)?;
        let timer_box = find_element(&document, &config.box_id)?;
        let time_el = find_element(&document, &config.time_id)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| SessionError::MissingElement { id: config.time_id.clone() })?;

        let timer = Store::new(TimerView::default());
        time_el.set_text_content(None);
        mount_to(time_el, move || view! { <TimeLeft timer=timer timer_box=timer_box /> }).forget();

        Ok(Self { window, timer })
    }
}

impl SessionHost for BrowserHost {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    fn render(&self, text: &str, visible: bool) {
        self.timer.text().set(text.to_string());
        self.timer.visible().set(visible);
    }

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) {
        Timeout::new(delay_ms, task).forget();
    }

    fn navigate(&self, url: &str) {
        if let Err(err) = self.window.location().set_href(url) {
            tracing::error!("could not navigate to {}: {:?}", url, err);
        }
    }

    fn alert(&self, message: &str) {
        if let Err(err) = self.window.alert_with_message(message) {
            tracing::warn!("could not show alert: {:?}", err);
        }
    }
}
