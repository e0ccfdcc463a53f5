//! Time Left Component
//!
//! Renders the session timer text and toggles the `hidden` class on the
//! surrounding timer box.

use leptos::prelude::*;
use web_sys::Element;

use crate::store::{TimerStore, TimerViewStoreFields};

const HIDDEN_CLASS: &str = "hidden";

#[component]
pub fn TimeLeft(timer: TimerStore, timer_box: Element) -> impl IntoView {
    Effect::new(move |_| {
        let visible = timer.visible().get();
        let classes = timer_box.class_list();
        let result = if visible {
            classes.remove_1(HIDDEN_CLASS)
        } else {
            classes.add_1(HIDDEN_CLASS)
        };
        if let Err(err) = result {
            tracing::warn!("could not toggle timer visibility: {:?}", err);
        }
    });

    view! { {move || timer.text().get()} }
}
