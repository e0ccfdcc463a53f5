//! Pipeman Frontend Entry Point
//!
//! Enhances server-rendered pages: repeatable field lists on every form, and
//! the session timeout countdown once the page calls `start_session_timeout`.

mod commands;
mod components;
mod config;
mod entry;
mod errors;
mod session;
mod store;

fn main() {
    console_error_panic_hook::set_once();
    console_logger::init(config::log_level());
    entry::install_globals();
    leptos_fieldlist::attach_when_ready(config::field_list_options());
}
