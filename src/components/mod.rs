//! UI Components
//!
//! Leptos components mounted into server-rendered markup.

mod time_left;

pub use time_left::TimeLeft;
