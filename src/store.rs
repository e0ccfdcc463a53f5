//! Timer View Store
//!
//! Uses Leptos reactive_stores for the text and visibility of the session timer.

use reactive_stores::Store;

/// What the session timer currently shows
#[derive(Clone, Debug, Default, Store)]
pub struct TimerView {
    /// Formatted time left, `H:MM:SS` or `M:SS`
    pub text: String,
    /// Whether the timer box is shown
    pub visible: bool,
}

/// Type alias for the store
pub type TimerStore = Store<TimerView>;
