//! Session Countdown
//!
//! Client-side session expiry: a countdown polled on a timer, extended by
//! refresh requests, ending in a redirect to the timeout page.

mod countdown;
mod host;
mod monitor;

use std::cell::RefCell;

use leptos::task::spawn_local;

use host::BrowserHost;
use monitor::SessionMonitor;

use crate::commands;
use crate::config::SessionTimeoutConfig;
use crate::errors::SessionError;

thread_local! {
    /// Monitor targeted by `refresh_session()` calls from the page
    static ACTIVE: RefCell<Option<SessionMonitor<BrowserHost>>> = const { RefCell::new(None) };
}

/// Validate `config`, bind to the page and start counting down.
///
/// Replaces (and stops) any monitor started earlier on this page.
pub fn start(config: SessionTimeoutConfig) -> Result<SessionMonitor<BrowserHost>, SessionError> {
    config.validate()?;
    let host = BrowserHost::mount(&config)?;
    let monitor = SessionMonitor::new(host, config);
    monitor.start();

    let previous = ACTIVE.with(|active| active.borrow_mut().replace(monitor.clone()));
    if let Some(previous) = previous {
        tracing::warn!("session timeout started twice, stopping the earlier countdown");
        previous.stop();
    }
    Ok(monitor)
}

/// Refresh the monitor started by `start`
pub fn refresh_active() -> Result<(), SessionError> {
    let monitor = ACTIVE
        .with(|active| active.borrow().clone())
        .ok_or(SessionError::NotStarted)?;
    refresh(monitor);
    Ok(())
}

/// Send one refresh request for `monitor` unless one is already in flight
pub fn refresh(monitor: SessionMonitor<BrowserHost>) {
    let Some(url) = monitor.begin_refresh() else {
        return;
    };
    spawn_local(async move {
        let result = commands::refresh_session(&url).await;
        monitor.finish_refresh(result);
    });
}
