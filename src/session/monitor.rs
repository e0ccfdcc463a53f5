//! Session Monitor
//!
//! Drives a `Countdown` through a `SessionHost`: paints the timer, reschedules
//! itself, redirects once the session lapses and applies refresh results.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::countdown::{first_tick_delay_ms, Countdown, TickOutcome};
use crate::commands::RefreshGrant;
use crate::config::SessionTimeoutConfig;
use crate::errors::CommandError;

/// Everything the monitor needs from its environment
pub trait SessionHost {
    /// Current time in milliseconds since the epoch
    fn now_ms(&self) -> f64;
    fn render(&self, text: &str, visible: bool);
    /// Run `task` once after `delay_ms`
    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>);
    fn navigate(&self, url: &str);
    /// Blocking message to the user
    fn alert(&self, message: &str);
}

struct MonitorState<H> {
    host: H,
    config: SessionTimeoutConfig,
    countdown: RefCell<Countdown>,
    stopped: Cell<bool>,
}

/// Handle to one running countdown; clones share the same state
pub struct SessionMonitor<H: SessionHost> {
    state: Rc<MonitorState<H>>,
}

impl<H: SessionHost> Clone for SessionMonitor<H> {
    fn clone(&self) -> Self {
        Self { state: Rc::clone(&self.state) }
    }
}

impl<H: SessionHost + 'static> SessionMonitor<H> {
    pub fn new(host: H, config: SessionTimeoutConfig) -> Self {
        let countdown = Countdown::new(
            host.now_ms(),
            config.time_remaining_seconds,
            config.show_time_left_seconds,
        );
        Self {
            state: Rc::new(MonitorState {
                host,
                config,
                countdown: RefCell::new(countdown),
                stopped: Cell::new(false),
            }),
        }
    }

    pub fn host(&self) -> &H {
        &self.state.host
    }

    pub fn countdown(&self) -> Countdown {
        self.state.countdown.borrow().clone()
    }

    /// True once the monitor redirected or was stopped
    pub fn is_stopped(&self) -> bool {
        self.state.stopped.get()
    }

    /// Schedule the first tick
    pub fn start(&self) {
        let delay = first_tick_delay_ms(self.state.config.time_remaining_seconds);
        tracing::debug!("session countdown starts in {}ms", delay);
        self.schedule_tick(delay);
    }

    /// End the tick chain without redirecting
    pub fn stop(&self) {
        self.state.stopped.set(true);
    }

    fn schedule_tick(&self, delay_ms: u32) {
        let monitor = self.clone();
        self.state.host.schedule(delay_ms, Box::new(move || monitor.tick()));
    }

    pub fn tick(&self) {
        if self.is_stopped() {
            return;
        }
        let now = self.state.host.now_ms();
        let outcome = self.state.countdown.borrow().tick(now);
        match outcome {
            TickOutcome::Expired => {
                tracing::info!("session expired, redirecting to {}", self.state.config.timeout_link);
                self.state.stopped.set(true);
                self.state.host.navigate(&self.state.config.timeout_link);
            }
            TickOutcome::Grace { recheck_ms } => {
                tracing::debug!("session expired while refreshing, rechecking in {}ms", recheck_ms);
                self.schedule_tick(recheck_ms);
            }
            TickOutcome::Display { text, visible, next_ms } => {
                self.state.host.render(&text, visible);
                tracing::debug!("session timer {} (visible: {}), next tick in {}ms", text, visible, next_ms);
                self.schedule_tick(next_ms);
            }
        }
    }

    /// Mark a refresh as in flight and return the URL to request.
    ///
    /// None if the monitor has stopped or a refresh is already running.
    pub fn begin_refresh(&self) -> Option<String> {
        if self.is_stopped() {
            return None;
        }
        let mut countdown = self.state.countdown.borrow_mut();
        if countdown.is_refreshing() {
            tracing::debug!("session refresh already in flight, ignoring");
            return None;
        }
        countdown.begin_refresh();
        tracing::info!("refreshing session via {}", self.state.config.refresh_link);
        Some(self.state.config.refresh_link.clone())
    }

    /// Apply the result of the request started by `begin_refresh`
    pub fn finish_refresh(&self, result: Result<RefreshGrant, CommandError>) {
        match result {
            Ok(grant) => {
                let now = self.state.host.now_ms();
                self.state.countdown.borrow_mut().complete_refresh(now, grant.extension);
                tracing::info!("session extended by {}s", grant.extension);
            }
            Err(err) => {
                self.state.countdown.borrow_mut().fail_refresh();
                tracing::warn!("session refresh failed: {}", err);
                self.state.host.alert(&self.state.config.refresh_error_text);
            }
        }
    }
}
