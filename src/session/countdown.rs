//! Countdown State
//!
//! Client-side view of when the session ends. Times are milliseconds since the
//! epoch as reported by `Date.now()`.

/// Recheck delay while a refresh may still push the expiry back
pub const GRACE_RECHECK_MS: u32 = 1_000;
/// Tick cadence while the timer is visible
pub const VISIBLE_TICK_MS: u32 = 500;
/// Longest delay browsers honour; larger values fire immediately
pub const MAX_TIMER_DELAY_MS: u32 = i32::MAX as u32;

/// What a tick decided
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Session lapsed with no refresh in flight
    Expired,
    /// Session lapsed but a refresh is in flight; check again later
    Grace { recheck_ms: u32 },
    /// Session alive; show `text` and tick again after `next_ms`
    Display {
        text: String,
        visible: bool,
        next_ms: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    expiry_ms: f64,
    show_window_secs: f64,
    block_logout: bool,
}

impl Countdown {
    pub fn new(now_ms: f64, remaining_secs: f64, show_window_secs: f64) -> Self {
        Self {
            expiry_ms: now_ms + remaining_secs * 1000.0,
            show_window_secs,
            block_logout: false,
        }
    }

    pub fn expiry_ms(&self) -> f64 {
        self.expiry_ms
    }

    pub fn is_refreshing(&self) -> bool {
        self.block_logout
    }

    pub fn remaining_secs(&self, now_ms: f64) -> f64 {
        (self.expiry_ms - now_ms) / 1000.0
    }

    pub fn tick(&self, now_ms: f64) -> TickOutcome {
        let remaining = self.remaining_secs(now_ms);
        if remaining < 0.0 {
            return if self.block_logout {
                TickOutcome::Grace { recheck_ms: GRACE_RECHECK_MS }
            } else {
                TickOutcome::Expired
            };
        }

        let text = format_remaining(remaining);
        if remaining < self.show_window_secs {
            TickOutcome::Display { text, visible: true, next_ms: VISIBLE_TICK_MS }
        } else {
            TickOutcome::Display { text, visible: false, next_ms: clamp_delay(remaining * 500.0) }
        }
    }

    /// Mark a refresh as in flight; expiry no longer ends the session
    pub fn begin_refresh(&mut self) {
        self.block_logout = true;
    }

    /// The server granted `extension_secs` more, counted from `now_ms`
    pub fn complete_refresh(&mut self, now_ms: f64, extension_secs: f64) {
        self.expiry_ms = now_ms + extension_secs * 1000.0;
        self.block_logout = false;
    }

    pub fn fail_refresh(&mut self) {
        self.block_logout = false;
    }
}

/// Delay before the very first tick.
///
/// Half the initial budget, taken as milliseconds, so the timer paints almost
/// immediately after page load.
pub fn first_tick_delay_ms(remaining_secs: f64) -> u32 {
    clamp_delay(remaining_secs / 2.0)
}

fn clamp_delay(ms: f64) -> u32 {
    if ms.is_nan() || ms <= 0.0 {
        0
    } else if ms >= MAX_TIMER_DELAY_MS as f64 {
        MAX_TIMER_DELAY_MS
    } else {
        ms as u32
    }
}

/// `H:MM:SS` from one hour up, `M:SS` below
pub fn format_remaining(remaining_secs: f64) -> String {
    let total = if remaining_secs.is_finite() && remaining_secs > 0.0 {
        remaining_secs.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    }
}
