//! Page Configuration
//!
//! Settings handed over by the surrounding page: session timeout options from
//! the `start_session_timeout*` entry points, and optional window globals for
//! the field list widget and the log level.

use leptos_fieldlist::FieldListOptions;
use tracing::level_filters::LevelFilter;
use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::errors::SessionError;

pub const DEFAULT_SHOW_TIME_LEFT_SECONDS: f64 = 600.0;
pub const DEFAULT_REFRESH_ERROR_TEXT: &str =
    "An unknown error occurred while refreshing your session timeout";

/// Global holding a `FieldListOptions`-shaped object
const FIELD_LIST_OPTIONS_GLOBAL: &str = "field_list_options";
/// Legacy global holding only the add control label
const ADD_ITEM_TEXT_GLOBAL: &str = "add_item_text";
const LOG_LEVEL_GLOBAL: &str = "pipeman_log_level";

fn default_show_time_left_seconds() -> f64 {
    DEFAULT_SHOW_TIME_LEFT_SECONDS
}

fn default_refresh_error_text() -> String {
    DEFAULT_REFRESH_ERROR_TEXT.to_string()
}

/// Options of one session countdown
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionTimeoutConfig {
    /// Element shown while the timer is visible
    pub box_id: String,
    /// Element receiving the formatted time
    pub time_id: String,
    pub time_remaining_seconds: f64,
    /// Where to go once the session has lapsed
    pub timeout_link: String,
    /// Endpoint extending the session
    pub refresh_link: String,
    #[serde(default = "default_refresh_error_text")]
    pub refresh_error_text: String,
    /// Seconds before expiry at which the timer appears
    #[serde(default = "default_show_time_left_seconds")]
    pub show_time_left_seconds: f64,
}

/// Arguments of the positional `start_session_timeout` call.
///
/// Page scripts may leave out trailing arguments, which arrive as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeoutArgs {
    pub box_id: Option<String>,
    pub time_id: Option<String>,
    pub time_remaining_seconds: Option<f64>,
    pub timeout_link: Option<String>,
    pub refresh_link: Option<String>,
    pub refresh_error_text: Option<String>,
    pub show_time_left_seconds: Option<f64>,
}

fn required<T>(name: &str, value: Option<T>) -> Result<T, SessionError> {
    value.ok_or_else(|| SessionError::InvalidConfig {
        message: format!("{} is required", name),
    })
}

impl SessionTimeoutConfig {
    /// Build from positional arguments, applying the same defaults as deserialization
    pub fn from_args(args: TimeoutArgs) -> Result<Self, SessionError> {
        Ok(Self {
            box_id: required("box_id", args.box_id)?,
            time_id: required("time_id", args.time_id)?,
            time_remaining_seconds: required("time_remaining_seconds", args.time_remaining_seconds)?,
            timeout_link: required("timeout_link", args.timeout_link)?,
            refresh_link: required("refresh_link", args.refresh_link)?,
            refresh_error_text: args.refresh_error_text.unwrap_or_else(default_refresh_error_text),
            show_time_left_seconds: args
                .show_time_left_seconds
                .unwrap_or(DEFAULT_SHOW_TIME_LEFT_SECONDS),
        })
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        let required = [
            ("box_id", &self.box_id),
            ("time_id", &self.time_id),
            ("timeout_link", &self.timeout_link),
            ("refresh_link", &self.refresh_link),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SessionError::InvalidConfig {
                    message: format!("{} must not be empty", name),
                });
            }
        }
        let seconds = [
            ("time_remaining_seconds", self.time_remaining_seconds),
            ("show_time_left_seconds", self.show_time_left_seconds),
        ];
        for (name, value) in seconds {
            if !value.is_finite() || value < 0.0 {
                return Err(SessionError::InvalidConfig {
                    message: format!("{} must be a non-negative number, got {}", name, value),
                });
            }
        }
        Ok(())
    }
}

/// Explicit options win; the legacy label only applies when none were given
pub fn resolve_field_list_options(
    explicit: Option<FieldListOptions>,
    legacy_add_text: Option<String>,
) -> FieldListOptions {
    match (explicit, legacy_add_text) {
        (Some(options), _) => options,
        (None, Some(add_text)) => FieldListOptions {
            add_text,
            ..FieldListOptions::default()
        },
        (None, None) => FieldListOptions::default(),
    }
}

fn window_global(name: &str) -> Option<JsValue> {
    let window = web_sys::window()?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str(name)).ok()?;
    if value.is_undefined() || value.is_null() {
        None
    } else {
        Some(value)
    }
}

/// Field list options from `window.field_list_options` / `window.add_item_text`
pub fn field_list_options() -> FieldListOptions {
    let explicit = window_global(FIELD_LIST_OPTIONS_GLOBAL).and_then(|value| {
        serde_wasm_bindgen::from_value::<FieldListOptions>(value)
            .map_err(|e| tracing::warn!("ignoring malformed {}: {}", FIELD_LIST_OPTIONS_GLOBAL, e))
            .ok()
    });
    let legacy = window_global(ADD_ITEM_TEXT_GLOBAL).and_then(|value| value.as_string());
    resolve_field_list_options(explicit, legacy)
}

/// Log level from `window.pipeman_log_level`, `info` when unset or unknown
pub fn log_level() -> LevelFilter {
    window_global(LOG_LEVEL_GLOBAL)
        .and_then(|value| value.as_string())
        .and_then(|name| console_logger::parse_level(&name))
        .unwrap_or(LevelFilter::INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SessionTimeoutConfig {
        SessionTimeoutConfig {
            box_id: "#session_timeout".to_string(),
            time_id: "#session_time_left".to_string(),
            time_remaining_seconds: 1800.0,
            timeout_link: "/logout".to_string(),
            refresh_link: "/api/refresh".to_string(),
            refresh_error_text: DEFAULT_REFRESH_ERROR_TEXT.to_string(),
            show_time_left_seconds: 600.0,
        }
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = sample();
        config.refresh_link = "  ".to_string();
        assert!(matches!(config.validate(), Err(SessionError::InvalidConfig { .. })));

        let mut config = sample();
        config.time_remaining_seconds = f64::NAN;
        assert!(matches!(config.validate(), Err(SessionError::InvalidConfig { .. })));

        let mut config = sample();
        config.show_time_left_seconds = -1.0;
        assert!(matches!(config.validate(), Err(SessionError::InvalidConfig { .. })));
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: SessionTimeoutConfig = serde_json::from_str(
            r##"{
                "box_id": "#box",
                "time_id": "#time",
                "time_remaining_seconds": 900,
                "timeout_link": "/timeout",
                "refresh_link": "/api/refresh"
            }"##,
        )
        .unwrap();
        assert_eq!(config.time_remaining_seconds, 900.0);
        assert_eq!(config.show_time_left_seconds, DEFAULT_SHOW_TIME_LEFT_SECONDS);
        assert_eq!(config.refresh_error_text, DEFAULT_REFRESH_ERROR_TEXT);
    }

    #[test]
    fn test_from_args_defaults_trailing_arguments() {
        let args = TimeoutArgs {
            box_id: Some("session_timeout".to_string()),
            time_id: Some("session_time_left".to_string()),
            time_remaining_seconds: Some(1800.0),
            timeout_link: Some("/logout".to_string()),
            refresh_link: Some("/api/refresh".to_string()),
            ..TimeoutArgs::default()
        };
        let config = SessionTimeoutConfig::from_args(args).unwrap();
        assert_eq!(config.refresh_error_text, DEFAULT_REFRESH_ERROR_TEXT);
        assert_eq!(config.show_time_left_seconds, DEFAULT_SHOW_TIME_LEFT_SECONDS);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_from_args_requires_links_and_time() {
        let args = TimeoutArgs {
            box_id: Some("box".to_string()),
            time_id: Some("time".to_string()),
            timeout_link: Some("/logout".to_string()),
            refresh_link: Some("/api/refresh".to_string()),
            ..TimeoutArgs::default()
        };
        assert_eq!(
            SessionTimeoutConfig::from_args(args),
            Err(SessionError::InvalidConfig {
                message: "time_remaining_seconds is required".to_string()
            })
        );
    }

    #[test]
    fn test_resolve_field_list_options() {
        assert_eq!(resolve_field_list_options(None, None), FieldListOptions::default());

        let legacy = resolve_field_list_options(None, Some("Add keyword".to_string()));
        assert_eq!(legacy.add_text, "Add keyword");
        assert_eq!(legacy.remove_text, "-");

        let explicit = FieldListOptions {
            add_text: "Add".to_string(),
            ..FieldListOptions::default()
        };
        let resolved = resolve_field_list_options(Some(explicit.clone()), Some("ignored".to_string()));
        assert_eq!(resolved, explicit);
    }

    #[test]
    fn test_field_list_options_accept_partial_objects() {
        let options: FieldListOptions = serde_json::from_str(r#"{"remove_text": "x"}"#).unwrap();
        assert_eq!(options.remove_text, "x");
        assert_eq!(options.container_selector, "div.form-field-field-list");
    }
}
