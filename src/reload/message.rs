//! Hot Reload Message Protocol
//!
//! JSON messages sent over the live-reload WebSocket, tagged by `type`:
//!
//! - `connected`: handshake done
//! - `reload`: full page reload
//! - `css`: re-fetch one stylesheet in place
//! - `js`: a script changed (the client reloads, scripts cannot be swapped)
//! - `error` / `clear_error`: show or hide the error overlay

use serde::{Deserialize, Serialize};

/// Hot reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadMessage {
    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// Full page reload
    Reload {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Stylesheet updated; `path` is its URL path (e.g. `/css/style.css`)
    Css { path: String },

    /// Script updated; `path` is its URL path
    Js { path: String },

    /// Stage failure (display overlay, no reload)
    Error {
        /// Stage or source that failed
        path: String,
        error: String,
    },

    /// Clear error overlay (the failed stage succeeded again)
    #[serde(rename = "clear_error")]
    ClearError,
}

impl HotReloadMessage {
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn reload(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    pub fn css(path: impl Into<String>) -> Self {
        Self::Css { path: path.into() }
    }

    pub fn js(path: impl Into<String>) -> Self {
        Self::Js { path: path.into() }
    }

    pub fn error(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Error {
            path: path.into(),
            error: error.into(),
        }
    }

    pub fn clear_error() -> Self {
        Self::ClearError
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    /// Parse from JSON string
    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_message() {
        let json = HotReloadMessage::css("/css/style.css").to_json();
        assert_eq!(json, r#"{"type":"css","path":"/css/style.css"}"#);
    }

    #[test]
    fn test_reload_message() {
        let json = HotReloadMessage::reload("index.html changed").to_json();
        assert!(json.contains(r#""type":"reload""#));
        assert!(json.contains(r#""reason":"index.html changed""#));

        let bare = HotReloadMessage::Reload { reason: None }.to_json();
        assert_eq!(bare, r#"{"type":"reload"}"#);
    }

    #[test]
    fn test_clear_error_tag() {
        assert_eq!(
            HotReloadMessage::clear_error().to_json(),
            r#"{"type":"clear_error"}"#
        );
    }

    #[test]
    fn test_round_trip_error() {
        let msg = HotReloadMessage::error("styles", "expected '}'");
        assert_eq!(HotReloadMessage::from_json(&msg.to_json()), Some(msg));
        assert_eq!(HotReloadMessage::from_json("not json"), None);
    }
}
