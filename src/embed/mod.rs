//! Embedded static resources.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server resources (hotreload.js)
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{HOTRELOAD_JS, HotreloadVars};
//!
//! let js = HOTRELOAD_JS.render(&HotreloadVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL the live-reload client is served at. Not backed by a file.
    pub const HOTRELOAD_URL: &str = "/.assetline/hotreload.js";

    /// Variables for hotreload.js.
    pub struct HotreloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for HotreloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__ASSETLINE_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Live-reload client, minified by the build script.
    pub const HOTRELOAD_JS: Template<HotreloadVars> =
        Template::new(include_str!(concat!(env!("OUT_DIR"), "/hotreload.min.js")));

    /// Script tag loading the client.
    pub fn hotreload_tag() -> String {
        format!(r#"<script type="module" src="{HOTRELOAD_URL}"></script>"#)
    }
}
