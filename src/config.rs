//! # Configuration Module
//!
//! Environment-driven settings for URL registration.
//!
//! ## Environment Variables
//!
//! ### `SPECROUTER_OPTIONAL_TRAILING_SLASH`
//!
//! Accept every path with or without one trailing `/`. Accepts
//! `1`/`true`/`yes`/`on` and `0`/`false`/`no`/`off`.
//!
//! Default: `false`
//!
//! ### `SPECROUTER_ROUTE_NAME_TEMPLATE`
//!
//! Template for generated route names; `{name}` is replaced by the path's
//! name, so `api:{name}` turns `pets-petid` into `api:pets-petid`.
//!
//! Default: `{name}`
//!
//! ### `SPECROUTER_ROOT_VIEW_NAME`
//!
//! When set, an extra route answering `API root` is registered under this
//! name.
//!
//! ## Usage
//!
//! ```rust
//! use specrouter::config::RouterConfig;
//!
//! let config = RouterConfig::from_env();
//! let options = config.url_options();
//! assert!(!options.name_template.is_empty());
//! ```
//!
//! Invalid values are logged and replaced by their defaults.

use crate::dispatcher::UrlOptions;
use std::env;
use tracing::warn;

pub const ENV_OPTIONAL_TRAILING_SLASH: &str = "SPECROUTER_OPTIONAL_TRAILING_SLASH";
pub const ENV_ROUTE_NAME_TEMPLATE: &str = "SPECROUTER_ROUTE_NAME_TEMPLATE";
pub const ENV_ROOT_VIEW_NAME: &str = "SPECROUTER_ROOT_VIEW_NAME";

/// URL registration settings loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    pub optional_trailing_slash: bool,
    pub route_name_template: String,
    pub root_view_name: Option<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            optional_trailing_slash: false,
            route_name_template: "{name}".to_string(),
            root_view_name: None,
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let optional_trailing_slash = match lookup(ENV_OPTIONAL_TRAILING_SLASH) {
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                warn!(
                    variable = ENV_OPTIONAL_TRAILING_SLASH,
                    value = %raw,
                    "Invalid boolean, using default"
                );
                defaults.optional_trailing_slash
            }),
            None => defaults.optional_trailing_slash,
        };

        let route_name_template = match lookup(ENV_ROUTE_NAME_TEMPLATE) {
            Some(raw) if raw.contains("{name}") => raw,
            Some(raw) => {
                warn!(
                    variable = ENV_ROUTE_NAME_TEMPLATE,
                    value = %raw,
                    "Template lacks {{name}}, using default"
                );
                defaults.route_name_template
            }
            None => defaults.route_name_template,
        };

        let root_view_name = lookup(ENV_ROOT_VIEW_NAME)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Self {
            optional_trailing_slash,
            route_name_template,
            root_view_name,
        }
    }

    /// URL registration options reflecting this configuration
    #[must_use]
    pub fn url_options(&self) -> UrlOptions {
        UrlOptions {
            root_view_name: self.root_view_name.clone(),
            optional_trailing_slash: self.optional_trailing_slash,
            decorators: Vec::new(),
            name_template: self.route_name_template.clone(),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> RouterConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        RouterConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config(&[]), RouterConfig::default());
    }

    #[test]
    fn test_values_are_read() {
        let cfg = config(&[
            (ENV_OPTIONAL_TRAILING_SLASH, "Yes"),
            (ENV_ROUTE_NAME_TEMPLATE, "api:{name}"),
            (ENV_ROOT_VIEW_NAME, " root "),
        ]);
        assert!(cfg.optional_trailing_slash);
        assert_eq!(cfg.route_name_template, "api:{name}");
        assert_eq!(cfg.root_view_name.as_deref(), Some("root"));

        let options = cfg.url_options();
        assert_eq!(options.route_name("pets"), "api:pets");
        assert_eq!(options.adjust_pattern("pets$"), "pets/?$");
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let cfg = config(&[
            (ENV_OPTIONAL_TRAILING_SLASH, "maybe"),
            (ENV_ROUTE_NAME_TEMPLATE, "static"),
            (ENV_ROOT_VIEW_NAME, ""),
        ]);
        assert_eq!(cfg, RouterConfig::default());
    }
}
