//! Which keys exist by default, which env vars may override them, which secrets are required

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

/// Enumerations that drive the config merge
///
/// Adding an overridable variable or a new required secret is an edit to this
/// policy (in code or in a YAML policy file); the merge algorithm itself does
/// not change.
///
/// # Example
///
/// ```
/// use layerconf_core::config::ConfigPolicy;
///
/// let policy = ConfigPolicy::from_yaml_str("required_secrets: [API_TOKEN]\n").unwrap();
/// assert_eq!(policy.required_secrets, vec!["API_TOKEN"]);
/// // Fields not mentioned keep their defaults
/// assert_eq!(policy.defaults["browser"], "chrome");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigPolicy {
    /// Built-in values, the lowest precedence layer
    pub defaults: BTreeMap<String, String>,
    /// Environment variables allowed to override config keys
    pub env_overrides: Vec<String>,
    /// Variable that, when set, also switches `grid_flag_key` to `true`
    pub grid_url_var: Option<String>,
    /// Boolean key toggled by `grid_url_var`
    pub grid_flag_key: String,
    /// Secrets fetched as required and injected as config keys
    pub required_secrets: Vec<String>,
}

impl Default for ConfigPolicy {
    fn default() -> Self {
        let defaults = [
            ("base.url", "https://www.saucedemo.com"),
            ("browser", "chrome"),
            ("headless", "false"),
            ("implicit.wait", "10"),
            ("explicit.wait", "20"),
            ("page.load.timeout", "30"),
            ("screenshot.on.failure", "true"),
            ("selenium.grid", "false"),
            ("selenium.grid.url", "http://localhost:4444/wd/hub"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            defaults,
            env_overrides: to_strings(&[
                "BROWSER",
                "HEADLESS",
                "SELENIUM_GRID_URL",
                "TEST_ENV",
                "THREAD_COUNT",
            ]),
            grid_url_var: Some("SELENIUM_GRID_URL".to_string()),
            grid_flag_key: "selenium.grid".to_string(),
            required_secrets: to_strings(&[
                "STANDARD_USER",
                "LOCKED_USER",
                "PROBLEM_USER",
                "PERFORMANCE_USER",
                "TEST_PASSWORD",
            ]),
        }
    }
}

impl ConfigPolicy {
    /// Policy with no defaults, overrides or required secrets
    pub fn empty() -> Self {
        Self {
            defaults: BTreeMap::new(),
            env_overrides: Vec::new(),
            grid_url_var: None,
            grid_flag_key: String::new(),
            required_secrets: Vec::new(),
        }
    }

    /// Parse a YAML policy; omitted fields keep their defaults
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let policy: Self = serde_yaml::from_str(yaml)
            .map_err(|e| ConfigError::Policy(format!("Failed to parse YAML: {}", e)))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Read and parse a YAML policy file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Reject policies the merge cannot apply
    pub fn validate(&self) -> ConfigResult<()> {
        let mut names = self.env_overrides.iter().chain(&self.required_secrets);
        if let Some(var) = names.find(|v| v.trim().is_empty()) {
            return Err(ConfigError::Policy(format!("blank variable name {:?}", var)));
        }
        if self.grid_url_var.is_some() && self.grid_flag_key.trim().is_empty() {
            return Err(ConfigError::Policy(
                "grid_url_var is set but grid_flag_key is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Map an `UPPER_SNAKE_CASE` variable name to a `lower.dotted.case` key
///
/// ```
/// use layerconf_core::config::env_var_to_key;
///
/// assert_eq!(env_var_to_key("SELENIUM_GRID_URL"), "selenium.grid.url");
/// ```
pub fn env_var_to_key(var: &str) -> String {
    var.to_lowercase().replace('_', ".")
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
