//! Process-level property overrides (`-Dkey=value`)

use std::collections::BTreeMap;

/// Process-level properties, the fourth precedence layer
///
/// Only keys already present in the merged store are overridden; these never
/// introduce new keys.
///
/// # Example
///
/// ```
/// use layerconf_core::config::SystemProperties;
///
/// let props = SystemProperties::from_args(["run", "-Dbrowser=firefox", "-Dheadless"]);
/// assert_eq!(props.get("browser"), Some("firefox"));
/// assert_eq!(props.get("headless"), Some(""));
/// assert_eq!(props.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemProperties {
    props: BTreeMap<String, String>,
}

impl SystemProperties {
    /// Create an empty set of properties
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every `-Dkey=value` argument; other arguments are ignored
    ///
    /// `-Dkey` without `=` yields an empty value, which does not override anything.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let props = args
            .into_iter()
            .filter_map(|arg| {
                let definition = arg.as_ref().strip_prefix("-D")?;
                let (key, value) = definition.split_once('=').unwrap_or((definition, ""));
                (!key.is_empty()).then(|| (key.to_string(), value.to_string()))
            })
            .collect();
        Self { props }
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a property
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.props.insert(key.into(), value.into());
    }

    /// Value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Check if there are no properties
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SystemProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            props: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
