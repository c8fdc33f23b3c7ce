//! Verbatim dotenv reader
//!
//! Values are returned exactly as written: no `$VAR` expansion and no escape
//! processing. Supported syntax:
//! - `KEY=VALUE`, optionally prefixed with `export `
//! - `#` comment lines and blank lines
//! - a value wrapped in matching `"` or `'` quotes has the quotes removed
//! - in an unquoted value, ` #` starts a trailing comment

use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Errors from reading a dotenv file
///
/// Parse errors carry the line number only, never the line itself, since the
/// line may hold a secret.
#[derive(Debug, thiserror::Error)]
pub enum DotenvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected KEY=VALUE")]
    MissingSeparator { line: usize },

    #[error("line {line}: invalid variable name")]
    InvalidKey { line: usize },
}

/// Read and parse a dotenv file
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>, DotenvError> {
    let content = fs::read_to_string(path)?;
    parse_dotenv(&content)
}

/// Parse dotenv text; later duplicates overwrite earlier ones
///
/// Any malformed line fails the whole parse.
///
/// # Example
///
/// ```
/// use layerconf_core::secrets::parse_dotenv;
///
/// let vars = parse_dotenv("# local\nTEST_PASSWORD=pa$$w0rd\nexport TOKEN='a b'\n").unwrap();
/// assert_eq!(vars["TEST_PASSWORD"], "pa$$w0rd");
/// assert_eq!(vars["TOKEN"], "a b");
/// ```
pub fn parse_dotenv(input: &str) -> Result<HashMap<String, String>, DotenvError> {
    let mut vars = HashMap::new();

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").map_or(line, str::trim_start);
        let (key, value) = line
            .split_once('=')
            .ok_or(DotenvError::MissingSeparator { line: line_no })?;

        let key = key.trim();
        if !is_valid_key(key) {
            return Err(DotenvError::InvalidKey { line: line_no });
        }
        vars.insert(key.to_string(), parse_value(value.trim()).to_string());
    }

    Ok(vars)
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

fn parse_value(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }

    match value.find(" #").or_else(|| value.find("\t#")) {
        Some(comment) => value[..comment].trim_end(),
        None => value,
    }
}
