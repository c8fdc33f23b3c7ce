//! Reader for flat `key=value` properties files
//!
//! Supported syntax:
//! - `key=value`, `key: value` and `key value`
//! - `#` and `!` comment lines, blank lines
//! - a trailing backslash continues the entry on the next line
//! - escapes `\t \n \r \f \uXXXX`; any other escaped character stands for itself

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Read and parse a properties file
pub fn load_properties(path: &Path) -> std::io::Result<BTreeMap<String, String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_properties(&content))
}

/// Parse properties text; later duplicates overwrite earlier ones
///
/// # Example
///
/// ```
/// use layerconf_core::config::parse_properties;
///
/// let props = parse_properties("# comment\nbrowser = firefox\nimplicit.wait: 15\n");
/// assert_eq!(props["browser"], "firefox");
/// assert_eq!(props["implicit.wait"], "15");
/// ```
pub fn parse_properties(input: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    let mut lines = input.lines();

    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = trimmed.to_string();
        while ends_with_escape(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical);
        if key.is_empty() {
            continue;
        }
        entries.insert(unescape(key), unescape(trim_unescaped_end(value)));
    }

    entries
}

/// An odd number of trailing backslashes means the last one escapes what follows
fn ends_with_escape(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Trim trailing whitespace, keeping a whitespace character that is escaped
fn trim_unescaped_end(value: &str) -> &str {
    let trimmed = value.trim_end();
    if trimmed.len() < value.len() && ends_with_escape(trimmed) {
        let kept = value[trimmed.len()..].chars().next().map_or(0, char::len_utf8);
        &value[..trimmed.len() + kept]
    } else {
        trimmed
    }
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || c.is_whitespace() {
            key_end = i;
            break;
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start();
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start();
    }
    (key, rest)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{0C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}
