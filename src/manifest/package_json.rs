//! package.json reading and format-preserving editing
//!
//! Handles:
//! - name / version / private
//! - dependencies, devDependencies, optionalDependencies, peerDependencies
//!
//! Edits are regex-based text replacements scoped to the right JSON object,
//! so key order, indentation and trailing newlines survive a rewrite.

use crate::domain::{DependencyType, Package};
use crate::error::ManifestError;
use regex::Regex;
use serde_json::Value;
use std::path::Path;

/// Parse a package.json into a workspace package located at `location`
pub fn parse_package(content: &str, location: &Path) -> Result<Package, ManifestError> {
    let manifest_path = location.join("package.json");
    let json: Value = serde_json::from_str(content)
        .map_err(|e| ManifestError::json_parse_error(&manifest_path, e.to_string()))?;

    let name = json
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ManifestError::MissingName {
            path: manifest_path.clone(),
        })?;

    let mut package = Package::new(name, json.get("version").and_then(Value::as_str))
        .with_location(location)
        .with_private(json.get("private").and_then(Value::as_bool).unwrap_or(false));

    for dependency_type in DependencyType::ALL {
        if let Some(deps) = json
            .get(dependency_type.manifest_key())
            .and_then(Value::as_object)
        {
            for (dep_name, spec) in deps {
                if let Some(raw) = spec.as_str() {
                    package = package.with_dependency(dependency_type, dep_name.clone(), raw);
                }
            }
        }
    }

    Ok(package)
}

/// Replace the top-level `"version"` value
pub fn update_version(
    content: &str,
    new_version: &str,
    path: &Path,
) -> Result<String, ManifestError> {
    let start = find_top_level_key(content, "version")
        .ok_or_else(|| ManifestError::update_failed(path, "version", "field not found"))?;

    replace_string_value(content, start, content.len(), "version", new_version)
        .ok_or_else(|| ManifestError::update_failed(path, "version", "value is not a string"))
}

/// Replace the specifier of `name` inside one dependency section
pub fn update_dependency(
    content: &str,
    dependency_type: DependencyType,
    name: &str,
    new_specifier: &str,
    path: &Path,
) -> Result<String, ManifestError> {
    let section = dependency_type.manifest_key();
    let field = format!("{}.{}", section, name);

    let key_start = find_top_level_key(content, section)
        .ok_or_else(|| ManifestError::update_failed(path, &field, "section not found"))?;
    let (open, close) = object_span(content, key_start)
        .ok_or_else(|| ManifestError::update_failed(path, &field, "section is not an object"))?;

    replace_string_value(content, open, close, name, new_specifier)
        .ok_or_else(|| ManifestError::update_failed(path, &field, "dependency not found"))
}

/// Replaces the first `"key": "..."` value found in `content[from..to]`
fn replace_string_value(
    content: &str,
    from: usize,
    to: usize,
    key: &str,
    new_value: &str,
) -> Option<String> {
    // Pattern matches: "key": "value" with flexible whitespace
    let pattern = format!(r#"("{}"\s*:\s*)"([^"]*)""#, regex::escape(key));
    let re = Regex::new(&pattern).ok()?;

    let window = &content[from..to];
    let caps = re.captures(window)?;
    let whole = caps.get(0)?;
    let prefix = caps.get(1)?.as_str();

    let mut result = String::with_capacity(content.len() + new_value.len());
    result.push_str(&content[..from + whole.start()]);
    result.push_str(prefix);
    result.push('"');
    result.push_str(new_value);
    result.push('"');
    result.push_str(&content[from + whole.end()..]);
    Some(result)
}

/// Byte offset of the first top-level occurrence of `"key"` used as an object key
fn find_top_level_key(content: &str, key: &str) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'[' => depth += 1,
            b'}' | b']' => depth = depth.saturating_sub(1),
            b'"' => {
                let end = string_end(bytes, i)?;
                if depth == 1 && &content[i + 1..end] == key {
                    let rest = content[end + 1..].trim_start();
                    if rest.starts_with(':') {
                        return Some(i);
                    }
                }
                i = end;
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// The `{ ... }` span of the object value following the key at `key_start`
fn object_span(content: &str, key_start: usize) -> Option<(usize, usize)> {
    let bytes = content.as_bytes();
    let key_end = string_end(bytes, key_start)?;
    let open = key_end + 1 + content[key_end + 1..].find('{')?;

    // Only whitespace and the colon may sit between the key and the brace
    if !content[key_end + 1..open]
        .chars()
        .all(|c| c == ':' || c.is_whitespace())
    {
        return None;
    }

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((open, i + 1));
                }
            }
            b'"' => i = string_end(bytes, i)?,
            _ => {}
        }
        i += 1;
    }

    None
}

/// Index of the closing quote of the string starting at `start`
fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}
