use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Variables read from a `.env` file, in file order.
#[derive(Debug, Clone, Default)]
pub struct DotenvFile {
    path: PathBuf,
    vars: Vec<(String, String)>,
}

impl DotenvFile {
    /// Read and parse `path`; a missing file reads as empty.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self {
                path: path.to_path_buf(),
                vars: Vec::new(),
            });
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let mut seen_keys = HashSet::new();
        let mut vars = Vec::new();

        for (index, line) in contents.lines().enumerate() {
            let error = |message: String| ConfigError::Dotenv {
                path: path.to_path_buf(),
                line: index + 1,
                message,
            };

            let Some((key, value)) = parse_line(line).map_err(error)? else {
                continue;
            };
            if !seen_keys.insert(key.clone()) {
                return Err(error(format!("Duplicate variable '{key}'")));
            }
            vars.push((key, value));
        }

        Ok(Self {
            path: path.to_path_buf(),
            vars,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// `Ok(None)` for blank lines and comments.
fn parse_line(line: &str) -> Result<Option<(String, String)>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let (export_stripped, has_export) = if let Some(stripped) = trimmed.strip_prefix("export ") {
        (stripped.trim_start(), true)
    } else {
        (trimmed, false)
    };

    let Some((key, raw_value)) = export_stripped.split_once('=') else {
        return Err(if has_export {
            "Invalid dotenv line after export prefix".to_string()
        } else {
            "Invalid dotenv line, missing '='".to_string()
        });
    };

    if key.is_empty() {
        return Err("Invalid dotenv line, missing key".to_string());
    }
    if key.ends_with(char::is_whitespace) || raw_value.starts_with(char::is_whitespace) {
        return Err("Whitespace around '=' is not allowed".to_string());
    }
    if !is_valid_key(key) {
        return Err(format!("Invalid dotenv variable name '{key}'"));
    }

    let value = match raw_value.chars().next() {
        Some(quote @ ('"' | '\'')) => raw_value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
            .ok_or_else(|| "Invalid quoted value".to_string())?,
        _ => raw_value,
    };

    Ok(Some((key.to_string(), value.to_string())))
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}
