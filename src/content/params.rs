//! Key-value parameter resources
//!
//! Parameter files are plain text: alternating key and value tokens separated
//! by whitespace or newlines. Lines starting with `#` are comments.
//!
//! ```text
//! # crawler
//! entity      crawler.ron
//! animation   crawler_walk.ron
//! gravity     120
//! ```
//!
//! Values are merged over a fixed schema of defaults. Keys outside the schema
//! are dropped and every value keeps the type its default declares.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ContentError;

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Float(f32),
    Text(String),
}

impl ParamValue {
    /// Parse `raw` as the same kind of value as `self`
    fn reparse(&self, raw: &str) -> Option<ParamValue> {
        match self {
            ParamValue::Float(_) => raw.parse::<f32>().ok().map(ParamValue::Float),
            ParamValue::Text(_) => Some(ParamValue::Text(raw.to_string())),
        }
    }
}

/// Parameters keyed by name, restricted to a fixed schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterMap {
    values: BTreeMap<&'static str, ParamValue>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a float parameter with its default
    pub fn with_float(mut self, key: &'static str, default: f32) -> Self {
        self.values.insert(key, ParamValue::Float(default));
        self
    }

    /// Declare a text parameter with its default
    pub fn with_text(mut self, key: &'static str, default: &str) -> Self {
        self.values.insert(key, ParamValue::Text(default.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Float value of `key` (None if undeclared or not a float)
    pub fn float(&self, key: &str) -> Option<f32> {
        match self.values.get(key) {
            Some(ParamValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Text value of `key` (None if undeclared or not text)
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(ParamValue::Text(v)) => Some(v),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }
}

/// Split a text resource into tokens
pub fn tokenize(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect()
}

/// Read a text file and split it into tokens
pub fn read_file_tokens(path: &Path) -> Result<Vec<String>, ContentError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(tokenize(&contents))
}

/// Merge alternating key/value tokens into `map`
///
/// Unknown keys are ignored. A value that does not parse as its declared
/// type leaves the default in place. Returns the number of values applied.
pub fn merge_key_value_tokens(tokens: &[String], map: &mut ParameterMap) -> usize {
    let mut applied = 0;
    for pair in tokens.chunks(2) {
        let [key, raw] = pair else {
            log::warn!("params: key '{}' has no value", pair[0]);
            continue;
        };
        let Some(current) = map.values.get_mut(key.as_str()) else {
            log::debug!("params: ignoring unknown key '{}'", key);
            continue;
        };
        match current.reparse(raw) {
            Some(value) => {
                *current = value;
                applied += 1;
            }
            None => log::warn!("params: '{}' is not a valid value for '{}'", raw, key),
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn schema() -> ParameterMap {
        ParameterMap::new()
            .with_float("speed", 2.0)
            .with_text("sprite", "none")
    }

    fn tokens(s: &str) -> Vec<String> {
        tokenize(s)
    }

    #[test]
    fn test_tokenize() {
        let toks = tokens("# header\nspeed 3.5\n  sprite\tbug.png  \n\n   # indented comment\n");
        assert_eq!(toks, vec!["speed", "3.5", "sprite", "bug.png"]);
    }

    #[test]
    fn test_read_file_tokens() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "speed 4").unwrap();
        writeln!(file, "sprite bug.png").unwrap();
        let toks = read_file_tokens(file.path()).unwrap();
        assert_eq!(toks, vec!["speed", "4", "sprite", "bug.png"]);

        assert!(read_file_tokens(Path::new("/definitely/not/here.txt")).is_err());
    }

    #[test]
    fn test_merge_overrides_known_keys() {
        let mut map = schema();
        let applied = merge_key_value_tokens(&tokens("speed 7.5 sprite bug.png"), &mut map);
        assert_eq!(applied, 2);
        assert_eq!(map.float("speed"), Some(7.5));
        assert_eq!(map.text("sprite"), Some("bug.png"));
    }

    #[test]
    fn test_merge_drops_unknown_keys() {
        let mut map = schema();
        let raw = tokens("color red speed 1");
        assert!(raw.contains(&"color".to_string()));

        merge_key_value_tokens(&raw, &mut map);
        assert!(!map.contains("color"));
        assert_eq!(map.len(), 2);
        assert_eq!(map.float("speed"), Some(1.0));
    }

    #[test]
    fn test_merge_preserves_declared_type() {
        let mut map = schema();
        // Not a float: default stays
        let applied = merge_key_value_tokens(&tokens("speed fast"), &mut map);
        assert_eq!(applied, 0);
        assert_eq!(map.float("speed"), Some(2.0));

        // Numbers are still text for text keys
        merge_key_value_tokens(&tokens("sprite 42"), &mut map);
        assert_eq!(map.text("sprite"), Some("42"));
        assert_eq!(map.float("sprite"), None);
    }

    #[test]
    fn test_merge_dangling_key() {
        let mut map = schema();
        let applied = merge_key_value_tokens(&tokens("speed 3 sprite"), &mut map);
        assert_eq!(applied, 1);
        assert_eq!(map.text("sprite"), Some("none"));
    }
}
