//! INI-style configuration.
//!
//! Everything has a built-in default; a config file only overrides. Lines
//! look like `key = value`, grouped under `[section]` headers. Keys before
//! the first header are globals. `#` and `;` start comments.

use std::collections::HashMap;
use std::fs;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct Config {
    pub globals: HashMap<String, String>,
    pub sections: HashMap<String, HashMap<String, String>>,
}

impl Config {
    /// Loads and parses a config file.
    pub fn load(path: &str) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Error reading file {path}: {e}"))?;
        Ok(Self::parse(&content))
    }

    /// Parses config text. Unparseable lines are skipped, not fatal.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut cfg = Self::empty();
        let mut current_section: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = Some(line[1..line.len() - 1].trim().to_string());
                continue;
            }

            let Some(pos) = line.find('=') else {
                continue;
            };
            let key = line[..pos].trim().to_string();
            let value = line[pos + 1..].trim().trim_matches('"').to_string();

            match &current_section {
                None => {
                    cfg.globals.insert(key, value);
                }
                Some(sec) => {
                    cfg.sections.entry(sec.clone()).or_default().insert(key, value);
                }
            }
        }
        cfg
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            globals: HashMap::new(),
            sections: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|sec| sec.get(key))
            .map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_non_empty(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn get_global(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(|s| s.as_str())
    }

    /// Section value, falling back to a same-named global, then `default`.
    #[must_use]
    pub fn get_or_default<'a>(&'a self, section: &str, key: &str, default: &'a str) -> &'a str {
        self.get(section, key)
            .or_else(|| self.get_global(key))
            .unwrap_or(default)
    }

    /// Like [`Config::get_or_default`] but treats `""` as absent.
    #[must_use]
    pub fn get_non_empty_or_default<'a>(
        &'a self,
        section: &str,
        key: &str,
        default: &'a str,
    ) -> &'a str {
        self.get_non_empty(section, key)
            .or_else(|| self.get_global(key).filter(|s| !s.is_empty()))
            .unwrap_or(default)
    }

    /// A millisecond value as a `Duration`. Missing or unparseable values
    /// fall back to `default_ms`; the result is clamped to at least 1 ms
    /// (a zero socket timeout is rejected by the OS).
    #[must_use]
    pub fn get_millis(&self, section: &str, key: &str, default_ms: u64) -> Duration {
        let ms = self
            .get_non_empty(section, key)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(default_ms);
        Duration::from_millis(ms.max(1))
    }
}
