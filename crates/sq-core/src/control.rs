//! The control record: a small text file whose `default_version = '<semver>'`
//! entry names the currently published version.
//!
//! Only the quoted value of that entry is ever rewritten; every other byte of
//! the file (comments, other keys, line endings) is preserved.

use crate::error::{CoreError, CoreResult};
use crate::semver::SemVer;
use regex::Regex;
use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

fn default_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^[ \t]*default_version[ \t]*=[ \t]*(['"])([^'"\r\n]*)(['"])"#)
            .expect("default_version pattern is valid")
    })
}

/// A parsed control file.
#[derive(Debug, Clone)]
pub struct ControlRecord {
    contents: String,
    value_range: Range<usize>,
    default_version: SemVer,
}

impl ControlRecord {
    /// Read and parse the control file at `path`.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&contents, path)
    }

    /// Parse control file `contents`; `path` is only used in error messages.
    pub fn parse(contents: &str, path: &Path) -> CoreResult<Self> {
        let format_error = |reason: String| CoreError::ControlFormat {
            path: path.display().to_string(),
            reason,
        };

        let mut matches = default_version_regex().captures_iter(contents);
        let caps = matches
            .next()
            .ok_or_else(|| format_error("no `default_version = '<semver>'` line".to_string()))?;
        if matches.next().is_some() {
            return Err(format_error(
                "more than one default_version line".to_string(),
            ));
        }
        if caps[1] != caps[3] {
            return Err(format_error("mismatched quotes around version".to_string()));
        }

        let value = caps.get(2).ok_or_else(|| format_error("empty match".to_string()))?;
        let default_version = SemVer::parse(value.as_str()).map_err(|e| format_error(e.to_string()))?;

        Ok(Self {
            contents: contents.to_string(),
            value_range: value.range(),
            default_version,
        })
    }

    /// The currently published default version.
    pub fn default_version(&self) -> &SemVer {
        &self.default_version
    }

    /// File contents with the default_version value replaced by `version`.
    pub fn render_with_version(&self, version: &SemVer) -> String {
        let mut out = String::with_capacity(self.contents.len() + 8);
        out.push_str(&self.contents[..self.value_range.start]);
        out.push_str(&version.to_string());
        out.push_str(&self.contents[self.value_range.end..]);
        out
    }

    /// Minimal control file for a freshly initialized package.
    pub fn scaffold(name: &str, schema: &str) -> String {
        format!(
            "# {name} extension\ncomment = '{name} database package'\ndefault_version = '0.0.0'\nrelocatable = false\nschema = {schema}\n"
        )
    }
}

#[cfg(test)]
#[path = "control_test.rs"]
mod tests;
