//! Semantic versions for release numbers and version-folder labels.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Which component a release bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    /// `X.0.0`
    Major,
    /// `x.Y.0`
    #[default]
    Minor,
    /// `x.y.Z`
    Patch,
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseType::Major => write!(f, "major"),
            ReleaseType::Minor => write!(f, "minor"),
            ReleaseType::Patch => write!(f, "patch"),
        }
    }
}

/// A `MAJOR.MINOR.PATCH[-PRERELEASE]` version.
///
/// Build metadata (`+...`) is accepted on input and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
}

impl SemVer {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
        }
    }

    /// Parse a version string, tolerating a leading `v` (folder labels).
    pub fn parse(value: &str) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidVersion {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = value.trim();
        let body = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let body = body.split_once('+').map_or(body, |(core, _build)| core);
        let (core, pre) = match body.split_once('-') {
            Some((core, pre)) if !pre.is_empty() => (core, Some(pre.to_string())),
            Some(_) => return Err(invalid("empty pre-release")),
            None => (body, None),
        };

        let mut parts = core.split('.');
        let mut next = |label: &str| -> CoreResult<u64> {
            let part = parts
                .next()
                .ok_or_else(|| invalid(&format!("missing {label} component")))?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid(&format!("{label} component '{part}' is not a number")));
            }
            if part.len() > 1 && part.starts_with('0') {
                return Err(invalid(&format!("{label} component '{part}' has a leading zero")));
            }
            part.parse::<u64>()
                .map_err(|_| invalid(&format!("{label} component '{part}' is too large")))
        };

        let major = next("major")?;
        let minor = next("minor")?;
        let patch = next("patch")?;
        if parts.next().is_some() {
            return Err(invalid("expected exactly three components"));
        }

        Ok(Self {
            major,
            minor,
            patch,
            pre,
        })
    }

    /// Increment one component, resetting the lower ones.
    ///
    /// A pre-release version bumps to its own release for the matching
    /// component, e.g. `1.1.0-rc.1` minor-bumps to `1.1.0`.
    pub fn bump(&self, release: ReleaseType) -> Self {
        let is_pre = self.pre.is_some();
        match release {
            ReleaseType::Major if is_pre && self.minor == 0 && self.patch == 0 => {
                Self::new(self.major, 0, 0)
            }
            ReleaseType::Major => Self::new(self.major + 1, 0, 0),
            ReleaseType::Minor if is_pre && self.patch == 0 => {
                Self::new(self.major, self.minor, 0)
            }
            ReleaseType::Minor => Self::new(self.major, self.minor + 1, 0),
            ReleaseType::Patch if is_pre => Self::new(self.major, self.minor, self.patch),
            ReleaseType::Patch => Self::new(self.major, self.minor, self.patch + 1),
        }
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl FromStr for SemVer {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Ord for SemVer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                // A pre-release sorts before its release
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => compare_pre_release(a, b),
            })
    }
}

impl PartialOrd for SemVer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare dot-separated pre-release identifiers: numeric ones numerically and
/// below alphanumeric ones, alphanumeric ones lexically.
fn compare_pre_release(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(nx), Ok(ny)) => nx.cmp(&ny),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

impl Serialize for SemVer {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SemVer {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SemVer::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "semver_test.rs"]
mod tests;
