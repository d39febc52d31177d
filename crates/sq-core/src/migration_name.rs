//! Strongly-typed migration module name.

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Name of a migration module: the source file name without its extension
/// (`001_schema`), or `<folder>/<stem>` when the bare stem was already
/// taken by a module in an earlier version folder.
///
/// Never empty. Serializes as a plain string, which is how artifact
/// manifests list their migrations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MigrationName(String);

impl MigrationName {
    /// Panics on an empty name; use [`try_new`](Self::try_new) for input
    /// read from disk.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "MigrationName must not be empty");
        Self(name)
    }

    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (!name.is_empty()).then_some(Self(name))
    }

    /// Build the folder-qualified form `<folder>/<stem>`.
    pub fn qualified(folder: &str, stem: &str) -> Self {
        Self::new(format!("{folder}/{stem}"))
    }

    /// Whether this name carries a folder qualifier.
    pub fn is_qualified(&self) -> bool {
        self.0.contains('/')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for MigrationName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::try_new(name)
            .ok_or_else(|| serde::de::Error::custom("migration name must not be empty"))
    }
}

impl fmt::Display for MigrationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for MigrationName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MigrationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MigrationName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for MigrationName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MigrationName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for MigrationName {
    fn eq(&self, other: &String) -> bool {
        &self.0 == other
    }
}
