use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Canonical form of an account identifier: surrounding whitespace trimmed,
/// lower-cased. The `0x` prefix is kept as-is so that stored addresses read
/// the way the node reports them.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// A normalized account address.
///
/// The only way to build one is through normalization, so two addresses that
/// differ in case or surrounding whitespace are equal and hash identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(raw: &str) -> Self {
        Self(normalize_address(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Address {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&String> for Address {
    fn from(raw: &String) -> Self {
        Self::new(raw)
    }
}

impl From<&Address> for Address {
    fn from(address: &Address) -> Self {
        address.clone()
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Address::new(&raw))
    }
}
