//! Unique entity identity.
//!
//! Every domain object carries a 128-bit random code, serialized as a
//! 32-character lowercase hexadecimal string. Identity equality uses this
//! code alone — structural fields never participate in equality or hashing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque 128-bit identity shared by every entity kind.
///
/// Wraps a [`Uuid`] but serializes as the bare 32-hex-digit "simple" form
/// (no dashes), matching the `unique_code` wire format used across the
/// settings file, cache snapshots, and bootstrap DTOs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code(Uuid);

impl Code {
    /// Generate a new random code.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Render as a 32-character lowercase hex string.
    pub fn as_hex(&self) -> String {
        self.0.simple().to_string()
    }
}

impl Default for Code {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({})", self.as_hex())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl FromStr for Code {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Serialize for Code {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Code::from_str(&s).map_err(serde::de::Error::custom)
    }
}
