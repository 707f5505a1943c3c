use serde::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;

/// A store key name, kept as raw bytes.
///
/// Key names are binary-safe in Redis; nothing here assumes UTF-8 so that a
/// key can always be handed back to the store exactly as it was scanned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreKey(Vec<u8>);

impl StoreKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether `token` occurs anywhere in the key name
    pub fn contains(&self, token: &str) -> bool {
        let token = token.as_bytes();
        token.is_empty() || self.0.windows(token.len()).any(|w| w == token)
    }
}

impl AsRef<[u8]> for StoreKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Borrow<[u8]> for StoreKey {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for StoreKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for StoreKey {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for StoreKey {
    fn from(name: &str) -> Self {
        Self(name.as_bytes().to_vec())
    }
}

impl From<String> for StoreKey {
    fn from(name: String) -> Self {
        Self(name.into_bytes())
    }
}

/// Lossy rendering, for logs and reports only
impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl Serialize for StoreKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(&self.0))
    }
}
