use serde::Serialize;

/// Storage representation of a key, as reported by the store's TYPE command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Ordered sequence, duplicates allowed
    List,
    Set,
    /// Score-ordered sequence
    SortedSet,
    /// Anything else, including a key that no longer exists
    Unknown(String),
}

impl StorageKind {
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "list" => Self::List,
            "set" => Self::Set,
            "zset" => Self::SortedSet,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::List => "list",
            Self::Set => "set",
            Self::SortedSet => "zset",
            Self::Unknown(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_type_name() {
        assert_eq!(StorageKind::from_type_name("list"), StorageKind::List);
        assert_eq!(StorageKind::from_type_name("set"), StorageKind::Set);
        assert_eq!(StorageKind::from_type_name("zset"), StorageKind::SortedSet);
        assert_eq!(
            StorageKind::from_type_name("hash"),
            StorageKind::Unknown("hash".to_string())
        );
    }

    #[test]
    fn test_missing_key_is_unknown() {
        let kind = StorageKind::from_type_name("none");
        assert_eq!(kind, StorageKind::Unknown("none".to_string()));
        assert_eq!(kind.as_str(), "none");
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&StorageKind::SortedSet).unwrap();
        assert_eq!(json, "\"sorted_set\"");
    }
}
