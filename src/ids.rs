//! Strongly-typed identifiers for users, categories and items.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ShoppingError;

/// External chat identity of a user (Telegram numeric id, stringified)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn from_telegram(id: u64) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = ShoppingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(ShoppingError::invalid_id("user", s));
        }
        Ok(Self(trimmed.to_string()))
    }
}

macro_rules! uuid_id {
    ($t:ident, $kind:literal) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            /// Generate a fresh identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $t {
            type Err = ShoppingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| ShoppingError::invalid_id($kind, s))
            }
        }
    };
}

uuid_id!(CategoryId, "category");
uuid_id!(ItemId, "item");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_id_round_trip() {
        let id = CategoryId::new();
        let parsed: CategoryId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_category_id_rejects_garbage() {
        let err = "not-an-id".parse::<CategoryId>().unwrap_err();
        assert!(matches!(
            err,
            ShoppingError::InvalidIdentifier { kind: "category", .. }
        ));
        assert!("".parse::<ItemId>().is_err());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ItemId::new(), ItemId::new());
    }

    #[test]
    fn test_user_id_validation() {
        assert_eq!("12345".parse::<UserId>().unwrap(), UserId::from_telegram(12345));
        assert!("".parse::<UserId>().is_err());
        assert!("12a".parse::<UserId>().is_err());
        assert_eq!(UserId::from_telegram(42).to_string(), "42");
    }
}
