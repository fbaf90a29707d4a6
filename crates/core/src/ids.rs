//! Stable identifiers for reserves and user accounts
//!
//! Reserves are keyed by `AssetId`, user positions by `(UserId, AssetId)`.
//! Both are plain uppercase codes; there is no ordering dependency between
//! records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a listed asset (one reserve per asset).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AssetId {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Identifier of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_id_uppercased() {
        let asset = AssetId::new("dai");
        assert_eq!(asset.as_str(), "DAI");
        assert_eq!(asset.to_string(), "DAI");
    }

    #[test]
    fn test_ids_compare_by_code() {
        assert_eq!(UserId::new("alice"), UserId::from("ALICE"));
        assert_ne!(AssetId::new("DAI"), AssetId::new("USDC"));
    }
}
