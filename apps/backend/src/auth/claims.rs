//! Claims carried inside backend-issued session tokens.

use serde::{Deserialize, Serialize};

/// Claims included in our backend-issued access tokens.
///
/// `rig` is the rights bitmask captured when the token was minted. Changing a
/// user's rights server-side does not touch tokens already in circulation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User identifier, carried on the wire as a decimal string
    #[serde(with = "subject")]
    pub sub: i64,
    /// Rights bitmask snapshot
    pub rig: i64,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Soft expiry (seconds since epoch)
    pub exp: i64,
    /// Signing authority
    pub iss: String,
}

impl Claims {
    pub fn user_id(&self) -> i64 {
        self.sub
    }

    pub fn rights(&self) -> i64 {
        self.rig
    }
}

mod subject {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(sub: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(sub)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<i64>()
            .map_err(|_| de::Error::custom(format!("subject is not a user id: {raw}")))
    }
}
