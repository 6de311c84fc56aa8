use serde::{Deserialize, Serialize};

/// Response of `/v2/usage`
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatus {
    /// Characters translated so far in the current billing period
    pub character_count: u64,
    /// Maximum characters for the period
    pub character_limit: u64,
}

impl AccountStatus {
    /// Characters left before the quota is hit
    pub fn remaining(&self) -> u64 {
        self.character_limit.saturating_sub(self.character_count)
    }

    /// True once the count has reached a non-zero limit
    pub fn is_exhausted(&self) -> bool {
        self.character_limit > 0 && self.character_count >= self.character_limit
    }
}

#[test]
fn test_decode_usage_response() {
    let status: AccountStatus =
        serde_json::from_str(r#"{"character_count":30315,"character_limit":1000000}"#).unwrap();

    assert_eq!(status.character_count, 30315);
    assert_eq!(status.character_limit, 1000000);
    assert_eq!(status.remaining(), 969685);
    assert!(!status.is_exhausted());
}

#[test]
fn test_over_limit() {
    let status = AccountStatus {
        character_count: 1200,
        character_limit: 1000,
    };
    assert_eq!(status.remaining(), 0);
    assert!(status.is_exhausted());
    assert!(!AccountStatus::default().is_exhausted());
}
