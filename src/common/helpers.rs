// Helper functions for safe logging and time handling

use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use serde::{Serialize, Serializer};

/// Wire form of an unset timestamp
pub const ZERO_TIME: &str = "0001-01-01T00:00:00Z";

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
///
/// # Example
/// ```ignore
/// let masked = safe_token_log("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9");
/// // Returns: "eyJh...CJ9"
/// ```
pub fn safe_token_log(token: &str) -> String {
    if token.len() > 8 && token.is_ascii() {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}

/// Current time truncated to millisecond precision, which is what the
/// database stores. Keeps values returned at creation equal to values read back.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Converts a stored unix-millisecond timestamp back into a `DateTime<Utc>`
pub fn from_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Serializes a missing id as an empty string
pub fn serialize_empty_if_none<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

/// Serializes a missing timestamp as [`ZERO_TIME`]
pub fn serialize_zero_time_if_none<S>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(time) => time.serialize(serializer),
        None => serializer.serialize_str(ZERO_TIME),
    }
}
