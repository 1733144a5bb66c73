//! 时间戳序列化/反序列化工具
//!
//! The backend is not consistent about timestamps: some endpoints return
//! RFC3339 strings, others Unix seconds or milliseconds. Both are accepted;
//! serialization always emits RFC3339.
//!
//! The module itself handles `Option<DateTime<Utc>>`; [`required`] handles
//! mandatory fields such as a certificate's `validTo`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Unix timestamps above this are taken as milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl RawTimestamp {
    fn into_datetime<E: serde::de::Error>(self) -> Result<DateTime<Utc>, E> {
        match self {
            Self::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| E::custom(format!("invalid RFC3339 timestamp '{s}': {e}"))),
            Self::Signed(ts) => from_unix(ts).ok_or_else(|| E::custom("invalid Unix timestamp")),
            Self::Unsigned(ts) => i64::try_from(ts)
                .ok()
                .and_then(from_unix)
                .ok_or_else(|| E::custom("invalid Unix timestamp")),
        }
    }
}

/// 解析 Unix 时间戳（自动判断秒/毫秒）
fn from_unix(ts: i64) -> Option<DateTime<Utc>> {
    if ts > MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(ts)
    } else {
        DateTime::from_timestamp(ts, 0)
    }
}

/// Serialize `Option<DateTime<Utc>>` as an optional RFC3339 string.
#[allow(clippy::ref_option)]
pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

/// Deserialize an optional RFC3339 string or Unix timestamp.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawTimestamp>::deserialize(deserializer)?
        .map(RawTimestamp::into_datetime)
        .transpose()
}

/// Mandatory timestamp fields.
pub mod required {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::RawTimestamp;

    /// Serialize as an RFC3339 string.
    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.to_rfc3339())
    }

    /// Deserialize an RFC3339 string or Unix timestamp.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawTimestamp::deserialize(deserializer)?.into_datetime()
    }
}
