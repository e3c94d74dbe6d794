//! Timeouts written as `"30s"` or `"1m30s"` in the config file and environment.
//!
//! Bare integers are taken as seconds.

use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimeout {
    Seconds(u64),
    Text(String),
}

pub fn serialize<S>(timeout: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&humantime::format_duration(*timeout))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimeout::deserialize(deserializer)? {
        RawTimeout::Seconds(seconds) => Ok(Duration::from_secs(seconds)),
        RawTimeout::Text(text) => humantime::parse_duration(text.trim())
            .map_err(|e| D::Error::custom(format!("invalid timeout '{text}': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Serialize, Deserialize)]
    struct Timeouts {
        #[serde(with = "super")]
        request: Duration,
    }

    #[test]
    fn test_reads_seconds_and_text() {
        let seconds: Timeouts = serde_json::from_str(r#"{"request": 12}"#).unwrap();
        assert_eq!(seconds.request, Duration::from_secs(12));

        let text: Timeouts = serde_json::from_str(r#"{"request": "1m 30s"}"#).unwrap();
        assert_eq!(text.request, Duration::from_secs(90));
    }

    #[test]
    fn test_writes_humantime() {
        let json = serde_json::to_string(&Timeouts { request: Duration::from_secs(10) }).unwrap();
        assert_eq!(json, r#"{"request":"10s"}"#);
    }

    #[test]
    fn test_rejects_negative_and_garbage() {
        assert!(serde_json::from_str::<Timeouts>(r#"{"request": -5}"#).is_err());
        assert!(serde_json::from_str::<Timeouts>(r#"{"request": "soon"}"#).is_err());
    }
}
