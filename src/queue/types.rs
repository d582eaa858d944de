//! Core types for the queue broker.
//!
//! Contains the element record, the dequeue type filter and the
//! serializable queue projection returned by `GET /queues`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Integer classification tag carried by every element.
pub type ElementType = i64;

/// Legacy wire value meaning "match any element type".
pub const MATCH_ANY_LEGACY: ElementType = -1;

/// Serde helper for an optional RFC3339 expiration timestamp.
///
/// Missing, null and unparseable values all deserialize to `None`, so a bad
/// timestamp means "never expires" instead of rejecting the element.
pub(crate) mod lenient_rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use tracing::info;

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => {
                serializer.serialize_some(&date.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            },
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => match DateTime::parse_from_rfc3339(&s) {
                Ok(dt) => Some(dt.with_timezone(&Utc)),
                Err(e) => {
                    info!(value = %s, error = %e, "Unparseable expiration time, element never expires");
                    None
                },
            },
            Some(other) => {
                info!(value = %other, "Non-string expiration time, element never expires");
                None
            },
        })
    }
}

/// A typed record held by a queue.
///
/// Elements are never mutated once enqueued; they are only appended and
/// removed. Body key order is preserved exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Classification tag used by the dequeue filter.
    #[serde(rename = "type")]
    pub element_type: ElementType,
    /// Ordered key/value payload.
    #[serde(default)]
    pub body: Map<String, Value>,
    /// Absolute expiry instant (`None` = never expires).
    #[serde(default, alias = "time", with = "lenient_rfc3339")]
    pub expiration_time: Option<DateTime<Utc>>,
}

impl Element {
    /// Create a non-expiring element.
    pub fn new(element_type: ElementType, body: Map<String, Value>) -> Self {
        Self {
            element_type,
            body,
            expiration_time: None,
        }
    }

    /// Set the absolute expiry instant.
    #[must_use]
    pub fn with_expiration(mut self, expiration_time: DateTime<Utc>) -> Self {
        self.expiration_time = Some(expiration_time);
        self
    }

    /// Returns true if the element has an expiry at or before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_time.is_some_and(|exp| exp <= now)
    }
}

/// Which elements a dequeue call may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    /// Every element matches.
    #[default]
    Any,
    /// Only elements with exactly this type match.
    Only(ElementType),
}

impl TypeFilter {
    /// Map a wire value to a filter; absent or `-1` means [`TypeFilter::Any`].
    pub fn from_wire(value: Option<ElementType>) -> Self {
        match value {
            None | Some(MATCH_ANY_LEGACY) => Self::Any,
            Some(t) => Self::Only(t),
        }
    }

    pub fn matches(self, element: &Element) -> bool {
        match self {
            Self::Any => true,
            Self::Only(t) => element.element_type == t,
        }
    }
}

/// Point-in-time projection of one queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub id: String,
    pub elements: Vec<Element>,
    pub read_locked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_body_key_order_preserved() {
        let element: Element =
            serde_json::from_str(r#"{"type":1,"body":{"zeta":1,"alpha":2,"mid":3}}"#).unwrap();
        let keys: Vec<&str> = element.body.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_expiration_parsed_once_at_ingress() {
        let element: Element = serde_json::from_str(
            r#"{"type":2,"body":{},"expirationTime":"2030-01-02T03:04:05Z"}"#,
        )
        .unwrap();
        assert_eq!(
            element.expiration_time,
            Some(Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap())
        );
    }

    #[test]
    fn test_legacy_time_field_alias() {
        let element: Element =
            serde_json::from_str(r#"{"type":2,"time":"2030-01-02T03:04:05+02:00"}"#).unwrap();
        assert_eq!(
            element.expiration_time,
            Some(Utc.with_ymd_and_hms(2030, 1, 2, 1, 4, 5).unwrap())
        );
        assert!(element.body.is_empty());
    }

    #[test]
    fn test_bad_expiration_means_never_expires() {
        for raw in [
            r#"{"type":1,"expirationTime":"yesterday"}"#,
            r#"{"type":1,"expirationTime":""}"#,
            r#"{"type":1,"expirationTime":null}"#,
            r#"{"type":1,"expirationTime":12345}"#,
            r#"{"type":1}"#,
        ] {
            let element: Element = serde_json::from_str(raw).unwrap();
            assert_eq!(element.expiration_time, None, "input: {raw}");
            assert!(!element.is_expired(Utc::now()));
        }
    }

    #[test]
    fn test_serialized_field_order() {
        let mut body = Map::new();
        body.insert("k".to_string(), Value::from("v"));
        let element = Element::new(7, body)
            .with_expiration(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
        let json = serde_json::to_string(&element).unwrap();
        assert_eq!(
            json,
            r#"{"type":7,"body":{"k":"v"},"expirationTime":"2030-01-01T00:00:00Z"}"#
        );
    }

    #[test]
    fn test_is_expired_boundary() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let element = Element::new(1, Map::new()).with_expiration(now);
        assert!(element.is_expired(now));
        assert!(!element.is_expired(now - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_type_filter_from_wire() {
        assert_eq!(TypeFilter::from_wire(None), TypeFilter::Any);
        assert_eq!(TypeFilter::from_wire(Some(-1)), TypeFilter::Any);
        assert_eq!(TypeFilter::from_wire(Some(0)), TypeFilter::Only(0));

        let element = Element::new(3, Map::new());
        assert!(TypeFilter::Any.matches(&element));
        assert!(TypeFilter::Only(3).matches(&element));
        assert!(!TypeFilter::Only(4).matches(&element));
    }
}
