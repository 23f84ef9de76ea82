//! Serde helper module mapping `chrono::NaiveDateTime` to `dateTime.iso8601`.
//!
//! Serde has no date type, so without help a timestamp field would go over
//! the wire as a plain `string`. Annotating the field routes it through a
//! marker newtype that [`crate::to_value`] and [`crate::from_value`]
//! recognise:
//!
//! ```rust
//! use chrono::NaiveDate;
//! use serde::{Deserialize, Serialize};
//! use xmlrpc_serde::{Value, from_value, to_value};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Event {
//!     title: String,
//!     #[serde(with = "xmlrpc_serde::iso8601")]
//!     at: chrono::NaiveDateTime,
//! }
//!
//! let at = NaiveDate::from_ymd_opt(2003, 4, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let event = Event { title: "release".into(), at };
//!
//! let value = to_value(&event).unwrap();
//! assert_eq!(value.get("at"), Some(&Value::DateTime("2003-04-01T12:00:00".into())));
//!
//! let decoded: Event = from_value(value).unwrap();
//! assert_eq!(event, decoded);
//! ```
//!
//! Other serde formats see the marker as a newtype around the canonical
//! string, so the same struct still works with them.

use crate::datetime;
use chrono::NaiveDateTime;
use std::fmt;

/// Serialize `value` as a `dateTime.iso8601` value.
pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_newtype_struct(crate::DATETIME_TOKEN, &datetime::format(value))
}

/// Deserialize a `dateTime.iso8601` value, accepting the compact layouts as well.
pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserializer.deserialize_newtype_struct(crate::DATETIME_TOKEN, DateTimeVisitor)
}

struct DateTimeVisitor;

impl<'de> serde::de::Visitor<'de> for DateTimeVisitor {
    type Value = NaiveDateTime;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an ISO 8601 timestamp (YYYY-MM-DDTHH:MM:SS)")
    }

    fn visit_newtype_struct<D: serde::Deserializer<'de>>(
        self,
        de: D,
    ) -> Result<NaiveDateTime, D::Error> {
        de.deserialize_str(self)
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<NaiveDateTime, E> {
        datetime::parse(v.trim())
            .ok_or_else(|| E::invalid_value(serde::de::Unexpected::Str(v), &self))
    }

    fn visit_string<E: serde::de::Error>(self, v: String) -> Result<NaiveDateTime, E> {
        self.visit_str(&v)
    }
}
