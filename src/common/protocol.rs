// Copyright 2018 Dmitry Tantsur <divius.inside@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Common protocol bits.

#![allow(dead_code)] // various things are unused with --no-default-features

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
#[cfg(feature = "baremetal")]
use macaddr::MacAddr6;
use serde::de::Error as DeserError;
#[cfg(feature = "baremetal")]
use serde::Serializer;
use serde::{Deserialize, Deserializer, Serialize};

/// A link to a resource.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Link {
    /// Link target.
    pub href: String,
    /// Link relation (e.g. `self` or `next`).
    pub rel: String,
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a date and time with or without a time zone.
///
/// Values without a time zone are assumed to be in UTC.
pub fn parse_datetime(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(result) = DateTime::parse_from_rfc3339(value) {
        return Some(result);
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Deserialize a date and time with an optional time zone.
pub fn deser_datetime<'de, D>(des: D) -> ::std::result::Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(des)?;
    parse_datetime(&value)
        .ok_or_else(|| D::Error::custom(format!("Invalid date and time: {}", value)))
}

/// Deserialize an optional date and time with an optional time zone.
///
/// Empty strings are treated as missing values.
pub fn deser_optional_datetime<'de, D>(
    des: D,
) -> ::std::result::Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Deserialize::deserialize(des)?;
    match value {
        Some(s) if !s.is_empty() => parse_datetime(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("Invalid date and time: {}", s))),
        _ => Ok(None),
    }
}

#[cfg(feature = "baremetal")]
fn parse_mac<E: DeserError>(value: &str) -> ::std::result::Result<MacAddr6, E> {
    value
        .parse()
        .map_err(|e| E::custom(format!("Invalid MAC address {}: {}", value, e)))
}

/// Serialize a MAC address in its HEX format.
#[cfg(feature = "baremetal")]
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn ser_mac<S>(value: &MacAddr6, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    value.to_string().to_lowercase().serialize(serializer)
}

/// Deserialize a MAC address from its HEX format.
#[cfg(feature = "baremetal")]
pub fn deser_mac<'de, D>(des: D) -> ::std::result::Result<MacAddr6, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(des)?;
    parse_mac(&value)
}

/// Serialize a list of MAC addresses in their HEX format.
#[cfg(feature = "baremetal")]
pub fn ser_mac_list<S>(value: &[MacAddr6], serializer: S) -> ::std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    value
        .iter()
        .map(|m| m.to_string().to_lowercase())
        .collect::<Vec<_>>()
        .serialize(serializer)
}

/// Deserialize a list of MAC addresses from their HEX format.
#[cfg(feature = "baremetal")]
pub fn deser_mac_list<'de, D>(des: D) -> ::std::result::Result<Vec<MacAddr6>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Vec<String> = Deserialize::deserialize(des)?;
    value.iter().map(|s| parse_mac(s)).collect()
}

/// Current time as a fixed offset date and time.
#[inline]
pub fn now() -> DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

#[cfg(test)]
mod test {
    use chrono::{Datelike, Timelike};
    use serde::Deserialize;
    use serde_json::json;

    use super::{deser_datetime, deser_optional_datetime, parse_datetime};

    #[derive(Debug, Deserialize)]
    struct Times {
        #[serde(deserialize_with = "deser_datetime")]
        created_at: chrono::DateTime<chrono::FixedOffset>,
        #[serde(default, deserialize_with = "deser_optional_datetime")]
        updated_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    }

    #[test]
    fn test_parse_with_zone() {
        let dt = parse_datetime("2017-05-10T18:14:44+02:00").unwrap();
        assert_eq!(dt.hour(), 18);
        assert_eq!(dt.offset().local_minus_utc(), 7200);
        let dt = parse_datetime("2017-05-10T18:14:44Z").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_parse_without_zone() {
        let dt = parse_datetime("2017-05-10T18:14:44").unwrap();
        assert_eq!(dt.year(), 2017);
        assert_eq!(dt.minute(), 14);
        assert_eq!(dt.offset().local_minus_utc(), 0);
        let dt = parse_datetime("2017-05-10T18:14:44.123456").unwrap();
        assert_eq!(dt.second(), 44);
        assert!(parse_datetime("yesterday").is_none());
    }

    #[test]
    fn test_deserialize() {
        let value: Times = serde_json::from_value(json!({
            "created_at": "2023-01-01T00:00:00",
            "updated_at": null
        }))
        .unwrap();
        assert_eq!(value.created_at.year(), 2023);
        assert!(value.updated_at.is_none());

        let value: Times = serde_json::from_value(json!({
            "created_at": "2023-01-01T00:00:00Z",
            "updated_at": ""
        }))
        .unwrap();
        assert!(value.updated_at.is_none());

        assert!(serde_json::from_value::<Times>(json!({"created_at": "never"})).is_err());
    }

    #[cfg(feature = "baremetal")]
    #[derive(Debug, Deserialize, serde::Serialize)]
    struct Macs {
        #[serde(deserialize_with = "super::deser_mac", serialize_with = "super::ser_mac")]
        mac: macaddr::MacAddr6,
        #[serde(
            default,
            deserialize_with = "super::deser_mac_list",
            serialize_with = "super::ser_mac_list"
        )]
        macs: Vec<macaddr::MacAddr6>,
    }

    #[cfg(feature = "baremetal")]
    #[test]
    fn test_mac_strings() {
        let value: Macs = serde_json::from_value(json!({
            "mac": "52:54:00:4E:3D:30",
            "macs": ["52:54:00:4e:3d:30", "52:54:00:47:20:4d"]
        }))
        .unwrap();
        assert_eq!(
            value.mac,
            macaddr::MacAddr6::new(0x52, 0x54, 0x00, 0x4e, 0x3d, 0x30)
        );
        assert_eq!(value.macs.len(), 2);
        assert_eq!(value.macs[0], value.mac);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({
                "mac": "52:54:00:4e:3d:30",
                "macs": ["52:54:00:4e:3d:30", "52:54:00:47:20:4d"]
            })
        );

        let value: Macs = serde_json::from_value(json!({"mac": "52:54:00:4e:3d:30"})).unwrap();
        assert!(value.macs.is_empty());
    }

    #[cfg(feature = "baremetal")]
    #[test]
    fn test_mac_invalid() {
        assert!(serde_json::from_value::<Macs>(json!({"mac": "not a mac"})).is_err());
        assert!(serde_json::from_value::<Macs>(json!({"mac": [82, 84, 0, 78, 61, 48]})).is_err());
        assert!(serde_json::from_value::<Macs>(json!({
            "mac": "52:54:00:4e:3d:30",
            "macs": ["52:54:00:4e:3d"]
        }))
        .is_err());
    }
}
