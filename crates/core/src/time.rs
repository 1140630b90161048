//! UTC timestamps with sentinel rejection.
//!
//! A timestamp equal to `DateTime::<Utc>::MIN_UTC`, `MAX_UTC` or the Unix epoch is
//! treated as "unset" and rejected. Parsed timestamps must carry a zero UTC
//! offset; local times are never silently normalized.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_object::ValueObject;

/// When a stream entry was created.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "DateTime<FixedOffset>", into = "DateTime<Utc>")]
pub struct CreationTime(DateTime<Utc>);

/// When a forgettable payload was created.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "DateTime<FixedOffset>", into = "DateTime<Utc>")]
pub struct PayloadCreationTime(DateTime<Utc>);

/// When a forgettable payload's metadata last changed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "DateTime<FixedOffset>", into = "DateTime<Utc>")]
pub struct PayloadLastModifiedTime(DateTime<Utc>);

/// When a payload's content was replaced by a forgotten marker.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "DateTime<FixedOffset>", into = "DateTime<Utc>")]
pub struct ForgettingTime(DateTime<Utc>);

fn is_sentinel(value: &DateTime<Utc>) -> bool {
    *value == DateTime::<Utc>::MIN_UTC
        || *value == DateTime::<Utc>::MAX_UTC
        || (value.timestamp() == 0 && value.timestamp_subsec_nanos() == 0)
}

macro_rules! impl_utc_timestamp {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn new(value: DateTime<Utc>) -> Result<Self, DomainError> {
                if is_sentinel(&value) {
                    return Err(DomainError::invalid_value(format!(
                        "{} must be set (got sentinel {})",
                        $name, value
                    )));
                }
                Ok(Self(value))
            }

            pub fn now() -> Self {
                Self(Utc::now())
            }

            /// Accept a timestamp with an explicit offset; only UTC is allowed.
            pub fn from_fixed_offset(value: DateTime<FixedOffset>) -> Result<Self, DomainError> {
                if value.offset().local_minus_utc() != 0 {
                    return Err(DomainError::invalid_value(format!(
                        "{} must be UTC (got offset {})",
                        $name,
                        value.offset()
                    )));
                }
                Self::new(value.with_timezone(&Utc))
            }

            pub fn parse_rfc3339(value: &str) -> Result<Self, DomainError> {
                let parsed = DateTime::parse_from_rfc3339(value)
                    .map_err(|e| DomainError::invalid_value(format!("{}: {}", $name, e)))?;
                Self::from_fixed_offset(parsed)
            }

            pub fn as_datetime(&self) -> DateTime<Utc> {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        }

        impl TryFrom<DateTime<Utc>> for $t {
            type Error = DomainError;

            fn try_from(value: DateTime<Utc>) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<DateTime<FixedOffset>> for $t {
            type Error = DomainError;

            fn try_from(value: DateTime<FixedOffset>) -> Result<Self, Self::Error> {
                Self::from_fixed_offset(value)
            }
        }

        impl From<$t> for DateTime<Utc> {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl ValueObject for $t {}
    };
}

impl_utc_timestamp!(CreationTime, "CreationTime");
impl_utc_timestamp!(PayloadCreationTime, "PayloadCreationTime");
impl_utc_timestamp!(PayloadLastModifiedTime, "PayloadLastModifiedTime");
impl_utc_timestamp!(ForgettingTime, "ForgettingTime");
