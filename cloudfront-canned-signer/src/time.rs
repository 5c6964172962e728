/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Expiration time inputs and their conversion to epoch milliseconds.

use crate::error::{ErrorKind, SigningError};
use aws_smithy_types::DateTime;
use std::time::{SystemTime, UNIX_EPOCH};

/// An absolute expiration time in one of the accepted representations.
///
/// Every variant converts to milliseconds since the Unix epoch through
/// [`ExpireTime::epoch_millis`]; all variants denoting the same instant sign to
/// the same `Expires` value.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpireTime {
    /// Milliseconds since the Unix epoch. Fractions are rounded to the nearest millisecond.
    EpochMillis(f64),
    /// A decimal count of milliseconds since the Unix epoch.
    ///
    /// Text that is not an integer yields an unusable expiration, which policy
    /// construction rejects as missing.
    Text(String),
    /// A calendar instant.
    SystemTime(SystemTime),
    /// A timestamp read through its whole Unix seconds.
    DateTime(DateTime),
}

impl ExpireTime {
    /// Converts the expiration to milliseconds since the Unix epoch.
    ///
    /// The result is `NaN` for [`ExpireTime::Text`] values that do not parse as
    /// an integer.
    pub fn epoch_millis(&self) -> Result<f64, SigningError> {
        match self {
            ExpireTime::EpochMillis(millis) if millis.is_finite() => Ok(millis.round()),
            ExpireTime::EpochMillis(millis) => Err(SigningError::with_message(
                ErrorKind::InvalidExpireTime,
                format!("`{millis}` is not a finite number of milliseconds"),
            )),
            ExpireTime::Text(text) => Ok(text
                .trim()
                .parse::<i64>()
                .map(|millis| millis as f64)
                .unwrap_or(f64::NAN)),
            ExpireTime::SystemTime(time) => Ok(system_time_millis(*time).round()),
            ExpireTime::DateTime(date_time) => Ok(date_time.secs() as f64 * 1000.0),
        }
    }
}

/// Normalizes an optional expiration to epoch milliseconds.
///
/// Absent input stays absent; the caller picks the default.
pub fn normalize(expire_time: Option<&ExpireTime>) -> Result<Option<f64>, SigningError> {
    expire_time.map(ExpireTime::epoch_millis).transpose()
}

pub(crate) fn system_time_millis(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs_f64() * 1000.0,
        Err(before) => -before.duration().as_secs_f64() * 1000.0,
    }
}

impl From<f64> for ExpireTime {
    fn from(millis: f64) -> Self {
        ExpireTime::EpochMillis(millis)
    }
}

impl From<i64> for ExpireTime {
    fn from(millis: i64) -> Self {
        ExpireTime::EpochMillis(millis as f64)
    }
}

impl From<u64> for ExpireTime {
    fn from(millis: u64) -> Self {
        ExpireTime::EpochMillis(millis as f64)
    }
}

impl From<&str> for ExpireTime {
    fn from(text: &str) -> Self {
        ExpireTime::Text(text.to_owned())
    }
}

impl From<String> for ExpireTime {
    fn from(text: String) -> Self {
        ExpireTime::Text(text)
    }
}

impl From<SystemTime> for ExpireTime {
    fn from(time: SystemTime) -> Self {
        ExpireTime::SystemTime(time)
    }
}

impl From<DateTime> for ExpireTime {
    fn from(date_time: DateTime) -> Self {
        ExpireTime::DateTime(date_time)
    }
}
