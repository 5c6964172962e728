/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::error::{ErrorKind, SigningError};
use crate::time::system_time_millis;
use aws_smithy_types::Number;
use std::time::SystemTime;

/// Largest signed 32-bit Unix time (January 19, 2038 03:14:08 GMT).
///
/// Expirations must be strictly below it.
pub const MAX_EPOCH_SECONDS: i64 = 2_147_483_647;

/// A validated canned policy statement.
///
/// Construction validates; a `CannedPolicy` that exists always serializes to a
/// signable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedPolicy {
    resource: String,
    expires_at: i64,
    ip_range: Option<String>,
}

impl CannedPolicy {
    /// Builds a canned policy for `resource` expiring at `expire_at_millis`.
    ///
    /// The expiration is rounded to whole seconds. `now` is the instant the
    /// expiration must lie after. Checks run in order and the first failure wins:
    /// empty resource, missing expiration (zero or `NaN`), expiration at or
    /// beyond [`MAX_EPOCH_SECONDS`], expiration not after `now`.
    pub fn new(
        resource: impl Into<String>,
        expire_at_millis: f64,
        ip_range: Option<String>,
        now: SystemTime,
    ) -> Result<Self, SigningError> {
        let resource = resource.into();
        if resource.is_empty() {
            return Err(SigningError::with_message(
                ErrorKind::MissingResource,
                "a resource URL or key is required",
            ));
        }

        let expires_at = (expire_at_millis / 1000.0).round();
        if expires_at.is_nan() || expires_at == 0.0 {
            return Err(SigningError::with_message(
                ErrorKind::MissingExpiration,
                "an expiration time is required",
            ));
        }
        if expires_at >= MAX_EPOCH_SECONDS as f64 {
            return Err(ErrorKind::ExpirationOutOfRange.into());
        }
        if expires_at <= system_time_millis(now) / 1000.0 {
            return Err(ErrorKind::ExpirationInPast.into());
        }

        Ok(Self {
            resource,
            expires_at: expires_at as i64,
            ip_range: ip_range.filter(|range| !range.is_empty()),
        })
    }

    /// The resource the policy grants access to.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Expiration in whole seconds since the Unix epoch.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// The source IP restriction, if any.
    pub fn ip_range(&self) -> Option<&str> {
        self.ip_range.as_deref()
    }

    /// Serializes the policy to the exact JSON document that gets signed.
    ///
    /// Key order is fixed and there is no insignificant whitespace. The
    /// `IpAddress` condition is only emitted when an IP range is set.
    pub fn to_json(&self) -> String {
        let mut out = String::new();
        let mut root = aws_smithy_json::serialize::JsonObjectWriter::new(&mut out);

        let mut statement_array = root.key("Statement").start_array();
        let mut statement = statement_array.value().start_object();

        statement.key("Resource").string(&self.resource);

        let mut condition = statement.key("Condition").start_object();

        let mut date_less = condition.key("DateLessThan").start_object();
        date_less
            .key("AWS:EpochTime")
            .number(Number::PosInt(self.expires_at as u64));
        date_less.finish();

        if let Some(ref ip) = self.ip_range {
            let mut ip_addr = condition.key("IpAddress").start_object();
            ip_addr.key("AWS:SourceIp").string(ip);
            ip_addr.finish();
        }

        condition.finish();
        statement.finish();
        statement_array.finish();
        root.finish();

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::{Duration, UNIX_EPOCH};

    const RESOURCE: &str = "https://d111111abcdef8.cloudfront.net/image.jpg";
    const NOW_SECS: u64 = 1_700_000_000;

    fn now() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(NOW_SECS)
    }

    fn millis(secs: i64) -> f64 {
        secs as f64 * 1000.0
    }

    fn kind_of(result: Result<CannedPolicy, SigningError>) -> ErrorKind {
        result.expect_err("policy should be rejected").kind()
    }

    #[test]
    fn converts_expiration_to_seconds() {
        let policy = CannedPolicy::new(RESOURCE, 1_767_290_400_499.0, None, now()).unwrap();
        assert_eq!(policy.expires_at(), 1_767_290_400);
        let policy = CannedPolicy::new(RESOURCE, 1_767_290_400_500.0, None, now()).unwrap();
        assert_eq!(policy.expires_at(), 1_767_290_401);
    }

    #[test]
    fn serializes_canned_policy() {
        let policy = CannedPolicy::new(RESOURCE, millis(1_767_290_400), None, now()).unwrap();
        assert_eq!(
            policy.to_json(),
            "{\"Statement\":[{\"Resource\":\"https://d111111abcdef8.cloudfront.net/image.jpg\",\
             \"Condition\":{\"DateLessThan\":{\"AWS:EpochTime\":1767290400}}}]}"
        );
    }

    #[test]
    fn supports_ip_restrictions() {
        let policy = CannedPolicy::new(
            RESOURCE,
            millis(1_767_290_400),
            Some("192.0.2.0/24".to_string()),
            now(),
        )
        .unwrap();
        assert_eq!(
            policy.to_json(),
            "{\"Statement\":[{\"Resource\":\"https://d111111abcdef8.cloudfront.net/image.jpg\",\
             \"Condition\":{\"DateLessThan\":{\"AWS:EpochTime\":1767290400},\
             \"IpAddress\":{\"AWS:SourceIp\":\"192.0.2.0/24\"}}}]}"
        );
    }

    #[test]
    fn excludes_ip_restrictions_when_empty() {
        let policy =
            CannedPolicy::new(RESOURCE, millis(1_767_290_400), Some(String::new()), now()).unwrap();
        assert_eq!(policy.ip_range(), None);
        assert!(!policy.to_json().contains("IpAddress"));
    }

    #[test]
    fn round_trips_through_json() {
        let resource = "https://example.com/a path/\"quoted\"?x=1";
        let policy = CannedPolicy::new(
            resource,
            millis(1_767_290_400),
            Some("10.0.0.0/8".to_string()),
            now(),
        )
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&policy.to_json()).unwrap();
        let statement = &parsed["Statement"][0];
        assert_eq!(statement["Resource"], resource);
        assert_eq!(
            statement["Condition"]["DateLessThan"]["AWS:EpochTime"],
            1_767_290_400
        );
        assert_eq!(
            statement["Condition"]["IpAddress"]["AWS:SourceIp"],
            "10.0.0.0/8"
        );
    }

    #[test]
    fn fails_if_resource_is_missing() {
        let result = CannedPolicy::new("", millis(1_767_290_400), None, now());
        assert_eq!(kind_of(result), ErrorKind::MissingResource);
    }

    #[test]
    fn resource_check_wins_over_expiration_checks() {
        let result = CannedPolicy::new("", 0.0, None, now());
        assert_eq!(kind_of(result), ErrorKind::MissingResource);
    }

    #[test]
    fn fails_if_expiration_is_missing() {
        assert_eq!(
            kind_of(CannedPolicy::new(RESOURCE, 0.0, None, now())),
            ErrorKind::MissingExpiration
        );
        assert_eq!(
            kind_of(CannedPolicy::new(RESOURCE, 400.0, None, now())),
            ErrorKind::MissingExpiration
        );
        assert_eq!(
            kind_of(CannedPolicy::new(RESOURCE, f64::NAN, None, now())),
            ErrorKind::MissingExpiration
        );
    }

    #[test]
    fn fails_if_expiration_is_after_the_end_of_time() {
        let result = CannedPolicy::new(RESOURCE, millis(MAX_EPOCH_SECONDS), None, now());
        assert_eq!(kind_of(result), ErrorKind::ExpirationOutOfRange);
        let result = CannedPolicy::new(RESOURCE, millis(MAX_EPOCH_SECONDS + 1), None, now());
        assert_eq!(kind_of(result), ErrorKind::ExpirationOutOfRange);
    }

    #[test]
    fn accepts_last_representable_second() {
        let policy = CannedPolicy::new(RESOURCE, millis(MAX_EPOCH_SECONDS - 1), None, now());
        assert_eq!(policy.unwrap().expires_at(), 2_147_483_646);
    }

    #[test]
    fn fails_if_expiration_is_not_after_now() {
        let result = CannedPolicy::new(RESOURCE, millis(NOW_SECS as i64), None, now());
        assert_eq!(kind_of(result), ErrorKind::ExpirationInPast);
        let result = CannedPolicy::new(RESOURCE, millis(NOW_SECS as i64 - 60), None, now());
        assert_eq!(kind_of(result), ErrorKind::ExpirationInPast);
        let result = CannedPolicy::new(RESOURCE, -5000.0, None, now());
        assert_eq!(kind_of(result), ErrorKind::ExpirationInPast);
    }
}
