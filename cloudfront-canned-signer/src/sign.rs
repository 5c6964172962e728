/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::encoding;
use crate::error::{ErrorKind, SigningError};
use crate::key::{KeySource, PrivateKey};
use crate::policy::CannedPolicy;
use crate::time::{normalize, system_time_millis, ExpireTime};
use aws_smithy_async::time::{SharedTimeSource, TimeSource};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::form_urlencoded;

/// Expiration applied when a request sets none: 30 minutes after signing.
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(1800);

const COOKIE_POLICY: &str = "CloudFront-Policy";
const COOKIE_SIGNATURE: &str = "CloudFront-Signature";
const COOKIE_KEY_PAIR_ID: &str = "CloudFront-Key-Pair-Id";

const PARAM_EXPIRES: &str = "Expires";
const PARAM_POLICY: &str = "Policy";
const PARAM_SIGNATURE: &str = "Signature";
const PARAM_KEY_PAIR_ID: &str = "Key-Pair-Id";
const SIGNED_PARAMS: [&str; 4] = [
    PARAM_EXPIRES,
    PARAM_POLICY,
    PARAM_SIGNATURE,
    PARAM_KEY_PAIR_ID,
];

#[derive(Debug, Clone)]
enum Expiration {
    At(ExpireTime),
    In(Duration),
}

/// Parameters for signing CloudFront resources with a canned policy.
///
/// A request is independent of the resource it signs and can be reused for
/// any number of URLs or cookie sets.
#[derive(Debug, Clone)]
pub struct SigningRequest {
    key_pair_id: String,
    key_source: KeySource,
    expiration: Option<Expiration>,
    ip_range: Option<String>,
    time_source: SharedTimeSource,
}

impl SigningRequest {
    /// Creates a new builder for constructing a signing request.
    pub fn builder() -> SigningRequestBuilder {
        SigningRequestBuilder::default()
    }

    /// The key pair ID passed through to the signed output.
    pub fn key_pair_id(&self) -> &str {
        &self.key_pair_id
    }
}

/// Builder for [`SigningRequest`].
#[derive(Default, Debug)]
pub struct SigningRequestBuilder {
    key_pair_id: Option<String>,
    key_source: KeySource,
    expiration: Option<Expiration>,
    ip_range: Option<String>,
    time_source: Option<SharedTimeSource>,
}

impl SigningRequestBuilder {
    /// Sets the CloudFront key pair ID.
    pub fn key_pair_id(mut self, id: impl Into<String>) -> Self {
        self.key_pair_id = Some(id.into());
        self
    }

    /// Sets the PEM-encoded private key inline.
    pub fn private_key_pem(mut self, pem: impl Into<String>) -> Self {
        self.key_source.set_pem(pem.into());
        self
    }

    /// Sets a path to read the PEM-encoded private key from.
    ///
    /// Takes precedence over [`private_key_pem`](Self::private_key_pem). The
    /// file is read each time something is signed.
    pub fn private_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_source.set_path(path.into());
        self
    }

    /// Sets an absolute expiration time.
    pub fn expires_at(mut self, time: impl Into<ExpireTime>) -> Self {
        self.expiration = Some(Expiration::At(time.into()));
        self
    }

    /// Sets an expiration relative to the moment of signing.
    pub fn expires_in(mut self, duration: Duration) -> Self {
        self.expiration = Some(Expiration::In(duration));
        self
    }

    /// Sets an IP range restriction (CIDR notation).
    pub fn ip_range(mut self, cidr: impl Into<String>) -> Self {
        self.ip_range = Some(cidr.into());
        self
    }

    /// Sets the clock used for "now". Defaults to the system clock.
    pub fn time_source(mut self, time_source: impl TimeSource + 'static) -> Self {
        self.time_source = Some(SharedTimeSource::new(time_source));
        self
    }

    /// Builds the signing request.
    pub fn build(self) -> Result<SigningRequest, SigningError> {
        let key_pair_id = self
            .key_pair_id
            .ok_or_else(|| SigningError::invalid_input("key_pair_id is required"))?;

        Ok(SigningRequest {
            key_pair_id,
            key_source: self.key_source,
            expiration: self.expiration,
            ip_range: self.ip_range,
            time_source: self.time_source.unwrap_or_default(),
        })
    }
}

/// A signed CloudFront URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    url: String,
}

impl SignedUrl {
    /// Returns the complete signed URL as a string.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Consumes the signed URL, returning the string.
    pub fn into_string(self) -> String {
        self.url
    }
}

impl fmt::Display for SignedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Signed cookies for CloudFront.
///
/// Only names and values are produced; domain, path and expiry attributes are
/// left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCookies {
    cookies: Vec<(Cow<'static, str>, String)>,
}

impl SignedCookies {
    /// Returns all cookies as name-value pairs.
    pub fn cookies(&self) -> &[(Cow<'static, str>, String)] {
        &self.cookies
    }

    /// Gets a specific cookie value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns an iterator over cookies.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(n, v)| (n.as_ref(), v.as_str()))
    }
}

impl From<SignedCookies> for HashMap<String, String> {
    fn from(cookies: SignedCookies) -> Self {
        cookies
            .cookies
            .into_iter()
            .map(|(name, value)| (name.into_owned(), value))
            .collect()
    }
}

/// Server path and stream name for a legacy RTMP distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtmpStream {
    server_path: String,
    stream_name: String,
}

impl RtmpStream {
    /// The `rtmp://{domain}/cfx/st` server path.
    pub fn server_path(&self) -> &str {
        &self.server_path
    }

    /// The signed resource key to request from the server.
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }
}

/// Everything computed for one resource, before it is laid out as a URL or cookies.
struct SignedPolicy {
    expires_at: i64,
    policy: String,
    signature: String,
}

impl SigningRequest {
    fn sign_policy(&self, resource: &str) -> Result<SignedPolicy, SigningError> {
        let now = self.time_source.now();
        let key_material = self.key_source.resolve()?;

        let expire_at_millis = match &self.expiration {
            Some(Expiration::At(time)) => normalize(Some(time))?,
            Some(Expiration::In(duration)) => {
                Some(system_time_millis(now) + duration.as_secs_f64() * 1000.0)
            }
            None => None,
        }
        .unwrap_or_else(|| {
            (system_time_millis(now) + DEFAULT_EXPIRATION.as_millis() as f64).round()
        });

        let policy = CannedPolicy::new(resource, expire_at_millis, self.ip_range.clone(), now)?;
        let policy_json = policy.to_json();
        let signature =
            PrivateKey::from_pem(key_material.as_bytes())?.sign(policy_json.as_bytes())?;

        Ok(SignedPolicy {
            expires_at: policy.expires_at(),
            policy: encoding::encode(policy_json.as_bytes()),
            signature: encoding::encode(&signature),
        })
    }

    /// Signs `resource_url`, returning it with `Expires`, `Policy`, `Signature`
    /// and `Key-Pair-Id` query parameters set.
    ///
    /// Existing query parameters, path and fragment are kept verbatim; an
    /// existing parameter named like one of the four is replaced. A relative
    /// resource key gets the query string appended as-is.
    pub fn sign_url(&self, resource_url: &str) -> Result<SignedUrl, SigningError> {
        let signed = self.sign_policy(resource_url)?;
        let expires = signed.expires_at.to_string();
        let key_pair_id: String =
            form_urlencoded::byte_serialize(self.key_pair_id.as_bytes()).collect();
        // Policy and signature are already in the URL-safe alphabet and go in unescaped.
        let params = [
            (PARAM_EXPIRES, expires.as_str()),
            (PARAM_POLICY, signed.policy.as_str()),
            (PARAM_SIGNATURE, signed.signature.as_str()),
            (PARAM_KEY_PAIR_ID, key_pair_id.as_str()),
        ];

        let url = set_query_params(resource_url, &params)?;
        tracing::debug!(
            resource = resource_url,
            expires = signed.expires_at,
            ip_restricted = self.ip_range.is_some(),
            "signed CloudFront URL"
        );
        Ok(SignedUrl { url })
    }

    /// Generates the signed cookie set granting access to `resource_url`.
    pub fn sign_cookies(&self, resource_url: &str) -> Result<SignedCookies, SigningError> {
        let signed = self.sign_policy(resource_url)?;
        let cookies = vec![
            (Cow::Borrowed(COOKIE_POLICY), signed.policy),
            (Cow::Borrowed(COOKIE_SIGNATURE), signed.signature),
            (Cow::Borrowed(COOKIE_KEY_PAIR_ID), self.key_pair_id.clone()),
        ];
        tracing::debug!(
            resource = resource_url,
            expires = signed.expires_at,
            ip_restricted = self.ip_range.is_some(),
            "signed CloudFront cookies"
        );
        Ok(SignedCookies { cookies })
    }

    /// Signs a stream for a legacy RTMP distribution.
    ///
    /// `domain` must be a bare host name and `resource_key` a key without a
    /// leading slash.
    #[deprecated(note = "CloudFront discontinued RTMP distributions on December 31, 2020")]
    pub fn sign_rtmp_stream(
        &self,
        domain: &str,
        resource_key: &str,
    ) -> Result<RtmpStream, SigningError> {
        if domain.is_empty() || domain.contains('/') {
            return Err(ErrorKind::InvalidDomain.into());
        }
        if resource_key.is_empty() || resource_key.starts_with('/') {
            return Err(ErrorKind::InvalidResourceKey.into());
        }

        let stream_name = self.sign_url(resource_key)?.into_string();
        Ok(RtmpStream {
            server_path: format!("rtmp://{domain}/cfx/st"),
            stream_name,
        })
    }
}

fn set_query_params(resource: &str, params: &[(&str, &str)]) -> Result<String, SigningError> {
    match url::Url::parse(resource) {
        Ok(mut url) => {
            let query = merge_query(url.query(), params);
            url.set_query(Some(&query));
            Ok(url.into())
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let (rest, fragment) = match resource.split_once('#') {
                Some((rest, fragment)) => (rest, Some(fragment)),
                None => (resource, None),
            };
            let (path, query) = match rest.split_once('?') {
                Some((path, query)) => (path, Some(query)),
                None => (rest, None),
            };
            let mut signed = format!("{path}?{}", merge_query(query, params));
            if let Some(fragment) = fragment {
                signed.push('#');
                signed.push_str(fragment);
            }
            Ok(signed)
        }
        Err(err) => Err(SigningError::new(
            ErrorKind::InvalidResourceUrl,
            Some(Box::new(err)),
            Some(resource.to_owned().into()),
        )),
    }
}

/// Drops existing pairs named like a signed parameter, keeps every other pair
/// byte-for-byte, then appends `params`, whose values must already be encoded.
fn merge_query(existing: Option<&str>, params: &[(&str, &str)]) -> String {
    let mut pairs: Vec<String> = existing
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let name = pair.split('=').next().unwrap_or_default();
            let name = form_urlencoded::parse(name.as_bytes())
                .next()
                .map(|(name, _)| name.into_owned())
                .unwrap_or_default();
            !SIGNED_PARAMS.contains(&name.as_str())
        })
        .map(str::to_owned)
        .collect();

    pairs.extend(params.iter().map(|(name, value)| format!("{name}={value}")));
    pairs.join("&")
}

/// Sign a CloudFront URL with a canned policy.
pub fn sign_url(resource_url: &str, request: &SigningRequest) -> Result<SignedUrl, SigningError> {
    request.sign_url(resource_url)
}

/// Generate signed cookies with a canned policy.
pub fn sign_cookies(
    resource_url: &str,
    request: &SigningRequest,
) -> Result<SignedCookies, SigningError> {
    request.sign_cookies(resource_url)
}

/// Sign a stream for a legacy RTMP distribution.
#[deprecated(note = "CloudFront discontinued RTMP distributions on December 31, 2020")]
#[allow(deprecated)]
pub fn sign_rtmp_stream(
    domain: &str,
    resource_key: &str,
    request: &SigningRequest,
) -> Result<RtmpStream, SigningError> {
    request.sign_rtmp_stream(domain, resource_key)
}
