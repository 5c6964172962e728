/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// The precondition a [`SigningError`] reports as violated.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The policy resource was empty.
    MissingResource,
    /// The expiration was absent, zero, or could not be read as a number.
    MissingExpiration,
    /// The expiration is at or beyond the 32-bit Unix time ceiling.
    ExpirationOutOfRange,
    /// The expiration is not after the current time.
    ExpirationInPast,
    /// The expiration value could not be converted to an epoch time.
    InvalidExpireTime,
    /// The key material is missing or has no line breaks.
    MalformedKeyMaterial,
    /// The key file could not be read.
    KeyFile,
    /// The key material is not a supported RSA private key.
    InvalidKey,
    /// The RSA signing operation failed.
    SigningFailure,
    /// The resource is neither an absolute URL nor a relative key.
    InvalidResourceUrl,
    /// The streaming domain name is empty or contains a `/`.
    InvalidDomain,
    /// The streaming resource key is empty or starts with a `/`.
    InvalidResourceKey,
    /// A required request field was not provided.
    InvalidInput,
}

/// Error type for CloudFront signing operations
#[derive(Debug)]
pub struct SigningError {
    kind: ErrorKind,
    source: Option<Box<dyn StdError + Send + Sync>>,
    message: Option<Cow<'static, str>>,
}

impl SigningError {
    pub(crate) fn new(
        kind: ErrorKind,
        source: Option<Box<dyn StdError + Send + Sync>>,
        message: Option<Cow<'static, str>>,
    ) -> Self {
        Self {
            kind,
            source,
            message,
        }
    }

    pub(crate) fn with_message(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(kind, None, Some(message.into()))
    }

    pub(crate) fn key_file(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::new(ErrorKind::KeyFile, Some(source.into()), None)
    }

    pub(crate) fn invalid_key(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::new(ErrorKind::InvalidKey, Some(source.into()), None)
    }

    pub(crate) fn signing_failure(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::new(ErrorKind::SigningFailure, Some(source.into()), None)
    }

    pub(crate) fn invalid_input(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_message(ErrorKind::InvalidInput, message)
    }

    /// Returns the kind of precondition that failed.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for SigningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = match self.kind {
            ErrorKind::MissingResource => "missing resource",
            ErrorKind::MissingExpiration => "missing expiration",
            ErrorKind::ExpirationOutOfRange => {
                "expiration must be before January 19, 2038 03:14:08 GMT due to the limits of UNIX time"
            }
            ErrorKind::ExpirationInPast => "expiration must be after the current time",
            ErrorKind::InvalidExpireTime => "invalid expiration time",
            ErrorKind::MalformedKeyMaterial => {
                "invalid private key string, must include line breaks"
            }
            ErrorKind::KeyFile => "failed to read private key file",
            ErrorKind::InvalidKey => "invalid private key",
            ErrorKind::SigningFailure => "signing operation failed",
            ErrorKind::InvalidResourceUrl => "invalid resource URL",
            ErrorKind::InvalidDomain => {
                "invalid domain name, expected something like 'xxxxxxxx.cloudfront.net' without scheme or path"
            }
            ErrorKind::InvalidResourceKey => {
                "invalid resource key, expected something like 'myfolder/video.mp4' without leading slash or host"
            }
            ErrorKind::InvalidInput => "invalid input",
        };
        f.write_str(summary)?;
        if let Some(ref msg) = self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl StdError for SigningError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<ErrorKind> for SigningError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind, None, None)
    }
}
