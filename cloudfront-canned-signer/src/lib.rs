/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_cfg))]
/* End of automatically managed default lints */
//! CloudFront canned-policy signing for URLs and cookies.
//!
//! A canned policy grants access to one resource until an expiration time,
//! optionally restricted to a source IP range. The policy document is
//! serialized byte-exactly, signed with RSA over SHA-1, and laid out either as
//! query parameters on the resource URL or as a set of three cookies.
//!
//! ```no_run
//! use cloudfront_canned_signer::{sign_url, SigningRequest};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), cloudfront_canned_signer::error::SigningError> {
//! let request = SigningRequest::builder()
//!     .key_pair_id("APKAEXAMPLE")
//!     .private_key_path("private_key.pem")
//!     .expires_in(Duration::from_secs(3600))
//!     .build()?;
//!
//! let signed = sign_url("https://d111111abcdef8.cloudfront.net/image.jpg", &request)?;
//! println!("{signed}");
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod encoding;
/// Error types for CloudFront signing operations.
pub mod error;
mod key;
mod policy;
mod sign;
mod time;

pub use key::{KeySource, PrivateKey};
pub use policy::{CannedPolicy, MAX_EPOCH_SECONDS};
#[allow(deprecated)]
pub use sign::sign_rtmp_stream;
pub use sign::{
    sign_cookies, sign_url, RtmpStream, SignedCookies, SignedUrl, SigningRequest,
    SigningRequestBuilder, DEFAULT_EXPIRATION,
};
pub use time::{normalize, ExpireTime};
