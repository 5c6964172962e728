/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! CloudFront-specific base64 alphabet.
//!
//! Standard base64 with `+` → `-`, `=` → `_`, `/` → `~`, so that policies and
//! signatures can appear unescaped in a query string or a cookie value.

/// Maps a standard base64 string onto the CloudFront URL-safe alphabet.
///
/// Characters outside `+`, `=` and `/` are left untouched, so the mapping is
/// idempotent on input that is already safe.
pub fn to_url_safe(base64: &str) -> String {
    base64
        .chars()
        .map(|c| match c {
            '+' => '-',
            '=' => '_',
            '/' => '~',
            other => other,
        })
        .collect()
}

/// Reverses [`to_url_safe`].
pub fn from_url_safe(safe: &str) -> String {
    safe.chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '=',
            '~' => '/',
            other => other,
        })
        .collect()
}

/// Base64-encodes `data` and maps the result onto the URL-safe alphabet.
pub fn encode(data: &[u8]) -> String {
    to_url_safe(&base64_simd::STANDARD.encode_to_string(data))
}
