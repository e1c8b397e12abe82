// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Canonical request construction.

use crate::constants::{AWS_QUERY_ENCODE_SET, SIGNED_HEADERS, X_AMZ_DATE};
use crate::QueryValue;
use fastaws_core::hash::hex_sha256;
use fastaws_core::{Error, Result};
use http::Method;
use percent_encoding::utf8_percent_encode;
use std::fmt;
use std::fmt::Write;

/// The canonical form of a request, the string the signature is computed over.
///
/// ```text
/// GET
/// /
/// Action=ListBuckets&Version=2006-03-01
/// host:s3.us-east-1.amazonaws.com
/// x-amz-date:20240101T000000Z
///
/// host;x-amz-date
/// e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: Method,
    path: String,
    query: String,
    headers: String,
    payload_hash: String,
}

impl CanonicalRequest {
    /// Build the canonical request.
    ///
    /// `query` must already be in canonical form, see [`canonical_query_string`].
    pub fn new(
        method: &Method,
        path: &str,
        query: &str,
        host: &str,
        amz_date: &str,
        payload: &[u8],
    ) -> Result<Self> {
        validate_host(host)?;

        let mut headers = String::with_capacity(host.len() + amz_date.len() + 24);
        writeln!(headers, "host:{host}")?;
        writeln!(headers, "{X_AMZ_DATE}:{amz_date}")?;

        Ok(Self {
            method: method.clone(),
            path: if path.is_empty() { "/" } else { path }.to_string(),
            query: query.to_string(),
            headers,
            payload_hash: hex_sha256(payload),
        })
    }

    /// Hex encoded SHA256 of the payload, also sent as `x-amz-content-sha256`.
    pub fn payload_hash(&self) -> &str {
        &self.payload_hash
    }

    /// Names of the signed headers, `;` separated.
    pub fn signed_headers(&self) -> &'static str {
        SIGNED_HEADERS
    }

    /// Hex encoded SHA256 of the canonical request.
    pub fn hashed(&self) -> String {
        hex_sha256(self.to_string().as_bytes())
    }
}

impl fmt::Display for CanonicalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.path)?;
        writeln!(f, "{}", self.query)?;
        // Canonical headers are newline terminated, so a blank line follows them.
        writeln!(f, "{}", self.headers)?;
        writeln!(f, "{}", SIGNED_HEADERS)?;
        write!(f, "{}", self.payload_hash)
    }
}

/// Check that `host` is a bare `host[:port]` authority.
///
/// Path, query, fragment and userinfo delimiters are rejected.
pub(crate) fn validate_host(host: &str) -> Result<()> {
    if host.is_empty() {
        return Err(Error::config_invalid("host must not be empty"));
    }
    let delimiter =
        |c: char| matches!(c, '/' | '?' | '#' | '@' | '\\') || c.is_whitespace() || c.is_control();
    if host.chars().any(delimiter) {
        return Err(Error::config_invalid(format!("invalid host: {host}")));
    }
    Ok(())
}

/// Build the canonical query string.
///
/// `Action` and `Version` come first in the input, followed by `params`.
/// Parameters without a value are dropped, the rest are rendered as
/// `key=value` and sorted by that full rendered pair.
pub fn canonical_query_string(
    action: &str,
    version: Option<&str>,
    params: &[(String, Option<QueryValue>)],
) -> String {
    let mut pairs = Vec::with_capacity(params.len() + 2);
    pairs.push(render_pair("Action", &QueryValue::from(action)));
    if let Some(version) = version {
        pairs.push(render_pair("Version", &QueryValue::from(version)));
    }
    for (k, v) in params {
        if let Some(v) = v {
            pairs.push(render_pair(k, v));
        }
    }

    // Sort by the whole `key=value` string, not by key alone.
    pairs.sort();
    pairs.join("&")
}

fn render_pair(key: &str, value: &QueryValue) -> String {
    let key = utf8_percent_encode(key, &AWS_QUERY_ENCODE_SET);
    match value {
        QueryValue::Str(v) => format!("{key}={}", utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET)),
        QueryValue::Int(v) => format!("{key}={v}"),
        QueryValue::UInt(v) => format!("{key}={v}"),
        QueryValue::Bool(v) => format!("{key}={v}"),
    }
}
