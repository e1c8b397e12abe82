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

use crate::call::ApiVersion;
use crate::canonical::{canonical_query_string, CanonicalRequest};
use crate::constants::{ALGORITHM, TERMINATOR, X_AMZ_CONTENT_SHA_256, X_AMZ_DATE};
use crate::{Call, Credential, RegionService};
use bytes::Bytes;
use fastaws_core::hash::{hex_hmac_sha256, hmac_sha256};
use fastaws_core::time::{format_date, format_iso8601, DateTime};
use fastaws_core::{Error, Result};
use http::header::{HeaderName, AUTHORIZATION};
use http::{HeaderMap, HeaderValue, Method};
use log::debug;
use std::fmt::{Debug, Formatter, Write};

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// Every signature is computed from scratch: nothing derived from the secret
/// outlives a single [`RequestSigner::sign`] call.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    region_service: RegionService,
    host: String,
}

impl RequestSigner {
    /// Create a new signer for the given region and service.
    pub fn new(region_service: RegionService) -> Self {
        let host = region_service.host();
        Self {
            region_service,
            host,
        }
    }

    /// Replace the default host derived from region and service.
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// Host used by calls without their own host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Region and service of this signer.
    pub fn region_service(&self) -> &RegionService {
        &self.region_service
    }

    /// Sign `call` at `now`.
    ///
    /// Both the `x-amz-date` header and the credential scope are rendered from
    /// `now`, so callers capture the time exactly once per request.
    pub fn sign(&self, cred: &Credential, call: &Call, now: DateTime) -> Result<SignedRequest> {
        let amz_date = format_iso8601(now);
        let date = format_date(now);
        let host = call.host.as_deref().unwrap_or(&self.host);
        if !call.path.starts_with('/') {
            return Err(Error::config_invalid(format!(
                "path must start with '/': {}",
                call.path
            )));
        }

        let service = self.region_service.service();
        let version = match &call.version {
            ApiVersion::ServiceDefault => Some(service.api_version()),
            ApiVersion::Fixed(v) => Some(v.as_str()),
            ApiVersion::Omitted => None,
        };
        let query = canonical_query_string(&call.action, version, &call.params);
        let body = call.payload.to_bytes()?;

        // build canonical request and string to sign.
        let creq = CanonicalRequest::new(&call.method, &call.path, &query, host, &amz_date, &body)?;
        debug!("calculated canonical request: {creq}");

        let scope = self.region_service.scope(&date);
        debug!("calculated scope: {scope}");

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20220313T072004Z
        // 20220313/<region>/<service>/aws4_request
        // <hashed_canonical_request>
        let string_to_sign = {
            let mut f = String::new();
            writeln!(f, "{ALGORITHM}")?;
            writeln!(f, "{amz_date}")?;
            writeln!(f, "{scope}")?;
            write!(f, "{}", creq.hashed())?;
            f
        };
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key = generate_signing_key(
            cred.secret_access_key(),
            &date,
            self.region_service.region(),
            service.signing_name(),
        );
        let signature = signing_key.sign(&string_to_sign);

        let mut authorization = HeaderValue::from_str(&format!(
            "{ALGORITHM} Credential={}/{}, SignedHeaders={}, Signature={}",
            cred.access_key_id(),
            scope,
            creq.signed_headers(),
            signature
        ))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::with_capacity(3 + call.headers.len());
        headers.insert(X_AMZ_DATE, HeaderValue::from_str(&amz_date)?);
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(
            X_AMZ_CONTENT_SHA_256,
            HeaderValue::from_str(creq.payload_hash())?,
        );
        // Extra headers are not signed and win over the headers above.
        for (name, value) in &call.headers {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        Ok(SignedRequest {
            method: call.method.clone(),
            url: format!("https://{host}{}?{query}", call.path),
            headers,
            body,
        })
    }
}

/// Request-scoped signing key derived from the secret key.
///
/// Valid only for the date, region and service it was derived for.
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Hex encoded HMAC of `string_to_sign`.
    pub fn sign(&self, string_to_sign: &str) -> String {
        hex_hmac_sha256(&self.0, string_to_sign.as_bytes())
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(***)")
    }
}

/// Derive the signing key through the 4 rounds HMAC chain.
///
/// ```text
/// kDate    = HMAC("AWS4" + secret, date)
/// kRegion  = HMAC(kDate, region)
/// kService = HMAC(kRegion, service)
/// kSigning = HMAC(kService, "aws4_request")
/// ```
pub fn generate_signing_key(secret: &str, date: &str, region: &str, service: &str) -> SigningKey {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), date.as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    let sign_request = hmac_sha256(sign_service.as_slice(), TERMINATOR.as_bytes());

    SigningKey(sign_request)
}

/// A request ready to be dispatched: signed headers, URL and body.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Bytes,
}

impl SignedRequest {
    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Full URL: `https://<host><path>?<canonical query>`.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Headers to send.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body bytes, identical to the bytes that were hashed.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }

    /// Convert into an `http::Request` for the transport.
    pub fn into_request(self) -> Result<http::Request<Bytes>> {
        let mut req = http::Request::new(self.body);
        *req.method_mut() = self.method;
        *req.uri_mut() = self.url.parse()?;
        *req.headers_mut() = self.headers;

        Ok(req)
    }
}
