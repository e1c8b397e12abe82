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

//! Response helpers shared by the service wrappers.

use fastaws_aws_v4::{Service, SignedCall};
use fastaws_core::{Error, Result};
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

const X_AMZN_ERRORTYPE: &str = "x-amzn-errortype";

/// Check that a wrapper is built on a client of the matching service.
pub(crate) fn ensure_service<C: SignedCall>(inner: &C, expected: Service) -> Result<()> {
    let actual = inner.region_service().service();
    if actual != expected {
        return Err(Error::config_invalid(format!(
            "{expected} wrapper requires a {expected} client, got {actual}"
        )));
    }
    Ok(())
}

/// Decode a JSON body.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| Error::unexpected("failed to decode JSON response").with_source(e))
}

/// Build an upstream error from the response status and the service error, if any.
pub(crate) fn upstream_error(
    status: StatusCode,
    code: Option<&str>,
    message: Option<&str>,
) -> Error {
    let text = match (code, message) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_string(),
        (None, Some(message)) => message.to_string(),
        (None, None) => format!("request failed with status {status}"),
    };

    let err = Error::upstream(status, text);
    match code {
        Some(code) => err.with_code(code),
        None => err,
    }
}

/// `{"Error": {"Code": "...", "Message": "..."}}`, used by the query APIs.
#[derive(Debug, Deserialize)]
pub(crate) struct QueryErrorEnvelope {
    #[serde(rename = "Error")]
    pub error: ServiceError,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ServiceError {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// `{"message": "..."}` with the code in `x-amzn-ErrorType`, used by the REST JSON APIs.
#[derive(Debug, Default, Deserialize)]
struct RestJsonError {
    #[serde(default, alias = "Message")]
    message: Option<String>,
    #[serde(default, rename = "__type")]
    kind: Option<String>,
}

/// Map a failed JSON response to an upstream error.
pub(crate) fn json_error(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Error {
    if let Ok(envelope) = serde_json::from_slice::<QueryErrorEnvelope>(body) {
        return upstream_error(
            status,
            Some(&envelope.error.code),
            envelope.error.message.as_deref(),
        );
    }

    let rest = serde_json::from_slice::<RestJsonError>(body).unwrap_or_default();
    // `NotFoundException:http://internal.amazon.com/...`
    let header_code = headers
        .get(X_AMZN_ERRORTYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(':').next());
    // `com.amazonaws.sesv2#NotFoundException`
    let type_code = rest
        .kind
        .as_deref()
        .and_then(|v| v.rsplit('#').next());

    upstream_error(
        status,
        header_code.or(type_code).filter(|v| !v.is_empty()),
        rest.message.as_deref(),
    )
}
