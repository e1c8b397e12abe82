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

//! Reqwest-based HTTPS transport for fastaws.
//!
//! `ReqwestTransport` implements the `Transport` trait from `fastaws_core`:
//! every `connect` hands out a `ReqwestHttpSend` handle wrapping a
//! `reqwest::Client`, which is safe to share between concurrent requests.
//!
//! ## Example
//!
//! ```no_run
//! use fastaws_core::Context;
//! use fastaws_http_send_reqwest::ReqwestTransport;
//! use std::time::Duration;
//!
//! let ctx = Context::new()
//!     .with_transport(ReqwestTransport::default().with_timeout(Duration::from_secs(30)));
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use fastaws_core::{Error, HttpSend, Result, Transport};
use http_body_util::BodyExt;
use log::debug;
use reqwest::{Client, Request};
use std::sync::Arc;
use std::time::Duration;

/// Timeout applied to every request unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Transport that opens connections backed by `reqwest`.
///
/// Requests time out after [`DEFAULT_TIMEOUT`] unless configured otherwise.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Option<Client>,
    timeout: Duration,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self {
            client: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ReqwestTransport {
    /// Create a new ReqwestTransport with a reqwest::Client.
    ///
    /// The client is cloned for every connection, so its pool and settings are shared.
    pub fn new(client: Client) -> Self {
        Self {
            client: Some(client),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the timeout applied to every request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The timeout applied to every request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn connect(&self) -> Result<Arc<dyn HttpSend>> {
        let client = match &self.client {
            Some(client) => client.clone(),
            None => Client::builder().build().map_err(|e| {
                Error::transport("failed to build reqwest client").with_source(e)
            })?,
        };
        debug!("reqwest transport connected, timeout: {:?}", self.timeout);

        Ok(Arc::new(ReqwestHttpSend {
            client,
            timeout: self.timeout,
        }))
    }
}

/// Connection handle returned by [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
    timeout: Duration,
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let mut req = Request::try_from(req)
            .map_err(|e| Error::transport("failed to convert request").with_source(e))?;
        *req.timeout_mut() = Some(self.timeout);

        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::transport("failed to execute request").with_source(e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::transport("failed to read response body").with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }
}
