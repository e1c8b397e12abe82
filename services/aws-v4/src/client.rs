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

use crate::canonical::validate_host;
use crate::{Call, Config, Credential, RegionService, RequestSigner, S3Provider, Service};
use async_trait::async_trait;
use bytes::Bytes;
use fastaws_core::time::now;
use fastaws_core::utils::Redact;
use fastaws_core::{Context, Error, HttpSend, Result};
use log::debug;
use std::fmt::Debug;
use std::mem;
use std::sync::Arc;

/// The capability service wrappers build on: sign a call and dispatch it.
///
/// Implementations return the raw response, whatever its status; wrappers own
/// status interpretation and body parsing.
#[async_trait]
pub trait SignedCall: Debug + Send + Sync {
    /// Region and service calls are signed for.
    fn region_service(&self) -> &RegionService;

    /// Host used by calls that don't set their own.
    fn host(&self) -> &str;

    /// Sign `call` and send it.
    async fn signed_call(&self, call: Call) -> Result<http::Response<Bytes>>;
}

#[derive(Debug)]
enum ConnectionState {
    Disconnected,
    Connected(Arc<dyn HttpSend>),
}

impl ConnectionState {
    fn handle(&self) -> Result<&Arc<dyn HttpSend>> {
        match self {
            ConnectionState::Connected(handle) => Ok(handle),
            ConnectionState::Disconnected => Err(Error::lifecycle("client is not connected")),
        }
    }
}

/// Client signs calls for one region and service and sends them through the
/// context's transport.
///
/// `connect` and `disconnect` take `&mut self`, so the connection lifecycle is
/// serialized by the borrow checker while calls (`&self`) may run concurrently
/// over the shared connection.
///
/// ```no_run
/// use fastaws_aws_v4::{Call, Client, Credential, RegionService, Service};
/// use fastaws_core::Context;
/// use http::Method;
///
/// # async fn example(ctx: Context) -> fastaws_core::Result<()> {
/// let mut client = Client::new(
///     ctx,
///     Credential::new("access_key_id", "secret_access_key")?,
///     RegionService::new("us-east-1", Service::Sqs)?,
/// );
///
/// client.connect().await?;
/// let resp = client.send(Call::new(Method::GET, "ListQueues")).await?;
/// println!("status: {}", resp.status());
/// client.disconnect().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    ctx: Context,
    credential: Credential,
    signer: RequestSigner,
    state: ConnectionState,
}

impl Client {
    /// Create a new, disconnected client.
    pub fn new(ctx: Context, credential: Credential, region_service: RegionService) -> Self {
        Self {
            ctx,
            credential,
            signer: RequestSigner::new(region_service),
            state: ConnectionState::Disconnected,
        }
    }

    /// Create a client from config.
    ///
    /// Region and both keys are required, use [`Config::from_env`] to fill
    /// them from the environment first.
    pub fn from_config(ctx: Context, service: Service, config: &Config) -> Result<Self> {
        let region = config
            .region
            .as_deref()
            .ok_or_else(|| Error::config_invalid("region is required"))?;
        let access_key_id = config
            .access_key_id
            .as_deref()
            .ok_or_else(|| Error::config_invalid("access key id is required"))?;
        let secret_access_key = config
            .secret_access_key
            .as_deref()
            .ok_or_else(|| Error::config_invalid("secret access key is required"))?;

        let credential = Credential::new(access_key_id, secret_access_key)?;
        let region_service = RegionService::new(region, service)?
            .with_s3_provider(config.s3_provider.unwrap_or(S3Provider::default()));

        let client = Client::new(ctx, credential, region_service);
        match &config.endpoint {
            Some(endpoint) => client.with_endpoint(endpoint),
            None => Ok(client),
        }
    }

    /// Send calls to `host` instead of the default host of the region and service.
    pub fn with_endpoint(mut self, host: &str) -> Result<Self> {
        if host.is_empty() {
            return Err(Error::config_invalid("endpoint must not be empty"));
        }
        validate_host(host)?;

        self.signer = self.signer.with_host(host);
        Ok(self)
    }

    /// Open the connection.
    ///
    /// Fails with a lifecycle error if the client is already connected.
    pub async fn connect(&mut self) -> Result<()> {
        if let ConnectionState::Connected(_) = self.state {
            return Err(Error::lifecycle("client is already connected"));
        }

        let handle = self.ctx.connect().await?;
        debug!(
            "connected to {} as {}",
            self.signer.host(),
            Redact::from(self.credential.access_key_id())
        );
        self.state = ConnectionState::Connected(handle);
        Ok(())
    }

    /// Close the connection.
    ///
    /// Fails with a lifecycle error if the client is not connected. The client
    /// is disconnected afterwards even when closing the handle fails.
    pub async fn disconnect(&mut self) -> Result<()> {
        match mem::replace(&mut self.state, ConnectionState::Disconnected) {
            ConnectionState::Connected(handle) => {
                debug!("disconnecting from {}", self.signer.host());
                handle.close().await
            }
            ConnectionState::Disconnected => Err(Error::lifecycle("client is not connected")),
        }
    }

    /// Check whether the client is connected.
    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected(_))
    }

    /// Sign `call` with the current time and send it.
    ///
    /// Non-2xx responses are returned as-is.
    pub async fn send(&self, call: Call) -> Result<http::Response<Bytes>> {
        let conn = self.state.handle()?.clone();

        let signed = self.signer.sign(&self.credential, &call, now())?;
        debug!("sending {} {}", signed.method(), signed.url());

        let resp = conn.http_send(signed.into_request()?).await?;
        debug!("{} responded with {}", call.action(), resp.status());
        Ok(resp)
    }
}

#[async_trait]
impl SignedCall for Client {
    fn region_service(&self) -> &RegionService {
        self.signer.region_service()
    }

    fn host(&self) -> &str {
        self.signer.host()
    }

    async fn signed_call(&self, call: Call) -> Result<http::Response<Bytes>> {
        self.send(call).await
    }
}
