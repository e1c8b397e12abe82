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

//! AWS SigV4 request signing and dispatch.
//!
//! This crate turns a [`Call`] (action, path, query parameters and payload)
//! into a request signed with AWS Signature Version 4 and sends it through
//! the transport of a [`fastaws_core::Context`].
//!
//! ## Example
//!
//! ```no_run
//! use fastaws_aws_v4::{Call, Client, Config, Service};
//! use fastaws_core::{Context, OsEnv};
//! use http::Method;
//!
//! # async fn example(ctx: Context) -> fastaws_core::Result<()> {
//! let config = Config::default().from_env(&ctx);
//! let mut client = Client::from_config(ctx, Service::S3, &config)?;
//!
//! client.connect().await?;
//! let resp = client.send(Call::new(Method::GET, "ListBuckets")).await?;
//! println!("{}", resp.status());
//! client.disconnect().await?;
//! # Ok(())
//! # }
//! ```

mod call;
pub use call::ApiVersion;
pub use call::Call;
pub use call::Payload;
pub use call::QueryValue;

pub mod canonical;
pub use canonical::canonical_query_string;
pub use canonical::CanonicalRequest;

mod client;
pub use client::Client;
pub use client::SignedCall;

mod config;
pub use config::Config;

mod constants;
pub use constants::AWS_QUERY_ENCODE_SET;
pub use constants::X_AMZ_ACL;

mod credential;
pub use credential::Credential;

mod region;
pub use region::RegionService;
pub use region::S3Provider;
pub use region::Service;

mod sign_request;
pub use sign_request::generate_signing_key;
pub use sign_request::RequestSigner;
pub use sign_request::SignedRequest;
pub use sign_request::SigningKey;
