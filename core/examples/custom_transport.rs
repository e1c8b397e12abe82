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

//! Plug a custom transport into a [`Context`].
//!
//! The transport here never touches the network: it echoes the request
//! line back, which is handy when wiring up tests or dry runs.

use async_trait::async_trait;
use bytes::Bytes;
use fastaws_core::{Context, HttpSend, Result, StaticEnv, Transport};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct EchoTransport;

#[async_trait]
impl Transport for EchoTransport {
    async fn connect(&self) -> Result<Arc<dyn HttpSend>> {
        println!("opening echo connection");
        Ok(Arc::new(EchoHttpSend::default()))
    }
}

#[derive(Debug, Default)]
struct EchoHttpSend {
    sent: AtomicUsize,
}

#[async_trait]
impl HttpSend for EchoHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.sent.fetch_add(1, Ordering::Relaxed);

        let line = format!("{} {}", req.method(), req.uri());
        Ok(http::Response::new(Bytes::from(line)))
    }

    async fn close(&self) -> Result<()> {
        println!(
            "closing echo connection after {} requests",
            self.sent.load(Ordering::Relaxed)
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let ctx = Context::new().with_transport(EchoTransport).with_env(StaticEnv {
        envs: HashMap::from([("AWS_REGION".to_string(), "eu-west-1".to_string())]),
    });

    let region = ctx.env_var("AWS_REGION").unwrap_or_default();
    let conn = ctx.connect().await?;

    let req = http::Request::builder()
        .method("GET")
        .uri(format!("https://sqs.{region}.amazonaws.com/?Action=ListQueues"))
        .body(Bytes::new())?;
    let resp = conn.http_send(req).await?;

    println!("status: {}", resp.status());
    println!("body: {}", String::from_utf8_lossy(resp.body()));

    conn.close().await
}
