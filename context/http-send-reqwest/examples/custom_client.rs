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

use bytes::Bytes;
use fastaws_core::{Context, Error, Result};
use fastaws_http_send_reqwest::ReqwestTransport;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // Create a custom reqwest client with specific configuration
    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        .user_agent("fastaws-example/1.0")
        .build()
        .map_err(|e| Error::transport("failed to build client").with_source(e))?;

    println!("Created custom HTTP client with:");
    println!("  - 30 second timeout per request");
    println!("  - Max 10 idle connections per host");
    println!("  - Custom user agent");

    let ctx = Context::new()
        .with_transport(ReqwestTransport::new(client).with_timeout(Duration::from_secs(30)));
    let conn = ctx.connect().await?;

    let test_url = "https://httpbin.org/get";
    println!("\nTesting HTTP client with GET {test_url}");

    let req = http::Request::builder()
        .method("GET")
        .uri(test_url)
        .header("X-Test-Header", "fastaws-example")
        .body(Bytes::new())?;

    match conn.http_send(req).await {
        Ok(resp) => {
            println!("Response status: {}", resp.status());
            println!("Response headers:");
            for (name, value) in resp.headers() {
                println!("  {name}: {value:?}");
            }

            if let Ok(text) = String::from_utf8(resp.body().to_vec()) {
                println!("\nResponse body:");
                println!("{text}");
            }
        }
        Err(e) => {
            eprintln!("Request failed: {e}");
        }
    }

    conn.close().await
}
