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

use super::init_test_logger;
use fastaws_aws_v4::{Call, Client, Config, Service};
use fastaws_core::{Context, OsEnv, Result};
use fastaws_http_send_reqwest::ReqwestTransport;
use http::{Method, StatusCode};
use log::{debug, warn};
use std::env;

/// Build a connected client against real AWS, configured by `AWS_*` env.
async fn init_live_client(service: Service) -> Result<Option<Client>> {
    init_test_logger();
    let _ = dotenv::dotenv();

    if env::var("FASTAWS_TEST").ok().as_deref() != Some("on") {
        return Ok(None);
    }

    let ctx = Context::new()
        .with_transport(ReqwestTransport::default())
        .with_env(OsEnv);
    let config = Config::default().from_env(&ctx);

    let mut client = Client::from_config(ctx, service, &config)?;
    client.connect().await?;
    Ok(Some(client))
}

#[tokio::test]
async fn test_live_list_queues() -> Result<()> {
    let Some(mut client) = init_live_client(Service::Sqs).await? else {
        warn!("FASTAWS_TEST is not set, skipped");
        return Ok(());
    };

    let resp = client
        .send(Call::new(Method::GET, "ListQueues").with_header("accept", "application/json"))
        .await?;
    debug!("response: {:?}", resp.body());
    assert_eq!(resp.status(), StatusCode::OK);

    client.disconnect().await
}

#[tokio::test]
async fn test_live_list_buckets() -> Result<()> {
    let Some(mut client) = init_live_client(Service::S3).await? else {
        warn!("FASTAWS_TEST is not set, skipped");
        return Ok(());
    };

    let resp = client.send(Call::new(Method::GET, "ListBuckets")).await?;
    debug!("response: {:?}", resp.body());
    assert_eq!(resp.status(), StatusCode::OK);

    client.disconnect().await
}
