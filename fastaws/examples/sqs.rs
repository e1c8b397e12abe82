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

use fastaws::aws::{Client, Config, Service};
use fastaws::default_context;
use fastaws::sqs::SqsClient;

#[tokio::main]
async fn main() -> fastaws::Result<()> {
    env_logger::init();

    // Region and keys come from AWS_REGION, AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY.
    let ctx = default_context();
    let config = Config::default().from_env(&ctx);

    let mut client = Client::from_config(ctx, Service::Sqs, &config)?;
    client.connect().await?;
    let sqs = SqsClient::new(client)?;

    let queues = sqs.list_queues(None).await?;
    for queue_url in &queues.queue_urls {
        println!("{queue_url}");
    }
    if let Some(token) = queues.next_token {
        println!("more queues available, next token: {token}");
    }

    sqs.into_inner().disconnect().await
}
