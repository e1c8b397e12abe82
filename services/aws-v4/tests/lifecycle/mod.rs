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

use super::{init_test_logger, MockTransport, TEST_ACCESS_KEY_ID, TEST_SECRET_ACCESS_KEY};
use fastaws_aws_v4::{Call, Client, Credential, Payload, RegionService, RequestSigner, Service};
use fastaws_core::time::parse_iso8601;
use fastaws_core::{Context, ErrorKind, Result};
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn client(transport: &MockTransport, service: Service) -> Client {
    init_test_logger();

    Client::new(
        Context::new().with_transport(transport.clone()),
        Credential::new(TEST_ACCESS_KEY_ID, TEST_SECRET_ACCESS_KEY).expect("must be valid"),
        RegionService::new("us-east-1", service).expect("must be valid"),
    )
}

#[tokio::test]
async fn test_connect_twice_fails() -> Result<()> {
    let transport = MockTransport::new();
    let mut client = client(&transport, Service::S3);

    client.connect().await?;
    let err = client.connect().await.expect_err("second connect must fail");

    assert_eq!(err.kind(), ErrorKind::Lifecycle);
    assert!(err.is_lifecycle_error());
    assert!(client.is_connected());
    assert_eq!(transport.connects(), 1);
    Ok(())
}

#[tokio::test]
async fn test_disconnect_before_connect_fails() {
    let transport = MockTransport::new();
    let mut client = client(&transport, Service::S3);

    let err = client
        .disconnect()
        .await
        .expect_err("disconnect must fail while disconnected");
    assert_eq!(err.kind(), ErrorKind::Lifecycle);
    assert_eq!(transport.closes(), 0);
}

#[tokio::test]
async fn test_send_after_disconnect_fails() -> Result<()> {
    let transport = MockTransport::new();
    let mut client = client(&transport, Service::Sqs);

    client.connect().await?;
    client.send(Call::new(Method::GET, "ListQueues")).await?;
    client.disconnect().await?;

    let err = client
        .send(Call::new(Method::GET, "ListQueues"))
        .await
        .expect_err("send must fail after disconnect");
    assert_eq!(err.kind(), ErrorKind::Lifecycle);
    assert_eq!(transport.requests().len(), 1);
    assert_eq!(transport.closes(), 1);
    Ok(())
}

#[tokio::test]
async fn test_reconnect() -> Result<()> {
    let transport = MockTransport::new();
    let mut client = client(&transport, Service::Ses);

    client.connect().await?;
    client.disconnect().await?;
    client.connect().await?;
    client.send(Call::new(Method::GET, "ListIdentities")).await?;

    assert_eq!(transport.connects(), 2);
    assert_eq!(transport.requests().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_non_success_status_is_returned() -> Result<()> {
    let transport =
        MockTransport::with_response(StatusCode::FORBIDDEN, "<Error><Code>AccessDenied</Code></Error>");
    let mut client = client(&transport, Service::S3);
    client.connect().await?;

    let resp = client.send(Call::new(Method::GET, "ListBuckets")).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        resp.body().as_ref(),
        b"<Error><Code>AccessDenied</Code></Error>"
    );
    Ok(())
}

#[tokio::test]
async fn test_sent_request_is_signed_once() -> Result<()> {
    let transport = MockTransport::new();
    let mut client = client(&transport, Service::Ses);
    client.connect().await?;

    let call = Call::new(Method::POST, "SendEmail")
        .with_path("/v2/email/outbound-emails")
        .with_header("content-type", "application/json")
        .with_payload(Payload::Text(r#"{"a":1}"#.to_string()));
    client.send(call.clone()).await?;

    let requests = transport.requests();
    let req = &requests[0];
    assert_eq!(
        req.uri().to_string(),
        "https://email.us-east-1.amazonaws.com/v2/email/outbound-emails?Action=SendEmail&Version=2010-12-01"
    );
    assert_eq!(req.headers()["content-type"], "application/json");
    assert_eq!(req.body().as_ref(), br#"{"a":1}"#);

    // Date header and scope come from the same instant, so signing again at
    // that instant reproduces the sent authorization.
    let amz_date = req.headers()["x-amz-date"].to_str().expect("must be ascii");
    let resigned = RequestSigner::new(RegionService::new("us-east-1", Service::Ses)?).sign(
        &Credential::new(TEST_ACCESS_KEY_ID, TEST_SECRET_ACCESS_KEY)?,
        &call,
        parse_iso8601(amz_date)?,
    )?;
    assert_eq!(
        req.headers()["authorization"].to_str().ok(),
        resigned.authorization()
    );
    Ok(())
}

#[tokio::test]
async fn test_concurrent_sends_share_connection() -> Result<()> {
    let transport = MockTransport::new();
    let mut client = client(&transport, Service::Sqs);
    client.connect().await?;

    let client = Arc::new(client);
    let mut handles = Vec::new();
    for i in 0..8 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .send(Call::new(Method::GET, "GetQueueUrl").with_param("QueueName", format!("q{i}")))
                .await
        }));
    }
    for handle in handles {
        let resp = handle.await.expect("task must not panic")?;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    assert_eq!(transport.connects(), 1);
    assert_eq!(transport.requests().len(), 8);
    Ok(())
}
