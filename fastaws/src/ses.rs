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

//! Amazon Simple Email Service.

use crate::response::{ensure_service, json_error, parse_json};
use bytes::Bytes;
use fastaws_aws_v4::{Call, Payload, Service, SignedCall};
use fastaws_core::{Error, Result};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::Method;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const APPLICATION_JSON: &str = "application/json";
const CHARSET: &str = "UTF-8";

/// Output of [`SesClient::list_identities`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListIdentitiesOutput {
    /// Verified email addresses and domains.
    #[serde(default)]
    pub identities: Vec<String>,
    /// Token for the next page, if any.
    #[serde(default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListIdentitiesResponse {
    list_identities_response: ListIdentitiesEnvelope,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListIdentitiesEnvelope {
    list_identities_result: ListIdentitiesOutput,
}

/// Input of [`SesClient::send_email`].
#[derive(Debug, Clone, Default)]
pub struct SendEmailInput {
    /// Sender address, must be a verified identity.
    pub from: String,
    /// Recipient addresses.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    content: EmailContent<'a>,
    destination: Destination<'a>,
    from_email_address: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EmailContent<'a> {
    simple: SimpleMessage<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SimpleMessage<'a> {
    subject: TextContent<'a>,
    body: MessageBody<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct MessageBody<'a> {
    html: TextContent<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TextContent<'a> {
    charset: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Destination<'a> {
    to_addresses: &'a [String],
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailResponse {
    message_id: String,
}

/// SES operations on top of a signed client.
#[derive(Debug)]
pub struct SesClient<C: SignedCall> {
    inner: C,
}

impl<C: SignedCall> SesClient<C> {
    /// Wrap a client signing for SES.
    pub fn new(inner: C) -> Result<Self> {
        ensure_service(&inner, Service::Ses)?;
        Ok(Self { inner })
    }

    /// Get a reference to the underlying client.
    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    /// Get a mutable reference to the underlying client.
    pub fn get_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Consume the wrapper, returning the underlying client.
    pub fn into_inner(self) -> C {
        self.inner
    }

    /// List the verified identities of the account.
    ///
    /// - [ListIdentities](https://docs.aws.amazon.com/ses/latest/APIReference/API_ListIdentities.html)
    pub async fn list_identities(&self) -> Result<ListIdentitiesOutput> {
        let call =
            Call::new(Method::GET, "ListIdentities").with_header(ACCEPT.as_str(), APPLICATION_JSON);
        let body = self.send(call).await?;

        let resp: ListIdentitiesResponse = parse_json(&body)?;
        Ok(resp.list_identities_response.list_identities_result)
    }

    /// Get the sending status and quotas of the account.
    ///
    /// - [GetAccount](https://docs.aws.amazon.com/ses/latest/APIReference-V2/API_GetAccount.html)
    pub async fn get_account(&self) -> Result<Value> {
        let call = Call::new(Method::GET, "GetAccount").with_path("/v2/email/account");
        let body = self.send(call).await?;

        parse_json(&body)
    }

    /// Send an HTML email, returning its `MessageId`.
    ///
    /// - [SendEmail](https://docs.aws.amazon.com/ses/latest/APIReference-V2/API_SendEmail.html)
    pub async fn send_email(&self, input: &SendEmailInput) -> Result<String> {
        if input.from.is_empty() {
            return Err(Error::config_invalid("sender address must not be empty"));
        }
        if input.to.is_empty() {
            return Err(Error::config_invalid("at least one recipient is required"));
        }

        let payload = Payload::json(&SendEmailRequest {
            content: EmailContent {
                simple: SimpleMessage {
                    subject: TextContent {
                        charset: CHARSET,
                        data: &input.subject,
                    },
                    body: MessageBody {
                        html: TextContent {
                            charset: CHARSET,
                            data: &input.html_body,
                        },
                    },
                },
            },
            destination: Destination {
                to_addresses: &input.to,
            },
            from_email_address: &input.from,
        })?;

        let call = Call::new(Method::POST, "SendEmail")
            .with_path("/v2/email/outbound-emails")
            .with_header(CONTENT_TYPE.as_str(), APPLICATION_JSON)
            .with_payload(payload);
        let body = self.send(call).await?;

        let resp: SendEmailResponse = parse_json(&body)?;
        debug!("email sent with message id {}", resp.message_id);
        Ok(resp.message_id)
    }

    async fn send(&self, call: Call) -> Result<Bytes> {
        let resp = self.inner.signed_call(call).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(json_error(status, resp.headers(), resp.body()));
        }
        Ok(resp.into_body())
    }
}
