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

//! Amazon Simple Queue Service.
//!
//! Every call asks for a JSON response. Calls addressed to a queue take the
//! queue URL and are sent to the `/<account-id>/<queue-name>` path of that URL
//! on the client's host.

use crate::response::{ensure_service, upstream_error, QueryErrorEnvelope};
use fastaws_aws_v4::{Call, Payload, Service, SignedCall};
use fastaws_core::{Error, Result};
use http::header::ACCEPT;
use http::Method;
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

const APPLICATION_JSON: &str = "application/json";

/// Extract the `/<account-id>/<queue-name>` path of a queue URL.
///
/// ```
/// use fastaws::sqs::queue_path;
///
/// let path = queue_path("https://sqs.us-east-1.amazonaws.com/123456789012/my-queue").unwrap();
/// assert_eq!(path, "/123456789012/my-queue");
/// ```
pub fn queue_path(queue_url: &str) -> Result<String> {
    let uri: http::Uri = queue_url.parse().map_err(|e| {
        Error::config_invalid(format!("invalid queue url: {queue_url}")).with_source(e)
    })?;

    let mut segments = uri.path().split('/').filter(|s| !s.is_empty());
    match (segments.next(), segments.next(), segments.next()) {
        (Some(account), Some(queue), None) if account.bytes().all(|b| b.is_ascii_digit()) => {
            Ok(format!("/{account}/{queue}"))
        }
        _ => Err(Error::config_invalid(format!(
            "queue url has no /<account-id>/<queue-name> path: {queue_url}"
        ))),
    }
}

/// Attributes set when creating a queue. Unset fields keep the service defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateQueueOptions {
    /// `ReceiveMessageWaitTimeSeconds`, enables long polling.
    pub wait_seconds: Option<u32>,
    /// `DelaySeconds`, delays delivery of every message.
    pub delay_seconds: Option<u32>,
}

impl CreateQueueOptions {
    fn attributes(&self) -> Vec<(&'static str, u32)> {
        [
            ("ReceiveMessageWaitTimeSeconds", self.wait_seconds),
            ("DelaySeconds", self.delay_seconds),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}

/// Options of [`SqsClient::receive_messages`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveOptions {
    /// `WaitTimeSeconds`, how long to wait for messages to arrive.
    pub wait_seconds: Option<u32>,
    /// `MaxNumberOfMessages`, between 1 and 10.
    pub max_messages: Option<u32>,
}

/// Body of a message to send.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    /// Plain text, sent as-is.
    Text(String),
    /// A JSON document, sent in its compact form.
    Json(Value),
}

impl From<&str> for MessageBody {
    fn from(v: &str) -> Self {
        MessageBody::Text(v.to_string())
    }
}

impl From<String> for MessageBody {
    fn from(v: String) -> Self {
        MessageBody::Text(v)
    }
}

impl From<Value> for MessageBody {
    fn from(v: Value) -> Self {
        MessageBody::Json(v)
    }
}

impl MessageBody {
    fn render(self) -> Result<String> {
        match self {
            MessageBody::Text(s) => Ok(s),
            MessageBody::Json(v) => {
                let bs = Payload::Json(v).to_bytes()?;
                Ok(String::from_utf8(bs.to_vec())?)
            }
        }
    }
}

/// Output of [`SqsClient::list_queues`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQueuesOutput {
    /// URLs of the matching queues.
    pub queue_urls: Vec<String>,
    /// Token for the next page, if any.
    pub next_token: Option<String>,
}

/// Output of [`SqsClient::send_message`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendMessageOutput {
    /// Id assigned to the message.
    pub message_id: String,
    /// Sequence number, FIFO queues only.
    #[serde(default)]
    pub sequence_number: Option<String>,
}

/// A received message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    /// Id of the message.
    pub message_id: String,
    /// Handle to delete the message with, changes on every receive.
    pub receipt_handle: String,
    /// Message body.
    pub body: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QueueUrlResult {
    queue_url: String,
}

#[derive(Deserialize)]
struct ListQueuesResult {
    #[serde(rename = "queueUrls", default)]
    queue_urls: Option<Vec<String>>,
    #[serde(rename = "NextToken", default)]
    next_token: Option<String>,
}

#[derive(Deserialize)]
struct ReceiveMessageResult {
    #[serde(default)]
    messages: Option<Vec<Message>>,
}

/// SQS operations on top of a signed client.
///
/// ```no_run
/// use fastaws::sqs::{CreateQueueOptions, ReceiveOptions, SqsClient};
///
/// # async fn example<C: fastaws::aws::SignedCall>(client: C) -> fastaws::Result<()> {
/// let sqs = SqsClient::new(client)?;
/// let queue_url = sqs
///     .create_queue("jobs", CreateQueueOptions { wait_seconds: Some(20), ..Default::default() })
///     .await?;
///
/// sqs.send_message(&queue_url, "hello").await?;
/// for message in sqs.receive_messages(&queue_url, ReceiveOptions::default()).await? {
///     sqs.delete_message(&queue_url, &message.receipt_handle).await?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SqsClient<C: SignedCall> {
    inner: C,
}

impl<C: SignedCall> SqsClient<C> {
    /// Wrap a client signing for SQS.
    pub fn new(inner: C) -> Result<Self> {
        ensure_service(&inner, Service::Sqs)?;
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

    /// Get the URL of the queue called `name`.
    pub async fn get_queue_url(&self, name: &str) -> Result<String> {
        let call = Call::new(Method::GET, "GetQueueUrl").with_param("QueueName", name);

        let result: QueueUrlResult = self.request(call).await?;
        Ok(result.queue_url)
    }

    /// List queues, optionally only those whose name starts with `prefix`.
    pub async fn list_queues(&self, prefix: Option<&str>) -> Result<ListQueuesOutput> {
        let call =
            Call::new(Method::GET, "ListQueues").with_optional_param("QueueNamePrefix", prefix);

        let result: ListQueuesResult = self.request(call).await?;
        Ok(ListQueuesOutput {
            queue_urls: result.queue_urls.unwrap_or_default(),
            next_token: result.next_token,
        })
    }

    /// Create a queue, returning its URL.
    pub async fn create_queue(&self, name: &str, options: CreateQueueOptions) -> Result<String> {
        let mut call = Call::new(Method::POST, "CreateQueue").with_param("QueueName", name);
        for (idx, (attr, value)) in options.attributes().into_iter().enumerate() {
            call = call
                .with_param(&format!("Attribute.{}.Name", idx + 1), attr)
                .with_param(&format!("Attribute.{}.Value", idx + 1), value);
        }

        let result: QueueUrlResult = self.request(call).await?;
        debug!("created queue {}", result.queue_url);
        Ok(result.queue_url)
    }

    /// Send a message to the queue at `queue_url`.
    pub async fn send_message(
        &self,
        queue_url: &str,
        body: impl Into<MessageBody>,
    ) -> Result<SendMessageOutput> {
        let call = Call::new(Method::POST, "SendMessage")
            .with_path(&queue_path(queue_url)?)
            .with_param("MessageBody", body.into().render()?);

        self.request(call).await
    }

    /// Receive messages from the queue at `queue_url`.
    ///
    /// Returns an empty list when no message is available.
    pub async fn receive_messages(
        &self,
        queue_url: &str,
        options: ReceiveOptions,
    ) -> Result<Vec<Message>> {
        let call = Call::new(Method::GET, "ReceiveMessage")
            .with_path(&queue_path(queue_url)?)
            .with_optional_param("WaitTimeSeconds", options.wait_seconds)
            .with_optional_param("MaxNumberOfMessages", options.max_messages);

        let result: ReceiveMessageResult = self.request(call).await?;
        Ok(result.messages.unwrap_or_default())
    }

    /// Delete a received message.
    pub async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> Result<()> {
        let call = Call::new(Method::POST, "DeleteMessage")
            .with_path(&queue_path(queue_url)?)
            .with_param("ReceiptHandle", receipt_handle);

        self.execute(call).await.map(|_| ())
    }

    /// Delete the queue at `queue_url`.
    ///
    /// Deletion takes up to 60 seconds, a queue with the same name can't be
    /// created in the meantime.
    pub async fn delete_queue(&self, queue_url: &str) -> Result<()> {
        let call = Call::new(Method::POST, "DeleteQueue").with_path(&queue_path(queue_url)?);

        self.execute(call).await.map(|_| ())
    }

    /// Send `call` and decode `<Action>Response.<Action>Result`.
    async fn request<T: DeserializeOwned>(&self, call: Call) -> Result<T> {
        let action = call.action().to_string();
        let data = self.execute(call).await?;

        let result = data
            .get(format!("{action}Response"))
            .and_then(|v| v.get(format!("{action}Result")))
            .ok_or_else(|| Error::unexpected(format!("{action} response has no result")))?;
        T::deserialize(result).map_err(|e| {
            Error::unexpected(format!("failed to decode {action} result")).with_source(e)
        })
    }

    /// Send `call` and turn error envelopes and failed statuses into errors.
    async fn execute(&self, call: Call) -> Result<Value> {
        let action = call.action().to_string();
        let resp = self
            .inner
            .signed_call(call.with_header(ACCEPT.as_str(), APPLICATION_JSON))
            .await?;

        let status = resp.status();
        let data: Value = if resp.body().is_empty() {
            Value::Null
        } else {
            match serde_json::from_slice(resp.body()) {
                Ok(v) => v,
                Err(e) if status.is_success() => {
                    return Err(Error::unexpected(format!(
                        "failed to decode {action} response"
                    ))
                    .with_source(e))
                }
                Err(_) => Value::Null,
            }
        };

        if let Ok(envelope) = QueryErrorEnvelope::deserialize(&data) {
            error!(
                "{action} failed: status {status}, aws code {}, aws message {}",
                envelope.error.code,
                envelope.error.message.as_deref().unwrap_or_default()
            );
            return Err(upstream_error(
                status,
                Some(&envelope.error.code),
                envelope.error.message.as_deref(),
            ));
        }
        if !status.is_success() {
            error!("{action} failed: status {status}");
            return Err(upstream_error(status, None, None));
        }

        Ok(data)
    }
}
