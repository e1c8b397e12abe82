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
use fastaws_core::{Error, Result};
use http::Method;
use serde::Serialize;
use serde_json::{Map, Value};

/// Value of a query parameter.
///
/// Strings are percent-encoded when rendered, numbers and booleans are
/// rendered as their literal form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// A string value.
    Str(String),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A boolean, rendered as `true` or `false`.
    Bool(bool),
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Str(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Str(v)
    }
}

impl From<&String> for QueryValue {
    fn from(v: &String) -> Self {
        QueryValue::Str(v.clone())
    }
}

impl From<i32> for QueryValue {
    fn from(v: i32) -> Self {
        QueryValue::Int(v.into())
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        QueryValue::Int(v)
    }
}

impl From<u32> for QueryValue {
    fn from(v: u32) -> Self {
        QueryValue::UInt(v.into())
    }
}

impl From<u64> for QueryValue {
    fn from(v: u64) -> Self {
        QueryValue::UInt(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

/// Body of a call.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    /// No body, hashed as the empty string.
    #[default]
    Empty,
    /// UTF-8 text.
    Text(String),
    /// A JSON document, sent in its compact form with object keys sorted.
    Json(Value),
    /// Raw bytes.
    Bytes(Bytes),
}

impl Payload {
    /// Build a JSON payload from any serializable value.
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value).map_err(|e| {
            Error::config_invalid("payload is not representable as JSON").with_source(e)
        })?;
        Ok(Payload::Json(value))
    }

    /// The exact bytes that are hashed and sent.
    pub fn to_bytes(&self) -> Result<Bytes> {
        match self {
            Payload::Empty => Ok(Bytes::new()),
            Payload::Text(s) => Ok(Bytes::from(s.clone())),
            Payload::Json(v) => {
                let bs = serde_json::to_vec(&sort_keys(v)).map_err(|e| {
                    Error::config_invalid("failed to serialize JSON payload").with_source(e)
                })?;
                Ok(Bytes::from(bs))
            }
            Payload::Bytes(bs) => Ok(bs.clone()),
        }
    }
}

/// Rebuild objects with their keys in sorted order.
///
/// `serde_json::Map` keeps insertion order once `preserve_order` is enabled
/// anywhere in the dependency graph, so the order is fixed here instead.
fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys = map.keys().collect::<Vec<_>>();
            keys.sort();

            let mut sorted = Map::with_capacity(map.len());
            for k in keys {
                sorted.insert(k.clone(), sort_keys(&map[k]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        v => v.clone(),
    }
}

/// Which `Version` parameter a call carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ApiVersion {
    /// The query API version of the client's service.
    #[default]
    ServiceDefault,
    /// An explicit `YYYY-MM-DD` version.
    Fixed(String),
    /// No `Version` parameter at all.
    Omitted,
}

/// A single signed call, as issued by a service wrapper.
///
/// ```
/// use fastaws_aws_v4::Call;
/// use http::Method;
///
/// let call = Call::new(Method::GET, "ReceiveMessage")
///     .with_path("/123456789012/my-queue")
///     .with_param("MaxNumberOfMessages", 10)
///     .with_optional_param("WaitTimeSeconds", None::<u32>);
/// ```
#[derive(Debug, Clone)]
pub struct Call {
    pub(crate) method: Method,
    pub(crate) action: String,
    pub(crate) host: Option<String>,
    pub(crate) path: String,
    pub(crate) params: Vec<(String, Option<QueryValue>)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) payload: Payload,
    pub(crate) version: ApiVersion,
}

impl Call {
    /// Create a call of `action` against `/`.
    pub fn new(method: Method, action: &str) -> Self {
        Self {
            method,
            action: action.to_string(),
            host: None,
            path: "/".to_string(),
            params: Vec::new(),
            headers: Vec::new(),
            payload: Payload::Empty,
            version: ApiVersion::ServiceDefault,
        }
    }

    /// Set the already percent-normalized path; an empty path means `/`.
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        };
        self
    }

    /// Send this call to `host` instead of the client's default host.
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    /// Add a query parameter.
    pub fn with_param(mut self, key: &str, value: impl Into<QueryValue>) -> Self {
        self.params.push((key.to_string(), Some(value.into())));
        self
    }

    /// Add a query parameter that is omitted entirely when `value` is `None`.
    pub fn with_optional_param<V: Into<QueryValue>>(mut self, key: &str, value: Option<V>) -> Self {
        self.params.push((key.to_string(), value.map(Into::into)));
        self
    }

    /// Add an extra header.
    ///
    /// Extra headers are sent but not signed, and replace signing headers of the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Set the body.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Send an explicit `Version` parameter.
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = ApiVersion::Fixed(version.to_string());
        self
    }

    /// Send no `Version` parameter.
    pub fn without_version(mut self) -> Self {
        self.version = ApiVersion::Omitted;
        self
    }

    /// The action of this call.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The HTTP method of this call.
    pub fn method(&self) -> &Method {
        &self.method
    }
}
