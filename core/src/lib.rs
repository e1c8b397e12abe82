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

//! Core components for calling AWS services with signed requests.
//!
//! This crate provides the foundational types shared by the fastaws crates:
//! hashing primitives, time formatting, the error taxonomy and the
//! [`Context`] that carries the transport and environment collaborators.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for HTTP transport and environment access
//! - **Transport**: Opens connections ([`HttpSend`] handles) that requests are dispatched through
//! - **Error**: A single error type whose [`ErrorKind`] tells configuration, lifecycle,
//!   transport and upstream failures apart
//!
//! ## Example
//!
//! ```
//! use fastaws_core::{Context, StaticEnv};
//! use std::collections::HashMap;
//!
//! let ctx = Context::new().with_env(StaticEnv {
//!     envs: HashMap::from([("AWS_REGION".to_string(), "us-east-1".to_string())]),
//! });
//!
//! assert_eq!(ctx.env_var("AWS_REGION").as_deref(), Some("us-east-1"));
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
pub use context::Env;
pub use context::HttpSend;
pub use context::NoopEnv;
pub use context::NoopTransport;
pub use context::OsEnv;
pub use context::StaticEnv;
pub use context::Transport;

mod error;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;
