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

use crate::constants::TERMINATOR;
use fastaws_core::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// AWS services this crate knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Service {
    /// Simple Storage Service.
    S3,
    /// Simple Email Service.
    Ses,
    /// Simple Queue Service.
    Sqs,
}

impl Service {
    /// Name used in the credential scope.
    pub fn signing_name(&self) -> &'static str {
        match self {
            Service::S3 => "s3",
            Service::Ses => "ses",
            Service::Sqs => "sqs",
        }
    }

    /// Version of the service's query API, sent as the `Version` parameter.
    pub fn api_version(&self) -> &'static str {
        match self {
            Service::S3 => "2006-03-01",
            Service::Ses => "2010-12-01",
            Service::Sqs => "2012-11-05",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.signing_name())
    }
}

impl FromStr for Service {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "s3" => Ok(Service::S3),
            "ses" => Ok(Service::Ses),
            "sqs" => Ok(Service::Sqs),
            v => Err(Error::config_invalid(format!("unsupported service: {v}"))),
        }
    }
}

/// Domain serving the S3 compatible API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum S3Provider {
    /// `s3.<region>.amazonaws.com`
    #[default]
    Amazonaws,
    /// `s3.<region>.wasabisys.com`
    Wasabisys,
}

impl S3Provider {
    fn domain(&self) -> &'static str {
        match self {
            S3Provider::Amazonaws => "amazonaws",
            S3Provider::Wasabisys => "wasabisys",
        }
    }
}

/// Region and service a client talks to.
///
/// Decides the default host and the credential scope of every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionService {
    region: String,
    service: Service,
    s3_provider: S3Provider,
}

impl RegionService {
    /// Create a new RegionService.
    ///
    /// Region must be a non-empty code made of lowercase letters, digits and `-`.
    pub fn new(region: &str, service: Service) -> Result<Self> {
        if region.is_empty() {
            return Err(Error::config_invalid("region must not be empty"));
        }
        if !region
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(Error::config_invalid(format!("invalid region: {region}")));
        }

        Ok(Self {
            region: region.to_string(),
            service,
            s3_provider: S3Provider::default(),
        })
    }

    /// Set the provider used to build S3 hosts.
    pub fn with_s3_provider(mut self, provider: S3Provider) -> Self {
        self.s3_provider = provider;
        self
    }

    /// Region code, for example `us-east-1`.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The service.
    pub fn service(&self) -> Service {
        self.service
    }

    /// Default host for this region and service.
    pub fn host(&self) -> String {
        match self.service {
            Service::S3 => format!("s3.{}.{}.com", self.region, self.s3_provider.domain()),
            Service::Ses => format!("email.{}.amazonaws.com", self.region),
            Service::Sqs => format!("sqs.{}.amazonaws.com", self.region),
        }
    }

    /// Credential scope for the given date stamp.
    ///
    /// Scope: "20220313/<region>/<service>/aws4_request"
    pub fn scope(&self, date: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            date,
            self.region,
            self.service.signing_name(),
            TERMINATOR
        )
    }
}
