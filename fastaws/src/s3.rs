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

//! Amazon S3 (and S3 compatible providers).

use crate::response::{ensure_service, upstream_error};
use bytes::Bytes;
use fastaws_aws_v4::{Call, Payload, Service, SignedCall, X_AMZ_ACL};
use fastaws_core::{Error, Result};
use http::header::ETAG;
use http::Method;
use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// - URI encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
/// - The forward slash separates key segments and is kept.
static AWS_URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Owner of the buckets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Owner {
    /// Canonical user id.
    #[serde(rename = "ID")]
    pub id: String,
    /// Display name, not returned in every region.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A bucket as listed by `ListBuckets`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Bucket {
    /// Bucket name.
    pub name: String,
    /// Creation time, for example `2019-12-11T23:32:47.000Z`.
    pub creation_date: String,
}

/// Output of [`S3Client::list_buckets`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBucketsOutput {
    /// Owner of the listed buckets.
    pub owner: Option<Owner>,
    /// All buckets of the owner.
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListAllMyBucketsResult {
    #[serde(default)]
    owner: Option<Owner>,
    #[serde(default)]
    buckets: BucketList,
}

#[derive(Debug, Default, Deserialize)]
struct BucketList {
    #[serde(rename = "Bucket", default)]
    bucket: Vec<Bucket>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct S3Error {
    code: String,
    #[serde(default)]
    message: Option<String>,
}

/// Canned ACL sent as `x-amz-acl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectAcl {
    /// `private`
    Private,
    /// `public-read`
    PublicRead,
    /// `public-read-write`
    PublicReadWrite,
    /// `authenticated-read`
    AuthenticatedRead,
    /// `bucket-owner-read`
    BucketOwnerRead,
    /// `bucket-owner-full-control`
    BucketOwnerFullControl,
}

impl ObjectAcl {
    /// Header value of this ACL.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectAcl::Private => "private",
            ObjectAcl::PublicRead => "public-read",
            ObjectAcl::PublicReadWrite => "public-read-write",
            ObjectAcl::AuthenticatedRead => "authenticated-read",
            ObjectAcl::BucketOwnerRead => "bucket-owner-read",
            ObjectAcl::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }
}

/// Output of [`S3Client::put_object`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectOutput {
    /// `ETag` of the stored object, if the service returned one.
    pub e_tag: Option<String>,
}

/// S3 operations on top of a signed client.
///
/// ```no_run
/// use fastaws::aws::{Client, Config, Service};
/// use fastaws::s3::{ObjectAcl, S3Client};
///
/// # async fn example(ctx: fastaws::Context) -> fastaws::Result<()> {
/// let config = Config::default().from_env(&ctx);
/// let mut client = Client::from_config(ctx, Service::S3, &config)?;
/// client.connect().await?;
///
/// let s3 = S3Client::new(client)?;
/// s3.put_object("my-bucket", "hello.txt", "Hello, World!", Some(ObjectAcl::Private))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct S3Client<C: SignedCall> {
    inner: C,
}

impl<C: SignedCall> S3Client<C> {
    /// Wrap a client signing for S3.
    pub fn new(inner: C) -> Result<Self> {
        ensure_service(&inner, Service::S3)?;
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

    /// List all buckets owned by the caller.
    pub async fn list_buckets(&self) -> Result<ListBucketsOutput> {
        let resp = self.send(Call::new(Method::GET, "ListBuckets")).await?;

        let result: ListAllMyBucketsResult = parse_xml(resp.body())?;
        Ok(ListBucketsOutput {
            owner: result.owner,
            buckets: result.buckets.bucket,
        })
    }

    /// Upload `body` as `key` into `bucket`.
    ///
    /// The request goes to the virtual-hosted bucket host, `<bucket>.<host>`.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: impl Into<Bytes>,
        acl: Option<ObjectAcl>,
    ) -> Result<PutObjectOutput> {
        validate_bucket(bucket)?;
        let key = key.trim_start_matches('/');
        if key.is_empty() {
            return Err(Error::config_invalid("object key must not be empty"));
        }

        let mut call = Call::new(Method::PUT, "PutObject")
            .with_host(&format!("{bucket}.{}", self.inner.host()))
            .with_path(&format!("/{}", utf8_percent_encode(key, &AWS_URI_ENCODE_SET)))
            .with_payload(Payload::Bytes(body.into()));
        if let Some(acl) = acl {
            call = call.with_header(X_AMZ_ACL, acl.as_str());
        }

        let resp = self.send(call).await?;
        let e_tag = resp
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        Ok(PutObjectOutput { e_tag })
    }

    /// Upload the local file at `path` as `key` into `bucket`.
    ///
    /// The file is read in full; its bytes are both hashed and sent.
    pub async fn put_object_from_file(
        &self,
        bucket: &str,
        key: &str,
        path: impl AsRef<Path>,
        acl: Option<ObjectAcl>,
    ) -> Result<PutObjectOutput> {
        let path = path.as_ref();
        let body = tokio::fs::read(path).await.map_err(|e| {
            Error::unexpected(format!("failed to read file {}", path.display())).with_source(e)
        })?;
        debug!("read {} bytes from {}", body.len(), path.display());

        self.put_object(bucket, key, body, acl).await
    }

    async fn send(&self, call: Call) -> Result<http::Response<Bytes>> {
        let action = call.action().to_string();
        let resp = self.inner.signed_call(call).await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let err = match parse_xml::<S3Error>(resp.body()) {
            Ok(e) => upstream_error(status, Some(&e.code), e.message.as_deref()),
            Err(_) => upstream_error(status, None, None),
        };
        debug!("{action} failed: {err}");
        Err(err)
    }
}

/// Check `bucket` against the S3 naming rules: 3 to 63 characters of
/// lowercase letters, digits, `.` and `-`, starting and ending with a
/// letter or digit.
fn validate_bucket(bucket: &str) -> Result<()> {
    let edge = |b: Option<&u8>| b.is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    let valid = (3..=63).contains(&bucket.len())
        && bucket
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'.' || b == b'-')
        && edge(bucket.as_bytes().first())
        && edge(bucket.as_bytes().last());

    if !valid {
        return Err(Error::config_invalid(format!("invalid bucket: {bucket}")));
    }
    Ok(())
}

fn parse_xml<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    quick_xml::de::from_reader(body)
        .map_err(|e| Error::unexpected("failed to decode XML response").with_source(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSignedCall;
    use fastaws_core::ErrorKind;
    use http::StatusCode;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use test_case::test_case;

    const LIST_BUCKETS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListAllMyBucketsResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Owner>
    <ID>bcaf1ffd86f41161ca5fb16fd081034f</ID>
    <DisplayName>webfile</DisplayName>
  </Owner>
  <Buckets>
    <Bucket>
      <Name>DOC-EXAMPLE-BUCKET</Name>
      <CreationDate>2019-12-11T23:32:47+00:00</CreationDate>
    </Bucket>
    <Bucket>
      <Name>DOC-EXAMPLE-BUCKET2</Name>
      <CreationDate>2019-11-10T23:32:13+00:00</CreationDate>
    </Bucket>
  </Buckets>
</ListAllMyBucketsResult>"#;

    #[tokio::test]
    async fn test_list_buckets() -> Result<()> {
        let s3 =
            S3Client::new(MockSignedCall::new(Service::S3).respond(StatusCode::OK, LIST_BUCKETS))?;

        let output = s3.list_buckets().await?;
        assert_eq!(
            output.owner,
            Some(Owner {
                id: "bcaf1ffd86f41161ca5fb16fd081034f".to_string(),
                display_name: Some("webfile".to_string()),
            })
        );
        assert_eq!(
            output.buckets,
            vec![
                Bucket {
                    name: "DOC-EXAMPLE-BUCKET".to_string(),
                    creation_date: "2019-12-11T23:32:47+00:00".to_string(),
                },
                Bucket {
                    name: "DOC-EXAMPLE-BUCKET2".to_string(),
                    creation_date: "2019-11-10T23:32:13+00:00".to_string(),
                },
            ]
        );

        let req = s3.get_ref().last();
        assert_eq!(req.method(), Method::GET);
        assert_eq!(
            req.url(),
            "https://s3.us-east-1.amazonaws.com/?Action=ListBuckets&Version=2006-03-01"
        );
        assert!(req.authorization().expect("authorization must exist").ends_with(
            "Signature=a1d52036de5c4885c9915075df847d74d7de8a4eb3121d74d7a1ad189eaafc1c"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_buckets_empty() -> Result<()> {
        let s3 = S3Client::new(MockSignedCall::new(Service::S3).respond(
            StatusCode::OK,
            r#"<ListAllMyBucketsResult><Owner><ID>abc</ID></Owner><Buckets></Buckets></ListAllMyBucketsResult>"#,
        ))?;

        let output = s3.list_buckets().await?;
        assert!(output.buckets.is_empty());
        assert_eq!(output.owner.map(|o| o.id), Some("abc".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_error_envelope() -> Result<()> {
        let s3 = S3Client::new(MockSignedCall::new(Service::S3).respond(
            StatusCode::FORBIDDEN,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>SignatureDoesNotMatch</Code><Message>The request signature we calculated does not match the signature you provided.</Message><RequestId>4442587FB7D0A2F9</RequestId></Error>"#,
        ))?;

        let err = s3.list_buckets().await.expect_err("403 must fail");
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.code(), Some("SignatureDoesNotMatch"));
        assert!(!err.is_temporary());
        Ok(())
    }

    #[tokio::test]
    async fn test_slow_down_is_temporary() -> Result<()> {
        let s3 = S3Client::new(MockSignedCall::new(Service::S3).respond(
            StatusCode::SERVICE_UNAVAILABLE,
            "<Error><Code>SlowDown</Code><Message>Please reduce your request rate.</Message></Error>",
        ))?;

        let err = s3.list_buckets().await.expect_err("503 must fail");
        assert_eq!(err.code(), Some("SlowDown"));
        assert!(err.is_temporary());
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_body_is_unexpected() -> Result<()> {
        // `CreationDate` is required.
        let s3 = S3Client::new(MockSignedCall::new(Service::S3).respond(
            StatusCode::OK,
            "<ListAllMyBucketsResult><Buckets><Bucket><Name>a</Name></Bucket></Buckets></ListAllMyBucketsResult>",
        ))?;

        let err = s3.list_buckets().await.expect_err("garbage must fail");
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        Ok(())
    }

    #[tokio::test]
    async fn test_put_object() -> Result<()> {
        let mut resp = http::Response::new(Bytes::new());
        resp.headers_mut().insert(
            ETAG,
            "\"65a8e27d8879283831b664bd8b7f0ad4\""
                .parse()
                .expect("must be valid"),
        );
        let s3 = S3Client::new(MockSignedCall::new(Service::S3).respond_with(resp))?;

        let output = s3
            .put_object(
                "my-bucket",
                "dir/hello world.txt",
                "Hello, World!",
                Some(ObjectAcl::PublicRead),
            )
            .await?;
        assert_eq!(
            output.e_tag.as_deref(),
            Some("\"65a8e27d8879283831b664bd8b7f0ad4\"")
        );

        let req = s3.get_ref().last();
        assert_eq!(req.method(), Method::PUT);
        assert_eq!(
            req.url(),
            "https://my-bucket.s3.us-east-1.amazonaws.com/dir/hello%20world.txt?Action=PutObject&Version=2006-03-01"
        );
        assert_eq!(req.headers()[X_AMZ_ACL], "public-read");
        assert_eq!(req.body().as_ref(), b"Hello, World!");
        Ok(())
    }

    #[tokio::test]
    async fn test_put_object_from_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new().expect("temp file must be created");
        file.write_all(b"Hello, World!")
            .expect("temp file must be written");
        let s3 = S3Client::new(MockSignedCall::new(Service::S3))?;

        s3.put_object_from_file("my-bucket", "hello.txt", file.path(), None)
            .await?;

        let req = s3.get_ref().last();
        assert_eq!(
            req.url(),
            "https://my-bucket.s3.us-east-1.amazonaws.com/hello.txt?Action=PutObject&Version=2006-03-01"
        );
        assert_eq!(req.body().as_ref(), b"Hello, World!");
        assert_eq!(
            req.headers()["x-amz-content-sha256"],
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_put_object_from_missing_file() -> Result<()> {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let s3 = S3Client::new(MockSignedCall::new(Service::S3))?;

        let err = s3
            .put_object_from_file("my-bucket", "a.txt", dir.path().join("missing"), None)
            .await
            .expect_err("missing file must fail");
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert!(s3.get_ref().sent().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_put_object_without_acl() -> Result<()> {
        let s3 = S3Client::new(MockSignedCall::new(Service::S3))?;

        let output = s3
            .put_object("my-bucket", "/a.txt", Bytes::new(), None)
            .await?;
        assert_eq!(output.e_tag, None);

        let req = s3.get_ref().last();
        assert!(req
            .url()
            .starts_with("https://my-bucket.s3.us-east-1.amazonaws.com/a.txt?"));
        assert!(req.headers().get(X_AMZ_ACL).is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_put_object_invalid_input() -> Result<()> {
        let s3 = S3Client::new(MockSignedCall::new(Service::S3))?;

        let err = s3
            .put_object("", "a.txt", "x", None)
            .await
            .expect_err("empty bucket must fail");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let err = s3
            .put_object("bucket", "/", "x", None)
            .await
            .expect_err("empty key must fail");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(s3.get_ref().sent().is_empty());
        Ok(())
    }

    #[test_case("evil.example?"; "query delimiter")]
    #[test_case("evil.example/x"; "path delimiter")]
    #[test_case("user@evil"; "userinfo")]
    #[test_case("My-Bucket"; "uppercase")]
    #[test_case("ab"; "too short")]
    #[test_case("-bucket"; "leading hyphen")]
    #[test_case("bucket."; "trailing dot")]
    #[tokio::test]
    async fn test_put_object_rejects_bucket(bucket: &str) -> Result<()> {
        let s3 = S3Client::new(MockSignedCall::new(Service::S3))?;

        let err = s3
            .put_object(bucket, "a.txt", "x", None)
            .await
            .expect_err("invalid bucket must fail");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(s3.get_ref().sent().is_empty());
        Ok(())
    }

    #[test_case("my-bucket"; "hyphen")]
    #[test_case("logs.example.com"; "dotted")]
    #[test_case("abc"; "shortest")]
    fn test_valid_bucket(bucket: &str) {
        assert!(validate_bucket(bucket).is_ok());
    }

    #[test]
    fn test_wrong_service_is_rejected() {
        let err =
            S3Client::new(MockSignedCall::new(Service::Sqs)).expect_err("sqs client must fail");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }
}
