//! Object storage access
//!
//! The daemon consumes storage through the [`ObjectStore`] trait so the
//! playback loop and catalog can be exercised against in-memory fakes.
//! The production implementation talks S3 to MinIO (or real S3) through
//! the AWS SDK with a custom endpoint.

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::Client;
use tracing::{debug, info};

/// Storage capability used by the radio core: list and fetch objects
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// All object keys in `bucket`. An empty bucket yields an empty vec.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>>;

    /// Whole-object fetch of `bucket`/`key`
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}

/// Token for the next listing page, if there is one.
///
/// A truncated response without a continuation token ends the walk;
/// re-issuing the request unchanged would fetch the first page forever.
fn next_page_token(truncated: Option<bool>, token: Option<&str>) -> Option<String> {
    if truncated == Some(true) {
        token.map(|s| s.to_string())
    } else {
        None
    }
}

/// S3-backed object store (MinIO in the standard deployment)
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Build a client from storage configuration.
    ///
    /// MinIO requires path-style addressing, so it is forced whenever a
    /// custom endpoint is configured.
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        config.validate()?;

        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "aircast-config",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);

        let force_path_style = config.endpoint_url.is_some();
        if let Some(endpoint) = &config.endpoint_url {
            let normalized = endpoint.trim_end_matches('/').to_string();
            info!("Using custom S3 endpoint: {}", normalized);
            loader = loader.endpoint_url(normalized);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(force_path_style)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self.client.list_objects_v2().bucket(bucket);
            if let Some(token) = continuation_token.take() {
                req = req.continuation_token(token);
            }

            let resp = req
                .send()
                .await
                .map_err(|e| Error::Storage(format!("list {}: {}", bucket, e)))?;

            for obj in resp.contents() {
                if let Some(key) = obj.key() {
                    keys.push(key.to_string());
                }
            }

            continuation_token =
                next_page_token(resp.is_truncated(), resp.next_continuation_token());
            if continuation_token.is_none() {
                break;
            }
        }

        debug!(bucket, count = keys.len(), "listed objects");
        Ok(keys)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("get {}/{}: {}", bucket, key, e)))?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| Error::Storage(format!("read {}/{}: {}", bucket, key, e)))?;

        Ok(data.into_bytes().to_vec())
    }
}
