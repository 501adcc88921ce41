use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    presigning::PresigningConfig,
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use tracing::debug;

use crate::config::StorageConfig;

/// Object storage that receives uploaded account files under a caller-chosen key.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String>;
}

/// Joins an optional bucket prefix and a caller key with exactly one `/`.
fn object_key(prefix: Option<&str>, key: &str) -> String {
    match prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        Some(prefix) => format!("{}/{}", prefix, key.trim_start_matches('/')),
        None => key.to_string(),
    }
}

/// S3 / MinIO bucket. Keys handed in by callers are stored below `key_prefix`,
/// so several deployments can share one bucket.
#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
    key_prefix: Option<String>,
}

impl Storage {
    pub async fn new(cfg: &StorageConfig) -> anyhow::Result<Self> {
        anyhow::ensure!(!cfg.bucket.is_empty(), "S3 bucket name is empty");

        let credentials =
            Credentials::new(&cfg.access_key, &cfg.secret_key, None, None, "profiles-env");
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        // MinIO serves buckets by path, not by virtual host
        let conf = S3ConfigBuilder::from(&shared).force_path_style(true).build();

        debug!(endpoint = %cfg.endpoint, bucket = %cfg.bucket, "object storage configured");
        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
            key_prefix: cfg.key_prefix.clone(),
        })
    }

    fn full_key(&self, key: &str) -> String {
        object_key(self.key_prefix.as_deref(), key)
    }
}

#[async_trait]
impl StorageClient for Storage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        let full = self.full_key(key);
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&full)
            .content_type(content_type)
            .content_length(size as i64)
            .body(ByteStream::from(body))
            .send()
            .await
            .with_context(|| format!("upload {} to bucket {}", full, self.bucket))?;
        debug!(key = %full, size, content_type, "object stored");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        let full = self.full_key(key);
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&full)
            .send()
            .await
            .with_context(|| format!("delete {} from bucket {}", full, self.bucket))?;
        debug!(key = %full, "object deleted");
        Ok(())
    }

    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String> {
        let full = self.full_key(key);
        let expires = PresigningConfig::expires_in(Duration::from_secs(seconds))
            .with_context(|| format!("presign lifetime of {}s", seconds))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&full)
            .presigned(expires)
            .await
            .with_context(|| format!("presign {}", full))?;
        Ok(request.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::object_key;

    #[test]
    fn key_without_prefix_is_unchanged() {
        assert_eq!(object_key(None, "user_1/me.png"), "user_1/me.png");
        assert_eq!(object_key(Some(""), "user_1/me.png"), "user_1/me.png");
        assert_eq!(object_key(Some("/"), "temp/me.png"), "temp/me.png");
    }

    #[test]
    fn prefix_is_joined_with_single_slash() {
        assert_eq!(object_key(Some("avatars"), "user_1/me.png"), "avatars/user_1/me.png");
        assert_eq!(object_key(Some("/avatars/"), "user_1/me.png"), "avatars/user_1/me.png");
        assert_eq!(object_key(Some("prod/avatars"), "/temp/a.png"), "prod/avatars/temp/a.png");
    }
}
