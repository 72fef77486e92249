use std::path::Path;

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::CapshotError;

/// Bucket access used by the pipeline. The production implementation talks to
/// S3; tests swap in an in-memory fake.
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Download `bucket`/`key` into the local file at `dest`.
    async fn fetch(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), CapshotError>;

    /// Upload the local file at `src` to `bucket`/`key` as a private object.
    async fn store(
        &self,
        bucket: &str,
        key: &str,
        src: &Path,
        content_type: &str,
    ) -> Result<(), CapshotError>;
}

pub struct S3Storage {
    client: aws_sdk_s3::Client,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ObjectStorage for S3Storage {
    async fn fetch(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), CapshotError> {
        let mut object = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| CapshotError::Fetch {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        let mut file = File::create(dest).await?;
        while let Some(chunk) =
            object
                .body
                .try_next()
                .await
                .map_err(|err| CapshotError::Fetch {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    message: err.to_string(),
                })?
        {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        src: &Path,
        content_type: &str,
    ) -> Result<(), CapshotError> {
        let body = ByteStream::from_path(src)
            .await
            .map_err(|err| CapshotError::Store {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: err.to_string(),
            })?;
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .acl(ObjectCannedAcl::Private)
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| CapshotError::Store {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&err).to_string(),
            })?;
        Ok(())
    }
}
