//! Best-effort S3 / MinIO archive of exported artifacts.

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;
use uuid::Uuid;

use crate::config::S3Config;
use crate::export::pipeline::Artifact;

#[derive(Clone)]
pub struct ArtifactArchive {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl ArtifactArchive {
    /// Constructs an S3 client configured for MinIO (local) or AWS (production).
    pub async fn connect(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "folio-static",
        );

        let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .endpoint_url(&config.endpoint)
            .load()
            .await;

        Self {
            client: aws_sdk_s3::Client::new(&s3_config),
            bucket: config.bucket.clone(),
        }
    }

    /// Uploads an artifact and returns its object key.
    pub async fn store(&self, document_id: Uuid, artifact: &Artifact) -> Result<String> {
        let key = object_key(document_id, &artifact.file_name);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(artifact.bytes.clone()))
            .content_type(artifact.content_type)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

        info!("Archived export to s3://{}/{}", self.bucket, key);
        Ok(key)
    }
}

pub fn object_key(document_id: Uuid, file_name: &str) -> String {
    format!("exports/{document_id}/{file_name}")
}
