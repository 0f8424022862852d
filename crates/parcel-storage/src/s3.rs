use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder, S3ConditionalPut};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStore, PutMode, PutOptions, PutPayload,
    Result as ObjectResult,
};

const CACHE_CONTROL: &str = "max-age=3600";

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    public_base_url: Option<String>,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Create-only writes rely on conditional PUT (If-None-Match).
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone())
            .with_conditional_put(S3ConditionalPut::ETagMatch);

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
            public_base_url: None,
        })
    }

    /// Serve objects from `base_url` instead of the bucket's own address
    /// (e.g. a CDN or `{project}/storage/v1/object/public/{bucket}`).
    pub fn with_public_base_url(mut self, base_url: Option<String>) -> Self {
        self.public_base_url = base_url;
        self
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn create_with_key(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<String> {
        let size = data.len() as u64;
        let location = Path::from(storage_key.to_string());

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        attributes.insert(Attribute::CacheControl, CACHE_CONTROL.into());
        let options = PutOptions {
            mode: PutMode::Create,
            attributes,
            ..Default::default()
        };

        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(data), options)
            .await;

        result.map_err(|e| match e {
            ObjectStoreError::AlreadyExists { .. } => {
                StorageError::AlreadyExists(storage_key.to_string())
            }
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %storage_key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(other.to_string())
            }
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(self.public_url(storage_key))
    }

    /// For AWS S3: `https://{bucket}.s3.{region}.amazonaws.com/{key}`.
    /// For S3-compatible providers: path-style `{endpoint}/{bucket}/{key}`.
    fn public_url(&self, storage_key: &str) -> String {
        if let Some(ref base) = self.public_base_url {
            format!("{}/{}", base.trim_end_matches('/'), storage_key)
        } else if let Some(ref endpoint) = self.endpoint_url {
            format!(
                "{}/{}/{}",
                endpoint.trim_end_matches('/'),
                self.bucket,
                storage_key
            )
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, storage_key
            )
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
