// Typed S3 client built from a bootstrapped handle

use aws_sdk_s3::config::Region;

use crate::bootstrap::ClientHandle;
use crate::types::BootstrapResult;

pub const S3_SERVICE_ID: &str = "s3";

#[derive(Debug, Clone)]
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Build an S3 client from an `s3` handle. Fails with `ServiceMismatch`
    /// for handles bound to any other service.
    pub fn from_handle(handle: &ClientHandle) -> BootstrapResult<Self> {
        handle.ensure_service(S3_SERVICE_ID)?;
        Ok(Self {
            inner: aws_sdk_s3::Client::new(handle.sdk_config()),
        })
    }

    pub fn region(&self) -> Option<&Region> {
        self.inner.config().region()
    }

    /// The underlying SDK client, for issuing requests
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }
}
