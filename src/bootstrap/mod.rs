//! # Client Bootstrap
//!
//! Turns a service name and a [`ClientConfig`] into a [`ClientHandle`]:
//!
//! 1. Look the service up in the [`registry`]
//! 2. Validate durations, retry attempts and transport options
//! 3. Build the credentials provider (resolved lazily, see [`credentials`])
//! 4. Bind the region
//! 5. Apply call and attempt timeouts plus retry attempts as the override layer
//! 6. Apply the transport options
//!
//! Construction is synchronous and performs no I/O. The first network or
//! filesystem access happens when a handle's credentials are requested.
//!
//! ## Override layer
//!
//! A handle never changes after construction. [`ClientHandle::with_overrides`]
//! returns a *new* handle with a different override layer, so the caller
//! always picks the handle whose settings it wants.

pub mod credentials;
pub mod registry;
pub mod transport;

use std::time::Duration;

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;
use aws_smithy_async::rt::sleep::default_async_sleep;
use aws_smithy_types::timeout::TimeoutConfig;
use serde::Deserialize;

pub use credentials::{ChainLink, CredentialChain, CredentialSource};
pub use registry::{ServiceCategory, ServiceDescriptor, SERVICES};
pub use transport::TransportOptions;

use crate::types::{BootstrapError, BootstrapResult};
use transport::{duration_to_millis, ResolvedTransport};

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_CALL_TIMEOUT_MS: i64 = 12_000;
pub const DEFAULT_CALL_ATTEMPT_TIMEOUT_MS: i64 = 12_000;

/// Everything needed to bootstrap one client.
///
/// Durations are signed millisecond counts so that a negative value coming
/// from a settings file can be reported instead of silently wrapping.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    region: String,
    credential_source: CredentialSource,
    call_timeout_ms: i64,
    call_attempt_timeout_ms: i64,
    max_attempts: Option<u32>,
    transport_options: TransportOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            credential_source: CredentialSource::default(),
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            call_attempt_timeout_ms: DEFAULT_CALL_ATTEMPT_TIMEOUT_MS,
            max_attempts: None,
            transport_options: TransportOptions::default(),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn credential_source(&self) -> &CredentialSource {
        &self.credential_source
    }

    pub fn call_timeout_ms(&self) -> i64 {
        self.call_timeout_ms
    }

    pub fn call_attempt_timeout_ms(&self) -> i64 {
        self.call_attempt_timeout_ms
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    pub fn transport_options(&self) -> &TransportOptions {
        &self.transport_options
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = region.into();
        self
    }

    pub fn credential_source(mut self, source: CredentialSource) -> Self {
        self.config.credential_source = source;
        self
    }

    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.config.call_timeout_ms = duration_to_millis(timeout);
        self
    }

    pub fn call_timeout_ms(mut self, millis: i64) -> Self {
        self.config.call_timeout_ms = millis;
        self
    }

    pub fn call_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.config.call_attempt_timeout_ms = duration_to_millis(timeout);
        self
    }

    pub fn call_attempt_timeout_ms(mut self, millis: i64) -> Self {
        self.config.call_attempt_timeout_ms = millis;
        self
    }

    /// `1` disables retries
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = Some(attempts);
        self
    }

    pub fn transport_options(mut self, options: TransportOptions) -> Self {
        self.config.transport_options = options;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Timeouts and retry attempts layered over a handle's base configuration.
/// Unset fields keep the value of the handle being overridden.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OverrideConfig {
    pub call_timeout_ms: Option<i64>,
    pub call_attempt_timeout_ms: Option<i64>,
    pub max_attempts: Option<u32>,
}

impl OverrideConfig {
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_ms = Some(duration_to_millis(timeout));
        self
    }

    pub fn call_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.call_attempt_timeout_ms = Some(duration_to_millis(timeout));
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResolvedOverrides {
    call_timeout: Duration,
    call_attempt_timeout: Duration,
    max_attempts: Option<u32>,
}

impl ResolvedOverrides {
    fn layer(self, overrides: &OverrideConfig) -> BootstrapResult<Self> {
        let call_timeout = match overrides.call_timeout_ms {
            Some(ms) => millis_to_duration("call_timeout", ms)?,
            None => self.call_timeout,
        };
        let call_attempt_timeout = match overrides.call_attempt_timeout_ms {
            Some(ms) => millis_to_duration("call_attempt_timeout", ms)?,
            None => self.call_attempt_timeout,
        };
        let max_attempts = match overrides.max_attempts {
            Some(attempts) => Some(validate_attempts(attempts)?),
            None => self.max_attempts,
        };
        Ok(Self {
            call_timeout,
            call_attempt_timeout,
            max_attempts,
        })
    }
}

pub(crate) fn millis_to_duration(field: &str, millis: i64) -> BootstrapResult<Duration> {
    u64::try_from(millis)
        .map(Duration::from_millis)
        .map_err(|_| {
            BootstrapError::InvalidConfiguration(format!(
                "{} must not be negative, got {}ms",
                field, millis
            ))
        })
}

fn validate_attempts(attempts: u32) -> BootstrapResult<u32> {
    if attempts == 0 {
        return Err(BootstrapError::InvalidConfiguration(
            "max_attempts must be at least 1".to_string(),
        ));
    }
    Ok(attempts)
}

/// Factory for [`ClientHandle`]s over a fixed service table.
#[derive(Debug, Clone, Copy)]
pub struct ClientBootstrap {
    services: &'static [ServiceDescriptor],
}

impl Default for ClientBootstrap {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBootstrap {
    pub fn new() -> Self {
        Self { services: SERVICES }
    }

    /// Restrict the bootstrap to a custom service table.
    pub fn with_services(services: &'static [ServiceDescriptor]) -> Self {
        Self { services }
    }

    pub fn supports(&self, service_name: &str) -> bool {
        registry::find(self.services, service_name).is_some()
    }

    pub fn create_client(
        &self,
        service_name: &str,
        config: ClientConfig,
    ) -> BootstrapResult<ClientHandle> {
        let service = registry::find(self.services, service_name)
            .ok_or_else(|| BootstrapError::UnsupportedServiceKind(service_name.to_string()))?;

        let region = config.region.trim();
        if region.is_empty() {
            return Err(BootstrapError::InvalidConfiguration(
                "region must not be empty".to_string(),
            ));
        }
        let region = Region::new(region.to_string());

        let overrides = ResolvedOverrides {
            call_timeout: millis_to_duration("call_timeout", config.call_timeout_ms)?,
            call_attempt_timeout: millis_to_duration(
                "call_attempt_timeout",
                config.call_attempt_timeout_ms,
            )?,
            max_attempts: config.max_attempts.map(validate_attempts).transpose()?,
        };
        let transport = config.transport_options.validate()?;

        config.credential_source.validate()?;
        let credentials = config.credential_source.into_provider();

        Ok(ClientHandle::assemble(
            service,
            region,
            credentials,
            transport,
            overrides,
        ))
    }
}

/// Bootstrap `service_name` against the built-in service table.
pub fn create_client(service_name: &str, config: ClientConfig) -> BootstrapResult<ClientHandle> {
    ClientBootstrap::new().create_client(service_name, config)
}

/// A reusable client handle bound to one service.
///
/// Cheap to clone; clones share the credentials provider (and its cache)
/// but nothing mutable.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    service: &'static ServiceDescriptor,
    region: Region,
    credentials: SharedCredentialsProvider,
    transport: ResolvedTransport,
    overrides: ResolvedOverrides,
    sdk_config: SdkConfig,
}

impl ClientHandle {
    fn assemble(
        service: &'static ServiceDescriptor,
        region: Region,
        credentials: SharedCredentialsProvider,
        transport: ResolvedTransport,
        overrides: ResolvedOverrides,
    ) -> Self {
        let timeouts = transport.apply_timeouts(
            TimeoutConfig::builder()
                .operation_timeout(overrides.call_timeout)
                .operation_attempt_timeout(overrides.call_attempt_timeout),
        );
        let retry = match overrides.max_attempts {
            Some(attempts) => RetryConfig::standard().with_max_attempts(attempts),
            None => RetryConfig::standard(),
        };

        let mut builder = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(region.clone())
            .credentials_provider(credentials.clone())
            .timeout_config(timeouts.build())
            .retry_config(retry);
        builder.set_sleep_impl(default_async_sleep());
        let sdk_config = transport.apply(builder).build();

        Self {
            service,
            region,
            credentials,
            transport,
            overrides,
            sdk_config,
        }
    }

    pub fn service(&self) -> &'static ServiceDescriptor {
        self.service
    }

    pub fn region(&self) -> &str {
        self.region.as_ref()
    }

    /// Per-call timeout as applied to the SDK configuration
    pub fn call_timeout(&self) -> Option<Duration> {
        self.sdk_config
            .timeout_config()
            .and_then(|timeouts| timeouts.operation_timeout())
    }

    /// Per-attempt timeout as applied to the SDK configuration
    pub fn call_attempt_timeout(&self) -> Option<Duration> {
        self.sdk_config
            .timeout_config()
            .and_then(|timeouts| timeouts.operation_attempt_timeout())
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.sdk_config.retry_config().map(|retry| retry.max_attempts())
    }

    /// Shared SDK configuration; any service client can be built from it.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.sdk_config
    }

    /// Resolve credentials. This is the first point where a credential chain
    /// touches the environment, the filesystem or the network.
    pub async fn credentials(&self) -> BootstrapResult<Credentials> {
        self.credentials
            .provide_credentials()
            .await
            .map_err(|source| BootstrapError::CredentialResolution {
                service: self.service.id,
                source,
            })
    }

    /// A new handle with `overrides` layered on top of this one's timeouts
    /// and retry attempts. `self` is left untouched.
    pub fn with_overrides(&self, overrides: &OverrideConfig) -> BootstrapResult<ClientHandle> {
        let layered = self.overrides.layer(overrides)?;
        Ok(ClientHandle::assemble(
            self.service,
            self.region.clone(),
            self.credentials.clone(),
            self.transport.clone(),
            layered,
        ))
    }

    pub(crate) fn ensure_service(&self, expected: &'static str) -> BootstrapResult<()> {
        if self.service.id != expected {
            return Err(BootstrapError::ServiceMismatch {
                expected,
                actual: self.service.id,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn explicit_keys() -> CredentialSource {
        CredentialSource::ExplicitKeys {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG".to_string(),
            session_token: None,
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.region(), "us-west-2");
        assert_eq!(config.call_timeout_ms(), 12_000);
        assert_eq!(config.call_attempt_timeout_ms(), 12_000);
        assert_eq!(config.max_attempts(), None);
        assert!(config.transport_options().is_empty());
        assert!(matches!(
            config.credential_source(),
            CredentialSource::ChainDerived { .. }
        ));
    }

    #[test]
    fn test_every_service_bootstraps_with_defaults() {
        for service in SERVICES {
            let handle = assert_ok!(create_client(service.id, ClientConfig::default()));
            assert_eq!(handle.service().id, service.id);
            assert_eq!(handle.region(), DEFAULT_REGION);
        }
    }

    #[test]
    fn test_unknown_service_is_rejected() {
        let err = create_client("not-a-service", ClientConfig::default()).unwrap_err();
        match err {
            BootstrapError::UnsupportedServiceKind(name) => assert_eq!(name, "not-a-service"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_service_lookup_ignores_case() {
        let config = ClientConfig::builder().credential_source(explicit_keys()).build();
        let handle = create_client("S3", config).unwrap();
        assert_eq!(handle.service().id, "s3");
    }

    #[test]
    fn test_timeouts_read_back() {
        let config = ClientConfig::builder()
            .credential_source(explicit_keys())
            .call_timeout(Duration::from_millis(12_000))
            .call_attempt_timeout(Duration::from_millis(12_000))
            .build();
        let handle = create_client("s3", config).unwrap();
        assert_eq!(handle.call_timeout(), Some(Duration::from_millis(12_000)));
        assert_eq!(handle.call_attempt_timeout(), Some(Duration::from_millis(12_000)));
    }

    #[test]
    fn test_negative_call_timeout_is_invalid() {
        let config = ClientConfig::builder()
            .credential_source(explicit_keys())
            .call_timeout_ms(-1)
            .build();
        let err = assert_err!(create_client("s3", config));
        assert!(matches!(err, BootstrapError::InvalidConfiguration(_)));

        let config = ClientConfig::builder()
            .credential_source(explicit_keys())
            .call_attempt_timeout_ms(-1)
            .build();
        assert!(matches!(
            create_client("s3", config),
            Err(BootstrapError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_unsupported_service_reported_before_invalid_config() {
        let config = ClientConfig::builder().call_timeout_ms(-1).build();
        assert!(matches!(
            create_client("nope", config),
            Err(BootstrapError::UnsupportedServiceKind(_))
        ));
    }

    #[test]
    fn test_zero_attempts_and_blank_region_are_invalid() {
        let config = ClientConfig::builder()
            .credential_source(explicit_keys())
            .max_attempts(0)
            .build();
        assert!(matches!(
            create_client("s3", config),
            Err(BootstrapError::InvalidConfiguration(_))
        ));

        let config = ClientConfig::builder()
            .credential_source(explicit_keys())
            .region("   ")
            .build();
        assert!(matches!(
            create_client("s3", config),
            Err(BootstrapError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_attempt_timeout_may_exceed_call_timeout() {
        let config = ClientConfig::builder()
            .credential_source(explicit_keys())
            .call_timeout_ms(1_000)
            .call_attempt_timeout_ms(5_000)
            .build();
        let handle = create_client("sqs", config).unwrap();
        assert_eq!(handle.call_timeout(), Some(Duration::from_secs(1)));
        assert_eq!(handle.call_attempt_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_independent_regions() {
        let west = ClientConfig::builder()
            .credential_source(explicit_keys())
            .region("us-west-2")
            .build();
        let central = ClientConfig::builder()
            .credential_source(explicit_keys())
            .region("eu-central-1")
            .build();

        let a = create_client("s3", west).unwrap();
        let b = create_client("s3", central).unwrap();

        assert_eq!(a.region(), "us-west-2");
        assert_eq!(b.region(), "eu-central-1");
        assert_eq!(
            a.sdk_config().region().map(|r| r.as_ref()),
            Some("us-west-2")
        );
        assert_eq!(
            b.sdk_config().region().map(|r| r.as_ref()),
            Some("eu-central-1")
        );
    }

    #[test]
    fn test_with_overrides_returns_new_handle() {
        let config = ClientConfig::builder()
            .credential_source(explicit_keys())
            .max_attempts(3)
            .build();
        let base = create_client("s3", config).unwrap();

        let overridden = base
            .with_overrides(&OverrideConfig::default().call_timeout(Duration::from_secs(30)))
            .unwrap();

        assert_eq!(overridden.call_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(overridden.call_attempt_timeout(), Some(Duration::from_secs(12)));
        assert_eq!(overridden.max_attempts(), Some(3));
        assert_eq!(overridden.region(), base.region());

        assert_eq!(base.call_timeout(), Some(Duration::from_secs(12)));
    }

    #[test]
    fn test_with_overrides_validates() {
        let config = ClientConfig::builder().credential_source(explicit_keys()).build();
        let base = create_client("s3", config).unwrap();
        let overrides = OverrideConfig {
            call_attempt_timeout_ms: Some(-10),
            ..Default::default()
        };
        assert!(matches!(
            base.with_overrides(&overrides),
            Err(BootstrapError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_transport_options_applied() {
        let config = ClientConfig::builder()
            .credential_source(explicit_keys())
            .transport_options(
                TransportOptions::default()
                    .connect_timeout(Duration::from_secs(3))
                    .use_fips(true)
                    .endpoint_url("http://localhost:9000"),
            )
            .build();
        let handle = create_client("s3", config).unwrap();
        let sdk = handle.sdk_config();
        assert_eq!(
            sdk.timeout_config().and_then(|t| t.connect_timeout()),
            Some(Duration::from_secs(3))
        );
        assert_eq!(sdk.use_fips(), Some(true));
        assert_eq!(sdk.endpoint_url(), Some("http://localhost:9000"));
    }

    #[tokio::test]
    async fn test_explicit_keys_resolve_at_first_use() {
        let config = ClientConfig::builder().credential_source(explicit_keys()).build();
        let handle = create_client("s3", config).unwrap();
        let credentials = handle.credentials().await.unwrap();
        assert_eq!(credentials.access_key_id(), "AKIDEXAMPLE");
    }

    #[tokio::test]
    async fn test_empty_chain_fails_only_at_first_use() {
        let config = ClientConfig::builder()
            .credential_source(CredentialSource::ChainDerived { links: vec![] })
            .build();
        let handle = assert_ok!(create_client("s3", config));
        let err = handle.credentials().await.unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::CredentialResolution { service: "s3", .. }
        ));
    }

    #[test]
    fn test_custom_service_table() {
        static ONLY_QUEUES: &[ServiceDescriptor] = &[ServiceDescriptor {
            id: "sqs",
            display_name: "Amazon Simple Queue Service",
            category: ServiceCategory::Messaging,
        }];
        let bootstrap = ClientBootstrap::with_services(ONLY_QUEUES);
        assert!(bootstrap.supports("sqs"));
        assert!(!bootstrap.supports("s3"));
        assert!(matches!(
            bootstrap.create_client("s3", ClientConfig::default()),
            Err(BootstrapError::UnsupportedServiceKind(_))
        ));
    }
}
