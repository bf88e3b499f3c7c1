//! Transport Options
//!
//! Connection-level toggles applied on top of the SDK's transport defaults.

use std::time::Duration;

use aws_smithy_types::timeout::TimeoutConfigBuilder;
use aws_types::sdk_config::Builder as SdkConfigBuilder;
use serde::Deserialize;

use super::millis_to_duration;
use crate::types::{BootstrapError, BootstrapResult};

/// Connection-level settings. Every field is optional and unset by default,
/// leaving the SDK's own transport defaults in place.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransportOptions {
    connect_timeout_ms: Option<i64>,
    read_timeout_ms: Option<i64>,
    use_fips: Option<bool>,
    use_dual_stack: Option<bool>,
    endpoint_url: Option<String>,
}

impl TransportOptions {
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(duration_to_millis(timeout));
        self
    }

    pub fn connect_timeout_ms(mut self, millis: i64) -> Self {
        self.connect_timeout_ms = Some(millis);
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = Some(duration_to_millis(timeout));
        self
    }

    pub fn read_timeout_ms(mut self, millis: i64) -> Self {
        self.read_timeout_ms = Some(millis);
        self
    }

    pub fn use_fips(mut self, enabled: bool) -> Self {
        self.use_fips = Some(enabled);
        self
    }

    pub fn use_dual_stack(mut self, enabled: bool) -> Self {
        self.use_dual_stack = Some(enabled);
        self
    }

    /// Send requests to a fixed endpoint, e.g. a local S3-compatible store
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn validate(&self) -> BootstrapResult<ResolvedTransport> {
        let connect_timeout = self
            .connect_timeout_ms
            .map(|ms| millis_to_duration("connect_timeout", ms))
            .transpose()?;
        let read_timeout = self
            .read_timeout_ms
            .map(|ms| millis_to_duration("read_timeout", ms))
            .transpose()?;

        if let Some(url) = &self.endpoint_url {
            let url = url.trim();
            let has_host = url
                .strip_prefix("https://")
                .or_else(|| url.strip_prefix("http://"))
                .is_some_and(|rest| !rest.is_empty());
            if !has_host {
                return Err(BootstrapError::InvalidConfiguration(format!(
                    "endpoint_url must be an http(s) URL, got {:?}",
                    url
                )));
            }
        }

        Ok(ResolvedTransport {
            connect_timeout,
            read_timeout,
            use_fips: self.use_fips,
            use_dual_stack: self.use_dual_stack,
            endpoint_url: self.endpoint_url.as_ref().map(|u| u.trim().to_string()),
        })
    }
}

/// Validated transport options, ready to be applied to SDK builders.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedTransport {
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    use_fips: Option<bool>,
    use_dual_stack: Option<bool>,
    endpoint_url: Option<String>,
}

impl ResolvedTransport {
    pub(crate) fn apply_timeouts(&self, mut timeouts: TimeoutConfigBuilder) -> TimeoutConfigBuilder {
        if let Some(timeout) = self.connect_timeout {
            timeouts = timeouts.connect_timeout(timeout);
        }
        if let Some(timeout) = self.read_timeout {
            timeouts = timeouts.read_timeout(timeout);
        }
        timeouts
    }

    pub(crate) fn apply(&self, mut builder: SdkConfigBuilder) -> SdkConfigBuilder {
        if let Some(enabled) = self.use_fips {
            builder = builder.use_fips(enabled);
        }
        if let Some(enabled) = self.use_dual_stack {
            builder = builder.use_dual_stack(enabled);
        }
        if let Some(url) = &self.endpoint_url {
            builder = builder.endpoint_url(url.clone());
        }
        builder
    }
}

pub(crate) fn duration_to_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
