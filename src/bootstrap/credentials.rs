//! Credential Sources
//!
//! A [`CredentialSource`] only says *where* credentials come from. Turning it
//! into a provider never touches the network or the filesystem; sources are
//! consulted when the handle first asks for credentials.
//!
//! ## Chain resolution
//!
//! Links of a [`CredentialSource::ChainDerived`] source are tried in order.
//! A link that reports "not loaded" hands over to the next one; any other
//! failure ends the search. Exhausting the chain (or an empty chain) is a
//! "not loaded" failure.

use std::borrow::Cow;

use aws_config::ecs::EcsCredentialsProvider;
use aws_config::environment::credentials::EnvironmentVariableCredentialsProvider;
use aws_config::imds::credentials::ImdsCredentialsProvider;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::web_identity_token::WebIdentityTokenCredentialsProvider;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{self, future, ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::{BootstrapError, BootstrapResult};

const EXPLICIT_PROVIDER_NAME: &str = "ExplicitKeys";

/// Where a client's credentials come from.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CredentialSource {
    /// Static keys supplied by the caller
    ExplicitKeys {
        access_key_id: String,
        secret_access_key: String,
        #[serde(default)]
        session_token: Option<String>,
    },
    /// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` / `AWS_SESSION_TOKEN`
    EnvironmentDerived,
    /// Ordered fallback list, resolved lazily
    ChainDerived {
        #[serde(default = "ChainLink::standard_chain")]
        links: Vec<ChainLink>,
    },
}

impl Default for CredentialSource {
    fn default() -> Self {
        CredentialSource::ChainDerived {
            links: ChainLink::standard_chain(),
        }
    }
}

// Keys never show up in logs or panic messages.
impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::ExplicitKeys {
                access_key_id,
                session_token,
                ..
            } => f
                .debug_struct("ExplicitKeys")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"** redacted **")
                .field(
                    "session_token",
                    &session_token.as_ref().map(|_| "** redacted **"),
                )
                .finish(),
            CredentialSource::EnvironmentDerived => f.write_str("EnvironmentDerived"),
            CredentialSource::ChainDerived { links } => f
                .debug_struct("ChainDerived")
                .field("links", links)
                .finish(),
        }
    }
}

/// One step of a credential chain.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ChainLink {
    Environment,
    /// Shared config/credentials files; `None` means the default profile
    Profile {
        #[serde(default)]
        name: Option<String>,
    },
    WebIdentityToken,
    /// Container credentials endpoint (ECS, EKS pod identity)
    Container,
    InstanceMetadata,
}

impl ChainLink {
    /// Environment, profile, web identity, container, then instance metadata.
    pub fn standard_chain() -> Vec<ChainLink> {
        vec![
            ChainLink::Environment,
            ChainLink::Profile { name: None },
            ChainLink::WebIdentityToken,
            ChainLink::Container,
            ChainLink::InstanceMetadata,
        ]
    }

    fn name(&self) -> Cow<'static, str> {
        match self {
            ChainLink::Environment => Cow::Borrowed("Environment"),
            ChainLink::Profile { name: None } => Cow::Borrowed("Profile"),
            ChainLink::Profile { name: Some(name) } => Cow::Owned(format!("Profile({name})")),
            ChainLink::WebIdentityToken => Cow::Borrowed("WebIdentityToken"),
            ChainLink::Container => Cow::Borrowed("Container"),
            ChainLink::InstanceMetadata => Cow::Borrowed("InstanceMetadata"),
        }
    }

    fn build_provider(&self) -> SharedCredentialsProvider {
        match self {
            ChainLink::Environment => {
                SharedCredentialsProvider::new(EnvironmentVariableCredentialsProvider::new())
            }
            ChainLink::Profile { name } => {
                let mut builder = ProfileFileCredentialsProvider::builder();
                if let Some(name) = name {
                    builder = builder.profile_name(name);
                }
                SharedCredentialsProvider::new(builder.build())
            }
            ChainLink::WebIdentityToken => {
                SharedCredentialsProvider::new(WebIdentityTokenCredentialsProvider::builder().build())
            }
            ChainLink::Container => {
                SharedCredentialsProvider::new(EcsCredentialsProvider::builder().build())
            }
            ChainLink::InstanceMetadata => {
                SharedCredentialsProvider::new(ImdsCredentialsProvider::builder().build())
            }
        }
    }
}

impl CredentialSource {
    /// Check the source without resolving anything.
    pub fn validate(&self) -> BootstrapResult<()> {
        if let CredentialSource::ExplicitKeys {
            access_key_id,
            secret_access_key,
            ..
        } = self
        {
            if access_key_id.trim().is_empty() {
                return Err(BootstrapError::InvalidConfiguration(
                    "explicit access key id is empty".to_string(),
                ));
            }
            if secret_access_key.trim().is_empty() {
                return Err(BootstrapError::InvalidConfiguration(
                    "explicit secret access key is empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Build the provider for this source. Nothing is resolved here.
    pub fn into_provider(self) -> SharedCredentialsProvider {
        match self {
            CredentialSource::ExplicitKeys {
                access_key_id,
                secret_access_key,
                session_token,
            } => SharedCredentialsProvider::new(Credentials::new(
                access_key_id,
                secret_access_key,
                session_token,
                None,
                EXPLICIT_PROVIDER_NAME,
            )),
            CredentialSource::EnvironmentDerived => {
                SharedCredentialsProvider::new(EnvironmentVariableCredentialsProvider::new())
            }
            CredentialSource::ChainDerived { links } => {
                SharedCredentialsProvider::new(CredentialChain::from_links(&links))
            }
        }
    }
}

/// Lazily consulted ordered list of credential providers.
#[derive(Debug)]
pub struct CredentialChain {
    providers: Vec<(Cow<'static, str>, SharedCredentialsProvider)>,
}

impl CredentialChain {
    pub fn from_links(links: &[ChainLink]) -> Self {
        Self {
            providers: links
                .iter()
                .map(|link| (link.name(), link.build_provider()))
                .collect(),
        }
    }

    /// Chain over arbitrary providers, in the order given.
    pub fn from_providers(
        providers: impl IntoIterator<Item = (Cow<'static, str>, SharedCredentialsProvider)>,
    ) -> Self {
        Self {
            providers: providers.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    async fn resolve(&self) -> provider::Result {
        for (name, provider) in &self.providers {
            match provider.provide_credentials().await {
                Ok(credentials) => {
                    debug!(provider = %name, "loaded credentials");
                    return Ok(credentials);
                }
                Err(CredentialsError::CredentialsNotLoaded(reason)) => {
                    debug!(provider = %name, ?reason, "provider did not supply credentials, trying next");
                }
                Err(err) => {
                    warn!(provider = %name, error = %err, "credential provider failed");
                    return Err(err);
                }
            }
        }
        Err(CredentialsError::not_loaded(
            "no provider in the credential chain supplied credentials",
        ))
    }
}

impl ProvideCredentials for CredentialChain {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::new(self.resolve())
    }
}
