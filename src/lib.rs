// Cloud Bootstrap - builds ready-to-use cloud service client handles

pub mod bootstrap;
pub mod config;
pub mod storage;
pub mod types;
pub mod utils;

use std::io::Write;

use tracing::info;

// Re-exports for convenience
pub use bootstrap::{
    create_client, ClientBootstrap, ClientConfig, ClientHandle, CredentialSource, OverrideConfig,
    TransportOptions,
};
pub use crate::config::Settings;
pub use types::{BootstrapError, BootstrapResult};

pub const GREETING: &str = "Hello, World!";

pub fn greet<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", GREETING)?;
    out.flush()
}

/// Print the greeting, then load settings and bootstrap the configured service.
///
/// The greeting is written and flushed before settings are loaded, so it is
/// visible even when loading or bootstrapping fails.
pub fn run<W, F>(out: &mut W, load_settings: F) -> anyhow::Result<ClientHandle>
where
    W: Write,
    F: FnOnce() -> anyhow::Result<Settings>,
{
    greet(out)?;

    let settings = load_settings()?;
    let handle = create_client(&settings.service, settings.client)?;
    info!(
        service = %handle.service(),
        region = handle.region(),
        call_timeout = ?handle.call_timeout(),
        call_attempt_timeout = ?handle.call_attempt_timeout(),
        "client ready"
    );
    Ok(handle)
}
