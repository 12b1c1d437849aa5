//! Client for Netgear's Arlo camera-service HTTP API (hmsweb).
//!
//! Covers login/session management, device listing, mode and arming
//! control via notify envelopes, video library retrieval, and recording
//! download/streaming. Every operation is one authenticated round trip
//! returning the server's decoded JSON body.
//!
//! HTTP failures (non-2xx, connection errors) are raised as [`ArloError`];
//! bodies carrying `"success": false` are returned as normal data for the
//! caller to inspect.
//!
//! ```no_run
//! use arlo_client::Arlo;
//!
//! # async fn run() -> Result<(), arlo_client::ArloError> {
//! let arlo = Arlo::new("user@example.com", "password")?;
//! arlo.login().await?;
//! let devices = arlo.get_devices().await?;
//! println!("{devices:#}");
//! # Ok(())
//! # }
//! ```

mod client;
mod envelope;
mod error;
mod http;
mod media;

pub use client::Arlo;
pub use envelope::{NotifyAction, NotifyEnvelope};
pub use error::ArloError;
pub use http::Session;
pub use media::RecordingStream;

use url::Url;

/// What to do with the locally stored password after `update_password`.
///
/// The upstream web client overwrites its stored password as soon as the
/// change request returns, even when the server answers `"success": false`,
/// which desyncs the client from the account on a rejected change.
/// `Always` reproduces that behavior exactly; `OnSuccess` only stores the
/// new password when the server confirms the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordUpdatePolicy {
    #[default]
    Always,
    OnSuccess,
}

/// Arlo client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL all endpoints are joined against.
    pub base_url: Url,
    /// HTTP client timeout in seconds, applied to every call.
    pub timeout_secs: u64,
    /// User agent string.
    pub user_agent: String,
    /// See [`PasswordUpdatePolicy`].
    pub password_update_policy: PasswordUpdatePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://arlo.netgear.com/hmsweb/").unwrap(),
            timeout_secs: 30,
            user_agent: concat!("arlo-client/", env!("CARGO_PKG_VERSION")).to_string(),
            password_update_policy: PasswordUpdatePolicy::default(),
        }
    }
}
