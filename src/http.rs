//! Low-level HTTP plumbing for hmsweb requests.
//!
//! Wraps a `reqwest::Client` with the Arlo base URL and the session state
//! issued at login. Non-2xx statuses always surface as [`ArloError::Http`];
//! application-level failures (`"success": false` bodies) pass through to
//! the caller untouched.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error};
use url::Url;

use crate::error::ArloError;

/// Session state issued at login.
///
/// The token and user id are held in a single struct behind a single lock
/// slot, so they are always set together and cleared together.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque token sent as the `Authorization` header on every request.
    pub token: String,
    /// Account identifier, also used to build the `from` field of notify
    /// envelopes (`"{user_id}_web"`).
    pub user_id: String,
}

/// HTTP client bound to an hmsweb base URL.
#[derive(Clone)]
pub(crate) struct HmswebClient {
    client: Client,
    base_url: Url,
    session: Arc<RwLock<Option<Session>>>,
}

impl HmswebClient {
    pub fn new(base_url: Url, timeout: Duration, user_agent: &str) -> Result<Self, ArloError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url,
            session: Arc::new(RwLock::new(None)),
        })
    }

    /// Current session, or [`ArloError::AuthenticationRequired`] when no
    /// login has succeeded yet. Every session-scoped operation calls this
    /// before touching the network.
    pub async fn session(&self) -> Result<Session, ArloError> {
        self.session
            .read()
            .await
            .clone()
            .ok_or(ArloError::AuthenticationRequired)
    }

    pub async fn has_session(&self) -> bool {
        self.session.read().await.is_some()
    }

    pub async fn set_session(&self, session: Session) {
        let mut guard = self.session.write().await;
        *guard = Some(session);
    }

    pub async fn clear_session(&self) {
        let mut guard = self.session.write().await;
        *guard = None;
    }

    /// Issue a request against a path relative to the base URL.
    ///
    /// Headers are built fresh for each call: the session token (when
    /// present) plus any call-specific extras such as `xCloudId`.
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
        extra_headers: &[(&str, &str)],
    ) -> Result<Value, ArloError>
    where
        T: Serialize,
    {
        let url = self.base_url.join(path)?;

        let mut req = self.client.request(method.clone(), url);

        if let Some(session) = self.session.read().await.as_ref() {
            req = req.header("Authorization", &session.token);
        }
        for (name, value) in extra_headers {
            req = req.header(*name, *value);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        debug!(%method, path, "hmsweb request");

        let response = req.send().await?;
        let status = response.status();

        if status.is_success() {
            let data = response.json::<Value>().await?;
            Ok(data)
        } else {
            let body = response.text().await?;
            error!(%status, path, "hmsweb request failed");
            Err(ArloError::Http { status: status.as_u16(), body })
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value, ArloError> {
        self.request::<()>(Method::GET, path, None, &[]).await
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, ArloError> {
        self.request(Method::POST, path, Some(body), &[]).await
    }

    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, ArloError> {
        self.request(Method::PUT, path, Some(body), &[]).await
    }

    /// GET an absolute, presigned URL with a streaming body.
    ///
    /// Presigned URLs carry their own auth in the query string, so the
    /// session header is deliberately not attached.
    pub async fn get_streamed(&self, url: &str) -> Result<reqwest::Response, ArloError> {
        debug!(url, "streaming GET");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await?;
            error!(%status, "streaming GET failed");
            return Err(ArloError::Http { status: status.as_u16(), body });
        }
        Ok(response)
    }
}
