//! The Arlo session client: credentials, session state, and every public
//! API operation.

use reqwest::Method;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::warn;

use crate::envelope::{NotifyAction, NotifyEnvelope};
use crate::error::ArloError;
use crate::http::{HmswebClient, Session};
use crate::{ClientConfig, PasswordUpdatePolicy};

/// Client for the Arlo camera service.
///
/// Holds the account credentials and the session issued at login. All
/// operations except [`login`](Arlo::login) require a prior successful
/// login and fail with [`ArloError::AuthenticationRequired`] before any
/// network call otherwise.
///
/// Session state sits behind a lock, so the client can be shared across
/// tasks; concurrent `login`/`logout` calls serialize on that lock.
pub struct Arlo {
    pub(crate) http: HmswebClient,
    username: String,
    password: RwLock<String>,
    password_update_policy: PasswordUpdatePolicy,
}

impl Arlo {
    /// Create a client with the default configuration.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ArloError> {
        Self::with_config(username, password, ClientConfig::default())
    }

    pub fn with_config(
        username: impl Into<String>,
        password: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self, ArloError> {
        let http = HmswebClient::new(
            config.base_url,
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )?;

        Ok(Self {
            http,
            username: username.into(),
            password: RwLock::new(password.into()),
            password_update_policy: config.password_update_policy,
        })
    }

    /// Whether a login has succeeded and not been logged out since.
    pub async fn is_authenticated(&self) -> bool {
        self.http.has_session().await
    }

    /// User id from the current session, if any.
    pub async fn user_id(&self) -> Option<String> {
        self.http.session().await.ok().map(|s| s.user_id)
    }

    /// Log into the Arlo service with the stored credentials.
    ///
    /// On a `"success": true` response the token and user id from `data`
    /// become the current session. The full decoded body is returned
    /// either way, so callers can inspect `success` and any error payload
    /// directly.
    pub async fn login(&self) -> Result<Value, ArloError> {
        let password = self.password.read().await.clone();
        let body = self
            .http
            .post("login", &json!({"email": self.username, "password": password}))
            .await?;

        if body["success"].as_bool().unwrap_or(false) {
            match (body["data"]["token"].as_str(), body["data"]["userId"].as_str()) {
                (Some(token), Some(user_id)) => {
                    self.http
                        .set_session(Session {
                            token: token.to_string(),
                            user_id: user_id.to_string(),
                        })
                        .await;
                }
                _ => {
                    return Err(ArloError::UnexpectedResponse(
                        "login response missing data.token or data.userId",
                    ));
                }
            }
        } else {
            warn!("login rejected by server");
        }
        Ok(body)
    }

    /// Log out of the Arlo service.
    ///
    /// The session is cleared only when the server reports success.
    pub async fn logout(&self) -> Result<Value, ArloError> {
        self.http.session().await?;
        let body = self.http.put("logout", &json!({})).await?;
        if body["success"].as_bool().unwrap_or(false) {
            self.http.clear_session().await;
        }
        Ok(body)
    }

    /// Retrieve the user's profile.
    pub async fn get_profile(&self) -> Result<Value, ArloError> {
        self.http.session().await?;
        self.http.get("users/profile").await
    }

    /// Retrieve the friends who have access to the user's cameras.
    pub async fn get_friends(&self) -> Result<Value, ArloError> {
        self.http.session().await?;
        self.http.get("users/friends").await
    }

    /// Retrieve the user's locations.
    pub async fn get_locations(&self) -> Result<Value, ArloError> {
        self.http.session().await?;
        self.http.get("users/locations").await
    }

    /// List all devices owned by the user with their metadata, including
    /// the `deviceId` and `xCloudId` fields that device-scoped operations
    /// take as parameters.
    pub async fn get_devices(&self) -> Result<Value, ArloError> {
        self.http.session().await?;
        self.http.get("users/devices").await
    }

    /// Get the user's current service plan level.
    pub async fn get_service_level(&self) -> Result<Value, ArloError> {
        self.http.session().await?;
        self.http.get("users/serviceLevel").await
    }

    /// Get any available payment offers.
    pub async fn get_payment_offers(&self) -> Result<Value, ArloError> {
        self.http.session().await?;
        self.http.get("users/payment/offers").await
    }

    /// Retrieve metadata for library recordings between two dates.
    ///
    /// Dates are `YYYYMMDD` strings, e.g. `20160907`; the service does the
    /// range interpretation and this client passes them through untouched.
    pub async fn get_library_metadata(
        &self,
        from_date: &str,
        to_date: &str,
    ) -> Result<Value, ArloError> {
        self.http.session().await?;
        self.http
            .post(
                "users/library/metadata",
                &json!({"dateFrom": from_date, "dateTo": to_date}),
            )
            .await
    }

    /// Retrieve library recordings between two `YYYYMMDD` dates.
    ///
    /// Each record's `presignedContentUrl` links the actual video and
    /// `presignedThumbnailUrl` its thumbnail; both can be fetched with
    /// [`get_recording`](Arlo::get_recording) without further auth.
    pub async fn get_library(&self, from_date: &str, to_date: &str) -> Result<Value, ArloError> {
        self.http.session().await?;
        self.http
            .post(
                "users/library",
                &json!({"dateFrom": from_date, "dateTo": to_date}),
            )
            .await
    }

    /// Update the name on the user's profile.
    pub async fn update_profile(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Value, ArloError> {
        self.http.session().await?;
        self.http
            .put(
                "users/profile",
                &json!({"firstName": first_name, "lastName": last_name}),
            )
            .await
    }

    /// Change the account password, sending the currently stored password
    /// as `currentPassword`.
    ///
    /// Whether the stored password is replaced on a rejected change is
    /// governed by [`PasswordUpdatePolicy`].
    pub async fn update_password(&self, new_password: &str) -> Result<Value, ArloError> {
        self.http.session().await?;
        let current = self.password.read().await.clone();
        let body = self
            .http
            .post(
                "users/changePassword",
                &json!({"currentPassword": current, "newPassword": new_password}),
            )
            .await?;

        let succeeded = body["success"].as_bool().unwrap_or(false);
        if succeeded || self.password_update_policy == PasswordUpdatePolicy::Always {
            let mut password = self.password.write().await;
            *password = new_password.to_string();
        }
        Ok(body)
    }

    /// Update the user's friends. `body` is sent as-is; see the service's
    /// friend record shape (`firstName`, `lastName`, `devices`, `email`,
    /// `adminUser`, ...).
    pub async fn update_friends(&self, body: &Value) -> Result<Value, ArloError> {
        self.http.session().await?;
        self.http.put("users/friends", body).await
    }

    /// Rename a device.
    pub async fn update_device_name(
        &self,
        parent_id: &str,
        device_id: &str,
        name: &str,
    ) -> Result<Value, ArloError> {
        self.http.session().await?;
        self.http
            .put(
                "users/devices/renameDevice",
                &json!({"deviceId": device_id, "deviceName": name, "parentId": parent_id}),
            )
            .await
    }

    /// Update the order cameras are displayed in, with a body of the form
    /// `{"devices": {"<device_id>": 1, ...}}`, sent as-is.
    pub async fn update_display_order(&self, body: &Value) -> Result<Value, ArloError> {
        self.http.session().await?;
        self.http.post("users/devices/displayOrder", body).await
    }

    /// Delete recordings from the library.
    ///
    /// `recordings` is a list of server-shaped delete descriptors, e.g.
    /// `{"createdDate": "20160904", "utcCreatedDate": 1473010280395,
    /// "deviceId": "..."}`.
    pub async fn delete_recordings(&self, recordings: &[Value]) -> Result<Value, ArloError> {
        self.http.session().await?;
        self.http
            .post("users/library/recycle", &json!({"data": recordings}))
            .await
    }

    /// GET the library-reset endpoint. Undocumented upstream; the web
    /// client calls it after bulk-deleting videos.
    pub async fn reset(&self) -> Result<Value, ArloError> {
        self.http.session().await?;
        self.http.get("users/library/reset").await
    }

    /// Post a caller-built notify envelope to a device.
    ///
    /// Escape hatch for commands this client has no dedicated method for
    /// (schedules, rules, camera properties such as zoom or night vision).
    pub async fn notify(
        &self,
        device_id: &str,
        xcloud_id: &str,
        envelope: &NotifyEnvelope,
    ) -> Result<Value, ArloError> {
        self.http.session().await?;
        self.notify_raw(device_id, xcloud_id, envelope).await
    }

    /// Arm the specified device (mode1).
    pub async fn arm(&self, device_id: &str, xcloud_id: &str) -> Result<Value, ArloError> {
        self.set_mode(device_id, xcloud_id, "mode1").await
    }

    /// Disarm the specified device (mode0).
    pub async fn disarm(&self, device_id: &str, xcloud_id: &str) -> Result<Value, ArloError> {
        self.set_mode(device_id, xcloud_id, "mode0").await
    }

    /// Activate a custom mode on the specified device.
    pub async fn custom_mode(
        &self,
        device_id: &str,
        xcloud_id: &str,
        mode: &str,
    ) -> Result<Value, ArloError> {
        self.set_mode(device_id, xcloud_id, mode).await
    }

    /// Delete a custom mode from the specified device.
    pub async fn delete_mode(
        &self,
        device_id: &str,
        xcloud_id: &str,
        mode: &str,
    ) -> Result<Value, ArloError> {
        let session = self.http.session().await?;
        let envelope = NotifyEnvelope::new(
            &session.user_id,
            device_id,
            NotifyAction::Delete,
            format!("modes/{mode}"),
        );
        self.notify_raw(device_id, xcloud_id, &envelope).await
    }

    /// Toggle the camera's privacy state. `active: true` enables privacy
    /// mode, turning the camera off.
    pub async fn toggle_camera(
        &self,
        device_id: &str,
        xcloud_id: &str,
        active: bool,
    ) -> Result<Value, ArloError> {
        let session = self.http.session().await?;
        let envelope = NotifyEnvelope::new(
            &session.user_id,
            device_id,
            NotifyAction::Set,
            format!("cameras/{device_id}"),
        )
        .with_properties(json!({"privacyActive": active}));
        self.notify_raw(device_id, xcloud_id, &envelope).await
    }

    /// Not supported: the upstream client never shipped a working
    /// implementation (mode listing needs the subscribe/notify channel).
    /// Always returns [`ArloError::Unsupported`] without a network call.
    pub async fn get_modes(
        &self,
        _device_id: &str,
        _xcloud_id: &str,
    ) -> Result<Value, ArloError> {
        self.http.session().await?;
        Err(ArloError::Unsupported("get_modes"))
    }

    async fn set_mode(
        &self,
        device_id: &str,
        xcloud_id: &str,
        mode: &str,
    ) -> Result<Value, ArloError> {
        let session = self.http.session().await?;
        let envelope = NotifyEnvelope::new(&session.user_id, device_id, NotifyAction::Set, "modes")
            .with_properties(json!({"active": mode}));
        self.notify_raw(device_id, xcloud_id, &envelope).await
    }

    async fn notify_raw(
        &self,
        device_id: &str,
        xcloud_id: &str,
        envelope: &NotifyEnvelope,
    ) -> Result<Value, ArloError> {
        let path = format!("users/devices/notify/{}", urlencoding::encode(device_id));
        self.http
            .request(Method::POST, &path, Some(envelope), &[("xCloudId", xcloud_id)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let arlo = Arlo::new("user@example.com", "password");
        assert!(arlo.is_ok());

        let arlo = arlo.unwrap();
        assert!(!arlo.is_authenticated().await);
        assert!(arlo.user_id().await.is_none());
    }
}
