//! Client for the legacy user directory.
//!
//! Every operation is a single round trip to `{base}/api/users/{id}/`:
//!
//! - `GET` returns the user record
//! - `HEAD` answers whether the user exists
//! - `POST` with `{"password": ..}` answers whether the password matches
//!
//! No retries happen at this layer.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::MigrationConfig;
use crate::error::{MigrationError, MigrationResult};

/// A user record as the legacy directory reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteUser {
    /// Username in the legacy directory.
    pub username: String,
    /// Email address; expected to equal the identifier it was fetched by.
    pub email: Option<String>,
    /// Whether the account is enabled.
    pub enabled: bool,
    /// Whether the email has been verified.
    pub email_verified: bool,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Custom attributes.
    pub attributes: Option<HashMap<String, Vec<String>>>,
    /// Realm role names.
    pub roles: Option<BTreeSet<String>>,
}

/// Login payload posted to the legacy directory.
#[derive(Clone, Serialize)]
pub struct UserCredentialsDto {
    password: String,
}

impl UserCredentialsDto {
    /// Wraps a password.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }
}

impl fmt::Debug for UserCredentialsDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredentialsDto")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Operations the legacy directory exposes.
#[async_trait]
pub trait LegacyUserService: Send + Sync {
    /// Fetches a user record.
    ///
    /// ## Errors
    ///
    /// Returns `MigrationError::UserNotFound` if the directory has no such
    /// user. Other failures stay distinguishable from "not found".
    async fn get_user_details(&self, identifier: &str) -> MigrationResult<RemoteUser>;

    /// Asks whether a user exists. A 2xx status means it does.
    async fn validate_user_exists(&self, identifier: &str) -> MigrationResult<StatusCode>;

    /// Checks a password. A 2xx status means it matches.
    async fn validate_login(
        &self,
        identifier: &str,
        credentials: &UserCredentialsDto,
    ) -> MigrationResult<StatusCode>;
}

/// [`LegacyUserService`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpLegacyUserService {
    client: reqwest::Client,
    base_uri: Url,
}

impl HttpLegacyUserService {
    /// Creates a client for the configured directory.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &MigrationConfig) -> MigrationResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connection_timeout)
            .read_timeout(config.read_timeout)
            .build()?;

        Ok(Self {
            client,
            base_uri: config.base_uri.clone(),
        })
    }

    /// Returns the base URI.
    #[must_use]
    pub const fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    /// Builds `{base}/api/users/{identifier}/`.
    ///
    /// Returns `None` for identifiers that cannot name a user route: the
    /// empty string and dot-only segments, which URL normalization would
    /// collapse onto a parent path.
    fn user_url(&self, identifier: &str) -> MigrationResult<Option<Url>> {
        if identifier.chars().all(|c| c == '.') {
            return Ok(None);
        }
        let mut url = self.base_uri.clone();
        url.path_segments_mut()
            .map_err(|()| MigrationError::config("base URI cannot carry a path"))?
            .pop_if_empty()
            .extend(["api", "users", identifier, ""]);
        Ok(Some(url))
    }
}

#[async_trait]
impl LegacyUserService for HttpLegacyUserService {
    async fn get_user_details(&self, identifier: &str) -> MigrationResult<RemoteUser> {
        let Some(url) = self.user_url(identifier)? else {
            return Err(MigrationError::user_not_found(identifier));
        };
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return Err(MigrationError::user_not_found(identifier));
        }
        if !status.is_success() {
            return Err(MigrationError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| {
            if e.is_decode() {
                MigrationError::Protocol(e.to_string())
            } else {
                MigrationError::Http(e)
            }
        })
    }

    async fn validate_user_exists(&self, identifier: &str) -> MigrationResult<StatusCode> {
        let Some(url) = self.user_url(identifier)? else {
            return Ok(StatusCode::NOT_FOUND);
        };
        let response = self.client.head(url).send().await?;
        Ok(response.status())
    }

    async fn validate_login(
        &self,
        identifier: &str,
        credentials: &UserCredentialsDto,
    ) -> MigrationResult<StatusCode> {
        let Some(url) = self.user_url(identifier)? else {
            return Ok(StatusCode::NOT_FOUND);
        };
        let response = self
            .client
            .post(url)
            .json(credentials)
            .send()
            .await?;
        Ok(response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(base_uri: &str) -> HttpLegacyUserService {
        HttpLegacyUserService::new(&MigrationConfig::parse(base_uri).unwrap()).unwrap()
    }

    #[test]
    fn user_url_appends_to_base_path() {
        let url = service("http://localhost:9081/migration")
            .user_url("jdoe@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9081/migration/api/users/jdoe@example.com/"
        );
    }

    #[test]
    fn user_url_tolerates_trailing_slash_and_bare_host() {
        let url = service("http://localhost:9081/migration/").user_url("a").unwrap().unwrap();
        assert_eq!(url.path(), "/migration/api/users/a/");

        let url = service("https://legacy.example.com").user_url("a").unwrap().unwrap();
        assert_eq!(url.path(), "/api/users/a/");
    }

    #[test]
    fn user_url_encodes_identifier_as_one_segment() {
        let url = service("http://localhost").user_url("a/b c").unwrap().unwrap();
        assert_eq!(url.path(), "/api/users/a%2Fb%20c/");
    }

    #[test]
    fn user_url_rejects_dot_segments() {
        let service = service("http://localhost/migration");
        for identifier in ["", ".", "..", "..."] {
            assert!(service.user_url(identifier).unwrap().is_none(), "{identifier:?}");
        }

        let url = service.user_url("j.doe..").unwrap().unwrap();
        assert_eq!(url.path(), "/migration/api/users/j.doe../");
    }

    #[tokio::test]
    async fn dot_identifiers_are_absent_without_a_request() {
        // Nothing listens on the discard port; any request would fail.
        let service = service("http://127.0.0.1:9/migration");

        let err = service.get_user_details("..").await.unwrap_err();
        assert!(err.is_user_not_found());
        assert_eq!(
            service.validate_user_exists("..").await.unwrap(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            service
                .validate_login(".", &UserCredentialsDto::new("secret"))
                .await
                .unwrap(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn remote_user_decodes_camel_case() {
        let user: RemoteUser = serde_json::from_str(
            r#"{
                "username": "jdoe",
                "email": "jdoe@example.com",
                "enabled": true,
                "emailVerified": true,
                "firstName": "John",
                "lastName": "Doe",
                "attributes": {"department": ["eng"]},
                "roles": ["ROLE_FOO"]
            }"#,
        )
        .unwrap();

        assert_eq!(user.email.as_deref(), Some("jdoe@example.com"));
        assert!(user.email_verified);
        assert_eq!(user.first_name.as_deref(), Some("John"));
        assert_eq!(user.attributes.unwrap()["department"], vec!["eng"]);
        assert!(user.roles.unwrap().contains("ROLE_FOO"));
    }

    #[test]
    fn remote_user_tolerates_missing_fields() {
        let user: RemoteUser = serde_json::from_str(r#"{"email": "a@example.com"}"#).unwrap();

        assert!(user.username.is_empty());
        assert!(!user.enabled);
        assert!(user.attributes.is_none());
        assert!(user.roles.is_none());
    }

    #[test]
    fn credentials_are_redacted_but_serialized() {
        let dto = UserCredentialsDto::new("hunter2");

        assert!(!format!("{dto:?}").contains("hunter2"));
        assert_eq!(
            serde_json::to_value(&dto).unwrap(),
            serde_json::json!({"password": "hunter2"})
        );
    }
}
