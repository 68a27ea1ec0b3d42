//! Credential lookup capability.
//!
//! The scraper never owns a password; it receives a [`CredentialStore`] and
//! asks it for the secret keyed by service name and username. Production
//! runs use [`EnvCredentials`]; tests inject [`StaticCredentials`].

use async_trait::async_trait;

use crate::error::{Error, Result};

/// A password value. Deliberately opaque in Debug output so secrets never
/// leak into logs or error messages.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up the secret for `username` under `service`.
    async fn lookup(&self, service: &str, username: &str) -> Result<Secret>;
}

/// Reads the secret from the environment: `SNOWTASK_PASSWORD` first, then
/// `<SERVICE>_PASSWORD` with the service name upper-cased.
pub struct EnvCredentials;

impl EnvCredentials {
    fn service_var(service: &str) -> String {
        let mut name: String = service
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        name.push_str("_PASSWORD");
        name
    }
}

#[async_trait]
impl CredentialStore for EnvCredentials {
    async fn lookup(&self, service: &str, username: &str) -> Result<Secret> {
        if let Ok(value) = std::env::var("SNOWTASK_PASSWORD") {
            if !value.is_empty() {
                return Ok(Secret::new(value));
            }
        }
        let var = Self::service_var(service);
        match std::env::var(&var) {
            Ok(value) if !value.is_empty() => Ok(Secret::new(value)),
            _ => Err(Error::Credential(format!(
                "no password for '{}' user '{}': set SNOWTASK_PASSWORD or {}",
                service, username, var
            ))),
        }
    }
}

/// Fixed secret, for tests and one-off scripted runs.
pub struct StaticCredentials {
    secret: Secret,
}

impl StaticCredentials {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            secret: Secret::new(value),
        }
    }
}

#[async_trait]
impl CredentialStore for StaticCredentials {
    async fn lookup(&self, _service: &str, _username: &str) -> Result<Secret> {
        Ok(self.secret.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_debug_is_opaque() {
        let s = Secret::new("hunter2");
        assert_eq!(format!("{:?}", s), "Secret(***)");
        assert_eq!(s.expose(), "hunter2");
    }

    #[test]
    fn test_service_var_name() {
        assert_eq!(EnvCredentials::service_var("ServiceNow"), "SERVICENOW_PASSWORD");
        assert_eq!(EnvCredentials::service_var("my-svc"), "MY_SVC_PASSWORD");
    }

    #[tokio::test]
    async fn test_static_store_returns_secret() {
        let store = StaticCredentials::new("pw");
        let secret = store.lookup("ServiceNow", "user").await.unwrap();
        assert_eq!(secret.expose(), "pw");
    }

    #[tokio::test]
    async fn test_env_store_reports_missing() {
        // Service name chosen so the derived variable cannot exist.
        std::env::remove_var("SNOWTASK_PASSWORD");
        let err = EnvCredentials
            .lookup("no-such-service-xyzzy", "user")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("NO_SUCH_SERVICE_XYZZY_PASSWORD"));
    }
}
