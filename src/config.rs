/// Runtime settings resolved once at startup from CLI flags and the environment.
use std::path::PathBuf;

use crate::cli::args::AuthArgs;
use crate::sheets::{Credentials, GoogleSheets, HttpOptions, SheetsError};

/// Conventional Google variable naming a service-account key file.
pub const GOOGLE_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Which credential source was selected, before any file is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    ServiceAccount(PathBuf),
    AuthorizedUser(PathBuf),
    ClientSecrets(PathBuf),
    AccessToken(String),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub credential_source: Option<CredentialSource>,
    pub http: HttpOptions,
    /// Overrides the Sheets API root (emulators, proxies).
    pub api_url: Option<String>,
}

impl Settings {
    /// Build settings from parsed flags. `fallback_key` is the value of
    /// `GOOGLE_APPLICATION_CREDENTIALS`, used when no flag selects a source.
    #[must_use]
    pub fn new(auth: &AuthArgs, api_url: Option<String>, fallback_key: Option<PathBuf>) -> Self {
        let credential_source = if let Some(path) = &auth.service_account {
            Some(CredentialSource::ServiceAccount(path.clone()))
        } else if let Some(path) = &auth.authorized_user {
            Some(CredentialSource::AuthorizedUser(path.clone()))
        } else if let Some(path) = &auth.client_secrets {
            Some(CredentialSource::ClientSecrets(path.clone()))
        } else if let Some(token) = &auth.access_token {
            Some(CredentialSource::AccessToken(token.clone()))
        } else {
            fallback_key.map(CredentialSource::ServiceAccount)
        };
        Self {
            credential_source,
            http: HttpOptions::default(),
            api_url,
        }
    }

    /// Build the API client from these settings.
    ///
    /// # Errors
    ///
    /// See [`Settings::credentials`].
    pub fn client(&self) -> Result<GoogleSheets, SheetsError> {
        let client = GoogleSheets::new(self.credentials()?, self.http);
        Ok(match &self.api_url {
            Some(url) => client.with_base_url(url.as_str()),
            None => client,
        })
    }

    /// Read the selected credential source.
    ///
    /// # Errors
    ///
    /// `SheetsError::Credentials` when no source is configured or the file is unusable.
    pub fn credentials(&self) -> Result<Credentials, SheetsError> {
        match &self.credential_source {
            Some(CredentialSource::ServiceAccount(path)) => Credentials::service_account_file(path),
            Some(CredentialSource::AuthorizedUser(path)) => Credentials::authorized_user_file(path),
            Some(CredentialSource::ClientSecrets(path)) => Credentials::client_secrets_file(path),
            Some(CredentialSource::AccessToken(token)) => {
                Ok(Credentials::AccessToken(token.clone()))
            }
            None => Err(SheetsError::Credentials(format!(
                "no credentials configured; pass --service-account, --authorized-user, \
                 --client-secrets or --access-token, or set {GOOGLE_APPLICATION_CREDENTIALS}"
            ))),
        }
    }
}
