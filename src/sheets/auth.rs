/// OAuth2 credentials and access-token acquisition for the Sheets API.
///
/// Four credential sources are supported:
///
/// - **Service account** key file: a self-signed RS256 JWT is exchanged for a
///   token (`urn:ietf:params:oauth:grant-type:jwt-bearer`).
/// - **Authorized user** file: a stored refresh token is exchanged.
/// - **Installed application** client secrets: interactive consent through a
///   loopback redirect on an ephemeral port, then a code exchange.
/// - A raw **access token**, used as-is.
///
/// Tokens are fetched lazily and re-fetched shortly before they expire.
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::errors::SheetsError;

/// OAuth scope granting read/write access to spreadsheets.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for self-signed service-account assertions.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens this close to expiry are treated as expired.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_owned()
}

/// Fields of a service-account JSON key that token exchange needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// Stored OAuth2 user credentials (`authorized_user` JSON).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// The `installed` block of a desktop-app client secrets file.
#[derive(Debug, Clone, Deserialize)]
pub struct InstalledApp {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: InstalledApp,
}

/// Where access tokens come from. Constructed once at startup and handed to
/// the client explicitly.
#[derive(Debug, Clone)]
pub enum Credentials {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
    InstalledApp(InstalledApp),
    AccessToken(String),
}

impl Credentials {
    /// Load a service-account key file.
    ///
    /// # Errors
    ///
    /// `SheetsError::Credentials` if the file is unreadable or not a service-account key.
    pub fn service_account_file(path: &Path) -> Result<Self, SheetsError> {
        let key: ServiceAccountKey = read_json(path)?;
        if let Some(kind) = key.kind.as_deref() {
            if kind != "service_account" {
                return Err(SheetsError::Credentials(format!(
                    "{}: expected type \"service_account\", found \"{kind}\"",
                    path.display()
                )));
            }
        }
        Ok(Self::ServiceAccount(key))
    }

    /// Load an `authorized_user` credentials file.
    ///
    /// # Errors
    ///
    /// `SheetsError::Credentials` if the file is unreadable or malformed.
    pub fn authorized_user_file(path: &Path) -> Result<Self, SheetsError> {
        Ok(Self::AuthorizedUser(read_json(path)?))
    }

    /// Load a desktop-app client secrets file.
    ///
    /// # Errors
    ///
    /// `SheetsError::Credentials` if the file is unreadable or has no `installed` block.
    pub fn client_secrets_file(path: &Path) -> Result<Self, SheetsError> {
        let file: ClientSecretsFile = read_json(path)?;
        Ok(Self::InstalledApp(file.installed))
    }

    /// Short name used in logs and `check-auth` output.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceAccount(_) => "service_account",
            Self::AuthorizedUser(_) => "authorized_user",
            Self::InstalledApp(_) => "installed_app",
            Self::AccessToken(_) => "access_token",
        }
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, SheetsError> {
    let text = fs::read_to_string(path)
        .map_err(|e| SheetsError::Credentials(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| SheetsError::Credentials(format!("{}: {e}", path.display())))
}

/// A bearer token plus its local expiry.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub value: String,
    expires_at: Option<Instant>,
}

impl AccessToken {
    fn new(value: String, expires_in: Option<u64>, now: Instant) -> Self {
        Self {
            value,
            expires_at: expires_in.map(|secs| now + Duration::from_secs(secs)),
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at
            .is_none_or(|at| now + EXPIRY_MARGIN < at)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// Caches the current access token and refreshes it from `Credentials`.
pub struct TokenProvider {
    credentials: Credentials,
    cached: Option<AccessToken>,
}

impl TokenProvider {
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            cached: None,
        }
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Return a usable bearer token, fetching a new one when needed.
    ///
    /// # Errors
    ///
    /// Credential, token-endpoint or transport errors.
    pub fn token(&mut self, agent: &ureq::Agent) -> Result<String, SheetsError> {
        let now = Instant::now();
        if let Some(token) = &self.cached {
            if token.is_fresh(now) {
                return Ok(token.value.clone());
            }
            debug!("access token expired; refreshing");
        }
        let token = self.fetch(agent, now)?;
        let value = token.value.clone();
        self.cached = Some(token);
        Ok(value)
    }

    fn fetch(&mut self, agent: &ureq::Agent, now: Instant) -> Result<AccessToken, SheetsError> {
        info!(kind = self.credentials.kind(), "requesting access token");
        let response = match &self.credentials {
            Credentials::AccessToken(value) => {
                return Ok(AccessToken::new(value.clone(), None, now));
            }
            Credentials::ServiceAccount(key) => {
                let assertion = sign_assertion(key, chrono::Utc::now().timestamp())?;
                exchange(
                    agent,
                    &key.token_uri,
                    &[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)],
                )?
            }
            Credentials::AuthorizedUser(user) => exchange(
                agent,
                &user.token_uri,
                &[
                    ("grant_type", "refresh_token"),
                    ("client_id", &user.client_id),
                    ("client_secret", &user.client_secret),
                    ("refresh_token", &user.refresh_token),
                ],
            )?,
            Credentials::InstalledApp(app) => {
                let app = app.clone();
                let response = run_installed_flow(agent, &app)?;
                // Later refreshes reuse the granted refresh token instead of prompting again.
                if let Some(refresh_token) = &response.refresh_token {
                    self.credentials = Credentials::AuthorizedUser(AuthorizedUser {
                        client_id: app.client_id,
                        client_secret: app.client_secret,
                        refresh_token: refresh_token.clone(),
                        token_uri: app.token_uri,
                    });
                }
                response
            }
        };
        Ok(AccessToken::new(response.access_token, response.expires_in, now))
    }
}

/// Build the signed JWT a service account presents to the token endpoint.
fn sign_assertion(key: &ServiceAccountKey, issued_at: i64) -> Result<String, SheetsError> {
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SPREADSHEETS_SCOPE,
        aud: &key.token_uri,
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| SheetsError::Credentials(format!("private_key: {e}")))?;
    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| SheetsError::Credentials(format!("signing assertion: {e}")))
}

fn exchange(
    agent: &ureq::Agent,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, SheetsError> {
    match agent.post(token_uri).send_form(form) {
        Ok(resp) => resp.into_json().map_err(|e| SheetsError::Decode {
            context: token_uri.to_owned(),
            detail: e.to_string(),
        }),
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            Err(SheetsError::AuthFailed(format!(
                "token endpoint returned HTTP {code}: {}",
                oauth_error_message(&body)
            )))
        }
        Err(ureq::Error::Transport(err)) => Err(SheetsError::Transport(err.to_string())),
    }
}

/// Pull `error_description` (or `error`) out of an OAuth error body.
fn oauth_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct OAuthError {
        error: String,
        #[serde(default)]
        error_description: Option<String>,
    }
    match serde_json::from_str::<OAuthError>(body) {
        Ok(e) => e.error_description.unwrap_or(e.error),
        Err(_) => body.trim().to_owned(),
    }
}

fn run_installed_flow(
    agent: &ureq::Agent,
    app: &InstalledApp,
) -> Result<TokenResponse, SheetsError> {
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .map_err(|e| SheetsError::Transport(format!("binding redirect listener: {e}")))?;
    let port = listener
        .local_addr()
        .map_err(|e| SheetsError::Transport(e.to_string()))?
        .port();
    let redirect_uri = format!("http://127.0.0.1:{port}/");

    eprintln!(
        "Open this URL in a browser to authorize access:\n\n  {}\n",
        consent_url(app, &redirect_uri)
    );

    let code = wait_for_code(&listener)?;
    exchange(
        agent,
        &app.token_uri,
        &[
            ("grant_type", "authorization_code"),
            ("code", &code),
            ("client_id", &app.client_id),
            ("client_secret", &app.client_secret),
            ("redirect_uri", &redirect_uri),
        ],
    )
}

fn consent_url(app: &InstalledApp, redirect_uri: &str) -> String {
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&access_type=offline",
        app.auth_uri,
        urlencoding::encode(&app.client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(SPREADSHEETS_SCOPE),
    )
}

fn wait_for_code(listener: &TcpListener) -> Result<String, SheetsError> {
    let (mut stream, _) = listener
        .accept()
        .map_err(|e| SheetsError::Transport(format!("waiting for redirect: {e}")))?;

    let mut request_line = String::new();
    {
        let mut reader = BufReader::new(&stream);
        reader
            .read_line(&mut request_line)
            .map_err(|e| SheetsError::Transport(format!("reading redirect: {e}")))?;
    }

    let result = parse_redirect(&request_line);
    let body = if result.is_ok() {
        "Authorization complete. You can close this window."
    } else {
        "Authorization failed. Check the terminal for details."
    };
    // The browser only needs a courtesy page; a failed write is not fatal.
    let _ = write!(
        stream,
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    result
}

/// Extract `code` from the redirect request line (`GET /?code=..&scope=.. HTTP/1.1`).
fn parse_redirect(request_line: &str) -> Result<String, SheetsError> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| SheetsError::AuthFailed("malformed redirect request".to_owned()))?;
    let query = target.split_once('?').map_or("", |(_, q)| q);

    for pair in query.split('&') {
        let (name, raw) = pair.split_once('=').unwrap_or((pair, ""));
        let value = urlencoding::decode(raw)
            .map_err(|e| SheetsError::AuthFailed(format!("redirect parameter '{name}': {e}")))?;
        match name {
            "code" => return Ok(value.into_owned()),
            "error" => return Err(SheetsError::AuthFailed(format!("consent denied: {value}"))),
            _ => {}
        }
    }
    Err(SheetsError::AuthFailed(
        "redirect carried no authorization code".to_owned(),
    ))
}
