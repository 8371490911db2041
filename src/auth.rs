//! Feed access token handling.
//!
//! The settings file never contains the secret. Server entries reference
//! `${env.ENV_MAVEN_ACCESS_TOKEN}` and the token itself is only placed in
//! the environment of the Maven process (see [`exec_options`]).

use crate::diagnostics::Diagnostic;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::collections::HashMap;
use std::fmt;

/// Environment variable that carries the encoded feed token to Maven.
pub const ACCESS_TOKEN_ENV: &str = "ENV_MAVEN_ACCESS_TOKEN";

/// Name of the build's own service connection.
pub const SYSTEM_CONNECTION: &str = "SYSTEMVSSCONNECTION";

/// Fixed user name prepended to the token before encoding.
const TOKEN_USER: &str = "VSTS";

/// Authorization details of a service connection.
///
/// The `Debug` implementation redacts parameter values, which hold secrets.
#[derive(Clone, Default)]
pub struct EndpointAuthorization {
    /// Authorization scheme, e.g. `OAuth`.
    pub scheme: String,
    /// Scheme-specific parameters, e.g. `AccessToken`.
    pub parameters: HashMap<String, String>,
}

impl fmt::Debug for EndpointAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.parameters.keys().map(String::as_str).collect();
        f.debug_struct("EndpointAuthorization")
            .field("scheme", &self.scheme)
            .field("parameters", &keys)
            .finish()
    }
}

impl EndpointAuthorization {
    /// OAuth authorization carrying an access token.
    pub fn oauth(access_token: impl Into<String>) -> Self {
        let mut parameters = HashMap::new();
        parameters.insert("AccessToken".to_string(), access_token.into());
        EndpointAuthorization {
            scheme: "OAuth".to_string(),
            parameters,
        }
    }
}

/// Get the access token of an OAuth service connection.
///
/// Any other scheme, or a missing connection, yields
/// [`Diagnostic::FeedTokenUnavailable`].
pub fn system_access_token(
    auth: Option<&EndpointAuthorization>,
) -> std::result::Result<&str, Diagnostic> {
    auth.filter(|a| a.scheme.eq_ignore_ascii_case("OAuth"))
        .and_then(|a| a.parameters.get("AccessToken"))
        .map(String::as_str)
        .ok_or(Diagnostic::FeedTokenUnavailable)
}

/// Encode a secret as the token value Maven sends in the `Authorization` header.
///
/// ```
/// use maven_feed_auth::build_auth_token;
///
/// // "VSTS:secret"
/// assert_eq!(build_auth_token("secret"), "VlNUUzpzZWNyZXQ=");
/// ```
pub fn build_auth_token(secret: &str) -> String {
    BASE64.encode(format!("{}:{}", TOKEN_USER, secret).as_bytes())
}

/// Environment for the Maven process.
///
/// The `Debug` implementation redacts the access token.
#[derive(Clone, Default)]
pub struct ExecOptions {
    /// Complete environment including [`ACCESS_TOKEN_ENV`].
    pub env: HashMap<String, String>,
    /// Conditions raised while obtaining the token.
    pub diagnostics: Vec<Diagnostic>,
}

impl fmt::Debug for ExecOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env: HashMap<&str, &str> = self
            .env
            .iter()
            .map(|(k, v)| {
                let shown = if k == ACCESS_TOKEN_ENV { "[REDACTED]" } else { v.as_str() };
                (k.as_str(), shown)
            })
            .collect();
        f.debug_struct("ExecOptions")
            .field("env", &env)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

/// Build the Maven process environment from `base_env` plus the feed token.
///
/// A missing token is reported as a diagnostic and an empty secret is
/// encoded instead, so Maven still starts and fails authentication on its own.
pub fn exec_options<I>(base_env: I, auth: Option<&EndpointAuthorization>) -> ExecOptions
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env: HashMap<String, String> = base_env.into_iter().collect();
    let mut diagnostics = Vec::new();

    let secret = match system_access_token(auth) {
        Ok(token) => token,
        Err(diagnostic) => {
            diagnostics.push(diagnostic);
            ""
        }
    };
    env.insert(ACCESS_TOKEN_ENV.to_string(), build_auth_token(secret));

    ExecOptions { env, diagnostics }
}
