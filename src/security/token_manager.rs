//! Release-host credentials read from environment variables
//!
//! The variable names come from configuration (`github.usernameVar`,
//! `github.passwordVar`); values are looked up only when the release step
//! actually runs and are held as [`SecretString`] so they never end up in
//! logs by accident.

use crate::core::error::ReleaseError;
use secrecy::SecretString;
use std::collections::HashMap;
use std::env;

/// Where variable values come from
#[derive(Debug, Clone, Default)]
enum VarSource {
    #[default]
    Process,
    Fixed(HashMap<String, String>),
}

/// Username and password (or token) for basic auth
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Resolves credentials from named environment variables
///
/// # Examples
///
/// ```
/// use package_release::security::SecureTokenManager;
/// use std::collections::HashMap;
///
/// let manager = SecureTokenManager::with_vars(HashMap::from([
///     ("GH_USER".to_string(), "octocat".to_string()),
///     ("GH_TOKEN".to_string(), "ghp_1234567890".to_string()),
/// ]));
/// let credentials = manager.credentials("GH_USER", "GH_TOKEN").unwrap();
/// assert_eq!(credentials.username, "octocat");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SecureTokenManager {
    source: VarSource,
}

impl SecureTokenManager {
    /// Reads from the process environment at lookup time
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads from a fixed map instead of the process environment
    pub fn with_vars(vars: HashMap<String, String>) -> Self {
        Self {
            source: VarSource::Fixed(vars),
        }
    }

    fn var(&self, name: &str) -> Option<String> {
        match &self.source {
            VarSource::Process => env::var(name).ok(),
            VarSource::Fixed(vars) => vars.get(name).cloned(),
        }
    }

    /// Retrieves a secret from the named variable
    pub fn get_token(&self, var_name: &str) -> Option<SecretString> {
        self.var(var_name).map(|v| SecretString::new(v.into()))
    }

    /// Resolve both credentials, failing on the first unset variable
    pub fn credentials(
        &self,
        username_var: &str,
        password_var: &str,
    ) -> Result<Credentials, ReleaseError> {
        let username = self
            .var(username_var)
            .ok_or_else(|| ReleaseError::MissingCredential {
                var: username_var.to_string(),
            })?;
        let password = self
            .get_token(password_var)
            .ok_or_else(|| ReleaseError::MissingCredential {
                var: password_var.to_string(),
            })?;

        Ok(Credentials { username, password })
    }

    /// Masks a token for safe logging
    ///
    /// Shows only the first 3 and last 3 characters. Tokens shorter than
    /// 10 characters are fully masked as "****".
    ///
    /// ```
    /// use package_release::security::SecureTokenManager;
    ///
    /// assert_eq!(SecureTokenManager::mask_token("abcdef123456"), "abc...456");
    /// assert_eq!(SecureTokenManager::mask_token("short"), "****");
    /// ```
    pub fn mask_token(token: &str) -> String {
        let chars: Vec<char> = token.chars().collect();
        if chars.len() < 10 {
            return "****".to_string();
        }

        let prefix: String = chars[..3].iter().collect();
        let suffix: String = chars[chars.len() - 3..].iter().collect();
        format!("{}...{}", prefix, suffix)
    }
}
