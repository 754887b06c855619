//! Access gate for the tool itself (not for WordPress).

use crate::config::SiteConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

const BASIC_REALM: &str = "Basic realm=\"WP Quick Tools\"";

/// How the tool is protected, from the `access_mode` setting.
///
/// Unrecognised values leave the tool unprotected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccessMode {
    #[default]
    None,
    Basic,
    Token,
}

impl AccessMode {
    pub fn as_str(&self) -> &str {
        match self {
            AccessMode::None => "none",
            AccessMode::Basic => "basic",
            AccessMode::Token => "token",
        }
    }
}

impl From<String> for AccessMode {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" => AccessMode::Basic,
            "token" => AccessMode::Token,
            _ => AccessMode::None,
        }
    }
}

impl From<AccessMode> for String {
    fn from(mode: AccessMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Credentials a caller presented to the tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presented {
    pub basic: Option<(String, String)>,
    pub token: Option<String>,
}

impl Presented {
    pub fn basic(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            basic: Some((user.into(), password.into())),
            token: None,
        }
    }

    pub fn token(token: impl Into<String>) -> Self {
        Self {
            basic: None,
            token: Some(token.into()),
        }
    }
}

/// Response a front end sends when access is refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub status: u16,
    pub www_authenticate: Option<&'static str>,
    pub body: &'static str,
}

pub struct AccessControl<'a> {
    config: &'a SiteConfig,
}

impl<'a> AccessControl<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self { config }
    }

    pub fn is_granted(&self, presented: &Presented) -> bool {
        match self.config.access_mode() {
            AccessMode::None => true,
            AccessMode::Basic => match &presented.basic {
                Some((user, password)) => {
                    user == self.config.access_basic_user()
                        && password == self.config.access_basic_password()
                }
                None => false,
            },
            AccessMode::Token => match presented.token.as_deref() {
                Some(token) => !token.is_empty() && token == self.config.access_token(),
                None => false,
            },
        }
    }

    /// What to answer when [`Self::is_granted`] is false; `None` when the
    /// tool is unprotected.
    pub fn challenge(&self) -> Option<Challenge> {
        match self.config.access_mode() {
            AccessMode::None => None,
            AccessMode::Basic => Some(Challenge {
                status: 401,
                www_authenticate: Some(BASIC_REALM),
                body: "Authentication required.",
            }),
            AccessMode::Token => Some(Challenge {
                status: 403,
                www_authenticate: None,
                body: "Access denied.",
            }),
        }
    }

    /// `Ok(())` when granted, otherwise the challenge to send back.
    pub fn check(&self, presented: &Presented) -> Result<(), Challenge> {
        if self.is_granted(presented) {
            return Ok(());
        }
        match self.challenge() {
            Some(challenge) => Err(challenge),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(extra: &str) -> SiteConfig {
        SiteConfig::from_toml_str(&format!(
            "posts_endpoint = \"https://x.test/wp-json/wp/v2/posts\"\n{}",
            extra
        ))
        .unwrap()
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(AccessMode::from("basic".to_string()), AccessMode::Basic);
        assert_eq!(AccessMode::from("TOKEN".to_string()), AccessMode::Token);
        assert_eq!(AccessMode::from("whatever".to_string()), AccessMode::None);
        assert_eq!(config("access_mode = \"ldap\"").access_mode(), AccessMode::None);
    }

    #[test]
    fn test_none_always_granted() {
        let config = config("");
        let gate = AccessControl::new(&config);
        assert!(gate.is_granted(&Presented::default()));
        assert!(gate.challenge().is_none());
    }

    #[test]
    fn test_basic_mode() {
        let config = config(
            "access_mode = \"basic\"\naccess_basic_user = \"admin\"\naccess_basic_password = \"s3cret\"",
        );
        let gate = AccessControl::new(&config);

        assert!(gate.is_granted(&Presented::basic("admin", "s3cret")));
        assert!(!gate.is_granted(&Presented::basic("admin", "wrong")));
        assert!(!gate.is_granted(&Presented::default()));

        let challenge = gate.check(&Presented::default()).unwrap_err();
        assert_eq!(challenge.status, 401);
        assert_eq!(challenge.www_authenticate, Some("Basic realm=\"WP Quick Tools\""));
    }

    #[test]
    fn test_token_mode() {
        let config = config("access_mode = \"token\"\naccess_token = \"long-random\"");
        let gate = AccessControl::new(&config);

        assert!(gate.is_granted(&Presented::token("long-random")));
        assert!(!gate.is_granted(&Presented::token("nope")));
        assert!(!gate.is_granted(&Presented::token("")));

        let challenge = gate.check(&Presented::default()).unwrap_err();
        assert_eq!(challenge.status, 403);
        assert_eq!(challenge.body, "Access denied.");
    }

    #[test]
    fn test_empty_configured_token_never_matches() {
        let config = config("access_mode = \"token\"");
        let gate = AccessControl::new(&config);
        assert!(!gate.is_granted(&Presented::token("")));
    }
}
