use crate::error::{config_error, env_error, AppResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the optional OAuth settings file
pub const OAUTH_SETTINGS_PATH: &str = "config/oauth_settings.toml";

/// Default delegated scopes requested at sign-in
pub const DEFAULT_SCOPES: &str =
    "openid profile offline_access user.read mailboxsettings.read calendars.readwrite";

/// Default lifetime of a visitor session
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Main configuration structure for the web app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application (client) ID from the app registration
    pub client_id: String,
    /// Client secret from the app registration
    pub client_secret: String,
    /// Tenant used to build the authority URL
    pub tenant: String,
    /// Redirect URI registered for the app
    pub redirect_uri: String,
    /// Delegated scopes requested at sign-in
    pub scopes: Vec<String>,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Directory served under /static
    pub static_dir: PathBuf,
    /// Directory that holds downloaded profile photos
    pub photo_dir: PathBuf,
    /// Redis URL for the session store, in-memory sessions when absent
    pub redis_url: Option<String>,
    /// Session lifetime in seconds
    pub session_ttl_seconds: u64,
}

/// Values read from `config/oauth_settings.toml`
#[derive(Debug, Default, Deserialize)]
struct OAuthSettings {
    app_id: Option<String>,
    app_secret: Option<String>,
    tenant: Option<String>,
    redirect: Option<String>,
    scopes: Option<String>,
}

impl Config {
    /// Load configuration from environment and the OAuth settings file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let settings = OAuthSettings::read(Path::new(OAUTH_SETTINGS_PATH))?;
        Self::from_sources(settings)
    }

    fn from_sources(settings: OAuthSettings) -> AppResult<Self> {
        // Environment wins over the settings file
        let client_id = env::var("GRAPH_CLIENT_ID")
            .ok()
            .or(settings.app_id)
            .ok_or_else(|| env_error("GRAPH_CLIENT_ID"))?;
        let client_secret = env::var("GRAPH_CLIENT_SECRET")
            .ok()
            .or(settings.app_secret)
            .ok_or_else(|| env_error("GRAPH_CLIENT_SECRET"))?;

        let tenant = env::var("GRAPH_TENANT")
            .ok()
            .or(settings.tenant)
            .unwrap_or_else(|| String::from("common"));
        let redirect_uri = env::var("GRAPH_REDIRECT_URI")
            .ok()
            .or(settings.redirect)
            .unwrap_or_else(|| String::from("http://localhost:8000/callback"));
        let scopes = parse_scopes(
            &env::var("GRAPH_SCOPES")
                .ok()
                .or(settings.scopes)
                .unwrap_or_else(|| String::from(DEFAULT_SCOPES)),
        );
        if scopes.is_empty() {
            return Err(config_error("At least one scope must be configured"));
        }

        let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| String::from("127.0.0.1"));
        let port = match env::var("PORT") {
            Ok(port) => port
                .parse::<u16>()
                .map_err(|_| config_error("Invalid PORT format"))?,
            Err(_) => 8000,
        };

        let static_dir = PathBuf::from(env::var("STATIC_DIR").unwrap_or_else(|_| "static".into()));
        let photo_dir = env::var("PHOTO_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| static_dir.join("tmp"));

        let redis_url = env::var("REDIS_URL").ok().filter(|url| !url.is_empty());

        let session_ttl_seconds = match env::var("SESSION_TTL_SECONDS") {
            Ok(ttl) => ttl
                .parse::<u64>()
                .map_err(|_| config_error("Invalid SESSION_TTL_SECONDS format"))?,
            Err(_) => DEFAULT_SESSION_TTL_SECONDS,
        };

        Ok(Config {
            client_id,
            client_secret,
            tenant,
            redirect_uri,
            scopes,
            bind_address,
            port,
            static_dir,
            photo_dir,
            redis_url,
            session_ttl_seconds,
        })
    }

    /// Authority URL for the configured tenant
    pub fn authority(&self) -> String {
        format!("https://login.microsoftonline.com/{}", self.tenant)
    }
}

impl OAuthSettings {
    /// A missing file is not an error, a malformed one is
    fn read(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(_) => Ok(Self::default()),
        }
    }
}

/// Split a scope list on whitespace or commas
pub fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scopes() {
        assert_eq!(
            parse_scopes("user.read  calendars.readwrite"),
            vec!["user.read", "calendars.readwrite"]
        );
        assert_eq!(parse_scopes("a,b, c"), vec!["a", "b", "c"]);
        assert!(parse_scopes("  ").is_empty());
    }

    #[test]
    fn test_settings_file_parses() {
        let settings: OAuthSettings = toml::from_str(
            r#"
            app_id = "abc"
            app_secret = "shh"
            redirect = "http://localhost:8000/callback"
            scopes = "user.read"
            "#,
        )
        .unwrap();

        assert_eq!(settings.app_id.as_deref(), Some("abc"));
        assert_eq!(settings.tenant, None);
        assert_eq!(settings.scopes.as_deref(), Some("user.read"));
    }

    #[test]
    fn test_missing_settings_file_is_empty() {
        let settings = OAuthSettings::read(Path::new("does/not/exist.toml")).unwrap();
        assert!(settings.app_id.is_none());
    }
}
