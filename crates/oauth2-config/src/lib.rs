use hocon::HoconLoader;
use oauth2_core::ClientAuthentication;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "oauth2.conf";
pub const DEFAULT_AUTHORIZATION_URL: &str = "/oauth2/authorization";
pub const DEFAULT_TOKEN_URL: &str = "/oauth2/token";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to load HOCON configuration: {0}")]
    Hocon(#[from] hocon::Error),
    #[error("failed to load environment configuration: {0}")]
    Environment(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Flows to expose. A missing section means the flow is not configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub authorization_code: Option<AuthorizationCodeConfig>,
    #[serde(default)]
    pub password: Option<PasswordConfig>,
    #[serde(default)]
    pub client_credentials: Option<ClientCredentialsConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthorizationCodeConfig {
    #[serde(default = "default_authorization_code_scheme")]
    pub scheme_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scopes: BTreeMap<String, String>,
    #[serde(default = "default_authorization_url")]
    pub authorization_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Refresh grant URL; equal to `token_url` to serve both on one path.
    #[serde(default)]
    pub refresh_token_url: Option<String>,
    #[serde(default)]
    pub pkce: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PasswordConfig {
    #[serde(default = "default_password_scheme")]
    pub scheme_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scopes: BTreeMap<String, String>,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default)]
    pub refresh_token_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_client_authentication")]
    pub client_authentication: ClientAuthentication,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientCredentialsConfig {
    #[serde(default = "default_client_credentials_scheme")]
    pub scheme_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scopes: BTreeMap<String, String>,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default)]
    pub refresh_token_url: Option<String>,
}

fn default_authorization_code_scheme() -> String {
    "oauth2_authorization_code".to_string()
}

fn default_password_scheme() -> String {
    "oauth2_password".to_string()
}

fn default_client_credentials_scheme() -> String {
    "oauth2_client_credentials".to_string()
}

fn default_authorization_url() -> String {
    DEFAULT_AUTHORIZATION_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

// Parsed from a plain string so every source (HOCON, env) behaves the same.
fn deserialize_client_authentication<'de, D>(d: D) -> Result<ClientAuthentication, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(d)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl Default for AuthorizationCodeConfig {
    fn default() -> Self {
        Self {
            scheme_name: default_authorization_code_scheme(),
            description: None,
            scopes: BTreeMap::new(),
            authorization_url: default_authorization_url(),
            token_url: default_token_url(),
            refresh_token_url: None,
            pkce: false,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            scheme_name: default_password_scheme(),
            description: None,
            scopes: BTreeMap::new(),
            token_url: default_token_url(),
            refresh_token_url: None,
            client_authentication: ClientAuthentication::Body,
        }
    }
}

impl Default for ClientCredentialsConfig {
    fn default() -> Self {
        Self {
            scheme_name: default_client_credentials_scheme(),
            description: None,
            scopes: BTreeMap::new(),
            token_url: default_token_url(),
            refresh_token_url: None,
        }
    }
}

impl Config {
    /// Load from `$OAUTH2_CONFIG` (or `oauth2.conf`), falling back to environment variables.
    pub fn load() -> Self {
        let path = std::env::var("OAUTH2_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        Self::from_hocon_path(&path).unwrap_or_else(|e| {
            tracing::warn!(
                "Failed to load HOCON config: {}. Falling back to environment variables.",
                e
            );
            Self::from_env_fallback()
        })
    }

    /// Load configuration from a specific HOCON file path
    pub fn from_hocon_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let config: Config = HoconLoader::new().load_file(path)?.resolve()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `OAUTH2_<SECTION>__<FIELD>` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: Config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("OAUTH2")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Every flow with defaults, overridable through flat `OAUTH2_*` variables.
    /// A flow is left out when `OAUTH2_<FLOW>_ENABLED=false`.
    pub fn from_env_fallback() -> Self {
        let mut config = Self::default();

        if env_enabled("AUTHORIZATION_CODE") {
            let mut section = AuthorizationCodeConfig::default();
            apply_env(
                "AUTHORIZATION_CODE",
                &mut section.scheme_name,
                &mut section.description,
                &mut section.scopes,
            );
            if let Some(url) = env_var("AUTHORIZATION_CODE", "AUTHORIZATION_URL") {
                section.authorization_url = url;
            }
            if let Some(url) = env_var("AUTHORIZATION_CODE", "TOKEN_URL") {
                section.token_url = url;
            }
            section.refresh_token_url = env_var("AUTHORIZATION_CODE", "REFRESH_TOKEN_URL");
            section.pkce = env_var("AUTHORIZATION_CODE", "PKCE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(false);
            config.authorization_code = Some(section);
        }

        if env_enabled("PASSWORD") {
            let mut section = PasswordConfig::default();
            apply_env(
                "PASSWORD",
                &mut section.scheme_name,
                &mut section.description,
                &mut section.scopes,
            );
            if let Some(url) = env_var("PASSWORD", "TOKEN_URL") {
                section.token_url = url;
            }
            section.refresh_token_url = env_var("PASSWORD", "REFRESH_TOKEN_URL");
            if let Some(mode) = env_var("PASSWORD", "CLIENT_AUTHENTICATION") {
                match mode.parse() {
                    Ok(mode) => section.client_authentication = mode,
                    Err(e) => {
                        tracing::warn!("Ignoring OAUTH2_PASSWORD_CLIENT_AUTHENTICATION: {}", e)
                    }
                }
            }
            config.password = Some(section);
        }

        if env_enabled("CLIENT_CREDENTIALS") {
            let mut section = ClientCredentialsConfig::default();
            apply_env(
                "CLIENT_CREDENTIALS",
                &mut section.scheme_name,
                &mut section.description,
                &mut section.scopes,
            );
            if let Some(url) = env_var("CLIENT_CREDENTIALS", "TOKEN_URL") {
                section.token_url = url;
            }
            section.refresh_token_url = env_var("CLIENT_CREDENTIALS", "REFRESH_TOKEN_URL");
            config.client_credentials = Some(section);
        }

        if let Err(e) = config.validate() {
            tracing::warn!("Environment configuration is invalid: {}", e);
        }
        config
    }

    /// Reject empty scheme names, empty URLs and scheme names used twice.
    /// Token URLs shared between sections are only warned about.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        let mut check = |section: &str, scheme_name: &str, urls: &[(&str, Option<&str>)]| {
            if scheme_name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{}.scheme_name must not be empty",
                    section
                )));
            }
            if !seen.insert(scheme_name.to_string()) {
                return Err(ConfigError::Invalid(format!(
                    "{}.scheme_name '{}' is already used by another flow",
                    section, scheme_name
                )));
            }
            for (field, url) in urls {
                if matches!(url, Some(u) if u.trim().is_empty()) {
                    return Err(ConfigError::Invalid(format!(
                        "{}.{} must not be empty",
                        section, field
                    )));
                }
            }
            Ok(())
        };

        if let Some(ac) = &self.authorization_code {
            check(
                "authorization_code",
                &ac.scheme_name,
                &[
                    ("authorization_url", Some(ac.authorization_url.as_str())),
                    ("token_url", Some(ac.token_url.as_str())),
                    ("refresh_token_url", ac.refresh_token_url.as_deref()),
                ],
            )?;
        }
        if let Some(pw) = &self.password {
            check(
                "password",
                &pw.scheme_name,
                &[
                    ("token_url", Some(pw.token_url.as_str())),
                    ("refresh_token_url", pw.refresh_token_url.as_deref()),
                ],
            )?;
        }
        if let Some(cc) = &self.client_credentials {
            check(
                "client_credentials",
                &cc.scheme_name,
                &[
                    ("token_url", Some(cc.token_url.as_str())),
                    ("refresh_token_url", cc.refresh_token_url.as_deref()),
                ],
            )?;
        }

        for (url, sections) in self.shared_token_urls() {
            tracing::warn!(
                url = %url,
                sections = ?sections,
                "token URL is shared by several flows; only the first one installed will serve it"
            );
        }
        Ok(())
    }

    /// Token URLs claimed by more than one section.
    pub fn shared_token_urls(&self) -> BTreeMap<&str, Vec<&'static str>> {
        let mut by_url: BTreeMap<&str, Vec<&'static str>> = BTreeMap::new();
        if let Some(ac) = &self.authorization_code {
            by_url
                .entry(ac.token_url.as_str())
                .or_default()
                .push("authorization_code");
        }
        if let Some(pw) = &self.password {
            by_url.entry(pw.token_url.as_str()).or_default().push("password");
        }
        if let Some(cc) = &self.client_credentials {
            by_url
                .entry(cc.token_url.as_str())
                .or_default()
                .push("client_credentials");
        }
        by_url.retain(|_, sections| sections.len() > 1);
        by_url
    }

    pub fn is_empty(&self) -> bool {
        self.authorization_code.is_none()
            && self.password.is_none()
            && self.client_credentials.is_none()
    }
}

fn env_var(section: &str, field: &str) -> Option<String> {
    std::env::var(format!("OAUTH2_{}_{}", section, field))
        .ok()
        .filter(|v| !v.is_empty())
}

fn env_enabled(section: &str) -> bool {
    env_var(section, "ENABLED")
        .and_then(|v| v.parse().ok())
        .unwrap_or(true)
}

fn apply_env(
    section: &str,
    scheme_name: &mut String,
    description: &mut Option<String>,
    scopes: &mut BTreeMap<String, String>,
) {
    if let Some(name) = env_var(section, "SCHEME_NAME") {
        *scheme_name = name;
    }
    if let Some(text) = env_var(section, "DESCRIPTION") {
        *description = Some(text);
    }
    if let Some(raw) = env_var(section, "SCOPES") {
        *scopes = parse_scopes(&raw);
    }
}

/// `read=Read access,write` style scope lists. A scope without `=` gets an
/// empty description.
pub fn parse_scopes(raw: &str) -> BTreeMap<String, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((name, description)) => {
                (name.trim().to_string(), description.trim().to_string())
            }
            None => (entry.to_string(), String::new()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    fn write_conf(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".conf")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_sections_from_hocon() {
        let file = write_conf(
            r#"
            password {
              scheme_name = "petstore_password"
              description = "Resource owner password"
              token_url = "/auth/token"
              refresh_token_url = "/auth/token"
              client_authentication = "header"
              scopes {
                read = "Read access"
                write = "Write access"
              }
            }
            client_credentials {
              token_url = "/auth/cc"
            }
            "#,
        );

        let config = Config::from_hocon_path(file.path()).unwrap();
        let password = config.password.unwrap();
        assert_eq!(password.scheme_name, "petstore_password");
        assert_eq!(password.token_url, "/auth/token");
        assert_eq!(password.refresh_token_url.as_deref(), Some("/auth/token"));
        assert_eq!(password.client_authentication, ClientAuthentication::Header);
        assert_eq!(
            password.scopes.get("read").map(String::as_str),
            Some("Read access")
        );

        let cc = config.client_credentials.unwrap();
        assert_eq!(cc.scheme_name, "oauth2_client_credentials");
        assert_eq!(cc.token_url, "/auth/cc");
        assert!(config.authorization_code.is_none());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = Config::from_hocon_path("/nonexistent/oauth2.conf").unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn unknown_client_authentication_is_rejected() {
        let file = write_conf(r#"password { client_authentication = "cookie" }"#);
        assert!(Config::from_hocon_path(file.path()).is_err());
    }

    #[test]
    fn validate_rejects_empty_urls_and_duplicate_names() {
        let mut config = Config {
            password: Some(PasswordConfig::default()),
            ..Config::default()
        };
        assert!(config.validate().is_ok());

        config.password.as_mut().unwrap().token_url = " ".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.password = Some(PasswordConfig {
            scheme_name: "shared".into(),
            ..PasswordConfig::default()
        });
        config.client_credentials = Some(ClientCredentialsConfig {
            scheme_name: "shared".into(),
            ..ClientCredentialsConfig::default()
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("already used"));
    }

    #[test]
    fn validate_rejects_empty_scheme_name() {
        let config = Config {
            authorization_code: Some(AuthorizationCodeConfig {
                scheme_name: String::new(),
                ..AuthorizationCodeConfig::default()
            }),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn defaults_use_standard_urls() {
        let ac = AuthorizationCodeConfig::default();
        assert_eq!(ac.authorization_url, "/oauth2/authorization");
        assert_eq!(ac.token_url, "/oauth2/token");
        assert!(!ac.pkce);
        assert_eq!(
            PasswordConfig::default().client_authentication,
            ClientAuthentication::Body
        );
    }

    #[test]
    fn shared_token_urls_are_reported() {
        let config = Config {
            authorization_code: Some(AuthorizationCodeConfig::default()),
            password: Some(PasswordConfig::default()),
            client_credentials: Some(ClientCredentialsConfig {
                token_url: "/oauth2/cc".into(),
                ..ClientCredentialsConfig::default()
            }),
        };
        let shared = config.shared_token_urls();
        assert_eq!(shared.len(), 1);
        assert_eq!(
            shared["/oauth2/token"],
            vec!["authorization_code", "password"]
        );
        assert!(config.validate().is_ok());

        let config = Config {
            password: Some(PasswordConfig::default()),
            client_credentials: Some(ClientCredentialsConfig {
                token_url: "/oauth2/cc".into(),
                ..ClientCredentialsConfig::default()
            }),
            ..Config::default()
        };
        assert!(config.shared_token_urls().is_empty());
    }

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_oauth2_env() {
        for (key, _) in std::env::vars() {
            if key.starts_with("OAUTH2_") {
                std::env::remove_var(key);
            }
        }
    }

    /// Run `f` with exactly `vars` as the `OAUTH2_*` environment.
    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_oauth2_env();
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let result = f();
        clear_oauth2_env();
        result
    }

    #[test]
    fn from_env_reads_nested_sections() {
        let config = with_env(
            &[
                ("OAUTH2_PASSWORD__TOKEN_URL", "/env/token"),
                ("OAUTH2_PASSWORD__CLIENT_AUTHENTICATION", "header"),
            ],
            Config::from_env,
        )
        .unwrap();

        let password = config.password.unwrap();
        assert_eq!(password.token_url, "/env/token");
        assert_eq!(password.client_authentication, ClientAuthentication::Header);
        assert_eq!(password.scheme_name, "oauth2_password");
        assert!(config.authorization_code.is_none());
        assert!(config.client_credentials.is_none());
    }

    #[test]
    fn env_fallback_honours_enabled_flags_and_overrides() {
        let config = with_env(
            &[
                ("OAUTH2_PASSWORD_ENABLED", "false"),
                ("OAUTH2_CLIENT_CREDENTIALS_TOKEN_URL", "/cc/token"),
                ("OAUTH2_CLIENT_CREDENTIALS_SCOPES", "read=Read access,write"),
                ("OAUTH2_AUTHORIZATION_CODE_PKCE", "true"),
            ],
            Config::from_env_fallback,
        );

        assert!(config.password.is_none());
        let cc = config.client_credentials.unwrap();
        assert_eq!(cc.token_url, "/cc/token");
        assert_eq!(cc.scopes["read"], "Read access");
        assert_eq!(cc.scopes["write"], "");
        let ac = config.authorization_code.unwrap();
        assert!(ac.pkce);
        assert_eq!(ac.token_url, DEFAULT_TOKEN_URL);
    }

    #[test]
    fn load_falls_back_to_env_when_file_is_missing() {
        let config = with_env(
            &[
                ("OAUTH2_CONFIG", "/nonexistent/oauth2.conf"),
                ("OAUTH2_CLIENT_CREDENTIALS_ENABLED", "false"),
            ],
            Config::load,
        );

        assert!(config.authorization_code.is_some());
        assert!(config.password.is_some());
        assert!(config.client_credentials.is_none());
    }

    #[test]
    fn load_reads_the_file_named_by_env() {
        let file = write_conf(r#"client_credentials { token_url = "/file/cc" }"#);
        let path = file.path().to_string_lossy().into_owned();
        let config = with_env(&[("OAUTH2_CONFIG", path.as_str())], Config::load);

        assert_eq!(config.client_credentials.unwrap().token_url, "/file/cc");
        assert!(config.password.is_none());
    }

    #[test]
    fn scope_lists_parse() {
        let scopes = parse_scopes("read=Read access, write ,,admin = Admin");
        assert_eq!(scopes.len(), 3);
        assert_eq!(scopes["read"], "Read access");
        assert_eq!(scopes["write"], "");
        assert_eq!(scopes["admin"], "Admin");
    }
}
