//! Configuration management for quickwp
//!
//! A base configuration (`quick-config.toml`) holds defaults for every site.
//! An optional `quick-sites.toml` lists named sites whose tables override the
//! base keys one by one:
//!
//! ```toml
//! default_site = "main"
//!
//! [sites.main]
//! label = "Main Site"
//! posts_endpoint = "https://example.com/wp-json/wp/v2/posts"
//!
//! [sites.staging]
//! posts_endpoint = "https://staging.example.com/?rest_route=/wp/v2/posts"
//! verify_ssl = false
//! ```

use crate::access::AccessMode;
use crate::endpoint::{base_api_root, derive_endpoint};
use crate::error::{Error, Result};
use crate::rest::Credentials;
use dirs::config_dir;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use toml::Table;

/// Configuration directory name
const CONFIG_DIR: &str = "quickwp";

/// Base configuration file name
const BASE_CONFIG_FILE: &str = "quick-config.toml";

/// Multi-site configuration file name
const SITES_CONFIG_FILE: &str = "quick-sites.toml";

/// Template file name to display label, in display order
pub type TemplateMap = IndexMap<String, String>;

/// Settings for one WordPress site.
///
/// Built once from the merged configuration files and never mutated;
/// adjustments produce a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    label: String,

    posts_endpoint: String,
    pages_endpoint: String,
    media_endpoint: String,

    // Derived from posts_endpoint when empty
    categories_endpoint: String,
    tags_endpoint: String,

    wp_username: String,
    wp_app_password: String,

    verify_ssl: bool,
    debug_http: bool,
    show_auth_form: bool,

    access_mode: AccessMode,
    access_basic_user: String,
    access_basic_password: String,
    access_token: String,

    cpt_default_slug: String,

    page_templates: TemplateMap,
    post_templates: TemplateMap,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            label: String::new(),
            posts_endpoint: String::new(),
            pages_endpoint: String::new(),
            media_endpoint: String::new(),
            categories_endpoint: String::new(),
            tags_endpoint: String::new(),
            wp_username: String::new(),
            wp_app_password: String::new(),
            verify_ssl: true,
            debug_http: false,
            show_auth_form: true,
            access_mode: AccessMode::None,
            access_basic_user: String::new(),
            access_basic_password: String::new(),
            access_token: String::new(),
            cpt_default_slug: default_cpt_slug(),
            page_templates: TemplateMap::new(),
            post_templates: TemplateMap::new(),
        }
    }
}

fn default_cpt_slug() -> String {
    "post".to_string()
}

impl SiteConfig {
    /// Configuration for a site whose pages and media endpoints follow the
    /// posts endpoint.
    pub fn new(posts_endpoint: impl Into<String>) -> Self {
        let posts_endpoint = posts_endpoint.into();
        Self {
            pages_endpoint: derive_endpoint(&posts_endpoint, "pages"),
            media_endpoint: derive_endpoint(&posts_endpoint, "media"),
            posts_endpoint,
            ..Self::default()
        }
    }

    /// Parse a merged configuration table.
    pub fn from_table(table: Table) -> Result<Self> {
        Ok(toml::Value::Table(table).try_into::<SiteConfig>()?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Copy with the given credentials replacing the configured ones.
    ///
    /// `None` keeps the configured value; this is how per-request overrides
    /// (the CLI's `--user` / `--app-password`) are applied.
    pub fn with_credentials(&self, username: Option<&str>, app_password: Option<&str>) -> Self {
        let mut config = self.clone();
        if let Some(username) = username {
            config.wp_username = username.to_string();
        }
        if let Some(app_password) = app_password {
            config.wp_app_password = app_password.to_string();
        }
        config
    }

    pub fn with_verify_ssl(&self, verify_ssl: bool) -> Self {
        Self {
            verify_ssl,
            ..self.clone()
        }
    }

    pub fn with_label(&self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..self.clone()
        }
    }

    /// Copy with every key of `overrides` replacing the matching setting.
    pub fn merged_with(&self, overrides: &Table) -> Result<Self> {
        let mut table = match toml::Value::try_from(self)? {
            toml::Value::Table(table) => table,
            _ => Table::new(),
        };
        for (key, value) in overrides {
            table.insert(key.clone(), value.clone());
        }
        Self::from_table(table)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn posts_endpoint(&self) -> &str {
        &self.posts_endpoint
    }

    pub fn pages_endpoint(&self) -> &str {
        &self.pages_endpoint
    }

    /// Media endpoint, derived from the posts endpoint when not configured.
    pub fn media_endpoint(&self) -> String {
        self.configured_or_derived(&self.media_endpoint, "media")
    }

    pub fn categories_endpoint(&self) -> String {
        self.configured_or_derived(&self.categories_endpoint, "categories")
    }

    pub fn tags_endpoint(&self) -> String {
        self.configured_or_derived(&self.tags_endpoint, "tags")
    }

    fn configured_or_derived(&self, configured: &str, target: &str) -> String {
        if configured.is_empty() {
            derive_endpoint(&self.posts_endpoint, target)
        } else {
            configured.to_string()
        }
    }

    /// Endpoint for a custom post type.
    ///
    /// A non-empty `custom` endpoint wins; an empty slug falls back to the
    /// posts endpoint.
    pub fn build_cpt_endpoint(&self, slug: &str, custom: Option<&str>) -> String {
        if let Some(custom) = custom.map(str::trim).filter(|c| !c.is_empty()) {
            return custom.to_string();
        }

        let slug = slug.trim();
        if slug.is_empty() {
            return self.posts_endpoint.clone();
        }

        derive_endpoint(&self.posts_endpoint, slug)
    }

    /// The `/wp/v2` root that menu endpoints hang off.
    pub fn base_endpoint(&self) -> String {
        base_api_root(&self.posts_endpoint)
    }

    pub fn username(&self) -> &str {
        &self.wp_username
    }

    pub fn app_password(&self) -> &str {
        &self.wp_app_password
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.wp_username.clone(), self.wp_app_password.clone())
    }

    pub fn has_credentials(&self) -> bool {
        !self.wp_username.is_empty() && !self.wp_app_password.is_empty()
    }

    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    pub fn debug_http(&self) -> bool {
        self.debug_http
    }

    pub fn show_auth_form(&self) -> bool {
        self.show_auth_form
    }

    pub fn access_mode(&self) -> AccessMode {
        self.access_mode
    }

    pub fn access_basic_user(&self) -> &str {
        &self.access_basic_user
    }

    pub fn access_basic_password(&self) -> &str {
        &self.access_basic_password
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn cpt_default_slug(&self) -> &str {
        &self.cpt_default_slug
    }

    pub fn page_templates(&self) -> &TemplateMap {
        &self.page_templates
    }

    pub fn post_templates(&self) -> &TemplateMap {
        &self.post_templates
    }
}

/// Contents of `quick-sites.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SitesFile {
    pub default_site: String,
    pub sites: IndexMap<String, Table>,
}

/// Reads the base and multi-site configuration files from one directory.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Loader for `~/.config/quickwp` (or the platform equivalent)
    pub fn from_default_dir() -> Result<Self> {
        Ok(Self::new(default_config_dir()?))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn base_config_path(&self) -> PathBuf {
        self.base_dir.join(BASE_CONFIG_FILE)
    }

    pub fn sites_config_path(&self) -> PathBuf {
        self.base_dir.join(SITES_CONFIG_FILE)
    }

    /// Raw base configuration table; empty when the file does not exist.
    pub fn load_base_config(&self) -> Result<Table> {
        match read_optional(&self.base_config_path())? {
            Some(content) => toml::from_str(&content).map_err(|e| {
                Error::InvalidConfig(format!("Failed to parse {}: {}", BASE_CONFIG_FILE, e))
            }),
            None => Ok(Table::new()),
        }
    }

    pub fn load_sites_config(&self) -> Result<SitesFile> {
        match read_optional(&self.sites_config_path())? {
            Some(content) => toml::from_str(&content).map_err(|e| {
                Error::InvalidConfig(format!("Failed to parse {}: {}", SITES_CONFIG_FILE, e))
            }),
            None => Ok(SitesFile::default()),
        }
    }

    /// Site tables in file order.
    pub fn sites(&self) -> Result<IndexMap<String, Table>> {
        Ok(self.load_sites_config()?.sites)
    }

    /// Configured default site, else the first site, else empty.
    pub fn default_site_key(&self) -> Result<String> {
        let sites = self.load_sites_config()?;
        if !sites.default_site.is_empty() {
            return Ok(sites.default_site);
        }
        Ok(sites.sites.keys().next().cloned().unwrap_or_default())
    }

    /// `requested` when it names a configured site, otherwise the default.
    pub fn resolve_site_key(&self, requested: Option<&str>) -> Result<String> {
        if let Some(key) = requested.filter(|k| !k.is_empty()) {
            if self.load_sites_config()?.sites.contains_key(key) {
                return Ok(key.to_string());
            }
        }
        self.default_site_key()
    }

    /// Base configuration with the site's keys laid over it.
    ///
    /// An empty or unknown key yields the base configuration alone.
    pub fn site_config(&self, key: &str) -> Result<SiteConfig> {
        let mut table = self.load_base_config()?;
        if !key.is_empty() {
            if let Some(site) = self.load_sites_config()?.sites.get(key) {
                for (name, value) in site {
                    table.insert(name.clone(), value.clone());
                }
            }
        }

        SiteConfig::from_table(table)
            .map_err(|e| Error::InvalidConfig(format!("Invalid settings for site '{}': {}", key, e)))
    }

    /// The site's `label`, or the key itself.
    pub fn site_label(&self, key: &str) -> Result<String> {
        let sites = self.load_sites_config()?;
        let label = sites
            .sites
            .get(key)
            .and_then(|site| site.get("label"))
            .and_then(toml::Value::as_str)
            .filter(|label| !label.is_empty());
        Ok(label.unwrap_or(key).to_string())
    }

    pub fn base_config_exists(&self) -> bool {
        self.base_config_path().exists()
    }

    /// Write the base configuration, readable by the owner only.
    pub fn write_base_config(&self, config: &SiteConfig) -> Result<PathBuf> {
        if !self.base_dir.exists() {
            fs::create_dir_all(&self.base_dir).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let path = self.base_config_path();
        let content = toml::to_string_pretty(config)?;
        fs::write(&path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        // Set secure permissions on config file (read/write for owner only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        Ok(path)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| Error::InvalidConfig(format!("Failed to read {}: {}", path.display(), e)))?;
    Ok(Some(content))
}

/// Get the configuration directory
pub fn default_config_dir() -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| {
        Error::Config("Cannot determine configuration directory".to_string())
    })?;
    Ok(base.join(CONFIG_DIR))
}

/// Validate configuration
pub fn validate_site_config(config: &SiteConfig) -> Result<()> {
    let posts = config.posts_endpoint();
    if posts.is_empty() {
        return Err(Error::Config("posts_endpoint is not configured".to_string()));
    }
    if !posts.starts_with("http://") && !posts.starts_with("https://") {
        return Err(Error::InvalidInput(format!(
            "posts_endpoint must be an http(s) URL, got '{}'",
            posts
        )));
    }

    if !config.has_credentials() {
        return Err(Error::Config(
            "WordPress credentials not configured. Both wp_username and wp_app_password must be set".to_string(),
        ));
    }

    match config.access_mode() {
        AccessMode::Basic
            if config.access_basic_user().is_empty() || config.access_basic_password().is_empty() =>
        {
            Err(Error::Config(
                "access_mode 'basic' requires access_basic_user and access_basic_password".to_string(),
            ))
        }
        AccessMode::Token if config.access_token().is_empty() => Err(Error::Config(
            "access_mode 'token' requires access_token".to_string(),
        )),
        _ => Ok(()),
    }
}
