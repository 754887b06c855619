//! One configured WordPress site and the services that act on it.

use crate::config::{ConfigLoader, SiteConfig};
use crate::error::Result;
use crate::rest::RestClient;
use crate::services::cpt::CptService;
use crate::services::media::MediaService;
use crate::services::menu::MenuService;
use crate::services::page::PageService;
use crate::services::post::PostService;
use crate::services::taxonomy::TaxonomyService;
use crate::services::template::{TemplateCache, TemplateResolver};
use tracing::debug;

/// Owns the configuration, the REST client and the template cache of one
/// site, and hands out borrowed service views.
pub struct QuickWp {
    key: String,
    config: SiteConfig,
    client: RestClient,
    templates: TemplateCache,
}

impl QuickWp {
    pub fn new(config: SiteConfig, client: RestClient) -> Self {
        Self {
            key: String::new(),
            config,
            client,
            templates: TemplateCache::new(),
        }
    }

    /// Resolve `requested` (or the default site) through `loader` and build
    /// a client for it.
    pub fn from_loader(loader: &ConfigLoader, requested: Option<&str>) -> Result<Self> {
        let key = loader.resolve_site_key(requested)?;
        let config = loader.site_config(&key)?;
        debug!(site = %key, posts_endpoint = config.posts_endpoint(), "loaded site");

        Ok(Self {
            key,
            ..Self::new(config, RestClient::new()?)
        })
    }

    /// Same site and client with per-call credential overrides applied.
    pub fn with_credentials(self, username: Option<&str>, app_password: Option<&str>) -> Self {
        let config = self.config.with_credentials(username, app_password);
        Self {
            config,
            templates: TemplateCache::new(),
            ..self
        }
    }

    /// Site key this instance was loaded for; empty for the base config.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }

    pub fn posts(&self) -> PostService<'_> {
        PostService::new(&self.config, &self.client)
    }

    pub fn pages(&self) -> PageService<'_> {
        PageService::new(&self.config, &self.client)
    }

    pub fn cpt(&self) -> CptService<'_> {
        CptService::new(&self.config, &self.client)
    }

    pub fn media(&self) -> MediaService<'_> {
        MediaService::new(&self.config, &self.client)
    }

    pub fn taxonomy(&self) -> TaxonomyService<'_> {
        TaxonomyService::new(&self.config, &self.client)
    }

    pub fn menus(&self) -> MenuService<'_> {
        MenuService::new(&self.config, &self.client)
    }

    pub fn templates(&self) -> TemplateResolver<'_> {
        TemplateResolver::new(&self.config, &self.client, &self.templates)
    }

    pub fn clear_template_cache(&self) {
        self.templates.clear();
    }
}
