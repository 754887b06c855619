//! Page and post template choices.
//!
//! WordPress lists the templates a theme offers in the `template` enum of the
//! collection schema (returned by an OPTIONS request). That list is merged
//! with the labels from the site configuration. Results are kept in a
//! [`TemplateCache`] owned by the caller.

use super::credentials_for;
use crate::config::{SiteConfig, TemplateMap};
use crate::rest::RestClient;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_TEMPLATE_LABEL: &str = "— Default Template —";

/// Configured entry that stands for "let me type a file name"
const CUSTOM_TEMPLATE_KEY: &str = "__custom__";

const TEMPLATE_PREFIXES: [&str; 4] = ["template", "page", "single", "tpl"];

/// Resolved template maps keyed by kind and endpoint.
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: Mutex<HashMap<String, TemplateMap>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<TemplateMap> {
        self.entries.lock().get(key).cloned()
    }

    pub fn insert(&self, key: String, templates: TemplateMap) {
        self.entries.lock().insert(key, templates);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TemplateKind {
    Page,
    Post,
}

impl TemplateKind {
    fn as_str(&self) -> &str {
        match self {
            TemplateKind::Page => "page",
            TemplateKind::Post => "post",
        }
    }

    fn endpoint<'c>(&self, config: &'c SiteConfig) -> &'c str {
        match self {
            TemplateKind::Page => config.pages_endpoint(),
            TemplateKind::Post => config.posts_endpoint(),
        }
    }

    fn configured<'c>(&self, config: &'c SiteConfig) -> &'c TemplateMap {
        match self {
            TemplateKind::Page => config.page_templates(),
            TemplateKind::Post => config.post_templates(),
        }
    }
}

pub struct TemplateResolver<'a> {
    config: &'a SiteConfig,
    client: &'a RestClient,
    cache: &'a TemplateCache,
}

impl<'a> TemplateResolver<'a> {
    pub fn new(config: &'a SiteConfig, client: &'a RestClient, cache: &'a TemplateCache) -> Self {
        Self {
            config,
            client,
            cache,
        }
    }

    /// Templates offered for pages, default entry first.
    pub async fn page_templates(&self) -> TemplateMap {
        self.resolve(TemplateKind::Page).await
    }

    /// Templates offered for posts, default entry first.
    pub async fn post_templates(&self) -> TemplateMap {
        self.resolve(TemplateKind::Post).await
    }

    async fn resolve(&self, kind: TemplateKind) -> TemplateMap {
        let endpoint = kind.endpoint(self.config);
        let key = format!("{}:{}", kind.as_str(), endpoint);
        if let Some(templates) = self.cache.get(&key) {
            return templates;
        }

        let mut templates = self.fetch_from_schema(endpoint).await;
        for (file, label) in kind.configured(self.config) {
            if file.is_empty() || file == CUSTOM_TEMPLATE_KEY {
                continue;
            }
            templates.insert(file.clone(), label.clone());
        }
        if !templates.contains_key("") {
            templates.shift_insert(0, String::new(), DEFAULT_TEMPLATE_LABEL.to_string());
        }

        self.cache.insert(key, templates.clone());
        templates
    }

    /// Templates from the collection schema; empty on any failure.
    async fn fetch_from_schema(&self, endpoint: &str) -> TemplateMap {
        let mut templates = TemplateMap::new();
        if endpoint.is_empty() {
            return templates;
        }

        let creds = match credentials_for(self.config) {
            Ok(creds) => creds,
            Err(err) => {
                debug!(endpoint, error = %err, "skipping template schema lookup");
                return templates;
            }
        };

        let response = match self
            .client
            .options(endpoint, &creds, self.config.verify_ssl())
            .await
        {
            Ok(response) => response,
            Err(err) => {
                debug!(endpoint, error = %err, "template schema lookup failed");
                return templates;
            }
        };

        let Some(files) = response
            .body
            .as_ref()
            .and_then(|body| body.pointer("/schema/properties/template/enum"))
            .and_then(Value::as_array)
        else {
            debug!(endpoint, "schema has no template enum");
            return templates;
        };

        for file in files.iter().filter_map(Value::as_str) {
            if file.is_empty() {
                templates.insert(String::new(), DEFAULT_TEMPLATE_LABEL.to_string());
            } else {
                templates.insert(file.to_string(), format_template_name(file));
            }
        }
        templates
    }
}

/// Human label for a template file: `template-full-width.php` is `Full Width`.
pub fn format_template_name(filename: &str) -> String {
    let mut name = filename.strip_suffix(".php").unwrap_or(filename);

    for prefix in TEMPLATE_PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            name = rest.strip_prefix('-').unwrap_or(rest);
            break;
        }
    }

    let name = capitalize_words(name.replace(['-', '_'], " ").trim());
    if name.is_empty() || name == "0" {
        filename.to_string()
    } else {
        name
    }
}

fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::services::test_support::*;
    use crate::testing::{reply, FakeSender};

    const SCHEMA: &str = r#"{
        "schema": {"properties": {"template": {
            "type": "string",
            "enum": ["", "template-full-width.php", "page-landing.php", "contact.php"]
        }}}
    }"#;

    fn config_with_templates() -> SiteConfig {
        SiteConfig::from_toml_str(
            r#"
posts_endpoint = "https://x.test/wp-json/wp/v2/posts"
pages_endpoint = "https://x.test/wp-json/wp/v2/pages"
wp_username = "admin"
wp_app_password = "secret"

[page_templates]
"" = "Theme default"
"__custom__" = "Custom..."
"contact.php" = "Contact Us"
"legacy.php" = "Legacy"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_format_template_name() {
        assert_eq!(format_template_name("full-width.php"), "Full Width");
        assert_eq!(format_template_name("landing-page.php"), "Landing Page");
        assert_eq!(format_template_name("single-product.php"), "Product");
        assert_eq!(format_template_name("template-full-width.php"), "Full Width");
        assert_eq!(format_template_name("tpl_sidebar_left.php"), "Sidebar Left");
        assert_eq!(format_template_name("templatecanvas.php"), "Canvas");
        assert_eq!(format_template_name("page.php"), "page.php");
        assert_eq!(format_template_name("élégant-layout.php"), "élégant Layout");
        assert_eq!(format_template_name(""), "");
    }

    #[tokio::test]
    async fn test_schema_merged_with_configured_labels() {
        let sender = FakeSender::new(|_| Ok(reply(200, SCHEMA)));
        let client = sender.client();
        let config = config_with_templates();
        let cache = TemplateCache::new();
        let resolver = TemplateResolver::new(&config, &client, &cache);

        let templates = resolver.page_templates().await;

        let entries: Vec<(&str, &str)> = templates
            .iter()
            .map(|(file, label)| (file.as_str(), label.as_str()))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("", DEFAULT_TEMPLATE_LABEL),
                ("template-full-width.php", "Full Width"),
                ("page-landing.php", "Landing"),
                ("contact.php", "Contact Us"),
                ("legacy.php", "Legacy"),
            ]
        );

        let sent = sender.requests();
        assert_eq!(sent[0].method, HttpMethod::Options);
        assert_eq!(sent[0].url, "https://x.test/wp-json/wp/v2/pages");
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_configured() {
        let sender = FakeSender::new(|_| Ok(reply(401, r#"{"message":"nope"}"#)));
        let client = sender.client();
        let config = config_with_templates();
        let cache = TemplateCache::new();
        let resolver = TemplateResolver::new(&config, &client, &cache);

        let templates = resolver.page_templates().await;

        assert_eq!(templates.get_index(0), Some((&String::new(), &DEFAULT_TEMPLATE_LABEL.to_string())));
        assert_eq!(templates.get("contact.php").map(String::as_str), Some("Contact Us"));
        assert!(!templates.contains_key("__custom__"));
        assert_eq!(templates.len(), 3);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_second_request() {
        let sender = FakeSender::new(|_| Ok(reply(200, SCHEMA)));
        let client = sender.client();
        let config = config_with_templates();
        let cache = TemplateCache::new();
        let resolver = TemplateResolver::new(&config, &client, &cache);

        let first = resolver.page_templates().await;
        let second = resolver.page_templates().await;

        assert_eq!(first, second);
        assert_eq!(sender.calls(), 1);

        cache.clear();
        resolver.page_templates().await;
        assert_eq!(sender.calls(), 2);
    }

    #[tokio::test]
    async fn test_page_and_post_cached_separately() {
        let sender = FakeSender::new(|_| Ok(reply(200, "{}")));
        let client = sender.client();
        let config = site();
        let cache = TemplateCache::new();
        let resolver = TemplateResolver::new(&config, &client, &cache);

        let posts = resolver.post_templates().await;
        resolver.page_templates().await;

        assert_eq!(posts.len(), 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(sender.calls(), 2);
    }

    #[test]
    fn test_missing_credentials_skip_lookup() {
        let sender = FakeSender::new(|_| Ok(reply(200, SCHEMA)));
        let client = sender.client();
        let config = SiteConfig::new(POSTS);
        let cache = TemplateCache::new();
        let resolver = TemplateResolver::new(&config, &client, &cache);

        let templates = tokio_test::block_on(resolver.post_templates());

        assert_eq!(templates.len(), 1);
        assert_eq!(sender.calls(), 0);
    }
}
