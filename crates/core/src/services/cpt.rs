use super::{
    copy_id_lists, copy_meta, copy_present, Collection, ContentOps, Fields, ListParams,
};
use crate::config::SiteConfig;
use crate::rest::RestClient;
use crate::result::RequestResult;
use async_trait::async_trait;
use serde_json::Value;

const CPT_FIELDS: [&str; 10] = [
    "title",
    "content",
    "excerpt",
    "status",
    "slug",
    "date",
    "author",
    "featured_media",
    "comment_status",
    "ping_status",
];

const MISSING_ENDPOINT: &str =
    "CPT endpoint could not be determined. Configure posts_endpoint or provide a custom endpoint.";

/// Entry point for custom post types
pub struct CptService<'a> {
    config: &'a SiteConfig,
    client: &'a RestClient,
}

impl<'a> CptService<'a> {
    pub fn new(config: &'a SiteConfig, client: &'a RestClient) -> Self {
        Self { config, client }
    }

    /// Items of the post type `slug`; `endpoint` overrides the derived URL.
    pub fn items(&self, slug: &str, endpoint: Option<&str>) -> CptItems<'a> {
        let endpoint = self.config.build_cpt_endpoint(slug, endpoint);
        CptItems {
            collection: Collection::new(self.config, self.client, endpoint, MISSING_ENDPOINT),
        }
    }

    /// Items of the configured default post type.
    pub fn default_items(&self) -> CptItems<'a> {
        self.items(self.config.cpt_default_slug(), None)
    }
}

pub struct CptItems<'a> {
    collection: Collection<'a>,
}

impl CptItems<'_> {
    pub fn endpoint(&self) -> &str {
        self.collection.endpoint()
    }
}

pub(crate) fn build_payload(data: &Fields) -> Value {
    let mut payload = Fields::new();
    copy_present(&mut payload, data, &CPT_FIELDS);
    copy_id_lists(&mut payload, data);

    // custom taxonomies and other structured values pass through untouched
    for (key, value) in data {
        if payload.contains_key(key) {
            continue;
        }
        let structured = match value {
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            _ => false,
        };
        if structured {
            payload.insert(key.clone(), value.clone());
        }
    }

    copy_meta(&mut payload, data);
    Value::Object(payload)
}

#[async_trait]
impl<'a> ContentOps for CptItems<'a> {
    async fn create(&self, data: &Fields) -> RequestResult {
        self.collection.create(&build_payload(data)).await
    }

    async fn update(&self, id: u64, data: &Fields) -> RequestResult {
        self.collection.update(id, &build_payload(data)).await
    }

    async fn get(&self, id: u64) -> RequestResult {
        self.collection.get(id).await
    }

    async fn list(&self, params: &ListParams) -> RequestResult {
        self.collection.list(params).await
    }

    async fn delete(&self, id: u64, force: bool) -> RequestResult {
        self.collection.delete(id, force).await
    }
}
