use super::{
    copy_id_lists, copy_meta, copy_present, Collection, ContentOps, Fields, ListParams,
};
use crate::config::SiteConfig;
use crate::rest::RestClient;
use crate::result::RequestResult;
use async_trait::async_trait;
use serde_json::Value;

const POST_FIELDS: [&str; 13] = [
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
    "format",
    "sticky",
    "template",
];

/// Posts on the configured posts endpoint
pub struct PostService<'a> {
    collection: Collection<'a>,
}

impl<'a> PostService<'a> {
    pub fn new(config: &'a SiteConfig, client: &'a RestClient) -> Self {
        Self {
            collection: Collection::new(
                config,
                client,
                config.posts_endpoint(),
                "Posts endpoint not configured.",
            ),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.collection.endpoint()
    }
}

pub(crate) fn build_payload(data: &Fields) -> Value {
    let mut payload = Fields::new();
    copy_present(&mut payload, data, &POST_FIELDS);
    copy_id_lists(&mut payload, data);
    copy_meta(&mut payload, data);
    Value::Object(payload)
}

#[async_trait]
impl<'a> ContentOps for PostService<'a> {
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
