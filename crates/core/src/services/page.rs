use super::{
    as_int, copy_meta, copy_present, is_blank, Collection, ContentOps, Fields, ListParams,
};
use crate::config::SiteConfig;
use crate::rest::RestClient;
use crate::result::RequestResult;
use async_trait::async_trait;
use serde_json::Value;

const PAGE_FIELDS: [&str; 10] = [
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

/// Pages on the configured pages endpoint, with hierarchy and templates
pub struct PageService<'a> {
    collection: Collection<'a>,
}

impl<'a> PageService<'a> {
    pub fn new(config: &'a SiteConfig, client: &'a RestClient) -> Self {
        Self {
            collection: Collection::new(
                config,
                client,
                config.pages_endpoint(),
                "Pages endpoint not configured.",
            ),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.collection.endpoint()
    }
}

pub(crate) fn build_payload(data: &Fields) -> Value {
    let mut payload = Fields::new();
    copy_present(&mut payload, data, &PAGE_FIELDS);

    // parent_id wins over parent
    for key in ["parent", "parent_id"] {
        if let Some(value) = data.get(key).filter(|v| !v.is_null()) {
            payload.insert("parent".to_string(), Value::from(as_int(value).unwrap_or(0)));
        }
    }
    if let Some(value) = data.get("menu_order").filter(|v| !v.is_null()) {
        payload.insert("menu_order".to_string(), Value::from(as_int(value).unwrap_or(0)));
    }
    if let Some(template) = data.get("template").filter(|v| !is_blank(v)) {
        payload.insert("template".to_string(), template.clone());
    }

    copy_meta(&mut payload, data);
    Value::Object(payload)
}

#[async_trait]
impl<'a> ContentOps for PageService<'a> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use crate::testing::{reply, FakeSender};
    use serde_json::json;

    #[test]
    fn test_parent_id_wins() {
        let data = fields(json!({"title": "About", "parent": 3, "parent_id": "9"}));
        assert_eq!(build_payload(&data), json!({"title": "About", "parent": 9}));
    }

    #[test]
    fn test_page_specific_fields() {
        let data = fields(json!({
            "menu_order": "2",
            "template": "template-full-width.php",
            "categories": "1,2",
            "format": "aside",
            "sticky": true
        }));
        assert_eq!(
            build_payload(&data),
            json!({"menu_order": 2, "template": "template-full-width.php"})
        );
    }

    #[test]
    fn test_empty_template_is_skipped() {
        let data = fields(json!({"template": "", "parent": 0}));
        assert_eq!(build_payload(&data), json!({"parent": 0}));
    }

    #[tokio::test]
    async fn test_pages_use_pages_endpoint() {
        let sender = FakeSender::new(|_| Ok(reply(201, r#"{"id":3}"#)));
        let client = sender.client();
        let config = site();
        let pages = PageService::new(&config, &client);

        pages.create(&fields(json!({"title": "About"}))).await.unwrap();

        assert_eq!(sender.requests()[0].url, "https://x.test/wp-json/wp/v2/pages");
    }

    #[tokio::test]
    async fn test_missing_pages_endpoint() {
        let sender = FakeSender::new(|_| Ok(reply(200, "{}")));
        let client = sender.client();
        let config = crate::config::SiteConfig::from_toml_str(
            "posts_endpoint = \"https://x.test/wp-json/wp/v2/posts\"\nwp_username = \"a\"\nwp_app_password = \"b\"",
        )
        .unwrap();
        let pages = PageService::new(&config, &client);

        let err = pages.create(&Fields::new()).await.unwrap_err();

        assert_eq!(err.transport_error(), Some("Pages endpoint not configured."));
        assert_eq!(sender.calls(), 0);
    }
}
