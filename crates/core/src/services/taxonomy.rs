use super::{as_int, Collection, Fields, ListParams};
use crate::config::SiteConfig;
use crate::endpoint::derive_endpoint;
use crate::rest::RestClient;
use crate::result::RequestResult;
use serde_json::Value;

/// Terms of any taxonomy (`categories`, `tags`, or a custom one)
pub struct TaxonomyService<'a> {
    config: &'a SiteConfig,
    client: &'a RestClient,
}

impl<'a> TaxonomyService<'a> {
    pub fn new(config: &'a SiteConfig, client: &'a RestClient) -> Self {
        Self { config, client }
    }

    /// Configured categories/tags endpoint, otherwise derived from posts.
    pub fn endpoint(&self, taxonomy: &str) -> String {
        match taxonomy {
            "categories" => self.config.categories_endpoint(),
            "tags" => self.config.tags_endpoint(),
            _ => derive_endpoint(self.config.posts_endpoint(), taxonomy),
        }
    }

    fn terms(&self, taxonomy: &str) -> Collection<'a> {
        Collection::new(
            self.config,
            self.client,
            self.endpoint(taxonomy),
            format!("Endpoint for taxonomy '{}' could not be determined.", taxonomy),
        )
    }

    pub async fn create(&self, taxonomy: &str, data: &Fields) -> RequestResult {
        self.terms(taxonomy).create(&build_payload(data)).await
    }

    pub async fn update(&self, taxonomy: &str, id: u64, data: &Fields) -> RequestResult {
        self.terms(taxonomy).update(id, &build_payload(data)).await
    }

    pub async fn get(&self, taxonomy: &str, id: u64) -> RequestResult {
        self.terms(taxonomy).get(id).await
    }

    pub async fn list(&self, taxonomy: &str, params: &ListParams) -> RequestResult {
        self.terms(taxonomy).list(params).await
    }

    pub async fn delete(&self, taxonomy: &str, id: u64, force: bool) -> RequestResult {
        self.terms(taxonomy).delete(id, force).await
    }

    pub async fn create_category(&self, data: &Fields) -> RequestResult {
        self.create("categories", data).await
    }

    pub async fn create_tag(&self, data: &Fields) -> RequestResult {
        self.create("tags", data).await
    }

    pub async fn list_categories(&self, params: &ListParams) -> RequestResult {
        self.list("categories", params).await
    }

    pub async fn list_tags(&self, params: &ListParams) -> RequestResult {
        self.list("tags", params).await
    }
}

pub(crate) fn build_payload(data: &Fields) -> Value {
    let mut payload = Fields::new();
    for key in ["name", "slug", "description", "parent", "meta"] {
        let Some(value) = data.get(key).filter(|v| !v.is_null()) else {
            continue;
        };
        let value = if key == "parent" {
            Value::from(as_int(value).unwrap_or(0))
        } else {
            value.clone()
        };
        payload.insert(key.to_string(), value);
    }
    Value::Object(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use crate::testing::{reply, FakeSender};
    use serde_json::json;

    #[test]
    fn test_term_payload() {
        let data = fields(json!({
            "name": "News",
            "slug": "",
            "parent": "3",
            "description": null,
            "count": 10
        }));
        assert_eq!(
            build_payload(&data),
            json!({"name": "News", "slug": "", "parent": 3})
        );
    }

    #[test]
    fn test_endpoints() {
        let sender = FakeSender::new(|_| Ok(reply(200, "{}")));
        let client = sender.client();
        let config = SiteConfig::from_toml_str(
            "posts_endpoint = \"https://x.test/wp-json/wp/v2/posts\"\ntags_endpoint = \"https://tags.test/t\"",
        )
        .unwrap();
        let terms = TaxonomyService::new(&config, &client);

        assert_eq!(terms.endpoint("categories"), "https://x.test/wp-json/wp/v2/categories");
        assert_eq!(terms.endpoint("tags"), "https://tags.test/t");
        assert_eq!(terms.endpoint("genre"), "https://x.test/wp-json/wp/v2/genre");
    }

    #[tokio::test]
    async fn test_create_category() {
        let sender = FakeSender::new(|_| Ok(reply(201, r#"{"id":5,"name":"News"}"#)));
        let client = sender.client();
        let config = site();
        let terms = TaxonomyService::new(&config, &client);

        let result = terms.create_category(&fields(json!({"name": "News"}))).await;

        assert_eq!(crate::created_id(&result), Some(5));
        assert_eq!(sender.requests()[0].url, "https://x.test/wp-json/wp/v2/categories");
    }

    #[tokio::test]
    async fn test_list_tags_with_params() {
        let sender = FakeSender::new(|_| Ok(reply(200, "[]")));
        let client = sender.client();
        let config = site();
        let terms = TaxonomyService::new(&config, &client);

        terms.list_tags(&ListParams::new().per_page(100)).await.unwrap();

        assert_eq!(
            sender.requests()[0].url,
            "https://x.test/wp-json/wp/v2/tags?per_page=100"
        );
    }

    #[tokio::test]
    async fn test_missing_endpoint_names_taxonomy() {
        let sender = FakeSender::new(|_| Ok(reply(200, "{}")));
        let client = sender.client();
        let config = SiteConfig::default().with_credentials(Some("a"), Some("b"));
        let terms = TaxonomyService::new(&config, &client);

        let err = terms.get("genre", 1).await.unwrap_err();

        assert_eq!(
            err.transport_error(),
            Some("Endpoint for taxonomy 'genre' could not be determined.")
        );
        assert_eq!(sender.calls(), 0);
    }
}
