//! Navigation menus, menu items and theme menu locations.
//!
//! These routes exist since WordPress 5.9 and hang off the `/wp/v2` root
//! rather than a collection endpoint.

use super::{as_int, credentials_for, is_blank, Fields};
use crate::config::SiteConfig;
use crate::endpoint::{item_url, with_query};
use crate::rest::{Credentials, RestClient};
use crate::result::{RequestError, RequestResult};
use serde_json::{json, Value};

const MISSING_ROOT: &str = "Menu endpoints could not be determined. Configure posts_endpoint.";

/// Page size used for menu and menu item listings
const MENU_PAGE_SIZE: &str = "100";

pub struct MenuService<'a> {
    config: &'a SiteConfig,
    client: &'a RestClient,
}

impl<'a> MenuService<'a> {
    pub fn new(config: &'a SiteConfig, client: &'a RestClient) -> Self {
        Self { config, client }
    }

    /// `<root>/<route>` plus credentials, or the reason nothing can be sent.
    fn prepare(&self, route: &str) -> Result<(String, Credentials), RequestError> {
        let root = self.config.base_endpoint();
        if root.is_empty() {
            return Err(RequestError::config(MISSING_ROOT));
        }
        let creds = credentials_for(self.config)?;
        Ok((format!("{}/{}", root, route), creds))
    }

    async fn fetch(&self, url: &str, creds: &Credentials) -> RequestResult {
        self.client.get(url, creds, self.config.verify_ssl()).await
    }

    async fn send(&self, url: &str, payload: &Value, creds: &Credentials) -> RequestResult {
        self.client
            .post_json(url, payload, creds, self.config.verify_ssl())
            .await
    }

    /// Registered theme menu locations
    pub async fn menu_locations(&self) -> RequestResult {
        let (url, creds) = self.prepare("menu-locations")?;
        self.fetch(&url, &creds).await
    }

    pub async fn menu_location(&self, location: &str) -> RequestResult {
        let (url, creds) = self.prepare("menu-locations")?;
        let encoded: String = url::form_urlencoded::byte_serialize(location.as_bytes()).collect();
        self.fetch(&item_url(&url, encoded), &creds).await
    }

    pub async fn menu_items(&self, menu_id: u64) -> RequestResult {
        let (url, creds) = self.prepare("menu-items")?;
        let url = with_query(
            &url,
            &[("menus", menu_id.to_string().as_str()), ("per_page", MENU_PAGE_SIZE)],
        );
        self.fetch(&url, &creds).await
    }

    pub async fn create_menu_item(&self, menu_id: u64, data: &Fields) -> RequestResult {
        let (url, creds) = self.prepare("menu-items")?;
        self.send(&url, &build_menu_item_payload(menu_id, data), &creds)
            .await
    }

    /// `data` is forwarded unchanged.
    pub async fn update_menu_item(&self, id: u64, data: &Fields) -> RequestResult {
        let (url, creds) = self.prepare("menu-items")?;
        self.send(&item_url(&url, id), &Value::Object(data.clone()), &creds)
            .await
    }

    pub async fn delete_menu_item(&self, id: u64, force: bool) -> RequestResult {
        let (url, creds) = self.prepare("menu-items")?;
        self.client
            .delete(&item_url(&url, id), &creds, self.config.verify_ssl(), force)
            .await
    }

    pub async fn nav_menus(&self) -> RequestResult {
        let (url, creds) = self.prepare("menus")?;
        let url = with_query(&url, &[("per_page", MENU_PAGE_SIZE)]);
        self.fetch(&url, &creds).await
    }

    pub async fn nav_menu(&self, id: u64) -> RequestResult {
        let (url, creds) = self.prepare("menus")?;
        self.fetch(&item_url(&url, id), &creds).await
    }

    pub async fn create_nav_menu(&self, name: &str, slug: Option<&str>) -> RequestResult {
        let (url, creds) = self.prepare("menus")?;
        let mut payload = json!({ "name": name });
        if let Some(slug) = slug.filter(|s| !s.is_empty()) {
            payload["slug"] = Value::from(slug);
        }
        self.send(&url, &payload, &creds).await
    }

    /// Menus have no trash; callers normally pass `force = true`.
    pub async fn delete_nav_menu(&self, id: u64, force: bool) -> RequestResult {
        let (url, creds) = self.prepare("menus")?;
        self.client
            .delete(&item_url(&url, id), &creds, self.config.verify_ssl(), force)
            .await
    }
}

pub(crate) fn build_menu_item_payload(menu_id: u64, data: &Fields) -> Value {
    let mut payload = Fields::new();
    payload.insert("menus".to_string(), Value::from(menu_id));
    payload.insert("status".to_string(), Value::from("publish"));

    let present = |key: &str| data.get(key).filter(|v| !is_blank(v));

    if let Some(title) = present("title") {
        payload.insert("title".to_string(), title.clone());
    }
    if let Some(url) = present("url") {
        payload.insert("url".to_string(), url.clone());
        payload.insert("type".to_string(), Value::from("custom"));
    }
    if let Some(kind) = present("type") {
        payload.insert("type".to_string(), kind.clone());
    }
    if let Some(object_id) = present("object_id").and_then(as_int) {
        payload.insert("object_id".to_string(), Value::from(object_id));
    }
    if let Some(object) = present("object") {
        payload.insert("object".to_string(), object.clone());
    }
    if let Some(parent) = present("parent").and_then(as_int) {
        payload.insert("parent".to_string(), Value::from(parent));
    }
    if let Some(order) = data.get("menu_order").filter(|v| !v.is_null()) {
        payload.insert("menu_order".to_string(), Value::from(as_int(order).unwrap_or(0)));
    }
    if let Some(target) = present("target") {
        payload.insert("target".to_string(), target.clone());
    }
    if let Some(classes) = present("classes") {
        let classes = match classes {
            Value::String(text) => Value::from(text.split(' ').collect::<Vec<_>>()),
            other => other.clone(),
        };
        payload.insert("classes".to_string(), classes);
    }
    for key in ["description", "attr_title"] {
        if let Some(value) = present(key) {
            payload.insert(key.to_string(), value.clone());
        }
    }

    Value::Object(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::services::test_support::*;
    use crate::testing::{reply, FakeSender};

    #[test]
    fn test_custom_link_payload() {
        let data = fields(json!({
            "title": "Docs",
            "url": "https://docs.test",
            "classes": "nav-item highlight",
            "menu_order": "3",
            "parent": 0,
            "target": "_blank"
        }));

        assert_eq!(
            build_menu_item_payload(4, &data),
            json!({
                "menus": 4,
                "status": "publish",
                "title": "Docs",
                "url": "https://docs.test",
                "type": "custom",
                "classes": ["nav-item", "highlight"],
                "menu_order": 3,
                "target": "_blank"
            })
        );
    }

    #[test]
    fn test_explicit_type_overrides_custom() {
        let data = fields(json!({
            "url": "https://x.test/about",
            "type": "post_type",
            "object": "page",
            "object_id": "12"
        }));
        let payload = build_menu_item_payload(1, &data);

        assert_eq!(payload["type"], json!("post_type"));
        assert_eq!(payload["object"], json!("page"));
        assert_eq!(payload["object_id"], json!(12));
    }

    #[tokio::test]
    async fn test_menu_urls() {
        let sender = FakeSender::new(|_| Ok(reply(200, "[]")));
        let client = sender.client();
        let config = site();
        let menus = MenuService::new(&config, &client);

        menus.menu_locations().await.unwrap();
        menus.menu_location("primary menu").await.unwrap();
        menus.menu_items(3).await.unwrap();
        menus.nav_menus().await.unwrap();
        menus.nav_menu(3).await.unwrap();
        menus.delete_nav_menu(3, true).await.unwrap();
        menus.delete_menu_item(9, false).await.unwrap();

        let urls: Vec<String> = sender.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://x.test/wp-json/wp/v2/menu-locations",
                "https://x.test/wp-json/wp/v2/menu-locations/primary+menu",
                "https://x.test/wp-json/wp/v2/menu-items?menus=3&per_page=100",
                "https://x.test/wp-json/wp/v2/menus?per_page=100",
                "https://x.test/wp-json/wp/v2/menus/3",
                "https://x.test/wp-json/wp/v2/menus/3?force=true",
                "https://x.test/wp-json/wp/v2/menu-items/9",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_nav_menu_payload() {
        let sender = FakeSender::new(|_| Ok(reply(201, r#"{"id":6}"#)));
        let client = sender.client();
        let config = site();
        let menus = MenuService::new(&config, &client);

        menus.create_nav_menu("Footer", None).await.unwrap();
        menus.create_nav_menu("Header", Some("header")).await.unwrap();

        let sent = sender.requests();
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert_eq!(sent[0].url, "https://x.test/wp-json/wp/v2/menus");
        assert_eq!(
            sent[0].body,
            crate::http::RequestBody::Json(r#"{"name":"Footer"}"#.to_string())
        );
        match &sent[1].body {
            crate::http::RequestBody::Json(body) => {
                let value: Value = serde_json::from_str(body).unwrap();
                assert_eq!(value, json!({"name": "Header", "slug": "header"}));
            }
            other => panic!("expected json body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_menus_require_credentials() {
        let sender = FakeSender::new(|_| Ok(reply(200, "[]")));
        let client = sender.client();
        let config = SiteConfig::new(POSTS);
        let menus = MenuService::new(&config, &client);

        assert!(menus.nav_menus().await.is_err());
        assert!(menus.create_menu_item(1, &Fields::new()).await.is_err());
        assert_eq!(sender.calls(), 0);
    }
}
