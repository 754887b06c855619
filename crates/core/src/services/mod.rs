//! Content operations against one configured site.
//!
//! Every service borrows the site configuration and the REST client. Before
//! any request leaves the process the target endpoint and the credentials are
//! checked; a missing one short-circuits into [`RequestError::Config`].

pub mod bulk;
pub mod cpt;
pub mod media;
pub mod menu;
pub mod page;
pub mod post;
pub mod taxonomy;
pub mod template;

use crate::config::SiteConfig;
use crate::endpoint::{item_url, with_query};
use crate::rest::{Credentials, RestClient};
use crate::result::{RequestError, RequestResult};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Loose caller supplied field bag; each service keeps only what it knows.
pub type Fields = Map<String, Value>;

pub(crate) const CREDENTIALS_MISSING: &str = "WordPress credentials not configured.";

/// Query parameters for list calls, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    params: Vec<(String, String)>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let key = key.into();
        let value = value.to_string();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.params.push((key, value)),
        }
        self
    }

    pub fn per_page(self, per_page: u32) -> Self {
        self.set("per_page", per_page)
    }

    pub fn page(self, page: u32) -> Self {
        self.set("page", page)
    }

    pub fn search(self, term: impl Into<String>) -> Self {
        self.set("search", term.into())
    }

    pub fn status(self, status: impl Into<String>) -> Self {
        self.set("status", status.into())
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Create / read / update / delete on one REST collection.
#[async_trait]
pub trait ContentOps: Send + Sync {
    async fn create(&self, data: &Fields) -> RequestResult;

    async fn update(&self, id: u64, data: &Fields) -> RequestResult;

    async fn get(&self, id: u64) -> RequestResult;

    async fn list(&self, params: &ListParams) -> RequestResult;

    /// `force` skips the trash.
    async fn delete(&self, id: u64, force: bool) -> RequestResult;
}

/// A collection endpoint plus the site settings needed to call it.
pub(crate) struct Collection<'a> {
    config: &'a SiteConfig,
    client: &'a RestClient,
    endpoint: String,
    missing_endpoint: String,
}

impl<'a> Collection<'a> {
    pub(crate) fn new(
        config: &'a SiteConfig,
        client: &'a RestClient,
        endpoint: impl Into<String>,
        missing_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            config,
            client,
            endpoint: endpoint.into(),
            missing_endpoint: missing_endpoint.into(),
        }
    }

    pub(crate) fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Endpoint first, then credentials.
    pub(crate) fn preflight(&self) -> Result<Credentials, RequestError> {
        if self.endpoint.is_empty() {
            return Err(RequestError::config(self.missing_endpoint.clone()));
        }
        credentials_for(self.config)
    }

    pub(crate) async fn create(&self, payload: &Value) -> RequestResult {
        let creds = self.preflight()?;
        self.client
            .post_json(&self.endpoint, payload, &creds, self.config.verify_ssl())
            .await
    }

    pub(crate) async fn update(&self, id: u64, payload: &Value) -> RequestResult {
        let creds = self.preflight()?;
        self.client
            .post_json(&item_url(&self.endpoint, id), payload, &creds, self.config.verify_ssl())
            .await
    }

    pub(crate) async fn get(&self, id: u64) -> RequestResult {
        let creds = self.preflight()?;
        self.client
            .get(&item_url(&self.endpoint, id), &creds, self.config.verify_ssl())
            .await
    }

    pub(crate) async fn list(&self, params: &ListParams) -> RequestResult {
        let creds = self.preflight()?;
        let url = with_query(&self.endpoint, params.as_slice());
        self.client.get(&url, &creds, self.config.verify_ssl()).await
    }

    pub(crate) async fn delete(&self, id: u64, force: bool) -> RequestResult {
        let creds = self.preflight()?;
        self.client
            .delete(&item_url(&self.endpoint, id), &creds, self.config.verify_ssl(), force)
            .await
    }
}

pub(crate) fn credentials_for(config: &SiteConfig) -> Result<Credentials, RequestError> {
    if !config.has_credentials() {
        return Err(RequestError::config(CREDENTIALS_MISSING));
    }
    Ok(config.credentials())
}

/// Normalize a taxonomy ID list.
///
/// Strings are split on commas and each piece is read like a leading integer
/// (`"12abc"` is 12); arrays are coerced element by element. Only positive IDs
/// survive, in their original order.
pub fn parse_id_list(input: &Value) -> Vec<u64> {
    match input {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| as_int(item).filter(|id| *id > 0))
            .map(|id| id as u64)
            .collect(),
        Value::String(text) => text
            .split(',')
            .filter_map(|piece| leading_int(piece.trim()).filter(|id| *id > 0))
            .map(|id| id as u64)
            .collect(),
        Value::Number(_) => as_int(input)
            .filter(|id| *id > 0)
            .map(|id| vec![id as u64])
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Integer reading of a loose value: numbers truncate, strings use their
/// leading digits, booleans are 0 or 1.
pub(crate) fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f.trunc() as i64)),
        Value::String(text) => leading_int(text.trim()),
        Value::Bool(flag) => Some(i64::from(*flag)),
        _ => None,
    }
}

fn leading_int(text: &str) -> Option<i64> {
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    if end == 0 {
        return Some(0);
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Null, `""`, `"0"`, `false`, `0` and empty collections.
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty() || text == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Copy every listed key whose value is neither null nor `""`.
pub(crate) fn copy_present(payload: &mut Fields, data: &Fields, keys: &[&str]) {
    for key in keys {
        match data.get(*key) {
            None | Some(Value::Null) => {}
            Some(Value::String(text)) if text.is_empty() => {}
            Some(value) => {
                payload.insert((*key).to_string(), value.clone());
            }
        }
    }
}

/// Copy every listed key whose value is not blank.
pub(crate) fn copy_non_blank(payload: &mut Fields, data: &Fields, keys: &[&str]) {
    for key in keys {
        if let Some(value) = data.get(*key).filter(|v| !is_blank(v)) {
            payload.insert((*key).to_string(), value.clone());
        }
    }
}

/// `categories` / `tags` as ID lists, when supplied.
pub(crate) fn copy_id_lists(payload: &mut Fields, data: &Fields) {
    for key in ["categories", "tags"] {
        if let Some(value) = data.get(key).filter(|v| !is_blank(v)) {
            payload.insert(key.to_string(), Value::from(parse_id_list(value)));
        }
    }
}

/// `meta` when it is a non-empty object.
pub(crate) fn copy_meta(payload: &mut Fields, data: &Fields) {
    if let Some(Value::Object(meta)) = data.get("meta") {
        if !meta.is_empty() {
            payload.insert("meta".to_string(), Value::Object(meta.clone()));
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::SiteConfig;

    pub const POSTS: &str = "https://x.test/wp-json/wp/v2/posts";

    pub fn site() -> SiteConfig {
        SiteConfig::new(POSTS).with_credentials(Some("admin"), Some("app pass"))
    }

    pub fn fields(value: serde_json::Value) -> super::Fields {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected an object, got {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::testing::{reply, FakeSender};
    use serde_json::json;

    #[test]
    fn test_parse_id_list_from_string() {
        assert_eq!(parse_id_list(&json!("1, 5, foo, -2, 0, 12")), vec![1, 5, 12]);
        assert_eq!(parse_id_list(&json!("7abc,8")), vec![7, 8]);
        assert!(parse_id_list(&json!("")).is_empty());
    }

    #[test]
    fn test_parse_id_list_from_array() {
        assert_eq!(parse_id_list(&json!([3, "4", -1, 0, "x", 2.9])), vec![3, 4, 2]);
        assert_eq!(parse_id_list(&json!(9)), vec![9]);
        assert!(parse_id_list(&json!(null)).is_empty());
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&json!(null)));
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!("0")));
        assert!(is_blank(&json!(0)));
        assert!(is_blank(&json!([])));
        assert!(!is_blank(&json!("draft")));
        assert!(!is_blank(&json!([0])));
    }

    #[test]
    fn test_list_params_replace_existing_key() {
        let params = ListParams::new().per_page(10).search("hello").per_page(20);
        assert_eq!(
            params.as_slice(),
            &[
                ("per_page".to_string(), "20".to_string()),
                ("search".to_string(), "hello".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_preflight_missing_endpoint_makes_no_call() {
        let sender = FakeSender::new(|_| Ok(reply(200, "{}")));
        let client = sender.client();
        let config = site();
        let collection = Collection::new(&config, &client, "", "Pages endpoint not configured.");

        let err = collection.get(1).await.unwrap_err();

        assert_eq!(err.transport_error(), Some("Pages endpoint not configured."));
        assert_eq!(sender.calls(), 0);
    }

    #[tokio::test]
    async fn test_preflight_missing_credentials_makes_no_call() {
        let sender = FakeSender::new(|_| Ok(reply(200, "{}")));
        let client = sender.client();
        let config = SiteConfig::new(POSTS);
        let collection = Collection::new(&config, &client, POSTS, "unused");

        let err = collection.list(&ListParams::new()).await.unwrap_err();

        assert_eq!(err.transport_error(), Some(CREDENTIALS_MISSING));
        assert_eq!(err.http_status(), 0);
        assert_eq!(sender.calls(), 0);
    }

    #[tokio::test]
    async fn test_collection_urls() {
        let sender = FakeSender::new(|_| Ok(reply(200, "{}")));
        let client = sender.client();
        let config = site();
        let collection = Collection::new(&config, &client, POSTS, "unused");

        collection.get(5).await.unwrap();
        collection.list(&ListParams::new().per_page(2)).await.unwrap();
        collection.delete(5, true).await.unwrap();

        let urls: Vec<String> = sender.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                format!("{}/5", POSTS),
                format!("{}?per_page=2", POSTS),
                format!("{}/5?force=true", POSTS),
            ]
        );
    }
}
