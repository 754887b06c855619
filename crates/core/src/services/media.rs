use super::{as_int, copy_non_blank, credentials_for, Collection, Fields, ListParams};
use crate::config::SiteConfig;
use crate::endpoint::item_url;
use crate::rest::RestClient;
use crate::result::{RequestError, RequestResult};
use crate::upload::FileUpload;
use serde_json::{json, Value};

const MEDIA_FIELDS: [&str; 4] = ["title", "alt_text", "caption", "description"];

/// Media library: uploads, metadata, featured images
pub struct MediaService<'a> {
    config: &'a SiteConfig,
    client: &'a RestClient,
    collection: Collection<'a>,
}

impl<'a> MediaService<'a> {
    pub fn new(config: &'a SiteConfig, client: &'a RestClient) -> Self {
        Self {
            config,
            client,
            collection: Collection::new(
                config,
                client,
                config.media_endpoint(),
                "Media endpoint not configured.",
            ),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.collection.endpoint()
    }

    /// Upload a staged file with optional title / alt text / caption /
    /// description and the post it belongs to.
    pub async fn upload(&self, file: &FileUpload, data: &Fields) -> RequestResult {
        let creds = self.collection.preflight()?;
        let fields = build_fields(data)
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect();

        self.client
            .upload_file(
                self.collection.endpoint(),
                file,
                &creds,
                self.config.verify_ssl(),
                fields,
            )
            .await
    }

    pub async fn get(&self, id: u64) -> RequestResult {
        self.collection.get(id).await
    }

    pub async fn list(&self, params: &ListParams) -> RequestResult {
        self.collection.list(params).await
    }

    pub async fn update(&self, id: u64, data: &Fields) -> RequestResult {
        self.collection
            .update(id, &Value::Object(build_fields(data)))
            .await
    }

    /// Media items have no trash, so WordPress expects `force`.
    pub async fn delete(&self, id: u64, force: bool) -> RequestResult {
        self.collection.delete(id, force).await
    }

    /// Point a post's `featured_media` at an uploaded item.
    pub async fn set_featured_image(&self, post_id: u64, media_id: u64) -> RequestResult {
        if post_id == 0 || media_id == 0 {
            return Err(RequestError::config("Invalid post ID or media ID."));
        }

        let posts = self.config.posts_endpoint();
        if posts.is_empty() {
            return Err(RequestError::config("Posts endpoint not configured."));
        }
        let creds = credentials_for(self.config)?;

        self.client
            .post_json(
                &item_url(posts, post_id),
                &json!({ "featured_media": media_id }),
                &creds,
                self.config.verify_ssl(),
            )
            .await
    }
}

pub(crate) fn build_fields(data: &Fields) -> Fields {
    let mut fields = Fields::new();
    copy_non_blank(&mut fields, data, &MEDIA_FIELDS);

    if let Some(post) = data.get("post").and_then(as_int).filter(|id| *id > 0) {
        fields.insert("post".to_string(), Value::from(post));
    }
    fields
}
