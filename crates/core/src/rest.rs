//! Authenticated JSON transport for the WordPress REST API.

use crate::error::Result;
use crate::http::{
    HttpMethod, HttpReply, HttpRequest, HttpSend, ReqwestSender, RequestBody, TimeoutProfile,
    Timeouts,
};
use crate::result::{Headers, RequestError, RequestResult, RestResponse};
use crate::upload::{FileUpload, UploadRegistry};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// WordPress user name and Application Password
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub app_password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, app_password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            app_password: app_password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.app_password.is_empty()
    }

    /// `Basic base64(username:app_password)`
    pub fn authorization_header(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.app_password));
        format!("Basic {}", token)
    }
}

/// Sends authenticated requests and folds every outcome into a [`RequestResult`].
///
/// Never returns early with a Rust error: transport failures become
/// [`RequestError::Transport`] and non-2xx replies become
/// [`RequestError::Http`].
pub struct RestClient {
    sender: Arc<dyn HttpSend>,
    uploads: Arc<UploadRegistry>,
}

impl RestClient {
    /// Client with the default timeouts and a fresh upload staging area
    pub fn new() -> Result<Self> {
        Self::with_timeouts(Timeouts::default())
    }

    pub fn with_timeouts(timeouts: Timeouts) -> Result<Self> {
        Ok(Self::with_sender(
            Arc::new(ReqwestSender::new(timeouts)?),
            Arc::new(UploadRegistry::new()?),
        ))
    }

    pub fn with_sender(sender: Arc<dyn HttpSend>, uploads: Arc<UploadRegistry>) -> Self {
        Self { sender, uploads }
    }

    pub fn uploads(&self) -> &UploadRegistry {
        &self.uploads
    }

    pub async fn get(&self, url: &str, credentials: &Credentials, verify_ssl: bool) -> RequestResult {
        let request = self
            .authorized(HttpMethod::Get, url, credentials, verify_ssl)
            .header("Accept", "application/json");
        self.execute(request, true).await
    }

    pub async fn post_json(
        &self,
        url: &str,
        payload: &Value,
        credentials: &Credentials,
        verify_ssl: bool,
    ) -> RequestResult {
        self.put_json(url, payload, credentials, verify_ssl, HttpMethod::Post)
            .await
    }

    /// JSON body sent with an arbitrary method (POST, PUT, PATCH).
    pub async fn put_json(
        &self,
        url: &str,
        payload: &Value,
        credentials: &Credentials,
        verify_ssl: bool,
        method: HttpMethod,
    ) -> RequestResult {
        let request = self
            .authorized(method, url, credentials, verify_ssl)
            .header("Content-Type", JSON_CONTENT_TYPE)
            .body(RequestBody::Json(payload.to_string()));
        self.execute(request, false).await
    }

    pub async fn options(&self, url: &str, credentials: &Credentials, verify_ssl: bool) -> RequestResult {
        let request = self
            .authorized(HttpMethod::Options, url, credentials, verify_ssl)
            .header("Accept", "application/json");
        self.execute(request, false).await
    }

    /// DELETE, appending `force=true` when requested.
    pub async fn delete(
        &self,
        url: &str,
        credentials: &Credentials,
        verify_ssl: bool,
        force: bool,
    ) -> RequestResult {
        let url = if force {
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{}{}force=true", url, separator)
        } else {
            url.to_string()
        };

        let request = self.authorized(HttpMethod::Delete, &url, credentials, verify_ssl);
        self.execute(request, false).await
    }

    /// Multipart upload of a staged file plus extra text fields.
    ///
    /// Files that did not come through [`UploadRegistry::stage`] are rejected
    /// without any network activity.
    pub async fn upload_file(
        &self,
        url: &str,
        file: &FileUpload,
        credentials: &Credentials,
        verify_ssl: bool,
        fields: Vec<(String, String)>,
    ) -> RequestResult {
        if !self.uploads.is_uploaded(&file.path) {
            warn!(file = %file.path.display(), "rejected upload of unstaged file");
            return Err(RequestError::config("No valid file uploaded."));
        }

        let disposition = format!("attachment; filename=\"{}\"", file.name.replace('"', ""));
        let request = self
            .authorized(HttpMethod::Post, url, credentials, verify_ssl)
            .header("Content-Disposition", disposition)
            .profile(TimeoutProfile::Upload)
            .body(RequestBody::Multipart {
                fields,
                file: file.clone(),
            });
        self.execute(request, false).await
    }

    fn authorized(
        &self,
        method: HttpMethod,
        url: &str,
        credentials: &Credentials,
        verify_ssl: bool,
    ) -> HttpRequest {
        HttpRequest::new(method, url)
            .header("Authorization", credentials.authorization_header())
            .verify_ssl(verify_ssl)
    }

    async fn execute(&self, request: HttpRequest, capture_headers: bool) -> RequestResult {
        let method = request.method;
        let url = request.url.clone();
        debug!(method = %method, url = %url, "sending request");

        let reply = match self.sender.send(request).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(method = %method, url = %url, error = %err, "request failed");
                return Err(RequestError::Transport(err.to_string()));
            }
        };

        debug!(method = %method, url = %url, status = reply.status, "received reply");
        into_result(reply, capture_headers)
    }
}

fn into_result(reply: HttpReply, capture_headers: bool) -> RequestResult {
    let headers: Headers = if capture_headers {
        reply
            .headers
            .into_iter()
            .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
            .collect()
    } else {
        Headers::new()
    };

    let response = RestResponse::new(reply.status, reply.body, headers);
    if response.is_success() {
        Ok(response)
    } else {
        Err(RequestError::Http(response))
    }
}
