//! Scripted [`HttpSend`] used by unit tests.

use crate::error::Result;
use crate::http::{HttpReply, HttpRequest, HttpSend};
use crate::rest::RestClient;
use crate::upload::UploadRegistry;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

type Responder = dyn Fn(&HttpRequest) -> Result<HttpReply> + Send + Sync;

/// Records every request and answers with a caller supplied closure.
#[derive(Clone)]
pub struct FakeSender {
    inner: Arc<Inner>,
}

struct Inner {
    responder: Box<Responder>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeSender {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpReply> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                responder: Box::new(responder),
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn client(&self) -> RestClient {
        RestClient::with_sender(
            Arc::new(self.clone()),
            Arc::new(UploadRegistry::new().unwrap()),
        )
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner.requests.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.inner.requests.lock().len()
    }
}

#[async_trait]
impl HttpSend for FakeSender {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply> {
        let reply = (self.inner.responder)(&request);
        self.inner.requests.lock().push(request);
        reply
    }
}

pub fn reply(status: u16, body: &str) -> HttpReply {
    HttpReply {
        status,
        headers: Vec::new(),
        body: body.to_string(),
    }
}
