use std::sync::Arc;

use async_trait::async_trait;

use crate::{Error, Request, Response, Result};

/// Issues a single physical HTTP call.
///
/// Implementations must not retry on their own. A response with any status
/// code is a success at this level; status classification happens above.
#[async_trait]
pub trait Doer: Send + Sync {
    async fn send(&self, request: &mut Request) -> Result<Response>;
}

#[async_trait]
impl<D: Doer + ?Sized> Doer for Arc<D> {
    async fn send(&self, request: &mut Request) -> Result<Response> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<D: Doer + ?Sized> Doer for &D {
    async fn send(&self, request: &mut Request) -> Result<Response> {
        (**self).send(request).await
    }
}

/// [`Doer`] backed by a `reqwest::Client`.
///
/// Streaming bodies are read to the end on the calling task before sending.
#[derive(Clone, Debug, Default)]
pub struct ReqwestDoer {
    http: reqwest::Client,
}

impl ReqwestDoer {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Doer for ReqwestDoer {
    async fn send(&self, request: &mut Request) -> Result<Response> {
        let body = request.body.to_vec().map_err(Error::Body)?;

        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if !body.is_empty() {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(Error::Transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(Error::Transport)?;

        Ok(Response {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}
