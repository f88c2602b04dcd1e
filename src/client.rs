use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method, StatusCode, Url,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
    append, retry, Backoff, Body, Cancellation, ClientOptions, Doer, Error, ExponentialBackoff,
    Request, Response, Result, RetryOptions, SeekParams, Whence,
};

#[derive(Clone)]
/// HTTP client issuing every request through the retry engine.
///
/// The client is configuration only; each [`RequestBuilder::send`] owns its
/// own attempt state, so a client can be cloned and used concurrently.
pub struct Client {
    doer: Arc<dyn Doer>,
    backoff: Arc<dyn Backoff>,
    base_url: Option<Url>,
    headers: HeaderMap,
    options: ClientOptions,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("options", &self.options)
            .finish()
    }
}

impl Client {
    /// Creates a client around any transport.
    ///
    /// The default backoff allows a single call; see [`Client::with_backoff`].
    pub fn new<D: Doer + 'static>(doer: D) -> Self {
        Self {
            doer: Arc::new(doer),
            backoff: Arc::new(ExponentialBackoff::default()),
            base_url: None,
            headers: HeaderMap::new(),
            options: ClientOptions::default(),
        }
    }

    /// Creates a client sending through `reqwest`.
    pub fn from_reqwest(http: reqwest::Client) -> Self {
        Self::new(crate::ReqwestDoer::new(http))
    }

    /// Sets the policy deciding how many calls are made and how long to wait
    /// between them.
    pub fn with_backoff<B: Backoff + 'static>(mut self, backoff: B) -> Self {
        self.backoff = Arc::new(backoff);
        self
    }

    /// Sets the URL request paths are resolved against.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        let raw = base_url.as_ref();
        let mut url = Url::parse(raw)
            .map_err(|err| Error::InvalidRequest(format!("invalid base url {raw}: {err}")))?;
        // Without a trailing slash `join` would replace the last path segment.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = Some(url);
        Ok(self)
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Retries every failed attempt, not only retryable/temporary errors.
    pub fn with_retry_response_errors(mut self) -> Self {
        self.options.retry_response_errors = true;
        self
    }

    /// Rewinds seekable bodies to their start before a retried attempt.
    pub fn with_reset_seeker_to_zero(mut self) -> Self {
        self.options.reset_seeker_to_zero = true;
        self
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn request(&self, method: Method, path: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, method, path.into())
    }

    pub fn get(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::PUT, path)
    }

    pub fn patch(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::DELETE, path)
    }

    pub fn head(&self, path: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::HEAD, path)
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        let resolved = match &self.base_url {
            Some(base) => base.join(path.trim_start_matches('/')),
            None => Url::parse(path),
        };
        resolved.map_err(|err| Error::InvalidRequest(format!("invalid url {path}: {err}")))
    }
}

/// One logical call, configured fluently and issued by [`RequestBuilder::send`].
///
/// Configuration errors (bad headers, unserializable JSON) are collected and
/// reported together when the request is sent.
pub struct RequestBuilder<'a> {
    client: &'a Client,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Body,
    success: Vec<StatusCode>,
    retry: RetryOptions,
    timeout: Option<Duration>,
    deadline: Option<Duration>,
    cancel: Cancellation,
    error: Option<Error>,
}

impl fmt::Debug for RequestBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("body", &self.body)
            .field("retry", &self.retry)
            .finish()
    }
}

impl<'a> RequestBuilder<'a> {
    fn new(client: &'a Client, method: Method, path: String) -> Self {
        let retry = RetryOptions {
            retry_response_errors: client.options.retry_response_errors,
            reset_seeker_to_zero: client.options.reset_seeker_to_zero,
            seek_params: None,
        };
        Self {
            client,
            method,
            path,
            query: Vec::new(),
            headers: client.headers.clone(),
            body: Body::Empty,
            success: Vec::new(),
            retry,
            timeout: Some(Duration::from_millis(client.options.timeout_ms)),
            deadline: None,
            cancel: Cancellation::new(),
            error: None,
        }
    }

    fn record(&mut self, err: Error) {
        self.error = append(self.error.take(), Some(err));
    }

    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let (name, value) = (name.as_ref(), value.as_ref());
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => self.record(Error::InvalidRequest(format!("invalid header {name}"))),
        }
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Serializes `value` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.headers.insert(
                    reqwest::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                self.body = Body::Bytes(bytes);
            }
            Err(err) => self.record(Error::Encode(err.to_string())),
        }
        self
    }

    /// Rewinds a seekable body to `offset`/`whence` before each retried attempt.
    ///
    /// Both values are forwarded to the body unchanged.
    pub fn seek_params(mut self, offset: i64, whence: Whence) -> Self {
        self.retry.seek_params = Some(SeekParams::new(offset, whence));
        self
    }

    /// Retries every failed attempt of this request.
    pub fn retry_response_errors(mut self) -> Self {
        self.retry.retry_response_errors = true;
        self
    }

    /// Statuses accepted as success. Defaults to any 2xx.
    pub fn success(mut self, statuses: &[StatusCode]) -> Self {
        self.success = statuses.to_vec();
        self
    }

    /// Per-attempt timeout, overriding [`ClientOptions::timeout_ms`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Bound on the whole call, retries and waits included.
    ///
    /// The clock starts when the request is sent.
    pub fn deadline(mut self, within: Duration) -> Self {
        self.deadline = Some(within);
        self
    }

    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = self.cancel.with_token(token);
        self
    }

    /// Sends the request, retrying per the client's backoff policy.
    pub async fn send(self) -> Result<Response> {
        let Self {
            client,
            method,
            path,
            query,
            headers,
            body,
            success,
            retry,
            timeout,
            deadline,
            mut cancel,
            error,
        } = self;
        if let Some(within) = deadline {
            cancel = cancel.with_timeout(within);
        }

        let mut url = match (client.resolve(&path), error) {
            (Ok(url), None) => url,
            (Ok(_), Some(err)) | (Err(err), None) => return Err(err),
            (Err(err), Some(previous)) => return Err(previous.append(err)),
        };
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(&query);
        }

        let mut request = Request {
            method,
            url,
            headers,
            body,
            timeout,
        };
        let doer = StatusCheck {
            inner: client.doer.as_ref(),
            success: &success,
        };
        retry::execute(&doer, client.backoff.as_ref(), &retry, &cancel, &mut request).await
    }

    /// Sends the request and decodes a JSON response body.
    pub async fn decode_json<T: DeserializeOwned>(self) -> Result<T> {
        self.send().await?.json()
    }
}

/// Turns responses outside the success set into [`Error::Status`] so they take
/// part in retry decisions.
struct StatusCheck<'a> {
    inner: &'a dyn Doer,
    success: &'a [StatusCode],
}

impl StatusCheck<'_> {
    fn accepts(&self, status: StatusCode) -> bool {
        if self.success.is_empty() {
            status.is_success()
        } else {
            self.success.contains(&status)
        }
    }
}

#[async_trait]
impl<'a> Doer for StatusCheck<'a> {
    async fn send(&self, request: &mut Request) -> Result<Response> {
        let response = self.inner.send(request).await?;
        if self.accepts(response.status) {
            return Ok(response);
        }
        Err(Error::Status {
            status: response.status,
            body: response.text(),
        })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderValue, AUTHORIZATION};

    use super::Client;
    use crate::ReqwestDoer;

    fn client() -> Client {
        Client::new(ReqwestDoer::default())
    }

    #[test]
    fn base_url_keeps_its_path() {
        let client = client()
            .with_base_url("http://example.test/api/v1")
            .expect("valid base url");
        let url = client.resolve("/widgets/7").expect("valid path");
        assert_eq!(url.as_str(), "http://example.test/api/v1/widgets/7");
    }

    #[test]
    fn absolute_url_without_base() {
        let url = client()
            .resolve("http://example.test/ping")
            .expect("absolute url");
        assert_eq!(url.path(), "/ping");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(client().with_base_url("not a url").is_err());
    }

    #[test]
    fn request_inherits_client_options() {
        let client = client().with_retry_response_errors().with_reset_seeker_to_zero();
        let builder = client.get("/x");
        assert!(builder.retry.retry_response_errors);
        assert!(builder.retry.reset_seeker_to_zero);
        assert!(builder.retry.seek_params.is_none());
    }

    #[test]
    fn debug_omits_header_values() {
        let client = client().with_header(AUTHORIZATION, HeaderValue::from_static("secret-token"));
        let debug = format!("{client:?}");
        assert!(debug.contains("authorization"));
        assert!(!debug.contains("secret-token"));
    }
}
