//! HTTP content source over `reqwest`, using `Range` requests to resume.

use std::sync::Arc;

use futures_util::{TryStreamExt, stream};
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, ETAG, HeaderMap, RANGE};
use thiserror::Error;

use crate::core::{RangeStatus, check_range_status, content_range_start, range_header};
use crate::data::ObjectAttributes;
use crate::net::source::{ChunkStream, ContentSource, SourceError};

pub const CHECKSUM_TYPE_HEADER: &str = "ais-checksum-type";
pub const CHECKSUM_VALUE_HEADER: &str = "ais-checksum-value";
pub const VERSION_HEADER: &str = "ais-version";

#[derive(Debug, Error)]
pub enum HttpSourceError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url:    String,
        #[source]
        source: reqwest::Error,
    },

    #[error("response body interrupted: {0}")]
    Interrupted(#[source] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("server ignored range request at offset {offset} for {url}")]
    RangeIgnored { offset: u64, url: String },

    /// A partial response that does not start at the requested offset.
    #[error("partial content from {url} starts at {actual:?}, expected {expected}")]
    RangeMismatch {
        expected: u64,
        actual:   Option<u64>,
        url:      String,
    },

    #[error("no content length reported for {url}")]
    MissingContentLength { url: String },

    #[error("invalid {name} header: {value}")]
    InvalidHeader { name: &'static str, value: String },
}

impl SourceError for HttpSourceError {
    fn is_interrupted(&self) -> bool {
        match self {
            HttpSourceError::Interrupted(_) => true,
            HttpSourceError::Request { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}

/// Map an error raised while reading a response body.
///
/// Broken connections and timeouts mid-body are resumable; anything else
/// (e.g. a redirect policy error surfacing late) is not.
fn body_error(url: &str, err: reqwest::Error) -> HttpSourceError {
    if err.is_body() || err.is_timeout() {
        HttpSourceError::Interrupted(err)
    } else {
        HttpSourceError::Request { url: url.to_string(), source: err }
    }
}

/// Read object metadata from response headers.
pub fn attributes_from_headers(url: &str, headers: &HeaderMap) -> Result<ObjectAttributes, HttpSourceError> {
    let text = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);

    let raw_size = headers
        .get(CONTENT_LENGTH)
        .ok_or_else(|| HttpSourceError::MissingContentLength { url: url.to_string() })?;
    let size = raw_size
        .to_str()
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .ok_or_else(|| HttpSourceError::InvalidHeader {
            name:  "content-length",
            value: String::from_utf8_lossy(raw_size.as_bytes()).into_owned(),
        })?;

    Ok(ObjectAttributes {
        size,
        checksum_type: text(CHECKSUM_TYPE_HEADER),
        checksum_value: text(CHECKSUM_VALUE_HEADER),
        version: text(VERSION_HEADER),
        etag: text(ETAG.as_str()),
    })
}

/// Content source reading one URL.
///
/// Cloning is cheap: the client and URL are shared.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client:  reqwest::Client,
    url:     Arc<str>,
    headers: Arc<[(String, String)]>,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Result<Self, HttpSourceError> {
        let client = reqwest::Client::builder().build().map_err(HttpSourceError::Client)?;
        Ok(Self::with_client(client, url))
    }

    /// Use an existing client, e.g. one configured with timeouts or proxies.
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: Arc::from(url.into()),
            headers: Arc::new([]),
        }
    }

    /// Add a header sent with every request, including reopens.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers: Vec<_> = self.headers.iter().cloned().collect();
        headers.push((name.into(), value.into()));
        self.headers = Arc::from(headers);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.headers
            .iter()
            .fold(self.client.request(method, &*self.url), |req, (k, v)| req.header(k, v))
    }

    fn request_error(&self, source: reqwest::Error) -> HttpSourceError {
        HttpSourceError::Request { url: self.url.to_string(), source }
    }
}

impl ContentSource for HttpSource {
    type Error = HttpSourceError;

    async fn open(&self, offset: u64) -> Result<ChunkStream<HttpSourceError>, HttpSourceError> {
        let mut request = self.request(reqwest::Method::GET);
        if let Some(range) = range_header(offset) {
            request = request.header(RANGE, range);
        }
        tracing::debug!(url = %self.url, offset, "opening object stream");

        let response = request.send().await.map_err(|e| self.request_error(e))?;
        let status = response.status().as_u16();
        match check_range_status(status, offset) {
            RangeStatus::Content => {}
            RangeStatus::Exhausted => return Ok(Box::pin(stream::empty())),
            RangeStatus::RangeIgnored => {
                return Err(HttpSourceError::RangeIgnored { offset, url: self.url.to_string() });
            }
            RangeStatus::Unexpected => {
                return Err(HttpSourceError::Status { status, url: self.url.to_string() });
            }
        }

        if status == 206 {
            let start = response
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(content_range_start);
            if start != Some(offset) {
                return Err(HttpSourceError::RangeMismatch {
                    expected: offset,
                    actual:   start,
                    url:      self.url.to_string(),
                });
            }
        }

        let url = Arc::clone(&self.url);
        let chunks = response.bytes_stream().map_err(move |e| body_error(&url, e));
        Ok(Box::pin(chunks))
    }

    async fn head(&self) -> Result<ObjectAttributes, HttpSourceError> {
        let response = self
            .request(reqwest::Method::HEAD)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        if !response.status().is_success() {
            return Err(HttpSourceError::Status {
                status: response.status().as_u16(),
                url:    self.url.to_string(),
            });
        }
        attributes_from_headers(&self.url, response.headers())
    }
}
