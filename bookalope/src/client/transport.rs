use bytes::Bytes;
use reqwest::{Method, RequestBuilder, Response, header};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::BookalopeClient;
use crate::errors::{Error, Result};
use crate::util::check_http_status;

/// A decoded response body.
///
/// Responses carrying a `Content-Disposition` header are file downloads and stay
/// untouched as [`Payload::Bytes`]; everything else is parsed as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A parsed JSON document. An empty body decodes as `null`.
    Json(Value),
    /// Raw bytes of an attachment (document, image, converted file).
    Bytes(Bytes),
}

impl Payload {
    /// The JSON document, or [`Error::MalformedResponse`] for an attachment.
    pub fn into_json(self) -> Result<Value> {
        match self {
            Payload::Json(value) => Ok(value),
            Payload::Bytes(_) => Err(Error::malformed("expected a JSON body, got an attachment")),
        }
    }

    /// The attachment bytes, or [`Error::MalformedResponse`] for a JSON body.
    pub fn into_bytes(self) -> Result<Bytes> {
        match self {
            Payload::Bytes(bytes) => Ok(bytes),
            Payload::Json(_) => Err(Error::malformed("expected an attachment, got a JSON body")),
        }
    }

    /// `true` when the server sent a `Content-Disposition` attachment.
    pub fn is_attachment(&self) -> bool {
        matches!(self, Payload::Bytes(_))
    }
}

impl BookalopeClient {
    /// HTTP `GET` of an API path, appending `query` as a URL-encoded query string
    /// when it is non-empty.
    ///
    /// # Examples
    /// ```no_run
    /// # async fn example(client: bookalope::BookalopeClient) -> bookalope::Result<()> {
    /// let styles = client.get("/api/styles", &[("format", "epub")]).await?.into_json()?;
    /// # Ok(()) }
    /// ```
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Payload> {
        let mut url = self.to_url(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        let resp = self.request(Method::GET, url)?.send().await?;
        decode(resp).await
    }

    /// HTTP `POST` of a JSON `body` to an API path.
    ///
    /// # Examples
    /// ```no_run
    /// # async fn example(client: bookalope::BookalopeClient) -> bookalope::Result<()> {
    /// client
    ///     .post("/api/profile", &serde_json::json!({"firstname": "Ada", "lastname": "Lovelace"}))
    ///     .await?;
    /// # Ok(()) }
    /// ```
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<Payload>
    where
        B: Serialize + ?Sized,
    {
        let url = self.to_url(path)?;
        let resp = self.request(Method::POST, url)?.json(body).send().await?;
        decode(resp).await
    }

    /// HTTP `DELETE` of an API path.
    pub async fn delete(&self, path: &str) -> Result<Payload> {
        let url = self.to_url(path)?;
        let resp = self.request(Method::DELETE, url)?.send().await?;
        decode(resp).await
    }

    /// Resolve an absolute API path (`/api/...`) against the configured host.
    pub(crate) fn to_url(&self, path: &str) -> Result<Url> {
        Ok(self.host.join(path)?)
    }

    /// Start an authenticated request: Basic auth with the token as username and
    /// an empty password, JSON content type.
    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self.require_token()?;
        tracing::debug!(%method, path = url.path(), "Bookalope request");
        Ok(self
            .http
            .request(method, url)
            .basic_auth(token.as_str(), Some(""))
            .header(header::CONTENT_TYPE, "application/json"))
    }
}

/// Check the status and branch on `Content-Disposition`.
async fn decode(resp: Response) -> Result<Payload> {
    let resp = check_http_status(resp).await?;
    let is_attachment = resp.headers().contains_key(header::CONTENT_DISPOSITION);
    let body = resp.bytes().await?;

    if is_attachment {
        return Ok(Payload::Bytes(body));
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload::Json(Value::Null));
    }
    serde_json::from_slice(&body)
        .map(Payload::Json)
        .map_err(|err| Error::malformed(format!("invalid JSON body: {err}")))
}
