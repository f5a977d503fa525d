//! Request plumbing shared by every operation
//!
//! Builds endpoint URLs under the configured base, attaches the
//! authorization header, and reads error payloads.

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response};
use url::Url;

use crate::app::models::{Metadata, RemotePayload};
use crate::errors::{ArtifactResult, InputError, RemoteError, TransferError};

/// HTTP operations handler bound to one server
#[derive(Debug, Clone)]
pub struct HttpHandler {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl HttpHandler {
    /// Creates a handler for `base_url`
    ///
    /// # Errors
    ///
    /// Returns `InputError::InvalidUrl` if the URL does not parse or cannot
    /// carry a path
    pub fn new(client: Client, base_url: &str, auth_token: Option<String>) -> ArtifactResult<Self> {
        let invalid = |reason: String| InputError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("expected an http(s) URL".to_string()).into());
        }

        Ok(Self {
            client,
            base_url: parsed,
            auth_token: auth_token.filter(|token| !token.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/{segments...}`, percent-encoding each segment
    pub fn endpoint<I, S>(&self, segments: I) -> ArtifactResult<Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| InputError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request, attaching `Authorization` when a token is set
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => builder.header(AUTHORIZATION, token),
            None => builder,
        }
    }
}

/// Append metadata entries as query parameters
pub fn append_metadata(url: &mut Url, metadata: &Metadata) {
    if metadata.is_empty() {
        return;
    }
    url.query_pairs_mut().extend_pairs(metadata.iter());
}

/// Read a whole body and decode it as an error payload
pub async fn remote_error(response: Response) -> ArtifactResult<RemoteError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(TransferError::Request)?;
    Ok(RemoteError {
        status,
        payload: RemotePayload::parse(&body),
    })
}
