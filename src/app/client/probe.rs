//! Server liveness probe
//!
//! Gate run before every transfer. Any failure, at the transport level or a
//! non-success status, is reported as one connectivity error naming the
//! server. The probe is never retried.

use reqwest::header::ACCEPT;
use reqwest::Method;

use crate::app::client::http::HttpHandler;
use crate::constants::api;
use crate::errors::{ArtifactError, ArtifactResult};

pub async fn check_server(http: &HttpHandler) -> ArtifactResult<()> {
    let url = http.endpoint([api::PING])?;
    let server = http.base_url().to_string();

    let response = http
        .request(Method::GET, url)
        .header(ACCEPT, api::JSON_MIME)
        .send()
        .await
        .map_err(|e| {
            tracing::debug!("Ping failed: {}", e);
            ArtifactError::Connectivity {
                url: server.clone(),
                source: Some(e),
            }
        })?;

    if !response.status().is_success() {
        tracing::debug!("Ping answered with HTTP {}", response.status());
        return Err(ArtifactError::Connectivity {
            url: server,
            source: None,
        });
    }

    tracing::debug!("Server {} is reachable", server);
    Ok(())
}
