//! Shared helpers for the HTTP-backed collaborators.

use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{AgentError, AgentResult};

pub(crate) const USER_AGENT: &str = concat!("qabrief/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client() -> AgentResult<reqwest::Client> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}

/// Decode a JSON body, turning non-success statuses into
/// [`AgentError::Status`].
pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &str,
    response: Response,
) -> AgentResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(service = %service, status = status.as_u16(), "request failed");
        return Err(AgentError::status(service, status.as_u16(), body));
    }
    response
        .json::<T>()
        .await
        .map_err(|err| AgentError::InvalidResponse(format!("{service}: {err}")))
}
