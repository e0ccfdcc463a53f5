//! Session Commands
//!
//! Frontend binding for the session refresh endpoint.

use gloo_net::http::Request;
use serde::Deserialize;

use crate::errors::CommandError;

/// Successful refresh: seconds the session was extended by
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RefreshGrant {
    pub extension: f64,
}

/// GET the refresh endpoint and decode the granted extension
pub async fn refresh_session(url: &str) -> Result<RefreshGrant, CommandError> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| CommandError::Network(e.to_string()))?;
    if !response.ok() {
        return Err(CommandError::Status(response.status()));
    }
    response
        .json::<RefreshGrant>()
        .await
        .map_err(|e| CommandError::Decode(e.to_string()))
}
