use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::MatchConfig;
use crate::conversion::{Conversion, Converter, SourceTrack};
use crate::record::{ConversionRecord, RecordStore};
use crate::search::SearchAdapter;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid request: {0}")]
    InvalidInput(String),

    #[error("search service unavailable: {0:#}")]
    SearchUnavailable(anyhow::Error),
}

/// Body written in place of a conversion when the request fails.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&RequestError> for ErrorResponse {
    fn from(error: &RequestError) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub tracks: Vec<SourceTrack>,
    pub playlist_name: Option<String>,
    pub source_url: Option<String>,
}

impl ConversionRequest {
    pub fn parse(body: &str) -> Result<Self, RequestError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| RequestError::InvalidInput(format!("body is not valid JSON: {e}")))?;
        let Some(object) = value.as_object() else {
            return Err(RequestError::InvalidInput(
                "body must be a JSON object".to_owned(),
            ));
        };
        match object.get("tracks") {
            None => {
                return Err(RequestError::InvalidInput(
                    "missing `tracks` field".to_owned(),
                ));
            }
            Some(tracks) if !tracks.is_array() => {
                return Err(RequestError::InvalidInput(
                    "`tracks` must be an array".to_owned(),
                ));
            }
            Some(_) => {}
        }
        serde_json::from_value(value)
            .map_err(|e| RequestError::InvalidInput(format!("malformed request: {e}")))
    }
}

/// Parses `body`, converts its tracks and records a summary.
///
/// Record store failures are logged and do not affect the returned conversion.
pub async fn handle_request<S, R>(
    body: &str,
    search: &S,
    store: Option<&R>,
    config: &MatchConfig,
    concurrency: usize,
) -> Result<Conversion, RequestError>
where
    S: SearchAdapter,
    R: RecordStore,
{
    let request = ConversionRequest::parse(body)?;
    info!(
        playlist = request.playlist_name.as_deref().unwrap_or("<unnamed>"),
        tracks = request.tracks.len(),
        "Received conversion request"
    );

    let conversion = Converter::new(search, config)
        .with_concurrency(concurrency)
        .convert(&request.tracks)
        .await
        .map_err(RequestError::SearchUnavailable)?;

    if let Some(store) = store {
        let record = ConversionRecord::new(
            &conversion.summary,
            request.playlist_name,
            request.source_url,
        );
        if let Err(error) = store.save(&record).await {
            warn!(error = %format!("{error:#}"), "Failed to save conversion record");
        }
    }

    Ok(conversion)
}
