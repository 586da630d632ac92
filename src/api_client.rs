//! HTTP client for the vidrank backend.

use reqwest::blocking::Response;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::{ChoiceSet, Ranking, Settings, Video};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Failure taxonomy for backend calls. Local state is never touched by
/// either variant; retrying the same user action is always safe.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success status; the body is parsed as JSON and carried verbatim.
    #[error("api error ({status}): {detail}")]
    Status { status: u16, detail: Value },
}

impl ApiError {
    /// Human-readable failure detail for the status footer.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Transport(err) => err.to_string(),
            ApiError::Status { detail, .. } => match detail.get("detail").and_then(Value::as_str) {
                Some(message) => message.to_string(),
                None => detail.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostVideosRequest<'a> {
    pub settings: &'a Settings,
}

#[derive(Debug, Deserialize)]
pub struct PostVideosResponse {
    pub videos: Vec<Video>,
}

#[derive(Debug, Serialize)]
pub struct PostSubmitRequest<'a> {
    pub choice_set: &'a ChoiceSet,
    pub settings: &'a Settings,
}

/// Shared by submit and skip; the routes answer with the same shape.
#[derive(Debug, Deserialize)]
pub struct PostSubmitResponse {
    pub record_id: String,
    pub videos: Vec<Video>,
}

#[derive(Debug, Serialize)]
pub struct PostUndoRequest<'a> {
    pub record_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct PostUndoResponse {
    pub videos: Vec<Video>,
    /// The action choices of the undone record, echoed back for
    /// re-hydration.
    pub choice_set: ChoiceSet,
}

#[derive(Debug, Deserialize)]
pub struct GetStatusResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct GetVersionResponse {
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct GetRankingsResponse {
    pub rankings: Vec<Ranking>,
}

/// The backend seam the selection session talks through, so tests can drive
/// the state machine without a server.
pub trait RankClient {
    fn fetch_videos(&self, settings: &Settings) -> Result<PostVideosResponse, ApiError>;
    fn submit(&self, choice_set: &ChoiceSet, settings: &Settings)
        -> Result<PostSubmitResponse, ApiError>;
    fn skip(&self, choice_set: &ChoiceSet, settings: &Settings)
        -> Result<PostSubmitResponse, ApiError>;
    fn undo(&self, record_id: &str) -> Result<PostUndoResponse, ApiError>;
    fn rankings(&self) -> Result<GetRankingsResponse, ApiError>;
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn status(&self) -> Result<GetStatusResponse, ApiError> {
        self.get("/")
    }

    pub fn version(&self) -> Result<GetVersionResponse, ApiError> {
        self.get("/version")
    }

    fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        debug!(target: "api", "GET {path}");
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()?;
        decode(response)
    }

    fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, ApiError> {
        debug!(target: "api", "POST {path}");
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()?;
        decode(response)
    }
}

impl RankClient for ApiClient {
    fn fetch_videos(&self, settings: &Settings) -> Result<PostVideosResponse, ApiError> {
        self.post("/videos", &PostVideosRequest { settings })
    }

    fn submit(
        &self,
        choice_set: &ChoiceSet,
        settings: &Settings,
    ) -> Result<PostSubmitResponse, ApiError> {
        self.post("/submit", &PostSubmitRequest { choice_set, settings })
    }

    fn skip(
        &self,
        choice_set: &ChoiceSet,
        settings: &Settings,
    ) -> Result<PostSubmitResponse, ApiError> {
        self.post("/skip", &PostSubmitRequest { choice_set, settings })
    }

    fn undo(&self, record_id: &str) -> Result<PostUndoResponse, ApiError> {
        self.post("/undo", &PostUndoRequest { record_id })
    }

    fn rankings(&self) -> Result<GetRankingsResponse, ApiError> {
        self.get("/rankings")
    }
}

fn decode<R: DeserializeOwned>(response: Response) -> Result<R, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let detail: Value = response.json().unwrap_or(Value::Null);
        return Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        });
    }
    Ok(response.json()?)
}
