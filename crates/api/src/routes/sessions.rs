//! Session Routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use fatigue::{FaceLandmarks, FatigueConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use session::{
    FrameSequence, ReportBuilder, Session, SessionError, SessionReport, SessionStatistics,
    DEFAULT_FPS,
};
use storage::SessionRecord;
use tracing::info;

use crate::telemetry::MetricsSink;
use crate::{ApiError, SharedState};

/// One uploaded frame: ratios, or landmarks (`null` when no face was found)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FrameInput {
    Ratios { ear: f64, mar: f64 },
    Landmarks { landmarks: Option<FaceLandmarks> },
}

impl FrameInput {
    fn ratios(&self) -> (f64, f64) {
        match self {
            Self::Ratios { ear, mar } => (*ear, *mar),
            Self::Landmarks { landmarks } => landmarks
                .as_ref()
                .map_or((0.0, 0.0), FaceLandmarks::ratios),
        }
    }
}

/// Upload body
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// Recording frame rate, 30 when absent
    #[serde(default)]
    pub fps: Option<f64>,
    /// Field overrides on top of the server's thresholds
    #[serde(default)]
    pub config: Option<Value>,
    pub frames: Vec<FrameInput>,
}

/// A stored session with its rendered reports
#[derive(Debug, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub record: SessionRecord,
    pub statistics_markdown: String,
    pub report_markdown: String,
}

impl From<SessionRecord> for SessionView {
    fn from(record: SessionRecord) -> Self {
        Self {
            statistics_markdown: record.report.render_statistics_markdown(),
            report_markdown: record.report.render_markdown(),
            record,
        }
    }
}

/// Query parameters for the list endpoint
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Serialize)]
pub struct SessionListItem {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub statistics: SessionStatistics,
}

/// Response for list endpoint
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub data: Vec<SessionListItem>,
    pub count: usize,
}

/// Run a fresh session over an uploaded recording and store the report
pub async fn create_session(
    State(state): State<SharedState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let (base, max_frames) = {
        let state = state.read().await;
        (state.fatigue.clone(), state.max_frames)
    };

    if request.frames.is_empty() {
        return Err(ApiError::BadRequest("request contains no frames".into()));
    }
    if request.frames.len() > max_frames {
        return Err(ApiError::BadRequest(format!(
            "too many frames: {} (limit {})",
            request.frames.len(),
            max_frames
        )));
    }

    let fps = request.fps.unwrap_or(DEFAULT_FPS);
    if !fps.is_finite() || fps <= 0.0 {
        return Err(ApiError::BadRequest(format!("invalid fps: {fps}")));
    }

    let config = merge_config(&base, request.config)?;
    config.validate()?;

    let frames: Vec<(f64, f64)> = request.frames.iter().map(FrameInput::ratios).collect();
    let name = request.name.unwrap_or_else(|| "untitled".to_string());

    let run_config = config.clone();
    let report = tokio::task::spawn_blocking(move || run_session(run_config, fps, frames))
        .await
        .map_err(|e| ApiError::Internal(format!("session task failed: {e}")))??;

    let record = state
        .read()
        .await
        .repository
        .insert_session(name, config, report)?;
    info!(
        id = record.id,
        frames = record.report.statistics.total_frames,
        fatigue_events = record.report.statistics.fatigue_events,
        "Session stored"
    );

    Ok((StatusCode::CREATED, Json(SessionView::from(record))))
}

/// List stored sessions, newest first
pub async fn list_sessions(
    State(state): State<SharedState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let limit = params.limit.min(500);
    let data: Vec<SessionListItem> = state
        .read()
        .await
        .repository
        .list_sessions(limit)?
        .into_iter()
        .map(|r| SessionListItem {
            id: r.id,
            created_at: r.created_at,
            name: r.name,
            statistics: r.report.statistics,
        })
        .collect();

    Ok(Json(SessionListResponse {
        count: data.len(),
        data,
    }))
}

pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<SessionView>, ApiError> {
    let record = state.read().await.repository.get_session(id)?;
    Ok(Json(record.into()))
}

pub async fn delete_session(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.read().await.repository.delete_session(id)?;
    Ok(StatusCode::NO_CONTENT)
}

fn run_session(
    config: FatigueConfig,
    fps: f64,
    frames: Vec<(f64, f64)>,
) -> Result<SessionReport, SessionError> {
    let mut session = Session::new(config)?;
    let mut source = FrameSequence::new(fps, frames);
    let mut sinks = (ReportBuilder::new(fps), MetricsSink);
    session.run(&mut source, &mut sinks)?;
    Ok(sinks.0.finish_report())
}

/// Overlay the fields of `overrides` on `base`
fn merge_config(base: &FatigueConfig, overrides: Option<Value>) -> Result<FatigueConfig, ApiError> {
    let Some(overrides) = overrides else {
        return Ok(base.clone());
    };
    let Value::Object(fields) = overrides else {
        return Err(ApiError::InvalidConfig("config must be an object".into()));
    };

    let mut merged = serde_json::to_value(base)
        .map_err(|e| ApiError::Internal(format!("config serialization failed: {e}")))?;
    if let Value::Object(map) = &mut merged {
        map.extend(fields);
    }
    serde_json::from_value(merged).map_err(|e| ApiError::InvalidConfig(e.to_string()))
}
