use std::{collections::BTreeMap, net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{
    DelayMode, PlannerConfig, PlanError, ScenarioOutcome, Timeline, TimelineSummary, Workflow,
    calculations::compare::compare_scenarios, catalog, render::RenderError, render::SvgRenderer,
};

#[derive(Clone)]
pub struct AppState {
    workflows: Arc<RwLock<BTreeMap<String, Workflow>>>,
    config: Arc<PlannerConfig>,
}

impl AppState {
    pub fn new(workflows: Vec<Workflow>, config: PlannerConfig) -> Self {
        let workflows = workflows
            .into_iter()
            .map(|wf| (wf.key.clone(), wf))
            .collect();
        Self {
            workflows: Arc::new(RwLock::new(workflows)),
            config: Arc::new(config),
        }
    }

    /// State preloaded with the built-in catalog.
    pub fn with_builtin(config: PlannerConfig) -> Self {
        Self::new(catalog::builtin(), config)
    }

    fn workflow(&self, key: &str) -> Result<Workflow, ApiError> {
        self.workflows
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| PlanError::UnknownWorkflow(key.to_string()).into())
    }

    fn mode(&self, requested: Option<&str>) -> Result<DelayMode, ApiError> {
        match requested {
            Some(mode) => DelayMode::from_str(mode).map_err(ApiError::Invalid),
            None => Ok(self.config.default_mode),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl From<PlanError> for ApiError {
    fn from(value: PlanError) -> Self {
        match value {
            PlanError::UnknownScenario { .. } | PlanError::UnknownWorkflow(_) => {
                ApiError::NotFound(value.to_string())
            }
            PlanError::DataFrame(_) => ApiError::Internal(value.to_string()),
            _ => ApiError::Invalid(value.to_string()),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(value: RenderError) -> Self {
        match value {
            RenderError::Plan(err) => err.into(),
            RenderError::Color(err) => ApiError::Invalid(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TimelineQuery {
    pub scenario: Option<String>,
    pub mode: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkflowListing {
    pub key: String,
    pub title: String,
    pub tasks: usize,
    pub scenarios: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineResponse {
    pub summary: TimelineSummary,
    pub timeline: Timeline,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/workflows", get(list_workflows).post(create_workflow))
        .route("/workflows/:key", get(get_workflow))
        .route("/workflows/:key/timeline", get(get_timeline))
        .route("/workflows/:key/chart.svg", get(get_chart))
        .route("/workflows/:key/compare", get(get_comparison))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_workflows(State(state): State<AppState>) -> Json<Vec<WorkflowListing>> {
    let listings = {
        let guard = state.workflows.read();
        guard
            .values()
            .map(|wf| WorkflowListing {
                key: wf.key.clone(),
                title: wf.title().to_string(),
                tasks: wf.tasks.len(),
                scenarios: wf.scenario_labels().into_iter().map(String::from).collect(),
            })
            .collect()
    };
    Json(listings)
}

async fn create_workflow(
    State(state): State<AppState>,
    Json(workflow): Json<Workflow>,
) -> Result<(StatusCode, Json<Workflow>), ApiError> {
    workflow.validate()?;
    {
        let mut guard = state.workflows.write();
        if guard.contains_key(&workflow.key) {
            return Err(ApiError::Conflict(format!(
                "workflow '{}' already exists",
                workflow.key
            )));
        }
        guard.insert(workflow.key.clone(), workflow.clone());
    }
    info!(workflow = %workflow.key, tasks = workflow.tasks.len(), "registered workflow");
    Ok((StatusCode::CREATED, Json(workflow)))
}

async fn get_workflow(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Workflow>, ApiError> {
    Ok(Json(state.workflow(&key)?))
}

fn timeline_for(state: &AppState, key: &str, query: &TimelineQuery) -> Result<Timeline, ApiError> {
    let workflow = state.workflow(key)?;
    let mode = state.mode(query.mode.as_deref())?;
    let timeline = workflow
        .timeline(query.scenario.as_deref(), mode)?
        .with_palette_overrides(&state.config.palette_overrides);
    Ok(match query.category.as_deref() {
        Some(category) => timeline.for_category(category),
        None => timeline,
    })
}

async fn get_timeline(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<TimelineResponse>, ApiError> {
    let timeline = timeline_for(&state, &key, &query)?;
    Ok(Json(TimelineResponse {
        summary: timeline.summary(),
        timeline,
    }))
}

async fn get_chart(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<TimelineQuery>,
) -> Result<Response, ApiError> {
    let timeline = timeline_for(&state, &key, &query)?;
    let svg = SvgRenderer::from_config(&state.config).render(&timeline)?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

async fn get_comparison(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<Vec<ScenarioOutcome>>, ApiError> {
    let workflow = state.workflow(&key)?;
    let mode = state.mode(query.mode.as_deref())?;
    let outcomes = tokio::task::spawn_blocking(move || compare_scenarios(&workflow, mode))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))??;
    Ok(Json(outcomes))
}
