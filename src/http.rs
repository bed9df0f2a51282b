use crate::{
    alert::AlertBatch,
    auth::validate_token,
    config::{ConfigStore, Settings},
    dispatcher::{Dispatcher, concurrency_limit},
    error::{Error, Result},
    executor::Executor,
    metrics::{
        METRICS_HANDLE,
        http::{http_request_timer, record_http_request},
    },
    report::CommandResultSet,
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequestParts, Query, State},
    http::request::Parts,
    response::IntoResponse,
    routing::{get, post},
};
use hyper::StatusCode;
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::Semaphore;

/// Everything a request handler needs
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfigStore>,
    pub settings: Settings,
    pub client: reqwest::Client,
    pub executor: Executor,
    /// Ceiling on alerts handled at once, shared by every webhook call
    pub limit: Option<Arc<Semaphore>>,
}

impl AppState {
    /// Create the state shared by all handlers
    pub fn new(config: Arc<ConfigStore>, settings: Settings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        let executor = Executor::new(settings.command_timeout);
        let limit = concurrency_limit(&settings);

        Ok(Self {
            config,
            settings,
            client,
            executor,
            limit,
        })
    }
}

/// Creates an Axum Web Server
pub async fn create_server(state: AppState) -> anyhow::Result<()> {
    tracing::info!("Starting the web server");

    let addr = state.settings.listen;
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);

    axum_server::bind(addr)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await?;

    Ok(())
}

/// Create the router for the application
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/report", get(report))
        .route("/webhook", post(webhook))
        .route("/alive", get(alive))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Query string parameters. A repeated key keeps its first value.
#[derive(Debug)]
struct Params(Vec<(String, String)>);

impl Params {
    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

impl<S> FromRequestParts<S> for Params
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::warn!("Could not parse query string: {}", e);
                Error::validation("Could not parse query string")
            })?;

        Ok(Self(pairs))
    }
}

/// This is the handler for the /report path, served by the agent
#[tracing::instrument(skip_all)]
async fn report(
    State(state): State<AppState>,
    params: Params,
) -> Result<Json<CommandResultSet>> {
    record_http_request("/report");
    let _timer = http_request_timer("/report");

    let config = state.config.current().await;

    let report = state
        .executor
        .run_report(
            &config,
            params.get("token"),
            params.get("alertName"),
        )
        .await?;

    Ok(Json(report))
}

/// This is the handler for the /webhook path, called by Alertmanager
#[tracing::instrument(skip_all)]
async fn webhook(
    State(state): State<AppState>,
    params: Params,
    body: Bytes,
) -> Result<StatusCode> {
    record_http_request("/webhook");
    let _timer = http_request_timer("/webhook");

    let config = state.config.current().await;

    validate_token(&config.token, params.get("token"))?;

    let batch: AlertBatch = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!("Could not parse webhook payload: {}", e);
        Error::validation("Could not parse payload")
    })?;

    let summary = Dispatcher::new(config, state.client.clone(), &state.settings)
        .with_limit(state.limit.clone())
        .dispatch(batch)
        .await;

    if summary.failed > 0 {
        tracing::warn!(
            "{} of {} firing alert(s) could not be reported",
            summary.failed,
            summary.firing
        );
    }

    Ok(StatusCode::OK)
}

/// This is the handler for the /alive path
async fn alive() -> StatusCode {
    record_http_request("/alive");
    let _timer = http_request_timer("/alive");

    StatusCode::OK
}

/// This is the handler for the /metrics path
#[tracing::instrument]
async fn metrics() -> impl IntoResponse {
    record_http_request("/metrics");
    let _timer = http_request_timer("/metrics");

    match METRICS_HANDLE.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to get the metrics handle".to_string(),
        ),
    }
}
