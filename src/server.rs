use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::VerifyError;
use crate::pipeline::Pipeline;
use crate::report::{Failure, Outcome};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub batch_concurrency: usize,
}

#[derive(Deserialize)]
pub struct VerifyReq {
    pub claim: String,
}

#[derive(Deserialize)]
pub struct BatchReq {
    pub claims: Vec<String>,
}

#[derive(Serialize)]
pub struct BatchResp {
    pub results: Vec<Outcome>,
}

impl IntoResponse for VerifyError {
    fn into_response(self) -> Response {
        let status = match &self {
            VerifyError::EmptyClaim => StatusCode::UNPROCESSABLE_ENTITY,
            VerifyError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            VerifyError::Retrieval(_) | VerifyError::Analysis(_) | VerifyError::Classification { .. } => {
                StatusCode::BAD_GATEWAY
            }
        };
        (status, Json(Failure::from(&self))).into_response()
    }
}

pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "running", "message": "claim verification service is live" }))
}

pub async fn verify(State(state): State<Arc<AppState>>, Json(req): Json<VerifyReq>) -> Response {
    match state.pipeline.verify(&req.claim).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "verification failed");
            err.into_response()
        }
    }
}

pub async fn verify_batch(State(state): State<Arc<AppState>>, Json(req): Json<BatchReq>) -> Json<BatchResp> {
    let results = state
        .pipeline
        .verify_many(&req.claims, state.batch_concurrency)
        .await
        .into_iter()
        .map(Outcome::from)
        .collect();
    Json(BatchResp { results })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/verify", post(verify))
        .route("/verify/batch", post(verify_batch))
        .with_state(Arc::new(state))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

pub async fn run_server(state: AppState, addr: &str) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
