// SPDX-License-Identifier: MIT

//! Stateless HTTP API around the evaluator
//!
//! Policies and records arrive in the request body; nothing is stored.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::Result;
use crate::policy::catalogue::{FieldCatalogue, ValueKind};
use crate::policy::record::Record;
use crate::policy::rule::{Evaluator, Operator, RuleGroup, Verdict};
use crate::policy::validate::{PolicyIssue, PolicyValidator};

/// Operator names with the value kinds admitting them
static OPERATOR_TABLE: Lazy<Value> = Lazy::new(|| {
    let operators: Vec<Value> = Operator::KNOWN
        .iter()
        .map(|op| {
            let kinds: Vec<&str> = ValueKind::ALL
                .iter()
                .filter(|kind| kind.admits(op))
                .map(|kind| kind.as_str())
                .collect();
            json!({ "operator": op.as_str(), "kinds": kinds })
        })
        .collect();
    json!(operators)
});

/// Shared, read-only server state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub catalogue: FieldCatalogue,
    pub evaluator: Evaluator,
}

#[derive(Debug, Deserialize)]
pub struct EvaluationRequest {
    pub policy: RuleGroup,
    pub record: Record,
}

#[derive(Debug, Deserialize)]
pub struct ValidationRequest {
    pub policy: RuleGroup,
}

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub issues: Vec<PolicyIssue>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/fields", get(list_fields))
        .route("/api/operators", get(list_operators))
        .route("/api/evaluate", post(evaluate))
        .route("/api/validate", post(validate))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(port: u16, state: AppState) -> Result<()> {
    let app = router(Arc::new(state));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_fields(State(state): State<Arc<AppState>>) -> Json<FieldCatalogue> {
    Json(state.catalogue.clone())
}

async fn list_operators() -> Json<Value> {
    Json(OPERATOR_TABLE.clone())
}

/// Outcome of a handler whose JSON body may have been rejected
type ApiResult<T> = std::result::Result<T, JsonRejection>;

/// Unwrap a JSON body, logging the rejection when it does not parse
fn accept<T>(route: &str, payload: ApiResult<Json<T>>) -> ApiResult<T> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            log::error!("Rejected {} request: {}", route, rejection.body_text());
            Err(rejection)
        }
    }
}

async fn evaluate(
    State(state): State<Arc<AppState>>,
    payload: ApiResult<Json<EvaluationRequest>>,
) -> ApiResult<Json<Verdict>> {
    let payload = accept("/api/evaluate", payload)?;
    let verdict = state
        .evaluator
        .evaluate_policy(&payload.policy, &payload.record);
    for diagnostic in &verdict.diagnostics {
        log::warn!("Policy diagnostic: {}", diagnostic);
    }
    log::info!("Evaluated policy: eligible={}", verdict.eligible);
    Ok(Json(verdict))
}

async fn validate(
    State(state): State<Arc<AppState>>,
    payload: ApiResult<Json<ValidationRequest>>,
) -> ApiResult<Json<ValidationResponse>> {
    let payload = accept("/api/validate", payload)?;
    let issues = PolicyValidator::new(&state.catalogue)
        .with_max_depth(state.evaluator.max_depth())
        .validate(&payload.policy);
    Ok(Json(ValidationResponse {
        valid: issues.is_empty(),
        issues,
    }))
}
