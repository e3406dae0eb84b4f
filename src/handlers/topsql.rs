use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::AppState;
use crate::models::{InstanceType, SqlRecord};
use crate::services::ListDetailTable;
use crate::utils::ApiResult;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DetailTableRequest {
    pub record: SqlRecord,
    pub instance_type: InstanceType,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectPlanRequest {
    pub record: SqlRecord,
    pub plan_digest: String,
}

// Render the list detail table for one SQL record
#[utoipa::path(
    post,
    path = "/api/topsql/detail/table",
    request_body = DetailTableRequest,
    responses(
        (status = 200, description = "Rendered detail table", body = ListDetailTable),
    ),
    tag = "Top SQL"
)]
pub async fn get_detail_table(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DetailTableRequest>,
) -> ApiResult<Json<ListDetailTable>> {
    let table = state
        .topsql_service
        .build_detail_table(&request.record, request.instance_type);
    tracing::debug!(
        "Rendered detail table for {} with {} rows",
        request.record.sql_digest,
        table.rows.len()
    );
    Ok(Json(table))
}

// Persist a plan-row selection
#[utoipa::path(
    post,
    path = "/api/topsql/detail/select",
    request_body = SelectPlanRequest,
    responses(
        (status = 200, description = "Whether the selection was applied"),
    ),
    tag = "Top SQL"
)]
pub async fn select_plan(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectPlanRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let applied = state
        .topsql_service
        .select_plan(&request.record, &request.plan_digest)?;
    Ok(Json(json!({ "applied": applied })))
}
