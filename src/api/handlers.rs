//! Request handlers. Thin: parse input, call a service, serialize output.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::{Code, Entity, EntityKind};
use crate::error::CatalogError;
use crate::filters::{fields, Filter};

use super::state::AppState;

/// Wraps [`CatalogError`] so handlers can return it directly; maps error
/// kinds to status codes per the documented contract (argument → 400,
/// operation → 400, veto → 409, integrity → 500, I/O and serde → 500).
pub struct ApiError(pub CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CatalogError::Argument(_) => StatusCode::BAD_REQUEST,
            CatalogError::Operation(_) => StatusCode::BAD_REQUEST,
            CatalogError::Veto { .. } => StatusCode::CONFLICT,
            CatalogError::Integrity(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Io(_) | CatalogError::Serde(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn parse_kind(raw: &str) -> ApiResult<EntityKind> {
    raw.parse::<EntityKind>()
        .map_err(|_| ApiError(CatalogError::argument(format!("unknown entity kind {raw:?}"))))
}

fn parse_instant(raw: &str) -> ApiResult<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .map_err(|_| ApiError(CatalogError::argument(format!("{raw:?} is not a valid ISO-8601 instant"))))
}

fn parse_code(raw: &str) -> ApiResult<Code> {
    raw.parse::<Code>()
        .map_err(|_| ApiError(CatalogError::argument(format!("{raw:?} is not a valid code"))))
}

/// `GET /api/entities` — the kinds and serialization formats this API
/// supports.
pub async fn list_entities() -> Json<Value> {
    Json(json!({
        "kinds": EntityKind::all_names(),
        "formats": ["json"],
    }))
}

fn require_json_format(fmt: &str) -> ApiResult<()> {
    if fmt == "json" {
        Ok(())
    } else {
        Err(ApiError(CatalogError::argument(format!(
            "unsupported format {fmt:?}; only \"json\" is implemented"
        ))))
    }
}

/// `GET /api/data/{kind}/{fmt}` — dump an entire bucket.
pub async fn dump_bucket(
    State(state): State<AppState>,
    Path((kind, fmt)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Entity>>> {
    require_json_format(&fmt)?;
    let kind = parse_kind(&kind)?;
    Ok(Json(state.repo.bucket(kind)))
}

/// `POST /api/data/{kind}/{fmt}` — dump a bucket filtered by a JSON array of
/// filters.
pub async fn dump_bucket_filtered(
    State(state): State<AppState>,
    Path((kind, fmt)): Path<(String, String)>,
    Json(filters): Json<Vec<Filter>>,
) -> ApiResult<Json<Vec<Entity>>> {
    require_json_format(&fmt)?;
    let kind = parse_kind(&kind)?;
    let records = state.repo.bucket(kind);
    Ok(Json(crate::filters::apply(&state.repo, &records, &filters)))
}

/// `GET /api/filters/{kind}` — addressable top-level field names and the
/// supported operator vocabulary.
pub async fn describe_filters(Path(kind): Path<String>) -> ApiResult<Json<Value>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(json!({
        "fields": fields::known_fields(kind),
        "operators": ["EQUALS", "LIKE", "NOT_EQUAL", "GREATER", "GREATER_EQUAL", "LESS", "LESS_EQUAL"],
    })))
}

/// Query parameters for `GET /api/reports/osv`.
#[derive(Debug, Deserialize)]
pub struct OsvQuery {
    start_date: String,
    end_date: String,
    storage_id: String,
}

/// `GET /api/reports/osv?start_date&end_date&storage_id`
pub async fn osv_report(
    State(state): State<AppState>,
    Query(query): Query<OsvQuery>,
) -> ApiResult<Json<Vec<crate::services::OsvRow>>> {
    let start = parse_instant(&query.start_date)?;
    let end = parse_instant(&query.end_date)?;
    let location = parse_code(&query.storage_id)?;
    Ok(Json(state.osv_service.generate(start, end, location)?))
}

/// `POST /api/reports/osv/filter` — OSV driven entirely by a filter array
/// carrying `period`/`storage` pseudo-fields.
pub async fn osv_report_filtered(
    State(state): State<AppState>,
    Json(filters): Json<Vec<Filter>>,
) -> ApiResult<Json<Vec<crate::services::OsvRow>>> {
    Ok(Json(state.osv_service.generate_from_filters(&filters)?))
}

/// Query parameters for `GET /api/balances`.
#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    date: String,
    storage_id: Option<String>,
}

/// `GET /api/balances?date[&storage_id]`
pub async fn balances(
    State(state): State<AppState>,
    Query(query): Query<BalanceQuery>,
) -> ApiResult<Json<Vec<crate::services::BalanceRow>>> {
    let target = parse_instant(&query.date)?;
    let location = query.storage_id.as_deref().map(parse_code).transpose()?;
    let cutoff = state.settings_service.block_period();
    Ok(Json(state.balance_service.calculate(target, location, cutoff)?))
}

/// `GET /api/settings/block-period`
pub async fn get_block_period(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "block_period": state.settings_service.block_period() }))
}

/// Body for `POST /api/settings/block-period`.
#[derive(Debug, Deserialize)]
pub struct SetBlockPeriodBody {
    block_period: String,
}

/// `POST /api/settings/block-period`
pub async fn set_block_period(
    State(state): State<AppState>,
    Json(body): Json<SetBlockPeriodBody>,
) -> ApiResult<Json<Value>> {
    let cutoff = parse_instant(&body.block_period)?;
    state.settings_service.set_cutoff(
        cutoff,
        &state.cache_service,
        &state.cache_snapshot_path,
        &state.bus,
    )?;
    Ok(Json(json!({ "block_period": cutoff })))
}

/// `PUT /api/reference/{kind}` — add.
pub async fn add_reference(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(attrs): Json<serde_json::Map<String, Value>>,
) -> ApiResult<Json<Entity>> {
    Ok(Json(state.reference_service.add(&kind, &attrs)?))
}

/// Body shared by change/delete: carries the target's code alongside any
/// attributes to merge.
#[derive(Debug, Deserialize)]
pub struct ReferenceChangeBody {
    unique_code: String,
    #[serde(flatten)]
    attrs: serde_json::Map<String, Value>,
}

/// `PATCH /api/reference/{kind}` — change.
pub async fn change_reference(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(body): Json<ReferenceChangeBody>,
) -> ApiResult<Json<Entity>> {
    let code = parse_code(&body.unique_code)?;
    Ok(Json(state.reference_service.change(&kind, code, &body.attrs)?))
}

/// Query parameters for `DELETE /api/reference/{kind}`.
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    code: String,
}

/// `DELETE /api/reference/{kind}?code=...` — remove.
pub async fn remove_reference(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<StatusCode> {
    let code = parse_code(&query.code)?;
    state.reference_service.remove(&kind, code)?;
    Ok(StatusCode::NO_CONTENT)
}
