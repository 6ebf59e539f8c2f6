// HTTP routes for table browsing, row CRUD and the canned arena reports

use arena_core::{ColumnDescriptor, Error, FilterSet, Record, RowData, Scalar, UpdateSpec};
use arena_storage::{Reports, TableStore};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

// API state
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn TableStore>,
    pub reports: Arc<Reports>,
}

impl ApiState {
    pub fn new(store: Arc<dyn TableStore>, reports: Arc<Reports>) -> Self {
        Self { store, reports }
    }
}

// Response types
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct TableDataResponse {
    pub headers: Vec<String>,
    pub data: Vec<Vec<Scalar>>,
}

#[derive(Debug, Serialize)]
pub struct SelectResponse {
    pub success: bool,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Scalar>>,
}

#[derive(Debug, Serialize)]
pub struct HeadersResponse {
    pub success: bool,
    pub headers: Vec<ColumnDescriptor>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpikeAverage {
    pub avg_spike_planted: Scalar,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Error body for the table browse endpoint, which carries no `success` flag.
#[derive(Debug, Serialize)]
pub struct BareErrorResponse {
    pub error: String,
}

// Query parameters
#[derive(Debug, Deserialize)]
pub struct TableParams {
    pub table: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
    pub table: Option<String>,
    pub key_column: Option<String>,
    pub key_value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ThresholdParams {
    pub threshold: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AbilitiesParams {
    pub abilities: Option<String>,
}

/// Failure mapped to a status code and a `{success: false, error}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!("Rejected request: {}", message);
        Self {
            status: StatusCode::BAD_REQUEST,
            message,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// Keep client errors as they are; replace a server fault's text with `message`.
    /// The fault itself is logged where the connection was held.
    pub fn masked(err: Error, message: &str) -> Self {
        if err.is_client_error() {
            return err.into();
        }
        Self::internal(message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => Self::bad_request(msg),
            Error::NotFound(msg) => Self::not_found(msg),
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            success: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Create HTTP router with all API routes
pub fn create_router(state: ApiState, enable_cors: bool) -> Router {
    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/check-db-connection", get(check_connection_handler))
        // Generic table access
        .route("/table", get(fetch_table_handler))
        .route("/select-table", post(select_table_handler))
        .route("/table-headers", get(table_headers_handler))
        .route("/insert-table", post(insert_row_handler))
        .route("/update-table", post(update_row_handler))
        .route("/delete-row", delete(delete_row_handler))
        // Canned reports
        .route("/group-by-query", get(team_earnings_handler))
        .route("/join-query", get(headshot_leaders_handler))
        .route("/project-agent", get(agent_abilities_handler))
        .route("/group-by-having", get(agent_death_totals_handler))
        .route("/divide-matches", post(divide_matches_handler))
        .route("/nested-query", get(spike_average_handler))
        .with_state(state)
        .layer(CompressionLayer::new());

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::bad_request(message)),
    }
}

/// Health check endpoint
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn check_connection_handler(State(state): State<ApiState>) -> &'static str {
    if state.store.ping().await {
        "connected"
    } else {
        "unable to connect"
    }
}

async fn fetch_table_handler(
    State(state): State<ApiState>,
    Query(params): Query<TableParams>,
) -> Response {
    let table = match params.table {
        Some(t) if !t.is_empty() => t,
        _ => {
            warn!("Rejected request: table name missing");
            let body = Json(BareErrorResponse {
                error: "Table name is required.".to_string(),
            });
            return (StatusCode::BAD_REQUEST, body).into_response();
        }
    };

    match state.store.fetch_table(&table).await {
        Ok(result) => Json(TableDataResponse {
            headers: result.headers,
            data: result.rows,
        })
        .into_response(),
        Err(_) => {
            let body = Json(BareErrorResponse {
                error: "Failed to fetch table data.".to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}

async fn select_table_handler(
    State(state): State<ApiState>,
    Query(params): Query<TableParams>,
    body: Result<Json<FilterSet>, JsonRejection>,
) -> ApiResult<SelectResponse> {
    let table = required(params.table, "Table name is required.")?;
    // No JSON body at all selects every row.
    let filters = match body {
        Ok(Json(filters)) => filters,
        Err(JsonRejection::MissingJsonContentType(_)) => FilterSet::new(),
        Err(rejection) => return Err(rejection.into()),
    };

    let result = state.store.select_rows(&table, &filters).await?;
    Ok(Json(SelectResponse {
        success: true,
        headers: result.headers,
        rows: result.rows,
    }))
}

async fn table_headers_handler(
    State(state): State<ApiState>,
    Query(params): Query<TableParams>,
) -> ApiResult<HeadersResponse> {
    let table = required(params.table, "Table name is required.")?;

    let headers = state
        .store
        .describe_table(&table)
        .await
        .map_err(|e| ApiError::masked(e, "Failed to fetch table headers."))?;
    Ok(Json(HeadersResponse {
        success: true,
        headers,
    }))
}

async fn insert_row_handler(
    State(state): State<ApiState>,
    Query(params): Query<TableParams>,
    body: Result<Json<RowData>, JsonRejection>,
) -> ApiResult<SuccessResponse> {
    let table = required(params.table, "Table name and row data are required.")?;
    let Json(row) = body?;

    if state.store.insert_row(&table, &row).await? {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(ApiError::internal("Insertion failed without details."))
    }
}

async fn update_row_handler(
    State(state): State<ApiState>,
    Query(params): Query<TableParams>,
    body: Result<Json<UpdateSpec>, JsonRejection>,
) -> ApiResult<SuccessResponse> {
    let table = required(params.table, "Table name and row data are required.")?;
    let Json(spec) = body?;

    if state.store.update_row(&table, &spec).await? {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(ApiError::internal("Update failed without details."))
    }
}

async fn delete_row_handler(
    State(state): State<ApiState>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<SuccessResponse> {
    let message = "Table name, key column, and key value are required.";
    let table = required(params.table, message)?;
    let key_column = required(params.key_column, message)?;
    let key_value = required(params.key_value, message)?;

    let deleted = state
        .store
        .delete_row(&table, &key_column, Scalar::Text(key_value))
        .await?;
    if deleted == 0 {
        return Err(Error::NotFound("Row not found or could not be deleted.".to_string()).into());
    }
    Ok(Json(SuccessResponse { success: true }))
}

async fn team_earnings_handler(State(state): State<ApiState>) -> ApiResult<DataResponse<Vec<Record>>> {
    let data = state.reports.team_earnings().await?;
    Ok(Json(DataResponse { success: true, data }))
}

async fn headshot_leaders_handler(
    State(state): State<ApiState>,
    Query(params): Query<ThresholdParams>,
) -> ApiResult<DataResponse<Vec<Record>>> {
    let threshold = required(params.threshold, "Headshot percentage threshold is required.")?;
    let threshold = parse_threshold(&threshold)
        .ok_or_else(|| ApiError::bad_request("Invalid threshold value provided."))?;

    let data = state
        .reports
        .headshot_leaders(threshold)
        .await
        .map_err(|e| ApiError::masked(e, "Failed to fetch join query results."))?;
    Ok(Json(DataResponse { success: true, data }))
}

async fn agent_abilities_handler(
    State(state): State<ApiState>,
    Query(params): Query<AbilitiesParams>,
) -> ApiResult<DataResponse<Vec<Record>>> {
    let abilities = parse_abilities(params.abilities.as_deref().unwrap_or(""));
    if abilities.is_empty() {
        return Err(ApiError::bad_request("At least one ability is required."));
    }

    let data = state
        .reports
        .agent_abilities(&abilities)
        .await
        .map_err(|e| ApiError::masked(e, "Failed to fetch projection data."))?;
    Ok(Json(DataResponse { success: true, data }))
}

async fn agent_death_totals_handler(
    State(state): State<ApiState>,
    Query(params): Query<ThresholdParams>,
) -> ApiResult<DataResponse<Vec<Record>>> {
    let threshold = params
        .threshold
        .as_deref()
        .and_then(parse_threshold)
        .ok_or_else(|| ApiError::bad_request("Invalid threshold value provided."))?;

    let data = state
        .reports
        .agent_death_totals(threshold)
        .await
        .map_err(|e| ApiError::masked(e, "Failed to fetch group by results."))?;
    Ok(Json(DataResponse { success: true, data }))
}

async fn divide_matches_handler(
    State(state): State<ApiState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> ApiResult<DataResponse<Vec<Record>>> {
    let Json(body) = body?;
    let riot_ids = parse_riot_ids(&body)?;

    let data = state.reports.matches_with_all_players(riot_ids).await?;
    info!("Division matched {} matches", data.len());
    Ok(Json(DataResponse { success: true, data }))
}

async fn spike_average_handler(State(state): State<ApiState>) -> ApiResult<DataResponse<SpikeAverage>> {
    let avg_spike_planted = state
        .reports
        .average_spikes_planted()
        .await
        .map_err(|e| ApiError::masked(e, "Failed to fetch nested query results."))?;
    Ok(Json(DataResponse {
        success: true,
        data: SpikeAverage { avg_spike_planted },
    }))
}

/// A finite number, surrounding whitespace ignored.
fn parse_threshold(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|t| t.is_finite())
}

/// Comma separated ability columns; blank entries are dropped.
fn parse_abilities(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

/// `{"riotIds": [...]}` with at least one scalar entry.
fn parse_riot_ids(body: &serde_json::Value) -> Result<Vec<Scalar>, ApiError> {
    let missing = || ApiError::bad_request("RiotIDs are required.");
    let ids = body
        .get("riotIds")
        .and_then(|v| v.as_array())
        .filter(|ids| !ids.is_empty())
        .ok_or_else(missing)?;

    ids.iter()
        .map(|id| serde_json::from_value::<Scalar>(id.clone()).map_err(|_| missing()))
        .collect()
}
