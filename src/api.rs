use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::measurement::Measurement;
use crate::services::{
    CrossSectionProfile, MeasurementService, ProfileVariable, Selection, StatisticsTable,
    TelemetryService,
};
use crate::telemetry::{TelemetrySeries, TelemetryWindow};
use crate::utils::split_list;

/// Query timestamp format for telemetry windows
pub const QUERY_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Clone)]
pub struct AppState {
    pub measurement_service: MeasurementService,
    pub telemetry_service: TelemetryService,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, Deserialize)]
pub struct SitesResponse {
    pub sites: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct DatesResponse {
    pub dates: Vec<String>,
}

/// `?site=CC1&dates=2024/01/01,2024/02/01`
#[derive(Debug, Default, Deserialize)]
pub struct SelectionParams {
    pub site: Option<String>,
    pub dates: Option<String>,
}

impl From<&SelectionParams> for Selection {
    fn from(params: &SelectionParams) -> Self {
        Selection {
            site: params
                .site
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            dates: params.dates.as_deref().map(split_list).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileParams {
    pub site: Option<String>,
    pub dates: Option<String>,
    pub variables: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TelemetryParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/sites", get(get_sites))
        .route("/dates", get(get_dates))
        .route("/measurements", get(get_measurements))
        .route("/statistics", get(get_statistics))
        .route("/profiles", get(get_profiles))
        .route("/telemetry", get(get_telemetry))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[instrument(skip(state))]
async fn get_sites(State(state): State<AppState>) -> Json<SitesResponse> {
    let sites = state.measurement_service.sites().await;
    info!("Returning {} sites", sites.len());
    Json(SitesResponse { sites })
}

#[instrument(skip(state))]
async fn get_dates(State(state): State<AppState>) -> Json<DatesResponse> {
    let dates = state.measurement_service.date_labels().await;
    info!("Returning {} dates", dates.len());
    Json(DatesResponse { dates })
}

#[instrument(skip(state))]
async fn get_measurements(
    State(state): State<AppState>,
    Query(params): Query<SelectionParams>,
) -> Json<Vec<Measurement>> {
    let measurements = state
        .measurement_service
        .measurements(&Selection::from(&params))
        .await;
    info!("Returning {} measurements", measurements.len());
    Json(measurements)
}

#[instrument(skip(state))]
async fn get_statistics(
    State(state): State<AppState>,
    Query(params): Query<SelectionParams>,
) -> Json<StatisticsTable> {
    let table = state
        .measurement_service
        .statistics(&Selection::from(&params))
        .await;
    info!("Returning {} statistics rows", table.rows.len());
    Json(table)
}

#[instrument(skip(state))]
async fn get_profiles(
    State(state): State<AppState>,
    Query(params): Query<ProfileParams>,
) -> Result<Json<Vec<CrossSectionProfile>>, StatusCode> {
    let variables = match params.variables.as_deref() {
        Some(list) => split_list(list)
            .iter()
            .map(|v| v.parse::<ProfileVariable>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                warn!("Rejected profile request: {}", e);
                StatusCode::BAD_REQUEST
            })?,
        None => ProfileVariable::ALL.to_vec(),
    };

    let selection = Selection::from(&SelectionParams {
        site: params.site,
        dates: params.dates,
    });
    let profiles = state
        .measurement_service
        .profiles(&selection, &variables)
        .await;

    info!("Returning {} profiles", profiles.len());
    Ok(Json(profiles))
}

#[instrument(skip(state))]
async fn get_telemetry(
    State(state): State<AppState>,
    Query(params): Query<TelemetryParams>,
) -> Result<Json<TelemetrySeries>, StatusCode> {
    let window = telemetry_window(&params).map_err(|e| {
        warn!("Rejected telemetry request: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    let series = state.telemetry_service.depth_series(window).await;
    info!("Returning {} telemetry readings", series.readings.len());
    Ok(Json(series))
}

/// Window from query parameters; defaults to 2024-09-01 through now
fn telemetry_window(params: &TelemetryParams) -> Result<TelemetryWindow, String> {
    let parse = |value: &str| {
        NaiveDateTime::parse_from_str(value.trim(), QUERY_TIMESTAMP_FORMAT)
            .map_err(|e| format!("invalid timestamp '{value}': {e}"))
    };

    let start = match params.start.as_deref() {
        Some(value) => parse(value)?,
        None => NaiveDate::from_ymd_opt(2024, 9, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| "invalid default start".to_string())?,
    };
    let end = match params.end.as_deref() {
        Some(value) => parse(value)?,
        None => chrono::Local::now().naive_local(),
    };

    if end < start {
        return Err(format!("window end {end} is before start {start}"));
    }
    Ok(TelemetryWindow::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_from_params() {
        let params = SelectionParams {
            site: Some("  ".to_string()),
            dates: Some("2024/01/01, 2024/02/01".to_string()),
        };
        let selection = Selection::from(&params);
        assert_eq!(selection.site, None);
        assert_eq!(selection.dates.len(), 2);
    }

    #[test]
    fn test_telemetry_window_parses_bounds() {
        let params = TelemetryParams {
            start: Some("2024-09-01T00:00:00".to_string()),
            end: Some("2024-10-01T00:00:00".to_string()),
        };
        let window = telemetry_window(&params).unwrap();
        assert_eq!(window.span().num_days(), 30);
    }

    #[test]
    fn test_telemetry_window_rejects_inverted() {
        let params = TelemetryParams {
            start: Some("2024-10-01T00:00:00".to_string()),
            end: Some("2024-09-01T00:00:00".to_string()),
        };
        assert!(telemetry_window(&params).is_err());
    }

    #[test]
    fn test_telemetry_window_rejects_garbage() {
        let params = TelemetryParams {
            start: Some("yesterday".to_string()),
            end: None,
        };
        assert!(telemetry_window(&params).is_err());
    }
}
