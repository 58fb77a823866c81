use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::fare::FareQuote;
use crate::models::vehicle::VehicleClass;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/fares/estimate", get(estimate_fare))
        .route("/vehicle-classes", get(list_vehicle_classes))
}

#[derive(Deserialize)]
pub struct EstimateQuery {
    #[serde(default)]
    pub vehicle_class: String,
    pub distance_km: Option<f64>,
}

#[derive(Serialize)]
struct VehicleClassInfo {
    id: VehicleClass,
    description: &'static str,
    base_rate: u64,
    multiplier: f64,
}

async fn estimate_fare(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EstimateQuery>,
) -> Result<Json<FareQuote>, AppError> {
    let distance_km = query
        .distance_km
        .ok_or_else(|| AppError::Validation("distance_km is required".to_string()))?;

    let quote = state
        .estimator
        .estimate_named(&query.vehicle_class, distance_km)?;
    Ok(Json(quote))
}

async fn list_vehicle_classes(State(state): State<Arc<AppState>>) -> Json<Vec<VehicleClassInfo>> {
    let fares = state.estimator.config();
    let classes = VehicleClass::ALL
        .into_iter()
        .map(|class| VehicleClassInfo {
            id: class,
            description: class.description(),
            base_rate: fares.base_rates.get(class),
            multiplier: fares.multipliers.get(class),
        })
        .collect();

    Json(classes)
}
