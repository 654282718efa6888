//! Customer listing endpoint.

use axum::{extract::State, routing::get, Json, Router};

use crate::database;
use crate::error::AppError;
use crate::json::CustomerJson;
use crate::AppState;

/// Customer routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/customers", get(list_customers))
}

/// Return all customer names, newest account code first.
async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerJson>>, AppError> {
    let names = database::fetch_customer_names(&state.pool).await?;
    let customers = names.into_iter().map(|name| CustomerJson { name }).collect();
    Ok(Json(customers))
}
