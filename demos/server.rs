// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! REST API server for the vending machine tracker.
//!
//! Run with: `cargo run --example server -- --data-file vendmachtrack.json`
//!
//! # Endpoints
//!
//! ```bash
//! # List machines (id -> location)
//! curl http://localhost:8080/vendmachtrack
//!
//! # Register a machine
//! curl -X POST "http://localhost:8080/vendmachtrack/add?id=1&location=Oslo"
//!
//! # Location / inventory of a machine
//! curl http://localhost:8080/vendmachtrack/1/name
//! curl http://localhost:8080/vendmachtrack/1
//!
//! # Stock and unstock items
//! curl -X PUT "http://localhost:8080/vendmachtrack/1/add?item=Cola&quantity=5"
//! curl -X PUT "http://localhost:8080/vendmachtrack/1/remove?item=Cola&quantity=2"
//!
//! # Move or remove a machine
//! curl -X PUT "http://localhost:8080/vendmachtrack/1?location=Bergen"
//! curl -X DELETE http://localhost:8080/vendmachtrack/1
//! ```

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::{self, JoinError};
use vendmach_tracker::config::TrackerConfig;
use vendmach_tracker::{
    ErrorKind, Inventory, JsonFileStore, MachineId, MachineList, TrackerError, TrackerService,
    logging,
};

#[derive(Parser, Debug)]
#[command(name = "vendmach-server")]
#[command(about = "HTTP API for the vending machine tracker", long_about = None)]
struct ServerConfig {
    #[command(flatten)]
    tracker: TrackerConfig,

    /// Address to listen on
    #[arg(long, env = "VENDMACH_BIND", default_value = "127.0.0.1:8080")]
    bind: String,
}

// === Request/Response DTOs ===

#[derive(Debug, Deserialize)]
pub struct ItemQuery {
    pub item: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct NewMachineQuery {
    pub id: i64,
    pub location: String,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TrackerService<JsonFileStore>>,
}

// === Error Handling ===

/// Errors a handler can return.
pub enum AppError {
    Tracker(TrackerError),
    /// The blocking service call panicked or was cancelled.
    Task(JoinError),
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        AppError::Tracker(err)
    }
}

impl From<JoinError> for AppError {
    fn from(err: JoinError) -> Self {
        AppError::Task(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = match self {
            AppError::Tracker(err) => {
                let (status, code) = match err.kind() {
                    ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                    ErrorKind::InvalidInput => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                };
                (status, code, err.to_string())
            }
            AppError::Task(err) => {
                tracing::error!(error = %err, "service task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "internal error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

/// Runs a service call on the blocking pool.
///
/// Every call takes the service mutex and reads or writes the snapshot file,
/// so it must not run on an async worker thread.
async fn with_service<T, F>(state: AppState, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&TrackerService<JsonFileStore>) -> Result<T, TrackerError> + Send + 'static,
{
    let result = task::spawn_blocking(move || f(&state.service)).await?;
    Ok(result?)
}

// === Handlers ===

/// GET /vendmachtrack
async fn list_machines(State(state): State<AppState>) -> Result<Json<MachineList>, AppError> {
    with_service(state, |service| service.get_vend_mach_list())
        .await
        .map(Json)
}

/// GET /vendmachtrack/{id}/name
async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<String>, AppError> {
    with_service(state, move |service| service.get_vend_mach_location(MachineId(id)))
        .await
        .map(Json)
}

/// GET /vendmachtrack/{id}
async fn get_inventory(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Inventory>, AppError> {
    with_service(state, move |service| service.get_inventory(MachineId(id)))
        .await
        .map(Json)
}

/// PUT /vendmachtrack/{id}/add?item=&quantity=
async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ItemQuery>,
) -> Result<Json<Inventory>, AppError> {
    with_service(state, move |service| {
        service.add_item(MachineId(id), &query.item, query.quantity)
    })
    .await
    .map(Json)
}

/// PUT /vendmachtrack/{id}/remove?item=&quantity=
async fn remove_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ItemQuery>,
) -> Result<Json<Inventory>, AppError> {
    with_service(state, move |service| {
        service.remove_item(MachineId(id), &query.item, query.quantity)
    })
    .await
    .map(Json)
}

/// PUT /vendmachtrack/{id}?location=
async fn change_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<LocationQuery>,
) -> Result<Json<MachineList>, AppError> {
    with_service(state, move |service| {
        service.change_location(MachineId(id), &query.location)
    })
    .await
    .map(Json)
}

/// POST /vendmachtrack/add?id=&location=
async fn add_machine(
    State(state): State<AppState>,
    Query(query): Query<NewMachineQuery>,
) -> Result<Json<MachineList>, AppError> {
    with_service(state, move |service| {
        service.add_vend_mach(MachineId(query.id), &query.location)
    })
    .await
    .map(Json)
}

/// DELETE /vendmachtrack/{id}
async fn remove_machine(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MachineList>, AppError> {
    with_service(state, move |service| service.remove_vend_mach(MachineId(id)))
        .await
        .map(Json)
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/vendmachtrack", get(list_machines))
        .route("/vendmachtrack/add", post(add_machine))
        .route("/vendmachtrack/{id}/name", get(get_location))
        .route("/vendmachtrack/{id}/add", put(add_item))
        .route("/vendmachtrack/{id}/remove", put(remove_item))
        .route(
            "/vendmachtrack/{id}",
            get(get_inventory)
                .put(change_location)
                .delete(remove_machine),
        )
        .with_state(state)
}

// === Main ===

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::parse();
    logging::init(config.tracker.verbose);

    if config.tracker.store().init_if_missing()? {
        tracing::info!(path = %config.tracker.data_file.display(), "created empty tracker");
    }

    let state = AppState {
        service: Arc::new(config.tracker.service()),
    };
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind).await?;
    tracing::info!(bind = %config.bind, "vending machine tracker API listening");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state(dir: &TempDir) -> AppState {
        let store = JsonFileStore::new(dir.path().join("vendmachtrack.json"));
        store.init_if_missing().unwrap();
        AppState {
            service: Arc::new(TrackerService::new(store)),
        }
    }

    #[tokio::test]
    async fn handlers_run_service_calls_off_the_runtime() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);

        let Json(list) = add_machine(
            State(state.clone()),
            Query(NewMachineQuery {
                id: 1,
                location: "Oslo".to_string(),
            }),
        )
        .await
        .ok()
        .unwrap();
        assert_eq!(list.get(&MachineId(1)).map(String::as_str), Some("Oslo"));

        let Json(inventory) = add_item(
            State(state.clone()),
            Path(1),
            Query(ItemQuery {
                item: "Cola".to_string(),
                quantity: 5,
            }),
        )
        .await
        .ok()
        .unwrap();
        assert_eq!(inventory.get("Cola"), Some(&5));
    }

    #[tokio::test]
    async fn tracker_errors_map_to_status_codes() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);

        let missing = get_inventory(State(state.clone()), Path(9)).await.err().unwrap();
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let invalid = with_service(state, |service| service.add_vend_mach(MachineId(-1), "Oslo"))
            .await
            .err()
            .unwrap();
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn panicking_service_call_is_internal_error() {
        let dir = TempDir::new().unwrap();
        let err = with_service(state(&dir), |_| -> Result<(), TrackerError> {
            panic!("service call failed")
        })
        .await
        .err()
        .unwrap();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
