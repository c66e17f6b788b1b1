//! In-memory stand-in for the Routemaster HTTP API.
//!
//! Serves the status, state machine and label endpoints with the same status
//! codes as the real service. State machines are fixed at construction; each
//! creates labels in its initial state and never moves them. Deletes are
//! soft: a deleted label answers 410 to reads and updates and 409 to creates.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// A state machine served by the mock, with the state new labels start in.
#[derive(Clone, Debug)]
pub struct Machine {
    pub name: String,
    pub initial_state: String,
}

impl Machine {
    pub fn new(name: impl Into<String>, initial_state: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial_state: initial_state.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LabelBody {
    pub metadata: Map<String, Value>,
    pub state: String,
}

#[derive(Deserialize)]
pub struct MetadataBody {
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Clone, Debug)]
struct StoredLabel {
    body: LabelBody,
    deleted: bool,
}

#[derive(Debug)]
struct MachineState {
    initial_state: String,
    labels: BTreeMap<String, StoredLabel>,
}

type Db = Arc<RwLock<BTreeMap<String, MachineState>>>;

/// Machines served by the `mock-server` binary.
pub fn default_machines() -> Vec<Machine> {
    vec![Machine::new("testing-machine", "start")]
}

pub fn app(machines: impl IntoIterator<Item = Machine>) -> Router {
    let db: Db = Arc::new(RwLock::new(
        machines
            .into_iter()
            .map(|machine| {
                (
                    machine.name,
                    MachineState {
                        initial_state: machine.initial_state,
                        labels: BTreeMap::new(),
                    },
                )
            })
            .collect(),
    ));
    Router::new()
        .route("/", get(status))
        .route("/state-machines", get(list_state_machines))
        .route("/state-machines/{machine}/labels", get(list_labels))
        .route(
            "/state-machines/{machine}/labels/{label}",
            get(get_label)
                .post(create_label)
                .patch(update_label)
                .delete(delete_label),
        )
        .with_state(db)
}

pub async fn run(
    listener: TcpListener,
    machines: impl IntoIterator<Item = Machine>,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app(machines)).await
}

async fn status() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "state-machines": "/state-machines",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_state_machines(State(db): State<Db>) -> Json<Value> {
    let machines = db.read().await;
    let entries: Vec<Value> = machines
        .keys()
        .map(|name| {
            json!({
                "name": name,
                "labels": format!("/state-machines/{name}/labels"),
            })
        })
        .collect();
    Json(json!({ "state-machines": entries }))
}

async fn list_labels(
    State(db): State<Db>,
    Path(machine): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let machines = db.read().await;
    let machine = machines.get(&machine).ok_or(StatusCode::NOT_FOUND)?;
    let labels: Vec<Value> = machine
        .labels
        .iter()
        .filter(|(_, label)| !label.deleted)
        .map(|(name, _)| json!({ "name": name }))
        .collect();
    Ok(Json(json!({ "labels": labels })))
}

async fn get_label(
    State(db): State<Db>,
    Path((machine, label)): Path<(String, String)>,
) -> Result<Json<LabelBody>, StatusCode> {
    let machines = db.read().await;
    let machine = machines.get(&machine).ok_or(StatusCode::NOT_FOUND)?;
    let label = machine.labels.get(&label).ok_or(StatusCode::NOT_FOUND)?;
    if label.deleted {
        return Err(StatusCode::GONE);
    }
    Ok(Json(label.body.clone()))
}

async fn create_label(
    State(db): State<Db>,
    Path((machine, label)): Path<(String, String)>,
    Json(input): Json<MetadataBody>,
) -> Result<(StatusCode, Json<LabelBody>), StatusCode> {
    let mut machines = db.write().await;
    let machine = machines.get_mut(&machine).ok_or(StatusCode::NOT_FOUND)?;
    if machine.labels.contains_key(&label) {
        return Err(StatusCode::CONFLICT);
    }
    let body = LabelBody {
        metadata: input.metadata,
        state: machine.initial_state.clone(),
    };
    machine.labels.insert(
        label,
        StoredLabel {
            body: body.clone(),
            deleted: false,
        },
    );
    Ok((StatusCode::CREATED, Json(body)))
}

async fn update_label(
    State(db): State<Db>,
    Path((machine, label)): Path<(String, String)>,
    Json(input): Json<MetadataBody>,
) -> Result<Json<LabelBody>, StatusCode> {
    let mut machines = db.write().await;
    let machine = machines.get_mut(&machine).ok_or(StatusCode::NOT_FOUND)?;
    let label = machine.labels.get_mut(&label).ok_or(StatusCode::NOT_FOUND)?;
    if label.deleted {
        return Err(StatusCode::GONE);
    }
    label.body.metadata.extend(input.metadata);
    Ok(Json(label.body.clone()))
}

async fn delete_label(
    State(db): State<Db>,
    Path((machine, label)): Path<(String, String)>,
) -> Result<StatusCode, StatusCode> {
    let mut machines = db.write().await;
    let machine = machines.get_mut(&machine).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(label) = machine.labels.get_mut(&label) {
        label.deleted = true;
    }
    Ok(StatusCode::NO_CONTENT)
}
