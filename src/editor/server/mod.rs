// SPDX-License-Identifier: MIT

//! HTTP surface for the editor command interface
//!
//! Every response carries the full editor state so the client can re-render
//! from it. Refused edits answer with the unchanged state plus an `error`.

use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::editor::config::ServerConfig;
use crate::editor::session::SharedEditor;
use crate::engine::{EditError, EditIntent, FlowError, NodeId, NodeKind};

pub fn router(editor: SharedEditor) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/workflow", get(get_workflow))
        .route("/api/workflow/nodes", post(add_node))
        .route(
            "/api/workflow/nodes/{id}",
            patch(update_label).delete(delete_node),
        )
        .route("/api/workflow/undo", post(undo))
        .route("/api/workflow/redo", post(redo))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(editor)
}

pub async fn serve(config: &ServerConfig, editor: SharedEditor) -> Result<(), FlowError> {
    let app = router(editor);

    let addr = config.addr();
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Debug, Deserialize)]
struct AddNodeRequest {
    parent_id: NodeId,
    kind: NodeKind,
    #[serde(default)]
    slot: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct LabelRequest {
    label: String,
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_workflow(State(editor): State<SharedEditor>) -> Json<Value> {
    Json(json!(editor.snapshot().await))
}

async fn add_node(
    State(editor): State<SharedEditor>,
    Json(payload): Json<AddNodeRequest>,
) -> Json<Value> {
    let intent = EditIntent::Add {
        parent_id: payload.parent_id,
        kind: payload.kind,
        slot: payload.slot,
    };
    apply(&editor, intent).await
}

async fn update_label(
    State(editor): State<SharedEditor>,
    Path(id): Path<String>,
    Json(payload): Json<LabelRequest>,
) -> Json<Value> {
    let intent = EditIntent::Relabel {
        node_id: NodeId::from(id),
        label: payload.label,
    };
    apply(&editor, intent).await
}

async fn delete_node(State(editor): State<SharedEditor>, Path(id): Path<String>) -> Json<Value> {
    let intent = EditIntent::Delete {
        node_id: NodeId::from(id),
    };
    apply(&editor, intent).await
}

async fn undo(State(editor): State<SharedEditor>) -> Json<Value> {
    let mut session = editor.lock().await;
    let result = session.undo().map(|_| None);
    respond(json!(session.snapshot()), result)
}

async fn redo(State(editor): State<SharedEditor>) -> Json<Value> {
    let mut session = editor.lock().await;
    let result = session.redo().map(|_| None);
    respond(json!(session.snapshot()), result)
}

/// Edit and read back under one lock so the response matches the edit
async fn apply(editor: &SharedEditor, intent: EditIntent) -> Json<Value> {
    let mut session = editor.lock().await;
    let result = session.apply(&intent);
    respond(json!(session.snapshot()), result)
}

fn respond(mut body: Value, result: Result<Option<NodeId>, EditError>) -> Json<Value> {
    match result {
        Ok(Some(created)) => body["created"] = json!(created),
        Ok(None) => {}
        Err(e) => {
            log::warn!("Request refused: {}", e);
            body["error"] = json!(e.to_string());
        }
    }
    Json(body)
}
