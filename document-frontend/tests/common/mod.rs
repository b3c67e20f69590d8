//! A throwaway document service for exercising the HTTP backend. Paths and
//! payloads follow the document service's `/api/v1` API.

#![allow(dead_code)]

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Clone, Default)]
pub struct FakeState {
    pub documents: Arc<Mutex<Vec<Value>>>,
    pub uploads: Arc<Mutex<Vec<RecordedUpload>>>,
    pub last_request: Arc<Mutex<Option<Value>>>,
    /// Serve garbage instead of JSON from the list endpoint.
    pub malformed: Arc<AtomicBool>,
}

pub struct FakeDocumentService {
    pub base_url: String,
    pub state: FakeState,
}

/// A listed document. The service leaves counts it has not computed yet as
/// `null` and writes naive timestamps.
pub fn document_json(id: &str, filename: &str, page_count: Option<u32>) -> Value {
    json!({
        "doc_id": id,
        "filename": filename,
        "uploaded_at": "2024-05-01T10:00:00.123456",
        "page_count": page_count,
        "file_size": page_count.map(|_| 2048)
    })
}

impl FakeDocumentService {
    pub async fn spawn() -> Self {
        let state = FakeState::default();

        let app = Router::new()
            .route("/api/v1/documents", get(list_documents))
            .route("/api/v1/documents/:id", delete(delete_document))
            .route("/api/v1/documents/upload", post(upload))
            .route("/api/v1/search", post(search))
            .route("/api/v1/ai/summarize", post(summarize))
            .route("/api/v1/ai/qa", post(ask))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake document service");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        FakeDocumentService {
            base_url: format!("http://127.0.0.1:{}/api/v1", port),
            state,
        }
    }

    pub fn seed(&self, documents: Vec<Value>) {
        *self.state.documents.lock().unwrap() = documents;
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.state.uploads.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<Value> {
        self.state.last_request.lock().unwrap().clone()
    }
}

async fn list_documents(State(state): State<FakeState>) -> Response {
    if state.malformed.load(Ordering::SeqCst) {
        return (StatusCode::OK, "<html>not json</html>").into_response();
    }
    let documents = state.documents.lock().unwrap().clone();
    let total = documents.len();
    Json(json!({ "documents": documents, "total": total })).into_response()
}

async fn delete_document(State(state): State<FakeState>, Path(id): Path<String>) -> Response {
    let mut documents = state.documents.lock().unwrap();
    let before = documents.len();
    documents.retain(|d| d["doc_id"] != id.as_str());
    if documents.len() == before {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": format!("Document {} not found", id) })),
        )
            .into_response()
    } else {
        Json(json!({
            "status": "success",
            "message": format!("Document {} deleted successfully", id)
        }))
        .into_response()
    }
}

async fn upload(State(state): State<FakeState>, mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("unnamed").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let size = field.bytes().await.map(|b| b.len()).unwrap_or(0);

        let id = {
            let mut uploads = state.uploads.lock().unwrap();
            uploads.push(RecordedUpload {
                filename: filename.clone(),
                content_type,
                size,
            });
            format!("doc-{}", uploads.len())
        };
        state
            .documents
            .lock()
            .unwrap()
            .insert(0, document_json(&id, &filename, Some(9)));

        return (
            StatusCode::CREATED,
            Json(json!({
                "doc_id": id,
                "filename": filename,
                "status": "success",
                "uploaded_at": "2024-05-01T10:00:00.123456"
            })),
        )
            .into_response();
    }
    (StatusCode::BAD_REQUEST, "missing file field").into_response()
}

async fn search(State(state): State<FakeState>, Json(body): Json<Value>) -> Json<Value> {
    *state.last_request.lock().unwrap() = Some(body.clone());
    let score = if body["query"] == "broken" { 1.7 } else { 0.8 };
    Json(json!({
        "query": body["query"],
        "total_found": 3,
        "results": [
            { "doc_id": "doc-1", "filename": "a.pdf", "score": score, "snippet": "first" },
            { "doc_id": "doc-2", "filename": "b.pdf", "score": 0.4, "snippet": "second" },
            { "doc_id": "doc-3", "filename": "c.pdf", "score": 0.1, "snippet": "third" }
        ]
    }))
}

async fn summarize(State(state): State<FakeState>, Json(body): Json<Value>) -> Json<Value> {
    *state.last_request.lock().unwrap() = Some(body.clone());
    let summary_type = body["summary_type"].as_str().unwrap_or("?");
    let doc_id = body["doc_id"].as_str().unwrap_or("?");
    Json(json!({
        "doc_id": doc_id,
        "summary_type": summary_type,
        "summary": format!("{} summary of {}", summary_type, doc_id),
        "model_used": "fake-llm"
    }))
}

async fn ask(State(state): State<FakeState>, Json(body): Json<Value>) -> Json<Value> {
    *state.last_request.lock().unwrap() = Some(body.clone());
    let question = body["question"].as_str().unwrap_or("");
    Json(json!({
        "question": question,
        "answer": format!("You asked: {}", question),
        "sources": [
            { "doc_id": "doc-1", "filename": "a.pdf", "relevance_score": 0.9, "excerpt": "..." }
        ],
        "model_used": "fake-llm"
    }))
}
