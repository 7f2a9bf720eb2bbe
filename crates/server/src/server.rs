//! HTTP surface of the notes backend

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use notes_common::{Link, Links, NewNote, Note, NoteId};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::store::NoteStore;

struct ServerState {
    store: NoteStore,
}

/// Notes backend
#[derive(Clone)]
pub struct NotesServer {
    state: Arc<ServerState>,
}

impl NotesServer {
    pub fn new(store: NoteStore) -> Self {
        Self {
            state: Arc::new(ServerState { store }),
        }
    }

    /// Create router
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/health", get(health_handler))
            .route("/notes", get(list_notes_handler).post(create_note_handler))
            .route("/notes/", get(filter_notes_handler))
            .route("/notes/search/name", get(search_notes_handler))
            .route(
                "/notes/:id",
                get(get_note_handler)
                    .put(update_note_handler)
                    .delete(delete_note_handler),
            )
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }
}

/// Open the store described by `cfg`, seeding it when asked to
pub fn open_store(cfg: &ServerConfig) -> ServerResult<NoteStore> {
    let store = match &cfg.db_path {
        Some(path) => NoteStore::open(path)?,
        None => NoteStore::open_memory()?,
    };
    if cfg.seed {
        store.seed_if_empty()?;
    }
    Ok(store)
}

/// Serve until ctrl-c
pub async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
    let store = open_store(&cfg)?;
    let listener = TcpListener::bind(&cfg.listen).await?;
    info!("Notes server listening on http://{}/notes", listener.local_addr()?);

    axum::serve(listener, NotesServer::new(store).router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Notes server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Server running on a background task, used by tests and the e2e harness
pub struct LocalServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl LocalServer {
    /// Bind an ephemeral localhost port and serve `store` from it
    pub async fn start(store: NoteStore) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let router = NotesServer::new(store).router();

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                warn!("local notes server exited: {}", e);
            }
        });

        Ok(Self { addr, task })
    }

    /// Start on a fresh in-memory store holding the seed notes
    pub async fn start_seeded() -> anyhow::Result<Self> {
        Self::start(NoteStore::seeded_memory()?).await
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// URL of the notes collection
    pub fn notes_url(&self) -> String {
        format!("http://{}/notes", self.addr)
    }
}

impl Drop for LocalServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct NoteResource {
    #[serde(flatten)]
    note: Note,
    #[serde(rename = "_links")]
    links: Links,
}

#[derive(Serialize)]
struct EmbeddedResources {
    notes: Vec<NoteResource>,
}

#[derive(Serialize)]
struct CollectionBody {
    #[serde(rename = "_embedded")]
    embedded: EmbeddedResources,
    #[serde(rename = "_links")]
    links: Links,
}

#[derive(Debug, Deserialize)]
struct NoteFilter {
    id: Option<NoteId>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    contains: String,
}

/// Absolute URL prefix taken from the Host header
fn origin(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{}", host)
}

fn links(entries: &[(&str, String)]) -> Links {
    entries
        .iter()
        .map(|(rel, href)| (rel.to_string(), Link::new(href.clone())))
        .collect()
}

fn resource(origin: &str, note: Note) -> NoteResource {
    let href = format!("{}/notes/{}", origin, note.id);
    NoteResource {
        links: links(&[("self", href.clone()), ("note", href)]),
        note,
    }
}

fn collection(origin: &str, notes: Vec<Note>, self_href: String) -> CollectionBody {
    CollectionBody {
        embedded: EmbeddedResources {
            notes: notes.into_iter().map(|n| resource(origin, n)).collect(),
        },
        links: links(&[
            ("self", self_href),
            ("profile", format!("{}/profile/notes", origin)),
            ("search", format!("{}/notes/search", origin)),
        ]),
    }
}

fn validated_name(name: &str) -> ServerResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServerError::InvalidRequest("name must not be blank".to_string()));
    }
    Ok(name)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": notes_common::VERSION,
    }))
}

async fn list_notes_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> ServerResult<Json<CollectionBody>> {
    let origin = origin(&headers);
    let notes = state.store.list()?;
    let self_href = format!("{}/notes", origin);
    Ok(Json(collection(&origin, notes, self_href)))
}

async fn filter_notes_handler(
    State(state): State<Arc<ServerState>>,
    Query(filter): Query<NoteFilter>,
) -> ServerResult<Json<Vec<Note>>> {
    let notes: Vec<Note> = match filter.id {
        Some(id) => state.store.get(id)?.into_iter().collect(),
        None => state.store.list()?,
    };
    Ok(Json(notes))
}

async fn search_notes_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
    uri: Uri,
) -> ServerResult<Json<CollectionBody>> {
    let origin = origin(&headers);
    let notes = state.store.find_by_name(&params.contains)?;
    // the request's own path and query, still percent-encoded
    let self_href = format!("{}{}", origin, uri);
    Ok(Json(collection(&origin, notes, self_href)))
}

async fn get_note_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<NoteId>,
    headers: HeaderMap,
) -> ServerResult<Json<NoteResource>> {
    let note = state.store.get(id)?.ok_or(ServerError::NotFound(id))?;
    Ok(Json(resource(&origin(&headers), note)))
}

async fn create_note_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    Json(body): Json<NewNote>,
) -> ServerResult<Response> {
    let note = state.store.insert(validated_name(&body.name)?)?;
    info!("Created note {}", note);

    let body = resource(&origin(&headers), note);
    let location = body.links["self"].href.clone();
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(body)).into_response())
}

async fn update_note_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<NoteId>,
    headers: HeaderMap,
    Json(body): Json<NewNote>,
) -> ServerResult<Response> {
    // the path decides which note is written, whatever id the body carries
    let note = Note::new(id, validated_name(&body.name)?);
    let created = state.store.upsert(&note)?;
    info!("Stored note {}", note);

    if created {
        let body = resource(&origin(&headers), note);
        Ok((StatusCode::CREATED, Json(body)).into_response())
    } else {
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

async fn delete_note_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<NoteId>,
) -> ServerResult<StatusCode> {
    if !state.store.delete(id)? {
        return Err(ServerError::NotFound(id));
    }
    info!("Deleted note {}", id);
    Ok(StatusCode::NO_CONTENT)
}
