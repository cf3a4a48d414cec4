//! 🌐 The read endpoint: one path, one verb, one JSON array.
//!
//! 🎬 *[a browser on localhost:3000 knocks. the bouncer checks the list.]*
//! *[it's on the list. the door opens. a JSON array walks out.]*
//! *[someone tries POST. the door stays shut. 405. no exceptions.]*
//!
//! 🧠 Knowledge graph:
//! - `GET /api/inventory` → the current store snapshot as `application/json`.
//! - Any other method on that path → 405 with `Allow: GET` (HEAD included; the
//!   handler checks the method itself instead of trusting the router's HEAD-as-GET).
//! - CORS is tower-http's job: exactly one allowed origin from config, echoed
//!   only to requests that carry it. Preflights are answered by the layer
//!   before the handler ever sees them.
//! - The handler copies the `Arc` out of the store, the read lock is released,
//!   and only then does serialization start. No I/O under the lock.
//! - Serialization failure → logged, 500, process carries on.

use std::future::Future;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::any,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, trace, warn};

use crate::app_config::ServerConfig;
use crate::store::InventoryStore;

pub const INVENTORY_PATH: &str = "/api/inventory";

/// 🏗️ Build the router: the inventory route, the CORS layer, the store as state.
pub fn router(store: InventoryStore, server_config: &ServerConfig) -> Result<Router> {
    let cors = cors_layer(server_config)?;
    info!("🚧 CORS enabled for: {}", server_config.cors_allowed_origin);

    Ok(Router::new()
        .route(INVENTORY_PATH, any(inventory_handler))
        .layer(cors)
        .with_state(store))
}

// -- 🚧 one origin, the usual verbs, two headers
fn cors_layer(server_config: &ServerConfig) -> Result<CorsLayer> {
    let origin = server_config.cors_origin_header()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

async fn inventory_handler(method: Method, State(store): State<InventoryStore>) -> Response {
    if method != Method::GET {
        trace!("🚫 {} {} refused", method, INVENTORY_PATH);
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET")],
            "Method not allowed",
        )
            .into_response();
    }

    // -- the lock lives and dies inside snapshot(); from here on it's just an Arc
    let snapshot = store.snapshot().await;
    render_json(snapshot.as_slice())
}

/// 📦 Serialize `body` as a JSON response, or log and answer 500.
fn render_json<T: Serialize + ?Sized>(body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            bytes,
        )
            .into_response(),
        Err(err) => {
            error!("💀 Error encoding JSON: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// 🔌 Bind the configured address.
pub async fn bind(server_config: &ServerConfig) -> Result<TcpListener> {
    let addr = server_config.socket_addr()?;
    TcpListener::bind(addr).await.with_context(|| {
        format!("💀 Server failed to start: could not bind {addr}. Is something else already listening there?")
    })
}

/// 🚀 Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    serve_with_shutdown(listener, app, ctrl_c()).await
}

/// 🚀 Serve until `shutdown` resolves, then drain in-flight requests and return.
pub async fn serve_with_shutdown<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener
        .local_addr()
        .context("💀 could not read the listener's local address")?;
    info!("📡 Server listening on {}{}", local_addr, INVENTORY_PATH);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("💀 server stopped with an error")?;

    info!("🏁 Server shut down cleanly");
    Ok(())
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        // -- no signal handler means no graceful shutdown; keep serving rather than exiting
        warn!("⚠️ could not install the Ctrl-C handler: {}", err);
        std::future::pending::<()>().await;
    }
    info!("🛑 Ctrl-C received, shutting down");
}
