//! HTTP surface.
//!
//! - `GET /subscribers` - active subscribers as JSON
//! - `POST /subscribe` - subscribe or re-subscribe an email
//! - `POST /unsubscribe` - unsubscribe an email
//! - `GET /version` - application version text

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::entity::Subscriber;
use crate::error::ErrorCode;
use crate::mailer::Mailer;
use crate::repository::SubscriberRepository;
use crate::service::SubscriberService;

mod error;

pub use error::{ApiError, language, panic_response};

/// Shared handler state.
pub struct AppState<R, M> {
    pub service: SubscriberService<R, M>,
    pub app_version: String,
}

impl<R, M> AppState<R, M> {
    pub fn new(service: SubscriberService<R, M>, app_version: impl Into<String>) -> Self {
        Self {
            service,
            app_version: app_version.into(),
        }
    }
}

/// Success body of the mutating endpoints.
#[derive(Debug, Serialize)]
pub struct ResponseSuccess {
    pub body: &'static str,
}

/// Build the application router.
pub fn router<R, M>(state: Arc<AppState<R, M>>) -> Router
where
    R: SubscriberRepository + 'static,
    M: Mailer + 'static,
{
    Router::new()
        .route("/subscribers", get(list_subscribers::<R, M>))
        .route("/subscribe", post(subscribe::<R, M>))
        .route("/unsubscribe", post(unsubscribe::<R, M>))
        .route("/version", get(version::<R, M>))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /subscribers
async fn list_subscribers<R, M>(
    State(state): State<Arc<AppState<R, M>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Subscriber>>, ApiError>
where
    R: SubscriberRepository,
    M: Mailer,
{
    let lang = language(&headers);
    state
        .service
        .get_all_subscribers()
        .await
        .map(Json)
        .map_err(|code| ApiError::new(code, lang))
}

/// POST /subscribe
async fn subscribe<R, M>(
    State(state): State<Arc<AppState<R, M>>>,
    headers: HeaderMap,
    body: Result<Json<Subscriber>, JsonRejection>,
) -> Result<Json<ResponseSuccess>, ApiError>
where
    R: SubscriberRepository,
    M: Mailer,
{
    let lang = language(&headers);
    let Json(request) = body.map_err(|e| {
        tracing::warn!(error = %e, "subscribe body rejected");
        ApiError::new(ErrorCode::BadRequest, lang)
    })?;

    state
        .service
        .subscribe(request)
        .await
        .map_err(|code| ApiError::new(code, lang))?;

    Ok(Json(ResponseSuccess {
        body: "subscribe success",
    }))
}

/// POST /unsubscribe
async fn unsubscribe<R, M>(
    State(state): State<Arc<AppState<R, M>>>,
    headers: HeaderMap,
    body: Result<Json<Subscriber>, JsonRejection>,
) -> Result<Json<ResponseSuccess>, ApiError>
where
    R: SubscriberRepository,
    M: Mailer,
{
    let lang = language(&headers);
    let Json(request) = body.map_err(|e| {
        tracing::warn!(error = %e, "unsubscribe body rejected");
        ApiError::new(ErrorCode::BadRequest, lang)
    })?;

    state
        .service
        .unsubscribe(request)
        .await
        .map_err(|code| ApiError::new(code, lang))?;

    Ok(Json(ResponseSuccess {
        body: "unsubscribe success",
    }))
}

/// GET /version
async fn version<R, M>(State(state): State<Arc<AppState<R, M>>>) -> String {
    format!("{}\n", state.app_version)
}

/// Serve `app` on `addr` until Ctrl+C or SIGTERM.
pub async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}
