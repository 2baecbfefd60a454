//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the demo application router
//! - Wrap it with the SpeedTracer layer and an error handler
//! - Bind to the listener and serve until shutdown

use axum::{
    error_handling::HandleErrorLayer,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{BoxError, ServiceBuilder};
use tower_http::trace::TraceLayer;

use crate::config::{AppConfig, ConfigError};
use crate::http::tracer::SpeedTracer;

/// HTTP server hosting a traced application.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a server for the demo application, with the store selected by
    /// `config.tracer`.
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        let tracer = SpeedTracer::new(config.tracer.clone())?;
        Ok(Self::with_tracer(config, tracer))
    }

    /// Create a server for the demo application with a prepared tracer.
    pub fn with_tracer(config: AppConfig, tracer: SpeedTracer) -> Self {
        let router = Self::build_router(app_router(), tracer);
        Self { router, config }
    }

    /// Wrap `app` so every request passes through `tracer`.
    ///
    /// The traced stack is installed as the fallback of an outer router, so
    /// it sees every path, including `/speedtracer`, which `app` never routes.
    pub fn build_router(app: Router, tracer: SpeedTracer) -> Router {
        let traced = ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_tracer_error))
            .layer(tracer.into_layer())
            .service(app);

        Router::new()
            .fallback_service(traced)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until Ctrl+C or a message on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            storage = %self.config.tracer.storage,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// The application being traced.
fn app_router() -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/health", get(health))
}

async fn hello() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "Hello World")
}

async fn health() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// Store failures become a 500; the trace store is never bypassed.
async fn handle_tracer_error(err: BoxError) -> impl IntoResponse {
    tracing::error!(error = %err, "Request failed in SpeedTracer layer");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

/// Wait for Ctrl+C or a shutdown broadcast.
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = shutdown.recv() => {}
    }
    tracing::info!("Shutdown signal received");
}
