//! HTTP server setup and the relay handler.
//!
//! # Responsibilities
//! - Create Axum Router with a catch-all relay handler
//! - Wire up middleware (request ID, tracing, optional timeout)
//! - Sequence normalization and forwarding per request
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    extract::State,
    http::{header::ORIGIN, HeaderName, Request},
    response::Response,
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{RelayConfig, RelaySettings};
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::http::response::{error_response, relay_response};
use crate::relay::normalize::Encoding;
use crate::relay::{
    Forwarder, InboundRequest, Normalizer, OutboundResult, PresetTable, RelayError,
    TargetDescriptor, ValidationError,
};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub normalizer: Normalizer,
    pub forwarder: Forwarder,
    pub settings: Arc<RelaySettings>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let presets = Arc::new(PresetTable::with_overrides(&config.presets));
        let normalizer = Normalizer::new(presets, config.relay.user_agent.clone());
        let forwarder = Forwarder::new(&config.timeouts)?;

        tracing::debug!(
            presets = ?normalizer.presets().names().collect::<Vec<_>>(),
            "Preset table built"
        );

        let state = AppState {
            normalizer,
            forwarder,
            settings: Arc::new(config.relay.clone()),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let request_id_header = HeaderName::from_static(X_REQUEST_ID);

        let router = Router::new()
            .route("/", any(relay_handler))
            .route("/{*path}", any(relay_handler))
            .with_state(state);

        let router = match config.timeouts.request_secs {
            Some(secs) => router.layer(TimeoutLayer::new(Duration::from_secs(secs))),
            None => router,
        };

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id_header.clone(), UuidRequestId))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "relay",
                        request_id = %request_id(request),
                        method = %request.method(),
                    )
                }))
                .layer(PropagateRequestIdLayer::new(request_id_header)),
        )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Relay handler: normalize, forward, render.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned);

    match relay(&state, origin.as_deref(), request).await {
        Ok((target, outbound)) => {
            tracing::info!(
                url = %target.url(),
                target_method = %target.method(),
                status = %outbound.status,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Relayed"
            );
            relay_response(target.origin(), outbound, state.settings.propagate_status)
        }
        Err(err) => {
            tracing::warn!(
                kind = err.kind(),
                error = %err,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Relay failed"
            );
            let cors_origin = state
                .settings
                .cors_on_error
                .then(|| origin.as_deref().unwrap_or("*"));
            error_response(&err, cors_origin)
        }
    }
}

async fn relay(
    state: &AppState,
    origin: Option<&str>,
    request: Request<Body>,
) -> Result<(TargetDescriptor, OutboundResult), RelayError> {
    let inbound = match Encoding::for_method(request.method().as_str())? {
        Encoding::Query => InboundRequest::GetEncoded {
            query: request.uri().query().unwrap_or_default().to_owned(),
        },
        Encoding::Json => {
            let payload = axum::body::to_bytes(request.into_body(), state.settings.max_payload_bytes)
                .await
                .map_err(|e| ValidationError::MalformedPayload(e.to_string()))?;
            InboundRequest::PostEncoded {
                payload: payload.to_vec(),
            }
        }
    };

    let target = state.normalizer.normalize(origin, &inbound)?;
    let outbound = state.forwarder.forward(&target).await?;
    Ok((target, outbound))
}
