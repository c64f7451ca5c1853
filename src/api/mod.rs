// ============================================================
// Layer 1 — HTTP API
// ============================================================
// The axum surface of the service:
//
//   POST /predict      → price estimate with ±5% band
//   GET  /health       → liveness + whether the model loaded
//   GET  /model-info   → R², feature order
//   GET  /options      → state → cities, property types
//   GET  /             → app banner
//
// The four API routes answer both at the root and under
// /api/v1. Every route is wrapped, innermost first, in:
//
//   1. CatchPanicLayer → a panicking handler becomes a 500
//   2. log_requests    → a "Req"/"Res" pair per request
//   3. CorsLayer       → preflight + headers for the frontend
//                        origins in ServiceConfig::cors_origins
//
// Reference: axum documentation (Router, middleware::from_fn)
//            tower-http documentation (cors, catch_panic)
//            tokio documentation (signal::ctrl_c)

/// Route handlers
pub mod handlers;

/// JSON error envelope
pub mod error;

use anyhow::{Context, Result};
use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::time::Instant;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
};

use handlers::SharedService;

/// Build the full router around a loaded (or degraded) service.
pub fn router(service: SharedService) -> Router {
    let api = Router::new()
        .route("/predict",    post(handlers::predict))
        .route("/health",     get(handlers::health))
        .route("/model-info", get(handlers::model_info))
        .route("/options",    get(handlers::options));

    let routes = Router::new()
        .route("/", get(handlers::root))
        .merge(api.clone())
        .nest("/api/v1", api);

    let cors = cors_layer(&service.config().cors_origins);
    with_middleware(routes, cors).with_state(service)
}

fn with_middleware<S>(routes: Router<S>, cors: CorsLayer) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    routes
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(middleware::from_fn(log_requests))
        .layer(cors)
}

/// CORS for the listed origins; methods and headers mirror the
/// preflight request. Unparseable origins and `*` are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) if o != "*" => Some(v),
            _ => {
                tracing::warn!("Ignoring CORS origin '{}'", o);
                None
            }
        })
        .collect();
    tracing::info!("CORS allows {} origin(s)", allowed.len());

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Logs method + path on the way in, status + elapsed on the way out.
async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    tracing::info!("Req: {} {}", req.method(), req.uri().path());

    let res = next.run(req).await;
    tracing::info!("Res: {} ({:.3}s)", res.status().as_u16(), start.elapsed().as_secs_f64());
    res
}

/// Bind and serve until Ctrl+C.
pub async fn serve(service: SharedService) -> Result<()> {
    let addr = format!("{}:{}", service.config().host, service.config().port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind to '{addr}'"))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Service shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
