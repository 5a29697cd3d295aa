pub mod handlers;

use anyhow::{bail, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::routing::any;
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use chunkpost_core::config::ServerConfig;
use chunkpost_services::ChunkFs;

pub use handlers::ApiState;

/// Build the endpoint router. The upload endpoint answers at `/` and at the
/// configured route.
pub fn router<F: ChunkFs>(state: ApiState<F>, config: &ServerConfig) -> Result<Router> {
    if !config.route.starts_with('/') {
        bail!("route must start with '/': {:?}", config.route);
    }

    let mut routes = Router::new().route("/", any(handlers::handle_endpoint::<F>));
    if config.route != "/" {
        routes = routes.route(&config.route, any(handlers::handle_endpoint::<F>));
    }

    Ok(routes
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-robots-tag"),
            HeaderValue::from_static("none"),
        )))
}

pub async fn serve<F: ChunkFs>(state: ApiState<F>, config: &ServerConfig) -> Result<()> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.bind_addr, config.port)).await?;
    serve_on(listener, state, config).await
}

/// Serve on an already bound listener.
pub async fn serve_on<F: ChunkFs>(
    listener: tokio::net::TcpListener,
    state: ApiState<F>,
    config: &ServerConfig,
) -> Result<()> {
    let app = router(state, config)?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, route = %config.route, "upload endpoint listening");
    axum::serve(listener, app).await?;
    Ok(())
}
