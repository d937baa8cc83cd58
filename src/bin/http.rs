#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;
    use std::time::Duration;

    use gantt_tool::{ChartConfig, cache::DEFAULT_TTL, http_api, logging};

    logging::init()?;

    let addr: SocketAddr = std::env::var("GANTT_TOOL_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;
    let ttl = match std::env::var("GANTT_TOOL_CACHE_TTL_SECS") {
        Ok(secs) => Duration::from_secs(secs.trim().parse()?),
        Err(_) => DEFAULT_TTL,
    };

    tracing::info!(%addr, ttl_secs = ttl.as_secs(), "gantt-tool HTTP API listening");
    let state = http_api::AppState::new(ChartConfig::default(), ttl);
    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
