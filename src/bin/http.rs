#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use farm_gantt::{PlannerConfig, http_api, logging};

    logging::init_tracing("info");

    let addr: SocketAddr = std::env::var("FARM_GANTT_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;
    let config = PlannerConfig::from_env()?;

    println!("farm-gantt HTTP API listening on http://{addr}");
    http_api::serve(addr, http_api::AppState::with_builtin(config)).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
