//! services/api/src/bin/openapi.rs
//!
//! Writes the Safety Portal OpenAPI document to disk so the landing page can
//! generate its client. Usage: `openapi [OUTPUT]`, defaulting to `openapi.json`.

use api_lib::web::ApiDoc;
use std::path::PathBuf;
use tracing::info;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let output = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let doc = ApiDoc::openapi();
    let route_count = doc.paths.paths.len();
    std::fs::write(&output, doc.to_pretty_json()?)?;

    info!(
        routes = route_count,
        version = %doc.info.version,
        "OpenAPI document written to {}",
        output.display()
    );
    Ok(())
}
