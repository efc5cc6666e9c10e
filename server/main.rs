/// feature-viz server
///
/// HTTP backend for the CNN feature visualizer frontend. Accepts an image
/// upload and answers with its colour statistics and a 3D position.
/// Served by a synchronous tiny_http server.
///
/// Run with:
///   cargo run --bin server --release
/// Then point the frontend at http://127.0.0.1:5000
///
/// Endpoints:
///   GET  /              liveness text
///   GET  /health        JSON health check
///   POST /upload-image  multipart field `file` (png, jpg, jpeg, gif, bmp)
///
/// Settings come from FEATURE_VIZ_ADDR, FEATURE_VIZ_UPLOAD_DIR and
/// FEATURE_VIZ_LOG; see `config.rs`.

mod config;
mod handlers;
mod routes;
mod util;

use std::sync::Arc;
use tiny_http::Server;
use tracing::{error, info};

use config::ServerConfig;

fn main() {
    let config = ServerConfig::from_env();
    tracing_subscriber::fmt().with_max_level(config.log_level).init();

    if let Err(e) = std::fs::create_dir_all(&config.upload_dir) {
        error!(dir = %config.upload_dir.display(), error = %e, "cannot create upload directory");
        std::process::exit(1);
    }

    let server = match Server::http(config.addr.as_str()) {
        Ok(server) => server,
        Err(e) => {
            error!(addr = %config.addr, error = %e, "failed to bind HTTP server");
            std::process::exit(1);
        }
    };

    info!("CNN Feature Visualizer backend");
    info!(addr = %config.addr, "available at http://{}", config.addr);
    info!("health check: http://{}/health", config.addr);

    let config = Arc::new(config);

    // One thread per request; handlers share nothing mutable.
    for request in server.incoming_requests() {
        let config = Arc::clone(&config);
        std::thread::spawn(move || {
            routes::dispatch(request, config);
        });
    }
}
