use serde::Serialize;

/// Plain-text body for `GET /`.
pub const HOME_MESSAGE: &str = "CNN Feature Visualizer Backend - Server is running!";

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: &'static str,
}

/// `GET /health`
pub fn status() -> HealthStatus {
    HealthStatus { status: "healthy", message: "Backend is working!" }
}
