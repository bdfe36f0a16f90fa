//! Per-request audit records
//!
//! One record is written under the `audit` target for every response:
//! `INFO` when the status is below 400, `ERROR` otherwise.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use tracing::{error, info};

/// Request facts recorded in the audit log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub path: String,
    pub method: String,
    pub ip: String,
    pub content_length: u64,
}

impl RequestInfo {
    pub fn from_request(req: &Request<Body>) -> Self {
        let ip = if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
            addr.ip().to_string()
        } else if let Some(forwarded) = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
        {
            forwarded.trim().to_string()
        } else {
            "unknown".to_string()
        };

        let content_length = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        Self {
            path: req.uri().path().to_string(),
            method: req.method().to_string(),
            ip,
            content_length,
        }
    }

    /// Write the audit record for a finished request
    pub fn record(&self, code: u16) {
        let timestamp = Utc::now().to_rfc3339();
        if code < 400 {
            info!(
                target: "audit",
                %timestamp,
                path = %self.path,
                method = %self.method,
                ip = %self.ip,
                content_length = self.content_length,
                code,
                "Request served"
            );
        } else {
            error!(
                target: "audit",
                %timestamp,
                path = %self.path,
                method = %self.method,
                ip = %self.ip,
                content_length = self.content_length,
                code,
                "Request failed"
            );
        }
    }
}

/// Middleware writing one audit record per response
pub async fn audit(req: Request<Body>, next: Next) -> Response {
    let info = RequestInfo::from_request(&req);
    let response = next.run(req).await;
    info.record(response.status().as_u16());
    response
}
