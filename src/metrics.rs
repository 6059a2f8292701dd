//! Prometheus metrics for the Discord exporter bot.
//!
//! Exposes:
//! - `discord_exporter_command_duration_seconds` (histogram)
//! - `discord_exporter_command_total` (counter with status)
//! - `discord_exporter_command_inflight` (gauge)
//! - `discord_exporter_messages_scanned_total` / `_messages_exported_total` (counters)
//! - `discord_exporter_export_outcome_total` (counter by outcome)
//! - process metrics via `process` collector

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use once_cell::sync::Lazy;
use prometheus::process_collector::ProcessCollector;
use prometheus::{
    default_registry, register_histogram_vec, register_int_counter, register_int_counter_vec,
    register_int_gauge_vec, Encoder, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec,
    TextEncoder,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::commands::export::ExportOutcome;

static PROCESS_COLLECTOR: Lazy<()> = Lazy::new(|| {
    if let Err(err) = default_registry().register(Box::new(ProcessCollector::for_self())) {
        warn!("Failed to register process collector: {}", err);
    }
});

static COMMAND_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    // Exponential buckets from 100ms up to ~1.8 hours; full channel walks are long.
    let buckets =
        prometheus::exponential_buckets(0.1, 2.0, 17).expect("failed to create histogram buckets");
    register_histogram_vec!(
        "discord_exporter_command_duration_seconds",
        "Bot command duration in seconds",
        &["command"],
        buckets
    )
    .expect("failed to register command duration histogram")
});

static COMMAND_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "discord_exporter_command_total",
        "Total command executions by status",
        &["command", "status"]
    )
    .expect("failed to register command counter")
});

static COMMAND_INFLIGHT: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "discord_exporter_command_inflight",
        "Number of in-flight commands",
        &["command"]
    )
    .expect("failed to register inflight gauge")
});

static MESSAGES_SCANNED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "discord_exporter_messages_scanned_total",
        "History messages read from Discord"
    )
    .expect("failed to register scanned counter")
});

static MESSAGES_EXPORTED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "discord_exporter_messages_exported_total",
        "Message records written to export files"
    )
    .expect("failed to register exported counter")
});

static EXPORT_OUTCOME: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "discord_exporter_export_outcome_total",
        "Finished exports by outcome",
        &["outcome"]
    )
    .expect("failed to register outcome counter")
});

/// Ensure collectors are registered.
fn init_collectors() {
    Lazy::force(&PROCESS_COLLECTOR);
    Lazy::force(&COMMAND_DURATION);
    Lazy::force(&COMMAND_TOTAL);
    Lazy::force(&COMMAND_INFLIGHT);
    Lazy::force(&MESSAGES_SCANNED);
    Lazy::force(&MESSAGES_EXPORTED);
    Lazy::force(&EXPORT_OUTCOME);
}

/// Increment inflight gauge for a command.
pub fn record_command_start(command: &'static str) {
    init_collectors();
    COMMAND_INFLIGHT.with_label_values(&[command]).inc();
}

/// Record command completion with duration and status.
pub fn record_command_result(command: &'static str, duration: Duration, success: bool) {
    init_collectors();
    COMMAND_INFLIGHT.with_label_values(&[command]).dec();
    COMMAND_DURATION
        .with_label_values(&[command])
        .observe(duration.as_secs_f64());
    COMMAND_TOTAL
        .with_label_values(&[command, if success { "ok" } else { "error" }])
        .inc();
}

fn outcome_label(outcome: &ExportOutcome) -> &'static str {
    match outcome {
        ExportOutcome::ChannelNotFound => "channel_not_found",
        ExportOutcome::Empty { .. } => "empty",
        ExportOutcome::WriteFailed { .. } => "write_failed",
        ExportOutcome::Written(_) => "written",
    }
}

/// Record the result of a finished export.
pub fn record_export(outcome: &ExportOutcome) {
    init_collectors();
    EXPORT_OUTCOME
        .with_label_values(&[outcome_label(outcome)])
        .inc();
    match outcome {
        ExportOutcome::Empty { scanned } => MESSAGES_SCANNED.inc_by(*scanned as u64),
        ExportOutcome::Written(report) => {
            MESSAGES_SCANNED.inc_by(report.scanned as u64);
            MESSAGES_EXPORTED.inc_by(report.exported as u64);
        }
        ExportOutcome::ChannelNotFound | ExportOutcome::WriteFailed { .. } => {}
    }
}

fn plain_response(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
}

async fn metrics_response() -> Result<Response<Full<Bytes>>, Infallible> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", err);
        return Ok(plain_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            Bytes::from_static(b"encode error"),
        ));
    }

    let mut response = plain_response(StatusCode::OK, Bytes::from(buffer));
    if let Ok(value) = hyper::header::HeaderValue::from_str(encoder.format_type()) {
        response
            .headers_mut()
            .insert(hyper::header::CONTENT_TYPE, value);
    }
    Ok(response)
}

async fn handle_request(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    match req.uri().path() {
        "/metrics" => metrics_response().await,
        _ => Ok(plain_response(StatusCode::NOT_FOUND, Bytes::new())),
    }
}

async fn serve(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Prometheus metrics endpoint started");

    loop {
        let (stream, peer) = listener.accept().await?;
        let service = service_fn(handle_request);
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(?peer, "Metrics connection error: {}", err);
            }
        });
    }
}

/// Spawn the metrics HTTP endpoint on the given address.
pub fn spawn_metrics_server(addr: SocketAddr) {
    init_collectors();
    tokio::spawn(async move {
        if let Err(err) = serve(addr).await {
            error!(%addr, "Metrics server failed: {}", err);
        }
    });
}
