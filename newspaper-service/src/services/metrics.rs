//! Metrics collection for newspaper-service.
//!
//! HTTP request metrics come from the `metrics` recorder installed here;
//! store operation counters live in a separate Prometheus registry and are
//! appended to the same scrape output.

use anyhow::{anyhow, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static PROMETHEUS_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub static STORE_OPERATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Install the Prometheus recorder and register store counters.
///
/// Call once per process.
pub fn init_metrics() -> Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| anyhow!("metrics handle already initialized"))?;

    let registry = Registry::new();

    let operations_counter = IntCounterVec::new(
        Opts::new(
            "newspaper_store_operations_total",
            "Total MongoDB operations by operation and status",
        ),
        &["operation", "status"],
    )?;

    registry.register(Box::new(operations_counter.clone()))?;

    PROMETHEUS_REGISTRY
        .set(registry)
        .map_err(|_| anyhow!("prometheus registry already initialized"))?;
    STORE_OPERATIONS_TOTAL
        .set(operations_counter)
        .map_err(|_| anyhow!("newspaper_store_operations_total already initialized"))?;

    Ok(())
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string());

    if let Some(registry) = PROMETHEUS_REGISTRY.get() {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).ok();
        if let Ok(custom_metrics) = String::from_utf8(buffer) {
            output.push_str(&custom_metrics);
        }
    }

    output
}

/// Record one MongoDB operation. No-op until [`init_metrics`] has run.
pub fn record_store_operation(operation: &str, status: &str) {
    if let Some(counter) = STORE_OPERATIONS_TOTAL.get() {
        counter.with_label_values(&[operation, status]).inc();
    }
}
