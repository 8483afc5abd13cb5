//! Metrics Module
//!
//! Prometheus collectors for the HTTP layer. Each [`CacheMetrics`] owns its
//! own registry and is handed to the router through `AppState`.

use std::fmt;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Prometheus collectors describing cache traffic.
#[derive(Clone)]
pub struct CacheMetrics {
    registry: Registry,
    /// `cache_operations_total{operation, status}`
    pub operations: IntCounterVec,
    /// `cache_items_current`
    pub size: IntGauge,
    /// `cache_hits_total{result}` with result = hit | miss
    pub hits: IntCounterVec,
    /// `http_request_duration_seconds{method, path, status}`
    pub request_duration: HistogramVec,
}

impl CacheMetrics {
    /// Creates the collectors and registers them in a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let operations = IntCounterVec::new(
            Opts::new("cache_operations_total", "The total number of cache operations"),
            &["operation", "status"],
        )?;
        let size = IntGauge::new("cache_items_current", "The current number of items in cache")?;
        let hits = IntCounterVec::new(
            Opts::new("cache_hits_total", "The total number of cache hits/misses"),
            &["result"],
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "Duration of HTTP requests"),
            &["method", "path", "status"],
        )?;

        registry.register(Box::new(operations.clone()))?;
        registry.register(Box::new(size.clone()))?;
        registry.register(Box::new(hits.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            operations,
            size,
            hits,
            request_duration,
        })
    }

    pub fn record_operation(&self, operation: &str, status: &str) {
        self.operations.with_label_values(&[operation, status]).inc();
    }

    pub fn record_lookup(&self, hit: bool) {
        let result = if hit { "hit" } else { "miss" };
        self.hits.with_label_values(&[result]).inc();
    }

    pub fn set_size(&self, entries: usize) {
        self.size.set(i64::try_from(entries).unwrap_or(i64::MAX));
    }

    pub fn observe_request(&self, method: &str, path: &str, status: u16, seconds: f64) {
        let status = status.to_string();
        self.request_duration
            .with_label_values(&[method, path, status.as_str()])
            .observe(seconds);
    }

    // == Encode ==
    /// Renders every registered metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}

impl fmt::Debug for CacheMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheMetrics")
            .field("size", &self.size.get())
            .finish_non_exhaustive()
    }
}
