//! Prometheus metrics registry and instruments

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_requests_in_flight: IntGauge,
    pub http_request_duration_seconds: Histogram,
    pub indicator_computations_total: IntCounter,
    pub indicator_computation_duration_seconds: Histogram,
    pub guide_lookups_total: IntCounter,
    pub guide_lookup_misses_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounter::with_opts(Opts::new(
            "http_requests_total",
            "Total number of HTTP requests received",
        ))?;
        let http_requests_in_flight = IntGauge::with_opts(Opts::new(
            "http_requests_in_flight",
            "Number of HTTP requests currently being served",
        ))?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let indicator_computations_total = IntCounter::with_opts(Opts::new(
            "indicator_computations_total",
            "Total number of weekly indicator computations",
        ))?;
        let indicator_computation_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "indicator_computation_duration_seconds",
            "Weekly indicator computation latency in seconds",
        ))?;
        let guide_lookups_total = IntCounter::with_opts(Opts::new(
            "guide_lookups_total",
            "Total number of genetic guide lookups",
        ))?;
        let guide_lookup_misses_total = IntCounter::with_opts(Opts::new(
            "guide_lookup_misses_total",
            "Genetic guide lookups that found no matching row",
        ))?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(indicator_computations_total.clone()))?;
        registry.register(Box::new(indicator_computation_duration_seconds.clone()))?;
        registry.register(Box::new(guide_lookups_total.clone()))?;
        registry.register(Box::new(guide_lookup_misses_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_requests_in_flight,
            http_request_duration_seconds,
            indicator_computations_total,
            indicator_computation_duration_seconds,
            guide_lookups_total,
            guide_lookup_misses_total,
        })
    }

    /// Export all registered metrics in the Prometheus text format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}
