use std::time::Duration;

/// Sink for the two observations the REST pipeline emits.
///
/// `path` is always stripped of its query string. Implementations are
/// shared between concurrent calls and must be safe to update from several
/// tasks at once.
pub trait MetricsRecorder: Send + Sync {
    fn observe_request_latency(&self, path: &str, latency: Duration);

    fn increment_response_code(&self, path: &str, status: u16);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsRecorder for NoopMetrics {
    fn observe_request_latency(&self, _path: &str, _latency: Duration) {}

    fn increment_response_code(&self, _path: &str, _status: u16) {}
}

#[cfg(feature = "prometheus")]
pub use self::prometheus_metrics::PrometheusMetrics;

#[cfg(feature = "prometheus")]
mod prometheus_metrics {
    use super::MetricsRecorder;
    use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};
    use std::time::Duration;

    pub const REQUEST_LATENCY: &str = "binance_http_request_latency";
    pub const RESPONSE_CODES: &str = "binance_http_response_codes_count";

    /// [`MetricsRecorder`] writing into a caller-owned Prometheus registry.
    #[derive(Debug, Clone)]
    pub struct PrometheusMetrics {
        latency: HistogramVec,
        response_codes: CounterVec,
    }

    impl PrometheusMetrics {
        pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
            let latency = HistogramVec::new(
                HistogramOpts::new(REQUEST_LATENCY, "Latency of HTTP requests in seconds"),
                &["path"],
            )?;
            let response_codes = CounterVec::new(
                Opts::new(RESPONSE_CODES, "Number of HTTP responses by status code"),
                &["path", "code"],
            )?;

            registry.register(Box::new(latency.clone()))?;
            registry.register(Box::new(response_codes.clone()))?;

            Ok(Self {
                latency,
                response_codes,
            })
        }
    }

    impl MetricsRecorder for PrometheusMetrics {
        fn observe_request_latency(&self, path: &str, latency: Duration) {
            self.latency
                .with_label_values(&[path])
                .observe(latency.as_secs_f64());
        }

        fn increment_response_code(&self, path: &str, status: u16) {
            let code = status.to_string();
            self.response_codes
                .with_label_values(&[path, code.as_str()])
                .inc();
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_records_into_registry() {
            let registry = Registry::new();
            let metrics = PrometheusMetrics::new(&registry).unwrap();

            metrics.observe_request_latency("/api/v3/depth", Duration::from_millis(20));
            metrics.increment_response_code("/api/v3/depth", 200);
            metrics.increment_response_code("/api/v3/depth", 200);

            let count = metrics
                .response_codes
                .with_label_values(&["/api/v3/depth", "200"])
                .get();
            assert!((count - 2.0).abs() < f64::EPSILON);
            assert_eq!(
                metrics
                    .latency
                    .with_label_values(&["/api/v3/depth"])
                    .get_sample_count(),
                1
            );
            assert_eq!(registry.gather().len(), 2);

            assert!(PrometheusMetrics::new(&registry).is_err());
        }
    }
}
