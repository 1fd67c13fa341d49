//! Metric recording for the catalog service.
//!
//! Counters follow the standard Prometheus naming conventions and are
//! rendered by the exporter handle mounted at `/metrics`.

use std::fmt;

/// Enum representing all metric names used in the system
/// This eliminates magic strings and provides compile-time safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Upstream catalog fetches
    CatalogFetchSuccess,
    CatalogFetchError,
    CatalogRecordsFetched,
    CatalogRecordsDropped,

    // API endpoints
    ApiRequests,
    ApiErrors,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::CatalogFetchSuccess => "n1_catalog_fetch_success_total",
            MetricName::CatalogFetchError => "n1_catalog_fetch_error_total",
            MetricName::CatalogRecordsFetched => "n1_catalog_records_fetched_total",
            MetricName::CatalogRecordsDropped => "n1_catalog_records_dropped_total",
            MetricName::ApiRequests => "n1_api_requests_total",
            MetricName::ApiErrors => "n1_api_errors_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub mod catalog {
    use super::MetricName;

    pub fn fetch_success(types: &str, record_count: usize) {
        ::metrics::counter!(MetricName::CatalogFetchSuccess.as_str(), "types" => types.to_string())
            .increment(1);
        ::metrics::counter!(MetricName::CatalogRecordsFetched.as_str(), "types" => types.to_string())
            .increment(record_count as u64);
    }

    pub fn fetch_error(types: &str) {
        ::metrics::counter!(MetricName::CatalogFetchError.as_str(), "types" => types.to_string())
            .increment(1);
    }

    /// Records a malformed/incomplete record being dropped so upstream
    /// data-quality regressions are visible without grepping logs.
    pub fn record_dropped(stage: &str) {
        ::metrics::counter!(MetricName::CatalogRecordsDropped.as_str(), "stage" => stage.to_string())
            .increment(1);
    }
}

pub mod api {
    use super::MetricName;

    pub fn request(endpoint: &'static str) {
        ::metrics::counter!(MetricName::ApiRequests.as_str(), "endpoint" => endpoint).increment(1);
    }

    pub fn error(endpoint: &'static str) {
        ::metrics::counter!(MetricName::ApiErrors.as_str(), "endpoint" => endpoint).increment(1);
    }
}
