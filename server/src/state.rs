use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use weatherguard_shared::governorates::sorted_governorates;
use weatherguard_shared::{Dataset, DatasetKey};

use crate::config::{CorsOrigins, client_dist_dir, cors_allowed_origins};

/// A JSON body serialized once at startup and shared by every response via Arc.
#[derive(Debug, Clone)]
pub struct PreSerialized {
    pub json: Arc<Bytes>,
    pub etag: String,
}

impl PreSerialized {
    fn encode<T: Serialize + ?Sized>(name: &str, value: &T, fallback: &'static [u8]) -> Self {
        let json = match serde_json::to_vec(value) {
            Ok(json) => Bytes::from(json),
            Err(e) => {
                warn!(error = %e, payload = name, "failed to serialize payload, serving fallback");
                Bytes::from_static(fallback)
            }
        };
        let etag = format!("\"{name}-{:08x}\"", crc32fast::hash(&json));
        Self {
            json: Arc::new(json),
            etag,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub datasets: PreSerialized,
    pub governorates: PreSerialized,
    pub dataset_count: usize,
    pub city_count: usize,
    pub client_dist_dir: PathBuf,
    pub cors_origins: CorsOrigins,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    health_requests_total: AtomicU64,
    datasets_requests_total: AtomicU64,
    datasets_not_modified_total: AtomicU64,
    governorates_requests_total: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ObservabilitySnapshot {
    pub health_requests_total: u64,
    pub datasets_requests_total: u64,
    pub datasets_not_modified_total: u64,
    pub governorates_requests_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            health_requests_total: self.health_requests_total.load(Ordering::Relaxed),
            datasets_requests_total: self.datasets_requests_total.load(Ordering::Relaxed),
            datasets_not_modified_total: self.datasets_not_modified_total.load(Ordering::Relaxed),
            governorates_requests_total: self.governorates_requests_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_health_request(&self) {
        self.health_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_datasets_request(&self) {
        self.datasets_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_datasets_not_modified(&self) {
        self.datasets_not_modified_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_governorates_request(&self) {
        self.governorates_requests_total
            .fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new() -> Self {
        let datasets: Vec<&'static Dataset> =
            DatasetKey::ALL.iter().map(|key| key.dataset()).collect();
        let city_count = datasets.iter().map(|dataset| dataset.cities.len()).sum();

        Self {
            started_at: Utc::now(),
            datasets: PreSerialized::encode("datasets", &datasets, b"[]"),
            governorates: PreSerialized::encode("governorates", &sorted_governorates(), b"[]"),
            dataset_count: datasets.len(),
            city_count,
            client_dist_dir: client_dist_dir(),
            cors_origins: cors_allowed_origins(),
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds().max(0)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datasets_are_serialized_once_with_stable_etag() {
        let a = AppState::new();
        let b = AppState::new();
        assert_eq!(a.dataset_count, 2);
        assert_eq!(a.city_count, 8);
        assert_eq!(a.datasets.etag, b.datasets.etag);
        assert!(a.datasets.etag.starts_with("\"datasets-"));

        let parsed: serde_json::Value =
            serde_json::from_slice(&a.datasets.json).expect("datasets json");
        assert_eq!(parsed.as_array().map(Vec::len), Some(2));
        assert_eq!(parsed[1]["cities"][2]["name"], "Tozeur");
    }

    #[test]
    fn cloned_state_shares_counters() {
        let state = AppState::new();
        let clone = state.clone();
        clone.observability.record_datasets_request();
        clone.observability.record_datasets_not_modified();
        let snapshot = state.observability.snapshot();
        assert_eq!(snapshot.datasets_requests_total, 1);
        assert_eq!(snapshot.datasets_not_modified_total, 1);
        assert_eq!(snapshot.health_requests_total, 0);
    }
}
