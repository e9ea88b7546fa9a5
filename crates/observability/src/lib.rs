use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use boussole_core::Intent;
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    intents_total: [AtomicU64; 5],
    located_total: AtomicU64,
    rejected_total: AtomicU64,
    total_latency_micros: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntentCounts {
    pub market: u64,
    pub data: u64,
    pub sector: u64,
    pub ai: u64,
    pub fallback: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub intents: IntentCounts,
    pub located_total: u64,
    pub rejected_total: u64,
    pub avg_latency_micros: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_classification(&self, intent: Intent, located: bool) {
        self.intents_total[intent.index()].fetch_add(1, Ordering::Relaxed);
        metrics::counter!("boussole_classifications_total", "intent" => intent.as_str())
            .increment(1);

        if located {
            self.located_total.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("boussole_located_total").increment(1);
        }
    }

    /// Requests refused before classification.
    pub fn inc_rejected(&self) {
        self.rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_micros.load(Ordering::Relaxed);
        let intent = |intent: Intent| self.intents_total[intent.index()].load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            intents: IntentCounts {
                market: intent(Intent::Market),
                data: intent(Intent::Data),
                sector: intent(Intent::Sector),
                ai: intent(Intent::Ai),
                fallback: intent(Intent::Fallback),
            },
            located_total: self.located_total.load(Ordering::Relaxed),
            rejected_total: self.rejected_total.load(Ordering::Relaxed),
            avg_latency_micros: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,boussole_api=info,boussole_core=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
