//! Preflight over the artifacts the batch pipeline is expected to produce.

use vriksh_core::alerts;
use vriksh_core::error::ArtifactError;
use vriksh_core::storage::{self, ArtifactStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    Loaded { records: usize },
    Missing,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub data_dir_exists: bool,
    pub artifacts: Vec<(&'static str, ArtifactStatus)>,
    pub high_risk_alerts: Option<usize>,
}

impl CheckReport {
    /// Missing files are expected before the first pipeline run; only files
    /// that exist but cannot be read count as failures.
    pub fn has_failures(&self) -> bool {
        self.artifacts
            .iter()
            .any(|(_, status)| matches!(status, ArtifactStatus::Failed { .. }))
    }
}

fn status<T>(file: &'static str, res: Result<Vec<T>, ArtifactError>) -> ArtifactStatus {
    match res {
        Ok(records) => {
            tracing::info!(file, records = records.len(), "artifact loaded");
            ArtifactStatus::Loaded {
                records: records.len(),
            }
        }
        Err(e) if e.is_not_found() => {
            tracing::warn!(file, "artifact missing");
            ArtifactStatus::Missing
        }
        Err(e) => {
            tracing::error!(file, error = %e, "artifact failed to load");
            ArtifactStatus::Failed {
                error: e.to_string(),
            }
        }
    }
}

pub fn run(store: &ArtifactStore) -> CheckReport {
    let data_dir_exists = store.ensure_data_dir();

    let artifacts = vec![
        (
            storage::MARKET_PRICES_FILE,
            status(storage::MARKET_PRICES_FILE, store.load_market_prices()),
        ),
        (storage::PROFIT_FILE, status(storage::PROFIT_FILE, store.load_profit())),
        (
            storage::BEST_MARKET_FILE,
            status(storage::BEST_MARKET_FILE, store.load_best_market()),
        ),
        (storage::RISK_FILE, status(storage::RISK_FILE, store.load_risk())),
    ];

    let high_risk_alerts = match alerts::derive_alerts(store) {
        Ok(alerts) => {
            tracing::info!(alerts = alerts.len(), "high risk alerts derived");
            Some(alerts.len())
        }
        Err(_) => None,
    };

    CheckReport {
        data_dir_exists,
        artifacts,
        high_risk_alerts,
    }
}
