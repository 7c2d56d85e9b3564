//! Risk-to-alert derivation.

use crate::domain::records::{Alert, AlertKind, RiskRecord};
use crate::error::ArtifactError;
use crate::storage::ArtifactStore;

/// Scores at or above this raise a `HIGH_RISK` alert.
pub const HIGH_RISK_THRESHOLD: i64 = 70;

const DEFAULT_MESSAGE: &str = "High transport or market risk detected";
const DEFAULT_LEVEL: &str = "HIGH";

/// Loads the risk artifact and derives alerts from it.
pub fn derive_alerts(store: &ArtifactStore) -> Result<Vec<Alert>, ArtifactError> {
    let records = store.load_risk()?;
    Ok(alerts_from_risk(&records))
}

pub fn alerts_from_risk(records: &[RiskRecord]) -> Vec<Alert> {
    records.iter().filter_map(alert_for).collect()
}

fn alert_for(record: &RiskRecord) -> Option<Alert> {
    if record.risk_score < HIGH_RISK_THRESHOLD {
        return None;
    }

    let message = record.message.as_deref().unwrap_or(DEFAULT_MESSAGE);
    let level = record.risk_level.as_deref().unwrap_or(DEFAULT_LEVEL);
    let related_markets = record.markets.clone().filter(|m| !m.is_empty());

    Some(Alert {
        kind: AlertKind::HighRisk,
        harvest_id: record.harvest_id.unwrap_or(0),
        message: format!("{message} (risk_level={level}, score={})", record.risk_score),
        related_markets,
    })
}
