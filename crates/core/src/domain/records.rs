use serde::{Deserialize, Serialize};

use crate::domain::coerce;

/// One row of `market_prices.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPriceEntry {
    pub crop: String,
    pub market: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitRecord {
    #[serde(deserialize_with = "coerce::int")]
    pub harvest_id: i64,
    pub market: String,
    #[serde(deserialize_with = "coerce::float")]
    pub net_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestMarketRecord {
    #[serde(deserialize_with = "coerce::int")]
    pub harvest_id: i64,
    pub best_market: String,
    #[serde(deserialize_with = "coerce::float")]
    pub max_profit: f64,
}

/// Risk assessment for one harvest as written to `risk_output.json`.
///
/// `harvest_id` may be absent: such a record can still raise an alert (as
/// harvest 0) but is never returned by a harvest lookup. `risk_score` falls
/// back to 0 when absent. An explicit `null` is rejected for both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    #[serde(default, deserialize_with = "coerce::opt_int")]
    pub harvest_id: Option<i64>,
    #[serde(default, deserialize_with = "coerce::int")]
    pub risk_score: i64,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub markets: Option<Vec<String>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Public view of a [`RiskRecord`] served by the risk lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResponse {
    pub harvest_id: i64,
    pub risk_score: i64,
    pub risk_level: String,
}

impl RiskRecord {
    pub fn to_response(&self) -> anyhow::Result<RiskResponse> {
        let harvest_id = self
            .harvest_id
            .ok_or_else(|| anyhow::anyhow!("risk record has no harvest_id"))?;
        anyhow::ensure!(
            (0..=100).contains(&self.risk_score),
            "risk_score out of range 0..=100 for harvest_id={harvest_id} (got {})",
            self.risk_score
        );
        let risk_level = self.risk_level.clone().ok_or_else(|| {
            anyhow::anyhow!("risk_level missing for harvest_id={harvest_id}")
        })?;

        Ok(RiskResponse {
            harvest_id,
            risk_score: self.risk_score,
            risk_level,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    HighRisk,
}

/// Derived from [`RiskRecord`]s on every request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub harvest_id: i64,
    pub message: String,
    pub related_markets: Option<Vec<String>>,
}

/// Common access to the join key shared by the harvest-scoped artifacts.
pub trait HarvestKeyed {
    /// `None` when the record carries no id and so cannot be looked up.
    fn harvest_id(&self) -> Option<i64>;
}

impl HarvestKeyed for ProfitRecord {
    fn harvest_id(&self) -> Option<i64> {
        Some(self.harvest_id)
    }
}

impl HarvestKeyed for BestMarketRecord {
    fn harvest_id(&self) -> Option<i64> {
        Some(self.harvest_id)
    }
}

impl HarvestKeyed for RiskRecord {
    fn harvest_id(&self) -> Option<i64> {
        self.harvest_id
    }
}

/// Linear scan for the first record carrying `harvest_id`.
pub fn find_by_harvest<T: HarvestKeyed>(records: Vec<T>, harvest_id: i64) -> Option<T> {
    records
        .into_iter()
        .find(|r| r.harvest_id() == Some(harvest_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn risk_record_defaults_absent_keys() {
        let r: RiskRecord = serde_json::from_value(json!({"risk_level": "LOW"})).unwrap();
        assert_eq!(r.harvest_id, None);
        assert_eq!(r.risk_score, 0);
        assert_eq!(r.markets, None);
        assert_eq!(r.message, None);
    }

    #[test]
    fn risk_record_rejects_null_score() {
        let res = serde_json::from_value::<RiskRecord>(json!({"harvest_id": 1, "risk_score": null}));
        assert!(res.is_err());
    }

    #[test]
    fn risk_response_requires_level_and_range() {
        let mut r = RiskRecord {
            harvest_id: Some(3),
            risk_score: 40,
            risk_level: Some("MEDIUM".into()),
            markets: None,
            message: None,
        };
        let resp = r.to_response().unwrap();
        assert_eq!(resp.risk_level, "MEDIUM");

        r.risk_score = 101;
        assert!(r.to_response().is_err());

        r.risk_score = 50;
        r.risk_level = None;
        assert!(r.to_response().is_err());

        r.risk_level = Some("LOW".into());
        r.harvest_id = None;
        assert!(r.to_response().is_err());
    }

    #[test]
    fn id_less_risk_record_is_never_found() {
        let records: Vec<RiskRecord> = serde_json::from_value(json!([
            {"risk_score": 90, "risk_level": "HIGH"},
            {"harvest_id": 0, "risk_score": 10, "risk_level": "LOW"}
        ]))
        .unwrap();
        let found = find_by_harvest(records.clone(), 0).unwrap();
        assert_eq!(found.risk_level.as_deref(), Some("LOW"));
        assert!(find_by_harvest(records[..1].to_vec(), 0).is_none());
    }

    #[test]
    fn alert_serializes_type_and_null_markets() {
        let alert = Alert {
            kind: AlertKind::HighRisk,
            harvest_id: 9,
            message: "m".into(),
            related_markets: None,
        };
        let v = serde_json::to_value(&alert).unwrap();
        assert_eq!(
            v,
            json!({"type": "HIGH_RISK", "harvest_id": 9, "message": "m", "related_markets": null})
        );
    }

    #[test]
    fn find_by_harvest_returns_first_match() {
        let records = vec![
            BestMarketRecord { harvest_id: 1, best_market: "A".into(), max_profit: 1.0 },
            BestMarketRecord { harvest_id: 2, best_market: "B".into(), max_profit: 2.0 },
            BestMarketRecord { harvest_id: 2, best_market: "C".into(), max_profit: 3.0 },
        ];
        let found = find_by_harvest(records.clone(), 2).unwrap();
        assert_eq!(found.best_market, "B");
        assert!(find_by_harvest(records, 99).is_none());
        assert!(find_by_harvest(Vec::<BestMarketRecord>::new(), 1).is_none());
    }
}
