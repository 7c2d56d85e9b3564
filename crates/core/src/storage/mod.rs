//! Read-only access to the artifacts the batch pipeline drops into the data directory.
//!
//! Nothing is cached: every call re-reads its file so a fresh pipeline run is
//! visible on the next request.

pub mod json;
pub mod market_prices;

use std::path::{Path, PathBuf};

use crate::domain::records::{BestMarketRecord, MarketPriceEntry, ProfitRecord, RiskRecord};
use crate::error::ArtifactError;

pub use market_prices::MarketPriceColumns;

pub const MARKET_PRICES_FILE: &str = "market_prices.csv";
pub const PROFIT_FILE: &str = "profit_output.json";
pub const BEST_MARKET_FILE: &str = "best_market.json";
pub const RISK_FILE: &str = "risk_output.json";

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    data_dir: PathBuf,
    columns: MarketPriceColumns,
}

impl ArtifactStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            columns: MarketPriceColumns::default(),
        }
    }

    pub fn with_columns(mut self, columns: MarketPriceColumns) -> Self {
        self.columns = columns;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Warns when the data directory is missing. Never fails: the pipeline may
    /// simply not have run yet.
    pub fn ensure_data_dir(&self) -> bool {
        let exists = self.data_dir.is_dir();
        if !exists {
            tracing::warn!(data_dir = %self.data_dir.display(), "data directory does not exist");
        }
        exists
    }

    pub fn load_market_prices(&self) -> Result<Vec<MarketPriceEntry>, ArtifactError> {
        let path = self.existing(MARKET_PRICES_FILE)?;
        market_prices::read(&path, &self.columns)
    }

    pub fn load_profit(&self) -> Result<Vec<ProfitRecord>, ArtifactError> {
        let path = self.existing(PROFIT_FILE)?;
        json::read_records(&path, PROFIT_FILE)
    }

    pub fn load_best_market(&self) -> Result<Vec<BestMarketRecord>, ArtifactError> {
        let path = self.existing(BEST_MARKET_FILE)?;
        json::read_records(&path, BEST_MARKET_FILE)
    }

    pub fn load_risk(&self) -> Result<Vec<RiskRecord>, ArtifactError> {
        let path = self.existing(RISK_FILE)?;
        json::read_records(&path, RISK_FILE)
    }

    fn existing(&self, file: &str) -> Result<PathBuf, ArtifactError> {
        let path = self.data_dir.join(file);
        if !path.is_file() {
            return Err(ArtifactError::NotFound { path });
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_loader_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        assert!(store.load_market_prices().unwrap_err().is_not_found());
        assert!(store.load_profit().unwrap_err().is_not_found());
        assert!(store.load_best_market().unwrap_err().is_not_found());
        assert!(store.load_risk().unwrap_err().is_not_found());
    }

    #[test]
    fn missing_data_dir_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("nope"));
        assert!(!store.ensure_data_dir());
        assert!(store.load_profit().unwrap_err().is_not_found());

        let store = ArtifactStore::new(dir.path());
        assert!(store.ensure_data_dir());
    }

    #[test]
    fn not_found_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArtifactStore::new(dir.path()).load_risk().unwrap_err();
        assert!(err.to_string().contains(RISK_FILE));
    }
}
