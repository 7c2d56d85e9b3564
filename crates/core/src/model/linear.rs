use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};

use crate::domain::prediction::{FeatureValue, FeatureVector};
use crate::model::{ModelLoader, YieldPredictor};

/// Linear regression exported by the training pipeline as JSON.
///
/// One slot per input position; categorical slots carry a weight per level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearYieldModel {
    pub intercept: f64,
    pub features: Vec<FeatureSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureSlot {
    Categorical {
        levels: BTreeMap<String, f64>,
        /// Weight for levels unseen during training; unknown levels fail without it.
        #[serde(default)]
        default: Option<f64>,
    },
    Numeric {
        coefficient: f64,
    },
}

impl FeatureSlot {
    fn contribution(&self, position: usize, value: &FeatureValue) -> anyhow::Result<f64> {
        match (self, value) {
            (FeatureSlot::Numeric { coefficient }, FeatureValue::Number(x)) => Ok(coefficient * x),
            (FeatureSlot::Categorical { levels, default }, FeatureValue::Category(name)) => {
                let wanted = name.trim();
                levels
                    .iter()
                    .find(|(level, _)| level.trim().eq_ignore_ascii_case(wanted))
                    .map(|(_, w)| *w)
                    .or(*default)
                    .with_context(|| format!("unknown category {name:?} at feature {position}"))
            }
            (FeatureSlot::Numeric { .. }, FeatureValue::Category(name)) => {
                bail!("feature {position} expects a number, got category {name:?}")
            }
            (FeatureSlot::Categorical { .. }, FeatureValue::Number(x)) => {
                bail!("feature {position} expects a category, got number {x}")
            }
        }
    }
}

impl LinearYieldModel {
    fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.intercept.is_finite(), "intercept must be finite");
        ensure!(!self.features.is_empty(), "model must declare at least one feature");
        for (idx, slot) in self.features.iter().enumerate() {
            match slot {
                FeatureSlot::Numeric { coefficient } => {
                    ensure!(coefficient.is_finite(), "coefficient {idx} must be finite")
                }
                FeatureSlot::Categorical { levels, default } => {
                    ensure!(
                        !levels.is_empty() || default.is_some(),
                        "categorical feature {idx} has no levels"
                    );
                    ensure!(
                        levels.values().chain(default.iter()).all(|w| w.is_finite()),
                        "categorical feature {idx} has non-finite weights"
                    );
                }
            }
        }
        Ok(())
    }
}

impl YieldPredictor for LinearYieldModel {
    fn predict(&self, features: &FeatureVector) -> anyhow::Result<f64> {
        let values = features.as_slice();
        ensure!(
            values.len() == self.features.len(),
            "model expects {} features (got {})",
            self.features.len(),
            values.len()
        );

        let mut y = self.intercept;
        for (idx, (slot, value)) in self.features.iter().zip(values).enumerate() {
            y += slot.contribution(idx, value)?;
        }
        ensure!(y.is_finite(), "prediction is not finite");
        Ok(y)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinearLoader;

impl ModelLoader for JsonLinearLoader {
    fn format(&self) -> &'static str {
        "json-linear"
    }

    fn load(&self, bytes: &[u8]) -> anyhow::Result<Arc<dyn YieldPredictor>> {
        let model: LinearYieldModel =
            serde_json::from_slice(bytes).context("model artifact is not a JSON linear model")?;
        model.validate()?;
        Ok(Arc::new(model))
    }
}
