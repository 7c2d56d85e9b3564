use serde::{Deserialize, Serialize};

use crate::domain::coerce;
use crate::error::ValidationError;

fn default_price_per_unit() -> f64 {
    1.0
}

/// Body of a pre-harvest yield prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreHarvestRequest {
    /// Crop name, e.g. "Mustard".
    pub crop: String,
    /// Cultivated area in hectares.
    pub area: f64,
    /// Soil quality score on a 1-10 scale.
    #[serde(deserialize_with = "coerce::whole_int")]
    pub soil_quality: i64,
    /// Seasonal rainfall in millimeters.
    pub rainfall: f64,
    /// Selling price per yield unit used to estimate revenue.
    #[serde(default = "default_price_per_unit")]
    pub expected_price_per_unit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreHarvestResponse {
    pub predicted_yield: f64,
    pub expected_revenue: f64,
}

impl PreHarvestResponse {
    pub fn from_yield(predicted_yield: f64, expected_price_per_unit: f64) -> Self {
        Self {
            predicted_yield,
            expected_revenue: predicted_yield * expected_price_per_unit,
        }
    }
}

/// One position of the ordered feature vector handed to a predictor.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Category(String),
    Number(f64),
}

/// Ordered model input: crop, area, soil quality, rainfall.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<FeatureValue>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[FeatureValue] {
        &self.0
    }
}

/// A request that passed validation; the only way to build model features.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPrediction {
    pub crop: String,
    pub area: f64,
    pub soil_quality: i64,
    pub rainfall: f64,
    pub expected_price_per_unit: f64,
}

impl ValidatedPrediction {
    pub fn features(&self) -> FeatureVector {
        FeatureVector(vec![
            FeatureValue::Category(self.crop.clone()),
            FeatureValue::Number(self.area),
            FeatureValue::Number(self.soil_quality as f64),
            FeatureValue::Number(self.rainfall),
        ])
    }
}

impl PreHarvestRequest {
    pub fn validate(self) -> Result<ValidatedPrediction, ValidationError> {
        let mut issues = Vec::new();

        let crop = self.crop.trim().to_string();
        if crop.is_empty() {
            issues.push("crop must be non-empty".to_string());
        }
        if !(self.area.is_finite() && self.area > 0.0) {
            issues.push(format!("area must be greater than 0 (got {})", self.area));
        }
        if !(1..=10).contains(&self.soil_quality) {
            issues.push(format!(
                "soil_quality must be between 1 and 10 (got {})",
                self.soil_quality
            ));
        }
        if !(self.rainfall.is_finite() && self.rainfall >= 0.0) {
            issues.push(format!("rainfall must be >= 0 (got {})", self.rainfall));
        }
        if !(self.expected_price_per_unit.is_finite() && self.expected_price_per_unit >= 0.0) {
            issues.push(format!(
                "expected_price_per_unit must be >= 0 (got {})",
                self.expected_price_per_unit
            ));
        }

        if !issues.is_empty() {
            return Err(ValidationError { issues });
        }

        Ok(ValidatedPrediction {
            crop,
            area: self.area,
            soil_quality: self.soil_quality,
            rainfall: self.rainfall,
            expected_price_per_unit: self.expected_price_per_unit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(v: serde_json::Value) -> PreHarvestRequest {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn price_defaults_to_one() {
        let req = request(json!({"crop": "Mustard", "area": 2.0, "soil_quality": 7, "rainfall": 640.0}));
        assert_eq!(req.expected_price_per_unit, 1.0);
    }

    #[test]
    fn zero_area_is_rejected() {
        let req = request(json!({"crop": "Mustard", "area": 0, "soil_quality": 7, "rainfall": 10}));
        let err = req.validate().unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert!(err.issues[0].contains("area"));
    }

    #[test]
    fn collects_every_violation() {
        let req = request(json!({
            "crop": "   ",
            "area": -1.0,
            "soil_quality": 11,
            "rainfall": -5.0,
            "expected_price_per_unit": -0.5
        }));
        let err = req.validate().unwrap_err();
        assert_eq!(err.issues.len(), 5);
        assert!(err.to_string().contains("soil_quality"));
    }

    #[test]
    fn soil_quality_accepts_whole_number_floats() {
        let req = request(json!({"crop": "Rice", "area": 1, "soil_quality": 5.0, "rainfall": 0}));
        assert_eq!(req.soil_quality, 5);
        assert!(req.validate().is_ok());

        let res = serde_json::from_value::<PreHarvestRequest>(
            json!({"crop": "Rice", "area": 1, "soil_quality": 5.5, "rainfall": 0}),
        );
        assert!(res.is_err());
    }

    #[test]
    fn soil_quality_bounds_are_inclusive() {
        for soil_quality in [1, 10] {
            let req = request(json!({"crop": "Rice", "area": 1, "soil_quality": soil_quality, "rainfall": 0}));
            assert!(req.validate().is_ok());
        }
    }

    #[test]
    fn features_follow_crop_area_soil_rainfall_order() {
        let validated = request(json!({"crop": " Wheat ", "area": 3.5, "soil_quality": 6, "rainfall": 420.0}))
            .validate()
            .unwrap();
        assert_eq!(
            validated.features().as_slice(),
            &[
                FeatureValue::Category("Wheat".into()),
                FeatureValue::Number(3.5),
                FeatureValue::Number(6.0),
                FeatureValue::Number(420.0),
            ]
        );
    }

    #[test]
    fn revenue_is_yield_times_price() {
        let resp = PreHarvestResponse::from_yield(12.5, 3.0);
        assert_eq!(resp.expected_revenue, 37.5);
        let resp = PreHarvestResponse::from_yield(12.5, 1.0);
        assert_eq!(resp.expected_revenue, resp.predicted_yield);
    }
}
