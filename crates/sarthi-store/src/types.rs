//! Row types for the advisory tables.

use serde::{Deserialize, Serialize};

/// One crop's cultivation facts for a location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropRecord {
    pub crop: String,
    pub location: String,
    pub season: Option<String>,
    pub sowing_period: Option<String>,
    pub harvesting_period: Option<String>,
    pub irrigation_schedule: Option<String>,
    pub fertilizer: Option<String>,
    pub pests: Option<String>,
}

impl CropRecord {
    /// Compact `key=value` rendering for prompt context, skipping empty fields.
    pub fn context_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("crop", self.crop.clone()),
            ("location", self.location.clone()),
        ];
        let optional = [
            ("season", &self.season),
            ("sowing_period", &self.sowing_period),
            ("harvesting_period", &self.harvesting_period),
            ("irrigation_schedule", &self.irrigation_schedule),
            ("fertilizer", &self.fertilizer),
            ("pests", &self.pests),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                if !v.is_empty() {
                    fields.push((key, v.clone()));
                }
            }
        }
        fields
    }
}

/// Soil characteristics for a location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilRecord {
    pub location: String,
    pub soil_type: Option<String>,
    pub ph_min: Option<f64>,
    pub ph_max: Option<f64>,
    pub n_status: Option<String>,
    pub p_status: Option<String>,
    pub k_status: Option<String>,
}

/// A pest advisory for one affected crop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PestRecord {
    pub pest_name: String,
    pub affected_crop: String,
    pub symptoms: String,
    pub management_advice: String,
}

/// A government support scheme description, used only for indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeRecord {
    pub scheme_name: String,
    pub purpose: Option<String>,
    pub eligibility: Option<String>,
    pub benefits: Option<String>,
    pub how_to_apply: Option<String>,
}
